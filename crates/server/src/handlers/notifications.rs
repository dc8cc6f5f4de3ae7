use core::convert::Infallible;
use std::sync::Arc;

use axum::extract::Query;
use axum::response::sse::{Event, KeepAlive, Sse};
use axum::response::{IntoResponse, Response};
use axum::{Extension, Json};
use futures_util::stream::Stream;
use loyalty_primitives::notification::NotificationEvent;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio_stream::wrappers::WatchStream;
use tokio_stream::StreamExt;
use tracing::{debug, error, info};

use crate::service::{ApiError, ApiResponse};
use crate::state::ServiceState;

pub const MESSAGE_EVENT: &str = "message";
pub const ERROR_EVENT: &str = "error";

/// What the wallet-pass service posts when a pass is ready.
#[derive(Debug, Deserialize)]
pub struct CallbackBody {
    #[serde(alias = "externalId")]
    id: String,
    #[serde(flatten)]
    event: NotificationEvent,
}

#[derive(Debug, Serialize)]
struct CallbackAccepted {
    received: bool,
    subscribers: usize,
}

/// `POST /api/wallet-pass-callback`
pub async fn callback_handler(
    Extension(state): Extension<Arc<ServiceState>>,
    Json(body): Json<Value>,
) -> Response {
    let body: CallbackBody = match serde_json::from_value(body) {
        Ok(body) => body,
        Err(err) => {
            return ApiError::bad_request(format!("Invalid callback: {err}")).into_response();
        }
    };

    info!(external_id = %body.id, file_url = %body.event.file_url, "Pass ready");

    let subscribers = state.notifications.publish(&body.id, body.event);

    ApiResponse {
        payload: CallbackAccepted {
            received: true,
            subscribers,
        },
    }
    .into_response()
}

#[derive(Debug, Deserialize)]
pub struct SubscribeQuery {
    id: String,
}

/// `GET /api/wallet-pass-callback?id=`
///
/// Streams the job's event once, then ends the stream.
pub async fn subscribe_handler(
    Extension(state): Extension<Arc<ServiceState>>,
    Query(query): Query<SubscribeQuery>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    debug!(external_id = %query.id, "Notification subscriber connected");

    let receiver = state.notifications.subscribe(&query.id);

    let stream = WatchStream::new(receiver)
        .filter_map(|event| event)
        .take(1)
        .map(|event| {
            Ok(match Event::default().event(MESSAGE_EVENT).json_data(&event) {
                Ok(event) => event,
                Err(err) => {
                    error!(%err, "Failed to serialize notification");
                    Event::default()
                        .event(ERROR_EVENT)
                        .data("Failed to serialize notification")
                }
            })
        });

    Sse::new(stream).keep_alive(KeepAlive::default())
}
