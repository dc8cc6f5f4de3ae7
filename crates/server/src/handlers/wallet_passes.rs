use std::sync::Arc;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::{Extension, Json};
use loyalty_dispatch::DispatchError;
use loyalty_primitives::claim::ClaimRequest;
use loyalty_primitives::platform::Platform;
use serde_json::json;

use crate::service::{status_code, ApiError, ApiResponse};
use crate::state::ServiceState;

/// `POST /api/wallet-passes`; the platform comes from the body.
pub async fn create_pass_handler(
    Extension(state): Extension<Arc<ServiceState>>,
    Json(request): Json<ClaimRequest>,
) -> Response {
    dispatch(&state, request).await
}

/// `POST /api/jwtToken`
pub async fn google_pass_handler(
    Extension(state): Extension<Arc<ServiceState>>,
    Json(mut request): Json<ClaimRequest>,
) -> Response {
    request.platform = Some(Platform::Google);
    dispatch(&state, request).await
}

/// `POST /api/generatePkpass`
pub async fn apple_pass_handler(
    Extension(state): Extension<Arc<ServiceState>>,
    Json(mut request): Json<ClaimRequest>,
) -> Response {
    request.platform = Some(Platform::Apple);
    dispatch(&state, request).await
}

async fn dispatch(state: &ServiceState, request: ClaimRequest) -> Response {
    match state.dispatcher.dispatch(request, None).await {
        Ok(dispatched) => ApiResponse {
            payload: dispatched.response,
        }
        .into_response(),
        Err(DispatchError::Validation(err)) => ApiError::bad_request(err.to_string()).into_response(),
        Err(DispatchError::Upstream { status, body }) => {
            (status_code(status), Json(json!({ "error": body }))).into_response()
        }
        Err(err @ DispatchError::Malformed { .. }) => {
            ApiError::new(StatusCode::BAD_GATEWAY, err.to_string()).into_response()
        }
        Err(_) => ApiError::internal("Error creating pass").into_response(),
    }
}
