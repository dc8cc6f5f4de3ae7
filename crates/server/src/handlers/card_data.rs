use std::sync::Arc;

use axum::extract::Query;
use axum::response::{IntoResponse, Response};
use axum::{Extension, Json};
use loyalty_wallet_pass::WalletPassError;
use serde::Deserialize;
use tracing::warn;

use crate::service::{status_code, ApiError, ApiResponse};
use crate::state::ServiceState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CardDataQuery {
    card_slug: Option<String>,
}

/// `GET /api/cardData?cardSlug=`
pub async fn card_data_handler(
    Extension(state): Extension<Arc<ServiceState>>,
    Query(query): Query<CardDataQuery>,
) -> Response {
    let Some(card_slug) = query.card_slug.filter(|slug| !slug.trim().is_empty()) else {
        return ApiError::bad_request("Missing cardSlug").into_response();
    };

    match state.wallet_pass.card_data(&card_slug).await {
        Ok(data) => ApiResponse { payload: data }.into_response(),
        Err(WalletPassError::Upstream { status, body, .. }) => {
            (status_code(status), Json(body)).into_response()
        }
        Err(err) => {
            warn!(%card_slug, %err, "Card data lookup failed");
            ApiError::internal("Error fetching card data").into_response()
        }
    }
}
