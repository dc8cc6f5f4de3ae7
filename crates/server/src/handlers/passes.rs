use core::convert::Infallible;
use core::pin::Pin;
use core::task::{Context, Poll};
use std::sync::Arc;

use axum::body::Body;
use axum::extract::{Path, Query};
use axum::http::{header, HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::{Extension, Json};
use bytes::Bytes;
use futures_util::stream::Stream;
use loyalty_pkpass::{
    ArtifactLease, PassBuilder, PassError, PassRequest, CONTENT_DISPOSITION, CONTENT_TYPE,
    DEFAULT_BALANCE,
};
use loyalty_primitives::job::{parse_serial_number, ExternalId};
use serde::Deserialize;
use tracing::{error, warn};

use crate::service::ApiError;
use crate::state::ServiceState;

/// Scheme of the `Authorization` header wallets send.
pub const AUTH_SCHEME: &str = "ApplePass";

/// Used by update requests that do not name the campaign.
pub const DEFAULT_CAMPAIGN: &str = "Loyalty";

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BuildPassBody {
    #[serde(default)]
    campaign: Option<String>,
    #[serde(default)]
    eth_address: Option<String>,
    #[serde(default)]
    card_id: Option<String>,
    #[serde(default)]
    balance: Option<String>,
}

/// `POST /api/passes`
pub async fn build_pass_handler(
    Extension(state): Extension<Arc<ServiceState>>,
    Json(body): Json<BuildPassBody>,
) -> Response {
    let builder = match builder(&state) {
        Ok(builder) => builder,
        Err(err) => return err.into_response(),
    };

    let (Some(card_id), Some(eth_address)) = (body.card_id, body.eth_address) else {
        return ApiError::bad_request("Missing cardId or ethAddress").into_response();
    };

    let job = match ExternalId::from_parts(&card_id, &eth_address) {
        Ok(job) => job,
        Err(err) => return ApiError::bad_request(err.to_string()).into_response(),
    };

    let mut request = PassRequest::new(job, body.campaign.as_deref().unwrap_or_default());
    request.balance = body
        .balance
        .filter(|balance| !balance.trim().is_empty())
        .unwrap_or_else(|| DEFAULT_BALANCE.to_owned());

    build_and_serve(builder, &request).await
}

#[derive(Debug, Deserialize)]
pub struct LatestPassQuery {
    #[serde(default)]
    campaign: Option<String>,
}

/// `GET /api/passes/v1/passes/:pass_type_identifier/:serial_number`
pub async fn latest_pass_handler(
    Extension(state): Extension<Arc<ServiceState>>,
    Path((pass_type_identifier, serial_number)): Path<(String, String)>,
    Query(query): Query<LatestPassQuery>,
    headers: HeaderMap,
) -> Response {
    let builder = match builder(&state) {
        Ok(builder) => builder,
        Err(err) => return err.into_response(),
    };

    if !authorized(&headers, builder.auth_token()) {
        return ApiError::new(StatusCode::UNAUTHORIZED, "Unauthorized").into_response();
    }

    if pass_type_identifier != builder.config().pass_type_identifier {
        return ApiError::new(StatusCode::NOT_FOUND, "Unknown pass type").into_response();
    }

    let campaign = query.campaign.as_deref().unwrap_or(DEFAULT_CAMPAIGN);
    let details = match parse_serial_number(&serial_number, campaign) {
        Ok(details) => details,
        Err(err) => return ApiError::new(StatusCode::NOT_FOUND, err.to_string()).into_response(),
    };

    let job = ExternalId::new(details.card_id, details.eth_address);
    build_and_serve(builder, &PassRequest::new(job, &details.campaign)).await
}

fn builder(state: &ServiceState) -> Result<&PassBuilder, ApiError> {
    state.passes.as_ref().ok_or_else(|| {
        ApiError::new(
            StatusCode::SERVICE_UNAVAILABLE,
            "Pass signing is not configured",
        )
    })
}

fn authorized(headers: &HeaderMap, token: &str) -> bool {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix(AUTH_SCHEME))
        .is_some_and(|value| value.trim() == token)
}

async fn build_and_serve(builder: &PassBuilder, request: &PassRequest) -> Response {
    let lease = match builder.build(request).await {
        Ok(lease) => lease,
        Err(err @ PassError::MissingAsset { .. }) => {
            error!(external_id = %request.job, %err, "Pass assets incomplete");
            return ApiError::internal(err.to_string()).into_response();
        }
        Err(err) => {
            error!(external_id = %request.job, %err, "Failed to build pass");
            return ApiError::internal("Error generating pass").into_response();
        }
    };

    match serve(lease).await {
        Ok(response) => response,
        Err(err) => err.into_response(),
    }
}

/// Sends the artifact. The lease travels with the response body and is
/// released once the body has been fully sent or dropped.
pub async fn serve(lease: ArtifactLease) -> Result<Response, ApiError> {
    let bytes = lease.read().await.map_err(|err| {
        error!(artifact = %lease.path(), %err, "Failed to read pass artifact");
        ApiError::internal("Error reading pass")
    })?;

    Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, CONTENT_TYPE)
        .header(header::CONTENT_DISPOSITION, CONTENT_DISPOSITION)
        .header(header::CONTENT_LENGTH, bytes.len())
        .body(Body::from_stream(ArtifactBody::new(bytes, lease)))
        .map_err(|err| {
            warn!(%err, "Failed to assemble pass response");
            ApiError::internal("Error serving pass")
        })
}

/// Single-chunk body that owns the artifact's lease.
#[derive(Debug)]
struct ArtifactBody {
    chunk: Option<Bytes>,
    lease: Option<ArtifactLease>,
}

impl ArtifactBody {
    fn new(bytes: Vec<u8>, lease: ArtifactLease) -> Self {
        Self {
            chunk: Some(Bytes::from(bytes)),
            lease: Some(lease),
        }
    }
}

impl Stream for ArtifactBody {
    type Item = Result<Bytes, Infallible>;

    fn poll_next(self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let this = self.get_mut();

        if let Some(chunk) = this.chunk.take() {
            return Poll::Ready(Some(Ok(chunk)));
        }

        if let Some(lease) = this.lease.take() {
            lease.release();
        }

        Poll::Ready(None)
    }
}
