use std::sync::Arc;

use axum::response::{IntoResponse, Response};
use axum::{Extension, Json};
use loyalty_primitives::merchant::ProjectRequest;
use loyalty_provisioning::ProvisioningError;
use serde_json::{json, Value};
use tracing::error;

use crate::service::{status_code, ApiError, ApiResponse};
use crate::state::ServiceState;

/// `POST /api/merchant-project-create`
pub async fn create_project_handler(
    Extension(state): Extension<Arc<ServiceState>>,
    Json(request): Json<ProjectRequest>,
) -> Response {
    match state.provisioner.provision(request).await {
        Ok(provisioned) => ApiResponse {
            payload: Value::Object(provisioned.into_body()),
        }
        .into_response(),
        Err(ProvisioningError::Validation(err)) => ApiError::bad_request(err.to_string()).into_response(),
        Err(err) => {
            if matches!(err, ProvisioningError::Internal { .. }) {
                error!(%err, completed = ?err.completed_steps(), "Merchant provisioning failed");
            }

            (
                status_code(err.status()),
                Json(json!({ "success": false, "message": err.public_message() })),
            )
                .into_response()
        }
    }
}
