use loyalty_primitives::job::ExternalId;
use loyalty_primitives::validation::ValidationError;
use loyalty_wallet_pass::WalletPassError;
use serde_json::Value;
use thiserror::Error;
use tracing::warn;

#[derive(Debug, Error)]
#[non_exhaustive]
pub enum DispatchError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// Non-2xx from the service; `body` is what it sent.
    #[error("pass request rejected with status {status}")]
    Upstream { status: u16, body: Value },

    /// The service answered with something that is not JSON.
    #[error("unparsable pass response ({status})")]
    Malformed { status: u16, body: String },

    #[error("pass request failed: {0}")]
    Transport(String),
}

impl DispatchError {
    pub(crate) fn from_wallet_pass(job: &ExternalId, err: WalletPassError) -> Self {
        match err {
            WalletPassError::Upstream { status, body, .. } => {
                warn!(external_id = %job, status, %body, "Pass request rejected");
                Self::Upstream { status, body }
            }
            WalletPassError::Malformed { status, body } => {
                warn!(external_id = %job, status, %body, "Unparsable pass response");
                Self::Malformed { status, body }
            }
            other => {
                warn!(external_id = %job, err = %other, "Pass request failed");
                Self::Transport(other.to_string())
            }
        }
    }

    /// HTTP-equivalent status to report to the caller.
    #[must_use]
    pub const fn status(&self) -> u16 {
        match self {
            Self::Validation(_) => 400,
            Self::Upstream { status, .. } => *status,
            Self::Malformed { .. } => 502,
            Self::Transport(_) => 500,
        }
    }
}
