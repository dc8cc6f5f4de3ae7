use loyalty_primitives::validation::ValidationError;
use thiserror::Error;

use crate::step::Step;

pub const INTERNAL_ERROR_MESSAGE: &str = "Internal server error";

#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ProvisioningError {
    /// Rejected before any remote call.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// The wallet-pass service refused a step; its status and message are
    /// passed through.
    #[error("{step} failed with status {status}: {message}")]
    Rejected {
        step: Step,
        status: u16,
        message: String,
        completed: Vec<Step>,
    },

    /// The service could not be reached or answered garbage.
    #[error("{step} failed: {reason}")]
    Internal {
        step: Step,
        reason: String,
        completed: Vec<Step>,
    },
}

impl ProvisioningError {
    /// HTTP-equivalent status to report to the caller.
    #[must_use]
    pub const fn status(&self) -> u16 {
        match self {
            Self::Validation(_) => 400,
            Self::Rejected { status, .. } => *status,
            Self::Internal { .. } => 500,
        }
    }

    /// Message safe to show to the merchant.
    #[must_use]
    pub fn public_message(&self) -> String {
        match self {
            Self::Validation(err) => err.to_string(),
            Self::Rejected { message, .. } => message.clone(),
            Self::Internal { .. } => INTERNAL_ERROR_MESSAGE.to_owned(),
        }
    }

    /// Steps that had already run, and stay in effect, when the pipeline
    /// stopped.
    #[must_use]
    pub fn completed_steps(&self) -> &[Step] {
        match self {
            Self::Validation(_) => &[],
            Self::Rejected { completed, .. } | Self::Internal { completed, .. } => completed,
        }
    }
}
