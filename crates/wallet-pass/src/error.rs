use serde_json::Value;
use thiserror::Error;

#[derive(Debug, Error)]
#[non_exhaustive]
pub enum WalletPassError {
    /// The service answered with a non-2xx status and a JSON body.
    #[error("wallet-pass service responded {status}: {}", message.as_deref().unwrap_or("no message"))]
    Upstream {
        status: u16,
        message: Option<String>,
        body: Value,
    },
    /// The body could not be parsed as JSON.
    #[error("unparsable response from wallet-pass service ({status})")]
    Malformed { status: u16, body: String },
    #[error("wallet-pass service unreachable: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("invalid wallet-pass endpoint: {0}")]
    Url(#[from] url::ParseError),
}

impl WalletPassError {
    /// Remote status, when the service answered at all.
    #[must_use]
    pub const fn status(&self) -> Option<u16> {
        match self {
            Self::Upstream { status, .. } | Self::Malformed { status, .. } => Some(*status),
            Self::Transport(_) | Self::Url(_) => None,
        }
    }
}
