use serde::{Deserialize, Serialize};

/// The single terminal message delivered once per job over the
/// notification channel.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct NotificationEvent {
    #[serde(rename = "fileURL", alias = "fileUrl")]
    pub file_url: String,
}

impl NotificationEvent {
    #[must_use]
    pub const fn new(file_url: String) -> Self {
        Self { file_url }
    }
}

/// Route the wallet-pass service calls back on, and that subscribers stream
/// from.
pub const CALLBACK_PATH: &str = "/api/wallet-pass-callback";
