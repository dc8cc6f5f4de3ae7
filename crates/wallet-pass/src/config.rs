use serde::{Deserialize, Serialize};
use url::Url;

pub const DEFAULT_TEMPLATE_ID: &str = "fa19039a-7e3e-45ed-af60-c1b319b054cb";
pub const DEFAULT_ASSET_URL: &str =
    "https://pub-17883891749c4dd484fccf6780697b62.r2.dev/metadataemp/passkey-modified.png";
pub const DEFAULT_TIMEOUT_MS: u64 = 30_000;

#[derive(Clone, Debug, Deserialize, Serialize)]
#[non_exhaustive]
pub struct WalletPassConfig {
    /// Base URL; endpoint paths are appended to it.
    pub url: Url,

    /// Sent as the `x-stl-key` header.
    #[serde(default)]
    pub api_key: Option<String>,

    #[serde(default)]
    pub bearer_token: Option<String>,

    /// Pass template used when the caller does not name one.
    #[serde(default = "default_template_id")]
    pub template_id: String,

    /// Card icon and Google logo.
    #[serde(default = "default_asset_url")]
    pub asset_url: String,

    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
}

impl WalletPassConfig {
    #[must_use]
    pub fn new(url: Url) -> Self {
        Self {
            url,
            api_key: None,
            bearer_token: None,
            template_id: default_template_id(),
            asset_url: default_asset_url(),
            timeout_ms: DEFAULT_TIMEOUT_MS,
        }
    }
}

fn default_template_id() -> String {
    DEFAULT_TEMPLATE_ID.to_owned()
}

fn default_asset_url() -> String {
    DEFAULT_ASSET_URL.to_owned()
}

const fn default_timeout_ms() -> u64 {
    DEFAULT_TIMEOUT_MS
}
