use camino::Utf8PathBuf;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, Default, Deserialize, Serialize)]
#[non_exhaustive]
pub struct StoreConfig {
    /// JSON file holding the keys. Keys live in memory only when unset.
    #[serde(default)]
    pub path: Option<Utf8PathBuf>,
}

impl StoreConfig {
    #[must_use]
    pub const fn new(path: Option<Utf8PathBuf>) -> Self {
        Self { path }
    }
}
