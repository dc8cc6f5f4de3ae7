//! Key-value store for merchant API keys.
//!
//! The provisioning pipeline only ever writes `(username, apiKey)` pairs;
//! reads exist for operators and tests.

use std::sync::Arc;

use async_trait::async_trait;
use eyre::Result as EyreResult;

pub mod config;
mod file;
mod memory;

pub use file::FileStore;
pub use memory::MemoryStore;

use config::StoreConfig;

#[async_trait]
pub trait ApiKeyStore: Send + Sync {
    /// Stores the key issued for `username`, replacing any previous one.
    async fn put(&self, username: &str, api_key: &str) -> EyreResult<()>;

    async fn get(&self, username: &str) -> EyreResult<Option<String>>;
}

/// Cheaply cloneable handle over whichever backend the config selects.
#[derive(Clone)]
pub struct Store {
    backend: Arc<dyn ApiKeyStore>,
}

impl Store {
    pub async fn open(config: &StoreConfig) -> EyreResult<Self> {
        let backend: Arc<dyn ApiKeyStore> = match &config.path {
            Some(path) => Arc::new(FileStore::open(path.clone()).await?),
            None => Arc::new(MemoryStore::default()),
        };

        Ok(Self { backend })
    }

    pub fn new<S: ApiKeyStore + 'static>(backend: S) -> Self {
        Self {
            backend: Arc::new(backend),
        }
    }
}

impl std::fmt::Debug for Store {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Store").finish_non_exhaustive()
    }
}

#[async_trait]
impl ApiKeyStore for Store {
    async fn put(&self, username: &str, api_key: &str) -> EyreResult<()> {
        self.backend.put(username, api_key).await
    }

    async fn get(&self, username: &str) -> EyreResult<Option<String>> {
        self.backend.get(username).await
    }
}
