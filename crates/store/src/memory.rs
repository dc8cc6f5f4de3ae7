use std::collections::HashMap;

use async_trait::async_trait;
use eyre::Result as EyreResult;
use tokio::sync::RwLock;

use crate::ApiKeyStore;

#[derive(Debug, Default)]
pub struct MemoryStore {
    keys: RwLock<HashMap<String, String>>,
}

#[async_trait]
impl ApiKeyStore for MemoryStore {
    async fn put(&self, username: &str, api_key: &str) -> EyreResult<()> {
        drop(
            self.keys
                .write()
                .await
                .insert(username.to_owned(), api_key.to_owned()),
        );
        Ok(())
    }

    async fn get(&self, username: &str) -> EyreResult<Option<String>> {
        Ok(self.keys.read().await.get(username).cloned())
    }
}
