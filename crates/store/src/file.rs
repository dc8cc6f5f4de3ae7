use std::collections::BTreeMap;

use async_trait::async_trait;
use camino::Utf8PathBuf;
use eyre::{Result as EyreResult, WrapErr};
use tokio::fs;
use tokio::sync::Mutex;
use tracing::debug;

use crate::ApiKeyStore;

/// Keeps the whole map in memory and rewrites the file on every put.
///
/// Writes go to a sibling temp file first and are renamed into place, so a
/// crash mid-write leaves the previous contents intact.
#[derive(Debug)]
pub struct FileStore {
    path: Utf8PathBuf,
    keys: Mutex<BTreeMap<String, String>>,
}

impl FileStore {
    pub async fn open(path: Utf8PathBuf) -> EyreResult<Self> {
        let keys = match fs::read(&path).await {
            Ok(content) => serde_json::from_slice(&content)
                .wrap_err_with(|| format!("failed to parse api key store at {path:?}"))?,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => BTreeMap::new(),
            Err(err) => {
                return Err(err).wrap_err_with(|| format!("failed to read api key store at {path:?}"))
            }
        };

        Ok(Self {
            path,
            keys: Mutex::new(keys),
        })
    }

    async fn persist(&self, keys: &BTreeMap<String, String>) -> EyreResult<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).await?;
        }

        let tmp = self.path.with_extension("tmp");
        fs::write(&tmp, serde_json::to_vec_pretty(keys)?)
            .await
            .wrap_err_with(|| format!("failed to write api key store to {tmp:?}"))?;
        fs::rename(&tmp, &self.path).await?;

        debug!(path = %self.path, entries = keys.len(), "Persisted api key store");

        Ok(())
    }
}

#[async_trait]
impl ApiKeyStore for FileStore {
    async fn put(&self, username: &str, api_key: &str) -> EyreResult<()> {
        let mut keys = self.keys.lock().await;
        let previous = keys.insert(username.to_owned(), api_key.to_owned());

        if let Err(err) = self.persist(&keys).await {
            // keep memory and disk in agreement
            match previous {
                Some(previous) => drop(keys.insert(username.to_owned(), previous)),
                None => drop(keys.remove(username)),
            }
            return Err(err);
        }

        Ok(())
    }

    async fn get(&self, username: &str) -> EyreResult<Option<String>> {
        Ok(self.keys.lock().await.get(username).cloned())
    }
}
