use std::io;

use camino::Utf8PathBuf;
use openssl::error::ErrorStack;
use thiserror::Error;
use tokio::task::JoinError;
use zip::result::ZipError;

#[derive(Debug, Error)]
#[non_exhaustive]
pub enum PassError {
    #[error("missing asset: {path}")]
    MissingAsset { path: Utf8PathBuf },

    #[error("signing configuration is missing {0}")]
    MissingCertificate(&'static str),

    #[error("signing configuration is missing the pass authentication token")]
    MissingAuthToken,

    #[error("failed to read {what} from {path}: {source}")]
    ReadCertificate {
        what: &'static str,
        path: Utf8PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("invalid {what}: {source}")]
    InvalidCertificate {
        what: &'static str,
        #[source]
        source: ErrorStack,
    },

    #[error("failed to sign pass manifest: {0}")]
    Signing(#[from] ErrorStack),

    #[error("failed to write pass archive: {0}")]
    Archive(#[from] ZipError),

    #[error("pass definition: {0}")]
    Definition(#[from] serde_json::Error),

    #[error(transparent)]
    Io(#[from] io::Error),

    #[error("pass build task failed: {0}")]
    Task(#[from] JoinError),
}
