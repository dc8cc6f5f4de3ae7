//! Client for the third-party wallet-pass service.
//!
//! Every endpoint takes and returns JSON. Successful bodies are handed back
//! untouched so callers can merge or forward them; failures keep the remote
//! status and `message` so they can be surfaced verbatim.

use async_trait::async_trait;
use serde_json::{Map, Value};

pub mod client;
pub mod config;
pub mod error;
pub mod types;

pub use client::HttpWalletPass;
pub use error::WalletPassError;

use types::{CreateIssuer, PassPayload, RegisterCard};

/// JSON object returned by a successful call.
pub type Object = Map<String, Value>;

#[async_trait]
pub trait WalletPass: Send + Sync {
    /// `POST /projects`
    async fn create_project(&self, project_name: &str) -> Result<Object, WalletPassError>;

    /// `POST /merchant-logins/create-issuer`
    async fn create_issuer(&self, request: &CreateIssuer) -> Result<Object, WalletPassError>;

    /// `POST /merchant-logins/register-card`
    async fn register_card(&self, request: &RegisterCard) -> Result<Object, WalletPassError>;

    /// `POST /wallet-passes`. Success means the job was accepted, not that
    /// the pass exists yet.
    async fn create_pass(&self, payload: &PassPayload) -> Result<Value, WalletPassError>;

    /// `GET /merchant-logins/get-data/{cardSlug}`
    async fn card_data(&self, card_slug: &str) -> Result<Value, WalletPassError>;
}
