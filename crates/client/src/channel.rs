use async_trait::async_trait;
use loyalty_primitives::job::ExternalId;
use loyalty_primitives::notification::NotificationEvent;
use thiserror::Error;

#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ChannelError {
    #[error("notification channel unreachable: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("notification channel refused subscription with status {0}")]
    Status(u16),
    #[error("undecodable notification: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("notification channel reported: {0}")]
    Remote(String),
    #[error("notification channel closed before the pass was ready")]
    Closed,
    #[error("invalid notification endpoint: {0}")]
    Url(#[from] url::ParseError),
}

/// Opens one subscription per job.
#[async_trait]
pub trait NotificationChannel: Send + Sync {
    type Subscription: Subscription;

    async fn subscribe(&self, job: &ExternalId) -> Result<Self::Subscription, ChannelError>;
}

#[async_trait]
pub trait Subscription: Send {
    /// Waits for the job's event. `Ok(None)` means the channel ended without
    /// one.
    async fn next_event(&mut self) -> Result<Option<NotificationEvent>, ChannelError>;

    /// Tears the subscription down. Nothing is delivered afterwards.
    async fn close(self)
    where
        Self: Sized;
}
