//! Dispatch a claim, then wait for its pass.

use core::time::Duration;
use std::collections::HashSet;
use std::sync::{Arc, Mutex, PoisonError};

use loyalty_primitives::claim::ClaimRequest;
use loyalty_primitives::job::ExternalId;
use loyalty_primitives::validation::ValidationError;
use reqwest::Client;
use thiserror::Error;
use tokio::time::{timeout_at, Instant};
use tracing::{info, warn};
use url::Url;

use crate::channel::{ChannelError, NotificationChannel};
use crate::sse::SseChannel;
use crate::waiter::{wait_for_completion, WaitOutcome, DEFAULT_TIMEOUT};

const DISPATCH_PATH: &str = "/api/wallet-passes";

#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ClaimError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error("a claim for {0} is already in progress")]
    InProgress(ExternalId),
    #[error("pass request rejected with status {status}: {body}")]
    Rejected { status: u16, body: String },
    #[error("pass request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error(transparent)]
    Channel(#[from] ChannelError),
    #[error("Timeout waiting for pass, please try again")]
    TimedOut,
}

/// Jobs with a claim in flight.
///
/// Owned by whoever issues claims; clones share the same set.
#[derive(Clone, Debug, Default)]
pub struct ClaimSession {
    in_flight: Arc<Mutex<HashSet<ExternalId>>>,
}

impl ClaimSession {
    /// Marks `job` as in flight until the returned guard is dropped.
    pub fn begin(&self, job: &ExternalId) -> Result<ClaimGuard, ClaimError> {
        let inserted = self
            .in_flight
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(job.clone());

        if !inserted {
            return Err(ClaimError::InProgress(job.clone()));
        }

        Ok(ClaimGuard {
            session: self.clone(),
            job: job.clone(),
        })
    }

    #[must_use]
    pub fn is_loading(&self, job: &ExternalId) -> bool {
        self.in_flight
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .contains(job)
    }
}

#[derive(Debug)]
pub struct ClaimGuard {
    session: ClaimSession,
    job: ExternalId,
}

impl ClaimGuard {
    #[must_use]
    pub const fn job(&self) -> &ExternalId {
        &self.job
    }
}

impl Drop for ClaimGuard {
    fn drop(&mut self) {
        let _removed = self
            .session
            .in_flight
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&self.job);
    }
}

#[derive(Debug)]
pub struct ClaimClient<C = SseChannel> {
    http: Client,
    endpoint: Url,
    channel: C,
    timeout: Duration,
    session: ClaimSession,
}

impl ClaimClient {
    /// Claims against the service at `base_url`, waiting over its SSE
    /// channel.
    pub fn new(base_url: &Url) -> Result<Self, ClaimError> {
        let http = Client::new();
        let channel = SseChannel::new(http.clone(), base_url)?;

        Self::with_channel(http, base_url, channel)
    }
}

impl<C: NotificationChannel> ClaimClient<C> {
    pub fn with_channel(http: Client, base_url: &Url, channel: C) -> Result<Self, ClaimError> {
        let endpoint = base_url.join(DISPATCH_PATH).map_err(ChannelError::from)?;

        Ok(Self {
            http,
            endpoint,
            channel,
            timeout: DEFAULT_TIMEOUT,
            session: ClaimSession::default(),
        })
    }

    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    #[must_use]
    pub fn with_session(mut self, session: ClaimSession) -> Self {
        self.session = session;
        self
    }

    #[must_use]
    pub const fn session(&self) -> &ClaimSession {
        &self.session
    }

    /// Requests a pass and waits for its download location.
    ///
    /// The request is validated before anything is sent, and at most one
    /// claim per job runs at a time. The timeout covers opening the
    /// subscription as well as waiting on it.
    pub async fn claim(&self, request: ClaimRequest) -> Result<String, ClaimError> {
        let claim = request.clone().validate(None)?;
        let _guard = self.session.begin(&claim.job)?;

        self.dispatch(&request).await?;

        let deadline = Instant::now() + self.timeout;

        let Ok(subscription) = timeout_at(deadline, self.channel.subscribe(&claim.job)).await else {
            warn!(job = %claim.job, "Timed out subscribing to pass notifications");
            return Err(ClaimError::TimedOut);
        };

        let remaining = deadline.saturating_duration_since(Instant::now());

        match wait_for_completion(subscription?, remaining).await {
            WaitOutcome::Ready(file_url) => {
                info!(job = %claim.job, %file_url, "Pass ready");
                Ok(file_url)
            }
            WaitOutcome::TimedOut => {
                warn!(job = %claim.job, "Timed out waiting for pass");
                Err(ClaimError::TimedOut)
            }
            WaitOutcome::Failed(err) => {
                warn!(job = %claim.job, %err, "Pass notification failed");
                Err(err.into())
            }
        }
    }

    async fn dispatch(&self, request: &ClaimRequest) -> Result<(), ClaimError> {
        let response = self
            .http
            .post(self.endpoint.clone())
            .json(request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ClaimError::Rejected {
                status: status.as_u16(),
                body,
            });
        }

        Ok(())
    }
}
