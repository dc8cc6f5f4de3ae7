use core::time::Duration;

use tokio::time::sleep;
use tracing::debug;

use crate::channel::{ChannelError, Subscription};

/// How long a claim waits for its pass.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug)]
pub enum WaitOutcome {
    /// Where the pass can be downloaded.
    Ready(String),
    TimedOut,
    Failed(ChannelError),
}

/// Races `subscription` against `timeout`.
///
/// The subscription is closed before this returns, whatever the outcome;
/// events arriving afterwards are never read.
pub async fn wait_for_completion<S: Subscription>(mut subscription: S, timeout: Duration) -> WaitOutcome {
    let outcome = tokio::select! {
        event = subscription.next_event() => match event {
            Ok(Some(event)) => WaitOutcome::Ready(event.file_url),
            Ok(None) => WaitOutcome::Failed(ChannelError::Closed),
            Err(err) => WaitOutcome::Failed(err),
        },
        () = sleep(timeout) => WaitOutcome::TimedOut,
    };

    subscription.close().await;

    debug!(?outcome, "Completion wait settled");

    outcome
}
