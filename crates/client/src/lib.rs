//! Claim-side half of the pass pipeline.
//!
//! A claim is dispatched to the service, then the job's notification
//! channel is raced against a timeout. Whichever settles first decides the
//! outcome, and the subscription is closed before the caller sees it.

pub mod channel;
pub mod claim;
pub mod sse;
pub mod waiter;

pub use channel::{ChannelError, NotificationChannel, Subscription};
pub use claim::{ClaimClient, ClaimError, ClaimGuard, ClaimSession};
pub use sse::{SseChannel, SseSubscription};
pub use waiter::{wait_for_completion, WaitOutcome, DEFAULT_TIMEOUT};
