//! Merchant provisioning: turns a project request into a registered,
//! collectible card on the wallet-pass service.
//!
//! The work is a fixed pipeline of [`Step`]s, run strictly in order, each
//! feeding the next. Each step declares its own [`FailurePolicy`]; nothing
//! completed earlier is undone when a later step aborts.

mod error;
mod orchestrator;
mod step;

pub use error::ProvisioningError;
pub use orchestrator::{Provisioned, Provisioner};
pub use step::{FailurePolicy, Step, StepReport, StepStatus};
