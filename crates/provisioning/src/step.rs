use core::fmt;

/// What happens to the pipeline when a step fails.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum FailurePolicy {
    /// Stop and report the step's failure to the caller.
    Abort,
    /// Log the failure and run the next step.
    ContinueAndLog,
}

#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum Step {
    CreateProject,
    StoreApiKey,
    CreateIssuer,
    RegisterCard,
}

impl Step {
    /// Execution order. Each step consumes what the previous ones produced.
    pub const PIPELINE: [Self; 4] = [
        Self::CreateProject,
        Self::StoreApiKey,
        Self::CreateIssuer,
        Self::RegisterCard,
    ];

    #[must_use]
    pub const fn policy(self) -> FailurePolicy {
        match self {
            // a paid-for project must not be orphaned because the key
            // could not be saved
            Self::StoreApiKey => FailurePolicy::ContinueAndLog,
            Self::CreateProject | Self::CreateIssuer | Self::RegisterCard => FailurePolicy::Abort,
        }
    }

    /// Reported when the service gives no `message` of its own.
    #[must_use]
    pub const fn failure_message(self) -> &'static str {
        match self {
            Self::CreateProject => "Error creating project",
            Self::StoreApiKey => "Error storing api key",
            Self::CreateIssuer => "Error creating issuer",
            Self::RegisterCard => "Error generating pass",
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::CreateProject => "create-project",
            Self::StoreApiKey => "store-api-key",
            Self::CreateIssuer => "create-issuer",
            Self::RegisterCard => "register-card",
        }
    }
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum StepStatus {
    Completed,
    /// Nothing to do, e.g. no api key was issued.
    Skipped,
    /// Failed under [`FailurePolicy::ContinueAndLog`].
    Failed(String),
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct StepReport {
    pub step: Step,
    pub status: StepStatus,
}
