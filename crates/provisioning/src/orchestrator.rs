use std::sync::Arc;

use loyalty_primitives::merchant::{MerchantProject, ProjectRequest};
use loyalty_store::{ApiKeyStore, Store};
use loyalty_wallet_pass::types::{CreateIssuer, RegisterCard};
use loyalty_wallet_pass::{Object, WalletPass, WalletPassError};
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::error::ProvisioningError;
use crate::step::{FailurePolicy, Step, StepReport, StepStatus};

/// Result of a pipeline that reached its last step.
#[derive(Clone, Debug)]
pub struct Provisioned {
    pub project: Object,
    pub issuer: Object,
    pub card: Object,
    pub api_key_persisted: bool,
    pub steps: Vec<StepReport>,
}

impl Provisioned {
    /// `{success: true, ...issuer, ...card}`; later keys win.
    #[must_use]
    pub fn into_body(self) -> Object {
        let mut body = Object::new();
        drop(body.insert("success".to_owned(), Value::Bool(true)));
        body.extend(self.issuer);
        body.extend(self.card);
        body
    }
}

#[derive(Debug, Error)]
enum StepError {
    #[error(transparent)]
    Remote(#[from] WalletPassError),
    #[error("store: {0:#}")]
    Store(eyre::Report),
}

impl StepError {
    fn into_provisioning_error(self, step: Step, completed: Vec<Step>) -> ProvisioningError {
        match self {
            Self::Remote(WalletPassError::Upstream {
                status, message, ..
            }) => ProvisioningError::Rejected {
                step,
                status,
                message: message.unwrap_or_else(|| step.failure_message().to_owned()),
                completed,
            },
            other => ProvisioningError::Internal {
                step,
                reason: other.to_string(),
                completed,
            },
        }
    }
}

#[derive(Default)]
struct Progress {
    project: Object,
    issuer: Object,
    card: Object,
    api_key_persisted: bool,
    steps: Vec<StepReport>,
}

impl Progress {
    fn completed(&self) -> Vec<Step> {
        self.steps
            .iter()
            .filter(|report| report.status == StepStatus::Completed)
            .map(|report| report.step)
            .collect()
    }
}

/// Runs [`Step::PIPELINE`] against the wallet-pass service.
#[derive(Clone)]
pub struct Provisioner {
    wallet_pass: Arc<dyn WalletPass>,
    store: Store,
    card_icon: String,
}

impl Provisioner {
    pub fn new(wallet_pass: Arc<dyn WalletPass>, store: Store, card_icon: String) -> Self {
        Self {
            wallet_pass,
            store,
            card_icon,
        }
    }

    pub async fn provision(&self, request: ProjectRequest) -> Result<Provisioned, ProvisioningError> {
        let project = request.validate()?;

        let mut progress = Progress::default();

        for step in Step::PIPELINE {
            match self.execute(step, &project, &mut progress).await {
                Ok(status) => {
                    debug!(%step, ?status, username = %project.username, "Provisioning step finished");
                    progress.steps.push(StepReport { step, status });
                }
                Err(err) => match step.policy() {
                    FailurePolicy::ContinueAndLog => {
                        warn!(%step, username = %project.username, %err, "Provisioning step failed, continuing");
                        progress.steps.push(StepReport {
                            step,
                            status: StepStatus::Failed(err.to_string()),
                        });
                    }
                    FailurePolicy::Abort => {
                        warn!(%step, username = %project.username, %err, "Provisioning aborted");
                        let completed = progress.completed();
                        return Err(err.into_provisioning_error(step, completed));
                    }
                },
            }
        }

        info!(
            project = %project.project_name,
            username = %project.username,
            api_key_persisted = progress.api_key_persisted,
            "Merchant provisioned"
        );

        Ok(Provisioned {
            project: progress.project,
            issuer: progress.issuer,
            card: progress.card,
            api_key_persisted: progress.api_key_persisted,
            steps: progress.steps,
        })
    }

    async fn execute(
        &self,
        step: Step,
        project: &MerchantProject,
        progress: &mut Progress,
    ) -> Result<StepStatus, StepError> {
        match step {
            Step::CreateProject => {
                progress.project = self.wallet_pass.create_project(&project.project_name).await?;
            }
            Step::StoreApiKey => {
                let Some(api_key) = progress.project.get("apiKey").and_then(Value::as_str) else {
                    return Ok(StepStatus::Skipped);
                };

                self.store
                    .put(&project.username, api_key)
                    .await
                    .map_err(StepError::Store)?;

                progress.api_key_persisted = true;
            }
            Step::CreateIssuer => {
                let request = CreateIssuer {
                    username: project.username.clone(),
                    card_name: project.project_name.clone(),
                    project_id: field(&progress.project, "id"),
                };
                progress.issuer = self.wallet_pass.create_issuer(&request).await?;
            }
            Step::RegisterCard => {
                let request = RegisterCard {
                    card_slug: field(&progress.issuer, "cardSlug"),
                    card_icon: self.card_icon.clone(),
                    card_color: project.card_color.clone(),
                };
                progress.card = self.wallet_pass.register_card(&request).await?;
            }
        }

        Ok(StepStatus::Completed)
    }
}

/// Missing values are forwarded as `null` and left for the service to judge.
fn field(object: &Object, key: &str) -> Value {
    object.get(key).cloned().unwrap_or(Value::Null)
}

impl std::fmt::Debug for Provisioner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Provisioner")
            .field("card_icon", &self.card_icon)
            .finish_non_exhaustive()
    }
}
