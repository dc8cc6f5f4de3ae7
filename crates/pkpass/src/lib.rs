//! Local Apple Wallet artifacts.
//!
//! A build copies the fixed art into a fresh bundle directory, writes the
//! pass definition next to it, signs the bundle's manifest and zips the lot
//! into `<serial>.pkpass`. The result is handed out as an [`ArtifactLease`]
//! that removes both the bundle and the artifact when released.

pub mod assets;
pub mod config;
pub mod definition;
mod error;
mod lease;
mod locks;
mod package;
pub mod signing;

use std::sync::Arc;

use camino::Utf8Path;
use loyalty_primitives::claim::INITIAL_POINTS;
use loyalty_primitives::job::ExternalId;
use tokio::fs;
use tracing::{debug, info};

pub use error::PassError;
pub use lease::ArtifactLease;
pub use locks::BuildLocks;

use config::PkpassConfig;
use definition::{PassDefinition, DEFINITION_FILE};
use package::Overrides;
use signing::SigningContext;

pub const CONTENT_TYPE: &str = "application/vnd.apple.pkpass";
pub const CONTENT_DISPOSITION: &str = r#"attachment; filename="card.pkpass""#;

/// Balance shown on a freshly issued card.
pub const DEFAULT_BALANCE: &str = INITIAL_POINTS;

/// Who and what a pass is built for.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct PassRequest {
    pub job: ExternalId,
    pub campaign: String,
    pub balance: String,
}

impl PassRequest {
    #[must_use]
    pub fn new(job: ExternalId, campaign: &str) -> Self {
        Self {
            job,
            campaign: campaign.to_owned(),
            balance: DEFAULT_BALANCE.to_owned(),
        }
    }
}

#[derive(Clone, Debug)]
pub struct PassBuilder {
    config: Arc<PkpassConfig>,
    signing: Arc<SigningContext>,
    locks: BuildLocks,
}

impl PassBuilder {
    #[must_use]
    pub fn new(config: PkpassConfig, signing: SigningContext) -> Self {
        Self {
            config: Arc::new(config),
            signing: Arc::new(signing),
            locks: BuildLocks::default(),
        }
    }

    #[must_use]
    pub fn config(&self) -> &PkpassConfig {
        &self.config
    }

    /// Token wallets must present to fetch updates.
    #[must_use]
    pub fn auth_token(&self) -> &str {
        self.signing.auth_token()
    }

    /// Builds and signs the pass for `request`.
    ///
    /// Builds for the same job are serialized: the returned lease holds the
    /// job's lock until it is released, so a re-claim cannot overwrite an
    /// artifact that is still being served.
    pub async fn build(&self, request: &PassRequest) -> Result<ArtifactLease, PassError> {
        let guard = self.locks.acquire(&request.job).await;

        let serial_number = request.job.to_string();
        let bundle_dir = self.config.work_dir.join(format!("{serial_number}.pass"));
        let artifact = self.config.work_dir.join(format!("{serial_number}.pkpass"));

        // Leftovers from a crashed build; nobody else holds this job's lock.
        remove_stale(&bundle_dir, &artifact).await?;
        fs::create_dir_all(&bundle_dir).await?;

        // From here on, dropping the lease removes whatever was written.
        let lease = ArtifactLease::new(artifact, bundle_dir, guard);

        if let Err(err) = self.populate(&lease, request, &serial_number).await {
            lease.close().await;
            return Err(err);
        }

        info!(%serial_number, campaign = %request.campaign, "Pass signed");

        Ok(lease)
    }

    async fn populate(
        &self,
        lease: &ArtifactLease,
        request: &PassRequest,
        serial_number: &str,
    ) -> Result<(), PassError> {
        assets::copy_assets(&self.config.asset_dir, lease.bundle_dir()).await?;
        debug!(%serial_number, "Copied pass assets");

        let definition = PassDefinition::for_request(&self.config, &self.signing, request);
        let json = serde_json::to_vec_pretty(&definition)?;
        fs::write(lease.bundle_dir().join(DEFINITION_FILE), json).await?;

        let overrides = Overrides::new(serial_number.to_owned());
        let signing = Arc::clone(&self.signing);
        let bundle_dir = lease.bundle_dir().to_owned();
        let artifact = lease.path().to_owned();

        tokio::task::spawn_blocking(move || {
            package::package(&bundle_dir, &overrides, &signing, &artifact)
        })
        .await??;

        Ok(())
    }
}

async fn remove_stale(bundle_dir: &Utf8Path, artifact: &Utf8Path) -> Result<(), PassError> {
    match fs::remove_dir_all(bundle_dir).await {
        Ok(()) => debug!(%bundle_dir, "Removed stale bundle"),
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {}
        Err(err) => return Err(err.into()),
    }
    match fs::remove_file(artifact).await {
        Ok(()) => debug!(%artifact, "Removed stale artifact"),
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {}
        Err(err) => return Err(err.into()),
    }
    Ok(())
}
