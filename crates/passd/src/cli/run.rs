use std::sync::Arc;

use clap::Parser;
use eyre::{bail, Result as EyreResult, WrapErr};
use loyalty_config::ConfigFile;
use loyalty_dispatch::{DispatchConfig, Dispatcher};
use loyalty_pkpass::signing::SigningContext;
use loyalty_pkpass::PassBuilder;
use loyalty_provisioning::Provisioner;
use loyalty_server::config::ServerConfig;
use loyalty_server::notifications::NotificationHub;
use loyalty_server::state::ServiceState;
use loyalty_server::start;
use loyalty_store::Store;
use loyalty_wallet_pass::{HttpWalletPass, WalletPass};
use tracing::{info, warn};

use crate::cli::RootArgs;
use crate::defaults::resolve;

/// Run the service
#[derive(Debug, Parser)]
pub struct RunCommand {
    /// Serve without CORS headers regardless of the configuration
    #[arg(long)]
    pub no_cors: bool,
}

impl RunCommand {
    pub async fn run(self, root_args: &RootArgs) -> EyreResult<()> {
        let home = &root_args.home;

        if !ConfigFile::exists(home) {
            bail!("Service is not initialized in {home:?}");
        }

        let mut config = ConfigFile::load(home)?;
        config.apply_env()?;

        if let Some(path) = config.store.path.as_mut() {
            *path = resolve(home, path);
        }

        let store = Store::open(&config.store).await?;

        let wallet_pass: Arc<dyn WalletPass> = Arc::new(
            HttpWalletPass::new(&config.wallet_pass)
                .wrap_err("failed to set up the wallet-pass client")?,
        );

        let provisioner = Provisioner::new(
            Arc::clone(&wallet_pass),
            store,
            config.wallet_pass.asset_url.clone(),
        );

        let dispatcher = Dispatcher::new(
            Arc::clone(&wallet_pass),
            DispatchConfig::new(
                config.server.root_url.clone(),
                config.wallet_pass.template_id.clone(),
                config.wallet_pass.asset_url.clone(),
            ),
        );

        let passes = match config.pkpass {
            Some(mut pkpass) => {
                pkpass.resolve_paths(home);

                let signing = SigningContext::from_config(&pkpass.certificates)
                    .wrap_err("invalid pass signing configuration")?;

                info!(work_dir = %pkpass.work_dir, "Local pass building enabled");

                Some(PassBuilder::new(pkpass, signing))
            }
            None => {
                warn!("No [pkpass] configuration, local pass building disabled");
                None
            }
        };

        let notifications = NotificationHub::new(config.notifications.retention);

        let state = ServiceState::new(provisioner, dispatcher, wallet_pass, passes, notifications);

        let server = ServerConfig::new(
            config.server.listen,
            config.server.root_url,
            config.server.cors && !self.no_cors,
        );

        start(server, Arc::new(state)).await
    }
}
