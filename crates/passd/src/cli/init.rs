use std::fs::create_dir_all;
use std::net::SocketAddr;

use camino::Utf8PathBuf;
use clap::Parser;
use eyre::{bail, Result as EyreResult, WrapErr};
use loyalty_config::{
    ConfigFile, NotificationsConfig, ServerConfig, DEFAULT_LISTEN, DEFAULT_RETENTION,
};
use loyalty_pkpass::config::PkpassConfig;
use loyalty_store::config::StoreConfig;
use loyalty_wallet_pass::config::WalletPassConfig;
use tracing::{info, warn};
use url::Url;

use crate::cli::RootArgs;
use crate::defaults::DEFAULT_ROOT_URL;

const DEFAULT_STORE_FILE: &str = "api-keys.json";
const DEFAULT_WORK_DIR: &str = "passes";

/// Initialize the service configuration
#[derive(Debug, Parser)]
pub struct InitCommand {
    /// Base URL of the wallet-pass service
    #[arg(long, value_name = "URL")]
    pub wallet_pass_url: Url,

    /// Address to listen on
    #[arg(long, value_name = "ADDR", default_value_t = DEFAULT_LISTEN)]
    pub listen: SocketAddr,

    /// Public URL of this service
    #[arg(long, value_name = "URL", default_value = DEFAULT_ROOT_URL)]
    pub root_url: String,

    /// Pass template used when a claim names none
    #[arg(long, value_name = "ID")]
    pub template_id: Option<String>,

    /// Keep API keys in memory instead of a file under the home directory
    #[arg(long)]
    pub memory_store: bool,

    /// Directory with pass art, enables local Apple pass building
    #[arg(long, value_name = "PATH")]
    pub pkpass_assets: Option<Utf8PathBuf>,

    /// Overwrite an existing configuration
    #[arg(long, short)]
    pub force: bool,
}

impl InitCommand {
    pub fn run(self, root_args: &RootArgs) -> EyreResult<()> {
        let home = &root_args.home;

        if ConfigFile::exists(home) {
            if !self.force {
                bail!("Service is already initialized in {home:?}");
            }
            warn!(%home, "Overwriting existing configuration");
        }

        create_dir_all(home).wrap_err_with(|| format!("failed to create directory {home:?}"))?;

        let mut wallet_pass = WalletPassConfig::new(self.wallet_pass_url);
        if let Some(template_id) = self.template_id {
            wallet_pass.template_id = template_id;
        }

        let store = StoreConfig::new((!self.memory_store).then(|| DEFAULT_STORE_FILE.into()));

        let pkpass = self.pkpass_assets.map(|asset_dir| {
            let web_service_url = format!("{}/api/passes/", self.root_url.trim_end_matches('/'));
            PkpassConfig::new(asset_dir, DEFAULT_WORK_DIR.into(), web_service_url)
        });

        let config = ConfigFile::new(
            ServerConfig::new(self.listen, self.root_url),
            wallet_pass,
            pkpass,
            store,
            NotificationsConfig::new(DEFAULT_RETENTION),
        );

        config.save(home)?;

        info!(%home, "Initialized loyalty pass service");

        Ok(())
    }
}
