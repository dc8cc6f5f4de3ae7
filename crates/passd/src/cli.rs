use camino::Utf8PathBuf;
use clap::{Parser, Subcommand};
use const_format::concatcp;
use eyre::Result as EyreResult;

use crate::defaults;

mod init;
mod run;

use init::InitCommand;
use run::RunCommand;

pub const EXAMPLES: &str = r"
  # Initialize the service against a wallet-pass service
  $ passd --home data/ init --wallet-pass-url https://wallet-pass.example.com/api/v1

  # Also build Apple passes locally
  $ passd --home data/ init --wallet-pass-url https://wallet-pass.example.com/api/v1 --pkpass-assets assets/

  # Run the service
  $ passd --home data/ run
";

#[derive(Debug, Parser)]
#[command(author, version, about, long_about = None)]
#[command(after_help = concatcp!(
    "Environment variables:\n",
    "  LOYALTY_HOME       Directory for config and data\n",
    "  PORT               Port to listen on\n",
    "  ROOT_URL           Public URL of this service\n",
    "  WALLET_PASS_URL    Wallet-pass service URL\n",
    "  X_STL_KEY          Wallet-pass service API key\n",
    "  BEARER_TOKEN       Wallet-pass service bearer token\n",
    "  APPLE_*            Pass signing material\n\n",
    "Examples:",
    EXAMPLES
))]
pub struct RootCommand {
    #[command(flatten)]
    pub args: RootArgs,

    #[command(subcommand)]
    pub action: SubCommands,
}

#[derive(Debug, Subcommand)]
pub enum SubCommands {
    Init(InitCommand),
    #[command(alias = "up")]
    Run(RunCommand),
}

#[derive(Debug, Parser)]
pub struct RootArgs {
    /// Directory for config and data
    #[arg(long, value_name = "PATH", default_value_t = defaults::default_home_dir())]
    #[arg(env = "LOYALTY_HOME", hide_env_values = true)]
    pub home: Utf8PathBuf,
}

impl RootCommand {
    pub async fn run(self) -> EyreResult<()> {
        match self.action {
            SubCommands::Init(init) => init.run(&self.args),
            SubCommands::Run(run) => run.run(&self.args).await,
        }
    }
}
