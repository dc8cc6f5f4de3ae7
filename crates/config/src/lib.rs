use core::time::Duration;
use std::fs::{read_to_string, write};
use std::net::{IpAddr, Ipv4Addr, SocketAddr};

use camino::Utf8Path;
use eyre::{Result as EyreResult, WrapErr};
use loyalty_pkpass::config::{PemSource, PkpassConfig};
use loyalty_store::config::StoreConfig;
use loyalty_wallet_pass::config::WalletPassConfig;
use serde::{Deserialize, Serialize};

pub const CONFIG_FILE: &str = "config.toml";

pub const DEFAULT_PORT: u16 = 2528;
pub const DEFAULT_LISTEN: SocketAddr = SocketAddr::new(IpAddr::V4(Ipv4Addr::UNSPECIFIED), DEFAULT_PORT);
pub const DEFAULT_RETENTION: Duration = Duration::from_secs(60);

#[derive(Debug, Deserialize, Serialize)]
#[non_exhaustive]
pub struct ConfigFile {
    pub server: ServerConfig,

    pub wallet_pass: WalletPassConfig,

    /// Local artifact building; `/api/passes` is not served without it.
    #[serde(default)]
    pub pkpass: Option<PkpassConfig>,

    #[serde(default)]
    pub store: StoreConfig,

    #[serde(default)]
    pub notifications: NotificationsConfig,
}

#[derive(Debug, Deserialize, Serialize)]
#[non_exhaustive]
pub struct ServerConfig {
    pub listen: SocketAddr,

    /// Public URL of the service, used in callback URLs and pass links.
    pub root_url: String,

    #[serde(default = "default_cors")]
    pub cors: bool,
}

impl ServerConfig {
    #[must_use]
    pub const fn new(listen: SocketAddr, root_url: String) -> Self {
        Self {
            listen,
            root_url,
            cors: true,
        }
    }
}

#[derive(Copy, Clone, Debug, Deserialize, Serialize)]
#[non_exhaustive]
pub struct NotificationsConfig {
    /// How long a delivered event is replayed to late subscribers.
    #[serde(rename = "retention_ms", with = "serde_duration")]
    pub retention: Duration,
}

impl NotificationsConfig {
    #[must_use]
    pub const fn new(retention: Duration) -> Self {
        Self { retention }
    }
}

impl Default for NotificationsConfig {
    fn default() -> Self {
        Self::new(DEFAULT_RETENTION)
    }
}

const fn default_cors() -> bool {
    true
}

impl ConfigFile {
    #[must_use]
    pub const fn new(
        server: ServerConfig,
        wallet_pass: WalletPassConfig,
        pkpass: Option<PkpassConfig>,
        store: StoreConfig,
        notifications: NotificationsConfig,
    ) -> Self {
        Self {
            server,
            wallet_pass,
            pkpass,
            store,
            notifications,
        }
    }

    #[must_use]
    pub fn exists(dir: &Utf8Path) -> bool {
        dir.join(CONFIG_FILE).is_file()
    }

    pub fn load(dir: &Utf8Path) -> EyreResult<Self> {
        let path = dir.join(CONFIG_FILE);
        let content = read_to_string(&path)
            .wrap_err_with(|| format!("failed to read configuration from {path:?}"))?;

        toml::from_str(&content).map_err(Into::into)
    }

    pub fn save(&self, dir: &Utf8Path) -> EyreResult<()> {
        let path = dir.join(CONFIG_FILE);
        let content = toml::to_string_pretty(self)?;

        write(&path, content)
            .wrap_err_with(|| format!("failed to write configuration to {path:?}"))?;

        Ok(())
    }

    /// Applies overrides from the process environment.
    pub fn apply_env(&mut self) -> EyreResult<()> {
        self.apply_overrides(|name| std::env::var(name).ok())
    }

    /// Applies overrides looked up by environment variable name. Secrets
    /// usually arrive this way rather than through the file.
    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) -> EyreResult<()> {
        if let Some(port) = lookup("PORT") {
            let port = port
                .parse()
                .wrap_err_with(|| format!("invalid PORT {port:?}"))?;
            self.server.listen.set_port(port);
        }

        if let Some(root_url) = lookup("ROOT_URL") {
            self.server.root_url = root_url;
        }

        if let Some(url) = lookup("WALLET_PASS_URL") {
            self.wallet_pass.url = url
                .parse()
                .wrap_err_with(|| format!("invalid WALLET_PASS_URL {url:?}"))?;
        }

        if let Some(api_key) = lookup("X_STL_KEY") {
            self.wallet_pass.api_key = Some(api_key);
        }

        if let Some(bearer_token) = lookup("BEARER_TOKEN") {
            self.wallet_pass.bearer_token = Some(bearer_token);
        }

        if let Some(pkpass) = &mut self.pkpass {
            let certificates = &mut pkpass.certificates;

            if let Some(token) = lookup("APPLE_UID_TOKEN") {
                certificates.auth_token = Some(token);
            }
            if let Some(pem) = lookup("APPLE_WWDR_PEM") {
                certificates.wwdr = Some(PemSource::Inline(pem));
            }
            if let Some(pem) = lookup("APPLE_SIGNER_CERT_PEM") {
                certificates.signer_cert = Some(PemSource::Inline(pem));
            }
            if let Some(pem) = lookup("APPLE_SIGNER_KEY_PEM") {
                certificates.signer_key = Some(PemSource::Inline(pem));
            }
            if let Some(passphrase) = lookup("APPLE_SIGNER_KEY_PASSPHRASE") {
                certificates.signer_key_passphrase = Some(passphrase);
            }
        }

        Ok(())
    }
}

mod serde_duration {
    use core::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_u64(u64::try_from(duration.as_millis()).unwrap_or(u64::MAX))
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        u64::deserialize(deserializer).map(Duration::from_millis)
    }
}
