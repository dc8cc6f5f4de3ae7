use camino::{Utf8Path, Utf8PathBuf};
use serde::{Deserialize, Serialize};

pub const DEFAULT_PASS_TYPE_IDENTIFIER: &str = "pass.com.stl-example.coffee-loyalty-1";
pub const DEFAULT_TEAM_IDENTIFIER: &str = "LRAW5PL536";
pub const DEFAULT_BACKGROUND_COLOR: &str = "rgb(225, 173, 1)";

#[derive(Clone, Debug, Deserialize, Serialize)]
#[non_exhaustive]
pub struct PkpassConfig {
    /// Holds the art listed in [`crate::assets::REQUIRED_ASSETS`].
    pub asset_dir: Utf8PathBuf,

    /// Scratch space for bundles and artifacts.
    pub work_dir: Utf8PathBuf,

    #[serde(default = "default_pass_type_identifier")]
    pub pass_type_identifier: String,

    #[serde(default = "default_team_identifier")]
    pub team_identifier: String,

    /// Where wallets fetch pass updates, i.e. this service's `/api/passes/`.
    pub web_service_url: String,

    #[serde(default = "default_background_color")]
    pub background_color: String,

    #[serde(default)]
    pub certificates: CertificateConfig,
}

impl PkpassConfig {
    #[must_use]
    pub fn new(asset_dir: Utf8PathBuf, work_dir: Utf8PathBuf, web_service_url: String) -> Self {
        Self {
            asset_dir,
            work_dir,
            pass_type_identifier: default_pass_type_identifier(),
            team_identifier: default_team_identifier(),
            web_service_url,
            background_color: default_background_color(),
            certificates: CertificateConfig::default(),
        }
    }

    /// Anchors every relative path, certificate files included, at `base`.
    pub fn resolve_paths(&mut self, base: &Utf8Path) {
        resolve(base, &mut self.asset_dir);
        resolve(base, &mut self.work_dir);

        let certificates = &mut self.certificates;
        for source in [
            &mut certificates.wwdr,
            &mut certificates.signer_cert,
            &mut certificates.signer_key,
        ] {
            if let Some(PemSource::Path(path)) = source {
                resolve(base, path);
            }
        }
    }
}

fn resolve(base: &Utf8Path, path: &mut Utf8PathBuf) {
    if path.is_relative() {
        *path = base.join(&*path);
    }
}

/// Signing material. Every entry is required to build a pass; absence is
/// reported when the signing context is created.
#[derive(Clone, Debug, Default, Deserialize, Serialize)]
#[non_exhaustive]
pub struct CertificateConfig {
    /// Apple WWDR intermediate certificate.
    pub wwdr: Option<PemSource>,
    pub signer_cert: Option<PemSource>,
    pub signer_key: Option<PemSource>,
    pub signer_key_passphrase: Option<String>,
    /// Token wallets present when asking for pass updates.
    pub auth_token: Option<String>,
}

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PemSource {
    Path(Utf8PathBuf),
    Inline(String),
}

fn default_pass_type_identifier() -> String {
    DEFAULT_PASS_TYPE_IDENTIFIER.to_owned()
}

fn default_team_identifier() -> String {
    DEFAULT_TEAM_IDENTIFIER.to_owned()
}

fn default_background_color() -> String {
    DEFAULT_BACKGROUND_COLOR.to_owned()
}
