//! Fixed art every pass carries.

use camino::Utf8Path;
use tokio::fs;

use crate::error::PassError;

/// Icon and logo at 1x/2x/3x.
pub const REQUIRED_ASSETS: [&str; 6] = [
    "icon.png",
    "icon@2x.png",
    "icon@3x.png",
    "logo.png",
    "logo@2x.png",
    "logo@3x.png",
];

/// Copies [`REQUIRED_ASSETS`] from `source` into `bundle_dir`.
///
/// Every asset is checked before anything is copied, so a missing file never
/// leaves a bundle with partial art.
pub async fn copy_assets(source: &Utf8Path, bundle_dir: &Utf8Path) -> Result<(), PassError> {
    for name in REQUIRED_ASSETS {
        let path = source.join(name);
        if !fs::try_exists(&path).await? {
            return Err(PassError::MissingAsset { path });
        }
    }

    for name in REQUIRED_ASSETS {
        let _bytes = fs::copy(source.join(name), bundle_dir.join(name)).await?;
    }

    Ok(())
}
