use camino::{Utf8Path, Utf8PathBuf};
use dirs::home_dir;

pub const DEFAULT_LOYALTY_HOME: &str = ".loyalty";
pub const DEFAULT_ROOT_URL: &str = "http://localhost:2528";

pub fn default_home_dir() -> Utf8PathBuf {
    if let Some(home) = home_dir() {
        if let Some(home) = Utf8Path::from_path(&home) {
            return home.join(DEFAULT_LOYALTY_HOME);
        }
    }

    Utf8PathBuf::from(DEFAULT_LOYALTY_HOME)
}

/// Resolves `path` against the service home when it is relative.
pub fn resolve(home: &Utf8Path, path: &Utf8Path) -> Utf8PathBuf {
    if path.is_relative() {
        home.join(path)
    } else {
        path.to_owned()
    }
}
