use dirs::home_dir;
use std::{
    env, fs,
    path::{Path, PathBuf},
    sync::Once,
};

use crate::errors::Result;

const DEFAULT_DIR_NAME: &str = ".billfold";

static TRACING_INIT: Once = Once::new();

/// Returns the application-specific data directory, defaulting to
/// `~/.billfold`. `BILLFOLD_HOME` overrides it, which the test suites rely
/// on to stay out of the real home directory.
pub fn app_data_dir() -> PathBuf {
    if let Some(custom) = env::var_os("BILLFOLD_HOME") {
        return PathBuf::from(custom);
    }
    home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(DEFAULT_DIR_NAME)
}

pub fn ensure_dir(path: &Path) -> Result<()> {
    if !path.exists() {
        fs::create_dir_all(path)?;
    }
    Ok(())
}

/// Initializes the global tracing subscriber with sensible defaults.
pub fn init_tracing() {
    TRACING_INIT.call_once(|| {
        use tracing_subscriber::{fmt, EnvFilter};

        let filter =
            EnvFilter::from_default_env().add_directive("billfold_core=info".parse().unwrap());

        fmt().with_env_filter(filter).init();
    });
}
