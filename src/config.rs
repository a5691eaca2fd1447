use std::ffi::OsString;
use std::path::PathBuf;

/// Environment variable naming the opportunity dataset.
pub const DATA_PATH_ENV: &str = "SALES_DASHBOARD_DATA";

/// Dataset read when neither an argument nor the environment names one.
pub const DEFAULT_DATA_PATH: &str = "paddle_opp_data";

// ---------------------------------------------------------------------------
// Startup configuration
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DashboardConfig {
    pub data_path: PathBuf,
}

impl DashboardConfig {
    /// Resolve from argv, then `SALES_DASHBOARD_DATA` (a `.env` file is
    /// honoured), then the default path.
    pub fn from_env() -> Self {
        match dotenvy::dotenv() {
            Ok(path) => log::debug!("Loaded environment from {}", path.display()),
            Err(e) if e.not_found() => {}
            Err(e) => log::warn!("Ignoring unreadable .env file: {e}"),
        }
        Self::resolve(std::env::args_os().nth(1), std::env::var_os(DATA_PATH_ENV))
    }

    fn resolve(arg: Option<OsString>, env: Option<OsString>) -> Self {
        let data_path = arg
            .filter(|p| !p.is_empty())
            .or(env.filter(|p| !p.is_empty()))
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_DATA_PATH));
        DashboardConfig { data_path }
    }
}
