//! Shared filesystem locations for booked-hours.
//!
//! Secrets (database URI, service account key) are read from environment
//! variables. To keep them out of shell profiles they can live in an env file
//! under the state directory:
//!
//! ```text
//! ~/.booked-hours/
//! └── .env.local    # MONGO_URI, GOOGLE_PRIVATE_KEY, ...
//! ```
//!
//! # Environment Variables
//!
//! - `BOOKED_HOURS_STATE_DIR`: Override the base state directory

use std::path::{Path, PathBuf};

use tracing::debug;

/// Environment variable for custom state directory.
pub const STATE_DIR_ENV: &str = "BOOKED_HOURS_STATE_DIR";

/// Default state directory name under home.
const DEFAULT_STATE_DIR: &str = ".booked-hours";

/// Name of the env file inside the state directory.
const ENV_FILE_NAME: &str = ".env.local";

/// Get the booked-hours state directory.
///
/// The state directory is determined by:
/// 1. `BOOKED_HOURS_STATE_DIR` environment variable if set
/// 2. `~/.booked-hours` if home directory is available
/// 3. `.booked-hours` in current directory as fallback
pub fn state_dir() -> PathBuf {
    std::env::var(STATE_DIR_ENV)
        .map(PathBuf::from)
        .unwrap_or_else(|_| {
            dirs::home_dir()
                .map(|h| h.join(DEFAULT_STATE_DIR))
                .unwrap_or_else(|| PathBuf::from(DEFAULT_STATE_DIR))
        })
}

/// Get the env file path inside the state directory.
pub fn env_file() -> PathBuf {
    env_file_in(&state_dir())
}

fn env_file_in(dir: &Path) -> PathBuf {
    dir.join(ENV_FILE_NAME)
}

/// Load environment files into the process environment.
///
/// The state-dir env file is loaded first, then `./.env.local` or `./.env`.
/// Variables already set are never overwritten, so the first source wins.
/// Missing files are not an error.
///
/// Returns the files that were loaded.
pub fn load_env_files() -> Vec<PathBuf> {
    let mut loaded = Vec::new();

    let state_env = env_file();
    if state_env.exists() && dotenvy::from_path(&state_env).is_ok() {
        loaded.push(state_env);
    }

    match dotenvy::from_filename(ENV_FILE_NAME).or_else(|_| dotenvy::dotenv()) {
        Ok(path) => loaded.push(path),
        Err(e) => debug!(error = %e, "no local env file loaded"),
    }

    loaded
}
