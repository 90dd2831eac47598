use directories::{BaseDirs, ProjectDirs};
use std::path::PathBuf;
use uuid::Uuid;

/// Profile mode for the application (dev or prod)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Profile {
    Dev,
    Prod,
}

/// Get the configuration directory path for relist
/// If profile is Dev, uses "relist-dev" instead of "relist"
pub fn get_config_dir(profile: Profile) -> Option<PathBuf> {
    let app_name = match profile {
        Profile::Dev => "relist-dev",
        Profile::Prod => "relist",
    };
    // Use "com" as qualifier for better cross-platform compatibility
    ProjectDirs::from("com", "relist", app_name).map(|dirs| dirs.config_dir().to_path_buf())
}

/// Get the data directory path for relist
/// If profile is Dev, uses "relist-dev" instead of "relist"
pub fn get_data_dir(profile: Profile) -> Option<PathBuf> {
    let app_name = match profile {
        Profile::Dev => "relist-dev",
        Profile::Prod => "relist",
    };
    ProjectDirs::from("com", "relist", app_name).map(|dirs| dirs.data_dir().to_path_buf())
}

/// Expand `~` in a path string to the user's home directory
pub fn expand_path(path: &str) -> PathBuf {
    if path.starts_with("~/") {
        if let Some(home) = BaseDirs::new().map(|d| d.home_dir().to_path_buf()) {
            return home.join(&path[2..]);
        }
    }
    PathBuf::from(path)
}

/// Current wall-clock time as epoch milliseconds.
pub fn now_millis() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

/// Generate a fresh opaque entity id (UUID v4, 128 bits of randomness).
///
/// Ids are stored as plain strings: data files written by older versions
/// carry ids in other formats, and the store only ever compares them for
/// equality.
pub fn new_id() -> String {
    Uuid::new_v4().to_string()
}
