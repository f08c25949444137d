// src/infra/paths.rs — Config and data path management
//
// All paths respect the TICKETPILOT_HOME environment variable for isolation.
// When TICKETPILOT_HOME is set, config and data live under that directory.
// When unset, config uses ~/.ticketpilot/ and data uses XDG_DATA_HOME/ticketpilot.

use directories::{BaseDirs, ProjectDirs};
use std::path::PathBuf;

/// Returns the TICKETPILOT_HOME override, if set.
fn ticketpilot_home() -> Option<PathBuf> {
    std::env::var_os("TICKETPILOT_HOME").map(PathBuf::from)
}

/// Home directory, or the working directory when no home can be determined.
pub fn dirs_home() -> PathBuf {
    BaseDirs::new()
        .map(|b| b.home_dir().to_path_buf())
        .unwrap_or_else(|| PathBuf::from("."))
}

/// Configuration directory: $TICKETPILOT_HOME/ or ~/.ticketpilot/
pub fn config_dir() -> PathBuf {
    if let Some(home) = ticketpilot_home() {
        return home;
    }
    dirs_home().join(".ticketpilot")
}

/// Data directory: $TICKETPILOT_HOME/data/ or ~/.local/share/ticketpilot/
pub fn data_dir() -> PathBuf {
    if let Some(home) = ticketpilot_home() {
        return home.join("data");
    }
    ProjectDirs::from("", "", "ticketpilot")
        .map(|p| p.data_local_dir().to_path_buf())
        .unwrap_or_else(|| config_dir().join("data"))
}

/// Database path
pub fn db_path() -> PathBuf {
    data_dir().join("ticketpilot.db")
}

/// Config file path
pub fn config_file_path() -> PathBuf {
    config_dir().join("config.toml")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_db_path_under_data_dir() {
        let db = db_path();
        assert!(db.starts_with(data_dir()));
        assert_eq!(db.file_name().unwrap(), "ticketpilot.db");
    }

    #[test]
    fn test_config_file_name() {
        assert_eq!(config_file_path().file_name().unwrap(), "config.toml");
    }
}
