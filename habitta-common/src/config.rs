//! Configuration loading and root folder resolution
//!
//! The data root folder (holding `habitta.db`) is resolved in priority
//! order:
//! 1. Command-line argument (highest priority)
//! 2. `HABITTA_ROOT_FOLDER` environment variable
//! 3. `HABITTA_ROOT` environment variable
//! 4. `root_folder` key in the platform config file
//! 5. OS-dependent compiled default (fallback)

use std::path::PathBuf;
use tracing::{info, warn};

/// Database file name inside the root folder
pub const DATABASE_FILE_NAME: &str = "habitta.db";

/// Resolves the data root folder for one service
pub struct RootFolderResolver {
    module_name: &'static str,
    cli_override: Option<PathBuf>,
}

impl RootFolderResolver {
    pub fn new(module_name: &'static str) -> Self {
        Self {
            module_name,
            cli_override: None,
        }
    }

    /// Attach a command-line override (highest priority when present)
    pub fn with_cli_override(mut self, path: Option<&str>) -> Self {
        self.cli_override = path.map(PathBuf::from);
        self
    }

    /// Resolve the root folder. Never fails: missing configuration falls
    /// through to the compiled default with a warning.
    pub fn resolve(&self) -> PathBuf {
        if let Some(path) = &self.cli_override {
            info!("{}: root folder from command line: {}", self.module_name, path.display());
            return path.clone();
        }

        if let Ok(path) = std::env::var("HABITTA_ROOT_FOLDER") {
            return PathBuf::from(path);
        }
        if let Ok(path) = std::env::var("HABITTA_ROOT") {
            return PathBuf::from(path);
        }

        if let Some(path) = root_folder_from_config_file() {
            return path;
        }

        let default = default_root_folder();
        warn!(
            "{}: no root folder configured, using default {}",
            self.module_name,
            default.display()
        );
        default
    }
}

/// Prepares a resolved root folder for use
pub struct RootFolderInitializer {
    root_folder: PathBuf,
}

impl RootFolderInitializer {
    pub fn new(root_folder: PathBuf) -> Self {
        Self { root_folder }
    }

    /// Create the root folder (and parents) if missing
    pub fn ensure_directory_exists(&self) -> crate::Result<()> {
        std::fs::create_dir_all(&self.root_folder)?;
        Ok(())
    }

    /// Path of the shared SQLite database inside the root folder
    pub fn database_path(&self) -> PathBuf {
        self.root_folder.join(DATABASE_FILE_NAME)
    }

    pub fn root_folder(&self) -> &PathBuf {
        &self.root_folder
    }
}

/// Read `root_folder` from the platform config file, if one exists
fn root_folder_from_config_file() -> Option<PathBuf> {
    let config_path = dirs::config_dir()?.join("habitta").join("config.toml");
    let content = std::fs::read_to_string(&config_path).ok()?;
    let config: toml::Value = match toml::from_str(&content) {
        Ok(value) => value,
        Err(e) => {
            warn!("Ignoring malformed config file {}: {}", config_path.display(), e);
            return None;
        }
    };
    config
        .get("root_folder")
        .and_then(|v| v.as_str())
        .map(PathBuf::from)
}

/// OS-dependent default root folder path
fn default_root_folder() -> PathBuf {
    if cfg!(target_os = "linux") {
        dirs::data_local_dir()
            .map(|d| d.join("habitta"))
            .unwrap_or_else(|| PathBuf::from("/var/lib/habitta"))
    } else if cfg!(target_os = "macos") {
        dirs::data_dir()
            .map(|d| d.join("habitta"))
            .unwrap_or_else(|| PathBuf::from("/Library/Application Support/habitta"))
    } else if cfg!(target_os = "windows") {
        dirs::data_local_dir()
            .map(|d| d.join("habitta"))
            .unwrap_or_else(|| PathBuf::from("C:\\ProgramData\\habitta"))
    } else {
        PathBuf::from("./habitta_data")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    #[serial]
    fn test_cli_override_wins() {
        std::env::set_var("HABITTA_ROOT_FOLDER", "/tmp/habitta-env");
        let resolver = RootFolderResolver::new("test-module").with_cli_override(Some("/tmp/habitta-cli"));
        assert_eq!(resolver.resolve(), PathBuf::from("/tmp/habitta-cli"));
        std::env::remove_var("HABITTA_ROOT_FOLDER");
    }

    #[test]
    #[serial]
    fn test_env_var_priority() {
        std::env::set_var("HABITTA_ROOT_FOLDER", "/tmp/habitta-priority-1");
        std::env::set_var("HABITTA_ROOT", "/tmp/habitta-priority-2");

        let resolver = RootFolderResolver::new("test-module");
        assert_eq!(resolver.resolve(), PathBuf::from("/tmp/habitta-priority-1"));

        std::env::remove_var("HABITTA_ROOT_FOLDER");
        let resolver = RootFolderResolver::new("test-module");
        assert_eq!(resolver.resolve(), PathBuf::from("/tmp/habitta-priority-2"));
        std::env::remove_var("HABITTA_ROOT");
    }

    #[test]
    #[serial]
    fn test_default_when_nothing_configured() {
        std::env::remove_var("HABITTA_ROOT_FOLDER");
        std::env::remove_var("HABITTA_ROOT");
        let resolver = RootFolderResolver::new("test-module");
        assert!(!resolver.resolve().as_os_str().is_empty());
    }

    #[test]
    fn test_initializer_database_path() {
        let initializer = RootFolderInitializer::new(PathBuf::from("/tmp/habitta-test-root"));
        assert_eq!(
            initializer.database_path(),
            PathBuf::from("/tmp/habitta-test-root/habitta.db")
        );
    }

    #[test]
    fn test_initializer_creates_directory() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("deep").join("root");
        let initializer = RootFolderInitializer::new(nested.clone());
        initializer.ensure_directory_exists().unwrap();
        assert!(nested.is_dir());
    }
}
