//! Configuration file loading

use super::schema::ConfigSchema;
use crate::error::{Error, Result, ResultExt};
use std::path::{Path, PathBuf};

/// Configuration wrapper
#[derive(Debug, Clone)]
pub struct Config {
    /// Parsed settings, defaults when no file was found
    pub schema: ConfigSchema,
    /// File the settings came from
    pub path: Option<PathBuf>,
}

impl Config {
    /// Load configuration from a file path, or search the standard locations
    /// and fall back to defaults
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let config_path = match path {
            Some(p) if !p.exists() => return Err(Error::config_not_found(p)),
            Some(p) => Some(p.to_path_buf()),
            None => find_config_file(Path::new(".")),
        };

        let schema = if let Some(ref p) = config_path {
            load_config_file(p)?
        } else {
            ConfigSchema::default()
        };

        tracing::debug!(path = ?config_path, "configuration loaded");

        Ok(Self {
            schema,
            path: config_path,
        })
    }
}

/// Find configuration file in standard locations under `root`
fn find_config_file(root: &Path) -> Option<PathBuf> {
    let candidates = [".signet.toml", "signet.toml", ".config/signet.toml"];

    candidates
        .iter()
        .map(|candidate| root.join(candidate))
        .find(|path| path.exists())
}

/// Load and parse a TOML configuration file
fn load_config_file(path: &Path) -> Result<ConfigSchema> {
    let content = std::fs::read_to_string(path)
        .map_err(Error::from)
        .context(format!("Failed to read config file {}", path.display()))?;

    let schema: ConfigSchema = toml::from_str(&content)
        .map_err(Error::from)
        .context(format!("Failed to parse config file {}", path.display()))?;

    Ok(schema)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;
    use tempfile::TempDir;

    #[test]
    fn test_no_file_uses_defaults() {
        let dir = TempDir::new().unwrap();
        assert!(find_config_file(dir.path()).is_none());

        let schema = ConfigSchema::default();
        assert_eq!(schema.general.app_module, "app");
        assert_eq!(schema.signing.config_name, "release");
    }

    #[test]
    fn test_explicit_missing_file_is_error() {
        let err = Config::load(Some(Path::new("/definitely/not/here.toml"))).unwrap_err();
        assert_eq!(err.code, ErrorCode::ConfigNotFound);
    }

    #[test]
    fn test_load_explicit_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("signet.toml");
        std::fs::write(&path, "[general]\nandroid_dir = \"platform/android\"\n").unwrap();

        let config = Config::load(Some(&path)).unwrap();
        assert_eq!(config.path.as_deref(), Some(path.as_path()));
        assert_eq!(config.schema.general.android_dir, "platform/android");
    }

    #[test]
    fn test_invalid_toml_is_parse_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("signet.toml");
        std::fs::write(&path, "[general\n").unwrap();

        let err = Config::load(Some(&path)).unwrap_err();
        assert_eq!(err.code, ErrorCode::ConfigParseError);
        assert!(err.context.is_some());
    }

    #[test]
    fn test_find_config_file_order() {
        let dir = TempDir::new().unwrap();
        assert!(find_config_file(dir.path()).is_none());

        std::fs::create_dir(dir.path().join(".config")).unwrap();
        std::fs::write(dir.path().join(".config/signet.toml"), "").unwrap();
        std::fs::write(dir.path().join("signet.toml"), "").unwrap();

        assert_eq!(
            find_config_file(dir.path()),
            Some(dir.path().join("signet.toml"))
        );
    }
}
