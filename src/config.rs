use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{GalleryError, Result};
use crate::gallery::DEFAULT_STORAGE_KEY;
use crate::types::RuntimeEnvironment;

pub const ENV_DATA_DIR: &str = "PHOTO_GALLERY_DATA_DIR";
pub const ENV_STORE_FILE: &str = "PHOTO_GALLERY_STORE_FILE";
pub const ENV_STORAGE_KEY: &str = "PHOTO_GALLERY_STORAGE_KEY";
pub const ENV_ENVIRONMENT: &str = "PHOTO_GALLERY_ENVIRONMENT";

/// Settings for a gallery backed by local providers.
///
/// Resolution order: defaults, then the JSON config file, then
/// `PHOTO_GALLERY_*` environment variables.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "snake_case")]
pub struct GalleryConfig {
    /// Root folder; photo files land in its `data` subfolder.
    pub data_dir: PathBuf,
    /// Key-value store file. Defaults to `<data_dir>/preferences.json`.
    pub store_file: Option<PathBuf>,
    pub storage_key: String,
    pub environment: RuntimeEnvironment,
}

impl Default for GalleryConfig {
    fn default() -> Self {
        Self {
            data_dir: std::env::temp_dir().join("photo-gallery"),
            store_file: None,
            storage_key: DEFAULT_STORAGE_KEY.to_string(),
            environment: RuntimeEnvironment::Hybrid,
        }
    }
}

impl GalleryConfig {
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        config.apply_overrides(|name| std::env::var(name).ok())?;
        config.validate()?;
        log::debug!("Resolved gallery config: {:?}", config);
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| {
            GalleryError::Config(format!("Failed to read {}: {}", path.display(), e))
        })?;
        serde_json::from_str(&contents).map_err(|e| {
            GalleryError::Config(format!("Failed to parse {}: {}", path.display(), e))
        })
    }

    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(dir) = lookup(ENV_DATA_DIR) {
            self.data_dir = PathBuf::from(dir);
        }
        if let Some(file) = lookup(ENV_STORE_FILE) {
            self.store_file = Some(PathBuf::from(file));
        }
        if let Some(key) = lookup(ENV_STORAGE_KEY) {
            self.storage_key = key;
        }
        if let Some(env) = lookup(ENV_ENVIRONMENT) {
            self.environment = env
                .parse()
                .map_err(|e: String| GalleryError::Config(format!("{}: {}", ENV_ENVIRONMENT, e)))?;
        }
        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        if self.storage_key.trim().is_empty() {
            return Err(GalleryError::Config("storage_key must not be empty".to_string()));
        }
        if self.data_dir.as_os_str().is_empty() {
            return Err(GalleryError::Config("data_dir must not be empty".to_string()));
        }
        Ok(())
    }

    pub fn store_path(&self) -> PathBuf {
        self.store_file
            .clone()
            .unwrap_or_else(|| self.data_dir.join("preferences.json"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn defaults_use_photos_key() {
        let config = GalleryConfig::default();
        assert_eq!(config.storage_key, "photos");
        assert_eq!(config.store_path(), config.data_dir.join("preferences.json"));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn partial_file_keeps_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("gallery.json");
        std::fs::write(&path, r#"{"environment": "browser", "storage_key": "shots"}"#).unwrap();

        let config = GalleryConfig::from_file(&path).unwrap();

        assert_eq!(config.environment, RuntimeEnvironment::Browser);
        assert_eq!(config.storage_key, "shots");
        assert_eq!(config.data_dir, GalleryConfig::default().data_dir);
    }

    #[test]
    fn environment_variables_override_file_values() {
        let vars: HashMap<&str, &str> = [
            (ENV_DATA_DIR, "/srv/gallery"),
            (ENV_ENVIRONMENT, "web"),
        ]
        .into_iter()
        .collect();
        let mut config = GalleryConfig::default();

        config
            .apply_overrides(|name| vars.get(name).map(|v| v.to_string()))
            .unwrap();

        assert_eq!(config.data_dir, PathBuf::from("/srv/gallery"));
        assert_eq!(config.environment, RuntimeEnvironment::Browser);
        assert_eq!(config.store_path(), PathBuf::from("/srv/gallery/preferences.json"));
    }

    #[test]
    fn unknown_environment_is_a_config_error() {
        let mut config = GalleryConfig::default();
        let err = config
            .apply_overrides(|name| (name == ENV_ENVIRONMENT).then(|| "tablet".to_string()))
            .unwrap_err();
        assert!(matches!(err, GalleryError::Config(_)));
    }

    #[test]
    fn empty_storage_key_is_rejected() {
        let config = GalleryConfig {
            storage_key: "  ".to_string(),
            ..GalleryConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn malformed_file_is_a_config_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("gallery.json");
        std::fs::write(&path, "not json").unwrap();
        assert!(matches!(
            GalleryConfig::from_file(&path),
            Err(GalleryError::Config(_))
        ));
    }
}
