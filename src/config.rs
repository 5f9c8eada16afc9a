//! Configuration file support for the storefront.
//!
//! Feed location, catalog tunables, viewer tunables and shopper preferences.
//! Persisted as JSON in the config directory (native) or localStorage (WASM).

use serde::{Deserialize, Serialize};
use storefront_viewer::ViewerSettings;

use crate::catalog::ViewMode;
use crate::constants;

/// Log level setting for the application.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    /// Show only errors
    Error,
    /// Show errors and warnings
    Warn,
    /// Show errors, warnings, and info messages
    #[default]
    Info,
    /// Show debug-level logging
    Debug,
    /// Show all log messages including trace
    Trace,
}

impl LogLevel {
    /// Convert to log crate's LevelFilter.
    pub fn to_level_filter(&self) -> log::LevelFilter {
        match self {
            LogLevel::Error => log::LevelFilter::Error,
            LogLevel::Warn => log::LevelFilter::Warn,
            LogLevel::Info => log::LevelFilter::Info,
            LogLevel::Debug => log::LevelFilter::Debug,
            LogLevel::Trace => log::LevelFilter::Trace,
        }
    }

    /// Convert to log crate's Level (for loggers that take a max level).
    pub fn to_level(&self) -> log::Level {
        match self {
            LogLevel::Error => log::Level::Error,
            LogLevel::Warn => log::Level::Warn,
            LogLevel::Info => log::Level::Info,
            LogLevel::Debug => log::Level::Debug,
            LogLevel::Trace => log::Level::Trace,
        }
    }
}

/// Color theme.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

impl Theme {
    /// The other theme.
    pub fn toggled(self) -> Self {
        match self {
            Theme::Light => Theme::Dark,
            Theme::Dark => Theme::Light,
        }
    }

    /// Value for the document's `data-theme` attribute.
    pub fn as_str(self) -> &'static str {
        match self {
            Theme::Light => "light",
            Theme::Dark => "dark",
        }
    }
}

/// Current configuration file format version.
/// Increment this when making breaking changes to the config format.
pub const CONFIG_VERSION: u32 = 1;

/// Application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Version of the configuration file format
    pub version: u32,

    /// Application name (for identification)
    #[serde(default = "default_app_name")]
    pub app_name: String,

    /// Where the product feed and its images live
    #[serde(default)]
    pub feed: FeedConfig,

    /// Catalog paging, debouncing and pricing
    #[serde(default)]
    pub catalog: CatalogSettings,

    /// Image viewer tunables
    #[serde(default)]
    pub viewer: ViewerSettings,

    /// Shopper preferences
    #[serde(default)]
    pub preferences: UserPreferences,
}

fn default_app_name() -> String {
    "Storefront".to_string()
}

/// Product feed location.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FeedConfig {
    /// URL (WASM) or path (native) of the JSON feed
    pub json_file: String,
    /// Base path prepended to image filenames from the feed
    pub images_folder: String,
    /// Placeholder image filename, relative to `images_folder`
    pub placeholder_image: String,
}

impl FeedConfig {
    /// Full path of the placeholder image.
    pub fn placeholder_path(&self) -> String {
        format!("{}{}", self.images_folder, self.placeholder_image)
    }

    /// Full path of a feed image filename.
    pub fn image_path(&self, name: &str) -> String {
        format!("{}{}", self.images_folder, name)
    }
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            json_file: constants::DEFAULT_FEED_FILE.to_string(),
            images_folder: constants::DEFAULT_IMAGES_FOLDER.to_string(),
            placeholder_image: constants::DEFAULT_PLACEHOLDER_IMAGE.to_string(),
        }
    }
}

/// Catalog engine tunables.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CatalogSettings {
    /// Products per page (at least 1)
    pub products_per_page: usize,
    /// Quiet interval before a typed search is applied
    pub search_debounce_ms: u64,
    /// Price-range ceiling when the catalog is empty
    pub default_max_price: u32,
    /// Currency label for displayed amounts
    pub currency: String,
}

impl CatalogSettings {
    /// Page size, never zero.
    pub fn page_size(&self) -> usize {
        self.products_per_page.max(1)
    }
}

impl Default for CatalogSettings {
    fn default() -> Self {
        Self {
            products_per_page: constants::PRODUCTS_PER_PAGE,
            search_debounce_ms: constants::SEARCH_DEBOUNCE_MS,
            default_max_price: constants::DEFAULT_MAX_PRICE,
            currency: constants::DEFAULT_CURRENCY.to_string(),
        }
    }
}

/// User preferences section of the config.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UserPreferences {
    /// Color theme
    #[serde(default)]
    pub theme: Theme,

    /// Grid or list product layout
    #[serde(default)]
    pub view_mode: ViewMode,

    /// Log verbosity level
    #[serde(default)]
    pub log_level: LogLevel,
}

impl AppConfig {
    /// Create a new configuration with default values.
    pub fn new() -> Self {
        Self {
            version: CONFIG_VERSION,
            app_name: default_app_name(),
            feed: FeedConfig::default(),
            catalog: CatalogSettings::default(),
            viewer: ViewerSettings::default(),
            preferences: UserPreferences::default(),
        }
    }

    /// Serialize the configuration to JSON.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Deserialize configuration from JSON.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let mut config: Self = serde_json::from_str(json)?;

        // Validate version compatibility
        if config.version > CONFIG_VERSION {
            return Err(ConfigError::VersionTooNew {
                file_version: config.version,
                supported_version: CONFIG_VERSION,
            });
        }

        config.viewer = config.viewer.sanitized();
        Ok(config)
    }

    /// Get the default filename for the config file.
    pub fn default_filename() -> &'static str {
        "storefront-config.json"
    }

    /// Directory holding the config file and the native cart file.
    /// Returns None on WASM (no filesystem access).
    #[cfg(not(target_arch = "wasm32"))]
    pub fn config_dir() -> Option<std::path::PathBuf> {
        // Try to use XDG config directory, fall back to home directory
        if let Some(config_dir) = dirs::config_dir() {
            Some(config_dir.join("storefront"))
        } else {
            dirs::home_dir().map(|home_dir| home_dir.join(".config").join("storefront"))
        }
    }

    /// Get the default config file path for auto-load/save.
    #[cfg(not(target_arch = "wasm32"))]
    pub fn default_path() -> Option<std::path::PathBuf> {
        Self::config_dir().map(|dir| dir.join(Self::default_filename()))
    }

    /// Try to load configuration from the default path.
    /// Returns None if the file doesn't exist or can't be read.
    #[cfg(not(target_arch = "wasm32"))]
    pub fn load_from_default_path() -> Option<Self> {
        let path = Self::default_path()?;
        if !path.exists() {
            log::debug!("No config file found at {:?}", path);
            return None;
        }

        match std::fs::read_to_string(&path) {
            Ok(json) => match Self::from_json(&json) {
                Ok(config) => {
                    log::info!("Loaded configuration from {:?}", path);
                    Some(config)
                }
                Err(e) => {
                    log::warn!("Failed to parse config file {:?}: {}", path, e);
                    None
                }
            },
            Err(e) => {
                log::warn!("Failed to read config file {:?}: {}", path, e);
                None
            }
        }
    }

    /// Save configuration to the default path.
    #[cfg(not(target_arch = "wasm32"))]
    pub fn save_to_default_path(&self) -> Result<(), ConfigError> {
        let path = Self::default_path().ok_or_else(|| {
            ConfigError::IoError(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                "Could not determine config directory",
            ))
        })?;

        // Create parent directories if needed
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let json = self.to_json()?;
        std::fs::write(&path, json)?;
        log::info!("Saved configuration to {:?}", path);
        Ok(())
    }

    /// LocalStorage key for WASM config persistence.
    #[cfg(target_arch = "wasm32")]
    const LOCALSTORAGE_KEY: &'static str = "storefront-config";

    /// Try to load configuration from localStorage (WASM only).
    /// Returns None if not found or can't be parsed.
    #[cfg(target_arch = "wasm32")]
    pub fn load_from_local_storage() -> Option<Self> {
        let window = web_sys::window()?;
        let storage = window.local_storage().ok()??;

        match storage.get_item(Self::LOCALSTORAGE_KEY) {
            Ok(Some(json)) => match Self::from_json(&json) {
                Ok(config) => {
                    log::info!("Loaded configuration from localStorage");
                    Some(config)
                }
                Err(e) => {
                    log::warn!("Failed to parse config from localStorage: {}", e);
                    None
                }
            },
            Ok(None) => {
                log::debug!("No config found in localStorage");
                None
            }
            Err(e) => {
                log::warn!("Failed to read from localStorage: {:?}", e);
                None
            }
        }
    }

    /// Save configuration to localStorage (WASM only).
    #[cfg(target_arch = "wasm32")]
    pub fn save_to_local_storage(&self) -> Result<(), ConfigError> {
        let window = web_sys::window()
            .ok_or_else(|| ConfigError::StorageError("No window object available".to_string()))?;

        let storage = window
            .local_storage()
            .map_err(|e| ConfigError::StorageError(format!("localStorage access error: {:?}", e)))?
            .ok_or_else(|| ConfigError::StorageError("localStorage not available".to_string()))?;

        let json = self.to_json()?;

        storage
            .set_item(Self::LOCALSTORAGE_KEY, &json)
            .map_err(|e| {
                ConfigError::StorageError(format!("Failed to save to localStorage: {:?}", e))
            })?;

        log::info!("Saved configuration to localStorage");
        Ok(())
    }

    /// Load from the platform store, falling back to defaults.
    pub fn load_or_default() -> Self {
        #[cfg(target_arch = "wasm32")]
        let loaded = Self::load_from_local_storage();
        #[cfg(not(target_arch = "wasm32"))]
        let loaded = Self::load_from_default_path();

        loaded.unwrap_or_default()
    }

    /// Save to the platform store. Failures are logged, not returned.
    pub fn persist(&self) {
        #[cfg(target_arch = "wasm32")]
        let result = self.save_to_local_storage();
        #[cfg(not(target_arch = "wasm32"))]
        let result = self.save_to_default_path();

        if let Err(e) = result {
            log::warn!("Failed to save configuration: {}", e);
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// Errors that can occur when loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// JSON parsing error
    #[error("Failed to parse configuration: {0}")]
    ParseError(#[from] serde_json::Error),

    /// Configuration version is newer than supported
    #[error(
        "Configuration file version {file_version} is newer than supported version {supported_version}"
    )]
    VersionTooNew {
        file_version: u32,
        supported_version: u32,
    },

    /// I/O error when reading/writing config
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// Storage error (localStorage in WASM)
    #[error("Storage error: {0}")]
    StorageError(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = AppConfig::new();
        assert_eq!(config.catalog.products_per_page, 12);
        assert_eq!(config.catalog.search_debounce_ms, 300);
        assert_eq!(config.feed.placeholder_path(), "./imagenes_descargadas/placeholder.jpg");
        assert_eq!(config.viewer.max_scale, 4.0);
    }

    #[test]
    fn test_json_roundtrip_preserves_preferences() {
        let mut config = AppConfig::new();
        config.preferences.theme = Theme::Dark;
        config.preferences.view_mode = ViewMode::List;

        let json = config.to_json().unwrap();
        let loaded = AppConfig::from_json(&json).unwrap();
        assert_eq!(loaded.preferences, config.preferences);
    }

    #[test]
    fn test_partial_json_fills_defaults() {
        let config = AppConfig::from_json(r#"{"version": 1, "catalog": {"products_per_page": 24}}"#)
            .unwrap();
        assert_eq!(config.catalog.products_per_page, 24);
        assert_eq!(config.catalog.search_debounce_ms, 300);
        assert_eq!(config.feed, FeedConfig::default());
        assert_eq!(config.app_name, "Storefront");
    }

    #[test]
    fn test_invalid_viewer_settings_fall_back() {
        let config = AppConfig::from_json(
            r#"{"version": 1, "viewer": {"min_scale": 5.0, "buffer_ratio": -1.0}}"#,
        )
        .unwrap();
        assert_eq!(config.viewer.min_scale, 1.0);
        assert_eq!(config.viewer.max_scale, 4.0);
        assert!(config.viewer.buffer_ratio >= 0.0);

        let mut viewer = storefront_viewer::ZoomViewer::new(config.viewer);
        viewer.open(
            storefront_viewer::Size::square(500.0),
            storefront_viewer::Size::square(500.0),
        );
        viewer.set_zoom(0.5);
        assert!(viewer.start_drag(0.0, 0.0));
        assert!(viewer.perform_drag(400.0, 0.0).is_some());
    }

    #[test]
    fn test_rejects_newer_version() {
        let err = AppConfig::from_json(r#"{"version": 99}"#).unwrap_err();
        assert!(matches!(
            err,
            ConfigError::VersionTooNew {
                file_version: 99,
                ..
            }
        ));
    }

    #[test]
    fn test_page_size_never_zero() {
        let settings = CatalogSettings {
            products_per_page: 0,
            ..CatalogSettings::default()
        };
        assert_eq!(settings.page_size(), 1);
    }

    #[test]
    fn test_theme_toggle() {
        assert_eq!(Theme::Light.toggled(), Theme::Dark);
        assert_eq!(Theme::Dark.toggled().as_str(), "light");
    }
}
