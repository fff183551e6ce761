use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

fn default_latitude() -> f64 {
    33.6938
}
fn default_longitude() -> f64 {
    73.0651
}
fn default_location_name() -> String {
    "Islamabad".to_string()
}
fn default_timings_url() -> String {
    "https://api.aladhan.com/v1".to_string()
}
fn default_geocode_url() -> String {
    "https://nominatim.openstreetmap.org".to_string()
}
fn default_method() -> u8 {
    3 // Muslim World League
}
fn default_school() -> u8 {
    0 // Shafi
}
fn default_timeout_secs() -> u64 {
    10
}
fn default_tick_ms() -> u64 {
    1000
}
fn default_hijri_offset() -> i32 {
    0
}
fn default_true() -> bool {
    true
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LocationConfig {
    /// Shown when reverse geocoding is off or fails
    #[serde(default = "default_location_name")]
    pub name: String,
    #[serde(default = "default_latitude")]
    pub latitude: f64,
    #[serde(default = "default_longitude")]
    pub longitude: f64,
    /// Look the city name up from the coordinates
    #[serde(default = "default_true")]
    pub reverse_geocode: bool,
}

impl Default for LocationConfig {
    fn default() -> Self {
        Self {
            name: default_location_name(),
            latitude: default_latitude(),
            longitude: default_longitude(),
            reverse_geocode: true,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    #[serde(default = "default_timings_url")]
    pub timings_url: String,
    #[serde(default = "default_geocode_url")]
    pub geocode_url: String,
    /// Aladhan calculation method id
    #[serde(default = "default_method")]
    pub method: u8,
    /// 0 = Shafi, 1 = Hanafi (Asr shadow length)
    #[serde(default = "default_school")]
    pub school: u8,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            timings_url: default_timings_url(),
            geocode_url: default_geocode_url(),
            method: default_method(),
            school: default_school(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DisplayConfig {
    /// Countdown refresh interval
    #[serde(default = "default_tick_ms")]
    pub tick_ms: u64,
    /// Days to add/subtract from the locally computed Hijri date.
    /// Only used when the API response carries no Hijri date.
    #[serde(default = "default_hijri_offset")]
    pub hijri_offset: i32,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            tick_ms: default_tick_ms(),
            hijri_offset: default_hijri_offset(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub location: LocationConfig,
    #[serde(default)]
    pub api: ApiConfig,
    #[serde(default)]
    pub display: DisplayConfig,
}

impl AppConfig {
    fn project_dirs() -> Result<ProjectDirs> {
        ProjectDirs::from("", "", "noor")
            .context("Could not determine project directories")
    }

    pub fn config_path() -> Result<PathBuf> {
        let dirs = Self::project_dirs()?;
        Ok(dirs.config_dir().join("config.toml"))
    }

    pub fn data_dir() -> Result<PathBuf> {
        let dirs = Self::project_dirs()?;
        Ok(dirs.data_dir().to_path_buf())
    }

    pub fn db_path() -> Result<PathBuf> {
        Ok(Self::data_dir()?.join("noor.db"))
    }

    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path()?)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content =
            std::fs::read_to_string(path).with_context(|| format!("Reading {:?}", path))?;
        let config: AppConfig = toml::from_str(&content).context("Parsing config.toml")?;
        Ok(config)
    }

    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_path()?)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self).context("Serializing config")?;
        std::fs::write(path, content).with_context(|| format!("Writing {:?}", path))?;
        Ok(())
    }

    pub fn ensure_data_dir() -> Result<PathBuf> {
        let dir = Self::data_dir()?;
        std::fs::create_dir_all(&dir)?;
        Ok(dir)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_config_uses_defaults() {
        let config: AppConfig = toml::from_str("").unwrap();
        assert_eq!(config.location.name, "Islamabad");
        assert_eq!(config.api.method, 3);
        assert_eq!(config.api.school, 0);
        assert_eq!(config.display.tick_ms, 1000);
        assert!(config.location.reverse_geocode);
    }

    #[test]
    fn test_partial_section() {
        let config: AppConfig = toml::from_str(
            r#"
            [location]
            latitude = 31.5204
            longitude = 74.3587

            [api]
            school = 1
            "#,
        )
        .unwrap();
        assert_eq!(config.location.latitude, 31.5204);
        assert_eq!(config.location.name, "Islamabad");
        assert_eq!(config.api.school, 1);
        assert_eq!(config.api.timings_url, "https://api.aladhan.com/v1");
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let mut config = AppConfig::default();
        config.location.name = "Lahore".to_string();
        config.location.latitude = 31.5204;
        config.save_to(&path).unwrap();

        let loaded = AppConfig::load_from(&path).unwrap();
        assert_eq!(loaded.location.name, "Lahore");
        assert_eq!(loaded.location.latitude, 31.5204);
    }

    #[test]
    fn test_missing_file_is_default() {
        let dir = tempfile::tempdir().unwrap();
        let loaded = AppConfig::load_from(&dir.path().join("absent.toml")).unwrap();
        assert_eq!(loaded.location.name, "Islamabad");
    }
}
