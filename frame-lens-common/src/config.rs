use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DisplayConfig {
    #[serde(default = "default_theme")]
    pub theme: String,
    #[serde(default = "default_page_size")]
    pub page_size: usize,
    #[serde(default)]
    pub default_columns: Option<Vec<String>>, // None: every column but the first
}

fn default_theme() -> String {
    "dark".into()
}
fn default_page_size() -> usize {
    5
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            theme: default_theme(),
            page_size: default_page_size(),
            default_columns: None,
        }
    }
}

/// Column bindings for the scatter figure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FigureConfig {
    #[serde(default = "default_x")]
    pub x: String,
    #[serde(default = "default_y")]
    pub y: String,
    #[serde(default = "default_size")]
    pub size: Option<String>,
    #[serde(default = "default_color")]
    pub color: Option<String>,
    #[serde(default = "default_label")]
    pub label: Option<String>,
    #[serde(default = "default_true")]
    pub log_x: bool,
}

fn default_x() -> String {
    "gdp per capita".into()
}
fn default_y() -> String {
    "life expectancy".into()
}
fn default_size() -> Option<String> {
    Some("population".into())
}
fn default_color() -> Option<String> {
    Some("continent".into())
}
fn default_label() -> Option<String> {
    Some("country".into())
}
fn default_true() -> bool {
    true
}

impl Default for FigureConfig {
    fn default() -> Self {
        Self {
            x: default_x(),
            y: default_y(),
            size: default_size(),
            color: default_color(),
            label: default_label(),
            log_x: true,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_level")]
    pub level: String,
    #[serde(default = "default_log_format")]
    pub format: String, // pretty | compact | json
    #[serde(default)]
    pub file: Option<String>, // explorer falls back to the cache dir when None
}

fn default_level() -> String {
    "info".into()
}
fn default_log_format() -> String {
    "pretty".into()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_level(),
            format: default_log_format(),
            file: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportConfig {
    #[serde(default = "default_format")]
    pub format: String,
    #[serde(default = "default_output_dir")]
    pub output_dir: String,
}

fn default_format() -> String {
    "json".into()
}
fn default_output_dir() -> String {
    ".".into()
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            format: default_format(),
            output_dir: default_output_dir(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub display: DisplayConfig,
    #[serde(default)]
    pub figure: FigureConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub export: ExportConfig,
}

impl Config {
    pub fn config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("frame-lens")
            .join("config.toml")
    }

    pub fn load() -> crate::Result<Self> {
        let path = if let Ok(env_path) = std::env::var("FRAME_LENS_CONFIG") {
            PathBuf::from(env_path) // $FRAME_LENS_CONFIG overrides default config path
        } else {
            Self::config_path()
        };
        Self::load_from(&path)
    }

    pub fn load_from(path: &Path) -> crate::Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)?;
        let cfg: Self =
            toml::from_str(&content).map_err(|e| crate::FrameLensError::Config(e.to_string()))?;
        if cfg.display.page_size == 0 {
            return Err(crate::FrameLensError::Config(
                "display.page_size must be positive".into(),
            ));
        }
        Ok(cfg)
    }

    pub fn save(&self) -> crate::Result<()> {
        let path = Self::config_path();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)
            .map_err(|e| crate::FrameLensError::Config(e.to_string()))?;
        std::fs::write(&path, content)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = Config::load_from(&dir.path().join("nope.toml")).unwrap();
        assert_eq!(cfg.display.page_size, 5);
        assert_eq!(cfg.figure.x, "gdp per capita");
        assert!(cfg.figure.log_x);
    }

    #[test]
    fn partial_file_keeps_other_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[display]\npage_size = 20\n\n[figure]\nlog_x = false\n").unwrap();
        let cfg = Config::load_from(&path).unwrap();
        assert_eq!(cfg.display.page_size, 20);
        assert_eq!(cfg.display.theme, "dark");
        assert!(!cfg.figure.log_x);
        assert_eq!(cfg.figure.color.as_deref(), Some("continent"));
        assert_eq!(cfg.logging.format, "pretty");
    }

    #[test]
    fn zero_page_size_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[display]\npage_size = 0\n").unwrap();
        assert!(Config::load_from(&path).is_err());
    }
}
