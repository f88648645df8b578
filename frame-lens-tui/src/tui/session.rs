use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// UI preferences remembered between runs. Filters are never stored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UiPrefs {
    pub input_path: String,
    pub page_size: usize,
    #[serde(default)]
    pub columns: Vec<String>,
    #[serde(default = "default_true")]
    pub show_table: bool,
    #[serde(default)]
    pub show_figure: bool,
}

fn default_true() -> bool { true }

impl UiPrefs {
    pub fn cache_path() -> PathBuf {
        dirs::cache_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("frame-lens")
            .join("session.json")
    }

    pub fn save(&self) -> anyhow::Result<()> {
        self.save_to(&Self::cache_path())
    }

    pub fn save_to(&self, path: &Path) -> anyhow::Result<()> {
        if let Some(parent) = path.parent() { std::fs::create_dir_all(parent)?; }
        std::fs::write(path, serde_json::to_string_pretty(self)?)?;
        Ok(())
    }

    /// Only returns prefs recorded for the same input file.
    pub fn load_for(input_path: &str) -> Option<Self> {
        Self::load_from(&Self::cache_path(), input_path)
    }

    pub fn load_from(path: &Path, input_path: &str) -> Option<Self> {
        let prefs: Self = serde_json::from_str(&std::fs::read_to_string(path).ok()?).ok()?;
        (prefs.input_path == input_path).then_some(prefs)
    }
}
