use anyhow::{Context, Result};
use quality_selector_core::{QualityLevel, PLUGIN_NAME};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use std::time::Duration;

/// A demo playback session: what to play, which renditions the player
/// announces, and the plugins to activate with their options.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    #[serde(default)]
    pub uri: Option<String>,
    /// `None` models a playback tech without quality levels.
    #[serde(default)]
    pub renditions: Option<Vec<QualityLevel>>,
    #[serde(default = "default_announce_interval_ms")]
    pub announce_interval_ms: u64,
    #[serde(default = "default_plugins")]
    pub plugins: BTreeMap<String, serde_json::Value>,
}

fn default_announce_interval_ms() -> u64 {
    750
}

fn default_plugins() -> BTreeMap<String, serde_json::Value> {
    BTreeMap::from([(PLUGIN_NAME.to_string(), serde_json::Value::Null)])
}

impl Default for Session {
    fn default() -> Self {
        Self {
            uri: None,
            renditions: Some(vec![
                QualityLevel::new("240", 240, 400_000),
                QualityLevel::new("720", 720, 2_500_000),
                QualityLevel::new("480", 480, 1_000_000),
                QualityLevel::new("1080", 1080, 5_000_000),
            ]),
            announce_interval_ms: default_announce_interval_ms(),
            plugins: default_plugins(),
        }
    }
}

impl Session {
    pub fn load(path: &Path) -> Result<Self> {
        let data = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read session file {}", path.display()))?;
        serde_json::from_str(&data).with_context(|| format!("invalid session file {}", path.display()))
    }

    pub fn announce_interval(&self) -> Duration {
        Duration::from_millis(self.announce_interval_ms)
    }
}
