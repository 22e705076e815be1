use serde::{Deserialize, Serialize};

/// One rendition of the stream as announced by the host player.
///
/// Only `enabled` is ever written by the selector; everything else is
/// owned by the host.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct QualityLevel {
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
    /// Vertical resolution in pixels, 0 when unknown.
    #[serde(default)]
    pub height: u32,
    /// Bits per second, 0 when unknown.
    #[serde(default)]
    pub bitrate: u64,
    #[serde(default = "enabled_by_default")]
    pub enabled: bool,
}

fn enabled_by_default() -> bool {
    true
}

impl QualityLevel {
    pub fn new(id: impl Into<String>, height: u32, bitrate: u64) -> Self {
        Self {
            id: id.into(),
            name: None,
            height,
            bitrate,
            enabled: true,
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }
}

/// Height of a menu entry or filter. `Pixels` orders before `Auto`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Height {
    Pixels(u32),
    Auto,
}

/// Partial-match criteria for picking a level.
///
/// Unset fields are wildcards. Empty values (`""`, `0`) count as unset.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct QualityFilter {
    pub name: Option<String>,
    pub bitrate: Option<u64>,
    pub height: Option<Height>,
}

impl QualityFilter {
    /// Filter that hands selection back to the host's adaptive logic.
    pub fn auto() -> Self {
        Self {
            height: Some(Height::Auto),
            ..Self::default()
        }
    }

    pub fn height(height: u32) -> Self {
        Self::default().with_height(height)
    }

    pub fn with_height(mut self, height: u32) -> Self {
        self.height = Some(Height::Pixels(height));
        self
    }

    pub fn with_bitrate(mut self, bitrate: u64) -> Self {
        self.bitrate = Some(bitrate);
        self
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn is_auto(&self) -> bool {
        self.height == Some(Height::Auto)
    }

    pub fn matches(&self, level: &QualityLevel) -> bool {
        let name_ok = match self.name.as_deref() {
            None | Some("") => true,
            Some(name) => level.name.as_deref() == Some(name),
        };
        let bitrate_ok = match self.bitrate {
            None | Some(0) => true,
            Some(bitrate) => level.bitrate == bitrate,
        };
        let height_ok = match self.height {
            None | Some(Height::Auto) | Some(Height::Pixels(0)) => true,
            Some(Height::Pixels(height)) => level.height == height,
        };
        name_ok && bitrate_ok && height_ok
    }
}

/// The quality currently in effect.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Quality {
    Auto,
    Level(QualityLevel),
}

impl Quality {
    pub fn is_auto(&self) -> bool {
        matches!(self, Quality::Auto)
    }

    pub fn level_id(&self) -> Option<&str> {
        match self {
            Quality::Auto => None,
            Quality::Level(level) => Some(&level.id),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum EntryTarget {
    Auto,
    Level(String),
}

/// A row of the quality menu, derived from the host's levels.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MenuEntry {
    pub label: String,
    pub height: Height,
    pub bitrate: u64,
    pub selected: bool,
    pub target: EntryTarget,
}

impl MenuEntry {
    pub(crate) fn for_level(level: &QualityLevel) -> Self {
        Self {
            label: crate::label::nice_label(level),
            height: Height::Pixels(level.height),
            bitrate: level.bitrate,
            selected: false,
            target: EntryTarget::Level(level.id.clone()),
        }
    }

    pub(crate) fn auto() -> Self {
        Self {
            label: "Auto".to_string(),
            height: Height::Auto,
            bitrate: 0,
            selected: true,
            target: EntryTarget::Auto,
        }
    }

    pub fn is_auto(&self) -> bool {
        self.target == EntryTarget::Auto
    }

    /// The filter a click on this entry submits.
    pub fn filter(&self) -> QualityFilter {
        match self.height {
            Height::Auto => QualityFilter::auto(),
            Height::Pixels(height) => QualityFilter::height(height).with_bitrate(self.bitrate),
        }
    }
}

/// What happens to an explicit selection when the level list is rebuilt.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum RebuildPolicy {
    #[default]
    PreserveSelection,
    ResetToAuto,
}

/// Plugin options supplied by the embedding application.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SelectorConfig {
    /// Show the current quality's label on the button instead of an icon.
    pub display_current_quality: bool,
    #[serde(alias = "vjsIconClass")]
    pub icon_class: String,
    /// Position in the control strip. Defaults to second from the end.
    pub placement_index: Option<usize>,
    pub rebuild_policy: RebuildPolicy,
}

impl Default for SelectorConfig {
    fn default() -> Self {
        Self {
            display_current_quality: false,
            icon_class: "vjs-icon-hd".to_string(),
            placement_index: None,
            rebuild_policy: RebuildPolicy::default(),
        }
    }
}

impl SelectorConfig {
    /// Parses plugin options. `null` yields the defaults.
    pub fn from_options(options: &serde_json::Value) -> Result<Self, serde_json::Error> {
        if options.is_null() {
            return Ok(Self::default());
        }
        serde_json::from_value(options.clone())
    }

    pub fn placement_for(&self, child_count: usize) -> usize {
        self.placement_index
            .unwrap_or_else(|| child_count.saturating_sub(2))
            .min(child_count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn empty_filter_fields_are_wildcards() {
        let level = QualityLevel::new("a", 720, 2_000_000).with_name("hd");
        let filter = QualityFilter {
            name: Some(String::new()),
            bitrate: Some(0),
            height: Some(Height::Pixels(0)),
        };
        assert!(filter.matches(&level));
        assert!(QualityFilter::default().matches(&level));
    }

    #[test]
    fn filter_requires_every_set_field() {
        let level = QualityLevel::new("a", 720, 2_000_000).with_name("hd");
        assert!(QualityFilter::height(720).with_name("hd").matches(&level));
        assert!(!QualityFilter::height(720).with_name("sd").matches(&level));
        assert!(!QualityFilter::height(720).with_bitrate(1).matches(&level));
        assert!(!QualityFilter::default().with_name("hd").matches(&QualityLevel::new("b", 720, 0)));
    }

    #[test]
    fn entry_filter_targets_height_and_bitrate() {
        let entry = MenuEntry::for_level(&QualityLevel::new("a", 480, 900_000));
        assert_eq!(entry.filter(), QualityFilter::height(480).with_bitrate(900_000));
        assert!(MenuEntry::auto().filter().is_auto());
    }

    #[test]
    fn config_accepts_camel_case_options() {
        let config = SelectorConfig::from_options(&json!({
            "displayCurrentQuality": true,
            "vjsIconClass": "icon-quality",
            "placementIndex": 0,
            "rebuildPolicy": "resetToAuto"
        }))
        .unwrap();
        assert!(config.display_current_quality);
        assert_eq!(config.icon_class, "icon-quality");
        assert_eq!(config.placement_index, Some(0));
        assert_eq!(config.rebuild_policy, RebuildPolicy::ResetToAuto);
    }

    #[test]
    fn config_defaults_for_null_and_partial_options() {
        assert_eq!(SelectorConfig::from_options(&serde_json::Value::Null).unwrap(), SelectorConfig::default());
        let config = SelectorConfig::from_options(&json!({ "iconClass": "hd" })).unwrap();
        assert_eq!(config.icon_class, "hd");
        assert!(!config.display_current_quality);
        assert!(SelectorConfig::from_options(&json!({ "placementIndex": "last" })).is_err());
    }

    #[test]
    fn placement_defaults_to_second_from_end() {
        let config = SelectorConfig::default();
        assert_eq!(config.placement_for(6), 4);
        assert_eq!(config.placement_for(1), 0);
        assert_eq!(config.placement_for(0), 0);

        let explicit = SelectorConfig { placement_index: Some(9), ..SelectorConfig::default() };
        assert_eq!(explicit.placement_for(3), 3);
    }
}
