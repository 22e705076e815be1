use std::collections::HashSet;
use std::rc::Rc;

use tracing::{debug, info, warn};

use super::error::SelectError;
use super::levels::QualityLevelSource;
use super::models::{EntryTarget, Height, MenuEntry, Quality, QualityFilter, QualityLevel, RebuildPolicy};

/// Tracks the menu entries and the current quality for one player.
pub trait Selector {
    /// Rebuilds the menu from the host's current levels.
    fn on_level_added(&mut self);

    fn set_quality(&mut self, filter: &QualityFilter) -> Result<Quality, SelectError>;

    fn quality(&self) -> Quality;

    fn entries(&self) -> &[MenuEntry];
}

pub struct QualitySelector {
    source: Rc<dyn QualityLevelSource>,
    entries: Vec<MenuEntry>,
    current: Quality,
    policy: RebuildPolicy,
}

impl QualitySelector {
    pub fn new(source: Rc<dyn QualityLevelSource>, policy: RebuildPolicy) -> Self {
        Self {
            source,
            entries: build_entries(&[]),
            current: Quality::Auto,
            policy,
        }
    }

    // Only touches levels whose flag actually changes.
    fn apply_enabled(&self, levels: &[QualityLevel], enabled: impl Fn(&QualityLevel) -> bool) {
        for level in levels {
            let wanted = enabled(level);
            if level.enabled != wanted {
                self.source.set_enabled(&level.id, wanted);
            }
        }
    }

    fn select_auto(&mut self, levels: &[QualityLevel]) {
        self.apply_enabled(levels, |_| true);
        self.current = Quality::Auto;
    }

    fn select_level(&mut self, levels: &[QualityLevel], level: &QualityLevel) {
        self.apply_enabled(levels, |candidate| candidate.id == level.id);
        self.current = Quality::Level(QualityLevel {
            enabled: true,
            ..level.clone()
        });
    }

    fn mark_selected(&mut self) {
        let index = match &self.current {
            Quality::Auto => self.entries.iter().position(MenuEntry::is_auto),
            Quality::Level(level) => self
                .entries
                .iter()
                .position(|entry| matches!(&entry.target, EntryTarget::Level(id) if *id == level.id))
                // The level may have been collapsed into an entry of the same height.
                .or_else(|| {
                    self.entries
                        .iter()
                        .position(|entry| entry.height == Height::Pixels(level.height))
                }),
        };
        for (i, entry) in self.entries.iter_mut().enumerate() {
            entry.selected = Some(i) == index;
        }
    }
}

impl Selector for QualitySelector {
    fn on_level_added(&mut self) {
        let levels = self.source.levels();
        self.entries = build_entries(&levels);

        let preserved = match (self.policy, self.current.level_id()) {
            (RebuildPolicy::PreserveSelection, Some(id)) => levels.iter().find(|level| level.id == id).cloned(),
            _ => None,
        };
        match preserved {
            Some(level) => self.select_level(&levels, &level),
            None => {
                if let Some(id) = self.current.level_id() {
                    debug!(level = id, policy = ?self.policy, "selection reset to auto on rebuild");
                }
                self.select_auto(&levels);
            }
        }
        self.mark_selected();

        debug!(
            levels = levels.len(),
            entries = self.entries.len(),
            quality = %self.current.label(),
            "quality menu rebuilt"
        );
    }

    fn set_quality(&mut self, filter: &QualityFilter) -> Result<Quality, SelectError> {
        let levels = self.source.levels();
        if filter.is_auto() {
            self.select_auto(&levels);
        } else {
            let Some(level) = levels.iter().find(|level| filter.matches(level)).cloned() else {
                warn!(?filter, levels = levels.len(), "no quality level matches filter");
                return Err(SelectError::NoMatch);
            };
            self.select_level(&levels, &level);
        }
        self.mark_selected();

        info!(quality = %self.current.label(), "quality selected");
        Ok(self.current.clone())
    }

    fn quality(&self) -> Quality {
        match &self.current {
            Quality::Auto => Quality::Auto,
            Quality::Level(current) => self
                .source
                .levels()
                .into_iter()
                .find(|level| level.id == current.id)
                .map(Quality::Level)
                .unwrap_or_else(|| self.current.clone()),
        }
    }

    fn entries(&self) -> &[MenuEntry] {
        &self.entries
    }
}

/// Selector used when the host has no quality levels. Does nothing.
#[derive(Debug, Default)]
pub struct InertSelector;

impl Selector for InertSelector {
    fn on_level_added(&mut self) {}

    fn set_quality(&mut self, _filter: &QualityFilter) -> Result<Quality, SelectError> {
        Err(SelectError::Unsupported)
    }

    fn quality(&self) -> Quality {
        Quality::Auto
    }

    fn entries(&self) -> &[MenuEntry] {
        &[]
    }
}

/// One entry per distinct height (first wins), ascending, then Auto.
pub(crate) fn build_entries(levels: &[QualityLevel]) -> Vec<MenuEntry> {
    let mut heights = HashSet::new();
    let mut entries: Vec<MenuEntry> = levels
        .iter()
        .filter(|level| heights.insert(level.height))
        .map(MenuEntry::for_level)
        .collect();
    entries.sort_by_key(|entry| entry.height);
    entries.push(MenuEntry::auto());
    entries
}
