//! What the selector needs from the player that embeds it.

use std::rc::Rc;

use super::levels::QualityLevelSource;
use super::models::{MenuEntry, QualityFilter};

/// Invoked by the view when the viewer picks a menu entry.
pub type SelectHandler = Rc<dyn Fn(QualityFilter)>;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ButtonFace {
    Text(String),
    Icon { class: String },
}

/// The menu button as rendered by the host's UI toolkit.
pub trait QualityButtonView {
    /// Replaces every menu row.
    fn set_entries(&self, entries: &[MenuEntry]);

    /// Restyles rows after the selection changed. Entries are the same
    /// list last passed to `set_entries`.
    fn update_selection(&self, entries: &[MenuEntry]);

    fn set_face(&self, face: &ButtonFace);

    fn close_menu(&self);
}

/// The player's horizontal row of controls.
pub trait ControlStrip {
    fn child_count(&self) -> usize;

    /// Must not call `on_select` before returning.
    fn insert_quality_button(&self, index: usize, on_select: SelectHandler) -> Box<dyn QualityButtonView>;
}

pub trait HostPlayer {
    /// `None` when the current playback tech exposes no quality levels.
    fn quality_levels(&self) -> Option<Rc<dyn QualityLevelSource>>;

    fn control_strip(&self) -> Rc<dyn ControlStrip>;

    fn add_class(&self, _class: &str) {}
}
