mod error;
mod host;
mod label;
mod levels;
mod models;
mod plugin;
mod selector;

pub use error::{PluginError, SelectError};
pub use host::{ButtonFace, ControlStrip, HostPlayer, QualityButtonView, SelectHandler};
pub use label::nice_label;
pub use levels::{LevelAddedCallback, QualityLevelSource, QualityLevels, Subscription};
pub use models::{
    EntryTarget, Height, MenuEntry, Quality, QualityFilter, QualityLevel, RebuildPolicy, SelectorConfig,
};
pub use plugin::{
    register, Plugin, PluginFactory, PluginRegistry, QualitySelectorPlugin, PLAYER_CLASS, PLUGIN_NAME, VERSION,
};
pub use selector::{InertSelector, QualitySelector, Selector};
