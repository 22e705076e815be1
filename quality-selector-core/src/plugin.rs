use std::any::Any;
use std::cell::RefCell;
use std::collections::BTreeMap;
use std::fmt;
use std::rc::Rc;

use tracing::debug;

use super::error::{PluginError, SelectError};
use super::host::{ButtonFace, ControlStrip, HostPlayer, QualityButtonView, SelectHandler};
use super::levels::Subscription;
use super::models::{MenuEntry, Quality, QualityFilter, QualityLevel, SelectorConfig};
use super::selector::{InertSelector, QualitySelector, Selector};

pub const PLUGIN_NAME: &str = "qualitySelector";
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Class added to a player that carries the selector.
pub const PLAYER_CLASS: &str = "vjs-hls-quality-selector";

pub trait Plugin: Any {
    fn name(&self) -> &'static str;
    fn as_any(&self) -> &dyn Any;
}

pub type PluginFactory = Box<dyn Fn(&dyn HostPlayer, &serde_json::Value) -> Result<Rc<dyn Plugin>, PluginError>>;

/// Plugin factories known to a player, registered at composition time.
#[derive(Default)]
pub struct PluginRegistry {
    factories: BTreeMap<String, PluginFactory>,
}

impl PluginRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register<F>(&mut self, name: impl Into<String>, factory: F) -> Result<(), PluginError>
    where
        F: Fn(&dyn HostPlayer, &serde_json::Value) -> Result<Rc<dyn Plugin>, PluginError> + 'static,
    {
        let name = name.into();
        if self.factories.contains_key(&name) {
            return Err(PluginError::AlreadyRegistered(name));
        }
        debug!(plugin = %name, "plugin registered");
        self.factories.insert(name, Box::new(factory));
        Ok(())
    }

    pub fn is_registered(&self, name: &str) -> bool {
        self.factories.contains_key(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.factories.keys().map(String::as_str)
    }

    pub fn activate(
        &self,
        name: &str,
        host: &dyn HostPlayer,
        options: &serde_json::Value,
    ) -> Result<Rc<dyn Plugin>, PluginError> {
        let factory = self
            .factories
            .get(name)
            .ok_or_else(|| PluginError::UnknownPlugin(name.to_string()))?;
        factory(host, options)
    }
}

impl fmt::Debug for PluginRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.factories.keys()).finish()
    }
}

/// Registers the quality selector under [`PLUGIN_NAME`].
pub fn register(registry: &mut PluginRegistry) -> Result<(), PluginError> {
    registry.register(PLUGIN_NAME, |host, options| {
        let config = SelectorConfig::from_options(options).map_err(|source| PluginError::InvalidOptions {
            name: PLUGIN_NAME.to_string(),
            source,
        })?;
        let plugin: Rc<dyn Plugin> = Rc::new(QualitySelectorPlugin::attach(host, config));
        Ok(plugin)
    })
}

struct PluginState {
    config: SelectorConfig,
    selector: Box<dyn Selector>,
    strip: Option<Rc<dyn ControlStrip>>,
    button: Option<Box<dyn QualityButtonView>>,
    subscription: Option<Subscription>,
}

/// The quality menu attached to one player.
///
/// Cheap to clone; clones share state. The "level added" subscription
/// lives as long as the last clone, or until [`detach`](Self::detach).
#[derive(Clone)]
pub struct QualitySelectorPlugin {
    state: Rc<RefCell<PluginState>>,
}

impl QualitySelectorPlugin {
    pub fn attach(host: &dyn HostPlayer, config: SelectorConfig) -> Self {
        host.add_class(PLAYER_CLASS);
        let Some(source) = host.quality_levels() else {
            debug!("player exposes no quality levels, quality selector disabled");
            return Self::from_state(PluginState {
                config,
                selector: Box::new(InertSelector),
                strip: None,
                button: None,
                subscription: None,
            });
        };

        let selector = QualitySelector::new(source.clone(), config.rebuild_policy);
        let plugin = Self::from_state(PluginState {
            config,
            selector: Box::new(selector),
            strip: Some(host.control_strip()),
            button: None,
            subscription: None,
        });

        let weak = Rc::downgrade(&plugin.state);
        let subscription = source.subscribe_level_added(Rc::new(move |_: &QualityLevel| {
            if let Some(state) = weak.upgrade() {
                QualitySelectorPlugin { state }.level_added();
            }
        }));
        plugin.state.borrow_mut().subscription = Some(subscription);

        // Levels announced before the player became ready.
        if !source.levels().is_empty() {
            plugin.level_added();
        }
        plugin
    }

    pub fn from_plugin(plugin: &dyn Plugin) -> Option<Self> {
        plugin.as_any().downcast_ref::<Self>().cloned()
    }

    fn from_state(state: PluginState) -> Self {
        Self {
            state: Rc::new(RefCell::new(state)),
        }
    }

    pub fn is_active(&self) -> bool {
        self.state.borrow().strip.is_some()
    }

    pub fn set_quality(&self, filter: &QualityFilter) -> Result<Quality, SelectError> {
        let mut guard = self.state.borrow_mut();
        let state = &mut *guard;
        let quality = state.selector.set_quality(filter)?;
        if let Some(button) = &state.button {
            if state.config.display_current_quality {
                button.set_face(&ButtonFace::Text(quality.label()));
            }
            button.update_selection(state.selector.entries());
            button.close_menu();
        }
        Ok(quality)
    }

    pub fn quality(&self) -> Quality {
        self.state.borrow().selector.quality()
    }

    pub fn entries(&self) -> Vec<MenuEntry> {
        self.state.borrow().selector.entries().to_vec()
    }

    pub fn config(&self) -> SelectorConfig {
        self.state.borrow().config.clone()
    }

    /// Stops listening for new levels. The button stays as it is.
    pub fn detach(&self) {
        if let Some(subscription) = self.state.borrow_mut().subscription.take() {
            subscription.cancel();
            debug!("quality selector detached");
        }
    }

    fn level_added(&self) {
        if self.state.borrow().button.is_none() {
            self.create_button();
        }
        let mut guard = self.state.borrow_mut();
        let state = &mut *guard;
        state.selector.on_level_added();
        if let Some(button) = &state.button {
            button.set_entries(state.selector.entries());
            if state.config.display_current_quality {
                button.set_face(&ButtonFace::Text(state.selector.quality().label()));
            }
        }
    }

    fn create_button(&self) {
        let weak = Rc::downgrade(&self.state);
        let on_select: SelectHandler = Rc::new(move |filter: QualityFilter| {
            if let Some(state) = weak.upgrade() {
                // A rejected click leaves the menu unchanged.
                let _ = QualitySelectorPlugin { state }.set_quality(&filter);
            }
        });

        let mut state = self.state.borrow_mut();
        let Some(strip) = state.strip.clone() else {
            return;
        };
        let index = state.config.placement_for(strip.child_count());
        let button = strip.insert_quality_button(index, on_select);
        button.set_face(&face_for(&state.config, &state.selector.quality()));
        debug!(index, "quality button inserted");
        state.button = Some(button);
    }
}

impl Plugin for QualitySelectorPlugin {
    fn name(&self) -> &'static str {
        PLUGIN_NAME
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

impl fmt::Debug for QualitySelectorPlugin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.state.borrow();
        f.debug_struct("QualitySelectorPlugin")
            .field("config", &state.config)
            .field("active", &state.strip.is_some())
            .field("quality", &state.selector.quality())
            .finish()
    }
}

fn face_for(config: &SelectorConfig, quality: &Quality) -> ButtonFace {
    if config.display_current_quality {
        ButtonFace::Text(quality.label())
    } else {
        ButtonFace::Icon {
            class: config.icon_class.clone(),
        }
    }
}
