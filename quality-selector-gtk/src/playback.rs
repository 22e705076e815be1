use anyhow::{Context, Result};
use gstreamer as gst;
use gst::prelude::*;
use quality_selector_core::{LevelAddedCallback, QualityLevel, QualityLevelSource, QualityLevels, Subscription};
use tracing::{debug, error, info};

/// A `playbin` for the session URI, with its bus watched for errors.
pub struct Playback {
    playbin: gst::Element,
    _bus_watch: gst::bus::BusWatchGuard,
}

impl Playback {
    pub fn new(uri: &str) -> Result<Self> {
        let playbin = gst::ElementFactory::make("playbin").property("uri", uri).build()?;
        let bus = playbin.bus().context("playbin has no bus")?;
        let bus_watch = bus.add_watch_local(|_, msg| {
            match msg.view() {
                gst::MessageView::Error(err) => {
                    error!(source = ?err.src().map(|s| s.name()), "playback error: {}", err.error());
                }
                gst::MessageView::Eos(_) => info!("end of stream"),
                _ => {}
            }
            glib::ControlFlow::Continue
        })?;
        Ok(Self {
            playbin,
            _bus_watch: bus_watch,
        })
    }

    pub fn playbin(&self) -> &gst::Element {
        &self.playbin
    }

    pub fn set_playing(&self, playing: bool) -> Result<()> {
        let state = if playing { gst::State::Playing } else { gst::State::Paused };
        self.playbin.set_state(state)?;
        Ok(())
    }
}

impl Drop for Playback {
    fn drop(&mut self) {
        let _ = self.playbin.set_state(gst::State::Null);
    }
}

/// Quality levels whose enabled flags cap `playbin`'s bandwidth estimate.
pub struct PlaybinLevels {
    levels: QualityLevels,
    playbin: Option<gst::Element>,
}

impl PlaybinLevels {
    pub fn new(playbin: Option<gst::Element>) -> Self {
        Self {
            levels: QualityLevels::new(),
            playbin,
        }
    }

    pub fn announce(&self, level: QualityLevel) {
        debug!(id = %level.id, height = level.height, bitrate = level.bitrate, "quality level announced");
        self.levels.add_level(level);
    }

    // 0 lets playbin pick freely; otherwise cap at the best enabled rendition.
    fn apply_connection_speed(&self) {
        let Some(playbin) = &self.playbin else {
            return;
        };
        let levels = self.levels.levels();
        let kbps = if levels.iter().all(|level| level.enabled) {
            0
        } else {
            levels
                .iter()
                .filter(|level| level.enabled)
                .map(|level| level.bitrate / 1000)
                .max()
                .unwrap_or(0)
        };
        playbin.set_property("connection-speed", kbps);
    }
}

impl QualityLevelSource for PlaybinLevels {
    fn levels(&self) -> Vec<QualityLevel> {
        self.levels.levels()
    }

    fn set_enabled(&self, id: &str, enabled: bool) -> bool {
        let found = self.levels.set_enabled(id, enabled);
        if found {
            self.apply_connection_speed();
        }
        found
    }

    fn subscribe_level_added(&self, callback: LevelAddedCallback) -> Subscription {
        self.levels.subscribe_level_added(callback)
    }
}
