mod host;
mod playback;
mod session;

use std::cell::RefCell;
use std::path::PathBuf;
use std::rc::Rc;
use std::time::Duration;

use anyhow::Result;
use gstreamer as gst;
use gtk4 as gtk;
use gtk::prelude::*;
use gtk::{glib as gtk_glib, Align, Application, ApplicationWindow, Box, Button, Label, MessageDialog, MessageType, Orientation};
use quality_selector_core::{Plugin, PluginRegistry, QualityLevel, QualitySelectorPlugin, VERSION};
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use host::{GtkControlStrip, GtkHost};
use playback::{Playback, PlaybinLevels};
use session::Session;

const CSS: &str = ".vjs-quality-selector popover button.selected { font-weight: bold; }";

fn main() -> Result<()> {
    init_tracing();
    gst::init()?;

    let session = match std::env::args_os().nth(1).map(PathBuf::from) {
        Some(path) => Session::load(&path)?,
        None => Session::default(),
    };
    info!(version = VERSION, uri = ?session.uri, "starting quality selector demo");

    let mut registry = PluginRegistry::new();
    quality_selector_core::register(&mut registry)?;

    let app = Application::new(Some("com.example.QualitySelector"), Default::default());
    app.connect_startup(|_| load_css());
    app.connect_activate(move |app| {
        build_ui(app, &session, &registry);
    });
    // GTK would otherwise try to parse the session path itself.
    let _ = app.run_with_args::<&str>(&[]);
    Ok(())
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).with_target(true).init();
}

fn load_css() {
    let provider = gtk::CssProvider::new();
    provider.load_from_data(CSS);
    if let Some(display) = gtk::gdk::Display::default() {
        gtk::style_context_add_provider_for_display(&display, &provider, gtk::STYLE_PROVIDER_PRIORITY_APPLICATION);
    }
}

fn show_error_dialog(parent: &ApplicationWindow, text: &str) {
    let dialog = MessageDialog::new(
        Some(parent),
        gtk::DialogFlags::MODAL,
        MessageType::Error,
        gtk::ButtonsType::Ok,
        "Playback Failed",
    );
    dialog.set_secondary_text(Some(text));
    dialog.connect_response(|d, _| d.close());
    dialog.show();
}

fn build_ui(app: &Application, session: &Session, registry: &PluginRegistry) {
    let window = ApplicationWindow::builder()
        .application(app)
        .title("Quality Selector")
        .default_width(480)
        .default_height(120)
        .build();

    let playback = match session.uri.as_deref().map(Playback::new).transpose() {
        Ok(playback) => playback.map(Rc::new),
        Err(e) => {
            error!("failed to create playback: {e:#}");
            show_error_dialog(&window, &e.to_string());
            None
        }
    };

    let main_vbox = Box::new(Orientation::Vertical, 5);
    let title = Label::new(Some(session.uri.as_deref().unwrap_or("No media loaded")));
    title.set_margin_top(10);
    main_vbox.append(&title);

    let strip_box = Box::new(Orientation::Horizontal, 5);
    strip_box.set_halign(Align::Center);
    strip_box.set_margin_bottom(10);
    let play_button = Button::from_icon_name("media-playback-start-symbolic");
    let pause_button = Button::from_icon_name("media-playback-pause-symbolic");
    let position_label = Label::new(Some("--:--"));
    let fullscreen_button = Button::from_icon_name("view-fullscreen-symbolic");
    strip_box.append(&play_button);
    strip_box.append(&pause_button);
    strip_box.append(&position_label);
    strip_box.append(&fullscreen_button);
    main_vbox.append(&strip_box);
    window.set_child(Some(&main_vbox));

    for (button, playing) in [(&play_button, true), (&pause_button, false)] {
        button.set_sensitive(playback.is_some());
        let playback = playback.clone();
        let window = window.clone();
        button.connect_clicked(move |_| {
            if let Some(playback) = &playback {
                if let Err(e) = playback.set_playing(playing) {
                    show_error_dialog(&window, &e.to_string());
                }
            }
        });
    }
    fullscreen_button.connect_clicked({
        let window = window.clone();
        move |_| {
            if window.is_fullscreen() {
                window.unfullscreen();
            } else {
                window.fullscreen();
            }
        }
    });

    let levels = session
        .renditions
        .as_ref()
        .map(|_| Rc::new(PlaybinLevels::new(playback.as_ref().map(|p| p.playbin().clone()))));
    let host = GtkHost::new(window.clone(), levels.clone(), GtkControlStrip::new(strip_box));

    let mut plugins: Vec<Rc<dyn Plugin>> = Vec::new();
    for (name, options) in &session.plugins {
        match registry.activate(name, &host, options) {
            Ok(plugin) => plugins.push(plugin),
            Err(e) => warn!(plugin = %name, "plugin not activated: {e}"),
        }
    }

    if let (Some(levels), Some(renditions)) = (levels, session.renditions.clone()) {
        announce_levels(levels, renditions, session.announce_interval());
    }

    let playback = RefCell::new(playback);
    window.connect_close_request(move |_| {
        for plugin in &plugins {
            if let Some(selector) = QualitySelectorPlugin::from_plugin(plugin.as_ref()) {
                selector.detach();
            }
        }
        playback.borrow_mut().take();
        gtk_glib::Propagation::Proceed
    });

    window.present();
}

/// Announces one rendition per tick, the way a manifest loader would.
fn announce_levels(levels: Rc<PlaybinLevels>, renditions: Vec<QualityLevel>, interval: Duration) {
    let mut pending = renditions.into_iter();
    gtk_glib::timeout_add_local(interval, move || match pending.next() {
        Some(level) => {
            levels.announce(level);
            gtk_glib::ControlFlow::Continue
        }
        None => gtk_glib::ControlFlow::Break,
    });
}
