use std::cell::RefCell;
use std::rc::Rc;

use gtk4 as gtk;
use gtk::prelude::*;
use quality_selector_core::{
    ButtonFace, ControlStrip, HostPlayer, MenuEntry, QualityButtonView, QualityLevelSource, SelectHandler,
};

use super::playback::PlaybinLevels;

const BUTTON_CLASS: &str = "vjs-quality-selector";
const BUTTON_ICON: &str = "video-display-symbolic";

/// The horizontal box of player controls under the video.
pub struct GtkControlStrip {
    container: gtk::Box,
}

impl GtkControlStrip {
    pub fn new(container: gtk::Box) -> Self {
        Self { container }
    }

    fn children(&self) -> Vec<gtk::Widget> {
        let mut children = Vec::new();
        let mut child = self.container.first_child();
        while let Some(widget) = child {
            child = widget.next_sibling();
            children.push(widget);
        }
        children
    }
}

impl ControlStrip for GtkControlStrip {
    fn child_count(&self) -> usize {
        self.children().len()
    }

    fn insert_quality_button(&self, index: usize, on_select: SelectHandler) -> Box<dyn QualityButtonView> {
        let rows = gtk::Box::new(gtk::Orientation::Vertical, 2);
        let popover = gtk::Popover::new();
        popover.set_child(Some(&rows));

        let menu_button = gtk::MenuButton::new();
        menu_button.set_popover(Some(&popover));
        menu_button.add_css_class(BUTTON_CLASS);

        let sibling = index.checked_sub(1).and_then(|i| self.children().get(i).cloned());
        self.container.insert_child_after(&menu_button, sibling.as_ref());

        Box::new(MenuButtonView {
            menu_button,
            rows,
            row_buttons: RefCell::new(Vec::new()),
            icon_class: RefCell::new(None),
            on_select,
        })
    }
}

pub struct MenuButtonView {
    menu_button: gtk::MenuButton,
    rows: gtk::Box,
    row_buttons: RefCell<Vec<gtk::Button>>,
    icon_class: RefCell<Option<String>>,
    on_select: SelectHandler,
}

impl QualityButtonView for MenuButtonView {
    fn set_entries(&self, entries: &[MenuEntry]) {
        while let Some(child) = self.rows.first_child() {
            self.rows.remove(&child);
        }
        let mut buttons = self.row_buttons.borrow_mut();
        buttons.clear();
        for entry in entries {
            let button = gtk::Button::with_label(&entry.label);
            button.add_css_class("flat");
            if entry.selected {
                button.add_css_class("selected");
            }
            let filter = entry.filter();
            let on_select = self.on_select.clone();
            button.connect_clicked(move |_| on_select(filter.clone()));
            self.rows.append(&button);
            buttons.push(button);
        }
    }

    fn update_selection(&self, entries: &[MenuEntry]) {
        for (button, entry) in self.row_buttons.borrow().iter().zip(entries) {
            if entry.selected {
                button.add_css_class("selected");
            } else {
                button.remove_css_class("selected");
            }
        }
    }

    fn set_face(&self, face: &ButtonFace) {
        match face {
            ButtonFace::Text(text) => self.menu_button.set_label(text),
            ButtonFace::Icon { class } => {
                self.menu_button.set_icon_name(BUTTON_ICON);
                if let Some(previous) = self.icon_class.replace(Some(class.clone())) {
                    self.menu_button.remove_css_class(&previous);
                }
                self.menu_button.add_css_class(class);
            }
        }
    }

    fn close_menu(&self) {
        self.menu_button.popdown();
    }
}

pub struct GtkHost {
    window: gtk::ApplicationWindow,
    levels: Option<Rc<PlaybinLevels>>,
    strip: Rc<GtkControlStrip>,
}

impl GtkHost {
    pub fn new(window: gtk::ApplicationWindow, levels: Option<Rc<PlaybinLevels>>, strip: GtkControlStrip) -> Self {
        Self {
            window,
            levels,
            strip: Rc::new(strip),
        }
    }
}

impl HostPlayer for GtkHost {
    fn quality_levels(&self) -> Option<Rc<dyn QualityLevelSource>> {
        self.levels
            .clone()
            .map(|levels| levels as Rc<dyn QualityLevelSource>)
    }

    fn control_strip(&self) -> Rc<dyn ControlStrip> {
        self.strip.clone()
    }

    fn add_class(&self, class: &str) {
        self.window.add_css_class(class);
    }
}
