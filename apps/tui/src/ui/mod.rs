// UI module for ip_tracker
// Handles all UI rendering functions

pub mod screens {
    pub mod main;
}

pub mod widgets {
    pub mod map;
    pub mod popup;
}

use crate::app::App;
use ratatui::Frame;

pub use screens::main::map_area;

pub fn ui(app: &App, f: &mut Frame<'_>) {
    screens::main::render_main(app, f);
}
