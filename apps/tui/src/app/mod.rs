// App module for ip_tracker
// Handles application state and key handling

pub mod actions;
pub mod input;
pub mod state;

pub use input::handle_input;
pub use state::{App, Focus};
