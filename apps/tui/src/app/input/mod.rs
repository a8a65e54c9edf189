use crate::app::state::{App, Focus};
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

/// Fraction of the visible map moved by one arrow key press.
const PAN_STEP: f64 = 0.1;

pub async fn handle_input(app: &mut App, key: KeyEvent) {
    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
        app.quit();
        return;
    }

    if app.show_help {
        // Any key closes the help popup
        app.show_help = false;
        return;
    }

    match key.code {
        KeyCode::F(1) => app.show_help = true,
        KeyCode::Tab | KeyCode::BackTab => app.toggle_focus(),
        _ => match app.focus {
            Focus::Query => handle_query_input(app, key.code).await,
            Focus::Map => handle_map_input(app, key.code),
        },
    }
}

async fn handle_query_input(app: &mut App, key: KeyCode) {
    match key {
        KeyCode::Enter => app.submit_query().await,
        KeyCode::Esc => app.current_input.clear(),
        KeyCode::Backspace => {
            app.current_input.pop();
        }
        KeyCode::Char(c) => app.current_input.push(c),
        _ => {}
    }
}

fn handle_map_input(app: &mut App, key: KeyCode) {
    let viewport = app.tracker.map().viewport();
    let step_x = viewport.width * PAN_STEP;
    let step_y = viewport.height * PAN_STEP;

    match key {
        KeyCode::Left | KeyCode::Char('h') => app.tracker.map_mut().pan_by(-step_x, 0.0),
        KeyCode::Right | KeyCode::Char('l') => app.tracker.map_mut().pan_by(step_x, 0.0),
        KeyCode::Up | KeyCode::Char('k') => app.tracker.map_mut().pan_by(0.0, -step_y),
        KeyCode::Down | KeyCode::Char('j') => app.tracker.map_mut().pan_by(0.0, step_y),
        KeyCode::Char('+' | '=') => app.tracker.map_mut().zoom_in(),
        KeyCode::Char('-') => app.tracker.map_mut().zoom_out(),
        KeyCode::Char('?') => app.show_help = true,
        KeyCode::Char('q') | KeyCode::Esc => app.quit(),
        _ => {}
    }
}
