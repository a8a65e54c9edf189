use color_eyre::eyre::eyre;
use color_eyre::Result;
use crossterm::event::{self, Event, KeyEventKind};
use ip_tracker_core::{LookupRecord, NotificationLevel};
use log::{debug, warn};
use ratatui::layout::Rect;
use std::time::Duration;

use crate::app::{handle_input, App};
use crate::terminal::Tui;
use crate::ui;

/// Look up one address, print it, exit. The outcome decides the exit status.
pub async fn run_headless(app: &mut App, requested: Option<String>, json: bool) -> Result<()> {
    app.start(requested).await;

    while app.tracker.is_fetching() {
        let Some(outcome) = app.actions.next_outcome().await else {
            return Err(eyre!("lookup task ended without an answer"));
        };
        app.apply_outcome(outcome).await;
    }

    if let Some(notification) = app.tracker.notification() {
        return Err(match notification.level {
            NotificationLevel::Warning => eyre!("{}: {}", notification.message, app.current_input),
            NotificationLevel::Danger => eyre!("{}", notification.message),
        });
    }

    let Some(record) = app.tracker.last_record() else {
        return Err(eyre!("no lookup result"));
    };

    if json {
        render_headless_json(record)?;
    } else {
        render_headless_fields(app);
    }

    Ok(())
}

fn render_headless_fields(app: &App) {
    println!("\nIP Address Tracker");
    println!("==================");
    for (label, value) in app.tracker.panel().rows() {
        println!("{label}: {value}");
    }
}

fn render_headless_json(record: &LookupRecord) -> Result<()> {
    let json = serde_json::to_string_pretty(record)?;
    println!("{json}");
    Ok(())
}

/// Run the main application event loop
pub async fn run(terminal: &mut Tui, app: &mut App, requested: Option<String>) -> Result<()> {
    // Configure event poll timeout (ms)
    const EVENT_POLL_TIMEOUT: u64 = 50;

    // The viewport has to be known before the first lookup lands so the
    // mobile offset sees the real map size.
    let size = terminal.size()?;
    app.sync_viewport(ui::map_area(Rect::new(0, 0, size.width, size.height)));
    app.start(requested).await;

    while app.running {
        // Update animations and expire notifications
        app.update();

        terminal
            .draw(|f| {
                app.sync_viewport(ui::map_area(f.area()));
                ui::ui(app, f);
            })
            .map_err(|e| eyre!("Terminal draw error: {e}"))?;

        if matches!(
            event::poll(Duration::from_millis(EVENT_POLL_TIMEOUT)),
            Ok(true)
        ) {
            match event::read() {
                Ok(Event::Key(key)) if key.kind == KeyEventKind::Press => {
                    handle_input(app, key).await;
                }
                Ok(Event::Resize(width, height)) => {
                    debug!("Terminal resized to {width}x{height}");
                }
                Ok(_) => {}
                Err(e) => warn!("Failed to read terminal event: {e}"),
            }
        }

        app.drain_outcomes().await;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::actions::tests::{google, StubLookup};
    use crate::config::AppSettings;
    use ip_tracker_core::{LookupError, TrackerConfig};
    use std::path::PathBuf;
    use std::sync::Arc;

    fn app(stub: Arc<StubLookup>) -> App {
        let settings = AppSettings {
            tracker: TrackerConfig::default(),
            database_path: PathBuf::from("unused.db"),
            log_file: PathBuf::from("unused.log"),
            lookup_timeout: None,
            cell_width_px: 8.0,
            cell_height_px: 16.0,
        };
        App::new(&settings, stub)
    }

    #[tokio::test]
    async fn test_headless_lookup_succeeds() -> Result<()> {
        let stub = StubLookup::new(Ok(google()));
        let mut app = app(stub.clone());

        run_headless(&mut app, Some("8.8.8.8".to_string()), true).await?;

        assert_eq!(stub.calls(), 1);
        assert_eq!(app.tracker.panel().location, "US CA");
        Ok(())
    }

    #[tokio::test]
    async fn test_headless_rejects_invalid_address() {
        let stub = StubLookup::new(Ok(google()));
        let mut app = app(stub.clone());

        let result = run_headless(&mut app, Some("1.2.3".to_string()), false).await;

        assert!(result.is_err());
        assert_eq!(stub.calls(), 0);
    }

    #[tokio::test]
    async fn test_headless_reports_lookup_failure() {
        let stub = StubLookup::new(Err(LookupError::Status(500)));
        let mut app = app(stub);

        let result = run_headless(&mut app, None, false).await;

        let message = result.err().map(|e| e.to_string()).unwrap_or_default();
        assert_eq!(message, "Something wrong, look console :(");
    }

    #[test]
    fn test_headless_json_shape() -> Result<()> {
        let record = google();
        let value = serde_json::to_value(&record)?;

        assert_eq!(value["ip"], "8.8.8.8");
        assert_eq!(value["country"], "US");
        assert_eq!(value["region"], "CA");
        assert_eq!(value["isp"], "Google");
        assert_eq!(value["timezone"], "UTC-08:00");
        assert_eq!(value["lat"], 37.4);
        Ok(())
    }
}
