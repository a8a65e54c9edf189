use crate::app::actions::{AppActions, LookupOutcome};
use crate::config::AppSettings;
use crate::geo::LocationLookup;
use chrono::{DateTime, Local};
use color_eyre::Result;
use ip_tracker_core::machine::Transition;
use ip_tracker_core::{LookupController, LookupEvent, LookupPhase, Viewport};
use log::{debug, error, info, warn};
use ratatui::layout::Rect;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Which half of the screen receives key presses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Focus {
    Query,
    Map,
}

#[derive(Debug)]
pub struct App {
    pub running: bool,
    pub focus: Focus,
    pub current_input: String,
    pub tracker: LookupController,
    pub actions: AppActions,
    pub show_help: bool,
    pub status_message: String,
    pub animation_counter: f64,
    pub last_frame: Instant,
    pub notification_raised_at: Option<Instant>,
    pub last_updated: Option<DateTime<Local>>,
    pub database_path: PathBuf,
    cell_width_px: f64,
    cell_height_px: f64,
}

impl App {
    pub fn new(settings: &AppSettings, lookup: Arc<dyn LocationLookup>) -> Self {
        let tracker = LookupController::new(settings.tracker.clone());
        let actions = AppActions::new(lookup, settings.tracker.default_ip.clone());

        Self {
            running: true,
            focus: Focus::Query,
            current_input: String::new(),
            tracker,
            actions,
            show_help: false,
            status_message: String::new(),
            animation_counter: 0.0,
            last_frame: Instant::now(),
            notification_raised_at: None,
            last_updated: None,
            database_path: settings.database_path.clone(),
            cell_width_px: settings.cell_width_px,
            cell_height_px: settings.cell_height_px,
        }
    }

    pub async fn initialize_db(&mut self) -> Result<()> {
        let path = self.database_path.clone();
        self.actions.initialize(&path).await?;
        info!("Last query storage ready at {}", path.display());
        Ok(())
    }

    pub fn update(&mut self) {
        let now = Instant::now();
        let delta = now.duration_since(self.last_frame);
        self.last_frame = now;

        // Update animation counter (cycles between 0 and 2*PI)
        self.animation_counter += delta.as_secs_f64() * 2.0;
        if self.animation_counter > 2.0 * std::f64::consts::PI {
            self.animation_counter -= 2.0 * std::f64::consts::PI;
        }

        let lifetime = self.tracker.config().notification_duration;
        if self.notification_expired(now, lifetime) {
            self.tracker.dismiss_notification();
            self.notification_raised_at = None;
        }
    }

    fn notification_expired(&self, now: Instant, lifetime: Duration) -> bool {
        self.tracker.notification().is_some()
            && self
                .notification_raised_at
                .is_some_and(|raised| now.duration_since(raised) >= lifetime)
    }

    /// Resizes the logical map viewport to the terminal area the map occupies.
    pub fn sync_viewport(&mut self, area: Rect) {
        let viewport = Viewport::new(
            f64::from(area.width) * self.cell_width_px,
            f64::from(area.height) * self.cell_height_px,
        );
        if viewport != self.tracker.map().viewport() {
            self.tracker.map_mut().set_viewport(viewport);
        }
    }

    /// Fires the first lookup: `requested` if given (validated like a typed
    /// query), otherwise whatever address was remembered last.
    pub async fn start(&mut self, requested: Option<String>) {
        if let Some(address) = requested {
            self.current_input.clone_from(&address);
            self.submit_query().await;
            return;
        }

        let address = self.actions.load_last_query().await;
        self.current_input.clone_from(&address);
        self.dispatch(LookupEvent::Startup(address)).await;
    }

    pub async fn submit_query(&mut self) {
        let raw = self.current_input.clone();
        self.dispatch(LookupEvent::Submit(raw)).await;
    }

    pub async fn apply_outcome(&mut self, outcome: LookupOutcome) {
        if let Err(e) = &outcome.result {
            error!("Lookup {} failed: {e}", outcome.request);
        }
        self.dispatch(LookupEvent::Resolved {
            request: outcome.request,
            result: outcome.result,
        })
        .await;
    }

    /// Applies every lookup that finished since the last tick.
    pub async fn drain_outcomes(&mut self) {
        while let Some(outcome) = self.actions.try_next_outcome() {
            self.apply_outcome(outcome).await;
        }
    }

    async fn dispatch(&mut self, event: LookupEvent) {
        let label = event.to_string();
        match self.tracker.dispatch(event) {
            Ok(transition) => {
                debug!("{label}: {:?}", transition.trace);
                self.observe(&transition);
                self.actions.execute(transition.effects).await;
            }
            Err(e) => warn!("{e}"),
        }
    }

    fn observe(&mut self, transition: &Transition) {
        if transition.discarded {
            debug!("Dropped a superseded lookup response");
            return;
        }

        for phase in &transition.trace {
            match phase {
                LookupPhase::Invalid | LookupPhase::Failed => {
                    self.notification_raised_at = Some(Instant::now());
                }
                LookupPhase::Rendered => {
                    self.last_updated = Some(Local::now());
                    self.status_message = format!("Showing {}", self.tracker.panel().ip);
                }
                LookupPhase::Fetching => {
                    if let Some(request) = transition.fetch() {
                        self.status_message = format!("Looking up {}...", request.address);
                    }
                }
                LookupPhase::Idle | LookupPhase::Validating => {}
            }
        }
    }

    pub fn toggle_focus(&mut self) {
        self.focus = match self.focus {
            Focus::Query => Focus::Map,
            Focus::Map => Focus::Query,
        };
    }

    pub fn quit(&mut self) {
        self.running = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::actions::tests::{google, StubLookup};
    use crate::db::queries::tests::setup_test_db;
    use crate::db::LastQueryStore;
    use ip_tracker_core::notification::NotificationLevel;
    use ip_tracker_core::{LookupError, TrackerConfig};
    use std::path::Path;

    fn settings() -> AppSettings {
        AppSettings {
            tracker: TrackerConfig::default(),
            database_path: PathBuf::from("unused.db"),
            log_file: PathBuf::from("unused.log"),
            lookup_timeout: None,
            cell_width_px: 8.0,
            cell_height_px: 16.0,
        }
    }

    async fn app_with(stub: Arc<StubLookup>) -> Result<App, Box<dyn std::error::Error>> {
        let mut app = App::new(&settings(), stub);
        app.actions.store = Some(LastQueryStore::new(
            setup_test_db().await?,
            "101.11.201.22",
        ));
        Ok(app)
    }

    async fn settle(app: &mut App) -> Result<(), Box<dyn std::error::Error>> {
        let outcome = app.actions.next_outcome().await.ok_or("no outcome")?;
        app.apply_outcome(outcome).await;
        Ok(())
    }

    #[tokio::test]
    async fn test_startup_uses_default_address() -> Result<(), Box<dyn std::error::Error>> {
        let stub = StubLookup::new(Ok(google()));
        let mut app = app_with(stub.clone()).await?;

        app.start(None).await;
        settle(&mut app).await?;

        assert_eq!(app.current_input, "101.11.201.22");
        assert_eq!(
            stub.addresses.lock().map_err(|e| e.to_string())?.as_slice(),
            ["101.11.201.22".to_string()]
        );
        assert_eq!(app.tracker.panel().ip, "8.8.8.8");
        assert!(app.last_updated.is_some());
        Ok(())
    }

    #[tokio::test]
    async fn test_requested_address_is_validated_and_remembered(
    ) -> Result<(), Box<dyn std::error::Error>> {
        let stub = StubLookup::new(Ok(google()));
        let mut app = app_with(stub.clone()).await?;

        app.start(Some("8.8.8.8".to_string())).await;
        settle(&mut app).await?;

        assert_eq!(stub.calls(), 1);
        assert_eq!(app.actions.load_last_query().await, "8.8.8.8");
        Ok(())
    }

    #[tokio::test]
    async fn test_invalid_submit_warns_without_request() -> Result<(), Box<dyn std::error::Error>> {
        let stub = StubLookup::new(Ok(google()));
        let mut app = app_with(stub.clone()).await?;

        app.current_input = "not-an-ip".to_string();
        app.submit_query().await;

        assert_eq!(stub.calls(), 0);
        let notification = app.tracker.notification().ok_or("no notification")?;
        assert_eq!(notification.level, NotificationLevel::Warning);
        assert!(app.notification_raised_at.is_some());
        assert_eq!(app.actions.load_last_query().await, "101.11.201.22");
        Ok(())
    }

    #[tokio::test]
    async fn test_failed_lookup_keeps_panel_but_persists_query(
    ) -> Result<(), Box<dyn std::error::Error>> {
        let stub = StubLookup::new(Err(LookupError::Status(403)));
        let mut app = app_with(stub).await?;

        app.current_input = "8.8.4.4".to_string();
        app.submit_query().await;
        settle(&mut app).await?;

        let notification = app.tracker.notification().ok_or("no notification")?;
        assert_eq!(notification.level, NotificationLevel::Danger);
        assert_eq!(app.tracker.panel().ip, "101.11.201.22");
        assert_eq!(app.actions.load_last_query().await, "8.8.4.4");
        assert!(app.last_updated.is_none());
        Ok(())
    }

    #[tokio::test]
    async fn test_notification_expires() -> Result<(), Box<dyn std::error::Error>> {
        let stub = StubLookup::new(Ok(google()));
        let mut app = app_with(stub).await?;

        app.current_input = "999.1.1.1".to_string();
        app.submit_query().await;
        assert!(app.tracker.notification().is_some());

        app.notification_raised_at = Instant::now().checked_sub(Duration::from_secs(5));
        app.update();

        assert!(app.tracker.notification().is_none());
        Ok(())
    }

    #[test]
    fn test_viewport_follows_map_area() {
        let stub = StubLookup::new(Ok(google()));
        let mut app = App::new(&settings(), stub);

        app.sync_viewport(Rect::new(0, 0, 100, 30));

        assert_eq!(app.tracker.map().viewport(), Viewport::new(800.0, 480.0));
        assert_eq!(app.database_path, Path::new("unused.db"));
    }
}
