use crate::animation::{notification_expired, FrameClock};
use ip_tracker_core::machine::TransitionError;
use ip_tracker_core::{Effect, LookupController, LookupEvent, LookupPhase, TrackerConfig, Viewport};
use ratzilla::event::KeyCode;

/// Logical pixels per DOM grid cell.
pub const CELL_HEIGHT_PX: f64 = 16.0;

/// Fraction of the visible map moved by one arrow key press.
const PAN_STEP: f64 = 0.1;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Focus {
    Query,
    Map,
}

/// Everything the draw callback and the key handler share.
#[derive(Debug)]
pub struct WebApp {
    pub tracker: LookupController,
    pub input: String,
    pub focus: Focus,
    pub show_help: bool,
    pub clock: FrameClock,
    pub notification_raised_at: Option<f64>,
}

impl WebApp {
    pub fn new(config: TrackerConfig) -> Self {
        Self {
            tracker: LookupController::new(config),
            input: String::new(),
            focus: Focus::Query,
            show_help: false,
            clock: FrameClock::default(),
            notification_raised_at: None,
        }
    }

    /// Feeds one event to the controller and returns the effects to run.
    pub fn dispatch(&mut self, event: LookupEvent, now: f64) -> Result<Vec<Effect>, TransitionError> {
        let transition = self.tracker.dispatch(event)?;
        if transition
            .trace
            .iter()
            .any(|phase| matches!(phase, LookupPhase::Invalid | LookupPhase::Failed))
        {
            self.notification_raised_at = Some(now);
        }
        Ok(transition.effects)
    }

    pub fn startup(&mut self, address: String, now: f64) -> Result<Vec<Effect>, TransitionError> {
        self.input.clone_from(&address);
        self.dispatch(LookupEvent::Startup(address), now)
    }

    /// Advances the clock and drops an expired banner.
    pub fn tick(&mut self, now: f64) {
        self.clock.advance(now);
        let lifetime = self.tracker.config().notification_duration.as_secs_f64();
        if notification_expired(self.notification_raised_at, now, lifetime) {
            self.tracker.dismiss_notification();
            self.notification_raised_at = None;
        }
    }

    pub fn handle_key(
        &mut self,
        code: KeyCode,
        now: f64,
    ) -> Result<Vec<Effect>, TransitionError> {
        if self.show_help {
            self.show_help = false;
            return Ok(Vec::new());
        }

        match code {
            KeyCode::F(1) => self.show_help = true,
            KeyCode::Tab => {
                self.focus = match self.focus {
                    Focus::Query => Focus::Map,
                    Focus::Map => Focus::Query,
                };
            }
            _ => match self.focus {
                Focus::Query => return self.handle_query_key(code, now),
                Focus::Map => self.handle_map_key(code),
            },
        }
        Ok(Vec::new())
    }

    fn handle_query_key(&mut self, code: KeyCode, now: f64) -> Result<Vec<Effect>, TransitionError> {
        match code {
            KeyCode::Enter => {
                let raw = self.input.clone();
                return self.dispatch(LookupEvent::Submit(raw), now);
            }
            KeyCode::Esc => self.input.clear(),
            KeyCode::Backspace => {
                self.input.pop();
            }
            KeyCode::Char(c) => self.input.push(c),
            _ => {}
        }
        Ok(Vec::new())
    }

    fn handle_map_key(&mut self, code: KeyCode) {
        let viewport = self.tracker.map().viewport();
        let step_x = viewport.width * PAN_STEP;
        let step_y = viewport.height * PAN_STEP;
        let map = self.tracker.map_mut();

        match code {
            KeyCode::Left | KeyCode::Char('h') => map.pan_by(-step_x, 0.0),
            KeyCode::Right | KeyCode::Char('l') => map.pan_by(step_x, 0.0),
            KeyCode::Up | KeyCode::Char('k') => map.pan_by(0.0, -step_y),
            KeyCode::Down | KeyCode::Char('j') => map.pan_by(0.0, step_y),
            KeyCode::Char('+' | '=') => map.zoom_in(),
            KeyCode::Char('-') => map.zoom_out(),
            KeyCode::Char('?') => self.show_help = true,
            _ => {}
        }
    }
}

/// Map viewport for a window `inner_width` CSS px wide whose map panel is
/// `map_rows` cells tall. The media query decides which side of the
/// breakpoint the width lands on.
pub fn viewport_for(inner_width: f64, mobile: bool, breakpoint: f64, map_rows: u16) -> Viewport {
    let width = if mobile {
        inner_width.min(breakpoint)
    } else {
        inner_width.max(breakpoint + 1.0)
    };
    Viewport::new(width, f64::from(map_rows) * CELL_HEIGHT_PX)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ip_tracker_core::notification::NotificationLevel;

    fn type_text(app: &mut WebApp, text: &str) {
        for c in text.chars() {
            let effects = app.handle_key(KeyCode::Char(c), 0.0);
            assert!(matches!(effects, Ok(ref e) if e.is_empty()));
        }
    }

    #[test]
    fn enter_with_bad_address_warns_without_effects() -> Result<(), TransitionError> {
        let mut app = WebApp::new(TrackerConfig::default());
        type_text(&mut app, "not-an-ip");

        let effects = app.handle_key(KeyCode::Enter, 5.0)?;

        assert!(effects.is_empty());
        assert_eq!(
            app.tracker.notification().map(|n| n.level),
            Some(NotificationLevel::Warning)
        );
        assert_eq!(app.notification_raised_at, Some(5.0));
        Ok(())
    }

    #[test]
    fn enter_with_good_address_persists_then_fetches() -> Result<(), TransitionError> {
        let mut app = WebApp::new(TrackerConfig::default());
        type_text(&mut app, "8.8.8.8");

        let effects = app.handle_key(KeyCode::Enter, 0.0)?;

        assert_eq!(effects.len(), 2);
        assert!(matches!(effects[0], Effect::Persist(_)));
        assert!(matches!(effects[1], Effect::Fetch(ref request) if request.address == "8.8.8.8"));
        Ok(())
    }

    #[test]
    fn banner_is_dropped_after_its_lifetime() -> Result<(), TransitionError> {
        let mut app = WebApp::new(TrackerConfig::default());
        type_text(&mut app, "1.2.3");
        app.handle_key(KeyCode::Enter, 10.0)?;

        app.tick(12.0);
        assert!(app.tracker.notification().is_some());
        app.tick(13.5);
        assert!(app.tracker.notification().is_none());
        Ok(())
    }

    #[test]
    fn arrows_move_the_map_only_when_focused() -> Result<(), TransitionError> {
        let mut app = WebApp::new(TrackerConfig::default());
        let start = app.tracker.map().center();

        app.handle_key(KeyCode::Up, 0.0)?;
        assert_eq!(app.tracker.map().center(), start);

        app.handle_key(KeyCode::Tab, 0.0)?;
        app.handle_key(KeyCode::Up, 0.0)?;
        assert!(app.tracker.map().center().lat > start.lat);
        Ok(())
    }

    #[test]
    fn vi_keys_and_help_work_on_the_map() -> Result<(), TransitionError> {
        let mut app = WebApp::new(TrackerConfig::default());
        app.handle_key(KeyCode::Tab, 0.0)?;
        let start = app.tracker.map().center();

        app.handle_key(KeyCode::Char('l'), 0.0)?;
        assert!(app.tracker.map().center().lng > start.lng);
        app.handle_key(KeyCode::Char('j'), 0.0)?;
        assert!(app.tracker.map().center().lat < start.lat);

        app.handle_key(KeyCode::Char('?'), 0.0)?;
        assert!(app.show_help);
        assert!(app.input.is_empty());
        Ok(())
    }

    #[test]
    fn media_query_decides_breakpoint_side() {
        assert_eq!(viewport_for(1000.0, true, 992.0, 30), Viewport::new(992.0, 480.0));
        assert_eq!(viewport_for(900.0, false, 992.0, 30), Viewport::new(993.0, 480.0));
        assert_eq!(viewport_for(1400.0, false, 992.0, 10), Viewport::new(1400.0, 160.0));
    }
}
