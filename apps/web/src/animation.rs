/// Longest step the spinner takes after the tab was in the background.
const MAX_FRAME_DELTA: f64 = 0.25;
const SPINNER_SPEED: f64 = 2.0;
const FULL_ROTATION: f64 = 2.0 * std::f64::consts::PI;

pub const SPINNER: [&str; 10] = ["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"];

/// Draw-loop clock shared by the spinner and the cursor blink.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct FrameClock {
    pub counter: f64,
    pub last_tick: Option<f64>,
}

impl FrameClock {
    pub fn advance(&mut self, now_seconds: f64) {
        let delta = self
            .last_tick
            .map_or(0.0, |last| (now_seconds - last).clamp(0.0, MAX_FRAME_DELTA));
        self.counter = (self.counter + delta * SPINNER_SPEED).rem_euclid(FULL_ROTATION);
        self.last_tick = Some(now_seconds);
    }

    pub fn spinner(&self) -> &'static str {
        #[allow(
            clippy::cast_possible_truncation,
            clippy::cast_sign_loss,
            clippy::cast_precision_loss
        )]
        let index = (self.counter / FULL_ROTATION * SPINNER.len() as f64) as usize % SPINNER.len();
        SPINNER[index]
    }

    pub fn cursor(&self) -> &'static str {
        if (self.counter * 2.0).sin() > 0.0 {
            "█"
        } else {
            " "
        }
    }
}

/// Whether a banner raised at `raised_at` has outlived `lifetime_seconds`.
pub fn notification_expired(raised_at: Option<f64>, now_seconds: f64, lifetime_seconds: f64) -> bool {
    raised_at.is_some_and(|raised| now_seconds - raised >= lifetime_seconds)
}
