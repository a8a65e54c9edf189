pub const INVALID_ADDRESS_MESSAGE: &str = "You have entered an invalid IP address.";
pub const LOOKUP_FAILURE_MESSAGE: &str = "Something wrong, look console :(";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationLevel {
    Warning,
    Danger,
}

impl NotificationLevel {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Warning => "Warning",
            Self::Danger => "Error",
        }
    }
}

/// A transient banner. Front ends decide how long it stays on screen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub level: NotificationLevel,
    pub message: String,
}

impl Notification {
    pub fn invalid_address() -> Self {
        Self {
            level: NotificationLevel::Warning,
            message: INVALID_ADDRESS_MESSAGE.to_string(),
        }
    }

    pub fn lookup_failure() -> Self {
        Self {
            level: NotificationLevel::Danger,
            message: LOOKUP_FAILURE_MESSAGE.to_string(),
        }
    }
}
