//! Shared lookup core for the IP tracker front ends.
//!
//! Nothing in this crate performs I/O: the terminal and web apps own the HTTP
//! client and the storage backend and feed results back through
//! [`machine::LookupController::dispatch`].

pub mod config;
pub mod machine;
pub mod map;
pub mod notification;
pub mod record;
pub mod storage;
pub mod validate;
pub mod view;

pub use config::{MarkerPolicy, TrackerConfig};
pub use machine::{Effect, LookupController, LookupEvent, LookupPhase, LookupRequest, RequestId};
pub use map::{LatLng, MapOptions, MapView, Viewport};
pub use notification::{Notification, NotificationLevel};
pub use record::{LookupError, LookupRecord};
pub use validate::{is_valid_ipv4, Ipv4Query};
pub use view::InfoPanel;
