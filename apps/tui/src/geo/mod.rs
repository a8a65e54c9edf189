mod client;

pub use client::GeoClient;

use futures::future::BoxFuture;
use ip_tracker_core::{LookupError, LookupRecord};

/// Resolves an address to a [`LookupRecord`].
///
/// The event loop only talks to this trait so it can run against a stub in tests.
pub trait LocationLookup: Send + Sync {
    fn fetch_location(&self, address: &str) -> BoxFuture<'static, Result<LookupRecord, LookupError>>;
}
