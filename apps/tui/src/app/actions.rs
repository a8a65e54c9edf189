use crate::db::{create_database_pool, LastQueryStore};
use crate::geo::LocationLookup;
use color_eyre::Result;
use ip_tracker_core::machine::Effect;
use ip_tracker_core::{LookupError, LookupRecord, LookupRequest, RequestId};
use log::{debug, warn};
use std::path::Path;
use std::sync::Arc;
use tokio::sync::mpsc::{unbounded_channel, UnboundedReceiver, UnboundedSender};

/// A finished lookup on its way back to the UI thread.
#[derive(Debug)]
pub struct LookupOutcome {
    pub request: RequestId,
    pub result: Result<LookupRecord, LookupError>,
}

/// Runs the effects the lookup controller asks for: storage writes and fetches.
pub struct AppActions {
    pub store: Option<LastQueryStore>,
    pub fallback_ip: String,
    lookup: Arc<dyn LocationLookup>,
    outcomes_tx: UnboundedSender<LookupOutcome>,
    outcomes_rx: UnboundedReceiver<LookupOutcome>,
}

impl std::fmt::Debug for AppActions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppActions")
            .field("store", &self.store)
            .field("fallback_ip", &self.fallback_ip)
            .finish_non_exhaustive()
    }
}

impl AppActions {
    pub fn new(lookup: Arc<dyn LocationLookup>, fallback_ip: impl Into<String>) -> Self {
        let (outcomes_tx, outcomes_rx) = unbounded_channel();
        Self {
            store: None,
            fallback_ip: fallback_ip.into(),
            lookup,
            outcomes_tx,
            outcomes_rx,
        }
    }

    pub async fn initialize(&mut self, db_path: &Path) -> Result<()> {
        let pool = create_database_pool(db_path).await?;
        self.store = Some(LastQueryStore::new(pool, self.fallback_ip.clone()));
        Ok(())
    }

    /// Remembered address, or the fallback when storage is unavailable.
    pub async fn load_last_query(&self) -> String {
        let Some(store) = &self.store else {
            return self.fallback_ip.clone();
        };

        match store.load_last_query().await {
            Ok(address) => address,
            Err(e) => {
                warn!("Failed to read last query, using {}: {e}", self.fallback_ip);
                self.fallback_ip.clone()
            }
        }
    }

    pub async fn forget_last_query(&self) -> Result<()> {
        if let Some(store) = &self.store {
            store.forget_last_query().await?;
        }
        Ok(())
    }

    /// Runs effects in order. Storage failures are logged, never fatal.
    pub async fn execute(&self, effects: Vec<Effect>) {
        for effect in effects {
            match effect {
                Effect::Persist(query) => match &self.store {
                    Some(store) => {
                        if let Err(e) = store.save_last_query(&query).await {
                            warn!("Failed to remember {query}: {e}");
                        }
                    }
                    None => debug!("No storage available, not remembering {query}"),
                },
                Effect::Fetch(request) => self.spawn_fetch(request),
            }
        }
    }

    fn spawn_fetch(&self, request: LookupRequest) {
        debug!("Fetching {} for {}", request.id, request.address);
        let fetch = self.lookup.fetch_location(&request.address);
        let outcomes = self.outcomes_tx.clone();

        tokio::spawn(async move {
            let result = fetch.await;
            // The receiver only goes away when the app is shutting down.
            let _ = outcomes.send(LookupOutcome {
                request: request.id,
                result,
            });
        });
    }

    pub fn try_next_outcome(&mut self) -> Option<LookupOutcome> {
        self.outcomes_rx.try_recv().ok()
    }

    pub async fn next_outcome(&mut self) -> Option<LookupOutcome> {
        self.outcomes_rx.recv().await
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::db::queries::tests::setup_test_db;
    use futures::future::BoxFuture;
    use futures::FutureExt;
    use ip_tracker_core::storage::DEFAULT_LAST_QUERY;
    use ip_tracker_core::Ipv4Query;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    /// Answers every lookup with a fixed result and records the addresses asked for.
    pub(crate) struct StubLookup {
        pub(crate) result: Result<LookupRecord, LookupError>,
        pub(crate) calls: AtomicUsize,
        pub(crate) addresses: Mutex<Vec<String>>,
    }

    impl StubLookup {
        pub(crate) fn new(result: Result<LookupRecord, LookupError>) -> Arc<Self> {
            Arc::new(Self {
                result,
                calls: AtomicUsize::new(0),
                addresses: Mutex::new(Vec::new()),
            })
        }

        pub(crate) fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    impl LocationLookup for StubLookup {
        fn fetch_location(
            &self,
            address: &str,
        ) -> BoxFuture<'static, Result<LookupRecord, LookupError>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if let Ok(mut addresses) = self.addresses.lock() {
                addresses.push(address.to_string());
            }
            futures::future::ready(self.result.clone()).boxed()
        }
    }

    pub(crate) fn google() -> LookupRecord {
        LookupRecord {
            ip: "8.8.8.8".to_string(),
            country: "US".to_string(),
            region: "CA".to_string(),
            timezone: "UTC-08:00".to_string(),
            isp: "Google".to_string(),
            lat: 37.4,
            lng: -122.1,
        }
    }

    #[tokio::test]
    async fn test_persist_then_fetch() -> Result<(), Box<dyn std::error::Error>> {
        let stub = StubLookup::new(Ok(google()));
        let mut actions = AppActions::new(stub.clone(), DEFAULT_LAST_QUERY);
        actions.store = Some(LastQueryStore::new(
            setup_test_db().await?,
            DEFAULT_LAST_QUERY,
        ));

        let mut controller = ip_tracker_core::LookupController::new(Default::default());
        let transition = controller
            .dispatch(ip_tracker_core::LookupEvent::Submit("8.8.8.8".to_string()))?;
        actions.execute(transition.effects).await;

        let outcome = actions.next_outcome().await.ok_or("no outcome")?;
        assert_eq!(outcome.result, Ok(google()));
        assert_eq!(stub.calls(), 1);
        assert_eq!(actions.load_last_query().await, "8.8.8.8");
        Ok(())
    }

    #[tokio::test]
    async fn test_persist_without_store_is_skipped() -> Result<(), Box<dyn std::error::Error>> {
        let stub = StubLookup::new(Ok(google()));
        let actions = AppActions::new(stub.clone(), DEFAULT_LAST_QUERY);

        actions
            .execute(vec![Effect::Persist(Ipv4Query::parse("8.8.8.8")?)])
            .await;

        assert_eq!(actions.load_last_query().await, DEFAULT_LAST_QUERY);
        assert_eq!(stub.calls(), 0);
        Ok(())
    }
}
