use crate::db::queries::{get_item, remove_item, set_item};
use ip_tracker_core::storage::{encode_last_query, resolve_last_query, LAST_QUERY_KEY};
use ip_tracker_core::Ipv4Query;
use log::warn;
use sqlx::SqlitePool;

/// Last searched address, stored the way the browser widget keeps it in
/// `localStorage`: a JSON string under `"ip-address"`.
#[derive(Debug, Clone)]
pub struct LastQueryStore {
    pool: SqlitePool,
    fallback: String,
}

impl LastQueryStore {
    pub fn new(pool: SqlitePool, fallback: impl Into<String>) -> Self {
        Self {
            pool,
            fallback: fallback.into(),
        }
    }

    /// Stored address, or the fallback when nothing usable is stored.
    pub async fn load_last_query(&self) -> Result<String, sqlx::Error> {
        let raw = get_item(&self.pool, LAST_QUERY_KEY).await?;
        match resolve_last_query(raw.as_deref(), &self.fallback) {
            Ok(address) => Ok(address),
            Err(e) => {
                warn!("Ignoring stored {LAST_QUERY_KEY:?} value: {e}");
                Ok(self.fallback.clone())
            }
        }
    }

    pub async fn save_last_query(&self, query: &Ipv4Query) -> Result<(), sqlx::Error> {
        set_item(&self.pool, LAST_QUERY_KEY, &encode_last_query(query)).await
    }

    pub async fn forget_last_query(&self) -> Result<(), sqlx::Error> {
        remove_item(&self.pool, LAST_QUERY_KEY).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::queries::tests::setup_test_db;
    use ip_tracker_core::storage::DEFAULT_LAST_QUERY;

    #[tokio::test]
    async fn test_load_without_save_returns_default() -> Result<(), Box<dyn std::error::Error>> {
        let store = LastQueryStore::new(setup_test_db().await?, DEFAULT_LAST_QUERY);

        assert_eq!(store.load_last_query().await?, "101.11.201.22");

        Ok(())
    }

    #[tokio::test]
    async fn test_save_then_load_round_trips() -> Result<(), Box<dyn std::error::Error>> {
        let pool = setup_test_db().await?;
        let store = LastQueryStore::new(pool.clone(), DEFAULT_LAST_QUERY);

        store.save_last_query(&Ipv4Query::parse("9.9.9.9")?).await?;

        assert_eq!(store.load_last_query().await?, "9.9.9.9");
        assert_eq!(
            get_item(&pool, LAST_QUERY_KEY).await?,
            Some("\"9.9.9.9\"".to_string())
        );

        Ok(())
    }

    #[tokio::test]
    async fn test_corrupt_value_falls_back() -> Result<(), Box<dyn std::error::Error>> {
        let pool = setup_test_db().await?;
        set_item(&pool, LAST_QUERY_KEY, "{not json").await?;
        let store = LastQueryStore::new(pool, DEFAULT_LAST_QUERY);

        assert_eq!(store.load_last_query().await?, DEFAULT_LAST_QUERY);

        Ok(())
    }

    #[tokio::test]
    async fn test_forget_restores_default() -> Result<(), Box<dyn std::error::Error>> {
        let store = LastQueryStore::new(setup_test_db().await?, DEFAULT_LAST_QUERY);

        store.save_last_query(&Ipv4Query::parse("9.9.9.9")?).await?;
        store.forget_last_query().await?;

        assert_eq!(store.load_last_query().await?, DEFAULT_LAST_QUERY);

        Ok(())
    }
}
