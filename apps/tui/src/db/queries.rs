use sqlx::{query, query_scalar, SqlitePool};

/// Reads one value, `None` when the key was never written
pub async fn get_item(pool: &SqlitePool, key: &str) -> Result<Option<String>, sqlx::Error> {
    query_scalar("SELECT value FROM local_storage WHERE key = ?")
        .bind(key)
        .fetch_optional(pool)
        .await
}

/// Writes one value, replacing whatever was stored under `key`
pub async fn set_item(pool: &SqlitePool, key: &str, value: &str) -> Result<(), sqlx::Error> {
    query(
        "INSERT INTO local_storage (key, value) VALUES (?, ?)
         ON CONFLICT(key) DO UPDATE SET value = excluded.value",
    )
    .bind(key)
    .bind(value)
    .execute(pool)
    .await?;

    Ok(())
}

pub async fn remove_item(pool: &SqlitePool, key: &str) -> Result<(), sqlx::Error> {
    query("DELETE FROM local_storage WHERE key = ?")
        .bind(key)
        .execute(pool)
        .await?;

    Ok(())
}
