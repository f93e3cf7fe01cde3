use async_trait::async_trait;

use super::schema::Database;
use super::types::StoreError;

/// Durable string key-value slot, the collaborator behind every collection.
///
/// Implementations must make `set` a single replacing write: after it
/// returns, `get` for the same key yields the new value.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// Value stored under `key`, or `None` if the key was never written.
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError>;

    /// Overwrite the value under `key`.
    async fn set(&self, key: &str, value: &str) -> Result<(), StoreError>;

    /// All `(key, value)` pairs whose key starts with `prefix`, ordered by key.
    async fn entries_with_prefix(&self, prefix: &str)
        -> Result<Vec<(String, String)>, StoreError>;

    /// Remove `key`. Returns whether a value was present.
    async fn remove(&self, key: &str) -> Result<bool, StoreError>;
}

/// Reject values above `limit` bytes (`0` = unlimited).
pub(crate) fn check_size(key: &str, value: &str, limit: usize) -> Result<(), StoreError> {
    if limit > 0 && value.len() > limit {
        return Err(StoreError::TooLarge {
            key: key.to_string(),
            size: value.len(),
            limit,
        });
    }
    Ok(())
}

/// Escape LIKE wildcards so a prefix matches literally.
fn like_prefix_pattern(prefix: &str) -> String {
    let mut pattern = String::with_capacity(prefix.len() + 1);
    for c in prefix.chars() {
        if matches!(c, '%' | '_' | '\\') {
            pattern.push('\\');
        }
        pattern.push(c);
    }
    pattern.push('%');
    pattern
}

#[async_trait]
impl KeyValueStore for Database {
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        let row: Option<(String,)> = sqlx::query_as("SELECT value FROM kv_store WHERE key = ?")
            .bind(key)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.map(|(value,)| value))
    }

    /// UPSERT: inserts the pair or replaces the value and timestamp.
    async fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        check_size(key, value, self.max_value_bytes)?;

        let now = chrono::Utc::now().timestamp();
        sqlx::query(
            r#"
            INSERT INTO kv_store (key, value, updated_at)
            VALUES (?, ?, ?)
            ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at
        "#,
        )
        .bind(key)
        .bind(value)
        .bind(now)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn entries_with_prefix(
        &self,
        prefix: &str,
    ) -> Result<Vec<(String, String)>, StoreError> {
        let pattern = like_prefix_pattern(prefix);
        let rows: Vec<(String, String)> = sqlx::query_as(
            "SELECT key, value FROM kv_store WHERE key LIKE ? ESCAPE '\\' ORDER BY key",
        )
        .bind(&pattern)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    async fn remove(&self, key: &str) -> Result<bool, StoreError> {
        let result = sqlx::query("DELETE FROM kv_store WHERE key = ?")
            .bind(key)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
