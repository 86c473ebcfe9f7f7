use std::path::Path;

use chrono::{Duration, Utc};
use rusqlite::{params, Connection};
use tracing::{info, warn};

use crate::recipe::RecipeRecord;

/// SQLite-backed cache of fetched recipe records with TTL-based expiration.
/// All operations are synchronous (rusqlite is blocking).
/// Callers in async contexts should use `tokio::task::spawn_blocking`.
///
/// The cache is consulted only when a live fetch fails; rows are never a
/// source of truth, so anything missing, expired, or undecodable reads as
/// a miss.
pub struct RecipeCache {
    conn: Connection,
}

impl RecipeCache {
    /// Open or create the cache database at the given path.
    /// Creates the `recipe_cache` table and index if they don't exist.
    pub fn new(db_path: &Path) -> Result<Self, String> {
        let conn = Connection::open(db_path)
            .map_err(|e| format!("Failed to open cache database at {:?}: {}", db_path, e))?;

        conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS recipe_cache (
                id TEXT PRIMARY KEY,
                record_json TEXT NOT NULL,
                cached_at TEXT NOT NULL,
                expires_at TEXT NOT NULL
            );
            CREATE INDEX IF NOT EXISTS idx_recipe_cache_expires ON recipe_cache(expires_at);",
        )
        .map_err(|e| format!("Failed to create cache table: {}", e))?;

        Ok(Self { conn })
    }

    /// Look up a cached record by recipe id.
    /// Returns None if not found, expired, or no longer decodable.
    pub fn get(&self, id: &str) -> Result<Option<RecipeRecord>, String> {
        let now = Utc::now().to_rfc3339();

        let mut stmt = self
            .conn
            .prepare("SELECT record_json FROM recipe_cache WHERE id = ?1 AND expires_at > ?2")
            .map_err(|e| format!("Failed to prepare cache query: {}", e))?;

        let result = stmt.query_row(params![id, now], |row| {
            let json: String = row.get(0)?;
            Ok(json)
        });

        match result {
            Ok(json) => match serde_json::from_str::<RecipeRecord>(&json) {
                Ok(record) => {
                    info!("Cache hit for recipe '{}'", id);
                    Ok(Some(record))
                }
                Err(e) => {
                    warn!("Dropping undecodable cache row for '{}': {}", id, e);
                    Ok(None)
                }
            },
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(format!("Cache lookup failed: {}", e)),
        }
    }

    /// Store a record in the cache with the given TTL in days.
    /// Overwrites any existing entry for the same id.
    pub fn put(&self, record: &RecipeRecord, ttl_days: i64) -> Result<(), String> {
        if record.id.is_empty() {
            return Err("Cannot cache a recipe without an id".to_string());
        }

        let now = Utc::now();
        let expires = now + Duration::days(ttl_days);
        let json = serde_json::to_string(record)
            .map_err(|e| format!("Failed to serialize recipe for cache: {}", e))?;

        self.conn
            .execute(
                "INSERT OR REPLACE INTO recipe_cache
                 (id, record_json, cached_at, expires_at)
                 VALUES (?1, ?2, ?3, ?4)",
                params![record.id, json, now.to_rfc3339(), expires.to_rfc3339()],
            )
            .map_err(|e| format!("Failed to store recipe in cache: {}", e))?;

        info!(
            "Cached recipe '{}' (expires in {} days)",
            record.id, ttl_days
        );
        Ok(())
    }

    /// Delete all expired entries from the cache.
    /// Returns the number of deleted rows.
    pub fn clear_expired(&self) -> Result<usize, String> {
        let now = Utc::now().to_rfc3339();
        let count = self
            .conn
            .execute(
                "DELETE FROM recipe_cache WHERE expires_at < ?1",
                params![now],
            )
            .map_err(|e| format!("Failed to clear expired cache entries: {}", e))?;

        info!("Cleared {} expired cache entries", count);
        Ok(count)
    }

    /// Number of live (non-expired) cached recipes.
    pub fn count(&self) -> Result<usize, String> {
        let now = Utc::now().to_rfc3339();
        self.conn
            .query_row(
                "SELECT COUNT(*) FROM recipe_cache WHERE expires_at > ?1",
                params![now],
                |row| row.get::<_, i64>(0),
            )
            .map(|n| n as usize)
            .map_err(|e| format!("Failed to count cache entries: {}", e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn make_test_record(id: &str, name: &str) -> RecipeRecord {
        RecipeRecord {
            id: id.to_string(),
            recipe_name: name.to_string(),
            instructions: vec!["Mix.".to_string(), "Bake.".to_string()],
            selected_time: Some(25),
            ..Default::default()
        }
    }

    #[test]
    fn test_cache_put_and_get() {
        let dir = TempDir::new().unwrap();
        let cache = RecipeCache::new(&dir.path().join("test.db")).unwrap();
        let record = make_test_record("r1", "Banana Bread");

        cache.put(&record, 30).unwrap();
        let cached = cache.get("r1").unwrap().unwrap();
        assert_eq!(cached.recipe_name, "Banana Bread");
        assert_eq!(cached.instructions.len(), 2);
        assert_eq!(cached.selected_time, Some(25));
    }

    #[test]
    fn test_cache_get_nonexistent() {
        let dir = TempDir::new().unwrap();
        let cache = RecipeCache::new(&dir.path().join("test.db")).unwrap();

        assert!(cache.get("nope").unwrap().is_none());
    }

    #[test]
    fn test_cache_expired_entry_returns_none() {
        let dir = TempDir::new().unwrap();
        let cache = RecipeCache::new(&dir.path().join("test.db")).unwrap();
        let record = make_test_record("r2", "Expired Stew");

        // Insert manually with an already-expired timestamp.
        let now = Utc::now();
        let expired = now - Duration::hours(1);
        let json = serde_json::to_string(&record).unwrap();
        cache
            .conn
            .execute(
                "INSERT OR REPLACE INTO recipe_cache
                 (id, record_json, cached_at, expires_at)
                 VALUES (?1, ?2, ?3, ?4)",
                params![record.id, json, now.to_rfc3339(), expired.to_rfc3339()],
            )
            .unwrap();

        assert!(cache.get("r2").unwrap().is_none());
    }

    #[test]
    fn test_cache_undecodable_row_reads_as_miss() {
        let dir = TempDir::new().unwrap();
        let cache = RecipeCache::new(&dir.path().join("test.db")).unwrap();

        let now = Utc::now();
        let expires = now + Duration::days(1);
        cache
            .conn
            .execute(
                "INSERT INTO recipe_cache (id, record_json, cached_at, expires_at)
                 VALUES (?1, ?2, ?3, ?4)",
                params!["bad", "not json", now.to_rfc3339(), expires.to_rfc3339()],
            )
            .unwrap();

        assert!(cache.get("bad").unwrap().is_none());
    }

    #[test]
    fn test_cache_put_overwrites() {
        let dir = TempDir::new().unwrap();
        let cache = RecipeCache::new(&dir.path().join("test.db")).unwrap();

        cache.put(&make_test_record("r3", "v1"), 30).unwrap();
        cache.put(&make_test_record("r3", "v2"), 30).unwrap();

        assert_eq!(cache.get("r3").unwrap().unwrap().recipe_name, "v2");
    }

    #[test]
    fn test_cache_rejects_empty_id() {
        let dir = TempDir::new().unwrap();
        let cache = RecipeCache::new(&dir.path().join("test.db")).unwrap();

        assert!(cache.put(&make_test_record("", "Nameless"), 30).is_err());
    }

    #[test]
    fn test_cache_clear_expired_and_count() {
        let dir = TempDir::new().unwrap();
        let cache = RecipeCache::new(&dir.path().join("test.db")).unwrap();

        cache.put(&make_test_record("keep", "Fresh"), 30).unwrap();

        let now = Utc::now();
        let expired = now - Duration::hours(1);
        let json = serde_json::to_string(&make_test_record("drop", "Stale")).unwrap();
        cache
            .conn
            .execute(
                "INSERT OR REPLACE INTO recipe_cache
                 (id, record_json, cached_at, expires_at)
                 VALUES (?1, ?2, ?3, ?4)",
                params!["drop", json, now.to_rfc3339(), expired.to_rfc3339()],
            )
            .unwrap();

        assert_eq!(cache.count().unwrap(), 1);
        assert_eq!(cache.clear_expired().unwrap(), 1);
        assert!(cache.get("keep").unwrap().is_some());
        assert!(cache.get("drop").unwrap().is_none());
    }
}
