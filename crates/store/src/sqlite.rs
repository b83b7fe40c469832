use std::path::Path;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::SecondsFormat;
use events::{EventFilter, EventKind, EventStore, KindCount, StoreError, StoredEvent, Timestamp};
use rusqlite::{params, Connection};
use uuid::Uuid;

// Documents are stored whole as JSON; `kind` and `timestamp` are copied into
// their own columns only so SQLite can filter, order, and group on them.
// Timestamps use a fixed-width RFC 3339 form so text order is time order.
// `seq` records insertion order for tie-breaking.
const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS events (
    seq INTEGER PRIMARY KEY AUTOINCREMENT,
    id TEXT NOT NULL UNIQUE,
    kind TEXT NOT NULL,
    timestamp TEXT NOT NULL,
    document TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_events_timestamp ON events(timestamp DESC, seq DESC);
CREATE INDEX IF NOT EXISTS idx_events_kind ON events(kind);
"#;

fn sqlite_error(err: rusqlite::Error) -> StoreError {
    StoreError::unavailable(format!("sqlite: {err}"))
}

fn timestamp_column(timestamp: Timestamp) -> String {
    timestamp
        .as_datetime()
        .to_rfc3339_opts(SecondsFormat::Nanos, true)
}

/// [`EventStore`] backed by a SQLite database.
///
/// A single connection is shared behind a mutex; every operation runs on the
/// tokio blocking pool so request tasks never block on disk I/O.
#[derive(Clone)]
pub struct SqliteEventStore {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteEventStore {
    /// Opens (or creates) the database at `path` and ensures the schema exists.
    pub fn open(path: &Path) -> Result<Self, StoreError> {
        let conn = Connection::open(path).map_err(|e| {
            StoreError::unavailable(format!(
                "failed to open database {}: {e}",
                path.display()
            ))
        })?;
        Self::from_connection(conn)
    }

    /// Opens a private in-memory database.
    pub fn open_in_memory() -> Result<Self, StoreError> {
        let conn = Connection::open_in_memory().map_err(sqlite_error)?;
        Self::from_connection(conn)
    }

    fn from_connection(conn: Connection) -> Result<Self, StoreError> {
        conn.execute_batch(SCHEMA).map_err(sqlite_error)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    async fn with_connection<T, F>(&self, op: F) -> Result<T, StoreError>
    where
        T: Send + 'static,
        F: FnOnce(&Connection) -> Result<T, StoreError> + Send + 'static,
    {
        let conn = Arc::clone(&self.conn);
        tokio::task::spawn_blocking(move || {
            let conn = conn
                .lock()
                .map_err(|_| StoreError::unavailable("sqlite connection lock poisoned"))?;
            op(&conn)
        })
        .await
        .map_err(|e| StoreError::unavailable(format!("sqlite task failed: {e}")))?
    }
}

#[async_trait]
impl EventStore for SqliteEventStore {
    async fn insert(&self, event: StoredEvent) -> Result<(), StoreError> {
        let id = Uuid::new_v4();
        let kind = event.kind();
        let timestamp = timestamp_column(event.timestamp);
        let document = serde_json::to_string(&event)?;

        self.with_connection(move |conn| {
            conn.execute(
                r#"
                INSERT INTO events (id, kind, timestamp, document)
                VALUES (?1, ?2, ?3, ?4)
                "#,
                params![id.to_string(), kind.as_str(), timestamp, document],
            )
            .map_err(sqlite_error)?;
            Ok(())
        })
        .await?;

        tracing::debug!(%id, %kind, "Inserted event document");
        Ok(())
    }

    async fn find(&self, filter: EventFilter) -> Result<Vec<StoredEvent>, StoreError> {
        // SQLite treats a negative LIMIT as "no limit".
        let limit: i64 = match filter.limit.max_documents() {
            Some(max) => i64::try_from(max).unwrap_or(i64::MAX),
            None => -1,
        };

        let documents = self
            .with_connection(move |conn| {
                let mut stmt = conn
                    .prepare(
                        r#"
                        SELECT document
                        FROM events
                        WHERE (?1 IS NULL OR kind = ?1)
                        ORDER BY timestamp DESC, seq DESC
                        LIMIT ?2
                        "#,
                    )
                    .map_err(sqlite_error)?;

                let rows = stmt
                    .query_map(params![filter.kind, limit], |row| row.get::<_, String>(0))
                    .map_err(sqlite_error)?
                    .collect::<Result<Vec<_>, _>>()
                    .map_err(sqlite_error)?;
                Ok(rows)
            })
            .await?;

        documents
            .iter()
            .map(|doc| serde_json::from_str::<StoredEvent>(doc).map_err(StoreError::from))
            .collect()
    }

    async fn count_by_kind(&self) -> Result<Vec<KindCount>, StoreError> {
        let rows = self
            .with_connection(|conn| {
                let mut stmt = conn
                    .prepare(
                        r#"
                        SELECT kind, COUNT(*) AS n
                        FROM events
                        GROUP BY kind
                        ORDER BY n DESC, kind ASC
                        "#,
                    )
                    .map_err(sqlite_error)?;

                let rows = stmt
                    .query_map([], |row| Ok((row.get::<_, String>(0)?, row.get::<_, i64>(1)?)))
                    .map_err(sqlite_error)?
                    .collect::<Result<Vec<_>, _>>()
                    .map_err(sqlite_error)?;
                Ok(rows)
            })
            .await?;

        rows.into_iter()
            .map(|(kind, count)| {
                let kind: EventKind = kind
                    .parse()
                    .map_err(|e: events::UnknownEventKind| StoreError::corrupt(e.to_string()))?;
                let count = u64::try_from(count)
                    .map_err(|_| StoreError::corrupt(format!("negative count for {kind}")))?;
                Ok(KindCount { kind, count })
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::conformance;

    #[tokio::test]
    async fn conforms_to_event_store_contract() {
        conformance::run_all(|| async { SqliteEventStore::open_in_memory().unwrap() }).await;
    }

    #[tokio::test]
    async fn events_survive_reopening_the_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("events.db");

        {
            let store = SqliteEventStore::open(&path).unwrap();
            store.insert(conformance::push_at(5, "alice")).await.unwrap();
        }

        let reopened = SqliteEventStore::open(&path).unwrap();
        let found = reopened
            .find(EventFilter {
                kind: None,
                limit: events::FindLimit::new(10),
            })
            .await
            .unwrap();
        assert_eq!(found, vec![conformance::push_at(5, "alice")]);
    }

    #[tokio::test]
    async fn stored_documents_do_not_contain_the_row_id() {
        let store = SqliteEventStore::open_in_memory().unwrap();
        store.insert(conformance::push_at(1, "alice")).await.unwrap();

        let document: String = store
            .with_connection(|conn| {
                conn.query_row("SELECT document FROM events", [], |row| row.get(0))
                    .map_err(sqlite_error)
            })
            .await
            .unwrap();
        let value: serde_json::Value = serde_json::from_str(&document).unwrap();

        assert!(value.get("id").is_none());
        assert!(value.get("_id").is_none());
        assert_eq!(value["type"], "push");
    }

    #[tokio::test]
    async fn unknown_kind_in_table_is_reported_as_corrupt() {
        let store = SqliteEventStore::open_in_memory().unwrap();
        store
            .with_connection(|conn| {
                conn.execute(
                    "INSERT INTO events (id, kind, timestamp, document) VALUES ('x', 'deploy', 't', '{}')",
                    [],
                )
                .map_err(sqlite_error)?;
                Ok(())
            })
            .await
            .unwrap();

        let err = store.count_by_kind().await.unwrap_err();
        assert!(matches!(err, StoreError::Corrupt { .. }));
    }

    #[test]
    fn timestamp_column_is_fixed_width() {
        let early = conformance::push_at(0, "a").timestamp;
        let later = conformance::push_at(61, "a").timestamp;
        let (a, b) = (timestamp_column(early), timestamp_column(later));
        assert_eq!(a.len(), b.len());
        assert!(a < b);
    }
}
