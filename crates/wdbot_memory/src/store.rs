use sqlx::pool::PoolConnection;
use sqlx::sqlite::{SqliteConnection, SqlitePoolOptions};
use sqlx::{Pool, Row, Sqlite};
use std::path::Path;
use wdbot_core::{HistoryCategory, HistoryEntry, UserId, WizardPhase, WizardState};

/// Errors surfaced by the persistent store.
///
/// A missing row is never an error: lookups return `None` or an empty list.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("store unavailable: {0}")]
    Unavailable(#[from] sqlx::Error),

    #[error("corrupt {table} row for user {user_id}: {detail}")]
    Corrupt {
        table: &'static str,
        user_id: UserId,
        detail: String,
    },

    #[error("write transaction already finished")]
    TransactionClosed,
}

pub type Result<T, E = StoreError> = std::result::Result<T, E>;

pub const IN_MEMORY: &str = ":memory:";

#[derive(Clone)]
pub struct SqliteStore {
    pool: Pool<Sqlite>,
}

impl SqliteStore {
    /// Open (or create) the database at `db_path`. `:memory:` gives a private
    /// in-process database backed by a single long-lived connection.
    pub async fn new<P: AsRef<Path>>(db_path: P) -> Result<Self> {
        let path = db_path.as_ref();
        let in_memory = path.as_os_str() == IN_MEMORY;

        let mut options = SqlitePoolOptions::new().after_connect(|conn, _meta| {
            Box::pin(async move {
                sqlx::query("PRAGMA busy_timeout = 5000")
                    .execute(&mut *conn)
                    .await?;
                ensure_schema(conn).await?;
                Ok(())
            })
        });

        let db_url = if in_memory {
            // Each in-memory connection is its own database, so there must only ever be one.
            options = options
                .max_connections(1)
                .min_connections(1)
                .idle_timeout(None)
                .max_lifetime(None);
            "sqlite::memory:".to_string()
        } else {
            format!("sqlite://{}?mode=rwc", path.display())
        };

        let pool = options.connect(&db_url).await?;
        tracing::debug!("Opened state store at {}", path.display());
        Ok(Self { pool })
    }

    pub async fn in_memory() -> Result<Self> {
        Self::new(IN_MEMORY).await
    }

    pub fn pool(&self) -> &Pool<Sqlite> {
        &self.pool
    }

    pub(crate) async fn read(&self) -> Result<PoolConnection<Sqlite>> {
        Ok(self.pool.acquire().await?)
    }

    /// Start a write transaction that holds SQLite's write lock from the
    /// first statement, so read-modify-write sequences never interleave.
    pub(crate) async fn begin_write(&self) -> Result<WriteTx> {
        // Guard first: a cancelled BEGIN may still run on the connection.
        let mut tx = WriteTx {
            conn: Some(self.pool.acquire().await?),
        };
        sqlx::query("BEGIN IMMEDIATE").execute(tx.conn()?).await?;
        Ok(tx)
    }

    pub async fn close(&self) {
        self.pool.close().await;
    }
}

/// Schema is created idempotently on every new connection, so a replacement
/// in-memory connection starts usable rather than table-less.
async fn ensure_schema(conn: &mut SqliteConnection) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS history (
            user_id INTEGER NOT NULL,
            category TEXT NOT NULL,
            value TEXT NOT NULL,
            rank INTEGER NOT NULL,
            PRIMARY KEY (user_id, category, value),
            UNIQUE (user_id, category, rank)
        );
        "#,
    )
    .execute(&mut *conn)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS history_paths (
            user_id INTEGER PRIMARY KEY,
            path TEXT NOT NULL
        );
        "#,
    )
    .execute(&mut *conn)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS sparql_queries (
            user_id INTEGER PRIMARY KEY,
            subject TEXT NOT NULL,
            predicate TEXT NOT NULL,
            object TEXT NOT NULL,
            status INTEGER NOT NULL CHECK (status BETWEEN 0 AND 3)
        );
        "#,
    )
    .execute(&mut *conn)
    .await?;

    Ok(())
}

// =============================================================================
// Write transactions
// =============================================================================

/// `BEGIN IMMEDIATE` transaction on one pooled connection.
///
/// End it with [`WriteTx::finish`]. The connection stays in the guard until
/// the transaction is over, so a guard dropped while open (e.g. the future
/// was cancelled) still owns it and queues a `ROLLBACK` before the
/// connection goes back to the pool. An in-memory store has exactly one
/// connection; discarding it would discard the database.
pub(crate) struct WriteTx {
    conn: Option<PoolConnection<Sqlite>>,
}

impl WriteTx {
    pub(crate) fn conn(&mut self) -> Result<&mut SqliteConnection> {
        self.conn.as_deref_mut().ok_or(StoreError::TransactionClosed)
    }

    /// Commit when `outcome` is `Ok`, roll back otherwise, and pass `outcome` through.
    pub(crate) async fn finish<T>(mut self, outcome: Result<T>) -> Result<T> {
        match outcome {
            Ok(value) => {
                let committed = sqlx::query("COMMIT").execute(self.conn()?).await;
                match committed {
                    Ok(_) => {
                        self.conn = None;
                        Ok(value)
                    }
                    Err(e) => {
                        self.rollback().await;
                        Err(e.into())
                    }
                }
            }
            Err(e) => {
                self.rollback().await;
                Err(e)
            }
        }
    }

    async fn rollback(&mut self) {
        if let Some(conn) = self.conn.as_deref_mut() {
            if let Err(e) = sqlx::query("ROLLBACK").execute(conn).await {
                tracing::warn!("Rollback failed: {}", e);
            }
        }
        self.conn = None;
    }
}

impl Drop for WriteTx {
    fn drop(&mut self) {
        let Some(mut conn) = self.conn.take() else {
            return;
        };
        match tokio::runtime::Handle::try_current() {
            Ok(handle) => {
                tracing::warn!("Write transaction dropped while open, rolling back");
                handle.spawn(async move {
                    if let Err(e) = sqlx::query("ROLLBACK").execute(&mut *conn).await {
                        tracing::warn!("Deferred rollback failed: {}", e);
                    }
                });
            }
            Err(_) => {
                tracing::warn!("Write transaction dropped outside a runtime, discarding connection");
                drop(conn.detach());
            }
        }
    }
}

// =============================================================================
// Row access
// =============================================================================

pub(crate) async fn load_history(
    conn: &mut SqliteConnection,
    user_id: UserId,
    category: HistoryCategory,
) -> Result<Vec<HistoryEntry>> {
    let rows = sqlx::query(
        "SELECT value, rank FROM history WHERE user_id = ? AND category = ? ORDER BY rank ASC",
    )
    .bind(user_id)
    .bind(category.as_str())
    .fetch_all(&mut *conn)
    .await?;

    Ok(rows
        .into_iter()
        .map(|row| HistoryEntry {
            value: row.get("value"),
            rank: row.get("rank"),
        })
        .collect())
}

/// Swap the stored window for `entries` as a whole.
pub(crate) async fn replace_history(
    conn: &mut SqliteConnection,
    user_id: UserId,
    category: HistoryCategory,
    entries: &[HistoryEntry],
) -> Result<()> {
    delete_history(&mut *conn, user_id, category).await?;
    for entry in entries {
        sqlx::query("INSERT INTO history (user_id, category, value, rank) VALUES (?, ?, ?, ?)")
            .bind(user_id)
            .bind(category.as_str())
            .bind(&entry.value)
            .bind(entry.rank)
            .execute(&mut *conn)
            .await?;
    }
    Ok(())
}

pub(crate) async fn delete_history(
    conn: &mut SqliteConnection,
    user_id: UserId,
    category: HistoryCategory,
) -> Result<u64> {
    let result = sqlx::query("DELETE FROM history WHERE user_id = ? AND category = ?")
        .bind(user_id)
        .bind(category.as_str())
        .execute(&mut *conn)
        .await?;
    Ok(result.rows_affected())
}

pub(crate) async fn load_path(conn: &mut SqliteConnection, user_id: UserId) -> Result<Option<String>> {
    let row = sqlx::query("SELECT path FROM history_paths WHERE user_id = ?")
        .bind(user_id)
        .fetch_optional(&mut *conn)
        .await?;
    Ok(row.map(|r| r.get("path")))
}

pub(crate) async fn save_path(conn: &mut SqliteConnection, user_id: UserId, path: &str) -> Result<()> {
    sqlx::query(
        "INSERT INTO history_paths (user_id, path) VALUES (?, ?)
         ON CONFLICT(user_id) DO UPDATE SET path = excluded.path",
    )
    .bind(user_id)
    .bind(path)
    .execute(&mut *conn)
    .await?;
    Ok(())
}

pub(crate) async fn delete_path(conn: &mut SqliteConnection, user_id: UserId) -> Result<u64> {
    let result = sqlx::query("DELETE FROM history_paths WHERE user_id = ?")
        .bind(user_id)
        .execute(&mut *conn)
        .await?;
    Ok(result.rows_affected())
}

pub(crate) async fn load_wizard(
    conn: &mut SqliteConnection,
    user_id: UserId,
) -> Result<Option<WizardState>> {
    let row = sqlx::query(
        "SELECT subject, predicate, object, status FROM sparql_queries WHERE user_id = ?",
    )
    .bind(user_id)
    .fetch_optional(&mut *conn)
    .await?;

    let Some(row) = row else {
        return Ok(None);
    };
    let status: i64 = row.get("status");
    let phase = WizardPhase::try_from(status).map_err(|e| StoreError::Corrupt {
        table: "sparql_queries",
        user_id,
        detail: e.to_string(),
    })?;

    Ok(Some(WizardState {
        subject: row.get("subject"),
        predicate: row.get("predicate"),
        object: row.get("object"),
        phase,
    }))
}

pub(crate) async fn save_wizard(
    conn: &mut SqliteConnection,
    user_id: UserId,
    state: &WizardState,
) -> Result<()> {
    sqlx::query(
        "INSERT INTO sparql_queries (user_id, subject, predicate, object, status) VALUES (?, ?, ?, ?, ?)
         ON CONFLICT(user_id) DO UPDATE SET
          subject = excluded.subject, predicate = excluded.predicate,
          object = excluded.object, status = excluded.status",
    )
    .bind(user_id)
    .bind(&state.subject)
    .bind(&state.predicate)
    .bind(&state.object)
    .bind(state.phase.code())
    .execute(&mut *conn)
    .await?;
    Ok(())
}

pub(crate) async fn delete_wizard(conn: &mut SqliteConnection, user_id: UserId) -> Result<u64> {
    let result = sqlx::query("DELETE FROM sparql_queries WHERE user_id = ?")
        .bind(user_id)
        .execute(&mut *conn)
        .await?;
    Ok(result.rows_affected())
}
