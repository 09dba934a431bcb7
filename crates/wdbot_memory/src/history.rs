use crate::store::{self, Result, SqliteStore, WriteTx};
use wdbot_core::{HistoryCategory, HistoryEntry, HistoryWindow, Insertion, UserId};

/// Recently visited values per (user, category), newest first.
#[derive(Clone)]
pub struct HistoryLog {
    store: SqliteStore,
    window: usize,
}

impl HistoryLog {
    pub fn new(store: SqliteStore, window: usize) -> Self {
        Self {
            store,
            window: window.max(1),
        }
    }

    pub fn window(&self) -> usize {
        self.window
    }

    /// Record a visit. Returns false when `value` was already in the window
    /// (or blank) and nothing changed.
    pub async fn record(&self, user_id: UserId, category: HistoryCategory, value: &str) -> Result<bool> {
        let value = value.trim();
        if value.is_empty() {
            return Ok(false);
        }

        let mut tx = self.store.begin_write().await?;
        let outcome = self.record_in(&mut tx, user_id, category, value).await;
        tx.finish(outcome).await
    }

    async fn record_in(
        &self,
        tx: &mut WriteTx,
        user_id: UserId,
        category: HistoryCategory,
        value: &str,
    ) -> Result<bool> {
        let stored = store::load_history(tx.conn()?, user_id, category).await?;
        let mut window = HistoryWindow::from_entries(self.window, stored);

        match window.insert(value) {
            Insertion::Present => Ok(false),
            Insertion::Inserted { rank, evicted } => {
                store::replace_history(tx.conn()?, user_id, category, window.entries()).await?;
                if evicted.is_empty() {
                    tracing::debug!("history[{}/{}] += {} at rank {}", user_id, category, value, rank);
                } else {
                    tracing::debug!(
                        "history[{}/{}] += {} at rank {}, evicted {:?}",
                        user_id,
                        category,
                        value,
                        rank,
                        evicted
                    );
                }
                Ok(true)
            }
        }
    }

    /// Values newest first; empty when the user has none.
    pub async fn list(&self, user_id: UserId, category: HistoryCategory) -> Result<Vec<String>> {
        Ok(self
            .entries(user_id, category)
            .await?
            .into_iter()
            .map(|e| e.value)
            .collect())
    }

    /// Stored rows ascending by rank.
    pub async fn entries(&self, user_id: UserId, category: HistoryCategory) -> Result<Vec<HistoryEntry>> {
        let mut conn = self.store.read().await?;
        store::load_history(&mut conn, user_id, category).await
    }

    pub async fn clear(&self, user_id: UserId, category: HistoryCategory) -> Result<()> {
        let mut conn = self.store.read().await?;
        let removed = store::delete_history(&mut conn, user_id, category).await?;
        tracing::debug!("history[{}/{}] cleared ({} rows)", user_id, category, removed);
        Ok(())
    }
}
