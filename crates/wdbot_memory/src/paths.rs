use crate::store::{self, Result, SqliteStore, WriteTx};
use wdbot_core::{PathTrail, UserId};

/// Last few navigation tokens per user, kept as a single row.
#[derive(Clone)]
pub struct PathLog {
    store: SqliteStore,
    window: usize,
}

impl PathLog {
    pub fn new(store: SqliteStore, window: usize) -> Self {
        Self {
            store,
            window: window.max(1),
        }
    }

    /// Move `token` to the front of the user's trail, dropping the oldest
    /// token past the window. Blank tokens are ignored.
    pub async fn append_token(&self, user_id: UserId, token: &str) -> Result<()> {
        let mut tx = self.store.begin_write().await?;
        let outcome = self.append_in(&mut tx, user_id, token).await;
        tx.finish(outcome).await
    }

    async fn append_in(&self, tx: &mut WriteTx, user_id: UserId, token: &str) -> Result<()> {
        let raw = store::load_path(tx.conn()?, user_id).await?.unwrap_or_default();
        let mut trail = PathTrail::decode(self.window, &raw);
        if !trail.push(token) {
            return Ok(());
        }
        store::save_path(tx.conn()?, user_id, &trail.encode()).await?;
        tracing::trace!("path[{}] = {}", user_id, trail.encode());
        Ok(())
    }

    /// Tokens newest first; empty when the user has no row.
    pub async fn list(&self, user_id: UserId) -> Result<Vec<String>> {
        let mut conn = self.store.read().await?;
        let raw = store::load_path(&mut conn, user_id).await?;
        Ok(raw
            .map(|r| PathTrail::decode(self.window, &r).into_tokens())
            .unwrap_or_default())
    }

    pub async fn clear(&self, user_id: UserId) -> Result<()> {
        let mut conn = self.store.read().await?;
        store::delete_path(&mut conn, user_id).await?;
        tracing::debug!("path[{}] cleared", user_id);
        Ok(())
    }
}
