use crate::{HistoryLog, PathLog, QueryWizard, SqliteStore};
use crate::store::Result;
use std::sync::Arc;
use wdbot_core::{LabelResolver, WdbotConfig};

/// Everything one conversation needs, sharing a single store.
#[derive(Clone)]
pub struct InteractionState {
    pub history: HistoryLog,
    pub paths: PathLog,
    pub wizard: QueryWizard,
    store: SqliteStore,
}

impl InteractionState {
    pub fn new(store: SqliteStore, config: &WdbotConfig, resolver: Arc<dyn LabelResolver>) -> Self {
        Self {
            history: HistoryLog::new(store.clone(), config.history.window),
            paths: PathLog::new(store.clone(), config.history.path_window),
            wizard: QueryWizard::new(store.clone(), resolver).with_config(&config.wizard),
            store,
        }
    }

    /// Open the database named in `config` and wire up all three components.
    pub async fn open(config: &WdbotConfig, resolver: Arc<dyn LabelResolver>) -> Result<Self> {
        let store = SqliteStore::new(&config.database.path).await?;
        Ok(Self::new(store, config, resolver))
    }

    pub fn store(&self) -> &SqliteStore {
        &self.store
    }
}
