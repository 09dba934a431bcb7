//! Multi-turn query wizard.
//!
//! A user runs `start`, then sends three text turns (subject, predicate,
//! object). Once the state is ready, `finish` resolves the predicate and
//! object to Wikidata ids and emits a single-triple SPARQL query.

use crate::store::{self, Result, SqliteStore, WriteTx};
use std::sync::Arc;
use wdbot_core::config::WizardConfig;
use wdbot_core::{
    build_query, default_query, sanitize_variable, LabelKind, LabelResolver, QueryExecutor,
    QueryRow, UserId, WizardPhase, WizardState,
};

#[derive(Clone)]
pub struct QueryWizard {
    store: SqliteStore,
    resolver: Arc<dyn LabelResolver>,
    sanitize_subject: bool,
}

impl QueryWizard {
    pub fn new(store: SqliteStore, resolver: Arc<dyn LabelResolver>) -> Self {
        Self {
            store,
            resolver,
            sanitize_subject: true,
        }
    }

    pub fn with_config(mut self, config: &WizardConfig) -> Self {
        self.sanitize_subject = config.sanitize_subject;
        self
    }

    /// Discard whatever the user had and begin again at `AwaitingSubject`.
    pub async fn start(&self, user_id: UserId) -> Result<()> {
        let mut tx = self.store.begin_write().await?;
        let outcome = Self::start_in(&mut tx, user_id).await;
        tx.finish(outcome).await?;
        tracing::debug!("wizard[{}] started", user_id);
        Ok(())
    }

    async fn start_in(tx: &mut WriteTx, user_id: UserId) -> Result<()> {
        store::delete_wizard(tx.conn()?, user_id).await?;
        store::save_wizard(tx.conn()?, user_id, &WizardState::new()).await
    }

    /// Feed one text turn. Returns the phase after the turn, or `None` when
    /// the user never started a wizard. A ready wizard ignores further text.
    pub async fn submit_text(&self, user_id: UserId, text: &str) -> Result<Option<WizardPhase>> {
        let mut tx = self.store.begin_write().await?;
        let outcome = Self::submit_in(&mut tx, user_id, text).await;
        tx.finish(outcome).await
    }

    async fn submit_in(tx: &mut WriteTx, user_id: UserId, text: &str) -> Result<Option<WizardPhase>> {
        let Some(mut state) = store::load_wizard(tx.conn()?, user_id).await? else {
            return Ok(None);
        };
        if state.submit(text) {
            store::save_wizard(tx.conn()?, user_id, &state).await?;
            tracing::debug!("wizard[{}] -> {:?}", user_id, state.phase);
        }
        Ok(Some(state.phase))
    }

    pub async fn state(&self, user_id: UserId) -> Result<Option<WizardState>> {
        let mut conn = self.store.read().await?;
        store::load_wizard(&mut conn, user_id).await
    }

    /// Build the query for a ready wizard.
    ///
    /// Without a wizard, or before the third turn, the canned default query
    /// is returned. A predicate or object the resolver can't match becomes an
    /// empty id, so the query still parses and simply finds nothing.
    pub async fn finish(&self, user_id: UserId) -> Result<String> {
        let state = match self.state(user_id).await? {
            Some(state) if state.is_ready() => state,
            Some(state) => {
                tracing::debug!(
                    "wizard[{}] finished early in {:?}, using default query",
                    user_id,
                    state.phase
                );
                return Ok(default_query());
            }
            None => return Ok(default_query()),
        };

        let property = self.resolve_or_empty(&state.predicate, LabelKind::Property).await;
        let item = self.resolve_or_empty(&state.object, LabelKind::Item).await;
        let variable = if self.sanitize_subject {
            sanitize_variable(&state.subject)
        } else {
            state.subject.clone()
        };

        tracing::info!(
            "wizard[{}] built query ?{} wdt:{} wd:{}",
            user_id,
            variable,
            property,
            item
        );
        Ok(build_query(&variable, &property, &item))
    }

    /// `finish`, then run the query.
    pub async fn run(&self, user_id: UserId, executor: &dyn QueryExecutor) -> anyhow::Result<Vec<QueryRow>> {
        let query = self.finish(user_id).await?;
        executor.execute(&query).await
    }

    async fn resolve_or_empty(&self, text: &str, kind: LabelKind) -> String {
        match self.resolver.resolve(text, kind).await {
            Ok(Some(id)) => id,
            Ok(None) => {
                tracing::warn!("No {} matches '{}'", kind.as_str(), text);
                String::new()
            }
            Err(e) => {
                tracing::warn!("Resolving {} '{}' failed: {:#}", kind.as_str(), text, e);
                String::new()
            }
        }
    }
}
