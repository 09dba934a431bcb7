pub mod config;
pub mod history;
pub mod path;
pub mod query;
pub mod wizard;
pub mod mock;

pub use config::WdbotConfig;
pub use history::{HistoryCategory, HistoryEntry, HistoryWindow, Insertion};
pub use path::PathTrail;
pub use query::{build_query, default_query, sanitize_variable, ResultPage};
pub use wizard::{UnknownPhase, WizardPhase, WizardState};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Chat platform user id. Every stored record is keyed by it.
pub type UserId = i64;

/// Which kind of knowledge-base entity a label search should return.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LabelKind {
    Item,
    Property,
}

impl LabelKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            LabelKind::Item => "item",
            LabelKind::Property => "property",
        }
    }
}

/// Human-readable rendering of an entity id (e.g. `Q42` -> "Douglas Adams").
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntityLabel {
    pub id: String,
    pub label: String,
    pub description: Option<String>,
}

/// One row returned by the query executor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryRow {
    pub id: String,
    pub label: String,
    pub description: Option<String>,
}

#[async_trait]
pub trait EntityReader: Send + Sync {
    async fn entity_label(&self, id: &str) -> anyhow::Result<EntityLabel>;
}

#[async_trait]
pub trait LabelResolver: Send + Sync {
    /// Best-matching id for `text`, or `None` when the search has no hit.
    async fn resolve(&self, text: &str, kind: LabelKind) -> anyhow::Result<Option<String>>;
}

#[async_trait]
pub trait QueryExecutor: Send + Sync {
    async fn execute(&self, query: &str) -> anyhow::Result<Vec<QueryRow>>;
}
