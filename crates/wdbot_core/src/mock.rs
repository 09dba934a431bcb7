//! Static collaborators: deterministic answers from in-memory tables, for
//! tests and offline runs.

use crate::{EntityLabel, EntityReader, LabelKind, LabelResolver, QueryExecutor, QueryRow};
use anyhow::Result;
use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::Mutex;

/// Resolves labels from a fixed table keyed by lowercased text.
#[derive(Debug, Clone, Default)]
pub struct StaticLabelResolver {
    items: HashMap<String, String>,
    properties: HashMap<String, String>,
}

impl StaticLabelResolver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_item(mut self, label: &str, id: &str) -> Self {
        self.items.insert(label.to_lowercase(), id.to_string());
        self
    }

    pub fn with_property(mut self, label: &str, id: &str) -> Self {
        self.properties.insert(label.to_lowercase(), id.to_string());
        self
    }

    /// A handful of well-known Wikidata ids.
    pub fn wikidata_sample() -> Self {
        Self::new()
            .with_property("occupation", "P106")
            .with_property("child", "P40")
            .with_property("instance of", "P31")
            .with_property("country of citizenship", "P27")
            .with_item("writer", "Q36180")
            .with_item("human", "Q5")
            .with_item("douglas adams", "Q42")
            .with_item("united kingdom", "Q145")
    }
}

#[async_trait]
impl LabelResolver for StaticLabelResolver {
    async fn resolve(&self, text: &str, kind: LabelKind) -> Result<Option<String>> {
        let table = match kind {
            LabelKind::Item => &self.items,
            LabelKind::Property => &self.properties,
        };
        Ok(table.get(&text.trim().to_lowercase()).cloned())
    }
}

/// Returns the same rows for every query and remembers what it was asked.
#[derive(Debug, Default)]
pub struct StaticQueryExecutor {
    rows: Vec<QueryRow>,
    seen: Mutex<Vec<String>>,
}

impl StaticQueryExecutor {
    pub fn new(rows: Vec<QueryRow>) -> Self {
        Self {
            rows,
            seen: Mutex::new(Vec::new()),
        }
    }

    pub async fn queries(&self) -> Vec<String> {
        self.seen.lock().await.clone()
    }
}

#[async_trait]
impl QueryExecutor for StaticQueryExecutor {
    async fn execute(&self, query: &str) -> Result<Vec<QueryRow>> {
        self.seen.lock().await.push(query.to_string());
        Ok(self.rows.clone())
    }
}

/// Labels from a fixed table; unknown ids are labelled with themselves.
#[derive(Debug, Clone, Default)]
pub struct StaticEntityReader {
    labels: HashMap<String, EntityLabel>,
}

impl StaticEntityReader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_label(mut self, id: &str, label: &str, description: Option<&str>) -> Self {
        self.labels.insert(
            id.to_string(),
            EntityLabel {
                id: id.to_string(),
                label: label.to_string(),
                description: description.map(str::to_string),
            },
        );
        self
    }
}

#[async_trait]
impl EntityReader for StaticEntityReader {
    async fn entity_label(&self, id: &str) -> Result<EntityLabel> {
        Ok(self.labels.get(id).cloned().unwrap_or_else(|| EntityLabel {
            id: id.to_string(),
            label: id.to_string(),
            description: None,
        }))
    }
}
