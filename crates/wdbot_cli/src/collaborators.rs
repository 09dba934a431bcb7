use anyhow::Result;
use std::sync::Arc;
use wdbot_core::mock::{StaticEntityReader, StaticLabelResolver, StaticQueryExecutor};
use wdbot_core::{EntityReader, LabelResolver, QueryExecutor, QueryRow, WdbotConfig};
use wdbot_wikidata::{PopularEntities, WikidataClient};

/// The external services one run talks to.
pub struct Collaborators {
    pub resolver: Arc<dyn LabelResolver>,
    pub executor: Arc<dyn QueryExecutor>,
    pub reader: Arc<dyn EntityReader>,
    /// `None` when running offline.
    pub popular: Option<PopularEntities>,
}

impl Collaborators {
    pub fn online(config: &WdbotConfig) -> Result<Self> {
        let client = WikidataClient::new(&config.wikidata)?;
        let shared = Arc::new(client.clone());
        Ok(Self {
            resolver: shared.clone(),
            executor: shared.clone(),
            reader: shared,
            popular: Some(PopularEntities::new(client, config.wikidata.popular_refresh_secs)),
        })
    }

    pub fn offline() -> Self {
        let row = |id: &str, label: &str, description: &str| QueryRow {
            id: id.to_string(),
            label: label.to_string(),
            description: Some(description.to_string()),
        };
        let executor = StaticQueryExecutor::new(vec![
            row("Q42", "Douglas Adams", "English writer and humorist"),
            row("Q535", "Victor Hugo", "French Romantic author"),
            row("Q692", "William Shakespeare", "English playwright and poet"),
        ]);
        let reader = StaticEntityReader::new()
            .with_label("Q42", "Douglas Adams", Some("English writer and humorist"))
            .with_label("Q5", "human", Some("common name of Homo sapiens"))
            .with_label("Q145", "United Kingdom", Some("country in north-west Europe"));

        Self {
            resolver: Arc::new(StaticLabelResolver::wikidata_sample()),
            executor: Arc::new(executor),
            reader: Arc::new(reader),
            popular: None,
        }
    }
}
