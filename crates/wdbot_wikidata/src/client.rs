use crate::retry::{with_retry, RetryConfig};
use crate::sparql::{rows_from_results, SparqlResults};
use anyhow::{Context, Result};
use async_trait::async_trait;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Deserialize;
use std::collections::HashMap;
use std::time::Duration;
use url::Url;
use wdbot_core::config::WikidataConfig;
use wdbot_core::{EntityLabel, EntityReader, LabelKind, LabelResolver, QueryExecutor, QueryRow};

static ENTITY_ID: Lazy<Regex> = Lazy::new(|| Regex::new(r"Q\d+").expect("valid regex"));

/// One hit from `wbsearchentities`.
#[derive(Debug, Clone, Deserialize)]
pub struct SearchHit {
    pub id: String,
    #[serde(default)]
    pub label: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    search: Vec<SearchHit>,
}

#[derive(Debug, Deserialize)]
struct EntitiesResponse {
    #[serde(default)]
    entities: HashMap<String, EntityDoc>,
}

#[derive(Debug, Deserialize)]
struct EntityDoc {
    #[serde(default)]
    labels: HashMap<String, LangValue>,
    #[serde(default)]
    descriptions: HashMap<String, LangValue>,
}

#[derive(Debug, Deserialize)]
struct LangValue {
    value: String,
}

/// Wikidata over HTTP: label search, entity labels, SPARQL and the popular list.
#[derive(Clone)]
pub struct WikidataClient {
    client: reqwest::Client,
    api_url: Url,
    sparql_url: Url,
    popular_url: Url,
    language: String,
    retry: RetryConfig,
}

impl WikidataClient {
    pub fn new(config: &WikidataConfig) -> Result<Self> {
        let api_url = Url::parse(&config.api_url).context("Invalid wikidata.api_url")?;
        let sparql_url = Url::parse(&config.sparql_url).context("Invalid wikidata.sparql_url")?;
        let popular_url = Url::parse(&config.popular_url).context("Invalid wikidata.popular_url")?;

        let client = reqwest::Client::builder()
            .user_agent(config.user_agent.clone())
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            client,
            api_url,
            sparql_url,
            popular_url,
            language: config.language.clone(),
            retry: RetryConfig {
                max_attempts: config.max_attempts.max(1),
                ..RetryConfig::default()
            },
        })
    }

    pub fn with_retry(mut self, retry: RetryConfig) -> Self {
        self.retry = retry;
        self
    }

    async fn get(&self, endpoint: &str, url: &Url, params: &[(&str, &str)], accept: &str) -> Result<reqwest::Response> {
        with_retry(&self.retry, endpoint, || {
            let request = self
                .client
                .get(url.clone())
                .query(params)
                .header(reqwest::header::ACCEPT, accept);
            async move { request.send().await.map_err(anyhow::Error::from) }
        })
        .await
    }

    pub async fn search(&self, text: &str, kind: LabelKind, limit: u32) -> Result<Vec<SearchHit>> {
        let limit = limit.to_string();
        let response = self
            .get(
                "wbsearchentities",
                &self.api_url,
                &[
                    ("action", "wbsearchentities"),
                    ("search", text),
                    ("language", self.language.as_str()),
                    ("uselang", self.language.as_str()),
                    ("type", kind.as_str()),
                    ("limit", limit.as_str()),
                    ("format", "json"),
                ],
                "application/json",
            )
            .await?;
        let body: SearchResponse = response
            .json()
            .await
            .context("Failed to parse wbsearchentities response")?;
        Ok(body.search)
    }

    /// Ids listed on the popular-items wiki page, first occurrence order.
    pub async fn fetch_popular(&self) -> Result<Vec<String>> {
        let body = self
            .get("popular", &self.popular_url, &[], "text/plain")
            .await?
            .text()
            .await
            .context("Failed to read popular entities page")?;

        let mut ids: Vec<String> = Vec::new();
        for m in ENTITY_ID.find_iter(&body) {
            if !ids.iter().any(|id| id == m.as_str()) {
                ids.push(m.as_str().to_string());
            }
        }
        Ok(ids)
    }
}

#[async_trait]
impl LabelResolver for WikidataClient {
    async fn resolve(&self, text: &str, kind: LabelKind) -> Result<Option<String>> {
        if text.trim().is_empty() {
            return Ok(None);
        }
        let hits = self.search(text, kind, 1).await?;
        Ok(hits.into_iter().next().map(|hit| hit.id))
    }
}

#[async_trait]
impl EntityReader for WikidataClient {
    async fn entity_label(&self, id: &str) -> Result<EntityLabel> {
        let response = self
            .get(
                "wbgetentities",
                &self.api_url,
                &[
                    ("action", "wbgetentities"),
                    ("ids", id),
                    ("props", "labels|descriptions"),
                    ("languages", self.language.as_str()),
                    ("format", "json"),
                ],
                "application/json",
            )
            .await?;
        let body: EntitiesResponse = response
            .json()
            .await
            .context("Failed to parse wbgetentities response")?;

        let doc = body.entities.get(id);
        let label = doc
            .and_then(|d| d.labels.get(&self.language))
            .map(|l| l.value.clone())
            .unwrap_or_else(|| id.to_string());
        let description = doc
            .and_then(|d| d.descriptions.get(&self.language))
            .map(|d| d.value.clone());

        Ok(EntityLabel {
            id: id.to_string(),
            label,
            description,
        })
    }
}

#[async_trait]
impl QueryExecutor for WikidataClient {
    async fn execute(&self, query: &str) -> Result<Vec<QueryRow>> {
        let response = self
            .get(
                "sparql",
                &self.sparql_url,
                &[("query", query), ("format", "json")],
                "application/sparql-results+json",
            )
            .await?;
        let results: SparqlResults = response
            .json()
            .await
            .context("Failed to parse SPARQL response")?;
        let rows = rows_from_results(&results);
        tracing::debug!("SPARQL returned {} rows", rows.len());
        Ok(rows)
    }
}
