//! Process-wide cache of popular entity ids, refreshed lazily on read.

use crate::client::WikidataClient;
use chrono::{DateTime, Duration, Utc};
use tokio::sync::Mutex;

struct Cached {
    fetched_at: DateTime<Utc>,
    ids: Vec<String>,
}

pub struct PopularEntities {
    client: WikidataClient,
    max_age: Duration,
    cache: Mutex<Option<Cached>>,
}

impl PopularEntities {
    pub fn new(client: WikidataClient, refresh_secs: i64) -> Self {
        Self {
            client,
            max_age: Duration::seconds(refresh_secs.max(0)),
            cache: Mutex::new(None),
        }
    }

    pub async fn get(&self) -> Vec<String> {
        self.get_at(Utc::now()).await
    }

    /// Cached ids, fetching first if the cache is empty or older than the
    /// refresh age at `now`. A failed fetch keeps the previous list and is
    /// not retried until the next refresh is due.
    pub async fn get_at(&self, now: DateTime<Utc>) -> Vec<String> {
        let mut cache = self.cache.lock().await;
        let stale = cache
            .as_ref()
            .map_or(true, |c| now - c.fetched_at > self.max_age);

        if stale {
            match self.client.fetch_popular().await {
                Ok(ids) => {
                    tracing::info!("Refreshed popular entities ({} ids)", ids.len());
                    *cache = Some(Cached { fetched_at: now, ids });
                }
                Err(e) => {
                    tracing::warn!("Failed to refresh popular entities: {:#}", e);
                    let ids = cache.take().map(|c| c.ids).unwrap_or_default();
                    *cache = Some(Cached { fetched_at: now, ids });
                }
            }
        }

        cache.as_ref().map(|c| c.ids.clone()).unwrap_or_default()
    }
}
