//! Wikidata collaborators: label search, entity labels, SPARQL execution and
//! the popular-entity list, all over HTTP.

pub mod client;
pub mod popular;
pub mod retry;
pub mod sparql;

pub use client::{SearchHit, WikidataClient};
pub use popular::PopularEntities;
pub use retry::RetryConfig;
