//! SPARQL JSON results (`application/sparql-results+json`) flattened into rows.

use serde::Deserialize;
use std::collections::HashMap;
use wdbot_core::QueryRow;

#[derive(Debug, Clone, Deserialize)]
pub struct SparqlResults {
    pub head: SparqlHead,
    pub results: SparqlBindings,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SparqlHead {
    #[serde(default)]
    pub vars: Vec<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SparqlBindings {
    #[serde(default)]
    pub bindings: Vec<HashMap<String, SparqlValue>>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SparqlValue {
    #[serde(rename = "type")]
    pub kind: String,
    pub value: String,
}

/// Last path segment of an entity URI: `http://www.wikidata.org/entity/Q42` -> `Q42`.
pub fn entity_id_from_uri(uri: &str) -> &str {
    uri.rsplit('/').next().unwrap_or(uri)
}

/// One row per binding, taken from the first variable (in `head.vars` order)
/// that has a matching `<var>Label`. Bindings without one are skipped.
pub fn rows_from_results(results: &SparqlResults) -> Vec<QueryRow> {
    results
        .results
        .bindings
        .iter()
        .filter_map(|binding| {
            results.head.vars.iter().find_map(|var| {
                let value = binding.get(var)?;
                let label = binding.get(&format!("{}Label", var))?;
                Some(QueryRow {
                    id: entity_id_from_uri(&value.value).to_string(),
                    label: label.value.clone(),
                    description: binding
                        .get(&format!("{}Description", var))
                        .map(|d| d.value.clone()),
                })
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"{
        "head": { "vars": ["writer", "writerLabel", "writerDescription"] },
        "results": { "bindings": [
            {
                "writer": { "type": "uri", "value": "http://www.wikidata.org/entity/Q42" },
                "writerLabel": { "xml:lang": "en", "type": "literal", "value": "Douglas Adams" },
                "writerDescription": { "xml:lang": "en", "type": "literal", "value": "English writer" }
            },
            {
                "writer": { "type": "uri", "value": "http://www.wikidata.org/entity/Q1" }
            },
            {
                "writer": { "type": "uri", "value": "http://www.wikidata.org/entity/Q535" },
                "writerLabel": { "type": "literal", "value": "Victor Hugo" }
            }
        ] }
    }"#;

    #[test]
    fn test_rows_from_results() {
        let parsed: SparqlResults = serde_json::from_str(SAMPLE).unwrap();
        let rows = rows_from_results(&parsed);
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].id, "Q42");
        assert_eq!(rows[0].label, "Douglas Adams");
        assert_eq!(rows[0].description.as_deref(), Some("English writer"));
        assert_eq!(rows[1].id, "Q535");
        assert!(rows[1].description.is_none());
    }

    #[test]
    fn test_empty_results() {
        let parsed: SparqlResults =
            serde_json::from_str(r#"{"head":{"vars":["x"]},"results":{"bindings":[]}}"#).unwrap();
        assert!(rows_from_results(&parsed).is_empty());
    }

    #[test]
    fn test_entity_id_from_uri() {
        assert_eq!(entity_id_from_uri("http://www.wikidata.org/entity/Q42"), "Q42");
        assert_eq!(entity_id_from_uri("Q42"), "Q42");
    }
}
