//! SPARQL text for the single-triple wizard query, plus result paging.

/// Label service clause appended to every generated query.
pub const LABEL_SERVICE: &str =
    r#"SERVICE wikibase:label { bd:serviceParam wikibase:language "[AUTO_LANGUAGE],en" }"#;

pub const RESULT_LIMIT: u32 = 100;

/// Variable name used when the collected subject has nothing usable.
pub const FALLBACK_VARIABLE: &str = "item";

/// `SELECT ?v ?vLabel` for everything with `property` pointing at `item`.
///
/// `variable` is embedded verbatim; run it through [`sanitize_variable`] first
/// unless passthrough is intended.
pub fn build_query(variable: &str, property: &str, item: &str) -> String {
    format!(
        "SELECT DISTINCT ?{v} ?{v}Label WHERE {{\n  ?{v} wdt:{p} wd:{o}\n  {service}\n}}\nLIMIT {limit}",
        v = variable,
        p = property,
        o = item,
        service = LABEL_SERVICE,
        limit = RESULT_LIMIT,
    )
}

/// Canned example query (`P40` "child" of `Q40026`) used when there is no
/// finished wizard to build from.
pub fn default_query() -> String {
    build_query("persona", "P40", "Q40026")
}

/// Reduce free text to a SPARQL variable name: letters of any script and
/// ASCII digits survive lowercased, every other run of characters becomes
/// one `_`.
pub fn sanitize_variable(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.trim().chars() {
        if c.is_alphabetic() || c.is_ascii_digit() {
            out.extend(c.to_lowercase());
        } else if !out.ends_with('_') {
            out.push('_');
        }
    }
    let trimmed = out.trim_matches('_');
    if trimmed.is_empty() {
        FALLBACK_VARIABLE.to_string()
    } else {
        trimmed.to_string()
    }
}

/// A zero-based page over a slice of results.
#[derive(Debug, Clone, PartialEq)]
pub struct ResultPage<'a, T> {
    pub items: &'a [T],
    pub page: usize,
    pub total_pages: usize,
}

impl<'a, T> ResultPage<'a, T> {
    pub fn of(rows: &'a [T], page: usize, per_page: usize) -> Self {
        let per_page = per_page.max(1);
        let total_pages = rows.len().div_ceil(per_page).max(1);
        let start = page.saturating_mul(per_page).min(rows.len());
        let end = start.saturating_add(per_page).min(rows.len());
        Self {
            items: &rows[start..end],
            page,
            total_pages,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_query_shape() {
        let q = build_query("writer", "P106", "Q36180");
        assert!(q.starts_with("SELECT DISTINCT ?writer ?writerLabel WHERE {"));
        assert!(q.contains("?writer wdt:P106 wd:Q36180"));
        assert!(q.contains(LABEL_SERVICE));
        assert!(q.ends_with("LIMIT 100"));
    }

    #[test]
    fn test_default_query() {
        let q = default_query();
        assert!(q.contains("?persona ?personaLabel"));
        assert!(q.contains("?persona wdt:P40 wd:Q40026"));
    }

    #[test]
    fn test_empty_ids_still_well_formed() {
        let q = build_query("x", "", "");
        assert!(q.contains("?x wdt: wd:"));
        assert!(q.ends_with("LIMIT 100"));
    }

    #[test]
    fn test_sanitize_variable() {
        assert_eq!(sanitize_variable("douglas adams"), "douglas_adams");
        assert_eq!(sanitize_variable("  Writers!! of-1984 "), "writers_of_1984");
        assert_eq!(sanitize_variable("?x} wdt:P1"), "x_wdt_p1");
        assert_eq!(sanitize_variable("???"), FALLBACK_VARIABLE);
        assert_eq!(sanitize_variable(""), FALLBACK_VARIABLE);
        assert_eq!(sanitize_variable("Città di Roma"), "città_di_roma");
        assert_eq!(sanitize_variable("東京"), "東京");
        assert_eq!(sanitize_variable("Ωmega ½"), "ωmega");
    }

    #[test]
    fn test_result_page() {
        let rows: Vec<u32> = (0..23).collect();
        let first = ResultPage::of(&rows, 0, 10);
        assert_eq!(first.items.len(), 10);
        assert_eq!(first.total_pages, 3);

        let last = ResultPage::of(&rows, 2, 10);
        assert_eq!(last.items, &[20, 21, 22]);

        let beyond = ResultPage::of(&rows, 5, 10);
        assert!(beyond.is_empty());

        let far = ResultPage::of(&rows, usize::MAX, 10);
        assert!(far.is_empty());
        assert_eq!(far.total_pages, 3);
        assert!(ResultPage::of(&rows, 1, usize::MAX).is_empty());

        let none: Vec<u32> = vec![];
        assert_eq!(ResultPage::of(&none, 0, 10).total_pages, 1);
    }
}
