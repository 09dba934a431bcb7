use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::Path;

// ============================================================================
// Top-level config
// ============================================================================

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct WdbotConfig {
    pub database: DatabaseConfig,
    pub history: HistoryConfig,
    pub wizard: WizardConfig,
    pub wikidata: WikidataConfig,
}

impl WdbotConfig {
    /// Load config from a TOML file, falling back to defaults for missing fields.
    /// After loading, env var overrides are applied.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read config file: {}", path.as_ref().display()))?;
        let mut config: WdbotConfig =
            toml::from_str(&content).with_context(|| "Failed to parse TOML config")?;
        config.apply_env_overrides();
        Ok(config)
    }

    /// Try to load from path; if file doesn't exist, return defaults with env overrides.
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> Self {
        match Self::load(path) {
            Ok(cfg) => cfg,
            Err(e) => {
                tracing::info!("Config file not found or invalid ({}), using defaults", e);
                let mut cfg = Self::default();
                cfg.apply_env_overrides();
                cfg
            }
        }
    }

    fn apply_env_overrides(&mut self) {
        if let Ok(v) = std::env::var("WDBOT_DB_PATH") {
            self.database.path = v;
        }
        if let Ok(v) = std::env::var("WDBOT_HISTORY_WINDOW") {
            if let Ok(n) = v.parse() {
                self.history.window = n;
            }
        }
        if let Ok(v) = std::env::var("WIKIDATA_API_URL") {
            self.wikidata.api_url = v;
        }
        if let Ok(v) = std::env::var("WIKIDATA_SPARQL_URL") {
            self.wikidata.sparql_url = v;
        }
        if let Ok(v) = std::env::var("WIKIDATA_LANGUAGE") {
            self.wikidata.language = v;
        }
        if let Ok(v) = std::env::var("WIKIDATA_USER_AGENT") {
            self.wikidata.user_agent = v;
        }
    }
}

// ============================================================================
// Sub-configs
// ============================================================================

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    /// SQLite file. `:memory:` keeps everything in process.
    pub path: String,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: "history.db".to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct HistoryConfig {
    /// Entries kept per (user, category).
    pub window: usize,
    /// Tokens kept in a user's path trail.
    pub path_window: usize,
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            window: 5,
            path_window: 5,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct WizardConfig {
    /// Reduce the collected subject to lowercase letters, ASCII digits and `_`
    /// before using it as the query variable. When false the text is embedded verbatim.
    pub sanitize_subject: bool,
    pub results_per_page: usize,
}

impl Default for WizardConfig {
    fn default() -> Self {
        Self {
            sanitize_subject: true,
            results_per_page: 10,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct WikidataConfig {
    pub api_url: String,
    pub sparql_url: String,
    pub popular_url: String,
    pub language: String,
    pub user_agent: String,
    pub timeout_secs: u64,
    pub max_attempts: u32,
    /// Age after which the popular-entity list is fetched again.
    pub popular_refresh_secs: i64,
}

impl Default for WikidataConfig {
    fn default() -> Self {
        Self {
            api_url: "https://www.wikidata.org/w/api.php".to_string(),
            sparql_url: "https://query.wikidata.org/sparql".to_string(),
            popular_url:
                "https://www.wikidata.org/w/index.php?title=Wikidata:Main_Page/Popular&action=raw"
                    .to_string(),
            language: "en".to_string(),
            user_agent: "wdbot/0.1 (wikidata history bot)".to_string(),
            timeout_secs: 10,
            max_attempts: 3,
            popular_refresh_secs: 60 * 60,
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let cfg = WdbotConfig::default();
        assert_eq!(cfg.history.window, 5);
        assert_eq!(cfg.history.path_window, 5);
        assert!(cfg.wizard.sanitize_subject);
        assert_eq!(cfg.wizard.results_per_page, 10);
        assert_eq!(cfg.wikidata.language, "en");
        assert_eq!(cfg.wikidata.popular_refresh_secs, 3600);
    }

    #[test]
    fn test_parse_minimal_toml() {
        let toml_str = r#"
[history]
window = 8
"#;
        let cfg: WdbotConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(cfg.history.window, 8);
        // Defaults for unspecified fields
        assert_eq!(cfg.history.path_window, 5);
        assert_eq!(cfg.database.path, "history.db");
    }

    #[test]
    fn test_parse_full_toml() {
        let toml_str = r#"
[database]
path = "data/state.db"

[history]
window = 3
path_window = 4

[wizard]
sanitize_subject = false
results_per_page = 20

[wikidata]
api_url = "http://localhost:9000/w/api.php"
sparql_url = "http://localhost:9000/sparql"
popular_url = "http://localhost:9000/popular"
language = "de"
user_agent = "test-agent"
timeout_secs = 2
max_attempts = 1
popular_refresh_secs = 60
"#;
        let cfg: WdbotConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(cfg.database.path, "data/state.db");
        assert_eq!(cfg.history.window, 3);
        assert_eq!(cfg.history.path_window, 4);
        assert!(!cfg.wizard.sanitize_subject);
        assert_eq!(cfg.wizard.results_per_page, 20);
        assert_eq!(cfg.wikidata.language, "de");
        assert_eq!(cfg.wikidata.max_attempts, 1);
        assert_eq!(cfg.wikidata.popular_refresh_secs, 60);
    }

    #[test]
    fn test_env_overrides_and_defaults() {
        // Part 1: env overrides
        std::env::set_var("WDBOT_DB_PATH", "/tmp/override.db");
        std::env::set_var("WDBOT_HISTORY_WINDOW", "7");

        let mut cfg = WdbotConfig::default();
        cfg.apply_env_overrides();

        assert_eq!(cfg.database.path, "/tmp/override.db");
        assert_eq!(cfg.history.window, 7);

        std::env::remove_var("WDBOT_DB_PATH");
        std::env::remove_var("WDBOT_HISTORY_WINDOW");

        // Part 2: nonexistent path returns defaults (no env interference)
        let cfg = WdbotConfig::load_or_default("/nonexistent/path.toml");
        assert_eq!(cfg.database.path, "history.db");
    }
}
