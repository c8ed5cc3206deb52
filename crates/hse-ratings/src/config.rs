//! Scraper configuration.
//!
//! Defaults target the Moscow campus bachelor listing on www.hse.ru. Every
//! field can be overridden from a TOML file so the scraper can be pointed at a
//! mirror or another campus.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::fetcher::ScraperError;

/// Which html5ever entry point is used to build the document tree.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MarkupParser {
    /// Full document parsing (implied `<html>`, `<head>` and `<body>`).
    #[default]
    Document,
    /// Fragment parsing, for pages served without a document skeleton.
    Fragment,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScraperConfig {
    /// Page listing every educational program.
    pub listing_url: String,
    /// Prefix of the per-program rating pages, `{ratings_base_url}/{code}/ratings`.
    pub ratings_base_url: String,
    /// Towns whose programs are kept.
    pub target_towns: Vec<String>,
    /// Hosts a program link must point at to be kept.
    pub allowed_domains: Vec<String>,
    /// Path segment marking a bachelor program link.
    pub degree_marker: String,
    /// Index of the host among the `/`-separated pieces of a program link.
    pub domain_segment: usize,
    pub parser: MarkupParser,
    pub timeout_secs: u64,
    pub user_agent: String,
}

impl Default for ScraperConfig {
    fn default() -> Self {
        Self {
            listing_url: crate::LISTING_URL.to_string(),
            ratings_base_url: crate::RATINGS_BASE_URL.to_string(),
            target_towns: vec!["Москва".to_string()],
            allowed_domains: vec!["www.hse.ru".to_string()],
            degree_marker: "ba".to_string(),
            domain_segment: 2,
            parser: MarkupParser::default(),
            timeout_secs: 30,
            user_agent: format!("{}/{}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION")),
        }
    }
}

impl ScraperConfig {
    /// Parse a configuration from TOML. Missing keys fall back to defaults.
    pub fn from_toml_str(s: &str) -> Result<Self, ScraperError> {
        toml::from_str(s).map_err(|e| ScraperError::Config(e.to_string()))
    }

    pub fn from_toml_file(path: &Path) -> Result<Self, ScraperError> {
        let contents = std::fs::read_to_string(path).map_err(|e| {
            ScraperError::Config(format!("Failed to read {}: {}", path.display(), e))
        })?;
        log::info!("Loaded configuration from {}", path.display());
        Self::from_toml_str(&contents)
    }

    /// Index page of a program's ratings.
    pub fn ratings_index_url(&self, code: &str) -> String {
        format!("{}/{}/ratings", self.ratings_base_url.trim_end_matches('/'), code)
    }

    /// Rating page filtered by rating view and course.
    pub fn ratings_table_url(&self, code: &str, from: &str, course: u32) -> String {
        format!(
            "{}?from={}&course={}",
            self.ratings_index_url(code),
            from,
            course
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_urls() {
        let config = ScraperConfig::default();
        assert_eq!(
            config.ratings_index_url("economics"),
            "https://www.hse.ru/ba/economics/ratings"
        );
        assert_eq!(
            config.ratings_table_url("economics", "123456", 2),
            "https://www.hse.ru/ba/economics/ratings?from=123456&course=2"
        );
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config = ScraperConfig::from_toml_str(
            r#"
            target_towns = ["Санкт-Петербург"]
            ratings_base_url = "https://mirror.example.org/ba/"
            parser = "fragment"
            "#,
        )
        .expect("Failed to parse config");

        assert_eq!(config.target_towns, vec!["Санкт-Петербург"]);
        assert_eq!(config.parser, MarkupParser::Fragment);
        assert_eq!(config.allowed_domains, vec!["www.hse.ru"]);
        assert_eq!(config.degree_marker, "ba");
        assert_eq!(
            config.ratings_index_url("law"),
            "https://mirror.example.org/ba/law/ratings"
        );
    }

    #[test]
    fn test_invalid_toml_is_config_error() {
        let err = ScraperConfig::from_toml_str("domain_segment = \"two\"").unwrap_err();
        assert!(matches!(err, ScraperError::Config(_)));
    }
}
