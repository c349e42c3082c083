//! Site configuration (_config.yml)

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Environment variable that overrides `prismic.access_token`
pub const ACCESS_TOKEN_ENV: &str = "PRISMIC_ACCESS_TOKEN";

/// Main site configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SiteConfig {
    // Site
    pub title: String,
    pub description: String,
    pub url: String,

    // Locale
    pub language: String,
    pub timezone: String,
    /// date-fns style pattern for publication dates
    pub date_format: String,
    /// date-fns style pattern for the last-edition line
    pub datetime_format: String,

    // Listing
    pub per_page: usize,
    /// Upper bound on accumulated listing pages
    pub max_pages: usize,

    // Reading time
    pub words_per_minute: usize,

    // Directory
    pub public_dir: String,

    // Content source
    #[serde(default)]
    pub prismic: PrismicConfig,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            title: "spacetraveling".to_string(),
            description: String::new(),
            url: "http://localhost:3000".to_string(),

            language: "pt-BR".to_string(),
            timezone: "America/Sao_Paulo".to_string(),
            date_format: "dd MMM yyyy".to_string(),
            datetime_format: "dd MMM yyyy', às 'kk':'mm".to_string(),

            per_page: 1,
            max_pages: 50,

            words_per_minute: 200,

            public_dir: "public".to_string(),

            prismic: PrismicConfig::default(),
        }
    }
}

impl SiteConfig {
    /// Load configuration from a file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path.as_ref())?;
        let config: SiteConfig = serde_yaml::from_str(&content)?;
        Ok(config)
    }

    /// Take the access token from the environment when it is set
    pub fn apply_env(&mut self) {
        if let Ok(token) = std::env::var(ACCESS_TOKEN_ENV) {
            if !token.is_empty() {
                tracing::debug!("Using access token from {}", ACCESS_TOKEN_ENV);
                self.prismic.access_token = Some(token);
            }
        }
    }
}

/// Prismic repository settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PrismicConfig {
    /// API root, e.g. `https://my-repo.cdn.prismic.io/api/v2`
    pub endpoint: String,
    pub access_token: Option<String>,
    /// Custom type holding the articles
    pub document_type: String,
    pub timeout_secs: u64,
}

impl Default for PrismicConfig {
    fn default() -> Self {
        Self {
            endpoint: "https://spacetraveling.cdn.prismic.io/api/v2".to_string(),
            access_token: None,
            document_type: "posts".to_string(),
            timeout_secs: 30,
        }
    }
}
