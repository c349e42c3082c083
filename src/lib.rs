//! spacetraveling: a blog front-end over a headless CMS
//!
//! Posts are read from a Prismic repository (or a local JSON fixture) and
//! rendered with embedded Tera templates, either to a static `public/`
//! tree or on demand by the built-in server.

pub mod commands;
pub mod config;
pub mod content;
pub mod error;
pub mod generator;
pub mod helpers;
pub mod pages;
pub mod server;
pub mod source;
pub mod templates;

use anyhow::Result;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use source::{ContentSource, MemorySource, PrismicClient};

/// Name of the site configuration file
pub const CONFIG_FILE: &str = "_config.yml";

/// The blog application
#[derive(Debug, Clone)]
pub struct Blog {
    /// Site configuration
    pub config: config::SiteConfig,
    /// Base directory
    pub base_dir: PathBuf,
    /// Public (output) directory
    pub public_dir: PathBuf,
    /// JSON fixture to read instead of the CMS
    pub fixtures: Option<PathBuf>,
}

impl Blog {
    /// Create a new instance from a directory
    pub fn new<P: AsRef<Path>>(base_dir: P) -> Result<Self> {
        let base_dir = base_dir.as_ref().to_path_buf();
        let config_path = base_dir.join(CONFIG_FILE);

        let mut config = if config_path.exists() {
            config::SiteConfig::load(&config_path)?
        } else {
            config::SiteConfig::default()
        };
        config.apply_env();

        let public_dir = base_dir.join(&config.public_dir);

        Ok(Self {
            config,
            base_dir,
            public_dir,
            fixtures: None,
        })
    }

    /// Read content from a JSON fixture, relative to the base directory
    pub fn with_fixtures(mut self, fixtures: Option<PathBuf>) -> Self {
        self.fixtures = fixtures.map(|path| self.base_dir.join(path));
        self
    }

    /// The content source this blog reads from
    pub fn source(&self) -> Result<Arc<dyn ContentSource>> {
        match &self.fixtures {
            Some(path) => Ok(Arc::new(MemorySource::from_json_file(path)?)),
            None => {
                tracing::debug!("Reading content from {}", self.config.prismic.endpoint);
                Ok(Arc::new(PrismicClient::new(&self.config.prismic)?))
            }
        }
    }

    /// Generate the static site
    pub async fn generate(&self) -> Result<()> {
        commands::generate::run(self).await
    }

    /// Clean the public directory
    pub fn clean(&self) -> Result<()> {
        commands::clean::run(self)
    }
}
