//! Built-in theme templates using the Tera template engine
//!
//! Templates are embedded in the binary. Rich-text sections are the only
//! values rendered without escaping.

use anyhow::Result;
use serde::Serialize;
use tera::{Context, Tera};

use crate::config::SiteConfig;
use crate::content::ListedPost;
use crate::helpers::{encode_segment, full_url_for};

/// Stylesheet served alongside the pages
pub const STYLESHEET: &str = include_str!("theme/styles.css");

/// Template renderer with the embedded theme
pub struct TemplateRenderer {
    tera: Tera,
}

impl TemplateRenderer {
    /// Create a new renderer with all templates loaded
    pub fn new() -> Result<Self> {
        let mut tera = Tera::default();

        tera.add_raw_templates(vec![
            ("layout.html", include_str!("theme/layout.html")),
            ("index.html", include_str!("theme/index.html")),
            ("post.html", include_str!("theme/post.html")),
            (
                "partials/header.html",
                include_str!("theme/partials/header.html"),
            ),
            (
                "partials/preview.html",
                include_str!("theme/partials/preview.html"),
            ),
        ])?;

        Ok(Self { tera })
    }

    /// Render a template with given context
    pub fn render(&self, template_name: &str, context: &Context) -> Result<String> {
        Ok(self.tera.render(template_name, context)?)
    }

    /// Render the post listing
    pub fn render_home(&self, site: &SiteData, home: &HomeData) -> Result<String> {
        let mut context = base_context(site, home.preview, &home.current_path);
        context.insert("home", home);
        self.render("index.html", &context)
    }

    /// Render a single post
    pub fn render_post(&self, site: &SiteData, post: &PostPageData) -> Result<String> {
        let mut context = base_context(site, post.preview, &post.path);
        context.insert("post", post);
        self.render("post.html", &context)
    }
}

fn base_context(site: &SiteData, preview: bool, current_path: &str) -> Context {
    let mut context = Context::new();
    context.insert("site", site);
    context.insert("preview", &preview);
    context.insert(
        "canonical_url",
        &format!("{}{}", site.url.trim_end_matches('/'), current_path),
    );
    context.insert(
        "exit_preview_href",
        &format!(
            "/api/exit-preview?currentUrl={}",
            encode_segment(current_path)
        ),
    );
    context
}

/// Data structures for template context

#[derive(Debug, Clone, Serialize)]
pub struct SiteData {
    pub title: String,
    pub description: String,
    pub url: String,
    pub language: String,
}

impl SiteData {
    pub fn from_config(config: &SiteConfig) -> Self {
        Self {
            title: config.title.clone(),
            description: config.description.clone(),
            url: full_url_for(config, "").trim_end_matches('/').to_string(),
            language: config.language.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct HomeData {
    pub posts: Vec<ListedPost>,
    /// Link that shows one more page, when there is one
    pub load_more_href: Option<String>,
    pub current_path: String,
    pub preview: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct PostPageData {
    pub uid: String,
    pub path: String,
    pub title: String,
    pub subtitle: String,
    pub author: String,
    pub banner_url: Option<String>,
    pub banner_alt: String,
    pub published_on: Option<String>,
    pub edited_on: Option<String>,
    pub reading_time: usize,
    pub sections: Vec<SectionData>,
    pub previous: Option<NavPost>,
    pub next: Option<NavPost>,
    pub preview: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct SectionData {
    pub heading: String,
    pub html: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct NavPost {
    pub title: String,
    pub path: String,
}
