//! Generator module - renders the whole site to static HTML files

use anyhow::Result;
use std::fs;
use std::path::{Component, Path};

use crate::content::{resolve_neighbors, Post, PostSummary};
use crate::helpers::{listing_path, DateFormatter};
use crate::pages;
use crate::source::{fetch_all_posts, ContentSource, RequestContext};
use crate::templates::{SiteData, TemplateRenderer, STYLESHEET};
use crate::Blog;

/// Counts of what a generation run wrote
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GenerateStats {
    pub listing_pages: usize,
    pub posts: usize,
}

/// Static site generator using Tera templates
pub struct Generator {
    blog: Blog,
    renderer: TemplateRenderer,
    formatter: DateFormatter,
    site: SiteData,
}

impl Generator {
    /// Create a new generator
    pub fn new(blog: &Blog) -> Result<Self> {
        Ok(Self {
            blog: blog.clone(),
            renderer: TemplateRenderer::new()?,
            formatter: DateFormatter::from_config(&blog.config)?,
            site: SiteData::from_config(&blog.config),
        })
    }

    /// Generate the entire site from the published content
    pub async fn generate(&self, source: &dyn ContentSource) -> Result<GenerateStats> {
        fs::create_dir_all(&self.blog.public_dir)?;

        let ctx = RequestContext::default();
        let listing_pages = self.generate_listing_pages(source, &ctx).await?;

        let document_type = self.blog.config.prismic.document_type.as_str();
        let posts = fetch_all_posts(source, document_type, &ctx).await?;
        self.generate_post_pages(&posts)?;

        self.write("styles.css", STYLESHEET)?;

        Ok(GenerateStats {
            listing_pages,
            posts: posts.len(),
        })
    }

    /// Write `index.html` and `page/<n>/index.html`, page n listing the
    /// first n pages of posts
    async fn generate_listing_pages(
        &self,
        source: &dyn ContentSource,
        ctx: &RequestContext,
    ) -> Result<usize> {
        let config = &self.blog.config;
        let max_pages = config.max_pages.max(1);
        let mut listing = pages::home::load(source, config, &self.formatter, ctx).await?;
        let mut page_num = 1;

        loop {
            let home = pages::home::view(listing.clone(), page_num, max_pages, listing_path, false);
            let html = self.renderer.render_home(&self.site, &home)?;
            self.write(&listing_file(page_num), &html)?;

            if page_num >= max_pages {
                if listing.has_more() {
                    tracing::warn!(
                        "Stopped listing at {} pages; older posts are only reachable directly",
                        max_pages
                    );
                }
                break;
            }
            if !listing.load_more(source, &self.formatter).await? {
                break;
            }
            page_num += 1;
        }

        Ok(page_num)
    }

    /// Write `post/<uid>/index.html` for every post
    fn generate_post_pages(&self, posts: &[Post]) -> Result<()> {
        let summaries: Vec<PostSummary> = posts.iter().map(Post::summary).collect();

        for post in posts {
            let neighbors = resolve_neighbors(&summaries, &post.uid);
            let data = pages::post::view(post, neighbors, &self.blog.config, &self.formatter, false);
            let html = self.renderer.render_post(&self.site, &data)?;
            self.write(&post_file(&post.uid)?, &html)?;
        }

        Ok(())
    }

    fn write(&self, relative: &str, content: &str) -> Result<()> {
        if !Path::new(relative)
            .components()
            .all(|c| matches!(c, Component::Normal(_)))
        {
            anyhow::bail!("Refusing to write outside the public directory: {}", relative);
        }
        let output_path = self.blog.public_dir.join(relative);
        write_file(&output_path, content)?;
        tracing::debug!("Generated: {:?}", output_path);
        Ok(())
    }
}

fn listing_file(page_num: usize) -> String {
    if page_num <= 1 {
        "index.html".to_string()
    } else {
        format!("page/{}/index.html", page_num)
    }
}

/// Output file of a post page; the uid must be a single path segment
fn post_file(uid: &str) -> Result<String> {
    if uid.is_empty() || uid == "." || uid == ".." || uid.contains(['/', '\\']) {
        anyhow::bail!("Post uid {:?} cannot be used as a directory name", uid);
    }
    Ok(format!("post/{}/index.html", uid))
}

fn write_file(path: &Path, content: &str) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, content)?;
    Ok(())
}
