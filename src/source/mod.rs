//! Content source - the headless CMS the posts come from
//!
//! Everything above this module works with the typed models in
//! [`crate::content`]. Raw documents cross the boundary as [`ApiDocument`]
//! and are validated when converted.

pub mod memory;
pub mod prismic;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::content::{Post, PostSummary};
use crate::error::Result;

pub use memory::MemorySource;
pub use prismic::PrismicClient;

/// Largest page size the search API accepts
pub const MAX_PAGE_SIZE: usize = 100;

/// Ordering used for every post listing
pub const NEWEST_FIRST: &str = "[document.first_publication_date desc]";

/// Opaque pointer to the next page of results
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Cursor(String);

impl Cursor {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Cursor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A document as returned by the search API, before validation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiDocument {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub uid: Option<String>,
    #[serde(rename = "type", default)]
    pub doc_type: String,
    #[serde(default)]
    pub first_publication_date: Option<String>,
    #[serde(default)]
    pub last_publication_date: Option<String>,
    #[serde(default)]
    pub data: serde_json::Value,
}

/// One page of search results
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiPage {
    #[serde(default)]
    pub results: Vec<ApiDocument>,
    #[serde(default)]
    pub next_page: Option<Cursor>,
}

/// Request-scoped state threaded from the HTTP boundary into every fetch
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestContext {
    /// Content revision to read instead of the published one
    pub preview_ref: Option<String>,
}

impl RequestContext {
    pub fn preview(reference: impl Into<String>) -> Self {
        Self {
            preview_ref: Some(reference.into()),
        }
    }

    pub fn is_preview(&self) -> bool {
        self.preview_ref.is_some()
    }
}

/// A post listing query
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostsQuery {
    pub document_type: String,
    pub page_size: usize,
    pub orderings: String,
}

impl PostsQuery {
    /// Posts of `document_type`, newest first
    pub fn new(document_type: impl Into<String>, page_size: usize) -> Self {
        Self {
            document_type: document_type.into(),
            page_size: page_size.clamp(1, MAX_PAGE_SIZE),
            orderings: NEWEST_FIRST.to_string(),
        }
    }
}

/// Read access to the CMS
#[async_trait]
pub trait ContentSource: Send + Sync {
    /// First page of documents matching the query
    async fn query_posts(&self, query: &PostsQuery, ctx: &RequestContext) -> Result<ApiPage>;

    /// The page a cursor points at
    async fn fetch_page(&self, cursor: &Cursor) -> Result<ApiPage>;

    /// A single document by type and uid
    async fn get_by_uid(
        &self,
        document_type: &str,
        uid: &str,
        ctx: &RequestContext,
    ) -> Result<ApiDocument>;
}

/// Every document of a type, newest first, following cursors to the end
pub async fn fetch_all_documents(
    source: &dyn ContentSource,
    document_type: &str,
    ctx: &RequestContext,
) -> Result<Vec<ApiDocument>> {
    let query = PostsQuery::new(document_type, MAX_PAGE_SIZE);
    let mut page = source.query_posts(&query, ctx).await?;
    let mut documents = Vec::new();

    loop {
        documents.append(&mut page.results);
        match page.next_page.take() {
            Some(cursor) => page = source.fetch_page(&cursor).await?,
            None => break,
        }
    }

    tracing::debug!("Fetched {} {} documents", documents.len(), document_type);
    Ok(documents)
}

/// Every post summary, newest first
pub async fn fetch_all_summaries(
    source: &dyn ContentSource,
    document_type: &str,
    ctx: &RequestContext,
) -> Result<Vec<PostSummary>> {
    fetch_all_documents(source, document_type, ctx)
        .await?
        .iter()
        .map(PostSummary::try_from)
        .collect()
}

/// Every full post, newest first
pub async fn fetch_all_posts(
    source: &dyn ContentSource,
    document_type: &str,
    ctx: &RequestContext,
) -> Result<Vec<Post>> {
    fetch_all_documents(source, document_type, ctx)
        .await?
        .iter()
        .map(Post::try_from)
        .collect()
}
