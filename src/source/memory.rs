//! In-memory content source for offline builds and tests

use anyhow::Result as AnyResult;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use percent_encoding::{percent_decode_str, utf8_percent_encode, NON_ALPHANUMERIC};
use serde::Deserialize;
use std::collections::HashMap;
use std::fs;
use std::path::Path;

use super::{ApiDocument, ApiPage, ContentSource, Cursor, PostsQuery, RequestContext};
use crate::error::{Error, Result};
use crate::helpers::parse_timestamp;

const CURSOR_SCHEME: &str = "memory://";

/// Serves a fixed set of documents, paginated like the search API
#[derive(Debug, Clone, Default)]
pub struct MemorySource {
    documents: Vec<ApiDocument>,
    /// Documents visible only under a preview ref, replacing same-uid documents
    revisions: HashMap<String, Vec<ApiDocument>>,
}

/// Fixture files hold either a search response or a bare document array
#[derive(Deserialize)]
#[serde(untagged)]
enum Fixture {
    Page(ApiPage),
    Documents(Vec<ApiDocument>),
}

impl MemorySource {
    pub fn new(documents: Vec<ApiDocument>) -> Self {
        Self {
            documents,
            revisions: HashMap::new(),
        }
    }

    /// Load documents from a JSON fixture
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> AnyResult<Self> {
        let content = fs::read_to_string(path.as_ref())?;
        let documents = match serde_json::from_str::<Fixture>(&content)? {
            Fixture::Page(page) => page.results,
            Fixture::Documents(documents) => documents,
        };
        tracing::info!(
            "Loaded {} documents from {:?}",
            documents.len(),
            path.as_ref()
        );
        Ok(Self::new(documents))
    }

    /// Register documents that only show up in preview under `reference`
    pub fn with_revision(mut self, reference: impl Into<String>, documents: Vec<ApiDocument>) -> Self {
        self.revisions.insert(reference.into(), documents);
        self
    }

    /// Documents of a type as seen through `reference`, newest first
    fn visible(&self, document_type: &str, reference: Option<&str>) -> Vec<ApiDocument> {
        let mut documents: Vec<ApiDocument> = self
            .documents
            .iter()
            .filter(|doc| doc.doc_type == document_type)
            .cloned()
            .collect();

        if let Some(revision) = reference.and_then(|r| self.revisions.get(r)) {
            for doc in revision.iter().filter(|doc| doc.doc_type == document_type) {
                match documents.iter_mut().find(|d| d.uid == doc.uid) {
                    Some(existing) => *existing = doc.clone(),
                    None => documents.push(doc.clone()),
                }
            }
        }

        documents.sort_by_key(|doc| std::cmp::Reverse(published_at(doc)));
        documents
    }

    fn page(
        &self,
        document_type: &str,
        reference: Option<&str>,
        page: usize,
        page_size: usize,
    ) -> ApiPage {
        let documents = self.visible(document_type, reference);
        let start = (page - 1) * page_size;
        let results: Vec<ApiDocument> = documents.iter().skip(start).take(page_size).cloned().collect();

        let next_page = (start + page_size < documents.len()).then(|| {
            let mut cursor = format!(
                "{}{}?page={}&pageSize={}",
                CURSOR_SCHEME,
                utf8_percent_encode(document_type, NON_ALPHANUMERIC),
                page + 1,
                page_size
            );
            if let Some(reference) = reference {
                cursor.push_str(&format!(
                    "&ref={}",
                    utf8_percent_encode(reference, NON_ALPHANUMERIC)
                ));
            }
            Cursor::new(cursor)
        });

        ApiPage { results, next_page }
    }
}

fn published_at(doc: &ApiDocument) -> Option<DateTime<Utc>> {
    doc.first_publication_date
        .as_deref()
        .and_then(parse_timestamp)
}

/// Decoded form of a `memory://` cursor
struct CursorParts {
    document_type: String,
    page: usize,
    page_size: usize,
    reference: Option<String>,
}

fn parse_cursor(cursor: &Cursor) -> Option<CursorParts> {
    let rest = cursor.as_str().strip_prefix(CURSOR_SCHEME)?;
    let (document_type, query) = rest.split_once('?')?;

    let mut page = None;
    let mut page_size = None;
    let mut reference = None;
    for pair in query.split('&') {
        match pair.split_once('=')? {
            ("page", value) => page = value.parse().ok(),
            ("pageSize", value) => page_size = value.parse().ok(),
            ("ref", value) => reference = Some(decode(value)?),
            _ => {}
        }
    }

    Some(CursorParts {
        document_type: decode(document_type)?,
        page: page.filter(|p: &usize| *p >= 1)?,
        page_size: page_size.filter(|s: &usize| *s >= 1)?,
        reference,
    })
}

fn decode(value: &str) -> Option<String> {
    percent_decode_str(value)
        .decode_utf8()
        .ok()
        .map(|decoded| decoded.into_owned())
}

#[async_trait]
impl ContentSource for MemorySource {
    async fn query_posts(&self, query: &PostsQuery, ctx: &RequestContext) -> Result<ApiPage> {
        Ok(self.page(
            &query.document_type,
            ctx.preview_ref.as_deref(),
            1,
            query.page_size.max(1),
        ))
    }

    async fn fetch_page(&self, cursor: &Cursor) -> Result<ApiPage> {
        let parts = parse_cursor(cursor)
            .ok_or_else(|| Error::unavailable(format!("unknown cursor {}", cursor)))?;
        Ok(self.page(
            &parts.document_type,
            parts.reference.as_deref(),
            parts.page,
            parts.page_size,
        ))
    }

    async fn get_by_uid(
        &self,
        document_type: &str,
        uid: &str,
        ctx: &RequestContext,
    ) -> Result<ApiDocument> {
        self.visible(document_type, ctx.preview_ref.as_deref())
            .into_iter()
            .find(|doc| doc.uid.as_deref() == Some(uid))
            .ok_or_else(|| Error::not_found(document_type, uid))
    }
}
