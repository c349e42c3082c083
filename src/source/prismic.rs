//! Prismic REST API client

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::time::Duration;

use super::{ApiDocument, ApiPage, ContentSource, Cursor, PostsQuery, RequestContext};
use crate::config::PrismicConfig;
use crate::error::{Error, Result};

/// Client for a Prismic repository's v2 API
#[derive(Clone)]
pub struct PrismicClient {
    client: Client,
    endpoint: String,
    access_token: Option<String>,
}

impl std::fmt::Debug for PrismicClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PrismicClient")
            .field("endpoint", &self.endpoint)
            .field("access_token", &self.access_token.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

/// API root response, listing the available refs
#[derive(Debug, Deserialize)]
struct ApiInfo {
    refs: Vec<ApiRef>,
}

#[derive(Debug, Deserialize)]
struct ApiRef {
    #[serde(rename = "ref")]
    reference: String,
    #[serde(rename = "isMasterRef", default)]
    is_master_ref: bool,
}

impl ApiInfo {
    fn master_ref(&self) -> Option<&str> {
        self.refs
            .iter()
            .find(|r| r.is_master_ref)
            .map(|r| r.reference.as_str())
    }
}

impl PrismicClient {
    /// Create a client from the repository settings
    pub fn new(config: &PrismicConfig) -> Result<Self> {
        let client = Client::builder()
            .user_agent(concat!("spacetraveling/", env!("CARGO_PKG_VERSION")))
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            client,
            endpoint: config.endpoint.trim_end_matches('/').to_string(),
            access_token: config.access_token.clone().filter(|t| !t.is_empty()),
        })
    }

    /// The ref to read: the preview ref when previewing, else the master ref
    async fn resolve_ref(&self, ctx: &RequestContext) -> Result<String> {
        if let Some(reference) = &ctx.preview_ref {
            return Ok(reference.clone());
        }

        let info: ApiInfo = self
            .get_json(self.with_token(self.client.get(&self.endpoint)), "API root")
            .await?;
        info.master_ref()
            .map(str::to_string)
            .ok_or_else(|| Error::malformed("API root", "no master ref"))
    }

    async fn search(&self, params: Vec<(&'static str, String)>) -> Result<ApiPage> {
        let url = format!("{}/documents/search", self.endpoint);
        let request = self.with_token(self.client.get(url).query(&params));
        self.get_json(request, "document search").await
    }

    fn with_token(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.access_token {
            Some(token) => request.query(&[("access_token", token)]),
            None => request,
        }
    }

    async fn get_json<T: DeserializeOwned>(&self, request: RequestBuilder, what: &str) -> Result<T> {
        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(Error::unavailable(format!("{} returned {}", what, status)));
        }

        response
            .json::<T>()
            .await
            .map_err(|e| Error::malformed(what, e.to_string()))
    }
}

/// Build an `at` predicate, e.g. `[[at(document.type, "posts")]]`
fn at_predicate(path: &str, value: &str) -> String {
    format!(
        "[[at({}, \"{}\")]]",
        path,
        value.replace('\\', "\\\\").replace('"', "\\\"")
    )
}

fn listing_params(query: &PostsQuery, reference: String) -> Vec<(&'static str, String)> {
    vec![
        ("ref", reference),
        ("q", at_predicate("document.type", &query.document_type)),
        ("pageSize", query.page_size.to_string()),
        ("orderings", query.orderings.clone()),
    ]
}

fn uid_params(document_type: &str, uid: &str, reference: String) -> Vec<(&'static str, String)> {
    vec![
        ("ref", reference),
        ("q", at_predicate(&format!("my.{}.uid", document_type), uid)),
        ("pageSize", "1".to_string()),
    ]
}

#[async_trait]
impl ContentSource for PrismicClient {
    async fn query_posts(&self, query: &PostsQuery, ctx: &RequestContext) -> Result<ApiPage> {
        let reference = self.resolve_ref(ctx).await?;
        tracing::debug!(
            "Querying {} (pageSize={}, preview={})",
            query.document_type,
            query.page_size,
            ctx.is_preview()
        );
        self.search(listing_params(query, reference)).await
    }

    async fn fetch_page(&self, cursor: &Cursor) -> Result<ApiPage> {
        // next_page URLs already carry ref, query and token
        self.get_json(self.client.get(cursor.as_str()), "next page")
            .await
    }

    async fn get_by_uid(
        &self,
        document_type: &str,
        uid: &str,
        ctx: &RequestContext,
    ) -> Result<ApiDocument> {
        let reference = self.resolve_ref(ctx).await?;
        let page = self
            .search(uid_params(document_type, uid, reference))
            .await?;

        page.results
            .into_iter()
            .next()
            .ok_or_else(|| Error::not_found(document_type, uid))
    }
}
