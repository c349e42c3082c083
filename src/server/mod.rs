//! HTTP server - renders pages on demand, or serves the generated site

use anyhow::Result;
use axum::{
    extract::{Path, Query, State},
    http::{header, HeaderMap, StatusCode},
    response::{Html, IntoResponse, Redirect, Response},
    routing::get,
    Router,
};
use percent_encoding::percent_decode_str;
use serde::Deserialize;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use crate::config::SiteConfig;
use crate::error::Error;
use crate::helpers::{redirect_target, DateFormatter};
use crate::pages;
use crate::source::{ContentSource, RequestContext};
use crate::templates::{SiteData, TemplateRenderer, STYLESHEET};
use crate::Blog;

/// Cookie holding the preview ref while previewing
pub const PREVIEW_COOKIE: &str = "io.prismic.preview";

/// Shared server state
pub struct AppState {
    source: Arc<dyn ContentSource>,
    renderer: TemplateRenderer,
    config: SiteConfig,
    formatter: DateFormatter,
    site: SiteData,
}

impl AppState {
    pub fn new(config: SiteConfig, source: Arc<dyn ContentSource>) -> Result<Self> {
        Ok(Self {
            source,
            renderer: TemplateRenderer::new()?,
            formatter: DateFormatter::from_config(&config)?,
            site: SiteData::from_config(&config),
            config,
        })
    }
}

/// Start the server
///
/// In static mode the site is generated first and `public/` is served as is.
pub async fn start(blog: &Blog, ip: &str, port: u16, static_mode: bool, open: bool) -> Result<()> {
    let app = if static_mode {
        tracing::info!("Generating static files...");
        blog.generate().await?;
        static_router(blog)
    } else {
        let state = AppState::new(blog.config.clone(), blog.source()?)?;
        router(Arc::new(state))
    };

    // Parse address - handle "localhost" specially
    let bind_ip = if ip == "localhost" { "127.0.0.1" } else { ip };
    let addr: SocketAddr = format!("{}:{}", bind_ip, port).parse()?;

    let url = format!("http://{}:{}", ip, port);
    println!("Server running at {}", url);
    println!("Press Ctrl+C to stop.");

    if open {
        if let Err(e) = open_browser(&url) {
            tracing::warn!("Failed to open browser: {}", e);
        }
    }

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Routes rendering every page from the content source
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(home_handler))
        .route("/post/:uid", get(post_handler))
        .route("/api/exit-preview", get(exit_preview_handler))
        .route("/styles.css", get(stylesheet_handler))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
}

/// Routes serving a generated site from disk
pub fn static_router(blog: &Blog) -> Router {
    Router::new()
        .route("/api/exit-preview", get(exit_preview_handler))
        .fallback_service(ServeDir::new(&blog.public_dir).append_index_html_on_directories(true))
        .layer(TraceLayer::new_for_http())
}

#[derive(Debug, Deserialize)]
struct ListingParams {
    pages: Option<usize>,
}

async fn home_handler(
    State(state): State<Arc<AppState>>,
    Query(params): Query<ListingParams>,
    headers: HeaderMap,
) -> Result<Html<String>, ServerError> {
    let ctx = preview_context(&headers);
    let max_pages = state.config.max_pages.max(1);
    let pages = params.pages.unwrap_or(1).clamp(1, max_pages);

    let listing = pages::home::load_pages(
        state.source.as_ref(),
        &state.config,
        &state.formatter,
        &ctx,
        pages,
    )
    .await?;
    let home = pages::home::view(listing, pages, max_pages, accumulated_path, ctx.is_preview());

    Ok(Html(state.renderer.render_home(&state.site, &home)?))
}

async fn post_handler(
    State(state): State<Arc<AppState>>,
    Path(uid): Path<String>,
    headers: HeaderMap,
) -> Result<Html<String>, ServerError> {
    let ctx = preview_context(&headers);
    let post = pages::post::load(
        state.source.as_ref(),
        &state.config,
        &state.formatter,
        &uid,
        &ctx,
    )
    .await?;

    Ok(Html(state.renderer.render_post(&state.site, &post)?))
}

#[derive(Debug, Deserialize)]
struct ExitPreviewParams {
    #[serde(rename = "currentUrl")]
    current_url: Option<String>,
}

/// Leave preview mode and go back to the page being previewed
async fn exit_preview_handler(Query(params): Query<ExitPreviewParams>) -> impl IntoResponse {
    let target = redirect_target(params.current_url.as_deref());
    tracing::debug!("Exiting preview, returning to {}", target);

    (
        [(
            header::SET_COOKIE,
            format!("{}=; Path=/; Max-Age=0", PREVIEW_COOKIE),
        )],
        Redirect::temporary(&target),
    )
}

async fn stylesheet_handler() -> impl IntoResponse {
    (
        [(header::CONTENT_TYPE, "text/css; charset=utf-8")],
        STYLESHEET,
    )
}

/// Listing URL showing `pages` accumulated pages
fn accumulated_path(pages: usize) -> String {
    if pages <= 1 {
        "/".to_string()
    } else {
        format!("/?pages={}", pages)
    }
}

/// Read the preview ref from the request cookies
fn preview_context(headers: &HeaderMap) -> RequestContext {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, _)| *name == PREVIEW_COOKIE)
        .map(|(_, value)| percent_decode_str(value).decode_utf8_lossy().into_owned())
        .filter(|reference| !reference.is_empty())
        .map(RequestContext::preview)
        .unwrap_or_default()
}

/// Failures while answering a page request
#[derive(Debug)]
enum ServerError {
    Content(Error),
    Render(anyhow::Error),
}

impl From<Error> for ServerError {
    fn from(e: Error) -> Self {
        Self::Content(e)
    }
}

impl From<anyhow::Error> for ServerError {
    fn from(e: anyhow::Error) -> Self {
        Self::Render(e)
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            Self::Content(Error::NotFound { .. }) => (StatusCode::NOT_FOUND, "Not found"),
            Self::Content(Error::SourceUnavailable(_)) => {
                (StatusCode::BAD_GATEWAY, "Content source unavailable")
            }
            Self::Content(Error::MalformedContent { .. }) | Self::Render(_) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "Server error")
            }
        };

        match &self {
            Self::Content(e) if status == StatusCode::NOT_FOUND => tracing::debug!("{}", e),
            Self::Content(e) => tracing::error!("Request failed: {}", e),
            Self::Render(e) => tracing::error!("Rendering failed: {:#}", e),
        }

        (status, message).into_response()
    }
}

/// Open a URL in the default browser
fn open_browser(url: &str) -> Result<()> {
    #[cfg(target_os = "macos")]
    {
        std::process::Command::new("open").arg(url).spawn()?;
    }

    #[cfg(target_os = "linux")]
    {
        std::process::Command::new("xdg-open").arg(url).spawn()?;
    }

    #[cfg(target_os = "windows")]
    {
        std::process::Command::new("cmd")
            .args(["/c", "start", url])
            .spawn()?;
    }

    Ok(())
}
