//! Post listing

use crate::config::SiteConfig;
use crate::content::{PostsPagination, SummaryPage};
use crate::error::Result;
use crate::helpers::DateFormatter;
use crate::source::{ContentSource, PostsQuery, RequestContext};
use crate::templates::HomeData;

/// First page of the listing, newest first
pub async fn load(
    source: &dyn ContentSource,
    config: &SiteConfig,
    formatter: &DateFormatter,
    ctx: &RequestContext,
) -> Result<PostsPagination> {
    let query = PostsQuery::new(config.prismic.document_type.as_str(), config.per_page);
    let page = source.query_posts(&query, ctx).await?;
    Ok(PostsPagination::from_page(
        SummaryPage::try_from(page)?,
        formatter,
    ))
}

/// The listing after "load more" has been used until `pages` pages are shown
pub async fn load_pages(
    source: &dyn ContentSource,
    config: &SiteConfig,
    formatter: &DateFormatter,
    ctx: &RequestContext,
    pages: usize,
) -> Result<PostsPagination> {
    let mut listing = load(source, config, formatter, ctx).await?;
    for _ in 1..pages {
        if !listing.load_more(source, formatter).await? {
            break;
        }
    }
    Ok(listing)
}

/// Template data for a listing showing `pages` pages
///
/// `link` maps a page count to the URL showing that many pages. No
/// load-more link is offered once `max_pages` pages are shown.
pub fn view(
    listing: PostsPagination,
    pages: usize,
    max_pages: usize,
    link: impl Fn(usize) -> String,
    preview: bool,
) -> HomeData {
    HomeData {
        load_more_href: (listing.has_more() && pages < max_pages).then(|| link(pages + 1)),
        current_path: link(pages),
        posts: listing.results,
        preview,
    }
}
