//! Single post page

use crate::config::SiteConfig;
use crate::content::{reading_time, resolve_neighbors, NeighborPost, Neighbors, Post};
use crate::error::Result;
use crate::helpers::{post_path, DateFormatter};
use crate::source::{fetch_all_summaries, ContentSource, RequestContext};
use crate::templates::{NavPost, PostPageData, SectionData};

/// Fetch a post by uid together with its neighbours
pub async fn load(
    source: &dyn ContentSource,
    config: &SiteConfig,
    formatter: &DateFormatter,
    uid: &str,
    ctx: &RequestContext,
) -> Result<PostPageData> {
    let document_type = config.prismic.document_type.as_str();
    let document = source.get_by_uid(document_type, uid, ctx).await?;
    let post = Post::try_from(&document)?;

    let all = fetch_all_summaries(source, document_type, ctx).await?;
    let neighbors = resolve_neighbors(&all, &post.uid);

    Ok(view(&post, neighbors, config, formatter, ctx.is_preview()))
}

/// Template data for a post
pub fn view(
    post: &Post,
    neighbors: Neighbors,
    config: &SiteConfig,
    formatter: &DateFormatter,
    preview: bool,
) -> PostPageData {
    let sections = post
        .content
        .iter()
        .map(|block| SectionData {
            heading: block.heading.clone(),
            html: block.body.as_html(),
        })
        .collect();

    PostPageData {
        uid: post.uid.clone(),
        path: post_path(&post.uid),
        title: post.title.clone(),
        subtitle: post.subtitle.clone(),
        author: post.author.clone(),
        banner_url: post.banner.as_ref().map(|b| b.url.clone()),
        banner_alt: post
            .banner
            .as_ref()
            .and_then(|b| b.alt.clone())
            .unwrap_or_else(|| "banner".to_string()),
        published_on: post.first_publication_date.as_ref().map(|d| formatter.date(d)),
        edited_on: post
            .last_publication_date
            .as_ref()
            .map(|d| formatter.datetime(d)),
        reading_time: reading_time(&post.content, config.words_per_minute),
        sections,
        previous: neighbors.previous.map(nav_post),
        next: neighbors.next.map(nav_post),
        preview,
    }
}

fn nav_post(neighbor: NeighborPost) -> NavPost {
    NavPost {
        path: post_path(&neighbor.uid),
        title: neighbor.title,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::source::{ApiDocument, MemorySource};
    use chrono::Locale;
    use serde_json::json;

    fn formatter() -> DateFormatter {
        DateFormatter::new(
            Locale::pt_BR,
            chrono_tz::UTC,
            "dd MMM yyyy",
            "dd MMM yyyy', às 'kk':'mm",
        )
    }

    fn document(uid: &str, month: u32, body_words: usize) -> ApiDocument {
        let text = vec!["word"; body_words].join(" ");
        serde_json::from_value(json!({
            "id": uid,
            "uid": uid,
            "type": "posts",
            "first_publication_date": format!("2024-{:02}-01T09:00:00+0000", month),
            "last_publication_date": format!("2024-{:02}-02T18:30:00+0000", month),
            "data": {
                "title": format!("Title {}", uid),
                "author": "Joseph Oliveira",
                "banner": { "url": "https://images.prismic.io/b.png" },
                "content": [{
                    "heading": "Intro",
                    "body": [{ "type": "paragraph", "text": text, "spans": [] }]
                }]
            }
        }))
        .unwrap()
    }

    fn source() -> MemorySource {
        MemorySource::new(vec![
            document("p1", 1, 10),
            document("p2", 2, 199),
            document("p3", 3, 200),
        ])
    }

    #[tokio::test]
    async fn test_load_middle_post() {
        let config = SiteConfig::default();
        let page = load(&source(), &config, &formatter(), "p2", &RequestContext::default())
            .await
            .unwrap();

        assert_eq!(page.title, "Title p2");
        assert_eq!(page.reading_time, 1);
        assert_eq!(page.published_on.as_deref(), Some("01 fev 2024"));
        assert_eq!(page.edited_on.as_deref(), Some("02 fev 2024, às 18:30"));
        assert_eq!(page.banner_alt, "banner");
        assert_eq!(page.previous.as_ref().map(|p| p.path.as_str()), Some("/post/p1"));
        assert_eq!(page.next.as_ref().map(|p| p.title.as_str()), Some("Title p3"));
        assert_eq!(page.sections[0].html, format!("<p>{}</p>", vec!["word"; 199].join(" ")));
        assert!(!page.preview);
    }

    #[tokio::test]
    async fn test_reading_time_rounds_up() {
        let config = SiteConfig::default();
        let page = load(&source(), &config, &formatter(), "p3", &RequestContext::default())
            .await
            .unwrap();
        assert_eq!(page.reading_time, 2);
        assert!(page.next.is_none());
    }

    #[tokio::test]
    async fn test_missing_post() {
        let config = SiteConfig::default();
        let err = load(&source(), &config, &formatter(), "nope", &RequestContext::default())
            .await
            .unwrap_err();
        assert!(matches!(err, Error::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_preview_draft_without_neighbors() {
        let mut draft = document("draft", 4, 5);
        draft.first_publication_date = None;
        draft.last_publication_date = None;
        let source = source().with_revision("ref-1", vec![draft]);
        let config = SiteConfig::default();

        let page = load(&source, &config, &formatter(), "draft", &RequestContext::preview("ref-1"))
            .await
            .unwrap();
        assert!(page.preview);
        assert_eq!(page.published_on, None);
        assert_eq!(page.edited_on, None);
        // unpublished drafts sort last, after the oldest post
        assert_eq!(page.next.map(|p| p.path), Some("/post/p1".to_string()));
        assert!(page.previous.is_none());
    }
}
