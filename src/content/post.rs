//! Post models and the typed boundary over raw CMS documents

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::RichText;
use crate::error::{Error, Result};
use crate::helpers::parse_timestamp;
use crate::source::ApiDocument;

/// A blog post
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Post {
    /// URL identifier
    pub uid: String,

    /// First publication date (absent for unpublished previews)
    pub first_publication_date: Option<DateTime<Utc>>,

    /// Last edition date
    pub last_publication_date: Option<DateTime<Utc>>,

    pub title: String,
    pub subtitle: String,
    pub author: String,
    pub banner: Option<Banner>,

    /// Ordered content sections
    pub content: Vec<ContentBlock>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Banner {
    pub url: String,
    pub alt: Option<String>,
}

/// One section of a post: a heading followed by rich text
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContentBlock {
    pub heading: String,
    pub body: RichText,
}

/// The fields of a post shown in listings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PostSummary {
    pub uid: String,
    pub first_publication_date: Option<DateTime<Utc>>,
    pub title: String,
    pub subtitle: String,
    pub author: String,
}

/// Link to an adjacent post
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NeighborPost {
    pub uid: String,
    pub first_publication_date: Option<DateTime<Utc>>,
    pub title: String,
}

/// Older and newer posts around a given one
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Neighbors {
    /// The next older post
    pub previous: Option<NeighborPost>,
    /// The next newer post
    pub next: Option<NeighborPost>,
}

impl Post {
    pub fn summary(&self) -> PostSummary {
        PostSummary {
            uid: self.uid.clone(),
            first_publication_date: self.first_publication_date,
            title: self.title.clone(),
            subtitle: self.subtitle.clone(),
            author: self.author.clone(),
        }
    }
}

impl From<&PostSummary> for NeighborPost {
    fn from(summary: &PostSummary) -> Self {
        Self {
            uid: summary.uid.clone(),
            first_publication_date: summary.first_publication_date,
            title: summary.title.clone(),
        }
    }
}

/// Find the posts around `uid` in a list ordered newest first
///
/// `previous` is the entry after it (older), `next` the entry before it
/// (newer). An unknown `uid` yields no neighbours.
pub fn resolve_neighbors(posts: &[PostSummary], uid: &str) -> Neighbors {
    let Some(pos) = posts.iter().position(|p| p.uid == uid) else {
        tracing::warn!(
            "Post {:?} not found among {} listed posts; omitting navigation",
            uid,
            posts.len()
        );
        return Neighbors::default();
    };

    Neighbors {
        previous: posts.get(pos + 1).map(NeighborPost::from),
        next: pos
            .checked_sub(1)
            .and_then(|i| posts.get(i))
            .map(NeighborPost::from),
    }
}

/// Shape of a post document's `data` field
#[derive(Debug, Deserialize)]
struct PostFields {
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    subtitle: Option<String>,
    #[serde(default)]
    author: Option<String>,
    #[serde(default)]
    banner: Option<BannerField>,
    #[serde(default)]
    content: Option<Vec<ContentField>>,
}

#[derive(Debug, Deserialize)]
struct BannerField {
    #[serde(default)]
    url: Option<String>,
    #[serde(default)]
    alt: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ContentField {
    #[serde(default)]
    heading: Option<String>,
    #[serde(default)]
    body: Option<RichText>,
}

/// Fields shared by posts and summaries, validated
struct Validated {
    uid: String,
    first_publication_date: Option<DateTime<Utc>>,
    last_publication_date: Option<DateTime<Utc>>,
    title: String,
    subtitle: String,
    author: String,
    fields: PostFields,
}

fn validate(doc: &ApiDocument) -> Result<Validated> {
    let context = format!("document {}", doc.uid.as_deref().unwrap_or(&doc.id));

    let uid = doc
        .uid
        .clone()
        .filter(|uid| !uid.is_empty())
        .ok_or_else(|| Error::malformed(&context, "missing uid"))?;

    let mut fields: PostFields = serde_json::from_value(doc.data.clone())
        .map_err(|e| Error::malformed(&context, e.to_string()))?;

    let title = fields
        .title
        .take()
        .ok_or_else(|| Error::malformed(&context, "missing title"))?;
    let author = fields
        .author
        .take()
        .ok_or_else(|| Error::malformed(&context, "missing author"))?;

    Ok(Validated {
        first_publication_date: timestamp(&context, doc.first_publication_date.as_deref())?,
        last_publication_date: timestamp(&context, doc.last_publication_date.as_deref())?,
        uid,
        title,
        subtitle: fields.subtitle.take().unwrap_or_default(),
        author,
        fields,
    })
}

fn timestamp(context: &str, value: Option<&str>) -> Result<Option<DateTime<Utc>>> {
    match value {
        None => Ok(None),
        Some(raw) => parse_timestamp(raw)
            .map(Some)
            .ok_or_else(|| Error::malformed(context, format!("invalid timestamp {:?}", raw))),
    }
}

impl TryFrom<&ApiDocument> for PostSummary {
    type Error = Error;

    fn try_from(doc: &ApiDocument) -> Result<Self> {
        let v = validate(doc)?;
        Ok(Self {
            uid: v.uid,
            first_publication_date: v.first_publication_date,
            title: v.title,
            subtitle: v.subtitle,
            author: v.author,
        })
    }
}

impl TryFrom<&ApiDocument> for Post {
    type Error = Error;

    fn try_from(doc: &ApiDocument) -> Result<Self> {
        let v = validate(doc)?;

        let content = v
            .fields
            .content
            .ok_or_else(|| Error::malformed(format!("document {}", v.uid), "missing content"))?
            .into_iter()
            .map(|block| ContentBlock {
                heading: block.heading.unwrap_or_default(),
                body: block.body.unwrap_or_default(),
            })
            .collect();

        let banner = v.fields.banner.and_then(|banner| {
            banner.url.map(|url| Banner {
                url,
                alt: banner.alt,
            })
        });

        Ok(Self {
            uid: v.uid,
            first_publication_date: v.first_publication_date,
            last_publication_date: v.last_publication_date,
            title: v.title,
            subtitle: v.subtitle,
            author: v.author,
            banner,
            content,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;

    fn summary(uid: &str, month: u32) -> PostSummary {
        PostSummary {
            uid: uid.to_string(),
            first_publication_date: Some(Utc.with_ymd_and_hms(2024, month, 1, 0, 0, 0).unwrap()),
            title: uid.to_uppercase(),
            subtitle: String::new(),
            author: "Joseph Oliveira".to_string(),
        }
    }

    fn document(data: serde_json::Value) -> ApiDocument {
        serde_json::from_value(json!({
            "id": "YFy9hhIAACQAczAx",
            "uid": "como-utilizar-hooks",
            "type": "posts",
            "first_publication_date": "2021-03-15T19:25:28+0000",
            "last_publication_date": "2021-03-25T19:25:28+0000",
            "data": data
        }))
        .unwrap()
    }

    #[test]
    fn test_neighbors_of_middle_post() {
        let posts = vec![summary("p3", 3), summary("p2", 2), summary("p1", 1)];
        let neighbors = resolve_neighbors(&posts, "p2");
        assert_eq!(neighbors.previous.unwrap().uid, "p1");
        assert_eq!(neighbors.next.unwrap().uid, "p3");
    }

    #[test]
    fn test_neighbors_at_boundaries() {
        let posts = vec![summary("p3", 3), summary("p2", 2), summary("p1", 1)];

        let newest = resolve_neighbors(&posts, "p3");
        assert_eq!(newest.previous.map(|p| p.uid), Some("p2".to_string()));
        assert!(newest.next.is_none());

        let oldest = resolve_neighbors(&posts, "p1");
        assert!(oldest.previous.is_none());
        assert_eq!(oldest.next.map(|p| p.uid), Some("p2".to_string()));

        let single = resolve_neighbors(&posts[..1], "p3");
        assert_eq!(single, Neighbors::default());
    }

    #[test]
    fn test_neighbors_positions() {
        let posts: Vec<_> = (1..=6).rev().map(|m| summary(&format!("p{}", m), m)).collect();
        for (i, post) in posts.iter().enumerate() {
            let neighbors = resolve_neighbors(&posts, &post.uid);
            assert_eq!(
                neighbors.previous.map(|p| p.uid),
                posts.get(i + 1).map(|p| p.uid.clone())
            );
            let expected_next = if i == 0 { None } else { Some(posts[i - 1].uid.clone()) };
            assert_eq!(neighbors.next.map(|p| p.uid), expected_next);
        }
    }

    #[test]
    fn test_unknown_post_has_no_neighbors() {
        let posts = vec![summary("p2", 2), summary("p1", 1)];
        assert_eq!(resolve_neighbors(&posts, "missing"), Neighbors::default());
        assert_eq!(resolve_neighbors(&[], "p1"), Neighbors::default());
    }

    #[test]
    fn test_post_from_document() {
        let doc = document(json!({
            "title": "Como utilizar Hooks",
            "subtitle": "Pensando em sincronização em vez de ciclos de vida",
            "author": "Joseph Oliveira",
            "banner": { "url": "https://images.prismic.io/banner.png", "alt": null },
            "content": [
                { "heading": "Proin et varius", "body": [
                    { "type": "paragraph", "text": "Lorem ipsum", "spans": [] }
                ] },
                { "heading": null, "body": [] }
            ]
        }));

        let post = Post::try_from(&doc).unwrap();
        assert_eq!(post.uid, "como-utilizar-hooks");
        assert_eq!(post.title, "Como utilizar Hooks");
        assert_eq!(
            post.first_publication_date,
            Some(Utc.with_ymd_and_hms(2021, 3, 15, 19, 25, 28).unwrap())
        );
        assert_eq!(post.banner.as_ref().unwrap().url, "https://images.prismic.io/banner.png");
        assert_eq!(post.content.len(), 2);
        assert_eq!(post.content[0].body.as_text(), "Lorem ipsum");
        assert_eq!(post.content[1].heading, "");
        assert_eq!(post.summary().subtitle, post.subtitle);
    }

    #[test]
    fn test_summary_tolerates_missing_content() {
        let doc = document(json!({ "title": "T", "author": "A" }));
        let summary = PostSummary::try_from(&doc).unwrap();
        assert_eq!(summary.subtitle, "");
        assert!(matches!(
            Post::try_from(&doc),
            Err(Error::MalformedContent { .. })
        ));
    }

    #[test]
    fn test_missing_required_fields() {
        let no_title = document(json!({ "author": "A", "content": [] }));
        let err = PostSummary::try_from(&no_title).unwrap_err();
        assert!(err.to_string().contains("missing title"));

        let mut no_uid = document(json!({ "title": "T", "author": "A" }));
        no_uid.uid = None;
        assert!(PostSummary::try_from(&no_uid)
            .unwrap_err()
            .to_string()
            .contains("missing uid"));

        let mut bad_date = document(json!({ "title": "T", "author": "A" }));
        bad_date.first_publication_date = Some("last tuesday".to_string());
        assert!(matches!(
            PostSummary::try_from(&bad_date),
            Err(Error::MalformedContent { .. })
        ));
    }

    #[test]
    fn test_wrong_shape_is_malformed() {
        let doc = document(json!({ "title": ["not", "a", "string"], "author": "A" }));
        assert!(matches!(
            PostSummary::try_from(&doc),
            Err(Error::MalformedContent { .. })
        ));
    }
}
