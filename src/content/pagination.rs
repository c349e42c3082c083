//! Listing pagination: accumulate pages of post summaries behind a cursor

use serde::Serialize;
use std::collections::HashSet;

use super::PostSummary;
use crate::error::Result;
use crate::helpers::{post_path, FormatDate};
use crate::source::{ApiPage, ContentSource, Cursor};

/// One page of summaries as returned by the content source
#[derive(Debug, Clone, PartialEq)]
pub struct SummaryPage {
    pub results: Vec<PostSummary>,
    pub next_page: Option<Cursor>,
}

impl TryFrom<ApiPage> for SummaryPage {
    type Error = crate::error::Error;

    fn try_from(page: ApiPage) -> Result<Self> {
        let results = page
            .results
            .iter()
            .map(PostSummary::try_from)
            .collect::<Result<Vec<_>>>()?;
        Ok(Self {
            results,
            next_page: page.next_page,
        })
    }
}

/// A listed post, with its publication date already formatted for display
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ListedPost {
    pub uid: String,
    pub path: String,
    pub title: String,
    pub subtitle: String,
    pub author: String,
    pub published_on: Option<String>,
}

impl ListedPost {
    fn new<F: FormatDate + ?Sized>(summary: PostSummary, formatter: &F) -> Self {
        Self {
            path: post_path(&summary.uid),
            published_on: summary
                .first_publication_date
                .as_ref()
                .map(|date| formatter.format_date(date)),
            uid: summary.uid,
            title: summary.title,
            subtitle: summary.subtitle,
            author: summary.author,
        }
    }
}

/// Posts shown so far plus the cursor to the next page
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PostsPagination {
    pub results: Vec<ListedPost>,
    pub next_page: Option<Cursor>,
}

impl PostsPagination {
    /// Start a listing from its first page
    pub fn from_page<F: FormatDate + ?Sized>(page: SummaryPage, formatter: &F) -> Self {
        let mut pagination = Self::default();
        pagination.extend(page, formatter);
        pagination
    }

    /// Append a fetched page in received order and take over its cursor
    ///
    /// Only the new entries are formatted. Posts already listed are skipped.
    pub fn extend<F: FormatDate + ?Sized>(&mut self, page: SummaryPage, formatter: &F) {
        let mut seen: HashSet<String> = self.results.iter().map(|p| p.uid.clone()).collect();

        for summary in page.results {
            if !seen.insert(summary.uid.clone()) {
                tracing::warn!("Skipping duplicate post {:?} in listing", summary.uid);
                continue;
            }
            self.results.push(ListedPost::new(summary, formatter));
        }

        self.next_page = page.next_page;
    }

    /// Whether another page can be loaded
    pub fn has_more(&self) -> bool {
        self.next_page.is_some()
    }

    /// Fetch the page behind the cursor and append it
    ///
    /// Returns `Ok(false)` when there is nothing more to load. Fetch errors
    /// are returned unchanged and leave the listing untouched.
    pub async fn load_more<F: FormatDate + Sync + ?Sized>(
        &mut self,
        source: &dyn ContentSource,
        formatter: &F,
    ) -> Result<bool> {
        let Some(cursor) = self.next_page.clone() else {
            return Ok(false);
        };

        tracing::debug!("Loading more posts from {}", cursor);
        let page = SummaryPage::try_from(source.fetch_page(&cursor).await?)?;
        self.extend(page, formatter);

        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::source::{ApiDocument, MemorySource, PostsQuery, RequestContext};
    use chrono::{DateTime, TimeZone, Utc};
    use serde_json::json;
    use std::cell::Cell;

    /// Formatter that records how often it is called
    struct Counting(Cell<usize>);

    impl FormatDate for Counting {
        fn format_date(&self, date: &DateTime<Utc>) -> String {
            self.0.set(self.0.get() + 1);
            date.format("%Y-%m-%d").to_string()
        }
    }

    struct Iso;

    impl FormatDate for Iso {
        fn format_date(&self, date: &DateTime<Utc>) -> String {
            date.format("%d/%m/%Y").to_string()
        }
    }

    fn summary(uid: &str, day: u32) -> PostSummary {
        PostSummary {
            uid: uid.to_string(),
            first_publication_date: Some(Utc.with_ymd_and_hms(2024, 1, day, 12, 0, 0).unwrap()),
            title: format!("Title {}", uid),
            subtitle: String::new(),
            author: "Danilo Vieira".to_string(),
        }
    }

    fn page(uids: &[(&str, u32)], next: Option<&str>) -> SummaryPage {
        SummaryPage {
            results: uids.iter().map(|(uid, day)| summary(uid, *day)).collect(),
            next_page: next.map(Cursor::new),
        }
    }

    fn uids(pagination: &PostsPagination) -> Vec<&str> {
        pagination.results.iter().map(|p| p.uid.as_str()).collect()
    }

    #[test]
    fn test_extend_appends_in_order() {
        let mut listing = PostsPagination::from_page(page(&[("e", 5), ("d", 4)], Some("c2")), &Iso);
        assert!(listing.has_more());

        listing.extend(page(&[("c", 3)], None), &Iso);
        assert_eq!(uids(&listing), vec!["e", "d", "c"]);
        assert_eq!(listing.next_page, None);
        assert_eq!(listing.results[2].published_on.as_deref(), Some("03/01/2024"));
        assert_eq!(listing.results[2].path, "/post/c");
    }

    #[test]
    fn test_merge_is_associative() {
        let a = page(&[("e", 5), ("d", 4)], Some("cursor-b"));
        let b = page(&[("c", 3)], Some("cursor-c"));
        let c = page(&[("b", 2), ("a", 1)], None);

        let mut sequential = PostsPagination::from_page(a.clone(), &Iso);
        sequential.extend(b.clone(), &Iso);
        sequential.extend(c.clone(), &Iso);

        let mut combined_first = a;
        combined_first.results.extend(b.results);
        combined_first.next_page = b.next_page;
        let mut grouped = PostsPagination::from_page(combined_first, &Iso);
        grouped.extend(c, &Iso);

        assert_eq!(sequential, grouped);
    }

    #[test]
    fn test_dates_formatted_once() {
        let counter = Counting(Cell::new(0));
        let mut listing = PostsPagination::from_page(page(&[("c", 3)], Some("n1")), &counter);
        listing.extend(page(&[("b", 2)], Some("n2")), &counter);
        listing.extend(page(&[("a", 1)], None), &counter);

        assert_eq!(counter.0.get(), 3);
        assert_eq!(listing.results[0].published_on.as_deref(), Some("2024-01-03"));
    }

    #[test]
    fn test_duplicates_are_skipped() {
        let mut listing = PostsPagination::from_page(page(&[("b", 2), ("a", 1)], Some("n")), &Iso);
        listing.extend(page(&[("a", 1), ("z", 1)], None), &Iso);
        assert_eq!(uids(&listing), vec!["b", "a", "z"]);
    }

    #[test]
    fn test_missing_date_stays_empty() {
        let mut draft = summary("draft", 1);
        draft.first_publication_date = None;
        let listing = PostsPagination::from_page(
            SummaryPage {
                results: vec![draft],
                next_page: None,
            },
            &Iso,
        );
        assert_eq!(listing.results[0].published_on, None);
    }

    fn document(uid: &str, day: u32) -> ApiDocument {
        serde_json::from_value(json!({
            "id": uid,
            "uid": uid,
            "type": "posts",
            "first_publication_date": format!("2021-03-{:02}T10:00:00+0000", day),
            "last_publication_date": null,
            "data": { "title": uid, "subtitle": "", "author": "Joseph", "content": [] }
        }))
        .unwrap()
    }

    #[tokio::test]
    async fn test_load_more_walks_all_pages() {
        let source = MemorySource::new((1..=5).map(|d| document(&format!("p{}", d), d)).collect());
        let query = PostsQuery::new("posts", 2);
        let first = source
            .query_posts(&query, &RequestContext::default())
            .await
            .unwrap();

        let mut listing = PostsPagination::from_page(SummaryPage::try_from(first).unwrap(), &Iso);
        assert_eq!(uids(&listing), vec!["p5", "p4"]);

        assert!(listing.load_more(&source, &Iso).await.unwrap());
        assert!(listing.load_more(&source, &Iso).await.unwrap());
        assert!(!listing.load_more(&source, &Iso).await.unwrap());
        assert_eq!(uids(&listing), vec!["p5", "p4", "p3", "p2", "p1"]);
    }

    #[tokio::test]
    async fn test_load_more_propagates_errors() {
        let source = MemorySource::new(vec![document("p1", 1)]);
        let mut listing = PostsPagination {
            results: Vec::new(),
            next_page: Some(Cursor::new("https://elsewhere.example/page/2")),
        };

        let err = listing.load_more(&source, &Iso).await.unwrap_err();
        assert!(matches!(err, Error::SourceUnavailable(_)));
        assert!(listing.results.is_empty());
        assert!(listing.has_more());
    }
}
