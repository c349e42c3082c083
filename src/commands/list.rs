//! List site content

use anyhow::Result;

use crate::helpers::{listing_path, post_path};
use crate::source::{fetch_all_summaries, PostsQuery, RequestContext};
use crate::Blog;

/// List site content by type
pub async fn run(blog: &Blog, content_type: &str) -> Result<()> {
    let source = blog.source()?;
    let document_type = blog.config.prismic.document_type.as_str();
    let posts = fetch_all_summaries(source.as_ref(), document_type, &RequestContext::default()).await?;

    match content_type {
        "post" | "posts" => {
            println!("Posts ({}):", posts.len());
            for post in posts {
                let date = post
                    .first_publication_date
                    .map(|d| d.format("%Y-%m-%d").to_string())
                    .unwrap_or_else(|| "draft".to_string());
                println!("  {} - {} [{}]", date, post.title, post.uid);
            }
        }
        "route" | "routes" => {
            let routes = routes(blog, posts.len(), posts.iter().map(|p| p.uid.as_str()));
            println!("Routes ({}):", routes.len());
            for route in routes {
                println!("  {}", route);
            }
        }
        _ => {
            anyhow::bail!("Unknown type: {}. Available: post, route", content_type);
        }
    }

    Ok(())
}

/// Paths the static generator writes for `post_count` posts
fn routes<'a>(blog: &Blog, post_count: usize, uids: impl Iterator<Item = &'a str>) -> Vec<String> {
    let config = &blog.config;
    let per_page = PostsQuery::new(config.prismic.document_type.as_str(), config.per_page).page_size;
    let listing_pages = post_count.div_ceil(per_page).clamp(1, config.max_pages.max(1));

    (1..=listing_pages)
        .map(listing_path)
        .chain(uids.map(post_path))
        .chain(std::iter::once("/styles.css".to_string()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_routes() {
        let dir = tempfile::tempdir().unwrap();
        let mut blog = Blog::new(dir.path()).unwrap();
        blog.config.per_page = 2;

        let routes = routes(&blog, 3, ["c", "b", "a"].into_iter());
        assert_eq!(
            routes,
            vec!["/", "/page/2/", "/post/c", "/post/b", "/post/a", "/styles.css"]
        );
    }

    #[test]
    fn test_routes_use_clamped_page_size() {
        let dir = tempfile::tempdir().unwrap();
        let mut blog = Blog::new(dir.path()).unwrap();
        blog.config.per_page = 500;

        let uids: Vec<String> = (0..150).map(|i| format!("p{}", i)).collect();
        let routes = routes(&blog, uids.len(), uids.iter().map(String::as_str));
        assert_eq!(&routes[..3], ["/", "/page/2/", "/post/p0"]);
    }

    #[test]
    fn test_routes_without_posts() {
        let dir = tempfile::tempdir().unwrap();
        let blog = Blog::new(dir.path()).unwrap();
        assert_eq!(routes(&blog, 0, std::iter::empty()), vec!["/", "/styles.css"]);
    }
}
