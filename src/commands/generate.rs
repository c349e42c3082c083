//! Generate static files

use anyhow::Result;

use crate::generator::Generator;
use crate::Blog;

/// Generate the static site
pub async fn run(blog: &Blog) -> Result<()> {
    let start = std::time::Instant::now();

    let source = blog.source()?;
    let generator = Generator::new(blog)?;
    let stats = generator.generate(source.as_ref()).await?;

    tracing::info!(
        "Generated {} posts and {} listing pages in {:.2}s",
        stats.posts,
        stats.listing_pages,
        start.elapsed().as_secs_f64()
    );

    Ok(())
}
