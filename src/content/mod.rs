//! Content module - posts, rich text and the pure transforms over them

pub mod pagination;
mod post;
pub mod reading;
mod richtext;

pub use pagination::{ListedPost, PostsPagination, SummaryPage};
pub use post::{resolve_neighbors, Banner, ContentBlock, NeighborPost, Neighbors, Post, PostSummary};
pub use reading::{count_words, reading_time};
pub use richtext::RichText;
