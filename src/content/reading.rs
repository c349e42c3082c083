//! Reading time estimation

use super::ContentBlock;

/// Default reading speed in words per minute
pub const WORDS_PER_MINUTE: usize = 200;

/// Count the words in every heading and body of a post
pub fn count_words(blocks: &[ContentBlock]) -> usize {
    blocks
        .iter()
        .map(|block| {
            block.heading.split_whitespace().count()
                + block.body.as_text().split_whitespace().count()
        })
        .sum()
}

/// Estimated reading time in whole minutes, rounded up
///
/// A post without words reads in zero minutes.
pub fn reading_time(blocks: &[ContentBlock], words_per_minute: usize) -> usize {
    count_words(blocks).div_ceil(words_per_minute.max(1))
}
