//! Helper functions for rendering
//!
//! Date formatting in the site's locale, URL building and small HTML
//! fragments used by the rich-text serializer.

mod date;
mod html;
mod url;

pub use date::*;
pub use html::*;
pub use url::*;
