//! Page loaders - fetch and shape the data each route renders
//!
//! Loaders take the request context explicitly and return content errors
//! untouched so the caller decides how a failure surfaces.

pub mod home;
pub mod post;
