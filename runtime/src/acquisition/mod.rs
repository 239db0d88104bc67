//! HTTP acquisition: the bounded page fetch and the classification built on it.
//!
//! Everything here works without a browser. The dynamic path only starts
//! once the classifier decides a page cannot be read from its raw HTML.

pub mod classifier;
pub mod http_client;
