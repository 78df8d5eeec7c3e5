#![warn(missing_docs, clippy::missing_docs_in_private_items)]

//! Client for the upstream news search provider used by
//! [Gazette](../gazette/index.html).
//!
//! The provider speaks the NewsAPI protocol: searches go to the
//! `v2/everything` endpoint as query-string parameters, and results come back
//! as a JSON document with a `totalResults` count and an `articles` array.
//! Only the fields Gazette relays are modeled here; everything else the
//! provider returns is dropped during deserialization.

mod client;
mod domain;
mod errors;

pub use client::NewsApiClient;
pub use domain::{Article, ArticleSource, NewsResponse, SearchQuery};
pub use errors::{SearchError, SetupError};
