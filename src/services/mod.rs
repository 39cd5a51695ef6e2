//! Service layer for the digest application.
//!
//! - `PaperSource`: the upstream search collaborator
//! - `ArxivClient`: `PaperSource` backed by the arXiv Atom API

mod arxiv;

use async_trait::async_trait;

use crate::error::Result;
use crate::models::RawResult;

pub use arxiv::{ArxivClient, parse_feed};

/// Upstream search provider.
///
/// Results come back newest submission first and at most `max_results` long.
#[async_trait]
pub trait PaperSource: Send + Sync {
    async fn search(&self, query: &str, max_results: usize) -> Result<Vec<RawResult>>;
}
