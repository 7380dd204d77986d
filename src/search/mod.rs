//! Remote search layer.
//!
//! - **[`SearchBackend`]**: the seam the controller's host calls through.
//! - **[`algolia`]**: HTTPS client for the hosted index.
//!
//! Retrieval, ranking and typo tolerance all happen on the service; this
//! layer only shapes the request and decodes hits.

pub mod algolia;

use serde::{Deserialize, Serialize};
use std::future::Future;
use std::time::Duration;

use crate::model::ResultItem;

pub use algolia::AlgoliaClient;

/// Highlight delimiters requested from the service. They cannot occur in
/// markup, so highlighted values can be escaped and then re-tagged.
pub const HIGHLIGHT_PRE_TAG: &str = "__searchbox-hl__";
pub const HIGHLIGHT_POST_TAG: &str = "__/searchbox-hl__";

/// One remote query.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SearchRequest {
    pub query: String,
    /// Requested number of hits.
    pub count: usize,
    /// Attributes to retrieve.
    pub fields: Vec<String>,
    /// Attributes to highlight.
    pub highlight_fields: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SearchResponse {
    #[serde(rename = "hits", default)]
    pub items: Vec<ResultItem>,
    #[serde(rename = "nbHits", default, skip_serializing_if = "Option::is_none")]
    pub nb_hits: Option<u64>,
    #[serde(
        rename = "processingTimeMS",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub processing_time_ms: Option<u64>,
}

impl SearchResponse {
    pub fn from_items(items: Vec<ResultItem>) -> Self {
        Self {
            nb_hits: Some(items.len() as u64),
            items,
            processing_time_ms: None,
        }
    }
}

/// Remote call failures. Transient and permanent failures are handled the
/// same way (hide the dropdown, log, no retry).
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SearchError {
    #[error("request failed: {0}")]
    Http(String),

    #[error("search service returned {status}: {message}")]
    Status { status: u16, message: String },

    #[error("malformed response: {0}")]
    Decode(String),

    #[error("request timed out after {0:?}")]
    Timeout(Duration),
}

/// A hosted search index.
pub trait SearchBackend: Send + Sync {
    fn search(
        &self,
        request: SearchRequest,
    ) -> impl Future<Output = Result<SearchResponse, SearchError>> + Send;
}

impl<B: SearchBackend> SearchBackend for std::sync::Arc<B> {
    fn search(
        &self,
        request: SearchRequest,
    ) -> impl Future<Output = Result<SearchResponse, SearchError>> + Send {
        (**self).search(request)
    }
}
