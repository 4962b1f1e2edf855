//! Remote page source

use async_trait::async_trait;
use ferrex_model::{Page, PageRequest};
use std::fmt::Debug;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SourceError {
    #[error("Transport error while fetching page: {0}")]
    Transport(String),
    #[error("Page source rejected cursor: {0}")]
    InvalidCursor(String),
    #[error("Page source does not support offset-anchored fetches")]
    OffsetUnsupported,
    #[error("Page source error: {0}")]
    Other(String),
}

/// Cursor-paginated query over one grouping key.
///
/// Cursors are opaque and monotonic: a page fetched with the cursor returned
/// by the previous page always continues where that page stopped.
#[async_trait]
pub trait PageSource: Send + Sync + Debug {
    /// Fetch one page. `request.page_size` is an upper bound; sources may
    /// return fewer records.
    async fn fetch_page(
        &self,
        request: &PageRequest,
    ) -> Result<Page, SourceError>;
}
