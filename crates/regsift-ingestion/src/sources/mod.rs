//! Regulatory document source clients.

pub mod regulations_gov;

use async_trait::async_trait;

use crate::models::DocumentDescriptor;
use regsift_common::config::HarvestConfig;

/// Fully-resolved search parameters for one harvest run.
#[derive(Debug, Clone)]
pub struct HarvestQuery {
    /// Keywords OR-combined into a single search term.
    pub search_term: String,
    /// Comma-joined document type filter.
    pub document_types: String,
    /// ISO date floor for the posted date.
    pub posted_since: String,
    /// Upper bound on harvested documents (policy-capped at 1000).
    pub max_documents: usize,
}

impl HarvestQuery {
    pub fn from_config(config: &HarvestConfig) -> Self {
        Self {
            search_term: config.search_term(),
            document_types: config.document_type_filter(),
            posted_since: config.posted_since(),
            max_documents: config.max_documents,
        }
    }
}

/// Common interface for document search backends.
#[async_trait]
pub trait DocumentSource: Send + Sync {
    /// Page through the search endpoint until the query's document budget or
    /// exhaustion is reached. A failed page ends the harvest early with
    /// whatever was collected so far.
    async fn search_documents(
        &self,
        query: &HarvestQuery,
    ) -> anyhow::Result<Vec<DocumentDescriptor>>;

    /// List the downloadable file URLs for one document, in API order.
    /// `None` means nothing downloadable — a normal case, not an error —
    /// including when the listing call itself fails terminally.
    async fn resolve_attachments(&self, document_id: &str)
        -> anyhow::Result<Option<Vec<String>>>;

    /// Fetch the raw bytes of one attachment.
    async fn download_file(&self, file_url: &str) -> anyhow::Result<Vec<u8>>;
}
