//! Regulations.gov v4 API client.
//!
//! Endpoints used:
//!   search:      GET {base}/documents
//!   attachments: GET {base}/documents/{id}/attachments
//!   files:       plain GET on each resolved fileUrl
//!
//! Auth is a static X-Api-Key header on every API call. Throttling (429) is
//! handled inside the shared [`ThrottledClient`]; this client only sees
//! successes and terminal failures.

use async_trait::async_trait;
use serde_json::Value;
use tracing::{debug, info, instrument, warn};

use super::{DocumentSource, HarvestQuery};
use crate::models::DocumentDescriptor;
use regsift_common::client::{FetchError, ThrottledClient};

const PAGE_SIZE: usize = 100;
const API_KEY_HEADER: &str = "X-Api-Key";

pub struct RegulationsGovClient {
    client: ThrottledClient,
    base_url: String,
    api_key: String,
}

impl RegulationsGovClient {
    pub fn new(client: ThrottledClient, base_url: &str, api_key: &str) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
        }
    }

    /// Fetch one search page and return its raw `data[]` entries.
    async fn fetch_page(&self, query: &HarvestQuery, page: usize) -> Result<Vec<Value>, FetchError> {
        let params: Vec<(&str, String)> = vec![
            ("filter[searchTerm]", query.search_term.clone()),
            ("filter[postedDate][ge]", query.posted_since.clone()),
            ("filter[documentType]", query.document_types.clone()),
            ("page[size]", PAGE_SIZE.to_string()),
            ("page[number]", page.to_string()),
        ];

        let request = self
            .client
            .get(&format!("{}/documents", self.base_url))
            .header(API_KEY_HEADER, &self.api_key)
            .query(&params);

        let body: Value = self.client.execute(request).await?.json().await?;
        Ok(body["data"].as_array().cloned().unwrap_or_default())
    }
}

#[async_trait]
impl DocumentSource for RegulationsGovClient {
    #[instrument(skip(self, query))]
    async fn search_documents(
        &self,
        query: &HarvestQuery,
    ) -> anyhow::Result<Vec<DocumentDescriptor>> {
        let mut documents = Vec::new();
        let mut page = 1;

        while documents.len() < query.max_documents {
            let items = match self.fetch_page(query, page).await {
                Ok(items) => items,
                Err(e) => {
                    warn!(page, error = %e, "Failed to retrieve search page, stopping harvest");
                    break;
                }
            };

            if items.is_empty() {
                debug!(page, "No more documents found");
                break;
            }

            let before = documents.len();
            documents.extend(items.iter().filter_map(DocumentDescriptor::from_search_item));
            info!(
                page,
                retrieved = documents.len() - before,
                total = documents.len(),
                "Retrieved search page"
            );
            page += 1;
        }

        documents.truncate(query.max_documents);
        Ok(documents)
    }

    #[instrument(skip(self))]
    async fn resolve_attachments(
        &self,
        document_id: &str,
    ) -> anyhow::Result<Option<Vec<String>>> {
        let url = format!("{}/documents/{}/attachments", self.base_url, document_id);
        let request = self.client.get(&url).header(API_KEY_HEADER, &self.api_key);

        let response = match self.client.execute(request).await {
            Ok(response) => response,
            Err(e) => {
                warn!(document_id, error = %e, "Failed to fetch attachment listing");
                return Ok(None);
            }
        };

        let body: Value = response.json().await?;
        let urls = attachment_urls(&body);
        debug!(document_id, n = urls.len(), "Attachment listing resolved");

        Ok(if urls.is_empty() { None } else { Some(urls) })
    }

    async fn download_file(&self, file_url: &str) -> anyhow::Result<Vec<u8>> {
        let response = self.client.execute(self.client.get(file_url)).await?;
        Ok(response.bytes().await?.to_vec())
    }
}

/// Collect every `attributes.fileFormats[].fileUrl` across the listing,
/// preserving the API's return order.
fn attachment_urls(body: &Value) -> Vec<String> {
    let mut urls = Vec::new();

    for attachment in body["data"].as_array().unwrap_or(&vec![]) {
        let Some(formats) = attachment["attributes"]["fileFormats"].as_array() else {
            continue;
        };
        for format in formats {
            if let Some(url) = format["fileUrl"].as_str() {
                urls.push(url.to_string());
            }
        }
    }

    urls
}
