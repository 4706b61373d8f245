//! Data models for the harvesting pipeline.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Placeholder text written when a document yields nothing extractable, so
/// consumers can tell "processed, empty" from "not processed".
pub const NO_CONTENT_SENTINEL: &str = "no content available";

/// A document's metadata record as returned by the search API, prior to any
/// attachment or text resolution.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentDescriptor {
    pub id: String,
    pub title: String,
    pub docket_id: String,
    pub abstract_text: Option<String>,
}

impl DocumentDescriptor {
    /// Parse one `data[]` entry from the search response.
    /// Entries without an id are unusable and yield `None`.
    pub fn from_search_item(item: &Value) -> Option<Self> {
        let id = item["id"].as_str()?.to_string();
        let attributes = &item["attributes"];

        Some(Self {
            id,
            title: attributes["title"].as_str().unwrap_or("Unknown").to_string(),
            docket_id: attributes["docketId"]
                .as_str()
                .unwrap_or("Unknown")
                .to_string(),
            abstract_text: attributes["abstract"].as_str().map(String::from),
        })
    }

    /// Abstract text as persisted in the output row.
    pub fn abstract_or_default(&self) -> &str {
        self.abstract_text
            .as_deref()
            .unwrap_or("No abstract available")
    }
}
