//! End-to-end harvesting pipeline.
//!
//! Orchestrates the full flow for a single run:
//!   1. Page through the search endpoint until the document budget or
//!      exhaustion is reached
//!   2. For each document, list its downloadable attachments
//!   3. Download each attachment into the artifact store
//!   4. Extract plain text from each stored artifact
//!   5. Append one CSV row per document, in harvest order
//!
//! Failure policy: everything below the page level skips only the unit of
//! work it touches. A document with a failed attachment listing, download,
//! or extraction still produces its row, falling back to the
//! "no content available" sentinel. Sink errors abort the run.

use std::time::Instant;

use tracing::{debug, info, instrument, warn};

use crate::models::{DocumentDescriptor, NO_CONTENT_SENTINEL};
use crate::pdf_text::extract_pdf_text;
use crate::sink::CsvSink;
use crate::sources::{DocumentSource, HarvestQuery};
use crate::storage::{artifact_key, ArtifactStore};
use regsift_common::error::RegsiftError;

/// Counters summarizing one harvest run.
#[derive(Debug, Clone, Default)]
pub struct HarvestResult {
    pub documents_found: usize,
    pub records_written: usize,
    pub attachments_downloaded: usize,
    pub extraction_failures: usize,
    pub errors: Vec<String>,
    pub duration_ms: u64,
}

/// Runs the pipeline for one query. Every harvested descriptor yields
/// exactly one output row, in harvest order.
#[instrument(skip_all, fields(term = %query.search_term, max = query.max_documents))]
pub async fn run_harvest(
    query: &HarvestQuery,
    source: &dyn DocumentSource,
    store: &dyn ArtifactStore,
    sink: &mut CsvSink,
) -> Result<HarvestResult, RegsiftError> {
    let t0 = Instant::now();
    info!("Starting harvest");

    let documents = source.search_documents(query).await?;
    let mut result = HarvestResult {
        documents_found: documents.len(),
        ..HarvestResult::default()
    };

    for descriptor in &documents {
        let document_text = harvest_document_text(descriptor, source, store, &mut result)
            .await
            .unwrap_or_else(|| NO_CONTENT_SENTINEL.to_string());

        sink.write_record(descriptor, &document_text)?;
        result.records_written += 1;
        debug!(document_id = %descriptor.id, "Record written");
    }

    result.duration_ms = t0.elapsed().as_millis() as u64;
    info!(
        found = result.documents_found,
        written = result.records_written,
        attachments = result.attachments_downloaded,
        extraction_failures = result.extraction_failures,
        errors = result.errors.len(),
        duration_ms = result.duration_ms,
        "Harvest complete"
    );
    Ok(result)
}

/// Resolve, download, store, and extract every attachment of one document.
/// Returns `None` when nothing extractable survived; the caller writes the
/// sentinel in that case.
async fn harvest_document_text(
    descriptor: &DocumentDescriptor,
    source: &dyn DocumentSource,
    store: &dyn ArtifactStore,
    result: &mut HarvestResult,
) -> Option<String> {
    let file_urls = match source.resolve_attachments(&descriptor.id).await {
        Ok(Some(urls)) => urls,
        Ok(None) => {
            debug!(document_id = %descriptor.id, "No downloadable attachments");
            return None;
        }
        Err(e) => {
            warn!(document_id = %descriptor.id, error = %e, "Attachment resolution failed");
            result
                .errors
                .push(format!("attachments for {}: {e}", descriptor.id));
            return None;
        }
    };

    let mut texts = Vec::new();

    for (index, file_url) in file_urls.iter().enumerate() {
        let sequence = index + 1;
        let key = artifact_key(&descriptor.id, sequence);

        let bytes = match source.download_file(file_url).await {
            Ok(bytes) => bytes,
            Err(e) => {
                warn!(document_id = %descriptor.id, sequence, error = %e, "Attachment download failed");
                result
                    .errors
                    .push(format!("download {key}: {e}"));
                continue;
            }
        };

        if let Err(e) = store.write(&key, &bytes) {
            warn!(document_id = %descriptor.id, sequence, error = %e, "Failed to store artifact");
            result.errors.push(format!("store {key}: {e}"));
            continue;
        }
        result.attachments_downloaded += 1;
        debug!(document_id = %descriptor.id, sequence, bytes = bytes.len(), "Artifact stored");

        // Extract from the stored copy, not the in-flight buffer, so the
        // artifact on disk is exactly what the text came from.
        let artifact = match store.read(&key) {
            Ok(artifact) => artifact,
            Err(e) => {
                warn!(document_id = %descriptor.id, sequence, error = %e, "Failed to read artifact back");
                result.errors.push(format!("read {key}: {e}"));
                continue;
            }
        };

        match extract_pdf_text(&artifact) {
            Ok(text) if !text.is_empty() => texts.push(text),
            Ok(_) => debug!(document_id = %descriptor.id, sequence, "Attachment contained no text"),
            Err(e) => {
                warn!(document_id = %descriptor.id, sequence, error = %e, "Text extraction failed");
                result.extraction_failures += 1;
            }
        }
    }

    if texts.is_empty() {
        None
    } else {
        Some(texts.join("\n\n"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryArtifactStore;
    use async_trait::async_trait;
    use regsift_test_utils::pdf_with_text;
    use std::collections::HashMap;

    /// Canned source: descriptors plus per-document attachment bytes.
    #[derive(Default)]
    struct StubSource {
        documents: Vec<DocumentDescriptor>,
        attachments: HashMap<String, Vec<(String, Vec<u8>)>>,
        fail_listing_for: Vec<String>,
    }

    impl StubSource {
        fn descriptor(id: &str) -> DocumentDescriptor {
            DocumentDescriptor {
                id: id.to_string(),
                title: format!("Title {id}"),
                docket_id: format!("DOCKET-{id}"),
                abstract_text: Some(format!("Abstract {id}")),
            }
        }

        fn with_document(mut self, id: &str, attachments: Vec<(&str, Vec<u8>)>) -> Self {
            self.documents.push(Self::descriptor(id));
            self.attachments.insert(
                id.to_string(),
                attachments
                    .into_iter()
                    .map(|(url, bytes)| (url.to_string(), bytes))
                    .collect(),
            );
            self
        }
    }

    #[async_trait]
    impl DocumentSource for StubSource {
        async fn search_documents(
            &self,
            query: &HarvestQuery,
        ) -> anyhow::Result<Vec<DocumentDescriptor>> {
            let mut documents = self.documents.clone();
            documents.truncate(query.max_documents);
            Ok(documents)
        }

        async fn resolve_attachments(
            &self,
            document_id: &str,
        ) -> anyhow::Result<Option<Vec<String>>> {
            if self.fail_listing_for.iter().any(|id| id == document_id) {
                anyhow::bail!("listing unavailable for {document_id}");
            }
            let urls: Vec<String> = self
                .attachments
                .get(document_id)
                .map(|files| files.iter().map(|(url, _)| url.clone()).collect())
                .unwrap_or_default();
            Ok(if urls.is_empty() { None } else { Some(urls) })
        }

        async fn download_file(&self, file_url: &str) -> anyhow::Result<Vec<u8>> {
            for files in self.attachments.values() {
                if let Some((_, bytes)) = files.iter().find(|(url, _)| url == file_url) {
                    return Ok(bytes.clone());
                }
            }
            anyhow::bail!("no such file: {file_url}")
        }
    }

    fn query(max_documents: usize) -> HarvestQuery {
        HarvestQuery {
            search_term: "digital assets".to_string(),
            document_types: "Proposed Rule,Rule".to_string(),
            posted_since: "2023-08-25".to_string(),
            max_documents,
        }
    }

    fn read_rows(path: &std::path::Path) -> Vec<Vec<String>> {
        let mut reader = csv::Reader::from_path(path).expect("open csv");
        reader
            .records()
            .map(|record| {
                record
                    .expect("row")
                    .iter()
                    .map(|field| field.to_string())
                    .collect()
            })
            .collect()
    }

    #[tokio::test]
    async fn test_one_row_per_descriptor_with_sentinel_fallbacks() {
        // d1: one extractable attachment; d2: none; d3: one corrupt one.
        let source = StubSource::default()
            .with_document("d1", vec![("https://files.example/d1.pdf", pdf_with_text("Hello"))])
            .with_document("d2", vec![])
            .with_document("d3", vec![("https://files.example/d3.pdf", b"garbage".to_vec())]);
        let store = MemoryArtifactStore::new();
        let dir = tempfile::tempdir().expect("tempdir");
        let csv_path = dir.path().join("out.csv");
        let mut sink = CsvSink::create(&csv_path).expect("sink");

        let result = run_harvest(&query(10), &source, &store, &mut sink)
            .await
            .expect("run");

        assert_eq!(result.documents_found, 3);
        assert_eq!(result.records_written, 3);
        assert_eq!(result.extraction_failures, 1);

        let rows = read_rows(&csv_path);
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[0][0], "d1");
        assert!(rows[0][4].contains("Hello"));
        assert_eq!(rows[1][0], "d2");
        assert_eq!(rows[1][4], NO_CONTENT_SENTINEL);
        assert_eq!(rows[2][0], "d3");
        assert_eq!(rows[2][4], NO_CONTENT_SENTINEL);
    }

    #[tokio::test]
    async fn test_corrupt_attachment_is_silently_omitted_from_text() {
        let source = StubSource::default().with_document(
            "d1",
            vec![
                ("https://files.example/good.pdf", pdf_with_text("Readable part")),
                ("https://files.example/bad.pdf", b"not a pdf".to_vec()),
            ],
        );
        let store = MemoryArtifactStore::new();
        let dir = tempfile::tempdir().expect("tempdir");
        let csv_path = dir.path().join("out.csv");
        let mut sink = CsvSink::create(&csv_path).expect("sink");

        let result = run_harvest(&query(10), &source, &store, &mut sink)
            .await
            .expect("run");

        assert_eq!(result.extraction_failures, 1);
        // Both artifacts were still stored under their sequence keys.
        assert_eq!(store.keys(), vec!["d1_1.pdf", "d1_2.pdf"]);

        let rows = read_rows(&csv_path);
        assert!(rows[0][4].contains("Readable part"));
        assert!(!rows[0][4].contains("no content"));
    }

    #[tokio::test]
    async fn test_failed_listing_skips_only_that_document() {
        let mut source = StubSource::default()
            .with_document("d1", vec![("https://files.example/d1.pdf", pdf_with_text("Alpha"))])
            .with_document("d2", vec![("https://files.example/d2.pdf", pdf_with_text("Beta"))]);
        source.fail_listing_for.push("d1".to_string());

        let store = MemoryArtifactStore::new();
        let dir = tempfile::tempdir().expect("tempdir");
        let csv_path = dir.path().join("out.csv");
        let mut sink = CsvSink::create(&csv_path).expect("sink");

        let result = run_harvest(&query(10), &source, &store, &mut sink)
            .await
            .expect("run");

        assert_eq!(result.records_written, 2);
        assert_eq!(result.errors.len(), 1);

        let rows = read_rows(&csv_path);
        assert_eq!(rows[0][4], NO_CONTENT_SENTINEL);
        assert!(rows[1][4].contains("Beta"));
    }

    #[tokio::test]
    async fn test_harvest_respects_max_documents() {
        let source = StubSource::default()
            .with_document("d1", vec![])
            .with_document("d2", vec![])
            .with_document("d3", vec![]);
        let store = MemoryArtifactStore::new();
        let dir = tempfile::tempdir().expect("tempdir");
        let csv_path = dir.path().join("out.csv");
        let mut sink = CsvSink::create(&csv_path).expect("sink");

        let result = run_harvest(&query(2), &source, &store, &mut sink)
            .await
            .expect("run");

        assert_eq!(result.documents_found, 2);
        assert_eq!(result.records_written, 2);
    }
}
