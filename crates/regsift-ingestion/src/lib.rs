//! regsift-ingestion — Regulatory document harvesting pipeline.
//! - Paginated document search (regulations.gov v4)
//! - Per-document attachment resolution
//! - Attachment download into local artifact storage
//! - PDF text extraction
//! - Streaming CSV record sink
//! - Standalone folder extraction mode

pub mod folder;
pub mod models;
pub mod pdf_text;
pub mod pipeline;
pub mod sink;
pub mod sources;
pub mod storage;
