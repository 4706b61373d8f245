//! Standalone folder extraction mode.
//!
//! Scans a directory for PDF files and writes one `{filename, extracted_text}`
//! row per file. Unreadable PDFs keep their row with empty text so the output
//! still accounts for every file seen.

use std::path::{Path, PathBuf};

use tracing::{info, warn};

use crate::pdf_text::extract_pdf_text;
use regsift_common::error::RegsiftError;

#[derive(Debug, Default, Clone, PartialEq)]
pub struct FolderSummary {
    pub processed: usize,
    pub failed: usize,
}

/// Extract text from every `*.pdf` in `dir` (non-recursive, case-insensitive
/// extension match) into a two-column CSV at `output_csv`.
pub fn extract_folder(dir: &Path, output_csv: &Path) -> Result<FolderSummary, RegsiftError> {
    let mut pdf_paths: Vec<PathBuf> = std::fs::read_dir(dir)?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|path| {
            path.extension()
                .and_then(|ext| ext.to_str())
                .is_some_and(|ext| ext.eq_ignore_ascii_case("pdf"))
        })
        .collect();
    pdf_paths.sort();

    if pdf_paths.is_empty() {
        warn!(dir = %dir.display(), "No PDF files found in the directory");
    }

    let mut writer = csv::Writer::from_path(output_csv)?;
    writer.write_record(["filename", "extracted_text"])?;

    let mut summary = FolderSummary::default();
    for path in &pdf_paths {
        let filename = path
            .file_name()
            .and_then(|name| name.to_str())
            .unwrap_or("unknown.pdf");
        let text = match std::fs::read(path) {
            Ok(bytes) => match extract_pdf_text(&bytes) {
                Ok(text) => {
                    summary.processed += 1;
                    text
                }
                Err(e) => {
                    warn!(file = %path.display(), error = %e, "Error processing PDF");
                    summary.failed += 1;
                    String::new()
                }
            },
            Err(e) => {
                warn!(file = %path.display(), error = %e, "Error reading PDF");
                summary.failed += 1;
                String::new()
            }
        };

        writer.write_record([filename, text.as_str()])?;
        writer.flush()?;
    }

    info!(
        processed = summary.processed,
        failed = summary.failed,
        output = %output_csv.display(),
        "Folder extraction finished"
    );
    Ok(summary)
}
