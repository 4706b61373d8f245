//! PDF text extraction via lopdf.

use lopdf::Document;

use regsift_common::error::RegsiftError;

/// Extract the plain text of every page, in page order, joined by newlines.
///
/// Extraction is pure: the same bytes always yield the same text. Parse and
/// format errors surface as [`RegsiftError::Pdf`]; the pipeline treats them
/// as an absent result for that artifact rather than aborting the run.
pub fn extract_pdf_text(bytes: &[u8]) -> Result<String, RegsiftError> {
    let document = Document::load_mem(bytes)
        .map_err(|e| RegsiftError::Pdf(format!("failed to parse PDF: {e}")))?;

    let mut page_numbers: Vec<u32> = document.get_pages().keys().copied().collect();
    page_numbers.sort_unstable();

    let mut pages = Vec::with_capacity(page_numbers.len());
    for page in page_numbers {
        let text = document
            .extract_text(&[page])
            .map_err(|e| RegsiftError::Pdf(format!("failed to extract page {page}: {e}")))?;
        pages.push(text.trim_end().to_string());
    }

    Ok(pages.join("\n").trim().to_string())
}
