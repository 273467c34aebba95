use lopdf::Document;
use tracing::{debug, warn};

use common::error::AppError;

const PDF_MAGIC: &[u8] = b"%PDF-";

/// Checks that an upload is a PDF by file extension and by its leading magic bytes.
pub fn validate_pdf_upload(file_name: Option<&str>, bytes: &[u8]) -> Result<(), AppError> {
    let file_name = file_name
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .ok_or_else(|| AppError::Validation("No file name provided".into()))?;

    if !file_name.to_ascii_lowercase().ends_with(".pdf") {
        return Err(AppError::Validation("Only PDF allowed".into()));
    }

    if bytes.is_empty() {
        return Err(AppError::Validation("Uploaded file is empty".into()));
    }

    if !looks_like_pdf(bytes) {
        return Err(AppError::Validation(
            "Uploaded file does not look like a PDF document".into(),
        ));
    }

    Ok(())
}

/// Some producers emit a few junk bytes before the header, so the magic is
/// accepted anywhere in the first kilobyte.
fn looks_like_pdf(bytes: &[u8]) -> bool {
    let head = bytes.get(..bytes.len().min(1024)).unwrap_or(bytes);
    head.windows(PDF_MAGIC.len()).any(|window| window == PDF_MAGIC)
}

/// Extracts text page by page off the async executor. Every page is followed by
/// a newline; pages whose text cannot be read contribute nothing but that newline.
pub async fn extract_pdf_text(pdf_bytes: Vec<u8>) -> Result<String, AppError> {
    tokio::task::spawn_blocking(move || extract_pages(&pdf_bytes)).await?
}

fn extract_pages(pdf_bytes: &[u8]) -> Result<String, AppError> {
    let document = Document::load_mem(pdf_bytes)
        .map_err(|err| AppError::Validation(format!("Failed to parse PDF: {err}")))?;

    let mut page_numbers: Vec<u32> = document.get_pages().keys().copied().collect();
    page_numbers.sort_unstable();

    let mut full_text = String::new();
    for page in &page_numbers {
        match document.extract_text(&[*page]) {
            Ok(text) => full_text.push_str(&text),
            Err(err) => warn!(page, error = %err, "could not extract text from PDF page"),
        }
        full_text.push('\n');
    }

    debug!(
        pages = page_numbers.len(),
        chars = full_text.chars().count(),
        "extracted PDF text"
    );

    Ok(full_text)
}
