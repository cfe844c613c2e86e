//! PDF loading and per-page text extraction

use std::path::Path;

use lopdf::Document;
use sha2::{Digest, Sha256};
use tracing::{debug, warn};

use crate::error::{Error, Result};
use crate::types::PageText;

/// Extract the text of a PDF page by page.
///
/// Pages are numbered from 0 in document order and pages without readable
/// text are skipped. When per-page extraction yields nothing, the whole
/// document is extracted in one piece and attributed to page 0, so chunks
/// from such documents still carry a page number.
pub fn load_pages(path: &Path) -> Result<Vec<PageText>> {
    match extract_per_page(path) {
        Ok(pages) if !pages.is_empty() => Ok(pages),
        Ok(_) => {
            warn!(
                file = %path.display(),
                "no per-page text found, falling back to whole-document extraction"
            );
            extract_whole(path)
        }
        Err(error) => {
            warn!(
                file = %path.display(),
                error = %error,
                "per-page extraction failed, falling back to whole-document extraction"
            );
            extract_whole(path)
        }
    }
}

/// SHA-256 of a file's raw bytes, as lowercase hex
pub fn content_hash(path: &Path) -> Result<String> {
    let bytes = std::fs::read(path)?;
    Ok(hash_bytes(&bytes))
}

/// SHA-256 of a byte slice, as lowercase hex
pub fn hash_bytes(bytes: &[u8]) -> String {
    Sha256::digest(bytes)
        .iter()
        .map(|byte| format!("{:02x}", byte))
        .collect()
}

fn extract_per_page(path: &Path) -> Result<Vec<PageText>> {
    let document = Document::load(path)
        .map_err(|error| Error::file_parse(file_name(path), error.to_string()))?;

    let mut pages = Vec::new();
    for (page_no, _page_id) in document.get_pages() {
        // lopdf numbers pages from 1; stored pages count from 0
        let text = match document.extract_text(&[page_no]) {
            Ok(text) => text,
            Err(error) => {
                debug!(file = %path.display(), page = page_no, error = %error, "skipping unreadable page");
                continue;
            }
        };
        if text.trim().is_empty() {
            continue;
        }
        pages.push(PageText::new(page_no.saturating_sub(1), text));
    }

    Ok(pages)
}

fn extract_whole(path: &Path) -> Result<Vec<PageText>> {
    let text = pdf_extract::extract_text(path)
        .map_err(|error| Error::file_parse(file_name(path), error.to_string()))?;

    if text.trim().is_empty() {
        return Err(Error::file_parse(
            file_name(path),
            "document contains no readable text",
        ));
    }

    Ok(vec![PageText::new(0, text)])
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

/// Build a minimal single-page PDF containing the given text
#[cfg(test)]
pub(crate) fn write_test_pdf(path: &Path, text: &str) {
    use lopdf::content::{Content, Operation};
    use lopdf::{dictionary, Object, Stream};

    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();
    let font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Courier",
    });
    let resources_id = doc.add_object(dictionary! {
        "Font" => dictionary! { "F1" => font_id },
    });
    let content = Content {
        operations: vec![
            Operation::new("BT", vec![]),
            Operation::new("Tf", vec!["F1".into(), 48.into()]),
            Operation::new("Td", vec![100.into(), 600.into()]),
            Operation::new("Tj", vec![Object::string_literal(text)]),
            Operation::new("ET", vec![]),
        ],
    };
    let content_id = doc.add_object(Stream::new(dictionary! {}, content.encode().unwrap()));
    let page_id = doc.add_object(dictionary! {
        "Type" => "Page",
        "Parent" => pages_id,
        "Contents" => content_id,
    });
    let pages = dictionary! {
        "Type" => "Pages",
        "Kids" => vec![page_id.into()],
        "Count" => 1,
        "Resources" => resources_id,
        "MediaBox" => vec![0.into(), 0.into(), 595.into(), 842.into()],
    };
    doc.objects.insert(pages_id, Object::Dictionary(pages));
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);
    doc.save(path).unwrap();
}
