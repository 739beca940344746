//! Content extraction: pull per-page text and embedded images via pdfium.
//!
//! ## Why spawn_blocking?
//!
//! The `pdfium-render` crate wraps the pdfium C++ library, which uses
//! thread-local state internally and is not safe to call from async contexts.
//! `tokio::task::spawn_blocking` moves the work onto a dedicated thread pool
//! thread, preventing the Tokio workers from stalling during extraction.
//!
//! ## Failure containment
//!
//! Only a failure to *open* the document is fatal. A slide whose text layer
//! cannot be read degrades to an empty string; an embedded image that cannot
//! be decoded is dropped. Both are logged and the run continues — a single
//! damaged slide must never cost the rest of the deck.

use crate::error::Pdf2NotesError;
use image::DynamicImage;
use pdfium_render::prelude::*;
use std::path::Path;
use tracing::{debug, info, warn};

/// Everything extracted from one slide: its text layer and any embedded
/// raster images, tagged with the 1-indexed page number.
///
/// Instances are produced once per selected page and consumed immediately by
/// the generation step; they are not retained after the backend call.
#[derive(Debug, Clone)]
pub struct PageContent {
    /// 1-indexed page number within the source document.
    pub page_num: usize,
    /// Extracted text layer; empty when extraction failed or the slide has
    /// no text.
    pub text: String,
    /// Embedded raster images in page order.
    pub images: Vec<DynamicImage>,
}

impl PageContent {
    /// True when there is nothing to narrate: whitespace-only text and no
    /// images. Decided structurally here, never by the backend.
    pub fn is_empty(&self) -> bool {
        self.text.trim().is_empty() && self.images.is_empty()
    }
}

/// Number of pages in the document. Opening failures are fatal.
pub async fn page_count(
    pdf_path: &Path,
    password: Option<&str>,
) -> Result<usize, Pdf2NotesError> {
    let path = pdf_path.to_path_buf();
    let pwd = password.map(str::to_string);

    tokio::task::spawn_blocking(move || {
        let pdfium = Pdfium::default();
        let document = open_document(&pdfium, &path, pwd.as_deref())?;
        Ok(document.pages().len() as usize)
    })
    .await
    .map_err(|e| Pdf2NotesError::Internal(format!("Page-count task panicked: {e}")))?
}

/// Extract content for the selected pages, in selection order.
///
/// `page_nums` must be valid 1-indexed pages (the selector has already
/// validated bounds). Returns one [`PageContent`] per requested page.
pub async fn extract_pages(
    pdf_path: &Path,
    password: Option<&str>,
    page_nums: &[usize],
) -> Result<Vec<PageContent>, Pdf2NotesError> {
    let path = pdf_path.to_path_buf();
    let pwd = password.map(str::to_string);
    let pages = page_nums.to_vec();

    tokio::task::spawn_blocking(move || extract_pages_blocking(&path, pwd.as_deref(), &pages))
        .await
        .map_err(|e| Pdf2NotesError::Internal(format!("Extraction task panicked: {e}")))?
}

/// Blocking implementation of per-page extraction.
fn extract_pages_blocking(
    pdf_path: &Path,
    password: Option<&str>,
    page_nums: &[usize],
) -> Result<Vec<PageContent>, Pdf2NotesError> {
    let pdfium = Pdfium::default();
    let document = open_document(&pdfium, pdf_path, password)?;
    let pages = document.pages();
    info!("PDF loaded: {} pages", pages.len());

    let mut results = Vec::with_capacity(page_nums.len());

    for &page_num in page_nums {
        let page = match pages.get((page_num - 1) as u16) {
            Ok(page) => page,
            Err(e) => {
                // Selector already bounds-checked; treat pdfium refusing the
                // page as a per-page fault, not a fatal one.
                warn!("Page {page_num}: cannot load page ({e:?}), treated as empty");
                results.push(PageContent {
                    page_num,
                    text: String::new(),
                    images: Vec::new(),
                });
                continue;
            }
        };

        let text = match page.text() {
            Ok(text_page) => text_page.all(),
            Err(e) => {
                warn!("Page {page_num}: text extraction failed ({e:?}), using empty text");
                String::new()
            }
        };

        let images = extract_images(&page, page_num);

        debug!(
            "Page {page_num}: {} chars of text, {} embedded images",
            text.len(),
            images.len()
        );

        results.push(PageContent {
            page_num,
            text,
            images,
        });
    }

    Ok(results)
}

/// Decode the page's embedded raster images. Undecodable images are dropped.
fn extract_images(page: &PdfPage, page_num: usize) -> Vec<DynamicImage> {
    let mut images = Vec::new();

    for object in page.objects().iter() {
        if let Some(image_object) = object.as_image_object() {
            match image_object.get_raw_image() {
                Ok(image) => images.push(image),
                Err(e) => {
                    debug!("Page {page_num}: skipping undecodable embedded image ({e:?})");
                }
            }
        }
    }

    images
}

/// Open a document, mapping pdfium failures onto the fatal error taxonomy.
fn open_document<'a>(
    pdfium: &'a Pdfium,
    pdf_path: &Path,
    password: Option<&'a str>,
) -> Result<PdfDocument<'a>, Pdf2NotesError> {
    pdfium.load_pdf_from_file(pdf_path, password).map_err(|e| {
        let err_str = format!("{e:?}");
        if err_str.contains("Password") || err_str.contains("password") {
            if password.is_some() {
                Pdf2NotesError::WrongPassword {
                    path: pdf_path.to_path_buf(),
                }
            } else {
                Pdf2NotesError::PasswordRequired {
                    path: pdf_path.to_path_buf(),
                }
            }
        } else {
            Pdf2NotesError::CorruptPdf {
                path: pdf_path.to_path_buf(),
                detail: err_str,
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn content(text: &str, images: usize) -> PageContent {
        PageContent {
            page_num: 1,
            text: text.to_string(),
            images: vec![
                DynamicImage::ImageRgba8(image::RgbaImage::new(1, 1));
                images
            ],
        }
    }

    #[test]
    fn whitespace_only_text_without_images_is_empty() {
        assert!(content("", 0).is_empty());
        assert!(content("  \n\t ", 0).is_empty());
    }

    #[test]
    fn text_makes_a_page_non_empty() {
        assert!(!content("Agenda", 0).is_empty());
    }

    #[test]
    fn an_image_alone_makes_a_page_non_empty() {
        assert!(!content("", 1).is_empty());
    }
}
