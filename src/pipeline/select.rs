//! Page selection: parse a human-written page spec into validated indices.
//!
//! The grammar is `token (',' token)*` where a token is a single 1-indexed
//! page number or an inclusive `start-end` range. The result is always
//! strictly ascending and duplicate-free, whatever order or overlap the
//! input had, so downstream stages can rely on ordering structurally.

use crate::error::Pdf2NotesError;
use std::collections::BTreeSet;

/// Parse a page-selection string against the document's page count.
///
/// `None`, an empty string, or `"all"` select every page. Pure function,
/// no I/O.
///
/// # Errors
/// * [`Pdf2NotesError::InvalidPageToken`] — token is not an integer or range
/// * [`Pdf2NotesError::InvalidPageRange`] — range end < start
/// * [`Pdf2NotesError::PageOutOfBounds`] — value < 1 or > `total_pages`
///
/// # Example
/// ```rust
/// use pdf2notes::pipeline::select::parse_selection;
///
/// assert_eq!(parse_selection(Some("1,3-5"), 10).unwrap(), vec![1, 3, 4, 5]);
/// assert_eq!(parse_selection(None, 3).unwrap(), vec![1, 2, 3]);
/// ```
pub fn parse_selection(
    spec: Option<&str>,
    total_pages: usize,
) -> Result<Vec<usize>, Pdf2NotesError> {
    let spec = spec.map(str::trim).filter(|s| !s.is_empty());

    let spec = match spec {
        None => return Ok((1..=total_pages).collect()),
        Some(s) if s.eq_ignore_ascii_case("all") => return Ok((1..=total_pages).collect()),
        Some(s) => s,
    };

    let mut pages = BTreeSet::new();

    for token in spec.split(',') {
        let token = token.trim();
        if token.is_empty() {
            return Err(Pdf2NotesError::InvalidPageToken {
                token: token.to_string(),
            });
        }

        match token.split_once('-') {
            Some((start, end)) => {
                let start = parse_page(start, token)?;
                let end = parse_page(end, token)?;
                if end < start {
                    return Err(Pdf2NotesError::InvalidPageRange { start, end });
                }
                check_bounds(start, total_pages)?;
                check_bounds(end, total_pages)?;
                pages.extend(start..=end);
            }
            None => {
                let page = parse_page(token, token)?;
                check_bounds(page, total_pages)?;
                pages.insert(page);
            }
        }
    }

    Ok(pages.into_iter().collect())
}

fn parse_page(s: &str, token: &str) -> Result<usize, Pdf2NotesError> {
    s.trim()
        .parse::<usize>()
        .map_err(|_| Pdf2NotesError::InvalidPageToken {
            token: token.to_string(),
        })
}

fn check_bounds(page: usize, total_pages: usize) -> Result<(), Pdf2NotesError> {
    if page < 1 || page > total_pages {
        return Err(Pdf2NotesError::PageOutOfBounds {
            page,
            total: total_pages,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mixed_tokens_sorted_and_deduplicated() {
        assert_eq!(parse_selection(Some("1,3-5"), 10).unwrap(), vec![1, 3, 4, 5]);
        assert_eq!(
            parse_selection(Some("5,1,3-5,4"), 10).unwrap(),
            vec![1, 3, 4, 5]
        );
    }

    #[test]
    fn missing_spec_selects_all_pages() {
        assert_eq!(parse_selection(None, 5).unwrap(), vec![1, 2, 3, 4, 5]);
        assert_eq!(parse_selection(Some(""), 5).unwrap(), vec![1, 2, 3, 4, 5]);
        assert_eq!(parse_selection(Some("all"), 3).unwrap(), vec![1, 2, 3]);
    }

    #[test]
    fn zero_page_is_out_of_bounds() {
        let err = parse_selection(Some("0-2"), 5).unwrap_err();
        assert!(matches!(
            err,
            Pdf2NotesError::PageOutOfBounds { page: 0, total: 5 }
        ));
    }

    #[test]
    fn page_past_end_is_out_of_bounds() {
        let err = parse_selection(Some("4,9"), 5).unwrap_err();
        assert!(matches!(
            err,
            Pdf2NotesError::PageOutOfBounds { page: 9, total: 5 }
        ));
    }

    #[test]
    fn inverted_range_is_rejected() {
        let err = parse_selection(Some("3-1"), 5).unwrap_err();
        assert!(matches!(
            err,
            Pdf2NotesError::InvalidPageRange { start: 3, end: 1 }
        ));
    }

    #[test]
    fn junk_token_is_rejected() {
        let err = parse_selection(Some("1,two,3"), 5).unwrap_err();
        assert!(matches!(err, Pdf2NotesError::InvalidPageToken { .. }));
    }

    #[test]
    fn whitespace_around_tokens_is_tolerated() {
        assert_eq!(
            parse_selection(Some(" 2 , 4 - 5 "), 5).unwrap(),
            vec![2, 4, 5]
        );
    }

    #[test]
    fn zero_page_document_selects_nothing() {
        assert!(parse_selection(None, 0).unwrap().is_empty());
    }

    #[test]
    fn result_is_strictly_ascending_in_bounds() {
        let pages = parse_selection(Some("7,2-4,2,9-9"), 10).unwrap();
        assert!(pages.windows(2).all(|w| w[0] < w[1]));
        assert!(pages.iter().all(|&p| (1..=10).contains(&p)));
    }
}
