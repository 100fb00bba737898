//! Page splitting for text dumps of multi-page statements.

/// Form feed, which PDF-to-text tools emit between pages
pub const PAGE_BREAK: char = '\u{0C}';

/// Split a text dump into pages of lines.
///
/// A trailing form feed does not produce an empty final page.
pub fn split_pages(text: &str) -> Vec<Vec<&str>> {
    let mut pages: Vec<Vec<&str>> = text
        .split(PAGE_BREAK)
        .map(|page| page.lines().collect())
        .collect();
    if pages.len() > 1 && pages.last().is_some_and(|p| p.is_empty()) {
        pages.pop();
    }
    pages
}
