use scraper::{ElementRef, Html, Selector};

use crate::domain::{EntryKind, ListingEntry};
use crate::error::MirrorError;

/// Parses a standards.iso.org directory page into its rows, in page order.
///
/// Only the first `<tbody>` is read. A row whose first cell carries no
/// `data-sort` marker, or which has no link, comes back as
/// [`EntryKind::Unknown`] so the caller can skip it.
pub fn parse_listing(html: &[u8]) -> Result<Vec<ListingEntry>, MirrorError> {
    let text = String::from_utf8_lossy(html);
    let document = Html::parse_document(&text);

    let tbody = selector("tbody")?;
    let row = selector("tr")?;
    let cell = selector("td")?;
    let anchor = selector("a")?;

    let table = document
        .select(&tbody)
        .next()
        .ok_or_else(|| MirrorError::Listing("page has no table body".to_string()))?;

    Ok(table
        .select(&row)
        .map(|tr| parse_row(tr, &cell, &anchor))
        .collect())
}

fn parse_row(tr: ElementRef<'_>, cell: &Selector, anchor: &Selector) -> ListingEntry {
    let marker = tr
        .select(cell)
        .next()
        .and_then(|td| td.value().attr("data-sort"));
    let href = tr
        .select(anchor)
        .next()
        .and_then(|a| a.value().attr("href"));

    match (marker, href) {
        (Some(marker), Some(href)) => ListingEntry::from_row(marker, href),
        (marker, href) => ListingEntry {
            kind: EntryKind::Unknown(marker.unwrap_or_default().to_string()),
            url: href.unwrap_or_default().to_string(),
        },
    }
}

fn selector(css: &str) -> Result<Selector, MirrorError> {
    Selector::parse(css).map_err(|err| MirrorError::Listing(err.to_string()))
}
