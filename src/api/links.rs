//! Archive link extraction from listing page HTML.

use scraper::{Html, Selector};
use tracing::debug;
use url::Url;

/// Extract absolute URLs of every anchor whose resolved path ends with `suffix`.
///
/// Results follow document order and are not de-duplicated.
pub fn extract_archive_links(html: &str, base: &Url, suffix: &str) -> Vec<Url> {
    let document = Html::parse_document(html);
    let selector = match Selector::parse("a[href]") {
        Ok(selector) => selector,
        Err(e) => {
            debug!("Invalid anchor selector: {:?}", e);
            return Vec::new();
        }
    };

    document
        .select(&selector)
        .filter_map(|anchor| anchor.value().attr("href"))
        .filter_map(|href| match base.join(href.trim()) {
            Ok(url) => Some(url),
            Err(e) => {
                debug!("Skipping unresolvable href {:?}: {}", href, e);
                None
            }
        })
        .filter(|url| url.path().ends_with(suffix))
        .collect()
}
