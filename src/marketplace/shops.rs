//! Shop discovery on the search results page

use std::collections::HashSet;

use scraper::Html;
use tracing::debug;
use url::Url;

use crate::error::ScraperError;

use super::profile::{parse_selector, SiteProfile};
use super::types::ShopLink;

/// Collect shop page URLs from the results HTML.
///
/// Anchors are kept in document order, deduplicated by URL and capped at
/// `max_shops`. No matching anchors is an empty list, not an error.
pub fn list_shops(
    results_html: &str,
    profile: &SiteProfile,
    max_shops: usize,
) -> Result<Vec<ShopLink>, ScraperError> {
    let selector = parse_selector(&profile.shop_link)?;
    let origin = Url::parse(&profile.origin)?;
    let document = Html::parse_document(results_html);

    let mut seen = HashSet::new();
    let mut shops = Vec::new();

    for anchor in document.select(&selector) {
        if shops.len() >= max_shops {
            break;
        }

        let Some(href) = anchor.value().attr("href") else {
            continue;
        };
        if !href.contains(profile.shop_href_marker.as_str()) {
            continue;
        }

        let url = match origin.join(href) {
            Ok(url) => url.to_string(),
            Err(e) => {
                debug!("Skipping unusable shop href '{}': {}", href, e);
                continue;
            }
        };

        if seen.insert(url.clone()) {
            shops.push(ShopLink { url });
        }
    }

    Ok(shops)
}
