//! Menu item extraction from a shop page

use scraper::{ElementRef, Html, Selector};
use tracing::{debug, warn};

use crate::error::ScraperError;
use crate::price::{try_parse_price, SENTINEL_PRICE};

use super::profile::{parse_selector, SiteProfile};
use super::types::MenuItem;

pub const NAME_NOT_FOUND: &str = "Name Not Found";

/// Extract priced items from a shop's menu HTML, in card order.
///
/// A deal price wins over the regular price. Cards without any price text
/// are skipped; cards without a name element are kept as [`NAME_NOT_FOUND`].
pub fn extract_items(
    shop_url: &str,
    menu_html: &str,
    profile: &SiteProfile,
) -> Result<Vec<MenuItem>, ScraperError> {
    let card_sel = parse_selector(&profile.item_card)?;
    let name_sel = parse_selector(&profile.item_name)?;
    let deal_sel = parse_selector(&profile.deal_price)?;
    let regular_sel = parse_selector(&profile.regular_price)?;

    let document = Html::parse_document(menu_html);
    let shop_name = shop_name(&document, &profile.title_delimiter)
        .unwrap_or_else(|| shop_url.to_string());

    let mut items = Vec::new();
    for card in document.select(&card_sel) {
        let item_name =
            first_text(&card, &name_sel).unwrap_or_else(|| NAME_NOT_FOUND.to_string());

        let price_text = first_text(&card, &deal_sel).or_else(|| first_text(&card, &regular_sel));
        let price_text = match price_text {
            Some(text) if !text.is_empty() => text,
            _ => {
                debug!("Skipping '{}': no price", item_name);
                continue;
            }
        };

        let (price, price_is_placeholder) = match try_parse_price(&price_text) {
            Some(price) => (price, false),
            None => {
                warn!(
                    "Unparsable price '{}' for '{}' at {}",
                    price_text, item_name, shop_name
                );
                (SENTINEL_PRICE, true)
            }
        };

        items.push(MenuItem {
            shop_name: shop_name.clone(),
            shop_url: shop_url.to_string(),
            item_name,
            price,
            price_is_placeholder,
        });
    }

    Ok(items)
}

/// Text of `<title>` before the delimiter.
fn shop_name(document: &Html, delimiter: &str) -> Option<String> {
    let title_sel = Selector::parse("title").ok()?;
    let title = document.select(&title_sel).next().map(|t| element_text(&t))?;
    let name = title.split(delimiter).next().unwrap_or_default().trim();
    if name.is_empty() {
        None
    } else {
        Some(name.to_string())
    }
}

fn first_text(parent: &ElementRef<'_>, selector: &Selector) -> Option<String> {
    parent.select(selector).next().map(|el| element_text(&el))
}

fn element_text(el: &ElementRef<'_>) -> String {
    el.text()
        .collect::<Vec<_>>()
        .join(" ")
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{menu_html, Card};

    const URL: &str = "https://wolt.com/en/grc/tripoli/restaurant/zorbas";

    #[test]
    fn test_deal_price_preferred_over_regular() {
        let html = menu_html(
            "Zorbas – Wolt",
            &[Card::new("Pita gyros").deal("€ 3,00").regular("€ 3,80")],
        );
        let items = extract_items(URL, &html, &SiteProfile::default()).unwrap();

        assert_eq!(items.len(), 1);
        assert_eq!(items[0].price, 3.0);
        assert_eq!(items[0].shop_name, "Zorbas");
        assert_eq!(items[0].shop_url, URL);
    }

    #[test]
    fn test_card_without_price_is_skipped() {
        let html = menu_html(
            "Zorbas – Wolt",
            &[
                Card::new("Souvlaki").regular("€ 2,50"),
                Card::new("Sold out"),
                Card::new("Fries").regular("€ 2,00"),
            ],
        );
        let items = extract_items(URL, &html, &SiteProfile::default()).unwrap();

        let names: Vec<_> = items.iter().map(|i| i.item_name.as_str()).collect();
        assert_eq!(names, vec!["Souvlaki", "Fries"]);
    }

    #[test]
    fn test_card_without_name_is_recorded() {
        let html = menu_html("Zorbas – Wolt", &[Card::unnamed().regular("€ 4,10")]);
        let items = extract_items(URL, &html, &SiteProfile::default()).unwrap();

        assert_eq!(items.len(), 1);
        assert_eq!(items[0].item_name, NAME_NOT_FOUND);
        assert_eq!(items[0].price, 4.10);
    }

    #[test]
    fn test_empty_name_is_kept_empty() {
        let html = menu_html("Zorbas – Wolt", &[Card::new("  ").regular("€ 4,10")]);
        let items = extract_items(URL, &html, &SiteProfile::default()).unwrap();

        assert_eq!(items.len(), 1);
        assert_eq!(items[0].item_name, "");
    }

    #[test]
    fn test_unparsable_price_is_flagged() {
        let html = menu_html("Zorbas – Wolt", &[Card::new("Mystery").regular("ask staff")]);
        let items = extract_items(URL, &html, &SiteProfile::default()).unwrap();

        assert_eq!(items[0].price, SENTINEL_PRICE);
        assert!(items[0].price_is_placeholder);
    }

    #[test]
    fn test_shop_name_falls_back_to_url() {
        let html = menu_html("", &[Card::new("Pita").regular("€ 1,00")]);
        let items = extract_items(URL, &html, &SiteProfile::default()).unwrap();
        assert_eq!(items[0].shop_name, URL);
    }

    #[test]
    fn test_no_cards_yields_nothing() {
        let items = extract_items(URL, "<html><body></body></html>", &SiteProfile::default())
            .unwrap();
        assert!(items.is_empty());
    }
}
