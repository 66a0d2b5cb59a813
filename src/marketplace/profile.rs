//! Site profile: every URL and selector the engine needs for one marketplace
//!
//! Selectors are data, so a markup change or another marketplace means a new
//! profile (for example loaded from JSON), not a code change.

use std::path::Path;

use scraper::Selector;
use serde::{Deserialize, Serialize};

use crate::error::ScraperError;
use crate::traits::Target;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SiteProfile {
    /// Landing page the run starts on
    pub start_url: String,
    /// Base that relative shop hrefs are resolved against
    pub origin: String,

    pub cookie_button: Target,
    /// Fragment of the sign-in iframe `src`
    pub signin_frame_src: String,
    pub signin_close: Target,

    pub address_input: Target,
    pub address_suggestion: Target,
    pub search_input: Target,
    pub search_button: Target,

    /// Anchor of a shop card on the results page
    pub shop_link: String,
    /// Substring an href must contain to be a shop page
    pub shop_href_marker: String,

    pub item_card: String,
    pub item_name: String,
    pub deal_price: String,
    pub regular_price: String,
    /// Page titles read "<shop name><delimiter><site suffix>"
    pub title_delimiter: String,
}

impl Default for SiteProfile {
    fn default() -> Self {
        Self {
            start_url: "https://wolt.com/en/grc/".to_string(),
            origin: "https://wolt.com".to_string(),
            cookie_button: Target::css("button").with_text("Allow"),
            signin_frame_src: "accounts.google.com/gsi/iframe".to_string(),
            signin_close: Target::css(r#"div[aria-label="Κλείσιμο"]"#),
            address_input: Target::css(r#"input[autocomplete="shipping street-address"]"#),
            address_suggestion: Target::css("div.sac3j8c"),
            search_input: Target::css(r#"input[data-test-id="SearchInput"]"#),
            search_button: Target::css("a.sfeyiyl"),
            shop_link: r#"a[data-test-id^="venueCard"]"#.to_string(),
            shop_href_marker: "restaurant".to_string(),
            item_card: r#"div[data-test-id="horizontal-item-card"]"#.to_string(),
            item_name: "h3.tj9ydql".to_string(),
            deal_price: "span.dhz2cdy".to_string(),
            regular_price: "span.p1boufgw".to_string(),
            title_delimiter: " – ".to_string(),
        }
    }
}

impl SiteProfile {
    pub fn from_json_str(json: &str) -> Result<Self, ScraperError> {
        let profile: Self = serde_json::from_str(json)?;
        profile.validate()?;
        Ok(profile)
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, ScraperError> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }

    /// Iframe selector derived from [`SiteProfile::signin_frame_src`]
    pub fn signin_frame(&self) -> Target {
        Target::css(format!(r#"iframe[src*="{}"]"#, self.signin_frame_src))
    }

    /// Shop-card selector as a wait target
    pub fn shop_link_target(&self) -> Target {
        Target::css(self.shop_link.clone())
    }

    pub fn item_card_target(&self) -> Target {
        Target::css(self.item_card.clone())
    }

    /// Check that every selector parses and the origin is a URL.
    pub fn validate(&self) -> Result<(), ScraperError> {
        url::Url::parse(&self.origin)?;
        url::Url::parse(&self.start_url)?;

        for css in [
            self.cookie_button.css.as_str(),
            self.signin_close.css.as_str(),
            self.address_input.css.as_str(),
            self.address_suggestion.css.as_str(),
            self.search_input.css.as_str(),
            self.search_button.css.as_str(),
            self.shop_link.as_str(),
            self.item_card.as_str(),
            self.item_name.as_str(),
            self.deal_price.as_str(),
            self.regular_price.as_str(),
        ] {
            parse_selector(css)?;
        }

        if self.title_delimiter.is_empty() {
            return Err(ScraperError::Config("title_delimiter must not be empty".into()));
        }
        Ok(())
    }
}

pub(crate) fn parse_selector(css: &str) -> Result<Selector, ScraperError> {
    Selector::parse(css).map_err(|e| ScraperError::Selector {
        selector: css.to_string(),
        reason: e.to_string(),
    })
}
