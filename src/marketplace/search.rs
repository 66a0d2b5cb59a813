//! Delivery address entry and food search

use std::time::Duration;

use tracing::{debug, info, warn};

use crate::config::Pacing;
use crate::error::ScraperError;
use crate::traits::PageDriver;

use super::profile::SiteProfile;

/// Type the address and accept the first autocomplete suggestion.
pub async fn set_address(
    page: &dyn PageDriver,
    profile: &SiteProfile,
    address: &str,
    timeout: Duration,
    pause: &Pacing,
) -> Result<(), ScraperError> {
    enter_address(page, profile, address, timeout).await?;
    pause.pause().await;
    confirm_address(page, profile, address, timeout).await
}

/// Type the search term, submit, and wait for shop cards to render.
pub async fn search(
    page: &dyn PageDriver,
    profile: &SiteProfile,
    term: &str,
    timeout: Duration,
    pause: &Pacing,
) -> Result<(), ScraperError> {
    enter_search_term(page, profile, term, timeout).await?;
    pause.pause().await;
    submit_search(page, profile, timeout).await?;
    wait_for_results(page, profile, timeout).await
}

pub(crate) async fn enter_address(
    page: &dyn PageDriver,
    profile: &SiteProfile,
    address: &str,
    timeout: Duration,
) -> Result<(), ScraperError> {
    info!("Looking for address input...");
    page.wait_for(&profile.address_input, timeout).await?;

    info!("Typing address: {}", address);
    page.fill(&profile.address_input, address).await
}

/// Click the first suggestion, then wait for the search field it unlocks.
///
/// The suggestion is not required to match `address`; a mismatch is only
/// logged.
pub(crate) async fn confirm_address(
    page: &dyn PageDriver,
    profile: &SiteProfile,
    address: &str,
    timeout: Duration,
) -> Result<(), ScraperError> {
    page.wait_for(&profile.address_suggestion, timeout).await?;
    match page.inner_text(&profile.address_suggestion).await {
        Ok(text) if !suggestion_mentions(&text, address) => {
            warn!(
                "First address suggestion '{}' does not mention '{}', selecting it anyway",
                text.trim(),
                address
            );
        }
        Ok(text) => debug!("Address suggestion: {}", text.trim()),
        Err(e) => debug!("Could not read address suggestion text: {}", e),
    }

    info!("Clicking address suggestion...");
    page.click(&profile.address_suggestion).await?;

    page.wait_for(&profile.search_input, timeout).await?;
    info!("Address set");
    Ok(())
}

pub(crate) async fn enter_search_term(
    page: &dyn PageDriver,
    profile: &SiteProfile,
    term: &str,
    timeout: Duration,
) -> Result<(), ScraperError> {
    page.wait_for(&profile.search_input, timeout).await?;
    info!("Typing search term: {}", term);
    page.fill(&profile.search_input, term).await
}

pub(crate) async fn submit_search(
    page: &dyn PageDriver,
    profile: &SiteProfile,
    timeout: Duration,
) -> Result<(), ScraperError> {
    info!("Clicking search button...");
    page.wait_for(&profile.search_button, timeout).await?;
    page.click(&profile.search_button).await?;
    info!("Search submitted");
    Ok(())
}

pub(crate) async fn wait_for_results(
    page: &dyn PageDriver,
    profile: &SiteProfile,
    timeout: Duration,
) -> Result<(), ScraperError> {
    page.wait_for(&profile.shop_link_target(), timeout).await
}

fn suggestion_mentions(suggestion: &str, address: &str) -> bool {
    let suggestion = suggestion.to_lowercase();
    address
        .split(|c: char| c == ',' || c.is_whitespace())
        .filter(|word| !word.is_empty())
        .any(|word| suggestion.contains(&word.to_lowercase()))
}
