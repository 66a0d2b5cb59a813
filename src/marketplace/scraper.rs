//! Marketplace scrape run: drives one page through every phase
//!
//! landing → cookie banner → (sign-in overlay) → address → search →
//! results → each shop's menu. Mandatory steps that fail end the run with a
//! `Failed` status; a failing shop only loses its own items. The page is
//! closed exactly once whatever happens.

use chrono::Utc;
use tracing::{debug, error, info, warn};

use crate::browser::ChromiumPage;
use crate::config::ScraperConfig;
use crate::error::ScraperError;
use crate::traits::PageDriver;

use super::aggregate::aggregate;
use super::menu::extract_items;
use super::obstacles::{dismiss_cookie_banner, dismiss_signin_overlay};
use super::search::{
    confirm_address, enter_address, enter_search_term, submit_search, wait_for_results,
};
use super::shops::list_shops;
use super::state::{NavigationState, Phase};
use super::types::{
    MenuItem, ObstacleOutcome, ScrapeReport, ScrapeRequest, ScrapeStatus, ShopLink, ShopOutcome,
};

/// Accumulated progress of one run
struct Run {
    state: NavigationState,
    signin: Option<ObstacleOutcome>,
    shops: Vec<ShopOutcome>,
    per_shop: Vec<Vec<MenuItem>>,
}

impl Run {
    fn new() -> Self {
        Self {
            state: NavigationState::new(),
            signin: None,
            shops: Vec::new(),
            per_shop: Vec::new(),
        }
    }
}

pub struct MarketplaceScraper {
    config: ScraperConfig,
}

impl MarketplaceScraper {
    pub fn new(config: ScraperConfig) -> Self {
        Self { config }
    }

    /// Launch a browser and run the scrape on it.
    pub async fn run(&self, request: ScrapeRequest) -> ScrapeReport {
        info!(
            "Starting marketplace scrape: address={}, food={}",
            request.address, request.search_term
        );

        match ChromiumPage::launch(&self.config).await {
            Ok(page) => self.run_with(page, request).await,
            Err(e) => {
                error!("Browser launch failed: {}", e);
                let now = Utc::now();
                ScrapeReport {
                    request,
                    items: Vec::new(),
                    status: ScrapeStatus::Failed {
                        phase: Phase::Init,
                        reason: e.to_string(),
                        url: None,
                    },
                    signin: None,
                    shops: Vec::new(),
                    started_at: now,
                    finished_at: now,
                }
            }
        }
    }

    /// Run the scrape on an already opened page, taking ownership of it.
    pub async fn run_with<D: PageDriver>(
        &self,
        mut page: D,
        request: ScrapeRequest,
    ) -> ScrapeReport {
        let started_at = Utc::now();
        let mut run = Run::new();

        let status = match self.drive(&page, &request, &mut run).await {
            Ok(()) => ScrapeStatus::Completed,
            Err(e) => {
                let phase = run.state.phase();
                let url = run.state.current_url().map(str::to_string);
                error!("Scrape failed after phase {} at {:?}: {}", phase, url, e);
                self.save_diagnostics(&page).await;
                ScrapeStatus::Failed {
                    phase,
                    reason: e.to_string(),
                    url,
                }
            }
        };

        info!("Closing browser");
        if let Err(e) = page.close().await {
            warn!("Failed to close browser: {}", e);
        }

        let items = aggregate(run.per_shop);
        info!("Scrape finished with {} items", items.len());

        ScrapeReport {
            request,
            items,
            status,
            signin: run.signin,
            shops: run.shops,
            started_at,
            finished_at: Utc::now(),
        }
    }

    async fn drive(
        &self,
        page: &dyn PageDriver,
        request: &ScrapeRequest,
        run: &mut Run,
    ) -> Result<(), ScraperError> {
        let profile = &self.config.profile;
        let timeouts = &self.config.timeouts;
        let state = &mut run.state;

        info!("Navigating to {}...", profile.start_url);
        page.goto(&profile.start_url, timeouts.navigation).await?;
        state.set_url(profile.start_url.as_str());
        state.advance(Phase::Navigated)?;
        self.config.settle.pause().await;

        dismiss_cookie_banner(page, profile, timeouts.element).await?;
        state.advance(Phase::CookieDismissed)?;
        self.config.settle.pause().await;

        let signin = dismiss_signin_overlay(
            page,
            profile,
            timeouts.signin_overlay,
            timeouts.signin_close,
        )
        .await;
        if signin == ObstacleOutcome::Dismissed {
            state.advance(Phase::SigninDismissed)?;
            self.config.pause.pause().await;
        }
        run.signin = Some(signin);

        enter_address(page, profile, &request.address, timeouts.element).await?;
        state.advance(Phase::AddressEntered)?;
        self.config.pause.pause().await;

        confirm_address(page, profile, &request.address, timeouts.element).await?;
        state.advance(Phase::AddressConfirmed)?;
        self.config.settle.pause().await;

        enter_search_term(page, profile, &request.search_term, timeouts.element).await?;
        state.advance(Phase::SearchEntered)?;
        self.config.pause.pause().await;

        submit_search(page, profile, timeouts.element).await?;
        state.advance(Phase::SearchSubmitted)?;

        wait_for_results(page, profile, timeouts.element).await?;
        if let Ok(Some(url)) = page.url().await {
            state.set_url(url);
        }
        state.advance(Phase::ResultsLoaded)?;
        self.config.settle.pause().await;

        info!("Finding shop links on results page...");
        let html = page.content().await?;
        let shops = list_shops(&html, profile, self.config.max_shops)?;
        info!("Found {} shop menus to check", shops.len());

        for shop in &shops {
            info!("Scraping menu: {}", shop.url);
            match self.scrape_shop(page, shop, state).await {
                Ok(items) => {
                    info!("Scraped {} items from {}", items.len(), shop.url);
                    run.shops.push(ShopOutcome {
                        url: shop.url.clone(),
                        shop_name: items.first().map(|item| item.shop_name.clone()),
                        items: items.len(),
                        error: None,
                    });
                    run.per_shop.push(items);
                }
                Err(e) => {
                    warn!("Could not scrape menu {}: {}", shop.url, e);
                    state.abandon_shop();
                    run.shops.push(ShopOutcome {
                        url: shop.url.clone(),
                        shop_name: None,
                        items: 0,
                        error: Some(e.to_string()),
                    });
                }
            }
            self.config.settle.pause().await;
        }

        state.advance(Phase::Done)
    }

    async fn scrape_shop(
        &self,
        page: &dyn PageDriver,
        shop: &ShopLink,
        state: &mut NavigationState,
    ) -> Result<Vec<MenuItem>, ScraperError> {
        state.require(&[Phase::ResultsLoaded, Phase::ItemsExtracted])?;
        let profile = &self.config.profile;

        page.goto(&shop.url, self.config.timeouts.shop_navigation).await?;
        state.set_url(shop.url.as_str());

        page.wait_for(&profile.item_card_target(), self.config.timeouts.menu)
            .await?;
        state.advance(Phase::MenuLoaded)?;
        self.config.pause.pause().await;

        let html = page.content().await?;
        let items = extract_items(&shop.url, &html, profile)?;
        state.advance(Phase::ItemsExtracted)?;
        Ok(items)
    }

    /// Write a screenshot of the failed page for post-mortem inspection.
    async fn save_diagnostics(&self, page: &dyn PageDriver) {
        let png = match page.screenshot().await {
            Ok(png) => png,
            Err(e) => {
                warn!("Failed to take diagnostic screenshot: {}", e);
                return;
            }
        };

        let path = &self.config.screenshot_path;
        match tokio::fs::write(path, &png).await {
            Ok(()) => info!("Saved diagnostic screenshot to {:?}", path),
            Err(e) => warn!("Failed to write diagnostic screenshot {:?}: {}", path, e),
        }

        if self.config.debug {
            use base64::Engine;
            let encoded = base64::engine::general_purpose::STANDARD.encode(&png);
            debug!("Failure screenshot: data:image/png;base64,{}", encoded);
        }
    }
}
