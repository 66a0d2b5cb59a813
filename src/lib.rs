//! Menu price scraper library
//!
//! Drives a headless browser through a food-delivery marketplace: sets the
//! delivery address, searches for a food, and collects priced menu items
//! from each shop so they can be compared by price.
//!
//! # Usage
//!
//! ```rust,ignore
//! use menu_price_scraper::{scrape_blocking, ScraperService, ScrapeRequest};
//! use tower::Service;
//!
//! // blocking, default configuration
//! let items = scrape_blocking("Τρίπολη", "Σουβλάκι");
//! for item in &items {
//!     println!("€{:.2} {} ({})", item.price, item.item_name, item.shop_name);
//! }
//!
//! // async, full report
//! #[tokio::main]
//! async fn main() {
//!     let mut service = ScraperService::new();
//!     let report = service
//!         .call(ScrapeRequest::new("Τρίπολη", "Σουβλάκι"))
//!         .await
//!         .unwrap();
//!     println!("status: {:?}, items: {}", report.status, report.items.len());
//! }
//! ```

pub mod browser;
pub mod config;
pub mod error;
pub mod marketplace;
pub mod price;
pub mod service;
pub mod traits;

#[cfg(test)]
mod testing;

pub use browser::ChromiumPage;
pub use config::{Pacing, ScraperConfig, Timeouts};
pub use error::ScraperError;
pub use marketplace::{
    MarketplaceScraper, MenuItem, ObstacleOutcome, Phase, ScrapeReport, ScrapeRequest,
    ScrapeStatus, ShopLink, ShopOutcome, SiteProfile,
};
pub use price::{parse_price, try_parse_price, SENTINEL_PRICE};
pub use service::{scrape, scrape_blocking, scrape_blocking_with, ScraperService};
pub use traits::{PageDriver, Target};
