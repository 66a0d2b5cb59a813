//! Food-delivery marketplace scraper
//!
//! Sets a delivery address, searches for a food, and collects priced menu
//! items from every shop on the results page.

mod aggregate;
mod menu;
mod obstacles;
mod profile;
mod scraper;
mod search;
mod shops;
mod state;
mod types;

pub use aggregate::aggregate;
pub use menu::{extract_items, NAME_NOT_FOUND};
pub use obstacles::{dismiss_cookie_banner, dismiss_signin_overlay};
pub use profile::SiteProfile;
pub use self::scraper::MarketplaceScraper;
pub use search::{search, set_address};
pub use shops::list_shops;
pub use state::{NavigationState, Phase};
pub use types::{
    MenuItem, ObstacleOutcome, ScrapeReport, ScrapeRequest, ScrapeStatus, ShopLink, ShopOutcome,
};
