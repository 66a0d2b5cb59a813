//! Marketplace scrape data types

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::state::Phase;

/// Input of a single scrape run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScrapeRequest {
    pub address: String,
    pub search_term: String,
}

impl ScrapeRequest {
    pub fn new(address: impl Into<String>, search_term: impl Into<String>) -> Self {
        Self {
            address: address.into(),
            search_term: search_term.into(),
        }
    }
}

/// Absolute URL of a shop page found on the results page
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ShopLink {
    pub url: String,
}

/// One priced menu entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MenuItem {
    pub shop_name: String,
    pub shop_url: String,
    pub item_name: String,
    pub price: f64,
    /// `price` is the sentinel because the price text did not parse
    pub price_is_placeholder: bool,
}

/// Result of the best-effort sign-in overlay step
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", content = "reason", rename_all = "snake_case")]
pub enum ObstacleOutcome {
    Dismissed,
    NotPresent,
    DismissFailed(String),
}

/// What happened on one shop page
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShopOutcome {
    pub url: String,
    pub shop_name: Option<String>,
    pub items: usize,
    pub error: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ScrapeStatus {
    /// Every mandatory phase succeeded; `items` may still be empty
    Completed,
    /// A mandatory phase failed; `phase` is the last one reached and `url`
    /// the last page the run was on
    Failed {
        phase: Phase,
        reason: String,
        url: Option<String>,
    },
}

/// Everything a run produced
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScrapeReport {
    pub request: ScrapeRequest,
    /// Sorted ascending by price, ties in discovery order
    pub items: Vec<MenuItem>,
    pub status: ScrapeStatus,
    pub signin: Option<ObstacleOutcome>,
    pub shops: Vec<ShopOutcome>,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

impl ScrapeReport {
    pub fn is_failed(&self) -> bool {
        matches!(self.status, ScrapeStatus::Failed { .. })
    }

    /// Distinct shop names among the items, sorted
    pub fn shop_names(&self) -> Vec<String> {
        self.items
            .iter()
            .map(|item| item.shop_name.clone())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }
}
