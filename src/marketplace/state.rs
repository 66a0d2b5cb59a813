//! Navigation state threaded through the scrape phases

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::ScraperError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    Init,
    Navigated,
    CookieDismissed,
    SigninDismissed,
    AddressEntered,
    AddressConfirmed,
    SearchEntered,
    SearchSubmitted,
    ResultsLoaded,
    MenuLoaded,
    ItemsExtracted,
    Done,
}

impl Phase {
    /// Whether `next` may directly follow `self`.
    pub fn can_advance_to(self, next: Phase) -> bool {
        use Phase::*;
        matches!(
            (self, next),
            (Init, Navigated)
                | (Navigated, CookieDismissed)
                | (CookieDismissed, SigninDismissed)
                // the sign-in overlay is optional
                | (CookieDismissed, AddressEntered)
                | (SigninDismissed, AddressEntered)
                | (AddressEntered, AddressConfirmed)
                | (AddressConfirmed, SearchEntered)
                | (SearchEntered, SearchSubmitted)
                | (SearchSubmitted, ResultsLoaded)
                | (ResultsLoaded, MenuLoaded)
                | (ResultsLoaded, Done)
                | (MenuLoaded, ItemsExtracted)
                | (ItemsExtracted, MenuLoaded)
                | (ItemsExtracted, Done)
        )
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// Where the page is and which phase last completed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NavigationState {
    phase: Phase,
    current_url: Option<String>,
    /// Last phase reached before a shop page failed; shops resume from here
    shop_anchor: Option<Phase>,
}

impl Default for NavigationState {
    fn default() -> Self {
        Self::new()
    }
}

impl NavigationState {
    pub fn new() -> Self {
        Self {
            phase: Phase::Init,
            current_url: None,
            shop_anchor: None,
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn current_url(&self) -> Option<&str> {
        self.current_url.as_deref()
    }

    pub fn set_url(&mut self, url: impl Into<String>) {
        self.current_url = Some(url.into());
    }

    /// Fail unless the last completed phase is one of `expected`.
    pub fn require(&self, expected: &[Phase]) -> Result<(), ScraperError> {
        if expected.contains(&self.phase) {
            Ok(())
        } else {
            Err(ScraperError::PhaseOrder {
                expected: expected
                    .iter()
                    .map(Phase::to_string)
                    .collect::<Vec<_>>()
                    .join(" | "),
                found: self.phase.to_string(),
            })
        }
    }

    /// Record completion of `next`.
    pub fn advance(&mut self, next: Phase) -> Result<(), ScraperError> {
        if !self.phase.can_advance_to(next) {
            return Err(ScraperError::PhaseOrder {
                expected: format!("a phase that may follow {}", self.phase),
                found: next.to_string(),
            });
        }
        tracing::debug!("Phase {} -> {}", self.phase, next);
        self.phase = next;
        if matches!(next, Phase::ResultsLoaded | Phase::ItemsExtracted) {
            self.shop_anchor = Some(next);
        }
        Ok(())
    }

    /// Roll back to the last shop-loop checkpoint after a shop failed.
    pub fn abandon_shop(&mut self) {
        if let Some(anchor) = self.shop_anchor {
            self.phase = anchor;
        }
    }
}
