//! In-memory `PageDriver` over canned HTML, for tests

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use scraper::{Html, Selector};

use crate::error::ScraperError;
use crate::marketplace::SiteProfile;
use crate::traits::{PageDriver, Target};

#[derive(Default)]
struct FakeState {
    current_url: String,
    current_html: String,
    results_html: Option<String>,
    pages: HashMap<String, String>,
    broken_frames: bool,
    clicks: Vec<String>,
    fills: Vec<(String, String)>,
    visits: Vec<String>,
    screenshots: usize,
    closes: usize,
}

/// Evaluates selectors against the current HTML. Waits never block: a
/// missing element is an immediate `Timeout`. Clones share state, so a test
/// can keep a handle while the scraper owns the page.
#[derive(Clone)]
pub(crate) struct FakePage {
    profile: SiteProfile,
    state: Arc<Mutex<FakeState>>,
}

impl FakePage {
    /// A page sitting on the landing URL with the given HTML.
    pub fn new(landing: impl Into<String>) -> Self {
        let profile = SiteProfile::default();
        let landing = landing.into();
        let mut state = FakeState {
            current_url: profile.start_url.clone(),
            current_html: landing.clone(),
            ..Default::default()
        };
        state.pages.insert(profile.start_url.clone(), landing);
        Self {
            profile,
            state: Arc::new(Mutex::new(state)),
        }
    }

    /// HTML shown after the search button is clicked.
    pub fn with_results(self, html: impl Into<String>) -> Self {
        self.lock().results_html = Some(html.into());
        self
    }

    pub fn with_page(self, url: impl Into<String>, html: impl Into<String>) -> Self {
        self.lock().pages.insert(url.into(), html.into());
        self
    }

    pub fn with_broken_frames(self) -> Self {
        self.lock().broken_frames = true;
        self
    }

    pub fn clicks(&self) -> Vec<String> {
        self.lock().clicks.clone()
    }

    pub fn fills(&self) -> Vec<(String, String)> {
        self.lock().fills.clone()
    }

    pub fn visits(&self) -> Vec<String> {
        self.lock().visits.clone()
    }

    pub fn screenshots(&self) -> usize {
        self.lock().screenshots
    }

    pub fn closes(&self) -> usize {
        self.lock().closes
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, FakeState> {
        self.state.lock().unwrap()
    }

    fn find(&self, target: &Target) -> Result<Option<String>, ScraperError> {
        let html = self.lock().current_html.clone();
        first_match(&html, target)
    }
}

fn first_match(html: &str, target: &Target) -> Result<Option<String>, ScraperError> {
    let selector = Selector::parse(&target.css).map_err(|e| ScraperError::Selector {
        selector: target.css.clone(),
        reason: e.to_string(),
    })?;
    let document = Html::parse_document(html);
    let found = document
        .select(&selector)
        .map(|el| el.text().collect::<String>())
        .find(|text| target.text_matches(text));
    Ok(found)
}

#[async_trait]
impl PageDriver for FakePage {
    async fn goto(&self, url: &str, _timeout: Duration) -> Result<(), ScraperError> {
        let mut state = self.lock();
        state.visits.push(url.to_string());
        let html = state
            .pages
            .get(url)
            .cloned()
            .ok_or_else(|| ScraperError::Navigation(format!("net::ERR_NAME_NOT_RESOLVED {url}")))?;
        state.current_url = url.to_string();
        state.current_html = html;
        Ok(())
    }

    async fn wait_for(&self, target: &Target, timeout: Duration) -> Result<(), ScraperError> {
        match self.find(target)? {
            Some(_) => Ok(()),
            None => Err(ScraperError::Timeout(format!(
                "{} not found within {:?}",
                target, timeout
            ))),
        }
    }

    async fn fill(&self, target: &Target, text: &str) -> Result<(), ScraperError> {
        if self.find(target)?.is_none() {
            return Err(ScraperError::ElementNotFound(target.to_string()));
        }
        self.lock().fills.push((target.css.clone(), text.to_string()));
        Ok(())
    }

    async fn click(&self, target: &Target) -> Result<(), ScraperError> {
        if self.find(target)?.is_none() {
            return Err(ScraperError::ElementNotFound(target.to_string()));
        }
        let mut state = self.lock();
        state.clicks.push(target.css.clone());
        if *target == self.profile.search_button {
            if let Some(results) = state.results_html.clone() {
                state.current_url = format!("{}search", self.profile.start_url);
                state.current_html = results;
            }
        }
        Ok(())
    }

    async fn inner_text(&self, target: &Target) -> Result<String, ScraperError> {
        self.find(target)?
            .ok_or_else(|| ScraperError::ElementNotFound(target.to_string()))
    }

    async fn click_in_frame(
        &self,
        frame_src: &str,
        target: &Target,
        _timeout: Duration,
    ) -> Result<(), ScraperError> {
        if self.lock().broken_frames {
            return Err(ScraperError::JavaScript("frame detached".into()));
        }
        let frame = Target::css(format!(r#"iframe[src*="{}"]"#, frame_src));
        if self.find(&frame)?.is_none() {
            return Err(ScraperError::ElementNotFound(frame.to_string()));
        }
        self.lock().clicks.push(format!("frame:{}", target.css));
        Ok(())
    }

    async fn url(&self) -> Result<Option<String>, ScraperError> {
        Ok(Some(self.lock().current_url.clone()))
    }

    async fn content(&self) -> Result<String, ScraperError> {
        Ok(self.lock().current_html.clone())
    }

    async fn screenshot(&self) -> Result<Vec<u8>, ScraperError> {
        self.lock().screenshots += 1;
        Ok(vec![0x89, b'P', b'N', b'G'])
    }

    async fn close(&mut self) -> Result<(), ScraperError> {
        self.lock().closes += 1;
        Ok(())
    }
}

/// Landing page with the address and search widgets.
pub(crate) fn landing_html(cookie_banner: bool, signin_overlay: bool) -> String {
    let cookie = if cookie_banner {
        r#"<div class="consent"><button>Reject</button><button>Allow</button></div>"#
    } else {
        ""
    };
    let signin = if signin_overlay {
        r#"<iframe src="https://accounts.google.com/gsi/iframe/select?client_id=1"></iframe>"#
    } else {
        ""
    };
    format!(
        r#"<html><head><title>Wolt</title></head><body>
        {cookie}{signin}
        <input autocomplete="shipping street-address">
        <div class="sac3j8c">Tripoli, Greece</div>
        <input data-test-id="SearchInput">
        <a class="sfeyiyl" href="/search">Search</a>
        </body></html>"#
    )
}

/// Results page with one shop card per href.
pub(crate) fn results_html(hrefs: &[&str]) -> String {
    let cards: String = hrefs
        .iter()
        .enumerate()
        .map(|(i, href)| format!(r#"<a data-test-id="venueCard.{i}" href="{href}">Shop {i}</a>"#))
        .collect();
    format!("<html><body><div class=\"results\">{cards}</div></body></html>")
}

/// One menu item card.
pub(crate) struct Card {
    name: Option<String>,
    deal: Option<String>,
    regular: Option<String>,
}

impl Card {
    pub fn new(name: &str) -> Self {
        Self {
            name: Some(name.to_string()),
            deal: None,
            regular: None,
        }
    }

    pub fn unnamed() -> Self {
        Self {
            name: None,
            deal: None,
            regular: None,
        }
    }

    pub fn deal(mut self, price: &str) -> Self {
        self.deal = Some(price.to_string());
        self
    }

    pub fn regular(mut self, price: &str) -> Self {
        self.regular = Some(price.to_string());
        self
    }

    fn render(&self) -> String {
        let mut html = String::from(r#"<div data-test-id="horizontal-item-card">"#);
        if let Some(name) = &self.name {
            html.push_str(&format!(r#"<h3 class="tj9ydql">{name}</h3>"#));
        }
        html.push_str("<p>Delicious</p>");
        if let Some(deal) = &self.deal {
            html.push_str(&format!(r#"<span class="dhz2cdy">{deal}</span>"#));
        }
        if let Some(regular) = &self.regular {
            html.push_str(&format!(r#"<span class="p1boufgw">{regular}</span>"#));
        }
        html.push_str("</div>");
        html
    }
}

/// Shop page with a title and item cards.
pub(crate) fn menu_html(title: &str, cards: &[Card]) -> String {
    let cards: String = cards.iter().map(Card::render).collect();
    format!("<html><head><title>{title}</title></head><body>{cards}</body></html>")
}
