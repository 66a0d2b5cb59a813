use std::path::PathBuf;
use std::time::Duration;

use rand::Rng;

use crate::marketplace::SiteProfile;

const DEFAULT_USER_AGENT: &str =
    "Mozilla/5.0 (X11; Ubuntu; Linux x86_64; rv:125.0) Gecko/20100101 Firefox/125.0";

/// Per-step element and navigation timeouts
#[derive(Debug, Clone, PartialEq)]
pub struct Timeouts {
    /// Landing page navigation
    pub navigation: Duration,
    /// Mandatory elements (cookie banner, address, search, results)
    pub element: Duration,
    /// Sign-in iframe appearance
    pub signin_overlay: Duration,
    /// Close button inside the sign-in iframe
    pub signin_close: Duration,
    /// Navigation to a single shop page
    pub shop_navigation: Duration,
    /// First item card on a shop page
    pub menu: Duration,
}

impl Default for Timeouts {
    fn default() -> Self {
        Self {
            navigation: Duration::from_secs(30),
            element: Duration::from_secs(15),
            signin_overlay: Duration::from_secs(15),
            signin_close: Duration::from_secs(5),
            shop_navigation: Duration::from_secs(20),
            menu: Duration::from_secs(10),
        }
    }
}

/// Randomized pause interval used to pace interactions like a person would
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Pacing {
    pub min: Duration,
    pub max: Duration,
}

impl Pacing {
    pub fn new(min: Duration, max: Duration) -> Self {
        if min <= max {
            Self { min, max }
        } else {
            Self { min: max, max: min }
        }
    }

    /// No pauses at all
    pub fn none() -> Self {
        Self {
            min: Duration::ZERO,
            max: Duration::ZERO,
        }
    }

    /// Pick a pause length uniformly from `[min, max]`.
    pub fn sample(&self) -> Duration {
        let min = self.min.as_millis() as u64;
        let max = self.max.as_millis() as u64;
        if max <= min {
            return self.min;
        }
        Duration::from_millis(rand::thread_rng().gen_range(min..=max))
    }

    pub async fn pause(&self) {
        let delay = self.sample();
        if delay.is_zero() {
            return;
        }
        tracing::debug!("Pausing for {:?}", delay);
        tokio::time::sleep(delay).await;
    }
}

#[derive(Debug, Clone)]
pub struct ScraperConfig {
    pub headless: bool,
    pub debug: bool,
    pub chrome_path: Option<PathBuf>,
    pub user_agent: String,
    pub window_size: (u32, u32),
    pub max_shops: usize,
    pub timeouts: Timeouts,
    /// Short pause after typing or clicking
    pub pause: Pacing,
    /// Longer pause while a page settles
    pub settle: Pacing,
    pub screenshot_path: PathBuf,
    pub profile: SiteProfile,
}

impl Default for ScraperConfig {
    fn default() -> Self {
        let chrome_path = std::env::var("CHROME_PATH")
            .or_else(|_| std::env::var("CHROMIUM_PATH"))
            .ok()
            .map(PathBuf::from);

        Self {
            headless: true,
            debug: false,
            chrome_path,
            user_agent: DEFAULT_USER_AGENT.to_string(),
            window_size: (1920, 1080),
            max_shops: 10,
            timeouts: Timeouts::default(),
            pause: Pacing::new(Duration::from_millis(1000), Duration::from_millis(2500)),
            settle: Pacing::new(Duration::from_millis(2000), Duration::from_millis(4000)),
            screenshot_path: PathBuf::from("error_screenshot.png"),
            profile: SiteProfile::default(),
        }
    }
}

impl ScraperConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_headless(mut self, headless: bool) -> Self {
        self.headless = headless;
        self
    }

    pub fn with_debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }

    pub fn with_chrome_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.chrome_path = Some(path.into());
        self
    }

    pub fn with_max_shops(mut self, max_shops: usize) -> Self {
        self.max_shops = max_shops;
        self
    }

    pub fn with_timeouts(mut self, timeouts: Timeouts) -> Self {
        self.timeouts = timeouts;
        self
    }

    /// Use the same interval for short pauses and page settles.
    pub fn with_pacing(mut self, pacing: Pacing) -> Self {
        self.pause = pacing;
        self.settle = pacing;
        self
    }

    pub fn with_screenshot_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.screenshot_path = path.into();
        self
    }

    pub fn with_profile(mut self, profile: SiteProfile) -> Self {
        self.profile = profile;
        self
    }
}
