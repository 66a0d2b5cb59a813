//! Chromium-backed `PageDriver`

use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use async_trait::async_trait;
use chromiumoxide::browser::{Browser, BrowserConfig};
use chromiumoxide::cdp::browser_protocol::network::SetUserAgentOverrideParams;
use chromiumoxide::cdp::js_protocol::runtime::EvaluateParams;
use chromiumoxide::element::Element;
use chromiumoxide::page::ScreenshotParams;
use chromiumoxide::Page;
use futures::StreamExt;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::config::ScraperConfig;
use crate::error::ScraperError;
use crate::traits::{PageDriver, Target};

/// Polling starts fast and backs off to this interval
const MAX_POLL_INTERVAL: Duration = Duration::from_secs(1);

/// Extra Chromium flags for every launch
const CHROME_ARGS: &[&str] = &[
    "--disable-blink-features=AutomationControlled",
    "--disable-dev-shm-usage",
    "--disable-gpu",
    // keep cross-origin iframes (the sign-in overlay) in the page's own session
    "--disable-features=IsolateOrigins,site-per-process",
    "--disable-site-isolation-trials",
];

pub struct ChromiumPage {
    browser: Option<Browser>,
    page: Option<Page>,
    handler: Option<JoinHandle<()>>,
    user_data_dir: Option<PathBuf>,
}

impl ChromiumPage {
    /// Launch a browser with one blank page.
    pub async fn launch(config: &ScraperConfig) -> Result<Self, ScraperError> {
        info!("Initializing browser...");

        let user_data_dir = unique_profile_dir();

        let (width, height) = config.window_size;
        let mut builder = BrowserConfig::builder()
            .user_data_dir(&user_data_dir)
            .window_size(width, height)
            .request_timeout(config.timeouts.navigation)
            .no_sandbox()
            .args(CHROME_ARGS.iter().copied());

        if let Some(path) = &config.chrome_path {
            builder = builder.chrome_executable(path);
        }
        if !config.headless {
            builder = builder.with_head();
        }
        if config.debug {
            builder = builder.arg("--enable-logging=stderr").arg("--v=1");
        }

        let browser_config = builder
            .build()
            .map_err(|e| ScraperError::BrowserInit(format!("browser config: {}", e)))?;

        let (browser, mut handler) = match Browser::launch(browser_config).await {
            Ok(launched) => launched,
            Err(e) => {
                remove_profile_dir(&user_data_dir).await;
                return Err(ScraperError::BrowserInit(e.to_string()));
            }
        };

        // drain CDP events in the background
        let handler = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                debug!("Browser event: {:?}", event);
            }
        });

        let mut session = Self {
            browser: Some(browser),
            page: None,
            handler: Some(handler),
            user_data_dir: Some(user_data_dir),
        };

        match session.open_page(config).await {
            Ok(page) => {
                session.page = Some(page);
                info!("Browser initialized");
                Ok(session)
            }
            Err(e) => {
                if let Err(close_err) = session.close().await {
                    warn!("Cleanup after failed launch: {}", close_err);
                }
                Err(e)
            }
        }
    }

    async fn open_page(&self, config: &ScraperConfig) -> Result<Page, ScraperError> {
        let browser = self
            .browser
            .as_ref()
            .ok_or_else(|| ScraperError::BrowserInit("browser is not running".into()))?;

        let page = browser
            .new_page("about:blank")
            .await
            .map_err(|e| ScraperError::BrowserInit(e.to_string()))?;

        page.set_user_agent(SetUserAgentOverrideParams::new(config.user_agent.clone()))
            .await
            .map_err(|e| ScraperError::BrowserInit(format!("user agent: {}", e)))?;

        Ok(page)
    }

    fn page(&self) -> Result<&Page, ScraperError> {
        self.page
            .as_ref()
            .ok_or_else(|| ScraperError::BrowserInit("browser is not running".into()))
    }

    /// First element matching `target`, if any is on the page right now.
    async fn find(&self, target: &Target) -> Result<Option<Element>, ScraperError> {
        let page = self.page()?;
        let elements = match page.find_elements(target.css.as_str()).await {
            Ok(elements) => elements,
            Err(_) => return Ok(None),
        };

        if target.text.is_none() {
            return Ok(elements.into_iter().next());
        }

        for element in elements {
            let text = element.inner_text().await.ok().flatten().unwrap_or_default();
            if target.text_matches(&text) {
                return Ok(Some(element));
            }
        }
        Ok(None)
    }

    async fn require(&self, target: &Target) -> Result<Element, ScraperError> {
        self.find(target)
            .await?
            .ok_or_else(|| ScraperError::ElementNotFound(target.to_string()))
    }

    /// Click `css` inside the frame whose URL contains `frame_src`.
    async fn try_click_in_frame(&self, frame_src: &str, css: &str) -> Result<bool, ScraperError> {
        let page = self.page()?;
        let frames = page
            .frames()
            .await
            .map_err(|e| ScraperError::JavaScript(e.to_string()))?;

        for frame_id in frames {
            let url = page.frame_url(frame_id.clone()).await.ok().flatten();
            if !url.is_some_and(|url| url.contains(frame_src)) {
                continue;
            }
            let Some(context_id) = page
                .frame_execution_context(frame_id)
                .await
                .map_err(|e| ScraperError::JavaScript(e.to_string()))?
            else {
                continue;
            };

            let css_literal = serde_json::to_string(css)?;
            let script = format!(
                r#"
                (function() {{
                    var el = document.querySelector({css_literal});
                    if (el) {{
                        el.click();
                        return true;
                    }}
                    return false;
                }})()
                "#
            );
            let params = EvaluateParams::builder()
                .expression(script)
                .context_id(context_id)
                .return_by_value(true)
                .build()
                .map_err(ScraperError::JavaScript)?;

            let clicked: bool = page
                .evaluate_expression(params)
                .await
                .map_err(|e| ScraperError::JavaScript(e.to_string()))?
                .into_value()
                .unwrap_or(false);
            if clicked {
                return Ok(true);
            }
        }
        Ok(false)
    }
}

#[async_trait]
impl PageDriver for ChromiumPage {
    async fn goto(&self, url: &str, timeout: Duration) -> Result<(), ScraperError> {
        let page = self.page()?;
        let navigate = async {
            page.goto(url)
                .await
                .map_err(|e| ScraperError::Navigation(e.to_string()))?;
            page.wait_for_navigation()
                .await
                .map_err(|e| ScraperError::Navigation(e.to_string()))?;
            Ok::<(), ScraperError>(())
        };

        tokio::time::timeout(timeout, navigate)
            .await
            .map_err(|_| ScraperError::Timeout(format!("navigation to {} after {:?}", url, timeout)))?
    }

    async fn wait_for(&self, target: &Target, timeout: Duration) -> Result<(), ScraperError> {
        let start = Instant::now();
        let mut poll_interval = Duration::from_millis(100);

        loop {
            if self.find(target).await?.is_some() {
                return Ok(());
            }
            if start.elapsed() >= timeout {
                return Err(ScraperError::Timeout(format!(
                    "{} not found within {:?}",
                    target, timeout
                )));
            }
            tokio::time::sleep(poll_interval).await;
            poll_interval = (poll_interval * 2).min(MAX_POLL_INTERVAL);
        }
    }

    async fn fill(&self, target: &Target, text: &str) -> Result<(), ScraperError> {
        let element = self.require(target).await?;
        element
            .call_js_fn("function() { this.value = ''; }", false)
            .await
            .map_err(|e| ScraperError::JavaScript(format!("clear {}: {}", target, e)))?;
        element
            .click()
            .await
            .map_err(|e| ScraperError::Navigation(format!("focus {}: {}", target, e)))?
            .type_str(text)
            .await
            .map_err(|e| ScraperError::Navigation(format!("type into {}: {}", target, e)))?;
        Ok(())
    }

    async fn click(&self, target: &Target) -> Result<(), ScraperError> {
        self.require(target)
            .await?
            .click()
            .await
            .map_err(|e| ScraperError::Navigation(format!("click {}: {}", target, e)))?;
        Ok(())
    }

    async fn inner_text(&self, target: &Target) -> Result<String, ScraperError> {
        let element = self.require(target).await?;
        let text = element
            .inner_text()
            .await
            .map_err(|e| ScraperError::JavaScript(e.to_string()))?;
        Ok(text.unwrap_or_default())
    }

    async fn click_in_frame(
        &self,
        frame_src: &str,
        target: &Target,
        timeout: Duration,
    ) -> Result<(), ScraperError> {
        let start = Instant::now();
        loop {
            if self.try_click_in_frame(frame_src, &target.css).await? {
                return Ok(());
            }
            if start.elapsed() >= timeout {
                return Err(ScraperError::Timeout(format!(
                    "{} inside frame {} not clickable within {:?}",
                    target, frame_src, timeout
                )));
            }
            tokio::time::sleep(Duration::from_millis(250)).await;
        }
    }

    async fn url(&self) -> Result<Option<String>, ScraperError> {
        self.page()?
            .url()
            .await
            .map_err(|e| ScraperError::Navigation(e.to_string()))
    }

    async fn content(&self) -> Result<String, ScraperError> {
        self.page()?
            .content()
            .await
            .map_err(|e| ScraperError::JavaScript(e.to_string()))
    }

    async fn screenshot(&self) -> Result<Vec<u8>, ScraperError> {
        self.page()?
            .screenshot(ScreenshotParams::builder().full_page(true).build())
            .await
            .map_err(|e| ScraperError::Screenshot(e.to_string()))
    }

    async fn close(&mut self) -> Result<(), ScraperError> {
        info!("Shutting down browser...");

        self.page = None;
        let result = match self.browser.take() {
            Some(mut browser) => {
                let closed = browser
                    .close()
                    .await
                    .map(|_| ())
                    .map_err(|e| ScraperError::BrowserInit(format!("close: {}", e)));
                if let Err(e) = browser.wait().await {
                    debug!("Browser process wait failed: {}", e);
                }
                closed
            }
            None => Ok(()),
        };

        if let Some(handler) = self.handler.take() {
            handler.abort();
        }
        if let Some(dir) = self.user_data_dir.take() {
            remove_profile_dir(&dir).await;
        }

        info!("Browser shut down");
        result
    }
}

/// Fresh profile dir so parallel runs never share a lock
fn unique_profile_dir() -> PathBuf {
    let unique_id = format!(
        "{}-{}",
        std::process::id(),
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap_or_default()
            .as_nanos()
    );
    std::env::temp_dir().join(format!("menu-price-scraper-{}", unique_id))
}

async fn remove_profile_dir(dir: &Path) {
    match tokio::fs::remove_dir_all(dir).await {
        Ok(()) => debug!("Removed browser profile {:?}", dir),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
        Err(e) => warn!("Failed to remove browser profile {:?}: {}", dir, e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_site_isolation_disabled_for_signin_frame() {
        assert!(CHROME_ARGS.contains(&"--disable-features=IsolateOrigins,site-per-process"));
        assert!(CHROME_ARGS.contains(&"--disable-site-isolation-trials"));
    }

    #[test]
    fn test_profile_dirs_are_unique() {
        let first = unique_profile_dir();
        std::thread::sleep(Duration::from_millis(1));
        assert_ne!(first, unique_profile_dir());
        assert!(first.starts_with(std::env::temp_dir()));
    }

    #[tokio::test]
    async fn test_remove_profile_dir() {
        let dir = unique_profile_dir();
        tokio::fs::create_dir_all(dir.join("Default")).await.unwrap();
        tokio::fs::write(dir.join("Default/Preferences"), b"{}").await.unwrap();

        remove_profile_dir(&dir).await;
        assert!(!dir.exists());

        // already gone is fine
        remove_profile_dir(&dir).await;
    }

    #[tokio::test]
    async fn test_failed_launch_is_browser_init_error() {
        let config = ScraperConfig::default()
            .with_chrome_path("/nonexistent/menu-price-scraper/chrome");
        match ChromiumPage::launch(&config).await {
            Err(ScraperError::BrowserInit(_)) => {}
            Err(other) => panic!("unexpected error {other}"),
            Ok(_) => panic!("launch with a missing executable succeeded"),
        }
    }

    #[tokio::test]
    async fn test_close_without_browser_removes_profile() {
        let dir = unique_profile_dir();
        tokio::fs::create_dir_all(&dir).await.unwrap();
        let mut session = ChromiumPage {
            browser: None,
            page: None,
            handler: None,
            user_data_dir: Some(dir.clone()),
        };

        session.close().await.unwrap();
        assert!(!dir.exists());
        assert!(session.page().is_err());
    }
}
