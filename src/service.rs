use std::convert::Infallible;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};

use tower::Service;
use tracing::{debug, error, info};

use crate::config::ScraperConfig;
use crate::marketplace::{
    MarketplaceScraper, MenuItem, Phase, ScrapeReport, ScrapeRequest, ScrapeStatus,
};

/// tower::Service running one marketplace scrape per request.
///
/// Failures are reported inside [`ScrapeReport::status`], so the service
/// itself never errors.
#[derive(Debug, Clone, Default)]
pub struct ScraperService {
    config: Arc<ScraperConfig>,
}

impl ScraperService {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: ScraperConfig) -> Self {
        Self {
            config: Arc::new(config),
        }
    }
}

impl Service<ScrapeRequest> for ScraperService {
    type Response = ScrapeReport;
    type Error = Infallible;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>> + Send>>;

    fn poll_ready(&mut self, _cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        Poll::Ready(Ok(()))
    }

    fn call(&mut self, req: ScrapeRequest) -> Self::Future {
        info!(
            "Scrape request received: address={}, food={}",
            req.address, req.search_term
        );
        let config = Arc::clone(&self.config);

        Box::pin(async move {
            let scraper = MarketplaceScraper::new((*config).clone());
            let report = scraper.run(req).await;

            info!(
                "Scrape done: items={}, shops={}, failed={}",
                report.items.len(),
                report.shops.len(),
                report.is_failed()
            );
            Ok(report)
        })
    }
}

/// Scrape with the default configuration. Never fails; an empty list means
/// nothing usable was found.
pub async fn scrape(address: &str, search_term: &str) -> Vec<MenuItem> {
    MarketplaceScraper::new(ScraperConfig::default())
        .run(ScrapeRequest::new(address, search_term))
        .await
        .items
}

/// Blocking form of [`scrape`] for callers without an async runtime.
pub fn scrape_blocking(address: &str, search_term: &str) -> Vec<MenuItem> {
    scrape_blocking_with(ScraperConfig::default(), ScrapeRequest::new(address, search_term)).items
}

/// Blocking run with an explicit configuration, returning the full report.
///
/// Safe to call from inside a tokio runtime: the scrape then runs on its own
/// thread with its own runtime.
pub fn scrape_blocking_with(config: ScraperConfig, request: ScrapeRequest) -> ScrapeReport {
    if tokio::runtime::Handle::try_current().is_err() {
        return run_on_new_runtime(config, request);
    }

    debug!("Called from inside a runtime; scraping on a dedicated thread");
    let fallback = request.clone();
    match std::thread::spawn(move || run_on_new_runtime(config, request)).join() {
        Ok(report) => report,
        Err(_) => {
            error!("Scrape thread panicked");
            init_failure(fallback, "scrape thread panicked".to_string())
        }
    }
}

fn run_on_new_runtime(config: ScraperConfig, request: ScrapeRequest) -> ScrapeReport {
    match tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime.block_on(MarketplaceScraper::new(config).run(request)),
        Err(e) => {
            error!("Failed to start async runtime: {}", e);
            init_failure(request, format!("runtime: {}", e))
        }
    }
}

fn init_failure(request: ScrapeRequest, reason: String) -> ScrapeReport {
    let now = chrono::Utc::now();
    ScrapeReport {
        request,
        items: Vec::new(),
        status: ScrapeStatus::Failed {
            phase: Phase::Init,
            reason,
            url: None,
        },
        signin: None,
        shops: Vec::new(),
        started_at: now,
        finished_at: now,
    }
}
