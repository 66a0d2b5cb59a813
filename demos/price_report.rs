use menu_price_scraper::{MarketplaceScraper, ScrapeRequest, ScrapeStatus, ScraperConfig, SiteProfile};

#[tokio::main]
async fn main() {
    // logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,menu_price_scraper=debug".into()),
        )
        .init();

    // address and food from args, falling back to environment variables
    let mut args = std::env::args().skip(1);
    let address = args
        .next()
        .or_else(|| std::env::var("SCRAPE_ADDRESS").ok())
        .expect("usage: price_report <address> <food> (or set SCRAPE_ADDRESS / SCRAPE_FOOD)");
    let food = args
        .next()
        .or_else(|| std::env::var("SCRAPE_FOOD").ok())
        .expect("usage: price_report <address> <food> (or set SCRAPE_ADDRESS / SCRAPE_FOOD)");

    let mut config = ScraperConfig::default()
        .with_headless(std::env::var("SCRAPE_HEADED").is_err());
    if let Ok(path) = std::env::var("SCRAPE_PROFILE") {
        let profile = SiteProfile::from_json_file(&path).expect("Failed to load SCRAPE_PROFILE");
        config = config.with_profile(profile);
    }

    let report = MarketplaceScraper::new(config)
        .run(ScrapeRequest::new(&address, &food))
        .await;

    println!("\n==========================================");
    println!("     PRICE REPORT FOR '{}'", food.to_uppercase());
    println!("     (all items, cheapest first)");
    println!("==========================================");

    if report.items.is_empty() {
        println!("No items were found at any shop.");
    } else {
        for item in &report.items {
            let flag = if item.price_is_placeholder { " (price?)" } else { "" };
            println!(
                "€{:<6.2} --- {} --- (at {}){}",
                item.price, item.item_name, item.shop_name, flag
            );
        }
        println!("\nShops: {}", report.shop_names().join(", "));
    }

    match &report.status {
        ScrapeStatus::Completed => println!("\nStatus: completed ({} shops checked)", report.shops.len()),
        ScrapeStatus::Failed { phase, reason, url } => {
            eprintln!("\nStatus: failed after {}: {}", phase, reason);
            if let Some(url) = url {
                eprintln!("Last page: {}", url);
            }
        }
    }
}
