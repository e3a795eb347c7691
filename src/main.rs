use catalog_scraper::{ScrapeService, ScraperConfig};
use clap::Parser;
use std::process::ExitCode;

mod args;
use args::Args;

#[tokio::main]
async fn main() -> ExitCode {
    // Initialize logging
    env_logger::init();

    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => match ScraperConfig::from_file(path) {
            Ok(config) => config,
            Err(e) => {
                ::log::error!("Failed to load config {}: {}", path.display(), e);
                return ExitCode::from(2);
            }
        },
        None => ScraperConfig::default(),
    };
    config.apply_env();
    args.apply_overrides(&mut config);

    let service = match ScrapeService::from_config(&config) {
        Ok(service) => service,
        Err(e) => {
            ::log::error!("Invalid configuration: {}", e);
            return ExitCode::from(2);
        }
    };

    ::log::info!(
        "Starting scrape of {} ({} pages) via WebDriver at {}",
        config.base_url,
        args.max_pages,
        config.browser.webdriver_url
    );

    let start_time = std::time::Instant::now();
    let outcome = service.handle(&args.token, &args.request()).await;
    ::log::info!(
        "Scrape finished in {:.2} seconds",
        start_time.elapsed().as_secs_f64()
    );

    match outcome {
        Ok(response) => match serde_json::to_string_pretty(&response) {
            Ok(json) => {
                println!("{}", json);
                ExitCode::SUCCESS
            }
            Err(e) => {
                ::log::error!("Failed to encode response: {}", e);
                ExitCode::from(2)
            }
        },
        Err(e) => {
            let body = e.body();
            match serde_json::to_string_pretty(&body) {
                Ok(json) => eprintln!("{}", json),
                Err(_) => eprintln!("{}", body.detail),
            }
            if e.is_client_error() {
                ExitCode::from(1)
            } else {
                ExitCode::from(2)
            }
        }
    }
}
