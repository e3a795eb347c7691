use catalog_scraper::{ScrapeRequest, ScraperConfig};
use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "catalog-scraper")]
#[command(about = "Scrapes a paginated product catalog into a deduplicated JSON file")]
#[command(version)]
pub struct Args {
    /// Shared-secret token authorizing the scrape
    #[arg(short, long, env = "SCRAPER_TOKEN")]
    pub token: String,

    /// Number of catalog pages to scrape
    #[arg(short = 'p', long, default_value_t = 1)]
    pub max_pages: u32,

    /// Proxy URL (validated but not used)
    #[arg(long)]
    pub proxy: Option<String>,

    /// Path to a JSON configuration file
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Override the catalog base URL
    #[arg(long)]
    pub base_url: Option<String>,

    /// Override the catalog output file
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Override the WebDriver server URL
    #[arg(long)]
    pub webdriver_url: Option<String>,
}

impl Args {
    pub fn request(&self) -> ScrapeRequest {
        ScrapeRequest {
            max_pages: self.max_pages,
            proxy: self.proxy.clone(),
        }
    }

    /// Applies command-line overrides on top of the loaded configuration
    pub fn apply_overrides(&self, config: &mut ScraperConfig) {
        if let Some(base_url) = &self.base_url {
            config.base_url = base_url.clone();
        }
        if let Some(output) = &self.output {
            config.output_path = output.clone();
        }
        if let Some(webdriver_url) = &self.webdriver_url {
            config.browser.webdriver_url = webdriver_url.clone();
        }
    }
}
