use crate::config::{ScraperConfig, SelectorConfig};
use crate::crawlers::web::Renderer;
use crate::error::ConfigError;
use crate::parsers::{self, ProductExtractor};
use crate::results::ProductRecord;
use crate::retry::RetryPolicy;
use futures::FutureExt;
use scraper::Selector;
use std::panic::AssertUnwindSafe;

/// Walks a paginated catalog and collects product records
pub struct Crawler {
    card: Selector,
    extractor: ProductExtractor,
}

impl Crawler {
    pub fn new(
        selectors: &SelectorConfig,
        extract_retry: RetryPolicy,
    ) -> Result<Self, ConfigError> {
        Ok(Self {
            card: parsers::compile_selector(&selectors.product_card)?,
            extractor: ProductExtractor::new(selectors)?.with_retry(extract_retry),
        })
    }

    pub fn from_config(config: &ScraperConfig) -> Result<Self, ConfigError> {
        Self::new(&config.selectors, config.extract_retry)
    }

    /// URL of catalog page `page_number` under `base_url`
    pub fn page_url(base_url: &str, page_number: u32) -> String {
        format!("{}page/{}/", base_url, page_number)
    }

    /// Scrapes pages `1..=max_pages` one after another.
    ///
    /// Pages that fail to render or contain no product cards are skipped, as
    /// are fragments that fail extraction, so an unreachable catalog yields
    /// an empty vector rather than an error. The renderer is consumed and
    /// closed exactly once, even if the page loop panics.
    pub async fn scrape(
        &self,
        mut renderer: Renderer,
        base_url: &str,
        max_pages: u32,
    ) -> Vec<ProductRecord> {
        let outcome = AssertUnwindSafe(self.crawl_pages(&mut renderer, base_url, max_pages))
            .catch_unwind()
            .await;

        if let Err(e) = renderer.close().await {
            ::log::warn!("Failed to release browser session: {}", e);
        }

        match outcome {
            Ok(records) => records,
            Err(panic) => std::panic::resume_unwind(panic),
        }
    }

    async fn crawl_pages(
        &self,
        renderer: &mut Renderer,
        base_url: &str,
        max_pages: u32,
    ) -> Vec<ProductRecord> {
        let mut records = Vec::new();

        for page_number in 1..=max_pages {
            let page_url = Self::page_url(base_url, page_number);
            ::log::info!("Processing page: {}", page_url);

            let html = match renderer.render(&page_url).await {
                Ok(html) => html,
                Err(e) => {
                    ::log::error!("No content retrieved from {}: {}", page_url, e);
                    continue;
                }
            };

            let cards = parsers::product_cards(&html, &self.card);
            if cards.is_empty() {
                ::log::warn!("No products found on {}", page_url);
                continue;
            }

            ::log::info!("Found {} products on page {}", cards.len(), page_number);

            for (index, card) in cards.iter().enumerate() {
                match self.extractor.extract_with_retry(card).await {
                    Ok(record) => records.push(record),
                    Err(e) => {
                        ::log::error!(
                            "Skipping product {} on {}: {}",
                            index + 1,
                            page_url,
                            e
                        );
                    }
                }
            }
        }

        ::log::info!(
            "Scraped {} products from {} pages",
            records.len(),
            max_pages
        );
        records
    }
}
