use crate::config::ScraperConfig;
use crate::crawlers::{BrowserLauncher, Crawler, Renderer, WebDriverLauncher};
use crate::error::{ConfigError, ServiceError};
use crate::results::ProductRecord;
use crate::retry::RetryPolicy;
use crate::store::CatalogStore;
use futures::FutureExt;
use serde::{Deserialize, Serialize};
use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::time::Duration;
use url::Url;

/// Decides whether a caller-supplied credential is acceptable
pub trait CredentialVerifier: Send + Sync {
    fn verify(&self, token: &str) -> bool;
}

/// Accepts exactly one shared secret
#[derive(Debug, Clone)]
pub struct StaticTokenVerifier {
    token: String,
}

impl StaticTokenVerifier {
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
        }
    }
}

impl CredentialVerifier for StaticTokenVerifier {
    fn verify(&self, token: &str) -> bool {
        token == self.token
    }
}

/// Parameters of one scrape run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScrapeRequest {
    /// Number of catalog pages to visit, starting from page 1
    #[serde(default = "default_max_pages")]
    pub max_pages: u32,

    /// Accepted for compatibility; requests are never routed through it
    #[serde(default)]
    pub proxy: Option<String>,
}

fn default_max_pages() -> u32 {
    1
}

impl Default for ScrapeRequest {
    fn default() -> Self {
        Self {
            max_pages: default_max_pages(),
            proxy: None,
        }
    }
}

impl ScrapeRequest {
    pub fn validate(&self) -> Result<(), ServiceError> {
        if self.max_pages < 1 {
            return Err(ServiceError::InvalidRequest(
                "max_pages must be at least 1".to_string(),
            ));
        }

        if let Some(proxy) = &self.proxy {
            let url = Url::parse(proxy).map_err(|e| {
                ServiceError::InvalidRequest(format!("invalid proxy '{}': {}", proxy, e))
            })?;
            if url.host_str().is_none() {
                return Err(ServiceError::InvalidRequest(format!(
                    "invalid proxy '{}': missing host",
                    proxy
                )));
            }
        }

        Ok(())
    }
}

/// Successful scrape outcome
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScrapeResponse {
    pub status: String,
    pub file: String,
    pub scraped_data: Vec<ProductRecord>,
}

/// Error payload returned to callers
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub status_code: u16,
    pub detail: String,
}

impl ServiceError {
    /// HTTP-style status for this error
    pub fn status_code(&self) -> u16 {
        match self {
            ServiceError::Unauthorized => 401,
            ServiceError::InvalidRequest(_) => 422,
            ServiceError::NoProducts | ServiceError::Internal(_) => 500,
        }
    }

    pub fn is_client_error(&self) -> bool {
        self.status_code() < 500
    }

    pub fn body(&self) -> ErrorBody {
        ErrorBody {
            status_code: self.status_code(),
            detail: self.to_string(),
        }
    }
}

/// Request boundary: authorizes, crawls, then merges the result into the catalog
pub struct ScrapeService {
    verifier: Box<dyn CredentialVerifier>,
    launcher: Box<dyn BrowserLauncher>,
    crawler: Crawler,
    store: CatalogStore,
    base_url: String,
    ready_selector: String,
    ready_timeout: Duration,
    render_retry: RetryPolicy,
}

impl ScrapeService {
    pub fn new(
        config: &ScraperConfig,
        verifier: Box<dyn CredentialVerifier>,
        launcher: Box<dyn BrowserLauncher>,
    ) -> Result<Self, ConfigError> {
        config.validate()?;

        Ok(Self {
            verifier,
            launcher,
            crawler: Crawler::from_config(config)?,
            store: CatalogStore::new(config.output_path.clone()),
            base_url: config.base_url.clone(),
            ready_selector: config.selectors.product_card.clone(),
            ready_timeout: config.browser.ready_timeout(),
            render_retry: config.render_retry,
        })
    }

    /// Service with the static token check and a WebDriver-backed browser
    pub fn from_config(config: &ScraperConfig) -> Result<Self, ConfigError> {
        Self::new(
            config,
            Box::new(StaticTokenVerifier::new(config.auth_token.clone())),
            Box::new(WebDriverLauncher::new(config.browser.clone())),
        )
    }

    pub async fn handle(
        &self,
        token: &str,
        request: &ScrapeRequest,
    ) -> Result<ScrapeResponse, ServiceError> {
        if !self.verifier.verify(token) {
            ::log::warn!("Rejected scrape request with invalid token");
            return Err(ServiceError::Unauthorized);
        }

        request.validate()?;
        if request.proxy.is_some() {
            ::log::debug!("Proxy supplied but not used");
        }

        let browser = self.launcher.launch().await?;
        let renderer = Renderer::new(browser, self.ready_selector.clone(), self.ready_timeout)
            .with_retry(self.render_retry);

        let crawl = self.crawler.scrape(renderer, &self.base_url, request.max_pages);
        let scraped_data = match AssertUnwindSafe(crawl).catch_unwind().await {
            Ok(records) => records,
            Err(panic) => {
                let reason = panic_reason(&*panic);
                ::log::error!("Scrape of {} aborted: {}", self.base_url, reason);
                return Err(ServiceError::Internal(reason));
            }
        };

        if scraped_data.is_empty() {
            ::log::error!("Scrape of {} produced no products", self.base_url);
            return Err(ServiceError::NoProducts);
        }

        let path = self.store.merge_and_save(&scraped_data)?;

        Ok(ScrapeResponse {
            status: "success".to_string(),
            file: path.display().to_string(),
            scraped_data,
        })
    }
}

fn panic_reason(panic: &(dyn Any + Send)) -> String {
    if let Some(message) = panic.downcast_ref::<&str>() {
        format!("scrape panicked: {}", message)
    } else if let Some(message) = panic.downcast_ref::<String>() {
        format!("scrape panicked: {}", message)
    } else {
        "scrape panicked".to_string()
    }
}
