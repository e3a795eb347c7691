use crate::error::ConfigError;
use crate::retry::RetryPolicy;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::time::Duration;
use url::Url;

/// Configuration for the WebDriver browser session
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BrowserConfig {
    /// URL for the WebDriver instance
    #[serde(default = "default_webdriver_url")]
    pub webdriver_url: String,

    /// Endpoints tried in order when the primary WebDriver URL refuses a session
    #[serde(default = "default_fallback_urls")]
    pub fallback_urls: Vec<String>,

    /// Run the browser without a window
    #[serde(default = "default_true")]
    pub headless: bool,

    /// Disable GPU acceleration for deterministic rendering
    #[serde(default = "default_true")]
    pub disable_gpu: bool,

    /// Viewport width in pixels
    #[serde(default = "default_window_width")]
    pub window_width: u32,

    /// Viewport height in pixels
    #[serde(default = "default_window_height")]
    pub window_height: u32,

    /// Seconds to wait for the product-card marker to appear
    #[serde(default = "default_ready_timeout_secs")]
    pub ready_timeout_secs: u64,
}

/// CSS selectors describing the target site's product markup
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SelectorConfig {
    /// Marks one product card; doubles as the page readiness signal
    #[serde(default = "default_product_card")]
    pub product_card: String,

    #[serde(default = "default_title")]
    pub title: String,

    #[serde(default = "default_price")]
    pub price: String,

    #[serde(default = "default_link")]
    pub link: String,

    #[serde(default = "default_image")]
    pub image: String,
}

/// Top-level configuration for a scrape run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScraperConfig {
    /// Catalog root; pages live at `{base_url}page/{n}/`
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Where the merged catalog is written
    #[serde(default = "default_output_path")]
    pub output_path: PathBuf,

    /// Shared secret accepted by the default credential verifier
    #[serde(default = "default_auth_token")]
    pub auth_token: String,

    #[serde(default)]
    pub browser: BrowserConfig,

    #[serde(default)]
    pub selectors: SelectorConfig,

    /// Retry policy around each page render
    #[serde(default)]
    pub render_retry: RetryPolicy,

    /// Retry policy around each product extraction
    #[serde(default)]
    pub extract_retry: RetryPolicy,
}

impl ScraperConfig {
    /// Load configuration from a file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let mut file = File::open(path)?;
        let mut contents = String::new();
        file.read_to_string(&mut contents)?;

        Self::from_json(&contents)
    }

    /// Load configuration from a JSON string
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Override the WebDriver URL with the `WEBDRIVER_URL` environment variable if set
    pub fn apply_env(&mut self) {
        if let Ok(webdriver_url) = std::env::var("WEBDRIVER_URL") {
            if !webdriver_url.is_empty() {
                self.browser.webdriver_url = webdriver_url;
            }
        }
    }

    /// Checks settings that serde cannot
    pub fn validate(&self) -> Result<(), ConfigError> {
        match Url::parse(&self.base_url) {
            Ok(url) if !url.cannot_be_a_base() => Ok(()),
            _ => Err(ConfigError::InvalidBaseUrl(self.base_url.clone())),
        }
    }
}

impl BrowserConfig {
    pub fn ready_timeout(&self) -> Duration {
        Duration::from_secs(self.ready_timeout_secs)
    }

    /// Chrome command-line arguments for this configuration
    pub fn chrome_args(&self) -> Vec<String> {
        let mut args = Vec::new();
        if self.headless {
            args.push("--headless".to_string());
        }
        if self.disable_gpu {
            args.push("--disable-gpu".to_string());
        }
        args.push(format!(
            "--window-size={},{}",
            self.window_width, self.window_height
        ));
        args
    }
}

impl Default for ScraperConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            output_path: default_output_path(),
            auth_token: default_auth_token(),
            browser: BrowserConfig::default(),
            selectors: SelectorConfig::default(),
            render_retry: RetryPolicy::default(),
            extract_retry: RetryPolicy::default(),
        }
    }
}

impl Default for BrowserConfig {
    fn default() -> Self {
        Self {
            webdriver_url: default_webdriver_url(),
            fallback_urls: default_fallback_urls(),
            headless: true,
            disable_gpu: true,
            window_width: default_window_width(),
            window_height: default_window_height(),
            ready_timeout_secs: default_ready_timeout_secs(),
        }
    }
}

impl Default for SelectorConfig {
    fn default() -> Self {
        Self {
            product_card: default_product_card(),
            title: default_title(),
            price: default_price(),
            link: default_link(),
            image: default_image(),
        }
    }
}

fn default_base_url() -> String {
    "https://dentalstall.com/shop/".to_string()
}

fn default_output_path() -> PathBuf {
    PathBuf::from("scraped_products.json")
}

fn default_auth_token() -> String {
    "static-token-123".to_string()
}

/// Default value for webdriver_url
fn default_webdriver_url() -> String {
    "http://localhost:4444".to_string()
}

fn default_fallback_urls() -> Vec<String> {
    vec![
        "http://localhost:9515".to_string(), // ChromeDriver default
        "http://127.0.0.1:4444".to_string(),
    ]
}

fn default_true() -> bool {
    true
}

fn default_window_width() -> u32 {
    1920
}

fn default_window_height() -> u32 {
    1080
}

fn default_ready_timeout_secs() -> u64 {
    10
}

fn default_product_card() -> String {
    "div.product-inner".to_string()
}

fn default_title() -> String {
    "h2.woo-loop-product__title".to_string()
}

fn default_price() -> String {
    "span.woocommerce-Price-amount".to_string()
}

fn default_link() -> String {
    "a".to_string()
}

fn default_image() -> String {
    "img".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_json_uses_defaults() {
        let config = ScraperConfig::from_json("{}").unwrap();

        assert_eq!(config.base_url, "https://dentalstall.com/shop/");
        assert_eq!(config.output_path, PathBuf::from("scraped_products.json"));
        assert_eq!(config.browser.webdriver_url, "http://localhost:4444");
        assert_eq!(config.browser.ready_timeout(), Duration::from_secs(10));
        assert_eq!(config.selectors.product_card, "div.product-inner");
        assert_eq!(config.render_retry.max_attempts, 3);
        assert_eq!(config.extract_retry.delay_ms, 2000);
    }

    #[test]
    fn test_partial_override() {
        let config = ScraperConfig::from_json(
            r#"{
                "base_url": "https://shop.example.com/catalog/",
                "browser": { "headless": false, "window_width": 800 },
                "render_retry": { "max_attempts": 5 }
            }"#,
        )
        .unwrap();

        assert_eq!(config.base_url, "https://shop.example.com/catalog/");
        assert!(!config.browser.headless);
        assert_eq!(config.browser.window_height, 1080);
        assert_eq!(config.render_retry.max_attempts, 5);
        assert_eq!(config.render_retry.delay_ms, 2000);
    }

    #[test]
    fn test_chrome_args() {
        let args = BrowserConfig::default().chrome_args();
        assert_eq!(
            args,
            vec!["--headless", "--disable-gpu", "--window-size=1920,1080"]
        );

        let visible = BrowserConfig {
            headless: false,
            disable_gpu: false,
            window_width: 1024,
            window_height: 768,
            ..BrowserConfig::default()
        };
        assert_eq!(visible.chrome_args(), vec!["--window-size=1024,768"]);
    }

    #[test]
    fn test_rejects_invalid_base_url() {
        let result = ScraperConfig::from_json(r#"{ "base_url": "not a url" }"#);
        assert!(matches!(result, Err(ConfigError::InvalidBaseUrl(_))));
    }

    #[test]
    fn test_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, r#"{ "output_path": "out/catalog.json" }"#).unwrap();

        let config = ScraperConfig::from_file(&path).unwrap();
        assert_eq!(config.output_path, PathBuf::from("out/catalog.json"));
    }
}
