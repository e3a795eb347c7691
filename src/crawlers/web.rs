use crate::config::BrowserConfig;
use crate::error::RenderError;
use crate::retry::RetryPolicy;
use async_trait::async_trait;
use fantoccini::error::CmdError;
use fantoccini::wd::Capabilities;
use fantoccini::{Client, ClientBuilder, Locator};
use std::time::Duration;

/// A live browser session able to render JavaScript-driven pages
#[async_trait]
pub trait Browser: Send {
    /// Navigate to `url`, wait up to `timeout` for an element matching
    /// `ready_selector`, and return the rendered page source
    async fn load(
        &mut self,
        url: &str,
        ready_selector: &str,
        timeout: Duration,
    ) -> Result<String, RenderError>;

    /// End the session and release the underlying browser process
    async fn close(&mut self) -> Result<(), RenderError>;
}

/// Opens a fresh browser session for each crawl
#[async_trait]
pub trait BrowserLauncher: Send + Sync {
    async fn launch(&self) -> Result<Box<dyn Browser>, RenderError>;
}

/// Owned handle on one browser session, with bounded retry around each render.
///
/// `close` consumes the handle, so a session cannot be released twice.
pub struct Renderer {
    browser: Box<dyn Browser>,
    ready_selector: String,
    ready_timeout: Duration,
    retry: RetryPolicy,
}

impl Renderer {
    pub fn new(
        browser: Box<dyn Browser>,
        ready_selector: impl Into<String>,
        ready_timeout: Duration,
    ) -> Self {
        Self {
            browser,
            ready_selector: ready_selector.into(),
            ready_timeout,
            retry: RetryPolicy::default(),
        }
    }

    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Renders `url`, retrying on timeout or driver faults.
    ///
    /// Returns the error of the last attempt once the retry policy is
    /// exhausted; callers treat that as "no content for this page".
    pub async fn render(&mut self, url: &str) -> Result<String, RenderError> {
        let browser = &mut self.browser;
        let ready_selector = self.ready_selector.as_str();
        let ready_timeout = self.ready_timeout;

        self.retry
            .run(&format!("fetching {}", url), async |attempt| {
                ::log::info!("Fetching URL: {} (attempt {})", url, attempt);
                browser.load(url, ready_selector, ready_timeout).await
            })
            .await
    }

    /// Releases the browser session
    pub async fn close(mut self) -> Result<(), RenderError> {
        self.browser.close().await?;
        ::log::debug!("Browser session closed");
        Ok(())
    }
}

/// Browser session driven over the WebDriver protocol
pub struct WebDriverBrowser {
    client: Client,
}

impl WebDriverBrowser {
    pub fn new(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Browser for WebDriverBrowser {
    async fn load(
        &mut self,
        url: &str,
        ready_selector: &str,
        timeout: Duration,
    ) -> Result<String, RenderError> {
        self.client
            .goto(url)
            .await
            .map_err(|e| navigation_error(e, "accessing", url))?;

        match self
            .client
            .wait()
            .at_most(timeout)
            .for_element(Locator::Css(ready_selector))
            .await
        {
            Ok(_) => {}
            Err(CmdError::WaitTimeout) => {
                return Err(RenderError::ReadyTimeout {
                    url: url.to_string(),
                    selector: ready_selector.to_string(),
                });
            }
            Err(e) => return Err(navigation_error(e, "waiting for content on", url)),
        }

        self.client.source().await.map_err(|e| RenderError::Source {
            url: url.to_string(),
            reason: e.to_string(),
        })
    }

    async fn close(&mut self) -> Result<(), RenderError> {
        self.client
            .clone()
            .close()
            .await
            .map_err(|e| RenderError::Close(e.to_string()))
    }
}

/// Maps a driver error, flagging lost sessions separately in the log
fn navigation_error(error: CmdError, context: &str, url: &str) -> RenderError {
    if error.to_string().contains("Unable to find session") {
        ::log::warn!("Lost WebDriver session while {} {}", context, url);
    }
    RenderError::Navigation {
        url: url.to_string(),
        reason: error.to_string(),
    }
}

/// Launches Chrome sessions through a WebDriver server
pub struct WebDriverLauncher {
    config: BrowserConfig,
}

impl WebDriverLauncher {
    pub fn new(config: BrowserConfig) -> Self {
        Self { config }
    }

    fn capabilities(&self) -> Capabilities {
        let mut caps = Capabilities::new();
        caps.insert(
            "goog:chromeOptions".to_string(),
            serde_json::json!({ "args": self.config.chrome_args() }),
        );
        caps
    }
}

#[async_trait]
impl BrowserLauncher for WebDriverLauncher {
    async fn launch(&self) -> Result<Box<dyn Browser>, RenderError> {
        let client = connect_to_webdriver(&self.config, self.capabilities()).await?;
        Ok(Box::new(WebDriverBrowser::new(client)))
    }
}

/// Connects to the configured WebDriver, then to each fallback endpoint
async fn connect_to_webdriver(
    config: &BrowserConfig,
    capabilities: Capabilities,
) -> Result<Client, RenderError> {
    let mut builder = ClientBuilder::native();
    builder.capabilities(capabilities);

    let primary_error = match builder.connect(&config.webdriver_url).await {
        Ok(client) => {
            ::log::debug!("Connected to WebDriver at {}", config.webdriver_url);
            return Ok(client);
        }
        Err(e) => {
            ::log::error!(
                "Failed to connect to WebDriver at {}: {}",
                config.webdriver_url,
                e
            );
            e.to_string()
        }
    };

    for url in config.fallback_urls.iter() {
        if *url == config.webdriver_url {
            continue;
        }

        ::log::info!("Trying fallback WebDriver URL: {}", url);
        if let Ok(client) = builder.connect(url).await {
            ::log::debug!("Connected to fallback WebDriver at {}", url);
            return Ok(client);
        }
    }

    ::log::error!(
        "Make sure a WebDriver server is running or set the WEBDRIVER_URL environment variable"
    );
    Err(RenderError::Session(primary_error))
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;
    use std::collections::HashMap;
    use std::sync::{Arc, Mutex};

    /// What the fake browser observed, shared with the test after the
    /// renderer has been consumed
    #[derive(Debug, Default)]
    pub struct BrowserLog {
        pub loads: Vec<String>,
        pub closes: usize,
    }

    /// Scripted browser: serves fixed HTML per URL, fails for unknown URLs
    pub struct FakeBrowser {
        pub pages: HashMap<String, String>,
        pub panic_on: Option<String>,
        pub log: Arc<Mutex<BrowserLog>>,
    }

    impl FakeBrowser {
        pub fn new(pages: &[(&str, &str)]) -> (Self, Arc<Mutex<BrowserLog>>) {
            let log = Arc::new(Mutex::new(BrowserLog::default()));
            let browser = Self {
                pages: pages
                    .iter()
                    .map(|(u, h)| (u.to_string(), h.to_string()))
                    .collect(),
                panic_on: None,
                log: Arc::clone(&log),
            };
            (browser, log)
        }
    }

    #[async_trait]
    impl Browser for FakeBrowser {
        async fn load(
            &mut self,
            url: &str,
            ready_selector: &str,
            _timeout: Duration,
        ) -> Result<String, RenderError> {
            self.log.lock().unwrap().loads.push(url.to_string());

            if self.panic_on.as_deref() == Some(url) {
                panic!("driver crashed on {}", url);
            }

            self.pages
                .get(url)
                .cloned()
                .ok_or_else(|| RenderError::ReadyTimeout {
                    url: url.to_string(),
                    selector: ready_selector.to_string(),
                })
        }

        async fn close(&mut self) -> Result<(), RenderError> {
            self.log.lock().unwrap().closes += 1;
            Ok(())
        }
    }
}
