use crate::config::SelectorConfig;
use crate::error::{ConfigError, ExtractError};
use crate::results::{PRICE_UNAVAILABLE, ProductRecord, UNNAMED_PRODUCT};
use crate::retry::RetryPolicy;
use scraper::{ElementRef, Html, Selector};

/// Compiles a CSS selector, reporting the offending text on failure
pub fn compile_selector(selector: &str) -> Result<Selector, ConfigError> {
    Selector::parse(selector).map_err(|e| ConfigError::InvalidSelector {
        selector: selector.to_string(),
        reason: e.to_string(),
    })
}

/// Splits a rendered page into the outer HTML of each product card
pub fn product_cards(html: &str, card: &Selector) -> Vec<String> {
    let doc = Html::parse_document(html);

    let cards = doc
        .select(card)
        .map(|e| e.html())
        .collect::<Vec<String>>();

    ::log::debug!("HTML parser found {} product cards", cards.len());
    cards
}

/// Extracts product records from product-card fragments
#[derive(Debug, Clone)]
pub struct ProductExtractor {
    title: Selector,
    price: Selector,
    link: Selector,
    image: Selector,
    retry: RetryPolicy,
}

impl ProductExtractor {
    /// Compile the field selectors from configuration
    pub fn new(selectors: &SelectorConfig) -> Result<Self, ConfigError> {
        Ok(Self {
            title: compile_selector(&selectors.title)?,
            price: compile_selector(&selectors.price)?,
            link: compile_selector(&selectors.link)?,
            image: compile_selector(&selectors.image)?,
            retry: RetryPolicy::default(),
        })
    }

    /// Set the retry policy used by [`ProductExtractor::extract_with_retry`]
    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Single extraction attempt over one product fragment.
    ///
    /// Missing title or price elements fall back to their sentinels and a
    /// missing anchor or image yields `None`. An anchor without `href`, or an
    /// image without `src`, is an error.
    pub fn extract(&self, fragment: &str) -> Result<ProductRecord, ExtractError> {
        let doc = Html::parse_fragment(fragment);
        let root = doc.root_element();

        let title = first_text(root, &self.title).unwrap_or_else(|| UNNAMED_PRODUCT.to_string());
        let price = first_text(root, &self.price).unwrap_or_else(|| PRICE_UNAVAILABLE.to_string());
        let link = first_attr(root, &self.link, "href")?;
        let image = first_attr(root, &self.image, "src")?;

        Ok(ProductRecord {
            title,
            price,
            link,
            image,
        })
    }

    /// Extraction with the configured bounded retry
    pub async fn extract_with_retry(&self, fragment: &str) -> Result<ProductRecord, ExtractError> {
        self.retry
            .run("product extraction", async |_| self.extract(fragment))
            .await
    }
}

/// Text of the first match, each text node trimmed and concatenated.
/// Returns `None` when nothing matches or the text is blank.
fn first_text(root: ElementRef<'_>, selector: &Selector) -> Option<String> {
    let element = root.select(selector).next()?;
    let text = element
        .text()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .collect::<String>();

    if text.is_empty() { None } else { Some(text) }
}

fn first_attr(
    root: ElementRef<'_>,
    selector: &Selector,
    attribute: &'static str,
) -> Result<Option<String>, ExtractError> {
    match root.select(selector).next() {
        None => Ok(None),
        Some(element) => element
            .value()
            .attr(attribute)
            .map(|v| Some(v.to_string()))
            .ok_or_else(|| ExtractError::MissingAttribute {
                element: element.value().name().to_string(),
                attribute,
            }),
    }
}
