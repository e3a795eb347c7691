use serde::{Deserialize, Serialize};

/// Title used when a product card has no readable title element
pub const UNNAMED_PRODUCT: &str = "Unnamed Product";

/// Price used when a product card has no readable price element
pub const PRICE_UNAVAILABLE: &str = "Price Unavailable";

/// A single product listing scraped from a catalog page.
///
/// The title is the only identity a record has: the catalog store treats two
/// records with the same title as the same product, even when every other
/// field differs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductRecord {
    /// Product title (never empty)
    #[serde(rename = "product_title")]
    pub title: String,

    /// Formatted price text as shown on the page
    pub price: String,

    /// Link to the product page (if the card had one)
    pub link: Option<String>,

    /// Image source URL (if the card had one)
    pub image: Option<String>,
}

impl ProductRecord {
    /// Create a new product record
    pub fn new(
        title: impl Into<String>,
        price: impl Into<String>,
        link: Option<String>,
        image: Option<String>,
    ) -> Self {
        Self {
            title: title.into(),
            price: price.into(),
            link,
            image,
        }
    }
}
