use super::DENTAL_MIRROR_CARD;
use crate::config::SelectorConfig;
use crate::error::ExtractError;
use crate::parsers::ProductExtractor;
use crate::results::{PRICE_UNAVAILABLE, UNNAMED_PRODUCT};
use crate::retry::RetryPolicy;

fn extractor() -> ProductExtractor {
    ProductExtractor::new(&SelectorConfig::default())
        .unwrap()
        .with_retry(RetryPolicy::immediate(3))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extracts_all_fields() {
        let record = extractor().extract(DENTAL_MIRROR_CARD).unwrap();

        assert_eq!(record.title, "Dental Mirror");
        assert_eq!(record.price, "₹120.00");
        assert_eq!(
            record.link.as_deref(),
            Some("https://dentalstall.com/product/dental-mirror/")
        );
        assert_eq!(
            record.image.as_deref(),
            Some("https://dentalstall.com/wp-content/uploads/mirror.jpg")
        );
    }

    #[test]
    fn test_title_is_trimmed() {
        let fragment = r#"<div class="product-inner">
            <h2 class="woo-loop-product__title">
                Bone Rongeur
            </h2>
        </div>"#;
        let record = extractor().extract(fragment).unwrap();
        assert_eq!(record.title, "Bone Rongeur");
    }

    #[test]
    fn test_missing_elements_use_sentinels() {
        let fragment = r#"<div class="product-inner"><p>Out of stock</p></div>"#;
        let record = extractor().extract(fragment).unwrap();

        assert_eq!(record.title, UNNAMED_PRODUCT);
        assert_eq!(record.price, PRICE_UNAVAILABLE);
        assert_eq!(record.link, None);
        assert_eq!(record.image, None);
    }

    #[test]
    fn test_blank_title_uses_sentinel() {
        let fragment = r#"<div class="product-inner">
            <h2 class="woo-loop-product__title">   </h2>
            <span class="woocommerce-Price-amount">$5.00</span>
        </div>"#;
        let record = extractor().extract(fragment).unwrap();

        assert_eq!(record.title, UNNAMED_PRODUCT);
        assert_eq!(record.price, "$5.00");
    }

    #[test]
    fn test_title_selector_requires_class() {
        // A plain h2 is not the product title
        let fragment = r#"<div class="product-inner"><h2>Featured</h2></div>"#;
        let record = extractor().extract(fragment).unwrap();
        assert_eq!(record.title, UNNAMED_PRODUCT);
    }

    #[test]
    fn test_anchor_without_href_is_an_error() {
        let fragment = r#"<div class="product-inner">
            <a name="top">Top</a>
            <h2 class="woo-loop-product__title">Scaler Tip</h2>
        </div>"#;
        let err = extractor().extract(fragment).unwrap_err();

        match err {
            ExtractError::MissingAttribute { element, attribute } => {
                assert_eq!(element, "a");
                assert_eq!(attribute, "href");
            }
        }
    }

    #[test]
    fn test_image_without_src_is_an_error() {
        let fragment = r#"<div class="product-inner">
            <img data-src="lazy.jpg">
        </div>"#;
        assert!(extractor().extract(fragment).is_err());
    }

    #[test]
    fn test_invalid_selector_rejected() {
        let selectors = SelectorConfig {
            price: "span[".to_string(),
            ..SelectorConfig::default()
        };
        assert!(ProductExtractor::new(&selectors).is_err());
    }

    #[tokio::test]
    async fn test_retry_returns_record_on_first_attempt() {
        let record = extractor()
            .extract_with_retry(DENTAL_MIRROR_CARD)
            .await
            .unwrap();
        assert_eq!(record.title, "Dental Mirror");
    }

    #[tokio::test]
    async fn test_retry_gives_up_on_persistent_fault() {
        let fragment = r#"<div class="product-inner"><a>no link</a></div>"#;
        let result = extractor().extract_with_retry(fragment).await;
        assert!(result.is_err());
    }
}
