mod extractor_tests;

/// One WooCommerce product card as rendered by the storefront
pub const DENTAL_MIRROR_CARD: &str = r#"
<div class="product-inner">
  <div class="mf-product-thumbnail">
    <a href="https://dentalstall.com/product/dental-mirror/">
      <img src="https://dentalstall.com/wp-content/uploads/mirror.jpg" alt="Dental Mirror">
    </a>
  </div>
  <div class="mf-product-details">
    <h2 class="woo-loop-product__title">
      <a href="https://dentalstall.com/product/dental-mirror/">  Dental Mirror  </a>
    </h2>
    <span class="price">
      <span class="woocommerce-Price-amount amount"><bdi><span class="woocommerce-Price-currencySymbol">&#8377;</span>120.00</bdi></span>
    </span>
  </div>
</div>
"#;
