//! Parsing configuration for HTML extraction
//!
//! Centralized configuration for CSS selectors used on product detail pages.

use serde::{Deserialize, Serialize};

/// Main parsing configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ParsingConfig {
    pub product_page_selectors: ProductPageSelectors,
}

/// CSS selectors for product detail pages
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ProductPageSelectors {
    /// Element whose text carries the numeric item id(s)
    pub item_id: String,
    pub title: String,
    /// Breadcrumb segments, in page order
    pub breadcrumbs: String,
    /// Script holding the pdp-data blob (prefixed by a JS assignment)
    pub pdp_data_script: String,
    /// schema.org product JSON-LD block
    pub structured_data_script: String,
}

impl Default for ProductPageSelectors {
    fn default() -> Self {
        Self {
            item_id: r#"[auto-data="product_ItemId"]"#.to_string(),
            title: r#"[auto-data="product_name"]"#.to_string(),
            breadcrumbs: r#"[auto-data^="product_bread_crumbL"]"#.to_string(),
            pdp_data_script: "div#pdp-data script".to_string(),
            structured_data_script: r#"script[data-rh="true"][type="application/ld+json"]"#
                .to_string(),
        }
    }
}
