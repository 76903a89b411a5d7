//! HTML and JSON extraction for product detail pages
//!
//! Page fields come from CSS selectors; descriptive attributes and prices
//! come from embedded or fetched JSON documents.

pub mod attribute_resolver;
pub mod config;
pub mod context;
pub mod error;
pub mod price_aggregator;
pub mod product_page_parser;

// Re-export public types
pub use attribute_resolver::{
    AttributeField, AttributeMatcher, AttributeResolver, AttributeRule, ResolvedAttributes,
    resolve_attribute,
};
pub use config::{ParsingConfig, ProductPageSelectors};
pub use context::DetailParseContext;
pub use error::{ParsingError, ParsingResult};
pub use price_aggregator::aggregate_prices;
pub use product_page_parser::{ParsedProductPage, ProductPageParser};

use scraper::Html;

/// Parser over an already-parsed document plus per-page context
pub trait ContextualParser {
    type Output;
    type Context;

    /// Parse HTML with contextual information
    fn parse_with_context(&self, html: &Html, context: &Self::Context) -> ParsingResult<Self::Output>;
}
