//! Product detail page parser
//!
//! Extracts the page-level fields (SKU tokens, title, breadcrumbs, link) and
//! the two embedded JSON blobs: the schema.org product block (MPN, brand,
//! description) and the pdp-data block feeding the attribute resolver.

#![allow(clippy::uninlined_format_args)]

use regex::Regex;
use scraper::{ElementRef, Html, Selector};
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, warn};

use super::attribute_resolver::{AttributeField, AttributeResolver, ResolvedAttributes};
use super::config::ProductPageSelectors;
use super::context::DetailParseContext;
use super::{ContextualParser, ParsingError, ParsingResult};
use crate::domain::product::{PdpData, PendingProductContext};

const PDP_DATA_BLOB: &str = "pdp-data";
const STRUCTURED_DATA_BLOB: &str = "structured-data";

/// Page fields plus resolved attributes, before image probing
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedProductPage {
    pub sku_tokens: Vec<String>,
    pub title: Option<String>,
    pub category: String,
    pub link: String,
    pub product_id: String,
    pub mpn: Option<String>,
    pub brand: Option<String>,
    pub description: Option<String>,
    pub attributes: ResolvedAttributes,
}

impl ParsedProductPage {
    pub fn primary_sku(&self) -> Option<&str> {
        self.sku_tokens.first().map(String::as_str)
    }

    /// Turn the parsed page into the in-flight context, attaching the probed images
    pub fn into_context(mut self, product_images: Vec<String>) -> PendingProductContext {
        let attrs = &mut self.attributes;
        PendingProductContext {
            upc: attrs.take(AttributeField::Upc),
            model_number: attrs.take(AttributeField::ModelNumber),
            item_weight: attrs.take(AttributeField::ItemWeight),
            product_dimensions: attrs.take(AttributeField::ProductDimensions),
            size: attrs.take(AttributeField::Size),
            color: attrs.take(AttributeField::Color),
            package_dimensions: attrs.take(AttributeField::PackageDimensions),
            shipping_weight: attrs.take(AttributeField::ShippingWeight),
            sku_tokens: self.sku_tokens,
            title: self.title,
            category: self.category,
            brand: self.brand,
            link: self.link,
            description: self.description,
            mpn: self.mpn,
            product_images,
            product_id: self.product_id,
        }
    }
}

/// Parser for product detail pages
pub struct ProductPageParser {
    item_id_selector: Selector,
    title_selector: Selector,
    breadcrumb_selector: Selector,
    pdp_data_selector: Selector,
    structured_data_selector: Selector,
    digits: Regex,
    resolver: AttributeResolver,
}

impl ProductPageParser {
    /// Create a parser with the default selectors and attribute table
    pub fn new() -> ParsingResult<Self> {
        Self::with_config(&ProductPageSelectors::default(), AttributeResolver::new()?)
    }

    pub fn with_config(
        selectors: &ProductPageSelectors,
        resolver: AttributeResolver,
    ) -> ParsingResult<Self> {
        Ok(Self {
            item_id_selector: compile_selector(&selectors.item_id)?,
            title_selector: compile_selector(&selectors.title)?,
            breadcrumb_selector: compile_selector(&selectors.breadcrumbs)?,
            pdp_data_selector: compile_selector(&selectors.pdp_data_script)?,
            structured_data_selector: compile_selector(&selectors.structured_data_script)?,
            digits: Regex::new(r"\d+").map_err(|e| ParsingError::invalid_selector(r"\d+", e))?,
            resolver,
        })
    }

    /// Parse raw HTML for `context.url`
    pub fn parse(&self, html: &str, context: &DetailParseContext) -> ParsingResult<ParsedProductPage> {
        let document = Html::parse_document(html);
        self.parse_with_context(&document, context)
    }

    fn extract_sku_tokens(&self, html: &Html) -> ParsingResult<Vec<String>> {
        let element = html
            .select(&self.item_id_selector)
            .next()
            .ok_or_else(|| ParsingError::required_field_missing("sku", Some("item-id marker")))?;

        let text = element_text(&element);
        let tokens: Vec<String> = self
            .digits
            .find_iter(&text)
            .map(|m| m.as_str().to_string())
            .collect();

        if tokens.is_empty() {
            return Err(ParsingError::required_field_missing(
                "sku",
                Some("item-id marker has no numeric token"),
            ));
        }
        Ok(tokens)
    }

    fn extract_title(&self, html: &Html) -> ParsingResult<Option<String>> {
        let element = html
            .select(&self.title_selector)
            .next()
            .ok_or_else(|| ParsingError::required_field_missing("title", Some("product name node")))?;

        let text = element_text(&element);
        let title = text.trim().trim_matches('"').trim();
        Ok((!title.is_empty()).then(|| title.to_string()))
    }

    /// Last breadcrumb segment, empty when the page has none
    fn extract_category(&self, html: &Html) -> String {
        html.select(&self.breadcrumb_selector)
            .map(|el| element_text(&el).trim().to_string())
            .filter(|segment| !segment.is_empty())
            .last()
            .unwrap_or_default()
    }

    fn extract_blob<T: DeserializeOwned>(
        &self,
        html: &Html,
        selector: &Selector,
        blob: &str,
    ) -> ParsingResult<T> {
        let script = html
            .select(selector)
            .next()
            .ok_or_else(|| ParsingError::malformed_document(blob, "script block not found"))?;
        parse_embedded_json(&element_text(&script), blob)
    }
}

impl ContextualParser for ProductPageParser {
    type Output = ParsedProductPage;
    type Context = DetailParseContext;

    fn parse_with_context(&self, html: &Html, context: &Self::Context) -> ParsingResult<Self::Output> {
        debug!("Parsing product page: {}", context.url);

        let sku_tokens = self.extract_sku_tokens(html)?;
        let title = self.extract_title(html)?;
        let category = self.extract_category(html);

        let pdp_data: PdpData = self.extract_blob(html, &self.pdp_data_selector, PDP_DATA_BLOB)?;
        let structured: Value =
            self.extract_blob(html, &self.structured_data_selector, STRUCTURED_DATA_BLOB)?;

        let attributes = pdp_data.into_attributes();
        if attributes.is_empty() {
            warn!("No descriptive attributes on {}", context.url);
        }
        let resolved = self.resolver.resolve_all(&attributes);

        let page = ParsedProductPage {
            sku_tokens,
            title,
            category,
            link: context.url.clone(),
            product_id: context.product_id.clone(),
            mpn: structured.get("mpn").and_then(json_text),
            brand: structured.get("brand").and_then(brand_name),
            description: structured
                .get("description")
                .and_then(Value::as_str)
                .map(strip_html_tags)
                .filter(|d| !d.is_empty()),
            attributes: resolved,
        };

        debug!(
            "Parsed SKU {:?} with {} resolved attributes",
            page.sku_tokens,
            page.attributes.len()
        );
        Ok(page)
    }
}

fn compile_selector(raw: &str) -> ParsingResult<Selector> {
    Selector::parse(raw).map_err(|e| ParsingError::invalid_selector(raw, e))
}

fn element_text(element: &ElementRef<'_>) -> String {
    element.text().collect::<String>()
}

/// Parse the first JSON value in a script body, skipping any JS assignment
/// before it (`window.__DATA__ = {...};`) and ignoring trailing text.
pub fn parse_embedded_json<T: DeserializeOwned>(script: &str, blob: &str) -> ParsingResult<T> {
    let start = script
        .find(['{', '['])
        .ok_or_else(|| ParsingError::malformed_document(blob, "no JSON payload in script"))?;

    serde_json::Deserializer::from_str(&script[start..])
        .into_iter::<T>()
        .next()
        .ok_or_else(|| ParsingError::malformed_document(blob, "empty JSON payload"))?
        .map_err(|e| ParsingError::malformed_document(blob, e))
}

/// schema.org `brand` is either a name or a `{ "name": ... }` object
fn brand_name(brand: &Value) -> Option<String> {
    match brand {
        Value::Object(map) => map.get("name").and_then(json_text),
        other => json_text(other),
    }
}

fn json_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Drop markup from an HTML fragment, keeping its text
pub fn strip_html_tags(fragment: &str) -> String {
    Html::parse_fragment(fragment)
        .root_element()
        .text()
        .collect::<String>()
        .trim()
        .to_string()
}
