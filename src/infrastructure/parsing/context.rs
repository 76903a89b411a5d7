//! Parsing context for product page extraction

use url::Url;

use super::{ParsingError, ParsingResult};

/// Context information for parsing one product detail page
#[derive(Debug, Clone)]
pub struct DetailParseContext {
    /// Product URL being parsed
    pub url: String,

    /// Trailing path segment of `url`, the pricing API's product id
    pub product_id: String,
}

impl DetailParseContext {
    /// Create a context for `url`; fails when no product id can be derived from it
    pub fn new(url: &str) -> ParsingResult<Self> {
        let product_id = product_id_from_url(url)?;
        Ok(Self {
            url: url.to_string(),
            product_id,
        })
    }
}

/// Last non-empty path segment of `url`, ignoring query and fragment
pub fn product_id_from_url(url: &str) -> ParsingResult<String> {
    let parsed = Url::parse(url).map_err(|e| ParsingError::UrlResolutionFailed {
        url: url.to_string(),
        reason: e.to_string(),
    })?;

    parsed
        .path_segments()
        .and_then(|segments| segments.filter(|s| !s.is_empty()).last())
        .map(ToString::to_string)
        .ok_or_else(|| ParsingError::UrlResolutionFailed {
            url: url.to_string(),
            reason: "URL has no path segment to use as product id".to_string(),
        })
}
