//! Page stage of the pipeline: parse the product page, then probe its images.

#![allow(clippy::uninlined_format_args)]

use tracing::debug;

use super::image_probe::ImageProbe;
use crate::domain::product::PendingProductContext;
use crate::infrastructure::parsing::{
    DetailParseContext, ParsedProductPage, ParsingError, ParsingResult, ProductPageParser,
};

pub struct ProductRecordBuilder {
    parser: ProductPageParser,
    image_probe: ImageProbe,
}

impl ProductRecordBuilder {
    pub fn new(parser: ProductPageParser, image_probe: ImageProbe) -> Self {
        Self {
            parser,
            image_probe,
        }
    }

    /// Parse only; no network access
    pub fn parse_page(&self, html: &str, url: &str) -> ParsingResult<ParsedProductPage> {
        let context = DetailParseContext::new(url)?;
        self.parser.parse(html, &context)
    }

    /// Parse `html` fetched from `url` and attach the images that exist for its primary SKU
    pub async fn build_pending_context(
        &self,
        html: &str,
        url: &str,
    ) -> ParsingResult<PendingProductContext> {
        let page = self.parse_page(html, url)?;
        let images = self.probe_images(&page).await?;
        Ok(page.into_context(images))
    }

    /// Image stage for an already-parsed page
    pub async fn probe_images(&self, page: &ParsedProductPage) -> ParsingResult<Vec<String>> {
        let sku = page
            .primary_sku()
            .ok_or_else(|| ParsingError::required_field_missing("sku", Some(page.link.as_str())))?;
        debug!("Probing images for SKU {} ({})", sku, page.link);
        Ok(self.image_probe.find_valid_images(sku).await)
    }
}
