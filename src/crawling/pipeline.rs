//! # Catalog harvesting pipeline
//!
//! Two stages per product:
//! 1. page stage: fetch (or accept) the product page, parse it, probe images
//! 2. enrichment stage: pricing GET and inventory POST, merged into the final record
//!
//! Products run concurrently up to `max_concurrent_products` and share no
//! mutable state. A failed product is reported in the `HarvestReport` and the
//! remaining products are unaffected.

#![allow(clippy::uninlined_format_args)]

use anyhow::Result;
use futures::stream::{self, StreamExt};
use std::sync::Arc;
use std::time::Instant;
use thiserror::Error;
use tracing::{debug, error, info, warn};

use super::state::{HarvestStats, ProductProgress, ProductStage, StageTransitionError};
use super::workers::{
    ForwardedHostHeader, HttpImageChecker, ImageProbe, InventoryClient, NoExtraHeaders,
    PricingClient, ProductRecordBuilder, RequestHeaderHook, WorkerError,
};
use crate::domain::product::{FinalProductRecord, InventoryStatus, PendingProductContext};
use crate::infrastructure::config::AppConfig;
use crate::infrastructure::http_client::HttpClient;
use crate::infrastructure::parsing::{
    AttributeResolver, ParsingError, ProductPageParser, aggregate_prices,
};

#[derive(Error, Debug, Clone, PartialEq)]
pub enum PipelineError {
    #[error("Failed to fetch product page {url}: {reason}")]
    PageFetch { url: String, reason: String },

    #[error(transparent)]
    Parsing(#[from] ParsingError),

    #[error("Pricing request failed for product {product_id}: {source}")]
    PricingFetch {
        product_id: String,
        #[source]
        source: WorkerError,
    },

    #[error("Pricing response for product {product_id} is unusable: {reason}")]
    PricingPayload { product_id: String, reason: String },

    #[error(transparent)]
    Stage(#[from] StageTransitionError),
}

/// A product that did not produce a record
#[derive(Debug, Clone)]
pub struct ProductFailure {
    pub url: String,
    /// Stage the product was in when it failed
    pub stage: ProductStage,
    pub error: PipelineError,
}

/// Outcome of one harvest run
#[derive(Debug, Default)]
pub struct HarvestReport {
    pub records: Vec<FinalProductRecord>,
    pub failures: Vec<ProductFailure>,
}

impl HarvestReport {
    pub fn stats(&self) -> HarvestStats {
        HarvestStats {
            products_total: self.records.len() + self.failures.len(),
            records_emitted: self.records.len(),
            products_failed: self.failures.len(),
            inventory_unavailable: self
                .records
                .iter()
                .filter(|r| r.in_stock == InventoryStatus::UNAVAILABLE_LABEL)
                .count(),
            images_found: self.records.iter().map(|r| r.product_images.len()).sum(),
        }
    }

    /// `true` when products were attempted and none produced a record
    pub fn all_failed(&self) -> bool {
        self.records.is_empty() && !self.failures.is_empty()
    }
}

pub struct CatalogPipeline {
    http_client: HttpClient,
    builder: ProductRecordBuilder,
    pricing: PricingClient,
    inventory: InventoryClient,
    max_concurrent_products: usize,
}

impl CatalogPipeline {
    pub fn new(
        http_client: HttpClient,
        builder: ProductRecordBuilder,
        pricing: PricingClient,
        inventory: InventoryClient,
        max_concurrent_products: usize,
    ) -> Self {
        Self {
            http_client,
            builder,
            pricing,
            inventory,
            max_concurrent_products: max_concurrent_products.max(1),
        }
    }

    /// Wire every worker from the application configuration
    pub fn from_config(config: &AppConfig) -> Result<Self> {
        config.validate()?;

        let http_client = HttpClient::with_config(config.http.clone())?;

        let parser = ProductPageParser::with_config(
            &config.parsing.product_page_selectors,
            AttributeResolver::new()?,
        )?;
        let checker = HttpImageChecker::new(http_client.clone().with_context_label("ImageProbe"));
        let image_probe = ImageProbe::new(Arc::new(checker), &config.endpoints, &config.pipeline);
        let builder = ProductRecordBuilder::new(parser, image_probe);

        let pricing = PricingClient::new(
            http_client.clone().with_context_label("Pricing"),
            &config.endpoints,
        );

        let header_hook: Arc<dyn RequestHeaderHook> = if config.pipeline.forwarded_host_spoofing {
            Arc::new(ForwardedHostHeader)
        } else {
            Arc::new(NoExtraHeaders)
        };
        let inventory = InventoryClient::new(
            http_client.clone().with_context_label("Inventory"),
            &config.endpoints,
            header_hook,
        );

        Ok(Self::new(
            http_client.with_context_label("ProductPage"),
            builder,
            pricing,
            inventory,
            config.pipeline.max_concurrent_products,
        ))
    }

    /// Fetch `url` and run both stages
    pub async fn process_url(&self, url: &str) -> Result<FinalProductRecord, ProductFailure> {
        let mut progress = ProductProgress::requested(url);
        let html = match self.http_client.fetch_html_string(url).await {
            Ok(html) => {
                progress
                    .advance(ProductStage::PageFetched)
                    .map_err(|e| Self::failure(&mut progress, e.into()))?;
                html
            }
            Err(e) => {
                let error = PipelineError::PageFetch {
                    url: url.to_string(),
                    reason: format!("{e:#}"),
                };
                return Err(Self::failure(&mut progress, error));
            }
        };
        self.run_stages(&html, &mut progress).await
    }

    /// Run both stages over an already-fetched page
    pub async fn process_page(&self, url: &str, html: &str) -> Result<FinalProductRecord, ProductFailure> {
        let mut progress = ProductProgress::new(url);
        self.run_stages(html, &mut progress).await
    }

    async fn run_stages(
        &self,
        html: &str,
        progress: &mut ProductProgress,
    ) -> Result<FinalProductRecord, ProductFailure> {
        let started = Instant::now();
        match self.page_then_enrichment(html, progress).await {
            Ok(record) => {
                debug!("✅ {} emitted in {:?}", progress.url(), started.elapsed());
                Ok(record)
            }
            Err(error) => Err(Self::failure(progress, error)),
        }
    }

    async fn page_then_enrichment(
        &self,
        html: &str,
        progress: &mut ProductProgress,
    ) -> Result<FinalProductRecord, PipelineError> {
        let page = self.builder.parse_page(html, progress.url())?;
        progress.advance(ProductStage::BaseFieldsExtracted)?;

        let images = self.builder.probe_images(&page).await?;
        let context = page.into_context(images);
        progress.advance(ProductStage::ImagesProbed)?;

        self.enrich(context, progress).await
    }

    /// Enrichment stage. Consumes the page context.
    async fn enrich(
        &self,
        context: PendingProductContext,
        progress: &mut ProductProgress,
    ) -> Result<FinalProductRecord, PipelineError> {
        progress.advance(ProductStage::PricingRequested)?;

        let pricing = self.pricing.fetch_pricing(&context.product_id);
        let inventory = async {
            match context.primary_sku() {
                Some(sku) => self.inventory.inventory_status(sku).await,
                None => InventoryStatus::Unavailable {
                    reason: "no SKU to look up".to_string(),
                },
            }
        };
        let (pricing, inventory) = tokio::join!(pricing, inventory);

        let document = pricing.map_err(|source| match source {
            WorkerError::ParseError(reason) => PipelineError::PricingPayload {
                product_id: context.product_id.clone(),
                reason,
            },
            source => PipelineError::PricingFetch {
                product_id: context.product_id.clone(),
                source,
            },
        })?;
        progress.advance(ProductStage::EnrichmentReceived)?;

        let prices = aggregate_prices(&document);
        if prices.is_empty() {
            warn!("No prices found for product {}", context.product_id);
        }

        let record = FinalProductRecord::assemble(context, prices, &inventory);
        progress.advance(ProductStage::RecordEmitted)?;
        Ok(record)
    }

    fn failure(progress: &mut ProductProgress, error: PipelineError) -> ProductFailure {
        let stage = progress.fail();
        match &error {
            PipelineError::Parsing(e) if e.indicates_layout_change() => warn!(
                "⚠️ {} skipped at {}: not a product page or the page layout changed ({})",
                progress.url(),
                stage,
                e
            ),
            _ => error!("❌ {} failed at {}: {}", progress.url(), stage, error),
        }
        ProductFailure {
            url: progress.url().to_string(),
            stage,
            error,
        }
    }

    /// Fetch and process every URL, at most `max_concurrent_products` at a time
    pub async fn run<I>(&self, urls: I) -> HarvestReport
    where
        I: IntoIterator<Item = String>,
    {
        let outcomes: Vec<_> = stream::iter(urls)
            .map(|url| async move { self.process_url(&url).await })
            .buffer_unordered(self.max_concurrent_products)
            .collect()
            .await;
        Self::report(outcomes)
    }

    /// Process already-fetched `(url, html)` pairs
    pub async fn run_pages<I>(&self, pages: I) -> HarvestReport
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let outcomes: Vec<_> = stream::iter(pages)
            .map(|(url, html)| async move { self.process_page(&url, &html).await })
            .buffer_unordered(self.max_concurrent_products)
            .collect()
            .await;
        Self::report(outcomes)
    }

    fn report(outcomes: Vec<Result<FinalProductRecord, ProductFailure>>) -> HarvestReport {
        let mut report = HarvestReport::default();
        for outcome in outcomes {
            match outcome {
                Ok(record) => report.records.push(record),
                Err(failure) => report.failures.push(failure),
            }
        }

        let stats = report.stats();
        info!(
            "📊 Harvest finished: {}/{} records ({:.0}%), {} failed, {} without inventory",
            stats.records_emitted,
            stats.products_total,
            stats.success_rate() * 100.0,
            stats.products_failed,
            stats.inventory_unavailable
        );
        report
    }
}
