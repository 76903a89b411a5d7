//! # Per-product pipeline state
//!
//! Every product walks the same forward-only sequence of stages. A failure at
//! any non-terminal stage moves it to `Failed`; nothing moves backwards.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Stage of one product's two-step pipeline
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ProductStage {
    /// Page GET issued, body not yet received
    PageRequested,
    PageFetched,
    BaseFieldsExtracted,
    ImagesProbed,
    PricingRequested,
    /// Pricing and inventory answers are both in
    EnrichmentReceived,
    RecordEmitted,
    Failed,
}

impl ProductStage {
    fn position(self) -> Option<u8> {
        match self {
            Self::PageRequested => Some(0),
            Self::PageFetched => Some(1),
            Self::BaseFieldsExtracted => Some(2),
            Self::ImagesProbed => Some(3),
            Self::PricingRequested => Some(4),
            Self::EnrichmentReceived => Some(5),
            Self::RecordEmitted => Some(6),
            Self::Failed => None,
        }
    }

    #[must_use]
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::RecordEmitted | Self::Failed)
    }

    /// Only the immediate successor, or `Failed` from any non-terminal stage
    #[must_use]
    pub fn can_transition_to(self, next: Self) -> bool {
        if self.is_terminal() {
            return false;
        }
        match (self.position(), next.position()) {
            (_, None) => true,
            (Some(current), Some(target)) => target == current + 1,
            (None, Some(_)) => false,
        }
    }
}

impl fmt::Display for ProductStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::PageRequested => "page-requested",
            Self::PageFetched => "page-fetched",
            Self::BaseFieldsExtracted => "base-fields-extracted",
            Self::ImagesProbed => "images-probed",
            Self::PricingRequested => "pricing-requested",
            Self::EnrichmentReceived => "enrichment-received",
            Self::RecordEmitted => "record-emitted",
            Self::Failed => "failed",
        };
        f.write_str(name)
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Invalid stage transition {from} -> {to}")]
pub struct StageTransitionError {
    pub from: ProductStage,
    pub to: ProductStage,
}

/// Stage tracker for one product URL
#[derive(Debug, Clone)]
pub struct ProductProgress {
    url: String,
    stage: ProductStage,
}

impl ProductProgress {
    /// Tracker for a page that is already in hand
    pub fn new(url: &str) -> Self {
        Self::starting_at(url, ProductStage::PageFetched)
    }

    /// Tracker for a page that still has to be fetched
    pub fn requested(url: &str) -> Self {
        Self::starting_at(url, ProductStage::PageRequested)
    }

    fn starting_at(url: &str, stage: ProductStage) -> Self {
        Self {
            url: url.to_string(),
            stage,
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn stage(&self) -> ProductStage {
        self.stage
    }

    pub fn advance(&mut self, next: ProductStage) -> Result<(), StageTransitionError> {
        if !self.stage.can_transition_to(next) {
            return Err(StageTransitionError {
                from: self.stage,
                to: next,
            });
        }
        tracing::trace!("{}: {} -> {}", self.url, self.stage, next);
        self.stage = next;
        Ok(())
    }

    /// Move to `Failed`, returning the stage the failure happened in
    pub fn fail(&mut self) -> ProductStage {
        let failed_at = self.stage;
        if !self.stage.is_terminal() {
            self.stage = ProductStage::Failed;
        }
        failed_at
    }
}

/// Counters for one harvest run
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HarvestStats {
    pub products_total: usize,
    pub records_emitted: usize,
    pub products_failed: usize,
    /// Emitted records whose inventory lookup failed
    pub inventory_unavailable: usize,
    pub images_found: usize,
}

impl HarvestStats {
    /// Share of products that produced a record, 0.0..=1.0
    pub fn success_rate(&self) -> f64 {
        if self.products_total == 0 {
            return 0.0;
        }
        #[allow(clippy::cast_precision_loss)]
        let rate = self.records_emitted as f64 / self.products_total as f64;
        rate
    }
}
