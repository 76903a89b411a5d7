//! # Crawling module
//!
//! Per-product pipeline composed from the enrichment workers, with the stage
//! tracking used to report where a product failed.

pub mod pipeline;
pub mod state;
pub mod workers;

pub use pipeline::{CatalogPipeline, HarvestReport, PipelineError, ProductFailure};
pub use state::{HarvestStats, ProductProgress, ProductStage, StageTransitionError};
pub use workers::{
    ImageProbe, InventoryClient, InventoryError, PricingClient, ProductRecordBuilder, WorkerError,
};
