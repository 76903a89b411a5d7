//! # Enrichment workers
//!
//! Each worker owns one network-facing concern of the per-product pipeline:
//! - `ImageProbe`: HEAD checks over the candidate image URLs
//! - `InventoryClient`: the inventory POST and its envelope
//! - `PricingClient`: the pricing GET
//! - `ProductRecordBuilder`: page parse followed by image probing
//!
//! Workers never share mutable state; one instance serves every product.

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub mod header_hook;
pub mod image_probe;
pub mod inventory_client;
pub mod pricing_client;
pub mod product_record_builder;

pub use header_hook::{ForwardedHostHeader, NoExtraHeaders, RequestHeaderHook};
pub use image_probe::{HttpImageChecker, ImageExistenceCheck, ImageProbe, ProbeOutcome};
pub use inventory_client::{InventoryClient, InventoryError, parse_inventory_envelope};
pub use pricing_client::PricingClient;
pub use product_record_builder::ProductRecordBuilder;

/// Worker error type
#[derive(Error, Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum WorkerError {
    #[error("Network error: {0}")]
    NetworkError(String),

    #[error("HTTP error {0}: {1}")]
    HttpError(u16, String),

    #[error("Parse error: {0}")]
    ParseError(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),
}
