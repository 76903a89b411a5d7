//! Domain module - product record model
//!
//! Entities shared by the page-extraction stage and the enrichment stage.

pub mod product;

pub use product::{
    DescriptiveAttribute, FinalProductRecord, ImageCandidate, InventorySnapshot,
    InventoryStatus, PdpData, PendingProductContext, PriceSet, ValueRecord,
};
