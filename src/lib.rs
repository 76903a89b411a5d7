//! catalog-harvester - product catalog extraction and enrichment
//!
//! Turns product detail pages into normalized product records: page fields and
//! descriptive attributes from the HTML and its embedded JSON, validated image
//! URLs, deduplicated prices and inventory status from the catalog APIs.

pub mod crawling;
pub mod domain;
pub mod infrastructure;

pub use crawling::{CatalogPipeline, HarvestReport};
pub use domain::product::FinalProductRecord;
