//! Infrastructure layer for HTTP transport, parsing, configuration and logging
//!
//! Everything here is independent of the pipeline's stage ordering; the
//! crawling layer composes these pieces.

pub mod config;
pub mod http_client;
pub mod logging;
pub mod parsing;
pub mod parsing_error;

// Re-export commonly used items
pub use config::{AppConfig, ConfigManager, EndpointConfig, HttpConfig, LoggingConfig, PipelineConfig};
pub use http_client::HttpClient;
pub use logging::{get_log_directory, init_logging_with_config};
pub use parsing::{ParsingConfig, ParsingError, ParsingResult, ProductPageParser};
