//! Configuration infrastructure
//!
//! Contains configuration loading and management for catalog harvesting.
//!
//! Configuration is organized into five sections:
//! 1. HTTP transport settings (timeouts, retries, default headers)
//! 2. Endpoint templates (pricing, inventory, image host)
//! 3. Pipeline behaviour (concurrency, probing mode)
//! 4. Product page selectors
//! 5. Logging

#![allow(clippy::uninlined_format_args)]

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{info, warn};

use crate::infrastructure::parsing::ParsingConfig;

/// Complete application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub http: HttpConfig,
    pub endpoints: EndpointConfig,
    pub pipeline: PipelineConfig,
    pub parsing: ParsingConfig,
    pub logging: LoggingConfig,
}

/// HTTP transport settings shared by every request the harvester issues
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HttpConfig {
    pub user_agent: String,

    /// Request timeout in seconds
    pub timeout_seconds: u64,

    /// Attempts for page and pricing GETs (HEAD probes are never retried)
    pub max_retries: u32,

    /// Base delay for exponential backoff between retries
    pub retry_base_delay_ms: u64,

    pub follow_redirects: bool,
    pub max_redirects: usize,

    /// Headers sent with every request (Accept, Referer, ...)
    pub default_headers: BTreeMap<String, String>,
}

/// Endpoint templates for the auxiliary APIs
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EndpointConfig {
    /// Pricing API template with `{catalog_id}` and `{product_id}` placeholders
    pub pricing_url_template: String,
    pub catalog_id: String,

    /// Inventory API endpoint (POST)
    pub inventory_url: String,

    /// Image template with `{domain}`, `{sku}` and `{suffix}` placeholders
    pub image_url_template: String,
    pub image_domain: String,

    /// Unit-of-measure code sent in the inventory request
    pub unit_of_measure: String,

    /// Value of `InventoryMicroServiceEnableSwitch`
    pub inventory_switch: String,
}

/// Pipeline behaviour
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Products processed at the same time
    pub max_concurrent_products: usize,

    /// Probe the image candidates of one product concurrently
    pub probe_images_concurrently: bool,

    /// Number of `__altN` alternates probed after the base image (at most 8)
    pub image_alternate_count: u8,

    /// Send a random `x-forwarded-host` header with inventory requests
    pub forwarded_host_spoofing: bool,
}

/// Logging configuration settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level: "error", "warn", "info", "debug", "trace"
    pub level: String,

    /// Enable JSON formatted logs (file output only)
    pub json_format: bool,

    pub console_output: bool,
    pub file_output: bool,

    /// Log directory; defaults to `logs/` next to the executable
    pub log_dir: Option<PathBuf>,

    pub file_name: String,

    /// Number of log files to keep (older files will be deleted)
    pub max_files: u32,

    /// Enable automatic log cleanup on startup
    pub auto_cleanup_logs: bool,

    /// Module-specific log level filters (e.g., "reqwest": "warn")
    pub module_filters: BTreeMap<String, String>,
}

impl Default for HttpConfig {
    fn default() -> Self {
        let default_headers = defaults::DEFAULT_HEADERS
            .iter()
            .map(|(name, value)| ((*name).to_string(), (*value).to_string()))
            .collect();

        Self {
            user_agent: defaults::USER_AGENT.to_string(),
            timeout_seconds: defaults::REQUEST_TIMEOUT_SECONDS,
            max_retries: defaults::MAX_RETRIES,
            retry_base_delay_ms: defaults::RETRY_BASE_DELAY_MS,
            follow_redirects: true,
            max_redirects: defaults::MAX_REDIRECTS,
            default_headers,
        }
    }
}

impl Default for EndpointConfig {
    fn default() -> Self {
        Self {
            pricing_url_template: catalog_api::PRICING_URL_TEMPLATE.to_string(),
            catalog_id: catalog_api::CATALOG_ID.to_string(),
            inventory_url: catalog_api::INVENTORY_URL.to_string(),
            image_url_template: catalog_api::IMAGE_URL_TEMPLATE.to_string(),
            image_domain: catalog_api::IMAGE_DOMAIN.to_string(),
            unit_of_measure: catalog_api::UNIT_OF_MEASURE.to_string(),
            inventory_switch: catalog_api::INVENTORY_SWITCH.to_string(),
        }
    }
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            max_concurrent_products: defaults::MAX_CONCURRENT_PRODUCTS,
            probe_images_concurrently: true,
            image_alternate_count: defaults::IMAGE_ALTERNATE_COUNT,
            forwarded_host_spoofing: false,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: defaults::LOG_LEVEL.to_string(),
            json_format: false,
            console_output: true,
            file_output: true,
            log_dir: None,
            file_name: defaults::LOG_FILE_NAME.to_string(),
            max_files: defaults::LOG_MAX_FILES,
            auto_cleanup_logs: true,
            module_filters: BTreeMap::new(),
        }
    }
}

impl EndpointConfig {
    pub fn pricing_url(&self, product_id: &str) -> String {
        self.pricing_url_template
            .replace("{catalog_id}", &self.catalog_id)
            .replace("{product_id}", product_id)
    }
}

impl AppConfig {
    /// Reject values the pipeline cannot run with
    pub fn validate(&self) -> Result<()> {
        if self.pipeline.max_concurrent_products == 0 {
            anyhow::bail!("pipeline.max_concurrent_products must be greater than 0");
        }
        if self.pipeline.image_alternate_count > defaults::IMAGE_ALTERNATE_COUNT {
            anyhow::bail!(
                "pipeline.image_alternate_count must be at most {}",
                defaults::IMAGE_ALTERNATE_COUNT
            );
        }
        if !self.endpoints.image_url_template.contains("{sku}") {
            anyhow::bail!("endpoints.image_url_template must contain a {{sku}} placeholder");
        }
        if !self.endpoints.pricing_url_template.contains("{product_id}") {
            anyhow::bail!("endpoints.pricing_url_template must contain a {{product_id}} placeholder");
        }
        Ok(())
    }
}

/// Configuration manager for loading and saving settings
pub struct ConfigManager {
    config_path: PathBuf,
}

impl ConfigManager {
    /// Get the application configuration directory
    pub fn get_config_dir() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .context("Failed to get user config directory")?
            .join("catalog-harvester");

        Ok(config_dir)
    }

    /// Create a configuration manager pointing at the user config directory
    pub fn new() -> Result<Self> {
        let config_dir = Self::get_config_dir()?;
        Ok(Self::with_path(config_dir.join("config.json")))
    }

    pub fn with_path(config_path: impl Into<PathBuf>) -> Self {
        Self {
            config_path: config_path.into(),
        }
    }

    /// Load configuration from file, creating default if it doesn't exist
    pub async fn load_config(&self) -> Result<AppConfig> {
        if !self.config_path.exists() {
            info!("Configuration file not found, creating default: {:?}", self.config_path);
            let default_config = AppConfig::default();
            self.save_config(&default_config).await?;
            return Ok(default_config);
        }

        let content = fs::read_to_string(&self.config_path)
            .await
            .context("Failed to read configuration file")?;

        match serde_json::from_str::<AppConfig>(&content) {
            Ok(config) => {
                config.validate()?;
                info!("Loaded configuration from: {:?}", self.config_path);
                Ok(config)
            }
            Err(parse_error) => {
                warn!("⚠️  Configuration file is not valid: {}", parse_error);
                warn!("⚠️  Resetting to default configuration");

                let backup_path = self.config_path.with_extension("json.corrupted");
                if let Err(e) = fs::copy(&self.config_path, &backup_path).await {
                    warn!("Failed to create backup of corrupted config: {}", e);
                } else {
                    info!("Backed up corrupted config to: {:?}", backup_path);
                }

                let default_config = AppConfig::default();
                self.save_config(&default_config)
                    .await
                    .context("Failed to save default configuration")?;
                Ok(default_config)
            }
        }
    }

    /// Save configuration to file
    pub async fn save_config(&self, config: &AppConfig) -> Result<()> {
        if let Some(parent) = self.config_path.parent() {
            fs::create_dir_all(parent)
                .await
                .context("Failed to create config directory")?;
        }

        let content =
            serde_json::to_string_pretty(config).context("Failed to serialize configuration")?;

        fs::write(&self.config_path, content)
            .await
            .context("Failed to write configuration file")?;

        info!("Saved configuration to: {:?}", self.config_path);
        Ok(())
    }

    pub fn config_path(&self) -> &Path {
        &self.config_path
    }
}

/// Catalog API URLs and fixed request constants
pub mod catalog_api {
    pub const PRICING_URL_TEMPLATE: &str = "https://api.example.com/digital/live/api/v1.0/product/price/{catalog_id}?productId={product_id}&pageName=PDP";

    /// Catalog (club) identifier used by the pricing endpoint
    pub const CATALOG_ID: &str = "10201";

    pub const INVENTORY_URL: &str = "https://api.example.com/digital/live/api/v1.2/inventory/club";

    pub const IMAGE_URL_TEMPLATE: &str = "https://images.example.com/is/image/{domain}/{sku}{suffix}?$Zoom$";

    pub const IMAGE_DOMAIN: &str = "catalog";

    /// "C62" = one (unit)
    pub const UNIT_OF_MEASURE: &str = "C62";

    pub const INVENTORY_SWITCH: &str = "ON";
}

/// Default configuration values
pub mod defaults {
    pub const USER_AGENT: &str = "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/118.0.0.0 Safari/537.36";

    pub const DEFAULT_HEADERS: &[(&str, &str)] = &[
        ("Accept", "application/json, text/plain, */*"),
        ("Accept-Language", "en-GB,en;q=0.9"),
        ("Referer", "https://www.example.com/"),
        ("Sec-Fetch-Mode", "cors"),
        ("Sec-Fetch-Site", "same-site"),
    ];

    /// `Accept` for product page GETs; `DEFAULT_HEADERS` targets the JSON APIs
    pub const PAGE_ACCEPT: &str = "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8";

    pub const REQUEST_TIMEOUT_SECONDS: u64 = 30;

    pub const MAX_RETRIES: u32 = 3;

    pub const RETRY_BASE_DELAY_MS: u64 = 1000;

    pub const MAX_REDIRECTS: usize = 10;

    pub const MAX_CONCURRENT_PRODUCTS: usize = 4;

    /// Alternates `__alt1`..`__alt8`
    pub const IMAGE_ALTERNATE_COUNT: u8 = 8;

    pub const LOG_LEVEL: &str = "info";

    pub const LOG_FILE_NAME: &str = "catalog-harvester.log";

    pub const LOG_MAX_FILES: u32 = 5;
}
