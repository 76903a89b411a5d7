//! Inventory enrichment
//!
//! One POST per product. Stock status and quantity live at
//! `Body.ShowInventoryAvailability.DataArea.InventoryAvailability`.
//! A non-success response is logged and its body still parsed; when that body
//! does not carry the envelope the caller gets a typed error instead.

#![allow(clippy::uninlined_format_args)]

use serde_json::{Number, Value, json};
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, warn};

use super::header_hook::RequestHeaderHook;
use crate::domain::product::{InventorySnapshot, InventoryStatus};
use crate::infrastructure::config::EndpointConfig;
use crate::infrastructure::http_client::HttpClient;

const ENVELOPE_PATH: [&str; 4] = [
    "Body",
    "ShowInventoryAvailability",
    "DataArea",
    "InventoryAvailability",
];

#[derive(Error, Debug, Clone, PartialEq)]
pub enum InventoryError {
    #[error("Inventory request failed: {0}")]
    Transport(String),

    #[error("Inventory endpoint returned HTTP {status}: {body}")]
    HttpStatus { status: u16, body: String },

    #[error("Inventory response is not valid JSON: {0}")]
    InvalidBody(String),

    #[error("Inventory envelope is missing {missing}")]
    MalformedEnvelope { missing: String },
}

/// Read status and quantity out of an inventory response document
pub fn parse_inventory_envelope(document: &Value) -> Result<InventorySnapshot, InventoryError> {
    let mut node = document;
    for (depth, key) in ENVELOPE_PATH.iter().enumerate() {
        node = node.get(key).ok_or_else(|| InventoryError::MalformedEnvelope {
            missing: ENVELOPE_PATH[..=depth].join("."),
        })?;
    }

    let status = match node.get("InventoryStatus") {
        Some(Value::String(status)) => status.clone(),
        _ => {
            return Err(InventoryError::MalformedEnvelope {
                missing: format!("{}.InventoryStatus", ENVELOPE_PATH.join(".")),
            });
        }
    };

    let available_quantity = match node.get("AvailableQuantity") {
        Some(Value::Number(quantity)) => quantity.clone(),
        // some deployments quote the quantity
        Some(Value::String(text)) => serde_json::from_str::<Number>(text.trim()).map_err(|_| {
            InventoryError::MalformedEnvelope {
                missing: format!("numeric {}.AvailableQuantity", ENVELOPE_PATH.join(".")),
            }
        })?,
        _ => {
            return Err(InventoryError::MalformedEnvelope {
                missing: format!("{}.AvailableQuantity", ENVELOPE_PATH.join(".")),
            });
        }
    };

    Ok(InventorySnapshot {
        status,
        available_quantity,
    })
}

pub struct InventoryClient {
    http_client: HttpClient,
    url: String,
    unit_of_measure: String,
    enable_switch: String,
    header_hook: Arc<dyn RequestHeaderHook>,
}

impl InventoryClient {
    pub fn new(
        http_client: HttpClient,
        endpoints: &EndpointConfig,
        header_hook: Arc<dyn RequestHeaderHook>,
    ) -> Self {
        Self {
            http_client,
            url: endpoints.inventory_url.clone(),
            unit_of_measure: endpoints.unit_of_measure.clone(),
            enable_switch: endpoints.inventory_switch.clone(),
            header_hook,
        }
    }

    pub fn request_body(&self, sku: &str) -> Value {
        json!({
            "InventoryMicroServiceEnableSwitch": self.enable_switch,
            "Body": {
                "GetInventoryAvailability": {
                    "ApplicationArea": {
                        "BusinessContext": {
                            "ContextData": []
                        }
                    },
                    "PartNumber": sku,
                    "uom": self.unit_of_measure
                }
            }
        })
    }

    /// Fetch the stock snapshot for `sku`
    pub async fn fetch_inventory(&self, sku: &str) -> Result<InventorySnapshot, InventoryError> {
        let body = self.request_body(sku);
        let (status, text) = self
            .http_client
            .post_json(&self.url, &body, self.header_hook.extra_headers())
            .await
            .map_err(|e| InventoryError::Transport(e.to_string()))?;

        if !status.is_success() {
            warn!("⚠️ Inventory HTTP error {} for SKU {}: {}", status, sku, text);
            return serde_json::from_str::<Value>(&text)
                .ok()
                .and_then(|document| parse_inventory_envelope(&document).ok())
                .ok_or(InventoryError::HttpStatus {
                    status: status.as_u16(),
                    body: text,
                });
        }

        let document: Value =
            serde_json::from_str(&text).map_err(|e| InventoryError::InvalidBody(e.to_string()))?;
        let snapshot = parse_inventory_envelope(&document)?;
        debug!(
            "Inventory for SKU {}: {} ({})",
            sku, snapshot.status, snapshot.available_quantity
        );
        Ok(snapshot)
    }

    /// Like `fetch_inventory`, with failures folded into `InventoryStatus::Unavailable`
    pub async fn inventory_status(&self, sku: &str) -> InventoryStatus {
        match self.fetch_inventory(sku).await {
            Ok(snapshot) => InventoryStatus::Known(snapshot),
            Err(e) => {
                warn!("Inventory unavailable for SKU {}: {}", sku, e);
                InventoryStatus::Unavailable {
                    reason: e.to_string(),
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crawling::workers::header_hook::NoExtraHeaders;
    use crate::infrastructure::config::HttpConfig;

    fn envelope(status: Value, quantity: Value) -> Value {
        json!({
            "Body": {
                "ShowInventoryAvailability": {
                    "DataArea": {
                        "InventoryAvailability": {
                            "InventoryStatus": status,
                            "AvailableQuantity": quantity
                        }
                    }
                }
            }
        })
    }

    #[test]
    fn test_parse_well_formed_envelope() {
        let snapshot = parse_inventory_envelope(&envelope(json!("Available"), json!(12))).unwrap();
        assert_eq!(snapshot.status, "Available");
        assert_eq!(snapshot.available_quantity, Number::from(12));
    }

    #[test]
    fn test_quoted_quantity_is_accepted() {
        let snapshot = parse_inventory_envelope(&envelope(json!("Available"), json!(" 3 "))).unwrap();
        assert_eq!(snapshot.available_quantity, Number::from(3));
    }

    #[test]
    fn test_missing_level_is_reported() {
        let document = json!({ "Body": { "ShowInventoryAvailability": {} } });
        assert_eq!(
            parse_inventory_envelope(&document),
            Err(InventoryError::MalformedEnvelope {
                missing: "Body.ShowInventoryAvailability.DataArea".to_string()
            })
        );
    }

    #[test]
    fn test_error_body_without_envelope_is_malformed() {
        let document = json!({ "errors": [{ "message": "Forbidden" }] });
        assert!(matches!(
            parse_inventory_envelope(&document),
            Err(InventoryError::MalformedEnvelope { .. })
        ));
    }

    #[test]
    fn test_non_numeric_quantity_is_malformed() {
        assert!(parse_inventory_envelope(&envelope(json!("Available"), json!("many"))).is_err());
        assert!(parse_inventory_envelope(&envelope(json!(null), json!(1))).is_err());
    }

    #[test]
    fn test_request_body_shape() {
        let client = InventoryClient::new(
            HttpClient::with_config(HttpConfig::default()).unwrap(),
            &EndpointConfig::default(),
            Arc::new(NoExtraHeaders),
        );
        let body = client.request_body("123456");

        assert_eq!(body["InventoryMicroServiceEnableSwitch"], "ON");
        let request = &body["Body"]["GetInventoryAvailability"];
        assert_eq!(request["PartNumber"], "123456");
        assert_eq!(request["uom"], "C62");
        assert_eq!(request["ApplicationArea"]["BusinessContext"]["ContextData"], json!([]));
    }
}
