//! Shared fixtures for the HTTP-facing integration tests

#![allow(dead_code)]

use catalog_harvester_lib::infrastructure::config::{AppConfig, HttpConfig};
use serde_json::{Value, json};

pub const PRODUCT_PATH: &str = "/product/acme-widget-pro/3000123";
pub const PRODUCT_ID: &str = "3000123";
pub const SKU: &str = "123456";

/// Configuration with every endpoint pointed at `base_uri`
pub fn config_for(base_uri: &str) -> AppConfig {
    let mut config = AppConfig::default();
    config.http = HttpConfig {
        max_retries: 2,
        retry_base_delay_ms: 1,
        timeout_seconds: 5,
        ..Default::default()
    };
    config.endpoints.pricing_url_template =
        format!("{base_uri}/price/{{catalog_id}}?productId={{product_id}}&pageName=PDP");
    config.endpoints.inventory_url = format!("{base_uri}/inventory/club");
    config.endpoints.image_url_template = format!("{base_uri}/is/image/{{domain}}/{{sku}}{{suffix}}?$Zoom$");
    config
}

pub fn image_path(sku: &str, suffix: &str) -> String {
    format!("/is/image/catalog/{sku}{suffix}")
}

pub fn inventory_envelope(status: &str, quantity: i64) -> Value {
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

/// Product page carrying both embedded blobs and `attributes` as the pdp-data attribute bag
pub fn product_page(attributes: &Value) -> String {
    let pdp = json!({ "productDetailsData": { "descriptiveAttributes": attributes } });
    format!(
        r#"<!DOCTYPE html><html><head>
        <script data-rh="true" type="application/ld+json">{{"@context":"https://schema.org","@type":"Product","mpn":"MPN-77","brand":{{"@type":"Brand","name":"Acme"}},"description":"<p>Sturdy <b>widget</b></p>"}}</script>
        </head><body>
        <ol>
          <li><a auto-data="product_bread_crumbL1">Home</a></li>
          <li><a auto-data="product_bread_crumbL2">Tools</a></li>
          <li><a auto-data="product_bread_crumbL3">Power Tools</a></li>
        </ol>
        <h1 auto-data="product_name">Acme Widget Pro</h1>
        <p auto-data="product_ItemId">Item: {SKU}</p>
        <div id="pdp-data"><script>window.__PRELOADED_STATE__ = {pdp};</script></div>
        </body></html>"#
    )
}

pub fn attribute(name: &str, value: &str) -> Value {
    json!({ "name": name, "attributeValueDataBeans": [{ "value": value }] })
}
