use serde::{Deserialize, Serialize};
use serde_json::{Number, Value};

/// A single value entry attached to a descriptive attribute
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ValueRecord {
    #[serde(default)]
    pub value: Value,
}

impl ValueRecord {
    pub fn new(value: impl Into<Value>) -> Self {
        Self { value: value.into() }
    }

    /// Render the primitive value as text; null and structured values yield `None`
    pub fn as_text(&self) -> Option<String> {
        match &self.value {
            Value::String(s) => Some(s.clone()),
            Value::Number(n) => Some(n.to_string()),
            Value::Bool(b) => Some(b.to_string()),
            Value::Null | Value::Array(_) | Value::Object(_) => None,
        }
    }
}

/// Named descriptive entry from the pdp-data blob (e.g. "Color")
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DescriptiveAttribute {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(rename = "attributeValueDataBeans", default)]
    pub values: Option<Vec<ValueRecord>>,
}

impl DescriptiveAttribute {
    pub fn new(name: &str, values: &[&str]) -> Self {
        Self {
            name: Some(name.to_string()),
            values: Some(values.iter().map(|v| ValueRecord::new(*v)).collect()),
        }
    }

    /// First value record's value, ties broken by document order
    pub fn first_value(&self) -> Option<String> {
        self.values
            .as_ref()
            .and_then(|values| values.first())
            .and_then(ValueRecord::as_text)
    }
}

/// The `pdp-data` blob, reduced to the part the resolver consumes
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PdpData {
    #[serde(rename = "productDetailsData", default)]
    pub product_details_data: Option<ProductDetailsData>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProductDetailsData {
    #[serde(rename = "descriptiveAttributes", default)]
    pub descriptive_attributes: Option<Vec<DescriptiveAttribute>>,
}

impl PdpData {
    pub fn into_attributes(self) -> Vec<DescriptiveAttribute> {
        self.product_details_data
            .and_then(|data| data.descriptive_attributes)
            .unwrap_or_default()
    }
}

/// One candidate image: base (`variant_suffix` empty) or an `__altN` alternate
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageCandidate {
    pub sku: String,
    pub variant_suffix: String,
}

impl ImageCandidate {
    pub fn base(sku: &str) -> Self {
        Self {
            sku: sku.to_string(),
            variant_suffix: String::new(),
        }
    }

    pub fn alternate(sku: &str, index: u8) -> Self {
        Self {
            sku: sku.to_string(),
            variant_suffix: format!("__alt{index}"),
        }
    }

    /// Expand a URL template with `{domain}`, `{sku}` and `{suffix}` placeholders
    pub fn to_url(&self, template: &str, domain: &str) -> String {
        template
            .replace("{domain}", domain)
            .replace("{sku}", &self.sku)
            .replace("{suffix}", &self.variant_suffix)
    }
}

/// Distinct numeric values, deduplicated by numeric equality (`10` == `10.0`)
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct PriceSet(Vec<Number>);

impl PriceSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `true` if the value was not present yet
    pub fn insert(&mut self, value: Number) -> bool {
        if self.contains(&value) {
            return false;
        }
        self.0.push(value);
        true
    }

    pub fn contains(&self, value: &Number) -> bool {
        self.0.iter().any(|existing| numbers_equal(existing, value))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Number> {
        self.0.iter()
    }

    pub fn into_vec(self) -> Vec<Number> {
        self.0
    }

    /// Values as `f64`, for callers that only need arithmetic
    pub fn as_f64_values(&self) -> Vec<f64> {
        self.0.iter().filter_map(Number::as_f64).collect()
    }
}

fn numbers_equal(a: &Number, b: &Number) -> bool {
    match (a.as_i64(), b.as_i64()) {
        (Some(x), Some(y)) => x == y,
        _ => match (a.as_u64(), b.as_u64()) {
            (Some(x), Some(y)) => x == y,
            _ => a.as_f64() == b.as_f64(),
        },
    }
}

/// Stock snapshot read from the inventory envelope
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InventorySnapshot {
    pub status: String,
    pub available_quantity: Number,
}

/// Inventory outcome carried on the final record
#[derive(Debug, Clone, PartialEq)]
pub enum InventoryStatus {
    Known(InventorySnapshot),
    /// The inventory endpoint failed or answered without the expected envelope
    Unavailable { reason: String },
}

impl InventoryStatus {
    pub const UNAVAILABLE_LABEL: &'static str = "unavailable";

    pub fn status_label(&self) -> String {
        match self {
            Self::Known(snapshot) => snapshot.status.clone(),
            Self::Unavailable { .. } => Self::UNAVAILABLE_LABEL.to_string(),
        }
    }

    pub fn available_quantity(&self) -> Option<Number> {
        match self {
            Self::Known(snapshot) => Some(snapshot.available_quantity.clone()),
            Self::Unavailable { .. } => None,
        }
    }
}

/// In-flight record assembled from the product page, before pricing/inventory enrichment.
///
/// Moved by value from the page stage into the enrichment stage; nothing else holds it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PendingProductContext {
    /// Every numeric token of the item-id marker, in page order
    pub sku_tokens: Vec<String>,
    pub title: Option<String>,
    pub category: String,
    pub brand: Option<String>,
    pub color: Option<String>,
    pub model_number: Option<String>,
    pub size: Option<String>,
    pub upc: Option<String>,
    pub link: String,
    pub description: Option<String>,
    pub mpn: Option<String>,
    pub product_dimensions: Option<String>,
    pub item_weight: Option<String>,
    pub package_dimensions: Option<String>,
    pub shipping_weight: Option<String>,
    pub product_images: Vec<String>,
    /// Trailing path segment of the page URL, used by the pricing API
    pub product_id: String,
}

impl PendingProductContext {
    /// Primary SKU: the first numeric token
    pub fn primary_sku(&self) -> Option<&str> {
        self.sku_tokens.first().map(String::as_str)
    }
}

/// Final, emitted product record. Serializes with the feed's field names.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FinalProductRecord {
    #[serde(rename = "SKU")]
    pub sku: Vec<String>,
    #[serde(rename = "Title")]
    pub title: Option<String>,
    #[serde(rename = "Category")]
    pub category: String,
    #[serde(rename = "Brand")]
    pub brand: Option<String>,
    #[serde(rename = "Color")]
    pub color: Option<String>,
    #[serde(rename = "Model Number")]
    pub model_number: Option<String>,
    #[serde(rename = "Size")]
    pub size: Option<String>,
    #[serde(rename = "UPC")]
    pub upc: Option<String>,
    #[serde(rename = "Link")]
    pub link: String,
    #[serde(rename = "Description")]
    pub description: Option<String>,
    #[serde(rename = "MPN")]
    pub mpn: Option<String>,
    #[serde(rename = "Product Dimensions")]
    pub product_dimensions: Option<String>,
    #[serde(rename = "Item Weight")]
    pub item_weight: Option<String>,
    #[serde(rename = "Package Dimensions")]
    pub package_dimensions: Option<String>,
    #[serde(rename = "Shipping Weight")]
    pub shipping_weight: Option<String>,
    #[serde(rename = "Product Images")]
    pub product_images: Vec<String>,
    #[serde(rename = "Price")]
    pub price: PriceSet,
    #[serde(rename = "In Stock")]
    pub in_stock: String,
    #[serde(rename = "Available Quantity")]
    pub available_quantity: Option<Number>,
    // reserved
    #[serde(rename = "Condition")]
    pub condition: String,
    #[serde(rename = "Bullet Points")]
    pub bullet_points: String,
}

impl FinalProductRecord {
    /// Merge the page context with the enrichment results. Consumes the context.
    pub fn assemble(
        context: PendingProductContext,
        price: PriceSet,
        inventory: &InventoryStatus,
    ) -> Self {
        Self {
            sku: context.sku_tokens,
            title: context.title,
            category: context.category,
            brand: context.brand,
            color: context.color,
            model_number: context.model_number,
            size: context.size,
            upc: context.upc,
            link: context.link,
            description: context.description,
            mpn: context.mpn,
            product_dimensions: context.product_dimensions,
            item_weight: context.item_weight,
            package_dimensions: context.package_dimensions,
            shipping_weight: context.shipping_weight,
            product_images: context.product_images,
            price,
            in_stock: inventory.status_label(),
            available_quantity: inventory.available_quantity(),
            condition: String::new(),
            bullet_points: String::new(),
        }
    }
}
