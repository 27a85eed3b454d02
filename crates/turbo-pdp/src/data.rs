//! Data returned by the storefront remote endpoints.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Identifier of the product a page section renders.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ProductId(String);

impl ProductId {
    /// Create a new ID from a string.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Get the ID as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ProductId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for ProductId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// A price as both a display string and a number.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PriceValue {
    #[serde(default)]
    pub formatted: String,
    #[serde(default)]
    pub value: f64,
}

/// Price variants for the currently selected options.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PriceData {
    #[serde(default)]
    pub without_tax: Option<PriceValue>,
    #[serde(default)]
    pub with_tax: Option<PriceValue>,
    #[serde(default)]
    pub rrp_without_tax: Option<PriceValue>,
    #[serde(default)]
    pub rrp_with_tax: Option<PriceValue>,
    #[serde(default)]
    pub saved: Option<PriceValue>,
    #[serde(default)]
    pub tax_label: Option<String>,
}

/// Shipping weight.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Weight {
    #[serde(default)]
    pub formatted: String,
    #[serde(default)]
    pub value: f64,
}

/// Hero image for the selected variant. `data` is a URL template.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageData {
    pub data: String,
    #[serde(default)]
    pub alt: String,
}

/// How out-of-stock option values are presented.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutOfStockBehavior {
    /// Hide unavailable values.
    HideOption,
    /// Keep unavailable values visible but marked.
    LabelOption,
    /// Leave values alone.
    #[default]
    #[serde(other)]
    DoNothing,
}

impl OutOfStockBehavior {
    /// Whether availability reconciliation applies at all.
    pub fn is_active(self) -> bool {
        matches!(self, Self::HideOption | Self::LabelOption)
    }
}

/// Response of the option-change endpoint.
///
/// Every field is optional on the wire. Absent fields deserialize to
/// `None`, `false` or empty, and absent fragments are left untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OptionChangeData {
    pub price: Option<PriceData>,
    pub stock: Option<i64>,
    pub sku: Option<String>,
    pub weight: Option<Weight>,
    pub image: Option<ImageData>,
    pub purchasing_message: Option<String>,
    pub purchasable: bool,
    pub instock: bool,
    pub out_of_stock_behavior: Option<OutOfStockBehavior>,
    pub in_stock_attributes: Vec<u64>,
    pub out_of_stock_message: Option<String>,
}

impl OptionChangeData {
    /// Stock level when it should be shown (present and non-zero).
    pub fn visible_stock(&self) -> Option<i64> {
        self.stock.filter(|level| *level != 0)
    }

    /// Whether the purchase button should be enabled.
    pub fn can_purchase(&self) -> bool {
        self.purchasable && self.instock
    }

    /// Effective out-of-stock behaviour.
    pub fn behavior(&self) -> OutOfStockBehavior {
        self.out_of_stock_behavior.unwrap_or_default()
    }

    /// Whether an attribute value id is in stock.
    pub fn is_in_stock(&self, value_id: u64) -> bool {
        self.in_stock_attributes.contains(&value_id)
    }
}

/// Response of the cart-add endpoint.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CartAddData {
    /// Set when the cart refused the item.
    pub error: Option<String>,
    pub cart_id: Option<String>,
    /// The added line item, passed through untouched.
    pub cart_item: Option<serde_json::Value>,
}

impl CartAddData {
    /// The cart's refusal message, if any.
    pub fn error_message(&self) -> Option<&str> {
        self.error.as_deref().filter(|e| !e.is_empty())
    }
}
