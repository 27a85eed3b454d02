//! Localized strings and links the page hands to the controller.

use serde::{Deserialize, Serialize};

use crate::error::PdpError;

/// Theme context for product sections.
///
/// Deserialized from the page's JSON context, whose keys are camelCase
/// (`addToCart`, `urlsCart`, `priceYouSave`, ...). Missing keys default to
/// empty strings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ProductContext {
    /// Purchase button label.
    pub add_to_cart: String,
    /// Purchase button label for pre-order products.
    pub pre_order: String,
    /// Purchase button label when unavailable.
    pub sold_out: String,
    /// Success message template with `*product*`, `*cart_link*`,
    /// `*continue_link*` and `*checkout_link*` tokens.
    pub add_success: String,
    pub urls_cart: String,
    pub urls_checkout: String,
    pub cart_link: String,
    pub home_link: String,
    pub checkout_link: String,
    pub excluding_tax: String,
    pub including_tax: String,
    pub price_you_save: String,
}

impl ProductContext {
    /// Decode the page's JSON context.
    pub fn from_json(json: &str) -> Result<Self, PdpError> {
        Ok(serde_json::from_str(json)?)
    }
}
