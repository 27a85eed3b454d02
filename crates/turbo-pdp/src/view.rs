//! Element lookups for a product section.

use turbo_dom::{Document, NodeId, Selector};

use crate::error::PdpError;

/// Every selector the controller queries, parsed once per controller.
#[derive(Debug, Clone)]
pub struct Selectors {
    pub product_id: Selector,
    pub message: Selector,
    pub price_without_tax: Selector,
    pub price_with_tax: Selector,
    pub price_saved: Selector,
    pub sku: Selector,
    pub weight: Selector,
    pub purchase_button: Selector,
    pub button_text: Selector,
    pub preorder: Selector,
    pub stock: Selector,
    pub quantity_change: Selector,
    pub quantity: Selector,
    pub quantity_input: Selector,
    pub quantity_increment: Selector,
    pub quantity_decrement: Selector,
    pub product_form: Selector,
    pub product_details: Selector,
    pub option_change: Selector,
    pub form: Selector,
    pub spinner: Selector,
    pub add_button_spinner: Selector,
    pub attribute_value: Selector,
    pub attribute: Selector,
}

impl Selectors {
    /// Parse the product section selectors.
    pub fn new() -> Result<Self, PdpError> {
        Ok(Self {
            product_id: Selector::parse("[data-product-id]")?,
            message: Selector::parse("[data-product-message]")?,
            price_without_tax: Selector::parse(r#"[data-product-price-wrapper="without-tax"]"#)?,
            price_with_tax: Selector::parse(r#"[data-product-price-wrapper="with-tax"]"#)?,
            price_saved: Selector::parse("[data-product-price-saved]")?,
            sku: Selector::parse("[data-product-sku]")?,
            weight: Selector::parse("[data-product-weight]")?,
            purchase_button: Selector::parse("[data-button-purchase]")?,
            button_text: Selector::parse("[data-button-text]")?,
            preorder: Selector::parse("[data-button-preorder]")?,
            stock: Selector::parse("[data-product-stock-level]")?,
            quantity_change: Selector::parse("[data-product-quantity-change]")?,
            quantity: Selector::parse("[data-product-quantity]")?,
            quantity_input: Selector::parse("[data-product-quantity-input]")?,
            quantity_increment: Selector::parse("[data-quantity-increment]")?,
            quantity_decrement: Selector::parse("[data-quantity-decrement]")?,
            product_form: Selector::parse("[data-product-form]")?,
            product_details: Selector::parse("[data-product-details]")?,
            option_change: Selector::parse("[data-product-option-change]")?,
            form: Selector::parse("form")?,
            spinner: Selector::parse(".spinner")?,
            add_button_spinner: Selector::parse(".product-add-button-wrapper .spinner")?,
            attribute_value: Selector::parse("[data-product-attribute-value]")?,
            attribute: Selector::parse("[data-product-attribute]")?,
        })
    }
}

/// The fragments an option-change response is written into.
///
/// Re-read from the document on every update so re-rendered markup is
/// picked up.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ViewModel {
    pub price: Vec<NodeId>,
    pub price_with_tax: Vec<NodeId>,
    pub saved: Vec<NodeId>,
    pub sku: Vec<NodeId>,
    pub weight: Vec<NodeId>,
    pub add_to_cart: Vec<NodeId>,
    pub stock: Vec<NodeId>,
}

impl ViewModel {
    /// Collect the fragments under `container`.
    pub fn read(doc: &Document, container: NodeId, selectors: &Selectors) -> Self {
        Self {
            price: doc.query_all(container, &selectors.price_without_tax),
            price_with_tax: doc.query_all(container, &selectors.price_with_tax),
            saved: doc.query_all(container, &selectors.price_saved),
            sku: doc.query_all(container, &selectors.sku),
            weight: doc.query_all(container, &selectors.weight),
            add_to_cart: doc.query_all(container, &selectors.purchase_button),
            stock: doc.query_all(container, &selectors.stock),
        }
    }
}
