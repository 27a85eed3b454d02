//! Markup templates for the price fragments.

use std::fmt;
use std::rc::Rc;

use crate::data::{PriceData, PriceValue};

/// Input handed to a price template.
#[derive(Debug, Clone, PartialEq)]
pub struct PriceStrings {
    /// Prices for the current selection.
    pub price: PriceData,
    /// Localized label for this fragment ("Excl. tax", "You save", ...).
    pub label: String,
}

/// Renders a price fragment's inner markup.
pub type PriceTemplate = Rc<dyn Fn(&PriceStrings) -> String>;

/// The three price templates a controller renders through.
#[derive(Clone)]
pub struct PriceTemplates {
    pub without_tax: PriceTemplate,
    pub with_tax: PriceTemplate,
    pub saved: PriceTemplate,
}

impl fmt::Debug for PriceTemplates {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PriceTemplates").finish_non_exhaustive()
    }
}

impl Default for PriceTemplates {
    fn default() -> Self {
        Self {
            without_tax: Rc::new(|strings| render(strings.price.without_tax.as_ref(), &strings.label)),
            with_tax: Rc::new(|strings| render(strings.price.with_tax.as_ref(), &strings.label)),
            saved: Rc::new(|strings| render(strings.price.saved.as_ref(), &strings.label)),
        }
    }
}

impl PriceTemplates {
    /// Replace the tax-exclusive template.
    pub fn with_without_tax(mut self, template: impl Fn(&PriceStrings) -> String + 'static) -> Self {
        self.without_tax = Rc::new(template);
        self
    }

    /// Replace the tax-inclusive template.
    pub fn with_with_tax(mut self, template: impl Fn(&PriceStrings) -> String + 'static) -> Self {
        self.with_tax = Rc::new(template);
        self
    }

    /// Replace the savings template.
    pub fn with_saved(mut self, template: impl Fn(&PriceStrings) -> String + 'static) -> Self {
        self.saved = Rc::new(template);
        self
    }
}

fn render(value: Option<&PriceValue>, label: &str) -> String {
    let Some(value) = value else {
        return String::new();
    };
    if label.is_empty() {
        format!(r#"<span class="price-value">{}</span>"#, value.formatted)
    } else {
        format!(
            r#"<span class="price-value">{}</span> <span class="price-label">{}</span>"#,
            value.formatted, label
        )
    }
}
