//! Caller-supplied hooks and settings for a controller.

use std::fmt;
use std::rc::Rc;

use turbo_dom::NodeId;
use turbo_observability::StructuredLogger;

use crate::config::PdpConfig;
use crate::data::{CartAddData, ImageData};
use crate::templates::PriceTemplates;

/// Result of a cart add, as reported to [`Callbacks::did_update`].
#[derive(Debug, Clone, PartialEq)]
pub enum CartOutcome {
    /// The cart accepted the item.
    Added(CartAddData),
    /// The request failed or the cart refused the item. Holds the message
    /// shown to the shopper.
    Failed(String),
}

impl CartOutcome {
    /// Whether this is the error branch.
    pub fn is_error(&self) -> bool {
        matches!(self, Self::Failed(_))
    }
}

/// Invoked before a cart add with the product form.
pub type WillUpdate = Rc<dyn Fn(NodeId)>;
/// Invoked after a cart add with `(is_error, outcome, form)`.
pub type DidUpdate = Rc<dyn Fn(bool, &CartOutcome, NodeId)>;
/// Invoked when the selected variant has its own hero image.
pub type SwitchImage = Rc<dyn Fn(&ImageData)>;

/// Lifecycle callbacks. Each defaults to a debug log line.
#[derive(Clone)]
pub struct Callbacks {
    pub will_update: WillUpdate,
    pub did_update: DidUpdate,
    pub switch_image: SwitchImage,
}

impl Default for Callbacks {
    fn default() -> Self {
        let logger = StructuredLogger::new("product-options");
        let will = logger.clone();
        let did = logger.clone();
        Self {
            will_update: Rc::new(move |_| will.debug("Update requested.")),
            did_update: Rc::new(move |_, _, _| did.debug("Update executed.")),
            switch_image: Rc::new(move |_| logger.debug("Image switch attempted.")),
        }
    }
}

impl fmt::Debug for Callbacks {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Callbacks").finish_non_exhaustive()
    }
}

impl Callbacks {
    /// Set the pre-submit hook.
    pub fn with_will_update(mut self, f: impl Fn(NodeId) + 'static) -> Self {
        self.will_update = Rc::new(f);
        self
    }

    /// Set the post-submit hook.
    pub fn with_did_update(mut self, f: impl Fn(bool, &CartOutcome, NodeId) + 'static) -> Self {
        self.did_update = Rc::new(f);
        self
    }

    /// Set the image switcher.
    pub fn with_switch_image(mut self, f: impl Fn(&ImageData) + 'static) -> Self {
        self.switch_image = Rc::new(f);
        self
    }
}

/// Everything a controller is constructed with besides the page itself.
#[derive(Debug, Clone, Default)]
pub struct ControllerOptions {
    pub config: PdpConfig,
    pub templates: PriceTemplates,
    pub callbacks: Callbacks,
}

impl ControllerOptions {
    /// Create options with default config, templates and callbacks.
    pub fn new() -> Self {
        Self::default()
    }

    /// Use `config`.
    pub fn with_config(mut self, config: PdpConfig) -> Self {
        self.config = config;
        self
    }

    /// Use `templates` for the price fragments.
    pub fn with_templates(mut self, templates: PriceTemplates) -> Self {
        self.templates = templates;
        self
    }

    /// Use `callbacks`.
    pub fn with_callbacks(mut self, callbacks: Callbacks) -> Self {
        self.callbacks = callbacks;
        self
    }
}
