//! Product page controller for TurboCommerce storefronts.
//!
//! Binds a product section's quantity steppers, option pickers and purchase
//! buttons to the storefront's remote endpoints, and patches price, stock,
//! sku, weight, availability and purchase state from the responses.
//!
//! This crate provides:
//! - `ProductOptionsController` - Event wiring and option-change reconciliation
//! - `StorefrontApi` / `HttpStorefrontApi` - The option-change and cart-add endpoints
//! - `SignalBus` - Page-wide publish/subscribe for option changes
//! - `Platform` / `HeadlessPlatform` / `BrowserPlatform` - Timers, navigation and task spawning
//! - `PdpConfig` / `ProductContext` - Settings and localized strings
//!
//! # Example
//!
//! ```rust,ignore
//! use turbo_pdp::prelude::*;
//!
//! let env = PageEnvironment { dom, api, platform, bus: SignalBus::new() };
//! let controller = ProductOptionsController::bind(&env, section, ControllerOptions::new())?;
//! controller.initialize(ProductContext::from_json(context_json)?, None);
//!
//! // Forwarded by the page's event listeners:
//! let outcome = controller.dispatch(DomEvent::Click { target: button });
//! ```

pub mod api;
pub mod attributes;
#[cfg(target_arch = "wasm32")]
pub mod browser;
pub mod config;
pub mod context;
pub mod controller;
pub mod data;
pub mod error;
pub mod hooks;
pub mod message;
pub mod options;
pub mod platform;
pub mod quantity;
pub mod templates;
pub mod view;

pub use api::{HttpStorefrontApi, StorefrontApi};
pub use attributes::{AttributeBinding, AttributeKind};
#[cfg(target_arch = "wasm32")]
pub use browser::BrowserPlatform;
pub use config::PdpConfig;
pub use context::ProductContext;
pub use controller::{
    DomEvent, EventOutcome, OptionChangeOutcome, PageEnvironment, ProductOptionsController,
    SkipReason,
};
pub use data::{
    CartAddData, ImageData, OptionChangeData, OutOfStockBehavior, PriceData, PriceValue,
    ProductId, Weight,
};
pub use error::{ApiError, PdpError};
pub use hooks::{HookEvent, SignalBus, Subscription, CART_QUANTITY_UPDATE, PRODUCT_OPTION_CHANGE};
pub use options::{Callbacks, CartOutcome, ControllerOptions};
pub use platform::{HeadlessPlatform, Platform};
pub use templates::{PriceStrings, PriceTemplate, PriceTemplates};

/// Prelude for convenient imports.
pub mod prelude {
    pub use crate::{
        Callbacks, CartOutcome, ControllerOptions, DomEvent, HttpStorefrontApi, PageEnvironment,
        PdpConfig, ProductContext, ProductOptionsController, SignalBus, StorefrontApi,
    };
}
