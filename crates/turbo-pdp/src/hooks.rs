//! Page-wide signal bus.
//!
//! Subscribers are keyed by event name and invoked synchronously, in
//! registration order, on the emitting call stack.

use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

use turbo_dom::NodeId;

/// Emitted when a product option input changes, or to request a
/// reconciliation pass with the current selection.
pub const PRODUCT_OPTION_CHANGE: &str = "product-option-change";

/// Page-wide notification raised after an item lands in the cart.
pub const CART_QUANTITY_UPDATE: &str = "cart-quantity-update";

/// A signal delivered to subscribers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HookEvent {
    /// Event name.
    pub name: String,
    /// Element that triggered the signal, if any.
    pub target: Option<NodeId>,
}

/// Handle returned by [`SignalBus::on`], used to unsubscribe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Subscription {
    id: u64,
}

type Handler = Rc<dyn Fn(&HookEvent)>;

#[derive(Default)]
struct Registry {
    handlers: HashMap<String, Vec<(Subscription, Handler)>>,
}

/// Publish/subscribe registry shared by every controller on a page.
///
/// Cloning yields another handle to the same registry.
#[derive(Clone, Default)]
pub struct SignalBus {
    registry: Rc<RefCell<Registry>>,
    next_id: Rc<Cell<u64>>,
}

impl fmt::Debug for SignalBus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let registry = self.registry.borrow();
        let mut names: Vec<&String> = registry.handlers.keys().collect();
        names.sort();
        f.debug_struct("SignalBus").field("events", &names).finish()
    }
}

impl SignalBus {
    /// Create an empty bus.
    pub fn new() -> Self {
        Self::default()
    }

    /// Subscribe to `name`.
    pub fn on(&self, name: &str, handler: impl Fn(&HookEvent) + 'static) -> Subscription {
        let id = self.next_id.get();
        self.next_id.set(id + 1);
        let subscription = Subscription { id };

        self.registry
            .borrow_mut()
            .handlers
            .entry(name.to_string())
            .or_default()
            .push((subscription, Rc::new(handler)));

        subscription
    }

    /// Remove a subscription. Unknown handles are ignored.
    pub fn off(&self, subscription: Subscription) {
        let mut registry = self.registry.borrow_mut();
        for handlers in registry.handlers.values_mut() {
            handlers.retain(|(s, _)| *s != subscription);
        }
        registry.handlers.retain(|_, handlers| !handlers.is_empty());
    }

    /// Deliver a signal to every subscriber of `name`. Returns how many ran.
    ///
    /// Handlers may subscribe, unsubscribe or emit again; those changes take
    /// effect from the next emit.
    pub fn emit(&self, name: &str, target: Option<NodeId>) -> usize {
        let handlers: Vec<Handler> = self
            .registry
            .borrow()
            .handlers
            .get(name)
            .map(|list| list.iter().map(|(_, h)| Rc::clone(h)).collect())
            .unwrap_or_default();

        let event = HookEvent {
            name: name.to_string(),
            target,
        };
        for handler in &handlers {
            handler(&event);
        }
        handlers.len()
    }

    /// Number of subscribers for `name`.
    pub fn subscriber_count(&self, name: &str) -> usize {
        self.registry
            .borrow()
            .handlers
            .get(name)
            .map_or(0, Vec::len)
    }
}
