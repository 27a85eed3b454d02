//! The product options controller.
//!
//! One controller is bound per product section. It owns no DOM state of its
//! own: every update re-reads the section from the shared [`Document`] and
//! patches it in place.
//!
//! [`Document`]: turbo_dom::Document

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::{Rc, Weak};
use std::time::Duration;

use futures::FutureExt;
use turbo_dom::{is_file_input, serialize_form, FormData, NodeId, SharedDocument};
use turbo_observability::StructuredLogger;

use crate::api::StorefrontApi;
use crate::attributes::{apply_availability, bind_attributes, AttributeBinding};
use crate::context::ProductContext;
use crate::data::{OptionChangeData, ProductId};
use crate::error::{ApiError, PdpError};
use crate::hooks::{SignalBus, Subscription, CART_QUANTITY_UPDATE, PRODUCT_OPTION_CHANGE};
use crate::message::{clear_message, render_success_message, show_message};
use crate::options::{CartOutcome, ControllerOptions};
use crate::platform::Platform;
use crate::quantity::{parse_int, step_quantity, QuantityBounds, QuantityStep};
use crate::templates::{PriceStrings, PriceTemplate};
use crate::view::{Selectors, ViewModel};

/// Container class marking a full product page (as opposed to quick view).
pub const SINGLE_PRODUCT_CLASS: &str = "single-product-wrap";
/// Class toggled on the stock level's parent when there is nothing to show.
pub const META_ITEM_HIDDEN: &str = "single-product-meta-item-hidden";
/// Class toggled on spinners.
pub const SPINNER_VISIBLE: &str = "visible";

/// Services shared by every controller on a page.
#[derive(Clone)]
pub struct PageEnvironment {
    pub dom: SharedDocument,
    pub api: Rc<dyn StorefrontApi>,
    pub platform: Rc<dyn Platform>,
    pub bus: SignalBus,
}

impl fmt::Debug for PageEnvironment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PageEnvironment")
            .field("bus", &self.bus)
            .finish_non_exhaustive()
    }
}

/// A DOM event forwarded by the embedding page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DomEvent {
    Click { target: NodeId },
    Change { target: NodeId },
}

/// What [`ProductOptionsController::dispatch`] did with an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct EventOutcome {
    /// The controller recognised the event.
    pub handled: bool,
    /// The browser's default action must be suppressed.
    pub default_prevented: bool,
}

/// Why an option change did not reach the view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// The changed control is a file input.
    FileInput,
    /// The platform cannot submit multipart forms.
    NoFormData,
    /// The changed control belongs to another product section.
    OutsideContainer,
    /// The product form declares no configurable options.
    NoOptions,
}

/// Result of an option change round trip.
#[derive(Debug)]
pub enum OptionChangeOutcome {
    /// No request was sent, or its response was discarded.
    Skipped(SkipReason),
    /// Attribute availability was updated but the changed form declares no
    /// options, so the other fragments were left alone.
    AvailabilityOnly,
    /// Every fragment carried by the response was updated.
    Applied,
    /// The request failed; the view is untouched.
    Failed(ApiError),
}

struct Inner {
    container: NodeId,
    product_id: ProductId,
    dom: SharedDocument,
    api: Rc<dyn StorefrontApi>,
    platform: Rc<dyn Platform>,
    bus: SignalBus,
    selectors: Selectors,
    options: ControllerOptions,
    context: RefCell<ProductContext>,
    attributes: RefCell<Vec<AttributeBinding>>,
    /// Set between `begin_cart_add` and the end of `finish_cart_add`.
    cart_in_flight: Cell<bool>,
    logger: StructuredLogger,
}

/// Wires a product section's quantity steppers, option inputs and purchase
/// buttons to the storefront API.
///
/// Dropping the controller unsubscribes it from the signal bus; pending
/// timers then do nothing.
pub struct ProductOptionsController {
    inner: Rc<Inner>,
    subscription: Subscription,
}

impl fmt::Debug for ProductOptionsController {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProductOptionsController")
            .field("container", &self.inner.container)
            .field("product_id", &self.inner.product_id)
            .finish_non_exhaustive()
    }
}

impl ProductOptionsController {
    /// Bind a controller to the product section rooted at `container`.
    pub fn bind(
        env: &PageEnvironment,
        container: NodeId,
        options: ControllerOptions,
    ) -> Result<Self, PdpError> {
        options.config.validate()?;
        let selectors = Selectors::new()?;

        let (product_id, attributes) = {
            let doc = env.dom.borrow();
            if doc.get(container).is_none() {
                return Err(PdpError::MissingElement(format!(
                    "product container {}",
                    container
                )));
            }
            let product_id = doc
                .query(container, &selectors.product_id)
                .and_then(|input| doc.value(input))
                .map(ProductId::new)
                .ok_or_else(|| PdpError::MissingElement(selectors.product_id.to_string()))?;
            (product_id, bind_attributes(&doc, container, &selectors))
        };

        let logger = StructuredLogger::new("product-options")
            .with_product(product_id.as_str())
            .with_min_level(options.config.log_level)
            .with_format(options.config.log_format);

        logger
            .debug_builder("Controller bound")
            .field("container", container.to_string())
            .field_i64("attribute_values", attributes.len() as i64)
            .emit();

        let inner = Rc::new(Inner {
            container,
            product_id,
            dom: Rc::clone(&env.dom),
            api: Rc::clone(&env.api),
            platform: Rc::clone(&env.platform),
            bus: env.bus.clone(),
            selectors,
            options,
            context: RefCell::new(ProductContext::default()),
            attributes: RefCell::new(attributes),
            cart_in_flight: Cell::new(false),
            logger,
        });

        let weak = Rc::downgrade(&inner);
        let subscription = env.bus.on(PRODUCT_OPTION_CHANGE, move |event| {
            let Some(inner) = weak.upgrade() else {
                return;
            };
            let target = event.target;
            let platform = Rc::clone(&inner.platform);
            platform.spawn(
                async move {
                    inner.option_change(target).await;
                }
                .boxed_local(),
            );
        });

        Ok(Self {
            inner,
            subscription,
        })
    }

    /// The section this controller is bound to.
    pub fn container(&self) -> NodeId {
        self.inner.container
    }

    /// Product id read from the section at bind time.
    pub fn product_id(&self) -> &ProductId {
        &self.inner.product_id
    }

    /// The context passed to [`initialize`](Self::initialize).
    pub fn context(&self) -> ProductContext {
        self.inner.context.borrow().clone()
    }

    /// Store the page context and run the initial availability pass.
    ///
    /// Full product pages apply `page_attributes` directly. Quick views emit
    /// an option change so the section is reconciled with the server.
    pub fn initialize(&self, context: ProductContext, page_attributes: Option<&OptionChangeData>) {
        *self.inner.context.borrow_mut() = context;

        let single_product = self
            .inner
            .dom
            .borrow()
            .has_class(self.inner.container, SINGLE_PRODUCT_CLASS);

        if single_product {
            self.update_attribute_availability(page_attributes);
        } else {
            self.inner.bus.emit(PRODUCT_OPTION_CHANGE, None);
        }
    }

    /// Route a DOM event to the matching handler.
    pub fn dispatch(&self, event: DomEvent) -> EventOutcome {
        let inner = &self.inner;
        match event {
            DomEvent::Click { target } => {
                let (stepper, purchase) = {
                    let doc = inner.dom.borrow();
                    if !doc.contains(inner.container, target) {
                        return EventOutcome::default();
                    }
                    (
                        doc.closest(target, &inner.selectors.quantity_change),
                        doc.closest(target, &inner.selectors.purchase_button)
                            .filter(|button| {
                                !doc.is_disabled(*button) && !inner.cart_in_flight.get()
                            }),
                    )
                };

                if let Some(control) = stepper {
                    self.on_quantity_control_click(control);
                    return EventOutcome {
                        handled: true,
                        default_prevented: false,
                    };
                }
                if purchase.is_some() {
                    if let Some(submission) = inner.begin_cart_add() {
                        let task = Rc::clone(inner);
                        inner.platform.spawn(
                            async move {
                                task.finish_cart_add(submission).await;
                            }
                            .boxed_local(),
                        );
                    }
                    self.toggle_spinner();
                    return EventOutcome {
                        handled: true,
                        default_prevented: true,
                    };
                }
                EventOutcome::default()
            }
            DomEvent::Change { target } => {
                let in_options = {
                    let doc = inner.dom.borrow();
                    doc.contains(inner.container, target)
                        && doc
                            .closest(target, &inner.selectors.option_change)
                            .is_some_and(|scope| doc.contains(inner.container, scope))
                };
                if !in_options {
                    return EventOutcome::default();
                }
                inner.bus.emit(PRODUCT_OPTION_CHANGE, Some(target));
                EventOutcome {
                    handled: true,
                    default_prevented: false,
                }
            }
        }
    }

    /// Step the quantity input next to `control`. Returns the written value,
    /// or `None` when there is no input or its value is not a number.
    pub fn on_quantity_control_click(&self, control: NodeId) -> Option<i64> {
        let inner = &self.inner;
        let selectors = &inner.selectors;
        let mut doc = inner.dom.borrow_mut();

        let messages = doc.query_all(inner.container, &selectors.message);
        clear_message(&mut doc, &messages);

        let input = doc
            .closest(control, &selectors.quantity)
            .and_then(|group| doc.query(group, &selectors.quantity_input))?;
        let bounds = QuantityBounds::from_attrs(doc.attr(input, "min"), doc.attr(input, "max"));
        let current = doc.value(input).and_then(parse_int)?;

        let step = if doc.matches(control, &selectors.quantity_increment) {
            Some(QuantityStep::Increment)
        } else if doc.matches(control, &selectors.quantity_decrement) {
            Some(QuantityStep::Decrement)
        } else {
            None
        };
        let next = step.map_or(current, |step| step_quantity(current, step, bounds));
        doc.set_value(input, next.to_string());
        Some(next)
    }

    /// Reconcile the section with the server for the current selection.
    ///
    /// `changed` is the input that changed; `None` reconciles using the
    /// section's product form.
    pub async fn on_option_change(&self, changed: Option<NodeId>) -> OptionChangeOutcome {
        self.inner.option_change(changed).await
    }

    /// Submit the product form to the cart. Returns `None` when the
    /// platform or the section cannot submit, or another add is pending.
    pub async fn add_to_cart(&self) -> Option<CartOutcome> {
        let submission = self.inner.begin_cart_add()?;
        Some(self.inner.finish_cart_add(submission).await)
    }

    /// Enable or disable attribute values from `data`. Returns how many
    /// values were visited.
    pub fn update_attribute_availability(&self, data: Option<&OptionChangeData>) -> usize {
        self.inner.update_attribute_availability(data)
    }

    /// Re-scan attribute values after the option markup was replaced.
    pub fn rebind_attributes(&self) {
        let bindings = {
            let doc = self.inner.dom.borrow();
            bind_attributes(&doc, self.inner.container, &self.inner.selectors)
        };
        *self.inner.attributes.borrow_mut() = bindings;
    }

    /// Flip the `visible` class of every spinner in the section.
    pub fn toggle_spinner(&self) {
        let inner = &self.inner;
        let mut doc = inner.dom.borrow_mut();
        for spinner in doc.query_all(inner.container, &inner.selectors.spinner) {
            doc.toggle_class(spinner, SPINNER_VISIBLE);
        }
    }
}

impl Drop for ProductOptionsController {
    fn drop(&mut self) {
        self.inner.bus.off(self.subscription);
    }
}

/// A cart add that passed its guards.
struct CartSubmission {
    form: NodeId,
    data: FormData,
}

impl Inner {
    fn update_attribute_availability(&self, data: Option<&OptionChangeData>) -> usize {
        let Some(data) = data else {
            return 0;
        };
        let bindings = self.attributes.borrow();
        let mut doc = self.dom.borrow_mut();
        apply_availability(&mut doc, &bindings, data)
    }

    async fn option_change(self: &Rc<Self>, changed: Option<NodeId>) -> OptionChangeOutcome {
        let prepared = {
            let doc = self.dom.borrow();
            self.prepare_option_change(&doc, changed)
        };
        let (form, serialized) = match prepared {
            Ok(prepared) => prepared,
            Err(reason) => {
                self.logger
                    .debug_builder("Option change skipped")
                    .field("reason", format!("{:?}", reason))
                    .emit();
                return OptionChangeOutcome::Skipped(reason);
            }
        };

        self.logger
            .debug_builder("Option change requested")
            .field("form", serialized.clone())
            .emit();

        let data = match self.api.option_change(&self.product_id, &serialized).await {
            Ok(data) => data,
            Err(e) => {
                self.logger
                    .warn_builder("Option change request failed")
                    .field("error", e.to_string())
                    .emit();
                return OptionChangeOutcome::Failed(e);
            }
        };

        let outcome = self.apply_option_change(&data, changed.and(form));
        if matches!(outcome, OptionChangeOutcome::Applied) {
            if let Some(image) = &data.image {
                (self.options.callbacks.switch_image)(image);
            }
        }

        self.logger
            .info_builder("Option change applied")
            .field("outcome", format!("{:?}", outcome))
            .field_bool("purchasable", data.can_purchase())
            .field_i64("in_stock_values", data.in_stock_attributes.len() as i64)
            .emit();
        outcome
    }

    /// Guards and serialization. Returns the enclosing form and its
    /// urlencoded payload.
    fn prepare_option_change(
        &self,
        doc: &turbo_dom::Document,
        changed: Option<NodeId>,
    ) -> Result<(Option<NodeId>, String), SkipReason> {
        if let Some(target) = changed {
            if !doc.contains(self.container, target) {
                return Err(SkipReason::OutsideContainer);
            }
            if is_file_input(doc, target) {
                return Err(SkipReason::FileInput);
            }
        }
        if !self.platform.supports_form_data() {
            return Err(SkipReason::NoFormData);
        }

        let form = match changed {
            Some(target) => doc
                .ancestors(target)
                .find(|node| doc.matches(*node, &self.selectors.form)),
            None => doc.query(self.container, &self.selectors.product_form),
        };
        let serialized = form.map(|f| serialize_form(doc, f)).unwrap_or_default();
        Ok((form, serialized))
    }

    fn apply_option_change(
        &self,
        data: &OptionChangeData,
        changed_form: Option<NodeId>,
    ) -> OptionChangeOutcome {
        let selectors = &self.selectors;
        let declared_options = {
            let doc = self.dom.borrow();
            doc.query(self.container, &selectors.product_form)
                .and_then(|form| doc.attr(form, "data-product-options-count"))
                .and_then(parse_int)
        };
        if declared_options.is_some_and(|count| count < 1) {
            return OptionChangeOutcome::Skipped(SkipReason::NoOptions);
        }

        self.update_attribute_availability(Some(data));

        let context = self.context.borrow().clone();
        let templates = &self.options.templates;
        let price_markup = data.price.as_ref().map(|price| {
            let render = |template: &PriceTemplate, label: &str| {
                template(&PriceStrings {
                    price: price.clone(),
                    label: label.to_string(),
                })
            };
            [
                render(&templates.without_tax, &context.excluding_tax),
                render(&templates.with_tax, &context.including_tax),
                render(&templates.saved, &context.price_you_save),
            ]
        });

        let mut doc = self.dom.borrow_mut();

        if let Some(form) = changed_form {
            if !options_count_is_set(doc.attr(form, "data-product-options-count")) {
                return OptionChangeOutcome::AvailabilityOnly;
            }
        }

        let view = ViewModel::read(&doc, self.container, selectors);

        for &stock in &view.stock {
            let visible = data.visible_stock();
            doc.set_html(stock, visible.map(|level| level.to_string()).unwrap_or_default());
            if let Some(parent) = doc.parent(stock) {
                doc.set_class(parent, META_ITEM_HIDDEN, visible.is_none());
            }
        }

        if let Some(sku) = &data.sku {
            for &node in &view.sku {
                doc.set_html(node, sku.as_str());
            }
        }

        if let Some(weight) = &data.weight {
            for &node in &view.weight {
                doc.set_html(node, weight.formatted.as_str());
            }
        }

        if let Some(markup) = &price_markup {
            let fragments = [&view.price, &view.price_with_tax, &view.saved];
            for (nodes, markup) in fragments.into_iter().zip(markup) {
                for &node in nodes {
                    doc.set_html(node, markup.as_str());
                }
            }
        }

        let messages = doc.query_all(self.container, &selectors.message);
        clear_message(&mut doc, &messages);
        if let Some(message) = data.purchasing_message.as_deref().filter(|m| !m.is_empty()) {
            show_message(&mut doc, &messages, message, true);
        }

        let disabled_class = self.options.config.button_disabled_class.as_str();
        let in_flight = self.cart_in_flight.get();
        let (purchasable, label) = if data.can_purchase() {
            let preorder = view
                .add_to_cart
                .iter()
                .any(|button| doc.matches(*button, &selectors.preorder));
            let label = if preorder {
                &context.pre_order
            } else {
                &context.add_to_cart
            };
            (true, label)
        } else {
            (false, &context.sold_out)
        };
        for &button in &view.add_to_cart {
            doc.set_class(button, disabled_class, !purchasable);
            // A pending cart add keeps the buttons disabled until it settles.
            doc.set_disabled(button, !purchasable || in_flight);
            for text in doc.children_matching(button, &selectors.button_text) {
                doc.set_text(text, label.as_str());
            }
        }

        OptionChangeOutcome::Applied
    }

    fn begin_cart_add(&self) -> Option<CartSubmission> {
        if self.cart_in_flight.get() || !self.platform.supports_form_data() {
            return None;
        }
        let submission = {
            let doc = self.dom.borrow();
            let form = doc.query(self.container, &self.selectors.product_form)?;
            CartSubmission {
                form,
                data: FormData::from_form(&doc, form),
            }
        };

        (self.options.callbacks.will_update)(submission.form);

        let mut doc = self.dom.borrow_mut();
        let messages = doc.query_all(self.container, &self.selectors.message);
        clear_message(&mut doc, &messages);
        self.set_purchase_buttons_disabled(&mut doc, true);
        self.cart_in_flight.set(true);
        Some(submission)
    }

    async fn finish_cart_add(self: &Rc<Self>, submission: CartSubmission) -> CartOutcome {
        self.logger
            .info_builder("Adding to cart")
            .field_i64("fields", submission.data.len() as i64)
            .emit();

        let outcome = match self.api.cart_add(&submission.data).await {
            Ok(data) => match data.error_message() {
                Some(message) => CartOutcome::Failed(message.to_string()),
                None => CartOutcome::Added(data),
            },
            Err(e) => CartOutcome::Failed(e.to_string()),
        };
        let is_error = outcome.is_error();

        match &outcome {
            CartOutcome::Failed(message) => {
                self.logger
                    .warn_builder("Cart add failed")
                    .field("error", message.as_str())
                    .emit();
            }
            CartOutcome::Added(_) => {
                self.platform.notify(CART_QUANTITY_UPDATE);
                let url = format!(
                    "{}{}",
                    self.platform.origin().trim_end_matches('/'),
                    self.options.config.checkout_path
                );
                self.logger
                    .info_builder("Cart add succeeded")
                    .field("redirect", url.as_str())
                    .emit();
                self.platform.navigate(&url);
            }
        }

        self.show_cart_message(&outcome);
        self.cart_in_flight.set(false);
        {
            let mut doc = self.dom.borrow_mut();
            self.set_purchase_buttons_disabled(&mut doc, false);
        }
        (self.options.callbacks.did_update)(is_error, &outcome, submission.form);

        self.schedule(self.options.config.message_clear_delay(), "message-clear", |inner| {
            let mut doc = inner.dom.borrow_mut();
            let messages = doc.query_all(inner.container, &inner.selectors.message);
            clear_message(&mut doc, &messages);
        });

        outcome
    }

    fn show_cart_message(self: &Rc<Self>, outcome: &CartOutcome) {
        let (markup, spinner_delay) = match outcome {
            CartOutcome::Failed(message) => (message.clone(), Duration::ZERO),
            CartOutcome::Added(_) => {
                let title = {
                    let doc = self.dom.borrow();
                    doc.query(self.container, &self.selectors.product_details)
                        .and_then(|details| doc.attr(details, "data-product-title"))
                        .unwrap_or_default()
                        .to_string()
                };
                let markup = render_success_message(&self.context.borrow(), &title);
                (markup, self.options.config.spinner_delay())
            }
        };

        self.schedule(spinner_delay, "spinner-remove", |inner| {
            let mut doc = inner.dom.borrow_mut();
            for spinner in doc.query_all(inner.container, &inner.selectors.add_button_spinner) {
                doc.remove_class(spinner, SPINNER_VISIBLE);
            }
        });

        let mut doc = self.dom.borrow_mut();
        let messages = doc.query_all(self.container, &self.selectors.message);
        show_message(&mut doc, &messages, &markup, outcome.is_error());
    }

    fn set_purchase_buttons_disabled(&self, doc: &mut turbo_dom::Document, disabled: bool) {
        for button in doc.query_all(self.container, &self.selectors.purchase_button) {
            doc.set_disabled(button, disabled);
        }
    }

    /// Run `task` after `delay` unless the controller is gone by then.
    fn schedule(
        self: &Rc<Self>,
        delay: Duration,
        name: &'static str,
        task: impl FnOnce(&Inner) + 'static,
    ) {
        let weak: Weak<Inner> = Rc::downgrade(self);
        self.platform.set_timeout(
            delay,
            Box::new(move || {
                let Some(inner) = weak.upgrade() else {
                    return;
                };
                inner
                    .logger
                    .debug_builder("Timer fired")
                    .field("timer", name)
                    .emit();
                task(&*inner);
            }),
        );
    }
}

/// Whether a form's `data-product-options-count` is present and non-zero.
fn options_count_is_set(raw: Option<&str>) -> bool {
    match raw.map(str::trim) {
        None | Some("") => false,
        Some(value) => parse_int(value) != Some(0),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_options_count_is_set() {
        assert!(!options_count_is_set(None));
        assert!(!options_count_is_set(Some("")));
        assert!(!options_count_is_set(Some("0")));
        assert!(options_count_is_set(Some("2")));
        assert!(options_count_is_set(Some("yes")));
    }
}
