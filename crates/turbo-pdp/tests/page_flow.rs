//! Drives a whole product section through the controller on a headless page.

use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::rc::Rc;
use std::time::Duration;

use async_trait::async_trait;
use futures::channel::oneshot;
use futures::executor::block_on;
use turbo_dom::{el, shared, Document, ElementBuilder, FormData, NodeId, Selector, SharedDocument};
use turbo_pdp::prelude::*;
use turbo_pdp::{
    ApiError, CartAddData, HeadlessPlatform, ImageData, OptionChangeData, OptionChangeOutcome,
    PdpError, Platform, ProductId, SkipReason, CART_QUANTITY_UPDATE, PRODUCT_OPTION_CHANGE,
};

#[derive(Default)]
struct MockApi {
    option_replies: RefCell<VecDeque<Result<OptionChangeData, ApiError>>>,
    cart_reply: RefCell<Option<Result<CartAddData, ApiError>>>,
    option_calls: RefCell<Vec<(String, String)>>,
    cart_calls: RefCell<Vec<FormData>>,
}

impl MockApi {
    fn reply_option(&self, reply: Result<OptionChangeData, ApiError>) {
        self.option_replies.borrow_mut().push_back(reply);
    }

    fn reply_cart(&self, reply: Result<CartAddData, ApiError>) {
        *self.cart_reply.borrow_mut() = Some(reply);
    }
}

#[async_trait(?Send)]
impl StorefrontApi for MockApi {
    async fn option_change(
        &self,
        product_id: &ProductId,
        form: &str,
    ) -> Result<OptionChangeData, ApiError> {
        self.option_calls
            .borrow_mut()
            .push((product_id.to_string(), form.to_string()));
        self.option_replies
            .borrow_mut()
            .pop_front()
            .unwrap_or_else(|| Ok(OptionChangeData::default()))
    }

    async fn cart_add(&self, form: &FormData) -> Result<CartAddData, ApiError> {
        self.cart_calls.borrow_mut().push(form.clone());
        self.cart_reply
            .borrow_mut()
            .take()
            .unwrap_or_else(|| Ok(CartAddData::default()))
    }
}

/// Holds every option-change request open until the test answers it.
#[derive(Default)]
struct DeferredApi {
    pending: RefCell<Vec<oneshot::Sender<OptionChangeData>>>,
}

impl DeferredApi {
    fn answer(&self, index: usize, data: OptionChangeData) {
        let sender = self.pending.borrow_mut().remove(index);
        assert!(sender.send(data).is_ok());
    }
}

#[async_trait(?Send)]
impl StorefrontApi for DeferredApi {
    async fn option_change(
        &self,
        _product_id: &ProductId,
        _form: &str,
    ) -> Result<OptionChangeData, ApiError> {
        let (tx, rx) = oneshot::channel();
        self.pending.borrow_mut().push(tx);
        rx.await.map_err(|e| ApiError::Transport(e.to_string()))
    }

    async fn cart_add(&self, _form: &FormData) -> Result<CartAddData, ApiError> {
        Ok(CartAddData::default())
    }
}

fn product_section(single: bool, product_id: &str) -> ElementBuilder {
    let section = el("div").class("productView");
    let section = if single {
        section.class("single-product-wrap")
    } else {
        section
    };

    section.children([
        el("div")
            .attr("data-product-details", "")
            .attr("data-product-title", "Widget"),
        el("p").attr("data-product-message", ""),
        el("div").children([
            el("span")
                .attr("data-product-price-wrapper", "without-tax")
                .text("$12.00"),
            el("span")
                .attr("data-product-price-wrapper", "with-tax")
                .text("$13.20"),
            el("span").attr("data-product-price-saved", ""),
        ]),
        el("dl").children([
            el("dd")
                .class("single-product-meta-item-hidden")
                .child(el("span").attr("data-product-stock-level", "")),
            el("dd").child(el("span").attr("data-product-sku", "").text("WID-S")),
            el("dd").child(el("span").attr("data-product-weight", "").text("1 LBS")),
        ]),
        el("form")
            .attr("data-product-form", "")
            .attr("data-product-options-count", "2")
            .children([
                el("input")
                    .attr("type", "hidden")
                    .attr("name", "product_id")
                    .attr("value", product_id)
                    .flag("data-product-id"),
                el("div").attr("data-product-option-change", "").children([
                    el("div").attr("data-product-attribute", "set-select").child(
                        el("select").attr("name", "attribute[12]").children([
                            el("option")
                                .attr("value", "1")
                                .attr("data-product-attribute-value", "1")
                                .flag("selected")
                                .text("Small"),
                            el("option")
                                .attr("value", "2")
                                .attr("data-product-attribute-value", "2")
                                .text("Medium"),
                            el("option")
                                .attr("value", "3")
                                .attr("data-product-attribute-value", "3")
                                .text("Large"),
                        ]),
                    ),
                    el("div").attr("data-product-attribute", "swatch").children([
                        el("input")
                            .attr("type", "radio")
                            .attr("name", "attribute[13]")
                            .attr("value", "10")
                            .attr("data-product-attribute-value", "10")
                            .flag("checked"),
                        el("input")
                            .attr("type", "radio")
                            .attr("name", "attribute[13]")
                            .attr("value", "11")
                            .attr("data-product-attribute-value", "11"),
                    ]),
                    el("input").attr("type", "file").attr("name", "attribute[14]"),
                ]),
                el("div").attr("data-product-quantity", "").children([
                    el("button")
                        .attr("data-product-quantity-change", "")
                        .attr("data-quantity-decrement", ""),
                    el("input")
                        .attr("name", "qty[]")
                        .attr("value", "1")
                        .attr("min", "1")
                        .attr("max", "3")
                        .flag("data-product-quantity-input"),
                    el("button")
                        .attr("data-product-quantity-change", "")
                        .attr("data-quantity-increment", ""),
                ]),
                el("div").class("product-add-button-wrapper").child(
                    el("button")
                        .attr("data-button-purchase", "")
                        .children([
                            el("span").attr("data-button-text", "").text("Add to Cart"),
                            el("span").class("spinner"),
                        ]),
                ),
            ]),
    ])
}

fn context() -> ProductContext {
    ProductContext::from_json(
        r#"{
            "addToCart": "Add to Cart",
            "preOrder": "Pre-Order Now",
            "soldOut": "Sold Out",
            "addSuccess": "*product* added. *cart_link* or *continue_link*, then *checkout_link*",
            "urlsCart": "/cart.php",
            "urlsCheckout": "/checkout",
            "cartLink": "View cart",
            "homeLink": "Continue shopping",
            "checkoutLink": "Check out",
            "excludingTax": "(Ex. Tax)",
            "includingTax": "(Inc. Tax)",
            "priceYouSave": "You save"
        }"#,
    )
    .unwrap()
}

struct Page {
    dom: SharedDocument,
    api: Rc<MockApi>,
    platform: Rc<HeadlessPlatform>,
    bus: SignalBus,
    section: NodeId,
}

impl Page {
    fn new(single: bool) -> Self {
        Self::with_platform(single, HeadlessPlatform::new())
    }

    fn with_platform(single: bool, platform: HeadlessPlatform) -> Self {
        let mut doc = Document::new();
        let root = doc.root();
        let section = doc.build(root, product_section(single, "77"));
        Self {
            dom: shared(doc),
            api: Rc::new(MockApi::default()),
            platform: Rc::new(platform),
            bus: SignalBus::new(),
            section,
        }
    }

    fn env(&self) -> PageEnvironment {
        PageEnvironment {
            dom: Rc::clone(&self.dom),
            api: Rc::clone(&self.api) as Rc<dyn StorefrontApi>,
            platform: Rc::clone(&self.platform) as Rc<dyn Platform>,
            bus: self.bus.clone(),
        }
    }

    fn bind(&self) -> ProductOptionsController {
        self.bind_with(ControllerOptions::new())
    }

    fn bind_with(&self, options: ControllerOptions) -> ProductOptionsController {
        let controller = ProductOptionsController::bind(&self.env(), self.section, options).unwrap();
        controller.initialize(context(), None);
        self.platform.run_until_stalled();
        controller
    }

    fn find(&self, selector: &str) -> NodeId {
        let selector = Selector::parse(selector).unwrap();
        self.dom.borrow().query(self.section, &selector).unwrap()
    }

    fn html(&self, selector: &str) -> String {
        let node = self.find(selector);
        self.dom.borrow().html(node).to_string()
    }

    fn has_class(&self, selector: &str, class: &str) -> bool {
        let node = self.find(selector);
        self.dom.borrow().has_class(node, class)
    }

    fn is_disabled(&self, selector: &str) -> bool {
        let node = self.find(selector);
        self.dom.borrow().is_disabled(node)
    }

    fn quantity(&self) -> String {
        let node = self.find("[data-product-quantity-input]");
        self.dom.borrow().value(node).unwrap_or_default().to_string()
    }
}

fn in_stock(purchasable: bool, instock: bool) -> OptionChangeData {
    OptionChangeData {
        purchasable,
        instock,
        ..Default::default()
    }
}

#[test]
fn test_quantity_steppers_respect_bounds() {
    let page = Page::new(true);
    let controller = page.bind();
    let increment = page.find("[data-quantity-increment]");
    let decrement = page.find("[data-quantity-decrement]");

    let outcome = controller.dispatch(DomEvent::Click { target: decrement });
    assert!(outcome.handled);
    assert!(!outcome.default_prevented);
    assert_eq!(page.quantity(), "1");

    for expected in ["2", "3", "3"] {
        controller.dispatch(DomEvent::Click { target: increment });
        assert_eq!(page.quantity(), expected);
    }

    controller.dispatch(DomEvent::Click { target: decrement });
    assert_eq!(page.quantity(), "2");
    assert!(page.api.option_calls.borrow().is_empty());
    assert!(page.api.cart_calls.borrow().is_empty());
}

#[test]
fn test_quantity_click_clears_message() {
    let page = Page::new(true);
    let controller = page.bind();
    let message = page.find("[data-product-message]");
    {
        let mut doc = page.dom.borrow_mut();
        doc.set_html(message, "Old news");
        doc.add_class(message, "alert-error");
    }

    let increment = page.find("[data-quantity-increment]");
    assert_eq!(controller.on_quantity_control_click(increment), Some(2));
    assert_eq!(page.html("[data-product-message]"), "");
    assert!(!page.has_class("[data-product-message]", "alert-error"));
}

#[test]
fn test_file_input_change_never_requests() {
    let page = Page::new(true);
    let controller = page.bind();
    let file = page.find(r#"input[type="file"]"#);

    let outcome = controller.dispatch(DomEvent::Change { target: file });
    assert!(outcome.handled);
    page.platform.run_until_stalled();
    assert!(page.api.option_calls.borrow().is_empty());

    let outcome = block_on(controller.on_option_change(Some(file)));
    assert!(matches!(outcome, OptionChangeOutcome::Skipped(SkipReason::FileInput)));
    assert!(page.api.option_calls.borrow().is_empty());
}

#[test]
fn test_option_change_applies_every_fragment() {
    let page = Page::new(true);
    let switched = Rc::new(RefCell::new(None));
    let sink = Rc::clone(&switched);
    let callbacks = Callbacks::default().with_switch_image(move |image: &ImageData| {
        *sink.borrow_mut() = Some(image.clone());
    });
    let controller = page.bind_with(ControllerOptions::new().with_callbacks(callbacks));

    let data: OptionChangeData = serde_json::from_value(serde_json::json!({
        "price": {
            "without_tax": {"formatted": "$10.00", "value": 10.0},
            "with_tax": {"formatted": "$11.00", "value": 11.0},
            "saved": {"formatted": "$2.00", "value": 2.0}
        },
        "stock": 5,
        "sku": "WID-M",
        "weight": {"formatted": "2 LBS", "value": 2},
        "image": {"data": "https://cdn.example/{:size}/widget-m.jpg", "alt": "Medium"},
        "purchasable": true,
        "instock": true
    }))
    .unwrap();
    page.api.reply_option(Ok(data));

    let select = page.find("select");
    let outcome = controller.dispatch(DomEvent::Change { target: select });
    assert!(outcome.handled);
    page.platform.run_until_stalled();

    let calls = page.api.option_calls.borrow();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].0, "77");
    assert!(calls[0].1.contains("attribute%5B12%5D=1"));
    assert!(calls[0].1.contains("attribute%5B13%5D=10"));
    assert!(calls[0].1.contains("qty%5B%5D=1"));

    assert_eq!(page.html("[data-product-sku]"), "WID-M");
    assert_eq!(page.html("[data-product-weight]"), "2 LBS");
    assert_eq!(page.html("[data-product-stock-level]"), "5");
    let stock = page.find("[data-product-stock-level]");
    let stock_parent = page.dom.borrow().parent(stock).unwrap();
    assert!(!page
        .dom
        .borrow()
        .has_class(stock_parent, "single-product-meta-item-hidden"));

    assert!(page
        .html(r#"[data-product-price-wrapper="without-tax"]"#)
        .contains("$10.00"));
    assert!(page
        .html(r#"[data-product-price-wrapper="without-tax"]"#)
        .contains("(Ex. Tax)"));
    assert!(page
        .html(r#"[data-product-price-wrapper="with-tax"]"#)
        .contains("(Inc. Tax)"));
    assert!(page.html("[data-product-price-saved]").contains("You save"));

    assert_eq!(
        switched.borrow().as_ref().map(|image| image.alt.as_str()),
        Some("Medium")
    );
    assert!(!page.is_disabled("[data-button-purchase]"));
    assert_eq!(page.html("[data-button-text]"), "Add to Cart");
}

#[test]
fn test_zero_stock_hides_stock_row() {
    let page = Page::new(true);
    let controller = page.bind();
    page.api.reply_option(Ok(OptionChangeData {
        stock: Some(0),
        ..in_stock(true, true)
    }));

    block_on(controller.on_option_change(None));
    assert_eq!(page.html("[data-product-stock-level]"), "");
    let stock = page.find("[data-product-stock-level]");
    let parent = page.dom.borrow().parent(stock).unwrap();
    assert!(page
        .dom
        .borrow()
        .has_class(parent, "single-product-meta-item-hidden"));
    // Missing fields leave their fragments alone.
    assert_eq!(page.html("[data-product-sku]"), "WID-S");
    assert_eq!(page.html("[data-product-weight]"), "1 LBS");
    assert_eq!(
        page.html(r#"[data-product-price-wrapper="without-tax"]"#),
        "$12.00"
    );
}

#[test]
fn test_not_purchasable_or_out_of_stock_is_sold_out() {
    for (purchasable, instock) in [(false, true), (true, false), (false, false)] {
        let page = Page::new(true);
        let controller = page.bind();
        page.api.reply_option(Ok(OptionChangeData {
            sku: Some("WID-L".to_string()),
            ..in_stock(purchasable, instock)
        }));

        let outcome = block_on(controller.on_option_change(None));
        assert!(matches!(outcome, OptionChangeOutcome::Applied));
        assert!(page.is_disabled("[data-button-purchase]"));
        assert!(page.has_class("[data-button-purchase]", "disabled"));
        assert_eq!(page.html("[data-button-text]"), "Sold Out");
    }
}

#[test]
fn test_preorder_marker_selects_preorder_label() {
    let page = Page::new(true);
    let button = page.find("[data-button-purchase]");
    {
        let mut doc = page.dom.borrow_mut();
        doc.set_attr(button, "data-button-preorder", "");
        doc.set_disabled(button, true);
        doc.add_class(button, "disabled");
    }
    let controller = page.bind();
    page.api.reply_option(Ok(in_stock(true, true)));

    block_on(controller.on_option_change(None));
    assert!(!page.is_disabled("[data-button-purchase]"));
    assert!(!page.has_class("[data-button-purchase]", "disabled"));
    assert_eq!(page.html("[data-button-text]"), "Pre-Order Now");
}

#[test]
fn test_custom_disabled_class() {
    let page = Page::new(true);
    let config = PdpConfig {
        button_disabled_class: "is-unavailable".to_string(),
        ..Default::default()
    };
    let controller = page.bind_with(ControllerOptions::new().with_config(config));
    page.api.reply_option(Ok(in_stock(false, false)));

    block_on(controller.on_option_change(None));
    assert!(page.has_class("[data-button-purchase]", "is-unavailable"));
    assert!(!page.has_class("[data-button-purchase]", "disabled"));
}

#[test]
fn test_purchasing_message_is_shown_as_error() {
    let page = Page::new(true);
    let controller = page.bind();
    page.api.reply_option(Ok(OptionChangeData {
        purchasing_message: Some("Only ships to the US".to_string()),
        ..in_stock(true, true)
    }));

    block_on(controller.on_option_change(None));
    assert_eq!(page.html("[data-product-message]"), "Only ships to the US");
    assert!(page.has_class("[data-product-message]", "alert-error"));

    page.api.reply_option(Ok(in_stock(true, true)));
    block_on(controller.on_option_change(None));
    assert_eq!(page.html("[data-product-message]"), "");
    assert!(!page.has_class("[data-product-message]", "alert-error"));
}

#[test]
fn test_form_without_options_skips_update() {
    let page = Page::new(true);
    let form = page.find("[data-product-form]");
    page.dom
        .borrow_mut()
        .set_attr(form, "data-product-options-count", "0");
    let controller = page.bind();
    page.api.reply_option(Ok(OptionChangeData {
        sku: Some("WID-XL".to_string()),
        ..in_stock(false, false)
    }));

    let outcome = block_on(controller.on_option_change(None));
    assert!(matches!(outcome, OptionChangeOutcome::Skipped(SkipReason::NoOptions)));
    assert_eq!(page.html("[data-product-sku]"), "WID-S");
    assert!(!page.is_disabled("[data-button-purchase]"));
}

#[test]
fn test_changed_form_without_count_updates_availability_only() {
    let page = Page::new(true);
    let form = page.find("[data-product-form]");
    page.dom
        .borrow_mut()
        .remove_attr(form, "data-product-options-count");
    let controller = page.bind();
    page.api.reply_option(Ok(serde_json::from_value(serde_json::json!({
        "sku": "WID-XL",
        "out_of_stock_behavior": "hide_option",
        "in_stock_attributes": [1, 2, 10, 11]
    }))
    .unwrap()));

    let select = page.find("select");
    let outcome = block_on(controller.on_option_change(Some(select)));
    assert!(matches!(outcome, OptionChangeOutcome::AvailabilityOnly));
    assert_eq!(page.html("[data-product-sku]"), "WID-S");

    let large = page.find(r#"[data-product-attribute-value="3"]"#);
    assert!(page.dom.borrow().is_hidden(large));
}

#[test]
fn test_failed_option_change_leaves_view_untouched() {
    let page = Page::new(true);
    let controller = page.bind();
    let before = page.dom.borrow().clone();
    page.api
        .reply_option(Err(ApiError::Transport("network down".to_string())));

    let outcome = block_on(controller.on_option_change(None));
    assert!(matches!(outcome, OptionChangeOutcome::Failed(_)));
    assert_eq!(*page.dom.borrow(), before);
}

#[test]
fn test_single_product_initialize_labels_out_of_stock_values() {
    let page = Page::new(true);
    let controller =
        ProductOptionsController::bind(&page.env(), page.section, ControllerOptions::new())
            .unwrap();
    let attributes: OptionChangeData = serde_json::from_value(serde_json::json!({
        "out_of_stock_behavior": "label_option",
        "in_stock_attributes": [1, 2],
        "out_of_stock_message": "Out of stock"
    }))
    .unwrap();

    controller.initialize(context(), Some(&attributes));
    page.platform.run_until_stalled();
    assert!(page.api.option_calls.borrow().is_empty());

    let large = page.find(r#"[data-product-attribute-value="3"]"#);
    let medium = page.find(r#"[data-product-attribute-value="2"]"#);
    let once = page.dom.borrow().clone();
    {
        let doc = page.dom.borrow();
        assert!(doc.is_disabled(large));
        assert_eq!(doc.html(large), "Large (Out of stock)");
        assert!(!doc.is_disabled(medium));
        assert_eq!(doc.html(medium), "Medium");
    }

    assert_eq!(controller.update_attribute_availability(Some(&attributes)), 5);
    assert_eq!(*page.dom.borrow(), once);
    assert_eq!(
        page.dom
            .borrow()
            .html(large)
            .matches(" (Out of stock)")
            .count(),
        1
    );

    assert_eq!(controller.update_attribute_availability(None), 0);
    assert_eq!(*page.dom.borrow(), once);
}

#[test]
fn test_quick_view_initialize_requests_availability() {
    let page = Page::new(false);
    page.api.reply_option(Ok(serde_json::from_value(serde_json::json!({
        "out_of_stock_behavior": "label_option",
        "in_stock_attributes": [1, 2, 3, 10],
        "purchasable": true,
        "instock": true
    }))
    .unwrap()));

    let _controller = page.bind();

    let calls = page.api.option_calls.borrow();
    assert_eq!(calls.len(), 1);
    assert!(calls[0].1.starts_with("product_id=77"));
    assert!(page.has_class(
        r#"[data-product-attribute-value="11"]"#,
        "option-unavailable"
    ));
}

#[test]
fn test_add_to_cart_success_flow() {
    let page = Page::new(true);
    let did_update = Rc::new(RefCell::new(Vec::new()));
    let will_update = Rc::new(Cell::new(0));
    let (did, will) = (Rc::clone(&did_update), Rc::clone(&will_update));
    let callbacks = Callbacks::default()
        .with_will_update(move |_| will.set(will.get() + 1))
        .with_did_update(move |is_error, outcome, _| {
            did.borrow_mut().push((is_error, outcome.clone()))
        });
    let controller = page.bind_with(ControllerOptions::new().with_callbacks(callbacks));
    page.api.reply_cart(Ok(CartAddData {
        cart_id: Some("c-1".to_string()),
        ..Default::default()
    }));

    let button = page.find("[data-button-purchase]");
    let outcome = controller.dispatch(DomEvent::Click { target: button });
    assert!(outcome.handled);
    assert!(outcome.default_prevented);
    assert_eq!(will_update.get(), 1);
    assert!(page.is_disabled("[data-button-purchase]"));
    assert!(page.has_class(".spinner", "visible"));

    page.platform.run_until_stalled();

    let carts = page.api.cart_calls.borrow();
    assert_eq!(carts.len(), 1);
    assert_eq!(carts[0].get("product_id"), Some("77"));
    assert_eq!(carts[0].get("qty[]"), Some("1"));

    assert_eq!(page.platform.notifications(), vec![CART_QUANTITY_UPDATE]);
    assert_eq!(
        page.platform.navigations(),
        vec!["https://store.example/checkout"]
    );

    let message = page.html("[data-product-message]");
    assert_eq!(
        message,
        r#"Widget added. <a href="/cart.php">View cart</a> or <a href="/">Continue shopping</a>, then <a href="/checkout">Check out</a>"#
    );
    assert!(page.has_class("[data-product-message]", "alert-success"));
    assert!(!page.is_disabled("[data-button-purchase]"));
    assert_eq!(did_update.borrow().len(), 1);
    assert!(!did_update.borrow()[0].0);

    page.platform.advance(Duration::from_millis(799));
    assert!(page.has_class(".spinner", "visible"));
    page.platform.advance(Duration::from_millis(1));
    assert!(!page.has_class(".spinner", "visible"));

    page.platform.advance(Duration::from_secs(30));
    assert_eq!(page.html("[data-product-message]"), "");
    assert!(!page.has_class("[data-product-message]", "alert-success"));
    assert_eq!(page.platform.pending_timers(), 0);
}

#[test]
fn test_add_to_cart_error_field() {
    let page = Page::new(true);
    let did_update = Rc::new(RefCell::new(Vec::new()));
    let did = Rc::clone(&did_update);
    let callbacks = Callbacks::default().with_did_update(move |is_error, outcome, _| {
        did.borrow_mut().push((is_error, outcome.clone()))
    });
    let controller = page.bind_with(ControllerOptions::new().with_callbacks(callbacks));
    page.api.reply_cart(Ok(CartAddData {
        error: Some("Only 2 left in stock".to_string()),
        ..Default::default()
    }));

    let button = page.find("[data-button-purchase]");
    controller.dispatch(DomEvent::Click { target: button });
    page.platform.run_until_stalled();

    assert_eq!(page.html("[data-product-message]"), "Only 2 left in stock");
    assert!(page.has_class("[data-product-message]", "alert-error"));
    assert!(page.platform.navigations().is_empty());
    assert!(page.platform.notifications().is_empty());
    assert!(!page.is_disabled("[data-button-purchase]"));
    assert_eq!(
        did_update.borrow()[0],
        (true, CartOutcome::Failed("Only 2 left in stock".to_string()))
    );

    page.platform.advance(Duration::ZERO);
    assert!(!page.has_class(".spinner", "visible"));
}

#[test]
fn test_add_to_cart_transport_error_is_shown_as_text() {
    let page = Page::new(true);
    let controller = page.bind();
    page.api
        .reply_cart(Err(ApiError::Transport("The network is offline".to_string())));

    let outcome = block_on(controller.add_to_cart());
    assert_eq!(
        outcome,
        Some(CartOutcome::Failed("The network is offline".to_string()))
    );
    assert_eq!(page.html("[data-product-message]"), "The network is offline");
    assert!(page.has_class("[data-product-message]", "alert-error"));
}

#[test]
fn test_disabled_purchase_button_ignores_clicks() {
    let page = Page::new(true);
    let controller = page.bind();
    let button = page.find("[data-button-purchase]");

    controller.dispatch(DomEvent::Click { target: button });
    let second = controller.dispatch(DomEvent::Click { target: button });
    assert!(!second.handled);

    page.platform.run_until_stalled();
    assert_eq!(page.api.cart_calls.borrow().len(), 1);
}

#[test]
fn test_option_change_during_cart_add_keeps_buttons_disabled() {
    let page = Page::new(true);
    let controller = page.bind();
    let button = page.find("[data-button-purchase]");
    {
        let mut doc = page.dom.borrow_mut();
        doc.add_class(button, "disabled");
    }

    assert!(controller.dispatch(DomEvent::Click { target: button }).handled);
    assert!(page.is_disabled("[data-button-purchase]"));

    // The option reply lands before the cart request has run.
    page.api.reply_option(Ok(in_stock(true, true)));
    let outcome = block_on(controller.on_option_change(None));
    assert!(matches!(outcome, OptionChangeOutcome::Applied));
    assert!(page.is_disabled("[data-button-purchase]"));
    assert!(!page.has_class("[data-button-purchase]", "disabled"));
    assert_eq!(page.html("[data-button-text]"), "Add to Cart");

    let second = controller.dispatch(DomEvent::Click { target: button });
    assert!(!second.handled);
    assert_eq!(block_on(controller.add_to_cart()), None);

    page.platform.run_until_stalled();
    assert_eq!(page.api.cart_calls.borrow().len(), 1);
    assert!(!page.is_disabled("[data-button-purchase]"));
}

#[test]
fn test_overlapping_option_changes_last_reply_wins() {
    let page = Page::new(true);
    let api = Rc::new(DeferredApi::default());
    let env = PageEnvironment {
        api: Rc::clone(&api) as Rc<dyn StorefrontApi>,
        ..page.env()
    };
    let controller =
        ProductOptionsController::bind(&env, page.section, ControllerOptions::new()).unwrap();
    controller.initialize(context(), None);

    let select = page.find("select");
    controller.dispatch(DomEvent::Change { target: select });
    controller.dispatch(DomEvent::Change { target: select });
    page.platform.run_until_stalled();
    assert_eq!(api.pending.borrow().len(), 2);

    let reply = |sku: &str, price: &str, purchasable: bool| -> OptionChangeData {
        serde_json::from_value(serde_json::json!({
            "price": {"without_tax": {"formatted": price, "value": 1.0}},
            "sku": sku,
            "purchasable": purchasable,
            "instock": true
        }))
        .unwrap()
    };

    // The second request answers first.
    api.answer(1, reply("WID-B", "$20.00", true));
    page.platform.run_until_stalled();
    assert_eq!(page.html("[data-product-sku]"), "WID-B");
    assert!(!page.is_disabled("[data-button-purchase]"));

    api.answer(0, reply("WID-A", "$9.00", false));
    page.platform.run_until_stalled();
    assert_eq!(page.html("[data-product-sku]"), "WID-A");
    assert!(page
        .html(r#"[data-product-price-wrapper="without-tax"]"#)
        .contains("$9.00"));
    assert!(page.is_disabled("[data-button-purchase]"));
    assert_eq!(page.html("[data-button-text]"), "Sold Out");
}

#[test]
fn test_platform_without_form_data() {
    let page = Page::with_platform(true, HeadlessPlatform::new().without_form_data());
    let controller = page.bind();

    assert_eq!(block_on(controller.add_to_cart()), None);
    assert!(page.api.cart_calls.borrow().is_empty());

    let select = page.find("select");
    let outcome = block_on(controller.on_option_change(Some(select)));
    assert!(matches!(outcome, OptionChangeOutcome::Skipped(SkipReason::NoFormData)));
    assert!(page.api.option_calls.borrow().is_empty());
}

#[test]
fn test_events_from_other_sections_are_ignored() {
    let page = Page::new(true);
    let other = page
        .dom
        .borrow_mut()
        .build(NodeId::ROOT, product_section(true, "88"));
    let controller = page.bind();

    let foreign_button = {
        let doc = page.dom.borrow();
        doc.query(other, &Selector::parse("[data-button-purchase]").unwrap())
            .unwrap()
    };
    let foreign_select = {
        let doc = page.dom.borrow();
        doc.query(other, &Selector::parse("select").unwrap()).unwrap()
    };

    assert!(!controller.dispatch(DomEvent::Click { target: foreign_button }).handled);
    assert!(!controller.dispatch(DomEvent::Change { target: foreign_select }).handled);

    // A signal raised by another section's input is not ours to handle.
    page.bus.emit(PRODUCT_OPTION_CHANGE, Some(foreign_select));
    page.platform.run_until_stalled();
    assert!(page.api.option_calls.borrow().is_empty());
}

#[test]
fn test_dropping_controller_unsubscribes_and_cancels_timers() {
    let page = Page::new(true);
    let controller = page.bind();
    assert_eq!(page.bus.subscriber_count(PRODUCT_OPTION_CHANGE), 1);

    let button = page.find("[data-button-purchase]");
    controller.dispatch(DomEvent::Click { target: button });
    page.platform.run_until_stalled();
    let message = page.html("[data-product-message]");
    assert!(!message.is_empty());

    drop(controller);
    assert_eq!(page.bus.subscriber_count(PRODUCT_OPTION_CHANGE), 0);

    page.platform.advance(Duration::from_secs(60));
    assert_eq!(page.html("[data-product-message]"), message);
}

#[test]
fn test_bind_requires_product_id() {
    let mut doc = Document::new();
    let root = doc.root();
    let section = doc.build(root, el("div").child(el("form").attr("data-product-form", "")));
    let env = PageEnvironment {
        dom: shared(doc),
        api: Rc::new(MockApi::default()),
        platform: Rc::new(HeadlessPlatform::new()),
        bus: SignalBus::new(),
    };

    let err = ProductOptionsController::bind(&env, section, ControllerOptions::new()).unwrap_err();
    assert!(matches!(err, PdpError::MissingElement(_)));
}

#[test]
fn test_rebind_picks_up_rerendered_options() {
    let page = Page::new(true);
    let controller = page.bind();
    let select = page.find("select");
    let extra = page.dom.borrow_mut().build(
        select,
        el("option")
            .attr("value", "4")
            .attr("data-product-attribute-value", "4")
            .text("XL"),
    );
    let data: OptionChangeData = serde_json::from_value(serde_json::json!({
        "out_of_stock_behavior": "hide_option",
        "in_stock_attributes": [1]
    }))
    .unwrap();

    controller.update_attribute_availability(Some(&data));
    assert!(!page.dom.borrow().is_hidden(extra));

    controller.rebind_attributes();
    controller.update_attribute_availability(Some(&data));
    assert!(page.dom.borrow().is_hidden(extra));
}
