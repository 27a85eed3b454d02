//! The product message area.

use turbo_dom::{Document, NodeId};

use crate::context::ProductContext;

/// Class for a successful cart add.
pub const ALERT_SUCCESS: &str = "alert-success";
/// Class for errors and purchasing messages.
pub const ALERT_ERROR: &str = "alert-error";

/// Fill the `addSuccess` template. Each token is replaced at most once.
pub fn render_success_message(context: &ProductContext, product_title: &str) -> String {
    let cart_link = format!(r#"<a href="{}">{}</a>"#, context.urls_cart, context.cart_link);
    let continue_link = format!(r#"<a href="/">{}</a>"#, context.home_link);
    let checkout_link = format!(
        r#"<a href="{}">{}</a>"#,
        context.urls_checkout, context.checkout_link
    );

    context
        .add_success
        .replacen("*product*", product_title, 1)
        .replacen("*cart_link*", &cart_link, 1)
        .replacen("*continue_link*", &continue_link, 1)
        .replacen("*checkout_link*", &checkout_link, 1)
}

/// Empty every message element and drop both alert classes.
pub fn clear_message(doc: &mut Document, messages: &[NodeId]) {
    for &node in messages {
        doc.empty(node);
        doc.remove_class(node, ALERT_SUCCESS);
        doc.remove_class(node, ALERT_ERROR);
    }
}

/// Show `markup` styled as an error or a success.
pub fn show_message(doc: &mut Document, messages: &[NodeId], markup: &str, is_error: bool) {
    for &node in messages {
        doc.set_html(node, markup);
        doc.set_class(node, ALERT_ERROR, is_error);
        doc.set_class(node, ALERT_SUCCESS, !is_error);
    }
}
