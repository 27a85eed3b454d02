//! Attribute value availability.
//!
//! Each `[data-product-attribute-value]` element belongs to an attribute
//! group whose `data-product-attribute` marker says how it is rendered.
//! The marker is read once when the controller binds and kept as an
//! [`AttributeKind`].

use turbo_dom::{Document, NodeId};

use crate::data::{OptionChangeData, OutOfStockBehavior};
use crate::quantity::parse_int;
use crate::view::Selectors;

/// Class added to labelled-out values outside select menus.
pub const OPTION_UNAVAILABLE: &str = "option-unavailable";

/// How an attribute group renders its values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AttributeKind {
    /// Colour or pattern swatches.
    Swatch,
    /// `<option>` elements of a select menu.
    Select,
    /// Radio buttons, rectangles and product lists.
    RadioList,
    /// Any other marker, or none.
    Other,
}

impl AttributeKind {
    /// Map a `data-product-attribute` marker.
    pub fn from_marker(marker: Option<&str>) -> Self {
        match marker.map(str::trim) {
            Some("set-select") => Self::Select,
            Some("swatch") => Self::Swatch,
            Some("set-radio") | Some("set-rectangle") | Some("product-list") => Self::RadioList,
            _ => Self::Other,
        }
    }
}

/// An attribute value element and what it was bound as.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AttributeBinding {
    pub node: NodeId,
    /// Parsed `data-product-attribute-value`; `None` when it is not a number.
    pub value_id: Option<u64>,
    pub kind: AttributeKind,
}

/// Scan `container` for attribute values.
pub fn bind_attributes(
    doc: &Document,
    container: NodeId,
    selectors: &Selectors,
) -> Vec<AttributeBinding> {
    doc.query_all(container, &selectors.attribute_value)
        .into_iter()
        .map(|node| {
            let value_id = doc
                .attr(node, "data-product-attribute-value")
                .and_then(parse_int)
                .and_then(|id| u64::try_from(id).ok());
            let marker = doc
                .closest(node, &selectors.attribute)
                .and_then(|group| doc.attr(group, "data-product-attribute"));
            AttributeBinding {
                node,
                value_id,
                kind: AttributeKind::from_marker(marker),
            }
        })
        .collect()
}

/// Enable or disable every bound value according to `data`.
///
/// Returns how many values were visited; zero when the behaviour is
/// neither hide nor label. Applying the same data twice leaves the
/// document as applying it once.
pub fn apply_availability(
    doc: &mut Document,
    bindings: &[AttributeBinding],
    data: &OptionChangeData,
) -> usize {
    let behavior = data.behavior();
    if !behavior.is_active() {
        return 0;
    }
    let suffix = data
        .out_of_stock_message
        .as_deref()
        .map(|message| format!(" ({})", message));

    for binding in bindings {
        let in_stock = binding.value_id.is_some_and(|id| data.is_in_stock(id));
        match binding.kind {
            AttributeKind::Select => {
                toggle_select_option(doc, binding.node, in_stock, behavior, suffix.as_deref())
            }
            AttributeKind::Swatch | AttributeKind::RadioList | AttributeKind::Other => {
                toggle_value(doc, binding.node, in_stock, behavior)
            }
        }
    }
    bindings.len()
}

fn toggle_select_option(
    doc: &mut Document,
    node: NodeId,
    in_stock: bool,
    behavior: OutOfStockBehavior,
    suffix: Option<&str>,
) {
    if behavior == OutOfStockBehavior::HideOption {
        doc.set_hidden(node, !in_stock);
        doc.set_disabled(node, !in_stock);
        return;
    }

    doc.set_disabled(node, !in_stock);
    let Some(suffix) = suffix else {
        return;
    };
    let mut label = doc.html(node).replacen(suffix, "", 1);
    if !in_stock {
        label.push_str(suffix);
    }
    doc.set_html(node, label);
}

fn toggle_value(doc: &mut Document, node: NodeId, in_stock: bool, behavior: OutOfStockBehavior) {
    if behavior == OutOfStockBehavior::HideOption {
        doc.set_hidden(node, !in_stock);
    } else {
        doc.set_class(node, OPTION_UNAVAILABLE, !in_stock);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use turbo_dom::el;

    fn page() -> (Document, NodeId) {
        let mut doc = Document::new();
        let root = doc.root();
        let container = doc.build(
            root,
            el("div").children([
                el("div").attr("data-product-attribute", "set-select").child(
                    el("select").children([
                        el("option").attr("data-product-attribute-value", "1").text("Small"),
                        el("option").attr("data-product-attribute-value", "2").text("Medium"),
                        el("option").attr("data-product-attribute-value", "3").text("Large"),
                    ]),
                ),
                el("div").attr("data-product-attribute", "swatch").children([
                    el("label").attr("data-product-attribute-value", "10"),
                    el("label").attr("data-product-attribute-value", "11"),
                ]),
                el("div").attr("data-product-attribute", "set-radio").child(
                    el("input").attr("data-product-attribute-value", "not-a-number"),
                ),
            ]),
        );
        (doc, container)
    }

    fn data(behavior: &str, in_stock: Vec<u64>) -> OptionChangeData {
        serde_json::from_value(serde_json::json!({
            "out_of_stock_behavior": behavior,
            "in_stock_attributes": in_stock,
            "out_of_stock_message": "Out of stock",
        }))
        .unwrap()
    }

    #[test]
    fn test_kind_from_marker() {
        assert_eq!(AttributeKind::from_marker(Some("set-select")), AttributeKind::Select);
        assert_eq!(AttributeKind::from_marker(Some("swatch")), AttributeKind::Swatch);
        assert_eq!(AttributeKind::from_marker(Some("set-rectangle")), AttributeKind::RadioList);
        assert_eq!(AttributeKind::from_marker(Some("product-list")), AttributeKind::RadioList);
        assert_eq!(AttributeKind::from_marker(Some("input-text")), AttributeKind::Other);
        assert_eq!(AttributeKind::from_marker(None), AttributeKind::Other);
    }

    #[test]
    fn test_bind_reads_ids_and_kinds() {
        let (doc, container) = page();
        let bindings = bind_attributes(&doc, container, &Selectors::new().unwrap());
        assert_eq!(bindings.len(), 6);
        assert_eq!(bindings[0].value_id, Some(1));
        assert_eq!(bindings[0].kind, AttributeKind::Select);
        assert_eq!(bindings[3].kind, AttributeKind::Swatch);
        assert_eq!(bindings[5].value_id, None);
        assert_eq!(bindings[5].kind, AttributeKind::RadioList);
    }

    #[test]
    fn test_label_option_marks_select_and_swatch() {
        let (mut doc, container) = page();
        let bindings = bind_attributes(&doc, container, &Selectors::new().unwrap());
        apply_availability(&mut doc, &bindings, &data("label_option", vec![1, 2, 10]));

        let large = bindings[2].node;
        assert!(doc.is_disabled(large));
        assert_eq!(doc.html(large), "Large (Out of stock)");
        assert!(!doc.is_disabled(bindings[0].node));
        assert_eq!(doc.html(bindings[0].node), "Small");

        assert!(!doc.has_class(bindings[3].node, OPTION_UNAVAILABLE));
        assert!(doc.has_class(bindings[4].node, OPTION_UNAVAILABLE));
        // Unparseable ids are never in stock.
        assert!(doc.has_class(bindings[5].node, OPTION_UNAVAILABLE));
    }

    #[test]
    fn test_label_option_is_idempotent_and_reversible() {
        let (mut doc, container) = page();
        let bindings = bind_attributes(&doc, container, &Selectors::new().unwrap());
        let sold_out = data("label_option", vec![1, 2]);

        apply_availability(&mut doc, &bindings, &sold_out);
        let once = doc.clone();
        apply_availability(&mut doc, &bindings, &sold_out);
        assert_eq!(doc, once);
        assert_eq!(doc.html(bindings[2].node).matches("(Out of stock)").count(), 1);

        apply_availability(&mut doc, &bindings, &data("label_option", vec![1, 2, 3]));
        assert_eq!(doc.html(bindings[2].node), "Large");
        assert!(!doc.is_disabled(bindings[2].node));
    }

    #[test]
    fn test_hide_option() {
        let (mut doc, container) = page();
        let bindings = bind_attributes(&doc, container, &Selectors::new().unwrap());
        apply_availability(&mut doc, &bindings, &data("hide_option", vec![2, 11]));

        assert!(doc.is_hidden(bindings[0].node));
        assert!(!doc.is_hidden(bindings[1].node));
        assert!(doc.is_hidden(bindings[3].node));
        assert!(!doc.is_hidden(bindings[4].node));
        assert_eq!(doc.html(bindings[0].node), "Small");
    }

    #[test]
    fn test_inactive_behavior_is_noop() {
        let (mut doc, container) = page();
        let bindings = bind_attributes(&doc, container, &Selectors::new().unwrap());
        let before = doc.clone();
        assert_eq!(apply_availability(&mut doc, &bindings, &data("do_nothing", vec![])), 0);
        assert_eq!(doc, before);
    }

    #[test]
    fn test_missing_message_leaves_labels() {
        let (mut doc, container) = page();
        let bindings = bind_attributes(&doc, container, &Selectors::new().unwrap());
        let data = OptionChangeData {
            out_of_stock_behavior: Some(OutOfStockBehavior::LabelOption),
            in_stock_attributes: vec![1],
            ..Default::default()
        };
        apply_availability(&mut doc, &bindings, &data);
        assert!(doc.is_disabled(bindings[1].node));
        assert_eq!(doc.html(bindings[1].node), "Medium");
    }
}
