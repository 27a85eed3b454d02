//! Arena-backed element tree.
//!
//! Every mutating method silently ignores unknown node ids, the same way an
//! empty jQuery selection swallows writes. Callers that care about presence
//! check with [`Document::get`] or a query first.

use std::collections::BTreeMap;

use crate::{NodeId, Selector};

const DOCUMENT_TAG: &str = "#document";

/// A single element in the document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element {
    tag: String,
    attributes: BTreeMap<String, String>,
    classes: Vec<String>,
    /// Inner markup or text, stored verbatim.
    content: String,
    hidden: bool,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

impl Element {
    fn new(tag: &str) -> Self {
        Self {
            tag: tag.to_ascii_lowercase(),
            attributes: BTreeMap::new(),
            classes: Vec::new(),
            content: String::new(),
            hidden: false,
            parent: None,
            children: Vec::new(),
        }
    }

    /// Lowercased tag name.
    pub fn tag(&self) -> &str {
        &self.tag
    }

    /// Get an attribute value.
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attributes.get(name).map(|s| s.as_str())
    }

    /// Check whether an attribute is present (with any value).
    pub fn has_attr(&self, name: &str) -> bool {
        self.attributes.contains_key(name)
    }

    /// Check whether the element carries a class.
    pub fn has_class(&self, class: &str) -> bool {
        self.classes.iter().any(|c| c == class)
    }

    /// Classes in insertion order.
    pub fn classes(&self) -> &[String] {
        &self.classes
    }

    /// Inner content.
    pub fn content(&self) -> &str {
        &self.content
    }

    /// Whether the element is hidden (`display: none`).
    pub fn is_hidden(&self) -> bool {
        self.hidden
    }

    /// Parent element, `None` for the root and detached nodes.
    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    /// Child elements in document order.
    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    fn is_document(&self) -> bool {
        self.tag == DOCUMENT_TAG
    }
}

/// The element tree a controller reads from and patches.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    nodes: Vec<Element>,
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

impl Document {
    /// Create an empty document containing only the root.
    pub fn new() -> Self {
        Self {
            nodes: vec![Element::new(DOCUMENT_TAG)],
        }
    }

    /// The document root.
    pub fn root(&self) -> NodeId {
        NodeId::ROOT
    }

    /// Number of nodes ever allocated, including detached ones.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// A document always holds its root.
    pub fn is_empty(&self) -> bool {
        false
    }

    /// Get an element by id.
    pub fn get(&self, id: NodeId) -> Option<&Element> {
        self.nodes.get(id.index())
    }

    fn get_mut(&mut self, id: NodeId) -> Option<&mut Element> {
        self.nodes.get_mut(id.index())
    }

    /// Allocate a detached element.
    pub fn create_element(&mut self, tag: &str) -> NodeId {
        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(Element::new(tag));
        id
    }

    /// Append `child` as the last child of `parent`, moving it if attached elsewhere.
    pub fn append_child(&mut self, parent: NodeId, child: NodeId) {
        if parent == child || self.get(parent).is_none() || self.get(child).is_none() {
            return;
        }
        // Refuse to create a cycle.
        if self.contains(child, parent) {
            return;
        }
        self.detach(child);
        if let Some(el) = self.get_mut(child) {
            el.parent = Some(parent);
        }
        if let Some(el) = self.get_mut(parent) {
            el.children.push(child);
        }
    }

    /// Remove an element from its parent. The subtree stays allocated.
    pub fn detach(&mut self, id: NodeId) {
        let Some(parent) = self.parent(id) else {
            return;
        };
        if let Some(el) = self.get_mut(parent) {
            el.children.retain(|c| *c != id);
        }
        if let Some(el) = self.get_mut(id) {
            el.parent = None;
        }
    }

    /// Materialize a builder under `parent` and return the new subtree root.
    pub fn build(&mut self, parent: NodeId, builder: ElementBuilder) -> NodeId {
        let id = self.create_element(&builder.tag);
        if let Some(el) = self.get_mut(id) {
            for (name, value) in builder.attributes {
                el.attributes.insert(name, value);
            }
            for class in builder.classes {
                if !el.has_class(&class) {
                    el.classes.push(class);
                }
            }
            el.content = builder.content;
            el.hidden = builder.hidden;
        }
        self.append_child(parent, id);
        for child in builder.children {
            self.build(id, child);
        }
        id
    }

    /// Tag name of an element.
    pub fn tag(&self, id: NodeId) -> Option<&str> {
        self.get(id).map(Element::tag)
    }

    // -- attributes ---------------------------------------------------------

    /// Get an attribute value.
    pub fn attr(&self, id: NodeId, name: &str) -> Option<&str> {
        self.get(id).and_then(|el| el.attr(name))
    }

    /// Check whether an attribute is present.
    pub fn has_attr(&self, id: NodeId, name: &str) -> bool {
        self.get(id).is_some_and(|el| el.has_attr(name))
    }

    /// Set an attribute. `class` is routed to the class list.
    pub fn set_attr(&mut self, id: NodeId, name: &str, value: impl Into<String>) {
        let value = value.into();
        let Some(el) = self.get_mut(id) else {
            return;
        };
        if name == "class" {
            el.classes = split_classes(&value);
        } else {
            el.attributes.insert(name.to_string(), value);
        }
    }

    /// Remove an attribute.
    pub fn remove_attr(&mut self, id: NodeId, name: &str) {
        if let Some(el) = self.get_mut(id) {
            el.attributes.remove(name);
        }
    }

    /// Current value of a form control.
    pub fn value(&self, id: NodeId) -> Option<&str> {
        self.attr(id, "value")
    }

    /// Write the value of a form control.
    pub fn set_value(&mut self, id: NodeId, value: impl Into<String>) {
        self.set_attr(id, "value", value);
    }

    /// Whether the `disabled` flag is set.
    pub fn is_disabled(&self, id: NodeId) -> bool {
        self.has_attr(id, "disabled")
    }

    /// Set or clear the `disabled` flag.
    pub fn set_disabled(&mut self, id: NodeId, disabled: bool) {
        if disabled {
            self.set_attr(id, "disabled", "disabled");
        } else {
            self.remove_attr(id, "disabled");
        }
    }

    // -- classes ------------------------------------------------------------

    /// Check whether an element carries a class.
    pub fn has_class(&self, id: NodeId, class: &str) -> bool {
        self.get(id).is_some_and(|el| el.has_class(class))
    }

    /// Add a class if absent.
    pub fn add_class(&mut self, id: NodeId, class: &str) {
        if let Some(el) = self.get_mut(id) {
            if !el.has_class(class) {
                el.classes.push(class.to_string());
            }
        }
    }

    /// Remove a class if present.
    pub fn remove_class(&mut self, id: NodeId, class: &str) {
        if let Some(el) = self.get_mut(id) {
            el.classes.retain(|c| c != class);
        }
    }

    /// Add or remove a class depending on `enabled`.
    pub fn set_class(&mut self, id: NodeId, class: &str, enabled: bool) {
        if enabled {
            self.add_class(id, class);
        } else {
            self.remove_class(id, class);
        }
    }

    /// Flip a class.
    pub fn toggle_class(&mut self, id: NodeId, class: &str) {
        let present = self.has_class(id, class);
        self.set_class(id, class, !present);
    }

    // -- visibility ---------------------------------------------------------

    /// Whether an element is hidden.
    pub fn is_hidden(&self, id: NodeId) -> bool {
        self.get(id).is_some_and(Element::is_hidden)
    }

    /// Hide or show an element.
    pub fn set_hidden(&mut self, id: NodeId, hidden: bool) {
        if let Some(el) = self.get_mut(id) {
            el.hidden = hidden;
        }
    }

    // -- content ------------------------------------------------------------

    /// Inner markup of an element.
    pub fn html(&self, id: NodeId) -> &str {
        self.get(id).map(Element::content).unwrap_or("")
    }

    /// Replace the inner markup. Child elements are detached.
    pub fn set_html(&mut self, id: NodeId, markup: impl Into<String>) {
        let children = self.children(id).to_vec();
        for child in children {
            self.detach(child);
        }
        if let Some(el) = self.get_mut(id) {
            el.content = markup.into();
        }
    }

    /// Text content of an element and its descendants, in document order.
    pub fn text(&self, id: NodeId) -> String {
        let mut out = String::new();
        self.collect_text(id, &mut out);
        out
    }

    fn collect_text(&self, id: NodeId, out: &mut String) {
        let Some(el) = self.get(id) else {
            return;
        };
        out.push_str(&el.content);
        for child in &el.children {
            self.collect_text(*child, out);
        }
    }

    /// Replace the content with plain text.
    pub fn set_text(&mut self, id: NodeId, text: impl Into<String>) {
        self.set_html(id, text);
    }

    /// Clear the content and detach all children.
    pub fn empty(&mut self, id: NodeId) {
        self.set_html(id, String::new());
    }

    // -- traversal ----------------------------------------------------------

    /// Parent of an element.
    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.get(id).and_then(Element::parent)
    }

    /// Children of an element.
    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.get(id).map(Element::children).unwrap_or(&[])
    }

    /// Ancestors from the parent up to the root.
    pub fn ancestors(&self, id: NodeId) -> Ancestors<'_> {
        Ancestors {
            document: self,
            next: self.parent(id),
        }
    }

    /// Descendants in document order, excluding `id` itself.
    pub fn descendants(&self, id: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack: Vec<NodeId> = self.children(id).iter().rev().copied().collect();
        while let Some(next) = stack.pop() {
            out.push(next);
            stack.extend(self.children(next).iter().rev().copied());
        }
        out
    }

    /// Whether `id` is `ancestor` or lies inside it.
    pub fn contains(&self, ancestor: NodeId, id: NodeId) -> bool {
        id == ancestor || self.ancestors(id).any(|a| a == ancestor)
    }

    // -- selectors ----------------------------------------------------------

    /// Whether an element matches a selector.
    pub fn matches(&self, id: NodeId, selector: &Selector) -> bool {
        selector.matches(self, id)
    }

    /// All descendants of `scope` matching `selector`, in document order.
    pub fn query_all(&self, scope: NodeId, selector: &Selector) -> Vec<NodeId> {
        self.descendants(scope)
            .into_iter()
            .filter(|id| selector.matches(self, *id))
            .collect()
    }

    /// First descendant of `scope` matching `selector`.
    pub fn query(&self, scope: NodeId, selector: &Selector) -> Option<NodeId> {
        self.descendants(scope)
            .into_iter()
            .find(|id| selector.matches(self, *id))
    }

    /// Direct children of `id` matching `selector`.
    pub fn children_matching(&self, id: NodeId, selector: &Selector) -> Vec<NodeId> {
        self.children(id)
            .iter()
            .copied()
            .filter(|c| selector.matches(self, *c))
            .collect()
    }

    /// The element itself or its nearest ancestor matching `selector`.
    pub fn closest(&self, id: NodeId, selector: &Selector) -> Option<NodeId> {
        if selector.matches(self, id) {
            return Some(id);
        }
        self.ancestors(id).find(|a| selector.matches(self, *a))
    }

    pub(crate) fn is_document_node(&self, id: NodeId) -> bool {
        self.get(id).map_or(true, Element::is_document)
    }
}

/// Iterator over the ancestors of an element.
pub struct Ancestors<'a> {
    document: &'a Document,
    next: Option<NodeId>,
}

impl Iterator for Ancestors<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        let current = self.next?;
        self.next = self.document.parent(current);
        Some(current)
    }
}

fn split_classes(value: &str) -> Vec<String> {
    let mut classes: Vec<String> = Vec::new();
    for class in value.split_whitespace() {
        if !classes.iter().any(|c| c == class) {
            classes.push(class.to_string());
        }
    }
    classes
}

/// Fluent description of an element subtree, materialized by [`Document::build`].
#[derive(Debug, Clone)]
pub struct ElementBuilder {
    tag: String,
    attributes: Vec<(String, String)>,
    classes: Vec<String>,
    content: String,
    hidden: bool,
    children: Vec<ElementBuilder>,
}

/// Start building an element.
pub fn el(tag: &str) -> ElementBuilder {
    ElementBuilder::new(tag)
}

impl ElementBuilder {
    /// Create a builder for `tag`.
    pub fn new(tag: &str) -> Self {
        Self {
            tag: tag.to_string(),
            attributes: Vec::new(),
            classes: Vec::new(),
            content: String::new(),
            hidden: false,
            children: Vec::new(),
        }
    }

    /// Set an attribute. `class` is split into the class list.
    pub fn attr(mut self, name: &str, value: impl Into<String>) -> Self {
        let value = value.into();
        if name == "class" {
            self.classes.extend(split_classes(&value));
        } else {
            self.attributes.push((name.to_string(), value));
        }
        self
    }

    /// Set a valueless attribute such as `data-button-purchase` or `checked`.
    pub fn flag(self, name: &str) -> Self {
        self.attr(name, "")
    }

    /// Add a class.
    pub fn class(mut self, class: &str) -> Self {
        self.classes.push(class.to_string());
        self
    }

    /// Set the inner text.
    pub fn text(mut self, text: impl Into<String>) -> Self {
        self.content = text.into();
        self
    }

    /// Start hidden.
    pub fn hidden(mut self) -> Self {
        self.hidden = true;
        self
    }

    /// Append a child.
    pub fn child(mut self, child: ElementBuilder) -> Self {
        self.children.push(child);
        self
    }

    /// Append several children.
    pub fn children(mut self, children: impl IntoIterator<Item = ElementBuilder>) -> Self {
        self.children.extend(children);
        self
    }
}
