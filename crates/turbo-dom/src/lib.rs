//! In-memory document model for TurboCommerce client controllers.
//!
//! Controllers never touch the browser directly. They read and patch a
//! [`Document`] built from the product section's markup. The embedding page
//! owns that markup and writes patched fragments back to the live DOM.
//!
//! This crate provides:
//! - `Document` - Arena-backed element tree with attributes, classes and content
//! - `ElementBuilder` - Fluent construction of subtrees
//! - `Selector` - The small CSS subset product templates rely on
//! - `FormData` / `serialize_form` - Successful-control collection for forms

use std::cell::RefCell;
use std::rc::Rc;

mod document;
mod form;
mod selector;

pub use document::*;
pub use form::*;
pub use selector::*;

/// Node identifier (index into the document arena).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub(crate) u32);

impl NodeId {
    /// The document root.
    pub const ROOT: NodeId = NodeId(0);

    pub(crate) fn index(self) -> usize {
        self.0 as usize
    }
}

impl std::fmt::Display for NodeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A document shared between a controller, its timers and its spawned tasks.
pub type SharedDocument = Rc<RefCell<Document>>;

/// Wrap a document for sharing on the UI thread.
pub fn shared(document: Document) -> SharedDocument {
    Rc::new(RefCell::new(document))
}
