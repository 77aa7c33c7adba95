//! Host tree boundary trait
//!
//! Selections talk to the scene tree only through [`HostTree`], so any tree
//! that offers this capability set can be driven by a selection.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use crate::domain::{Datum, DomainResult};

/// Namespace used for every element created by `append`.
pub const SVG_NAMESPACE: &str = "http://www.w3.org/2000/svg";

/// Shared handle to a host tree.
///
/// Selections derived from one another share the same tree; `Rc<RefCell<_>>`
/// keeps that sharing single-threaded.
pub type HostRef<H> = Rc<RefCell<H>>;

/// Wraps a host tree for use by selections.
pub fn host_ref<H: HostTree>(host: H) -> HostRef<H> {
    Rc::new(RefCell::new(host))
}

/// Minimal capability set a scene tree must supply.
pub trait HostTree {
    /// Node handle; cheap to copy and compare.
    type Node: Copy + Eq + fmt::Debug;

    /// The document node every root query starts from.
    fn root(&self) -> Self::Node;

    /// First descendant of `scope` matching `selector`, in document order.
    fn query_selector(&self, scope: Self::Node, selector: &str) -> DomainResult<Option<Self::Node>>;

    /// All descendants of `scope` matching `selector`, in document order.
    fn query_selector_all(&self, scope: Self::Node, selector: &str) -> DomainResult<Vec<Self::Node>>;

    /// Creates a detached element in `namespace`.
    fn create_element_ns(&mut self, namespace: &str, name: &str) -> Self::Node;

    /// Appends `child` as the last child of `parent`.
    fn append_child(&mut self, parent: Self::Node, child: Self::Node) -> DomainResult<()>;

    fn get_attribute(&self, node: Self::Node, name: &str) -> DomainResult<Option<String>>;

    fn set_attribute(&mut self, node: Self::Node, name: &str, value: &str) -> DomainResult<()>;

    /// Whether `node` carries an inline style declaration.
    fn has_style(&self, node: Self::Node) -> bool;

    fn get_style(&self, node: Self::Node, name: &str) -> DomainResult<Option<String>>;

    fn set_style(&mut self, node: Self::Node, name: &str, value: &str) -> DomainResult<()>;

    /// Concatenated text of all descendant text nodes.
    fn text_content(&self, node: Self::Node) -> DomainResult<String>;

    /// Replaces all children of `node` with a single text node.
    fn set_text_content(&mut self, node: Self::Node, text: &str) -> DomainResult<()>;

    /// Datum bound to `node`, if any.
    fn datum(&self, node: Self::Node) -> DomainResult<Option<Datum>>;

    fn set_datum(&mut self, node: Self::Node, datum: Datum) -> DomainResult<()>;
}
