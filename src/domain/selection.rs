//! Selections and the index-based data join.
//!
//! A [`Selection`] is an ordered sequence of slots over a host tree plus the
//! parent sequence that acts as the context for queries and appends. Every
//! operation is applied positionally and independently per slot; an absent
//! slot (`None`) is skipped and stays absent in the result.
//!
//! # Data join
//!
//! [`Selection::data`] pairs slots with data **by index**, not by key:
//! reordering the data reassigns values to existing nodes by position. Slots
//! without a node receive a pending placeholder ([`Entry::Pending`]) that
//! [`Selection::enter`] collects and [`EnterSelection::append`] materializes.
//! No exit selection is computed.
//!
//! ```rust
//! use rsviz::domain::{host_ref, select_node, Document, Value};
//!
//! let host = host_ref(Document::new());
//! let root = host.borrow().root();
//! let svg = select_node(&host, root).append("svg").unwrap();
//!
//! let bars = svg
//!     .select_all("rect")
//!     .unwrap()
//!     .data([4.0, 8.0, 15.0])
//!     .unwrap()
//!     .enter()
//!     .append("rect")
//!     .unwrap()
//!     .attr("height", Value::computed(|d, _| d.as_f64().unwrap_or(0.0) * 10.0))
//!     .unwrap();
//!
//! assert_eq!(bars.len(), 3);
//! assert_eq!(bars.get_attr("height").unwrap().as_deref(), Some("40"));
//! ```

use std::fmt;

use itertools::{EitherOrBoth, Itertools};
use tracing::{debug, instrument, trace};

use crate::domain::document::NodeId;
use crate::domain::host::{HostRef, HostTree, SVG_NAMESPACE};
use crate::domain::{Datum, DomainError, DomainResult};

/// One slot of a selection.
#[derive(Debug, Clone, PartialEq)]
pub enum Entry<N> {
    /// A node of the host tree.
    Real(N),
    /// A placeholder created by a data join; it has no tree identity.
    Pending(Datum),
}

/// Value written by `attr`, `style` and `text`: a constant or a function of
/// the bound datum and the slot index.
pub enum Value<N = NodeId> {
    Constant(String),
    Computed(Box<dyn Fn(&Datum, usize) -> String>),
    /// Like `Computed`, but also receives the node being written.
    WithNode(Box<dyn Fn(N, &Datum, usize) -> String>),
}

impl<N> Value<N> {
    pub fn constant(value: impl ToString) -> Self {
        Value::Constant(value.to_string())
    }

    pub fn computed<F, T>(f: F) -> Self
    where
        F: Fn(&Datum, usize) -> T + 'static,
        T: ToString,
    {
        Value::Computed(Box::new(move |d, i| f(d, i).to_string()))
    }

    pub fn with_node<F, T>(f: F) -> Self
    where
        F: Fn(N, &Datum, usize) -> T + 'static,
        T: ToString,
    {
        Value::WithNode(Box::new(move |n, d, i| f(n, d, i).to_string()))
    }

    fn is_constant(&self) -> bool {
        matches!(self, Value::Constant(_))
    }

    fn resolve(&self, node: N, datum: &Datum, index: usize) -> String {
        match self {
            Value::Constant(v) => v.clone(),
            Value::Computed(f) => f(datum, index),
            Value::WithNode(f) => f(node, datum, index),
        }
    }
}

impl<N> fmt::Debug for Value<N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Constant(v) => f.debug_tuple("Constant").field(v).finish(),
            Value::Computed(_) => f.write_str("Computed(..)"),
            Value::WithNode(_) => f.write_str("WithNode(..)"),
        }
    }
}

impl<N> From<&str> for Value<N> {
    fn from(value: &str) -> Self {
        Value::Constant(value.to_string())
    }
}

impl<N> From<String> for Value<N> {
    fn from(value: String) -> Self {
        Value::Constant(value)
    }
}

impl<N> From<&String> for Value<N> {
    fn from(value: &String) -> Self {
        Value::Constant(value.clone())
    }
}

impl<N> From<f64> for Value<N> {
    fn from(value: f64) -> Self {
        Value::constant(value)
    }
}

impl<N> From<i32> for Value<N> {
    fn from(value: i32) -> Self {
        Value::constant(value)
    }
}

impl<N> From<i64> for Value<N> {
    fn from(value: i64) -> Self {
        Value::constant(value)
    }
}

impl<N> From<usize> for Value<N> {
    fn from(value: usize) -> Self {
        Value::constant(value)
    }
}

impl<N> From<&Datum> for Value<N> {
    fn from(value: &Datum) -> Self {
        Value::constant(value)
    }
}

/// Root selection of length 1: the first match of `selector` below the
/// host's document node, or an absent slot when nothing matches.
#[instrument(level = "debug", skip(host))]
pub fn select<H: HostTree>(host: &HostRef<H>, selector: &str) -> DomainResult<Selection<H>> {
    let node = {
        let tree = host.borrow();
        let root = tree.root();
        tree.query_selector(root, selector)?
    };
    debug!("select: '{}' found={}", selector, node.is_some());
    Ok(Selection::new(
        host.clone(),
        vec![node.map(Entry::Real)],
        vec![None],
    ))
}

/// Root selection of length 1 over an explicit node.
pub fn select_node<H: HostTree>(host: &HostRef<H>, node: H::Node) -> Selection<H> {
    Selection::new(host.clone(), vec![Some(Entry::Real(node))], vec![None])
}

/// Ordered slots over a host tree plus their parent context.
pub struct Selection<H: HostTree> {
    host: HostRef<H>,
    nodes: Vec<Option<Entry<H::Node>>>,
    parents: Vec<Option<H::Node>>,
}

impl<H: HostTree> Clone for Selection<H> {
    fn clone(&self) -> Self {
        Self {
            host: self.host.clone(),
            nodes: self.nodes.clone(),
            parents: self.parents.clone(),
        }
    }
}

impl<H: HostTree> fmt::Debug for Selection<H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Selection")
            .field("nodes", &self.nodes)
            .field("parents", &self.parents)
            .finish()
    }
}

/// Resolves a slot to a tree node, rejecting pending placeholders.
fn tree_node<N: Copy>(
    entry: &Option<Entry<N>>,
    index: usize,
    operation: &'static str,
) -> DomainResult<Option<N>> {
    match entry {
        None => Ok(None),
        Some(Entry::Real(node)) => Ok(Some(*node)),
        Some(Entry::Pending(_)) => Err(DomainError::PendingNode { operation, index }),
    }
}

impl<H: HostTree> Selection<H> {
    pub fn new(
        host: HostRef<H>,
        nodes: Vec<Option<Entry<H::Node>>>,
        parents: Vec<Option<H::Node>>,
    ) -> Self {
        Self {
            host,
            nodes,
            parents,
        }
    }

    pub fn host(&self) -> &HostRef<H> {
        &self.host
    }

    /// Number of slots, absent ones included.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Number of present slots (real or pending).
    pub fn size(&self) -> usize {
        self.nodes.iter().flatten().count()
    }

    pub fn entries(&self) -> &[Option<Entry<H::Node>>] {
        &self.nodes
    }

    pub fn parents(&self) -> &[Option<H::Node>] {
        &self.parents
    }

    /// Tree nodes of the selection in slot order, skipping absent and
    /// pending slots.
    pub fn nodes(&self) -> Vec<H::Node> {
        self.nodes
            .iter()
            .filter_map(|entry| match entry {
                Some(Entry::Real(node)) => Some(*node),
                _ => None,
            })
            .collect()
    }

    /// First tree node, if any.
    pub fn node(&self) -> Option<H::Node> {
        self.nodes().into_iter().next()
    }

    /// Present slots as parent context: tree nodes stay, everything else
    /// becomes absent.
    fn current_nodes(&self) -> Vec<Option<H::Node>> {
        self.nodes
            .iter()
            .map(|entry| match entry {
                Some(Entry::Real(node)) => Some(*node),
                _ => None,
            })
            .collect()
    }

    /// Single-result descendant query per slot; the result has equal length
    /// and the current nodes as parents.
    #[instrument(level = "debug", skip(self))]
    pub fn select(&self, selector: &str) -> DomainResult<Self> {
        let tree = self.host.borrow();
        let mut nodes = Vec::with_capacity(self.nodes.len());
        for (i, entry) in self.nodes.iter().enumerate() {
            let selected = match tree_node(entry, i, "select")? {
                Some(node) => tree.query_selector(node, selector)?.map(Entry::Real),
                None => None,
            };
            nodes.push(selected);
        }
        Ok(Self::new(self.host.clone(), nodes, self.current_nodes()))
    }

    /// Multi-result descendant query per slot, flattened group by group.
    /// The parents of the result are the original nodes.
    #[instrument(level = "debug", skip(self))]
    pub fn select_all(&self, selector: &str) -> DomainResult<Self> {
        let tree = self.host.borrow();
        let mut nodes = Vec::new();
        for (i, entry) in self.nodes.iter().enumerate() {
            if let Some(node) = tree_node(entry, i, "select_all")? {
                nodes.extend(
                    tree.query_selector_all(node, selector)?
                        .into_iter()
                        .map(|n| Some(Entry::Real(n))),
                );
            }
        }
        debug!("select_all: '{}' -> {} nodes", selector, nodes.len());
        Ok(Self::new(self.host.clone(), nodes, self.current_nodes()))
    }

    /// Appends a new SVG element under every present node and selects the
    /// new children; absent slots stay absent.
    #[instrument(level = "debug", skip(self))]
    pub fn append(&self, name: &str) -> DomainResult<Self> {
        let mut tree = self.host.borrow_mut();
        let mut nodes = Vec::with_capacity(self.nodes.len());
        for (i, entry) in self.nodes.iter().enumerate() {
            let appended = match tree_node(entry, i, "append")? {
                Some(parent) => {
                    let child = tree.create_element_ns(SVG_NAMESPACE, name);
                    tree.append_child(parent, child)?;
                    Some(Entry::Real(child))
                }
                None => None,
            };
            nodes.push(appended);
        }
        Ok(Self::new(self.host.clone(), nodes, self.current_nodes()))
    }

    /// Attribute of the first slot; `None` when the first slot is absent or
    /// the attribute is unset.
    pub fn get_attr(&self, name: &str) -> DomainResult<Option<String>> {
        match self.first_node("get_attr")? {
            Some(node) => self.host.borrow().get_attribute(node, name),
            None => Ok(None),
        }
    }

    /// Sets an attribute on every present node.
    #[instrument(level = "debug", skip(self, value))]
    pub fn attr(self, name: &str, value: impl Into<Value<H::Node>>) -> DomainResult<Self> {
        let value = value.into();
        trace!("attr: {}={:?}", name, value);
        self.write_each("attr", &value, |tree, node, v| tree.set_attribute(node, name, v))?;
        Ok(self)
    }

    pub fn get_style(&self, name: &str) -> DomainResult<Option<String>> {
        match self.first_node("get_style")? {
            Some(node) => self.host.borrow().get_style(node, name),
            None => Ok(None),
        }
    }

    /// Sets an inline style property on every present node that supports
    /// styles; other nodes are skipped.
    #[instrument(level = "debug", skip(self, value))]
    pub fn style(self, name: &str, value: impl Into<Value<H::Node>>) -> DomainResult<Self> {
        let value = value.into();
        self.write_each("style", &value, |tree, node, v| {
            if tree.has_style(node) {
                tree.set_style(node, name, v)
            } else {
                Ok(())
            }
        })?;
        Ok(self)
    }

    /// Text content of the first slot.
    pub fn get_text(&self) -> DomainResult<Option<String>> {
        match self.first_node("get_text")? {
            Some(node) => self.host.borrow().text_content(node).map(Some),
            None => Ok(None),
        }
    }

    /// Replaces the content of every present node with text.
    #[instrument(level = "debug", skip(self, value))]
    pub fn text(self, value: impl Into<Value<H::Node>>) -> DomainResult<Self> {
        let value = value.into();
        self.write_each("text", &value, |tree, node, v| tree.set_text_content(node, v))?;
        Ok(self)
    }

    /// Calls `f` with node, datum and index for every present node.
    pub fn each<F>(&self, mut f: F) -> DomainResult<()>
    where
        F: FnMut(H::Node, &Datum, usize),
    {
        for (i, entry) in self.nodes.iter().enumerate() {
            if let Some(node) = tree_node(entry, i, "each")? {
                let datum = self.host.borrow().datum(node)?.unwrap_or_default();
                f(node, &datum, i);
            }
        }
        Ok(())
    }

    /// Datum of the first present slot.
    pub fn datum(&self) -> DomainResult<Option<Datum>> {
        match self.nodes.iter().flatten().next() {
            Some(Entry::Pending(datum)) => Ok(Some(datum.clone())),
            Some(Entry::Real(node)) => self.host.borrow().datum(*node),
            None => Ok(None),
        }
    }

    /// Datum per slot; `None` for absent or unbound slots.
    pub fn data_values(&self) -> DomainResult<Vec<Option<Datum>>> {
        let tree = self.host.borrow();
        self.nodes
            .iter()
            .map(|entry| match entry {
                Some(Entry::Real(node)) => tree.datum(*node),
                Some(Entry::Pending(datum)) => Ok(Some(datum.clone())),
                None => Ok(None),
            })
            .collect()
    }

    /// Joins `values` to the slots by index.
    ///
    /// The result has `max(len, values.len())` slots:
    /// - slot and value present: the datum is rebound (update)
    /// - value without a slot: a pending placeholder (enter)
    /// - slot past the end of `values`: kept untouched, its datum is not
    ///   rebound by this join
    ///
    /// The parent sequence is carried over so that entered nodes land under
    /// the right parent.
    #[instrument(level = "debug", skip(self, values))]
    pub fn data<I, T>(&self, values: I) -> DomainResult<Self>
    where
        I: IntoIterator<Item = T>,
        T: Into<Datum>,
    {
        // The iterator may read the host, so drain it before borrowing mutably
        let values: Vec<Datum> = values.into_iter().map(Into::into).collect();
        let mut tree = self.host.borrow_mut();
        let mut nodes = Vec::with_capacity(self.nodes.len());
        let (mut updated, mut entered) = (0usize, 0usize);

        for pair in self.nodes.iter().zip_longest(values) {
            let joined = match pair {
                EitherOrBoth::Both(Some(Entry::Real(node)), datum) => {
                    tree.set_datum(*node, datum)?;
                    updated += 1;
                    Some(Entry::Real(*node))
                }
                EitherOrBoth::Both(Some(Entry::Pending(_)) | None, datum)
                | EitherOrBoth::Right(datum) => {
                    entered += 1;
                    Some(Entry::Pending(datum))
                }
                EitherOrBoth::Left(entry) => entry.clone(),
            };
            nodes.push(joined);
        }

        debug!(
            "data: {} slots, {} update, {} enter",
            nodes.len(),
            updated,
            entered
        );
        Ok(Self::new(self.host.clone(), nodes, self.parents.clone()))
    }

    /// Pending placeholders of this selection, in slot order, with this
    /// selection's parents as their context.
    pub fn enter(&self) -> EnterSelection<H> {
        let slots = self
            .nodes
            .iter()
            .enumerate()
            .filter_map(|(i, entry)| match entry {
                Some(Entry::Pending(datum)) => Some((i, datum.clone())),
                _ => None,
            })
            .collect();
        EnterSelection {
            host: self.host.clone(),
            slots,
            parents: self.parents.clone(),
        }
    }

    fn first_node(&self, operation: &'static str) -> DomainResult<Option<H::Node>> {
        match self.nodes.first() {
            Some(entry) => tree_node(entry, 0, operation),
            None => Ok(None),
        }
    }

    /// Resolves `value` per present node and hands the result to `write`.
    ///
    /// The host is not borrowed while a computed value runs.
    fn write_each<W>(&self, operation: &'static str, value: &Value<H::Node>, mut write: W) -> DomainResult<()>
    where
        W: FnMut(&mut H, H::Node, &str) -> DomainResult<()>,
    {
        for (i, entry) in self.nodes.iter().enumerate() {
            let Some(node) = tree_node(entry, i, operation)? else {
                continue;
            };
            let resolved = if value.is_constant() {
                value.resolve(node, &Datum::Null, i)
            } else {
                let datum = self.host.borrow().datum(node)?.unwrap_or_default();
                value.resolve(node, &datum, i)
            };
            let mut tree = self.host.borrow_mut();
            write(&mut *tree, node, &resolved)?;
        }
        Ok(())
    }
}

/// Placeholders of a data join awaiting materialization.
pub struct EnterSelection<H: HostTree> {
    host: HostRef<H>,
    /// Original slot index and datum of each placeholder
    slots: Vec<(usize, Datum)>,
    parents: Vec<Option<H::Node>>,
}

impl<H: HostTree> fmt::Debug for EnterSelection<H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EnterSelection")
            .field("slots", &self.slots)
            .field("parents", &self.parents)
            .finish()
    }
}

impl<H: HostTree> EnterSelection<H> {
    /// Number of placeholders.
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Data carried by the placeholders, in order.
    pub fn data_values(&self) -> Vec<Datum> {
        self.slots.iter().map(|(_, datum)| datum.clone()).collect()
    }

    /// Slot indices of the placeholders in the joined selection.
    pub fn indices(&self) -> Vec<usize> {
        self.slots.iter().map(|(i, _)| *i).collect()
    }

    /// Parent for the placeholder at joined slot `index`: the positional
    /// parent when the parent sequence reaches that far, otherwise the last
    /// present parent.
    fn parent_for(&self, index: usize) -> Option<H::Node> {
        match self.parents.get(index) {
            Some(parent) => *parent,
            None => self.parents.iter().rev().find_map(|p| *p),
        }
    }

    /// Materializes every placeholder as a new SVG element under its parent
    /// and binds the placeholder's datum to it.
    ///
    /// The returned selection is compact: slot `k` is the `k`-th
    /// placeholder. Placeholders without a parent stay absent.
    #[instrument(level = "debug", skip(self))]
    pub fn append(&self, name: &str) -> DomainResult<Selection<H>> {
        let mut tree = self.host.borrow_mut();
        let mut nodes = Vec::with_capacity(self.slots.len());
        let mut parents = Vec::with_capacity(self.slots.len());
        for (index, datum) in &self.slots {
            let parent = self.parent_for(*index);
            let created = match parent {
                Some(parent) => {
                    let child = tree.create_element_ns(SVG_NAMESPACE, name);
                    tree.append_child(parent, child)?;
                    tree.set_datum(child, datum.clone())?;
                    Some(Entry::Real(child))
                }
                None => None,
            };
            nodes.push(created);
            parents.push(parent);
        }
        debug!("enter.append: materialized {} '{}'", nodes.len(), name);
        Ok(Selection::new(self.host.clone(), nodes, parents))
    }
}
