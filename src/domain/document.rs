use generational_arena::{Arena, Index};
use std::fmt;
use tracing::{debug, instrument};

use crate::domain::host::HostTree;
use crate::domain::selector::Selector;
use crate::domain::{Datum, DomainError, DomainResult};

/// Handle to a node in a [`Document`].
///
/// Generational: a handle to a removed node stays invalid even after its
/// slot is reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(Index);

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (slot, generation) = self.0.into_raw_parts();
        write!(f, "node#{}.{}", slot, generation)
    }
}

/// What a document node is.
#[derive(Debug, Clone, PartialEq)]
pub enum NodeKind {
    /// The single root every query starts from.
    Document,
    Element {
        name: String,
        namespace: Option<String>,
    },
    Text(String),
}

/// Node stored in the document arena.
#[derive(Debug, Clone)]
pub struct DocumentNode {
    pub kind: NodeKind,
    /// Attributes in insertion order
    pub attributes: Vec<(String, String)>,
    /// Inline style properties in insertion order
    pub style: Vec<(String, String)>,
    /// Datum bound by a data join
    pub datum: Option<Datum>,
    pub parent: Option<NodeId>,
    pub children: Vec<NodeId>,
}

impl DocumentNode {
    fn new(kind: NodeKind) -> Self {
        Self {
            kind,
            attributes: Vec::new(),
            style: Vec::new(),
            datum: None,
            parent: None,
            children: Vec::new(),
        }
    }

    pub fn element_name(&self) -> Option<&str> {
        match &self.kind {
            NodeKind::Element { name, .. } => Some(name),
            _ => None,
        }
    }

    pub fn namespace(&self) -> Option<&str> {
        match &self.kind {
            NodeKind::Element { namespace, .. } => namespace.as_deref(),
            _ => None,
        }
    }

    pub fn is_element(&self) -> bool {
        matches!(self.kind, NodeKind::Element { .. })
    }

    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    pub fn style_property(&self, name: &str) -> Option<&str> {
        self.style
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }
}

/// Arena-based markup tree.
///
/// Uses a generational arena for memory-safe node handles and O(1) lookups.
/// The document node is created with the tree and is never removed.
#[derive(Debug, Clone)]
pub struct Document {
    arena: Arena<DocumentNode>,
    root: NodeId,
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

impl Document {
    pub fn new() -> Self {
        let mut arena = Arena::new();
        let root = NodeId(arena.insert(DocumentNode::new(NodeKind::Document)));
        Self { arena, root }
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    /// Number of live nodes, the document node included.
    pub fn len(&self) -> usize {
        self.arena.len()
    }

    pub fn is_empty(&self) -> bool {
        self.children(self.root).is_empty()
    }

    pub fn node(&self, id: NodeId) -> Option<&DocumentNode> {
        self.arena.get(id.0)
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.arena.contains(id.0)
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.node(id).and_then(|n| n.parent)
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.node(id)
            .map(|n| n.children.as_slice())
            .unwrap_or_default()
    }

    fn get(&self, id: NodeId) -> DomainResult<&DocumentNode> {
        self.arena
            .get(id.0)
            .ok_or_else(|| DomainError::UnknownNode(id.to_string()))
    }

    fn get_mut(&mut self, id: NodeId) -> DomainResult<&mut DocumentNode> {
        self.arena
            .get_mut(id.0)
            .ok_or_else(|| DomainError::UnknownNode(id.to_string()))
    }

    /// Inserts a detached node.
    #[instrument(level = "trace", skip(self))]
    pub fn create(&mut self, kind: NodeKind) -> NodeId {
        NodeId(self.arena.insert(DocumentNode::new(kind)))
    }

    /// Attaches a detached `child` as the last child of `parent`.
    #[instrument(level = "trace", skip(self))]
    pub fn append(&mut self, parent: NodeId, child: NodeId) -> DomainResult<()> {
        let hierarchy_error = |reason: &str| DomainError::InvalidHierarchy {
            parent: parent.to_string(),
            child: child.to_string(),
            reason: reason.to_string(),
        };
        if matches!(self.get(parent)?.kind, NodeKind::Text(_)) {
            return Err(hierarchy_error("text nodes cannot have children"));
        }
        let child_node = self.get(child)?;
        if child_node.parent.is_some() || child == self.root {
            return Err(hierarchy_error("child is already attached"));
        }
        if self.ancestors(parent).any(|a| a == child) || parent == child {
            return Err(hierarchy_error("would create a cycle"));
        }
        self.get_mut(child)?.parent = Some(parent);
        self.get_mut(parent)?.children.push(child);
        Ok(())
    }

    /// Removes `id` and its whole subtree from the arena.
    #[instrument(level = "trace", skip(self))]
    pub fn remove(&mut self, id: NodeId) -> DomainResult<()> {
        if id == self.root {
            return Err(DomainError::InvalidHierarchy {
                parent: "-".to_string(),
                child: id.to_string(),
                reason: "the document node cannot be removed".to_string(),
            });
        }
        if let Some(parent) = self.get(id)?.parent {
            self.get_mut(parent)?.children.retain(|&c| c != id);
        }
        let mut stack = vec![id];
        while let Some(current) = stack.pop() {
            if let Some(node) = self.arena.remove(current.0) {
                stack.extend(node.children);
            }
        }
        Ok(())
    }

    /// Ancestors of `id`, nearest first.
    pub fn ancestors(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        std::iter::successors(self.parent(id), move |&current| self.parent(current))
    }

    /// Pre-order walk of the whole document, starting at the document node.
    pub fn iter(&self) -> DocumentIterator<'_> {
        DocumentIterator::new(self, self.root)
    }

    /// Pre-order walk of the descendants of `scope`, excluding `scope`.
    pub fn descendants(&self, scope: NodeId) -> impl Iterator<Item = (NodeId, &DocumentNode)> + '_ {
        DocumentIterator::new(self, scope).skip(1)
    }

    /// Elements in the document, in document order.
    pub fn elements(&self) -> impl Iterator<Item = (NodeId, &DocumentNode)> + '_ {
        self.iter().filter(|(_, node)| node.is_element())
    }

    /// Depth of the tree below the document node.
    #[instrument(level = "debug", skip(self))]
    pub fn depth(&self) -> usize {
        self.calculate_depth(self.root).saturating_sub(1)
    }

    fn calculate_depth(&self, id: NodeId) -> usize {
        1 + self
            .children(id)
            .iter()
            .map(|&child| self.calculate_depth(child))
            .max()
            .unwrap_or(0)
    }
}

impl HostTree for Document {
    type Node = NodeId;

    fn root(&self) -> NodeId {
        self.root
    }

    #[instrument(level = "trace", skip(self))]
    fn query_selector(&self, scope: NodeId, selector: &str) -> DomainResult<Option<NodeId>> {
        self.get(scope)?;
        let selector = Selector::parse(selector)?;
        Ok(self
            .descendants(scope)
            .map(|(id, _)| id)
            .find(|&id| selector.matches(self, id)))
    }

    #[instrument(level = "trace", skip(self))]
    fn query_selector_all(&self, scope: NodeId, selector: &str) -> DomainResult<Vec<NodeId>> {
        self.get(scope)?;
        let selector = Selector::parse(selector)?;
        let found: Vec<NodeId> = self
            .descendants(scope)
            .map(|(id, _)| id)
            .filter(|&id| selector.matches(self, id))
            .collect();
        debug!("query_selector_all: '{}' matched {}", selector.source(), found.len());
        Ok(found)
    }

    fn create_element_ns(&mut self, namespace: &str, name: &str) -> NodeId {
        self.create(NodeKind::Element {
            name: name.to_string(),
            namespace: Some(namespace.to_string()),
        })
    }

    fn append_child(&mut self, parent: NodeId, child: NodeId) -> DomainResult<()> {
        self.append(parent, child)
    }

    fn get_attribute(&self, node: NodeId, name: &str) -> DomainResult<Option<String>> {
        Ok(self.get(node)?.attribute(name).map(str::to_string))
    }

    fn set_attribute(&mut self, node: NodeId, name: &str, value: &str) -> DomainResult<()> {
        let node = self.get_mut(node)?;
        match node.attributes.iter_mut().find(|(k, _)| k == name) {
            Some((_, v)) => *v = value.to_string(),
            None => node.attributes.push((name.to_string(), value.to_string())),
        }
        Ok(())
    }

    fn has_style(&self, node: NodeId) -> bool {
        self.node(node).is_some_and(DocumentNode::is_element)
    }

    fn get_style(&self, node: NodeId, name: &str) -> DomainResult<Option<String>> {
        Ok(self.get(node)?.style_property(name).map(str::to_string))
    }

    fn set_style(&mut self, node: NodeId, name: &str, value: &str) -> DomainResult<()> {
        let node = self.get_mut(node)?;
        match node.style.iter_mut().find(|(k, _)| k == name) {
            Some((_, v)) => *v = value.to_string(),
            None => node.style.push((name.to_string(), value.to_string())),
        }
        Ok(())
    }

    fn text_content(&self, node: NodeId) -> DomainResult<String> {
        if let NodeKind::Text(text) = &self.get(node)?.kind {
            return Ok(text.clone());
        }
        Ok(self
            .descendants(node)
            .filter_map(|(_, n)| match &n.kind {
                NodeKind::Text(text) => Some(text.as_str()),
                _ => None,
            })
            .collect())
    }

    #[instrument(level = "trace", skip(self))]
    fn set_text_content(&mut self, node: NodeId, text: &str) -> DomainResult<()> {
        if let NodeKind::Text(current) = &mut self.get_mut(node)?.kind {
            *current = text.to_string();
            return Ok(());
        }
        let children = self.get(node)?.children.clone();
        for child in children {
            self.remove(child)?;
        }
        if !text.is_empty() {
            let text_node = self.create(NodeKind::Text(text.to_string()));
            self.append(node, text_node)?;
        }
        Ok(())
    }

    fn datum(&self, node: NodeId) -> DomainResult<Option<Datum>> {
        Ok(self.get(node)?.datum.clone())
    }

    fn set_datum(&mut self, node: NodeId, datum: Datum) -> DomainResult<()> {
        self.get_mut(node)?.datum = Some(datum);
        Ok(())
    }
}

pub struct DocumentIterator<'a> {
    doc: &'a Document,
    stack: Vec<NodeId>,
}

impl<'a> DocumentIterator<'a> {
    fn new(doc: &'a Document, start: NodeId) -> Self {
        let mut stack = Vec::new();
        if doc.contains(start) {
            stack.push(start);
        }
        Self { doc, stack }
    }
}

impl<'a> Iterator for DocumentIterator<'a> {
    type Item = (NodeId, &'a DocumentNode);

    fn next(&mut self) -> Option<Self::Item> {
        while let Some(current) = self.stack.pop() {
            if let Some(node) = self.doc.node(current) {
                // Push children in reverse order for left-to-right traversal
                for &child in node.children.iter().rev() {
                    self.stack.push(child);
                }
                return Some((current, node));
            }
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::host::SVG_NAMESPACE;

    fn element(doc: &mut Document, parent: NodeId, name: &str) -> NodeId {
        let id = doc.create_element_ns(SVG_NAMESPACE, name);
        doc.append(parent, id).unwrap();
        id
    }

    #[test]
    fn test_set_text_replaces_children() {
        let mut doc = Document::new();
        let root = doc.root();
        let g = element(&mut doc, root, "g");
        element(&mut doc, g, "rect");
        let before = doc.len();

        doc.set_text_content(g, "hello").unwrap();

        assert_eq!(doc.text_content(g).unwrap(), "hello");
        assert_eq!(doc.children(g).len(), 1);
        assert_eq!(doc.len(), before);
    }

    #[test]
    fn test_removed_handles_go_stale() {
        let mut doc = Document::new();
        let root = doc.root();
        let g = element(&mut doc, root, "g");
        let rect = element(&mut doc, g, "rect");

        doc.remove(g).unwrap();

        assert!(!doc.contains(rect));
        assert!(matches!(
            doc.set_attribute(rect, "x", "1"),
            Err(DomainError::UnknownNode(_))
        ));
    }

    #[test]
    fn test_append_rejects_cycles_and_reattachment() {
        let mut doc = Document::new();
        let root = doc.root();
        let g = element(&mut doc, root, "g");
        let inner = element(&mut doc, g, "g");

        assert!(doc.append(inner, g).is_err());
        assert!(doc.append(root, inner).is_err());
    }

    #[test]
    fn test_depth_counts_levels_below_document() {
        let mut doc = Document::new();
        assert_eq!(doc.depth(), 0);
        let root = doc.root();
        let svg = element(&mut doc, root, "svg");
        element(&mut doc, svg, "rect");
        assert_eq!(doc.depth(), 2);
    }
}
