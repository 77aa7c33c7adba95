//! Markup serialization of a [`Document`]
//!
//! Elements without children self-close. An `xmlns` attribute is written
//! wherever an element's namespace differs from its parent's, so a standalone
//! `<svg>` carries its namespace and its children do not repeat it.

use std::fmt::{self, Write};

use itertools::Itertools;
use tracing::instrument;

use crate::domain::document::{Document, NodeId, NodeKind};

impl Document {
    /// Serializes the whole document.
    #[instrument(level = "debug", skip(self))]
    pub fn to_markup(&self) -> String {
        self.node_markup(self.root())
    }

    /// Serializes `id` and its subtree; the document node serializes its
    /// children back to back. Unknown handles serialize to nothing.
    pub fn node_markup(&self, id: NodeId) -> String {
        let mut out = String::new();
        let inherited = self
            .parent(id)
            .and_then(|p| self.node(p))
            .and_then(|p| p.namespace())
            .map(str::to_string);
        // Writing into a String never fails.
        let _ = self.write_node(&mut out, id, inherited.as_deref());
        out
    }

    fn write_node(&self, out: &mut String, id: NodeId, inherited: Option<&str>) -> fmt::Result {
        let Some(node) = self.node(id) else {
            return Ok(());
        };
        match &node.kind {
            NodeKind::Document => {
                for &child in &node.children {
                    self.write_node(out, child, None)?;
                }
            }
            NodeKind::Text(text) => out.push_str(&escape_text(text)),
            NodeKind::Element { name, namespace } => {
                write!(out, "<{}", name)?;
                if let Some(ns) = namespace.as_deref() {
                    if inherited != Some(ns) {
                        write!(out, " xmlns=\"{}\"", escape_attribute(ns))?;
                    }
                }
                for (key, value) in &node.attributes {
                    write!(out, " {}=\"{}\"", key, escape_attribute(value))?;
                }
                if !node.style.is_empty() {
                    let style = node
                        .style
                        .iter()
                        .map(|(k, v)| format!("{}: {}", k, v))
                        .join("; ");
                    write!(out, " style=\"{}\"", escape_attribute(&style))?;
                }
                if node.children.is_empty() {
                    out.push_str("/>");
                } else {
                    out.push('>');
                    for &child in &node.children {
                        self.write_node(out, child, namespace.as_deref())?;
                    }
                    write!(out, "</{}>", name)?;
                }
            }
        }
        Ok(())
    }
}

impl fmt::Display for Document {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_markup())
    }
}

pub fn escape_text(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            _ => out.push(c),
        }
    }
    out
}

pub fn escape_attribute(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            _ => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::host::{HostTree, SVG_NAMESPACE};

    #[test]
    fn test_namespace_written_once() {
        let mut doc = Document::new();
        let svg = doc.create_element_ns(SVG_NAMESPACE, "svg");
        doc.append(doc.root(), svg).unwrap();
        let rect = doc.create_element_ns(SVG_NAMESPACE, "rect");
        doc.append(svg, rect).unwrap();
        doc.set_attribute(rect, "width", "10").unwrap();

        assert_eq!(
            doc.to_markup(),
            r#"<svg xmlns="http://www.w3.org/2000/svg"><rect width="10"/></svg>"#
        );
        assert_eq!(doc.node_markup(rect), r#"<rect width="10"/>"#);
    }

    #[test]
    fn test_escaping() {
        assert_eq!(escape_text("a < b & c"), "a &lt; b &amp; c");
        assert_eq!(escape_attribute(r#"say "hi""#), "say &quot;hi&quot;");
    }

    #[test]
    fn test_style_is_serialized_in_insertion_order() {
        let mut doc = Document::new();
        let g = doc.create_element_ns(SVG_NAMESPACE, "g");
        doc.append(doc.root(), g).unwrap();
        doc.set_style(g, "fill", "red").unwrap();
        doc.set_style(g, "opacity", "0.5").unwrap();
        assert!(doc.to_markup().contains(r#"style="fill: red; opacity: 0.5""#));
    }
}
