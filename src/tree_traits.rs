/*
Outline rendering of documents via termtree.
The label of each element lists its attributes and the datum bound to it.
 */
use termtree::Tree;
use tracing::instrument;

use crate::domain::{Document, DocumentNode, NodeId, NodeKind};

pub trait TreeNodeConvert {
    fn to_tree_string(&self) -> Tree<String>;
}

impl TreeNodeConvert for Document {
    #[instrument(level = "debug", skip(self))]
    fn to_tree_string(&self) -> Tree<String> {
        fn build_tree(doc: &Document, node_idx: NodeId, parent_tree: &mut Tree<String>) {
            for &child_idx in doc.children(node_idx) {
                if let Some(child) = doc.node(child_idx) {
                    let mut child_tree = Tree::new(node_label(child));
                    build_tree(doc, child_idx, &mut child_tree);
                    parent_tree.push(child_tree);
                }
            }
        }

        let mut tree = Tree::new("#document".to_string());
        build_tree(self, self.root(), &mut tree);
        tree
    }
}

fn node_label(node: &DocumentNode) -> String {
    let mut label = match &node.kind {
        NodeKind::Document => "#document".to_string(),
        NodeKind::Text(text) => format!("{:?}", text),
        NodeKind::Element { name, .. } => {
            let mut label = name.clone();
            for (key, value) in &node.attributes {
                label.push_str(&format!(" {}={}", key, value));
            }
            label
        }
    };
    if let Some(datum) = &node.datum {
        label.push_str(&format!(" [{}]", datum));
    }
    label
}
