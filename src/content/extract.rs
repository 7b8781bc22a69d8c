use std::slice;

use crate::models::DocumentNode;

/// Lazy pre-order walk over the text leaves of a document tree.
///
/// Walks with an explicit stack rather than recursion. Callers may stop
/// pulling as soon as they have enough text.
pub struct LeafTexts<'a> {
    pending: Option<&'a DocumentNode>,
    stack: Vec<slice::Iter<'a, DocumentNode>>,
}

impl<'a> Iterator for LeafTexts<'a> {
    type Item = &'a str;

    fn next(&mut self) -> Option<&'a str> {
        loop {
            let node = match self.pending.take() {
                Some(node) => node,
                None => {
                    let siblings = self.stack.last_mut()?;
                    match siblings.next() {
                        Some(node) => node,
                        None => {
                            self.stack.pop();
                            continue;
                        }
                    }
                }
            };

            match node {
                DocumentNode::Text(text) => return Some(text),
                DocumentNode::Container { children, .. } => self.stack.push(children.iter()),
                DocumentNode::Opaque => {}
            }
        }
    }
}

pub fn leaf_texts(root: &DocumentNode) -> LeafTexts<'_> {
    LeafTexts {
        pending: Some(root),
        stack: Vec::new(),
    }
}

/// Every leaf text of the tree, in document order.
pub fn extract_leaf_text(root: &DocumentNode) -> Vec<String> {
    leaf_texts(root).map(str::to_string).collect()
}
