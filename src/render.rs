use std::fmt::{self, Display};

use crate::arena::NodeId;
use crate::ScapegoatTree;

/// Renders the physical tree shape, one node per line, left child first:
///
/// ```text
/// 2: b
/// ├── 1: a
/// └── 3: c
/// ```
///
/// A `·` stands in for a missing child whose sibling exists.
impl<K: Display, V: Display> Display for ScapegoatTree<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.root.is_null() {
            return f.write_str("(empty)");
        }

        // (node, prefix for this line, prefix for its children)
        let mut stack: Vec<(NodeId, String, String)> =
            vec![(self.root, String::new(), String::new())];
        let mut first = true;
        while let Some((id, line, indent)) = stack.pop() {
            if !first {
                f.write_str("\n")?;
            }
            first = false;

            if id.is_null() {
                write!(f, "{line}·")?;
                continue;
            }
            let node = self.nodes.node(id);
            write!(f, "{line}{}: {}", node.key, node.value)?;

            if node.left.is_null() && node.right.is_null() {
                continue;
            }
            stack.push((node.right, format!("{indent}└── "), format!("{indent}    ")));
            stack.push((node.left, format!("{indent}├── "), format!("{indent}│   ")));
        }
        Ok(())
    }
}
