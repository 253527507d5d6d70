//! DOT rendering of a PQ-tree, for feeding into Graphviz.

use std::fmt::Write;

use super::PqTree;

impl PqTree {
    /// A top-down DOT graph: ellipse P-nodes, box Q-nodes, rounded-box
    /// leaves, no arrowheads. Leaves take their label from `labels` when one
    /// exists, falling back to the element index.
    pub fn to_dot(&self, labels: &[&str]) -> String {
        let mut buf = String::new();
        buf.push_str("digraph PQTree {\n");
        buf.push_str("  rankdir=TB;\n");
        buf.push_str("  bgcolor=\"transparent\";\n");
        buf.push_str(
            "  node [fontname=\"SF Mono, Menlo, monospace\", fontsize=14, style=filled, fillcolor=white];\n",
        );
        buf.push_str("  edge [arrowhead=none];\n\n");

        self.write_dot_node(&mut buf, self.root(), 0, labels);

        buf.push_str("}\n");
        buf
    }

    fn write_dot_node(&self, buf: &mut String, x: usize, id: usize, labels: &[&str]) -> usize {
        let mut next = id + 1;
        match self.shape(x) {
            (Some(element), _) => {
                let label = labels
                    .get(element)
                    .map(|l| l.to_string())
                    .unwrap_or_else(|| element.to_string());
                let _ = writeln!(
                    buf,
                    "  n{id} [label=\"{label}\", shape=box, style=\"filled,rounded\"];"
                );
            }
            (None, children) => {
                let (label, shape) = if self.is_p(x) {
                    ("P", "ellipse")
                } else {
                    ("Q", "box")
                };
                let _ = writeln!(buf, "  n{id} [label=\"{label}\", shape={shape}];");
                for &c in children {
                    let _ = writeln!(buf, "  n{id} -> n{next};");
                    next = self.write_dot_node(buf, c, next, labels);
                }
            }
        }
        next
    }
}
