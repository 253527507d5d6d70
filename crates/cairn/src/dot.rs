//! Node-link DOT export of a graph, for feeding into Graphviz.

use std::fmt::Write;

use crate::dag::Dag;

#[derive(Debug, Clone, Copy, Default)]
pub struct DotOptions {
    /// Include row and metadata lines in node labels.
    pub detailed: bool,
}

pub fn to_dot(g: &Dag, opts: DotOptions) -> String {
    let mut buf = String::new();
    buf.push_str("digraph G {\n");
    buf.push_str("  rankdir=TB;\n");
    buf.push_str("  bgcolor=\"transparent\";\n");
    buf.push_str(
        "  node [shape=box, style=\"rounded,filled\", fillcolor=white, fontsize=24, margin=\"0.2,0.1\"];\n",
    );
    buf.push_str("  ranksep=0.5;\n");
    buf.push_str("  nodesep=0.3;\n");
    buf.push('\n');

    for n in g.nodes() {
        let label = if opts.detailed {
            let mut parts = vec![escape_dot(&n.id), format!("row: {}", n.row)];
            for (k, v) in &n.meta {
                parts.push(escape_dot(&format!("{k}: {v}")));
            }
            parts.join("\\n")
        } else {
            escape_dot(&n.id)
        };

        let mut attrs = vec![format!("label=\"{label}\"")];
        if n.is_subdivider() {
            attrs.push("style=\"rounded,filled,dashed\"".to_string());
            attrs.push("fillcolor=lightgrey".to_string());
            attrs.push("fontcolor=black".to_string());
        }
        let _ = writeln!(buf, "  \"{}\" [{}];", escape_dot(&n.id), attrs.join(", "));
    }

    buf.push('\n');
    for e in g.edges() {
        let _ = writeln!(
            buf,
            "  \"{}\" -> \"{}\";",
            escape_dot(&e.from),
            escape_dot(&e.to)
        );
    }

    buf.push_str("}\n");
    buf
}

fn escape_dot(s: &str) -> String {
    s.replace('\\', "\\\\").replace('"', "\\\"")
}
