//! Collapse subdivider chains back to one block per semantic node.

use std::collections::BTreeMap;

use crate::dag::Dag;
use crate::order::RowOrders;
use crate::tower::{Block, Layout};

/// One block per distinct effective id, bounded by the union of the merged
/// rectangles. Auxiliary separators keep their own blocks; subdividers drop
/// out of the row orders.
pub fn merge_subdividers(layout: &Layout, g: &Dag) -> Layout {
    let mut groups: BTreeMap<&str, Vec<&str>> = BTreeMap::new();
    for n in g.nodes() {
        groups.entry(n.effective_id()).or_default().push(&n.id);
    }

    let mut blocks = BTreeMap::new();
    for (master, members) in groups {
        blocks.insert(master.to_string(), merge_blocks(layout, master, &members));
    }

    Layout {
        frame_width: layout.frame_width,
        frame_height: layout.frame_height,
        blocks,
        row_orders: filter_row_orders(&layout.row_orders, g),
        margin_x: layout.margin_x,
        margin_y: layout.margin_y,
    }
}

fn merge_blocks(layout: &Layout, master: &str, members: &[&str]) -> Block {
    let mut merged: Option<Block> = None;
    for id in members {
        let Some(b) = layout.blocks.get(*id) else {
            continue;
        };
        merged = Some(match merged {
            None => b.clone(),
            Some(m) => Block {
                node_id: m.node_id,
                left: m.left.min(b.left),
                right: m.right.max(b.right),
                bottom: m.bottom.min(b.bottom),
                top: m.top.max(b.top),
            },
        });
    }

    let mut block = merged.unwrap_or_default();
    block.node_id = master.to_string();
    block
}

fn filter_row_orders(orders: &RowOrders, g: &Dag) -> RowOrders {
    let mut result = RowOrders::new();
    for (&row, ids) in orders {
        let filtered: Vec<String> = ids
            .iter()
            .filter(|id| g.node(id).is_some_and(|n| !n.is_subdivider()))
            .cloned()
            .collect();
        if !filtered.is_empty() {
            result.insert(row, filtered);
        }
    }
    result
}
