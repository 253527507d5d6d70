//! Width propagation.
//!
//! Both flows keep the invariant that every row's widths sum to the frame
//! width. They differ only in which boundary row receives the evenly-divided
//! widths: top-down starts at row 0 and pushes each parent's width down in
//! equal shares per child; bottom-up starts at the bottom row and pulls each
//! child's width up in equal shares per parent. After each row the sum is
//! renormalized to absorb rounding drift.

use crate::dag::Dag;
use crate::order::RowOrders;
use rustc_hash::FxHashMap;

const EPS: f64 = 1e-9;

pub fn compute_widths(g: &Dag, orders: &RowOrders, frame_width: f64) -> FxHashMap<String, f64> {
    let rows = g.row_ids();
    let mut widths = FxHashMap::default();
    let Some(&max_row) = rows.last() else {
        return widths;
    };

    if let Some(top_row) = orders.get(&0) {
        if !top_row.is_empty() {
            let unit = frame_width / top_row.len() as f64;
            for id in top_row {
                widths.insert(id.clone(), unit);
            }
        }
    }

    for r in 0..max_row {
        let Some(curr_row) = orders.get(&(r + 1)) else {
            continue;
        };
        if curr_row.is_empty() {
            continue;
        }

        for id in curr_row {
            widths.insert(id.clone(), 0.0);
        }

        if let Some(upper) = orders.get(&r) {
            for parent in upper {
                let kids = g.children_in_row(parent, r + 1);
                if kids.is_empty() {
                    continue;
                }
                let share = widths.get(parent.as_str()).copied().unwrap_or(0.0) / kids.len() as f64;
                for kid in kids {
                    *widths.entry(kid.to_string()).or_insert(0.0) += share;
                }
            }
        }

        rescale_row(&mut widths, curr_row, frame_width);
    }
    widths
}

pub fn compute_widths_bottom_up(
    g: &Dag,
    orders: &RowOrders,
    frame_width: f64,
) -> FxHashMap<String, f64> {
    let rows = g.row_ids();
    let mut widths = FxHashMap::default();
    let Some(&max_row) = rows.last() else {
        return widths;
    };

    if let Some(bottom_row) = orders.get(&max_row) {
        if !bottom_row.is_empty() {
            let unit = frame_width / bottom_row.len() as f64;
            for id in bottom_row {
                widths.insert(id.clone(), unit);
            }
        }
    }

    for r in (0..max_row).rev() {
        let Some(curr_row) = orders.get(&r) else {
            continue;
        };
        if curr_row.is_empty() {
            continue;
        }

        for id in curr_row {
            widths.insert(id.clone(), 0.0);
        }

        for parent in curr_row {
            for kid in g.children_in_row(parent, r + 1) {
                let parent_count = g.parents_in_row(kid, r).len();
                if parent_count == 0 {
                    continue;
                }
                let share = widths.get(kid).copied().unwrap_or(0.0) / parent_count as f64;
                *widths.entry(parent.clone()).or_insert(0.0) += share;
            }
        }

        rescale_row(&mut widths, curr_row, frame_width);
    }

    widths
}

fn rescale_row(widths: &mut FxHashMap<String, f64>, row: &[String], frame_width: f64) {
    let sum: f64 = row
        .iter()
        .map(|id| widths.get(id.as_str()).copied().unwrap_or(0.0))
        .sum();
    if sum > EPS && (sum - frame_width).abs() > EPS {
        let scale = frame_width / sum;
        for id in row {
            if let Some(w) = widths.get_mut(id.as_str()) {
                *w *= scale;
            }
        }
    }
}
