//! SVG rendering of a tower layout.
//!
//! A [`Style`] supplies the drawing hooks; the renderer walks the layout and
//! hands it prepared geometry. Coordinates map straight into SVG user space:
//! a block's `bottom` is its smaller y, so row 0 comes out on top.

use std::fmt::Write;

use crate::dag::Dag;
use crate::tower::{is_brittle, Layout};

const MAX_CORNER_RADIUS: f64 = 18.0;
const CORNER_RATIO_DIVISOR: f64 = 3.0;
const FONT_HEIGHT_RATIO: f64 = 0.6;
const FONT_WIDTH_RATIO: f64 = 0.85;
const FONT_CHAR_WIDTH: f64 = 0.55;
const FONT_SIZE_MIN: f64 = 8.0;
const FONT_SIZE_MAX: f64 = 24.0;
const ROTATE_SIZE_DAMPEN: f64 = 0.75;

/// Geometry handed to a style for one block.
#[derive(Debug, Clone, Default)]
pub struct StyledBlock {
    pub id: String,
    pub x: f64,
    pub y: f64,
    pub w: f64,
    pub h: f64,
    pub cx: f64,
    pub cy: f64,
    pub url: String,
    pub brittle: bool,
}

#[derive(Debug, Clone, Default)]
pub struct EdgeLine {
    pub from_id: String,
    pub to_id: String,
    pub x1: f64,
    pub y1: f64,
    pub x2: f64,
    pub y2: f64,
}

pub trait Style {
    fn render_defs(&self, _out: &mut String) {}
    fn render_block(&self, out: &mut String, b: &StyledBlock);
    fn render_edge(&self, out: &mut String, e: &EdgeLine);
    fn render_text(&self, out: &mut String, b: &StyledBlock);
}

/// Plain rounded rectangles with dashed connector lines.
#[derive(Debug, Clone, Copy, Default)]
pub struct Simple;

impl Style for Simple {
    fn render_block(&self, out: &mut String, b: &StyledBlock) {
        let radius = MAX_CORNER_RADIUS
            .min(b.w / CORNER_RATIO_DIVISOR)
            .min(b.h / CORNER_RATIO_DIVISOR);
        let _ = writeln!(
            out,
            r##"  <rect id="block-{}" class="block" x="{:.2}" y="{:.2}" width="{:.2}" height="{:.2}" rx="{radius:.1}" ry="{radius:.1}" fill="white" stroke="#333" stroke-width="1"/>"##,
            escape_xml(&b.id),
            b.x,
            b.y,
            b.w,
            b.h,
        );
    }

    fn render_edge(&self, out: &mut String, e: &EdgeLine) {
        let _ = writeln!(
            out,
            r##"  <line x1="{:.2}" y1="{:.2}" x2="{:.2}" y2="{:.2}" stroke="#333" stroke-width="1.5" stroke-dasharray="6,4"/>"##,
            e.x1, e.y1, e.x2, e.y2,
        );
    }

    fn render_text(&self, out: &mut String, b: &StyledBlock) {
        let mut size = font_size(b);
        let rotate = should_rotate(b);
        if rotate {
            size = font_size_rotated(b);
        }

        let escaped = escape_xml(&b.id);
        if rotate {
            let _ = writeln!(
                out,
                r##"  <text x="{cx:.2}" y="{cy:.2}" text-anchor="middle" dominant-baseline="middle" font-family="Times,serif" font-size="{size:.1}" fill="#333" transform="rotate(-90 {cx:.2} {cy:.2})">{escaped}</text>"##,
                cx = b.cx,
                cy = b.cy,
            );
        } else {
            let _ = writeln!(
                out,
                r##"  <text x="{cx:.2}" y="{cy:.2}" text-anchor="middle" dominant-baseline="middle" font-family="Times,serif" font-size="{size:.1}" fill="#333">{escaped}</text>"##,
                cx = b.cx,
                cy = b.cy,
            );
        }
    }
}

/// Renders the layout's blocks, the edges between them, and the labels, in
/// that order so text stays on top.
pub fn render_svg(layout: &Layout, g: &Dag, style: &dyn Style) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        r#"<svg xmlns="http://www.w3.org/2000/svg" viewBox="0 0 {:.2} {:.2}" width="{:.0}" height="{:.0}">"#,
        layout.frame_width, layout.frame_height, layout.frame_width, layout.frame_height,
    );
    style.render_defs(&mut out);

    let styled: Vec<StyledBlock> = layout
        .blocks
        .values()
        .map(|b| {
            let brittle = g.node(&b.node_id).is_some_and(is_brittle);
            let url = g
                .node(&b.node_id)
                .and_then(|n| n.meta.get("repo_url"))
                .and_then(|v| v.as_str())
                .unwrap_or_default()
                .to_string();
            StyledBlock {
                id: b.node_id.clone(),
                x: b.left,
                y: b.bottom,
                w: b.width(),
                h: b.height(),
                cx: b.center_x(),
                cy: b.center_y(),
                url,
                brittle,
            }
        })
        .collect();

    for b in &styled {
        style.render_block(&mut out, b);
    }

    for e in g.edges() {
        let (Some(from), Some(to)) = (layout.blocks.get(&e.from), layout.blocks.get(&e.to)) else {
            continue;
        };
        style.render_edge(
            &mut out,
            &EdgeLine {
                from_id: e.from.clone(),
                to_id: e.to.clone(),
                x1: from.center_x(),
                y1: from.center_y(),
                x2: to.center_x(),
                y2: to.center_y(),
            },
        );
    }

    for b in &styled {
        style.render_text(&mut out, b);
    }

    out.push_str("</svg>\n");
    out
}

fn font_size(b: &StyledBlock) -> f64 {
    font_size_for(b.w, b.h, b.id.len())
}

fn font_size_rotated(b: &StyledBlock) -> f64 {
    font_size_for(b.h * ROTATE_SIZE_DAMPEN, b.w, b.id.len())
}

fn font_size_for(avail_width: f64, avail_height: f64, text_len: usize) -> f64 {
    let n = text_len.max(1) as f64;
    let by_height = avail_height * FONT_HEIGHT_RATIO;
    let by_width = (avail_width * FONT_WIDTH_RATIO) / (n * FONT_CHAR_WIDTH);
    by_height.min(by_width).clamp(FONT_SIZE_MIN, FONT_SIZE_MAX)
}

/// Tall narrow blocks read better with vertical labels.
fn should_rotate(b: &StyledBlock) -> bool {
    let horiz = font_size_for(b.w, b.h, b.id.len());
    let rotated = font_size_for(b.h, b.w, b.id.len());
    if b.id.len() > 10 {
        rotated * 1.1 >= horiz
    } else {
        rotated > horiz
    }
}

pub fn escape_xml(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            _ => out.push(c),
        }
    }
    out
}
