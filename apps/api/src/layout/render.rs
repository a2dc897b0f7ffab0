//! Rendering adapter — places layout cells into a visual tree.
//!
//! Two presentation modes share the same cell data:
//! - `Screen`: percentage widths, wrapping flex row inside the goal line
//! - `Print`: fixed-grid cells use `calc(100% / 40)` since the page width is fixed
//!
//! `TrackerSurface` owns whatever it rendered last and replaces it wholesale on
//! each call, so rendering the same goal twice never accumulates cells.

use std::fmt::Write as _;

use serde::{Deserialize, Serialize};

use crate::layout::engine::{compute_cells, Cell, WidthPolicy, GRID_COLUMNS, MAX_CELL_PX, MIN_CELL_PX};
use crate::models::goal::{Goal, GoalKind};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RenderMode {
    #[default]
    Screen,
    Print,
}

// ────────────────────────────────────────────────────────────────────────────
// Visual tree
// ────────────────────────────────────────────────────────────────────────────

/// An element in the rendered output.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VisualNode {
    pub tag: &'static str,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub attrs: Vec<(&'static str, String)>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub style: Vec<(&'static str, String)>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<VisualNode>,
}

impl VisualNode {
    pub fn new(tag: &'static str) -> Self {
        Self {
            tag,
            attrs: Vec::new(),
            style: Vec::new(),
            text: None,
            children: Vec::new(),
        }
    }

    pub fn class(self, class: &str) -> Self {
        self.attr("class", class)
    }

    pub fn attr(mut self, name: &'static str, value: impl Into<String>) -> Self {
        self.attrs.push((name, value.into()));
        self
    }

    pub fn style(mut self, property: &'static str, value: impl Into<String>) -> Self {
        self.style.push((property, value.into()));
        self
    }

    pub fn text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    pub fn child(mut self, child: VisualNode) -> Self {
        self.children.push(child);
        self
    }

    pub fn has_class(&self, class: &str) -> bool {
        self.attrs
            .iter()
            .any(|(k, v)| *k == "class" && v.split_whitespace().any(|c| c == class))
    }

    /// Counts this node and its descendants carrying `class`.
    pub fn count_class(&self, class: &str) -> usize {
        usize::from(self.has_class(class))
            + self
                .children
                .iter()
                .map(|c| c.count_class(class))
                .sum::<usize>()
    }

    pub fn to_html(&self) -> String {
        let mut out = String::new();
        self.write_html(&mut out);
        out
    }

    fn write_html(&self, out: &mut String) {
        out.push('<');
        out.push_str(self.tag);
        for (name, value) in &self.attrs {
            let _ = write!(out, " {name}=\"{}\"", escape_html(value));
        }
        if !self.style.is_empty() {
            let css: Vec<String> = self.style.iter().map(|(k, v)| format!("{k}:{v}")).collect();
            let _ = write!(out, " style=\"{}\"", escape_html(&css.join(";")));
        }
        out.push('>');
        if let Some(text) = &self.text {
            out.push_str(&escape_html(text));
        }
        for child in &self.children {
            child.write_html(out);
        }
        let _ = write!(out, "</{}>", self.tag);
    }
}

pub fn escape_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

// ────────────────────────────────────────────────────────────────────────────
// Cells and trackers
// ────────────────────────────────────────────────────────────────────────────

/// Formats a percentage with at most four decimals: `8.3333%`, `50%`.
fn format_percent(percent: f64) -> String {
    let s = format!("{percent:.4}");
    let s = s.trim_end_matches('0').trim_end_matches('.');
    format!("{s}%")
}

/// CSS width for a cell in the given mode.
pub fn cell_width_css(width: &WidthPolicy, mode: RenderMode) -> String {
    match (width, mode) {
        (WidthPolicy::FixedGrid, RenderMode::Print) => format!("calc(100% / {GRID_COLUMNS})"),
        _ => format_percent(width.percent()),
    }
}

fn render_cell(cell: &Cell, mode: RenderMode) -> VisualNode {
    let font_size = match mode {
        RenderMode::Screen => "9px",
        RenderMode::Print => "12px",
    };
    let node = VisualNode::new("div")
        .class("cell")
        .attr("data-index", cell.index.to_string())
        .style("width", cell_width_css(&cell.width, mode))
        .style("min-width", format!("{MIN_CELL_PX}px"))
        .style("max-width", format!("{MAX_CELL_PX}px"))
        .style("box-sizing", "border-box")
        .style("border", "1px solid black")
        .style("height", "20px")
        .style("line-height", "18px")
        .style("text-align", "center")
        .style("background", "white")
        .style("font-size", font_size)
        .style("flex-shrink", "0");
    match &cell.label {
        Some(label) => node.text(label.as_str()),
        None => node,
    }
}

/// Wraps cells in a progress-tracker row. No cells, no tracker.
pub fn render_tracker(cells: &[Cell], mode: RenderMode) -> Option<VisualNode> {
    if cells.is_empty() {
        return None;
    }
    let margin = match mode {
        RenderMode::Screen => "8px 0 0 0",
        RenderMode::Print => "0",
    };
    let tracker = VisualNode::new("p")
        .class("progress-tracker")
        .style("display", "flex")
        .style("flex-wrap", "wrap")
        .style("margin", margin)
        .style("padding", "0");
    Some(
        cells
            .iter()
            .fold(tracker, |t, cell| t.child(render_cell(cell, mode))),
    )
}

/// The single empty box drawn for checkbox goals.
pub fn render_checkbox() -> VisualNode {
    VisualNode::new("span")
        .class("checkbox")
        .style("border", "2px solid black")
        .style("box-sizing", "border-box")
        .style("display", "inline-block")
        .style("height", "20px")
        .style("width", "20px")
        .style("margin-right", "20px")
        .style("background", "white")
}

// ────────────────────────────────────────────────────────────────────────────
// Surface
// ────────────────────────────────────────────────────────────────────────────

/// Owns the rendered progress display of one goal.
#[derive(Debug, Default)]
pub struct TrackerSurface {
    content: Option<VisualNode>,
}

impl TrackerSurface {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the previous output with the display for `kind`.
    ///
    /// Checkbox goals skip the layout engine; steps goals with no cells leave
    /// the surface empty.
    pub fn render(&mut self, kind: &GoalKind, mode: RenderMode) -> Option<&VisualNode> {
        self.content = match kind {
            GoalKind::Checkbox => Some(render_checkbox()),
            GoalKind::Steps {
                step_count,
                label_style,
            } => render_tracker(&compute_cells(i64::from(*step_count), *label_style), mode),
        };
        self.content.as_ref()
    }

    pub fn take(&mut self) -> Option<VisualNode> {
        self.content.take()
    }
}

/// One goal line: optional checkbox, title, optional tracker below.
pub fn render_goal(goal: &Goal, mode: RenderMode) -> VisualNode {
    let mut surface = TrackerSurface::new();
    surface.render(&goal.kind, mode);

    let title = VisualNode::new("span")
        .class("text")
        .style("font-size", "20px")
        .style("line-height", "20px")
        .style("vertical-align", "top")
        .text(goal.title.as_str());

    let line = VisualNode::new("p")
        .class("goal")
        .attr("data-category", goal.category.as_str());

    match (goal.kind, surface.take()) {
        (GoalKind::Checkbox, Some(checkbox)) => line.child(checkbox).child(title),
        (_, Some(tracker)) => line.child(title).child(tracker),
        (_, None) => line.child(title),
    }
}
