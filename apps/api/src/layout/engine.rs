//! Progress-tracker layout engine.
//!
//! Turns a goal's step count and label style into the ordered cells of its
//! progress tracker. Pure: no I/O, no shared state, safe to call from any task.
//!
//! # Rules
//! - Render count: `n = step_count`. Non-positive counts produce no cells.
//! - Monthly labels: `Jan`..`Dec` on cells 1..=12, nothing after that.
//! - Numeric labels: every cell when `n ≤ 52`, otherwise every 10th cell.
//! - Width: `n < 40` fills one row (`100/n` %), `n ≥ 40` uses a 40-column grid.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

// ────────────────────────────────────────────────────────────────────────────
// Constants
// ────────────────────────────────────────────────────────────────────────────

/// Columns per row once a tracker switches to the fixed grid.
pub const GRID_COLUMNS: u32 = 40;
/// Counts up to this value get a label on every numeric cell.
pub const FULL_NUMERIC_LABEL_LIMIT: u32 = 52;
/// Milestone spacing for numeric labels on long trackers.
pub const MILESTONE_INTERVAL: u32 = 10;
/// Absolute lower bound for a cell, in CSS pixels.
pub const MIN_CELL_PX: u32 = 20;
/// Absolute upper bound for a cell, in CSS pixels.
pub const MAX_CELL_PX: u32 = 140;

pub const MONTHS: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

// ────────────────────────────────────────────────────────────────────────────
// Types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Error, PartialEq, Eq)]
pub enum LayoutError {
    #[error("unknown label style '{0}'")]
    UnknownLabelStyle(String),

    #[error("unknown goal type '{0}'")]
    UnknownGoalType(String),

    #[error("unknown category '{0}'")]
    UnknownCategory(String),
}

/// How the cells of a tracker are labeled.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LabelStyle {
    #[default]
    None,
    Numeric,
    Monthly,
}

impl LabelStyle {
    pub fn as_str(&self) -> &'static str {
        match self {
            LabelStyle::None => "none",
            LabelStyle::Numeric => "numeric",
            LabelStyle::Monthly => "monthly",
        }
    }
}

impl fmt::Display for LabelStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LabelStyle {
    type Err = LayoutError;

    /// Strict parse. Anything other than the three known styles is a data error.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "none" => Ok(LabelStyle::None),
            "numeric" => Ok(LabelStyle::Numeric),
            "monthly" => Ok(LabelStyle::Monthly),
            other => Err(LayoutError::UnknownLabelStyle(other.to_string())),
        }
    }
}

/// Horizontal sizing of a single cell.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "policy", rename_all = "snake_case")]
pub enum WidthPolicy {
    /// One row holds every cell; each takes `percent` of the row width.
    FillRow { percent: f64 },
    /// Fixed 40-column grid; each cell takes 1/40 of the row width.
    FixedGrid,
}

impl WidthPolicy {
    /// Share of the row width as a percentage, before the pixel clamps apply.
    pub fn percent(&self) -> f64 {
        match self {
            WidthPolicy::FillRow { percent } => *percent,
            WidthPolicy::FixedGrid => 100.0 / GRID_COLUMNS as f64,
        }
    }

    /// Resolves the cell width in pixels for a concrete row width, clamped to
    /// `[MIN_CELL_PX, MAX_CELL_PX]`.
    pub fn resolve_px(&self, row_width_px: f64) -> f64 {
        (row_width_px * self.percent() / 100.0).clamp(MIN_CELL_PX as f64, MAX_CELL_PX as f64)
    }
}

/// One box of a progress tracker.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Cell {
    /// 1-based position in the tracker.
    pub index: u32,
    pub label: Option<String>,
    pub width: WidthPolicy,
}

// ────────────────────────────────────────────────────────────────────────────
// Core functions
// ────────────────────────────────────────────────────────────────────────────

/// Computes the cells of a progress tracker, ascending by index.
///
/// `step_count <= 0` means there is nothing to track and yields no cells.
pub fn compute_cells(step_count: i64, label_style: LabelStyle) -> Vec<Cell> {
    let n = match u32::try_from(step_count) {
        Ok(n) if n > 0 => n,
        _ => return Vec::new(),
    };

    let width = width_policy(n);
    (1..=n)
        .map(|index| Cell {
            index,
            label: cell_label(index, n, label_style),
            width,
        })
        .collect()
}

/// Width policy shared by every cell of an `n`-cell tracker.
pub fn width_policy(n: u32) -> WidthPolicy {
    if n < GRID_COLUMNS {
        WidthPolicy::FillRow {
            percent: 100.0 / n as f64,
        }
    } else {
        WidthPolicy::FixedGrid
    }
}

/// Label for cell `index` of an `n`-cell tracker.
pub fn cell_label(index: u32, n: u32, label_style: LabelStyle) -> Option<String> {
    match label_style {
        LabelStyle::None => None,
        LabelStyle::Monthly => month_abbrev(index).map(str::to_string),
        LabelStyle::Numeric => {
            if n <= FULL_NUMERIC_LABEL_LIMIT || index % MILESTONE_INTERVAL == 0 {
                Some(index.to_string())
            } else {
                None
            }
        }
    }
}

/// `Jan` for 1 through `Dec` for 12; `None` outside that range.
pub fn month_abbrev(index: u32) -> Option<&'static str> {
    let i = usize::try_from(index).ok()?.checked_sub(1)?;
    MONTHS.get(i).copied()
}
