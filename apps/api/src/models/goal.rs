use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use crate::layout::{LabelStyle, LayoutError};

/// Largest step count a goal may be created with.
pub const MAX_STEP_COUNT: u32 = 1000;

// ────────────────────────────────────────────────────────────────────────────
// Category
// ────────────────────────────────────────────────────────────────────────────

/// The seven life areas goals are grouped under, in display order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Category {
    Spiritual,
    Family,
    Physical,
    Financial,
    Educational,
    Career,
    Social,
}

impl Category {
    pub const ALL: [Category; 7] = [
        Category::Spiritual,
        Category::Family,
        Category::Physical,
        Category::Financial,
        Category::Educational,
        Category::Career,
        Category::Social,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Spiritual => "Spiritual",
            Category::Family => "Family",
            Category::Physical => "Physical",
            Category::Financial => "Financial",
            Category::Educational => "Educational",
            Category::Career => "Career",
            Category::Social => "Social",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = LayoutError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Category::ALL
            .into_iter()
            .find(|c| c.as_str() == s)
            .ok_or_else(|| LayoutError::UnknownCategory(s.to_string()))
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Goal kind
// ────────────────────────────────────────────────────────────────────────────

/// What a goal tracks. A steps goal always carries its count.
///
/// Tagged by `goal_type` so the wire shape matches the stored columns:
/// `{"goal_type": "steps", "step_count": 12, "label_style": "monthly"}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "goal_type", rename_all = "snake_case")]
pub enum GoalKind {
    Checkbox,
    Steps {
        step_count: u32,
        #[serde(default)]
        label_style: LabelStyle,
    },
}

/// The `goal_type` tag on its own, for requests that change one kind field at a time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GoalType {
    Checkbox,
    Steps,
}

impl GoalKind {
    pub fn goal_type(&self) -> GoalType {
        match self {
            GoalKind::Checkbox => GoalType::Checkbox,
            GoalKind::Steps { .. } => GoalType::Steps,
        }
    }

    pub fn goal_type_str(&self) -> &'static str {
        match self {
            GoalKind::Checkbox => "checkbox",
            GoalKind::Steps { .. } => "steps",
        }
    }

    /// `step_count` column value.
    pub fn step_count_column(&self) -> Option<i32> {
        match self {
            GoalKind::Checkbox => None,
            GoalKind::Steps { step_count, .. } => i32::try_from(*step_count).ok(),
        }
    }

    /// `label_style` column value. `none` is stored as NULL.
    pub fn label_style_column(&self) -> Option<&'static str> {
        match self {
            GoalKind::Steps { label_style, .. } if *label_style != LabelStyle::None => {
                Some(label_style.as_str())
            }
            _ => None,
        }
    }

    /// Rebuilds a kind from stored columns.
    ///
    /// A steps row with a missing or non-positive count maps to a zero-step
    /// goal, which renders no tracker. Unknown type or label style strings fail.
    pub fn from_columns(
        goal_type: &str,
        step_count: Option<i32>,
        label_style: Option<&str>,
    ) -> Result<Self, LayoutError> {
        match goal_type {
            "checkbox" => Ok(GoalKind::Checkbox),
            "steps" => {
                let label_style = match label_style {
                    Some(s) => s.parse()?,
                    None => LabelStyle::None,
                };
                let step_count = step_count
                    .and_then(|n| u32::try_from(n).ok())
                    .unwrap_or(0);
                Ok(GoalKind::Steps {
                    step_count,
                    label_style,
                })
            }
            other => Err(LayoutError::UnknownGoalType(other.to_string())),
        }
    }

    /// Checks the count range accepted on create/update.
    pub fn validate(&self) -> Result<(), String> {
        match self {
            GoalKind::Steps { step_count, .. } if !(1..=MAX_STEP_COUNT).contains(step_count) => {
                Err(format!(
                    "step_count must be between 1 and {MAX_STEP_COUNT}, got {step_count}"
                ))
            }
            _ => Ok(()),
        }
    }
}

/// Editor presets for steps goals.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "preset", rename_all = "snake_case")]
pub enum ProgressPreset {
    /// 12 boxes labeled by month.
    Monthly,
    /// 52 numbered boxes.
    Weekly,
    /// 365 boxes with milestone numbers.
    Daily,
    /// Any count, numbered.
    Count { step_count: u32 },
}

impl ProgressPreset {
    pub fn into_kind(self) -> GoalKind {
        let (step_count, label_style) = match self {
            ProgressPreset::Monthly => (12, LabelStyle::Monthly),
            ProgressPreset::Weekly => (52, LabelStyle::Numeric),
            ProgressPreset::Daily => (365, LabelStyle::Numeric),
            ProgressPreset::Count { step_count } => (step_count, LabelStyle::Numeric),
        };
        GoalKind::Steps {
            step_count,
            label_style,
        }
    }

    /// Infers the preset an edit form should show. Checkbox goals have none.
    pub fn from_kind(kind: &GoalKind) -> Option<Self> {
        match *kind {
            GoalKind::Checkbox => None,
            GoalKind::Steps {
                step_count: 12,
                label_style: LabelStyle::Monthly,
            } => Some(ProgressPreset::Monthly),
            GoalKind::Steps {
                step_count: 52,
                label_style: LabelStyle::Numeric,
            } => Some(ProgressPreset::Weekly),
            GoalKind::Steps {
                step_count: 365,
                label_style: LabelStyle::Numeric,
            } => Some(ProgressPreset::Daily),
            GoalKind::Steps { step_count, .. } => Some(ProgressPreset::Count { step_count }),
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Records
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct GoalList {
    pub id: Uuid,
    pub user_id: Uuid,
    pub title: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Goal {
    pub id: Uuid,
    pub goal_list_id: Uuid,
    pub title: String,
    pub category: Category,
    #[serde(flatten)]
    pub kind: GoalKind,
    pub order_index: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Raw `goals` row as stored in Postgres.
#[derive(Debug, Clone, FromRow)]
pub struct GoalRow {
    pub id: Uuid,
    pub goal_list_id: Uuid,
    pub title: String,
    pub goal_type: String,
    pub step_count: Option<i32>,
    pub label_style: Option<String>,
    pub category: String,
    pub order_index: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TryFrom<GoalRow> for Goal {
    type Error = LayoutError;

    fn try_from(row: GoalRow) -> Result<Self, Self::Error> {
        Ok(Goal {
            kind: GoalKind::from_columns(
                &row.goal_type,
                row.step_count,
                row.label_style.as_deref(),
            )?,
            category: row.category.parse()?,
            id: row.id,
            goal_list_id: row.goal_list_id,
            title: row.title,
            order_index: row.order_index,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

/// Fields for inserting a goal.
#[derive(Debug, Clone)]
pub struct NewGoal {
    pub goal_list_id: Uuid,
    pub title: String,
    pub category: Category,
    pub kind: GoalKind,
    pub order_index: i32,
}

/// Partial goal update; `None` leaves a field unchanged.
#[derive(Debug, Clone, Default)]
pub struct GoalPatch {
    pub title: Option<String>,
    pub category: Option<Category>,
    pub kind: Option<GoalKind>,
    pub order_index: Option<i32>,
}

impl GoalPatch {
    pub fn apply(&self, goal: &mut Goal) {
        if let Some(title) = &self.title {
            goal.title = title.clone();
        }
        if let Some(category) = self.category {
            goal.category = category;
        }
        if let Some(kind) = self.kind {
            goal.kind = kind;
        }
        if let Some(order_index) = self.order_index {
            goal.order_index = order_index;
        }
    }
}
