//! Whole-page rendering of a goal list.
//!
//! Goals are grouped by category in the fixed category order. Categories with
//! no goals are left out. Within a category the incoming order is kept, which
//! is `order_index` ascending when goals come from the store.

use chrono::Utc;
use uuid::Uuid;

use crate::layout::render::{escape_html, render_goal, RenderMode, VisualNode};
use crate::models::goal::{Category, Goal, GoalKind, ProgressPreset};

pub const EXAMPLE_TITLE: &str = "2025 Goals!";

const STYLESHEET: &str = r#"
body { font-family: Lato, sans-serif; margin: 0; padding: 24px; }
.print-container { max-width: 960px; margin: 0 auto; }
.print-goals-title { font-size: 36px; font-weight: 300; margin: 0 0 10px; }
.category-title { font-size: 24px; font-weight: 400; margin: 30px 0 10px; }
.goal { margin: 0 0 16px 0; padding: 0; line-height: 20px; }
.progress-tracker { display: flex; flex-wrap: wrap; margin: 0; padding: 0; }
"#;

const PRINT_STYLESHEET: &str = r#"
@page { size: letter; margin: 0.5in; }
body { padding: 0; }
.goal { break-inside: avoid; }
"#;

/// Builds the sheet body: title, then one section per non-empty category.
pub fn render_sheet(title: &str, goals: &[Goal], mode: RenderMode) -> VisualNode {
    let heading = VisualNode::new("h1")
        .class("print-goals-title")
        .text(title);

    Category::ALL
        .iter()
        .filter_map(|category| {
            let in_category: Vec<&Goal> =
                goals.iter().filter(|g| g.category == *category).collect();
            if in_category.is_empty() {
                return None;
            }
            let header = VisualNode::new("h2")
                .class("category-title")
                .text(category.as_str());
            Some(in_category.into_iter().fold(
                VisualNode::new("div")
                    .class("category")
                    .attr("data-category", category.as_str())
                    .child(header),
                |section, goal| section.child(render_goal(goal, mode)),
            ))
        })
        .fold(
            VisualNode::new("div")
                .class("print-container")
                .child(heading),
            |container, section| container.child(section),
        )
}

/// A standalone HTML document for the sheet, stylesheet included.
pub fn render_sheet_document(title: &str, goals: &[Goal], mode: RenderMode) -> String {
    let mut css = STYLESHEET.to_string();
    if mode == RenderMode::Print {
        css.push_str(PRINT_STYLESHEET);
    }
    format!(
        "<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n\
         <title>{}</title>\n<style>{css}</style>\n</head>\n<body>\n{}\n</body>\n</html>\n",
        escape_html(title),
        render_sheet(title, goals, mode).to_html()
    )
}

/// The demo list shown to signed-out visitors.
pub fn example_goals() -> Vec<Goal> {
    let list_id = Uuid::nil();
    let now = Utc::now();
    let entries: [(Category, &str, GoalKind); 8] = [
        (Category::Physical, "Drink 8 glasses of water daily", GoalKind::Checkbox),
        (Category::Physical, "Exercise 3x per week", ProgressPreset::Weekly.into_kind()),
        (Category::Career, "Update LinkedIn profile", GoalKind::Checkbox),
        (
            Category::Career,
            "Read one professional book monthly",
            ProgressPreset::Monthly.into_kind(),
        ),
        (Category::Family, "Call family weekly", ProgressPreset::Weekly.into_kind()),
        (
            Category::Family,
            "Monthly meal prep sessions",
            ProgressPreset::Monthly.into_kind(),
        ),
        (Category::Educational, "Learn a new language", GoalKind::Checkbox),
        (
            Category::Educational,
            "Write in journal daily",
            ProgressPreset::Daily.into_kind(),
        ),
    ];

    entries
        .into_iter()
        .enumerate()
        .map(|(i, (category, title, kind))| Goal {
            id: Uuid::from_u128(i as u128 + 1),
            goal_list_id: list_id,
            title: title.to_string(),
            category,
            kind,
            order_index: i as i32,
            created_at: now,
            updated_at: now,
        })
        .collect()
}
