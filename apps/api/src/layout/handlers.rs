use axum::{
    extract::{Path, Query, State},
    response::Html,
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::debug;
use uuid::Uuid;

use crate::auth::CurrentUser;
use crate::errors::AppError;
use crate::goals::handlers::owned_goal_list;
use crate::layout::engine::{compute_cells, Cell, LabelStyle};
use crate::layout::render::{render_tracker, RenderMode};
use crate::layout::sheet::{example_goals, render_sheet_document, EXAMPLE_TITLE};
use crate::models::goal::MAX_STEP_COUNT;
use crate::state::AppState;

#[derive(Deserialize)]
pub struct ModeQuery {
    #[serde(default)]
    pub mode: RenderMode,
}

#[derive(Deserialize)]
pub struct TrackerQuery {
    pub step_count: i64,
    #[serde(default)]
    pub label_style: LabelStyle,
    #[serde(default)]
    pub mode: RenderMode,
    /// When given, the clamped pixel width of each cell on a row this wide.
    pub row_width_px: Option<f64>,
}

#[derive(Serialize)]
pub struct TrackerPreview {
    pub cells: Vec<Cell>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cell_width_px: Option<f64>,
    /// `None` when there are no cells to draw.
    pub html: Option<String>,
}

/// GET /api/v1/tracker
///
/// Counts of zero or below preview as an empty tracker.
pub async fn handle_tracker_preview(
    Query(q): Query<TrackerQuery>,
) -> Result<Json<TrackerPreview>, AppError> {
    if q.step_count > i64::from(MAX_STEP_COUNT) {
        return Err(AppError::Validation(format!(
            "step_count must be at most {MAX_STEP_COUNT}, got {}",
            q.step_count
        )));
    }
    let cells = compute_cells(q.step_count, q.label_style);
    let cell_width_px = q
        .row_width_px
        .zip(cells.first())
        .map(|(row, cell)| cell.width.resolve_px(row));
    let html = render_tracker(&cells, q.mode).map(|node| node.to_html());
    Ok(Json(TrackerPreview {
        cells,
        cell_width_px,
        html,
    }))
}

/// GET /api/v1/goal-lists/:id/sheet
pub async fn handle_goal_list_sheet(
    State(state): State<AppState>,
    current: CurrentUser,
    Path(id): Path<Uuid>,
    Query(q): Query<ModeQuery>,
) -> Result<Html<String>, AppError> {
    let list = owned_goal_list(&state, current.user.id, id).await?;
    let goals = state.store.list_goals(id).await?;
    debug!("Rendering sheet for list {id} with {} goals ({:?})", goals.len(), q.mode);
    Ok(Html(render_sheet_document(&list.title, &goals, q.mode)))
}

/// GET /api/v1/example/sheet
pub async fn handle_example_sheet(Query(q): Query<ModeQuery>) -> Html<String> {
    Html(render_sheet_document(EXAMPLE_TITLE, &example_goals(), q.mode))
}
