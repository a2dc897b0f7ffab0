use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::auth::CurrentUser;
use crate::errors::AppError;
use crate::layout::LabelStyle;
use crate::models::goal::{
    Category, Goal, GoalKind, GoalList, GoalPatch, GoalType, NewGoal, ProgressPreset,
};
use crate::state::AppState;

#[derive(Deserialize)]
pub struct TitleRequest {
    pub title: String,
}

#[derive(Deserialize)]
pub struct CreateGoalRequest {
    pub title: String,
    pub category: Category,
    #[serde(flatten)]
    pub kind: GoalKind,
    /// Defaults to the end of the goal's category.
    pub order_index: Option<i32>,
}

/// Goal edit with the same flat kind fields as create. Omitted fields keep
/// their current value.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UpdateGoalRequest {
    pub title: Option<String>,
    pub category: Option<Category>,
    pub goal_type: Option<GoalType>,
    pub step_count: Option<u32>,
    pub label_style: Option<LabelStyle>,
    pub order_index: Option<i32>,
}

impl UpdateGoalRequest {
    /// Merges the kind fields over `current`. `None` when none were sent.
    fn merged_kind(&self, current: GoalKind) -> Result<Option<GoalKind>, AppError> {
        if self.goal_type.is_none() && self.step_count.is_none() && self.label_style.is_none() {
            return Ok(None);
        }
        let kind = match self.goal_type.unwrap_or(current.goal_type()) {
            GoalType::Checkbox => {
                if self.step_count.is_some() || self.label_style.is_some() {
                    return Err(AppError::Validation(
                        "step_count and label_style only apply to steps goals".to_string(),
                    ));
                }
                GoalKind::Checkbox
            }
            GoalType::Steps => {
                let (current_count, current_style) = match current {
                    GoalKind::Steps {
                        step_count,
                        label_style,
                    } => (Some(step_count), label_style),
                    GoalKind::Checkbox => (None, LabelStyle::None),
                };
                let step_count = self.step_count.or(current_count).ok_or_else(|| {
                    AppError::Validation("step_count is required for steps goals".to_string())
                })?;
                GoalKind::Steps {
                    step_count,
                    label_style: self.label_style.unwrap_or(current_style),
                }
            }
        };
        kind.validate().map_err(AppError::Validation)?;
        Ok(Some(kind))
    }

    fn into_patch(self, current: &Goal) -> Result<GoalPatch, AppError> {
        let kind = self.merged_kind(current.kind)?;
        let title = self.title.as_deref().map(require_title).transpose()?;
        Ok(GoalPatch {
            title,
            category: self.category,
            kind,
            order_index: self.order_index,
        })
    }
}

/// A goal plus the editor preset that matches its kind.
#[derive(Serialize)]
pub struct GoalView {
    #[serde(flatten)]
    pub goal: Goal,
    pub progress_preset: Option<ProgressPreset>,
}

impl From<Goal> for GoalView {
    fn from(goal: Goal) -> Self {
        let progress_preset = ProgressPreset::from_kind(&goal.kind);
        Self {
            goal,
            progress_preset,
        }
    }
}

fn require_title(title: &str) -> Result<String, AppError> {
    let title = title.trim();
    if title.is_empty() {
        return Err(AppError::Validation("title must not be empty".to_string()));
    }
    Ok(title.to_string())
}

/// Loads a goal list and checks it belongs to `user_id`.
/// Lists owned by someone else read as missing.
pub async fn owned_goal_list(
    state: &AppState,
    user_id: Uuid,
    id: Uuid,
) -> Result<GoalList, AppError> {
    state
        .store
        .get_goal_list(id)
        .await?
        .filter(|list| list.user_id == user_id)
        .ok_or_else(|| AppError::NotFound(format!("Goal list {id} not found")))
}

async fn owned_goal(state: &AppState, user_id: Uuid, id: Uuid) -> Result<Goal, AppError> {
    let goal = state
        .store
        .get_goal(id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Goal {id} not found")))?;
    owned_goal_list(state, user_id, goal.goal_list_id)
        .await
        .map_err(|_| AppError::NotFound(format!("Goal {id} not found")))?;
    Ok(goal)
}

// ────────────────────────────────────────────────────────────────────────────
// Goal lists
// ────────────────────────────────────────────────────────────────────────────

/// GET /api/v1/goal-lists
pub async fn handle_list_goal_lists(
    State(state): State<AppState>,
    current: CurrentUser,
) -> Result<Json<Vec<GoalList>>, AppError> {
    Ok(Json(state.store.list_goal_lists(current.user.id).await?))
}

/// POST /api/v1/goal-lists
pub async fn handle_create_goal_list(
    State(state): State<AppState>,
    current: CurrentUser,
    Json(req): Json<TitleRequest>,
) -> Result<(StatusCode, Json<GoalList>), AppError> {
    let title = require_title(&req.title)?;
    let list = state
        .store
        .create_goal_list(current.user.id, &title)
        .await?;
    Ok((StatusCode::CREATED, Json(list)))
}

/// PATCH /api/v1/goal-lists/:id
pub async fn handle_update_goal_list(
    State(state): State<AppState>,
    current: CurrentUser,
    Path(id): Path<Uuid>,
    Json(req): Json<TitleRequest>,
) -> Result<Json<GoalList>, AppError> {
    let title = require_title(&req.title)?;
    owned_goal_list(&state, current.user.id, id).await?;
    Ok(Json(state.store.update_goal_list(id, &title).await?))
}

/// DELETE /api/v1/goal-lists/:id
pub async fn handle_delete_goal_list(
    State(state): State<AppState>,
    current: CurrentUser,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    owned_goal_list(&state, current.user.id, id).await?;
    state.store.delete_goal_list(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

// ────────────────────────────────────────────────────────────────────────────
// Goals
// ────────────────────────────────────────────────────────────────────────────

/// GET /api/v1/goal-lists/:id/goals
pub async fn handle_list_goals(
    State(state): State<AppState>,
    current: CurrentUser,
    Path(id): Path<Uuid>,
) -> Result<Json<Vec<GoalView>>, AppError> {
    owned_goal_list(&state, current.user.id, id).await?;
    let goals = state.store.list_goals(id).await?;
    Ok(Json(goals.into_iter().map(GoalView::from).collect()))
}

/// POST /api/v1/goal-lists/:id/goals
pub async fn handle_create_goal(
    State(state): State<AppState>,
    current: CurrentUser,
    Path(id): Path<Uuid>,
    Json(req): Json<CreateGoalRequest>,
) -> Result<(StatusCode, Json<GoalView>), AppError> {
    let title = require_title(&req.title)?;
    req.kind.validate().map_err(AppError::Validation)?;
    owned_goal_list(&state, current.user.id, id).await?;

    let order_index = match req.order_index {
        Some(i) => i,
        None => {
            let in_category = state
                .store
                .list_goals(id)
                .await?
                .iter()
                .filter(|g| g.category == req.category)
                .count();
            i32::try_from(in_category)
                .map_err(|_| AppError::Validation("too many goals in category".to_string()))?
        }
    };

    let goal = state
        .store
        .create_goal(NewGoal {
            goal_list_id: id,
            title,
            category: req.category,
            kind: req.kind,
            order_index,
        })
        .await?;
    Ok((StatusCode::CREATED, Json(goal.into())))
}

/// PATCH /api/v1/goals/:id
pub async fn handle_update_goal(
    State(state): State<AppState>,
    current: CurrentUser,
    Path(id): Path<Uuid>,
    Json(req): Json<UpdateGoalRequest>,
) -> Result<Json<GoalView>, AppError> {
    let goal = owned_goal(&state, current.user.id, id).await?;
    let patch = req.into_patch(&goal)?;
    Ok(Json(state.store.update_goal(id, &patch).await?.into()))
}

/// DELETE /api/v1/goals/:id
pub async fn handle_delete_goal(
    State(state): State<AppState>,
    current: CurrentUser,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    owned_goal(&state, current.user.id, id).await?;
    state.store.delete_goal(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
