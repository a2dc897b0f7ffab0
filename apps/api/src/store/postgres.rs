use async_trait::async_trait;
use sqlx::PgPool;
use tracing::info;
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::goal::{Goal, GoalList, GoalPatch, GoalRow, NewGoal};
use crate::store::GoalStore;

/// `GoalStore` over the `goal_lists` and `goals` tables.
#[derive(Clone)]
pub struct PgGoalStore {
    pool: PgPool,
}

impl PgGoalStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn into_goal(row: GoalRow) -> Result<Goal, AppError> {
    Ok(Goal::try_from(row)?)
}

#[async_trait]
impl GoalStore for PgGoalStore {
    async fn list_goal_lists(&self, user_id: Uuid) -> Result<Vec<GoalList>, AppError> {
        Ok(sqlx::query_as::<_, GoalList>(
            "SELECT * FROM goal_lists WHERE user_id = $1 ORDER BY created_at DESC",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?)
    }

    async fn get_goal_list(&self, id: Uuid) -> Result<Option<GoalList>, AppError> {
        Ok(
            sqlx::query_as::<_, GoalList>("SELECT * FROM goal_lists WHERE id = $1")
                .bind(id)
                .fetch_optional(&self.pool)
                .await?,
        )
    }

    async fn create_goal_list(&self, user_id: Uuid, title: &str) -> Result<GoalList, AppError> {
        let list = sqlx::query_as::<_, GoalList>(
            "INSERT INTO goal_lists (id, user_id, title) VALUES ($1, $2, $3) RETURNING *",
        )
        .bind(Uuid::new_v4())
        .bind(user_id)
        .bind(title)
        .fetch_one(&self.pool)
        .await?;
        info!("Created goal list {} for user {user_id}", list.id);
        Ok(list)
    }

    async fn update_goal_list(&self, id: Uuid, title: &str) -> Result<GoalList, AppError> {
        sqlx::query_as::<_, GoalList>(
            "UPDATE goal_lists SET title = $1, updated_at = now() WHERE id = $2 RETURNING *",
        )
        .bind(title)
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Goal list {id} not found")))
    }

    async fn delete_goal_list(&self, id: Uuid) -> Result<(), AppError> {
        // goals.goal_list_id is ON DELETE CASCADE
        sqlx::query("DELETE FROM goal_lists WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        info!("Deleted goal list {id}");
        Ok(())
    }

    async fn list_goals(&self, goal_list_id: Uuid) -> Result<Vec<Goal>, AppError> {
        sqlx::query_as::<_, GoalRow>(
            "SELECT * FROM goals WHERE goal_list_id = $1 ORDER BY order_index ASC, created_at ASC",
        )
        .bind(goal_list_id)
        .fetch_all(&self.pool)
        .await?
        .into_iter()
        .map(into_goal)
        .collect()
    }

    async fn get_goal(&self, id: Uuid) -> Result<Option<Goal>, AppError> {
        sqlx::query_as::<_, GoalRow>("SELECT * FROM goals WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .map(into_goal)
            .transpose()
    }

    async fn create_goal(&self, goal: NewGoal) -> Result<Goal, AppError> {
        let row = sqlx::query_as::<_, GoalRow>(
            r#"
            INSERT INTO goals
                (id, goal_list_id, title, goal_type, step_count, label_style, category, order_index)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(goal.goal_list_id)
        .bind(&goal.title)
        .bind(goal.kind.goal_type_str())
        .bind(goal.kind.step_count_column())
        .bind(goal.kind.label_style_column())
        .bind(goal.category.as_str())
        .bind(goal.order_index)
        .fetch_one(&self.pool)
        .await?;
        info!("Created goal {} in list {}", row.id, row.goal_list_id);
        into_goal(row)
    }

    async fn update_goal(&self, id: Uuid, patch: &GoalPatch) -> Result<Goal, AppError> {
        // Kind columns move together: a patch that changes the kind overwrites
        // all three, including clearing step_count/label_style for checkboxes.
        let row = sqlx::query_as::<_, GoalRow>(
            r#"
            UPDATE goals SET
                title       = COALESCE($1, title),
                category    = COALESCE($2, category),
                goal_type   = CASE WHEN $3 THEN $4 ELSE goal_type END,
                step_count  = CASE WHEN $3 THEN $5 ELSE step_count END,
                label_style = CASE WHEN $3 THEN $6 ELSE label_style END,
                order_index = COALESCE($7, order_index),
                updated_at  = now()
            WHERE id = $8
            RETURNING *
            "#,
        )
        .bind(patch.title.as_deref())
        .bind(patch.category.map(|c| c.as_str()))
        .bind(patch.kind.is_some())
        .bind(patch.kind.map(|k| k.goal_type_str()))
        .bind(patch.kind.and_then(|k| k.step_count_column()))
        .bind(patch.kind.and_then(|k| k.label_style_column()))
        .bind(patch.order_index)
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Goal {id} not found")))?;
        into_goal(row)
    }

    async fn delete_goal(&self, id: Uuid) -> Result<(), AppError> {
        sqlx::query("DELETE FROM goals WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        info!("Deleted goal {id}");
        Ok(())
    }
}
