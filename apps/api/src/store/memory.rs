use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;
use tracing::info;
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::goal::{Goal, GoalList, GoalPatch, NewGoal};
use crate::store::GoalStore;

#[derive(Default)]
struct Tables {
    goal_lists: HashMap<Uuid, GoalList>,
    goals: HashMap<Uuid, Goal>,
}

/// Process-local store. Contents are lost on restart.
#[derive(Default)]
pub struct MemoryGoalStore {
    tables: RwLock<Tables>,
}

impl MemoryGoalStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl GoalStore for MemoryGoalStore {
    async fn list_goal_lists(&self, user_id: Uuid) -> Result<Vec<GoalList>, AppError> {
        let tables = self.tables.read().await;
        let mut lists: Vec<GoalList> = tables
            .goal_lists
            .values()
            .filter(|l| l.user_id == user_id)
            .cloned()
            .collect();
        lists.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(lists)
    }

    async fn get_goal_list(&self, id: Uuid) -> Result<Option<GoalList>, AppError> {
        Ok(self.tables.read().await.goal_lists.get(&id).cloned())
    }

    async fn create_goal_list(&self, user_id: Uuid, title: &str) -> Result<GoalList, AppError> {
        let now = Utc::now();
        let list = GoalList {
            id: Uuid::new_v4(),
            user_id,
            title: title.to_string(),
            created_at: now,
            updated_at: now,
        };
        self.tables
            .write()
            .await
            .goal_lists
            .insert(list.id, list.clone());
        info!("Created goal list {} for user {user_id}", list.id);
        Ok(list)
    }

    async fn update_goal_list(&self, id: Uuid, title: &str) -> Result<GoalList, AppError> {
        let mut tables = self.tables.write().await;
        let list = tables
            .goal_lists
            .get_mut(&id)
            .ok_or_else(|| AppError::NotFound(format!("Goal list {id} not found")))?;
        list.title = title.to_string();
        list.updated_at = Utc::now();
        Ok(list.clone())
    }

    async fn delete_goal_list(&self, id: Uuid) -> Result<(), AppError> {
        let mut tables = self.tables.write().await;
        tables.goal_lists.remove(&id);
        tables.goals.retain(|_, g| g.goal_list_id != id);
        info!("Deleted goal list {id}");
        Ok(())
    }

    async fn list_goals(&self, goal_list_id: Uuid) -> Result<Vec<Goal>, AppError> {
        let tables = self.tables.read().await;
        let mut goals: Vec<Goal> = tables
            .goals
            .values()
            .filter(|g| g.goal_list_id == goal_list_id)
            .cloned()
            .collect();
        // created_at breaks ties so equal order_index values stay stable
        goals.sort_by(|a, b| {
            a.order_index
                .cmp(&b.order_index)
                .then(a.created_at.cmp(&b.created_at))
        });
        Ok(goals)
    }

    async fn get_goal(&self, id: Uuid) -> Result<Option<Goal>, AppError> {
        Ok(self.tables.read().await.goals.get(&id).cloned())
    }

    async fn create_goal(&self, goal: NewGoal) -> Result<Goal, AppError> {
        let mut tables = self.tables.write().await;
        if !tables.goal_lists.contains_key(&goal.goal_list_id) {
            return Err(AppError::NotFound(format!(
                "Goal list {} not found",
                goal.goal_list_id
            )));
        }
        let now = Utc::now();
        let goal = Goal {
            id: Uuid::new_v4(),
            goal_list_id: goal.goal_list_id,
            title: goal.title,
            category: goal.category,
            kind: goal.kind,
            order_index: goal.order_index,
            created_at: now,
            updated_at: now,
        };
        tables.goals.insert(goal.id, goal.clone());
        info!("Created goal {} in list {}", goal.id, goal.goal_list_id);
        Ok(goal)
    }

    async fn update_goal(&self, id: Uuid, patch: &GoalPatch) -> Result<Goal, AppError> {
        let mut tables = self.tables.write().await;
        let goal = tables
            .goals
            .get_mut(&id)
            .ok_or_else(|| AppError::NotFound(format!("Goal {id} not found")))?;
        patch.apply(goal);
        goal.updated_at = Utc::now();
        Ok(goal.clone())
    }

    async fn delete_goal(&self, id: Uuid) -> Result<(), AppError> {
        self.tables.write().await.goals.remove(&id);
        info!("Deleted goal {id}");
        Ok(())
    }
}
