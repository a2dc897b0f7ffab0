//! Record store — CRUD over goal lists and goals.
//!
//! `AppState` holds an `Arc<dyn GoalStore>`. `PgGoalStore` is used when a
//! database URL is configured; `MemoryGoalStore` otherwise and in tests.
//!
//! Ordering contract:
//! - goal lists come back newest-first by `created_at`
//! - goals come back by `order_index` ascending

pub mod memory;
pub mod postgres;

use async_trait::async_trait;
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::goal::{Goal, GoalList, GoalPatch, NewGoal};

pub use memory::MemoryGoalStore;
pub use postgres::PgGoalStore;

#[async_trait]
pub trait GoalStore: Send + Sync {
    async fn list_goal_lists(&self, user_id: Uuid) -> Result<Vec<GoalList>, AppError>;

    async fn get_goal_list(&self, id: Uuid) -> Result<Option<GoalList>, AppError>;

    async fn create_goal_list(&self, user_id: Uuid, title: &str) -> Result<GoalList, AppError>;

    async fn update_goal_list(&self, id: Uuid, title: &str) -> Result<GoalList, AppError>;

    /// Deletes the list and every goal in it.
    async fn delete_goal_list(&self, id: Uuid) -> Result<(), AppError>;

    async fn list_goals(&self, goal_list_id: Uuid) -> Result<Vec<Goal>, AppError>;

    async fn get_goal(&self, id: Uuid) -> Result<Option<Goal>, AppError>;

    async fn create_goal(&self, goal: NewGoal) -> Result<Goal, AppError>;

    async fn update_goal(&self, id: Uuid, patch: &GoalPatch) -> Result<Goal, AppError>;

    async fn delete_goal(&self, id: Uuid) -> Result<(), AppError>;
}
