use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

use crate::error::{AppError, AppResult};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, sqlx::Type, PartialEq, Eq, ToSchema)]
#[sqlx(type_name = "task_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    Pending,
    InProgress,
    Completed,
}

impl Default for TaskStatus {
    fn default() -> Self {
        Self::Pending
    }
}

impl TaskStatus {
    pub fn advance(self, to: TaskStatus) -> AppResult<TaskStatus> {
        match (self, to) {
            (TaskStatus::Pending, TaskStatus::InProgress)
            | (TaskStatus::Pending, TaskStatus::Completed)
            | (TaskStatus::InProgress, TaskStatus::Completed) => Ok(to),
            (from, to) => Err(AppError::Conflict(format!(
                "Нельзя перевести задачу из {:?} в {:?}",
                from, to
            ))),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, sqlx::Type, PartialEq, Eq, ToSchema)]
#[sqlx(type_name = "task_priority", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum TaskPriority {
    Low,
    Normal,
    High,
    Urgent,
}

impl Default for TaskPriority {
    fn default() -> Self {
        Self::Normal
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, sqlx::Type, PartialEq, Eq, ToSchema)]
#[sqlx(type_name = "cleaning_type", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum CleaningType {
    Checkout,
    Routine,
    Deep,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct CleaningTask {
    pub id: Uuid,
    pub room_id: Uuid,
    pub task_type: CleaningType,
    pub booking_code: Option<String>,
    pub priority: TaskPriority,
    pub status: TaskStatus,
    pub notes: Option<String>,
    pub assigned_to: Option<Uuid>,
    pub completed_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct MaintenanceTask {
    pub id: Uuid,
    pub room_id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub priority: TaskPriority,
    pub status: TaskStatus,
    pub reported_by: Option<Uuid>,
    pub completed_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// DTOs
#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateCleaningTaskRequest {
    pub room_id: Uuid,
    pub task_type: Option<CleaningType>,
    pub priority: Option<TaskPriority>,
    pub notes: Option<String>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateMaintenanceTaskRequest {
    pub room_id: Uuid,
    #[validate(length(min = 1, max = 200))]
    pub title: String,
    pub description: Option<String>,
    pub priority: Option<TaskPriority>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateTaskStatusRequest {
    pub status: TaskStatus,
}

#[derive(Debug, Deserialize, IntoParams)]
pub struct TasksQuery {
    pub status: Option<TaskStatus>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_task_status_advance() {
        assert_eq!(
            TaskStatus::Pending.advance(TaskStatus::InProgress).unwrap(),
            TaskStatus::InProgress
        );
        assert_eq!(
            TaskStatus::InProgress.advance(TaskStatus::Completed).unwrap(),
            TaskStatus::Completed
        );
        assert_eq!(
            TaskStatus::Pending.advance(TaskStatus::Completed).unwrap(),
            TaskStatus::Completed
        );
        assert!(TaskStatus::Completed.advance(TaskStatus::Pending).is_err());
        assert!(TaskStatus::Completed.advance(TaskStatus::Completed).is_err());
        assert!(TaskStatus::InProgress.advance(TaskStatus::Pending).is_err());
    }
}
