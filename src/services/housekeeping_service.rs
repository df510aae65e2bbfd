use serde_json::json;
use sqlx::{PgConnection, PgPool};
use uuid::Uuid;
use validator::Validate;

use crate::error::{AppError, AppResult};
use crate::models::{
    AuditAction, CleaningTask, CleaningType, CreateCleaningTaskRequest,
    CreateMaintenanceTaskRequest, MaintenanceTask, RoomStatus, TaskPriority, TaskStatus,
};
use crate::services::{AuditService, RoomService};

pub struct HousekeepingService;

impl HousekeepingService {
    /// Задача уборки после выезда. Если по номеру уже есть незавершённая
    /// уборка, новая не создаётся.
    pub async fn spawn_checkout_cleaning(
        conn: &mut PgConnection,
        room_id: Uuid,
        booking_code: &str,
    ) -> AppResult<Option<CleaningTask>> {
        let open: Option<(Uuid,)> = sqlx::query_as(
            r#"
            SELECT id FROM cleaning_tasks
            WHERE room_id = $1 AND status IN ('pending', 'in_progress')
            LIMIT 1
            "#,
        )
        .bind(room_id)
        .fetch_optional(&mut *conn)
        .await?;

        if let Some((task_id,)) = open {
            tracing::debug!(%room_id, %task_id, "Open cleaning task exists, skipping spawn");
            return Ok(None);
        }

        let task = sqlx::query_as::<_, CleaningTask>(
            r#"
            INSERT INTO cleaning_tasks (room_id, task_type, booking_code, priority, status)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING *
            "#,
        )
        .bind(room_id)
        .bind(CleaningType::Checkout)
        .bind(booking_code)
        .bind(TaskPriority::High)
        .bind(TaskStatus::Pending)
        .fetch_one(&mut *conn)
        .await?;

        Ok(Some(task))
    }

    pub async fn create_cleaning_task(
        pool: &PgPool,
        payload: CreateCleaningTaskRequest,
        actor_id: Uuid,
    ) -> AppResult<CleaningTask> {
        RoomService::get_room(pool, payload.room_id).await?;

        let task = sqlx::query_as::<_, CleaningTask>(
            r#"
            INSERT INTO cleaning_tasks (room_id, task_type, priority, status, notes)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING *
            "#,
        )
        .bind(payload.room_id)
        .bind(payload.task_type.unwrap_or(CleaningType::Routine))
        .bind(payload.priority.unwrap_or_default())
        .bind(TaskStatus::Pending)
        .bind(&payload.notes)
        .fetch_one(pool)
        .await?;

        tracing::info!(task_id = %task.id, room_id = %task.room_id, %actor_id, "Cleaning task created");

        Ok(task)
    }

    /// Создаёт заявку на ремонт. Свободный или убираемый номер сразу
    /// переводится в `maintenance`; занятый номер не трогаем.
    pub async fn create_maintenance_task(
        pool: &PgPool,
        payload: CreateMaintenanceTaskRequest,
        actor_id: Uuid,
    ) -> AppResult<MaintenanceTask> {
        payload.validate()?;

        let mut tx = pool.begin().await?;

        let room = RoomService::lock_room(&mut tx, payload.room_id).await?;

        let task = sqlx::query_as::<_, MaintenanceTask>(
            r#"
            INSERT INTO maintenance_tasks (room_id, title, description, priority, status, reported_by)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING *
            "#,
        )
        .bind(room.id)
        .bind(payload.title.trim())
        .bind(&payload.description)
        .bind(payload.priority.unwrap_or_default())
        .bind(TaskStatus::Pending)
        .bind(actor_id)
        .fetch_one(&mut *tx)
        .await?;

        if matches!(room.status, RoomStatus::Available | RoomStatus::Cleaning) {
            RoomService::set_status(&mut tx, room.id, RoomStatus::Maintenance).await?;
        }

        tx.commit().await?;

        tracing::info!(task_id = %task.id, room_id = %room.id, "Maintenance task created");

        Ok(task)
    }

    pub async fn update_cleaning_status(
        pool: &PgPool,
        task_id: Uuid,
        to: TaskStatus,
        actor_id: Uuid,
    ) -> AppResult<CleaningTask> {
        let mut tx = pool.begin().await?;

        let task = sqlx::query_as::<_, CleaningTask>(
            "SELECT * FROM cleaning_tasks WHERE id = $1 FOR UPDATE",
        )
        .bind(task_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| AppError::NotFound("Задача уборки не найдена".to_string()))?;

        let next = task.status.advance(to)?;

        let updated = sqlx::query_as::<_, CleaningTask>(
            r#"
            UPDATE cleaning_tasks SET
                status = $2,
                assigned_to = CASE WHEN $2 = 'in_progress'::task_status THEN $3 ELSE assigned_to END,
                completed_at = CASE WHEN $2 = 'completed'::task_status THEN NOW() ELSE completed_at END,
                updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(task_id)
        .bind(next)
        .bind(actor_id)
        .fetch_one(&mut *tx)
        .await?;

        if next == TaskStatus::Completed {
            Self::release_room(&mut tx, updated.room_id).await?;
        }

        tx.commit().await?;

        if next == TaskStatus::Completed {
            AuditService::record(
                pool,
                AuditAction::TaskCompleted,
                "cleaning_task",
                updated.id,
                Some(actor_id),
                json!({ "room_id": updated.room_id }),
            );
        }

        Ok(updated)
    }

    pub async fn update_maintenance_status(
        pool: &PgPool,
        task_id: Uuid,
        to: TaskStatus,
        actor_id: Uuid,
    ) -> AppResult<MaintenanceTask> {
        let mut tx = pool.begin().await?;

        let task = sqlx::query_as::<_, MaintenanceTask>(
            "SELECT * FROM maintenance_tasks WHERE id = $1 FOR UPDATE",
        )
        .bind(task_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| AppError::NotFound("Заявка на ремонт не найдена".to_string()))?;

        let next = task.status.advance(to)?;

        let updated = sqlx::query_as::<_, MaintenanceTask>(
            r#"
            UPDATE maintenance_tasks SET
                status = $2,
                completed_at = CASE WHEN $2 = 'completed'::task_status THEN NOW() ELSE completed_at END,
                updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(task_id)
        .bind(next)
        .fetch_one(&mut *tx)
        .await?;

        if next == TaskStatus::Completed {
            Self::release_room(&mut tx, updated.room_id).await?;
        }

        tx.commit().await?;

        if next == TaskStatus::Completed {
            AuditService::record(
                pool,
                AuditAction::TaskCompleted,
                "maintenance_task",
                updated.id,
                Some(actor_id),
                json!({ "room_id": updated.room_id }),
            );
        }

        Ok(updated)
    }

    pub async fn list_cleaning_tasks(
        pool: &PgPool,
        status: Option<TaskStatus>,
    ) -> AppResult<Vec<CleaningTask>> {
        let tasks = sqlx::query_as::<_, CleaningTask>(
            r#"
            SELECT * FROM cleaning_tasks
            WHERE ($1::task_status IS NULL OR status = $1)
            ORDER BY
                CASE priority
                    WHEN 'urgent' THEN 1
                    WHEN 'high' THEN 2
                    WHEN 'normal' THEN 3
                    ELSE 4
                END,
                created_at
            "#,
        )
        .bind(status)
        .fetch_all(pool)
        .await?;

        Ok(tasks)
    }

    pub async fn list_maintenance_tasks(
        pool: &PgPool,
        status: Option<TaskStatus>,
    ) -> AppResult<Vec<MaintenanceTask>> {
        let tasks = sqlx::query_as::<_, MaintenanceTask>(
            r#"
            SELECT * FROM maintenance_tasks
            WHERE ($1::task_status IS NULL OR status = $1)
            ORDER BY
                CASE priority
                    WHEN 'urgent' THEN 1
                    WHEN 'high' THEN 2
                    WHEN 'normal' THEN 3
                    ELSE 4
                END,
                created_at
            "#,
        )
        .bind(status)
        .fetch_all(pool)
        .await?;

        Ok(tasks)
    }

    pub async fn cleaning_tasks_for_room(
        pool: &PgPool,
        room_id: Uuid,
    ) -> AppResult<Vec<CleaningTask>> {
        let tasks = sqlx::query_as::<_, CleaningTask>(
            "SELECT * FROM cleaning_tasks WHERE room_id = $1 ORDER BY created_at",
        )
        .bind(room_id)
        .fetch_all(pool)
        .await?;

        Ok(tasks)
    }

    /// Завершённая задача возвращает номер в `available`, только если он
    /// сейчас на уборке или ремонте.
    async fn release_room(conn: &mut PgConnection, room_id: Uuid) -> AppResult<()> {
        let room = RoomService::lock_room(conn, room_id).await?;

        if room.status.released_by_task() {
            RoomService::set_status(conn, room_id, RoomStatus::Available).await?;
            tracing::info!(%room_id, "Room is available again");
        }

        Ok(())
    }
}
