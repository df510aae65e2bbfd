use axum::{
    extract::{Path, Query, State},
    routing::{get, put},
    Json, Router,
};
use uuid::Uuid;

use crate::error::AppResult;
use crate::middleware::{AppState, AuthUser};
use crate::models::{
    CleaningTask, CreateCleaningTaskRequest, CreateMaintenanceTaskRequest, MaintenanceTask,
    TasksQuery, UpdateTaskStatusRequest,
};
use crate::services::HousekeepingService;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/cleaning", get(list_cleaning).post(create_cleaning))
        .route("/cleaning/:id/status", put(update_cleaning_status))
        .route("/maintenance", get(list_maintenance).post(create_maintenance))
        .route("/maintenance/:id/status", put(update_maintenance_status))
        .route("/rooms/:id/cleaning", get(room_cleaning_history))
}

/// Список задач уборки
#[utoipa::path(
    get,
    path = "/api/v1/housekeeping/cleaning",
    tag = "housekeeping",
    security(("bearer_auth" = [])),
    params(TasksQuery),
    responses(
        (status = 200, description = "Задачи уборки", body = Vec<CleaningTask>)
    )
)]
pub async fn list_cleaning(
    State(state): State<AppState>,
    _auth_user: AuthUser,
    Query(query): Query<TasksQuery>,
) -> AppResult<Json<Vec<CleaningTask>>> {
    let tasks = HousekeepingService::list_cleaning_tasks(&state.pool, query.status).await?;
    Ok(Json(tasks))
}

/// Создание задачи уборки
#[utoipa::path(
    post,
    path = "/api/v1/housekeeping/cleaning",
    tag = "housekeeping",
    security(("bearer_auth" = [])),
    request_body = CreateCleaningTaskRequest,
    responses(
        (status = 200, description = "Задача создана", body = CleaningTask),
        (status = 404, description = "Номер не найден")
    )
)]
pub async fn create_cleaning(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Json(payload): Json<CreateCleaningTaskRequest>,
) -> AppResult<Json<CleaningTask>> {
    let task =
        HousekeepingService::create_cleaning_task(&state.pool, payload, auth_user.user_id).await?;
    Ok(Json(task))
}

/// Смена статуса задачи уборки
#[utoipa::path(
    put,
    path = "/api/v1/housekeeping/cleaning/{id}/status",
    tag = "housekeeping",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "ID задачи")),
    request_body = UpdateTaskStatusRequest,
    responses(
        (status = 200, description = "Статус обновлён", body = CleaningTask),
        (status = 409, description = "Недопустимый переход статуса")
    )
)]
pub async fn update_cleaning_status(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateTaskStatusRequest>,
) -> AppResult<Json<CleaningTask>> {
    let task = HousekeepingService::update_cleaning_status(
        &state.pool,
        id,
        payload.status,
        auth_user.user_id,
    )
    .await?;
    Ok(Json(task))
}

/// Список заявок на ремонт
#[utoipa::path(
    get,
    path = "/api/v1/housekeeping/maintenance",
    tag = "housekeeping",
    security(("bearer_auth" = [])),
    params(TasksQuery),
    responses(
        (status = 200, description = "Заявки на ремонт", body = Vec<MaintenanceTask>)
    )
)]
pub async fn list_maintenance(
    State(state): State<AppState>,
    _auth_user: AuthUser,
    Query(query): Query<TasksQuery>,
) -> AppResult<Json<Vec<MaintenanceTask>>> {
    let tasks = HousekeepingService::list_maintenance_tasks(&state.pool, query.status).await?;
    Ok(Json(tasks))
}

/// Создание заявки на ремонт
#[utoipa::path(
    post,
    path = "/api/v1/housekeeping/maintenance",
    tag = "housekeeping",
    security(("bearer_auth" = [])),
    request_body = CreateMaintenanceTaskRequest,
    responses(
        (status = 200, description = "Заявка создана", body = MaintenanceTask),
        (status = 404, description = "Номер не найден"),
        (status = 422, description = "Ошибка валидации")
    )
)]
pub async fn create_maintenance(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Json(payload): Json<CreateMaintenanceTaskRequest>,
) -> AppResult<Json<MaintenanceTask>> {
    let task =
        HousekeepingService::create_maintenance_task(&state.pool, payload, auth_user.user_id)
            .await?;
    Ok(Json(task))
}

/// Смена статуса заявки на ремонт
#[utoipa::path(
    put,
    path = "/api/v1/housekeeping/maintenance/{id}/status",
    tag = "housekeeping",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "ID заявки")),
    request_body = UpdateTaskStatusRequest,
    responses(
        (status = 200, description = "Статус обновлён", body = MaintenanceTask),
        (status = 409, description = "Недопустимый переход статуса")
    )
)]
pub async fn update_maintenance_status(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateTaskStatusRequest>,
) -> AppResult<Json<MaintenanceTask>> {
    let task = HousekeepingService::update_maintenance_status(
        &state.pool,
        id,
        payload.status,
        auth_user.user_id,
    )
    .await?;
    Ok(Json(task))
}

/// История уборок номера
#[utoipa::path(
    get,
    path = "/api/v1/housekeeping/rooms/{id}/cleaning",
    tag = "housekeeping",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "ID номера")),
    responses(
        (status = 200, description = "Задачи уборки по номеру", body = Vec<CleaningTask>)
    )
)]
pub async fn room_cleaning_history(
    State(state): State<AppState>,
    _auth_user: AuthUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<Vec<CleaningTask>>> {
    let tasks = HousekeepingService::cleaning_tasks_for_room(&state.pool, id).await?;
    Ok(Json(tasks))
}
