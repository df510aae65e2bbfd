use axum::{
    extract::{Path, Query, State},
    routing::{get, post},
    Json, Router,
};
use serde_json::{json, Value};
use uuid::Uuid;

use crate::error::AppResult;
use crate::middleware::{AppState, AuthUser};
use crate::models::{
    AuditLog, Booking, CreateBookingRequest, DailyMovements, DailyMovementsQuery, UpdateBookingRequest,
};
use crate::services::{AuditService, BookingService};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", post(create_booking))
        .route("/today", get(daily_movements))
        .route("/code/:code", get(get_booking_by_code))
        .route(
            "/:id",
            get(get_booking).put(update_booking).delete(delete_booking),
        )
        .route("/:id/confirm", post(confirm_booking))
        .route("/:id/cancel", post(cancel_booking))
        .route("/:id/check-in", post(check_in))
        .route("/:id/check-out", post(check_out))
        .route("/:id/history", get(booking_history))
}

fn service(state: &AppState) -> BookingService {
    BookingService::new(state.config.booking_code_prefix.clone())
}

/// Создание бронирования
#[utoipa::path(
    post,
    path = "/api/v1/bookings",
    tag = "bookings",
    security(("bearer_auth" = [])),
    request_body = CreateBookingRequest,
    responses(
        (status = 200, description = "Бронирование создано", body = Booking),
        (status = 404, description = "Номер не найден"),
        (status = 409, description = "Номер занят на выбранные даты"),
        (status = 422, description = "Ошибка валидации")
    )
)]
pub async fn create_booking(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Json(payload): Json<CreateBookingRequest>,
) -> AppResult<Json<Booking>> {
    let booking = service(&state)
        .create_booking(&state.pool, payload, Some(auth_user.user_id))
        .await?;
    Ok(Json(booking))
}

/// Получение бронирования
#[utoipa::path(
    get,
    path = "/api/v1/bookings/{id}",
    tag = "bookings",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "ID бронирования")),
    responses(
        (status = 200, description = "Бронирование", body = Booking),
        (status = 404, description = "Бронирование не найдено")
    )
)]
pub async fn get_booking(
    State(state): State<AppState>,
    _auth_user: AuthUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<Booking>> {
    let booking = BookingService::get_booking(&state.pool, id).await?;
    Ok(Json(booking))
}

/// Поиск бронирования по коду (для гостя)
#[utoipa::path(
    get,
    path = "/api/v1/bookings/code/{code}",
    tag = "bookings",
    params(("code" = String, Path, description = "Код бронирования")),
    responses(
        (status = 200, description = "Бронирование", body = Booking),
        (status = 404, description = "Бронирование не найдено")
    )
)]
pub async fn get_booking_by_code(
    State(state): State<AppState>,
    Path(code): Path<String>,
) -> AppResult<Json<Booking>> {
    let booking = BookingService::get_by_code(&state.pool, &code).await?;
    Ok(Json(booking))
}

/// Изменение бронирования
#[utoipa::path(
    put,
    path = "/api/v1/bookings/{id}",
    tag = "bookings",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "ID бронирования")),
    request_body = UpdateBookingRequest,
    responses(
        (status = 200, description = "Бронирование обновлено", body = Booking),
        (status = 409, description = "Номер занят или бронирование нельзя изменить"),
        (status = 422, description = "Ошибка валидации")
    )
)]
pub async fn update_booking(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateBookingRequest>,
) -> AppResult<Json<Booking>> {
    let booking = service(&state)
        .update_booking(&state.pool, id, payload, Some(auth_user.user_id))
        .await?;
    Ok(Json(booking))
}

/// Ручное подтверждение бронирования
#[utoipa::path(
    post,
    path = "/api/v1/bookings/{id}/confirm",
    tag = "bookings",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "ID бронирования")),
    responses(
        (status = 200, description = "Бронирование подтверждено", body = Booking),
        (status = 404, description = "Бронирование не найдено"),
        (status = 409, description = "Недопустимый переход статуса")
    )
)]
pub async fn confirm_booking(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<Booking>> {
    let booking = service(&state)
        .confirm_booking(&state.pool, id, Some(auth_user.user_id))
        .await?;
    Ok(Json(booking))
}

/// Отмена бронирования
#[utoipa::path(
    post,
    path = "/api/v1/bookings/{id}/cancel",
    tag = "bookings",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "ID бронирования")),
    responses(
        (status = 200, description = "Бронирование отменено", body = Booking),
        (status = 409, description = "Недопустимый переход статуса")
    )
)]
pub async fn cancel_booking(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<Booking>> {
    let booking = service(&state)
        .cancel_booking(&state.pool, id, Some(auth_user.user_id))
        .await?;
    Ok(Json(booking))
}

/// Удаление бронирования (только администратор)
#[utoipa::path(
    delete,
    path = "/api/v1/bookings/{id}",
    tag = "bookings",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "ID бронирования")),
    responses(
        (status = 200, description = "Бронирование удалено"),
        (status = 403, description = "Недостаточно прав"),
        (status = 404, description = "Бронирование не найдено")
    )
)]
pub async fn delete_booking(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<Value>> {
    auth_user.require_admin()?;

    service(&state)
        .delete_booking(&state.pool, id, Some(auth_user.user_id))
        .await?;

    Ok(Json(json!({ "success": true })))
}

/// Заселение гостя
#[utoipa::path(
    post,
    path = "/api/v1/bookings/{id}/check-in",
    tag = "bookings",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "ID бронирования")),
    responses(
        (status = 200, description = "Гость заселён", body = Booking),
        (status = 409, description = "Недопустимый переход статуса")
    )
)]
pub async fn check_in(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<Booking>> {
    let booking = service(&state)
        .check_in(&state.pool, id, Some(auth_user.user_id))
        .await?;
    Ok(Json(booking))
}

/// Выезд гостя. Требует полной оплаты.
#[utoipa::path(
    post,
    path = "/api/v1/bookings/{id}/check-out",
    tag = "bookings",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "ID бронирования")),
    responses(
        (status = 200, description = "Гость выехал, создана задача уборки", body = Booking),
        (status = 409, description = "Неоплаченный остаток или недопустимый переход")
    )
)]
pub async fn check_out(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<Booking>> {
    let booking = service(&state)
        .check_out(&state.pool, id, Some(auth_user.user_id))
        .await?;
    Ok(Json(booking))
}

/// Заезды и выезды за день
#[utoipa::path(
    get,
    path = "/api/v1/bookings/today",
    tag = "bookings",
    security(("bearer_auth" = [])),
    params(DailyMovementsQuery),
    responses(
        (status = 200, description = "Движение гостей за день", body = DailyMovements)
    )
)]
pub async fn daily_movements(
    State(state): State<AppState>,
    _auth_user: AuthUser,
    Query(query): Query<DailyMovementsQuery>,
) -> AppResult<Json<DailyMovements>> {
    let movements = BookingService::daily_movements(&state.pool, query.date).await?;
    Ok(Json(movements))
}

/// Журнал действий по бронированию (менеджер и выше)
#[utoipa::path(
    get,
    path = "/api/v1/bookings/{id}/history",
    tag = "bookings",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "ID бронирования")),
    responses(
        (status = 200, description = "Записи журнала аудита", body = Vec<AuditLog>),
        (status = 403, description = "Недостаточно прав")
    )
)]
pub async fn booking_history(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<Vec<AuditLog>>> {
    auth_user.require_manager()?;

    let logs = AuditService::history(&state.pool, id).await?;
    Ok(Json(logs))
}
