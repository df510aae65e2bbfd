use axum::{
    extract::{Path, Query, State},
    routing::get,
    Json, Router,
};
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::middleware::{AppState, AuthUser};
use crate::models::{AvailableRoomsQuery, CreateRoomRequest, Room, RoomsQuery, StayDates};
use crate::services::RoomService;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_rooms).post(create_room))
        .route("/available", get(available_rooms))
        .route("/:id", get(get_room))
}

/// Свободные номера на период
#[utoipa::path(
    get,
    path = "/api/v1/rooms/available",
    tag = "rooms",
    params(AvailableRoomsQuery),
    responses(
        (status = 200, description = "Номера без пересекающихся бронирований", body = Vec<Room>),
        (status = 422, description = "Дата выезда не позже даты заезда")
    )
)]
pub async fn available_rooms(
    State(state): State<AppState>,
    Query(query): Query<AvailableRoomsQuery>,
) -> AppResult<Json<Vec<Room>>> {
    let stay = StayDates::new(query.check_in, query.check_out)?;
    let guests = query.guests.unwrap_or(1);
    if guests < 1 {
        return Err(AppError::Validation(
            "Количество гостей должно быть больше нуля".to_string(),
        ));
    }

    let rooms = RoomService::find_available_rooms(&state.pool, &stay, guests).await?;
    Ok(Json(rooms))
}

/// Список номеров
#[utoipa::path(
    get,
    path = "/api/v1/rooms",
    tag = "rooms",
    security(("bearer_auth" = [])),
    params(RoomsQuery),
    responses(
        (status = 200, description = "Номера", body = Vec<Room>),
        (status = 401, description = "Не авторизован")
    )
)]
pub async fn list_rooms(
    State(state): State<AppState>,
    _auth_user: AuthUser,
    Query(query): Query<RoomsQuery>,
) -> AppResult<Json<Vec<Room>>> {
    let rooms = RoomService::list_rooms(&state.pool, query.status).await?;
    Ok(Json(rooms))
}

/// Получение номера
#[utoipa::path(
    get,
    path = "/api/v1/rooms/{id}",
    tag = "rooms",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "ID номера")),
    responses(
        (status = 200, description = "Номер", body = Room),
        (status = 404, description = "Номер не найден")
    )
)]
pub async fn get_room(
    State(state): State<AppState>,
    _auth_user: AuthUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<Room>> {
    let room = RoomService::get_room(&state.pool, id).await?;
    Ok(Json(room))
}

/// Добавление номера (только администратор)
#[utoipa::path(
    post,
    path = "/api/v1/rooms",
    tag = "rooms",
    security(("bearer_auth" = [])),
    request_body = CreateRoomRequest,
    responses(
        (status = 200, description = "Номер создан", body = Room),
        (status = 403, description = "Недостаточно прав"),
        (status = 409, description = "Номер уже существует")
    )
)]
pub async fn create_room(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Json(payload): Json<CreateRoomRequest>,
) -> AppResult<Json<Room>> {
    auth_user.require_admin()?;

    let room = RoomService::create_room(&state.pool, payload).await?;
    Ok(Json(room))
}
