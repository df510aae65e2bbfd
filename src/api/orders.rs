use axum::{
    extract::{Path, State},
    routing::{get, post},
    Json, Router,
};
use uuid::Uuid;

use crate::error::AppResult;
use crate::middleware::{AppState, AuthUser};
use crate::models::{CreateOrderRequest, OrderResponse};
use crate::services::OrderService;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", post(create_order))
        .route("/:id", get(get_order))
        .route("/:id/complete", post(complete_order))
}

/// Создание заказа
#[utoipa::path(
    post,
    path = "/api/v1/orders",
    tag = "orders",
    security(("bearer_auth" = [])),
    request_body = CreateOrderRequest,
    responses(
        (status = 200, description = "Заказ создан", body = OrderResponse),
        (status = 404, description = "Товар или бронирование не найдены"),
        (status = 422, description = "Ошибка валидации")
    )
)]
pub async fn create_order(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Json(payload): Json<CreateOrderRequest>,
) -> AppResult<Json<OrderResponse>> {
    let order = OrderService::create_order(&state.pool, payload, auth_user.user_id).await?;
    Ok(Json(order))
}

/// Получение заказа
#[utoipa::path(
    get,
    path = "/api/v1/orders/{id}",
    tag = "orders",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "ID заказа")),
    responses(
        (status = 200, description = "Заказ", body = OrderResponse),
        (status = 404, description = "Заказ не найден")
    )
)]
pub async fn get_order(
    State(state): State<AppState>,
    _auth_user: AuthUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<OrderResponse>> {
    let order = OrderService::get_order(&state.pool, id).await?;
    Ok(Json(order))
}

/// Завершение заказа со списанием товара
#[utoipa::path(
    post,
    path = "/api/v1/orders/{id}/complete",
    tag = "orders",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "ID заказа")),
    responses(
        (status = 200, description = "Заказ завершён", body = OrderResponse),
        (status = 409, description = "Недостаточно товара или заказ уже обработан")
    )
)]
pub async fn complete_order(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<OrderResponse>> {
    let order = OrderService::complete_order(&state.pool, id, auth_user.user_id).await?;
    Ok(Json(order))
}
