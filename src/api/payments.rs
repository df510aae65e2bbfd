use axum::{
    extract::{Multipart, Path, State},
    routing::{get, post, put},
    Json, Router,
};
use rust_decimal::Decimal;
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::middleware::{AppState, AuthUser};
use crate::models::{
    Booking, PaymentSlip, RecordPaymentRequest, SlipUploadResponse, VerifySlipRequest,
};
use crate::services::{
    file_service::{validate_slip_content_type, MAX_SLIP_SIZE},
    FileService, PaymentService,
};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/slips", post(upload_slip))
        .route("/slips/:id/verify", put(verify_slip))
        .route("/bookings/:id", post(record_payment))
        .route("/bookings/:id/slips", get(list_slips))
}

struct SlipFile {
    file_name: String,
    content_type: String,
    data: Vec<u8>,
}

/// Загрузка квитанции об оплате гостем
#[utoipa::path(
    post,
    path = "/api/v1/payments/slips",
    tag = "payments",
    request_body(content = String, content_type = "multipart/form-data"),
    responses(
        (status = 200, description = "Квитанция загружена", body = SlipUploadResponse),
        (status = 400, description = "Неверный формат файла"),
        (status = 404, description = "Бронирование не найдено"),
        (status = 409, description = "Бронирование не принимает платежи")
    )
)]
pub async fn upload_slip(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> AppResult<Json<SlipUploadResponse>> {
    let mut booking_code = None;
    let mut amount = None;
    let mut file = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(e.to_string()))?
    {
        let name = field.name().unwrap_or("").to_string();

        match name.as_str() {
            "booking_code" => {
                booking_code = Some(
                    field
                        .text()
                        .await
                        .map_err(|e| AppError::BadRequest(e.to_string()))?,
                );
            }
            "amount" => {
                let raw = field
                    .text()
                    .await
                    .map_err(|e| AppError::BadRequest(e.to_string()))?;
                let parsed = raw.trim().parse::<Decimal>().map_err(|_| {
                    AppError::Validation("Неверный формат суммы".to_string())
                })?;
                amount = Some(parsed);
            }
            "slip" => {
                let content_type = field
                    .content_type()
                    .ok_or_else(|| AppError::BadRequest("Content-Type отсутствует".to_string()))?
                    .to_string();

                if !validate_slip_content_type(&content_type) {
                    return Err(AppError::BadRequest(
                        "Недопустимый формат квитанции".to_string(),
                    ));
                }

                let file_name = field.file_name().unwrap_or("slip.jpg").to_string();
                let data = field
                    .bytes()
                    .await
                    .map_err(|e| AppError::BadRequest(e.to_string()))?;

                if data.len() > MAX_SLIP_SIZE {
                    return Err(AppError::BadRequest("Файл слишком большой".to_string()));
                }

                file = Some(SlipFile {
                    file_name,
                    content_type,
                    data: data.to_vec(),
                });
            }
            _ => {}
        }
    }

    let booking_code = booking_code
        .ok_or_else(|| AppError::BadRequest("Не указан код бронирования".to_string()))?;
    let amount = amount.ok_or_else(|| AppError::BadRequest("Не указана сумма".to_string()))?;
    let file = file.ok_or_else(|| AppError::BadRequest("Файл не найден".to_string()))?;

    // Бронирование проверяется до загрузки файла
    PaymentService::ensure_slip_accepted(&state.pool, &booking_code, amount).await?;

    let image_url = FileService::new(&state.config)
        .upload_file("slips", &file.file_name, &file.content_type, file.data)
        .await?;

    let slip = PaymentService::create_slip(&state.pool, &booking_code, amount, &image_url).await?;

    Ok(Json(SlipUploadResponse {
        success: true,
        slip,
    }))
}

/// Подтверждение или отклонение квитанции (только администратор)
#[utoipa::path(
    put,
    path = "/api/v1/payments/slips/{id}/verify",
    tag = "payments",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "ID квитанции")),
    request_body = VerifySlipRequest,
    responses(
        (status = 200, description = "Решение по квитанции сохранено", body = PaymentSlip),
        (status = 403, description = "Недостаточно прав"),
        (status = 404, description = "Квитанция не найдена"),
        (status = 409, description = "Подтверждённую квитанцию нельзя отклонить")
    )
)]
pub async fn verify_slip(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<VerifySlipRequest>,
) -> AppResult<Json<PaymentSlip>> {
    auth_user.require_admin()?;

    let slip = PaymentService::verify_slip(
        &state.pool,
        id,
        payload.decision,
        payload.notes,
        auth_user.user_id,
    )
    .await?;

    Ok(Json(slip))
}

/// Оплата на стойке регистрации (только администратор)
#[utoipa::path(
    post,
    path = "/api/v1/payments/bookings/{id}",
    tag = "payments",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "ID бронирования")),
    request_body = RecordPaymentRequest,
    responses(
        (status = 200, description = "Платёж учтён", body = Booking),
        (status = 403, description = "Недостаточно прав"),
        (status = 409, description = "Бронирование не принимает платежи")
    )
)]
pub async fn record_payment(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<RecordPaymentRequest>,
) -> AppResult<Json<Booking>> {
    auth_user.require_admin()?;

    let booking = PaymentService::record_desk_payment(
        &state.pool,
        id,
        payload.amount,
        payload.method,
        payload.notes,
        auth_user.user_id,
    )
    .await?;

    Ok(Json(booking))
}

/// Квитанции по бронированию
#[utoipa::path(
    get,
    path = "/api/v1/payments/bookings/{id}/slips",
    tag = "payments",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "ID бронирования")),
    responses(
        (status = 200, description = "Квитанции", body = Vec<PaymentSlip>),
        (status = 404, description = "Бронирование не найдено")
    )
)]
pub async fn list_slips(
    State(state): State<AppState>,
    _auth_user: AuthUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<Vec<PaymentSlip>>> {
    let slips = PaymentService::list_slips(&state.pool, id).await?;
    Ok(Json(slips))
}
