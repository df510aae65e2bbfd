use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::error::{AppError, AppResult};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, sqlx::Type, PartialEq, Eq, ToSchema)]
#[sqlx(type_name = "slip_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum SlipStatus {
    Pending,
    Verified,
    Rejected,
}

impl Default for SlipStatus {
    fn default() -> Self {
        Self::Pending
    }
}

/// Решение администратора по квитанции.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum SlipDecision {
    Verified,
    Rejected,
}

impl SlipStatus {
    /// Повторное решение разрешено, кроме отклонения уже подтверждённой
    /// квитанции: её сумма уже учтена в оплате бронирования.
    pub fn decide(self, decision: SlipDecision) -> AppResult<SlipStatus> {
        match (self, decision) {
            (SlipStatus::Verified, SlipDecision::Rejected) => Err(AppError::Conflict(
                "Квитанция уже подтверждена и не может быть отклонена".to_string(),
            )),
            (_, SlipDecision::Verified) => Ok(SlipStatus::Verified),
            (_, SlipDecision::Rejected) => Ok(SlipStatus::Rejected),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct PaymentSlip {
    pub id: Uuid,
    pub booking_id: Uuid,
    pub image_url: String,
    pub amount: Decimal,
    pub status: SlipStatus,
    pub verified_by: Option<Uuid>,
    pub verified_at: Option<DateTime<Utc>>,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum DeskPaymentMethod {
    Cash,
    Card,
    Transfer,
}

impl DeskPaymentMethod {
    /// Ссылка, которая сохраняется вместо изображения квитанции.
    pub fn reference(&self) -> &'static str {
        match self {
            DeskPaymentMethod::Cash => "desk:cash",
            DeskPaymentMethod::Card => "desk:card",
            DeskPaymentMethod::Transfer => "desk:transfer",
        }
    }
}

// DTOs
#[derive(Debug, Deserialize, ToSchema)]
pub struct VerifySlipRequest {
    pub decision: SlipDecision,
    pub notes: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct RecordPaymentRequest {
    pub amount: Decimal,
    pub method: DeskPaymentMethod,
    pub notes: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct SlipUploadResponse {
    pub success: bool,
    pub slip: PaymentSlip,
}
