use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum AuditAction {
    BookingCreated,
    BookingUpdated,
    BookingConfirmed,
    BookingCancelled,
    BookingDeleted,
    CheckedIn,
    CheckedOut,
    SlipUploaded,
    SlipVerified,
    SlipRejected,
    PaymentRecorded,
    TaskCompleted,
    OrderCompleted,
}

impl AuditAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            AuditAction::BookingCreated => "booking_created",
            AuditAction::BookingUpdated => "booking_updated",
            AuditAction::BookingConfirmed => "booking_confirmed",
            AuditAction::BookingCancelled => "booking_cancelled",
            AuditAction::BookingDeleted => "booking_deleted",
            AuditAction::CheckedIn => "checked_in",
            AuditAction::CheckedOut => "checked_out",
            AuditAction::SlipUploaded => "slip_uploaded",
            AuditAction::SlipVerified => "slip_verified",
            AuditAction::SlipRejected => "slip_rejected",
            AuditAction::PaymentRecorded => "payment_recorded",
            AuditAction::TaskCompleted => "task_completed",
            AuditAction::OrderCompleted => "order_completed",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct AuditLog {
    pub id: Uuid,
    pub action: String,
    pub entity: String,
    pub entity_id: Uuid,
    pub actor_id: Option<Uuid>,
    pub details: serde_json::Value,
    pub created_at: DateTime<Utc>,
}
