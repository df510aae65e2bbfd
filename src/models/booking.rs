use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

use crate::error::{AppError, AppResult};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, sqlx::Type, PartialEq, Eq, ToSchema)]
#[sqlx(type_name = "booking_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum BookingStatus {
    Pending,
    Confirmed,
    CheckedIn,
    CheckedOut,
    Cancelled,
}

impl Default for BookingStatus {
    fn default() -> Self {
        Self::Pending
    }
}

/// Действие над бронированием. Все изменения статуса проходят через
/// [`BookingStatus::apply`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BookingAction {
    Confirm,
    CheckIn,
    CheckOut,
    Cancel,
}

impl BookingStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, BookingStatus::CheckedOut | BookingStatus::Cancelled)
    }

    /// Даты, номер и данные гостя можно менять только до заезда.
    pub fn is_editable(&self) -> bool {
        matches!(self, BookingStatus::Pending | BookingStatus::Confirmed)
    }

    pub fn apply(self, action: BookingAction) -> AppResult<BookingStatus> {
        use BookingAction::*;
        use BookingStatus::*;

        match (self, action) {
            (Pending | Confirmed, Confirm) => Ok(Confirmed),
            // Заезд из pending допускается, хотя ожидается confirmed
            (Pending | Confirmed, CheckIn) => Ok(CheckedIn),
            (CheckedIn, CheckOut) => Ok(CheckedOut),
            (Pending | Confirmed, Cancel) => Ok(Cancelled),
            (from, action) => Err(AppError::Conflict(format!(
                "Недопустимый переход: {} из статуса {}",
                action.label(),
                from.label()
            ))),
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            BookingStatus::Pending => "pending",
            BookingStatus::Confirmed => "confirmed",
            BookingStatus::CheckedIn => "checked_in",
            BookingStatus::CheckedOut => "checked_out",
            BookingStatus::Cancelled => "cancelled",
        }
    }
}

impl BookingAction {
    pub fn label(&self) -> &'static str {
        match self {
            BookingAction::Confirm => "подтверждение",
            BookingAction::CheckIn => "заезд",
            BookingAction::CheckOut => "выезд",
            BookingAction::Cancel => "отмена",
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, sqlx::Type, PartialEq, Eq, ToSchema)]
#[sqlx(type_name = "payment_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    Pending,
    Partial,
    Paid,
}

impl Default for PaymentStatus {
    fn default() -> Self {
        Self::Pending
    }
}

impl PaymentStatus {
    pub fn derive(paid_amount: Decimal, total_amount: Decimal) -> Self {
        if paid_amount > Decimal::ZERO && paid_amount >= total_amount {
            PaymentStatus::Paid
        } else if paid_amount > Decimal::ZERO {
            PaymentStatus::Partial
        } else {
            PaymentStatus::Pending
        }
    }
}

/// Период проживания `[check_in, check_out)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct StayDates {
    check_in: NaiveDate,
    check_out: NaiveDate,
}

impl StayDates {
    pub fn new(check_in: NaiveDate, check_out: NaiveDate) -> AppResult<Self> {
        if check_out <= check_in {
            return Err(AppError::Validation(
                "Дата выезда должна быть позже даты заезда".to_string(),
            ));
        }
        Ok(Self {
            check_in,
            check_out,
        })
    }

    /// Даты из базы: ограничение `check_out_date > check_in_date` уже
    /// проверено на уровне таблицы.
    pub(crate) fn from_stored(check_in: NaiveDate, check_out: NaiveDate) -> Self {
        Self {
            check_in,
            check_out,
        }
    }

    pub fn check_in(&self) -> NaiveDate {
        self.check_in
    }

    pub fn check_out(&self) -> NaiveDate {
        self.check_out
    }

    pub fn nights(&self) -> i32 {
        (self.check_out - self.check_in).num_days() as i32
    }

    /// Полуоткрытые интервалы: выезд в день чужого заезда не пересекается.
    pub fn overlaps(&self, other: &StayDates) -> bool {
        self.check_in < other.check_out && other.check_in < self.check_out
    }

    pub fn total_for(&self, price_per_night: Decimal) -> Decimal {
        price_per_night * Decimal::from(self.nights())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Booking {
    pub id: Uuid,
    pub booking_code: String,
    pub room_id: Uuid,
    pub guest_name: String,
    pub guest_phone: Option<String>,
    pub guest_email: Option<String>,
    pub check_in_date: NaiveDate,
    pub check_out_date: NaiveDate,
    pub nights: i32,
    pub adults: i32,
    pub children: i32,
    pub status: BookingStatus,
    pub payment_status: PaymentStatus,
    pub total_amount: Decimal,
    pub paid_amount: Decimal,
    pub notes: Option<String>,
    pub created_by: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Booking {
    pub fn stay(&self) -> StayDates {
        StayDates::from_stored(self.check_in_date, self.check_out_date)
    }

    pub fn outstanding_balance(&self) -> Decimal {
        (self.total_amount - self.paid_amount).max(Decimal::ZERO)
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, sqlx::Type, PartialEq, Eq, ToSchema)]
#[sqlx(type_name = "check_in_out_kind", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum CheckInOutKind {
    CheckIn,
    CheckOut,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct CheckInOut {
    pub id: Uuid,
    pub booking_id: Uuid,
    pub room_id: Uuid,
    pub kind: CheckInOutKind,
    pub performed_by: Option<Uuid>,
    pub created_at: DateTime<Utc>,
}

// DTOs
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct CreateBookingRequest {
    pub room_id: Uuid,
    #[validate(length(min = 1, max = 200))]
    pub guest_name: String,
    pub guest_phone: Option<String>,
    #[validate(email)]
    pub guest_email: Option<String>,
    pub check_in_date: NaiveDate,
    pub check_out_date: NaiveDate,
    #[validate(range(min = 1, max = 20))]
    pub adults: i32,
    #[validate(range(min = 0, max = 20))]
    pub children: Option<i32>,
    /// `pending` (по умолчанию) или `confirmed`
    pub status: Option<BookingStatus>,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
pub struct UpdateBookingRequest {
    pub room_id: Option<Uuid>,
    #[validate(length(min = 1, max = 200))]
    pub guest_name: Option<String>,
    pub guest_phone: Option<String>,
    #[validate(email)]
    pub guest_email: Option<String>,
    pub check_in_date: Option<NaiveDate>,
    pub check_out_date: Option<NaiveDate>,
    #[validate(range(min = 1, max = 20))]
    pub adults: Option<i32>,
    #[validate(range(min = 0, max = 20))]
    pub children: Option<i32>,
    pub notes: Option<String>,
}

#[derive(Debug, Deserialize, IntoParams)]
pub struct DailyMovementsQuery {
    /// День в формате YYYY-MM-DD, по умолчанию сегодня
    pub date: Option<NaiveDate>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct DailyMovements {
    pub date: NaiveDate,
    pub check_ins: Vec<Booking>,
    pub check_outs: Vec<Booking>,
}
