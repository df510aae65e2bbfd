use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, sqlx::Type, PartialEq, Eq, ToSchema)]
#[sqlx(type_name = "room_type", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum RoomType {
    Standard,
    Deluxe,
    Family,
}

impl Default for RoomType {
    fn default() -> Self {
        Self::Standard
    }
}

/// Текущее состояние номера. Меняется только переходами бронирования,
/// уборки и ремонта.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, sqlx::Type, PartialEq, Eq, ToSchema)]
#[sqlx(type_name = "room_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum RoomStatus {
    Available,
    Occupied,
    Cleaning,
    Maintenance,
    Reserved,
}

impl Default for RoomStatus {
    fn default() -> Self {
        Self::Available
    }
}

impl RoomStatus {
    /// Номер можно бронировать во всех состояниях, кроме ремонта.
    pub fn is_bookable(&self) -> bool {
        !matches!(self, RoomStatus::Maintenance)
    }

    /// Только уборка и ремонт возвращают номер в `available`
    /// при завершении задачи.
    pub fn released_by_task(&self) -> bool {
        matches!(self, RoomStatus::Cleaning | RoomStatus::Maintenance)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Room {
    pub id: Uuid,
    pub number: String,
    pub name: String,
    pub room_type: RoomType,
    pub capacity: i32,
    pub price_per_night: Decimal,
    pub status: RoomStatus,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// DTOs
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateRoomRequest {
    #[validate(length(min = 1, max = 20))]
    pub number: String,
    #[validate(length(min = 1, max = 200))]
    pub name: String,
    pub room_type: Option<RoomType>,
    #[validate(range(min = 1, max = 20))]
    pub capacity: i32,
    pub price_per_night: Decimal,
    pub description: Option<String>,
}

#[derive(Debug, Deserialize, IntoParams)]
pub struct AvailableRoomsQuery {
    pub check_in: NaiveDate,
    pub check_out: NaiveDate,
    pub guests: Option<i32>,
}

#[derive(Debug, Deserialize, IntoParams)]
pub struct RoomsQuery {
    pub status: Option<RoomStatus>,
}
