use sqlx::{PgConnection, PgPool};
use uuid::Uuid;
use validator::Validate;

use crate::error::{db_error_code, AppError, AppResult, PG_UNIQUE_VIOLATION};
use crate::models::{CreateRoomRequest, Room, RoomStatus, RoomType, StayDates};

pub struct RoomService;

impl RoomService {
    pub async fn create_room(pool: &PgPool, payload: CreateRoomRequest) -> AppResult<Room> {
        payload.validate()?;

        if payload.price_per_night <= rust_decimal::Decimal::ZERO {
            return Err(AppError::Validation(
                "Цена за ночь должна быть больше нуля".to_string(),
            ));
        }

        let room = sqlx::query_as::<_, Room>(
            r#"
            INSERT INTO rooms (number, name, room_type, capacity, price_per_night, status, description)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING *
            "#,
        )
        .bind(payload.number.trim())
        .bind(payload.name.trim())
        .bind(payload.room_type.unwrap_or(RoomType::Standard))
        .bind(payload.capacity)
        .bind(payload.price_per_night)
        .bind(RoomStatus::Available)
        .bind(&payload.description)
        .fetch_one(pool)
        .await
        .map_err(|e| {
            if db_error_code(&e).as_deref() == Some(PG_UNIQUE_VIOLATION) {
                AppError::Conflict("Номер с таким номером уже существует".to_string())
            } else {
                AppError::from(e)
            }
        })?;

        tracing::info!(room_id = %room.id, number = %room.number, "Room created");

        Ok(room)
    }

    pub async fn get_room(pool: &PgPool, room_id: Uuid) -> AppResult<Room> {
        sqlx::query_as::<_, Room>("SELECT * FROM rooms WHERE id = $1")
            .bind(room_id)
            .fetch_optional(pool)
            .await?
            .ok_or_else(|| AppError::NotFound("Номер не найден".to_string()))
    }

    pub async fn list_rooms(pool: &PgPool, status: Option<RoomStatus>) -> AppResult<Vec<Room>> {
        let rooms = sqlx::query_as::<_, Room>(
            r#"
            SELECT * FROM rooms
            WHERE ($1::room_status IS NULL OR status = $1)
            ORDER BY number
            "#,
        )
        .bind(status)
        .fetch_all(pool)
        .await?;

        Ok(rooms)
    }

    /// Номера, свободные на весь период: вместимость не меньше `guests`,
    /// не на ремонте и без пересекающихся неотменённых бронирований.
    pub async fn find_available_rooms(
        pool: &PgPool,
        stay: &StayDates,
        guests: i32,
    ) -> AppResult<Vec<Room>> {
        let rooms = sqlx::query_as::<_, Room>(
            r#"
            SELECT r.* FROM rooms r
            WHERE r.capacity >= $1
              AND r.status <> 'maintenance'
              AND NOT EXISTS (
                  SELECT 1 FROM bookings b
                  WHERE b.room_id = r.id
                    AND b.status <> 'cancelled'
                    AND b.check_in_date < $3
                    AND b.check_out_date > $2
              )
            ORDER BY r.price_per_night, r.number
            "#,
        )
        .bind(guests)
        .bind(stay.check_in())
        .bind(stay.check_out())
        .fetch_all(pool)
        .await?;

        Ok(rooms)
    }

    /// Блокирует строку номера до конца транзакции.
    pub async fn lock_room(conn: &mut PgConnection, room_id: Uuid) -> AppResult<Room> {
        sqlx::query_as::<_, Room>("SELECT * FROM rooms WHERE id = $1 FOR UPDATE")
            .bind(room_id)
            .fetch_optional(&mut *conn)
            .await?
            .ok_or_else(|| AppError::NotFound("Номер не найден".to_string()))
    }

    pub async fn set_status(
        conn: &mut PgConnection,
        room_id: Uuid,
        status: RoomStatus,
    ) -> AppResult<()> {
        let result = sqlx::query("UPDATE rooms SET status = $2, updated_at = NOW() WHERE id = $1")
            .bind(room_id)
            .bind(status)
            .execute(&mut *conn)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Номер не найден".to_string()));
        }

        Ok(())
    }
}
