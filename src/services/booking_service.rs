use chrono::{Local, NaiveDate, Utc};
use serde_json::json;
use sqlx::{Connection, PgConnection, PgPool};
use uuid::Uuid;
use validator::Validate;

use crate::error::{
    db_error_code, AppError, AppResult, PG_EXCLUSION_VIOLATION, PG_UNIQUE_VIOLATION,
};
use crate::models::{
    AuditAction, Booking, BookingAction, BookingStatus, CheckInOut, CheckInOutKind,
    CreateBookingRequest, DailyMovements, PaymentStatus, Room, RoomStatus, StayDates,
    UpdateBookingRequest,
};
use crate::services::availability::is_room_available;
use crate::services::{AuditService, HousekeepingService, RoomService};
use crate::utils::validators::{sanitize_string, validate_booking_code, validate_phone};

const CODE_ATTEMPTS: usize = 5;

/// Код бронирования: префикс, 8 последних цифр времени в миллисекундах
/// и 2 случайные цифры.
pub fn generate_booking_code(prefix: &str) -> String {
    use rand::Rng;
    let millis = Utc::now().timestamp_millis() % 100_000_000;
    let suffix = rand::thread_rng().gen_range(0..100);
    format!("{}{:08}{:02}", prefix, millis, suffix)
}

pub struct BookingService {
    code_prefix: String,
}

impl BookingService {
    pub fn new(code_prefix: impl Into<String>) -> Self {
        Self {
            code_prefix: code_prefix.into(),
        }
    }

    pub async fn create_booking(
        &self,
        pool: &PgPool,
        payload: CreateBookingRequest,
        actor_id: Option<Uuid>,
    ) -> AppResult<Booking> {
        payload.validate()?;
        validate_guest_phone(payload.guest_phone.as_deref())?;
        let stay = StayDates::new(payload.check_in_date, payload.check_out_date)?;
        let children = payload.children.unwrap_or(0);

        let status = match payload.status.unwrap_or_default() {
            s @ (BookingStatus::Pending | BookingStatus::Confirmed) => s,
            other => {
                return Err(AppError::Validation(format!(
                    "Новое бронирование не может иметь статус {}",
                    other.label()
                )))
            }
        };

        let mut tx = pool.begin().await?;

        // Блокировка номера сериализует параллельные бронирования одного номера
        let room = RoomService::lock_room(&mut tx, payload.room_id).await?;
        ensure_room_fits(&room, payload.adults + children)?;

        if !room.status.is_bookable()
            || !is_room_available(&mut tx, room.id, &stay, None).await?
        {
            return Err(AppError::room_unavailable());
        }

        let total_amount = stay.total_for(room.price_per_night);

        let mut attempt = 0;
        let booking = loop {
            attempt += 1;
            let code = generate_booking_code(&self.code_prefix);

            // Точка сохранения: ошибка вставки не должна обрывать всю транзакцию
            let mut savepoint = Connection::begin(&mut *tx).await?;
            let inserted = sqlx::query_as::<_, Booking>(
                r#"
                INSERT INTO bookings (
                    booking_code, room_id, guest_name, guest_phone, guest_email,
                    check_in_date, check_out_date, nights, adults, children,
                    status, payment_status, total_amount, paid_amount, notes, created_by
                )
                VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, 0, $14, $15)
                RETURNING *
                "#,
            )
            .bind(&code)
            .bind(room.id)
            .bind(payload.guest_name.trim())
            .bind(&payload.guest_phone)
            .bind(&payload.guest_email)
            .bind(stay.check_in())
            .bind(stay.check_out())
            .bind(stay.nights())
            .bind(payload.adults)
            .bind(children)
            .bind(status)
            .bind(PaymentStatus::Pending)
            .bind(total_amount)
            .bind(&payload.notes)
            .bind(actor_id)
            .fetch_one(&mut *savepoint)
            .await;

            match inserted {
                Ok(booking) => {
                    savepoint.commit().await?;
                    break booking;
                }
                Err(e) => {
                    savepoint.rollback().await?;
                    match db_error_code(&e).as_deref() {
                        Some(PG_UNIQUE_VIOLATION) if attempt < CODE_ATTEMPTS => {
                            tracing::debug!(%code, "Booking code collision, retrying");
                        }
                        Some(PG_EXCLUSION_VIOLATION) => return Err(AppError::room_unavailable()),
                        _ => return Err(e.into()),
                    }
                }
            }
        };

        RoomService::set_status(&mut tx, room.id, RoomStatus::Occupied).await?;

        tx.commit().await?;

        tracing::info!(
            booking_code = %booking.booking_code,
            room_id = %room.id,
            nights = booking.nights,
            "Booking created"
        );

        AuditService::record(
            pool,
            AuditAction::BookingCreated,
            "booking",
            booking.id,
            actor_id,
            json!({
                "booking_code": booking.booking_code,
                "room_id": room.id,
                "check_in_date": booking.check_in_date,
                "check_out_date": booking.check_out_date,
                "total_amount": booking.total_amount,
            }),
        );

        Ok(booking)
    }

    pub async fn update_booking(
        &self,
        pool: &PgPool,
        booking_id: Uuid,
        payload: UpdateBookingRequest,
        actor_id: Option<Uuid>,
    ) -> AppResult<Booking> {
        payload.validate()?;
        validate_guest_phone(payload.guest_phone.as_deref())?;
        if let (Some(check_in), Some(check_out)) = (payload.check_in_date, payload.check_out_date) {
            StayDates::new(check_in, check_out)?;
        }

        let mut tx = pool.begin().await?;

        let booking = Self::lock_booking(&mut tx, booking_id).await?;

        if !booking.status.is_editable() {
            return Err(AppError::Conflict(format!(
                "Бронирование в статусе {} нельзя изменить",
                booking.status.label()
            )));
        }

        let stay = StayDates::new(
            payload.check_in_date.unwrap_or(booking.check_in_date),
            payload.check_out_date.unwrap_or(booking.check_out_date),
        )?;
        let target_room_id = payload.room_id.unwrap_or(booking.room_id);
        let room_changed = target_room_id != booking.room_id;
        let dates_changed = stay != booking.stay();
        let adults = payload.adults.unwrap_or(booking.adults);
        let children = payload.children.unwrap_or(booking.children);

        // Номера блокируются в порядке id, чтобы встречные переносы не
        // приводили к взаимной блокировке
        let room = if room_changed {
            let (first, second) = if booking.room_id < target_room_id {
                (booking.room_id, target_room_id)
            } else {
                (target_room_id, booking.room_id)
            };
            let a = RoomService::lock_room(&mut tx, first).await?;
            let b = RoomService::lock_room(&mut tx, second).await?;
            let target = if a.id == target_room_id { a } else { b };
            if !target.status.is_bookable() {
                return Err(AppError::Conflict("Номер на ремонте".to_string()));
            }
            target
        } else {
            RoomService::lock_room(&mut tx, booking.room_id).await?
        };

        ensure_room_fits(&room, adults + children)?;

        let (nights, total_amount) = if room_changed || dates_changed {
            if !is_room_available(&mut tx, room.id, &stay, Some(booking.id)).await? {
                return Err(AppError::room_unavailable());
            }
            (stay.nights(), stay.total_for(room.price_per_night))
        } else {
            (booking.nights, booking.total_amount)
        };

        let payment_status = PaymentStatus::derive(booking.paid_amount, total_amount);

        let updated = sqlx::query_as::<_, Booking>(
            r#"
            UPDATE bookings SET
                room_id = $2,
                guest_name = COALESCE($3, guest_name),
                guest_phone = COALESCE($4, guest_phone),
                guest_email = COALESCE($5, guest_email),
                check_in_date = $6,
                check_out_date = $7,
                nights = $8,
                adults = $9,
                children = $10,
                total_amount = $11,
                payment_status = $12,
                notes = COALESCE($13, notes),
                updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(booking.id)
        .bind(room.id)
        .bind(payload.guest_name.as_deref().map(str::trim))
        .bind(&payload.guest_phone)
        .bind(&payload.guest_email)
        .bind(stay.check_in())
        .bind(stay.check_out())
        .bind(nights)
        .bind(adults)
        .bind(children)
        .bind(total_amount)
        .bind(payment_status)
        .bind(&payload.notes)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| match db_error_code(&e).as_deref() {
            Some(PG_EXCLUSION_VIOLATION) => AppError::room_unavailable(),
            _ => AppError::from(e),
        })?;

        if room_changed {
            Self::release_room(&mut tx, booking.room_id, booking.id).await?;
            RoomService::set_status(&mut tx, room.id, RoomStatus::Occupied).await?;
        }

        tx.commit().await?;

        tracing::info!(booking_code = %updated.booking_code, room_changed, dates_changed, "Booking updated");

        AuditService::record(
            pool,
            AuditAction::BookingUpdated,
            "booking",
            updated.id,
            actor_id,
            json!({
                "room_id": updated.room_id,
                "check_in_date": updated.check_in_date,
                "check_out_date": updated.check_out_date,
                "total_amount": updated.total_amount,
            }),
        );

        Ok(updated)
    }

    pub async fn cancel_booking(
        &self,
        pool: &PgPool,
        booking_id: Uuid,
        actor_id: Option<Uuid>,
    ) -> AppResult<Booking> {
        let mut tx = pool.begin().await?;

        let booking = Self::lock_booking(&mut tx, booking_id).await?;
        let next = booking.status.apply(BookingAction::Cancel)?;
        RoomService::lock_room(&mut tx, booking.room_id).await?;

        let updated = Self::set_status(&mut tx, booking.id, next).await?;
        Self::release_room(&mut tx, booking.room_id, booking.id).await?;

        tx.commit().await?;

        tracing::info!(booking_code = %updated.booking_code, "Booking cancelled");

        AuditService::record(
            pool,
            AuditAction::BookingCancelled,
            "booking",
            updated.id,
            actor_id,
            json!({ "room_id": updated.room_id }),
        );

        Ok(updated)
    }

    /// Ручное подтверждение без квитанции.
    pub async fn confirm_booking(
        &self,
        pool: &PgPool,
        booking_id: Uuid,
        actor_id: Option<Uuid>,
    ) -> AppResult<Booking> {
        let mut tx = pool.begin().await?;

        let booking = Self::lock_booking(&mut tx, booking_id).await?;
        let next = booking.status.apply(BookingAction::Confirm)?;

        let updated = Self::set_status(&mut tx, booking.id, next).await?;

        tx.commit().await?;

        tracing::info!(booking_code = %updated.booking_code, previous = booking.status.label(), "Booking confirmed");

        AuditService::record(
            pool,
            AuditAction::BookingConfirmed,
            "booking",
            updated.id,
            actor_id,
            json!({ "previous_status": booking.status }),
        );

        Ok(updated)
    }

    pub async fn check_in(
        &self,
        pool: &PgPool,
        booking_id: Uuid,
        actor_id: Option<Uuid>,
    ) -> AppResult<Booking> {
        let mut tx = pool.begin().await?;

        let booking = Self::lock_booking(&mut tx, booking_id).await?;
        let next = booking.status.apply(BookingAction::CheckIn)?;
        RoomService::lock_room(&mut tx, booking.room_id).await?;

        let updated = Self::set_status(&mut tx, booking.id, next).await?;
        RoomService::set_status(&mut tx, booking.room_id, RoomStatus::Occupied).await?;
        Self::record_movement(&mut tx, &updated, CheckInOutKind::CheckIn, actor_id).await?;

        tx.commit().await?;

        tracing::info!(booking_code = %updated.booking_code, room_id = %updated.room_id, "Guest checked in");

        AuditService::record(
            pool,
            AuditAction::CheckedIn,
            "booking",
            updated.id,
            actor_id,
            json!({ "room_id": updated.room_id }),
        );

        Ok(updated)
    }

    /// Выезд возможен только при полной оплате. При отказе ничего не меняется.
    pub async fn check_out(
        &self,
        pool: &PgPool,
        booking_id: Uuid,
        actor_id: Option<Uuid>,
    ) -> AppResult<Booking> {
        let mut tx = pool.begin().await?;

        let booking = Self::lock_booking(&mut tx, booking_id).await?;
        let next = booking.status.apply(BookingAction::CheckOut)?;

        let outstanding = booking.outstanding_balance();
        if outstanding > rust_decimal::Decimal::ZERO {
            tracing::debug!(booking_code = %booking.booking_code, %outstanding, "Check-out blocked by unpaid balance");
            return Err(AppError::unpaid_balance(outstanding));
        }

        RoomService::lock_room(&mut tx, booking.room_id).await?;

        let updated = sqlx::query_as::<_, Booking>(
            r#"
            UPDATE bookings SET status = $2, payment_status = $3, updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(booking.id)
        .bind(next)
        .bind(PaymentStatus::Paid)
        .fetch_one(&mut *tx)
        .await?;

        RoomService::set_status(&mut tx, booking.room_id, RoomStatus::Cleaning).await?;
        let task = HousekeepingService::spawn_checkout_cleaning(
            &mut tx,
            booking.room_id,
            &booking.booking_code,
        )
        .await?;
        Self::record_movement(&mut tx, &updated, CheckInOutKind::CheckOut, actor_id).await?;

        tx.commit().await?;

        tracing::info!(
            booking_code = %updated.booking_code,
            room_id = %updated.room_id,
            cleaning_task = ?task.as_ref().map(|t| t.id),
            "Guest checked out"
        );

        AuditService::record(
            pool,
            AuditAction::CheckedOut,
            "booking",
            updated.id,
            actor_id,
            json!({
                "room_id": updated.room_id,
                "cleaning_task_id": task.map(|t| t.id),
            }),
        );

        Ok(updated)
    }

    /// Удаление ошибочной записи администратором, минуя проверку статуса.
    pub async fn delete_booking(
        &self,
        pool: &PgPool,
        booking_id: Uuid,
        actor_id: Option<Uuid>,
    ) -> AppResult<()> {
        let mut tx = pool.begin().await?;

        let booking = Self::lock_booking(&mut tx, booking_id).await?;
        RoomService::lock_room(&mut tx, booking.room_id).await?;

        sqlx::query("DELETE FROM bookings WHERE id = $1")
            .bind(booking.id)
            .execute(&mut *tx)
            .await?;

        Self::release_room(&mut tx, booking.room_id, booking.id).await?;

        tx.commit().await?;

        tracing::info!(booking_code = %booking.booking_code, "Booking deleted");

        AuditService::record(
            pool,
            AuditAction::BookingDeleted,
            "booking",
            booking.id,
            actor_id,
            json!({
                "booking_code": booking.booking_code,
                "room_id": booking.room_id,
                "status": booking.status,
            }),
        );

        Ok(())
    }

    pub async fn get_booking(pool: &PgPool, booking_id: Uuid) -> AppResult<Booking> {
        sqlx::query_as::<_, Booking>("SELECT * FROM bookings WHERE id = $1")
            .bind(booking_id)
            .fetch_optional(pool)
            .await?
            .ok_or_else(|| AppError::NotFound("Бронирование не найдено".to_string()))
    }

    pub async fn get_by_code(pool: &PgPool, booking_code: &str) -> AppResult<Booking> {
        let booking_code = sanitize_string(booking_code);
        if !validate_booking_code(&booking_code) {
            return Err(AppError::NotFound("Бронирование не найдено".to_string()));
        }

        sqlx::query_as::<_, Booking>("SELECT * FROM bookings WHERE booking_code = $1")
            .bind(&booking_code)
            .fetch_optional(pool)
            .await?
            .ok_or_else(|| AppError::NotFound("Бронирование не найдено".to_string()))
    }

    /// Заезды и выезды за день. Одно бронирование может попасть в оба списка.
    pub async fn daily_movements(pool: &PgPool, date: Option<NaiveDate>) -> AppResult<DailyMovements> {
        let date = date.unwrap_or_else(|| Local::now().date_naive());

        let check_ins = sqlx::query_as::<_, Booking>(
            r#"
            SELECT * FROM bookings
            WHERE check_in_date = $1 AND status IN ('confirmed', 'pending')
            ORDER BY created_at
            "#,
        )
        .bind(date)
        .fetch_all(pool)
        .await?;

        let check_outs = sqlx::query_as::<_, Booking>(
            r#"
            SELECT * FROM bookings
            WHERE check_out_date = $1 AND status = 'checked_in'
            ORDER BY created_at
            "#,
        )
        .bind(date)
        .fetch_all(pool)
        .await?;

        Ok(DailyMovements {
            date,
            check_ins,
            check_outs,
        })
    }

    /// Журнал заездов и выездов по бронированию.
    pub async fn check_in_outs(pool: &PgPool, booking_id: Uuid) -> AppResult<Vec<CheckInOut>> {
        let records = sqlx::query_as::<_, CheckInOut>(
            "SELECT * FROM check_in_outs WHERE booking_id = $1 ORDER BY created_at",
        )
        .bind(booking_id)
        .fetch_all(pool)
        .await?;

        Ok(records)
    }

    /// Блокирует строку бронирования до конца транзакции.
    pub async fn lock_booking(conn: &mut PgConnection, booking_id: Uuid) -> AppResult<Booking> {
        sqlx::query_as::<_, Booking>("SELECT * FROM bookings WHERE id = $1 FOR UPDATE")
            .bind(booking_id)
            .fetch_optional(&mut *conn)
            .await?
            .ok_or_else(|| AppError::NotFound("Бронирование не найдено".to_string()))
    }

    /// Номер освобождается, только если в нём никто не живёт по другому
    /// бронированию.
    async fn release_room(
        conn: &mut PgConnection,
        room_id: Uuid,
        booking_id: Uuid,
    ) -> AppResult<()> {
        let (occupied,): (bool,) = sqlx::query_as(
            r#"
            SELECT EXISTS (
                SELECT 1 FROM bookings
                WHERE room_id = $1 AND id <> $2 AND status = 'checked_in'
            )
            "#,
        )
        .bind(room_id)
        .bind(booking_id)
        .fetch_one(&mut *conn)
        .await?;

        if occupied {
            tracing::debug!(%room_id, "Room kept occupied by an in-house guest");
            return Ok(());
        }

        RoomService::set_status(conn, room_id, RoomStatus::Available).await
    }

    async fn set_status(
        conn: &mut PgConnection,
        booking_id: Uuid,
        status: BookingStatus,
    ) -> AppResult<Booking> {
        let booking = sqlx::query_as::<_, Booking>(
            "UPDATE bookings SET status = $2, updated_at = NOW() WHERE id = $1 RETURNING *",
        )
        .bind(booking_id)
        .bind(status)
        .fetch_one(&mut *conn)
        .await?;

        Ok(booking)
    }

    async fn record_movement(
        conn: &mut PgConnection,
        booking: &Booking,
        kind: CheckInOutKind,
        actor_id: Option<Uuid>,
    ) -> AppResult<()> {
        sqlx::query(
            r#"
            INSERT INTO check_in_outs (booking_id, room_id, kind, performed_by)
            VALUES ($1, $2, $3, $4)
            "#,
        )
        .bind(booking.id)
        .bind(booking.room_id)
        .bind(kind)
        .bind(actor_id)
        .execute(&mut *conn)
        .await?;

        Ok(())
    }
}

fn ensure_room_fits(room: &Room, guests: i32) -> AppResult<()> {
    if guests > room.capacity {
        return Err(AppError::Validation(format!(
            "Номер {} вмещает не более {} гостей",
            room.number, room.capacity
        )));
    }
    Ok(())
}

fn validate_guest_phone(phone: Option<&str>) -> AppResult<()> {
    match phone {
        Some(phone) if !validate_phone(phone) => Err(AppError::Validation(
            "Неверный формат номера телефона".to_string(),
        )),
        _ => Ok(()),
    }
}
