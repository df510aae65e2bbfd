use rust_decimal::Decimal;
use serde_json::json;
use sqlx::{PgConnection, PgPool};
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::models::{
    AuditAction, Booking, BookingAction, BookingStatus, DeskPaymentMethod, PaymentSlip,
    PaymentStatus, SlipDecision, SlipStatus,
};
use crate::services::{AuditService, BookingService};

pub struct PaymentService;

impl PaymentService {
    /// Проверка перед загрузкой файла квитанции в хранилище.
    pub async fn ensure_slip_accepted(
        pool: &PgPool,
        booking_code: &str,
        amount: Decimal,
    ) -> AppResult<Booking> {
        ensure_positive(amount)?;
        let booking = BookingService::get_by_code(pool, booking_code).await?;
        ensure_accepts_payments(&booking)?;
        Ok(booking)
    }

    /// Квитанция от гостя по коду бронирования. Изображение к этому моменту
    /// уже загружено в хранилище.
    pub async fn create_slip(
        pool: &PgPool,
        booking_code: &str,
        amount: Decimal,
        image_url: &str,
    ) -> AppResult<PaymentSlip> {
        let booking = Self::ensure_slip_accepted(pool, booking_code, amount).await?;

        let slip = sqlx::query_as::<_, PaymentSlip>(
            r#"
            INSERT INTO payment_slips (booking_id, image_url, amount, status)
            VALUES ($1, $2, $3, $4)
            RETURNING *
            "#,
        )
        .bind(booking.id)
        .bind(image_url)
        .bind(amount)
        .bind(SlipStatus::Pending)
        .fetch_one(pool)
        .await?;

        tracing::info!(slip_id = %slip.id, booking_code = %booking.booking_code, %amount, "Payment slip uploaded");

        AuditService::record(
            pool,
            AuditAction::SlipUploaded,
            "payment_slip",
            slip.id,
            None,
            json!({ "booking_id": booking.id, "amount": amount }),
        );

        Ok(slip)
    }

    /// Решение администратора по квитанции. При подтверждении оплата
    /// бронирования пересчитывается по сумме всех подтверждённых квитанций.
    pub async fn verify_slip(
        pool: &PgPool,
        slip_id: Uuid,
        decision: SlipDecision,
        notes: Option<String>,
        admin_id: Uuid,
    ) -> AppResult<PaymentSlip> {
        let mut tx = pool.begin().await?;

        let (booking_id,): (Uuid,) =
            sqlx::query_as("SELECT booking_id FROM payment_slips WHERE id = $1")
                .bind(slip_id)
                .fetch_optional(&mut *tx)
                .await?
                .ok_or_else(|| AppError::NotFound("Квитанция не найдена".to_string()))?;

        // Сначала бронирование, затем квитанция: параллельные подтверждения
        // одного бронирования выполняются по очереди
        let booking = BookingService::lock_booking(&mut tx, booking_id).await?;

        let slip = sqlx::query_as::<_, PaymentSlip>(
            "SELECT * FROM payment_slips WHERE id = $1 FOR UPDATE",
        )
        .bind(slip_id)
        .fetch_one(&mut *tx)
        .await?;

        let next = slip.status.decide(decision)?;

        let updated = sqlx::query_as::<_, PaymentSlip>(
            r#"
            UPDATE payment_slips SET
                status = $2,
                verified_by = $3,
                verified_at = NOW(),
                notes = COALESCE($4, notes)
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(slip.id)
        .bind(next)
        .bind(admin_id)
        .bind(&notes)
        .fetch_one(&mut *tx)
        .await?;

        let reconciled = if next == SlipStatus::Verified {
            Some(Self::reconcile(&mut tx, &booking).await?)
        } else {
            None
        };

        tx.commit().await?;

        let action = match next {
            SlipStatus::Verified => AuditAction::SlipVerified,
            _ => AuditAction::SlipRejected,
        };

        if let Some(booking) = &reconciled {
            tracing::info!(
                slip_id = %updated.id,
                booking_code = %booking.booking_code,
                paid_amount = %booking.paid_amount,
                payment_status = ?booking.payment_status,
                "Payment slip verified"
            );
        } else {
            tracing::info!(slip_id = %updated.id, "Payment slip rejected");
        }

        AuditService::record(
            pool,
            action,
            "payment_slip",
            updated.id,
            Some(admin_id),
            json!({
                "booking_id": booking_id,
                "amount": updated.amount,
                "paid_amount": reconciled.as_ref().map(|b| b.paid_amount),
            }),
        );

        Ok(updated)
    }

    /// Оплата на стойке регистрации: сразу подтверждённая квитанция.
    pub async fn record_desk_payment(
        pool: &PgPool,
        booking_id: Uuid,
        amount: Decimal,
        method: DeskPaymentMethod,
        notes: Option<String>,
        admin_id: Uuid,
    ) -> AppResult<Booking> {
        ensure_positive(amount)?;

        let mut tx = pool.begin().await?;

        let booking = BookingService::lock_booking(&mut tx, booking_id).await?;
        ensure_accepts_payments(&booking)?;

        let slip = sqlx::query_as::<_, PaymentSlip>(
            r#"
            INSERT INTO payment_slips (booking_id, image_url, amount, status, verified_by, verified_at, notes)
            VALUES ($1, $2, $3, $4, $5, NOW(), $6)
            RETURNING *
            "#,
        )
        .bind(booking.id)
        .bind(method.reference())
        .bind(amount)
        .bind(SlipStatus::Verified)
        .bind(admin_id)
        .bind(&notes)
        .fetch_one(&mut *tx)
        .await?;

        let reconciled = Self::reconcile(&mut tx, &booking).await?;

        tx.commit().await?;

        tracing::info!(
            booking_code = %reconciled.booking_code,
            %amount,
            paid_amount = %reconciled.paid_amount,
            "Desk payment recorded"
        );

        AuditService::record(
            pool,
            AuditAction::PaymentRecorded,
            "payment_slip",
            slip.id,
            Some(admin_id),
            json!({ "booking_id": booking.id, "amount": amount, "method": method }),
        );

        Ok(reconciled)
    }

    pub async fn list_slips(pool: &PgPool, booking_id: Uuid) -> AppResult<Vec<PaymentSlip>> {
        BookingService::get_booking(pool, booking_id).await?;

        let slips = sqlx::query_as::<_, PaymentSlip>(
            "SELECT * FROM payment_slips WHERE booking_id = $1 ORDER BY created_at",
        )
        .bind(booking_id)
        .fetch_all(pool)
        .await?;

        Ok(slips)
    }

    /// Пересчёт оплаты по подтверждённым квитанциям. Вызывается под
    /// блокировкой строки бронирования. Первый подтверждённый платёж
    /// переводит `pending` в `confirmed`.
    async fn reconcile(conn: &mut PgConnection, booking: &Booking) -> AppResult<Booking> {
        let (paid_amount,): (Decimal,) = sqlx::query_as(
            r#"
            SELECT COALESCE(SUM(amount), 0)
            FROM payment_slips
            WHERE booking_id = $1 AND status = 'verified'
            "#,
        )
        .bind(booking.id)
        .fetch_one(&mut *conn)
        .await?;

        let payment_status = PaymentStatus::derive(paid_amount, booking.total_amount);
        let status = match booking.status {
            BookingStatus::Pending => booking.status.apply(BookingAction::Confirm)?,
            other => other,
        };

        let updated = sqlx::query_as::<_, Booking>(
            r#"
            UPDATE bookings SET
                paid_amount = $2,
                payment_status = $3,
                status = $4,
                updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(booking.id)
        .bind(paid_amount)
        .bind(payment_status)
        .bind(status)
        .fetch_one(&mut *conn)
        .await?;

        Ok(updated)
    }
}

fn ensure_positive(amount: Decimal) -> AppResult<()> {
    if amount <= Decimal::ZERO {
        return Err(AppError::Validation(
            "Сумма платежа должна быть больше нуля".to_string(),
        ));
    }
    Ok(())
}

fn ensure_accepts_payments(booking: &Booking) -> AppResult<()> {
    if booking.status.is_terminal() {
        return Err(AppError::Conflict(format!(
            "Бронирование {} в статусе {} не принимает платежи",
            booking.booking_code,
            booking.status.label()
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_amount_must_be_positive() {
        assert!(ensure_positive(Decimal::new(1000, 0)).is_ok());
        assert!(matches!(ensure_positive(Decimal::ZERO), Err(AppError::Validation(_))));
        assert!(matches!(
            ensure_positive(Decimal::new(-5, 0)),
            Err(AppError::Validation(_))
        ));
    }
}
