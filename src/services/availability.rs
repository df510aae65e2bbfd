use chrono::NaiveDate;
use sqlx::PgConnection;
use uuid::Uuid;

use crate::error::AppResult;
use crate::models::StayDates;

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct ReservedRange {
    pub booking_id: Uuid,
    pub check_in_date: NaiveDate,
    pub check_out_date: NaiveDate,
}

impl ReservedRange {
    fn overlaps(&self, stay: &StayDates) -> bool {
        StayDates::from_stored(self.check_in_date, self.check_out_date).overlaps(stay)
    }
}

/// Первое бронирование, пересекающееся с запрошенным периодом.
pub fn first_conflict<'a>(
    reserved: &'a [ReservedRange],
    stay: &StayDates,
    exclude_booking_id: Option<Uuid>,
) -> Option<&'a ReservedRange> {
    reserved
        .iter()
        .filter(|r| Some(r.booking_id) != exclude_booking_id)
        .find(|r| r.overlaps(stay))
}

/// Проверка доступности номера. Только чтение; внутри транзакции
/// вызывается после блокировки строки номера.
pub async fn is_room_available(
    conn: &mut PgConnection,
    room_id: Uuid,
    stay: &StayDates,
    exclude_booking_id: Option<Uuid>,
) -> AppResult<bool> {
    // Бронирования, закончившиеся до заезда, не могут пересечься
    let reserved = sqlx::query_as::<_, ReservedRange>(
        r#"
        SELECT id AS booking_id, check_in_date, check_out_date
        FROM bookings
        WHERE room_id = $1
          AND status <> 'cancelled'
          AND check_out_date > $2
        "#,
    )
    .bind(room_id)
    .bind(stay.check_in())
    .fetch_all(&mut *conn)
    .await?;

    match first_conflict(&reserved, stay, exclude_booking_id) {
        Some(conflict) => {
            tracing::debug!(
                room_id = %room_id,
                conflicting_booking = %conflict.booking_id,
                "Room is not available for requested dates"
            );
            Ok(false)
        }
        None => Ok(true),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn reserved(id: Uuid, from: &str, to: &str) -> ReservedRange {
        ReservedRange {
            booking_id: id,
            check_in_date: date(from),
            check_out_date: date(to),
        }
    }

    #[test]
    fn test_conflict_detection() {
        let existing = Uuid::new_v4();
        let bookings = vec![reserved(existing, "2024-01-10", "2024-01-12")];

        let overlapping = StayDates::new(date("2024-01-11"), date("2024-01-13")).unwrap();
        assert_eq!(
            first_conflict(&bookings, &overlapping, None).map(|r| r.booking_id),
            Some(existing)
        );

        let abutting = StayDates::new(date("2024-01-12"), date("2024-01-14")).unwrap();
        assert!(first_conflict(&bookings, &abutting, None).is_none());

        let before = StayDates::new(date("2024-01-08"), date("2024-01-10")).unwrap();
        assert!(first_conflict(&bookings, &before, None).is_none());
    }

    #[test]
    fn test_all_overlap_shapes() {
        let bookings = vec![reserved(Uuid::new_v4(), "2024-05-10", "2024-05-15")];

        // начинается внутри
        let starts_inside = StayDates::new(date("2024-05-12"), date("2024-05-20")).unwrap();
        // заканчивается внутри
        let ends_inside = StayDates::new(date("2024-05-05"), date("2024-05-11")).unwrap();
        // охватывает целиком
        let contains = StayDates::new(date("2024-05-01"), date("2024-05-31")).unwrap();
        // лежит внутри
        let within = StayDates::new(date("2024-05-11"), date("2024-05-12")).unwrap();

        for stay in [starts_inside, ends_inside, contains, within] {
            assert!(first_conflict(&bookings, &stay, None).is_some(), "{:?}", stay);
        }
    }

    #[test]
    fn test_excluded_booking_is_ignored() {
        let own = Uuid::new_v4();
        let other = Uuid::new_v4();
        let bookings = vec![
            reserved(own, "2024-02-01", "2024-02-05"),
            reserved(other, "2024-02-10", "2024-02-12"),
        ];

        // продление собственного бронирования не конфликтует с самим собой
        let extended = StayDates::new(date("2024-02-01"), date("2024-02-07")).unwrap();
        assert!(first_conflict(&bookings, &extended, Some(own)).is_none());

        let too_long = StayDates::new(date("2024-02-01"), date("2024-02-11")).unwrap();
        assert_eq!(
            first_conflict(&bookings, &too_long, Some(own)).map(|r| r.booking_id),
            Some(other)
        );
    }
}
