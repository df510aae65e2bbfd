//! Сквозные сценарии бронирования против настоящего Postgres.
//!
//! Запуск: `DATABASE_URL=postgres://... cargo test -- --ignored`

use chrono::NaiveDate;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use sqlx::{postgres::PgPoolOptions, PgPool};
use tokio_test::{assert_err, assert_ok};
use uuid::Uuid;

use homestay_backend::models::{
    Booking, BookingStatus, CheckInOutKind, CleaningType, CreateBookingRequest,
    CreateCleaningTaskRequest, CreateMaintenanceTaskRequest, CreateOrderRequest,
    CreateRoomRequest, DeskPaymentMethod, OrderItemRequest, OrderStatus, PaymentStatus, Room,
    RoomStatus, SlipDecision, SlipStatus, StockMovementKind, TaskStatus, UpdateBookingRequest,
};
use homestay_backend::services::{
    AuditService, BookingService, HousekeepingService, OrderService, PaymentService, RoomService,
};
use homestay_backend::AppError;

async fn setup() -> PgPool {
    dotenvy::dotenv().ok();
    let url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set");

    let pool = PgPoolOptions::new()
        .max_connections(8)
        .connect(&url)
        .await
        .expect("Failed to connect to database");

    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .expect("Failed to run migrations");

    pool
}

fn date(s: &str) -> NaiveDate {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
}

fn bookings() -> BookingService {
    BookingService::new("BK")
}

async fn room(pool: &PgPool, price: Decimal) -> Room {
    let number = format!("T{}", &Uuid::new_v4().simple().to_string()[..8]);
    RoomService::create_room(
        pool,
        CreateRoomRequest {
            number,
            name: "Test room".to_string(),
            room_type: None,
            capacity: 3,
            price_per_night: price,
            description: None,
        },
    )
    .await
    .unwrap()
}

fn request(room_id: Uuid, from: &str, to: &str, status: BookingStatus) -> CreateBookingRequest {
    CreateBookingRequest {
        room_id,
        guest_name: "Somchai Jaidee".to_string(),
        guest_phone: Some("+66812345678".to_string()),
        guest_email: Some("guest@example.com".to_string()),
        check_in_date: date(from),
        check_out_date: date(to),
        adults: 2,
        children: None,
        status: Some(status),
        notes: None,
    }
}

async fn book(pool: &PgPool, room_id: Uuid, from: &str, to: &str) -> Booking {
    bookings()
        .create_booking(pool, request(room_id, from, to, BookingStatus::Confirmed), None)
        .await
        .unwrap()
}

async fn verified_slip(pool: &PgPool, booking: &Booking, amount: Decimal) -> Uuid {
    let slip = PaymentService::create_slip(pool, &booking.booking_code, amount, "/slips/test.png")
        .await
        .unwrap();
    PaymentService::verify_slip(pool, slip.id, SlipDecision::Verified, None, Uuid::new_v4())
        .await
        .unwrap();
    slip.id
}

async fn product(pool: &PgPool, price: Decimal, stock: i32) -> Uuid {
    let (id,): (Uuid,) =
        sqlx::query_as("INSERT INTO products (name, price, stock) VALUES ($1, $2, $3) RETURNING id")
            .bind("Singha")
            .bind(price)
            .bind(stock)
            .fetch_one(pool)
            .await
            .unwrap();
    id
}

#[tokio::test]
#[ignore = "requires DATABASE_URL"]
async fn overlapping_booking_is_rejected_and_abutting_accepted() {
    let pool = setup().await;
    let room = room(&pool, dec!(1000)).await;

    book(&pool, room.id, "2030-01-10", "2030-01-12").await;

    let overlapping = bookings()
        .create_booking(
            &pool,
            request(room.id, "2030-01-11", "2030-01-13", BookingStatus::Confirmed),
            None,
        )
        .await;
    assert!(matches!(assert_err!(overlapping), AppError::Conflict(_)));

    let abutting = bookings()
        .create_booking(
            &pool,
            request(room.id, "2030-01-12", "2030-01-14", BookingStatus::Confirmed),
            None,
        )
        .await;
    assert_ok!(abutting);
}

#[tokio::test]
#[ignore = "requires DATABASE_URL"]
async fn nights_and_total_are_derived_from_dates() {
    let pool = setup().await;
    let room = room(&pool, dec!(1250)).await;

    let booking = book(&pool, room.id, "2030-03-01", "2030-03-04").await;

    assert_eq!(booking.nights, 3);
    assert_eq!(booking.total_amount, dec!(3750));
    assert_eq!(booking.paid_amount, Decimal::ZERO);
    assert_eq!(booking.payment_status, PaymentStatus::Pending);
    assert!(booking.booking_code.starts_with("BK"));

    let room = RoomService::get_room(&pool, room.id).await.unwrap();
    assert_eq!(room.status, RoomStatus::Occupied);
}

#[tokio::test]
#[ignore = "requires DATABASE_URL"]
async fn empty_or_inverted_range_is_rejected_before_any_write() {
    let pool = setup().await;
    let room = room(&pool, dec!(1000)).await;

    for (from, to) in [("2030-04-01", "2030-04-01"), ("2030-04-05", "2030-04-01")] {
        let result = bookings()
            .create_booking(&pool, request(room.id, from, to, BookingStatus::Pending), None)
            .await;
        assert!(matches!(assert_err!(result), AppError::Validation(_)));
    }

    let room = RoomService::get_room(&pool, room.id).await.unwrap();
    assert_eq!(room.status, RoomStatus::Available);
}

#[tokio::test]
#[ignore = "requires DATABASE_URL"]
async fn cancel_releases_room_and_dates() {
    let pool = setup().await;
    let room = room(&pool, dec!(1000)).await;

    let booking = book(&pool, room.id, "2030-05-10", "2030-05-12").await;
    let cancelled = bookings()
        .cancel_booking(&pool, booking.id, None)
        .await
        .unwrap();

    assert_eq!(cancelled.status, BookingStatus::Cancelled);
    let room_after = RoomService::get_room(&pool, room.id).await.unwrap();
    assert_eq!(room_after.status, RoomStatus::Available);

    // Отменённое бронирование не мешает новому на те же даты
    book(&pool, room.id, "2030-05-10", "2030-05-12").await;

    let again = bookings().cancel_booking(&pool, booking.id, None).await;
    assert!(matches!(assert_err!(again), AppError::Conflict(_)));
}

#[tokio::test]
#[ignore = "requires DATABASE_URL"]
async fn check_out_is_blocked_until_fully_paid() {
    let pool = setup().await;
    let room = room(&pool, dec!(1000)).await;
    let admin = Uuid::new_v4();

    let booking = book(&pool, room.id, "2030-06-01", "2030-06-04").await;
    assert_eq!(booking.total_amount, dec!(3000));

    PaymentService::record_desk_payment(
        &pool,
        booking.id,
        dec!(2000),
        DeskPaymentMethod::Cash,
        None,
        admin,
    )
    .await
    .unwrap();
    bookings().check_in(&pool, booking.id, None).await.unwrap();

    let blocked = bookings().check_out(&pool, booking.id, None).await;
    assert!(matches!(assert_err!(blocked), AppError::Conflict(_)));

    let unchanged = BookingService::get_booking(&pool, booking.id).await.unwrap();
    assert_eq!(unchanged.status, BookingStatus::CheckedIn);
    assert_eq!(unchanged.payment_status, PaymentStatus::Partial);
    assert_eq!(unchanged.paid_amount, dec!(2000));
    let room_mid = RoomService::get_room(&pool, room.id).await.unwrap();
    assert_eq!(room_mid.status, RoomStatus::Occupied);
    assert!(HousekeepingService::cleaning_tasks_for_room(&pool, room.id)
        .await
        .unwrap()
        .is_empty());

    verified_slip(&pool, &unchanged, dec!(1000)).await;

    let checked_out = bookings().check_out(&pool, booking.id, None).await.unwrap();
    assert_eq!(checked_out.status, BookingStatus::CheckedOut);
    assert_eq!(checked_out.payment_status, PaymentStatus::Paid);

    let room_after = RoomService::get_room(&pool, room.id).await.unwrap();
    assert_eq!(room_after.status, RoomStatus::Cleaning);

    let tasks = HousekeepingService::cleaning_tasks_for_room(&pool, room.id)
        .await
        .unwrap();
    assert_eq!(tasks.len(), 1);
    assert_eq!(tasks[0].task_type, CleaningType::Checkout);
    assert_eq!(tasks[0].booking_code.as_deref(), Some(booking.booking_code.as_str()));
}

#[tokio::test]
#[ignore = "requires DATABASE_URL"]
async fn paid_amount_is_recomputed_from_verified_slips() {
    let pool = setup().await;
    let room = room(&pool, dec!(1000)).await;
    let admin = Uuid::new_v4();

    let booking = book(&pool, room.id, "2030-07-01", "2030-07-04").await;

    let big = PaymentService::create_slip(&pool, &booking.booking_code, dec!(2000), "/a.png")
        .await
        .unwrap();
    let small = PaymentService::create_slip(&pool, &booking.booking_code, dec!(1000), "/b.png")
        .await
        .unwrap();

    // Обратный порядок подтверждения
    PaymentService::verify_slip(&pool, small.id, SlipDecision::Verified, None, admin)
        .await
        .unwrap();
    let partial = BookingService::get_booking(&pool, booking.id).await.unwrap();
    assert_eq!(partial.paid_amount, dec!(1000));
    assert_eq!(partial.payment_status, PaymentStatus::Partial);

    PaymentService::verify_slip(&pool, big.id, SlipDecision::Verified, None, admin)
        .await
        .unwrap();
    // Повторное подтверждение не удваивает сумму
    PaymentService::verify_slip(&pool, big.id, SlipDecision::Verified, None, admin)
        .await
        .unwrap();

    let paid = BookingService::get_booking(&pool, booking.id).await.unwrap();
    assert_eq!(paid.paid_amount, dec!(3000));
    assert_eq!(paid.payment_status, PaymentStatus::Paid);

    let flip = PaymentService::verify_slip(&pool, big.id, SlipDecision::Rejected, None, admin).await;
    assert!(matches!(assert_err!(flip), AppError::Conflict(_)));

    let slips = PaymentService::list_slips(&pool, booking.id).await.unwrap();
    assert_eq!(slips.len(), 2);
    assert!(slips.iter().all(|s| s.status == SlipStatus::Verified));
}

#[tokio::test]
#[ignore = "requires DATABASE_URL"]
async fn first_verified_slip_confirms_pending_booking() {
    let pool = setup().await;
    let room = room(&pool, dec!(1000)).await;
    let admin = Uuid::new_v4();

    let booking = bookings()
        .create_booking(
            &pool,
            request(room.id, "2030-08-01", "2030-08-03", BookingStatus::Pending),
            None,
        )
        .await
        .unwrap();
    assert_eq!(booking.status, BookingStatus::Pending);

    let rejected = PaymentService::create_slip(&pool, &booking.booking_code, dec!(500), "/r.png")
        .await
        .unwrap();
    PaymentService::verify_slip(&pool, rejected.id, SlipDecision::Rejected, None, admin)
        .await
        .unwrap();
    let still_pending = BookingService::get_booking(&pool, booking.id).await.unwrap();
    assert_eq!(still_pending.status, BookingStatus::Pending);
    assert_eq!(still_pending.paid_amount, Decimal::ZERO);

    verified_slip(&pool, &booking, dec!(500)).await;
    let confirmed = BookingService::get_booking(&pool, booking.id).await.unwrap();
    assert_eq!(confirmed.status, BookingStatus::Confirmed);

    bookings().check_in(&pool, booking.id, None).await.unwrap();
    verified_slip(&pool, &booking, dec!(1500)).await;
    let checked_in = BookingService::get_booking(&pool, booking.id).await.unwrap();
    assert_eq!(checked_in.status, BookingStatus::CheckedIn);
    assert_eq!(checked_in.payment_status, PaymentStatus::Paid);
}

#[tokio::test]
#[ignore = "requires DATABASE_URL"]
async fn full_lifecycle_round_trip_keeps_fields() {
    let pool = setup().await;
    let room = room(&pool, dec!(1500)).await;

    let created = bookings()
        .create_booking(
            &pool,
            request(room.id, "2030-09-01", "2030-09-03", BookingStatus::Pending),
            Some(Uuid::new_v4()),
        )
        .await
        .unwrap();

    verified_slip(&pool, &created, dec!(3000)).await;
    bookings().check_in(&pool, created.id, None).await.unwrap();
    let checked_out = bookings().check_out(&pool, created.id, None).await.unwrap();

    let fetched = BookingService::get_booking(&pool, created.id).await.unwrap();
    let by_code = BookingService::get_by_code(&pool, &format!(" {} ", created.booking_code))
        .await
        .unwrap();

    for booking in [&checked_out, &fetched, &by_code] {
        assert_eq!(booking.id, created.id);
        assert_eq!(booking.room_id, room.id);
        assert_eq!(booking.nights, 2);
        assert_eq!(booking.total_amount, dec!(3000));
        assert_eq!(booking.paid_amount, dec!(3000));
        assert_eq!(booking.status, BookingStatus::CheckedOut);
        assert_eq!(booking.check_in_date, created.check_in_date);
        assert_eq!(booking.check_out_date, created.check_out_date);
    }

    let log = BookingService::check_in_outs(&pool, created.id).await.unwrap();
    assert_eq!(
        log.iter().map(|r| r.kind).collect::<Vec<_>>(),
        vec![CheckInOutKind::CheckIn, CheckInOutKind::CheckOut]
    );
    assert!(log.iter().all(|r| r.room_id == room.id));

    let repeat = bookings().check_out(&pool, created.id, None).await;
    assert!(matches!(assert_err!(repeat), AppError::Conflict(_)));
}

#[tokio::test]
#[ignore = "requires DATABASE_URL"]
async fn concurrent_creates_for_same_range_admit_exactly_one() {
    let pool = setup().await;
    let room = room(&pool, dec!(1000)).await;

    let attempts: Vec<_> = (0..4)
        .map(|_| {
            let pool = pool.clone();
            let room_id = room.id;
            tokio::spawn(async move {
                bookings()
                    .create_booking(
                        &pool,
                        request(room_id, "2030-10-10", "2030-10-15", BookingStatus::Confirmed),
                        None,
                    )
                    .await
            })
        })
        .collect();

    let mut created = 0;
    let mut rejected = 0;
    for handle in attempts {
        match handle.await.unwrap() {
            Ok(_) => created += 1,
            Err(AppError::Conflict(_)) => rejected += 1,
            Err(e) => panic!("unexpected error: {e}"),
        }
    }

    assert_eq!(created, 1);
    assert_eq!(rejected, 3);
}

#[tokio::test]
#[ignore = "requires DATABASE_URL"]
async fn update_rechecks_availability_excluding_itself() {
    let pool = setup().await;
    let first_room = room(&pool, dec!(1000)).await;

    let first = book(&pool, first_room.id, "2030-11-10", "2030-11-12").await;
    book(&pool, first_room.id, "2030-11-12", "2030-11-14").await;

    let into_neighbour = bookings()
        .update_booking(
            &pool,
            first.id,
            UpdateBookingRequest {
                check_out_date: Some(date("2030-11-13")),
                ..Default::default()
            },
            None,
        )
        .await;
    assert!(matches!(assert_err!(into_neighbour), AppError::Conflict(_)));

    let earlier = bookings()
        .update_booking(
            &pool,
            first.id,
            UpdateBookingRequest {
                check_in_date: Some(date("2030-11-09")),
                ..Default::default()
            },
            None,
        )
        .await
        .unwrap();
    assert_eq!(earlier.nights, 3);
    assert_eq!(earlier.total_amount, dec!(3000));

    let other_room = room(&pool, dec!(2000)).await;
    let moved = bookings()
        .update_booking(
            &pool,
            first.id,
            UpdateBookingRequest {
                room_id: Some(other_room.id),
                ..Default::default()
            },
            None,
        )
        .await
        .unwrap();
    assert_eq!(moved.room_id, other_room.id);
    assert_eq!(moved.total_amount, dec!(6000));
    let moved_to = RoomService::get_room(&pool, other_room.id).await.unwrap();
    assert_eq!(moved_to.status, RoomStatus::Occupied);
}

#[tokio::test]
#[ignore = "requires DATABASE_URL"]
async fn completing_tasks_returns_room_to_service() {
    let pool = setup().await;
    let room = room(&pool, dec!(1000)).await;
    let staff = Uuid::new_v4();

    let task = HousekeepingService::create_maintenance_task(
        &pool,
        CreateMaintenanceTaskRequest {
            room_id: room.id,
            title: "Leaking tap".to_string(),
            description: None,
            priority: None,
        },
        staff,
    )
    .await
    .unwrap();

    let in_maintenance = RoomService::get_room(&pool, room.id).await.unwrap();
    assert_eq!(in_maintenance.status, RoomStatus::Maintenance);

    let refused = bookings()
        .create_booking(
            &pool,
            request(room.id, "2030-12-01", "2030-12-02", BookingStatus::Confirmed),
            None,
        )
        .await;
    assert!(matches!(assert_err!(refused), AppError::Conflict(_)));

    HousekeepingService::update_maintenance_status(&pool, task.id, TaskStatus::InProgress, staff)
        .await
        .unwrap();
    let done =
        HousekeepingService::update_maintenance_status(&pool, task.id, TaskStatus::Completed, staff)
            .await
            .unwrap();
    assert!(done.completed_at.is_some());

    let released = RoomService::get_room(&pool, room.id).await.unwrap();
    assert_eq!(released.status, RoomStatus::Available);

    let reopen =
        HousekeepingService::update_maintenance_status(&pool, task.id, TaskStatus::Pending, staff)
            .await;
    assert!(matches!(assert_err!(reopen), AppError::Conflict(_)));
}

#[tokio::test]
#[ignore = "requires DATABASE_URL"]
async fn check_out_does_not_duplicate_open_cleaning_task() {
    let pool = setup().await;
    let room = room(&pool, dec!(1000)).await;

    let booking = book(&pool, room.id, "2031-01-01", "2031-01-02").await;
    PaymentService::record_desk_payment(
        &pool,
        booking.id,
        dec!(1000),
        DeskPaymentMethod::Transfer,
        None,
        Uuid::new_v4(),
    )
    .await
    .unwrap();
    bookings().check_in(&pool, booking.id, None).await.unwrap();

    let routine = HousekeepingService::create_cleaning_task(
        &pool,
        CreateCleaningTaskRequest {
            room_id: room.id,
            task_type: None,
            priority: None,
            notes: Some("Extra towels".to_string()),
        },
        Uuid::new_v4(),
    )
    .await
    .unwrap();

    bookings().check_out(&pool, booking.id, None).await.unwrap();

    let tasks = HousekeepingService::cleaning_tasks_for_room(&pool, room.id)
        .await
        .unwrap();
    assert_eq!(tasks.len(), 1);
    assert_eq!(tasks[0].id, routine.id);

    HousekeepingService::update_cleaning_status(
        &pool,
        routine.id,
        TaskStatus::Completed,
        Uuid::new_v4(),
    )
    .await
    .unwrap();
    let ready = RoomService::get_room(&pool, room.id).await.unwrap();
    assert_eq!(ready.status, RoomStatus::Available);
}

#[tokio::test]
#[ignore = "requires DATABASE_URL"]
async fn completed_order_decrements_stock_or_rolls_back() {
    let pool = setup().await;
    let staff = Uuid::new_v4();
    let beer = product(&pool, dec!(80), 5).await;
    let water = product(&pool, dec!(20), 1).await;

    let order = OrderService::create_order(
        &pool,
        CreateOrderRequest {
            booking_id: None,
            items: vec![OrderItemRequest {
                product_id: beer,
                quantity: 3,
            }],
        },
        staff,
    )
    .await
    .unwrap();
    assert_eq!(order.order.total_amount, dec!(240));

    let completed = OrderService::complete_order(&pool, order.order.id, staff)
        .await
        .unwrap();
    assert_eq!(completed.order.status, OrderStatus::Completed);

    let movements = OrderService::product_movements(&pool, beer).await.unwrap();
    assert_eq!(movements.len(), 1);
    assert_eq!(movements[0].kind, StockMovementKind::Sale);
    assert_eq!(movements[0].quantity, -3);

    let short = OrderService::create_order(
        &pool,
        CreateOrderRequest {
            booking_id: None,
            items: vec![
                OrderItemRequest {
                    product_id: beer,
                    quantity: 1,
                },
                OrderItemRequest {
                    product_id: water,
                    quantity: 2,
                },
            ],
        },
        staff,
    )
    .await
    .unwrap();

    let result = OrderService::complete_order(&pool, short.order.id, staff).await;
    assert!(matches!(assert_err!(result), AppError::Conflict(_)));

    let (beer_stock,): (i32,) = sqlx::query_as("SELECT stock FROM products WHERE id = $1")
        .bind(beer)
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(beer_stock, 2);

    let still_pending = OrderService::get_order(&pool, short.order.id).await.unwrap();
    assert_eq!(still_pending.order.status, OrderStatus::Pending);
}

#[tokio::test]
#[ignore = "requires DATABASE_URL"]
async fn daily_movements_and_audit_trail() {
    let pool = setup().await;
    let room = room(&pool, dec!(1000)).await;

    let booking = book(&pool, room.id, "2031-02-01", "2031-02-03").await;

    let arrivals = BookingService::daily_movements(&pool, Some(date("2031-02-01")))
        .await
        .unwrap();
    assert!(arrivals.check_ins.iter().any(|b| b.id == booking.id));
    assert!(arrivals.check_outs.iter().all(|b| b.id != booking.id));

    bookings().check_in(&pool, booking.id, None).await.unwrap();
    let departures = BookingService::daily_movements(&pool, Some(date("2031-02-03")))
        .await
        .unwrap();
    assert!(departures.check_outs.iter().any(|b| b.id == booking.id));

    // Журнал пишется в фоне
    let mut actions = Vec::new();
    for _ in 0..40 {
        actions = AuditService::history(&pool, booking.id)
            .await
            .unwrap()
            .into_iter()
            .map(|log| log.action)
            .collect();
        if actions.len() >= 2 {
            break;
        }
        tokio::time::sleep(std::time::Duration::from_millis(50)).await;
    }
    assert!(actions.contains(&"booking_created".to_string()));
    assert!(actions.contains(&"checked_in".to_string()));
}

#[tokio::test]
#[ignore = "requires DATABASE_URL"]
async fn delete_removes_booking_and_frees_room() {
    let pool = setup().await;
    let room = room(&pool, dec!(1000)).await;

    let booking = book(&pool, room.id, "2031-03-01", "2031-03-02").await;
    verified_slip(&pool, &booking, dec!(1000)).await;

    bookings()
        .delete_booking(&pool, booking.id, None)
        .await
        .unwrap();

    let gone = BookingService::get_booking(&pool, booking.id).await;
    assert!(matches!(assert_err!(gone), AppError::NotFound(_)));
    let room_after = RoomService::get_room(&pool, room.id).await.unwrap();
    assert_eq!(room_after.status, RoomStatus::Available);

    let missing = bookings().delete_booking(&pool, booking.id, None).await;
    assert!(matches!(assert_err!(missing), AppError::NotFound(_)));
}

#[tokio::test]
#[ignore = "requires DATABASE_URL"]
async fn manual_confirm_promotes_pending_booking() {
    let pool = setup().await;
    let room = room(&pool, dec!(1000)).await;

    let booking = bookings()
        .create_booking(
            &pool,
            request(room.id, "2031-02-01", "2031-02-03", BookingStatus::Pending),
            None,
        )
        .await
        .unwrap();
    assert_eq!(booking.status, BookingStatus::Pending);

    let confirmed = bookings()
        .confirm_booking(&pool, booking.id, Some(Uuid::new_v4()))
        .await
        .unwrap();
    assert_eq!(confirmed.status, BookingStatus::Confirmed);
    assert_eq!(confirmed.paid_amount, Decimal::ZERO);
    assert_eq!(confirmed.payment_status, PaymentStatus::Pending);

    // Повторное подтверждение ничего не меняет
    let again = assert_ok!(bookings().confirm_booking(&pool, booking.id, None).await);
    assert_eq!(again.status, BookingStatus::Confirmed);

    bookings().check_in(&pool, booking.id, None).await.unwrap();
    let after_check_in = bookings().confirm_booking(&pool, booking.id, None).await;
    assert!(matches!(assert_err!(after_check_in), AppError::Conflict(_)));

    let fetched = BookingService::get_booking(&pool, booking.id).await.unwrap();
    assert_eq!(fetched.status, BookingStatus::CheckedIn);
}

#[tokio::test]
#[ignore = "requires DATABASE_URL"]
async fn releasing_a_booking_keeps_room_of_in_house_guest() {
    let pool = setup().await;
    let shared = room(&pool, dec!(1000)).await;
    let spare = room(&pool, dec!(1000)).await;

    let in_house = book(&pool, shared.id, "2031-03-10", "2031-03-12").await;
    bookings().check_in(&pool, in_house.id, None).await.unwrap();

    let cancelled = book(&pool, shared.id, "2031-03-12", "2031-03-14").await;
    bookings()
        .cancel_booking(&pool, cancelled.id, None)
        .await
        .unwrap();
    let after_cancel = RoomService::get_room(&pool, shared.id).await.unwrap();
    assert_eq!(after_cancel.status, RoomStatus::Occupied);

    let deleted = book(&pool, shared.id, "2031-03-20", "2031-03-22").await;
    bookings()
        .delete_booking(&pool, deleted.id, None)
        .await
        .unwrap();
    let after_delete = RoomService::get_room(&pool, shared.id).await.unwrap();
    assert_eq!(after_delete.status, RoomStatus::Occupied);

    let moved = book(&pool, shared.id, "2031-04-01", "2031-04-03").await;
    bookings()
        .update_booking(
            &pool,
            moved.id,
            UpdateBookingRequest {
                room_id: Some(spare.id),
                ..Default::default()
            },
            None,
        )
        .await
        .unwrap();
    let after_move = RoomService::get_room(&pool, shared.id).await.unwrap();
    assert_eq!(after_move.status, RoomStatus::Occupied);
}
