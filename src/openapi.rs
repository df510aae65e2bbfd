use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Homestay API",
        version = "1.0.0",
        description = "Backend API гостевого дома: номера, бронирования, оплата, уборка и заказы",
        contact(
            name = "Homestay Team",
            email = "support@homestay.local"
        )
    ),
    servers(
        (url = "http://localhost:8080", description = "Local development server")
    ),
    tags(
        (name = "rooms", description = "Номерной фонд и поиск свободных номеров"),
        (name = "bookings", description = "Бронирования, заселение и выезд"),
        (name = "payments", description = "Квитанции и оплата бронирований"),
        (name = "housekeeping", description = "Уборка и ремонт номеров"),
        (name = "orders", description = "Заказы и списание товара")
    ),
    paths(
        // Rooms
        crate::api::rooms::available_rooms,
        crate::api::rooms::list_rooms,
        crate::api::rooms::get_room,
        crate::api::rooms::create_room,
        // Bookings
        crate::api::bookings::create_booking,
        crate::api::bookings::get_booking,
        crate::api::bookings::get_booking_by_code,
        crate::api::bookings::update_booking,
        crate::api::bookings::confirm_booking,
        crate::api::bookings::cancel_booking,
        crate::api::bookings::delete_booking,
        crate::api::bookings::check_in,
        crate::api::bookings::check_out,
        crate::api::bookings::daily_movements,
        crate::api::bookings::booking_history,
        // Payments
        crate::api::payments::upload_slip,
        crate::api::payments::verify_slip,
        crate::api::payments::record_payment,
        crate::api::payments::list_slips,
        // Housekeeping
        crate::api::housekeeping::list_cleaning,
        crate::api::housekeeping::create_cleaning,
        crate::api::housekeeping::update_cleaning_status,
        crate::api::housekeeping::list_maintenance,
        crate::api::housekeeping::create_maintenance,
        crate::api::housekeeping::update_maintenance_status,
        crate::api::housekeeping::room_cleaning_history,
        // Orders
        crate::api::orders::create_order,
        crate::api::orders::get_order,
        crate::api::orders::complete_order,
    ),
    components(
        schemas(
            // Rooms
            crate::models::Room,
            crate::models::RoomType,
            crate::models::RoomStatus,
            crate::models::CreateRoomRequest,
            // Bookings
            crate::models::Booking,
            crate::models::BookingStatus,
            crate::models::PaymentStatus,
            crate::models::CreateBookingRequest,
            crate::models::UpdateBookingRequest,
            crate::models::DailyMovements,
            crate::models::AuditLog,
            // Payments
            crate::models::PaymentSlip,
            crate::models::SlipStatus,
            crate::models::SlipDecision,
            crate::models::DeskPaymentMethod,
            crate::models::VerifySlipRequest,
            crate::models::RecordPaymentRequest,
            crate::models::SlipUploadResponse,
            // Housekeeping
            crate::models::CleaningTask,
            crate::models::MaintenanceTask,
            crate::models::TaskStatus,
            crate::models::TaskPriority,
            crate::models::CleaningType,
            crate::models::CreateCleaningTaskRequest,
            crate::models::CreateMaintenanceTaskRequest,
            crate::models::UpdateTaskStatusRequest,
            // Orders
            crate::models::Order,
            crate::models::OrderItem,
            crate::models::OrderStatus,
            crate::models::OrderResponse,
            crate::models::OrderItemRequest,
            crate::models::CreateOrderRequest,
        )
    ),
    modifiers(&SecurityAddon)
)]
pub struct ApiDoc;

struct SecurityAddon;

impl utoipa::Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                utoipa::openapi::security::SecurityScheme::Http(
                    utoipa::openapi::security::Http::new(
                        utoipa::openapi::security::HttpAuthScheme::Bearer,
                    ),
                ),
            );
        }
    }
}
