pub mod audit_service;
pub mod auth_service;
pub mod availability;
pub mod booking_service;
pub mod file_service;
pub mod housekeeping_service;
pub mod order_service;
pub mod payment_service;
pub mod room_service;

pub use audit_service::AuditService;
pub use auth_service::AuthService;
pub use booking_service::BookingService;
pub use file_service::FileService;
pub use housekeeping_service::HousekeepingService;
pub use order_service::OrderService;
pub use payment_service::PaymentService;
pub use room_service::RoomService;
