pub mod bookings;
pub mod housekeeping;
pub mod orders;
pub mod payments;
pub mod rooms;

use crate::middleware::AppState;
use axum::Router;

pub fn routes() -> Router<AppState> {
    Router::new()
        .nest("/rooms", rooms::routes())
        .nest("/bookings", bookings::routes())
        .nest("/payments", payments::routes())
        .nest("/housekeeping", housekeeping::routes())
        .nest("/orders", orders::routes())
}
