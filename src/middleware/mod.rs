pub mod auth;

pub use auth::{auth_middleware, is_admin_or_higher, is_manager_or_higher, AppState, AuthUser};
