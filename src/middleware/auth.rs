use axum::{
    body::Body,
    extract::State,
    http::{header::AUTHORIZATION, request::Parts, Request, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use sqlx::PgPool;
use uuid::Uuid;

use crate::config::Config;
use crate::error::{AppError, AppResult};
use crate::models::StaffRole;
use crate::services::AuthService;

#[derive(Clone, Debug)]
pub struct AuthUser {
    pub user_id: Uuid,
    pub role: StaffRole,
}

impl AuthUser {
    /// Подтверждение квитанций, оплата на стойке и удаление бронирований.
    pub fn require_admin(&self) -> AppResult<()> {
        if is_admin_or_higher(&self.role) {
            Ok(())
        } else {
            Err(AppError::Forbidden)
        }
    }

    pub fn require_manager(&self) -> AppResult<()> {
        if is_manager_or_higher(&self.role) {
            Ok(())
        } else {
            Err(AppError::Forbidden)
        }
    }
}

#[derive(Clone)]
pub struct AppState {
    pub pool: PgPool,
    pub config: Config,
}

pub fn is_admin_or_higher(role: &StaffRole) -> bool {
    matches!(role, StaffRole::Admin)
}

pub fn is_manager_or_higher(role: &StaffRole) -> bool {
    matches!(role, StaffRole::Manager | StaffRole::Admin)
}

// Middleware для добавления AppState в extensions
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut request: Request<Body>,
    next: Next,
) -> Response {
    request.extensions_mut().insert(state);
    next.run(request).await
}

fn reject(status: StatusCode, message: &str) -> Response {
    (status, Json(json!({"error": message}))).into_response()
}

// Экстрактор для авторизованного сотрудника
#[axum::async_trait]
impl<S> axum::extract::FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
{
    type Rejection = Response;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let app_state = parts
            .extensions
            .get::<AppState>()
            .cloned()
            .ok_or_else(|| reject(StatusCode::INTERNAL_SERVER_ERROR, "Internal server error"))?;

        let token = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .ok_or_else(|| reject(StatusCode::UNAUTHORIZED, "Missing authorization header"))?
            .strip_prefix("Bearer ")
            .ok_or_else(|| {
                reject(
                    StatusCode::UNAUTHORIZED,
                    "Invalid authorization header format",
                )
            })?;

        let claims = AuthService::new(app_state.config)
            .verify_token(token)
            .map_err(|_| reject(StatusCode::UNAUTHORIZED, "Invalid or expired token"))?;

        if claims.token_type != "access" {
            return Err(reject(StatusCode::UNAUTHORIZED, "Invalid token type"));
        }

        let user_id = Uuid::parse_str(&claims.sub)
            .map_err(|_| reject(StatusCode::UNAUTHORIZED, "Invalid user ID in token"))?;

        // Неизвестная роль не получает даже прав сотрудника
        let role = StaffRole::parse(&claims.role).ok_or_else(|| {
            tracing::warn!(%user_id, role = %claims.role, "Token with unknown staff role");
            reject(StatusCode::FORBIDDEN, "Unknown staff role")
        })?;

        Ok(AuthUser { user_id, role })
    }
}
