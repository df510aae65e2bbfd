use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Роль сотрудника из access-токена.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum StaffRole {
    Staff,
    Manager,
    Admin,
}

impl Default for StaffRole {
    fn default() -> Self {
        Self::Staff
    }
}

impl StaffRole {
    pub fn parse(role: &str) -> Option<Self> {
        match role {
            "staff" | "housekeeper" | "receptionist" => Some(StaffRole::Staff),
            "manager" => Some(StaffRole::Manager),
            "admin" | "owner" | "super_admin" => Some(StaffRole::Admin),
            _ => None,
        }
    }
}
