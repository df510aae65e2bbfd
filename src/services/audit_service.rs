use serde_json::Value;
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::AppResult;
use crate::models::{AuditAction, AuditLog};

pub struct AuditService;

impl AuditService {
    /// Запись в журнал аудита в фоне. Ошибка записи только логируется
    /// и никогда не влияет на исходную операцию.
    pub fn record(
        pool: &PgPool,
        action: AuditAction,
        entity: &'static str,
        entity_id: Uuid,
        actor_id: Option<Uuid>,
        details: Value,
    ) {
        let pool = pool.clone();

        tokio::spawn(async move {
            let result = sqlx::query(
                r#"
                INSERT INTO audit_logs (action, entity, entity_id, actor_id, details)
                VALUES ($1, $2, $3, $4, $5)
                "#,
            )
            .bind(action.as_str())
            .bind(entity)
            .bind(entity_id)
            .bind(actor_id)
            .bind(&details)
            .execute(&pool)
            .await;

            if let Err(e) = result {
                tracing::warn!(
                    action = action.as_str(),
                    entity,
                    %entity_id,
                    "Failed to write audit log: {}",
                    e
                );
            }
        });
    }

    pub async fn history(pool: &PgPool, entity_id: Uuid) -> AppResult<Vec<AuditLog>> {
        let logs = sqlx::query_as::<_, AuditLog>(
            "SELECT * FROM audit_logs WHERE entity_id = $1 ORDER BY created_at",
        )
        .bind(entity_id)
        .fetch_all(pool)
        .await?;

        Ok(logs)
    }
}
