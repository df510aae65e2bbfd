use rust_decimal::Decimal;
use serde_json::json;
use sqlx::PgPool;
use uuid::Uuid;
use validator::Validate;

use crate::error::{AppError, AppResult};
use crate::models::{
    AuditAction, CreateOrderRequest, Order, OrderItem, OrderResponse, OrderStatus, Product,
    StockMovement, StockMovementKind,
};
use crate::services::AuditService;

pub struct OrderService;

impl OrderService {
    /// Заказ из бара/мини-бара. Позиции приходят целиком в запросе;
    /// цены фиксируются на момент создания.
    pub async fn create_order(
        pool: &PgPool,
        payload: CreateOrderRequest,
        actor_id: Uuid,
    ) -> AppResult<OrderResponse> {
        payload.validate()?;

        let mut tx = pool.begin().await?;

        if let Some(booking_id) = payload.booking_id {
            let exists: Option<(i32,)> = sqlx::query_as("SELECT 1 FROM bookings WHERE id = $1")
                .bind(booking_id)
                .fetch_optional(&mut *tx)
                .await?;
            if exists.is_none() {
                return Err(AppError::NotFound("Бронирование не найдено".to_string()));
            }
        }

        let order = sqlx::query_as::<_, Order>(
            r#"
            INSERT INTO orders (booking_id, status, total_amount, created_by)
            VALUES ($1, $2, 0, $3)
            RETURNING *
            "#,
        )
        .bind(payload.booking_id)
        .bind(OrderStatus::Pending)
        .bind(actor_id)
        .fetch_one(&mut *tx)
        .await?;

        let mut items = Vec::with_capacity(payload.items.len());
        let mut total = Decimal::ZERO;

        for item in &payload.items {
            let product = sqlx::query_as::<_, Product>("SELECT * FROM products WHERE id = $1")
                .bind(item.product_id)
                .fetch_optional(&mut *tx)
                .await?
                .ok_or_else(|| AppError::NotFound("Товар не найден".to_string()))?;

            let order_item = sqlx::query_as::<_, OrderItem>(
                r#"
                INSERT INTO order_items (order_id, product_id, quantity, unit_price)
                VALUES ($1, $2, $3, $4)
                RETURNING *
                "#,
            )
            .bind(order.id)
            .bind(product.id)
            .bind(item.quantity)
            .bind(product.price)
            .fetch_one(&mut *tx)
            .await?;

            total += product.price * Decimal::from(item.quantity);
            items.push(order_item);
        }

        let order = sqlx::query_as::<_, Order>(
            "UPDATE orders SET total_amount = $2 WHERE id = $1 RETURNING *",
        )
        .bind(order.id)
        .bind(total)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(OrderResponse { order, items })
    }

    /// Завершение продажи: списание остатков по каждой позиции.
    /// При нехватке любого товара откатывается весь заказ.
    pub async fn complete_order(
        pool: &PgPool,
        order_id: Uuid,
        actor_id: Uuid,
    ) -> AppResult<OrderResponse> {
        let mut tx = pool.begin().await?;

        let order = sqlx::query_as::<_, Order>("SELECT * FROM orders WHERE id = $1 FOR UPDATE")
            .bind(order_id)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or_else(|| AppError::NotFound("Заказ не найден".to_string()))?;

        if order.status != OrderStatus::Pending {
            return Err(AppError::Conflict("Заказ уже обработан".to_string()));
        }

        let items = sqlx::query_as::<_, OrderItem>(
            "SELECT * FROM order_items WHERE order_id = $1 ORDER BY product_id",
        )
        .bind(order.id)
        .fetch_all(&mut *tx)
        .await?;

        for item in &items {
            let result = sqlx::query(
                r#"
                UPDATE products SET stock = stock - $2, updated_at = NOW()
                WHERE id = $1 AND stock >= $2
                "#,
            )
            .bind(item.product_id)
            .bind(item.quantity)
            .execute(&mut *tx)
            .await?;

            if result.rows_affected() == 0 {
                return Err(AppError::Conflict(format!(
                    "Недостаточно товара {} на складе",
                    item.product_id
                )));
            }

            sqlx::query(
                r#"
                INSERT INTO stock_movements (product_id, order_id, kind, quantity)
                VALUES ($1, $2, $3, $4)
                "#,
            )
            .bind(item.product_id)
            .bind(order.id)
            .bind(StockMovementKind::Sale)
            .bind(-item.quantity)
            .execute(&mut *tx)
            .await?;
        }

        let order = sqlx::query_as::<_, Order>(
            r#"
            UPDATE orders SET status = $2, completed_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(order.id)
        .bind(OrderStatus::Completed)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;

        tracing::info!(order_id = %order.id, total = %order.total_amount, "Order completed");

        AuditService::record(
            pool,
            AuditAction::OrderCompleted,
            "order",
            order.id,
            Some(actor_id),
            json!({ "items": items.len(), "total_amount": order.total_amount }),
        );

        Ok(OrderResponse { order, items })
    }

    pub async fn get_order(pool: &PgPool, order_id: Uuid) -> AppResult<OrderResponse> {
        let order = sqlx::query_as::<_, Order>("SELECT * FROM orders WHERE id = $1")
            .bind(order_id)
            .fetch_optional(pool)
            .await?
            .ok_or_else(|| AppError::NotFound("Заказ не найден".to_string()))?;

        let items = sqlx::query_as::<_, OrderItem>(
            "SELECT * FROM order_items WHERE order_id = $1 ORDER BY product_id",
        )
        .bind(order.id)
        .fetch_all(pool)
        .await?;

        Ok(OrderResponse { order, items })
    }

    /// Журнал движения остатков по товару, новые записи первыми.
    pub async fn product_movements(
        pool: &PgPool,
        product_id: Uuid,
    ) -> AppResult<Vec<StockMovement>> {
        let movements = sqlx::query_as::<_, StockMovement>(
            "SELECT * FROM stock_movements WHERE product_id = $1 ORDER BY created_at DESC",
        )
        .bind(product_id)
        .fetch_all(pool)
        .await?;

        Ok(movements)
    }
}
