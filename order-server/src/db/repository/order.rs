//! Order Repository
//!
//! The only write path is [`insert_order_with_lines`]: the order row and all
//! its lines commit in a single transaction, so a crash mid-write leaves
//! zero rows, never a partial order.

use super::{RepoError, RepoResult};
use shared::models::{Order, OrderCreate, OrderLine, OrderLineCreate};
use sqlx::SqlitePool;

const ORDER_COLUMNS: &str = "id, customer_name, customer_last_name, customer_address, \
     customer_email, customer_phone, customer_note, total_price, status, restaurant_id, \
     transaction_id, created_at";

/// Insert an order together with its lines in one transaction.
///
/// Returns the assigned order id.
pub async fn insert_order_with_lines(
    pool: &SqlitePool,
    order: &OrderCreate,
    lines: &[OrderLineCreate],
) -> RepoResult<i64> {
    if lines.is_empty() {
        return Err(RepoError::Validation("Order has no lines".into()));
    }

    let id = shared::util::snowflake_id();
    let now = shared::util::now_millis();

    let mut tx = pool.begin().await?;

    sqlx::query(
        "INSERT INTO orders (id, customer_name, customer_last_name, customer_address, \
         customer_email, customer_phone, customer_note, total_price, status, restaurant_id, \
         transaction_id, created_at) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
    )
    .bind(id)
    .bind(&order.customer_name)
    .bind(&order.customer_last_name)
    .bind(&order.customer_address)
    .bind(&order.customer_email)
    .bind(&order.customer_phone)
    .bind(&order.customer_note)
    .bind(order.total_price)
    .bind(order.status)
    .bind(order.restaurant_id)
    .bind(&order.transaction_id)
    .bind(now)
    .execute(&mut *tx)
    .await?;

    for line in lines {
        sqlx::query(
            "INSERT INTO order_line (order_id, dish_id, quantity, unit_price) VALUES (?, ?, ?, ?)",
        )
        .bind(id)
        .bind(line.dish_id)
        .bind(line.quantity)
        .bind(line.unit_price)
        .execute(&mut *tx)
        .await?;
    }

    tx.commit().await?;

    Ok(id)
}

pub async fn find_by_id(pool: &SqlitePool, id: i64) -> RepoResult<Option<Order>> {
    let order =
        sqlx::query_as::<_, Order>(&format!("SELECT {ORDER_COLUMNS} FROM orders WHERE id = ?"))
            .bind(id)
            .fetch_optional(pool)
            .await?;
    Ok(order)
}

pub async fn lines_for_order(pool: &SqlitePool, order_id: i64) -> RepoResult<Vec<OrderLine>> {
    let lines = sqlx::query_as::<_, OrderLine>(
        "SELECT id, order_id, dish_id, quantity, unit_price FROM order_line WHERE order_id = ? ORDER BY id",
    )
    .bind(order_id)
    .fetch_all(pool)
    .await?;
    Ok(lines)
}

/// Total number of persisted orders (used by tests and operator tooling)
pub async fn count(pool: &SqlitePool) -> RepoResult<i64> {
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM orders")
        .fetch_one(pool)
        .await?;
    Ok(count)
}

/// Total number of persisted order lines
pub async fn count_lines(pool: &SqlitePool) -> RepoResult<i64> {
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM order_line")
        .fetch_one(pool)
        .await?;
    Ok(count)
}
