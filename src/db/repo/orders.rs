//! Order store operations.
//!
//! The order log is append-only: orders are inserted once and the only
//! permitted mutation is the NEW -> CANCELLED status update.

use super::Repository;
use crate::domain::{
    Decimal, FilledOrder, InstrumentId, NewOrder, Order, OrderId, OrderStatus, UserId,
};
use chrono::{DateTime, SecondsFormat, Utc};
use sqlx::sqlite::SqliteRow;
use sqlx::Row;
use std::str::FromStr;
use tracing::warn;

const ORDER_COLUMNS: &str = "id, user_id, instrument_id, side, kind, size, price, status, created_at";

impl Repository {
    /// Append an order to the store and return it with its assigned id.
    pub async fn insert_order(&self, new_order: &NewOrder) -> Result<Order, sqlx::Error> {
        let result = sqlx::query(
            r#"
            INSERT INTO orders (user_id, instrument_id, side, kind, size, price, status, created_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(new_order.user_id.as_i64())
        .bind(new_order.instrument_id.as_i64())
        .bind(new_order.side.to_string())
        .bind(new_order.kind.to_string())
        .bind(new_order.size)
        .bind(new_order.price.to_canonical_string())
        .bind(new_order.status.to_string())
        .bind(format_timestamp(&new_order.created_at))
        .execute(&self.pool)
        .await?;

        Ok(Order {
            id: OrderId::new(result.last_insert_rowid()),
            user_id: new_order.user_id,
            instrument_id: new_order.instrument_id,
            side: new_order.side,
            kind: new_order.kind,
            size: new_order.size,
            price: new_order.price,
            status: new_order.status,
            created_at: new_order.created_at,
        })
    }

    /// Look up a single order by id.
    pub async fn find_order(&self, order_id: OrderId) -> Result<Option<Order>, sqlx::Error> {
        let row = sqlx::query(&format!(
            "SELECT {} FROM orders WHERE id = ?",
            ORDER_COLUMNS
        ))
        .bind(order_id.as_i64())
        .fetch_optional(&self.pool)
        .await?;

        row.map(|r| order_from_row(&r)).transpose()
    }

    /// Persist a status change. The caller enforces the state machine.
    pub async fn update_order_status(
        &self,
        order_id: OrderId,
        status: OrderStatus,
    ) -> Result<(), sqlx::Error> {
        sqlx::query("UPDATE orders SET status = ? WHERE id = ?")
            .bind(status.to_string())
            .bind(order_id.as_i64())
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    /// All orders for a user, newest first.
    pub async fn orders_for_user(&self, user_id: UserId) -> Result<Vec<Order>, sqlx::Error> {
        let rows = sqlx::query(&format!(
            "SELECT {} FROM orders WHERE user_id = ? ORDER BY created_at DESC, id DESC",
            ORDER_COLUMNS
        ))
        .bind(user_id.as_i64())
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(order_from_row).collect()
    }

    /// FILLED orders for a user with the instrument category attached,
    /// as consumed by the ledger fold and the position replay.
    pub async fn filled_orders_for_user(
        &self,
        user_id: UserId,
    ) -> Result<Vec<FilledOrder>, sqlx::Error> {
        let rows = sqlx::query(
            r#"
            SELECT o.id, o.user_id, o.instrument_id, o.side, o.kind, o.size,
                   o.price, o.status, o.created_at, i.category
            FROM orders o
            JOIN instruments i ON i.id = o.instrument_id
            WHERE o.user_id = ? AND o.status = 'FILLED'
            ORDER BY o.created_at ASC, o.id ASC
            "#,
        )
        .bind(user_id.as_i64())
        .fetch_all(&self.pool)
        .await?;

        rows.iter()
            .map(|row| {
                let order = order_from_row(row)?;
                let instrument_category: String = row.get("category");
                Ok(FilledOrder {
                    order,
                    instrument_category,
                })
            })
            .collect()
    }

    /// FILLED orders for one (user, instrument) pair, as consumed by the
    /// available-shares fold.
    pub async fn filled_orders_for_user_instrument(
        &self,
        user_id: UserId,
        instrument_id: InstrumentId,
    ) -> Result<Vec<Order>, sqlx::Error> {
        let rows = sqlx::query(&format!(
            "SELECT {} FROM orders WHERE user_id = ? AND instrument_id = ? AND status = 'FILLED'",
            ORDER_COLUMNS
        ))
        .bind(user_id.as_i64())
        .bind(instrument_id.as_i64())
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(order_from_row).collect()
    }
}

fn format_timestamp(timestamp: &DateTime<Utc>) -> String {
    // Fixed-width RFC3339 so lexicographic ORDER BY matches chronology.
    timestamp.to_rfc3339_opts(SecondsFormat::Micros, true)
}

fn order_from_row(row: &SqliteRow) -> Result<Order, sqlx::Error> {
    let id: i64 = row.get("id");
    let user_id: i64 = row.get("user_id");
    let instrument_id: i64 = row.get("instrument_id");
    let side_str: String = row.get("side");
    let kind_str: String = row.get("kind");
    let size: i64 = row.get("size");
    let price_str: String = row.get("price");
    let status_str: String = row.get("status");
    let created_at_str: String = row.get("created_at");

    let side = side_str
        .parse()
        .map_err(|e| sqlx::Error::Decode(Box::new(e)))?;
    let kind = kind_str
        .parse()
        .map_err(|e| sqlx::Error::Decode(Box::new(e)))?;
    let status = status_str
        .parse()
        .map_err(|e| sqlx::Error::Decode(Box::new(e)))?;
    let created_at = DateTime::parse_from_rfc3339(&created_at_str)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| sqlx::Error::Decode(Box::new(e)))?;

    let price = Decimal::from_str(&price_str).unwrap_or_else(|e| {
        warn!(
            order_id = id,
            price = %price_str,
            error = %e,
            "Failed to parse order price decimal, using default"
        );
        Decimal::default()
    });

    Ok(Order {
        id: OrderId::new(id),
        user_id: UserId::new(user_id),
        instrument_id: InstrumentId::new(instrument_id),
        side,
        kind,
        size,
        price,
        status,
        created_at,
    })
}
