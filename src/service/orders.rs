//! Order lifecycle: creation and cancellation.

use crate::db::Repository;
use crate::domain::{
    Decimal, InstrumentId, NewOrder, Order, OrderId, OrderKind, OrderStatus, Side, UserId,
};
use crate::engine::{Ledger, OrderValidator, PricingResolver};
use crate::error::AppError;
use chrono::Utc;
use std::sync::Arc;
use tracing::{info, warn};

/// A prospective order as submitted by the caller. Exactly one of `size`
/// or `amount` must be present (size wins when both are).
#[derive(Debug, Clone)]
pub struct CreateOrder {
    pub user_id: UserId,
    pub instrument_id: InstrumentId,
    pub side: Side,
    pub kind: OrderKind,
    pub size: Option<i64>,
    pub amount: Option<Decimal>,
    pub price: Option<Decimal>,
}

/// Applies the order state machine: every attempted order is persisted,
/// with the status chosen at creation, and the only later transition is
/// NEW -> CANCELLED.
pub struct OrderService {
    repo: Arc<Repository>,
    pricing: PricingResolver,
    validator: OrderValidator,
}

impl OrderService {
    pub fn new(repo: Arc<Repository>) -> Self {
        let pricing = PricingResolver::new(repo.clone());
        let validator = OrderValidator::new(Ledger::new(repo.clone()));
        Self {
            repo,
            pricing,
            validator,
        }
    }

    /// Create an order.
    ///
    /// Resolution order: user and instrument lookups, execution price,
    /// size-from-amount, then the affordability check. An unaffordable
    /// order is persisted as REJECTED, not refused. Affordable orders
    /// fill immediately (MARKET and cash movements) or rest as NEW
    /// (LIMIT, which nothing here ever auto-fills).
    pub async fn create_order(&self, request: CreateOrder) -> Result<Order, AppError> {
        let user = self
            .repo
            .find_user(request.user_id)
            .await?
            .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

        let instrument = self
            .repo
            .find_instrument(request.instrument_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Instrument not found".to_string()))?;

        if request.size.is_none() && request.amount.is_none() {
            return Err(AppError::InvalidInput(
                "either size or amount must be provided".to_string(),
            ));
        }

        if let Some(size) = request.size {
            if size <= 0 {
                return Err(AppError::InvalidInput(
                    "size must be a positive unit count".to_string(),
                ));
            }
        }

        let price = self
            .pricing
            .resolve_price(request.side, request.kind, instrument.id, request.price)
            .await?;

        let size = match request.size {
            Some(size) => size,
            // Checked above: size absent implies amount present.
            None => crate::engine::resolve_size_from_amount(
                request.amount.unwrap_or_else(Decimal::zero),
                price,
            )?,
        };

        let verdict = self
            .validator
            .validate(user.id, instrument.id, request.side, size, price)
            .await?;

        let status = match verdict {
            crate::engine::Verdict::Rejected(reason) => {
                warn!(
                    user_id = %user.id,
                    instrument_id = %instrument.id,
                    side = %request.side,
                    size,
                    price = %price,
                    %reason,
                    "Order rejected by validation"
                );
                OrderStatus::Rejected
            }
            crate::engine::Verdict::Approved => {
                if request.kind == OrderKind::Market || request.side.is_cash() {
                    OrderStatus::Filled
                } else {
                    OrderStatus::New
                }
            }
        };

        let order = self
            .repo
            .insert_order(&NewOrder {
                user_id: user.id,
                instrument_id: instrument.id,
                side: request.side,
                kind: request.kind,
                size,
                price,
                status,
                created_at: Utc::now(),
            })
            .await?;

        info!(
            order_id = %order.id,
            user_id = %order.user_id,
            side = %order.side,
            kind = %order.kind,
            size = order.size,
            price = %order.price,
            status = %order.status,
            "Order persisted"
        );
        Ok(order)
    }

    /// Cancel a resting order. Only NEW orders are cancellable; every
    /// other status is terminal.
    pub async fn cancel_order(&self, order_id: OrderId) -> Result<Order, AppError> {
        let mut order = self
            .repo
            .find_order(order_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Order not found".to_string()))?;

        if order.status != OrderStatus::New {
            return Err(AppError::StateConflict(
                "Only NEW orders can be cancelled".to_string(),
            ));
        }

        self.repo
            .update_order_status(order.id, OrderStatus::Cancelled)
            .await?;
        order.status = OrderStatus::Cancelled;

        info!(order_id = %order.id, "Order cancelled");
        Ok(order)
    }

    /// All orders for a user, newest first.
    pub async fn orders_for_user(&self, user_id: UserId) -> Result<Vec<Order>, AppError> {
        Ok(self.repo.orders_for_user(user_id).await?)
    }
}
