//! Position replay: filled orders -> per-instrument holdings.

use crate::domain::{Decimal, FilledOrder, InstrumentId, Side};
use std::collections::BTreeMap;
use tracing::debug;

/// Derived holding in one instrument. Never persisted; rebuilt per call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Position {
    /// Unit count, always > 0 in the calculator's output.
    pub quantity: i64,
    /// Weighted average cost per unit.
    pub avg_cost: Decimal,
    /// quantity x avg_cost.
    pub total_cost: Decimal,
}

/// Replay filled orders chronologically into current holdings.
///
/// Orders are sorted by creation time with order id as the tie-break, so
/// the replay is deterministic regardless of fetch order. Currency orders
/// are skipped (cash is the ledger's concern). BUY recomputes the weighted
/// average cost; SELL keeps it for the remainder and closes the position
/// outright when quantity falls to zero or below. An oversell is not an
/// error here: validation is expected to have blocked it, and the replay
/// simply closes the position.
pub fn calculate_positions(filled_orders: &[FilledOrder]) -> BTreeMap<InstrumentId, Position> {
    let mut sorted: Vec<&FilledOrder> = filled_orders.iter().collect();
    sorted.sort_by(|a, b| {
        a.order
            .created_at
            .cmp(&b.order.created_at)
            .then_with(|| a.order.id.cmp(&b.order.id))
    });

    let mut positions: BTreeMap<InstrumentId, Position> = BTreeMap::new();

    for filled in sorted {
        if filled.is_currency() {
            continue;
        }

        let order = &filled.order;
        let instrument_id = order.instrument_id;

        match order.side {
            Side::Buy => {
                let position = positions.entry(instrument_id).or_insert(Position {
                    quantity: 0,
                    avg_cost: Decimal::zero(),
                    total_cost: Decimal::zero(),
                });
                let new_total_cost = position.total_cost + order.notional();
                let new_quantity = position.quantity + order.size;
                position.quantity = new_quantity;
                position.total_cost = new_total_cost;
                position.avg_cost = new_total_cost / Decimal::from(new_quantity);
                debug!(
                    order_id = %order.id,
                    %instrument_id,
                    quantity = new_quantity,
                    avg_cost = %position.avg_cost,
                    "Applied BUY to position"
                );
            }
            Side::Sell => {
                if let Some(position) = positions.get_mut(&instrument_id) {
                    let new_quantity = position.quantity - order.size;
                    if new_quantity <= 0 {
                        positions.remove(&instrument_id);
                        debug!(order_id = %order.id, %instrument_id, "Position closed");
                    } else {
                        // Selling leaves the average cost of the remainder
                        // untouched; only the basis shrinks.
                        position.quantity = new_quantity;
                        position.total_cost = position.avg_cost * Decimal::from(new_quantity);
                        debug!(
                            order_id = %order.id,
                            %instrument_id,
                            quantity = new_quantity,
                            "Applied SELL to position"
                        );
                    }
                }
            }
            Side::CashIn | Side::CashOut => {}
        }
    }

    positions.retain(|_, position| position.quantity > 0);
    positions
}
