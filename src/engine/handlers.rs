//! Lifecycle Handlers - one transition per event kind.
//!
//! Every handler validates against the current books first and only then
//! mutates, so an error leaves registry, tracker and ledger untouched. Ledger
//! moves are always the change in the touched order's contribution, which
//! keeps each position equal to the sum of its orders' contributions.

use rust_decimal::Decimal;
use tracing::{debug, warn};

use super::cancels::CancelTracker;
use super::ledger::PositionLedger;
use super::registry::{Order, OrderRegistry, Resolution};
use crate::core::{CancelPolicy, Error, OrderId, Result, Side, Symbol};

/// The three stores the handlers read and write.
#[derive(Debug, Default)]
pub struct Books {
    pub(crate) registry: OrderRegistry,
    pub(crate) cancels: CancelTracker,
    pub(crate) ledger: PositionLedger,
    pub(crate) cancel_policy: CancelPolicy,
}

impl Books {
    pub fn new(cancel_policy: CancelPolicy) -> Self {
        Self {
            cancel_policy,
            ..Default::default()
        }
    }

    /// Store `updated` over its existing record and move the ledger by the
    /// change in contribution. All arithmetic is checked before anything is
    /// written.
    fn commit(&mut self, kind: &str, updated: Order) -> Result<(Symbol, Decimal)> {
        let before = contribution(kind, self.registry.get(&updated.order_id)?)?;
        let after = contribution(kind, &updated)?;
        let delta = after
            .checked_sub(before)
            .ok_or_else(|| overflow(kind, &updated.order_id))?;
        let symbol = updated.instrument.clone();
        let position = self
            .ledger
            .checked_position(&symbol, delta)
            .ok_or_else(|| overflow(kind, &updated.order_id))?;

        self.registry.update(updated)?;
        self.ledger.set(&symbol, position);
        Ok((symbol, delta))
    }

    /// Gate for CANCEL_ACK / CANCEL_REJECT. `Ok(false)` means "no-op".
    fn cancel_outstanding(&self, order_id: &OrderId, kind: &str) -> Result<bool> {
        if self.cancels.is_pending(order_id) {
            return Ok(true);
        }
        match self.cancel_policy {
            CancelPolicy::Ignore => {
                warn!("{} for order {} with no outstanding cancel, ignoring", kind, order_id);
                Ok(false)
            }
            CancelPolicy::Reject => Err(Error::NoOutstandingCancel(order_id.clone())),
        }
    }
}

fn overflow(kind: &str, order_id: &OrderId) -> Error {
    Error::malformed(kind, format!("quantity overflow on order {}", order_id))
}

fn contribution(kind: &str, order: &Order) -> Result<Decimal> {
    order
        .contribution()
        .ok_or_else(|| overflow(kind, &order.order_id))
}

pub fn on_new(
    books: &mut Books,
    order_id: OrderId,
    symbol: Symbol,
    side: Side,
    quantity: Decimal,
) -> Result<Symbol> {
    if books.registry.contains(&order_id) {
        return Err(Error::DuplicateOrder(order_id));
    }
    let order = Order::new(order_id, symbol.clone(), side, quantity);
    let order_id = order.order_id.clone();
    let delta = contribution("NEW", &order)?;
    let position = books
        .ledger
        .checked_position(&symbol, delta)
        .ok_or_else(|| overflow("NEW", &order_id))?;

    books.registry.insert(order)?;
    books.ledger.set(&symbol, position);

    debug!("NEW {} {} {} {} -> delta {}", order_id, side, quantity, symbol, delta);
    Ok(symbol)
}

pub fn on_order_ack(books: &mut Books, order_id: &OrderId) -> Result<Symbol> {
    let mut order = books.registry.get(order_id)?.clone();
    if order.acknowledged {
        debug!("ORDER_ACK {} already acknowledged", order_id);
    }
    if let Some(resolution) = order.resolution {
        warn!("ORDER_ACK for {:?} order {}", resolution, order_id);
    }

    order.acknowledged = true;
    let (symbol, delta) = books.commit("ORDER_ACK", order)?;

    debug!("ORDER_ACK {} {} -> delta {}", order_id, symbol, delta);
    Ok(symbol)
}

pub fn on_order_reject(books: &mut Books, order_id: &OrderId) -> Result<Symbol> {
    let mut order = books.registry.get(order_id)?.clone();
    if let Some(resolution) = order.resolution {
        warn!("ORDER_REJECT for already {:?} order {}", resolution, order_id);
        return Ok(order.instrument);
    }

    order.resolution = Some(Resolution::Rejected);
    let (symbol, delta) = books.commit("ORDER_REJECT", order)?;

    debug!("ORDER_REJECT {} {} -> delta {}", order_id, symbol, delta);
    Ok(symbol)
}

pub fn on_cancel(books: &mut Books, order_id: &OrderId) -> Result<Symbol> {
    let symbol = books.registry.get(order_id)?.instrument.clone();
    if !books.cancels.request(order_id.clone()) {
        debug!("CANCEL {} already outstanding", order_id);
    }
    Ok(symbol)
}

pub fn on_cancel_ack(books: &mut Books, order_id: &OrderId) -> Result<Symbol> {
    let mut order = books.registry.get(order_id)?.clone();
    if !books.cancel_outstanding(order_id, "CANCEL_ACK")? {
        return Ok(order.instrument);
    }

    if order.resolution.is_none() {
        order.resolution = Some(Resolution::Cancelled);
    }
    let (symbol, delta) = books.commit("CANCEL_ACK", order)?;
    books.cancels.resolve(order_id);

    debug!("CANCEL_ACK {} {} -> delta {}", order_id, symbol, delta);
    Ok(symbol)
}

pub fn on_cancel_reject(books: &mut Books, order_id: &OrderId) -> Result<Symbol> {
    let symbol = books.registry.get(order_id)?.instrument.clone();
    if books.cancel_outstanding(order_id, "CANCEL_REJECT")? {
        books.cancels.resolve(order_id);
        debug!("CANCEL_REJECT {} {}", order_id, symbol);
    }
    Ok(symbol)
}

/// `filled_quantity` is what this fill executed, `remaining_quantity` what
/// the venue still has open afterwards.
pub fn on_fill(
    books: &mut Books,
    order_id: &OrderId,
    filled_quantity: Decimal,
    remaining_quantity: Decimal,
) -> Result<Symbol> {
    let mut order = books.registry.get(order_id)?.clone();
    let invalid = |reason: String| Error::InvalidFill {
        order_id: order_id.clone(),
        reason,
    };

    let claimed = filled_quantity
        .checked_add(remaining_quantity)
        .ok_or_else(|| invalid("filled + remaining overflows".to_string()))?;
    if claimed > order.open_quantity {
        return Err(invalid(format!(
            "filled {} + remaining {} exceeds open {}",
            filled_quantity, remaining_quantity, order.open_quantity
        )));
    }

    order.filled_quantity = order
        .filled_quantity
        .checked_add(filled_quantity)
        .ok_or_else(|| invalid("cumulative filled quantity overflows".to_string()))?;
    order.open_quantity = remaining_quantity;
    let (symbol, delta) = books.commit("FILL", order)?;

    debug!(
        "FILL {} {} filled {} remaining {} -> delta {}",
        order_id, symbol, filled_quantity, remaining_quantity, delta
    );
    Ok(symbol)
}
