//! Position Ledger - instrument -> signed marking position

use rust_decimal::Decimal;
use std::collections::{BTreeMap, HashMap};

use crate::core::Symbol;

#[derive(Debug, Default)]
pub struct PositionLedger {
    positions: HashMap<Symbol, Decimal>,
}

impl PositionLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Position after applying `delta`, without storing it. `None` on
    /// overflow.
    pub fn checked_position(&self, symbol: &Symbol, delta: Decimal) -> Option<Decimal> {
        self.get(symbol).checked_add(delta)
    }

    /// Store a position computed by [`Self::checked_position`]. Creates the
    /// entry the first time an instrument is referenced.
    pub fn set(&mut self, symbol: &Symbol, position: Decimal) {
        self.positions.insert(symbol.clone(), position);
    }

    /// Current position; instruments never seen read as zero.
    pub fn get(&self, symbol: &Symbol) -> Decimal {
        self.positions.get(symbol).copied().unwrap_or(Decimal::ZERO)
    }

    /// Sorted copy of every entry.
    pub fn snapshot(&self) -> BTreeMap<Symbol, Decimal> {
        self.positions
            .iter()
            .map(|(k, v)| (k.clone(), *v))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_zero_entry_and_unseen_reads() {
        let mut ledger = PositionLedger::new();
        let abc = Symbol::new("ABC");
        ledger.set(&abc, Decimal::ZERO);
        assert!(ledger.snapshot().contains_key(&abc));

        let next = ledger.checked_position(&abc, dec!(-40)).unwrap();
        assert_eq!(ledger.get(&abc), dec!(0));
        ledger.set(&abc, next);
        assert_eq!(ledger.get(&abc), dec!(-40));
        assert_eq!(ledger.get(&Symbol::new("XYZ")), dec!(0));
    }

    #[test]
    fn test_checked_position_overflow() {
        let mut ledger = PositionLedger::new();
        let abc = Symbol::new("ABC");
        ledger.set(&abc, Decimal::MIN);
        assert_eq!(ledger.checked_position(&abc, dec!(-1)), None);
        assert_eq!(ledger.get(&abc), Decimal::MIN);
    }
}
