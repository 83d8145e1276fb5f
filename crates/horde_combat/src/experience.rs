//! # Experience Sink
//!
//! Collected pickups forward their value to whatever progression subsystem
//! the host registered. The combat layer only knows this trait.
//!
//! ```rust,ignore
//! let ledger = ExperienceLedger::default();
//! world.register_service::<SharedExperienceSink>(Box::new(ledger.clone()));
//! // ... run frames ...
//! println!("collected {}", ledger.total());
//! ```

use std::cell::Cell;
use std::rc::Rc;

/// Receives scalar amounts from pickup collection.
pub trait ExperienceSink {
    /// Adds `amount` to the receiver.
    fn add_amount(&mut self, amount: f32);
}

/// Service key under which the sink is registered.
pub type SharedExperienceSink = Box<dyn ExperienceSink>;

#[derive(Clone, Copy, Debug, Default)]
struct Totals {
    total: f32,
    deposits: u32,
}

/// Sink that keeps a running total.
///
/// Clones share the same totals, so the host keeps one handle and registers
/// another.
#[derive(Clone, Debug, Default)]
pub struct ExperienceLedger {
    totals: Rc<Cell<Totals>>,
}

impl ExperienceLedger {
    /// Sum of every amount received.
    #[must_use]
    pub fn total(&self) -> f32 {
        self.totals.get().total
    }

    /// Number of deposits.
    #[must_use]
    pub fn deposits(&self) -> u32 {
        self.totals.get().deposits
    }
}

impl ExperienceSink for ExperienceLedger {
    fn add_amount(&mut self, amount: f32) {
        let mut totals = self.totals.get();
        totals.total += amount;
        totals.deposits += 1;
        self.totals.set(totals);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_ledger_accumulates() {
        let mut ledger = ExperienceLedger::default();
        ledger.add_amount(1.5);
        ledger.add_amount(2.5);
        assert_relative_eq!(ledger.total(), 4.0);
        assert_eq!(ledger.deposits(), 2);
    }

    #[test]
    fn test_clones_share_totals() {
        let handle = ExperienceLedger::default();
        let mut sink: SharedExperienceSink = Box::new(handle.clone());
        sink.add_amount(3.0);
        sink.add_amount(1.0);
        assert_relative_eq!(handle.total(), 4.0);
        assert_eq!(handle.deposits(), 2);
    }
}
