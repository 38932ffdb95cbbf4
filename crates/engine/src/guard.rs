//! Duplicate-fire protection.
//!
//! At most one issuance or credit-note operation per document key may be in
//! flight. This is purely client-side hygiene: it stops an operator from
//! firing a second request for the same bill while the first is pending.

use std::collections::HashSet;
use std::sync::{Arc, Mutex, PoisonError};

use crate::error::EngineError;

#[derive(Debug, Clone, Default)]
pub(crate) struct InFlight {
    keys: Arc<Mutex<HashSet<String>>>,
}

impl InFlight {
    /// Reserve `key` for the duration of the returned guard.
    pub(crate) fn try_acquire(&self, key: &str) -> Result<InFlightGuard, EngineError> {
        let mut keys = self.keys.lock().unwrap_or_else(PoisonError::into_inner);
        if !keys.insert(key.to_string()) {
            return Err(EngineError::AlreadyInFlight(key.to_string()));
        }
        Ok(InFlightGuard {
            keys: Arc::clone(&self.keys),
            key: key.to_string(),
        })
    }
}

/// Releases the reservation on drop, including on early returns.
pub(crate) struct InFlightGuard {
    keys: Arc<Mutex<HashSet<String>>>,
    key: String,
}

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        let mut keys = self.keys.lock().unwrap_or_else(PoisonError::into_inner);
        keys.remove(&self.key);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn second_acquire_for_same_key_is_rejected() {
        let in_flight = InFlight::default();
        let guard = in_flight.try_acquire("bill-1").unwrap();
        assert!(matches!(
            in_flight.try_acquire("bill-1"),
            Err(EngineError::AlreadyInFlight(_))
        ));
        // Different keys are independent.
        let _other = in_flight.try_acquire("bill-2").unwrap();

        drop(guard);
        assert!(in_flight.try_acquire("bill-1").is_ok());
    }
}
