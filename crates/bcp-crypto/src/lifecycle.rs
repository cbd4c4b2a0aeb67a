//! One-shot parameter lifecycle: Uninitialized → Initialized → Destroyed.
//!
//! The slot hands out `Arc<Parameters>` clones. Destroying the slot drops
//! only its own reference, so an operation already holding the parameters
//! (a master decryption in flight, for instance) finishes against intact
//! material; the master secret is zeroized when the last reference drops.

use std::sync::{Arc, PoisonError, RwLock};

use crate::{error::BcpError, params::Parameters};

/// Observable lifecycle state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lifecycle {
    /// No parameters installed yet
    Uninitialized,
    /// Parameters available
    Initialized,
    /// Parameters released; the slot cannot be reused
    Destroyed,
}

enum SlotState {
    Uninitialized,
    Initialized(Arc<Parameters>),
    Destroyed,
}

/// Holder for a parameter set with an explicit lifecycle.
///
/// Readers never block each other; only transitions take the write lock.
pub struct ParameterSlot {
    state: RwLock<SlotState>,
}

impl ParameterSlot {
    /// Empty slot.
    pub const fn new() -> Self {
        Self { state: RwLock::new(SlotState::Uninitialized) }
    }

    /// Slot initialized with `params`.
    pub fn with_parameters(params: Parameters) -> Self {
        Self { state: RwLock::new(SlotState::Initialized(Arc::new(params))) }
    }

    /// Install parameters into an uninitialized slot.
    ///
    /// # Errors
    ///
    /// - `ParametersAlreadyInitialized`: slot is initialized or destroyed
    pub fn initialize(&self, params: Parameters) -> Result<Arc<Parameters>, BcpError> {
        let mut state = self.state.write().unwrap_or_else(PoisonError::into_inner);
        if !matches!(*state, SlotState::Uninitialized) {
            return Err(BcpError::ParametersAlreadyInitialized);
        }

        let params = Arc::new(params);
        *state = SlotState::Initialized(Arc::clone(&params));
        tracing::debug!(id = ?params.id(), "parameter slot initialized");
        Ok(params)
    }

    /// Current parameters.
    ///
    /// # Errors
    ///
    /// - `ParametersUninitialized`: slot is uninitialized or destroyed
    pub fn current(&self) -> Result<Arc<Parameters>, BcpError> {
        let state = self.state.read().unwrap_or_else(PoisonError::into_inner);
        match &*state {
            SlotState::Initialized(params) => Ok(Arc::clone(params)),
            SlotState::Uninitialized | SlotState::Destroyed => {
                Err(BcpError::ParametersUninitialized)
            },
        }
    }

    /// Release the slot's reference. Idempotent.
    pub fn destroy(&self) {
        let mut state = self.state.write().unwrap_or_else(PoisonError::into_inner);
        if matches!(*state, SlotState::Initialized(_)) {
            tracing::debug!("parameter slot destroyed");
        }
        *state = SlotState::Destroyed;
    }

    /// Lifecycle state.
    pub fn lifecycle(&self) -> Lifecycle {
        let state = self.state.read().unwrap_or_else(PoisonError::into_inner);
        match *state {
            SlotState::Uninitialized => Lifecycle::Uninitialized,
            SlotState::Initialized(_) => Lifecycle::Initialized,
            SlotState::Destroyed => Lifecycle::Destroyed,
        }
    }
}

impl Default for ParameterSlot {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng;
    use rand_chacha::ChaCha20Rng;

    use super::*;
    use crate::{
        keys::generate_keypair,
        params::setup_with_rng,
        test_support::test_config,
    };

    fn fresh_params(seed: u64) -> Parameters {
        setup_with_rng(&test_config(), &mut ChaCha20Rng::seed_from_u64(seed)).unwrap()
    }

    #[test]
    fn new_slot_is_uninitialized() {
        let slot = ParameterSlot::new();
        assert_eq!(slot.lifecycle(), Lifecycle::Uninitialized);
        assert_eq!(slot.current().err(), Some(BcpError::ParametersUninitialized));
    }

    #[test]
    fn initialize_then_read() {
        let slot = ParameterSlot::new();
        let params = slot.initialize(fresh_params(1)).unwrap();

        assert_eq!(slot.lifecycle(), Lifecycle::Initialized);
        assert_eq!(slot.current().unwrap().id(), params.id());
        assert!(generate_keypair(&slot.current().unwrap()).is_ok());
    }

    #[test]
    fn initialize_is_one_shot() {
        let slot = ParameterSlot::with_parameters(fresh_params(1));
        assert_eq!(
            slot.initialize(fresh_params(2)).err(),
            Some(BcpError::ParametersAlreadyInitialized)
        );
    }

    #[test]
    fn destroyed_slot_refuses_everything() {
        let slot = ParameterSlot::with_parameters(fresh_params(1));
        slot.destroy();

        assert_eq!(slot.lifecycle(), Lifecycle::Destroyed);
        assert_eq!(slot.current().err(), Some(BcpError::ParametersUninitialized));
        assert_eq!(
            slot.initialize(fresh_params(2)).err(),
            Some(BcpError::ParametersAlreadyInitialized)
        );

        slot.destroy();
        assert_eq!(slot.lifecycle(), Lifecycle::Destroyed);
    }

    #[test]
    fn in_flight_reference_survives_destroy() {
        let slot = ParameterSlot::with_parameters(fresh_params(1));
        let in_flight = slot.current().unwrap();

        slot.destroy();

        assert_eq!(Arc::strong_count(&in_flight), 1);
        assert!(generate_keypair(&in_flight).is_ok());
    }

    #[test]
    fn concurrent_readers_share_parameters() {
        let slot = Arc::new(ParameterSlot::with_parameters(fresh_params(1)));
        let expected = slot.current().unwrap().id();

        let handles: Vec<_> = (0..4)
            .map(|_| {
                let slot = Arc::clone(&slot);
                std::thread::spawn(move || {
                    let params = slot.current().unwrap();
                    generate_keypair(&params).unwrap();
                    params.id()
                })
            })
            .collect();

        for handle in handles {
            assert_eq!(handle.join().unwrap(), expected);
        }
    }
}
