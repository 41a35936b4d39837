use crate::domain::entities::RegistryState;
use crate::errors::StoreError;
use crate::ports::outbound::{LoadedState, RegistryStore};
use parking_lot::Mutex;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

/// In-memory registry store for unit tests.
///
/// Keeps the last persisted state in a mutex. `fail_writes` makes every
/// subsequent `persist` fail, which is how tests prove that a failed write
/// leaves the registry untouched.
#[derive(Default)]
pub struct InMemoryStore {
    state: Mutex<Option<RegistryState>>,
    fail_writes: AtomicBool,
    writes: AtomicUsize,
}

impl InMemoryStore {
    /// Empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Store that already holds `state`.
    pub fn with_state(state: RegistryState) -> Self {
        Self {
            state: Mutex::new(Some(state)),
            ..Self::default()
        }
    }

    /// Makes subsequent writes fail (or succeed again).
    pub fn fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    /// Number of successful writes so far.
    pub fn write_count(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    /// Copy of the last persisted state.
    pub fn snapshot(&self) -> Option<RegistryState> {
        self.state.lock().clone()
    }
}

impl RegistryStore for InMemoryStore {
    fn load(&self) -> Result<Option<LoadedState>, StoreError> {
        Ok(self.state.lock().clone().map(|state| LoadedState {
            state,
            upgraded_from: None,
        }))
    }

    fn persist(&self, state: &RegistryState) -> Result<(), StoreError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("writes disabled".to_string()));
        }
        *self.state.lock() = Some(state.clone());
        self.writes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}
