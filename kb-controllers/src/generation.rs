//! Generation-tagged view state.
//!
//! A [`ViewCell`] couples a controller's view state with a monotonically
//! increasing generation. Starting an operation bumps the generation and
//! hands out a [`Ticket`]; a response may only touch the state while its
//! ticket is still the latest one. The check and the write happen under the
//! same lock, so a newer operation can never be overwritten by an older
//! response.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// Tag of an issued request; compared against the cell's current generation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Ticket(u64);

impl Ticket {
    pub fn value(self) -> u64 {
        self.0
    }
}

/// Result of a controller operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dispatch {
    /// A request was issued and its outcome was written to the view.
    Applied,
    /// A request was issued but a newer operation superseded it; the outcome was dropped.
    Stale,
    /// No request was issued (empty input, busy, closed, not authenticated).
    Skipped,
}

#[derive(Debug)]
struct Versioned<T> {
    generation: u64,
    state: T,
}

/// Shared, generation-tagged view state. Clones share the same state.
#[derive(Debug)]
pub struct ViewCell<T> {
    inner: Arc<Mutex<Versioned<T>>>,
}

impl<T> Clone for ViewCell<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<T: Default> Default for ViewCell<T> {
    fn default() -> Self {
        Self::new(T::default())
    }
}

impl<T> ViewCell<T> {
    pub fn new(state: T) -> Self {
        Self {
            inner: Arc::new(Mutex::new(Versioned {
                generation: 0,
                state,
            })),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Versioned<T>> {
        // View state stays usable even if a writer panicked mid-update.
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Clones the current view state.
    pub fn snapshot(&self) -> T
    where
        T: Clone,
    {
        self.lock().state.clone()
    }

    /// Reads the state without cloning it.
    pub fn read<R>(&self, f: impl FnOnce(&T) -> R) -> R {
        f(&self.lock().state)
    }

    /// Mutates the state without touching the generation.
    pub fn update<R>(&self, f: impl FnOnce(&mut T) -> R) -> R {
        f(&mut self.lock().state)
    }

    /// Starts a new operation: bumps the generation, then mutates the state.
    pub fn begin(&self, f: impl FnOnce(&mut T)) -> Ticket {
        let mut guard = self.lock();
        guard.generation += 1;
        f(&mut guard.state);
        Ticket(guard.generation)
    }

    /// Like [`ViewCell::begin`], but only when `ready` accepts the current state.
    pub fn try_begin(
        &self,
        ready: impl FnOnce(&T) -> bool,
        f: impl FnOnce(&mut T),
    ) -> Option<Ticket> {
        let mut guard = self.lock();
        if !ready(&guard.state) {
            return None;
        }
        guard.generation += 1;
        f(&mut guard.state);
        Some(Ticket(guard.generation))
    }

    /// Ticket for the current generation without starting a new one.
    pub fn current(&self) -> Ticket {
        Ticket(self.lock().generation)
    }

    /// Applies `f` only if `ticket` is still the latest generation.
    pub fn apply<R>(&self, ticket: Ticket, f: impl FnOnce(&mut T) -> R) -> Option<R> {
        let mut guard = self.lock();
        if guard.generation != ticket.0 {
            return None;
        }
        Some(f(&mut guard.state))
    }

    /// Drops every outstanding ticket and mutates the state.
    pub fn invalidate(&self, f: impl FnOnce(&mut T)) {
        let mut guard = self.lock();
        guard.generation += 1;
        f(&mut guard.state);
    }
}
