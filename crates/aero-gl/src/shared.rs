//! Construction-time choice of how a [`GlState`] is owned.
//!
//! The legacy API's state belongs to one context that is normally driven from one thread. When
//! several threads share a context, the whole store goes behind one exclusive lock; there is
//! no finer-grained locking. In both modes the [`DirtyTracker`] sits in an `Arc` outside the
//! lock so a thread can poll the dirty mask without taking it.

use std::sync::{Arc, Mutex, MutexGuard};

use crate::config::{StateConfig, ThreadingMode};
use crate::dirty::{DirtyTracker, StateMask};
use crate::state::GlState;

/// A [`GlState`] behind one exclusive lock.
#[derive(Debug)]
pub struct SharedGlState {
    state: Mutex<GlState>,
    tracker: Arc<DirtyTracker>,
}

impl SharedGlState {
    pub fn new(config: &StateConfig) -> Self {
        let tracker = Arc::new(DirtyTracker::new());
        Self {
            state: Mutex::new(GlState::with_tracker(config, Arc::clone(&tracker))),
            tracker,
        }
    }

    pub fn lock(&self) -> MutexGuard<'_, GlState> {
        self.state.lock().expect("gl state lock poisoned")
    }

    /// Run `f` with the lock held.
    pub fn with<R>(&self, f: impl FnOnce(&mut GlState) -> R) -> R {
        f(&mut self.lock())
    }

    /// Lock-free view of the dirty mask. A set bit may be cleared by the lock holder at any
    /// moment, so this is only a hint.
    pub fn tracker(&self) -> &Arc<DirtyTracker> {
        &self.tracker
    }

    pub fn into_inner(self) -> GlState {
        self.state
            .into_inner()
            .expect("gl state lock poisoned")
    }
}

/// Either an exclusively owned store or a shared one, picked from
/// [`StateConfig::threading`].
#[derive(Debug)]
pub enum StateStore {
    SingleThreaded(GlState),
    Locked(SharedGlState),
}

impl StateStore {
    pub fn new(config: &StateConfig) -> Self {
        match config.threading {
            ThreadingMode::SingleThreaded => Self::SingleThreaded(GlState::new(config)),
            ThreadingMode::Locked => Self::Locked(SharedGlState::new(config)),
        }
    }

    pub fn threading_mode(&self) -> ThreadingMode {
        match self {
            Self::SingleThreaded(_) => ThreadingMode::SingleThreaded,
            Self::Locked(_) => ThreadingMode::Locked,
        }
    }

    pub fn with<R>(&mut self, f: impl FnOnce(&mut GlState) -> R) -> R {
        match self {
            Self::SingleThreaded(state) => f(state),
            Self::Locked(shared) => shared.with(f),
        }
    }

    pub fn tracker(&self) -> &Arc<DirtyTracker> {
        match self {
            Self::SingleThreaded(state) => state.tracker(),
            Self::Locked(shared) => shared.tracker(),
        }
    }

    pub fn dirty(&self) -> StateMask {
        self.tracker().all()
    }
}
