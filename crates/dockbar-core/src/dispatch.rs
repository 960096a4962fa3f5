//! Thread-affinity contract for the button manager.
//!
//! The manager is not synchronized. Instead of assuming an ambient UI thread,
//! it is handed a [`Dispatcher`] and refuses calls the dispatcher rejects.

use std::thread::{self, ThreadId};

/// Decides whether the current caller may touch the bar
pub trait Dispatcher {
    fn check_access(&self) -> bool;
}

/// Binds the bar to the thread that created it
#[derive(Debug, Clone)]
pub struct ThreadDispatcher {
    owner: ThreadId,
}

impl ThreadDispatcher {
    #[must_use]
    pub fn current() -> Self {
        Self {
            owner: thread::current().id(),
        }
    }
}

impl Default for ThreadDispatcher {
    fn default() -> Self {
        Self::current()
    }
}

impl Dispatcher for ThreadDispatcher {
    fn check_access(&self) -> bool {
        thread::current().id() == self.owner
    }
}

/// Accepts every caller. For drivers that already serialize access themselves.
#[derive(Debug, Clone, Copy, Default)]
pub struct AnyThread;

impl Dispatcher for AnyThread {
    fn check_access(&self) -> bool {
        true
    }
}
