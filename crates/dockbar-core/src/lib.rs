//! Button reconciliation engine for the dockbar taskbar.
//!
//! A driver that enumerates OS windows feeds each refresh tick into a
//! [`ButtonManager`]; the manager keeps the bar's buttons grouped, ordered,
//! and in sync with pinned applications, and reports changes as
//! [`BarUpdate`]s.

pub mod button;
pub mod config;
pub mod dispatch;
pub mod manager;

mod error;

#[cfg(test)]
mod tests;

pub use button::{Button, ButtonInfo, ButtonRef, PinnedButton, WindowButton};
pub use dispatch::{AnyThread, Dispatcher, ThreadDispatcher};
pub use error::{Error, Result};
pub use manager::{ButtonManager, Mode};

pub use dockbar_types::*;
