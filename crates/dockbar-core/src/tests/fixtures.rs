//! Test fixtures and helpers

use crate::button::{Button, ButtonRef, WindowButton};
use crate::config::TaskbarConfig;
use crate::manager::ButtonManager;
use dockbar_types::{BarUpdate, ButtonId, ChangeStatus, PinnedAppDescriptor, WindowHandle};
use std::collections::HashSet;
use tokio::sync::mpsc::UnboundedReceiver;

pub type Bar = ButtonManager;
pub type Updates = UnboundedReceiver<BarUpdate>;

/// Create a bar with default options
pub fn new_bar() -> (Bar, Updates) {
    ButtonManager::new(TaskbarConfig::default())
}

/// Create a bar that hides single-window apps
pub fn hiding_bar() -> (Bar, Updates) {
    ButtonManager::new(TaskbarConfig {
        hide_single_window_apps: true,
        ..Default::default()
    })
}

/// Window grouped by its executable
pub fn exe_window(handle: u64, exe: &str) -> WindowButton {
    WindowButton::new(
        WindowHandle(handle),
        u32::try_from(handle).unwrap_or(1),
        format!("{exe} #{handle}"),
        Some(exe.to_string()),
        None,
    )
}

/// Window grouped by its app id
pub fn app_window(handle: u64, app_id: &str) -> WindowButton {
    WindowButton::new(
        WindowHandle(handle),
        1,
        format!("{app_id} #{handle}"),
        Some("host.exe".to_string()),
        Some(app_id.to_string()),
    )
}

/// Pin grouped by its executable
pub fn exe_pin(exe: &str) -> PinnedAppDescriptor {
    PinnedAppDescriptor::new(exe.trim_end_matches(".exe")).with_executable(exe)
}

pub fn win(handle: u64) -> ButtonId {
    ButtonId::Window(WindowHandle(handle))
}

/// Run a full update cycle offering `windows` in order
pub fn run_update(bar: &mut Bar, windows: &[WindowButton]) -> bool {
    bar.begin_update().unwrap();
    for window in windows {
        bar.add(window.clone()).unwrap();
    }
    bar.end_update().unwrap()
}

/// Run a hard refresh with `pins` followed by `windows` in the same cycle
pub fn run_hard_refresh(
    bar: &mut Bar,
    pins: &[PinnedAppDescriptor],
    windows: &[WindowButton],
) -> bool {
    bar.begin_hard_refresh(pins).unwrap();
    for window in windows {
        bar.add(window.clone()).unwrap();
    }
    bar.end_update().unwrap()
}

/// Collect every update sent so far
pub fn drain(rx: &mut Updates) -> Vec<BarUpdate> {
    let mut updates = Vec::new();
    while let Ok(update) = rx.try_recv() {
        updates.push(update);
    }
    updates
}

/// Number of resets sent so far
pub fn count_resets(rx: &mut Updates) -> usize {
    drain(rx)
        .iter()
        .filter(|u| matches!(u, BarUpdate::Reset { .. }))
        .count()
}

/// Visible ids in display order
pub fn ids(bar: &Bar) -> Vec<ButtonId> {
    bar.buttons().map(|b| b.as_button().id()).collect()
}

/// Visible groups in display order
pub fn groups(bar: &Bar) -> Vec<String> {
    bar.buttons()
        .map(|b| b.as_button().group().to_string())
        .collect()
}

/// Check the invariants every completed transaction must uphold
pub fn assert_invariants(bar: &Bar) {
    let buttons: Vec<ButtonRef<'_>> = bar.buttons().collect();
    assert_eq!(buttons.len(), bar.len(), "every id must resolve to a button");

    for pair in buttons.windows(2) {
        let (a, b) = (pair[0].as_button(), pair[1].as_button());
        assert!(
            a.index() <= b.index(),
            "unsorted: {} ({}) before {} ({})",
            a.id(),
            a.index(),
            b.id(),
            b.index()
        );
    }

    let mut seen = HashSet::new();
    for button in &buttons {
        if let ButtonRef::Window(window) = button {
            assert_ne!(window.status, ChangeStatus::ToRemove, "stale window left");
            assert!(seen.insert(window.handle()), "duplicate handle");
            let held = bar.window(window.handle()).expect("handle map entry");
            assert_eq!(held.handle(), window.handle());
        }
    }
    assert_eq!(seen.len(), bar.window_count(), "handle map out of sync");
}
