//! Shared types for dockbar components.
//!
//! This crate provides the types used across dockbar-core and dockbar-cli.
//! All types are serializable so that UI updates and recorded window
//! enumerations can cross a process boundary.

use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

/// Deserialize a Vec that may be null or missing (both become empty vec)
///
/// # Errors
///
/// Returns the deserializer's error when the value is neither null nor a list.
pub fn deserialize_null_as_empty_vec<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    let opt: Option<Vec<T>> = Option::deserialize(deserializer)?;
    Ok(opt.unwrap_or_default())
}

/// Opaque OS window identifier.
///
/// `0` is the null handle and is never accepted by the engine.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct WindowHandle(pub u64);

impl WindowHandle {
    pub const NULL: WindowHandle = WindowHandle(0);

    #[must_use]
    pub fn is_null(self) -> bool {
        self.0 == 0
    }
}

impl fmt::Display for WindowHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#x}", self.0)
    }
}

/// Identity of a button in the bar.
///
/// Windows are keyed by their OS handle, pins by their position in the
/// pinned-apps configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "id", rename_all = "snake_case")]
pub enum ButtonId {
    Window(WindowHandle),
    Pin(u32),
}

impl fmt::Display for ButtonId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ButtonId::Window(handle) => write!(f, "window {handle}"),
            ButtonId::Pin(order) => write!(f, "pin #{order}"),
        }
    }
}

/// Which flavour of button an entity is
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ButtonKind {
    Window,
    Pinned,
}

/// Per-cycle reconciliation state of a window button.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChangeStatus {
    /// First seen during the current cycle
    #[default]
    New,
    /// Re-confirmed with no visible change
    Keep,
    /// Re-confirmed with a changed title or app id
    Changed,
    /// Not re-confirmed yet; evicted at the end of the cycle unless added again
    ToRemove,
}

/// Button property whose change is reported to the UI
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ButtonProperty {
    Title,
    AppId,
    Index,
}

/// Render-ready view of one button
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ButtonSnapshot {
    pub id: ButtonId,
    pub kind: ButtonKind,
    pub title: String,
    pub group: String,
    pub group_index: u32,
    pub window_index: u32,
    pub index: u64,

    /// Only present for window buttons
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<ChangeStatus>,
}

/// Updates sent from the engine to the UI
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum BarUpdate {
    /// The visible collection changed; full replacement in display order
    Reset { buttons: Vec<ButtonSnapshot> },

    /// A single property of one button changed
    ButtonChanged {
        id: ButtonId,
        property: ButtonProperty,
    },
}

/// A pinned application as stored in configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PinnedAppDescriptor {
    pub title: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub executable: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub app_id: Option<String>,

    /// Target path of the shortcut the pin was created from
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub link_target: Option<String>,

    /// Package application id for packaged (store) apps
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub package_app_id: Option<String>,
}

impl PinnedAppDescriptor {
    #[must_use]
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Default::default()
        }
    }

    #[must_use]
    pub fn with_executable(mut self, executable: impl Into<String>) -> Self {
        self.executable = Some(executable.into());
        self
    }

    #[must_use]
    pub fn with_app_id(mut self, app_id: impl Into<String>) -> Self {
        self.app_id = Some(app_id.into());
        self
    }

    #[must_use]
    pub fn with_link_target(mut self, link_target: impl Into<String>) -> Self {
        self.link_target = Some(link_target.into());
        self
    }
}

/// One live window as reported by an enumeration pass
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WindowDescriptor {
    pub handle: WindowHandle,

    #[serde(default)]
    pub process_id: u32,

    #[serde(default)]
    pub title: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub executable: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub app_id: Option<String>,
}

/// A recorded sequence of driver calls, replayed by the CLI
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Scenario {
    #[serde(default, deserialize_with = "deserialize_null_as_empty_vec")]
    pub steps: Vec<Step>,
}

/// One step of a [`Scenario`]
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case", rename_all_fields = "camelCase")]
pub enum Step {
    /// Rebuild from pins, then add the given windows in the same cycle.
    /// Pins fall back to the configured list when absent.
    HardRefresh {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        pinned_apps: Option<Vec<PinnedAppDescriptor>>,
        #[serde(default, deserialize_with = "deserialize_null_as_empty_vec")]
        windows: Vec<WindowDescriptor>,
    },

    /// Regular refresh tick: every live window, in enumeration order
    Update {
        #[serde(default, deserialize_with = "deserialize_null_as_empty_vec")]
        windows: Vec<WindowDescriptor>,
    },

    /// A window changed its application user model id
    SetAppId {
        handle: WindowHandle,
        #[serde(default)]
        app_id: Option<String>,
    },

    /// Drag-and-drop assigned explicit indices to a button
    SetIndices {
        id: ButtonId,
        group_index: u32,
        window_index: u32,
    },

    /// Re-sort by the indices currently assigned
    ForceReorder,
}
