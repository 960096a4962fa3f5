//! Button entities: live windows and pinned-application placeholders.
//!
//! Both kinds share [`ButtonInfo`] and the [`Button`] contract. Group and
//! index logic in the manager only ever goes through that contract.

use dockbar_types::{
    ButtonId, ButtonKind, ButtonSnapshot, ChangeStatus, PinnedAppDescriptor, WindowDescriptor,
    WindowHandle,
};

/// Multiplier separating group order from window order in [`Button::index`]
pub const GROUP_STRIDE: u64 = 1000;

/// Group used by pins that carry no identifying path at all
pub const UNKNOWN_GROUP: &str = "unknown";

/// State shared by every button kind
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ButtonInfo {
    pub title: String,
    executable: Option<String>,
    app_id: Option<String>,
    group: String,
    old_group: String,
    pub group_index: u32,
    pub window_index: u32,
}

impl ButtonInfo {
    fn new(title: String, executable: Option<String>, app_id: Option<String>) -> Self {
        Self {
            title,
            executable,
            app_id,
            ..Default::default()
        }
    }

    #[must_use]
    pub fn executable(&self) -> Option<&str> {
        self.executable.as_deref()
    }

    #[must_use]
    pub fn app_id(&self) -> Option<&str> {
        self.app_id.as_deref()
    }

    #[must_use]
    pub fn group(&self) -> &str {
        &self.group
    }

    /// Group held before the latest recomputation
    #[must_use]
    pub fn old_group(&self) -> &str {
        &self.old_group
    }

    fn compute_group(&self, fallback: impl FnOnce() -> String) -> String {
        non_empty(self.app_id.as_deref())
            .or_else(|| non_empty(self.executable.as_deref()))
            .map_or_else(fallback, str::to_string)
            .to_lowercase()
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.is_empty())
}

/// Common contract of window and pinned buttons
pub trait Button {
    fn info(&self) -> &ButtonInfo;
    fn info_mut(&mut self) -> &mut ButtonInfo;
    fn id(&self) -> ButtonId;
    fn kind(&self) -> ButtonKind;

    /// Group used when neither app id nor executable is set
    fn fallback_group(&self) -> String;

    fn group(&self) -> &str {
        self.info().group()
    }

    fn index(&self) -> u64 {
        let info = self.info();
        u64::from(info.group_index) * GROUP_STRIDE + u64::from(info.window_index)
    }

    fn set_indices(&mut self, group_index: u32, window_index: u32) {
        let info = self.info_mut();
        info.group_index = group_index;
        info.window_index = window_index;
    }

    /// Recompute the group, remembering the previous one.
    fn recompute_group(&mut self) {
        let fallback = self.fallback_group();
        let info = self.info_mut();
        let group = info.compute_group(|| fallback);
        info.old_group = std::mem::replace(&mut info.group, group);
    }

    /// Replace the app id. Returns `true` when the value actually changed.
    fn set_app_id(&mut self, app_id: Option<String>) -> bool {
        if self.info().app_id == app_id {
            return false;
        }
        self.info_mut().app_id = app_id;
        self.recompute_group();
        true
    }
}

/// A live OS window
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WindowButton {
    info: ButtonInfo,
    handle: WindowHandle,
    process_id: u32,
    pub status: ChangeStatus,
    group_by_process: bool,
}

impl WindowButton {
    #[must_use]
    pub fn new(
        handle: WindowHandle,
        process_id: u32,
        title: impl Into<String>,
        executable: Option<String>,
        app_id: Option<String>,
    ) -> Self {
        let mut window = Self {
            info: ButtonInfo::new(title.into(), executable, app_id),
            handle,
            process_id,
            status: ChangeStatus::New,
            group_by_process: true,
        };
        window.recompute_group();
        window
    }

    /// Group windows lacking app id and executable by handle instead of process.
    #[must_use]
    pub fn without_process_grouping(mut self) -> Self {
        self.group_by_process = false;
        self.recompute_group();
        self
    }

    #[must_use]
    pub fn handle(&self) -> WindowHandle {
        self.handle
    }

    #[must_use]
    pub fn process_id(&self) -> u32 {
        self.process_id
    }

    #[must_use]
    pub fn groups_by_process(&self) -> bool {
        self.group_by_process
    }

    /// Switch the fallback grouping of a held window, recomputing its group.
    pub(crate) fn set_group_by_process(&mut self, group_by_process: bool) {
        if self.group_by_process != group_by_process {
            self.group_by_process = group_by_process;
            self.recompute_group();
        }
    }
}

impl From<&WindowDescriptor> for WindowButton {
    fn from(desc: &WindowDescriptor) -> Self {
        Self::new(
            desc.handle,
            desc.process_id,
            desc.title.clone(),
            desc.executable.clone(),
            desc.app_id.clone(),
        )
    }
}

impl Button for WindowButton {
    fn info(&self) -> &ButtonInfo {
        &self.info
    }

    fn info_mut(&mut self) -> &mut ButtonInfo {
        &mut self.info
    }

    fn id(&self) -> ButtonId {
        ButtonId::Window(self.handle)
    }

    fn kind(&self) -> ButtonKind {
        ButtonKind::Window
    }

    fn fallback_group(&self) -> String {
        if self.group_by_process {
            self.process_id.to_string()
        } else {
            self.handle.to_string()
        }
    }
}

/// Placeholder for a pinned application that may not be running
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PinnedButton {
    info: ButtonInfo,
    pin_order: u32,
    link_target: Option<String>,
    package_app_id: Option<String>,
}

impl PinnedButton {
    /// Build a pin at position `pin_order`, seeding both indices from it.
    #[must_use]
    pub fn new(pin_order: u32, desc: &PinnedAppDescriptor) -> Self {
        let mut pin = Self {
            info: ButtonInfo::new(
                desc.title.clone(),
                desc.executable.clone(),
                desc.app_id.clone(),
            ),
            pin_order,
            link_target: desc.link_target.clone(),
            package_app_id: desc.package_app_id.clone(),
        };
        pin.recompute_group();
        pin.set_indices(pin_order, pin_order);
        pin
    }

    #[must_use]
    pub fn pin_order(&self) -> u32 {
        self.pin_order
    }
}

impl Button for PinnedButton {
    fn info(&self) -> &ButtonInfo {
        &self.info
    }

    fn info_mut(&mut self) -> &mut ButtonInfo {
        &mut self.info
    }

    fn id(&self) -> ButtonId {
        ButtonId::Pin(self.pin_order)
    }

    fn kind(&self) -> ButtonKind {
        ButtonKind::Pinned
    }

    fn fallback_group(&self) -> String {
        non_empty(self.link_target.as_deref())
            .or_else(|| non_empty(self.package_app_id.as_deref()))
            .unwrap_or(UNKNOWN_GROUP)
            .to_string()
    }
}

/// Borrowed view of either button kind, in display order
#[derive(Debug, Clone, Copy)]
pub enum ButtonRef<'a> {
    Window(&'a WindowButton),
    Pinned(&'a PinnedButton),
}

impl<'a> ButtonRef<'a> {
    #[must_use]
    pub fn as_button(&self) -> &'a dyn Button {
        match *self {
            ButtonRef::Window(w) => w,
            ButtonRef::Pinned(p) => p,
        }
    }

    #[must_use]
    pub fn status(&self) -> Option<ChangeStatus> {
        match self {
            ButtonRef::Window(w) => Some(w.status),
            ButtonRef::Pinned(_) => None,
        }
    }

    #[must_use]
    pub fn snapshot(&self) -> ButtonSnapshot {
        let button = self.as_button();
        let info = button.info();
        ButtonSnapshot {
            id: button.id(),
            kind: button.kind(),
            title: info.title.clone(),
            group: info.group().to_string(),
            group_index: info.group_index,
            window_index: info.window_index,
            index: button.index(),
            status: self.status(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_group_prefers_app_id() {
        let w = WindowButton::new(
            WindowHandle(1),
            42,
            "Doc",
            Some("C:\\Windows\\notepad.exe".to_string()),
            Some("Microsoft.Notepad".to_string()),
        );
        assert_eq!(w.group(), "microsoft.notepad");
    }

    #[test]
    fn test_group_falls_back_to_executable_then_process() {
        let w = WindowButton::new(
            WindowHandle(1),
            42,
            "Doc",
            Some("C:\\Tools\\Calc.EXE".to_string()),
            Some(String::new()),
        );
        assert_eq!(w.group(), "c:\\tools\\calc.exe");

        let w = WindowButton::new(WindowHandle(1), 42, "Doc", None, None);
        assert_eq!(w.group(), "42");
    }

    #[test]
    fn test_group_without_process_grouping_uses_handle() {
        let w = WindowButton::new(WindowHandle(0x2a), 42, "Doc", None, None)
            .without_process_grouping();
        assert_eq!(w.group(), "0x2a");

        let w = WindowButton::new(WindowHandle(0x2a), 42, "Doc", Some("x.exe".into()), None)
            .without_process_grouping();
        assert_eq!(w.group(), "x.exe");
    }

    #[test]
    fn test_pinned_fallbacks() {
        let pin = PinnedButton::new(0, &PinnedAppDescriptor::new("Link").with_link_target("C:\\A.lnk"));
        assert_eq!(pin.group(), "c:\\a.lnk");

        let desc = PinnedAppDescriptor {
            title: "Store".to_string(),
            package_app_id: Some("Contoso_abc!App".to_string()),
            ..Default::default()
        };
        assert_eq!(PinnedButton::new(1, &desc).group(), "contoso_abc!app");

        let pin = PinnedButton::new(2, &PinnedAppDescriptor::new("Nothing"));
        assert_eq!(pin.group(), UNKNOWN_GROUP);
    }

    #[test]
    fn test_pin_seeds_indices_from_order() {
        let pin = PinnedButton::new(3, &PinnedAppDescriptor::new("A").with_executable("a.exe"));
        assert_eq!(pin.info().group_index, 3);
        assert_eq!(pin.info().window_index, 3);
        assert_eq!(pin.index(), 3003);
        assert_eq!(pin.id(), ButtonId::Pin(3));
    }

    #[test]
    fn test_set_app_id_records_old_group() {
        let mut w = WindowButton::new(WindowHandle(1), 7, "x", Some("a.exe".into()), None);
        assert!(w.set_app_id(Some("Contoso.Mail".to_string())));
        assert_eq!(w.group(), "contoso.mail");
        assert_eq!(w.info().old_group(), "a.exe");

        assert!(!w.set_app_id(Some("Contoso.Mail".to_string())));
        assert_eq!(w.info().old_group(), "a.exe");

        assert!(w.set_app_id(None));
        assert_eq!(w.group(), "a.exe");
        assert_eq!(w.info().old_group(), "contoso.mail");
    }

    #[test]
    fn test_window_starts_new() {
        let w = WindowButton::new(WindowHandle(9), 1, "t", None, None);
        assert_eq!(w.status, ChangeStatus::New);
        assert_eq!(w.kind(), ButtonKind::Window);
        assert_eq!(w.index(), 0);
    }

    #[test]
    fn test_snapshot() {
        let mut w = WindowButton::new(WindowHandle(9), 1, "Title", Some("a.exe".into()), None);
        w.set_indices(2, 5);
        let snap = ButtonRef::Window(&w).snapshot();
        assert_eq!(snap.id, ButtonId::Window(WindowHandle(9)));
        assert_eq!(snap.index, 2005);
        assert_eq!(snap.group, "a.exe");
        assert_eq!(snap.status, Some(ChangeStatus::New));
    }
}
