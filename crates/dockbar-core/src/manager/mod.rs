//! The button collection manager.
//!
//! An external driver runs one transaction per refresh tick:
//! [`ButtonManager::begin_update`] (or [`ButtonManager::begin_hard_refresh`]),
//! one [`ButtonManager::add`] per live window, then [`ButtonManager::end_update`].
//! The manager reconciles that enumeration against the buttons already shown,
//! substitutes pins in and out, regroups, and reports to the UI through an
//! unbounded channel of [`BarUpdate`]s.

mod reconcile;

use crate::button::{Button, ButtonRef, PinnedButton, WindowButton};
use crate::config::TaskbarConfig;
use crate::dispatch::{Dispatcher, ThreadDispatcher};
use crate::{Error, Result};
use dockbar_types::{
    BarUpdate, ButtonId, ButtonProperty, ButtonSnapshot, ChangeStatus, PinnedAppDescriptor,
    WindowHandle,
};
use reconcile::Intent;
use std::collections::{HashMap, VecDeque};
use std::fmt;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tracing::{debug, info};

/// Transaction state of the manager
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Mode {
    #[default]
    Idle,
    Update,
    HardRefresh,
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Mode::Idle => "idle",
            Mode::Update => "updating",
            Mode::HardRefresh => "hard refreshing",
        };
        f.write_str(name)
    }
}

/// Owns every button of the bar and keeps them ordered
pub struct ButtonManager<D: Dispatcher = ThreadDispatcher> {
    settings: TaskbarConfig,
    dispatcher: D,

    /// Visible buttons in display order
    order: Vec<ButtonId>,

    /// Every window in `order`, by handle
    windows: HashMap<WindowHandle, WindowButton>,

    /// Last hard-refreshed pins; `pinned[i]` has pin order `i`
    pinned: Vec<PinnedButton>,

    mode: Mode,
    intents: VecDeque<Intent>,
    dirty: bool,
    needs_regroup: bool,

    /// Channel to send updates to UI
    update_tx: UnboundedSender<BarUpdate>,
}

impl ButtonManager<ThreadDispatcher> {
    /// Create a manager bound to the calling thread.
    /// Returns the manager and a receiver for updates.
    #[must_use]
    pub fn new(settings: TaskbarConfig) -> (Self, UnboundedReceiver<BarUpdate>) {
        Self::with_dispatcher(settings, ThreadDispatcher::current())
    }
}

impl<D: Dispatcher> ButtonManager<D> {
    #[must_use]
    pub fn with_dispatcher(
        settings: TaskbarConfig,
        dispatcher: D,
    ) -> (Self, UnboundedReceiver<BarUpdate>) {
        let (update_tx, update_rx) = mpsc::unbounded_channel();
        let manager = Self {
            settings,
            dispatcher,
            order: Vec::new(),
            windows: HashMap::new(),
            pinned: Vec::new(),
            mode: Mode::Idle,
            intents: VecDeque::new(),
            dirty: false,
            needs_regroup: false,
            update_tx,
        };
        (manager, update_rx)
    }

    #[must_use]
    pub fn mode(&self) -> Mode {
        self.mode
    }

    #[must_use]
    pub fn settings(&self) -> &TaskbarConfig {
        &self.settings
    }

    /// Replace the options; they take effect at the next `end_update`.
    ///
    /// # Errors
    ///
    /// Returns `WrongThread` when called off the owning thread.
    pub fn set_settings(&mut self, settings: TaskbarConfig) -> Result<()> {
        self.verify_access()?;
        self.settings = settings;
        Ok(())
    }

    /// Start a regular refresh cycle.
    ///
    /// Every held window is speculatively marked `ToRemove`; windows the driver
    /// adds again during this cycle are re-confirmed.
    ///
    /// # Errors
    ///
    /// Returns `InvalidState` if a transaction is already open.
    pub fn begin_update(&mut self) -> Result<()> {
        self.verify_access()?;
        self.require_idle("begin_update")?;

        self.mode = Mode::Update;
        for window in self.windows.values_mut() {
            window.status = ChangeStatus::ToRemove;
        }
        self.dirty = false;
        self.needs_regroup = false;
        debug!("Update started with {} buttons", self.order.len());
        Ok(())
    }

    /// Start a cycle that discards all windows and rebuilds from pins.
    ///
    /// # Errors
    ///
    /// Returns `InvalidState` if a transaction is already open.
    pub fn begin_hard_refresh(&mut self, pinned_apps: &[PinnedAppDescriptor]) -> Result<()> {
        self.verify_access()?;
        self.require_idle("begin_hard_refresh")?;

        self.mode = Mode::HardRefresh;
        self.order.clear();
        self.windows.clear();
        self.intents.clear();

        // Pin orders are config positions; a bar never holds 2^32 pins
        #[allow(clippy::cast_possible_truncation)]
        let pinned: Vec<PinnedButton> = pinned_apps
            .iter()
            .enumerate()
            .map(|(i, desc)| PinnedButton::new(i as u32, desc))
            .collect();
        self.order.extend(pinned.iter().map(Button::id));
        self.pinned = pinned;

        self.dirty = true;
        self.needs_regroup = false;
        info!("Hard refresh with {} pinned apps", self.pinned.len());
        Ok(())
    }

    /// Offer a live window to the current cycle.
    ///
    /// A handle that is already held is re-confirmed in place; a new one is
    /// placed next to its group, substituting the group's pin when visible.
    ///
    /// # Errors
    ///
    /// Returns `InvalidState` outside a transaction and `InvalidArgument`
    /// for the null handle.
    pub fn add(&mut self, window: WindowButton) -> Result<()> {
        self.verify_access()?;
        self.require_active("add")?;
        if window.handle().is_null() {
            return Err(Error::InvalidArgument("window handle is null".into()));
        }

        let window = if self.settings.group_by_process {
            window
        } else {
            window.without_process_grouping()
        };

        if self.windows.contains_key(&window.handle()) {
            self.reconfirm(&window);
        } else {
            self.place_new(window);
        }
        Ok(())
    }

    /// Close the cycle: drain intents, hide single-window apps, evict stale
    /// windows, regroup, and notify.
    ///
    /// Returns whether a reset was sent to the UI.
    ///
    /// # Errors
    ///
    /// Returns `InvalidState` outside a transaction.
    pub fn end_update(&mut self) -> Result<bool> {
        self.verify_access()?;
        self.require_active("end_update")?;

        self.drain_intents();

        if self.settings.hide_single_window_apps {
            self.hide_single_window_apps();
        }

        if self.has_new_windows() {
            self.needs_regroup = true;
            self.dirty = true;
        }

        self.evict_stale();

        if self.needs_regroup {
            self.regroup();
            self.dirty = true;
        }

        let notified = self.finish_pass();
        self.mode = Mode::Idle;
        debug!(
            "Update finished: {} buttons, {} windows, notified={notified}",
            self.order.len(),
            self.windows.len()
        );
        Ok(notified)
    }

    /// Change a window's title.
    ///
    /// # Errors
    ///
    /// Returns `UnknownButton` when the handle is not held.
    pub fn set_title(&mut self, handle: WindowHandle, title: impl Into<String>) -> Result<()> {
        self.verify_access()?;
        let in_cycle = self.mode != Mode::Idle;
        let window = self
            .windows
            .get_mut(&handle)
            .ok_or(Error::UnknownButton(ButtonId::Window(handle)))?;

        let title = title.into();
        if window.info().title == title {
            return Ok(());
        }
        window.info_mut().title = title;
        if in_cycle && window.status == ChangeStatus::Keep {
            window.status = ChangeStatus::Changed;
        }
        self.emit(BarUpdate::ButtonChanged {
            id: ButtonId::Window(handle),
            property: ButtonProperty::Title,
        });
        Ok(())
    }

    /// Change a window's application user model id, moving it between groups.
    ///
    /// Pin repairs for the group it leaves and the group it enters are queued
    /// and applied at the end of the cycle, or right away when idle.
    ///
    /// # Errors
    ///
    /// Returns `UnknownButton` when the handle is not held.
    pub fn set_app_id(&mut self, handle: WindowHandle, app_id: Option<String>) -> Result<()> {
        self.verify_access()?;
        let in_cycle = self.mode != Mode::Idle;
        let window = self
            .windows
            .get_mut(&handle)
            .ok_or(Error::UnknownButton(ButtonId::Window(handle)))?;

        if !window.set_app_id(app_id) {
            return Ok(());
        }
        if in_cycle && window.status == ChangeStatus::Keep {
            window.status = ChangeStatus::Changed;
        }
        let old_group = window.info().old_group().to_string();
        let id = ButtonId::Window(handle);

        self.emit(BarUpdate::ButtonChanged {
            id,
            property: ButtonProperty::AppId,
        });
        self.queue_group_change(id, old_group);
        if !in_cycle {
            self.reconcile_idle();
        }
        Ok(())
    }

    /// Assign explicit indices to a button, as drag-and-drop does.
    ///
    /// The bar is re-sorted right away when idle, or at `end_update` inside
    /// a transaction.
    ///
    /// # Errors
    ///
    /// Returns `UnknownButton` when the button is not held.
    pub fn set_indices(&mut self, id: ButtonId, group_index: u32, window_index: u32) -> Result<()> {
        self.verify_access()?;
        let button = self.button_mut(id).ok_or(Error::UnknownButton(id))?;
        button.set_indices(group_index, window_index);
        self.emit(BarUpdate::ButtonChanged {
            id,
            property: ButtonProperty::Index,
        });
        self.force_reorder()
    }

    /// Re-sort every visible button by its current index, trusting the
    /// indices verbatim. Inside a transaction this is deferred to `end_update`.
    ///
    /// # Errors
    ///
    /// Returns `WrongThread` when called off the owning thread.
    pub fn force_reorder(&mut self) -> Result<()> {
        self.verify_access()?;
        self.intents.push_back(Intent::Reorder);
        if self.mode == Mode::Idle {
            self.reconcile_idle();
        }
        Ok(())
    }

    /// Look up a held window
    #[must_use]
    pub fn window(&self, handle: WindowHandle) -> Option<&WindowButton> {
        self.windows.get(&handle)
    }

    #[must_use]
    pub fn window_count(&self) -> usize {
        self.windows.len()
    }

    /// Pins from the last hard refresh, visible or not
    #[must_use]
    pub fn pinned_apps(&self) -> &[PinnedButton] {
        &self.pinned
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.order.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Visible buttons in display order
    pub fn buttons(&self) -> impl Iterator<Item = ButtonRef<'_>> + '_ {
        self.order.iter().filter_map(|id| self.button_ref(*id))
    }

    #[must_use]
    pub fn snapshot(&self) -> Vec<ButtonSnapshot> {
        self.buttons().map(|b| b.snapshot()).collect()
    }

    fn verify_access(&self) -> Result<()> {
        if self.dispatcher.check_access() {
            Ok(())
        } else {
            Err(Error::WrongThread)
        }
    }

    fn require_idle(&self, operation: &'static str) -> Result<()> {
        if self.mode == Mode::Idle {
            Ok(())
        } else {
            Err(Error::InvalidState {
                operation,
                mode: self.mode,
            })
        }
    }

    fn require_active(&self, operation: &'static str) -> Result<()> {
        if self.mode == Mode::Idle {
            Err(Error::InvalidState {
                operation,
                mode: self.mode,
            })
        } else {
            Ok(())
        }
    }

    fn button_ref(&self, id: ButtonId) -> Option<ButtonRef<'_>> {
        match id {
            ButtonId::Window(handle) => self.windows.get(&handle).map(ButtonRef::Window),
            ButtonId::Pin(order) => self.pinned.get(order as usize).map(ButtonRef::Pinned),
        }
    }

    fn button_mut(&mut self, id: ButtonId) -> Option<&mut dyn Button> {
        match id {
            ButtonId::Window(handle) => self
                .windows
                .get_mut(&handle)
                .map(|w| w as &mut dyn Button),
            ButtonId::Pin(order) => self
                .pinned
                .get_mut(order as usize)
                .map(|p| p as &mut dyn Button),
        }
    }

    fn emit(&self, update: BarUpdate) {
        if self.update_tx.send(update).is_err() {
            debug!("Update receiver dropped, discarding bar update");
        }
    }
}
