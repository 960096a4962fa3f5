//! Placement, eviction, pin substitution and regrouping.

use super::ButtonManager;
use crate::button::{Button, WindowButton};
use crate::dispatch::Dispatcher;
use dockbar_types::{BarUpdate, ButtonId, ButtonProperty, ChangeStatus, WindowHandle};
use std::collections::HashMap;
use tracing::debug;

/// Deferred consequence of a button mutation, applied at a reconcile pass
#[derive(Debug, Clone, PartialEq, Eq)]
pub(super) enum Intent {
    /// A window's group changed away from `old_group`
    GroupChanged { id: ButtonId, old_group: String },
    /// Re-sort by the indices currently assigned
    Reorder,
}

impl<D: Dispatcher> ButtonManager<D> {
    fn group_of(&self, id: ButtonId) -> &str {
        self.button_ref(id).map_or("", |b| b.as_button().group())
    }

    fn index_of(&self, id: ButtonId) -> u64 {
        self.button_ref(id).map_or(u64::MAX, |b| b.as_button().index())
    }

    fn position(&self, id: ButtonId) -> Option<usize> {
        self.order.iter().position(|other| *other == id)
    }

    /// Pin order of the configured pin for `group`, visible or not
    fn pin_for_group(&self, group: &str) -> Option<u32> {
        self.pinned
            .iter()
            .find(|pin| pin.group() == group)
            .map(|pin| pin.pin_order())
    }

    /// Configured pin for `group` that is currently out of the sequence
    fn hidden_pin_for_group(&self, group: &str) -> Option<u32> {
        self.pin_for_group(group)
            .filter(|order| !self.order.contains(&ButtonId::Pin(*order)))
    }

    /// Slot of the visible pin for `group`
    fn visible_pin_position(&self, group: &str) -> Option<(usize, u32)> {
        self.order.iter().enumerate().find_map(|(pos, id)| match id {
            ButtonId::Pin(order) if self.group_of(*id) == group => Some((pos, *order)),
            _ => None,
        })
    }

    fn pin_group_index(&self, order: u32) -> u32 {
        self.pinned
            .get(order as usize)
            .map_or(0, |pin| pin.info().group_index)
    }

    pub(super) fn place_new(&mut self, mut window: WindowButton) {
        let handle = window.handle();
        let id = ButtonId::Window(handle);
        let group = window.group().to_string();

        let last_within_group = self
            .order
            .iter()
            .rposition(|other| self.group_of(*other) == group);

        match last_within_group {
            None => self.order.push(id),
            Some(last) => {
                if let Some((slot, pin)) = self.visible_pin_position(&group) {
                    window.info_mut().group_index = self.pin_group_index(pin);
                    self.order[slot] = id;
                    debug!("Window {handle} replaces pin #{pin} of group {group}");
                } else {
                    self.order.insert(last + 1, id);
                }
            }
        }
        self.windows.insert(handle, window);
    }

    /// Refresh a window the driver reported again during this cycle.
    pub(super) fn reconfirm(&mut self, fresh: &WindowButton) {
        let handle = fresh.handle();
        let Some(window) = self.windows.get_mut(&handle) else {
            return;
        };

        let previous_group = window.group().to_string();
        let mut changes = Vec::new();
        if window.info().title != fresh.info().title {
            window.info_mut().title.clone_from(&fresh.info().title);
            changes.push(ButtonProperty::Title);
        }
        if window.set_app_id(fresh.info().app_id().map(str::to_string)) {
            changes.push(ButtonProperty::AppId);
        }
        // Follows a `groupByProcess` toggle made since the window was placed
        window.set_group_by_process(fresh.groups_by_process());
        let old_group = (window.group() != previous_group).then_some(previous_group);

        // A window added twice in its first cycle stays new
        if window.status != ChangeStatus::New {
            window.status = if changes.is_empty() {
                ChangeStatus::Keep
            } else {
                ChangeStatus::Changed
            };
        }

        let id = ButtonId::Window(handle);
        for property in changes {
            self.emit(BarUpdate::ButtonChanged { id, property });
        }
        if let Some(old_group) = old_group {
            self.queue_group_change(id, old_group);
        }
    }

    /// Queue a group change, keeping the oldest pending one per button so a
    /// change that is reverted within a cycle cancels out.
    pub(super) fn queue_group_change(&mut self, id: ButtonId, old_group: String) {
        let pending = self
            .intents
            .iter()
            .any(|intent| matches!(intent, Intent::GroupChanged { id: other, .. } if *other == id));
        if !pending {
            self.intents
                .push_back(Intent::GroupChanged { id, old_group });
        }
    }

    pub(super) fn drain_intents(&mut self) {
        while let Some(intent) = self.intents.pop_front() {
            match intent {
                Intent::GroupChanged { id, old_group } => self.apply_group_change(id, &old_group),
                Intent::Reorder => {
                    self.sort_by_index();
                    self.dirty = true;
                }
            }
        }
    }

    fn apply_group_change(&mut self, id: ButtonId, old_group: &str) {
        // Hidden or evicted since the change was queued
        let Some(own) = self.position(id) else {
            return;
        };
        let new_group = self.group_of(id).to_string();
        if new_group == old_group {
            return;
        }

        let old_group_vacated = !self.order.iter().any(|other| self.group_of(*other) == old_group);
        if old_group_vacated && let Some(pin) = self.hidden_pin_for_group(old_group) {
            let (group_index, window_index) = self.button_ref(id).map_or((0, 0), |b| {
                let info = b.as_button().info();
                (info.group_index, info.window_index)
            });
            if let Some(button) = self.button_mut(ButtonId::Pin(pin)) {
                button.set_indices(group_index, window_index);
            }
            self.order.insert(own, ButtonId::Pin(pin));
            debug!("Pin #{pin} restored for vacated group {old_group}");
        }

        if let Some((slot, pin)) = self.visible_pin_position(&new_group) {
            let group_index = self.pin_group_index(pin);
            if let Some(button) = self.button_mut(id) {
                button.info_mut().group_index = group_index;
            }
            if let Some(own) = self.position(id) {
                self.order[slot] = id;
                self.order.remove(own);
            }
            debug!("{id} replaces pin #{pin} of group {new_group}");
        }

        self.needs_regroup = true;
        self.dirty = true;
    }

    pub(super) fn has_new_windows(&self) -> bool {
        self.windows
            .values()
            .any(|window| window.status == ChangeStatus::New)
    }

    /// Drop groups made of one live window and no pin from the bar.
    pub(super) fn hide_single_window_apps(&mut self) {
        let mut live: HashMap<&str, Vec<WindowHandle>> = HashMap::new();
        for window in self.windows.values() {
            if window.status != ChangeStatus::ToRemove {
                live.entry(window.group()).or_default().push(window.handle());
            }
        }

        let lonely: Vec<WindowHandle> = live
            .into_iter()
            .filter(|(group, handles)| handles.len() == 1 && self.pin_for_group(group).is_none())
            .map(|(_, handles)| handles[0])
            .collect();

        for handle in lonely {
            self.order.retain(|id| *id != ButtonId::Window(handle));
            if let Some(window) = self.windows.remove(&handle)
                && window.status != ChangeStatus::New
            {
                self.dirty = true;
            }
        }
    }

    /// Remove windows that were not re-confirmed, restoring their pin when
    /// they were the last of their group.
    pub(super) fn evict_stale(&mut self) {
        let stale: Vec<WindowHandle> = self
            .order
            .iter()
            .filter_map(|id| match id {
                ButtonId::Window(handle)
                    if self
                        .windows
                        .get(handle)
                        .is_some_and(|w| w.status == ChangeStatus::ToRemove) =>
                {
                    Some(*handle)
                }
                _ => None,
            })
            .collect();

        for handle in stale {
            let id = ButtonId::Window(handle);
            let Some(window) = self.windows.remove(&handle) else {
                continue;
            };
            let Some(pos) = self.position(id) else {
                continue;
            };

            let group = window.group();
            let last_of_group = !self
                .order
                .iter()
                .any(|other| *other != id && self.group_of(*other) == group);
            let pin = if last_of_group {
                self.hidden_pin_for_group(group)
            } else {
                None
            };

            if let Some(pin) = pin {
                let info = window.info();
                if let Some(button) = self.button_mut(ButtonId::Pin(pin)) {
                    button.set_indices(info.group_index, info.window_index);
                }
                self.order[pos] = ButtonId::Pin(pin);
                debug!("Window {handle} gone, pin #{pin} takes its place");
            } else {
                self.order.remove(pos);
                debug!("Window {handle} evicted");
            }
            self.dirty = true;
        }
    }

    /// Order groups by first appearance and re-index every button from its
    /// current position, then sort.
    pub(super) fn regroup(&mut self) {
        let mut first_seen: HashMap<&str, usize> = HashMap::new();
        for (pos, id) in self.order.iter().enumerate() {
            first_seen.entry(self.group_of(*id)).or_insert(pos);
        }

        let mut groups: Vec<(usize, &str)> = first_seen
            .into_iter()
            .map(|(group, pos)| (pos, group))
            .collect();
        groups.sort_unstable();

        // Positions and group counts are bounded by the number of buttons
        #[allow(clippy::cast_possible_truncation)]
        let rank: HashMap<String, u32> = groups
            .into_iter()
            .enumerate()
            .map(|(rank, (_, group))| (group.to_string(), rank as u32))
            .collect();

        #[allow(clippy::cast_possible_truncation)]
        let assignments: Vec<(ButtonId, u32, u32)> = self
            .order
            .iter()
            .enumerate()
            .map(|(pos, id)| {
                let group_index = rank.get(self.group_of(*id)).copied().unwrap_or_default();
                (*id, group_index, pos as u32)
            })
            .collect();

        for (id, group_index, window_index) in assignments {
            if let Some(button) = self.button_mut(id) {
                button.set_indices(group_index, window_index);
            }
        }

        self.sort_by_index();
        debug!("Regrouped {} buttons into {} groups", self.order.len(), rank.len());
    }

    /// Stable sort of the sequence by each button's current index.
    pub(super) fn sort_by_index(&mut self) {
        let mut order = std::mem::take(&mut self.order);
        order.sort_by_key(|id| self.index_of(*id));
        self.order = order;
    }

    /// Apply queued intents outside a transaction.
    pub(super) fn reconcile_idle(&mut self) {
        self.dirty = false;
        self.needs_regroup = false;
        self.drain_intents();
        if self.needs_regroup {
            self.regroup();
        }
        self.finish_pass();
    }

    /// Send one reset if anything visible changed, and clear the flags.
    pub(super) fn finish_pass(&mut self) -> bool {
        let dirty = self.dirty;
        if dirty {
            let buttons = self.snapshot();
            self.emit(BarUpdate::Reset { buttons });
        }
        self.dirty = false;
        self.needs_regroup = false;
        dirty
    }
}
