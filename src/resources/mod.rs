/*
 * Shared decorators: borders, menus and menu items. Client code obtains them
 * through factory calls on the toolkit and attaches them to widgets (or to each
 * other, for menu structure); it never frees one directly. Lifetimes are
 * governed by the reference-counted pools in `pool`.
 *
 * `Decorators` coordinates the three pools. It is the only place that turns a
 * resource leaving its pool into native teardown, and the only place that
 * cascades across pools (a destroyed menu releases its items, a destroyed item
 * releases its submenu).
 */
pub mod border;
pub mod menu;
pub(crate) mod pool;

pub use border::{Border, BorderParams, BorderStyle};
pub use menu::{Menu, MenuItem, MenuItemParams, MenuParams};

use crate::backend::{NativeBackend, NativeMenuEntry};
use crate::error::{PlatformError, fatal};
use crate::types::{NativeHandle, WidgetId};
use pool::{AttachOutcome, SharedResourcePool};

use std::cmp::Ordering;
use std::collections::HashMap;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::marker::PhantomData;

/// Marker for types managed by a shared-resource pool.
pub trait SharedResource {
    /// Prefix used in log lines and debug output.
    const KIND: &'static str;
    /// Whether a committed resource may be attached to more than one slot.
    const EXCLUSIVE: bool;
}

/// Typed reference to a pooled decorator. Copyable; never owns the resource.
pub struct ResourceId<R> {
    raw: u64,
    _marker: PhantomData<fn() -> R>,
}

impl<R> ResourceId<R> {
    pub(crate) fn new(raw: u64) -> Self {
        Self {
            raw,
            _marker: PhantomData,
        }
    }

    pub fn raw(self) -> u64 {
        self.raw
    }
}

impl<R> Clone for ResourceId<R> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<R> Copy for ResourceId<R> {}

impl<R> PartialEq for ResourceId<R> {
    fn eq(&self, other: &Self) -> bool {
        self.raw == other.raw
    }
}

impl<R> Eq for ResourceId<R> {}

impl<R> Hash for ResourceId<R> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.raw.hash(state);
    }
}

impl<R> PartialOrd for ResourceId<R> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<R> Ord for ResourceId<R> {
    fn cmp(&self, other: &Self) -> Ordering {
        self.raw.cmp(&other.raw)
    }
}

impl<R: SharedResource> fmt::Debug for ResourceId<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}#{}", R::KIND, self.raw)
    }
}

pub type BorderId = ResourceId<Border>;
pub type MenuId = ResourceId<Menu>;
pub type MenuItemId = ResourceId<MenuItem>;

/// A logical place a decorator can be attached to. Each slot holds at most one resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub(crate) enum AttachmentSlot {
    ContentBorder(WidgetId),
    FocusBorder(WidgetId),
    MenuBar(WidgetId),
    MenuEntry { menu: MenuId, item: MenuItemId },
    Submenu(MenuItemId),
}

/// First command id handed to menu items; lower ids are left for child controls.
const FIRST_MENU_COMMAND_ID: u16 = 30000;

#[derive(Debug)]
pub(crate) struct Decorators {
    borders: SharedResourcePool<Border>,
    menus: SharedResourcePool<Menu>,
    items: SharedResourcePool<MenuItem>,
    next_command_id: u16,
    commands: HashMap<u16, MenuItemId>,
}

impl Default for Decorators {
    fn default() -> Self {
        Self {
            borders: SharedResourcePool::new(),
            menus: SharedResourcePool::new(),
            items: SharedResourcePool::new(),
            next_command_id: FIRST_MENU_COMMAND_ID,
            commands: HashMap::new(),
        }
    }
}

impl Decorators {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn borders(&self) -> &SharedResourcePool<Border> {
        &self.borders
    }

    pub(crate) fn menus(&self) -> &SharedResourcePool<Menu> {
        &self.menus
    }

    pub(crate) fn items(&self) -> &SharedResourcePool<MenuItem> {
        &self.items
    }

    // Borders

    pub(crate) fn create_border(
        &mut self,
        params: BorderParams,
        backend: &mut dyn NativeBackend,
    ) -> BorderId {
        self.borders.create(Border::manufacture(params, backend))
    }

    pub(crate) fn border_for(&self, slot: AttachmentSlot) -> Option<&Border> {
        self.borders
            .attached(slot)
            .and_then(|id| self.borders.get(id))
    }

    /// Returns `true` when `border` is the slot's attachment afterwards.
    pub(crate) fn attach_border(
        &mut self,
        slot: AttachmentSlot,
        border: Option<BorderId>,
        backend: &mut dyn NativeBackend,
    ) -> bool {
        match self.borders.attach(slot, border) {
            AttachOutcome::Attached { released } => {
                if let Some((_, old)) = released {
                    old.release(backend);
                }
                true
            }
            AttachOutcome::Unchanged => true,
            AttachOutcome::Rejected => false,
        }
    }

    /// Returns `true` if the slot held a border.
    pub(crate) fn release_border_slot(
        &mut self,
        slot: AttachmentSlot,
        backend: &mut dyn NativeBackend,
    ) -> bool {
        let held = self.borders.attached(slot).is_some();
        if let Some((_, border)) = self.borders.release_slot(slot) {
            border.release(backend);
        }
        held
    }

    // Menus

    pub(crate) fn create_menu(
        &mut self,
        params: MenuParams,
        backend: &mut dyn NativeBackend,
    ) -> MenuId {
        self.menus.create(Menu::manufacture(params, backend))
    }

    pub(crate) fn create_menu_item(&mut self, text: &str, params: MenuItemParams) -> MenuItemId {
        let command_id = self.allocate_command_id();
        let id = self
            .items
            .create(MenuItem::manufacture(text, command_id, params));
        self.commands.insert(command_id, id);
        id
    }

    /*
     * Next free command id at or above `FIRST_MENU_COMMAND_ID`. The counter
     * wraps around and skips ids still held by live items.
     */
    fn allocate_command_id(&mut self) -> u16 {
        let range = usize::from(u16::MAX - FIRST_MENU_COMMAND_ID) + 1;
        for _ in 0..range {
            let candidate = self.next_command_id;
            self.next_command_id = match candidate {
                u16::MAX => FIRST_MENU_COMMAND_ID,
                _ => candidate + 1,
            };
            if !self.commands.contains_key(&candidate) {
                return candidate;
            }
        }
        fatal(PlatformError::OperationFailed(format!(
            "all {range} menu command ids are in use"
        )))
    }

    pub(crate) fn item_for_command(&self, command_id: u16) -> Option<MenuItemId> {
        self.commands.get(&command_id).copied()
    }

    pub(crate) fn parent_menu(&self, item: MenuItemId) -> Option<MenuId> {
        match self.items.owner_of(item) {
            Some(AttachmentSlot::MenuEntry { menu, .. }) => Some(menu),
            _ => None,
        }
    }

    pub(crate) fn submenu_of(&self, item: MenuItemId) -> Option<MenuId> {
        self.menus.attached(AttachmentSlot::Submenu(item))
    }

    pub(crate) fn menu_bar_of(&self, widget: WidgetId) -> Option<MenuId> {
        self.menus.attached(AttachmentSlot::MenuBar(widget))
    }

    fn native_entry(&self, item_id: MenuItemId) -> Option<NativeMenuEntry<'_>> {
        let item = self.items.get(item_id)?;
        let submenu = self
            .submenu_of(item_id)
            .and_then(|menu| self.menus.get(menu))
            .map(|menu| menu.native());
        Some(NativeMenuEntry {
            command_id: item.command_id(),
            text: item.text(),
            checked: item.is_checked(),
            enabled: item.is_enabled(),
            submenu,
        })
    }

    /*
     * Appends `item` to `menu`. Items are exclusive: an item that already sits in
     * a menu (this one or another) is left where it is.
     */
    pub(crate) fn append_item(
        &mut self,
        menu_id: MenuId,
        item_id: MenuItemId,
        backend: &mut dyn NativeBackend,
    ) -> bool {
        let Some(menu) = self.menus.get(menu_id) else {
            log::warn!("Decorators: append_item on unknown {menu_id:?} ignored.");
            return false;
        };
        let radio = menu.is_radio();
        let radio_has_checked = radio
            && menu
                .items()
                .iter()
                .any(|other| self.items.get(*other).is_some_and(|i| i.is_checked()));

        let slot = AttachmentSlot::MenuEntry {
            menu: menu_id,
            item: item_id,
        };
        if !self.items.attach(slot, Some(item_id)).is_attached() {
            return false;
        }
        if radio_has_checked && let Some(item) = self.items.get_mut(item_id) {
            // Radio menus admit one checked item; the newcomer yields.
            item.set_checked(false);
        }
        if let Some(menu) = self.menus.get_mut(menu_id) {
            menu.push_item(item_id);
        }
        if let (Some(menu), Some(entry)) = (self.menus.get(menu_id), self.native_entry(item_id)) {
            backend.append_menu_item(menu.native(), &entry);
        }
        true
    }

    pub(crate) fn remove_item(
        &mut self,
        menu_id: MenuId,
        item_id: MenuItemId,
        backend: &mut dyn NativeBackend,
    ) -> bool {
        let Some(position) = self
            .menus
            .get(menu_id)
            .and_then(|menu| menu.position_of(item_id))
        else {
            return false;
        };
        if let Some(menu) = self.menus.get_mut(menu_id) {
            backend.remove_menu_item(menu.native(), position);
            menu.remove_item(item_id);
        }
        let slot = AttachmentSlot::MenuEntry {
            menu: menu_id,
            item: item_id,
        };
        if let Some((id, item)) = self.items.release_slot(slot) {
            self.dispose_item(id, item, backend);
        }
        true
    }

    /*
     * Replaces the submenu hanging off `item`. The native entry is rewritten to
     * point at the new submenu before the old one can be destroyed.
     */
    pub(crate) fn set_submenu(
        &mut self,
        item_id: MenuItemId,
        submenu: Option<MenuId>,
        backend: &mut dyn NativeBackend,
    ) -> bool {
        if self.items.get(item_id).is_none() {
            log::warn!("Decorators: set_submenu on unknown {item_id:?} ignored.");
            return false;
        }
        let slot = AttachmentSlot::Submenu(item_id);
        let released = match submenu {
            None => self.menus.release_slot(slot),
            Some(menu) => match self.menus.attach(slot, Some(menu)) {
                AttachOutcome::Attached { released } => released,
                AttachOutcome::Unchanged => return true,
                AttachOutcome::Rejected => return false,
            },
        };
        self.refresh_native_entry(item_id, backend);
        if let Some((id, menu)) = released {
            self.dispose_menu(id, menu, backend);
        }
        true
    }

    fn refresh_native_entry(&self, item_id: MenuItemId, backend: &mut dyn NativeBackend) {
        let Some(parent) = self.parent_menu(item_id).and_then(|id| self.menus.get(id)) else {
            return;
        };
        let Some(position) = parent.position_of(item_id) else {
            return;
        };
        if let Some(entry) = self.native_entry(item_id) {
            backend.modify_menu_item(parent.native(), position, &entry);
        }
    }

    /*
     * Attaches `menu` as the menu bar of the window behind `handle`. The native
     * window is pointed at the new menu (or at none) before the previous bar is
     * released, so the host never destroys a menu it still displays.
     */
    pub(crate) fn set_menu_bar(
        &mut self,
        widget: WidgetId,
        handle: NativeHandle,
        menu: Option<MenuId>,
        backend: &mut dyn NativeBackend,
    ) -> bool {
        let slot = AttachmentSlot::MenuBar(widget);
        let released = match menu {
            None => {
                backend.set_window_menu(handle, None);
                self.menus.release_slot(slot)
            }
            Some(menu_id) => match self.menus.attach(slot, Some(menu_id)) {
                AttachOutcome::Attached { released } => {
                    let native = self.menus.get(menu_id).map(|m| m.native());
                    backend.set_window_menu(handle, native);
                    released
                }
                AttachOutcome::Unchanged => return true,
                AttachOutcome::Rejected => return false,
            },
        };
        if let Some((id, old)) = released {
            self.dispose_menu(id, old, backend);
        }
        true
    }

    /*
     * Changes the check mark of `item`. In a radio menu, checking an item first
     * unchecks the previously checked sibling. Returns every item whose state
     * changed, in the order listeners should be notified.
     */
    pub(crate) fn set_check_state(
        &mut self,
        item_id: MenuItemId,
        checked: bool,
        backend: &mut dyn NativeBackend,
    ) -> Vec<(MenuItemId, bool)> {
        let Some(item) = self.items.get(item_id) else {
            log::warn!("Decorators: set_check_state on unknown {item_id:?} ignored.");
            return Vec::new();
        };
        if !item.is_checkable() {
            log::warn!("Decorators: {item_id:?} is not checkable; check state unchanged.");
            return Vec::new();
        }
        if item.is_checked() == checked {
            return Vec::new();
        }

        let mut changes = Vec::new();
        let parent = self.parent_menu(item_id);
        if checked
            && let Some(menu) = parent.and_then(|id| self.menus.get(id))
            && menu.is_radio()
        {
            let siblings: Vec<MenuItemId> = menu
                .items()
                .iter()
                .copied()
                .filter(|other| *other != item_id)
                .collect();
            for sibling in siblings {
                if self.items.get(sibling).is_some_and(|i| i.is_checked()) {
                    self.write_check(sibling, false, backend);
                    changes.push((sibling, false));
                }
            }
        }
        self.write_check(item_id, checked, backend);
        changes.push((item_id, checked));
        changes
    }

    fn write_check(&mut self, item_id: MenuItemId, checked: bool, backend: &mut dyn NativeBackend) {
        if let Some(item) = self.items.get_mut(item_id) {
            item.set_checked(checked);
        }
        let Some(parent) = self.parent_menu(item_id).and_then(|id| self.menus.get(id)) else {
            return;
        };
        if let Some(position) = parent.position_of(item_id) {
            backend.set_menu_item_checked(parent.native(), position, checked);
        }
    }

    /*
     * Default behavior of a menu command: checkable items toggle (radio items
     * can only be checked by activation). Returns the resulting state changes.
     */
    pub(crate) fn activate_item(
        &mut self,
        item_id: MenuItemId,
        backend: &mut dyn NativeBackend,
    ) -> Vec<(MenuItemId, bool)> {
        let Some(item) = self.items.get(item_id) else {
            return Vec::new();
        };
        if !item.is_checkable() {
            return Vec::new();
        }
        let radio = self
            .parent_menu(item_id)
            .and_then(|id| self.menus.get(id))
            .is_some_and(|menu| menu.is_radio());
        let target = if radio { true } else { !item.is_checked() };
        self.set_check_state(item_id, target, backend)
    }

    pub(crate) fn set_item_enabled(
        &mut self,
        item_id: MenuItemId,
        enabled: bool,
        backend: &mut dyn NativeBackend,
    ) {
        match self.items.get_mut(item_id) {
            Some(item) => item.set_enabled(enabled),
            None => return,
        }
        self.refresh_native_entry(item_id, backend);
    }

    /*
     * Releases every decorator slot of a widget being torn down. The window is
     * detached from its native menu first because destroying a native window
     * also destroys the menu it displays. Returns how many borders were released.
     */
    pub(crate) fn release_widget(
        &mut self,
        widget: WidgetId,
        handle: NativeHandle,
        backend: &mut dyn NativeBackend,
    ) -> usize {
        let mut released = 0;
        if self.release_border_slot(AttachmentSlot::ContentBorder(widget), backend) {
            released += 1;
        }
        if self.release_border_slot(AttachmentSlot::FocusBorder(widget), backend) {
            released += 1;
        }
        if self.menu_bar_of(widget).is_some() {
            self.set_menu_bar(widget, handle, None, backend);
        }
        released
    }

    pub(crate) fn clear_pending(&mut self, backend: &mut dyn NativeBackend) {
        for (_, border) in self.borders.clear_pending() {
            border.release(backend);
        }
        for (id, menu) in self.menus.clear_pending() {
            self.dispose_menu(id, menu, backend);
        }
        for (id, item) in self.items.clear_pending() {
            self.dispose_item(id, item, backend);
        }
    }

    pub(crate) fn clear_all(&mut self, backend: &mut dyn NativeBackend) {
        for (_, border) in self.borders.clear_all() {
            border.release(backend);
        }
        for (id, menu) in self.menus.clear_all() {
            self.dispose_menu(id, menu, backend);
        }
        for (id, item) in self.items.clear_all() {
            self.dispose_item(id, item, backend);
        }
    }

    fn dispose_menu(&mut self, id: MenuId, menu: Menu, backend: &mut dyn NativeBackend) {
        log::debug!("Decorators: Destroying {id:?} with {} item(s).", menu.items().len());
        let items = menu.items().to_vec();
        menu.release(backend);
        for item_id in items {
            let slot = AttachmentSlot::MenuEntry {
                menu: id,
                item: item_id,
            };
            if let Some((released_id, item)) = self.items.release_slot(slot) {
                self.dispose_item(released_id, item, backend);
            }
        }
    }

    fn dispose_item(&mut self, id: MenuItemId, item: MenuItem, backend: &mut dyn NativeBackend) {
        log::debug!("Decorators: Destroying {id:?} ('{}').", item.text());
        if self.commands.get(&item.command_id()) == Some(&id) {
            self.commands.remove(&item.command_id());
        }
        if let Some((submenu_id, submenu)) = self.menus.release_slot(AttachmentSlot::Submenu(id)) {
            self.dispose_menu(submenu_id, submenu, backend);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::headless::HeadlessBackend;
    use crate::styling::Color;

    fn flat() -> BorderParams {
        BorderParams::new(BorderStyle::Flat, Color::BLACK, 1)
    }

    #[test]
    fn border_native_brush_lives_exactly_as_long_as_the_border() {
        let mut backend = HeadlessBackend::new();
        let probe = backend.probe();
        let mut decorators = Decorators::new();
        let border = decorators.create_border(flat(), &mut backend);
        assert_eq!(probe.live_object_count(), 1);

        let slot = AttachmentSlot::ContentBorder(WidgetId(1));
        decorators.attach_border(slot, Some(border), &mut backend);
        decorators.release_border_slot(slot, &mut backend);

        assert_eq!(probe.live_object_count(), 0);
        assert!(!decorators.borders().check(border));
    }

    #[test]
    fn radio_menu_keeps_single_checked_item() {
        let mut backend = HeadlessBackend::new();
        let mut decorators = Decorators::new();
        let menu = decorators.create_menu(MenuParams::radio(), &mut backend);
        let items: Vec<_> = ["Low", "Medium", "High"]
            .iter()
            .map(|text| decorators.create_menu_item(text, MenuItemParams::checkable()))
            .collect();
        for item in &items {
            assert!(decorators.append_item(menu, *item, &mut backend));
        }

        decorators.set_check_state(items[0], true, &mut backend);
        let changes = decorators.set_check_state(items[2], true, &mut backend);

        assert_eq!(changes, vec![(items[0], false), (items[2], true)]);
        let checked: Vec<_> = items
            .iter()
            .filter(|id| decorators.items().get(**id).is_some_and(|i| i.is_checked()))
            .collect();
        assert_eq!(checked, vec![&items[2]]);
    }

    #[test]
    fn appending_checked_item_to_radio_menu_with_checked_item_unchecks_newcomer() {
        let mut backend = HeadlessBackend::new();
        let mut decorators = Decorators::new();
        let menu = decorators.create_menu(MenuParams::radio(), &mut backend);
        let first = decorators.create_menu_item("A", MenuItemParams::checkable().checked());
        let second = decorators.create_menu_item("B", MenuItemParams::checkable().checked());

        decorators.append_item(menu, first, &mut backend);
        decorators.append_item(menu, second, &mut backend);

        assert!(decorators.items().get(first).is_some_and(|i| i.is_checked()));
        assert!(!decorators.items().get(second).is_some_and(|i| i.is_checked()));
    }

    #[test]
    fn item_belongs_to_at_most_one_menu() {
        let mut backend = HeadlessBackend::new();
        let mut decorators = Decorators::new();
        let file = decorators.create_menu(MenuParams::popup(), &mut backend);
        let edit = decorators.create_menu(MenuParams::popup(), &mut backend);
        let item = decorators.create_menu_item("Open", MenuItemParams::default());

        assert!(decorators.append_item(file, item, &mut backend));
        assert!(!decorators.append_item(edit, item, &mut backend));
        assert_eq!(decorators.parent_menu(item), Some(file));
        assert!(decorators.menus().get(edit).is_some_and(|m| m.items().is_empty()));
    }

    #[test]
    fn destroying_menu_bar_cascades_to_items_and_submenus() {
        // Bar -> "File" -> submenu -> "Open"
        let mut backend = HeadlessBackend::new();
        let probe = backend.probe();
        let mut decorators = Decorators::new();
        let window = WidgetId(1);
        let handle = NativeHandle(0x100);
        let bar = decorators.create_menu(MenuParams::bar(), &mut backend);
        let file = decorators.create_menu_item("File", MenuItemParams::default());
        let file_menu = decorators.create_menu(MenuParams::popup(), &mut backend);
        let open = decorators.create_menu_item("Open", MenuItemParams::default());
        decorators.append_item(bar, file, &mut backend);
        decorators.set_submenu(file, Some(file_menu), &mut backend);
        decorators.append_item(file_menu, open, &mut backend);
        decorators.set_menu_bar(window, handle, Some(bar), &mut backend);
        let open_command = decorators.items().get(open).map(|i| i.command_id());
        assert_eq!(probe.live_menu_count(), 2);

        decorators.release_widget(window, handle, &mut backend);

        assert_eq!(probe.live_menu_count(), 0);
        assert_eq!(probe.window_menu(handle), None);
        assert!(!decorators.menus().check(bar));
        assert!(!decorators.menus().check(file_menu));
        assert!(decorators.items().get(open).is_none());
        assert_eq!(open_command.and_then(|c| decorators.item_for_command(c)), None);
        assert!(probe.stale_menu_frees().is_empty());
    }

    #[test]
    fn replacing_submenu_rewrites_native_entry_before_destroying_old() {
        let mut backend = HeadlessBackend::new();
        let probe = backend.probe();
        let mut decorators = Decorators::new();
        let bar = decorators.create_menu(MenuParams::bar(), &mut backend);
        let view = decorators.create_menu_item("View", MenuItemParams::default());
        let first = decorators.create_menu(MenuParams::popup(), &mut backend);
        let second = decorators.create_menu(MenuParams::popup(), &mut backend);
        decorators.append_item(bar, view, &mut backend);
        decorators.set_submenu(view, Some(first), &mut backend);

        decorators.set_submenu(view, Some(second), &mut backend);

        let bar_native = decorators.menus().get(bar).map(|m| m.native());
        let second_native = decorators.menus().get(second).map(|m| m.native());
        let entry = bar_native.and_then(|n| probe.menu_entries(n).into_iter().next());
        assert_eq!(entry.and_then(|e| e.submenu), second_native);
        assert!(!decorators.menus().check(first));
        assert!(decorators.menus().get(first).is_none());
        assert_eq!(probe.live_menu_count(), 2);
        assert!(probe.stale_menu_frees().is_empty());
    }

    #[test]
    fn clear_pending_destroys_abandoned_decorators_only() {
        let mut backend = HeadlessBackend::new();
        let probe = backend.probe();
        let mut decorators = Decorators::new();
        let used = decorators.create_border(flat(), &mut backend);
        decorators.create_border(flat(), &mut backend);
        decorators.create_menu(MenuParams::popup(), &mut backend);
        let slot = AttachmentSlot::FocusBorder(WidgetId(4));
        decorators.attach_border(slot, Some(used), &mut backend);

        decorators.clear_pending(&mut backend);

        assert_eq!(probe.live_object_count(), 1);
        assert_eq!(probe.live_menu_count(), 0);
        assert!(decorators.borders().check(used));
    }

    #[test]
    fn command_ids_wrap_around_past_live_items() {
        let mut backend = HeadlessBackend::new();
        let mut decorators = Decorators::new();
        let menu = decorators.create_menu(MenuParams::bar(), &mut backend);
        decorators.set_menu_bar(WidgetId(1), NativeHandle(0x100), Some(menu), &mut backend);
        let old = decorators.create_menu_item("Old", MenuItemParams::default());
        decorators.append_item(menu, old, &mut backend);
        for _ in 0..u16::MAX - FIRST_MENU_COMMAND_ID {
            decorators.create_menu_item("Filler", MenuItemParams::default());
        }
        decorators.clear_pending(&mut backend);

        let new = decorators.create_menu_item("New", MenuItemParams::default());
        decorators.append_item(menu, new, &mut backend);
        let new_command = decorators.items().get(new).map(|i| i.command_id());

        assert_eq!(decorators.item_for_command(FIRST_MENU_COMMAND_ID), Some(old));
        assert_eq!(new_command, Some(FIRST_MENU_COMMAND_ID + 1));
        decorators.remove_item(menu, old, &mut backend);
        assert_eq!(decorators.item_for_command(FIRST_MENU_COMMAND_ID), None);
        assert_eq!(new_command.and_then(|c| decorators.item_for_command(c)), Some(new));
    }

    #[test]
    fn activating_plain_checkable_item_toggles() {
        let mut backend = HeadlessBackend::new();
        let mut decorators = Decorators::new();
        let menu = decorators.create_menu(MenuParams::popup(), &mut backend);
        let wrap = decorators.create_menu_item("Word wrap", MenuItemParams::checkable());
        decorators.append_item(menu, wrap, &mut backend);

        assert_eq!(decorators.activate_item(wrap, &mut backend), vec![(wrap, true)]);
        assert_eq!(decorators.activate_item(wrap, &mut backend), vec![(wrap, false)]);
    }
}
