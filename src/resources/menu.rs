/*
 * Menu and menu item decorators. Both are exclusive: an item sits in at most
 * one menu, and a menu hangs off at most one owner (a window's menu bar or an
 * item's submenu). The tree links themselves are pool attachment slots; a menu
 * only remembers the display order of its items.
 */
use super::{MenuItemId, SharedResource};
use crate::backend::NativeBackend;
use crate::types::NativeObject;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MenuParams {
    /// Checking one item unchecks the others.
    pub radio: bool,
    /// Drop-down menu, as opposed to a window's menu bar.
    pub popup: bool,
}

impl MenuParams {
    pub fn bar() -> Self {
        Self {
            radio: false,
            popup: false,
        }
    }

    pub fn popup() -> Self {
        Self {
            radio: false,
            popup: true,
        }
    }

    pub fn radio() -> Self {
        Self {
            radio: true,
            popup: true,
        }
    }
}

#[derive(Debug)]
pub struct Menu {
    native: NativeObject,
    params: MenuParams,
    items: Vec<MenuItemId>,
}

impl SharedResource for Menu {
    const KIND: &'static str = "Menu";
    const EXCLUSIVE: bool = true;
}

impl Menu {
    pub(super) fn manufacture(params: MenuParams, backend: &mut dyn NativeBackend) -> Self {
        Self {
            native: backend.create_menu(params.popup),
            params,
            items: Vec::new(),
        }
    }

    pub(super) fn release(self, backend: &mut dyn NativeBackend) {
        backend.destroy_menu(self.native);
    }

    pub(super) fn push_item(&mut self, item: MenuItemId) {
        self.items.push(item);
    }

    pub(super) fn remove_item(&mut self, item: MenuItemId) {
        self.items.retain(|other| *other != item);
    }

    pub fn native(&self) -> NativeObject {
        self.native
    }

    pub fn is_radio(&self) -> bool {
        self.params.radio
    }

    pub fn is_popup(&self) -> bool {
        self.params.popup
    }

    pub fn items(&self) -> &[MenuItemId] {
        &self.items
    }

    pub fn position_of(&self, item: MenuItemId) -> Option<usize> {
        self.items.iter().position(|other| *other == item)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MenuItemParams {
    pub checkable: bool,
    pub checked: bool,
    pub enabled: bool,
}

impl Default for MenuItemParams {
    fn default() -> Self {
        Self {
            checkable: false,
            checked: false,
            enabled: true,
        }
    }
}

impl MenuItemParams {
    pub fn checkable() -> Self {
        Self {
            checkable: true,
            ..Self::default()
        }
    }

    pub fn checked(mut self) -> Self {
        self.checkable = true;
        self.checked = true;
        self
    }

    pub fn disabled(mut self) -> Self {
        self.enabled = false;
        self
    }
}

#[derive(Debug)]
pub struct MenuItem {
    text: String,
    command_id: u16,
    checkable: bool,
    checked: bool,
    enabled: bool,
}

impl SharedResource for MenuItem {
    const KIND: &'static str = "MenuItem";
    const EXCLUSIVE: bool = true;
}

impl MenuItem {
    pub(super) fn manufacture(text: &str, command_id: u16, params: MenuItemParams) -> Self {
        Self {
            text: text.to_string(),
            command_id,
            checkable: params.checkable,
            checked: params.checkable && params.checked,
            enabled: params.enabled,
        }
    }

    pub(super) fn set_checked(&mut self, checked: bool) {
        self.checked = checked;
    }

    pub(super) fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    /// Identifier delivered in the native menu command notification.
    pub fn command_id(&self) -> u16 {
        self.command_id
    }

    pub fn is_checkable(&self) -> bool {
        self.checkable
    }

    pub fn is_checked(&self) -> bool {
        self.checked
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }
}
