/*
 * Per-widget callback slots, one per `EventKind`. A slot is empty, holds a
 * client closure, or holds a class-specific default action installed at
 * creation. Client closures receive the toolkit mutably so they can create,
 * modify or destroy widgets from inside a notification.
 */
use crate::resources::MenuItemId;
use crate::toolkit::Toolkit;
use crate::types::{EventKind, WidgetEvent};
use crate::widget::WidgetClass;

use std::fmt;

pub type WidgetCallback = Box<dyn FnMut(&mut Toolkit, &WidgetEvent)>;
pub type MenuCallback = Box<dyn FnMut(&mut Toolkit, &MenuEvent)>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuEventKind {
    /// The item was chosen from the menu.
    Activated,
    /// The item's check mark changed, by activation or by radio-group exclusivity.
    CheckChanged(bool),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MenuEvent {
    pub item: MenuItemId,
    pub kind: MenuEventKind,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum DefaultAction {
    DestroyWidget,
}

pub(crate) enum Slot {
    Empty,
    Client(WidgetCallback),
    Default(DefaultAction),
}

impl fmt::Debug for Slot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Slot::Empty => write!(f, "Empty"),
            Slot::Client(_) => write!(f, "Client"),
            Slot::Default(action) => write!(f, "Default({action:?})"),
        }
    }
}

#[derive(Debug)]
pub(crate) struct CallbackSlots {
    slots: [Slot; EventKind::ALL.len()],
}

impl CallbackSlots {
    pub(crate) fn new() -> Self {
        Self {
            slots: std::array::from_fn(|_| Slot::Empty),
        }
    }

    pub(crate) fn set(&mut self, kind: EventKind, callback: WidgetCallback) {
        self.slots[kind.index()] = Slot::Client(callback);
    }

    /// Fills the still-empty slots with the class defaults; client callbacks win.
    pub(crate) fn install_defaults(&mut self, class: WidgetClass) {
        for kind in EventKind::ALL {
            if let Some(action) = default_action(class, kind)
                && matches!(self.slots[kind.index()], Slot::Empty)
            {
                self.slots[kind.index()] = Slot::Default(action);
            }
        }
    }

    pub(crate) fn take(&mut self, kind: EventKind) -> Slot {
        std::mem::replace(&mut self.slots[kind.index()], Slot::Empty)
    }

    /*
     * Puts a taken slot back unless the callback installed a replacement for
     * its own event kind while it was running.
     */
    pub(crate) fn restore(&mut self, kind: EventKind, slot: Slot) {
        let current = &mut self.slots[kind.index()];
        if matches!(current, Slot::Empty) {
            *current = slot;
        }
    }

    pub(crate) fn has_client(&self, kind: EventKind) -> bool {
        matches!(self.slots[kind.index()], Slot::Client(_))
    }

    pub(crate) fn default_for(&self, kind: EventKind) -> Option<DefaultAction> {
        match self.slots[kind.index()] {
            Slot::Default(action) => Some(action),
            _ => None,
        }
    }

    pub(crate) fn clear(&mut self) {
        for slot in &mut self.slots {
            *slot = Slot::Empty;
        }
    }
}

fn default_action(class: WidgetClass, kind: EventKind) -> Option<DefaultAction> {
    match (class, kind) {
        (WidgetClass::Window, EventKind::Close) => Some(DefaultAction::DestroyWidget),
        _ => None,
    }
}
