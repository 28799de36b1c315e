/*
 * The widget wrapper: one per native window or control. Widgets live in the
 * toolkit's arena keyed by `WidgetId`; the parent link is a plain id (never
 * owning) while the child list is owning, in the sense that destroying a
 * widget destroys everything in it.
 *
 * Decorators are referenced by id only. Until the widget exists natively they
 * are staged here and attached when `Toolkit::create` runs.
 */
use crate::animation::Animator;
use crate::callbacks::CallbackSlots;
use crate::resources::{BorderId, MenuId};
use crate::styling::{Color, Palette};
use crate::types::{NativeHandle, NativeObject, Rect, WidgetConfig, WidgetId};

use bitflags::bitflags;

/// Class tag used for capability dispatch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum WidgetClass {
    Window,
    Frame,
    Image,
    Button,
    CheckBox,
    RadioButton,
    TextBox,
    ListBox,
    Label,
}

impl WidgetClass {
    pub fn name(self) -> &'static str {
        match self {
            WidgetClass::Window => "Window",
            WidgetClass::Frame => "Frame",
            WidgetClass::Image => "Image",
            WidgetClass::Button => "Button",
            WidgetClass::CheckBox => "CheckBox",
            WidgetClass::RadioButton => "RadioButton",
            WidgetClass::TextBox => "TextBox",
            WidgetClass::ListBox => "ListBox",
            WidgetClass::Label => "Label",
        }
    }

    pub fn is_window(self) -> bool {
        self == WidgetClass::Window
    }

    /// Pre-built host controls; their input is only observable through interception.
    pub fn is_leaf_control(self) -> bool {
        matches!(
            self,
            WidgetClass::Button
                | WidgetClass::CheckBox
                | WidgetClass::RadioButton
                | WidgetClass::TextBox
                | WidgetClass::ListBox
                | WidgetClass::Label
        )
    }

    /// Owner-drawn sub-elements: must be created under an existing parent.
    pub fn requires_parent(self) -> bool {
        !self.is_window()
    }

    /// Classes the toolkit paints itself through a retained drawing surface.
    pub fn owns_surface(self) -> bool {
        matches!(
            self,
            WidgetClass::Window | WidgetClass::Frame | WidgetClass::Image
        )
    }

    pub fn is_checkable(self) -> bool {
        matches!(self, WidgetClass::CheckBox | WidgetClass::RadioButton)
    }

    pub(crate) fn default_palette(self) -> Palette {
        match self {
            WidgetClass::Window | WidgetClass::Frame => Palette::default(),
            WidgetClass::Image => Palette::new(Color::BLACK, Color::BLACK, Color::WHITE),
            WidgetClass::TextBox | WidgetClass::ListBox => {
                Palette::new(Color::WHITE, Color::WHITE, Color::BLACK)
            }
            WidgetClass::Button | WidgetClass::CheckBox | WidgetClass::RadioButton => Palette::new(
                Color::rgb(0xE1, 0xE1, 0xE1),
                Color::rgb(0xE5, 0xF1, 0xFB),
                Color::BLACK,
            ),
            WidgetClass::Label => Palette::default(),
        }
    }
}

bitflags! {
    /// Per-widget state bits.
    #[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct WidgetFlags: u16 {
        /// A native handle has been allocated and registered.
        const EXISTS = 1 << 0;
        const VISIBLE = 1 << 1;
        /// Client preference; the effective state for windows also depends on modal children.
        const ENABLED = 1 << 2;
        /// Effective non-interactive state.
        const INERT = 1 << 3;
        const MODAL = 1 << 4;
        const HOVER = 1 << 5;
        const FOCUS = 1 << 6;
        /// Left button went down inside the widget and has not been released.
        const CLICK = 1 << 7;
        const TEARING_DOWN = 1 << 8;
    }
}

impl std::fmt::Debug for WidgetFlags {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        bitflags::parser::to_writer(self, f)
    }
}

#[derive(Debug, Default)]
pub(crate) enum ClassData {
    #[default]
    None,
    Check {
        checked: bool,
    },
    List {
        items: Vec<String>,
        selected: i32,
    },
    Image {
        animator: Option<Animator>,
    },
}

impl ClassData {
    fn for_class(class: WidgetClass) -> Self {
        match class {
            WidgetClass::CheckBox | WidgetClass::RadioButton => ClassData::Check { checked: false },
            WidgetClass::ListBox => ClassData::List {
                items: Vec::new(),
                selected: -1,
            },
            WidgetClass::Image => ClassData::Image { animator: None },
            _ => ClassData::None,
        }
    }
}

/// Decorators requested before the widget existed natively.
#[derive(Debug, Default, Clone, Copy)]
pub(crate) struct StagedDecorations {
    pub(crate) border: Option<BorderId>,
    pub(crate) focus_border: Option<BorderId>,
    pub(crate) menu_bar: Option<MenuId>,
}

#[derive(Debug)]
pub struct Widget {
    pub(crate) id: WidgetId,
    pub(crate) class: WidgetClass,
    pub(crate) handle: NativeHandle,
    pub(crate) parent: Option<WidgetId>,
    pub(crate) children: Vec<WidgetId>,
    pub(crate) flags: WidgetFlags,
    pub(crate) rect: Rect,
    pub(crate) text: String,
    pub(crate) palette: Palette,
    pub(crate) surface: Option<NativeObject>,
    pub(crate) draw_rect: Rect,
    pub(crate) font: Option<NativeObject>,
    pub(crate) staged: StagedDecorations,
    pub(crate) data: ClassData,
    pub(crate) callbacks: CallbackSlots,
}

impl Widget {
    pub(crate) fn new(
        id: WidgetId,
        class: WidgetClass,
        parent: Option<WidgetId>,
        config: WidgetConfig,
    ) -> Self {
        let mut flags = WidgetFlags::empty();
        flags.set(WidgetFlags::VISIBLE, config.visible);
        flags.set(WidgetFlags::ENABLED, config.enabled);
        flags.set(WidgetFlags::INERT, !config.enabled);
        Self {
            id,
            class,
            handle: NativeHandle::NULL,
            parent,
            children: Vec::new(),
            flags,
            rect: config.rect,
            text: config.text,
            palette: class.default_palette(),
            surface: None,
            draw_rect: Rect::default(),
            font: None,
            staged: StagedDecorations::default(),
            data: ClassData::for_class(class),
            callbacks: CallbackSlots::new(),
        }
    }

    pub fn id(&self) -> WidgetId {
        self.id
    }

    pub fn class(&self) -> WidgetClass {
        self.class
    }

    /// `NativeHandle::NULL` until the widget has been created.
    pub fn handle(&self) -> NativeHandle {
        self.handle
    }

    pub fn parent(&self) -> Option<WidgetId> {
        self.parent
    }

    pub fn children(&self) -> &[WidgetId] {
        &self.children
    }

    pub fn flags(&self) -> WidgetFlags {
        self.flags
    }

    pub fn exists(&self) -> bool {
        self.flags.contains(WidgetFlags::EXISTS)
    }

    pub fn is_visible(&self) -> bool {
        self.flags.contains(WidgetFlags::VISIBLE)
    }

    pub fn is_inert(&self) -> bool {
        self.flags.contains(WidgetFlags::INERT)
    }

    pub fn is_modal(&self) -> bool {
        self.flags.contains(WidgetFlags::MODAL)
    }

    pub fn is_hovered(&self) -> bool {
        self.flags.contains(WidgetFlags::HOVER)
    }

    pub fn has_focus(&self) -> bool {
        self.flags.contains(WidgetFlags::FOCUS)
    }

    pub fn rect(&self) -> Rect {
        self.rect
    }

    pub fn draw_rect(&self) -> Rect {
        self.draw_rect
    }

    pub fn palette(&self) -> Palette {
        self.palette
    }

    pub fn surface(&self) -> Option<NativeObject> {
        self.surface
    }

    pub fn font(&self) -> Option<NativeObject> {
        self.font
    }

    pub(crate) fn is_tearing_down(&self) -> bool {
        self.flags.contains(WidgetFlags::TEARING_DOWN)
    }

    pub(crate) fn checked(&self) -> Option<bool> {
        match self.data {
            ClassData::Check { checked } => Some(checked),
            _ => None,
        }
    }

    pub(crate) fn animator_mut(&mut self) -> Option<&mut Option<Animator>> {
        match &mut self.data {
            ClassData::Image { animator } => Some(animator),
            _ => None,
        }
    }
}
