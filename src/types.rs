/*
 * Platform-agnostic identifiers and value types shared by the toolkit core and
 * the native backends. Nothing in here touches a native API, so the module is
 * compiled and tested on every target.
 */

/// Opaque, host-assigned identifier of a native window or control.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NativeHandle(pub isize);

impl NativeHandle {
    pub const NULL: NativeHandle = NativeHandle(0);

    pub fn is_null(self) -> bool {
        self.0 == 0
    }
}

/// Opaque identifier of a non-window native object (brush, font, menu, drawing surface).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NativeObject(pub isize);

/// Logical identifier of a widget wrapper. Stays valid as a key after the widget is
/// destroyed; every lookup through a destroyed id is a soft failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct WidgetId(pub(crate) u64);

impl WidgetId {
    pub fn raw(self) -> u64 {
        self.0
    }

    /// Child control identifier handed to the native layer (low word of WM_COMMAND).
    pub(crate) fn control_id(self) -> u16 {
        (self.0 & 0xFFFF) as u16
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Rect {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

impl Rect {
    pub const fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Shrinks the rectangle on every side, clamping the size at zero.
    pub fn inset(self, amount: i32) -> Rect {
        Rect {
            x: self.x + amount,
            y: self.y + amount,
            width: (self.width - 2 * amount).max(0),
            height: (self.height - 2 * amount).max(0),
        }
    }

    pub fn is_empty(self) -> bool {
        self.width <= 0 || self.height <= 0
    }
}

/// Event kinds a client can attach a callback to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    Click,
    DoubleClick,
    MouseEnter,
    MouseLeave,
    KeyDown,
    KeyUp,
    FocusGained,
    FocusLost,
    SelectionChanged,
    TextChanged,
    Close,
}

impl EventKind {
    pub const ALL: [EventKind; 11] = [
        EventKind::Click,
        EventKind::DoubleClick,
        EventKind::MouseEnter,
        EventKind::MouseLeave,
        EventKind::KeyDown,
        EventKind::KeyUp,
        EventKind::FocusGained,
        EventKind::FocusLost,
        EventKind::SelectionChanged,
        EventKind::TextChanged,
        EventKind::Close,
    ];

    pub(crate) fn index(self) -> usize {
        self as usize
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EventDetail {
    None,
    Key { code: u32 },
    Selection { index: i32 },
    Text(String),
    Checked(bool),
}

/// Payload handed to a widget callback.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WidgetEvent {
    pub widget: WidgetId,
    pub kind: EventKind,
    pub detail: EventDetail,
}

impl WidgetEvent {
    pub fn new(widget: WidgetId, kind: EventKind) -> Self {
        Self {
            widget,
            kind,
            detail: EventDetail::None,
        }
    }

    pub fn with_detail(mut self, detail: EventDetail) -> Self {
        self.detail = detail;
        self
    }
}

/// Process-level toolkit settings, supplied once when the toolkit is constructed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolkitConfig {
    /// Prefix for every native class name this toolkit registers.
    pub app_name: String,
    /// Post a quit request to the native loop once the handle registry empties.
    pub quit_when_last_widget_closes: bool,
}

impl ToolkitConfig {
    pub fn new(app_name: impl Into<String>) -> Self {
        Self {
            app_name: app_name.into(),
            quit_when_last_widget_closes: true,
        }
    }
}

impl Default for ToolkitConfig {
    fn default() -> Self {
        Self::new("DuctKit")
    }
}

/// Construction-time settings of a single widget.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WidgetConfig {
    pub text: String,
    pub rect: Rect,
    pub visible: bool,
    pub enabled: bool,
}

impl Default for WidgetConfig {
    fn default() -> Self {
        Self {
            text: String::new(),
            rect: Rect::new(0, 0, 100, 30),
            visible: true,
            enabled: true,
        }
    }
}

impl WidgetConfig {
    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = text.into();
        self
    }

    pub fn with_rect(mut self, rect: Rect) -> Self {
        self.rect = rect;
        self
    }

    pub fn hidden(mut self) -> Self {
        self.visible = false;
        self
    }

    pub fn disabled(mut self) -> Self {
        self.enabled = false;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rect_inset_clamps_at_zero() {
        let rect = Rect::new(10, 10, 4, 30);
        let inner = rect.inset(3);
        assert_eq!(inner, Rect::new(13, 13, 0, 24));
        assert!(inner.is_empty());
    }

    #[test]
    fn event_kind_indices_are_dense() {
        for (position, kind) in EventKind::ALL.iter().enumerate() {
            assert_eq!(kind.index(), position);
        }
    }

    #[test]
    fn control_id_uses_low_word() {
        assert_eq!(WidgetId(0x1_0005).control_id(), 5);
    }
}
