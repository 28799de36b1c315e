/*
 * Native message vocabulary understood by the router. The numeric codes are the
 * Win32 message identifiers; they are declared here rather than imported so that
 * the routing core can be compiled and exercised without the Win32 API.
 *
 * `MessageKind::classify` folds a raw `(message, param1, param2)` triple into the
 * small set of kinds the toolkit cares about. Everything else stays `Other` and is
 * handed back to default native processing.
 */

pub const WM_CREATE: u32 = 0x0001;
pub const WM_DESTROY: u32 = 0x0002;
pub const WM_MOVE: u32 = 0x0003;
pub const WM_SIZE: u32 = 0x0005;
pub const WM_SETFOCUS: u32 = 0x0007;
pub const WM_KILLFOCUS: u32 = 0x0008;
pub const WM_PAINT: u32 = 0x000F;
pub const WM_CLOSE: u32 = 0x0010;
pub const WM_ERASEBKGND: u32 = 0x0014;
pub const WM_NOTIFY: u32 = 0x004E;
pub const WM_NCCREATE: u32 = 0x0081;
pub const WM_NCDESTROY: u32 = 0x0082;
pub const WM_KEYDOWN: u32 = 0x0100;
pub const WM_KEYUP: u32 = 0x0101;
pub const WM_CHAR: u32 = 0x0102;
pub const WM_COMMAND: u32 = 0x0111;
pub const WM_TIMER: u32 = 0x0113;
pub const WM_MOUSEMOVE: u32 = 0x0200;
pub const WM_LBUTTONDOWN: u32 = 0x0201;
pub const WM_LBUTTONUP: u32 = 0x0202;
pub const WM_LBUTTONDBLCLK: u32 = 0x0203;
pub const WM_RBUTTONDOWN: u32 = 0x0204;
pub const WM_RBUTTONUP: u32 = 0x0205;
pub const WM_MOUSELEAVE: u32 = 0x02A3;

/// Value a handler returns to the native substrate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageResponse {
    /// The toolkit consumed the message; return this value to the host.
    Handled(isize),
    /// Forward to the host's default processing (or the pre-built control's own procedure).
    Default,
}

impl MessageResponse {
    pub fn is_default(self) -> bool {
        matches!(self, MessageResponse::Default)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MouseButton {
    Left,
    Right,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageKind {
    Create,
    Destroy,
    FinalDestroy,
    Close,
    Paint,
    EraseBackground,
    FocusGained,
    FocusLost,
    KeyDown { code: u32 },
    KeyUp { code: u32 },
    ButtonDown(MouseButton),
    ButtonUp(MouseButton),
    DoubleClick,
    MouseMove,
    MouseLeave,
    Notify,
    /// WM_COMMAND sent by a child control; `source` is the control's handle.
    ControlCommand { source: isize, code: u16 },
    /// WM_COMMAND from a menu item or accelerator.
    MenuCommand { command_id: u16 },
    Moved { x: i32, y: i32 },
    Resized { width: i32, height: i32 },
    Other(u32),
}

impl MessageKind {
    pub fn classify(msg: u32, param1: usize, param2: isize) -> MessageKind {
        match msg {
            WM_CREATE => MessageKind::Create,
            WM_DESTROY => MessageKind::Destroy,
            WM_NCDESTROY => MessageKind::FinalDestroy,
            WM_CLOSE => MessageKind::Close,
            WM_PAINT => MessageKind::Paint,
            WM_ERASEBKGND => MessageKind::EraseBackground,
            WM_SETFOCUS => MessageKind::FocusGained,
            WM_KILLFOCUS => MessageKind::FocusLost,
            WM_KEYDOWN => MessageKind::KeyDown {
                code: param1 as u32,
            },
            WM_KEYUP => MessageKind::KeyUp {
                code: param1 as u32,
            },
            WM_LBUTTONDOWN => MessageKind::ButtonDown(MouseButton::Left),
            WM_RBUTTONDOWN => MessageKind::ButtonDown(MouseButton::Right),
            WM_LBUTTONUP => MessageKind::ButtonUp(MouseButton::Left),
            WM_RBUTTONUP => MessageKind::ButtonUp(MouseButton::Right),
            WM_LBUTTONDBLCLK => MessageKind::DoubleClick,
            WM_MOUSEMOVE => MessageKind::MouseMove,
            WM_MOUSELEAVE => MessageKind::MouseLeave,
            WM_NOTIFY => MessageKind::Notify,
            WM_COMMAND if param2 != 0 => MessageKind::ControlCommand {
                source: param2,
                code: highord_from_param1(param1),
            },
            WM_COMMAND => MessageKind::MenuCommand {
                command_id: loword_from_param1(param1),
            },
            WM_MOVE => MessageKind::Moved {
                x: signed_loword_from_param2(param2),
                y: signed_hiword_from_param2(param2),
            },
            WM_SIZE => MessageKind::Resized {
                width: loword_from_param2(param2) as i32,
                height: hiword_from_param2(param2) as i32,
            },
            other => MessageKind::Other(other),
        }
    }

    /*
     * The fixed set of kinds the leaf-control interception layer redirects to the
     * generic per-widget handler. Anything outside it goes straight back to the
     * pre-built control without reaching the widget.
     */
    pub fn is_structural(self) -> bool {
        matches!(
            self,
            MessageKind::FocusGained
                | MessageKind::FocusLost
                | MessageKind::Paint
                | MessageKind::Notify
                | MessageKind::Destroy
                | MessageKind::FinalDestroy
                | MessageKind::KeyDown { .. }
                | MessageKind::KeyUp { .. }
                | MessageKind::ButtonDown(_)
                | MessageKind::ButtonUp(_)
                | MessageKind::DoubleClick
                | MessageKind::MouseMove
                | MessageKind::MouseLeave
        )
    }
}

#[inline]
pub fn loword_from_param1(param1: usize) -> u16 {
    (param1 & 0xFFFF) as u16
}

#[inline]
pub fn highord_from_param1(param1: usize) -> u16 {
    ((param1 >> 16) & 0xFFFF) as u16
}

#[inline]
pub fn loword_from_param2(param2: isize) -> u16 {
    (param2 & 0xFFFF) as u16
}

#[inline]
pub fn hiword_from_param2(param2: isize) -> u16 {
    ((param2 >> 16) & 0xFFFF) as u16
}

#[inline]
fn signed_loword_from_param2(param2: isize) -> i32 {
    loword_from_param2(param2) as i16 as i32
}

#[inline]
fn signed_hiword_from_param2(param2: isize) -> i32 {
    hiword_from_param2(param2) as i16 as i32
}

/// Packs two 16-bit values the way the host packs coordinates into `param2`.
pub fn make_param2(low: u16, high: u16) -> isize {
    (((high as u32) << 16) | low as u32) as isize
}

/// Packs a WM_COMMAND `param1` from a control id and a notification code.
pub fn make_command_param1(id: u16, code: u16) -> usize {
    ((code as usize) << 16) | id as usize
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn command_with_source_is_a_control_notification() {
        let kind = MessageKind::classify(WM_COMMAND, make_command_param1(12, 0x0300), 0x4242);
        assert_eq!(
            kind,
            MessageKind::ControlCommand {
                source: 0x4242,
                code: 0x0300
            }
        );
    }

    #[test]
    fn command_without_source_is_a_menu_command() {
        let kind = MessageKind::classify(WM_COMMAND, make_command_param1(30001, 0), 0);
        assert_eq!(kind, MessageKind::MenuCommand { command_id: 30001 });
    }

    #[test]
    fn size_and_move_unpack_coordinates() {
        assert_eq!(
            MessageKind::classify(WM_SIZE, 0, make_param2(640, 480)),
            MessageKind::Resized {
                width: 640,
                height: 480
            }
        );
        assert_eq!(
            MessageKind::classify(WM_MOVE, 0, make_param2((-5i16) as u16, 20)),
            MessageKind::Moved { x: -5, y: 20 }
        );
    }

    #[test]
    fn structural_set_matches_interception_contract() {
        assert!(MessageKind::classify(WM_SETFOCUS, 0, 0).is_structural());
        assert!(MessageKind::classify(WM_KILLFOCUS, 0, 0).is_structural());
        assert!(MessageKind::classify(WM_PAINT, 0, 0).is_structural());
        assert!(MessageKind::classify(WM_NOTIFY, 0, 0).is_structural());
        assert!(MessageKind::classify(WM_DESTROY, 0, 0).is_structural());
        assert!(MessageKind::classify(WM_KEYDOWN, 0x41, 0).is_structural());
        assert!(MessageKind::classify(WM_LBUTTONUP, 0, 0).is_structural());
        assert!(MessageKind::classify(WM_MOUSEMOVE, 0, 0).is_structural());
        assert!(MessageKind::classify(WM_MOUSELEAVE, 0, 0).is_structural());

        assert!(!MessageKind::classify(WM_CHAR, 0x41, 0).is_structural());
        assert!(!MessageKind::classify(WM_TIMER, 1, 0).is_structural());
        assert!(!MessageKind::classify(WM_CLOSE, 0, 0).is_structural());
        assert!(!MessageKind::classify(WM_SIZE, 0, 0).is_structural());
    }
}
