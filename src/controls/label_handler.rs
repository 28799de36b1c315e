// Static text. Labels are created with click notifications enabled.
use crate::messages::MessageResponse;
use crate::toolkit::Toolkit;
use crate::types::{EventKind, WidgetEvent, WidgetId};

pub(crate) const STN_CLICKED: u16 = 0;
pub(crate) const STN_DBLCLK: u16 = 1;

pub(crate) fn handle_command(toolkit: &mut Toolkit, label: WidgetId, code: u16) -> MessageResponse {
    let kind = match code {
        STN_CLICKED => EventKind::Click,
        STN_DBLCLK => EventKind::DoubleClick,
        _ => return MessageResponse::Default,
    };
    toolkit.fire(WidgetEvent::new(label, kind));
    MessageResponse::Handled(0)
}
