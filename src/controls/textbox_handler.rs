/*
 * Single-line edit controls. The native control owns the text while the user
 * types; EN_CHANGE pulls it back into the widget and reports `TextChanged`.
 */
use crate::messages::MessageResponse;
use crate::toolkit::Toolkit;
use crate::types::{EventDetail, EventKind, WidgetEvent, WidgetId};

pub(crate) const EN_CHANGE: u16 = 0x0300;

pub(crate) fn handle_command(
    toolkit: &mut Toolkit,
    textbox: WidgetId,
    code: u16,
) -> MessageResponse {
    if code != EN_CHANGE {
        return MessageResponse::Default;
    }
    let Some(widget) = toolkit.widgets.get_mut(&textbox) else {
        return MessageResponse::Default;
    };
    let text = toolkit.backend.read_text(widget.handle).unwrap_or_default();
    if widget.text == text {
        return MessageResponse::Handled(0);
    }
    widget.text = text.clone();
    log::trace!("TextBoxHandler: {textbox:?} text changed.");
    toolkit.fire(
        WidgetEvent::new(textbox, EventKind::TextChanged).with_detail(EventDetail::Text(text)),
    );
    MessageResponse::Handled(0)
}
