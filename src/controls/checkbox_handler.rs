/*
 * Check boxes. The native control is created without automatic toggling, so
 * the toolkit's check state is authoritative: a click flips it, writes it back
 * to the control and then reports a `Click` carrying the new state.
 *
 * `write_checked` and `sync` also serve radio buttons, which share the state
 * representation.
 */
use crate::controls::button_handler::BN_CLICKED;
use crate::messages::MessageResponse;
use crate::toolkit::Toolkit;
use crate::types::{EventDetail, EventKind, WidgetEvent, WidgetId};
use crate::widget::ClassData;

pub(crate) fn handle_command(
    toolkit: &mut Toolkit,
    checkbox: WidgetId,
    code: u16,
) -> MessageResponse {
    if code != BN_CLICKED {
        return MessageResponse::Default;
    }
    let checked = !toolkit.is_checked(checkbox);
    log::debug!("CheckBoxHandler: {checkbox:?} toggled to {checked}.");
    write_checked(toolkit, checkbox, checked);
    toolkit.fire(
        WidgetEvent::new(checkbox, EventKind::Click).with_detail(EventDetail::Checked(checked)),
    );
    MessageResponse::Handled(0)
}

/// Stores the check state and mirrors it to the native control once it exists.
pub(crate) fn write_checked(toolkit: &mut Toolkit, id: WidgetId, checked: bool) -> bool {
    let Some(widget) = toolkit.widgets.get_mut(&id) else {
        return false;
    };
    let ClassData::Check { checked: state } = &mut widget.data else {
        log::warn!("CheckBoxHandler: {id:?} has no check state.");
        return false;
    };
    *state = checked;
    if widget.exists() {
        let handle = widget.handle;
        toolkit.backend.set_check(handle, checked);
    }
    true
}

pub(crate) fn sync(toolkit: &mut Toolkit, id: WidgetId) {
    if let Some(widget) = toolkit.widgets.get(&id)
        && let Some(checked) = widget.checked()
    {
        let handle = widget.handle;
        toolkit.backend.set_check(handle, checked);
    }
}
