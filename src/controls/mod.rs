/*
 * Per-class behavior of the leaf controls and the image widget. Native leaf
 * controls report user actions to their parent window as command
 * notifications; the router resolves the source control and hands the
 * notification code to `handle_control_command`, which decodes it per class.
 */
pub(crate) mod button_handler;
pub(crate) mod checkbox_handler;
pub(crate) mod image_handler;
pub(crate) mod label_handler;
pub(crate) mod listbox_handler;
pub(crate) mod radiobutton_handler;
pub(crate) mod textbox_handler;

use crate::messages::MessageResponse;
use crate::toolkit::Toolkit;
use crate::types::WidgetId;
use crate::widget::WidgetClass;

pub(crate) fn handle_control_command(
    toolkit: &mut Toolkit,
    control: WidgetId,
    code: u16,
) -> MessageResponse {
    let Some(class) = toolkit.widgets.get(&control).map(|w| w.class) else {
        return MessageResponse::Default;
    };
    match class {
        WidgetClass::Button => button_handler::handle_command(toolkit, control, code),
        WidgetClass::CheckBox => checkbox_handler::handle_command(toolkit, control, code),
        WidgetClass::RadioButton => radiobutton_handler::handle_command(toolkit, control, code),
        WidgetClass::TextBox => textbox_handler::handle_command(toolkit, control, code),
        WidgetClass::ListBox => listbox_handler::handle_command(toolkit, control, code),
        WidgetClass::Label => label_handler::handle_command(toolkit, control, code),
        WidgetClass::Window | WidgetClass::Frame | WidgetClass::Image => {
            log::trace!("Controls: Command {code:#06x} from non-control {control:?} ignored.");
            MessageResponse::Default
        }
    }
}

/// Pushes state set before creation down to the freshly created native control.
pub(crate) fn sync_native_state(toolkit: &mut Toolkit, id: WidgetId) {
    let Some(class) = toolkit.widgets.get(&id).map(|w| w.class) else {
        return;
    };
    match class {
        WidgetClass::CheckBox | WidgetClass::RadioButton => checkbox_handler::sync(toolkit, id),
        WidgetClass::ListBox => listbox_handler::sync(toolkit, id),
        _ => {}
    }
}

pub(crate) fn set_checked(toolkit: &mut Toolkit, id: WidgetId, checked: bool) -> bool {
    match toolkit.widgets.get(&id).map(|w| w.class) {
        Some(WidgetClass::CheckBox) => checkbox_handler::write_checked(toolkit, id, checked),
        Some(WidgetClass::RadioButton) if checked => radiobutton_handler::check(toolkit, id),
        Some(WidgetClass::RadioButton) => checkbox_handler::write_checked(toolkit, id, false),
        other => {
            log::warn!("Controls: set_checked on {other:?} {id:?} ignored.");
            false
        }
    }
}
