/*
 * Radio buttons. Sibling radio buttons (same parent) form one group: checking
 * one unchecks the others before any listener hears about it.
 */
use crate::controls::button_handler::BN_CLICKED;
use crate::controls::checkbox_handler::write_checked;
use crate::messages::MessageResponse;
use crate::toolkit::Toolkit;
use crate::types::{EventDetail, EventKind, WidgetEvent, WidgetId};
use crate::widget::WidgetClass;

pub(crate) fn handle_command(toolkit: &mut Toolkit, radio: WidgetId, code: u16) -> MessageResponse {
    if code != BN_CLICKED {
        return MessageResponse::Default;
    }
    log::debug!("RadioButtonHandler: BN_CLICKED for {radio:?}.");
    check(toolkit, radio);
    toolkit.fire(WidgetEvent::new(radio, EventKind::Click).with_detail(EventDetail::Checked(true)));
    MessageResponse::Handled(0)
}

pub(crate) fn check(toolkit: &mut Toolkit, radio: WidgetId) -> bool {
    let siblings: Vec<WidgetId> = toolkit
        .widgets
        .get(&radio)
        .and_then(|w| w.parent)
        .and_then(|parent| toolkit.widgets.get(&parent))
        .map(|parent| {
            parent
                .children
                .iter()
                .copied()
                .filter(|child| *child != radio)
                .filter(|child| {
                    toolkit
                        .widgets
                        .get(child)
                        .is_some_and(|w| w.class == WidgetClass::RadioButton)
                })
                .collect()
        })
        .unwrap_or_default();
    for sibling in siblings {
        if toolkit.is_checked(sibling) {
            write_checked(toolkit, sibling, false);
        }
    }
    write_checked(toolkit, radio, true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{ToolkitConfig, WidgetConfig};

    #[test]
    fn checking_one_radio_unchecks_its_siblings_only() {
        let (mut toolkit, _probe) = Toolkit::headless(ToolkitConfig::new("Test"));
        let root = toolkit.new_widget(WidgetClass::Window, None, WidgetConfig::default());
        toolkit.create(root).unwrap();
        let frame = toolkit.new_widget(WidgetClass::Frame, Some(root), WidgetConfig::default());
        toolkit.create(frame).unwrap();
        let mut radios = Vec::new();
        for parent in [root, root, frame] {
            let radio =
                toolkit.new_widget(WidgetClass::RadioButton, Some(parent), WidgetConfig::default());
            toolkit.create(radio).unwrap();
            radios.push(radio);
        }
        toolkit.set_checked(radios[0], true);
        toolkit.set_checked(radios[2], true);

        let response = handle_command(&mut toolkit, radios[1], BN_CLICKED);

        assert_eq!(response, MessageResponse::Handled(0));
        assert!(!toolkit.is_checked(radios[0]));
        assert!(toolkit.is_checked(radios[1]));
        assert!(toolkit.is_checked(radios[2]));
    }
}
