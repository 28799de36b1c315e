/*
 * Push buttons. The native control draws and tracks itself; the toolkit only
 * sees its notifications. BN_CLICKED becomes a `Click` event and, since the
 * control is created with BS_NOTIFY, BN_DOUBLECLICKED becomes a `DoubleClick`.
 */
use crate::messages::MessageResponse;
use crate::toolkit::Toolkit;
use crate::types::{EventKind, WidgetEvent, WidgetId};

pub(crate) const BN_CLICKED: u16 = 0;
pub(crate) const BN_DOUBLECLICKED: u16 = 5;

pub(crate) fn handle_command(
    toolkit: &mut Toolkit,
    button: WidgetId,
    code: u16,
) -> MessageResponse {
    let kind = match code {
        BN_CLICKED => EventKind::Click,
        BN_DOUBLECLICKED => EventKind::DoubleClick,
        _ => return MessageResponse::Default,
    };
    log::debug!("ButtonHandler: {kind:?} notification for {button:?}.");
    toolkit.fire(WidgetEvent::new(button, kind));
    MessageResponse::Handled(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{ToolkitConfig, WidgetConfig};
    use crate::widget::WidgetClass;

    use std::cell::Cell;
    use std::rc::Rc;

    #[test]
    fn bn_clicked_fires_click() {
        let (mut toolkit, _probe) = Toolkit::headless(ToolkitConfig::new("Test"));
        let root = toolkit.new_widget(WidgetClass::Window, None, WidgetConfig::default());
        toolkit.create(root).unwrap();
        let button = toolkit.new_widget(WidgetClass::Button, Some(root), WidgetConfig::default());
        toolkit.create(button).unwrap();
        let clicks = Rc::new(Cell::new(0));
        let counter = Rc::clone(&clicks);
        toolkit.on(button, EventKind::Click, move |_, _| counter.set(counter.get() + 1));

        let response = handle_command(&mut toolkit, button, BN_CLICKED);

        assert_eq!(response, MessageResponse::Handled(0));
        assert_eq!(clicks.get(), 1);
    }

    #[test]
    fn bn_doubleclicked_fires_double_click_only() {
        let (mut toolkit, _probe) = Toolkit::headless(ToolkitConfig::new("Test"));
        let root = toolkit.new_widget(WidgetClass::Window, None, WidgetConfig::default());
        toolkit.create(root).unwrap();
        let button = toolkit.new_widget(WidgetClass::Button, Some(root), WidgetConfig::default());
        toolkit.create(button).unwrap();
        let double_clicks = Rc::new(Cell::new(0));
        let clicks = Rc::new(Cell::new(0));
        let double_counter = Rc::clone(&double_clicks);
        let click_counter = Rc::clone(&clicks);
        toolkit.on(button, EventKind::DoubleClick, move |_, _| {
            double_counter.set(double_counter.get() + 1)
        });
        toolkit.on(button, EventKind::Click, move |_, _| {
            click_counter.set(click_counter.get() + 1)
        });

        let response = handle_command(&mut toolkit, button, BN_DOUBLECLICKED);

        assert_eq!(response, MessageResponse::Handled(0));
        assert_eq!(double_clicks.get(), 1);
        assert_eq!(clicks.get(), 0);
    }

    #[test]
    fn other_notifications_get_default_processing() {
        let (mut toolkit, _probe) = Toolkit::headless(ToolkitConfig::new("Test"));
        let root = toolkit.new_widget(WidgetClass::Window, None, WidgetConfig::default());
        toolkit.create(root).unwrap();
        let button = toolkit.new_widget(WidgetClass::Button, Some(root), WidgetConfig::default());
        toolkit.create(button).unwrap();

        assert!(handle_command(&mut toolkit, button, 6).is_default());
    }
}
