/*
 * Message routing. `Toolkit::dispatch` is the single entry point the native
 * event loop calls for every notification, whether it arrived through a
 * toolkit class's window procedure or through the interception hook installed
 * on a pre-built leaf control.
 *
 * Routing is two-tier. Unknown handles (not yet registered, or already gone)
 * get default processing and never touch widget state. Leaf controls pass
 * through an interception layer that forwards only structural message kinds to
 * the generic per-widget handler; everything else goes straight back to the
 * control's own procedure. Every path yields a `MessageResponse`.
 */
use crate::controls;
use crate::messages::{MessageKind, MessageResponse, MouseButton};
use crate::painter::DrawContext;
use crate::resources::AttachmentSlot;
use crate::toolkit::Toolkit;
use crate::types::{EventDetail, EventKind, NativeHandle, WidgetEvent, WidgetId};
use crate::widget::{WidgetClass, WidgetFlags};

impl Toolkit {
    pub fn dispatch(
        &mut self,
        handle: NativeHandle,
        msg: u32,
        param1: usize,
        param2: isize,
    ) -> MessageResponse {
        let Some(id) = self.registry.lookup(handle) else {
            log::trace!("Router: {msg:#06x} for unregistered {handle:?}; default processing.");
            return MessageResponse::Default;
        };
        let Some(class) = self.widgets.get(&id).map(|w| w.class) else {
            log::warn!("Router: {handle:?} is registered but {id:?} has no widget.");
            return MessageResponse::Default;
        };
        let kind = MessageKind::classify(msg, param1, param2);
        if class.is_leaf_control() {
            self.intercept(id, kind)
        } else {
            self.handle_generic(id, class, kind)
        }
    }

    fn intercept(&mut self, id: WidgetId, kind: MessageKind) -> MessageResponse {
        if !kind.is_structural() {
            return MessageResponse::Default;
        }
        let Some(class) = self.widgets.get(&id).map(|w| w.class) else {
            return MessageResponse::Default;
        };
        self.handle_generic(id, class, kind)
    }

    fn handle_generic(
        &mut self,
        id: WidgetId,
        class: WidgetClass,
        kind: MessageKind,
    ) -> MessageResponse {
        // Leaf controls must still see their input; toolkit classes consume it.
        let consumed = if class.is_leaf_control() {
            MessageResponse::Default
        } else {
            MessageResponse::Handled(0)
        };

        match kind {
            MessageKind::Destroy => {
                self.on_native_destroy(id);
                consumed
            }
            MessageKind::FinalDestroy => {
                self.on_native_destroy(id);
                MessageResponse::Default
            }
            MessageKind::Close => {
                if self.fire(WidgetEvent::new(id, EventKind::Close)) {
                    MessageResponse::Handled(0)
                } else {
                    MessageResponse::Default
                }
            }
            MessageKind::Paint => self.paint(id),
            MessageKind::EraseBackground if class.owns_surface() => MessageResponse::Handled(1),
            MessageKind::FocusGained | MessageKind::FocusLost => {
                let gained = kind == MessageKind::FocusGained;
                self.update_flags(id, WidgetFlags::FOCUS, gained);
                let event = if gained {
                    EventKind::FocusGained
                } else {
                    EventKind::FocusLost
                };
                self.fire(WidgetEvent::new(id, event));
                self.invalidate(id);
                consumed
            }
            MessageKind::MouseMove => {
                let entering = self
                    .widgets
                    .get(&id)
                    .is_some_and(|w| !w.is_hovered());
                if entering {
                    self.update_flags(id, WidgetFlags::HOVER, true);
                    if let Some(handle) = self.handle_of(id) {
                        self.backend.track_mouse_leave(handle);
                    }
                    self.fire(WidgetEvent::new(id, EventKind::MouseEnter));
                    self.invalidate(id);
                }
                consumed
            }
            MessageKind::MouseLeave => {
                self.update_flags(id, WidgetFlags::HOVER | WidgetFlags::CLICK, false);
                self.fire(WidgetEvent::new(id, EventKind::MouseLeave));
                self.invalidate(id);
                consumed
            }
            MessageKind::ButtonDown(MouseButton::Left) => {
                self.update_flags(id, WidgetFlags::CLICK, true);
                self.invalidate(id);
                consumed
            }
            MessageKind::ButtonUp(MouseButton::Left) => {
                let Some(widget) = self.widgets.get(&id) else {
                    return MessageResponse::Default;
                };
                let clicked = widget.flags.contains(WidgetFlags::CLICK | WidgetFlags::HOVER)
                    && !widget.is_inert();
                self.update_flags(id, WidgetFlags::CLICK, false);
                self.invalidate(id);
                // Leaf controls report clicks through their command notification.
                if clicked && !class.is_leaf_control() {
                    self.fire(WidgetEvent::new(id, EventKind::Click));
                }
                consumed
            }
            MessageKind::ButtonDown(MouseButton::Right)
            | MessageKind::ButtonUp(MouseButton::Right) => consumed,
            MessageKind::DoubleClick => {
                if !class.is_leaf_control() {
                    self.fire(WidgetEvent::new(id, EventKind::DoubleClick));
                }
                consumed
            }
            MessageKind::KeyDown { code } | MessageKind::KeyUp { code } => {
                let event = if matches!(kind, MessageKind::KeyDown { .. }) {
                    EventKind::KeyDown
                } else {
                    EventKind::KeyUp
                };
                self.fire(WidgetEvent::new(id, event).with_detail(EventDetail::Key { code }));
                MessageResponse::Default
            }
            MessageKind::ControlCommand { source, code } => {
                match self.registry.lookup(NativeHandle(source)) {
                    Some(control) => controls::handle_control_command(self, control, code),
                    None => {
                        log::trace!("Router: Command from unregistered control {source:#x}.");
                        MessageResponse::Default
                    }
                }
            }
            MessageKind::MenuCommand { command_id } => {
                if self.activate_menu_command(command_id) {
                    MessageResponse::Handled(0)
                } else {
                    MessageResponse::Default
                }
            }
            MessageKind::Moved { x, y } => {
                if let Some(widget) = self.widgets.get_mut(&id) {
                    widget.rect.x = x;
                    widget.rect.y = y;
                }
                MessageResponse::Default
            }
            MessageKind::Resized { width, height } => {
                if let Some(widget) = self.widgets.get_mut(&id) {
                    widget.rect.width = width;
                    widget.rect.height = height;
                }
                if class.owns_surface() {
                    self.invalidate(id);
                }
                MessageResponse::Default
            }
            MessageKind::EraseBackground
            | MessageKind::Notify
            | MessageKind::Create
            | MessageKind::Other(_) => MessageResponse::Default,
        }
    }

    /*
     * The host is destroying the native window on its own. Tear down the
     * logical tree without asking the host to destroy anything; a redundant
     * notification for a widget already tearing down is ignored.
     */
    fn on_native_destroy(&mut self, id: WidgetId) {
        let tearing_down = self.widgets.get(&id).map(|w| w.is_tearing_down());
        if tearing_down == Some(false) {
            log::debug!("Router: Native destroy of {id:?}.");
            self.destroy_from_native(id);
        }
    }

    /*
     * Paint bracket for classes with a retained surface. The painter receives
     * a read-only view of the widget and its borders; the focus border is only
     * offered while the widget has focus.
     */
    fn paint(&mut self, id: WidgetId) -> MessageResponse {
        let Some(widget) = self.widgets.get(&id) else {
            return MessageResponse::Default;
        };
        if !widget.class.owns_surface() {
            return MessageResponse::Default;
        }
        let handle = widget.handle;
        let Some(rect) = self.backend.begin_paint(handle) else {
            return MessageResponse::Default;
        };
        let frame = controls::image_handler::current_frame(self, id);
        if let Some(widget) = self.widgets.get_mut(&id) {
            widget.draw_rect = rect;
        }

        if let Some(widget) = self.widgets.get(&id)
            && let Some(surface) = widget.surface
        {
            let flags = widget.flags;
            let ctx = DrawContext {
                class: widget.class,
                surface,
                rect,
                background: widget.palette.background,
                hover: widget.palette.hover,
                text_color: widget.palette.text,
                text: &widget.text,
                border: self
                    .decorators
                    .border_for(AttachmentSlot::ContentBorder(id)),
                focus_border: if flags.contains(WidgetFlags::FOCUS) {
                    self.decorators.border_for(AttachmentSlot::FocusBorder(id))
                } else {
                    None
                },
                hovered: flags.contains(WidgetFlags::HOVER),
                pressed: flags.contains(WidgetFlags::CLICK | WidgetFlags::HOVER),
                enabled: !flags.contains(WidgetFlags::INERT),
                frame,
            };
            self.painter.paint(&ctx, self.backend.as_mut());
        }
        self.backend.end_paint(handle);
        MessageResponse::Handled(0)
    }

    fn update_flags(&mut self, id: WidgetId, flags: WidgetFlags, value: bool) {
        if let Some(widget) = self.widgets.get_mut(&id) {
            widget.flags.set(flags, value);
        }
    }

    fn handle_of(&self, id: WidgetId) -> Option<NativeHandle> {
        self.widgets
            .get(&id)
            .filter(|w| w.exists())
            .map(|w| w.handle)
    }

    fn invalidate(&mut self, id: WidgetId) {
        if let Some(handle) = self.handle_of(id) {
            self.backend.invalidate(handle);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::controls::button_handler::BN_CLICKED;
    use crate::headless::{DrawOp, HeadlessProbe};
    use crate::messages::{
        WM_CHAR, WM_CLOSE, WM_COMMAND, WM_DESTROY, WM_KEYDOWN, WM_LBUTTONDOWN, WM_LBUTTONUP,
        WM_MOUSELEAVE, WM_MOUSEMOVE, WM_NCDESTROY, WM_PAINT, WM_SETFOCUS, WM_SIZE, WM_TIMER,
        make_command_param1, make_param2,
    };
    use crate::resources::{BorderParams, BorderStyle, MenuItemParams, MenuParams};
    use crate::styling::Color;
    use crate::types::{Rect, ToolkitConfig, WidgetConfig};

    use std::cell::RefCell;
    use std::rc::Rc;

    fn setup() -> (Toolkit, HeadlessProbe, WidgetId, NativeHandle) {
        let (mut toolkit, probe) = Toolkit::headless(ToolkitConfig::new("Test"));
        let root = toolkit.new_widget(
            WidgetClass::Window,
            None,
            WidgetConfig::default().with_rect(Rect::new(0, 0, 200, 100)),
        );
        let handle = toolkit.create(root).unwrap();
        (toolkit, probe, root, handle)
    }

    fn add(
        toolkit: &mut Toolkit,
        class: WidgetClass,
        parent: WidgetId,
    ) -> (WidgetId, NativeHandle) {
        let id = toolkit.new_widget(class, Some(parent), WidgetConfig::default());
        let handle = toolkit.create(id).unwrap();
        (id, handle)
    }

    fn record(
        toolkit: &mut Toolkit,
        id: WidgetId,
        kinds: &[EventKind],
    ) -> Rc<RefCell<Vec<EventKind>>> {
        let seen = Rc::new(RefCell::new(Vec::new()));
        for kind in kinds {
            let log = Rc::clone(&seen);
            toolkit.on(id, *kind, move |_, event| log.borrow_mut().push(event.kind));
        }
        seen
    }

    #[test]
    fn unregistered_handle_gets_default_processing() {
        let (mut toolkit, _probe, _root, _handle) = setup();

        for msg in [WM_PAINT, WM_DESTROY, WM_LBUTTONUP, WM_COMMAND, WM_CLOSE] {
            assert!(toolkit.dispatch(NativeHandle(0xDEAD), msg, 0, 0).is_default());
        }
        assert_eq!(toolkit.widget_count(), 1);
    }

    #[test]
    fn leaf_control_non_structural_messages_bypass_widget() {
        let (mut toolkit, _probe, root, _handle) = setup();
        let (textbox, handle) = add(&mut toolkit, WidgetClass::TextBox, root);
        let seen = record(&mut toolkit, textbox, &[EventKind::Close, EventKind::KeyDown]);

        assert!(toolkit.dispatch(handle, WM_CHAR, 0x41, 0).is_default());
        assert!(toolkit.dispatch(handle, WM_TIMER, 1, 0).is_default());
        assert!(toolkit.dispatch(handle, WM_CLOSE, 0, 0).is_default());

        assert!(seen.borrow().is_empty());
        assert!(toolkit.widget(textbox).is_some());
    }

    #[test]
    fn leaf_control_structural_messages_reach_generic_handler() {
        let (mut toolkit, _probe, root, _handle) = setup();
        let (button, handle) = add(&mut toolkit, WidgetClass::Button, root);
        let seen = record(&mut toolkit, button, &[EventKind::FocusGained, EventKind::KeyDown]);

        let focus = toolkit.dispatch(handle, WM_SETFOCUS, 0, 0);
        let key = toolkit.dispatch(handle, WM_KEYDOWN, 0x20, 0);

        assert!(focus.is_default());
        assert!(key.is_default());
        assert_eq!(*seen.borrow(), vec![EventKind::FocusGained, EventKind::KeyDown]);
        assert!(toolkit.widget(button).unwrap().has_focus());
    }

    #[test]
    fn native_destroy_tears_down_subtree_once() {
        let (mut toolkit, probe, root, root_handle) = setup();
        let (frame, frame_handle) = add(&mut toolkit, WidgetClass::Frame, root);
        let (_button, button_handle) = add(&mut toolkit, WidgetClass::Button, frame);

        toolkit.dispatch(frame_handle, WM_DESTROY, 0, 0);
        let again = toolkit.dispatch(frame_handle, WM_DESTROY, 0, 0);
        let child = toolkit.dispatch(button_handle, WM_NCDESTROY, 0, 0);

        assert!(again.is_default());
        assert!(child.is_default());
        assert_eq!(toolkit.lookup(frame_handle), None);
        assert_eq!(toolkit.lookup(button_handle), None);
        assert!(toolkit.widget(root).unwrap().children().is_empty());
        assert!(probe.is_live(root_handle));
        // The host owns the native destruction in this path.
        assert!(probe.is_live(frame_handle));
    }

    #[test]
    fn close_on_window_defaults_to_destroy() {
        let (mut toolkit, probe, root, handle) = setup();

        let response = toolkit.dispatch(handle, WM_CLOSE, 0, 0);

        assert_eq!(response, MessageResponse::Handled(0));
        assert!(toolkit.widget(root).is_none());
        assert!(!probe.is_live(handle));
        assert_eq!(probe.quit_posted(), Some(0));
    }

    #[test]
    fn client_close_callback_replaces_default() {
        let (mut toolkit, _probe, root, handle) = setup();
        let seen = record(&mut toolkit, root, &[EventKind::Close]);

        toolkit.dispatch(handle, WM_CLOSE, 0, 0);

        assert_eq!(*seen.borrow(), vec![EventKind::Close]);
        assert!(toolkit.widget(root).is_some());
    }

    #[test]
    fn press_and_release_inside_frame_fires_click() {
        let (mut toolkit, probe, root, _handle) = setup();
        let (frame, handle) = add(&mut toolkit, WidgetClass::Frame, root);
        let seen = record(
            &mut toolkit,
            frame,
            &[EventKind::MouseEnter, EventKind::Click, EventKind::MouseLeave],
        );

        toolkit.dispatch(handle, WM_MOUSEMOVE, 0, make_param2(5, 5));
        toolkit.dispatch(handle, WM_MOUSEMOVE, 0, make_param2(6, 5));
        toolkit.dispatch(handle, WM_LBUTTONDOWN, 0, make_param2(6, 5));
        toolkit.dispatch(handle, WM_LBUTTONUP, 0, make_param2(6, 5));
        toolkit.dispatch(handle, WM_MOUSELEAVE, 0, 0);

        assert_eq!(
            *seen.borrow(),
            vec![EventKind::MouseEnter, EventKind::Click, EventKind::MouseLeave]
        );
        assert!(probe.is_tracking_mouse(handle));
        assert!(!toolkit.widget(frame).unwrap().is_hovered());
    }

    #[test]
    fn release_after_leaving_does_not_click() {
        let (mut toolkit, _probe, root, _handle) = setup();
        let (frame, handle) = add(&mut toolkit, WidgetClass::Frame, root);
        let seen = record(&mut toolkit, frame, &[EventKind::Click]);

        toolkit.dispatch(handle, WM_MOUSEMOVE, 0, 0);
        toolkit.dispatch(handle, WM_LBUTTONDOWN, 0, 0);
        toolkit.dispatch(handle, WM_MOUSELEAVE, 0, 0);
        toolkit.dispatch(handle, WM_LBUTTONUP, 0, 0);

        assert!(seen.borrow().is_empty());
    }

    #[test]
    fn control_command_is_routed_to_source_control() {
        let (mut toolkit, _probe, root, root_handle) = setup();
        let (button, button_handle) = add(&mut toolkit, WidgetClass::Button, root);
        let seen = record(&mut toolkit, button, &[EventKind::Click]);
        let param1 = make_command_param1(button.raw() as u16, BN_CLICKED);

        let response = toolkit.dispatch(root_handle, WM_COMMAND, param1, button_handle.0);

        assert_eq!(response, MessageResponse::Handled(0));
        assert_eq!(*seen.borrow(), vec![EventKind::Click]);
    }

    #[test]
    fn menu_command_reaches_item_listener() {
        let (mut toolkit, _probe, root, handle) = setup();
        let bar = toolkit.create_menu(MenuParams::bar());
        let quit = toolkit.create_menu_item("Quit", MenuItemParams::default());
        toolkit.append_menu_item(bar, quit);
        toolkit.set_menu_bar(root, Some(bar));
        let hits = Rc::new(RefCell::new(0));
        let counter = Rc::clone(&hits);
        toolkit.on_menu_item(quit, move |_, _| *counter.borrow_mut() += 1);
        let command = toolkit.menu_item_command(quit).unwrap();

        let response = toolkit.dispatch(handle, WM_COMMAND, make_command_param1(command, 0), 0);
        let unknown = toolkit.dispatch(handle, WM_COMMAND, make_command_param1(29999, 0), 0);

        assert_eq!(response, MessageResponse::Handled(0));
        assert!(unknown.is_default());
        assert_eq!(*hits.borrow(), 1);
    }

    #[test]
    fn paint_draws_background_border_and_focus_border() {
        let (mut toolkit, probe, root, handle) = setup();
        let border = toolkit.create_border(BorderParams::new(BorderStyle::Flat, Color::BLACK, 1));
        let focus = toolkit.create_border(BorderParams::new(BorderStyle::Dotted, Color::WHITE, 1));
        toolkit.set_border(root, Some(border));
        toolkit.set_focus_border(root, Some(focus));
        toolkit.set_text(root, "Hi");
        probe.take_draw_ops();

        let unfocused = toolkit.dispatch(handle, WM_PAINT, 0, 0);
        let unfocused_ops = probe.take_draw_ops();
        toolkit.dispatch(handle, WM_SETFOCUS, 0, 0);
        toolkit.dispatch(handle, WM_PAINT, 0, 0);
        let focused_ops = probe.take_draw_ops();

        assert_eq!(unfocused, MessageResponse::Handled(0));
        let frames = |ops: &[DrawOp]| {
            ops.iter()
                .filter(|op| matches!(op, DrawOp::Frame { .. }))
                .count()
        };
        assert_eq!(frames(&unfocused_ops), 1);
        assert_eq!(frames(&focused_ops), 2);
        assert_eq!(
            toolkit.widget(root).unwrap().draw_rect(),
            Rect::new(0, 0, 200, 100)
        );
        assert!(matches!(unfocused_ops.last(), Some(DrawOp::Text { text, .. }) if text == "Hi"));
    }

    #[test]
    fn paint_of_leaf_control_is_left_to_the_control() {
        let (mut toolkit, probe, root, _handle) = setup();
        let (_label, handle) = add(&mut toolkit, WidgetClass::Label, root);
        probe.take_draw_ops();

        assert!(toolkit.dispatch(handle, WM_PAINT, 0, 0).is_default());
        assert!(probe.take_draw_ops().is_empty());
    }

    #[test]
    fn resize_updates_geometry() {
        let (mut toolkit, _probe, root, handle) = setup();

        toolkit.dispatch(handle, WM_SIZE, 0, make_param2(320, 240));

        assert_eq!(toolkit.widget(root).unwrap().rect(), Rect::new(0, 0, 320, 240));
    }
}
