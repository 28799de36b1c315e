/*
 * The seam between the toolkit core and the native windowing subsystem. The
 * toolkit owns exactly one `NativeBackend` and performs every native side
 * effect through it: window and control lifetimes, GDI-style objects, menus,
 * paint brackets and the quit request.
 *
 * Implementations must tolerate calls with handles or objects that are already
 * gone; the core only guarantees it never asks for the same object to be
 * released twice.
 */
use crate::error::Result as PlatformResult;
use crate::styling::{Color, FontDescription};
use crate::types::{NativeHandle, NativeObject, Rect};
use crate::widget::WidgetClass;

use std::sync::Arc;

/// Everything the native layer needs to allocate a window or control.
#[derive(Debug, Clone)]
pub struct NativeCreateRequest<'a> {
    pub class: WidgetClass,
    /// Registered class name for toolkit classes; leaf controls use the host's own class.
    pub class_name: &'a str,
    pub parent: Option<NativeHandle>,
    pub text: &'a str,
    pub rect: Rect,
    pub visible: bool,
    pub enabled: bool,
    /// Child control identifier reported back in command notifications.
    pub control_id: u16,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NativeMenuEntry<'a> {
    pub command_id: u16,
    pub text: &'a str,
    pub checked: bool,
    pub enabled: bool,
    pub submenu: Option<NativeObject>,
}

/// Thread-safe handle the animation worker uses to ask for a repaint.
pub trait RepaintSink: Send + Sync {
    fn request_repaint(&self);
}

pub trait NativeBackend {
    // Window lifetime
    fn register_class(&mut self, class: WidgetClass, class_name: &str) -> PlatformResult<()>;
    fn create_native(&mut self, request: &NativeCreateRequest<'_>) -> PlatformResult<NativeHandle>;
    /// Destroys the window and, natively, all of its child windows.
    fn destroy_native(&mut self, handle: NativeHandle);
    fn set_parent(&mut self, handle: NativeHandle, parent: Option<NativeHandle>);
    /*
     * Notifications the host sent synchronously from inside the previous call
     * and that could not reach a window procedure at the time. The toolkit
     * routes them as soon as the call returns. Hosts whose window procedures
     * handle re-entrant messages themselves report none.
     */
    fn take_sent_notifications(&mut self) -> Vec<(NativeHandle, u32)> {
        Vec::new()
    }

    // Window state
    fn set_enabled(&mut self, handle: NativeHandle, enabled: bool);
    fn set_visible(&mut self, handle: NativeHandle, visible: bool);
    fn set_text(&mut self, handle: NativeHandle, text: &str);
    fn read_text(&self, handle: NativeHandle) -> Option<String>;
    fn set_geometry(&mut self, handle: NativeHandle, rect: Rect);
    fn set_font(&mut self, handle: NativeHandle, font: Option<NativeObject>);
    fn invalidate(&mut self, handle: NativeHandle);
    /// Requests a single mouse-leave notification for `handle`.
    fn track_mouse_leave(&mut self, handle: NativeHandle);

    // Leaf control state
    fn set_check(&mut self, handle: NativeHandle, checked: bool);
    fn set_list_items(&mut self, handle: NativeHandle, items: &[String]);
    fn set_list_selection(&mut self, handle: NativeHandle, index: i32);
    /// Native selection of a list control, `-1` when nothing is selected.
    fn read_list_selection(&self, handle: NativeHandle) -> i32;

    // Painting
    /// Opens a paint bracket and returns the area to draw, `None` if nothing needs drawing.
    fn begin_paint(&mut self, handle: NativeHandle) -> Option<Rect>;
    fn end_paint(&mut self, handle: NativeHandle);
    fn acquire_surface(&mut self, handle: NativeHandle) -> Option<NativeObject>;
    fn release_surface(&mut self, handle: NativeHandle, surface: NativeObject);
    fn fill_rect(&mut self, surface: NativeObject, rect: Rect, color: Color);
    fn frame_rect(&mut self, surface: NativeObject, rect: Rect, brush: NativeObject);
    fn draw_text(&mut self, surface: NativeObject, rect: Rect, text: &str, color: Color);
    fn repaint_sink(&self, handle: NativeHandle) -> Arc<dyn RepaintSink>;

    // GDI-style objects
    fn create_brush(&mut self, color: Color) -> NativeObject;
    fn create_font(&mut self, font: &FontDescription) -> Option<NativeObject>;
    fn delete_object(&mut self, object: NativeObject);

    // Menus
    fn create_menu(&mut self, popup: bool) -> NativeObject;
    fn append_menu_item(&mut self, menu: NativeObject, entry: &NativeMenuEntry<'_>);
    /// Rewrites the entry at `position`. A submenu it referenced before is left alive.
    fn modify_menu_item(
        &mut self,
        menu: NativeObject,
        position: usize,
        entry: &NativeMenuEntry<'_>,
    );
    fn remove_menu_item(&mut self, menu: NativeObject, position: usize);
    fn set_menu_item_checked(&mut self, menu: NativeObject, position: usize, checked: bool);
    fn set_window_menu(&mut self, handle: NativeHandle, menu: Option<NativeObject>);
    /// Destroys `menu` only; submenus referenced by its entries are left alive.
    fn destroy_menu(&mut self, menu: NativeObject);

    fn post_quit(&mut self, exit_code: i32);
}
