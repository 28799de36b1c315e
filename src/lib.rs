/*
 * Public entry point of the ductkit crate, a handle-routed widget toolkit core
 * for the Win32 windowing model. The portable core (ownership tree, shared
 * decorators, callback slots, message routing, animation) compiles and runs on
 * every target against the in-memory `HeadlessBackend`; the `win32` module
 * supplies the real native backend and message loop on Windows.
 *
 * Everything hangs off one `Toolkit` context object. There is no global state:
 * window procedures reach the toolkit through weak references handed to each
 * native window at creation.
 */
pub mod animation;
pub mod backend;
pub mod callbacks;
pub(crate) mod controls;
pub mod error;
pub mod headless;
pub mod messages;
pub mod painter;
pub(crate) mod registry;
pub mod resources;
mod router;
pub mod styling;
pub mod toolkit;
pub mod types;
pub mod widget;
#[cfg(target_os = "windows")]
pub mod win32;

pub use animation::AnimationSpec;
pub use backend::{NativeBackend, NativeCreateRequest, NativeMenuEntry, RepaintSink};
pub use callbacks::{MenuEvent, MenuEventKind};
pub use error::{PlatformError, Result as PlatformResult};
pub use headless::{HeadlessBackend, HeadlessProbe};
pub use messages::MessageResponse;
pub use painter::{BasicPainter, DrawContext, WidgetPainter};
pub use resources::{
    BorderId, BorderParams, BorderStyle, MenuId, MenuItemId, MenuItemParams, MenuParams,
};
pub use styling::{Color, FontDescription, FontWeight, Palette};
pub use toolkit::Toolkit;
pub use types::{
    EventDetail, EventKind, NativeHandle, NativeObject, Rect, ToolkitConfig, WidgetConfig,
    WidgetEvent, WidgetId,
};
pub use widget::{Widget, WidgetClass, WidgetFlags};
#[cfg(target_os = "windows")]
pub use win32::App;
