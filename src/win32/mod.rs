// Win32 substrate: window procedures, the native backend and the message loop.
pub mod app;
pub mod backend;
pub(crate) mod window_common;

pub use app::App;
pub use backend::Win32Backend;
