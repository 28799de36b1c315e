/*
 * Process-level entry point on Windows. `App` owns the toolkit behind an
 * `Rc<RefCell<_>>` so native window procedures can reach it through weak
 * references, and runs the native message loop until a quit is posted.
 */
use super::backend::Win32Backend;
use crate::error::{PlatformError, Result as PlatformResult};
use crate::toolkit::Toolkit;
use crate::types::ToolkitConfig;

use windows::Win32::{
    Foundation::HINSTANCE,
    System::LibraryLoader::GetModuleHandleW,
    UI::WindowsAndMessaging::{DispatchMessageW, GetMessageW, MSG, TranslateMessage},
};

use std::cell::{RefCell, RefMut};
use std::rc::Rc;

pub struct App {
    toolkit: Rc<RefCell<Toolkit>>,
}

impl App {
    pub fn new(config: ToolkitConfig) -> PlatformResult<Self> {
        let module = unsafe { GetModuleHandleW(None) }?;
        let instance = HINSTANCE(module.0);
        log::debug!("App: Starting '{}'.", config.app_name);
        let toolkit = Rc::new_cyclic(|weak| {
            RefCell::new(Toolkit::new(
                config,
                Box::new(Win32Backend::new(instance, weak.clone())),
            ))
        });
        Ok(Self { toolkit })
    }

    /// Borrows the toolkit. Must not be held across `run`.
    pub fn toolkit(&self) -> RefMut<'_, Toolkit> {
        self.toolkit.borrow_mut()
    }

    /*
     * Pumps native messages until a quit request arrives, then shuts the
     * toolkit down. Returns the exit code carried by the quit request.
     */
    pub fn run(&self) -> PlatformResult<i32> {
        let mut msg = MSG::default();
        loop {
            let status = unsafe { GetMessageW(&mut msg, None, 0, 0) };
            match status.0 {
                0 => break,
                -1 => {
                    return Err(PlatformError::OperationFailed(
                        "GetMessageW reported an error".into(),
                    ));
                }
                _ => unsafe {
                    let _ = TranslateMessage(&msg);
                    DispatchMessageW(&msg);
                },
            }
        }
        self.toolkit.borrow_mut().shutdown();
        let exit_code = msg.wParam.0 as i32;
        log::debug!("App: Message loop finished with exit code {exit_code}.");
        Ok(exit_code)
    }
}
