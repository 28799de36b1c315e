/*
 * Window procedures and the routing hooks that connect native windows to the
 * toolkit. Toolkit classes are registered with `facade_wnd_proc_router`, which
 * finds its `RouteContext` through `GWLP_USERDATA` (installed from
 * `lpCreateParams` on WM_NCCREATE). Pre-built leaf controls are subclassed with
 * `leaf_control_subclass_proc`, which owns its route through the subclass
 * reference data.
 *
 * The toolkit is reached through a `Weak` reference and borrowed with
 * `try_borrow_mut`. Messages that arrive while the toolkit is already borrowed
 * (the host sends WM_DESTROY synchronously from `DestroyWindow`, for example)
 * get default processing; the toolkit has already accounted for them.
 */
use crate::error::{PlatformError, Result as PlatformResult};
use crate::messages::MessageResponse;
use crate::toolkit::Toolkit;
use crate::types::NativeHandle;
use crate::widget::WidgetClass;

use windows::Win32::{
    Foundation::{GetLastError, HINSTANCE, HWND, LPARAM, LRESULT, WPARAM},
    Graphics::Gdi::{COLOR_WINDOW, HBRUSH},
    UI::Shell::{DefSubclassProc, RemoveWindowSubclass, SetWindowSubclass},
    UI::WindowsAndMessaging::{
        CREATESTRUCTW, CS_DBLCLKS, CS_HREDRAW, CS_OWNDC, CS_VREDRAW, DefWindowProcW,
        GWLP_USERDATA, GetClassInfoExW, GetWindowLongPtrW, IDC_ARROW, IDI_APPLICATION,
        LoadCursorW, LoadIconW, RegisterClassExW, SetWindowLongPtrW, WM_NCCREATE, WM_NCDESTROY,
        WNDCLASS_STYLES, WNDCLASSEXW,
    },
};
use windows::core::{HSTRING, PCWSTR};

use std::cell::RefCell;
use std::ffi::c_void;
use std::rc::Weak;

/// Per-window routing state, owned by the native window until WM_NCDESTROY.
pub(crate) struct RouteContext {
    pub(crate) toolkit: Weak<RefCell<Toolkit>>,
}

const LEAF_SUBCLASS_ID: usize = 1;

fn class_style(class: WidgetClass) -> WNDCLASS_STYLES {
    let style = CS_HREDRAW | CS_VREDRAW | CS_DBLCLKS;
    if class.owns_surface() {
        style | CS_OWNDC
    } else {
        style
    }
}

/*
 * Registers `class_name` with the shared router procedure. Registering a name
 * that already exists in this process is not an error.
 */
pub(crate) fn register_window_class(
    instance: HINSTANCE,
    class: WidgetClass,
    class_name: &str,
) -> PlatformResult<()> {
    let class_name_hstring = HSTRING::from(class_name);
    let class_name_pcwstr = PCWSTR(class_name_hstring.as_ptr());

    unsafe {
        let mut existing = WNDCLASSEXW::default();
        if GetClassInfoExW(Some(instance), class_name_pcwstr, &mut existing).is_ok() {
            log::debug!("Win32: Window class '{class_name}' already registered.");
            return Ok(());
        }

        let wc = WNDCLASSEXW {
            cbSize: std::mem::size_of::<WNDCLASSEXW>() as u32,
            style: class_style(class),
            lpfnWndProc: Some(facade_wnd_proc_router),
            cbClsExtra: 0,
            cbWndExtra: 0,
            hInstance: instance,
            hIcon: LoadIconW(None, IDI_APPLICATION)?,
            hCursor: LoadCursorW(None, IDC_ARROW)?,
            hbrBackground: HBRUSH((COLOR_WINDOW.0 + 1) as *mut c_void),
            lpszMenuName: PCWSTR::null(),
            lpszClassName: class_name_pcwstr,
            hIconSm: LoadIconW(None, IDI_APPLICATION)?,
        };

        if RegisterClassExW(&wc) == 0 {
            let error = GetLastError();
            log::error!("Win32: RegisterClassExW for '{class_name}' failed: {error:?}");
            Err(PlatformError::ClassRegistrationFailed(format!(
                "{class_name}: {error:?}"
            )))
        } else {
            log::debug!("Win32: Window class '{class_name}' registered.");
            Ok(())
        }
    }
}

/// Boxes a route for `lpCreateParams`; ownership passes to the window on WM_NCCREATE.
pub(crate) fn into_create_param(toolkit: Weak<RefCell<Toolkit>>) -> *mut c_void {
    Box::into_raw(Box::new(RouteContext { toolkit })) as *mut c_void
}

fn route_to_toolkit(
    route: &RouteContext,
    hwnd: HWND,
    msg: u32,
    wparam: WPARAM,
    lparam: LPARAM,
) -> Option<LRESULT> {
    let toolkit = route.toolkit.upgrade()?;
    let Ok(mut toolkit) = toolkit.try_borrow_mut() else {
        log::trace!("Win32: Re-entrant {msg:#06x} for {hwnd:?}; default processing.");
        return None;
    };
    match toolkit.dispatch(NativeHandle(hwnd.0 as isize), msg, wparam.0, lparam.0) {
        MessageResponse::Handled(value) => Some(LRESULT(value)),
        MessageResponse::Default => None,
    }
}

/*
 * Window procedure of every toolkit class. Routes through the context stored
 * in `GWLP_USERDATA` and falls back to `DefWindowProcW`.
 */
unsafe extern "system" fn facade_wnd_proc_router(
    hwnd: HWND,
    msg: u32,
    wparam: WPARAM,
    lparam: LPARAM,
) -> LRESULT {
    let context_ptr = if msg == WM_NCCREATE {
        let create_struct = unsafe { &*(lparam.0 as *const CREATESTRUCTW) };
        let context_raw_ptr = create_struct.lpCreateParams as *mut RouteContext;
        unsafe { SetWindowLongPtrW(hwnd, GWLP_USERDATA, context_raw_ptr as isize) };
        context_raw_ptr
    } else {
        unsafe { GetWindowLongPtrW(hwnd, GWLP_USERDATA) as *mut RouteContext }
    };

    if context_ptr.is_null() {
        return unsafe { DefWindowProcW(hwnd, msg, wparam, lparam) };
    }

    let routed = route_to_toolkit(unsafe { &*context_ptr }, hwnd, msg, wparam, lparam);
    let result = match routed {
        Some(result) => result,
        None => unsafe { DefWindowProcW(hwnd, msg, wparam, lparam) },
    };

    if msg == WM_NCDESTROY {
        unsafe { SetWindowLongPtrW(hwnd, GWLP_USERDATA, 0) };
        drop(unsafe { Box::from_raw(context_ptr) });
    }
    result
}

/*
 * Interception hook for pre-built controls, installed with
 * `SetWindowSubclass`. `ref_data` carries the boxed route; the subclass id is
 * unused. Anything the router leaves alone goes to `DefSubclassProc`, which
 * continues with the control's own procedure.
 */
unsafe extern "system" fn leaf_control_subclass_proc(
    hwnd: HWND,
    msg: u32,
    wparam: WPARAM,
    lparam: LPARAM,
    _subclass_id: usize,
    ref_data: usize,
) -> LRESULT {
    let context_ptr = ref_data as *mut RouteContext;
    if context_ptr.is_null() {
        return unsafe { DefSubclassProc(hwnd, msg, wparam, lparam) };
    }

    let routed = route_to_toolkit(unsafe { &*context_ptr }, hwnd, msg, wparam, lparam);
    let result = match routed {
        Some(result) => result,
        None => unsafe { DefSubclassProc(hwnd, msg, wparam, lparam) },
    };

    if msg == WM_NCDESTROY {
        unsafe {
            let _ = RemoveWindowSubclass(hwnd, Some(leaf_control_subclass_proc), LEAF_SUBCLASS_ID);
            drop(Box::from_raw(context_ptr));
        }
    }
    result
}

/// Installs the interception hook on a freshly created leaf control.
pub(crate) fn install_leaf_interception(hwnd: HWND, toolkit: Weak<RefCell<Toolkit>>) {
    let context = Box::into_raw(Box::new(RouteContext { toolkit }));
    let installed = unsafe {
        SetWindowSubclass(
            hwnd,
            Some(leaf_control_subclass_proc),
            LEAF_SUBCLASS_ID,
            context as usize,
        )
    };
    if !installed.as_bool() {
        log::warn!("Win32: Could not hook {hwnd:?}; its messages bypass the toolkit.");
        drop(unsafe { Box::from_raw(context) });
    }
}
