/*
 * `NativeBackend` over the Win32 API. Toolkit classes are created from the
 * per-class names the toolkit registers; leaf controls use the host's own
 * BUTTON, EDIT, LISTBOX and STATIC classes and get the interception hook
 * installed right after creation.
 *
 * Native failures are logged and otherwise ignored, except for class
 * registration and window creation, which are reported to the toolkit.
 */
use super::window_common::{install_leaf_interception, into_create_param, register_window_class};
use crate::backend::{NativeBackend, NativeCreateRequest, NativeMenuEntry, RepaintSink};
use crate::error::{PlatformError, Result as PlatformResult};
use crate::styling::{Color, FontDescription, FontWeight};
use crate::toolkit::Toolkit;
use crate::types::{NativeHandle, NativeObject, Rect};
use crate::widget::WidgetClass;

use windows::Win32::{
    Foundation::{COLORREF, HINSTANCE, HWND, LPARAM, RECT, WPARAM},
    Graphics::Gdi::{
        BeginPaint, CLIP_DEFAULT_PRECIS, CreateFontW, CreateSolidBrush, DEFAULT_CHARSET,
        DEFAULT_QUALITY, DT_CENTER, DT_SINGLELINE, DT_VCENTER, DeleteObject, DrawTextW, EndPaint,
        FF_DONTCARE, FW_BOLD, FW_NORMAL, FillRect, FrameRect, GetDC, GetDeviceCaps, HBRUSH, HDC,
        HGDIOBJ, InvalidateRect, LOGPIXELSY, OUT_DEFAULT_PRECIS, PAINTSTRUCT, ReleaseDC,
        SetBkMode, SetTextColor, TRANSPARENT,
    },
    System::WindowsProgramming::MulDiv,
    UI::Controls::{BST_CHECKED, BST_UNCHECKED},
    UI::Input::KeyboardAndMouse::{TME_LEAVE, TRACKMOUSEEVENT, TrackMouseEvent},
    UI::WindowsAndMessaging::{
        AppendMenuW, BM_SETCHECK, BS_CHECKBOX, BS_NOTIFY, BS_PUSHBUTTON, BS_RADIOBUTTON,
        CW_USEDEFAULT, CheckMenuItem, CreateMenu, CreatePopupMenu, CreateWindowExW,
        DestroyMenu, DestroyWindow, DrawMenuBar, ES_AUTOHSCROLL, EnableWindow, GetClientRect,
        GetMenuItemCount, GetSubMenu, GetWindowTextLengthW, GetWindowTextW, HMENU, InsertMenuW,
        LB_ADDSTRING, LB_GETCURSEL, LB_RESETCONTENT, LB_SETCURSEL, LBS_NOTIFY, MENU_ITEM_FLAGS,
        MF_BYPOSITION, MF_CHECKED, MF_GRAYED, MF_POPUP, MF_STRING, MF_UNCHECKED, ModifyMenuW,
        MoveWindow, PostQuitMessage, RemoveMenu, SS_NOTIFY, SW_HIDE, SW_SHOW, SendMessageW,
        SetMenu, SetParent, SetWindowTextW, ShowWindow,
        WINDOW_EX_STYLE, WINDOW_STYLE, WM_SETFONT, WS_BORDER, WS_CHILD, WS_CLIPCHILDREN,
        WS_CLIPSIBLINGS, WS_DISABLED, WS_OVERLAPPEDWINDOW, WS_TABSTOP, WS_VISIBLE, WS_VSCROLL,
    },
};
use windows::core::HSTRING;

use std::cell::RefCell;
use std::collections::HashMap;
use std::ffi::c_void;
use std::rc::Weak;
use std::sync::Arc;

const DEFAULT_FONT_NAME: &str = "Segoe UI";
const DEFAULT_FONT_POINTS: i32 = 9;

fn hwnd(handle: NativeHandle) -> HWND {
    HWND(handle.0 as *mut c_void)
}

fn hdc(surface: NativeObject) -> HDC {
    HDC(surface.0 as *mut c_void)
}

fn hmenu(menu: NativeObject) -> HMENU {
    HMENU(menu.0 as *mut c_void)
}

fn to_rect(rect: Rect) -> RECT {
    RECT {
        left: rect.x,
        top: rect.y,
        right: rect.x + rect.width,
        bottom: rect.y + rect.height,
    }
}

fn to_colorref(color: Color) -> COLORREF {
    COLORREF(color.to_bgr())
}

/// Host class name and style bits of a leaf control.
fn leaf_class(class: WidgetClass) -> Option<(&'static str, WINDOW_STYLE)> {
    let entry = match class {
        WidgetClass::Button => (
            "BUTTON",
            WINDOW_STYLE((BS_PUSHBUTTON | BS_NOTIFY) as u32) | WS_TABSTOP,
        ),
        WidgetClass::CheckBox => ("BUTTON", WINDOW_STYLE(BS_CHECKBOX as u32) | WS_TABSTOP),
        WidgetClass::RadioButton => ("BUTTON", WINDOW_STYLE(BS_RADIOBUTTON as u32) | WS_TABSTOP),
        WidgetClass::TextBox => (
            "EDIT",
            WINDOW_STYLE(ES_AUTOHSCROLL as u32) | WS_BORDER | WS_TABSTOP,
        ),
        WidgetClass::ListBox => (
            "LISTBOX",
            WINDOW_STYLE(LBS_NOTIFY as u32) | WS_BORDER | WS_VSCROLL | WS_TABSTOP,
        ),
        WidgetClass::Label => ("STATIC", WINDOW_STYLE(SS_NOTIFY.0)),
        WidgetClass::Window | WidgetClass::Frame | WidgetClass::Image => return None,
    };
    Some(entry)
}

fn has_popup_at(menu: NativeObject, position: usize) -> bool {
    !unsafe { GetSubMenu(hmenu(menu), position as i32) }.is_invalid()
}

fn menu_flags(entry: &NativeMenuEntry<'_>) -> (MENU_ITEM_FLAGS, usize) {
    let mut flags = MF_STRING;
    if entry.checked {
        flags |= MF_CHECKED;
    }
    if !entry.enabled {
        flags |= MF_GRAYED;
    }
    match entry.submenu {
        Some(submenu) => (flags | MF_POPUP, submenu.0 as usize),
        None => (flags, entry.command_id as usize),
    }
}

/// Invalidates a window from the animation worker thread.
struct WindowRepaintSink {
    hwnd: isize,
}

impl RepaintSink for WindowRepaintSink {
    fn request_repaint(&self) {
        let _ = unsafe { InvalidateRect(Some(HWND(self.hwnd as *mut c_void)), None, false) };
    }
}

pub struct Win32Backend {
    instance: HINSTANCE,
    toolkit: Weak<RefCell<Toolkit>>,
    paint_structs: HashMap<isize, PAINTSTRUCT>,
    /// Menu bar to the window displaying it, for redraws after edits.
    bar_windows: HashMap<isize, HWND>,
}

impl Win32Backend {
    pub(crate) fn new(instance: HINSTANCE, toolkit: Weak<RefCell<Toolkit>>) -> Self {
        Self {
            instance,
            toolkit,
            paint_structs: HashMap::new(),
            bar_windows: HashMap::new(),
        }
    }

    fn redraw_bar(&self, menu: NativeObject) {
        if let Some(window) = self.bar_windows.get(&menu.0) {
            let _ = unsafe { DrawMenuBar(*window) };
        }
    }

    fn font_height(points: i32) -> i32 {
        unsafe {
            let screen = GetDC(None);
            let height = -MulDiv(points, GetDeviceCaps(Some(screen), LOGPIXELSY), 72);
            ReleaseDC(None, screen);
            height
        }
    }
}

impl NativeBackend for Win32Backend {
    fn register_class(&mut self, class: WidgetClass, class_name: &str) -> PlatformResult<()> {
        register_window_class(self.instance, class, class_name)
    }

    fn create_native(&mut self, request: &NativeCreateRequest<'_>) -> PlatformResult<NativeHandle> {
        let mut style = WINDOW_STYLE(0);
        if request.visible {
            style |= WS_VISIBLE;
        }
        if !request.enabled {
            style |= WS_DISABLED;
        }
        let (x, y) = match request.parent {
            None => (CW_USEDEFAULT, CW_USEDEFAULT),
            Some(_) => (request.rect.x, request.rect.y),
        };
        let parent = request.parent.map(hwnd);
        let child_id = Some(HMENU(request.control_id as usize as *mut c_void));

        let created = unsafe {
            match leaf_class(request.class) {
                Some((class_name, class_style)) => CreateWindowExW(
                    WINDOW_EX_STYLE(0),
                    &HSTRING::from(class_name),
                    &HSTRING::from(request.text),
                    style | class_style | WS_CHILD,
                    x,
                    y,
                    request.rect.width,
                    request.rect.height,
                    parent,
                    child_id,
                    Some(self.instance),
                    None,
                ),
                None => {
                    // Top-level windows (owned ones included) take no child id.
                    let (class_style, menu) = if request.class.is_window() {
                        (WS_OVERLAPPEDWINDOW | WS_CLIPCHILDREN, None)
                    } else {
                        (WS_CHILD | WS_CLIPCHILDREN | WS_CLIPSIBLINGS, child_id)
                    };
                    CreateWindowExW(
                        WINDOW_EX_STYLE(0),
                        &HSTRING::from(request.class_name),
                        &HSTRING::from(request.text),
                        style | class_style,
                        x,
                        y,
                        request.rect.width,
                        request.rect.height,
                        parent,
                        menu,
                        Some(self.instance),
                        Some(into_create_param(self.toolkit.clone()) as *const c_void),
                    )
                }
            }
        };

        let window = created.map_err(|err| {
            PlatformError::WindowCreationFailed(format!("{:?}: {err}", request.class))
        })?;
        if request.class.is_leaf_control() {
            install_leaf_interception(window, self.toolkit.clone());
        }
        log::trace!("Win32: Created {:?} as {window:?}.", request.class);
        Ok(NativeHandle(window.0 as isize))
    }

    fn destroy_native(&mut self, handle: NativeHandle) {
        if let Err(err) = unsafe { DestroyWindow(hwnd(handle)) } {
            log::debug!("Win32: DestroyWindow({handle:?}) failed: {err}");
        }
    }

    fn set_parent(&mut self, handle: NativeHandle, parent: Option<NativeHandle>) {
        if let Err(err) = unsafe { SetParent(hwnd(handle), parent.map(hwnd)) } {
            log::warn!("Win32: SetParent({handle:?}) failed: {err}");
        }
    }

    fn set_enabled(&mut self, handle: NativeHandle, enabled: bool) {
        let _ = unsafe { EnableWindow(hwnd(handle), enabled) };
    }

    fn set_visible(&mut self, handle: NativeHandle, visible: bool) {
        let command = if visible { SW_SHOW } else { SW_HIDE };
        let _ = unsafe { ShowWindow(hwnd(handle), command) };
    }

    fn set_text(&mut self, handle: NativeHandle, text: &str) {
        if let Err(err) = unsafe { SetWindowTextW(hwnd(handle), &HSTRING::from(text)) } {
            log::warn!("Win32: SetWindowTextW({handle:?}) failed: {err}");
        }
    }

    fn read_text(&self, handle: NativeHandle) -> Option<String> {
        let window = hwnd(handle);
        let len = unsafe { GetWindowTextLengthW(window) };
        if len < 0 {
            return None;
        }
        let mut buffer = vec![0u16; len as usize + 1];
        let copied = unsafe { GetWindowTextW(window, &mut buffer) };
        if copied < 0 {
            return None;
        }
        buffer.truncate(copied as usize);
        Some(String::from_utf16_lossy(&buffer))
    }

    fn set_geometry(&mut self, handle: NativeHandle, rect: Rect) {
        let moved = unsafe {
            MoveWindow(hwnd(handle), rect.x, rect.y, rect.width, rect.height, true)
        };
        if let Err(err) = moved {
            log::warn!("Win32: MoveWindow({handle:?}) failed: {err}");
        }
    }

    fn set_font(&mut self, handle: NativeHandle, font: Option<NativeObject>) {
        let raw = font.map_or(0, |font| font.0 as usize);
        unsafe {
            SendMessageW(hwnd(handle), WM_SETFONT, Some(WPARAM(raw)), Some(LPARAM(1)));
        }
    }

    fn invalidate(&mut self, handle: NativeHandle) {
        let _ = unsafe { InvalidateRect(Some(hwnd(handle)), None, false) };
    }

    fn track_mouse_leave(&mut self, handle: NativeHandle) {
        let mut tme = TRACKMOUSEEVENT {
            cbSize: std::mem::size_of::<TRACKMOUSEEVENT>() as u32,
            dwFlags: TME_LEAVE,
            hwndTrack: hwnd(handle),
            dwHoverTime: 0,
        };
        if let Err(err) = unsafe { TrackMouseEvent(&mut tme) } {
            log::debug!("Win32: TrackMouseEvent({handle:?}) failed: {err}");
        }
    }

    fn set_check(&mut self, handle: NativeHandle, checked: bool) {
        let state = if checked { BST_CHECKED } else { BST_UNCHECKED };
        unsafe {
            SendMessageW(
                hwnd(handle),
                BM_SETCHECK,
                Some(WPARAM(state.0 as usize)),
                Some(LPARAM(0)),
            );
        }
    }

    fn set_list_items(&mut self, handle: NativeHandle, items: &[String]) {
        let window = hwnd(handle);
        unsafe {
            SendMessageW(window, LB_RESETCONTENT, Some(WPARAM(0)), Some(LPARAM(0)));
            for item in items {
                let text = HSTRING::from(item.as_str());
                SendMessageW(
                    window,
                    LB_ADDSTRING,
                    Some(WPARAM(0)),
                    Some(LPARAM(text.as_ptr() as isize)),
                );
            }
        }
    }

    fn set_list_selection(&mut self, handle: NativeHandle, index: i32) {
        unsafe {
            SendMessageW(
                hwnd(handle),
                LB_SETCURSEL,
                Some(WPARAM(index as isize as usize)),
                Some(LPARAM(0)),
            );
        }
    }

    fn read_list_selection(&self, handle: NativeHandle) -> i32 {
        unsafe { SendMessageW(hwnd(handle), LB_GETCURSEL, None, None) }.0 as i32
    }

    fn begin_paint(&mut self, handle: NativeHandle) -> Option<Rect> {
        let window = hwnd(handle);
        let mut ps = PAINTSTRUCT::default();
        let paint_dc = unsafe { BeginPaint(window, &mut ps) };
        if paint_dc.is_invalid() {
            return None;
        }
        let mut client = RECT::default();
        let _ = unsafe { GetClientRect(window, &mut client) };
        self.paint_structs.insert(handle.0, ps);
        Some(Rect::new(
            0,
            0,
            client.right - client.left,
            client.bottom - client.top,
        ))
    }

    fn end_paint(&mut self, handle: NativeHandle) {
        if let Some(ps) = self.paint_structs.remove(&handle.0) {
            let _ = unsafe { EndPaint(hwnd(handle), &ps) };
        }
    }

    fn acquire_surface(&mut self, handle: NativeHandle) -> Option<NativeObject> {
        // Classes with a surface are registered CS_OWNDC, so the DC is stable.
        let surface = unsafe { GetDC(Some(hwnd(handle))) };
        (!surface.is_invalid()).then(|| NativeObject(surface.0 as isize))
    }

    fn release_surface(&mut self, handle: NativeHandle, surface: NativeObject) {
        unsafe { ReleaseDC(Some(hwnd(handle)), hdc(surface)) };
    }

    fn fill_rect(&mut self, surface: NativeObject, rect: Rect, color: Color) {
        unsafe {
            let brush = CreateSolidBrush(to_colorref(color));
            FillRect(hdc(surface), &to_rect(rect), brush);
            let _ = DeleteObject(brush.into());
        }
    }

    fn frame_rect(&mut self, surface: NativeObject, rect: Rect, brush: NativeObject) {
        unsafe {
            FrameRect(
                hdc(surface),
                &to_rect(rect),
                HBRUSH(brush.0 as *mut c_void),
            );
        }
    }

    fn draw_text(&mut self, surface: NativeObject, rect: Rect, text: &str, color: Color) {
        let mut wide: Vec<u16> = text.encode_utf16().collect();
        let mut area = to_rect(rect);
        unsafe {
            SetBkMode(hdc(surface), TRANSPARENT);
            SetTextColor(hdc(surface), to_colorref(color));
            DrawTextW(
                hdc(surface),
                &mut wide,
                &mut area,
                DT_CENTER | DT_VCENTER | DT_SINGLELINE,
            );
        }
    }

    fn repaint_sink(&self, handle: NativeHandle) -> Arc<dyn RepaintSink> {
        Arc::new(WindowRepaintSink { hwnd: handle.0 })
    }

    fn create_brush(&mut self, color: Color) -> NativeObject {
        let brush = unsafe { CreateSolidBrush(to_colorref(color)) };
        NativeObject(brush.0 as isize)
    }

    fn create_font(&mut self, font: &FontDescription) -> Option<NativeObject> {
        let points = font.size.unwrap_or(DEFAULT_FONT_POINTS);
        if points <= 0 {
            return None;
        }
        let weight = match font.weight {
            Some(FontWeight::Bold) => FW_BOLD.0 as i32,
            _ => FW_NORMAL.0 as i32,
        };
        let name = HSTRING::from(font.name.as_deref().unwrap_or(DEFAULT_FONT_NAME));
        let hfont = unsafe {
            CreateFontW(
                Self::font_height(points),
                0,
                0,
                0,
                weight,
                0,
                0,
                0,
                DEFAULT_CHARSET,
                OUT_DEFAULT_PRECIS,
                CLIP_DEFAULT_PRECIS,
                DEFAULT_QUALITY,
                FF_DONTCARE.0 as u32,
                &name,
            )
        };
        if hfont.is_invalid() {
            log::warn!("Win32: CreateFontW failed for {font:?}.");
            return None;
        }
        Some(NativeObject(hfont.0 as isize))
    }

    fn delete_object(&mut self, object: NativeObject) {
        let _ = unsafe { DeleteObject(HGDIOBJ(object.0 as *mut c_void)) };
    }

    fn create_menu(&mut self, popup: bool) -> NativeObject {
        let created = unsafe {
            if popup {
                CreatePopupMenu()
            } else {
                CreateMenu()
            }
        };
        match created {
            Ok(menu) => NativeObject(menu.0 as isize),
            Err(err) => {
                log::error!("Win32: Menu creation failed: {err}");
                NativeObject(0)
            }
        }
    }

    fn append_menu_item(&mut self, menu: NativeObject, entry: &NativeMenuEntry<'_>) {
        let (flags, id) = menu_flags(entry);
        let text = HSTRING::from(entry.text);
        if let Err(err) = unsafe { AppendMenuW(hmenu(menu), flags, id, &text) } {
            log::warn!("Win32: AppendMenuW failed: {err}");
        }
        self.redraw_bar(menu);
    }

    /*
     * `ModifyMenuW` destroys the submenu of a popup entry it overwrites. The
     * toolkit owns submenu lifetimes, so a popup entry is detached and a fresh
     * entry inserted at the same position instead.
     */
    fn modify_menu_item(
        &mut self,
        menu: NativeObject,
        position: usize,
        entry: &NativeMenuEntry<'_>,
    ) {
        let (flags, id) = menu_flags(entry);
        let text = HSTRING::from(entry.text);
        let result = unsafe {
            if has_popup_at(menu, position) {
                RemoveMenu(hmenu(menu), position as u32, MF_BYPOSITION).and_then(|()| {
                    InsertMenuW(hmenu(menu), position as u32, flags | MF_BYPOSITION, id, &text)
                })
            } else {
                ModifyMenuW(hmenu(menu), position as u32, flags | MF_BYPOSITION, id, &text)
            }
        };
        if let Err(err) = result {
            log::warn!("Win32: Rewriting menu entry {position} failed: {err}");
        }
        self.redraw_bar(menu);
    }

    fn remove_menu_item(&mut self, menu: NativeObject, position: usize) {
        if let Err(err) = unsafe { RemoveMenu(hmenu(menu), position as u32, MF_BYPOSITION) } {
            log::warn!("Win32: RemoveMenu failed: {err}");
        }
        self.redraw_bar(menu);
    }

    fn set_menu_item_checked(&mut self, menu: NativeObject, position: usize, checked: bool) {
        let state = if checked { MF_CHECKED } else { MF_UNCHECKED };
        unsafe { CheckMenuItem(hmenu(menu), position as u32, (MF_BYPOSITION | state).0) };
    }

    fn set_window_menu(&mut self, handle: NativeHandle, menu: Option<NativeObject>) {
        let window = hwnd(handle);
        self.bar_windows.retain(|_, shown_in| *shown_in != window);
        if let Err(err) = unsafe { SetMenu(window, menu.map(hmenu)) } {
            log::warn!("Win32: SetMenu({handle:?}) failed: {err}");
            return;
        }
        if let Some(menu) = menu {
            self.bar_windows.insert(menu.0, window);
        }
        let _ = unsafe { DrawMenuBar(window) };
    }

    // `DestroyMenu` recurses into popups, so submenus are detached first.
    fn destroy_menu(&mut self, menu: NativeObject) {
        self.bar_windows.remove(&menu.0);
        let count = unsafe { GetMenuItemCount(Some(hmenu(menu))) };
        for position in (0..count.max(0) as usize).rev() {
            if has_popup_at(menu, position) {
                let _ = unsafe { RemoveMenu(hmenu(menu), position as u32, MF_BYPOSITION) };
            }
        }
        if let Err(err) = unsafe { DestroyMenu(hmenu(menu)) } {
            log::debug!("Win32: DestroyMenu failed: {err}");
        }
    }

    fn post_quit(&mut self, exit_code: i32) {
        unsafe { PostQuitMessage(exit_code) };
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rect_converts_to_edges() {
        let rect = to_rect(Rect::new(10, 20, 30, 40));
        assert_eq!((rect.left, rect.top, rect.right, rect.bottom), (10, 20, 40, 60));
    }

    #[test]
    fn leaf_classes_map_to_host_controls() {
        assert_eq!(leaf_class(WidgetClass::Button).map(|(name, _)| name), Some("BUTTON"));
        assert_eq!(leaf_class(WidgetClass::TextBox).map(|(name, _)| name), Some("EDIT"));
        assert_eq!(leaf_class(WidgetClass::ListBox).map(|(name, _)| name), Some("LISTBOX"));
        assert_eq!(leaf_class(WidgetClass::Label).map(|(name, _)| name), Some("STATIC"));
        assert!(leaf_class(WidgetClass::Frame).is_none());
    }

    #[test]
    fn listbox_style_requests_notifications() {
        let (_, style) = leaf_class(WidgetClass::ListBox).unwrap();
        assert_ne!(style.0 & LBS_NOTIFY as u32, 0);
    }

    #[test]
    fn menu_entry_flags_follow_state() {
        let plain = NativeMenuEntry {
            command_id: 30001,
            text: "Open",
            checked: false,
            enabled: true,
            submenu: None,
        };
        let popup = NativeMenuEntry {
            checked: true,
            enabled: false,
            submenu: Some(NativeObject(0x4400)),
            ..plain.clone()
        };

        let (plain_flags, plain_id) = menu_flags(&plain);
        let (popup_flags, popup_id) = menu_flags(&popup);

        assert_eq!(plain_flags, MF_STRING);
        assert_eq!(plain_id, 30001);
        assert_eq!(popup_flags, MF_STRING | MF_CHECKED | MF_GRAYED | MF_POPUP);
        assert_eq!(popup_id, 0x4400);
    }
}
