/*
 * In-memory native substrate. `HeadlessBackend` allocates handles and objects,
 * keeps per-window state the way a host would, and records every observable
 * side effect. A `HeadlessProbe` shares the same state so tests (and tools that
 * run the toolkit without a display) can inspect it after the backend has been
 * moved into a `Toolkit`.
 *
 * Native destruction cascades to child windows, as it does on the real host.
 * Menus follow the host too: destroying a menu destroys the popups its entries
 * still reference, and overwriting a popup entry in place frees the old popup.
 * The backend detaches popups before either can happen; any free of a menu that
 * is already gone is recorded and shows up through the probe.
 * The headless substrate never calls back into the toolkit; tests feed
 * notifications through `Toolkit::dispatch` themselves. With destroy echoes
 * switched on, `destroy_native` queues the WM_DESTROY the host would send for
 * every window it destroys, and the toolkit picks them up as sent notifications.
 */
use crate::backend::{NativeBackend, NativeCreateRequest, NativeMenuEntry, RepaintSink};
use crate::error::{PlatformError, Result as PlatformResult};
use crate::messages::WM_DESTROY;
use crate::styling::{Color, FontDescription};
use crate::types::{NativeHandle, NativeObject, Rect};
use crate::widget::WidgetClass;

use std::cell::RefCell;
use std::collections::{HashMap, HashSet};
use std::rc::Rc;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

const FIRST_HANDLE: isize = 0x1000;
const FIRST_OBJECT: isize = 0x8000;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeadlessWindow {
    pub class: WidgetClass,
    pub parent: Option<NativeHandle>,
    pub text: String,
    pub rect: Rect,
    pub visible: bool,
    pub enabled: bool,
    pub checked: bool,
    pub list_items: Vec<String>,
    pub list_selection: i32,
    pub menu: Option<NativeObject>,
    pub font: Option<NativeObject>,
    pub control_id: u16,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeadlessMenuEntry {
    pub command_id: u16,
    pub text: String,
    pub checked: bool,
    pub enabled: bool,
    pub submenu: Option<NativeObject>,
}

impl From<&NativeMenuEntry<'_>> for HeadlessMenuEntry {
    fn from(entry: &NativeMenuEntry<'_>) -> Self {
        Self {
            command_id: entry.command_id,
            text: entry.text.to_string(),
            checked: entry.checked,
            enabled: entry.enabled,
            submenu: entry.submenu,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DrawOp {
    Fill { rect: Rect, color: Color },
    Frame { rect: Rect, brush: NativeObject },
    Text { rect: Rect, text: String, color: Color },
}

#[derive(Debug, Default)]
struct HeadlessState {
    next_handle: isize,
    next_object: isize,
    registered_classes: Vec<String>,
    windows: HashMap<NativeHandle, HeadlessWindow>,
    destroyed: Vec<NativeHandle>,
    objects: HashSet<NativeObject>,
    surfaces: HashMap<NativeObject, NativeHandle>,
    menus: HashMap<NativeObject, Vec<HeadlessMenuEntry>>,
    stale_menu_frees: Vec<NativeObject>,
    invalidations: HashMap<NativeHandle, usize>,
    mouse_tracking: HashSet<NativeHandle>,
    painting: HashSet<NativeHandle>,
    draw_ops: Vec<DrawOp>,
    repaints: HashMap<NativeHandle, Arc<AtomicUsize>>,
    quit_posted: Option<i32>,
    echo_destroy: bool,
    sent: Vec<(NativeHandle, u32)>,
    fail_class_registration: bool,
    fail_window_creation: bool,
}

impl HeadlessState {
    fn allocate_object(&mut self) -> NativeObject {
        if self.next_object == 0 {
            self.next_object = FIRST_OBJECT;
        }
        let object = NativeObject(self.next_object);
        self.next_object += 1;
        object
    }

    fn popup_at(&self, menu: NativeObject, position: usize) -> Option<NativeObject> {
        self.menus
            .get(&menu)
            .and_then(|entries| entries.get(position))
            .and_then(|entry| entry.submenu)
    }

    // Host `DestroyMenu`: recurses into every popup still referenced.
    fn free_menu_tree(&mut self, menu: NativeObject) {
        let Some(entries) = self.menus.remove(&menu) else {
            log::warn!("HeadlessBackend: {menu:?} freed twice.");
            self.stale_menu_frees.push(menu);
            return;
        };
        for submenu in entries.into_iter().filter_map(|entry| entry.submenu) {
            self.free_menu_tree(submenu);
        }
    }

    // Host `ModifyMenu`: overwriting a popup entry frees the popup.
    fn overwrite_entry(&mut self, menu: NativeObject, position: usize, entry: HeadlessMenuEntry) {
        let Some(slot) = self
            .menus
            .get_mut(&menu)
            .and_then(|entries| entries.get_mut(position))
        else {
            return;
        };
        let previous = std::mem::replace(slot, entry);
        if let Some(old_popup) = previous.submenu {
            self.free_menu_tree(old_popup);
        }
    }

    fn descendants_of(&self, handle: NativeHandle) -> Vec<NativeHandle> {
        let mut found = Vec::new();
        let mut frontier = vec![handle];
        while let Some(current) = frontier.pop() {
            let mut children: Vec<NativeHandle> = self
                .windows
                .iter()
                .filter(|(_, window)| window.parent == Some(current))
                .map(|(child, _)| *child)
                .collect();
            children.sort();
            frontier.extend(children.iter().copied());
            found.extend(children);
        }
        found
    }
}

/// Native substrate that keeps all state in memory.
#[derive(Debug, Default)]
pub struct HeadlessBackend {
    state: Rc<RefCell<HeadlessState>>,
}

impl HeadlessBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn probe(&self) -> HeadlessProbe {
        HeadlessProbe {
            state: Rc::clone(&self.state),
        }
    }
}

/// Read side of a `HeadlessBackend`, plus a few hooks to simulate user input and host failures.
#[derive(Debug, Clone)]
pub struct HeadlessProbe {
    state: Rc<RefCell<HeadlessState>>,
}

impl HeadlessProbe {
    pub fn is_live(&self, handle: NativeHandle) -> bool {
        self.state.borrow().windows.contains_key(&handle)
    }

    pub fn live_window_count(&self) -> usize {
        self.state.borrow().windows.len()
    }

    pub fn window(&self, handle: NativeHandle) -> Option<HeadlessWindow> {
        self.state.borrow().windows.get(&handle).cloned()
    }

    pub fn destroyed_handles(&self) -> Vec<NativeHandle> {
        self.state.borrow().destroyed.clone()
    }

    /// Brushes and fonts currently allocated.
    pub fn live_object_count(&self) -> usize {
        self.state.borrow().objects.len()
    }

    pub fn live_surface_count(&self) -> usize {
        self.state.borrow().surfaces.len()
    }

    pub fn live_menu_count(&self) -> usize {
        self.state.borrow().menus.len()
    }

    pub fn menu_entries(&self, menu: NativeObject) -> Vec<HeadlessMenuEntry> {
        self.state
            .borrow()
            .menus
            .get(&menu)
            .cloned()
            .unwrap_or_default()
    }

    /// Menus freed after they were already gone. Empty unless something double-freed.
    pub fn stale_menu_frees(&self) -> Vec<NativeObject> {
        self.state.borrow().stale_menu_frees.clone()
    }

    pub fn window_menu(&self, handle: NativeHandle) -> Option<NativeObject> {
        self.state
            .borrow()
            .windows
            .get(&handle)
            .and_then(|window| window.menu)
    }

    pub fn registered_classes(&self) -> Vec<String> {
        self.state.borrow().registered_classes.clone()
    }

    pub fn invalidation_count(&self, handle: NativeHandle) -> usize {
        self.state
            .borrow()
            .invalidations
            .get(&handle)
            .copied()
            .unwrap_or(0)
    }

    pub fn is_tracking_mouse(&self, handle: NativeHandle) -> bool {
        self.state.borrow().mouse_tracking.contains(&handle)
    }

    pub fn repaint_count(&self, handle: NativeHandle) -> usize {
        self.state
            .borrow()
            .repaints
            .get(&handle)
            .map(|counter| counter.load(Ordering::SeqCst))
            .unwrap_or(0)
    }

    pub fn take_draw_ops(&self) -> Vec<DrawOp> {
        std::mem::take(&mut self.state.borrow_mut().draw_ops)
    }

    pub fn quit_posted(&self) -> Option<i32> {
        self.state.borrow().quit_posted
    }

    /// Simulates the user editing a text control.
    pub fn type_text(&self, handle: NativeHandle, text: &str) {
        if let Some(window) = self.state.borrow_mut().windows.get_mut(&handle) {
            window.text = text.to_string();
        }
    }

    /// Simulates the user picking a list entry.
    pub fn pick_list_entry(&self, handle: NativeHandle, index: i32) {
        if let Some(window) = self.state.borrow_mut().windows.get_mut(&handle) {
            window.list_selection = index;
        }
    }

    /// Sent notifications the toolkit has not picked up yet.
    pub fn queued_notifications(&self) -> usize {
        self.state.borrow().sent.len()
    }

    pub fn echo_destroy_notifications(&self, echo: bool) {
        self.state.borrow_mut().echo_destroy = echo;
    }

    pub fn fail_class_registration(&self, fail: bool) {
        self.state.borrow_mut().fail_class_registration = fail;
    }

    pub fn fail_window_creation(&self, fail: bool) {
        self.state.borrow_mut().fail_window_creation = fail;
    }
}

struct CountingSink {
    counter: Arc<AtomicUsize>,
}

impl RepaintSink for CountingSink {
    fn request_repaint(&self) {
        self.counter.fetch_add(1, Ordering::SeqCst);
    }
}

impl NativeBackend for HeadlessBackend {
    fn register_class(&mut self, class: WidgetClass, class_name: &str) -> PlatformResult<()> {
        let mut state = self.state.borrow_mut();
        if state.fail_class_registration {
            return Err(PlatformError::ClassRegistrationFailed(format!(
                "{class_name} ({class:?})"
            )));
        }
        state.registered_classes.push(class_name.to_string());
        Ok(())
    }

    fn create_native(&mut self, request: &NativeCreateRequest<'_>) -> PlatformResult<NativeHandle> {
        let mut state = self.state.borrow_mut();
        if state.fail_window_creation {
            return Err(PlatformError::WindowCreationFailed(format!(
                "{:?} '{}'",
                request.class, request.text
            )));
        }
        if let Some(parent) = request.parent
            && !state.windows.contains_key(&parent)
        {
            return Err(PlatformError::InvalidHandle(format!(
                "parent {parent:?} is not a live window"
            )));
        }
        if state.next_handle == 0 {
            state.next_handle = FIRST_HANDLE;
        }
        let handle = NativeHandle(state.next_handle);
        state.next_handle += 0x10;
        state.windows.insert(
            handle,
            HeadlessWindow {
                class: request.class,
                parent: request.parent,
                text: request.text.to_string(),
                rect: request.rect,
                visible: request.visible,
                enabled: request.enabled,
                checked: false,
                list_items: Vec::new(),
                list_selection: -1,
                menu: None,
                font: None,
                control_id: request.control_id,
            },
        );
        Ok(handle)
    }

    fn destroy_native(&mut self, handle: NativeHandle) {
        let mut state = self.state.borrow_mut();
        if !state.windows.contains_key(&handle) {
            return;
        }
        let mut doomed = state.descendants_of(handle);
        doomed.reverse();
        doomed.push(handle);
        for window in doomed {
            state.windows.remove(&window);
            state.mouse_tracking.remove(&window);
            state.destroyed.push(window);
            if state.echo_destroy {
                state.sent.push((window, WM_DESTROY));
            }
        }
    }

    fn take_sent_notifications(&mut self) -> Vec<(NativeHandle, u32)> {
        std::mem::take(&mut self.state.borrow_mut().sent)
    }

    fn set_parent(&mut self, handle: NativeHandle, parent: Option<NativeHandle>) {
        if let Some(window) = self.state.borrow_mut().windows.get_mut(&handle) {
            window.parent = parent;
        }
    }

    fn set_enabled(&mut self, handle: NativeHandle, enabled: bool) {
        if let Some(window) = self.state.borrow_mut().windows.get_mut(&handle) {
            window.enabled = enabled;
        }
    }

    fn set_visible(&mut self, handle: NativeHandle, visible: bool) {
        if let Some(window) = self.state.borrow_mut().windows.get_mut(&handle) {
            window.visible = visible;
        }
    }

    fn set_text(&mut self, handle: NativeHandle, text: &str) {
        if let Some(window) = self.state.borrow_mut().windows.get_mut(&handle) {
            window.text = text.to_string();
        }
    }

    fn read_text(&self, handle: NativeHandle) -> Option<String> {
        self.state
            .borrow()
            .windows
            .get(&handle)
            .map(|window| window.text.clone())
    }

    fn set_geometry(&mut self, handle: NativeHandle, rect: Rect) {
        if let Some(window) = self.state.borrow_mut().windows.get_mut(&handle) {
            window.rect = rect;
        }
    }

    fn set_font(&mut self, handle: NativeHandle, font: Option<NativeObject>) {
        if let Some(window) = self.state.borrow_mut().windows.get_mut(&handle) {
            window.font = font;
        }
    }

    fn invalidate(&mut self, handle: NativeHandle) {
        *self
            .state
            .borrow_mut()
            .invalidations
            .entry(handle)
            .or_default() += 1;
    }

    fn track_mouse_leave(&mut self, handle: NativeHandle) {
        self.state.borrow_mut().mouse_tracking.insert(handle);
    }

    fn set_check(&mut self, handle: NativeHandle, checked: bool) {
        if let Some(window) = self.state.borrow_mut().windows.get_mut(&handle) {
            window.checked = checked;
        }
    }

    fn set_list_items(&mut self, handle: NativeHandle, items: &[String]) {
        if let Some(window) = self.state.borrow_mut().windows.get_mut(&handle) {
            window.list_items = items.to_vec();
            window.list_selection = -1;
        }
    }

    fn set_list_selection(&mut self, handle: NativeHandle, index: i32) {
        if let Some(window) = self.state.borrow_mut().windows.get_mut(&handle) {
            window.list_selection = index;
        }
    }

    fn read_list_selection(&self, handle: NativeHandle) -> i32 {
        self.state
            .borrow()
            .windows
            .get(&handle)
            .map(|window| window.list_selection)
            .unwrap_or(-1)
    }

    fn begin_paint(&mut self, handle: NativeHandle) -> Option<Rect> {
        let mut state = self.state.borrow_mut();
        let rect = state.windows.get(&handle).map(|window| window.rect)?;
        state.painting.insert(handle);
        Some(Rect::new(0, 0, rect.width, rect.height))
    }

    fn end_paint(&mut self, handle: NativeHandle) {
        self.state.borrow_mut().painting.remove(&handle);
    }

    fn acquire_surface(&mut self, handle: NativeHandle) -> Option<NativeObject> {
        let mut state = self.state.borrow_mut();
        if !state.windows.contains_key(&handle) {
            return None;
        }
        let surface = state.allocate_object();
        state.surfaces.insert(surface, handle);
        Some(surface)
    }

    fn release_surface(&mut self, _handle: NativeHandle, surface: NativeObject) {
        self.state.borrow_mut().surfaces.remove(&surface);
    }

    fn fill_rect(&mut self, _surface: NativeObject, rect: Rect, color: Color) {
        self.state
            .borrow_mut()
            .draw_ops
            .push(DrawOp::Fill { rect, color });
    }

    fn frame_rect(&mut self, _surface: NativeObject, rect: Rect, brush: NativeObject) {
        self.state
            .borrow_mut()
            .draw_ops
            .push(DrawOp::Frame { rect, brush });
    }

    fn draw_text(&mut self, _surface: NativeObject, rect: Rect, text: &str, color: Color) {
        self.state.borrow_mut().draw_ops.push(DrawOp::Text {
            rect,
            text: text.to_string(),
            color,
        });
    }

    fn repaint_sink(&self, handle: NativeHandle) -> Arc<dyn RepaintSink> {
        let counter = Arc::clone(
            self.state
                .borrow_mut()
                .repaints
                .entry(handle)
                .or_insert_with(|| Arc::new(AtomicUsize::new(0))),
        );
        Arc::new(CountingSink { counter })
    }

    fn create_brush(&mut self, _color: Color) -> NativeObject {
        let mut state = self.state.borrow_mut();
        let brush = state.allocate_object();
        state.objects.insert(brush);
        brush
    }

    fn create_font(&mut self, font: &FontDescription) -> Option<NativeObject> {
        if font.size.is_some_and(|size| size <= 0) {
            return None;
        }
        let mut state = self.state.borrow_mut();
        let object = state.allocate_object();
        state.objects.insert(object);
        Some(object)
    }

    fn delete_object(&mut self, object: NativeObject) {
        let removed = self.state.borrow_mut().objects.remove(&object);
        if !removed {
            log::warn!("HeadlessBackend: delete_object on unknown {object:?}.");
        }
    }

    fn create_menu(&mut self, _popup: bool) -> NativeObject {
        let mut state = self.state.borrow_mut();
        let menu = state.allocate_object();
        state.menus.insert(menu, Vec::new());
        menu
    }

    fn append_menu_item(&mut self, menu: NativeObject, entry: &NativeMenuEntry<'_>) {
        if let Some(entries) = self.state.borrow_mut().menus.get_mut(&menu) {
            entries.push(entry.into());
        }
    }

    fn modify_menu_item(
        &mut self,
        menu: NativeObject,
        position: usize,
        entry: &NativeMenuEntry<'_>,
    ) {
        let mut state = self.state.borrow_mut();
        if state.popup_at(menu, position).is_none() {
            state.overwrite_entry(menu, position, entry.into());
            return;
        }
        // Detach the popup entry so the old submenu survives, then insert afresh.
        if let Some(entries) = state.menus.get_mut(&menu) {
            entries.remove(position);
            entries.insert(position, entry.into());
        }
    }

    fn remove_menu_item(&mut self, menu: NativeObject, position: usize) {
        if let Some(entries) = self.state.borrow_mut().menus.get_mut(&menu)
            && position < entries.len()
        {
            entries.remove(position);
        }
    }

    fn set_menu_item_checked(&mut self, menu: NativeObject, position: usize, checked: bool) {
        if let Some(entry) = self
            .state
            .borrow_mut()
            .menus
            .get_mut(&menu)
            .and_then(|entries| entries.get_mut(position))
        {
            entry.checked = checked;
        }
    }

    fn set_window_menu(&mut self, handle: NativeHandle, menu: Option<NativeObject>) {
        if let Some(window) = self.state.borrow_mut().windows.get_mut(&handle) {
            window.menu = menu;
        }
    }

    fn destroy_menu(&mut self, menu: NativeObject) {
        let mut state = self.state.borrow_mut();
        if state.windows.values().any(|window| window.menu == Some(menu)) {
            log::warn!("HeadlessBackend: {menu:?} destroyed while still attached to a window.");
        }
        if let Some(entries) = state.menus.get_mut(&menu) {
            entries.retain(|entry| entry.submenu.is_none());
        }
        state.free_menu_tree(menu);
    }

    fn post_quit(&mut self, exit_code: i32) {
        self.state.borrow_mut().quit_posted = Some(exit_code);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(class: WidgetClass, parent: Option<NativeHandle>) -> NativeCreateRequest<'static> {
        NativeCreateRequest {
            class,
            class_name: "Test",
            parent,
            text: "",
            rect: Rect::new(0, 0, 10, 10),
            visible: true,
            enabled: true,
            control_id: 1,
        }
    }

    #[test]
    fn destroying_a_window_destroys_native_descendants() {
        let mut backend = HeadlessBackend::new();
        let probe = backend.probe();
        let root = backend
            .create_native(&request(WidgetClass::Window, None))
            .unwrap();
        let frame = backend
            .create_native(&request(WidgetClass::Frame, Some(root)))
            .unwrap();
        let button = backend
            .create_native(&request(WidgetClass::Button, Some(frame)))
            .unwrap();

        backend.destroy_native(root);

        assert_eq!(probe.live_window_count(), 0);
        assert_eq!(probe.destroyed_handles(), vec![button, frame, root]);
    }

    fn entry(command_id: u16, submenu: Option<NativeObject>) -> NativeMenuEntry<'static> {
        NativeMenuEntry {
            command_id,
            text: "Entry",
            checked: false,
            enabled: true,
            submenu,
        }
    }

    #[test]
    fn destroying_a_menu_leaves_its_submenus_alive() {
        let mut backend = HeadlessBackend::new();
        let probe = backend.probe();
        let bar = backend.create_menu(false);
        let file = backend.create_menu(true);
        backend.append_menu_item(bar, &entry(30000, Some(file)));

        backend.destroy_menu(bar);

        assert_eq!(probe.live_menu_count(), 1);
        assert!(probe.stale_menu_frees().is_empty());
        backend.destroy_menu(file);
        assert_eq!(probe.live_menu_count(), 0);
    }

    #[test]
    fn rewriting_a_popup_entry_keeps_the_old_submenu() {
        let mut backend = HeadlessBackend::new();
        let probe = backend.probe();
        let bar = backend.create_menu(false);
        let old = backend.create_menu(true);
        let new = backend.create_menu(true);
        backend.append_menu_item(bar, &entry(30000, Some(old)));

        backend.modify_menu_item(bar, 0, &entry(30000, Some(new)));

        assert_eq!(probe.live_menu_count(), 3);
        assert_eq!(probe.menu_entries(bar)[0].submenu, Some(new));
        backend.modify_menu_item(bar, 0, &entry(30000, None));
        assert_eq!(probe.live_menu_count(), 3);
        assert_eq!(probe.menu_entries(bar)[0].submenu, None);
    }

    #[test]
    fn second_destroy_of_a_menu_is_recorded() {
        let mut backend = HeadlessBackend::new();
        let probe = backend.probe();
        let menu = backend.create_menu(true);

        backend.destroy_menu(menu);
        backend.destroy_menu(menu);

        assert_eq!(probe.stale_menu_frees(), vec![menu]);
    }

    #[test]
    fn destroy_echoes_are_queued_only_when_requested() {
        let mut backend = HeadlessBackend::new();
        let probe = backend.probe();
        let quiet = backend
            .create_native(&request(WidgetClass::Window, None))
            .unwrap();
        backend.destroy_native(quiet);
        assert!(backend.take_sent_notifications().is_empty());

        probe.echo_destroy_notifications(true);
        let root = backend
            .create_native(&request(WidgetClass::Window, None))
            .unwrap();
        let frame = backend
            .create_native(&request(WidgetClass::Frame, Some(root)))
            .unwrap();
        backend.destroy_native(root);

        assert_eq!(probe.queued_notifications(), 2);
        assert_eq!(
            backend.take_sent_notifications(),
            vec![(frame, WM_DESTROY), (root, WM_DESTROY)]
        );
        assert_eq!(probe.queued_notifications(), 0);
    }

    #[test]
    fn creating_under_dead_parent_fails() {
        let mut backend = HeadlessBackend::new();
        let result = backend.create_native(&request(WidgetClass::Button, Some(NativeHandle(0x77))));
        assert!(matches!(result, Err(PlatformError::InvalidHandle(_))));
    }

    #[test]
    fn repaint_sink_counts_across_threads() {
        let backend = HeadlessBackend::new();
        let probe = backend.probe();
        let sink = backend.repaint_sink(NativeHandle(0x1000));

        let worker = std::thread::spawn(move || {
            sink.request_repaint();
            sink.request_repaint();
        });
        worker.join().unwrap();

        assert_eq!(probe.repaint_count(NativeHandle(0x1000)), 2);
    }
}
