/*
 * The toolkit context: one per process, constructed at start-up and passed to
 * whatever needs it. It owns the native backend, the handle registry, the
 * decorator pools and the widget arena, and implements the ownership tree
 * (create, link, destroy), modal/inert propagation and callback dispatch.
 *
 * Message routing lives in `router`, per-control behavior in `controls`; both
 * extend `Toolkit` with further `impl` blocks or free functions over it.
 */
use crate::animation::AnimationSpec;
use crate::backend::{NativeBackend, NativeCreateRequest};
use crate::callbacks::{
    DefaultAction, MenuCallback, MenuEvent, MenuEventKind, Slot, WidgetCallback,
};
use crate::controls;
use crate::error::{PlatformError, Result as PlatformResult, fatal};
use crate::headless::{HeadlessBackend, HeadlessProbe};
use crate::painter::{BasicPainter, WidgetPainter};
use crate::registry::{HandleRegistry, Unregistered};
use crate::resources::{
    AttachmentSlot, BorderId, BorderParams, Decorators, MenuId, MenuItemId, MenuItemParams,
    MenuParams,
};
use crate::styling::{FontDescription, Palette};
use crate::types::{
    EventKind, NativeHandle, NativeObject, Rect, ToolkitConfig, WidgetConfig, WidgetEvent,
    WidgetId,
};
use crate::widget::{Widget, WidgetClass, WidgetFlags};

use std::collections::{HashMap, HashSet};

pub struct Toolkit {
    config: ToolkitConfig,
    pub(crate) backend: Box<dyn NativeBackend>,
    pub(crate) registry: HandleRegistry,
    pub(crate) decorators: Decorators,
    pub(crate) widgets: HashMap<WidgetId, Widget>,
    next_widget_id: u64,
    registered_classes: HashSet<WidgetClass>,
    menu_callbacks: HashMap<MenuItemId, MenuCallback>,
    pub(crate) painter: Box<dyn WidgetPainter>,
    shutting_down: bool,
}

impl Toolkit {
    pub fn new(config: ToolkitConfig, backend: Box<dyn NativeBackend>) -> Self {
        log::debug!("Toolkit: Starting '{}'.", config.app_name);
        Self {
            config,
            backend,
            registry: HandleRegistry::new(),
            decorators: Decorators::new(),
            widgets: HashMap::new(),
            next_widget_id: 1,
            registered_classes: HashSet::new(),
            menu_callbacks: HashMap::new(),
            painter: Box::new(BasicPainter),
            shutting_down: false,
        }
    }

    /// Toolkit over an in-memory substrate, plus a probe into that substrate.
    pub fn headless(config: ToolkitConfig) -> (Self, HeadlessProbe) {
        let backend = HeadlessBackend::new();
        let probe = backend.probe();
        (Self::new(config, Box::new(backend)), probe)
    }

    pub fn config(&self) -> &ToolkitConfig {
        &self.config
    }

    pub fn set_painter(&mut self, painter: Box<dyn WidgetPainter>) {
        self.painter = painter;
    }

    pub fn widget(&self, id: WidgetId) -> Option<&Widget> {
        self.widgets.get(&id)
    }

    pub fn widget_count(&self) -> usize {
        self.widgets.len()
    }

    /// Registry lookup; `None` for handles that are unknown, not yet registered or gone.
    pub fn lookup(&self, handle: NativeHandle) -> Option<WidgetId> {
        self.registry.lookup(handle)
    }

    pub fn registered_count(&self) -> usize {
        self.registry.len()
    }

    /// Native class name used for a toolkit class.
    pub fn class_name(&self, class: WidgetClass) -> String {
        if class.is_leaf_control() {
            class.name().to_string()
        } else {
            format!("{}_{}", self.config.app_name, class.name())
        }
    }

    // Ownership tree

    /*
     * Builds the wrapper only. Nothing native happens until `create`; `parent`
     * is recorded as a back-reference and checked at creation time.
     */
    pub fn new_widget(
        &mut self,
        class: WidgetClass,
        parent: Option<WidgetId>,
        config: WidgetConfig,
    ) -> WidgetId {
        let id = WidgetId(self.next_widget_id);
        self.next_widget_id += 1;
        self.widgets
            .insert(id, Widget::new(id, class, parent, config));
        log::trace!("OwnershipTree: New {class:?} {id:?} (parent {parent:?}).");
        id
    }

    /*
     * Allocates the native handle and registers it. A no-op for a widget that
     * already exists. Creating an owner-drawn sub-element without an existing
     * parent, or failing to register or create the native window, is fatal.
     */
    pub fn create(&mut self, id: WidgetId) -> PlatformResult<NativeHandle> {
        let Some(widget) = self.widgets.get(&id) else {
            log::warn!("OwnershipTree: create of unknown {id:?} ignored.");
            return Err(PlatformError::UnknownWidget(format!("{id:?}")));
        };
        if widget.exists() {
            return Ok(widget.handle);
        }
        let class = widget.class;
        let parent = widget.parent;

        let parent_handle = match parent {
            Some(parent_id) => match self.widgets.get(&parent_id) {
                Some(parent_widget) if parent_widget.exists() => Some(parent_widget.handle),
                _ => fatal(PlatformError::MissingParent(format!(
                    "{class:?} {id:?} created before its parent {parent_id:?} exists"
                ))),
            },
            None if class.requires_parent() => fatal(PlatformError::MissingParent(format!(
                "{class:?} {id:?} has no parent"
            ))),
            None => None,
        };

        self.ensure_class_registered(class);
        let class_name = self.class_name(class);

        let handle = {
            let Some(widget) = self.widgets.get(&id) else {
                return Err(PlatformError::UnknownWidget(format!("{id:?}")));
            };
            let request = NativeCreateRequest {
                class,
                class_name: &class_name,
                parent: parent_handle,
                text: &widget.text,
                rect: widget.rect,
                visible: widget.is_visible(),
                enabled: !widget.is_inert(),
                control_id: id.control_id(),
            };
            match self.backend.create_native(&request) {
                Ok(handle) => handle,
                Err(err) => fatal(err),
            }
        };

        self.registry.register(handle, id);
        let (staged, font) = match self.widgets.get_mut(&id) {
            Some(widget) => {
                widget.handle = handle;
                (std::mem::take(&mut widget.staged), widget.font)
            }
            None => return Err(PlatformError::UnknownWidget(format!("{id:?}"))),
        };
        if let Some(parent_id) = parent
            && let Some(parent_widget) = self.widgets.get_mut(&parent_id)
            && !parent_widget.children.contains(&id)
        {
            parent_widget.children.push(id);
        }

        if class.owns_surface() {
            let surface = self.backend.acquire_surface(handle);
            if surface.is_none() {
                log::warn!("OwnershipTree: No drawing surface for {class:?} {id:?}.");
            }
            if let Some(widget) = self.widgets.get_mut(&id) {
                widget.surface = surface;
            }
        }
        if font.is_some() {
            self.backend.set_font(handle, font);
        }

        if let Some(border) = staged.border
            && !self.decorators.attach_border(
                AttachmentSlot::ContentBorder(id),
                Some(border),
                self.backend.as_mut(),
            )
        {
            log::warn!("OwnershipTree: Staged border {border:?} for {id:?} is no longer usable.");
        }
        if let Some(border) = staged.focus_border
            && !self.decorators.attach_border(
                AttachmentSlot::FocusBorder(id),
                Some(border),
                self.backend.as_mut(),
            )
        {
            log::warn!(
                "OwnershipTree: Staged focus border {border:?} for {id:?} is no longer usable."
            );
        }
        if let Some(menu) = staged.menu_bar
            && !self
                .decorators
                .set_menu_bar(id, handle, Some(menu), self.backend.as_mut())
        {
            log::warn!("OwnershipTree: Staged menu bar {menu:?} for {id:?} is no longer usable.");
        }

        controls::sync_native_state(self, id);

        if let Some(widget) = self.widgets.get_mut(&id) {
            widget.callbacks.install_defaults(class);
            widget.flags.insert(WidgetFlags::EXISTS);
        }
        if class.is_window()
            && let Some(parent_id) = parent
        {
            self.refresh_idle(parent_id);
        }
        log::debug!("OwnershipTree: Created {class:?} {id:?} as {handle:?}.");
        Ok(handle)
    }

    fn ensure_class_registered(&mut self, class: WidgetClass) {
        if class.is_leaf_control() || self.registered_classes.contains(&class) {
            return;
        }
        let class_name = self.class_name(class);
        if let Err(err) = self.backend.register_class(class, &class_name) {
            fatal(err);
        }
        log::debug!("Toolkit: Registered native class '{class_name}'.");
        self.registered_classes.insert(class);
    }

    /*
     * Makes `parent` the owner of `child`. The parent must already exist;
     * linking under a parent without a native handle is fatal. An existing child
     * is moved natively as well.
     */
    pub fn link(&mut self, parent: WidgetId, child: WidgetId) {
        let parent_handle = match self.widgets.get(&parent) {
            Some(parent_widget) if parent_widget.exists() => parent_widget.handle,
            _ => fatal(PlatformError::MissingParent(format!(
                "link of {child:?} under {parent:?}, which does not exist"
            ))),
        };
        let Some(child_widget) = self.widgets.get(&child) else {
            log::warn!("OwnershipTree: link of unknown child {child:?} ignored.");
            return;
        };
        if child == parent || self.is_ancestor(child, parent) {
            log::warn!("OwnershipTree: link of {child:?} under {parent:?} would form a cycle.");
            return;
        }
        let old_parent = child_widget.parent;
        let child_exists = child_widget.exists();
        let child_handle = child_widget.handle;
        let child_is_window = child_widget.class.is_window();

        if old_parent == Some(parent)
            && (!child_exists
                || self
                    .widgets
                    .get(&parent)
                    .is_some_and(|p| p.children.contains(&child)))
        {
            return;
        }
        if let Some(old) = old_parent
            && let Some(old_widget) = self.widgets.get_mut(&old)
        {
            old_widget.children.retain(|other| *other != child);
        }
        if let Some(child_widget) = self.widgets.get_mut(&child) {
            child_widget.parent = Some(parent);
        }
        if child_exists {
            if let Some(parent_widget) = self.widgets.get_mut(&parent) {
                parent_widget.children.push(child);
            }
            self.backend.set_parent(child_handle, Some(parent_handle));
            if child_is_window {
                if let Some(old) = old_parent {
                    self.refresh_idle(old);
                }
                self.refresh_idle(parent);
            }
        }
        log::debug!("OwnershipTree: Linked {child:?} under {parent:?}.");
    }

    fn is_ancestor(&self, ancestor: WidgetId, mut node: WidgetId) -> bool {
        while let Some(parent) = self.widgets.get(&node).and_then(|w| w.parent) {
            if parent == ancestor {
                return true;
            }
            node = parent;
        }
        false
    }

    /*
     * Tears down `id` and all of its descendants, children first, then destroys
     * the native window (which natively takes its child windows with it).
     * Returns the number of widgets torn down; 0 for an unknown widget or one
     * that is already being torn down.
     */
    pub fn destroy(&mut self, id: WidgetId) -> usize {
        self.destroy_tree(id, true)
    }

    /// Teardown requested by the host after it destroyed the native window itself.
    pub(crate) fn destroy_from_native(&mut self, id: WidgetId) -> usize {
        self.destroy_tree(id, false)
    }

    /*
     * Tears down `id` and its subtree bottom-up. Every widget in the subtree is
     * flagged and stripped of its resources while it is still registered, so
     * teardown notifications the host sends for it in the meantime find it
     * already tearing down. Only then do the widgets leave the arena.
     */
    fn destroy_tree(&mut self, id: WidgetId, destroy_native: bool) -> usize {
        let Some(widget) = self.widgets.get(&id) else {
            log::debug!("OwnershipTree: destroy of unknown {id:?} ignored.");
            return 0;
        };
        if widget.is_tearing_down() {
            log::debug!("OwnershipTree: {id:?} is already tearing down.");
            return 0;
        }
        let handle = widget.handle;
        let existed = widget.exists();
        let parent = widget.parent;

        let mut doomed = Vec::new();
        self.begin_teardown(id, &mut doomed);
        if destroy_native && existed {
            self.backend.destroy_native(handle);
        }
        for (sent_to, msg) in self.backend.take_sent_notifications() {
            self.dispatch(sent_to, msg, 0, 0);
        }
        let count = self.finish_teardown(doomed);

        if let Some(parent_id) = parent {
            if let Some(parent_widget) = self.widgets.get_mut(&parent_id) {
                parent_widget.children.retain(|other| *other != id);
            }
            self.refresh_idle(parent_id);
        }
        log::debug!("OwnershipTree: Destroyed {id:?} ({count} widget(s)).");
        count
    }

    fn begin_teardown(&mut self, id: WidgetId, doomed: &mut Vec<WidgetId>) {
        let Some(widget) = self.widgets.get_mut(&id) else {
            return;
        };
        widget.flags.insert(WidgetFlags::TEARING_DOWN);
        let children = std::mem::take(&mut widget.children);
        for child in children {
            self.begin_teardown(child, doomed);
        }

        let Some(widget) = self.widgets.get_mut(&id) else {
            return;
        };
        if let Some(slot) = widget.animator_mut()
            && let Some(mut animator) = slot.take()
        {
            animator.stop();
        }
        if widget.exists() {
            let released =
                self.decorators
                    .release_widget(id, widget.handle, self.backend.as_mut());
            log::trace!("OwnershipTree: {id:?} released {released} border attachment(s).");
            if let Some(surface) = widget.surface.take() {
                self.backend.release_surface(widget.handle, surface);
            }
        }
        if let Some(font) = widget.font.take() {
            self.backend.delete_object(font);
        }
        widget.callbacks.clear();
        doomed.push(id);
    }

    fn finish_teardown(&mut self, doomed: Vec<WidgetId>) -> usize {
        let mut count = 0;
        for id in doomed {
            let Some(widget) = self.widgets.remove(&id) else {
                continue;
            };
            if widget.exists() {
                self.unregister_handle(widget.handle);
            }
            count += 1;
        }
        count
    }

    pub(crate) fn unregister_handle(&mut self, handle: NativeHandle) {
        if self.registry.unregister(handle) == Unregistered::RemovedLast
            && self.config.quit_when_last_widget_closes
            && !self.shutting_down
        {
            log::debug!("Toolkit: Last widget gone; requesting quit.");
            self.backend.post_quit(0);
        }
    }

    // Modal and inert state

    /*
     * Marks a window modal (or not) and re-evaluates its parent. Without a
     * parent the flag is recorded but has no effect.
     */
    pub fn set_modal(&mut self, id: WidgetId, modal: bool) {
        let Some(widget) = self.widgets.get_mut(&id) else {
            log::warn!("Toolkit: set_modal on unknown {id:?} ignored.");
            return;
        };
        if !widget.class.is_window() {
            log::warn!("Toolkit: set_modal on non-window {id:?} ignored.");
            return;
        }
        widget.flags.set(WidgetFlags::MODAL, modal);
        match widget.parent {
            Some(parent) => self.refresh_idle(parent),
            None => log::debug!("Toolkit: {id:?} has no parent; modal state has no effect."),
        }
    }

    pub fn set_enabled(&mut self, id: WidgetId, enabled: bool) {
        let Some(widget) = self.widgets.get_mut(&id) else {
            log::warn!("Toolkit: set_enabled on unknown {id:?} ignored.");
            return;
        };
        widget.flags.set(WidgetFlags::ENABLED, enabled);
        if widget.class.is_window() {
            self.refresh_idle(id);
            return;
        }
        widget.flags.set(WidgetFlags::INERT, !enabled);
        if widget.exists() {
            let handle = widget.handle;
            self.backend.set_enabled(handle, enabled);
        }
    }

    pub fn is_inert(&self, id: WidgetId) -> bool {
        self.widgets.get(&id).is_some_and(|w| w.is_inert())
    }

    /*
     * A window is idle when the client disabled it or when any direct child
     * window is modal. Recomputed from scratch because several children may be
     * modal at once.
     */
    pub(crate) fn refresh_idle(&mut self, id: WidgetId) {
        let Some(widget) = self.widgets.get(&id) else {
            return;
        };
        if !widget.class.is_window() {
            return;
        }
        let modal_child = widget
            .children
            .iter()
            .filter_map(|child| self.widgets.get(child))
            .any(|child| child.class.is_window() && child.is_modal() && !child.is_tearing_down());
        let inert = !widget.flags.contains(WidgetFlags::ENABLED) || modal_child;
        let changed = widget.is_inert() != inert;
        let native = widget.exists().then_some(widget.handle);

        if let Some(widget) = self.widgets.get_mut(&id) {
            widget.flags.set(WidgetFlags::INERT, inert);
        }
        if changed && let Some(handle) = native {
            log::debug!("Toolkit: {id:?} is now {}.", if inert { "inert" } else { "interactive" });
            self.backend.set_enabled(handle, !inert);
        }
    }

    // Plain widget state

    pub fn set_visible(&mut self, id: WidgetId, visible: bool) {
        let Some(widget) = self.widgets.get_mut(&id) else {
            return;
        };
        widget.flags.set(WidgetFlags::VISIBLE, visible);
        if widget.exists() {
            let handle = widget.handle;
            self.backend.set_visible(handle, visible);
        }
    }

    pub fn set_rect(&mut self, id: WidgetId, rect: Rect) {
        let Some(widget) = self.widgets.get_mut(&id) else {
            return;
        };
        widget.rect = rect;
        if widget.exists() {
            let handle = widget.handle;
            self.backend.set_geometry(handle, rect);
        }
    }

    pub fn set_text(&mut self, id: WidgetId, text: &str) {
        let Some(widget) = self.widgets.get_mut(&id) else {
            log::warn!("Toolkit: set_text on unknown {id:?} ignored.");
            return;
        };
        widget.text = text.to_string();
        if widget.exists() {
            let handle = widget.handle;
            self.backend.set_text(handle, text);
        }
    }

    /// Current text, or an empty string for unknown widgets.
    pub fn text(&self, id: WidgetId) -> String {
        let Some(widget) = self.widgets.get(&id) else {
            return String::new();
        };
        if widget.exists() && widget.class == WidgetClass::TextBox {
            return self
                .backend
                .read_text(widget.handle)
                .unwrap_or_else(|| widget.text.clone());
        }
        widget.text.clone()
    }

    pub fn set_palette(&mut self, id: WidgetId, palette: Palette) {
        let Some(widget) = self.widgets.get_mut(&id) else {
            return;
        };
        widget.palette = palette;
        if widget.exists() {
            let handle = widget.handle;
            self.backend.invalidate(handle);
        }
    }

    /*
     * Replaces the widget's font. The previous native font is deleted after the
     * new one is applied. Returns `false` if the host could not create the font.
     */
    pub fn set_font(&mut self, id: WidgetId, font: &FontDescription) -> bool {
        if !self.widgets.contains_key(&id) {
            log::warn!("Toolkit: set_font on unknown {id:?} ignored.");
            return false;
        }
        let Some(native) = self.backend.create_font(font) else {
            log::warn!("Toolkit: Could not create font {font:?} for {id:?}.");
            return false;
        };
        let Some(widget) = self.widgets.get_mut(&id) else {
            self.backend.delete_object(native);
            return false;
        };
        let previous = widget.font.replace(native);
        let target = widget.exists().then_some(widget.handle);
        if let Some(handle) = target {
            self.backend.set_font(handle, Some(native));
        }
        if let Some(previous) = previous {
            self.backend.delete_object(previous);
        }
        true
    }

    // Callbacks

    /// Installs `callback` for `kind`, replacing a client callback or default action.
    pub fn on(
        &mut self,
        id: WidgetId,
        kind: EventKind,
        callback: impl FnMut(&mut Toolkit, &WidgetEvent) + 'static,
    ) -> bool {
        let Some(widget) = self.widgets.get_mut(&id) else {
            log::warn!("Toolkit: Callback for {kind:?} on unknown {id:?} ignored.");
            return false;
        };
        let callback: WidgetCallback = Box::new(callback);
        widget.callbacks.set(kind, callback);
        true
    }

    /*
     * Runs the slot for `event.kind`. The slot is taken out for the duration of
     * the call so the callback can borrow the toolkit mutably; it is put back
     * unless the widget is gone or the callback replaced it.
     */
    pub(crate) fn fire(&mut self, event: WidgetEvent) -> bool {
        let Some(widget) = self.widgets.get_mut(&event.widget) else {
            return false;
        };
        match widget.callbacks.take(event.kind) {
            Slot::Empty => false,
            Slot::Default(action) => {
                widget.callbacks.restore(event.kind, Slot::Default(action));
                self.run_default(action, event.widget);
                true
            }
            Slot::Client(mut callback) => {
                log::trace!("Toolkit: Firing {:?} for {:?}.", event.kind, event.widget);
                callback(self, &event);
                if let Some(widget) = self.widgets.get_mut(&event.widget)
                    && !widget.is_tearing_down()
                {
                    widget
                        .callbacks
                        .restore(event.kind, Slot::Client(callback));
                }
                true
            }
        }
    }

    fn run_default(&mut self, action: DefaultAction, id: WidgetId) {
        match action {
            DefaultAction::DestroyWidget => {
                self.destroy(id);
            }
        }
    }

    // Borders

    pub fn create_border(&mut self, params: BorderParams) -> BorderId {
        self.decorators.create_border(params, self.backend.as_mut())
    }

    /*
     * Sets or clears the content border. Before the widget exists the request is
     * staged and applied by `create`. Returns `false` when the border was
     * rejected (destroyed or unknown), which leaves the previous one in place.
     */
    pub fn set_border(&mut self, id: WidgetId, border: Option<BorderId>) -> bool {
        self.set_border_slot(id, border, false)
    }

    pub fn set_focus_border(&mut self, id: WidgetId, border: Option<BorderId>) -> bool {
        self.set_border_slot(id, border, true)
    }

    fn set_border_slot(&mut self, id: WidgetId, border: Option<BorderId>, focus: bool) -> bool {
        let Some(widget) = self.widgets.get_mut(&id) else {
            log::warn!("Toolkit: Border change on unknown {id:?} ignored.");
            return false;
        };
        if !widget.exists() {
            if focus {
                widget.staged.focus_border = border;
            } else {
                widget.staged.border = border;
            }
            return true;
        }
        let handle = widget.handle;
        let slot = if focus {
            AttachmentSlot::FocusBorder(id)
        } else {
            AttachmentSlot::ContentBorder(id)
        };
        let applied = match border {
            Some(border) => {
                self.decorators
                    .attach_border(slot, Some(border), self.backend.as_mut())
            }
            None => {
                self.decorators
                    .release_border_slot(slot, self.backend.as_mut());
                true
            }
        };
        if applied {
            self.backend.invalidate(handle);
        }
        applied
    }

    pub fn border_of(&self, id: WidgetId) -> Option<BorderId> {
        self.decorators
            .borders()
            .attached(AttachmentSlot::ContentBorder(id))
    }

    pub fn focus_border_of(&self, id: WidgetId) -> Option<BorderId> {
        self.decorators
            .borders()
            .attached(AttachmentSlot::FocusBorder(id))
    }

    /// `Some(0)` while pending, `None` once destroyed.
    pub fn border_ref_count(&self, border: BorderId) -> Option<usize> {
        self.decorators.borders().ref_count(border)
    }

    /// `true` iff the border is attached to at least one widget.
    pub fn is_border_committed(&self, border: BorderId) -> bool {
        self.decorators.borders().check(border)
    }

    pub fn is_border_pending(&self, border: BorderId) -> bool {
        self.decorators.borders().is_pending(border)
    }

    // Menus

    pub fn create_menu(&mut self, params: MenuParams) -> MenuId {
        self.decorators.create_menu(params, self.backend.as_mut())
    }

    pub fn create_menu_item(&mut self, text: &str, params: MenuItemParams) -> MenuItemId {
        self.decorators.create_menu_item(text, params)
    }

    pub fn append_menu_item(&mut self, menu: MenuId, item: MenuItemId) -> bool {
        self.decorators
            .append_item(menu, item, self.backend.as_mut())
    }

    /// Removes `item` from `menu` and destroys it, together with its submenu.
    pub fn remove_menu_item(&mut self, menu: MenuId, item: MenuItemId) -> bool {
        let removed = self
            .decorators
            .remove_item(menu, item, self.backend.as_mut());
        self.prune_menu_callbacks();
        removed
    }

    pub fn set_submenu(&mut self, item: MenuItemId, submenu: Option<MenuId>) -> bool {
        let changed = self
            .decorators
            .set_submenu(item, submenu, self.backend.as_mut());
        self.prune_menu_callbacks();
        changed
    }

    /// Attaches a menu bar to a window; staged until the window exists.
    pub fn set_menu_bar(&mut self, window: WidgetId, menu: Option<MenuId>) -> bool {
        let Some(widget) = self.widgets.get_mut(&window) else {
            log::warn!("Toolkit: set_menu_bar on unknown {window:?} ignored.");
            return false;
        };
        if !widget.class.is_window() {
            log::warn!("Toolkit: set_menu_bar on non-window {window:?} ignored.");
            return false;
        }
        if !widget.exists() {
            widget.staged.menu_bar = menu;
            return true;
        }
        let handle = widget.handle;
        let changed = self
            .decorators
            .set_menu_bar(window, handle, menu, self.backend.as_mut());
        self.prune_menu_callbacks();
        changed
    }

    pub fn menu_bar_of(&self, window: WidgetId) -> Option<MenuId> {
        self.decorators.menu_bar_of(window)
    }

    pub fn parent_menu(&self, item: MenuItemId) -> Option<MenuId> {
        self.decorators.parent_menu(item)
    }

    pub fn submenu_of(&self, item: MenuItemId) -> Option<MenuId> {
        self.decorators.submenu_of(item)
    }

    pub fn menu_items(&self, menu: MenuId) -> Vec<MenuItemId> {
        self.decorators
            .menus()
            .get(menu)
            .map(|menu| menu.items().to_vec())
            .unwrap_or_default()
    }

    /// `true` while the menu is alive (pending or attached).
    pub fn is_menu_alive(&self, menu: MenuId) -> bool {
        self.decorators.menus().get(menu).is_some()
    }

    pub fn menu_native(&self, menu: MenuId) -> Option<NativeObject> {
        self.decorators.menus().get(menu).map(|menu| menu.native())
    }

    pub fn menu_item_command(&self, item: MenuItemId) -> Option<u16> {
        self.decorators.items().get(item).map(|item| item.command_id())
    }

    pub fn is_item_checked(&self, item: MenuItemId) -> bool {
        self.decorators
            .items()
            .get(item)
            .is_some_and(|item| item.is_checked())
    }

    pub fn set_menu_item_enabled(&mut self, item: MenuItemId, enabled: bool) {
        self.decorators
            .set_item_enabled(item, enabled, self.backend.as_mut());
    }

    /*
     * Checks or unchecks a menu item. All state changes (including the radio
     * sibling being unchecked) are applied before any listener runs. Returns
     * `true` if anything changed.
     */
    pub fn set_check_state(&mut self, item: MenuItemId, checked: bool) -> bool {
        let changes = self
            .decorators
            .set_check_state(item, checked, self.backend.as_mut());
        let changed = !changes.is_empty();
        for (changed_item, state) in changes {
            self.fire_menu(MenuEvent {
                item: changed_item,
                kind: MenuEventKind::CheckChanged(state),
            });
        }
        changed
    }

    pub fn on_menu_item(
        &mut self,
        item: MenuItemId,
        callback: impl FnMut(&mut Toolkit, &MenuEvent) + 'static,
    ) -> bool {
        if self.decorators.items().get(item).is_none() {
            log::warn!("Toolkit: Callback for unknown {item:?} ignored.");
            return false;
        }
        self.menu_callbacks.insert(item, Box::new(callback));
        true
    }

    /// Handles a menu command notification. `false` if no item carries `command_id`.
    pub(crate) fn activate_menu_command(&mut self, command_id: u16) -> bool {
        let Some(item) = self.decorators.item_for_command(command_id) else {
            log::debug!("Toolkit: No menu item for command {command_id}.");
            return false;
        };
        let changes = self
            .decorators
            .activate_item(item, self.backend.as_mut());
        for (changed_item, state) in changes {
            self.fire_menu(MenuEvent {
                item: changed_item,
                kind: MenuEventKind::CheckChanged(state),
            });
        }
        self.fire_menu(MenuEvent {
            item,
            kind: MenuEventKind::Activated,
        });
        true
    }

    fn fire_menu(&mut self, event: MenuEvent) {
        let Some(mut callback) = self.menu_callbacks.remove(&event.item) else {
            return;
        };
        callback(self, &event);
        if self.decorators.items().get(event.item).is_some() {
            self.menu_callbacks.entry(event.item).or_insert(callback);
        }
    }

    fn prune_menu_callbacks(&mut self) {
        let items = self.decorators.items();
        self.menu_callbacks
            .retain(|item, _| items.get(*item).is_some());
    }

    /// Destroys decorators that were manufactured but never attached.
    pub fn clear_pending_decorators(&mut self) {
        self.decorators.clear_pending(self.backend.as_mut());
        self.prune_menu_callbacks();
    }

    // Leaf controls and images

    pub fn set_checked(&mut self, id: WidgetId, checked: bool) -> bool {
        controls::set_checked(self, id, checked)
    }

    pub fn is_checked(&self, id: WidgetId) -> bool {
        self.widgets
            .get(&id)
            .and_then(|w| w.checked())
            .unwrap_or(false)
    }

    pub fn set_list_items(&mut self, id: WidgetId, items: Vec<String>) -> bool {
        controls::listbox_handler::set_items(self, id, items)
    }

    /// Selects entry `index`; `-1` clears the selection. Out-of-range indices are ignored.
    pub fn select(&mut self, id: WidgetId, index: i32) -> bool {
        controls::listbox_handler::select(self, id, index)
    }

    /// Selected entry, `-1` when nothing is selected or the widget is not a list.
    pub fn selected_index(&self, id: WidgetId) -> i32 {
        controls::listbox_handler::selected_index(self, id)
    }

    pub fn play_animation(&mut self, id: WidgetId, spec: AnimationSpec) -> bool {
        controls::image_handler::play(self, id, spec)
    }

    pub fn stop_animation(&mut self, id: WidgetId) {
        controls::image_handler::stop(self, id);
    }

    pub fn is_animating(&self, id: WidgetId) -> bool {
        controls::image_handler::is_animating(self, id)
    }

    pub fn current_frame(&self, id: WidgetId) -> Option<usize> {
        controls::image_handler::current_frame(self, id)
    }

    // Shutdown

    /*
     * Destroys every remaining widget tree, then every decorator (attached or
     * pending). Does not request a quit. Safe to call more than once.
     */
    pub fn shutdown(&mut self) {
        if self.shutting_down {
            return;
        }
        self.shutting_down = true;
        let mut roots: Vec<WidgetId> = self
            .widgets
            .values()
            .filter(|w| w.parent.is_none_or(|p| !self.widgets.contains_key(&p)))
            .map(|w| w.id)
            .collect();
        roots.sort();
        let mut destroyed = 0;
        for root in roots {
            destroyed += self.destroy(root);
        }
        // Logical-only widgets whose parent never existed are left over.
        let leftovers: Vec<WidgetId> = self.widgets.keys().copied().collect();
        for id in leftovers {
            destroyed += self.destroy(id);
        }
        self.decorators.clear_all(self.backend.as_mut());
        self.menu_callbacks.clear();
        log::debug!("Toolkit: Shut down; {destroyed} widget(s) destroyed.");
    }
}

impl Drop for Toolkit {
    fn drop(&mut self) {
        self.shutdown();
    }
}
