//! In-process model of the windowing system the decoration engine plugs into.
//!
//! The [`Application`] owns the widget tree plus the queues that drive it:
//! posted events, zero-delay idle tasks, destruction hooks and per-window
//! watchers. Application-wide [`EventFilter`]s see every event first.
//!
//! Nothing here holds a `RefCell` borrow while user callbacks run, so
//! filters, watchers and idle tasks may freely call back into the
//! application.

pub mod layout;
mod tree;

pub use tree::{
    BoxLayout, Direction, LayoutItem, Widget, WidgetId, WidgetRole, WidgetTree, WindowAttrs,
    WindowKind, WindowStates,
};

use crate::geometry::{Point, Rect, Size};
use raw_window_handle::RawWindowHandle;
use slab::Slab;
use std::cell::{Cell, Ref, RefCell, RefMut};
use std::collections::{HashMap, VecDeque};
use std::rc::{Rc, Weak};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    Show,
    WindowStateChange { old: WindowStates },
    ActivationChange,
}

/// Application-wide event hook. Returning `true` consumes the event.
pub trait EventFilter {
    fn event_filter(&self, app: &Application, target: WidgetId, event: &Event) -> bool;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct WatchId(usize);

type Watcher = Rc<dyn Fn(&Application, WidgetId, &Event)>;
type DestroyHook = Box<dyn FnOnce(WidgetId)>;
type IdleTask = Box<dyn FnOnce(&Application)>;

#[derive(Default)]
struct Shared {
    tree: RefCell<WidgetTree>,
    posted: RefCell<VecDeque<(WidgetId, Event)>>,
    idle: RefCell<VecDeque<IdleTask>>,
    destroy_hooks: RefCell<HashMap<WidgetId, Vec<DestroyHook>>>,
    watchers: RefCell<Slab<(WidgetId, Watcher)>>,
    filters: RefCell<Vec<Weak<dyn EventFilter>>>,
    active_window: Cell<Option<WidgetId>>,
    cursor: Cell<Point>,
}

#[derive(Clone, Default)]
pub struct Application {
    shared: Rc<Shared>,
}

/// Non-owning handle, used by callbacks stored inside the application.
#[derive(Clone, Default)]
pub struct WeakApplication {
    shared: Weak<Shared>,
}

impl WeakApplication {
    pub fn upgrade(&self) -> Option<Application> {
        self.shared.upgrade().map(|shared| Application { shared })
    }
}

fn same_filter(a: &Rc<dyn EventFilter>, b: &Rc<dyn EventFilter>) -> bool {
    Rc::as_ptr(a) as *const () == Rc::as_ptr(b) as *const ()
}

impl Application {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn downgrade(&self) -> WeakApplication {
        WeakApplication {
            shared: Rc::downgrade(&self.shared),
        }
    }

    /// Borrow the widget tree. Do not hold the guard across calls back
    /// into the application.
    pub fn tree(&self) -> Ref<'_, WidgetTree> {
        self.shared.tree.borrow()
    }

    pub fn tree_mut(&self) -> RefMut<'_, WidgetTree> {
        self.shared.tree.borrow_mut()
    }

    pub fn insert(&self, widget: Widget, parent: Option<WidgetId>) -> WidgetId {
        self.tree_mut().insert(widget, parent)
    }

    /// Create a hidden top-level window.
    pub fn create_window(
        &self,
        name: impl Into<String>,
        kind: WindowKind,
        role: WidgetRole,
        size: Size,
    ) -> WidgetId {
        self.insert(Widget::window(name, kind, role, size), None)
    }

    pub fn contains(&self, id: WidgetId) -> bool {
        self.tree().contains(id)
    }

    pub fn install_event_filter(&self, filter: &Rc<dyn EventFilter>) {
        self.shared.filters.borrow_mut().push(Rc::downgrade(filter));
    }

    pub fn remove_event_filter(&self, filter: &Rc<dyn EventFilter>) {
        self.shared.filters.borrow_mut().retain(|installed| {
            installed
                .upgrade()
                .map(|installed| !same_filter(&installed, filter))
                .unwrap_or(false)
        });
    }

    fn live_filters(&self) -> Vec<Rc<dyn EventFilter>> {
        let mut filters = self.shared.filters.borrow_mut();
        filters.retain(|filter| filter.strong_count() > 0);
        filters.iter().filter_map(Weak::upgrade).collect()
    }

    /// Deliver `event` to the filters, then to the target's watchers unless
    /// a filter consumed it. Returns whether it was consumed.
    pub fn send_event(&self, target: WidgetId, event: &Event) -> bool {
        for filter in self.live_filters() {
            if filter.event_filter(self, target, event) {
                tracing::trace!(%target, ?event, "event consumed by filter");
                return true;
            }
        }
        self.notify_watchers(target, event);
        false
    }

    fn notify_watchers(&self, target: WidgetId, event: &Event) {
        let watchers: Vec<Watcher> = self
            .shared
            .watchers
            .borrow()
            .iter()
            .filter(|(_, (window, _))| *window == target)
            .map(|(_, (_, watcher))| Rc::clone(watcher))
            .collect();
        for watcher in watchers {
            watcher(self, target, event);
        }
    }

    pub fn post_event(&self, target: WidgetId, event: Event) {
        self.shared.posted.borrow_mut().push_back((target, event));
    }

    /// Queue a zero-delay continuation. It runs from [`Application::process_events`]
    /// after every posted event queued before it.
    pub fn post_idle(&self, task: impl FnOnce(&Application) + 'static) {
        self.shared.idle.borrow_mut().push_back(Box::new(task));
    }

    pub fn has_pending(&self) -> bool {
        !self.shared.posted.borrow().is_empty() || !self.shared.idle.borrow().is_empty()
    }

    /// Drain posted events, then idle tasks, until both queues are empty.
    pub fn process_events(&self) {
        loop {
            let posted = self.shared.posted.borrow_mut().pop_front();
            if let Some((target, event)) = posted {
                if self.contains(target) {
                    self.send_event(target, &event);
                }
                continue;
            }
            let task = self.shared.idle.borrow_mut().pop_front();
            match task {
                Some(task) => task(self),
                None => break,
            }
        }
    }

    /// Ask to show `window`. Filters see the `Show` first and may consume it,
    /// in which case the window stays as the filter left it.
    pub fn show(&self, window: WidgetId) {
        if !self.contains(window) {
            return;
        }
        for filter in self.live_filters() {
            if filter.event_filter(self, window, &Event::Show) {
                tracing::trace!(%window, "show consumed by filter");
                return;
            }
        }
        let shown = match self.tree_mut().get_mut(window) {
            Some(widget) => {
                widget.visible = true;
                true
            }
            None => false,
        };
        if shown {
            self.layout(window);
            self.notify_watchers(window, &Event::Show);
        }
    }

    pub fn hide(&self, window: WidgetId) {
        if let Some(widget) = self.tree_mut().get_mut(window) {
            widget.visible = false;
        }
    }

    pub fn is_visible(&self, id: WidgetId) -> bool {
        self.tree().get(id).map(|widget| widget.visible).unwrap_or(false)
    }

    /// Request the window to close. It is hidden; destroying it is up to the
    /// owner, which can check [`Application::close_requested`].
    pub fn close(&self, window: WidgetId) {
        if let Some(attrs) = self.tree_mut().window_attrs_mut(window) {
            attrs.close_requested = true;
        }
        self.hide(window);
        tracing::debug!(%window, "close requested");
    }

    pub fn close_requested(&self, window: WidgetId) -> bool {
        self.tree()
            .window_attrs(window)
            .map(|attrs| attrs.close_requested)
            .unwrap_or(false)
    }

    pub fn set_frameless(&self, window: WidgetId, frameless: bool) {
        if let Some(attrs) = self.tree_mut().window_attrs_mut(window) {
            attrs.frameless = frameless;
        }
    }

    pub fn is_frameless(&self, window: WidgetId) -> bool {
        self.tree()
            .window_attrs(window)
            .map(|attrs| attrs.frameless)
            .unwrap_or(false)
    }

    /// Current state bits, with `ACTIVE` set when the window has focus.
    pub fn window_states(&self, window: WidgetId) -> WindowStates {
        let tree = self.tree();
        match tree.window_attrs(window) {
            Some(attrs) if attrs.active => attrs.states | WindowStates::ACTIVE,
            Some(attrs) => attrs.states,
            None => WindowStates::NONE,
        }
    }

    /// Change the minimized/maximized/fullscreen bits. Activation is ignored
    /// here; use [`Application::set_active_window`].
    pub fn set_window_states(&self, window: WidgetId, states: WindowStates) {
        let old = self.window_states(window);
        let changed = {
            let mut tree = self.tree_mut();
            match tree.window_attrs_mut(window) {
                Some(attrs) => {
                    let states = states & !WindowStates::ACTIVE;
                    let changed = attrs.states != states;
                    attrs.states = states;
                    changed
                }
                None => false,
            }
        };
        if changed {
            self.post_event(window, Event::WindowStateChange { old });
        }
    }

    pub fn active_window(&self) -> Option<WidgetId> {
        self.shared.active_window.get()
    }

    pub fn is_active(&self, window: WidgetId) -> bool {
        self.tree()
            .window_attrs(window)
            .map(|attrs| attrs.active)
            .unwrap_or(false)
    }

    pub fn set_active_window(&self, window: Option<WidgetId>) {
        let previous = self.shared.active_window.get();
        if previous == window {
            return;
        }
        let window = window.filter(|id| self.tree().window_attrs(*id).is_some());
        self.shared.active_window.set(window);
        for (id, active) in [(previous, false), (window, true)] {
            let Some(id) = id else { continue };
            let updated = match self.tree_mut().window_attrs_mut(id) {
                Some(attrs) => {
                    attrs.active = active;
                    true
                }
                None => false,
            };
            if updated {
                self.post_event(id, Event::ActivationChange);
            }
        }
    }

    pub fn title(&self, window: WidgetId) -> String {
        self.tree()
            .window_attrs(window)
            .map(|attrs| attrs.title.clone())
            .unwrap_or_default()
    }

    pub fn set_title(&self, window: WidgetId, title: impl Into<String>) {
        if let Some(attrs) = self.tree_mut().window_attrs_mut(window) {
            attrs.title = title.into();
        }
    }

    pub fn native_handle(&self, window: WidgetId) -> Option<RawWindowHandle> {
        self.tree().window_attrs(window).and_then(|attrs| attrs.native)
    }

    pub fn set_native_handle(&self, window: WidgetId, handle: Option<RawWindowHandle>) {
        if let Some(attrs) = self.tree_mut().window_attrs_mut(window) {
            attrs.native = handle;
        }
    }

    pub fn window_position(&self, window: WidgetId) -> Point {
        self.tree()
            .window_attrs(window)
            .map(|attrs| attrs.position)
            .unwrap_or_default()
    }

    pub fn set_window_position(&self, window: WidgetId, position: Point) {
        if let Some(attrs) = self.tree_mut().window_attrs_mut(window) {
            attrs.position = position;
        }
    }

    /// Outer rectangle of `window` in screen coordinates.
    pub fn window_rect(&self, window: WidgetId) -> Option<Rect> {
        let tree = self.tree();
        let widget = tree.get(window)?;
        let attrs = widget.window.as_ref()?;
        Some(Rect::from_origin_size(attrs.position, widget.geometry.size()))
    }

    pub fn resize(&self, window: WidgetId, size: Size) {
        let resized = match self.tree_mut().get_mut(window) {
            Some(widget) => {
                widget.geometry = Rect::from_origin_size(Point::default(), size);
                true
            }
            None => false,
        };
        if resized {
            self.layout(window);
        }
    }

    pub fn layout(&self, window: WidgetId) {
        layout::layout_window(&mut self.tree_mut(), window);
    }

    pub fn cursor_pos(&self) -> Point {
        self.shared.cursor.get()
    }

    pub fn set_cursor_pos(&self, pos: Point) {
        self.shared.cursor.set(pos);
    }

    /// Convert a screen point into `window`'s local coordinates.
    pub fn map_from_screen(&self, window: WidgetId, point: Point) -> Point {
        let origin = self.window_position(window);
        Point::new(point.x - origin.x, point.y - origin.y)
    }

    /// Run `hook` when `window` is destroyed. The hook only receives the id;
    /// the widget is already on its way out.
    pub fn add_destroy_hook(&self, window: WidgetId, hook: impl FnOnce(WidgetId) + 'static) {
        self.shared
            .destroy_hooks
            .borrow_mut()
            .entry(window)
            .or_default()
            .push(Box::new(hook));
    }

    /// Observe events delivered to `window` that no filter consumed.
    pub fn watch(
        &self,
        window: WidgetId,
        watcher: impl Fn(&Application, WidgetId, &Event) + 'static,
    ) -> WatchId {
        let key = self
            .shared
            .watchers
            .borrow_mut()
            .insert((window, Rc::new(watcher)));
        WatchId(key)
    }

    pub fn unwatch(&self, id: WatchId) -> bool {
        self.shared.watchers.borrow_mut().try_remove(id.0).is_some()
    }

    pub fn watcher_count(&self, window: WidgetId) -> usize {
        self.shared
            .watchers
            .borrow()
            .iter()
            .filter(|(_, (watched, _))| *watched == window)
            .count()
    }

    /// Destroy `id` and everything below it. Borrowed menu bars go back to
    /// their owners first, then destruction hooks run.
    pub fn destroy(&self, id: WidgetId) {
        self.tree_mut().return_loans(id);
        let doomed = self.tree().subtree(id);
        if doomed.is_empty() {
            return;
        }
        for widget in &doomed {
            let hooks = self.shared.destroy_hooks.borrow_mut().remove(widget);
            for hook in hooks.into_iter().flatten() {
                hook(*widget);
            }
        }
        self.shared
            .watchers
            .borrow_mut()
            .retain(|_, (window, _)| !doomed.contains(window));
        self.shared
            .posted
            .borrow_mut()
            .retain(|(target, _)| !doomed.contains(target));
        if self
            .shared
            .active_window
            .get()
            .map(|active| doomed.contains(&active))
            .unwrap_or(false)
        {
            self.shared.active_window.set(None);
        }
        let removed = self.tree_mut().remove(id);
        tracing::debug!(%id, widgets = removed.len(), "destroyed");
    }
}
