//! Per-window frame hooking behind a small capability interface.
//!
//! A [`FrameFilter`] is told about a decorated window once and from then on
//! reports activation and state changes through [`FrameCallbacks`]. Where
//! the platform lets us answer non-client messages (Win32) it also runs the
//! frame emulator for the window.

use crate::frame::WindowHooks;
use crate::geometry::Point;
use crate::hit_test::SizeConstraints;
use crate::host::{Application, Event, WatchId, WidgetId};
use raw_window_handle::RawWindowHandle;
use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

/// Callbacks a frame filter drives for one window.
#[derive(Clone)]
pub struct FrameCallbacks {
    /// Title bar hover test for a screen-space cursor. Only needed where the
    /// platform has no native caption hit testing of its own.
    pub hover_test: Option<Rc<dyn Fn(Point) -> bool>>,
    pub active_changed: Rc<dyn Fn()>,
    pub state_changed: Rc<dyn Fn()>,
    pub size_constraints: Option<Rc<dyn Fn() -> SizeConstraints>>,
}

impl FrameCallbacks {
    pub fn new(active_changed: impl Fn() + 'static, state_changed: impl Fn() + 'static) -> Self {
        Self {
            hover_test: None,
            active_changed: Rc::new(active_changed),
            state_changed: Rc::new(state_changed),
            size_constraints: None,
        }
    }

    pub fn with_hover_test(mut self, hover_test: impl Fn(Point) -> bool + 'static) -> Self {
        self.hover_test = Some(Rc::new(hover_test));
        self
    }

    pub fn with_size_constraints(
        mut self,
        constraints: impl Fn() -> SizeConstraints + 'static,
    ) -> Self {
        self.size_constraints = Some(Rc::new(constraints));
        self
    }
}

impl WindowHooks for FrameCallbacks {
    fn caption_hovered(&self, cursor: Point) -> bool {
        self.hover_test
            .as_ref()
            .map(|hover_test| hover_test(cursor))
            .unwrap_or(false)
    }

    fn size_constraints(&self) -> SizeConstraints {
        self.size_constraints
            .as_ref()
            .map(|constraints| constraints())
            .unwrap_or_default()
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameTarget {
    pub window: WidgetId,
    pub native: Option<RawWindowHandle>,
}

pub trait FrameFilter {
    fn apply(&self, app: &Application, target: FrameTarget, callbacks: FrameCallbacks);
    /// Stop hooking `window`. Must not touch the window's widget state; it
    /// may be running from the window's destruction.
    fn unapply(&self, app: &Application, window: WidgetId);
    fn is_applied(&self, window: WidgetId) -> bool;
}

/// Portable filter: follows activation and state changes through the host's
/// per-window watchers.
#[derive(Default)]
pub struct WatchingFrameFilter {
    watches: RefCell<HashMap<WidgetId, WatchId>>,
}

impl WatchingFrameFilter {
    pub fn new() -> Self {
        Self::default()
    }
}

impl FrameFilter for WatchingFrameFilter {
    fn apply(&self, app: &Application, target: FrameTarget, callbacks: FrameCallbacks) {
        if self.is_applied(target.window) {
            tracing::warn!(window = %target.window, "frame filter already applied");
            return;
        }
        let watch = app.watch(target.window, move |_, _, event| match event {
            Event::ActivationChange => (callbacks.active_changed)(),
            Event::WindowStateChange { .. } => (callbacks.state_changed)(),
            Event::Show => {}
        });
        self.watches.borrow_mut().insert(target.window, watch);
        tracing::debug!(window = %target.window, "watching frame filter applied");
    }

    fn unapply(&self, app: &Application, window: WidgetId) {
        let watch = self.watches.borrow_mut().remove(&window);
        match watch {
            Some(watch) => {
                app.unwatch(watch);
                tracing::debug!(%window, "watching frame filter removed");
            }
            None => tracing::debug!(%window, "unapply for unknown window ignored"),
        }
    }

    fn is_applied(&self, window: WidgetId) -> bool {
        self.watches.borrow().contains_key(&window)
    }
}

#[cfg(windows)]
pub use self::win32::Win32FrameFilter;

#[cfg(windows)]
pub type PlatformFrameFilter = Win32FrameFilter;

#[cfg(not(windows))]
pub type PlatformFrameFilter = WatchingFrameFilter;

#[cfg(windows)]
mod win32 {
    use super::{FrameCallbacks, FrameFilter, FrameTarget, WatchingFrameFilter};
    use crate::frame::win32::{hwnd_from_raw, install, uninstall, SubclassHooks};
    use crate::frame::FrameEmulator;
    use crate::host::{Application, WidgetId};
    use std::cell::RefCell;
    use std::collections::HashMap;
    use windows::Win32::Foundation::HWND;

    /// Runs the frame emulator from a window subclass. Every window is also
    /// registered with a [`WatchingFrameFilter`], which is all that windows
    /// without a Win32 handle get.
    #[derive(Default)]
    pub struct Win32FrameFilter {
        emulator: FrameEmulator,
        subclassed: RefCell<HashMap<WidgetId, isize>>,
        fallback: WatchingFrameFilter,
    }

    impl Win32FrameFilter {
        pub fn new(emulator: FrameEmulator) -> Self {
            Self {
                emulator,
                ..Default::default()
            }
        }
    }

    impl FrameFilter for Win32FrameFilter {
        fn apply(&self, app: &Application, target: FrameTarget, callbacks: FrameCallbacks) {
            if self.is_applied(target.window) {
                tracing::warn!(window = %target.window, "frame filter already applied");
                return;
            }
            let Some(hwnd) = target.native.as_ref().and_then(hwnd_from_raw) else {
                self.fallback.apply(app, target, callbacks);
                return;
            };
            let active_changed = callbacks.active_changed.clone();
            let state_changed = callbacks.state_changed.clone();
            let hooks = SubclassHooks {
                hooks: Box::new(callbacks.clone()),
                active_changed: Box::new(move || active_changed()),
                state_changed: Box::new(move || state_changed()),
            };
            match install(hwnd, self.emulator, hooks) {
                Ok(()) => {
                    self.subclassed
                        .borrow_mut()
                        .insert(target.window, hwnd.0 as isize);
                }
                Err(err) => {
                    tracing::warn!(window = %target.window, "subclass failed, watching instead: {err}");
                }
            }
            // native messages can precede the host's own state update
            self.fallback.apply(app, target, callbacks);
        }

        fn unapply(&self, app: &Application, window: WidgetId) {
            let hwnd = self.subclassed.borrow_mut().remove(&window);
            if let Some(hwnd) = hwnd {
                if !uninstall(HWND(hwnd as *mut core::ffi::c_void)) {
                    tracing::debug!(%window, "subclass already gone");
                }
            }
            self.fallback.unapply(app, window);
        }

        fn is_applied(&self, window: WidgetId) -> bool {
            self.subclassed.borrow().contains_key(&window) || self.fallback.is_applied(window)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Size;
    use crate::host::{WidgetRole, WindowKind, WindowStates};
    use std::cell::Cell;

    fn counters() -> (Rc<Cell<u32>>, Rc<Cell<u32>>, FrameCallbacks) {
        let active = Rc::new(Cell::new(0));
        let state = Rc::new(Cell::new(0));
        let (a, s) = (Rc::clone(&active), Rc::clone(&state));
        let callbacks = FrameCallbacks::new(
            move || a.set(a.get() + 1),
            move || s.set(s.get() + 1),
        );
        (active, state, callbacks)
    }

    #[test]
    fn watching_filter_forwards_changes() {
        let app = Application::new();
        let window =
            app.create_window("w", WindowKind::Window, WidgetRole::Plain, Size::new(10, 10));
        let (active, state, callbacks) = counters();
        let filter = WatchingFrameFilter::new();
        filter.apply(&app, FrameTarget { window, native: None }, callbacks);
        assert!(filter.is_applied(window));

        app.set_active_window(Some(window));
        app.set_window_states(window, WindowStates::MAXIMIZED);
        app.process_events();
        assert_eq!((active.get(), state.get()), (1, 1));

        filter.unapply(&app, window);
        assert!(!filter.is_applied(window));
        app.set_window_states(window, WindowStates::NONE);
        app.process_events();
        assert_eq!(state.get(), 1);
        assert_eq!(app.watcher_count(window), 0);
    }

    #[test]
    fn double_apply_keeps_one_watch() {
        let app = Application::new();
        let window =
            app.create_window("w", WindowKind::Window, WidgetRole::Plain, Size::new(10, 10));
        let filter = WatchingFrameFilter::new();
        let (_, _, callbacks) = counters();
        filter.apply(&app, FrameTarget { window, native: None }, callbacks.clone());
        filter.apply(&app, FrameTarget { window, native: None }, callbacks);
        assert_eq!(app.watcher_count(window), 1);
    }

    #[test]
    fn unknown_unapply_is_noop() {
        let app = Application::new();
        let window =
            app.create_window("w", WindowKind::Window, WidgetRole::Plain, Size::new(10, 10));
        WatchingFrameFilter::new().unapply(&app, window);
    }

    #[test]
    fn callbacks_default_hooks() {
        let (_, _, callbacks) = counters();
        assert!(!callbacks.caption_hovered(Point::new(1, 1)));
        assert_eq!(callbacks.size_constraints(), SizeConstraints::default());
        let callbacks = callbacks
            .with_hover_test(|cursor| cursor.y < 30)
            .with_size_constraints(|| SizeConstraints {
                min: Size::new(5, 5),
                max: Size::new(5, 5),
            });
        assert!(callbacks.caption_hovered(Point::new(1, 1)));
        assert!(!callbacks.size_constraints().resizability().horizontal);
    }
}
