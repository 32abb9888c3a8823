//! Drives the host model from real winit windows.
//!
//! Each registered [`Window`] is mirrored by a top-level widget. Window
//! events update the widget, pointer input on decorated windows goes
//! through [`DecorationEngine::handle_pointer`], and [`WinitBridge::sync`]
//! pushes the host's frameless/visibility/state decisions back to winit.

use crate::app_filter::{DecorationEngine, PointerAction, PointerEvent};
use crate::geometry::{Point, Size};
use crate::hit_test::HitTestResult;
use crate::host::{Application, WidgetId, WindowStates};
use raw_window_handle::HasWindowHandle;
use std::collections::HashMap;
use std::time::{Duration, Instant};
use winit::event::{ElementState, MouseButton, WindowEvent};
use winit::window::{ResizeDirection, Window, WindowId};

pub const DOUBLE_CLICK_INTERVAL: Duration = Duration::from_millis(500);
const DOUBLE_CLICK_DISTANCE: i32 = 4;

/// Turns a stream of presses into single and double clicks.
#[derive(Debug, Default, Clone)]
pub struct ClickTracker {
    last: Option<(Instant, Point)>,
}

impl ClickTracker {
    /// Returns `true` when this press completes a double click.
    pub fn press(&mut self, at: Instant, pos: Point) -> bool {
        let double = match self.last {
            Some((time, last_pos)) => {
                at.saturating_duration_since(time) <= DOUBLE_CLICK_INTERVAL
                    && (pos.x - last_pos.x).abs() <= DOUBLE_CLICK_DISTANCE
                    && (pos.y - last_pos.y).abs() <= DOUBLE_CLICK_DISTANCE
            }
            None => false,
        };
        self.last = if double { None } else { Some((at, pos)) };
        double
    }
}

pub fn resize_direction(hit: HitTestResult) -> Option<ResizeDirection> {
    Some(match hit {
        HitTestResult::ResizeLeft => ResizeDirection::West,
        HitTestResult::ResizeRight => ResizeDirection::East,
        HitTestResult::ResizeTop => ResizeDirection::North,
        HitTestResult::ResizeBottom => ResizeDirection::South,
        HitTestResult::ResizeTopLeft => ResizeDirection::NorthWest,
        HitTestResult::ResizeTopRight => ResizeDirection::NorthEast,
        HitTestResult::ResizeBottomLeft => ResizeDirection::SouthWest,
        HitTestResult::ResizeBottomRight => ResizeDirection::SouthEast,
        HitTestResult::Client | HitTestResult::Caption | HitTestResult::None => return None,
    })
}

struct Tracked {
    widget: WidgetId,
    cursor: Point,
    clicks: ClickTracker,
}

pub struct WinitBridge {
    app: Application,
    windows: HashMap<WindowId, Tracked>,
}

impl WinitBridge {
    pub fn new(app: &Application) -> Self {
        Self {
            app: app.clone(),
            windows: HashMap::new(),
        }
    }

    pub fn widget_for(&self, window: WindowId) -> Option<WidgetId> {
        self.windows.get(&window).map(|tracked| tracked.widget)
    }

    /// Whether the user or a close button asked for `window` to close. The
    /// caller owns the winit window and decides when to drop it.
    pub fn close_requested(&self, window: WindowId) -> bool {
        self.widget_for(window)
            .map(|widget| self.app.close_requested(widget))
            .unwrap_or(false)
    }

    /// Mirror `window` onto the top-level `widget`.
    pub fn register(&mut self, window: &Window, widget: WidgetId) {
        let native = match window.window_handle() {
            Ok(handle) => Some(handle.as_raw()),
            Err(err) => {
                tracing::warn!(%widget, "no native window handle: {err}");
                None
            }
        };
        self.app.set_native_handle(widget, native);
        self.app.set_title(widget, window.title());
        if let Ok(position) = window.outer_position() {
            self.app
                .set_window_position(widget, Point::new(position.x, position.y));
        }
        let size = window.outer_size();
        self.app
            .resize(widget, Size::new(size.width as i32, size.height as i32));
        self.pull_states(window, widget);
        self.windows.insert(
            window.id(),
            Tracked {
                widget,
                cursor: Point::default(),
                clicks: ClickTracker::default(),
            },
        );
        tracing::debug!(%widget, window = ?window.id(), "winit window registered");
    }

    /// Show the widget through the host, letting filters decorate it first.
    pub fn show(&mut self, window: &Window) {
        let Some(widget) = self.widget_for(window.id()) else {
            return;
        };
        self.app.show(widget);
        self.app.process_events();
        self.sync(window);
    }

    pub fn handle_event(
        &mut self,
        window: &Window,
        event: &WindowEvent,
        engine: Option<&DecorationEngine>,
    ) {
        let Some(widget) = self.widget_for(window.id()) else {
            return;
        };
        match event {
            WindowEvent::Focused(true) => self.app.set_active_window(Some(widget)),
            WindowEvent::Focused(false) => {
                if self.app.active_window() == Some(widget) {
                    self.app.set_active_window(None);
                }
            }
            WindowEvent::Resized(_) => {
                let outer = window.outer_size();
                self.app
                    .resize(widget, Size::new(outer.width as i32, outer.height as i32));
                self.pull_states(window, widget);
            }
            WindowEvent::Moved(position) => {
                self.app
                    .set_window_position(widget, Point::new(position.x, position.y));
            }
            WindowEvent::CursorMoved { position, .. } => {
                let local = Point::new(position.x.round() as i32, position.y.round() as i32);
                if let Some(tracked) = self.windows.get_mut(&window.id()) {
                    tracked.cursor = local;
                }
                let screen = self.to_screen(widget, local);
                if let Some(engine) = engine {
                    engine.handle_pointer(widget, PointerEvent::Moved(screen));
                }
            }
            WindowEvent::MouseInput {
                state,
                button: MouseButton::Left,
                ..
            } => {
                if let Some(engine) = engine {
                    self.left_button(window, widget, *state, engine);
                }
            }
            WindowEvent::CloseRequested => self.app.close(widget),
            WindowEvent::Destroyed => {
                self.windows.remove(&window.id());
                self.app.destroy(widget);
                self.app.process_events();
                return;
            }
            _ => return,
        }
        self.app.process_events();
        self.sync(window);
    }

    /// Push host decisions to the native window.
    pub fn sync(&self, window: &Window) {
        let Some(widget) = self.widget_for(window.id()) else {
            return;
        };
        let decorated = !self.app.is_frameless(widget);
        if window.is_decorated() != decorated {
            window.set_decorations(decorated);
        }
        let states = self.app.window_states(widget);
        let maximized = states.contains(WindowStates::MAXIMIZED);
        if window.is_maximized() != maximized {
            window.set_maximized(maximized);
        }
        let minimized = states.contains(WindowStates::MINIMIZED);
        if window.is_minimized() != Some(minimized) {
            window.set_minimized(minimized);
        }
        let visible = self.app.is_visible(widget) && !self.app.close_requested(widget);
        if window.is_visible() != Some(visible) {
            window.set_visible(visible);
        }
    }

    fn left_button(
        &mut self,
        window: &Window,
        widget: WidgetId,
        state: ElementState,
        engine: &DecorationEngine,
    ) {
        let Some(tracked) = self.windows.get_mut(&window.id()) else {
            return;
        };
        let local = tracked.cursor;
        let double = state == ElementState::Pressed && tracked.clicks.press(Instant::now(), local);
        let screen = self.to_screen(widget, local);
        let pointer = match state {
            ElementState::Pressed if double => PointerEvent::DoubleClicked(screen),
            ElementState::Pressed => PointerEvent::Pressed(screen),
            ElementState::Released => PointerEvent::Released(screen),
        };
        match engine.handle_pointer(widget, pointer) {
            PointerAction::Drag => {
                if let Err(err) = window.drag_window() {
                    tracing::warn!(%widget, "drag_window failed: {err}");
                }
            }
            PointerAction::Resize(hit) => {
                if let Some(direction) = resize_direction(hit) {
                    if let Err(err) = window.drag_resize_window(direction) {
                        tracing::warn!(%widget, "drag_resize_window failed: {err}");
                    }
                }
            }
            PointerAction::Clicked(role) => tracing::trace!(%widget, ?role, "caption button"),
            PointerAction::ToggledMaximize | PointerAction::None => {}
        }
    }

    fn to_screen(&self, widget: WidgetId, local: Point) -> Point {
        let origin = self.app.window_position(widget);
        Point::new(origin.x + local.x, origin.y + local.y)
    }

    fn pull_states(&self, window: &Window, widget: WidgetId) {
        let current = self.app.window_states(widget);
        let mut states = WindowStates::NONE;
        if window.is_maximized() {
            states = states | WindowStates::MAXIMIZED;
        }
        let minimized = window
            .is_minimized()
            .unwrap_or_else(|| current.contains(WindowStates::MINIMIZED));
        if minimized {
            states = states | WindowStates::MINIMIZED;
        }
        if window.fullscreen().is_some() {
            states = states | WindowStates::FULLSCREEN;
        }
        self.app.set_window_states(widget, states);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn double_click_needs_time_and_place() {
        let start = Instant::now();
        let mut clicks = ClickTracker::default();
        assert!(!clicks.press(start, Point::new(10, 10)));
        assert!(clicks.press(start + Duration::from_millis(200), Point::new(12, 9)));
        // a third press starts over
        assert!(!clicks.press(start + Duration::from_millis(300), Point::new(12, 9)));

        let mut clicks = ClickTracker::default();
        clicks.press(start, Point::new(10, 10));
        assert!(!clicks.press(start + Duration::from_millis(900), Point::new(10, 10)));

        let mut clicks = ClickTracker::default();
        clicks.press(start, Point::new(10, 10));
        assert!(!clicks.press(start + Duration::from_millis(100), Point::new(40, 10)));
    }

    #[test]
    fn resize_directions() {
        assert_eq!(
            resize_direction(HitTestResult::ResizeTopLeft),
            Some(ResizeDirection::NorthWest)
        );
        assert_eq!(
            resize_direction(HitTestResult::ResizeBottom),
            Some(ResizeDirection::South)
        );
        assert_eq!(resize_direction(HitTestResult::Caption), None);
        assert_eq!(resize_direction(HitTestResult::Client), None);
    }
}
