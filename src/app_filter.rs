//! Application-wide decoration of top-level windows.
//!
//! [`DecorationEngine`] installs itself as an application event filter. The
//! first time an eligible window is shown it gets a [`TitleBar`], loses its
//! native decoration hint, has its frame filter applied and is re-shown on
//! the next idle pass.

use crate::accent;
use crate::frame_filter::{FrameCallbacks, FrameFilter, FrameTarget, PlatformFrameFilter};
use crate::geometry::Point;
use crate::hit_test::{classify as classify_hit, HitTestResult, SizeConstraints};
use crate::host::{
    Application, BoxLayout, Event, EventFilter, WeakApplication, Widget, WidgetId, WidgetRole,
    WidgetTree, WindowKind, WindowStates,
};
use crate::caption_button::ButtonRole;
use crate::settings::DecorationSettings;
use crate::title_bar::{Intent, MenuBarLoan, SharedTitleBar, TitleBar, TitleBarOptions};
use hashlink::LinkedHashSet;
use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::{Rc, Weak};

pub const TITLE_BAR_NAME: &str = "TitleBar";
pub const WRAPPER_NAME: &str = "TitleBarWrapper";

/// Windows that must not be decorated automatically, in insertion order.
#[derive(Debug, Default, Clone)]
pub struct ExclusionSet {
    windows: LinkedHashSet<WidgetId>,
}

impl ExclusionSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `false` when the window was already present.
    pub fn insert(&mut self, window: WidgetId) -> bool {
        self.windows.insert(window)
    }

    pub fn remove(&mut self, window: WidgetId) -> bool {
        self.windows.remove(&window)
    }

    pub fn contains(&self, window: WidgetId) -> bool {
        self.windows.contains(&window)
    }

    pub fn len(&self) -> usize {
        self.windows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.windows.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = WidgetId> + '_ {
        self.windows.iter().copied()
    }
}

/// How a window would be retrofitted with a title bar.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Retrofit {
    /// The window has a central content slot and maybe a menu bar.
    Container {
        central: Option<WidgetId>,
        menu_bar: Option<WidgetId>,
    },
    /// The window's own top-level layout gets nested under the title bar.
    Plain,
    Ineligible,
}

pub fn classify(tree: &WidgetTree, window: WidgetId) -> Retrofit {
    let Some(widget) = tree.get(window) else {
        return Retrofit::Ineligible;
    };
    if !tree.is_top_level(window) {
        return Retrofit::Ineligible;
    }
    match widget.window.as_ref().map(|attrs| attrs.kind) {
        Some(WindowKind::Window) | Some(WindowKind::Dialog) => {}
        _ => return Retrofit::Ineligible,
    }
    if tree.count_title_bars(window) > 0 {
        return Retrofit::Ineligible;
    }
    match widget.role {
        WidgetRole::Container { central, menu_bar } => Retrofit::Container { central, menu_bar },
        WidgetRole::Plain => Retrofit::Plain,
        WidgetRole::MenuBar { .. } | WidgetRole::TitleBar(_) => Retrofit::Ineligible,
    }
}

/// Pointer input delivered to a decorated window, in screen coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerEvent {
    Moved(Point),
    Pressed(Point),
    Released(Point),
    DoubleClicked(Point),
}

/// What the platform should do in response to a pointer event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerAction {
    None,
    /// Start an interactive move of the window.
    Drag,
    /// Start an interactive resize from the given edge or corner.
    Resize(HitTestResult),
    /// A caption button was clicked and its intent published.
    Clicked(ButtonRole),
    ToggledMaximize,
}

struct Decoration {
    title_bar_widget: WidgetId,
    title_bar: SharedTitleBar,
    pressed: Option<ButtonRole>,
}

struct EngineInner {
    app: WeakApplication,
    settings: DecorationSettings,
    excluded: RefCell<ExclusionSet>,
    decorated: RefCell<HashMap<WidgetId, Decoration>>,
    frame_filter: Rc<dyn FrameFilter>,
    weak_self: Weak<EngineInner>,
}

pub struct DecorationEngine {
    inner: Rc<EngineInner>,
    filter: Rc<dyn EventFilter>,
}

impl DecorationEngine {
    /// Start decorating windows of `app` using the platform frame filter.
    pub fn attach(app: &Application, settings: DecorationSettings) -> Self {
        #[cfg(windows)]
        let frame_filter = PlatformFrameFilter::new(crate::frame::FrameEmulator::new(
            settings.resize_border(),
        ));
        #[cfg(not(windows))]
        let frame_filter = PlatformFrameFilter::new();
        Self::attach_with_filter(app, settings, Rc::new(frame_filter))
    }

    pub fn attach_with_filter(
        app: &Application,
        settings: DecorationSettings,
        frame_filter: Rc<dyn FrameFilter>,
    ) -> Self {
        let inner = Rc::new_cyclic(|weak_self| EngineInner {
            app: app.downgrade(),
            settings,
            excluded: RefCell::new(ExclusionSet::new()),
            decorated: RefCell::new(HashMap::new()),
            frame_filter,
            weak_self: weak_self.clone(),
        });
        let filter: Rc<dyn EventFilter> = inner.clone();
        app.install_event_filter(&filter);
        tracing::debug!("decoration engine attached");
        Self { inner, filter }
    }

    pub fn settings(&self) -> &DecorationSettings {
        &self.inner.settings
    }

    /// Opt `window` out of automatic decoration. The entry lasts until the
    /// window is destroyed; unknown ids are ignored.
    pub fn add_exclude(&self, window: WidgetId) {
        let Some(app) = self.inner.app.upgrade() else {
            return;
        };
        if !app.contains(window) {
            tracing::debug!(%window, "exclude for unknown window ignored");
            return;
        }
        if !self.inner.excluded.borrow_mut().insert(window) {
            return;
        }
        self.inner.forget_on_destroy(&app, window);
        tracing::debug!(%window, "window excluded from decoration");
    }

    pub fn is_excluded(&self, window: WidgetId) -> bool {
        self.inner.excluded.borrow().contains(window)
    }

    pub fn excluded_count(&self) -> usize {
        self.inner.excluded.borrow().len()
    }

    pub fn decorated_count(&self) -> usize {
        self.inner.decorated.borrow().len()
    }

    pub fn is_decorated(&self, window: WidgetId) -> bool {
        self.inner.decorated.borrow().contains_key(&window)
    }

    /// The title bar of a decorated window, for callers that need to tweak
    /// it or connect to its intents directly.
    pub fn title_bar(&self, window: WidgetId) -> Option<SharedTitleBar> {
        self.inner
            .decorated
            .borrow()
            .get(&window)
            .map(|decoration| Rc::clone(&decoration.title_bar))
    }

    pub fn title_bar_widget(&self, window: WidgetId) -> Option<WidgetId> {
        self.inner
            .decorated
            .borrow()
            .get(&window)
            .map(|decoration| decoration.title_bar_widget)
    }

    /// Mirror window titles and pick up accent color changes.
    pub fn refresh(&self) {
        let Some(app) = self.inner.app.upgrade() else {
            return;
        };
        let title_bars: Vec<(WidgetId, SharedTitleBar)> = self
            .inner
            .decorated
            .borrow()
            .iter()
            .map(|(window, decoration)| (*window, Rc::clone(&decoration.title_bar)))
            .collect();
        for (window, title_bar) in title_bars {
            let title = app.title(window);
            if let Ok(mut title_bar) = title_bar.try_borrow_mut() {
                if title_bar.title() != title {
                    title_bar.set_title(title);
                }
                title_bar.refresh_accent();
            }
        }
    }

    /// Classify a screen-space cursor for a decorated window.
    pub fn hit_test(&self, window: WidgetId, cursor: Point) -> HitTestResult {
        let Some(app) = self.inner.app.upgrade() else {
            return HitTestResult::None;
        };
        let Some(title_bar) = self.title_bar(window) else {
            return HitTestResult::None;
        };
        let Some(rect) = app.window_rect(window) else {
            return HitTestResult::None;
        };
        let constraints = window_constraints(&app, window);
        let local = app.map_from_screen(window, cursor);
        let caption_hovered = title_bar
            .try_borrow()
            .map(|title_bar| title_bar.hovered(local))
            .unwrap_or(false);
        match classify_hit(
            rect,
            cursor,
            constraints.resizability(),
            self.inner.settings.resize_border(),
            caption_hovered,
        ) {
            HitTestResult::None if rect.contains(cursor) => HitTestResult::Client,
            result => result,
        }
    }

    /// Route pointer input for platforms without native caption handling.
    pub fn handle_pointer(&self, window: WidgetId, event: PointerEvent) -> PointerAction {
        let Some(app) = self.inner.app.upgrade() else {
            return PointerAction::None;
        };
        let Some(title_bar) = self.title_bar(window) else {
            return PointerAction::None;
        };
        let (PointerEvent::Moved(cursor)
        | PointerEvent::Pressed(cursor)
        | PointerEvent::Released(cursor)
        | PointerEvent::DoubleClicked(cursor)) = event;
        app.set_cursor_pos(cursor);
        let local = app.map_from_screen(window, cursor);
        let hit = self.hit_test(window, cursor);

        match event {
            PointerEvent::Moved(_) => {
                let pressed = self.pressed_button(window).is_some();
                if let Ok(mut title_bar) = title_bar.try_borrow_mut() {
                    title_bar.update_hover(local, pressed);
                }
                PointerAction::None
            }
            PointerEvent::Pressed(_) => {
                if hit.is_resize() {
                    return PointerAction::Resize(hit);
                }
                let button = title_bar.borrow().button_at(local);
                if let Some(button) = button {
                    self.set_pressed_button(window, Some(button));
                    title_bar.borrow_mut().update_hover(local, true);
                    return PointerAction::None;
                }
                if hit == HitTestResult::Caption {
                    PointerAction::Drag
                } else {
                    PointerAction::None
                }
            }
            PointerEvent::Released(_) => {
                let pressed = self.pressed_button(window);
                self.set_pressed_button(window, None);
                let released_on = title_bar.borrow().button_at(local);
                title_bar.borrow_mut().update_hover(local, false);
                match (pressed, released_on) {
                    (Some(pressed), Some(released)) if pressed == released => {
                        let intents = title_bar.borrow().intents();
                        if let Some(intent) = TitleBar::intent_for(pressed) {
                            tracing::debug!(%window, ?intent, "caption button clicked");
                            intents.emit(intent);
                        }
                        PointerAction::Clicked(pressed)
                    }
                    _ => PointerAction::None,
                }
            }
            PointerEvent::DoubleClicked(_) => {
                if hit != HitTestResult::Caption {
                    return PointerAction::None;
                }
                let intents = title_bar.borrow().intents();
                intents.emit(Intent::MaximizeRestore);
                PointerAction::ToggledMaximize
            }
        }
    }

    fn pressed_button(&self, window: WidgetId) -> Option<ButtonRole> {
        self.inner
            .decorated
            .borrow()
            .get(&window)
            .and_then(|decoration| decoration.pressed)
    }

    fn set_pressed_button(&self, window: WidgetId, button: Option<ButtonRole>) {
        if let Some(decoration) = self.inner.decorated.borrow_mut().get_mut(&window) {
            decoration.pressed = button;
        }
    }
}

impl Drop for DecorationEngine {
    fn drop(&mut self) {
        let Some(app) = self.inner.app.upgrade() else {
            return;
        };
        app.remove_event_filter(&self.filter);
        let windows: Vec<WidgetId> = self.inner.decorated.borrow_mut().drain().map(|(w, _)| w).collect();
        for window in windows {
            self.inner.frame_filter.unapply(&app, window);
        }
        tracing::debug!("decoration engine detached");
    }
}

fn window_constraints(app: &Application, window: WidgetId) -> SizeConstraints {
    app.tree()
        .get(window)
        .map(|widget| widget.constraints)
        .unwrap_or_default()
}

impl EventFilter for EngineInner {
    fn event_filter(&self, app: &Application, target: WidgetId, event: &Event) -> bool {
        if *event != Event::Show {
            return false;
        }
        if self.excluded.borrow().contains(target) {
            return false;
        }
        let retrofit = classify(&app.tree(), target);
        let (title_bar_widget, title_bar) = match retrofit {
            Retrofit::Ineligible => {
                tracing::trace!(window = %target, "not eligible for decoration");
                return false;
            }
            Retrofit::Container { central, menu_bar } => {
                self.retrofit_container(app, target, central, menu_bar)
            }
            Retrofit::Plain => self.retrofit_plain(app, target),
        };
        tracing::debug!(window = %target, ?retrofit, "decorating window");
        self.set_up(app, target, title_bar_widget, title_bar);
        true
    }
}

impl EngineInner {
    /// Drop every record of `window` once it is destroyed. The frame filter
    /// is unapplied only for windows this engine decorated.
    fn forget_on_destroy(&self, app: &Application, window: WidgetId) {
        let engine = self.weak_self.clone();
        app.add_destroy_hook(window, move |window| {
            if let Some(engine) = engine.upgrade() {
                engine.forget(window);
            }
        });
    }

    fn forget(&self, window: WidgetId) {
        self.excluded.borrow_mut().remove(window);
        let removed = self.decorated.borrow_mut().remove(&window);
        if removed.is_some() {
            if let Some(app) = self.app.upgrade() {
                self.frame_filter.unapply(&app, window);
            }
            tracing::debug!(%window, "decorated window destroyed");
        }
    }

    fn new_title_bar(&self, window: WidgetId) -> SharedTitleBar {
        let mut options = TitleBarOptions::from_settings(&self.settings);
        if self.settings.follow_system_accent {
            options.accent = accent::system_accent();
        }
        let mut title_bar = TitleBar::new(options);
        title_bar.attach_to_window(window);
        title_bar.into_shared()
    }

    fn title_bar_widget(&self, title_bar: &SharedTitleBar) -> Widget {
        let height = title_bar.borrow().height();
        Widget::new(TITLE_BAR_NAME, WidgetRole::TitleBar(Rc::clone(title_bar)))
            .with_fixed_height(height)
    }

    /// `[title bar, central]` in a new wrapper that becomes the central
    /// widget. A menu bar moves into the title bar on loan.
    fn retrofit_container(
        &self,
        app: &Application,
        window: WidgetId,
        central: Option<WidgetId>,
        menu_bar: Option<WidgetId>,
    ) -> (WidgetId, SharedTitleBar) {
        let title_bar = self.new_title_bar(window);
        let mut tree = app.tree_mut();
        let wrapper = tree.insert(Widget::new(WRAPPER_NAME, WidgetRole::Plain), Some(window));
        let title_bar_widget = tree.insert(self.title_bar_widget(&title_bar), Some(wrapper));

        let mut layout = BoxLayout::tight_vertical().with_widget(title_bar_widget);
        if let Some(central) = central {
            tree.set_parent(central, Some(wrapper));
            layout = layout.with_widget(central);
        }
        if let Some(widget) = tree.get_mut(wrapper) {
            widget.layout = Some(layout);
        }

        let lent = menu_bar.and_then(|menu_bar| {
            let preferred_width = match tree.get(menu_bar).map(|widget| &widget.role) {
                Some(WidgetRole::MenuBar { preferred_width }) => *preferred_width,
                Some(_) => 0,
                None => return None,
            };
            tree.set_parent(menu_bar, Some(title_bar_widget));
            Some((menu_bar, preferred_width))
        });
        if let Some(widget) = tree.get_mut(window) {
            widget.role = WidgetRole::Container {
                central: Some(wrapper),
                menu_bar: if lent.is_some() { None } else { menu_bar },
            };
        }
        drop(tree);

        if let Some((menu_bar, preferred_width)) = lent {
            title_bar.borrow_mut().borrow_menu_bar(
                MenuBarLoan {
                    menu_bar,
                    owner: window,
                },
                preferred_width,
            );
        }
        (title_bar_widget, title_bar)
    }

    /// Fresh vertical stack: the title bar above the old layout, nested.
    fn retrofit_plain(&self, app: &Application, window: WidgetId) -> (WidgetId, SharedTitleBar) {
        let title_bar = self.new_title_bar(window);
        let mut tree = app.tree_mut();
        let title_bar_widget = tree.insert(self.title_bar_widget(&title_bar), Some(window));
        if let Some(widget) = tree.get_mut(window) {
            let mut layout = BoxLayout::tight_vertical().with_widget(title_bar_widget);
            if let Some(old) = widget.layout.take() {
                layout = layout.with_layout(old);
            }
            widget.layout = Some(layout);
        }
        (title_bar_widget, title_bar)
    }

    fn set_up(
        &self,
        app: &Application,
        window: WidgetId,
        title_bar_widget: WidgetId,
        title_bar: SharedTitleBar,
    ) {
        self.forget_on_destroy(app, window);

        self.wire_intents(app, window, &title_bar);

        let callbacks = self.frame_callbacks(app, window, &title_bar);
        self.frame_filter.apply(
            app,
            FrameTarget {
                window,
                native: app.native_handle(window),
            },
            callbacks,
        );

        self.decorated.borrow_mut().insert(
            window,
            Decoration {
                title_bar_widget,
                title_bar: Rc::clone(&title_bar),
                pressed: None,
            },
        );
        self.excluded.borrow_mut().insert(window);

        {
            let mut title_bar = title_bar.borrow_mut();
            title_bar.set_title(app.title(window));
            title_bar.on_window_state_change(app.window_states(window));
        }

        app.hide(window);
        app.set_frameless(window, true);
        app.post_idle(move |app| {
            if app.contains(window) {
                app.show(window);
            }
        });
    }

    fn wire_intents(&self, app: &Application, window: WidgetId, title_bar: &SharedTitleBar) {
        let weak_app = app.downgrade();
        title_bar.borrow().intents().connect(move |intent| {
            let Some(app) = weak_app.upgrade() else {
                return;
            };
            if !app.contains(window) {
                return;
            }
            match intent {
                Intent::Minimize => {
                    app.set_window_states(window, app.window_states(window) | WindowStates::MINIMIZED)
                }
                Intent::MaximizeRestore => {
                    app.set_window_states(window, app.window_states(window) ^ WindowStates::MAXIMIZED)
                }
                Intent::Close => app.close(window),
            }
        });
    }

    fn frame_callbacks(
        &self,
        app: &Application,
        window: WidgetId,
        title_bar: &SharedTitleBar,
    ) -> FrameCallbacks {
        let (app_active, bar_active) = (app.downgrade(), Rc::downgrade(title_bar));
        let (app_state, bar_state) = (app.downgrade(), Rc::downgrade(title_bar));
        let (app_hover, bar_hover) = (app.downgrade(), Rc::downgrade(title_bar));
        let app_constraints = app.downgrade();

        FrameCallbacks::new(
            move || {
                let (Some(app), Some(title_bar)) = (app_active.upgrade(), bar_active.upgrade())
                else {
                    return;
                };
                let on = app.is_active(window);
                if let Ok(mut title_bar) = title_bar.try_borrow_mut() {
                    title_bar.set_active(on);
                };
            },
            move || {
                let (Some(app), Some(title_bar)) = (app_state.upgrade(), bar_state.upgrade())
                else {
                    return;
                };
                let states = app.window_states(window);
                if let Ok(mut title_bar) = title_bar.try_borrow_mut() {
                    title_bar.on_window_state_change(states);
                };
            },
        )
        .with_hover_test(move |cursor| {
            let (Some(app), Some(title_bar)) = (app_hover.upgrade(), bar_hover.upgrade()) else {
                return false;
            };
            let local = app.map_from_screen(window, cursor);
            title_bar
                .try_borrow()
                .map(|title_bar| title_bar.hovered(local))
                .unwrap_or(false)
        })
        .with_size_constraints(move || {
            app_constraints
                .upgrade()
                .map(|app| window_constraints(&app, window))
                .unwrap_or_default()
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Size;

    #[test]
    fn exclusion_set_is_a_set() {
        let mut set = ExclusionSet::new();
        let a = WidgetId::from_index(3);
        let b = WidgetId::from_index(1);
        assert!(set.insert(a));
        assert!(!set.insert(a));
        assert!(set.insert(b));
        assert_eq!(set.len(), 2);
        assert_eq!(set.iter().collect::<Vec<_>>(), vec![a, b]);
        assert!(set.remove(a));
        assert!(!set.remove(a));
        assert!(!set.contains(a));
    }

    #[test]
    fn classification_by_structure() {
        let mut tree = WidgetTree::new();
        let central = tree.insert(Widget::new("central", WidgetRole::Plain), None);
        let main = tree.insert(
            Widget::window(
                "main",
                WindowKind::Window,
                WidgetRole::Container {
                    central: Some(central),
                    menu_bar: None,
                },
                Size::new(640, 480),
            ),
            None,
        );
        tree.set_parent(central, Some(main));
        let dialog = tree.insert(
            Widget::window("dialog", WindowKind::Dialog, WidgetRole::Plain, Size::new(300, 200)),
            None,
        );
        let tooltip = tree.insert(
            Widget::window("tip", WindowKind::ToolTip, WidgetRole::Plain, Size::new(80, 20)),
            None,
        );
        let child = tree.insert(Widget::new("child", WidgetRole::Plain), Some(dialog));

        assert_eq!(
            classify(&tree, main),
            Retrofit::Container {
                central: Some(central),
                menu_bar: None
            }
        );
        assert_eq!(classify(&tree, dialog), Retrofit::Plain);
        assert_eq!(classify(&tree, tooltip), Retrofit::Ineligible);
        assert_eq!(classify(&tree, child), Retrofit::Ineligible);
        assert_eq!(classify(&tree, WidgetId::from_index(99)), Retrofit::Ineligible);
    }

    #[test]
    fn window_with_title_bar_is_ineligible() {
        let mut tree = WidgetTree::new();
        let window = tree.insert(
            Widget::window("w", WindowKind::Window, WidgetRole::Plain, Size::new(100, 100)),
            None,
        );
        let title_bar = TitleBar::new(TitleBarOptions::default()).into_shared();
        tree.insert(
            Widget::new(TITLE_BAR_NAME, WidgetRole::TitleBar(title_bar)),
            Some(window),
        );
        assert_eq!(classify(&tree, window), Retrofit::Ineligible);
    }
}
