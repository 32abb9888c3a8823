//! The synthetic title bar: state, colors, caption buttons and hover tests.
//!
//! All geometry here is window-local. The title bar never operates on its
//! window directly; clicks are published as [`Intent`]s.

use crate::accent::{AccentColorSource, Color};
use crate::caption_button::{
    caption_icon_paths_for_state, ButtonRole, CaptionButton, CaptionButtonStyle,
};
use crate::geometry::{Point, Rect};
use crate::host::{WidgetId, WindowStates};
use crate::settings::{DecorationSettings, DEFAULT_TITLE_BAR_HEIGHT};
use std::cell::RefCell;
use std::rc::Rc;

pub type SharedTitleBar = Rc<RefCell<TitleBar>>;

const LEFT_MARGIN: i32 = 5;
pub const RESTORE_GLYPH: &str = "❐";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Intent {
    Minimize,
    MaximizeRestore,
    Close,
}

type Slot = Rc<dyn Fn(Intent)>;

/// Subscribers to title bar intents.
#[derive(Default)]
pub struct IntentSignal {
    slots: RefCell<Vec<Slot>>,
}

impl IntentSignal {
    pub fn connect(&self, slot: impl Fn(Intent) + 'static) {
        self.slots.borrow_mut().push(Rc::new(slot));
    }

    pub fn emit(&self, intent: Intent) {
        // Slots may connect further slots while running.
        let slots: Vec<Slot> = self.slots.borrow().clone();
        for slot in slots {
            slot(intent);
        }
    }

    pub fn len(&self) -> usize {
        self.slots.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// A menu bar shown inside the title bar on behalf of its owner. It must be
/// handed back to `owner` when the title bar goes away.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[must_use = "a borrowed menu bar has to be returned to its owner"]
pub struct MenuBarLoan {
    pub menu_bar: WidgetId,
    pub owner: WidgetId,
}

pub struct TitleBarOptions {
    pub style: CaptionButtonStyle,
    /// Caption icon resource. `None` selects the platform default icon.
    pub icon: Option<String>,
    pub height: i32,
    pub active_color: Option<Color>,
    pub inactive_color: Color,
    pub hover_color: Color,
    pub accent: Option<Box<dyn AccentColorSource>>,
}

impl Default for TitleBarOptions {
    fn default() -> Self {
        Self {
            style: CaptionButtonStyle::default(),
            icon: None,
            height: DEFAULT_TITLE_BAR_HEIGHT,
            active_color: None,
            inactive_color: Color::WHITE,
            hover_color: Color::GRAY,
            accent: None,
        }
    }
}

impl TitleBarOptions {
    pub fn from_settings(settings: &DecorationSettings) -> Self {
        Self {
            style: settings.caption_button_style,
            icon: None,
            height: settings.title_bar_height(),
            active_color: settings.active_color(),
            inactive_color: settings.inactive_color(),
            hover_color: settings.hover_color(),
            accent: None,
        }
    }
}

pub struct TitleBar {
    window: Option<WidgetId>,
    active: bool,
    maximized: bool,
    active_color: Color,
    active_color_overridden: bool,
    inactive_color: Color,
    hover_color: Color,
    background: Color,
    foreground: Color,
    style: CaptionButtonStyle,
    height: i32,
    geometry: Rect,
    left_margin: Option<i32>,
    icon_name: String,
    caption_icon: CaptionButton,
    minimize: CaptionButton,
    maximize_restore: CaptionButton,
    close: CaptionButton,
    title: String,
    title_rect: Rect,
    spacer_left: i32,
    spacer_right: i32,
    menu_bar: Option<(MenuBarLoan, i32)>,
    menu_bar_rect: Rect,
    accent: Option<Box<dyn AccentColorSource>>,
    intents: Rc<IntentSignal>,
}

fn default_icon_name() -> &'static str {
    if cfg!(windows) {
        "IDI_APPLICATION"
    } else {
        "application-x-executable"
    }
}

impl TitleBar {
    pub fn new(options: TitleBarOptions) -> Self {
        let height = if options.height > 0 {
            options.height
        } else {
            DEFAULT_TITLE_BAR_HEIGHT
        };
        // The stock Windows application icon carries its own padding.
        let left_margin = if cfg!(windows) && options.icon.is_none() {
            None
        } else {
            Some(LEFT_MARGIN)
        };
        let icon_name = options
            .icon
            .unwrap_or_else(|| default_icon_name().to_string());

        let accent_color = options.accent.as_ref().and_then(|source| source.current());
        let (active_color, overridden) = match options.active_color {
            Some(color) => (color, true),
            None => (accent_color.unwrap_or(Color::BLACK), false),
        };

        let mut title_bar = Self {
            window: None,
            active: false,
            maximized: false,
            active_color,
            active_color_overridden: overridden,
            inactive_color: options.inactive_color,
            hover_color: options.hover_color,
            background: options.inactive_color,
            foreground: Color::GRAY,
            style: options.style,
            height,
            geometry: Rect::default(),
            left_margin,
            icon_name,
            caption_icon: CaptionButton::new(ButtonRole::CaptionIcon, height),
            minimize: CaptionButton::new(ButtonRole::Minimize, height),
            maximize_restore: CaptionButton::new(ButtonRole::MaximizeRestore, height),
            close: CaptionButton::new(ButtonRole::Close, height),
            title: String::new(),
            title_rect: Rect::default(),
            spacer_left: 0,
            spacer_right: 0,
            menu_bar: None,
            menu_bar_rect: Rect::default(),
            accent: options.accent,
            intents: Rc::new(IntentSignal::default()),
        };
        title_bar.caption_icon.set_icon(Some(title_bar.icon_name.clone()));
        title_bar.set_active(false);
        title_bar.set_maximized(false);
        title_bar.update_spacers();
        title_bar
    }

    pub fn into_shared(self) -> SharedTitleBar {
        Rc::new(RefCell::new(self))
    }

    /// Back-reference to the decorated window. The title bar does not own it.
    pub fn window(&self) -> Option<WidgetId> {
        self.window
    }

    pub(crate) fn attach_to_window(&mut self, window: WidgetId) {
        self.window = Some(window);
    }

    pub fn height(&self) -> i32 {
        self.height
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn set_active(&mut self, active: bool) {
        self.active = active;
        if active {
            self.background = self.active_color;
            self.foreground = Color::WHITE;
        } else {
            self.background = self.inactive_color;
            self.foreground = Color::GRAY;
        }
        for button in self.buttons_mut() {
            button.set_active(active);
        }
        self.refresh_icons();
    }

    pub fn is_maximized(&self) -> bool {
        self.maximized
    }

    pub fn set_maximized(&mut self, maximized: bool) {
        self.maximized = maximized;
        self.refresh_icons();
    }

    pub fn set_minimizable(&mut self, on: bool) {
        self.minimize.set_visible(on);
        self.update_spacers();
        self.relayout();
    }

    pub fn set_maximizable(&mut self, on: bool) {
        self.maximize_restore.set_visible(on);
        self.update_spacers();
        self.relayout();
    }

    pub fn is_minimizable(&self) -> bool {
        self.minimize.is_visible()
    }

    pub fn is_maximizable(&self) -> bool {
        self.maximize_restore.is_visible()
    }

    /// Activation and maximize state are read independently: the bitmask's
    /// active bit and its maximized bit come from different platform sources.
    pub fn on_window_state_change(&mut self, states: WindowStates) {
        self.set_active(states.contains(WindowStates::ACTIVE));
        self.set_maximized(states.contains(WindowStates::MAXIMIZED));
    }

    pub fn active_color(&self) -> Color {
        self.active_color
    }

    pub fn set_active_color(&mut self, color: Color) {
        self.active_color = color;
        self.active_color_overridden = true;
        self.set_active(self.active);
    }

    pub fn inactive_color(&self) -> Color {
        self.inactive_color
    }

    pub fn set_inactive_color(&mut self, color: Color) {
        self.inactive_color = color;
        self.set_active(self.active);
    }

    pub fn hover_color(&self) -> Color {
        self.hover_color
    }

    pub fn set_hover_color(&mut self, color: Color) {
        self.hover_color = color;
    }

    pub fn background(&self) -> Color {
        self.background
    }

    pub fn foreground(&self) -> Color {
        self.foreground
    }

    pub fn caption_button_style(&self) -> CaptionButtonStyle {
        self.style
    }

    pub fn set_caption_button_style(&mut self, style: CaptionButtonStyle) {
        self.style = style;
        self.refresh_icons();
    }

    /// Pick up a changed system accent unless the color was set explicitly.
    pub fn refresh_accent(&mut self) -> bool {
        let Some(source) = self.accent.as_ref() else {
            return false;
        };
        if !source.take_changed() || self.active_color_overridden {
            return false;
        }
        match source.current() {
            Some(color) if color != self.active_color => {
                tracing::debug!(%color, "accent color changed");
                self.active_color = color;
                self.set_active(self.active);
                true
            }
            _ => false,
        }
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn set_title(&mut self, title: impl Into<String>) {
        self.title = title.into();
    }

    pub fn icon_name(&self) -> &str {
        &self.icon_name
    }

    pub fn button(&self, role: ButtonRole) -> &CaptionButton {
        match role {
            ButtonRole::CaptionIcon => &self.caption_icon,
            ButtonRole::Minimize => &self.minimize,
            ButtonRole::MaximizeRestore => &self.maximize_restore,
            ButtonRole::Close => &self.close,
        }
    }

    fn buttons_mut(&mut self) -> [&mut CaptionButton; 4] {
        [
            &mut self.caption_icon,
            &mut self.minimize,
            &mut self.maximize_restore,
            &mut self.close,
        ]
    }

    fn refresh_icons(&mut self) {
        let buttons = [
            &mut self.minimize,
            &mut self.maximize_restore,
            &mut self.close,
        ];
        for (slot, button) in buttons.into_iter().enumerate() {
            let icons = caption_icon_paths_for_state(
                self.active,
                self.maximized,
                button.is_hovered(),
                button.is_pressed(),
                self.style,
            );
            button.set_icon(Some(icons[slot].to_string()));
        }
    }

    /// Glyph currently shown on the maximize/restore button.
    pub fn maximize_restore_glyph(&self) -> &'static str {
        if self.maximized {
            RESTORE_GLYPH
        } else {
            self.maximize_restore.text()
        }
    }

    pub fn intents(&self) -> Rc<IntentSignal> {
        Rc::clone(&self.intents)
    }

    pub fn minimize_clicked(&self, slot: impl Fn() + 'static) {
        self.connect_intent(Intent::Minimize, slot);
    }

    pub fn maximize_restore_clicked(&self, slot: impl Fn() + 'static) {
        self.connect_intent(Intent::MaximizeRestore, slot);
    }

    pub fn close_clicked(&self, slot: impl Fn() + 'static) {
        self.connect_intent(Intent::Close, slot);
    }

    fn connect_intent(&self, wanted: Intent, slot: impl Fn() + 'static) {
        self.intents.connect(move |intent| {
            if intent == wanted {
                slot();
            }
        });
    }

    pub fn intent_for(role: ButtonRole) -> Option<Intent> {
        match role {
            ButtonRole::CaptionIcon => None,
            ButtonRole::Minimize => Some(Intent::Minimize),
            ButtonRole::MaximizeRestore => Some(Intent::MaximizeRestore),
            ButtonRole::Close => Some(Intent::Close),
        }
    }

    /// Publish the intent behind a caption button click.
    ///
    /// Slots run while the caller still holds this title bar; they must not
    /// borrow it mutably. Use [`TitleBar::intents`] to emit after releasing it.
    pub fn click(&self, role: ButtonRole) {
        if let Some(intent) = Self::intent_for(role) {
            self.intents.emit(intent);
        }
    }

    pub fn menu_bar(&self) -> Option<WidgetId> {
        self.menu_bar.map(|(loan, _)| loan.menu_bar)
    }

    /// The widget the borrowed menu bar goes back to.
    pub fn menu_bar_owner(&self) -> Option<WidgetId> {
        self.menu_bar.map(|(loan, _)| loan.owner)
    }

    pub fn menu_bar_rect(&self) -> Rect {
        self.menu_bar_rect
    }

    pub(crate) fn borrow_menu_bar(&mut self, loan: MenuBarLoan, preferred_width: i32) {
        self.menu_bar = Some((loan, preferred_width.max(0)));
        self.update_spacers();
        self.relayout();
    }

    pub(crate) fn release_menu_bar(&mut self) -> Option<MenuBarLoan> {
        let (loan, _) = self.menu_bar.take()?;
        self.menu_bar_rect = Rect::default();
        self.update_spacers();
        self.relayout();
        Some(loan)
    }

    pub fn geometry(&self) -> Rect {
        self.geometry
    }

    pub fn title_rect(&self) -> Rect {
        self.title_rect
    }

    pub fn spacers(&self) -> (i32, i32) {
        (self.spacer_left, self.spacer_right)
    }

    /// Width occupied left of the title: margin, caption icon, menu bar.
    pub fn left_visible_width(&self) -> i32 {
        self.left_margin.unwrap_or(0)
            + self.caption_icon.width()
            + self.menu_bar.map(|(_, width)| width).unwrap_or(0)
    }

    /// Width occupied right of the title by the visible caption buttons.
    pub fn right_visible_width(&self) -> i32 {
        [&self.minimize, &self.maximize_restore, &self.close]
            .into_iter()
            .filter(|button| button.is_visible())
            .map(CaptionButton::width)
            .sum()
    }

    fn update_spacers(&mut self) {
        let left = self.left_visible_width();
        let right = self.right_visible_width();
        if left > right {
            self.spacer_left = 0;
            self.spacer_right = left - right;
        } else {
            self.spacer_left = right - left;
            self.spacer_right = 0;
        }
    }

    fn relayout(&mut self) {
        let geometry = self.geometry;
        self.set_geometry(geometry);
    }

    /// Place the title bar at `rect` (window-local) and lay out its content:
    /// `[margin][icon][menu bar][spacer][title][spacer][min][max][close]`.
    pub fn set_geometry(&mut self, rect: Rect) {
        self.geometry = rect;
        let top = rect.top;
        let bottom = rect.top + self.height.min(rect.height().max(0));

        let mut x = rect.left + self.left_margin.unwrap_or(0);
        let icon_width = self.caption_icon.width();
        self.caption_icon
            .set_rect(Rect::new(x, top, x + icon_width, bottom));
        x += icon_width;

        if let Some((_, width)) = self.menu_bar {
            self.menu_bar_rect = Rect::new(x, top, x + width, bottom);
            x += width;
        } else {
            self.menu_bar_rect = Rect::default();
        }
        x += self.spacer_left;

        let mut right = rect.right;
        for button in [
            &mut self.close,
            &mut self.maximize_restore,
            &mut self.minimize,
        ] {
            if button.is_visible() {
                let width = button.width();
                button.set_rect(Rect::new(right - width, top, right, bottom));
                right -= width;
            } else {
                button.set_rect(Rect::default());
            }
        }
        right -= self.spacer_right;

        self.title_rect = Rect::new(x, top, right.max(x), bottom);
    }

    /// `true` when `cursor` is over the draggable part of the title bar,
    /// i.e. inside it but outside every interactive child.
    pub fn hovered(&self, cursor: Point) -> bool {
        if !self.geometry.contains(cursor) {
            return false;
        }
        let over_child = self.caption_icon.contains(cursor)
            || self.minimize.contains(cursor)
            || self.maximize_restore.contains(cursor)
            || self.close.contains(cursor)
            || (self.menu_bar.is_some() && self.menu_bar_rect.contains(cursor));
        !over_child
    }

    pub fn is_caption_button_hovered(&self, cursor: Point) -> bool {
        self.minimize.contains(cursor) || self.maximize_restore.contains(cursor)
    }

    pub fn button_at(&self, cursor: Point) -> Option<ButtonRole> {
        [
            &self.caption_icon,
            &self.minimize,
            &self.maximize_restore,
            &self.close,
        ]
        .into_iter()
        .find(|button| button.contains(cursor))
        .map(CaptionButton::role)
    }

    /// Track pointer hover/press over the caption buttons and refresh icons.
    pub fn update_hover(&mut self, cursor: Point, pressed: bool) {
        for button in self.buttons_mut() {
            let over = button.contains(cursor);
            button.set_pointer(over, pressed);
        }
        self.refresh_icons();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::accent::FixedAccent;
    use std::cell::Cell;

    fn title_bar() -> TitleBar {
        let mut title_bar = TitleBar::new(TitleBarOptions::default());
        title_bar.set_geometry(Rect::new(0, 0, 640, 30));
        title_bar
    }

    #[test]
    fn spacers_stay_exclusive_under_toggles() {
        let mut title_bar = title_bar();
        for bits in 0..16u8 {
            title_bar.set_minimizable(bits & 1 != 0);
            title_bar.set_maximizable(bits & 2 != 0);
            if bits & 4 != 0 {
                title_bar.set_minimizable(bits & 8 != 0);
            }
            let (left, right) = title_bar.spacers();
            assert!(left == 0 || right == 0, "both spacers set: {left} {right}");
            let diff = (title_bar.left_visible_width() - title_bar.right_visible_width()).abs();
            assert_eq!(left + right, diff);
        }
    }

    #[test]
    fn spacer_side_follows_wider_side() {
        let mut title_bar = title_bar();
        let (left, right) = title_bar.spacers();
        assert_eq!(right, 0);
        assert_eq!(left, 138 - title_bar.left_visible_width());

        title_bar.set_minimizable(false);
        title_bar.set_maximizable(false);
        title_bar.borrow_menu_bar(
            MenuBarLoan {
                menu_bar: WidgetId::from_index(1),
                owner: WidgetId::from_index(0),
            },
            200,
        );
        let (left, right) = title_bar.spacers();
        assert_eq!(left, 0);
        assert_eq!(right, title_bar.left_visible_width() - 46);
        let _ = title_bar.release_menu_bar();
    }

    #[test]
    fn hovered_excludes_buttons_and_icon() {
        let title_bar = title_bar();
        assert!(title_bar.hovered(Point::new(320, 15)));
        assert!(!title_bar.hovered(Point::new(320, 30)));
        let close = title_bar.button(ButtonRole::Close).rect();
        assert_eq!(close, Rect::new(594, 0, 640, 30));
        assert!(!title_bar.hovered(Point::new(600, 10)));
        let icon = title_bar.button(ButtonRole::CaptionIcon).rect();
        assert!(!title_bar.hovered(Point::new(icon.left + 1, 10)));
        assert!(!title_bar.hovered(Point::new(510, 10)));
        assert!(title_bar.is_caption_button_hovered(Point::new(510, 10)));
        assert!(!title_bar.is_caption_button_hovered(Point::new(600, 10)));
    }

    #[test]
    fn hidden_buttons_become_draggable() {
        let mut title_bar = title_bar();
        let min_rect = title_bar.button(ButtonRole::Minimize).rect();
        assert!(!title_bar.hovered(Point::new(min_rect.left + 2, 10)));
        title_bar.set_maximizable(false);
        assert!(title_bar.hovered(Point::new(min_rect.left + 2, 10)));
        assert_eq!(
            title_bar.button(ButtonRole::Minimize).rect(),
            Rect::new(548, 0, 594, 30)
        );
    }

    #[test]
    fn menu_bar_region_is_not_draggable() {
        let mut title_bar = title_bar();
        title_bar.borrow_menu_bar(
            MenuBarLoan {
                menu_bar: WidgetId::from_index(1),
                owner: WidgetId::from_index(0),
            },
            120,
        );
        let menu = title_bar.menu_bar_rect();
        assert_eq!(menu.width(), 120);
        assert!(!title_bar.hovered(Point::new(menu.left + 5, 10)));
        assert!(title_bar.hovered(Point::new(menu.right + 5, 10)));
        let loan = title_bar.release_menu_bar().unwrap();
        assert_eq!(loan.menu_bar, WidgetId::from_index(1));
        assert!(title_bar.menu_bar().is_none());
    }

    #[test]
    fn state_change_sets_both_flags() {
        let mut title_bar = title_bar();
        title_bar.on_window_state_change(WindowStates::MAXIMIZED | WindowStates::ACTIVE);
        assert!(title_bar.is_active());
        assert!(title_bar.is_maximized());
        assert_eq!(title_bar.maximize_restore_glyph(), RESTORE_GLYPH);
        assert!(title_bar
            .button(ButtonRole::MaximizeRestore)
            .icon()
            .unwrap()
            .contains("restore"));

        title_bar.on_window_state_change(WindowStates::NONE);
        assert!(!title_bar.is_active());
        assert!(!title_bar.is_maximized());
        assert_eq!(title_bar.maximize_restore_glyph(), "☐");
    }

    #[test]
    fn active_colors() {
        let mut title_bar = title_bar();
        title_bar.set_active_color(Color::rgb(1, 2, 3));
        title_bar.set_active(true);
        assert_eq!(title_bar.background(), Color::rgb(1, 2, 3));
        assert_eq!(title_bar.foreground(), Color::WHITE);
        assert!(title_bar.button(ButtonRole::Close).is_active());
        title_bar.set_active(false);
        assert_eq!(title_bar.background(), Color::WHITE);
        assert!(!title_bar.button(ButtonRole::Close).is_active());
    }

    #[derive(Clone)]
    struct ChangingAccent {
        color: Rc<Cell<Color>>,
        changed: Rc<Cell<bool>>,
    }

    impl ChangingAccent {
        fn new(color: Color) -> Self {
            Self {
                color: Rc::new(Cell::new(color)),
                changed: Rc::new(Cell::new(false)),
            }
        }

        fn change_to(&self, color: Color) {
            self.color.set(color);
            self.changed.set(true);
        }
    }

    impl AccentColorSource for ChangingAccent {
        fn current(&self) -> Option<Color> {
            Some(self.color.get())
        }

        fn take_changed(&self) -> bool {
            self.changed.replace(false)
        }
    }

    #[test]
    fn accent_initializes_and_updates() {
        let title_bar = TitleBar::new(TitleBarOptions {
            accent: Some(Box::new(FixedAccent(Some(Color::rgb(0, 0x78, 0xd7))))),
            ..Default::default()
        });
        assert_eq!(title_bar.active_color(), Color::rgb(0, 0x78, 0xd7));

        let accent = ChangingAccent::new(Color::rgb(9, 9, 9));
        let mut title_bar = TitleBar::new(TitleBarOptions {
            accent: Some(Box::new(accent.clone())),
            ..Default::default()
        });
        title_bar.set_active(true);
        assert_eq!(title_bar.background(), Color::rgb(9, 9, 9));
        assert!(!title_bar.refresh_accent(), "no change pending");

        accent.change_to(Color::rgb(0x20, 0x40, 0x60));
        assert!(title_bar.refresh_accent());
        assert_eq!(title_bar.active_color(), Color::rgb(0x20, 0x40, 0x60));
        assert_eq!(title_bar.background(), Color::rgb(0x20, 0x40, 0x60));
        assert!(!title_bar.refresh_accent(), "change already taken");

        // inactive title bars keep their background but remember the accent
        title_bar.set_active(false);
        accent.change_to(Color::rgb(0x11, 0x22, 0x33));
        assert!(title_bar.refresh_accent());
        assert_eq!(title_bar.background(), title_bar.inactive_color());
        title_bar.set_active(true);
        assert_eq!(title_bar.background(), Color::rgb(0x11, 0x22, 0x33));
    }

    #[test]
    fn explicit_active_color_ignores_accent() {
        let accent = ChangingAccent::new(Color::rgb(9, 9, 9));
        let mut title_bar = TitleBar::new(TitleBarOptions {
            accent: Some(Box::new(accent.clone())),
            ..Default::default()
        });
        title_bar.set_active(true);
        title_bar.set_active_color(Color::rgb(1, 1, 1));
        assert_eq!(title_bar.background(), Color::rgb(1, 1, 1));

        accent.change_to(Color::rgb(0x20, 0x40, 0x60));
        assert!(!title_bar.refresh_accent());
        assert_eq!(title_bar.active_color(), Color::rgb(1, 1, 1));
        assert_eq!(title_bar.background(), Color::rgb(1, 1, 1));
    }

    #[test]
    fn click_emits_intents() {
        let title_bar = title_bar();
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);
        title_bar.intents().connect(move |intent| sink.borrow_mut().push(intent));
        let closes = Rc::new(Cell::new(0));
        let counter = Rc::clone(&closes);
        title_bar.close_clicked(move || counter.set(counter.get() + 1));

        title_bar.click(ButtonRole::CaptionIcon);
        title_bar.click(ButtonRole::Minimize);
        title_bar.click(ButtonRole::Close);
        assert_eq!(*seen.borrow(), vec![Intent::Minimize, Intent::Close]);
        assert_eq!(closes.get(), 1);
    }

    #[test]
    fn pointer_updates_hover_icons() {
        let mut title_bar = title_bar();
        title_bar.set_active(false);
        title_bar.update_hover(Point::new(600, 10), false);
        assert!(title_bar.button(ButtonRole::Close).is_hovered());
        assert!(title_bar
            .button(ButtonRole::Close)
            .icon()
            .unwrap()
            .ends_with("close-light.svg"));
        assert!(title_bar
            .button(ButtonRole::Minimize)
            .icon()
            .unwrap()
            .contains("disabled"));
        assert_eq!(title_bar.button_at(Point::new(600, 10)), Some(ButtonRole::Close));
    }
}
