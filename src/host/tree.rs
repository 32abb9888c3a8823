use crate::geometry::{Margins, Point, Rect, Size};
use crate::hit_test::SizeConstraints;
use crate::title_bar::SharedTitleBar;
use raw_window_handle::RawWindowHandle;
use slab::Slab;
use std::fmt;
use std::ops::{BitAnd, BitOr, BitXor, Not};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct WidgetId(usize);

#[cfg(test)]
impl WidgetId {
    pub(crate) fn from_index(index: usize) -> Self {
        WidgetId(index)
    }
}

impl fmt::Display for WidgetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WindowKind {
    Widget,
    Window,
    Dialog,
    Popup,
    Tool,
    ToolTip,
    SplashScreen,
}

/// Window state bitmask as reported to decorations.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct WindowStates(u8);

impl WindowStates {
    pub const NONE: WindowStates = WindowStates(0);
    pub const MINIMIZED: WindowStates = WindowStates(1);
    pub const MAXIMIZED: WindowStates = WindowStates(1 << 1);
    pub const FULLSCREEN: WindowStates = WindowStates(1 << 2);
    pub const ACTIVE: WindowStates = WindowStates(1 << 3);

    pub fn contains(self, other: WindowStates) -> bool {
        self.0 & other.0 == other.0 && other.0 != 0
    }

    pub fn bits(self) -> u8 {
        self.0
    }
}

impl BitOr for WindowStates {
    type Output = WindowStates;
    fn bitor(self, rhs: Self) -> Self {
        WindowStates(self.0 | rhs.0)
    }
}

impl BitAnd for WindowStates {
    type Output = WindowStates;
    fn bitand(self, rhs: Self) -> Self {
        WindowStates(self.0 & rhs.0)
    }
}

impl BitXor for WindowStates {
    type Output = WindowStates;
    fn bitxor(self, rhs: Self) -> Self {
        WindowStates(self.0 ^ rhs.0)
    }
}

impl Not for WindowStates {
    type Output = WindowStates;
    fn not(self) -> Self {
        WindowStates(!self.0 & 0b1111)
    }
}

#[derive(Debug, Clone)]
pub struct WindowAttrs {
    pub kind: WindowKind,
    /// Native decoration hint. `true` asks the platform for no frame.
    pub frameless: bool,
    /// Minimized/maximized/fullscreen. Activation is tracked separately.
    pub states: WindowStates,
    pub active: bool,
    pub title: String,
    /// Screen position of the window's top-left corner.
    pub position: Point,
    pub native: Option<RawWindowHandle>,
    pub close_requested: bool,
}

impl WindowAttrs {
    pub fn new(kind: WindowKind) -> Self {
        Self {
            kind,
            frameless: false,
            states: WindowStates::NONE,
            active: false,
            title: String::new(),
            position: Point::default(),
            native: None,
            close_requested: false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Vertical,
    Horizontal,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LayoutItem {
    Widget(WidgetId),
    Layout(BoxLayout),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoxLayout {
    pub direction: Direction,
    pub spacing: i32,
    pub margins: Margins,
    pub items: Vec<LayoutItem>,
}

impl BoxLayout {
    pub fn new(direction: Direction) -> Self {
        Self {
            direction,
            spacing: 6,
            margins: Margins::uniform(9),
            items: Vec::new(),
        }
    }

    /// Vertical stack with no spacing and no margins.
    pub fn tight_vertical() -> Self {
        Self {
            direction: Direction::Vertical,
            spacing: 0,
            margins: Margins::default(),
            items: Vec::new(),
        }
    }

    pub fn with_widget(mut self, id: WidgetId) -> Self {
        self.items.push(LayoutItem::Widget(id));
        self
    }

    pub fn with_layout(mut self, layout: BoxLayout) -> Self {
        self.items.push(LayoutItem::Layout(layout));
        self
    }

    pub fn widgets(&self) -> Vec<WidgetId> {
        let mut out = Vec::new();
        for item in &self.items {
            match item {
                LayoutItem::Widget(id) => out.push(*id),
                LayoutItem::Layout(nested) => out.extend(nested.widgets()),
            }
        }
        out
    }
}

#[derive(Clone)]
pub enum WidgetRole {
    Plain,
    /// Main-window style widget with a designated central content slot and
    /// an optional menu bar laid out above it.
    Container {
        central: Option<WidgetId>,
        menu_bar: Option<WidgetId>,
    },
    MenuBar {
        preferred_width: i32,
    },
    TitleBar(SharedTitleBar),
}

impl fmt::Debug for WidgetRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WidgetRole::Plain => write!(f, "Plain"),
            WidgetRole::Container { central, menu_bar } => f
                .debug_struct("Container")
                .field("central", central)
                .field("menu_bar", menu_bar)
                .finish(),
            WidgetRole::MenuBar { preferred_width } => f
                .debug_struct("MenuBar")
                .field("preferred_width", preferred_width)
                .finish(),
            WidgetRole::TitleBar(_) => write!(f, "TitleBar"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Widget {
    pub name: String,
    parent: Option<WidgetId>,
    children: Vec<WidgetId>,
    pub role: WidgetRole,
    pub window: Option<WindowAttrs>,
    pub layout: Option<BoxLayout>,
    /// Window-local geometry; top-level widgets start at (0, 0).
    pub geometry: Rect,
    pub visible: bool,
    pub constraints: SizeConstraints,
}

impl Widget {
    pub fn new(name: impl Into<String>, role: WidgetRole) -> Self {
        Self {
            name: name.into(),
            parent: None,
            children: Vec::new(),
            role,
            window: None,
            layout: None,
            geometry: Rect::default(),
            visible: true,
            constraints: SizeConstraints::default(),
        }
    }

    pub fn window(name: impl Into<String>, kind: WindowKind, role: WidgetRole, size: Size) -> Self {
        let mut widget = Self::new(name, role);
        widget.window = Some(WindowAttrs::new(kind));
        widget.geometry = Rect::from_origin_size(Point::default(), size);
        widget.visible = false;
        widget
    }

    pub fn with_fixed_height(mut self, height: i32) -> Self {
        self.constraints.min.height = height;
        self.constraints.max.height = height;
        self
    }

    pub fn parent(&self) -> Option<WidgetId> {
        self.parent
    }

    pub fn children(&self) -> &[WidgetId] {
        &self.children
    }

    pub fn is_window(&self) -> bool {
        self.window.is_some()
    }

    pub fn title_bar(&self) -> Option<&SharedTitleBar> {
        match &self.role {
            WidgetRole::TitleBar(title_bar) => Some(title_bar),
            _ => None,
        }
    }
}

/// Arena of widgets. Ids are never reused while the referenced widget is alive.
#[derive(Debug, Default)]
pub struct WidgetTree {
    widgets: Slab<Widget>,
}

impl WidgetTree {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, widget: Widget, parent: Option<WidgetId>) -> WidgetId {
        let id = WidgetId(self.widgets.insert(widget));
        if let Some(parent) = parent {
            self.set_parent(id, Some(parent));
        }
        id
    }

    pub fn contains(&self, id: WidgetId) -> bool {
        self.widgets.contains(id.0)
    }

    pub fn get(&self, id: WidgetId) -> Option<&Widget> {
        self.widgets.get(id.0)
    }

    pub fn get_mut(&mut self, id: WidgetId) -> Option<&mut Widget> {
        self.widgets.get_mut(id.0)
    }

    pub fn len(&self) -> usize {
        self.widgets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.widgets.is_empty()
    }

    pub fn set_parent(&mut self, id: WidgetId, parent: Option<WidgetId>) {
        let old = match self.get(id) {
            Some(widget) => widget.parent,
            None => return,
        };
        if let Some(old) = old {
            if let Some(old) = self.get_mut(old) {
                old.children.retain(|child| *child != id);
            }
        }
        let parent = parent.filter(|p| self.contains(*p) && *p != id);
        if let Some(parent) = parent {
            if let Some(parent) = self.get_mut(parent) {
                parent.children.push(id);
            }
        }
        if let Some(widget) = self.get_mut(id) {
            widget.parent = parent;
        }
    }

    pub fn is_top_level(&self, id: WidgetId) -> bool {
        self.get(id)
            .map(|widget| widget.parent.is_none() && widget.window.is_some())
            .unwrap_or(false)
    }

    pub fn window_attrs(&self, id: WidgetId) -> Option<&WindowAttrs> {
        self.get(id).and_then(|widget| widget.window.as_ref())
    }

    pub fn window_attrs_mut(&mut self, id: WidgetId) -> Option<&mut WindowAttrs> {
        self.get_mut(id).and_then(|widget| widget.window.as_mut())
    }

    /// The top-level widget `id` belongs to.
    pub fn window_of(&self, id: WidgetId) -> Option<WidgetId> {
        let mut current = id;
        loop {
            let widget = self.get(current)?;
            match widget.parent {
                Some(parent) => current = parent,
                None => return Some(current),
            }
        }
    }

    /// `id` followed by all of its descendants, depth first.
    pub fn subtree(&self, id: WidgetId) -> Vec<WidgetId> {
        let mut out = Vec::new();
        let mut stack = vec![id];
        while let Some(next) = stack.pop() {
            if let Some(widget) = self.get(next) {
                out.push(next);
                stack.extend(widget.children.iter().rev().copied());
            }
        }
        out
    }

    pub fn descendants_with_title_bar(&self, id: WidgetId) -> Vec<WidgetId> {
        self.subtree(id)
            .into_iter()
            .filter(|child| self.get(*child).and_then(Widget::title_bar).is_some())
            .collect()
    }

    /// Hand menu bars borrowed by title bars under `id` back to owners that
    /// live outside that subtree. Afterwards the returned menu bars are no
    /// longer part of the subtree.
    pub fn return_loans(&mut self, id: WidgetId) {
        let subtree = self.subtree(id);
        for title_bar_id in &subtree {
            let owner_outside = match self.get(*title_bar_id).and_then(Widget::title_bar) {
                Some(title_bar) => title_bar
                    .borrow()
                    .menu_bar_owner()
                    .map(|owner| !subtree.contains(&owner))
                    .unwrap_or(false),
                None => false,
            };
            if !owner_outside {
                continue;
            }
            let loan = self
                .get(*title_bar_id)
                .and_then(Widget::title_bar)
                .and_then(|title_bar| title_bar.borrow_mut().release_menu_bar());
            if let Some(loan) = loan {
                self.return_menu_bar(loan);
            }
        }
    }

    /// Remove `id` and its descendants. A title bar that borrowed a menu
    /// bar from a widget outside the removed subtree hands it back first,
    /// and the menu bar survives.
    pub fn remove(&mut self, id: WidgetId) -> Vec<Widget> {
        self.return_loans(id);
        let doomed = self.subtree(id);

        self.set_parent(id, None);
        for layout_owner in self.widgets.iter_mut().map(|(_, widget)| widget) {
            if let Some(layout) = layout_owner.layout.as_mut() {
                strip_from_layout(layout, &doomed);
            }
            if let WidgetRole::Container { central, menu_bar } = &mut layout_owner.role {
                if central.map(|c| doomed.contains(&c)).unwrap_or(false) {
                    *central = None;
                }
                if menu_bar.map(|m| doomed.contains(&m)).unwrap_or(false) {
                    *menu_bar = None;
                }
            }
        }
        doomed
            .into_iter()
            .filter_map(|doomed_id| self.widgets.try_remove(doomed_id.0))
            .collect()
    }

    pub(crate) fn return_menu_bar(&mut self, loan: crate::title_bar::MenuBarLoan) {
        if !self.contains(loan.menu_bar) || !self.contains(loan.owner) {
            return;
        }
        self.set_parent(loan.menu_bar, Some(loan.owner));
        if let Some(owner) = self.get_mut(loan.owner) {
            if let WidgetRole::Container { menu_bar, .. } = &mut owner.role {
                *menu_bar = Some(loan.menu_bar);
            }
        }
        tracing::debug!(menu_bar = %loan.menu_bar, owner = %loan.owner, "menu bar returned");
    }

    pub fn count_title_bars(&self, window: WidgetId) -> usize {
        self.descendants_with_title_bar(window).len()
    }
}

fn strip_from_layout(layout: &mut BoxLayout, doomed: &[WidgetId]) {
    layout.items.retain(|item| match item {
        LayoutItem::Widget(id) => !doomed.contains(id),
        LayoutItem::Layout(_) => true,
    });
    for item in layout.items.iter_mut() {
        if let LayoutItem::Layout(nested) = item {
            strip_from_layout(nested, doomed);
        }
    }
}
