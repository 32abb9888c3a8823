//! Minimal box layout: fixed extents first, the rest shared by stretch items.

use super::tree::{BoxLayout, Direction, LayoutItem, WidgetId, WidgetRole, WidgetTree};
use crate::geometry::Rect;

const DEFAULT_MENU_BAR_HEIGHT: i32 = 22;

/// Lay out a whole window starting from its own geometry.
pub fn layout_window(tree: &mut WidgetTree, window: WidgetId) {
    let Some(rect) = tree.get(window).map(|widget| widget.geometry) else {
        return;
    };
    let local = Rect::from_origin_size(Default::default(), rect.size());
    layout_widget(tree, window, local);
}

fn layout_widget(tree: &mut WidgetTree, id: WidgetId, rect: Rect) {
    let Some(widget) = tree.get_mut(id) else {
        return;
    };
    widget.geometry = rect;
    let role = widget.role.clone();
    let layout = widget.layout.clone();

    match role {
        WidgetRole::TitleBar(title_bar) => {
            let menu = {
                let mut title_bar = title_bar.borrow_mut();
                title_bar.set_geometry(rect);
                title_bar
                    .menu_bar()
                    .map(|menu_bar| (menu_bar, title_bar.menu_bar_rect()))
            };
            if let Some((menu_bar, menu_rect)) = menu {
                if let Some(menu_widget) = tree.get_mut(menu_bar) {
                    menu_widget.geometry = menu_rect;
                }
            }
        }
        WidgetRole::Container { central, menu_bar } => {
            let mut items = Vec::new();
            if let Some(menu_bar) = menu_bar {
                items.push(LayoutItem::Widget(menu_bar));
            }
            if let Some(central) = central {
                items.push(LayoutItem::Widget(central));
            }
            let implicit = BoxLayout {
                items,
                ..BoxLayout::tight_vertical()
            };
            layout_box(tree, &implicit, rect);
        }
        WidgetRole::Plain | WidgetRole::MenuBar { .. } => {
            if let Some(layout) = layout {
                layout_box(tree, &layout, rect);
            }
        }
    }
}

/// Fixed main-axis extent of an item, or `None` when it stretches.
fn fixed_extent(tree: &WidgetTree, item: &LayoutItem, direction: Direction) -> Option<i32> {
    let LayoutItem::Widget(id) = item else {
        return None;
    };
    let widget = tree.get(*id)?;
    if let WidgetRole::MenuBar { .. } = widget.role {
        if direction == Direction::Vertical && widget.constraints.max.height == i32::MAX {
            return Some(DEFAULT_MENU_BAR_HEIGHT);
        }
    }
    let (min, max) = match direction {
        Direction::Vertical => (widget.constraints.min.height, widget.constraints.max.height),
        Direction::Horizontal => (widget.constraints.min.width, widget.constraints.max.width),
    };
    (min == max).then_some(min)
}

fn is_shown(tree: &WidgetTree, item: &LayoutItem) -> bool {
    match item {
        LayoutItem::Widget(id) => tree.get(*id).map(|widget| widget.visible).unwrap_or(false),
        LayoutItem::Layout(_) => true,
    }
}

fn layout_box(tree: &mut WidgetTree, layout: &BoxLayout, rect: Rect) {
    let inner = Rect::new(
        rect.left + layout.margins.left,
        rect.top + layout.margins.top,
        rect.right - layout.margins.right,
        rect.bottom - layout.margins.bottom,
    );
    let items: Vec<&LayoutItem> = layout.items.iter().filter(|i| is_shown(tree, i)).collect();
    if items.is_empty() {
        return;
    }

    let total = match layout.direction {
        Direction::Vertical => inner.height(),
        Direction::Horizontal => inner.width(),
    };
    let spacing = layout.spacing * (items.len() as i32 - 1);
    let extents: Vec<Option<i32>> = items
        .iter()
        .map(|item| fixed_extent(tree, item, layout.direction))
        .collect();
    let fixed: i32 = extents.iter().flatten().sum();
    let stretch_count = extents.iter().filter(|e| e.is_none()).count() as i32;
    let remaining = (total - fixed - spacing).max(0);
    let share = if stretch_count > 0 {
        remaining / stretch_count
    } else {
        0
    };
    let mut leftover = if stretch_count > 0 {
        remaining - share * stretch_count
    } else {
        0
    };

    let mut cursor = match layout.direction {
        Direction::Vertical => inner.top,
        Direction::Horizontal => inner.left,
    };
    for (item, extent) in items.into_iter().zip(extents) {
        let size = match extent {
            Some(size) => size,
            None => {
                let extra = if leftover > 0 { 1 } else { 0 };
                leftover -= extra;
                share + extra
            }
        };
        let item_rect = match layout.direction {
            Direction::Vertical => Rect::new(inner.left, cursor, inner.right, cursor + size),
            Direction::Horizontal => Rect::new(cursor, inner.top, cursor + size, inner.bottom),
        };
        match item {
            LayoutItem::Widget(id) => layout_widget(tree, *id, item_rect),
            LayoutItem::Layout(nested) => layout_box(tree, nested, item_rect),
        }
        cursor += size + layout.spacing;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Size;
    use crate::host::tree::{Widget, WindowKind};

    #[test]
    fn fixed_items_keep_their_height() {
        let mut tree = WidgetTree::new();
        let window = tree.insert(
            Widget::window("w", WindowKind::Window, WidgetRole::Plain, Size::new(200, 300)),
            None,
        );
        let header = tree.insert(
            Widget::new("header", WidgetRole::Plain).with_fixed_height(30),
            Some(window),
        );
        let body = tree.insert(Widget::new("body", WidgetRole::Plain), Some(window));
        tree.get_mut(window).unwrap().layout = Some(
            BoxLayout::tight_vertical()
                .with_widget(header)
                .with_layout(BoxLayout::tight_vertical().with_widget(body)),
        );

        layout_window(&mut tree, window);
        assert_eq!(tree.get(header).unwrap().geometry, Rect::new(0, 0, 200, 30));
        assert_eq!(tree.get(body).unwrap().geometry, Rect::new(0, 30, 200, 300));
    }

    #[test]
    fn hidden_items_are_skipped() {
        let mut tree = WidgetTree::new();
        let window = tree.insert(
            Widget::window("w", WindowKind::Window, WidgetRole::Plain, Size::new(100, 100)),
            None,
        );
        let a = tree.insert(Widget::new("a", WidgetRole::Plain), Some(window));
        let b = tree.insert(Widget::new("b", WidgetRole::Plain), Some(window));
        tree.get_mut(a).unwrap().visible = false;
        tree.get_mut(window).unwrap().layout =
            Some(BoxLayout::tight_vertical().with_widget(a).with_widget(b));
        layout_window(&mut tree, window);
        assert_eq!(tree.get(b).unwrap().geometry, Rect::new(0, 0, 100, 100));
    }
}
