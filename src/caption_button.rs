//! Caption buttons and the icon selection table for their visual states.

use crate::geometry::{Rect, Size};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CaptionButtonStyle {
    #[default]
    Custom,
    Windows,
    Mac,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ButtonRole {
    CaptionIcon,
    Minimize,
    MaximizeRestore,
    Close,
}

impl ButtonRole {
    pub fn fixed_size(self, height: i32) -> Size {
        match self {
            ButtonRole::CaptionIcon => Size::new(height, height),
            _ => Size::new(46, height),
        }
    }

    fn glyph(self) -> &'static str {
        match self {
            ButtonRole::CaptionIcon => "",
            ButtonRole::Minimize => "―",
            ButtonRole::MaximizeRestore => "☐",
            ButtonRole::Close => "✕",
        }
    }
}

/// One title bar button. Holds presentation state only; clicks are turned
/// into intents by the owning title bar.
#[derive(Debug, Clone)]
pub struct CaptionButton {
    role: ButtonRole,
    rect: Rect,
    size: Size,
    visible: bool,
    active: bool,
    hovered: bool,
    pressed: bool,
    text: &'static str,
    icon: Option<String>,
}

impl CaptionButton {
    pub fn new(role: ButtonRole, height: i32) -> Self {
        Self {
            role,
            rect: Rect::default(),
            size: role.fixed_size(height),
            visible: true,
            active: false,
            hovered: false,
            pressed: false,
            text: role.glyph(),
            icon: None,
        }
    }

    pub fn role(&self) -> ButtonRole {
        self.role
    }

    pub fn text(&self) -> &'static str {
        self.text
    }

    pub fn icon(&self) -> Option<&str> {
        self.icon.as_deref()
    }

    pub fn set_icon(&mut self, icon: Option<String>) {
        self.icon = icon;
    }

    pub fn rect(&self) -> Rect {
        self.rect
    }

    pub(crate) fn set_rect(&mut self, rect: Rect) {
        self.rect = rect;
    }

    pub fn size(&self) -> Size {
        self.size
    }

    pub fn width(&self) -> i32 {
        self.size.width
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub fn set_visible(&mut self, visible: bool) {
        self.visible = visible;
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn set_active(&mut self, active: bool) {
        self.active = active;
    }

    pub fn is_hovered(&self) -> bool {
        self.hovered
    }

    pub fn is_pressed(&self) -> bool {
        self.pressed
    }

    pub(crate) fn set_pointer(&mut self, hovered: bool, pressed: bool) {
        self.hovered = hovered;
        self.pressed = hovered && pressed;
    }

    /// Only visible buttons with a laid-out area take part in hover tests.
    pub fn contains(&self, point: crate::geometry::Point) -> bool {
        self.visible && self.rect.contains(point)
    }
}

mod icons {
    pub const MAC_CLOSE_PRESSED: &str = ":/caption/mac/close-pressed.svg";
    pub const MAC_MINIMIZE_PRESSED: &str = ":/caption/mac/minimize-pressed.svg";
    pub const MAC_ZOOM_PRESSED: &str = ":/caption/mac/zoom-pressed.svg";
    pub const MAC_UNZOOM_PRESSED: &str = ":/caption/mac/unzoom-pressed.svg";
    pub const MAC_CLOSE_HOVER: &str = ":/caption/mac/close-hover.svg";
    pub const MAC_MINIMIZE_HOVER: &str = ":/caption/mac/minimize-hover.svg";
    pub const MAC_ZOOM_HOVER: &str = ":/caption/mac/zoom-hover.svg";
    pub const MAC_UNZOOM_HOVER: &str = ":/caption/mac/unzoom-hover.svg";
    pub const MAC_CLOSE_ACTIVE: &str = ":/caption/mac/close-active.svg";
    pub const MAC_MINIMIZE_ACTIVE: &str = ":/caption/mac/minimize-active.svg";
    pub const MAC_ZOOM_ACTIVE: &str = ":/caption/mac/zoom-active.svg";
    pub const MAC_INACTIVE: &str = ":/caption/mac/inactive.svg";

    pub struct GlyphFamily {
        pub minimize_dark: &'static str,
        pub maximize_dark: &'static str,
        pub restore_dark: &'static str,
        pub close_dark: &'static str,
        pub close_light: &'static str,
        pub minimize_disabled: &'static str,
        pub maximize_disabled: &'static str,
        pub restore_disabled: &'static str,
        pub close_disabled: &'static str,
    }

    pub const WINDOWS: GlyphFamily = GlyphFamily {
        minimize_dark: ":/caption/windows/minimize-dark.svg",
        maximize_dark: ":/caption/windows/maximize-dark.svg",
        restore_dark: ":/caption/windows/restore-dark.svg",
        close_dark: ":/caption/windows/close-dark.svg",
        close_light: ":/caption/windows/close-light.svg",
        minimize_disabled: ":/caption/windows/minimize-disabled.svg",
        maximize_disabled: ":/caption/windows/maximize-disabled.svg",
        restore_disabled: ":/caption/windows/restore-disabled.svg",
        close_disabled: ":/caption/windows/close-disabled.svg",
    };

    pub const CUSTOM: GlyphFamily = GlyphFamily {
        minimize_dark: ":/caption/custom/minimize-dark.svg",
        maximize_dark: ":/caption/custom/maximize-dark.svg",
        restore_dark: ":/caption/custom/restore-dark.svg",
        close_dark: ":/caption/custom/close-dark.svg",
        close_light: ":/caption/custom/close-light.svg",
        minimize_disabled: ":/caption/custom/minimize-disabled.svg",
        maximize_disabled: ":/caption/custom/maximize-disabled.svg",
        restore_disabled: ":/caption/custom/restore-disabled.svg",
        close_disabled: ":/caption/custom/close-disabled.svg",
    };
}

/// Icon resources for `[minimize, maximize/restore, close]` in the given state.
pub fn caption_icon_paths_for_state(
    active: bool,
    maximized: bool,
    hovered: bool,
    pressed: bool,
    style: CaptionButtonStyle,
) -> [&'static str; 3] {
    use icons::*;

    match style {
        CaptionButtonStyle::Mac => {
            if pressed {
                let zoom = if maximized {
                    MAC_UNZOOM_PRESSED
                } else {
                    MAC_ZOOM_PRESSED
                };
                [MAC_MINIMIZE_PRESSED, zoom, MAC_CLOSE_PRESSED]
            } else if hovered {
                let zoom = if maximized {
                    MAC_UNZOOM_HOVER
                } else {
                    MAC_ZOOM_HOVER
                };
                [MAC_MINIMIZE_HOVER, zoom, MAC_CLOSE_HOVER]
            } else if active {
                [MAC_MINIMIZE_ACTIVE, MAC_ZOOM_ACTIVE, MAC_CLOSE_ACTIVE]
            } else {
                [MAC_INACTIVE, MAC_INACTIVE, MAC_INACTIVE]
            }
        }
        CaptionButtonStyle::Windows | CaptionButtonStyle::Custom => {
            let family = if style == CaptionButtonStyle::Windows {
                &WINDOWS
            } else {
                &CUSTOM
            };
            if active || hovered {
                let maximize = if maximized {
                    family.restore_dark
                } else {
                    family.maximize_dark
                };
                let close = if hovered {
                    family.close_light
                } else {
                    family.close_dark
                };
                [family.minimize_dark, maximize, close]
            } else {
                let maximize = if maximized {
                    family.restore_disabled
                } else {
                    family.maximize_disabled
                };
                [family.minimize_disabled, maximize, family.close_disabled]
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const STYLES: [CaptionButtonStyle; 3] = [
        CaptionButtonStyle::Custom,
        CaptionButtonStyle::Windows,
        CaptionButtonStyle::Mac,
    ];

    fn all_states() -> impl Iterator<Item = (bool, bool, bool, bool, CaptionButtonStyle)> {
        (0..16u8).flat_map(|bits| {
            STYLES.into_iter().map(move |style| {
                (
                    bits & 1 != 0,
                    bits & 2 != 0,
                    bits & 4 != 0,
                    bits & 8 != 0,
                    style,
                )
            })
        })
    }

    #[test]
    fn selection_is_pure() {
        for (active, maximized, hovered, pressed, style) in all_states() {
            let first = caption_icon_paths_for_state(active, maximized, hovered, pressed, style);
            let second = caption_icon_paths_for_state(active, maximized, hovered, pressed, style);
            assert_eq!(first, second);
            assert!(first.iter().all(|path| !path.is_empty()));
        }
    }

    #[test]
    fn windows_family_states() {
        let style = CaptionButtonStyle::Windows;
        let [min, max, close] = caption_icon_paths_for_state(true, false, false, false, style);
        assert!(min.ends_with("minimize-dark.svg"));
        assert!(max.ends_with("maximize-dark.svg"));
        assert!(close.ends_with("close-dark.svg"));

        let [_, max, close] = caption_icon_paths_for_state(false, true, true, false, style);
        assert!(max.ends_with("restore-dark.svg"));
        assert!(close.ends_with("close-light.svg"));

        let icons = caption_icon_paths_for_state(false, false, false, true, style);
        assert!(icons.iter().all(|path| path.contains("disabled")));
    }

    #[test]
    fn custom_and_windows_are_separate_families() {
        let custom = caption_icon_paths_for_state(true, false, false, false, CaptionButtonStyle::Custom);
        let windows =
            caption_icon_paths_for_state(true, false, false, false, CaptionButtonStyle::Windows);
        assert!(custom.iter().all(|path| path.contains("/custom/")));
        assert!(windows.iter().all(|path| path.contains("/windows/")));
    }

    #[test]
    fn mac_precedence() {
        let style = CaptionButtonStyle::Mac;
        let pressed = caption_icon_paths_for_state(false, false, true, true, style);
        assert!(pressed.iter().all(|path| path.contains("pressed")));
        let hovered = caption_icon_paths_for_state(false, true, true, false, style);
        assert!(hovered[1].ends_with("unzoom-hover.svg"));
        let inactive = caption_icon_paths_for_state(false, false, false, false, style);
        assert_eq!(inactive, [icons::MAC_INACTIVE; 3]);
        let active = caption_icon_paths_for_state(true, true, false, false, style);
        assert!(active.iter().all(|path| path.ends_with("-active.svg")));
    }

    #[test]
    fn pointer_press_requires_hover() {
        let mut button = CaptionButton::new(ButtonRole::Close, 30);
        button.set_pointer(false, true);
        assert!(!button.is_pressed());
        button.set_pointer(true, true);
        assert!(button.is_pressed());
        assert_eq!(button.width(), 46);
        assert_eq!(button.text(), "✕");
    }
}
