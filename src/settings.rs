use crate::accent::Color;
use crate::caption_button::CaptionButtonStyle;
use crate::hit_test::DEFAULT_RESIZE_BORDER;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

pub const DEFAULT_TITLE_BAR_HEIGHT: i32 = 30;

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct DecorationSettings {
    /// Which caption button asset family the title bars use.
    #[serde(default)]
    pub caption_button_style: CaptionButtonStyle,
    /// Title bar background while the window is active, as `#rrggbb`.
    /// When `None` the system accent (or black) is used.
    #[serde(default)]
    pub active_color: Option<String>,
    #[serde(default)]
    pub inactive_color: Option<String>,
    #[serde(default)]
    pub hover_color: Option<String>,
    #[serde(default = "default_title_bar_height")]
    pub title_bar_height: i32,
    /// Width of the invisible resize band around decorated windows.
    #[serde(default = "default_resize_border")]
    pub resize_border: i32,
    /// Track the system accent color for active title bars.
    #[serde(default = "default_follow_system_accent")]
    pub follow_system_accent: bool,
    #[serde(default)]
    pub debug_logging: bool,
    #[serde(default)]
    pub log_file: Option<PathBuf>,
}

fn default_title_bar_height() -> i32 {
    DEFAULT_TITLE_BAR_HEIGHT
}

fn default_resize_border() -> i32 {
    DEFAULT_RESIZE_BORDER
}

fn default_follow_system_accent() -> bool {
    true
}

impl Default for DecorationSettings {
    fn default() -> Self {
        Self {
            caption_button_style: CaptionButtonStyle::default(),
            active_color: None,
            inactive_color: None,
            hover_color: None,
            title_bar_height: default_title_bar_height(),
            resize_border: default_resize_border(),
            follow_system_accent: default_follow_system_accent(),
            debug_logging: false,
            log_file: None,
        }
    }
}

impl DecorationSettings {
    pub fn load(path: &str) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path).unwrap_or_default();
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_json::from_str(&content)?)
    }

    pub fn save(&self, path: &str) -> anyhow::Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }

    /// `<config dir>/csd_retrofit/settings.json`, if the platform has a config dir.
    pub fn default_path() -> Option<PathBuf> {
        dirs_next::config_dir().map(|dir| dir.join("csd_retrofit").join("settings.json"))
    }

    pub fn active_color(&self) -> Option<Color> {
        parse_setting("active_color", self.active_color.as_deref())
    }

    pub fn inactive_color(&self) -> Color {
        parse_setting("inactive_color", self.inactive_color.as_deref()).unwrap_or(Color::WHITE)
    }

    pub fn hover_color(&self) -> Color {
        parse_setting("hover_color", self.hover_color.as_deref()).unwrap_or(Color::GRAY)
    }

    pub fn title_bar_height(&self) -> i32 {
        if self.title_bar_height > 0 {
            self.title_bar_height
        } else {
            tracing::warn!(
                "title_bar_height {} is not positive; using {}",
                self.title_bar_height,
                DEFAULT_TITLE_BAR_HEIGHT
            );
            DEFAULT_TITLE_BAR_HEIGHT
        }
    }

    pub fn resize_border(&self) -> i32 {
        self.resize_border.max(0)
    }
}

fn parse_setting(field: &str, value: Option<&str>) -> Option<Color> {
    let value = value?;
    match Color::parse(value) {
        Some(color) => Some(color),
        None => {
            tracing::warn!("{field} '{value}' is not a valid color; using default");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_fields_use_defaults() {
        let settings: DecorationSettings = serde_json::from_str("{}").unwrap();
        assert_eq!(settings, DecorationSettings::default());
        assert_eq!(settings.title_bar_height(), 30);
        assert_eq!(settings.resize_border(), 8);
        assert!(settings.follow_system_accent);
    }

    #[test]
    fn invalid_colors_fall_back() {
        let settings = DecorationSettings {
            active_color: Some("nope".into()),
            inactive_color: Some("#zzzzzz".into()),
            hover_color: Some("#101010".into()),
            ..Default::default()
        };
        assert_eq!(settings.active_color(), None);
        assert_eq!(settings.inactive_color(), Color::WHITE);
        assert_eq!(settings.hover_color(), Color::rgb(0x10, 0x10, 0x10));
    }

    #[test]
    fn style_is_serialized_in_kebab_case() {
        let settings = DecorationSettings {
            caption_button_style: CaptionButtonStyle::Mac,
            ..Default::default()
        };
        let json = serde_json::to_string(&settings).unwrap();
        assert!(json.contains("\"caption_button_style\":\"mac\""));
    }

    #[test]
    fn non_positive_height_is_rejected() {
        let settings = DecorationSettings {
            title_bar_height: 0,
            resize_border: -3,
            ..Default::default()
        };
        assert_eq!(settings.title_bar_height(), DEFAULT_TITLE_BAR_HEIGHT);
        assert_eq!(settings.resize_border(), 0);
    }
}
