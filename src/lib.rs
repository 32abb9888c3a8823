//! Client-side window decorations retrofitted onto existing top-level windows.
//!
//! Attach a [`DecorationEngine`] to an [`Application`] and every eligible
//! window gets a custom [`TitleBar`] the first time it is shown, while the
//! frame filter keeps native behaviour (snapping, resizing, maximizing onto
//! the work area) working for the now frameless window.

pub mod accent;
pub mod app_filter;
pub mod caption_button;
pub mod frame;
pub mod frame_filter;
pub mod geometry;
pub mod host;
pub mod logging;
pub mod settings;
pub mod title_bar;
pub mod winit_bridge;

pub use app_filter::DecorationEngine;
pub use host::Application;
pub use settings::DecorationSettings;
pub use title_bar::TitleBar;
