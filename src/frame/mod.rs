//! Native frame emulation for frameless windows.
//!
//! [`FrameEmulator`] answers the non-client messages a platform sends a
//! window so that a window without native chrome still resizes, drags,
//! maximizes onto the work area and keeps its compositor shadow. Platform
//! access goes through [`NativeFrame`]; every query returns `None` on
//! failure, which makes the emulator fall back to default processing.

#[cfg(windows)]
pub mod win32;

use crate::geometry::{Margins, Point, Rect, Size};
use crate::hit_test::{classify, HitTestResult, SizeConstraints, DEFAULT_RESIZE_BORDER};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MonitorInfo {
    pub monitor: Rect,
    pub work: Rect,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShowState {
    Normal,
    Minimized,
    Maximized,
}

/// Metrics of the frame the platform would draw for a resizable popup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameMetrics {
    pub caption_height: i32,
    /// Bottom edge of the frame rectangle adjusted around an empty client.
    pub adjusted_bottom: i32,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MinMaxInfo {
    pub max_position: Point,
    pub max_size: Size,
    pub max_track_size: Size,
}

pub trait NativeFrame {
    /// Outer window rectangle in screen coordinates.
    fn window_rect(&self) -> Option<Rect>;
    fn show_state(&self) -> Option<ShowState>;
    fn monitor_from_window(&self) -> Option<MonitorInfo>;
    fn monitor_from_rect(&self, rect: Rect) -> Option<MonitorInfo>;
    fn composition_enabled(&self) -> Option<bool>;
    /// Make the platform recompute the frame. With `Some(bounds)` the window
    /// is re-placed at `bounds`, otherwise position and size are kept.
    fn reapply_frame(&self, bounds: Option<Rect>);
    fn extend_frame_into_client(&self, margins: Margins);
    fn frame_metrics(&self) -> Option<FrameMetrics>;
    fn publish_custom_margins(&self, margins: Margins);
}

/// Per-window knowledge the emulator cannot get from the platform.
pub trait WindowHooks {
    /// Whether the title bar's draggable area is under `cursor` (screen).
    fn caption_hovered(&self, cursor: Point) -> bool;
    fn size_constraints(&self) -> SizeConstraints;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameMessage {
    Create,
    Activate,
    CalcSize { proposed: Rect },
    HitTest { cursor: Point },
    NcActivate,
    GetMinMaxInfo(MinMaxInfo),
    Size,
    FirstShow,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameReply {
    /// Let the platform's default processing handle the message.
    Default,
    /// New client rectangle for a frame size calculation.
    ClientRect(Rect),
    HitTest(HitTestResult),
    /// Handled; return this value without default processing.
    Consumed(isize),
    MinMax(MinMaxInfo),
}

/// Where a maximized window goes on `monitor`: offset from the monitor
/// origin to the work area, and the work area's size.
pub fn maximized_bounds(monitor: &MonitorInfo) -> (Point, Size) {
    let position = Point::new(
        (monitor.work.left - monitor.monitor.left).abs(),
        (monitor.work.top - monitor.monitor.top).abs(),
    );
    let size = Size::new(monitor.work.width().abs(), monitor.work.height().abs());
    (position, size)
}

/// Negative margins describing the frame the platform would have drawn, so
/// shadows and snap previews still line up with the frameless window.
pub fn custom_margins(metrics: &FrameMetrics, border: i32) -> Margins {
    let top = metrics.adjusted_bottom.abs() + metrics.caption_height;
    Margins::new(-border, -top, -border, -border)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameEmulator {
    resize_border: i32,
}

impl Default for FrameEmulator {
    fn default() -> Self {
        Self::new(DEFAULT_RESIZE_BORDER)
    }
}

impl FrameEmulator {
    pub fn new(resize_border: i32) -> Self {
        Self {
            resize_border: resize_border.max(0),
        }
    }

    pub fn resize_border(&self) -> i32 {
        self.resize_border
    }

    pub fn handle(
        &self,
        frame: &dyn NativeFrame,
        hooks: &dyn WindowHooks,
        message: FrameMessage,
    ) -> FrameReply {
        match message {
            FrameMessage::Create => {
                if let Some(bounds) = frame.window_rect() {
                    frame.reapply_frame(Some(bounds));
                }
                FrameReply::Default
            }
            FrameMessage::Activate => {
                frame.extend_frame_into_client(Margins::uniform(1));
                FrameReply::Default
            }
            FrameMessage::CalcSize { proposed } => {
                if frame.show_state() == Some(ShowState::Maximized) {
                    if let Some(monitor) = frame.monitor_from_window() {
                        return FrameReply::ClientRect(monitor.work);
                    }
                }
                FrameReply::ClientRect(proposed)
            }
            FrameMessage::HitTest { cursor } => self.hit_test(frame, hooks, cursor),
            FrameMessage::NcActivate => match frame.composition_enabled() {
                Some(true) => FrameReply::Default,
                _ => FrameReply::Consumed(1),
            },
            FrameMessage::GetMinMaxInfo(_) => {
                if frame.show_state() != Some(ShowState::Maximized) {
                    return FrameReply::Default;
                }
                let Some(monitor) = frame
                    .window_rect()
                    .and_then(|rect| frame.monitor_from_rect(rect))
                else {
                    tracing::trace!("no monitor for maximized window; default min/max");
                    return FrameReply::Default;
                };
                let (max_position, max_size) = maximized_bounds(&monitor);
                FrameReply::MinMax(MinMaxInfo {
                    max_position,
                    max_size,
                    max_track_size: max_size,
                })
            }
            FrameMessage::Size => {
                if frame.show_state() == Some(ShowState::Maximized) {
                    frame.reapply_frame(None);
                }
                FrameReply::Default
            }
            FrameMessage::FirstShow => {
                if let Some(metrics) = frame.frame_metrics() {
                    frame.publish_custom_margins(custom_margins(&metrics, self.resize_border));
                }
                FrameReply::Default
            }
        }
    }

    fn hit_test(
        &self,
        frame: &dyn NativeFrame,
        hooks: &dyn WindowHooks,
        cursor: Point,
    ) -> FrameReply {
        let Some(window) = frame.window_rect() else {
            return FrameReply::Default;
        };
        let resizability = hooks.size_constraints().resizability();
        let caption_hovered = hooks.caption_hovered(cursor);
        match classify(
            window,
            cursor,
            resizability,
            self.resize_border,
            caption_hovered,
        ) {
            HitTestResult::None => FrameReply::Default,
            result => FrameReply::HitTest(result),
        }
    }
}
