use super::{
    FrameEmulator, FrameMessage, FrameMetrics, FrameReply, MinMaxInfo, MonitorInfo, NativeFrame,
    ShowState, WindowHooks,
};
use crate::geometry::{Margins, Point, Rect, Size};
use anyhow::{bail, Result};
use raw_window_handle::RawWindowHandle;
use std::cell::Cell;
use windows::core::{w, PCWSTR};
use windows::Win32::Foundation::{HANDLE, HWND, LPARAM, LRESULT, POINT, RECT, WPARAM};
use windows::Win32::Graphics::Dwm::{DwmExtendFrameIntoClientArea, DwmIsCompositionEnabled};
use windows::Win32::Graphics::Gdi::{
    GetMonitorInfoW, MonitorFromRect, MonitorFromWindow, HMONITOR, MONITORINFO,
    MONITOR_DEFAULTTONULL,
};
use windows::Win32::UI::Controls::MARGINS;
use windows::Win32::UI::Shell::{
    DefSubclassProc, GetWindowSubclass, RemoveWindowSubclass, SetWindowSubclass,
};
use windows::Win32::UI::WindowsAndMessaging::{
    AdjustWindowRectEx, GetSystemMetrics, GetWindowPlacement, GetWindowRect,
    RemovePropW, SetPropW, SetWindowPos, MINMAXINFO, NCCALCSIZE_PARAMS, SM_CYCAPTION,
    SWP_FRAMECHANGED, SWP_NOMOVE, SWP_NOSIZE, SW_MAXIMIZE, SW_MINIMIZE, SW_SHOWMINIMIZED,
    WINDOWPLACEMENT, WINDOW_EX_STYLE, WM_ACTIVATE, WM_GETMINMAXINFO, WM_NCACTIVATE,
    WM_NCCALCSIZE, WM_NCDESTROY, WM_NCHITTEST, WM_SHOWWINDOW, WM_SIZE, WS_CLIPCHILDREN,
    WS_CLIPSIBLINGS, WS_DLGFRAME, WS_POPUP, WS_THICKFRAME,
};

pub const SUBCLASS_ID: usize = 0x4353_4446;

const MARGIN_PROPS: [PCWSTR; 4] = [
    w!("CsdCustomMarginLeft"),
    w!("CsdCustomMarginTop"),
    w!("CsdCustomMarginRight"),
    w!("CsdCustomMarginBottom"),
];

pub fn hwnd_from_raw(handle: &RawWindowHandle) -> Option<HWND> {
    match handle {
        RawWindowHandle::Win32(handle) => Some(HWND(handle.hwnd.get() as *mut core::ffi::c_void)),
        _ => None,
    }
}

fn to_rect(rect: RECT) -> Rect {
    Rect::new(rect.left, rect.top, rect.right, rect.bottom)
}

fn to_win_rect(rect: Rect) -> RECT {
    RECT {
        left: rect.left,
        top: rect.top,
        right: rect.right,
        bottom: rect.bottom,
    }
}

fn monitor_info(monitor: HMONITOR) -> Option<MonitorInfo> {
    if monitor.0.is_null() {
        return None;
    }
    let mut info = MONITORINFO {
        cbSize: std::mem::size_of::<MONITORINFO>() as u32,
        ..Default::default()
    };
    unsafe {
        if !GetMonitorInfoW(monitor, &mut info).as_bool() {
            return None;
        }
    }
    Some(MonitorInfo {
        monitor: to_rect(info.rcMonitor),
        work: to_rect(info.rcWork),
    })
}

/// [`NativeFrame`] over a Win32 window handle.
#[derive(Debug, Clone, Copy)]
pub struct Win32Frame {
    hwnd: HWND,
}

impl Win32Frame {
    pub fn new(hwnd: HWND) -> Self {
        Self { hwnd }
    }

    pub fn hwnd(&self) -> HWND {
        self.hwnd
    }

    fn clear_published_margins(&self) {
        for prop in MARGIN_PROPS {
            let _ = unsafe { RemovePropW(self.hwnd, prop) };
        }
    }
}

impl NativeFrame for Win32Frame {
    fn window_rect(&self) -> Option<Rect> {
        let mut rect = RECT::default();
        unsafe { GetWindowRect(self.hwnd, &mut rect).ok()? };
        Some(to_rect(rect))
    }

    fn show_state(&self) -> Option<ShowState> {
        let mut placement = WINDOWPLACEMENT {
            length: std::mem::size_of::<WINDOWPLACEMENT>() as u32,
            ..Default::default()
        };
        unsafe { GetWindowPlacement(self.hwnd, &mut placement).ok()? };
        let state = if placement.showCmd == SW_MAXIMIZE.0 as u32 {
            ShowState::Maximized
        } else if placement.showCmd == SW_SHOWMINIMIZED.0 as u32
            || placement.showCmd == SW_MINIMIZE.0 as u32
        {
            ShowState::Minimized
        } else {
            ShowState::Normal
        };
        Some(state)
    }

    fn monitor_from_window(&self) -> Option<MonitorInfo> {
        monitor_info(unsafe { MonitorFromWindow(self.hwnd, MONITOR_DEFAULTTONULL) })
    }

    fn monitor_from_rect(&self, rect: Rect) -> Option<MonitorInfo> {
        let rect = to_win_rect(rect);
        monitor_info(unsafe { MonitorFromRect(&rect, MONITOR_DEFAULTTONULL) })
    }

    fn composition_enabled(&self) -> Option<bool> {
        unsafe { DwmIsCompositionEnabled() }
            .ok()
            .map(|enabled| enabled.as_bool())
    }

    fn reapply_frame(&self, bounds: Option<Rect>) {
        let result = unsafe {
            match bounds {
                Some(bounds) => SetWindowPos(
                    self.hwnd,
                    HWND::default(),
                    bounds.left,
                    bounds.top,
                    bounds.width(),
                    bounds.height(),
                    SWP_FRAMECHANGED,
                ),
                None => SetWindowPos(
                    self.hwnd,
                    HWND::default(),
                    0,
                    0,
                    0,
                    0,
                    SWP_FRAMECHANGED | SWP_NOMOVE | SWP_NOSIZE,
                ),
            }
        };
        if let Err(err) = result {
            tracing::warn!(?err, "frame re-apply failed");
        }
    }

    fn extend_frame_into_client(&self, margins: Margins) {
        let margins = MARGINS {
            cxLeftWidth: margins.left,
            cxRightWidth: margins.right,
            cyTopHeight: margins.top,
            cyBottomHeight: margins.bottom,
        };
        let _ = unsafe { DwmExtendFrameIntoClientArea(self.hwnd, &margins) };
    }

    fn frame_metrics(&self) -> Option<FrameMetrics> {
        let mut rect = RECT::default();
        let style = WS_POPUP | WS_CLIPSIBLINGS | WS_CLIPCHILDREN | WS_THICKFRAME | WS_DLGFRAME;
        unsafe { AdjustWindowRectEx(&mut rect, style, false, WINDOW_EX_STYLE(0)).ok()? };
        let caption_height = unsafe { GetSystemMetrics(SM_CYCAPTION) };
        Some(FrameMetrics {
            caption_height,
            adjusted_bottom: rect.bottom,
        })
    }

    fn publish_custom_margins(&self, margins: Margins) {
        let values = [margins.left, margins.top, margins.right, margins.bottom];
        for (value, prop) in values.into_iter().zip(MARGIN_PROPS) {
            let handle = HANDLE(value as isize as *mut core::ffi::c_void);
            if let Err(err) = unsafe { SetPropW(self.hwnd, prop, handle) } {
                tracing::warn!(?err, "unable to publish custom margins");
                return;
            }
        }
        tracing::debug!(?margins, "custom margins published");
    }
}

/// What the subclass procedure needs besides the window itself.
pub struct SubclassHooks {
    pub hooks: Box<dyn WindowHooks>,
    pub active_changed: Box<dyn Fn()>,
    pub state_changed: Box<dyn Fn()>,
}

struct SubclassState {
    frame: Win32Frame,
    emulator: FrameEmulator,
    hooks: SubclassHooks,
    shown: Cell<bool>,
}

impl SubclassState {
    fn handle(&self, message: FrameMessage) -> FrameReply {
        tracing::trace!(?message, "frame message");
        self.emulator
            .handle(&self.frame, self.hooks.hooks.as_ref(), message)
    }
}

fn cursor_from_lparam(lparam: LPARAM) -> Point {
    let x = (lparam.0 & 0xFFFF) as i16 as i32;
    let y = ((lparam.0 >> 16) & 0xFFFF) as i16 as i32;
    Point::new(x, y)
}

fn to_minmax(info: &MINMAXINFO) -> MinMaxInfo {
    MinMaxInfo {
        max_position: Point::new(info.ptMaxPosition.x, info.ptMaxPosition.y),
        max_size: Size::new(info.ptMaxSize.x, info.ptMaxSize.y),
        max_track_size: Size::new(info.ptMaxTrackSize.x, info.ptMaxTrackSize.y),
    }
}

unsafe extern "system" fn frame_subclass_proc(
    hwnd: HWND,
    msg: u32,
    wparam: WPARAM,
    lparam: LPARAM,
    _uid_subclass: usize,
    ref_data: usize,
) -> LRESULT {
    if ref_data == 0 {
        return DefSubclassProc(hwnd, msg, wparam, lparam);
    }
    if msg == WM_NCDESTROY {
        let _ = RemoveWindowSubclass(hwnd, Some(frame_subclass_proc), SUBCLASS_ID);
        let state = Box::from_raw(ref_data as *mut SubclassState);
        state.frame.clear_published_margins();
        drop(state);
        return DefSubclassProc(hwnd, msg, wparam, lparam);
    }
    let state = &*(ref_data as *const SubclassState);

    match msg {
        WM_ACTIVATE => {
            state.handle(FrameMessage::Activate);
            let result = DefSubclassProc(hwnd, msg, wparam, lparam);
            (state.hooks.active_changed)();
            result
        }
        WM_NCCALCSIZE if wparam.0 != 0 => {
            let params = lparam.0 as *mut NCCALCSIZE_PARAMS;
            if params.is_null() {
                return DefSubclassProc(hwnd, msg, wparam, lparam);
            }
            let proposed = to_rect((*params).rgrc[0]);
            if let FrameReply::ClientRect(rect) = state.handle(FrameMessage::CalcSize { proposed }) {
                (*params).rgrc[0] = to_win_rect(rect);
            }
            LRESULT(0)
        }
        WM_NCHITTEST => {
            let cursor = cursor_from_lparam(lparam);
            match state.handle(FrameMessage::HitTest { cursor }) {
                FrameReply::HitTest(result) => LRESULT(result.to_win32() as isize),
                _ => DefSubclassProc(hwnd, msg, wparam, lparam),
            }
        }
        WM_NCACTIVATE => match state.handle(FrameMessage::NcActivate) {
            FrameReply::Consumed(value) => LRESULT(value),
            _ => DefSubclassProc(hwnd, msg, wparam, lparam),
        },
        WM_GETMINMAXINFO => {
            let info = lparam.0 as *mut MINMAXINFO;
            if info.is_null() {
                return DefSubclassProc(hwnd, msg, wparam, lparam);
            }
            match state.handle(FrameMessage::GetMinMaxInfo(to_minmax(&*info))) {
                FrameReply::MinMax(result) => {
                    (*info).ptMaxPosition = POINT {
                        x: result.max_position.x,
                        y: result.max_position.y,
                    };
                    (*info).ptMaxSize = POINT {
                        x: result.max_size.width,
                        y: result.max_size.height,
                    };
                    (*info).ptMaxTrackSize = POINT {
                        x: result.max_track_size.width,
                        y: result.max_track_size.height,
                    };
                    LRESULT(0)
                }
                _ => DefSubclassProc(hwnd, msg, wparam, lparam),
            }
        }
        WM_SIZE => {
            state.handle(FrameMessage::Size);
            let result = DefSubclassProc(hwnd, msg, wparam, lparam);
            (state.hooks.state_changed)();
            result
        }
        WM_SHOWWINDOW => {
            if wparam.0 != 0 && !state.shown.replace(true) {
                state.handle(FrameMessage::FirstShow);
            }
            DefSubclassProc(hwnd, msg, wparam, lparam)
        }
        _ => DefSubclassProc(hwnd, msg, wparam, lparam),
    }
}

/// Install the frame subclass on `hwnd` and force a frame recomputation.
pub fn install(hwnd: HWND, emulator: FrameEmulator, hooks: SubclassHooks) -> Result<()> {
    if is_installed(hwnd) {
        bail!("frame subclass already installed on {hwnd:?}");
    }
    let state = Box::new(SubclassState {
        frame: Win32Frame::new(hwnd),
        emulator,
        hooks,
        shown: Cell::new(false),
    });
    let ptr = Box::into_raw(state);
    let ok = unsafe { SetWindowSubclass(hwnd, Some(frame_subclass_proc), SUBCLASS_ID, ptr as usize) };
    if !ok.as_bool() {
        drop(unsafe { Box::from_raw(ptr) });
        bail!("SetWindowSubclass failed for {hwnd:?}");
    }
    // The window already exists, so creation is replayed here.
    let state = unsafe { &*ptr };
    state.handle(FrameMessage::Create);
    tracing::debug!(?hwnd, "frame subclass installed");
    Ok(())
}

pub fn is_installed(hwnd: HWND) -> bool {
    let mut data = 0usize;
    unsafe {
        GetWindowSubclass(hwnd, Some(frame_subclass_proc), SUBCLASS_ID, Some(&mut data)).as_bool()
    }
}

/// Remove the frame subclass. Returns `false` when none was installed.
pub fn uninstall(hwnd: HWND) -> bool {
    let mut data = 0usize;
    unsafe {
        if !GetWindowSubclass(hwnd, Some(frame_subclass_proc), SUBCLASS_ID, Some(&mut data))
            .as_bool()
        {
            return false;
        }
        let _ = RemoveWindowSubclass(hwnd, Some(frame_subclass_proc), SUBCLASS_ID);
        if data != 0 {
            let state = Box::from_raw(data as *mut SubclassState);
            state.frame.clear_published_margins();
        }
    }
    tracing::debug!(?hwnd, "frame subclass removed");
    true
}
