//! Title bar colours and where the accent comes from.
//!
//! [`Color`] parses and prints the `#rrggbb` strings used in settings.
//! An [`AccentColorSource`] reports the current accent and whether it
//! changed since the last poll. On Windows [`system_accent`] reads the DWM
//! colorization and watches the registry for updates. Elsewhere there is
//! no system accent.

use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    pub const BLACK: Color = Color::rgb(0, 0, 0);
    pub const WHITE: Color = Color::rgb(0xff, 0xff, 0xff);
    pub const GRAY: Color = Color::rgb(0xa0, 0xa0, 0xa4);

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 0xff }
    }

    /// Decode a packed `0xAARRGGBB` value such as the DWM colorization color.
    pub const fn from_argb(value: u32) -> Self {
        Self {
            a: (value >> 24) as u8,
            r: (value >> 16) as u8,
            g: (value >> 8) as u8,
            b: value as u8,
        }
    }

    /// Parse `#rrggbb` or `#aarrggbb`; the leading `#` is optional.
    pub fn parse(value: &str) -> Option<Self> {
        let raw = value.trim().trim_start_matches('#');
        if !raw.chars().all(|c| c.is_ascii_hexdigit()) {
            return None;
        }
        let byte = |i: usize| u8::from_str_radix(&raw[i..i + 2], 16).ok();
        match raw.len() {
            6 => Some(Color::rgb(byte(0)?, byte(2)?, byte(4)?)),
            8 => Some(Color {
                a: byte(0)?,
                r: byte(2)?,
                g: byte(4)?,
                b: byte(6)?,
            }),
            _ => None,
        }
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.a == 0xff {
            write!(f, "#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
        } else {
            write!(f, "#{:02x}{:02x}{:02x}{:02x}", self.a, self.r, self.g, self.b)
        }
    }
}

/// Source of the system accent color used for active title bars.
pub trait AccentColorSource {
    fn current(&self) -> Option<Color>;

    /// Returns `true` once per batch of change notifications since the last call.
    fn take_changed(&self) -> bool {
        false
    }
}

/// An accent that never changes.
#[derive(Debug, Clone, Copy)]
pub struct FixedAccent(pub Option<Color>);

impl AccentColorSource for FixedAccent {
    fn current(&self) -> Option<Color> {
        self.0
    }
}

/// The accent source for the current platform, if it has one.
pub fn system_accent() -> Option<Box<dyn AccentColorSource>> {
    #[cfg(windows)]
    {
        Some(Box::new(win32::DwmAccent::new()))
    }

    #[cfg(not(windows))]
    {
        None
    }
}

#[cfg(windows)]
pub mod win32 {
    use super::{AccentColorSource, Color};
    use anyhow::{anyhow, Result};
    use std::sync::mpsc::{channel, Receiver, TryRecvError};
    use std::thread::JoinHandle;
    use windows::core::{w, PCWSTR};
    use windows::Win32::Foundation::{CloseHandle, ERROR_SUCCESS, HANDLE, WAIT_OBJECT_0};
    use windows::Win32::System::Registry::{
        RegCloseKey, RegNotifyChangeKeyValue, RegOpenKeyExW, RegQueryValueExW, HKEY,
        HKEY_CURRENT_USER, KEY_NOTIFY, KEY_READ, REG_NOTIFY_CHANGE_LAST_SET,
    };
    use windows::Win32::System::Threading::{
        CreateEventW, SetEvent, WaitForMultipleObjects, INFINITE,
    };

    const DWM_KEY: PCWSTR = w!("SOFTWARE\\Microsoft\\Windows\\DWM");

    pub fn read_colorization_color() -> Option<Color> {
        unsafe {
            let mut key = HKEY::default();
            if RegOpenKeyExW(HKEY_CURRENT_USER, DWM_KEY, 0, KEY_READ, &mut key) != ERROR_SUCCESS {
                return None;
            }
            let mut value = 0u32;
            let mut size = std::mem::size_of::<u32>() as u32;
            let status = RegQueryValueExW(
                key,
                w!("ColorizationColor"),
                None,
                None,
                Some(&mut value as *mut u32 as *mut u8),
                Some(&mut size),
            );
            let _ = RegCloseKey(key);
            if status != ERROR_SUCCESS {
                return None;
            }
            Some(Color::from_argb(value))
        }
    }

    /// Watches the DWM registry key from a background thread and reports
    /// changes over a channel drained on the UI thread.
    struct RegistryWatcher {
        changes: Receiver<()>,
        stop_event: isize,
        thread: Option<JoinHandle<()>>,
    }

    impl RegistryWatcher {
        fn start() -> Result<Self> {
            let (change_tx, change_rx) = channel::<()>();
            let (ready_tx, ready_rx) = channel::<Result<isize>>();
            let thread = std::thread::Builder::new()
                .name("dwm-accent-watcher".to_string())
                .spawn(move || unsafe {
                    let mut key = HKEY::default();
                    if RegOpenKeyExW(HKEY_CURRENT_USER, DWM_KEY, 0, KEY_NOTIFY, &mut key)
                        != ERROR_SUCCESS
                    {
                        let _ = ready_tx.send(Err(anyhow!("unable to open DWM key for notify")));
                        return;
                    }
                    let events = CreateEventW(None, false, false, PCWSTR::null()).and_then(
                        |change| {
                            CreateEventW(None, true, false, PCWSTR::null())
                                .map(|stop| (change, stop))
                        },
                    );
                    let (change, stop) = match events {
                        Ok(events) => events,
                        Err(err) => {
                            let _ = RegCloseKey(key);
                            let _ = ready_tx.send(Err(anyhow!("CreateEventW failed: {err}")));
                            return;
                        }
                    };
                    let _ = ready_tx.send(Ok(stop.0 as isize));
                    loop {
                        if RegNotifyChangeKeyValue(key, false, REG_NOTIFY_CHANGE_LAST_SET, change, true)
                            != ERROR_SUCCESS
                        {
                            tracing::warn!("accent watcher could not re-arm registry notification");
                            break;
                        }
                        let signalled = WaitForMultipleObjects(&[change, stop], false, INFINITE);
                        if signalled != WAIT_OBJECT_0 {
                            break;
                        }
                        if change_tx.send(()).is_err() {
                            break;
                        }
                    }
                    let _ = CloseHandle(change);
                    let _ = CloseHandle(stop);
                    let _ = RegCloseKey(key);
                })
                .map_err(|err| anyhow!("failed to spawn accent watcher thread: {err}"))?;

            let stop_event = ready_rx
                .recv()
                .map_err(|_| anyhow!("accent watcher exited during start-up"))??;
            Ok(Self {
                changes: change_rx,
                stop_event,
                thread: Some(thread),
            })
        }

        fn take_changed(&self) -> bool {
            let mut changed = false;
            loop {
                match self.changes.try_recv() {
                    Ok(()) => changed = true,
                    Err(TryRecvError::Empty) | Err(TryRecvError::Disconnected) => break,
                }
            }
            changed
        }
    }

    impl Drop for RegistryWatcher {
        fn drop(&mut self) {
            unsafe {
                let _ = SetEvent(HANDLE(self.stop_event as *mut core::ffi::c_void));
            }
            if let Some(thread) = self.thread.take() {
                let _ = thread.join();
            }
        }
    }

    /// DWM colorization color with live updates when the watcher could start.
    pub struct DwmAccent {
        watcher: Option<RegistryWatcher>,
    }

    impl DwmAccent {
        pub fn new() -> Self {
            let watcher = match RegistryWatcher::start() {
                Ok(watcher) => Some(watcher),
                Err(err) => {
                    tracing::warn!(error = %err, "live accent color updates unavailable");
                    None
                }
            };
            Self { watcher }
        }
    }

    impl AccentColorSource for DwmAccent {
        fn current(&self) -> Option<Color> {
            read_colorization_color()
        }

        fn take_changed(&self) -> bool {
            self.watcher
                .as_ref()
                .map(RegistryWatcher::take_changed)
                .unwrap_or(false)
        }
    }
}
