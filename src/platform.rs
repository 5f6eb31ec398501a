//! Native window-style plumbing that egui's viewport commands cannot cover.

/// Window title, also used to locate the overlay HWND natively.
pub const WINDOW_TITLE: &str = "Crosshair Overlay";

/// Whether this platform can flip the overlay between click-through and
/// click-catching at runtime.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClickThroughSupport {
    /// The extended window style can be toggled (Windows).
    Supported,
    /// No toggle primitive: the overlay stays clickable and a one-time
    /// warning is shown at startup.
    Degraded,
}

/// Probe the platform for click-through capability.
pub fn click_through_support() -> ClickThroughSupport {
    if cfg!(windows) {
        ClickThroughSupport::Supported
    } else {
        ClickThroughSupport::Degraded
    }
}

/// Toggle the click-through state of the overlay window.
///
/// Click-through is the `WS_EX_TRANSPARENT` extended style bit: with it set,
/// the OS routes all pointer input to whatever lies beneath the window. winit
/// exposes no direct equivalent for an already-created window, so the bit is
/// flipped on the HWND itself.
///
/// No-op on non-Windows platforms (see [`ClickThroughSupport::Degraded`]).
pub fn set_click_through(enabled: bool) {
    #[cfg(windows)]
    {
        use windows_sys::Win32::UI::WindowsAndMessaging::{
            GetWindowLongW, SetWindowLongW, GWL_EXSTYLE, WS_EX_TRANSPARENT,
        };

        if let Some(hwnd) = find_overlay_window() {
            unsafe {
                let mut ex_style = GetWindowLongW(hwnd, GWL_EXSTYLE) as u32;
                if enabled {
                    ex_style |= WS_EX_TRANSPARENT;
                } else {
                    ex_style &= !WS_EX_TRANSPARENT;
                }
                SetWindowLongW(hwnd, GWL_EXSTYLE, ex_style as i32);
            }
        }
    }
    #[cfg(not(windows))]
    let _ = enabled;
}

/// Show and raise the overlay window natively.
///
/// On Windows, `ViewportCommand::Visible(true)` plus `ctx.request_repaint()`
/// is not sufficient to un-hide a window: Win32 does not deliver `WM_PAINT`
/// to hidden windows, so the egui event loop never wakes and `update()` is
/// never called. Calling `ShowWindow` directly makes Windows deliver a
/// `WM_PAINT`, waking the loop so `update()` can act on the visibility flag;
/// `SetForegroundWindow` raises the window immediately instead of waiting
/// for the egui `Focus` command a frame later.
///
/// On other platforms the egui repaint mechanism is sufficient; no-op.
pub fn show_window_native() {
    #[cfg(windows)]
    {
        use windows_sys::Win32::UI::WindowsAndMessaging::{
            SetForegroundWindow, ShowWindow, SW_SHOW,
        };

        if let Some(hwnd) = find_overlay_window() {
            unsafe {
                ShowWindow(hwnd, SW_SHOW);
                SetForegroundWindow(hwnd);
            }
        }
    }
}

/// Hide the overlay window immediately via `ShowWindow(SW_HIDE)`, so the OS
/// removes it before egui's next frame can flash a clear-color. No-op on
/// non-Windows platforms.
pub fn hide_window_native() {
    #[cfg(windows)]
    {
        use windows_sys::Win32::UI::WindowsAndMessaging::{ShowWindow, SW_HIDE};

        if let Some(hwnd) = find_overlay_window() {
            unsafe {
                ShowWindow(hwnd, SW_HIDE);
            }
        }
    }
}

/// Locate the overlay window by its title (set in `eframe::run_native`).
#[cfg(windows)]
fn find_overlay_window() -> Option<windows_sys::Win32::Foundation::HWND> {
    use windows_sys::Win32::UI::WindowsAndMessaging::FindWindowW;

    let title: Vec<u16> = WINDOW_TITLE.encode_utf16().chain([0]).collect();
    let hwnd = unsafe { FindWindowW(std::ptr::null(), title.as_ptr()) };
    if hwnd.is_null() { None } else { Some(hwnd) }
}
