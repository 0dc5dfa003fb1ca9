//! Screen-recording authorization.
//!
//! Only macOS gates screen capture behind a user grant; other platforms
//! report access as always available.

pub trait CaptureAccess {
    /// Check without prompting.
    fn is_authorized(&self) -> bool;

    /// Ask the OS for access. May show a system dialog; does not wait for it.
    fn request(&self);
}

#[derive(Debug, Default)]
pub struct SystemCaptureAccess;

#[cfg(target_os = "macos")]
mod ffi {
    #[link(name = "CoreGraphics", kind = "framework")]
    unsafe extern "C" {
        pub fn CGPreflightScreenCaptureAccess() -> bool;
        pub fn CGRequestScreenCaptureAccess() -> bool;
    }
}

#[cfg(target_os = "macos")]
impl CaptureAccess for SystemCaptureAccess {
    fn is_authorized(&self) -> bool {
        // SAFETY: no arguments, callable from any thread.
        unsafe { ffi::CGPreflightScreenCaptureAccess() }
    }

    fn request(&self) {
        // The result only reflects the state before the user answers.
        let _ = unsafe { ffi::CGRequestScreenCaptureAccess() };
        log::warn!(
            "Screen recording access is required. Grant it in System Settings > \
             Privacy & Security > Screen Recording, then press the hotkey again."
        );
    }
}

#[cfg(not(target_os = "macos"))]
impl CaptureAccess for SystemCaptureAccess {
    fn is_authorized(&self) -> bool {
        true
    }

    fn request(&self) {}
}
