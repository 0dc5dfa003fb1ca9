//! Visual and timing defaults shared by the overlay, toolbar and session.

use std::time::Duration;

pub const APP_NAME: &str = "QuickCrop";

// === Hotkey ===

/// Ctrl+Cmd+A on macOS, Ctrl+Super+A elsewhere.
pub const DEFAULT_HOTKEY: &str = "ctrl+super+KeyA";

// === Overlay ===

pub const OVERLAY_DIM_ALPHA: f32 = 0.3;
pub const SELECTION_BORDER_WIDTH: f32 = 1.5;
/// System blue, RGB.
pub const SELECTION_BORDER_COLOR: (u8, u8, u8) = (0, 122, 255);

// === Handles ===

pub const HANDLE_SIZE: f32 = 6.0;
pub const HANDLE_BORDER_WIDTH: f32 = 1.5;
pub const HANDLE_HIT_RADIUS: f64 = 8.0;

// === Size label ===

pub const LABEL_GLYPH_SCALE: u32 = 2;
pub const LABEL_PADDING: f64 = 6.0;
/// Gap between the selection edge and the label.
pub const LABEL_GAP: f64 = 4.0;

// === Toolbar ===

pub const TOOLBAR_MARGIN: f64 = 8.0;

// === Input ===

/// Platform default double-click interval.
pub const DOUBLE_CLICK_INTERVAL: Duration = Duration::from_millis(500);

// === Files ===

pub const SCREENSHOT_FILE_PREFIX: &str = "Screenshot";
pub const SCREENSHOT_FILE_EXTENSION: &str = "png";
pub const SCREENSHOT_TIMESTAMP_FORMAT: &str = "%Y-%m-%d_%H-%M-%S";
