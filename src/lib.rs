//! Region screenshots: freeze every display, drag out a rectangle, and send
//! the crop to the clipboard or a PNG file.
//!
//! Everything but `app` is free of window-system calls so the selection
//! state machine and session logic can be driven directly from tests.

pub mod app;
pub mod capture;
pub mod config;
pub mod constants;
pub mod hotkey;
pub mod input;
pub mod overlay;
pub mod permission;
pub mod persist;
pub mod selection;
pub mod selection_logic;
pub mod session;
pub mod toolbar;

pub use selection::{SelectionSurface, SurfaceEvent, SurfaceInput};
pub use selection_logic::{Point, Rect, SelectionRect, Size};
pub use session::{Session, SessionStatus, start_session};
