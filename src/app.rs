//! Window host: a small launcher window while idle, one borderless overlay
//! window per display while a capture session is open.

use std::time::{Duration, Instant};

use anyhow::{Context, Result, anyhow};
use log::{debug, error, info, warn};
use minifb::{
    CursorStyle, Key, KeyRepeat, MouseButton, MouseMode, Scale, ScaleMode, Window, WindowOptions,
};
use tiny_skia::{Color, Pixmap};

use crate::capture::{CapturedDisplay, XcapSource};
use crate::config::Config;
use crate::constants::APP_NAME;
use crate::hotkey::HotkeyService;
use crate::input::PointerTracker;
use crate::overlay::{self, Backdrop, OverlayStyle};
use crate::permission::SystemCaptureAccess;
use crate::persist::DesktopSink;
use crate::selection::{CursorIcon, SurfaceInput};
use crate::selection_logic::Point;
use crate::session::{ActiveHint, Session, SessionStatus, StartError, start_session};

const LAUNCHER_SIZE: (usize, usize) = (420, 64);
const OVERLAY_FPS: usize = 60;
const LAUNCHER_FPS: usize = 20;

#[derive(Debug, Clone, Copy, Default)]
pub struct RunOptions {
    /// Open a capture session right away.
    pub capture_now: bool,
    /// Exit after the first session.
    pub once: bool,
}

pub struct App {
    config: Config,
    style: OverlayStyle,
    access: SystemCaptureAccess,
    source: XcapSource,
    sink: DesktopSink,
    hotkey: Option<HotkeyService>,
}

impl App {
    pub fn new(config: Config) -> Self {
        let style = config.overlay_style();
        let sink = DesktopSink::new(config.save_directory(), config.ask_save_location);
        App {
            config,
            style,
            access: SystemCaptureAccess,
            source: XcapSource,
            sink,
            hotkey: None,
        }
    }

    pub fn run(mut self, options: RunOptions) -> Result<()> {
        if options.once {
            self.capture_once()?;
            return Ok(());
        }

        match HotkeyService::register(&self.config.hotkey) {
            Ok(service) => self.hotkey = Some(service),
            Err(e) => warn!("{e}; use the launcher window to capture"),
        }

        if options.capture_now {
            self.capture_once()?;
        }

        let mut launcher = Launcher::open(&self.config.hotkey)?;
        while launcher.window.is_open() && !launcher.window.is_key_down(Key::Q) {
            let fired = self.hotkey.as_ref().is_some_and(|h| h.poll_fired());
            let clicked = launcher.clicked();
            if fired || clicked {
                // the launcher must not end up in the screenshot
                drop(launcher);
                std::thread::sleep(Duration::from_millis(150));
                self.capture_once()?;
                launcher = Launcher::open(&self.config.hotkey)?;
                continue;
            }
            launcher.window.update();
        }

        info!("{APP_NAME} exiting");
        Ok(())
    }

    /// Run one capture session to completion. Capture failures are logged,
    /// not returned; only window-system failures are errors.
    pub fn capture_once(&mut self) -> Result<()> {
        let session = match start_session(
            &self.access,
            &mut self.source,
            self.config.surface_options(),
        ) {
            Ok(session) => session,
            Err(StartError::PermissionDenied) => {
                warn!("Screen capture is not authorized; requested access");
                return Ok(());
            }
            Err(e) => {
                error!("Capture failed: {e}");
                return Ok(());
            }
        };

        let status = self.run_overlay(session)?;
        debug!("Session finished: {status:?}");
        Ok(())
    }

    fn run_overlay(&mut self, mut session: Session) -> Result<SessionStatus> {
        let interval = self.config.surface_options().double_click_interval;
        let opened: Result<Vec<_>> = session
            .displays()
            .iter()
            .enumerate()
            .map(|(index, display)| OverlayWindow::open(index, display, interval))
            .collect();
        let mut windows = match opened {
            Ok(windows) => windows,
            Err(e) => {
                session.dismiss();
                return Err(e);
            }
        };

        while session.is_open() {
            if self.hotkey.as_ref().is_some_and(|h| h.poll_fired()) {
                debug!("Hotkey ignored: a capture session is already open");
            }

            let hint = active_hint(&mut windows);
            for win in windows.iter_mut() {
                if !session.is_open() {
                    break;
                }
                win.pump_input(&mut session, &hint, &mut self.sink);
                if session.is_open() {
                    win.present(&mut session, &self.style)?;
                }
            }
        }

        Ok(session.status())
    }
}

struct OverlayWindow {
    index: usize,
    window: Window,
    origin: Point,
    scale: f64,
    width: usize,
    height: usize,
    backdrop: Backdrop,
    buffer: Vec<u32>,
    tracker: PointerTracker,
    /// Press started on the toolbar; the gesture belongs to it.
    on_toolbar: bool,
}

impl OverlayWindow {
    fn open(index: usize, display: &CapturedDisplay, double_click: Duration) -> Result<Self> {
        let size = display.placement.size();
        let width = size.width.round().max(1.0) as usize;
        let height = size.height.round().max(1.0) as usize;

        let backdrop = Backdrop::from_image(&display.image, size)
            .ok_or_else(|| anyhow!("cannot build backdrop for {}", display.name))?;

        let mut window = Window::new(
            APP_NAME,
            width,
            height,
            WindowOptions {
                borderless: true,
                title: false,
                resize: false,
                topmost: true,
                scale: Scale::X1,
                scale_mode: ScaleMode::Stretch,
                ..WindowOptions::default()
            },
        )
        .with_context(|| format!("failed to open overlay on {}", display.name))?;
        window.set_position(display.placement.x as isize, display.placement.y as isize);
        window.set_target_fps(OVERLAY_FPS);
        window.set_cursor_style(CursorStyle::Crosshair);

        Ok(OverlayWindow {
            index,
            window,
            origin: display.placement.origin(),
            scale: display.effective_scale(),
            width,
            height,
            backdrop,
            buffer: Vec::with_capacity(width * height),
            tracker: PointerTracker::new(double_click),
            on_toolbar: false,
        })
    }

    fn local_pointer(&self) -> Option<Point> {
        self.window
            .get_mouse_pos(MouseMode::Discard)
            .map(|(x, y)| Point::new(x as f64, y as f64))
    }

    fn pump_input(&mut self, session: &mut Session, hint: &ActiveHint, sink: &mut DesktopSink) {
        if !self.window.is_open() {
            session.dismiss();
            return;
        }
        if self.window.is_key_pressed(Key::Escape, KeyRepeat::No) {
            session.handle_input(self.index, SurfaceInput::Cancel, hint, sink);
            return;
        }

        let pointer = self.local_pointer();
        let down = self.window.get_mouse_down(MouseButton::Left);
        let Some(input) = self.tracker.update(pointer, down, Instant::now()) else {
            return;
        };

        match input {
            SurfaceInput::PointerDown { point, .. } => {
                if let Some(action) = session.toolbar_action_at(self.index, point) {
                    debug!("Toolbar {action:?}");
                    session.toolbar_action(action, hint, sink);
                    return;
                }
                if session.toolbar_on(self.index).is_some_and(|t| t.contains(point)) {
                    self.on_toolbar = true;
                    return;
                }
            }
            SurfaceInput::PointerDrag(_) if self.on_toolbar => return,
            SurfaceInput::PointerUp(_) if self.on_toolbar => {
                self.on_toolbar = false;
                return;
            }
            _ => {}
        }

        session.handle_input(self.index, input, hint, sink);
        self.update_cursor(session, pointer);
    }

    fn update_cursor(&mut self, session: &Session, pointer: Option<Point>) {
        let over_toolbar = pointer
            .zip(session.toolbar_on(self.index))
            .is_some_and(|(p, t)| t.contains(p));
        let style = if over_toolbar {
            CursorStyle::Arrow
        } else {
            session
                .surface(self.index)
                .map_or(CursorStyle::Crosshair, |s| cursor_style(s.cursor()))
        };
        self.window.set_cursor_style(style);
    }

    fn present(&mut self, session: &mut Session, style: &OverlayStyle) -> Result<()> {
        if !session.take_redraw(self.index) {
            self.window.update();
            return Ok(());
        }
        let Some(surface) = session.surface(self.index) else {
            return Ok(());
        };

        let frame = overlay::render(
            surface,
            &self.backdrop,
            self.scale,
            style,
            session.toolbar_on(self.index),
        )
        .ok_or_else(|| anyhow!("failed to allocate overlay frame"))?;
        overlay::to_frame_buffer(&frame, &mut self.buffer);

        if let Err(e) = self
            .window
            .update_with_buffer(&self.buffer, self.width, self.height)
        {
            session.dismiss();
            return Err(e).context("failed to present overlay frame");
        }
        Ok(())
    }
}

/// Pointer location across all overlays, plus the focused one.
fn active_hint(windows: &mut [OverlayWindow]) -> ActiveHint {
    let mut hint = ActiveHint::default();
    for win in windows.iter_mut() {
        if hint.pointer.is_none() {
            hint.pointer = win
                .local_pointer()
                .map(|p| p.offset(win.origin.x, win.origin.y));
        }
        if hint.focused.is_none() && win.window.is_active() {
            hint.focused = Some(win.index);
        }
    }
    hint
}

pub fn cursor_style(icon: CursorIcon) -> CursorStyle {
    match icon {
        CursorIcon::Crosshair => CursorStyle::Crosshair,
        CursorIcon::OpenHand => CursorStyle::OpenHand,
        CursorIcon::ClosedHand => CursorStyle::ClosedHand,
        CursorIcon::ResizeNwse | CursorIcon::ResizeNesw => CursorStyle::ResizeAll,
        CursorIcon::ResizeVertical => CursorStyle::ResizeUpDown,
        CursorIcon::ResizeHorizontal => CursorStyle::ResizeLeftRight,
    }
}

/// Idle window: keeps the platform event loop pumping for the hotkey and
/// doubles as a capture button.
struct Launcher {
    window: Window,
    was_down: bool,
}

impl Launcher {
    fn open(hotkey: &str) -> Result<Self> {
        let (width, height) = LAUNCHER_SIZE;
        let mut window = Window::new(
            APP_NAME,
            width,
            height,
            WindowOptions {
                resize: false,
                ..WindowOptions::default()
            },
        )
        .context("failed to open launcher window")?;
        window.set_target_fps(LAUNCHER_FPS);

        let mut buffer = Vec::with_capacity(width * height);
        if let Some(frame) = launcher_frame(width as u32, height as u32, hotkey) {
            overlay::to_frame_buffer(&frame, &mut buffer);
            window
                .update_with_buffer(&buffer, width, height)
                .context("failed to draw launcher window")?;
        }
        Ok(Launcher {
            window,
            was_down: false,
        })
    }

    /// A click released inside the window.
    fn clicked(&mut self) -> bool {
        let down = self.window.get_mouse_down(MouseButton::Left);
        let released = self.was_down && !down;
        self.was_down = down;
        released && self.window.get_mouse_pos(MouseMode::Discard).is_some()
    }
}

fn launcher_frame(width: u32, height: u32, hotkey: &str) -> Option<Pixmap> {
    let mut frame = Pixmap::new(width, height)?;
    frame.fill(Color::from_rgba8(32, 32, 36, 255));
    overlay::draw_text(&mut frame, "Click to capture", 12.0, 12.0, 2, Color::WHITE);
    overlay::draw_text(
        &mut frame,
        &format!("or press {hotkey}"),
        12.0,
        40.0,
        1,
        Color::from_rgba8(170, 170, 180, 255),
    );
    Some(frame)
}
