//! One capture session: a surface per display, the shared toolbar and the
//! single in-flight selection, from the hotkey press until teardown.

use image::RgbaImage;
use log::{debug, info, warn};

use crate::capture::{self, CaptureError, CapturedDisplay, ScreenSource};
use crate::permission::CaptureAccess;
use crate::persist::ImageSink;
use crate::selection::{SelectionSurface, SurfaceEvent, SurfaceInput, SurfaceOptions};
use crate::selection_logic::{Point, SelectionRect};
use crate::toolbar::{Toolbar, ToolbarAction};

#[derive(Debug, thiserror::Error)]
pub enum StartError {
    #[error("screen recording permission has not been granted")]
    PermissionDenied,

    #[error("no display could be captured")]
    NothingCaptured,

    #[error(transparent)]
    Capture(#[from] CaptureError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EndReason {
    Confirmed,
    Saved,
    Copied,
    Cancelled,
    Dismissed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionStatus {
    Open,
    Ended(EndReason),
}

/// What the host knows about where the user is, used to pick the active
/// display.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ActiveHint {
    /// Pointer position in global logical coordinates.
    pub pointer: Option<Point>,
    /// Index of the surface whose window has input focus.
    pub focused: Option<usize>,
}

/// Check access, snapshot every display and open a session over them.
pub fn start_session(
    access: &dyn CaptureAccess,
    source: &mut dyn ScreenSource,
    options: SurfaceOptions,
) -> Result<Session, StartError> {
    if !access.is_authorized() {
        access.request();
        return Err(StartError::PermissionDenied);
    }

    let displays = source.capture_all()?;
    Session::open(displays, options).ok_or(StartError::NothingCaptured)
}

pub struct Session {
    displays: Vec<CapturedDisplay>,
    surfaces: Vec<SelectionSurface>,
    toolbar: Option<Toolbar>,
    current_selection: Option<SelectionRect>,
    active_index: Option<usize>,
    status: SessionStatus,
}

impl Session {
    /// `None` when there is nothing to show.
    pub fn open(displays: Vec<CapturedDisplay>, options: SurfaceOptions) -> Option<Self> {
        if displays.is_empty() {
            return None;
        }

        let surfaces = displays
            .iter()
            .map(|d| SelectionSurface::new(d.placement.size(), options))
            .collect();
        info!("Capture session opened on {} display(s)", displays.len());

        Some(Session {
            displays,
            surfaces,
            toolbar: None,
            current_selection: None,
            active_index: None,
            status: SessionStatus::Open,
        })
    }

    pub fn status(&self) -> SessionStatus {
        self.status
    }

    pub fn is_open(&self) -> bool {
        self.status == SessionStatus::Open
    }

    pub fn display_count(&self) -> usize {
        self.displays.len()
    }

    pub fn displays(&self) -> &[CapturedDisplay] {
        &self.displays
    }

    pub fn surface(&self, index: usize) -> Option<&SelectionSurface> {
        self.surfaces.get(index)
    }

    pub fn current_selection(&self) -> Option<SelectionRect> {
        self.current_selection
    }

    pub fn active_index(&self) -> Option<usize> {
        self.active_index
    }

    /// The toolbar, if it is currently shown on display `index`.
    pub fn toolbar_on(&self, index: usize) -> Option<&Toolbar> {
        self.toolbar.as_ref().filter(|t| t.display() == index)
    }

    /// Display under the pointer, else the focused one, else the first.
    pub fn resolve_active_index(&self, hint: &ActiveHint) -> Option<usize> {
        if let Some(p) = hint.pointer {
            if let Some(i) = self.displays.iter().position(|d| d.placement.contains(p)) {
                return Some(i);
            }
        }
        if let Some(i) = hint.focused.filter(|i| *i < self.displays.len()) {
            return Some(i);
        }
        if self.displays.is_empty() { None } else { Some(0) }
    }

    /// Whether surface `index` needs a new frame; clears the flag.
    pub fn take_redraw(&mut self, index: usize) -> bool {
        self.surfaces
            .get_mut(index)
            .is_some_and(|s| s.take_dirty())
    }

    /// Feed input to surface `index` and act on whatever it reports.
    pub fn handle_input(
        &mut self,
        index: usize,
        input: SurfaceInput,
        hint: &ActiveHint,
        sink: &mut dyn ImageSink,
    ) -> SessionStatus {
        if !self.is_open() {
            return self.status;
        }
        let Some(surface) = self.surfaces.get_mut(index) else {
            return self.status;
        };

        let was_adjusting = surface.is_adjusting();
        let event = surface.handle(input);
        let adjusted = was_adjusting && !surface.is_adjusting();

        if adjusted {
            self.sync_adjusted(index);
        }
        match event {
            Some(event) => self.handle_event(index, event, hint, sink),
            None => self.status,
        }
    }

    pub fn handle_event(
        &mut self,
        index: usize,
        event: SurfaceEvent,
        hint: &ActiveHint,
        sink: &mut dyn ImageSink,
    ) -> SessionStatus {
        if !self.is_open() {
            return self.status;
        }

        match event {
            SurfaceEvent::StartNewSelection => {
                debug!("New selection started on display {index}");
                self.hide_toolbar();
                self.current_selection = None;
                // One committed selection per session.
                for (i, surface) in self.surfaces.iter_mut().enumerate() {
                    if i != index {
                        surface.clear_selection();
                    }
                }
            }
            SurfaceEvent::Select(selection) => {
                debug!("Selected {:?} on display {index}", selection.rect());
                self.current_selection = Some(selection);
                self.active_index = Some(index)
                    .filter(|i| *i < self.displays.len())
                    .or_else(|| self.resolve_active_index(hint));
                self.show_toolbar(selection);
            }
            SurfaceEvent::Confirm(selection) => {
                debug!("Confirmed {:?} on display {index}", selection.rect());
                self.hide_toolbar();
                if let Some(image) = self.crop_on(index, selection) {
                    copy_to(sink, &image);
                }
                self.end(EndReason::Confirmed);
            }
            SurfaceEvent::Cancel => {
                debug!("Selection cancelled");
                self.end(EndReason::Cancelled);
            }
        }
        self.status
    }

    /// Toolbar button under `point` on display `index`.
    pub fn toolbar_action_at(&self, index: usize, point: Point) -> Option<ToolbarAction> {
        self.toolbar_on(index).and_then(|t| t.hit_test(point))
    }

    pub fn toolbar_action(
        &mut self,
        action: ToolbarAction,
        hint: &ActiveHint,
        sink: &mut dyn ImageSink,
    ) -> SessionStatus {
        if !self.is_open() {
            return self.status;
        }

        let cropped = match action {
            ToolbarAction::Cancel => None,
            ToolbarAction::Save | ToolbarAction::Copy => self
                .current_selection
                .and_then(|sel| self.crop_active(sel, hint)),
        };

        let reason = match action {
            ToolbarAction::Save => {
                if let Some(image) = &cropped {
                    copy_to(sink, image);
                    save_to(sink, image);
                }
                EndReason::Saved
            }
            ToolbarAction::Copy => {
                if let Some(image) = &cropped {
                    copy_to(sink, image);
                }
                EndReason::Copied
            }
            ToolbarAction::Cancel => EndReason::Cancelled,
        };
        self.end(reason);
        self.status
    }

    /// Tear down without producing a screenshot.
    pub fn dismiss(&mut self) -> SessionStatus {
        if self.is_open() {
            self.end(EndReason::Dismissed);
        }
        self.status
    }

    fn end(&mut self, reason: EndReason) {
        self.toolbar = None;
        self.current_selection = None;
        self.active_index = None;
        self.surfaces.clear();
        self.displays.clear();
        self.status = SessionStatus::Ended(reason);
        info!("Capture session ended ({reason:?})");
    }

    fn crop_active(&self, selection: SelectionRect, hint: &ActiveHint) -> Option<RgbaImage> {
        let index = self
            .active_index
            .or_else(|| self.resolve_active_index(hint))?;
        self.crop_on(index, selection)
    }

    fn crop_on(&self, index: usize, selection: SelectionRect) -> Option<RgbaImage> {
        let display = self.displays.get(index)?;

        let pixel_rect = selection.image_rect(display.effective_scale());
        match capture::crop(&display.image, &pixel_rect) {
            Ok(image) => Some(image),
            Err(e) => {
                warn!("Skipping screenshot: {e}");
                None
            }
        }
    }

    /// A move or resize just ended on `index`: follow the committed rect.
    fn sync_adjusted(&mut self, index: usize) {
        match self.surfaces.get(index).and_then(|s| s.finalized_selection()) {
            Some(selection) => {
                self.current_selection = Some(selection);
                self.active_index = Some(index);
                self.show_toolbar(selection);
            }
            None => {
                self.current_selection = None;
                self.hide_toolbar();
            }
        }
    }

    fn show_toolbar(&mut self, selection: SelectionRect) {
        self.hide_toolbar();
        let Some(index) = self.active_index.filter(|i| *i < self.surfaces.len()) else {
            return;
        };

        let bounds = self.surfaces[index].bounds();
        self.toolbar = Some(Toolbar::anchored(index, &selection.rect(), &bounds));
        self.surfaces[index].mark_dirty();
    }

    fn hide_toolbar(&mut self) {
        if let Some(toolbar) = self.toolbar.take() {
            if let Some(surface) = self.surfaces.get_mut(toolbar.display()) {
                surface.mark_dirty();
            }
        }
    }
}

fn copy_to(sink: &mut dyn ImageSink, image: &RgbaImage) {
    if let Err(e) = sink.copy(image) {
        warn!("Failed to copy screenshot: {e}");
    }
}

fn save_to(sink: &mut dyn ImageSink, image: &RgbaImage) {
    let png = match capture::encode_png(image) {
        Ok(png) => png,
        Err(e) => {
            warn!("Failed to encode screenshot: {e}");
            return;
        }
    };
    if let Err(e) = sink.save(&png) {
        warn!("Failed to save screenshot: {e}");
    }
}
