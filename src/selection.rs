use std::time::{Duration, Instant};

use crate::constants::{DOUBLE_CLICK_INTERVAL, HANDLE_HIT_RADIUS};
use crate::selection_logic::{Point, Rect, ResizeHandle, SelectionRect, Size, clamp_rect};

/// Events a surface reports to whoever owns it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SurfaceEvent {
    /// A fresh drag began; any visible toolbar should go away now.
    StartNewSelection,
    Select(SelectionRect),
    Confirm(SelectionRect),
    Cancel,
}

/// Raw input, already converted to the surface's local coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SurfaceInput {
    PointerDown {
        point: Point,
        click_count: u32,
        at: Instant,
    },
    PointerDrag(Point),
    PointerUp(Point),
    PointerMove(Point),
    Cancel,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CursorIcon {
    Crosshair,
    OpenHand,
    ClosedHand,
    ResizeNwse,
    ResizeNesw,
    ResizeVertical,
    ResizeHorizontal,
}

impl CursorIcon {
    pub fn for_handle(handle: ResizeHandle) -> Self {
        match handle {
            ResizeHandle::TopLeft | ResizeHandle::BottomRight => CursorIcon::ResizeNwse,
            ResizeHandle::TopRight | ResizeHandle::BottomLeft => CursorIcon::ResizeNesw,
            ResizeHandle::TopMiddle | ResizeHandle::BottomMiddle => CursorIcon::ResizeVertical,
            ResizeHandle::LeftMiddle | ResizeHandle::RightMiddle => CursorIcon::ResizeHorizontal,
        }
    }
}

/// Observable state of a surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SurfacePhase {
    IdleNoSelection,
    DraggingNew,
    FinalizedIdle,
    DraggingMove,
    DraggingResize,
}

/// Per-gesture state, only held while the button is down.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
enum DragMode {
    #[default]
    None,
    Creating,
    Moving {
        start: Point,
        original: Rect,
    },
    Resizing {
        handle: ResizeHandle,
        original: Rect,
    },
}

#[derive(Debug, Clone, Copy)]
pub struct SurfaceOptions {
    pub double_click_interval: Duration,
    pub handle_hit_radius: f64,
}

impl Default for SurfaceOptions {
    fn default() -> Self {
        SurfaceOptions {
            double_click_interval: DOUBLE_CLICK_INTERVAL,
            handle_hit_radius: HANDLE_HIT_RADIUS,
        }
    }
}

/// Interactive selection covering one display.
#[derive(Debug, Clone)]
pub struct SelectionSurface {
    bounds: Rect,
    selection: Option<SelectionRect>,
    finalized: bool,
    last_click_in_selection: Option<Instant>,
    drag: DragMode,
    cursor: CursorIcon,
    options: SurfaceOptions,
    dirty: bool,
}

impl SelectionSurface {
    pub fn new(size: Size, options: SurfaceOptions) -> Self {
        SelectionSurface {
            bounds: Rect::from_size(size),
            selection: None,
            finalized: false,
            last_click_in_selection: None,
            drag: DragMode::None,
            cursor: CursorIcon::Crosshair,
            options,
            dirty: true,
        }
    }

    pub fn bounds(&self) -> Rect {
        self.bounds
    }

    /// Current rectangle, in progress or committed.
    pub fn selection(&self) -> Option<SelectionRect> {
        self.selection
    }

    /// The committed rectangle, if any.
    pub fn finalized_selection(&self) -> Option<SelectionRect> {
        self.selection.filter(|_| self.finalized)
    }

    pub fn is_finalized(&self) -> bool {
        self.finalized
    }

    pub fn cursor(&self) -> CursorIcon {
        self.cursor
    }

    pub fn phase(&self) -> SurfacePhase {
        match self.drag {
            DragMode::Creating => SurfacePhase::DraggingNew,
            DragMode::Moving { .. } => SurfacePhase::DraggingMove,
            DragMode::Resizing { .. } => SurfacePhase::DraggingResize,
            DragMode::None if self.finalized => SurfacePhase::FinalizedIdle,
            DragMode::None => SurfacePhase::IdleNoSelection,
        }
    }

    /// True while a move or resize gesture is in flight.
    pub fn is_adjusting(&self) -> bool {
        matches!(
            self.drag,
            DragMode::Moving { .. } | DragMode::Resizing { .. }
        )
    }

    pub fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    /// Whether a redraw is pending; clears the flag.
    pub fn take_dirty(&mut self) -> bool {
        std::mem::replace(&mut self.dirty, false)
    }

    pub fn handle(&mut self, input: SurfaceInput) -> Option<SurfaceEvent> {
        match input {
            SurfaceInput::PointerDown {
                point,
                click_count,
                at,
            } => self.pointer_down(point, click_count, at),
            SurfaceInput::PointerDrag(point) => {
                self.pointer_drag(point);
                None
            }
            SurfaceInput::PointerUp(point) => self.pointer_up(point),
            SurfaceInput::PointerMove(point) => {
                self.pointer_move(point);
                None
            }
            SurfaceInput::Cancel => Some(self.cancel()),
        }
    }

    pub fn pointer_down(
        &mut self,
        point: Point,
        click_count: u32,
        at: Instant,
    ) -> Option<SurfaceEvent> {
        if let Some(sel) = self.finalized_selection() {
            let rect = sel.rect();

            if rect.contains(point) {
                // either the OS click count or our own timing confirms
                let interval = self.options.double_click_interval;
                let within_window = self
                    .last_click_in_selection
                    .is_some_and(|t| at.saturating_duration_since(t) < interval);
                if click_count >= 2 || within_window {
                    self.last_click_in_selection = None;
                    return Some(SurfaceEvent::Confirm(sel));
                }
                self.last_click_in_selection = Some(at);
            }

            let radius = self.options.handle_hit_radius;
            if let Some(handle) = ResizeHandle::hit_test(&rect, point, radius) {
                self.drag = DragMode::Resizing {
                    handle,
                    original: rect,
                };
                self.cursor = CursorIcon::for_handle(handle);
                return None;
            }

            if rect.contains(point) {
                self.drag = DragMode::Moving {
                    start: point,
                    original: rect,
                };
                self.cursor = CursorIcon::ClosedHand;
                return None;
            }
        }

        self.last_click_in_selection = None;
        self.drag = DragMode::Creating;
        self.finalized = false;
        self.selection = Some(SelectionRect::new(point, point));
        self.cursor = CursorIcon::Crosshair;
        self.dirty = true;
        Some(SurfaceEvent::StartNewSelection)
    }

    pub fn pointer_drag(&mut self, point: Point) {
        match self.drag {
            DragMode::None => return,
            DragMode::Creating => {
                if let Some(sel) = self.selection.as_mut() {
                    sel.end = point;
                }
            }
            DragMode::Moving { start, original } => {
                let moved = original.offset(point.x - start.x, point.y - start.y);
                self.selection = Some(SelectionRect::from_rect(clamp_rect(moved, &self.bounds)));
            }
            DragMode::Resizing { handle, original } => {
                self.selection = Some(SelectionRect::from_rect(handle.resize(&original, point)));
            }
        }
        self.dirty = true;
    }

    pub fn pointer_up(&mut self, point: Point) -> Option<SurfaceEvent> {
        let mode = std::mem::take(&mut self.drag);
        let event = match mode {
            DragMode::None => return None,
            DragMode::Creating => {
                if let Some(sel) = self.selection.as_mut() {
                    sel.end = point;
                }
                match self.selection {
                    Some(sel) if !sel.is_empty() => {
                        self.finalized = true;
                        Some(SurfaceEvent::Select(sel))
                    }
                    _ => {
                        self.discard();
                        None
                    }
                }
            }
            DragMode::Moving { .. } | DragMode::Resizing { .. } => {
                // committed in place; a collapsed box is thrown away
                if self.selection.is_none_or(|sel| sel.is_empty()) {
                    self.discard();
                }
                None
            }
        };
        self.dirty = true;
        self.update_cursor(point);
        event
    }

    pub fn pointer_move(&mut self, point: Point) {
        if matches!(self.drag, DragMode::None) {
            self.update_cursor(point);
        }
    }

    pub fn cancel(&mut self) -> SurfaceEvent {
        SurfaceEvent::Cancel
    }

    /// Drop any selection and pending gesture, back to idle.
    pub fn clear_selection(&mut self) {
        self.last_click_in_selection = None;
        self.cursor = CursorIcon::Crosshair;
        if self.selection.is_none() && matches!(self.drag, DragMode::None) {
            return;
        }
        self.discard();
        self.drag = DragMode::None;
        self.dirty = true;
    }

    fn discard(&mut self) {
        self.selection = None;
        self.finalized = false;
    }

    fn update_cursor(&mut self, point: Point) {
        self.cursor = match self.finalized_selection() {
            None => CursorIcon::Crosshair,
            Some(sel) => {
                let rect = sel.rect();
                if let Some(handle) =
                    ResizeHandle::hit_test(&rect, point, self.options.handle_hit_radius)
                {
                    CursorIcon::for_handle(handle)
                } else if rect.contains(point) {
                    CursorIcon::OpenHand
                } else {
                    CursorIcon::Crosshair
                }
            }
        };
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn p(x: f64, y: f64) -> Point {
        Point::new(x, y)
    }

    fn surface() -> SelectionSurface {
        SelectionSurface::new(Size::new(1000.0, 800.0), SurfaceOptions::default())
    }

    fn drag(s: &mut SelectionSurface, from: Point, to: Point, at: Instant) -> Vec<SurfaceEvent> {
        let mut events = Vec::new();
        events.extend(s.pointer_down(from, 1, at));
        s.pointer_drag(to);
        events.extend(s.pointer_up(to));
        events
    }

    fn selected(from: Point, to: Point) -> (SelectionSurface, Instant) {
        let mut s = surface();
        let t0 = Instant::now();
        drag(&mut s, from, to, t0);
        (s, t0)
    }

    #[test]
    fn new_drag_selects_normalized_rect() {
        let mut s = surface();
        let events = drag(&mut s, p(300.0, 250.0), p(100.0, 100.0), Instant::now());
        assert_eq!(events[0], SurfaceEvent::StartNewSelection);
        let SurfaceEvent::Select(sel) = events[1] else {
            panic!("expected select, got {events:?}");
        };
        assert_eq!(sel.rect(), Rect::new(100.0, 100.0, 200.0, 150.0));
        assert_eq!(s.phase(), SurfacePhase::FinalizedIdle);
    }

    #[test]
    fn click_without_drag_is_discarded() {
        let mut s = surface();
        let events = drag(&mut s, p(40.0, 40.0), p(40.0, 40.0), Instant::now());
        assert_eq!(events, vec![SurfaceEvent::StartNewSelection]);
        assert_eq!(s.selection(), None);
        assert!(!s.is_finalized());
        assert_eq!(s.phase(), SurfacePhase::IdleNoSelection);
    }

    #[test]
    fn phases_follow_the_gesture() {
        let mut s = surface();
        let t0 = Instant::now();
        assert_eq!(s.phase(), SurfacePhase::IdleNoSelection);
        s.pointer_down(p(10.0, 10.0), 1, t0);
        assert_eq!(s.phase(), SurfacePhase::DraggingNew);
        s.pointer_drag(p(60.0, 60.0));
        s.pointer_up(p(60.0, 60.0));
        assert_eq!(s.phase(), SurfacePhase::FinalizedIdle);

        s.pointer_down(p(30.0, 30.0), 1, t0 + Duration::from_secs(2));
        assert_eq!(s.phase(), SurfacePhase::DraggingMove);
        s.pointer_up(p(30.0, 30.0));

        s.pointer_down(p(60.0, 60.0), 1, t0 + Duration::from_secs(4));
        assert_eq!(s.phase(), SurfacePhase::DraggingResize);
        s.pointer_up(p(60.0, 60.0));
        assert_eq!(s.phase(), SurfacePhase::FinalizedIdle);
    }

    #[test]
    fn double_click_inside_confirms_once() {
        let (mut s, t0) = selected(p(100.0, 100.0), p(300.0, 250.0));
        let inside = p(200.0, 180.0);

        let first = t0 + Duration::from_secs(1);
        assert_eq!(s.pointer_down(inside, 1, first), None);
        assert_eq!(s.pointer_up(inside), None);

        let second = first + Duration::from_millis(200);
        let event = s.pointer_down(inside, 1, second);
        let expected = Rect::new(100.0, 100.0, 200.0, 150.0);
        assert!(matches!(event, Some(SurfaceEvent::Confirm(sel)) if sel.rect() == expected));
    }

    #[test]
    fn click_count_alone_confirms() {
        let (mut s, t0) = selected(p(100.0, 100.0), p(300.0, 250.0));
        let event = s.pointer_down(p(150.0, 150.0), 2, t0 + Duration::from_secs(5));
        assert!(matches!(event, Some(SurfaceEvent::Confirm(_))));
    }

    #[test]
    fn slow_second_click_starts_a_move_instead() {
        let (mut s, t0) = selected(p(100.0, 100.0), p(300.0, 250.0));
        let inside = p(200.0, 180.0);
        s.pointer_down(inside, 1, t0 + Duration::from_secs(1));
        s.pointer_up(inside);
        let late = s.pointer_down(inside, 1, t0 + Duration::from_secs(3));
        assert_eq!(late, None);
        assert_eq!(s.phase(), SurfacePhase::DraggingMove);
    }

    #[test]
    fn click_outside_starts_new_selection() {
        let (mut s, t0) = selected(p(100.0, 100.0), p(300.0, 250.0));
        let event = s.pointer_down(p(600.0, 600.0), 1, t0 + Duration::from_secs(1));
        assert_eq!(event, Some(SurfaceEvent::StartNewSelection));
        assert!(!s.is_finalized());
        assert_eq!(s.phase(), SurfacePhase::DraggingNew);
    }

    #[test]
    fn move_round_trip_restores_rect() {
        let (mut s, t0) = selected(p(100.0, 100.0), p(300.0, 250.0));
        let original = s.selection().map(|sel| sel.rect());

        s.pointer_down(p(150.0, 150.0), 1, t0 + Duration::from_secs(1));
        s.pointer_drag(p(190.0, 120.0));
        assert_eq!(s.pointer_up(p(190.0, 120.0)), None);
        let moved = s.selection().map(|sel| sel.rect());
        assert_eq!(moved, Some(Rect::new(140.0, 70.0, 200.0, 150.0)));

        s.pointer_down(p(190.0, 120.0), 1, t0 + Duration::from_secs(3));
        s.pointer_drag(p(150.0, 150.0));
        s.pointer_up(p(150.0, 150.0));
        assert_eq!(s.selection().map(|sel| sel.rect()), original);
        assert!(s.is_finalized());
    }

    #[test]
    fn move_is_clamped_to_surface() {
        let (mut s, t0) = selected(p(100.0, 100.0), p(300.0, 250.0));
        s.pointer_down(p(150.0, 150.0), 1, t0 + Duration::from_secs(1));
        s.pointer_drag(p(-2000.0, 5000.0));
        s.pointer_up(p(-2000.0, 5000.0));
        let rect = s.selection().map(|sel| sel.rect());
        assert_eq!(rect, Some(Rect::new(0.0, 650.0, 200.0, 150.0)));
    }

    #[test]
    fn resize_through_handle_flips() {
        let (mut s, t0) = selected(p(100.0, 100.0), p(300.0, 250.0));
        s.pointer_down(p(300.0, 250.0), 1, t0 + Duration::from_secs(1));
        assert_eq!(s.phase(), SurfacePhase::DraggingResize);
        s.pointer_drag(p(50.0, 60.0));
        assert_eq!(s.pointer_up(p(50.0, 60.0)), None);
        let resized = s.selection().map(|sel| sel.rect());
        assert_eq!(resized, Some(Rect::new(50.0, 60.0, 50.0, 40.0)));
        assert!(s.is_finalized());
    }

    #[test]
    fn resize_collapsing_box_discards_it() {
        let (mut s, t0) = selected(p(100.0, 100.0), p(300.0, 250.0));
        s.pointer_down(p(300.0, 175.0), 1, t0 + Duration::from_secs(1));
        s.pointer_drag(p(100.0, 175.0));
        s.pointer_up(p(100.0, 175.0));
        assert_eq!(s.selection(), None);
        assert_eq!(s.phase(), SurfacePhase::IdleNoSelection);
    }

    #[test]
    fn cleared_selection_forgets_the_pending_click() {
        let (mut s, t0) = selected(p(100.0, 100.0), p(300.0, 250.0));
        let inside = p(200.0, 180.0);
        s.pointer_down(inside, 1, t0 + Duration::from_secs(1));
        s.pointer_up(inside);
        s.take_dirty();

        s.clear_selection();
        assert_eq!(s.selection(), None);
        assert_eq!(s.phase(), SurfacePhase::IdleNoSelection);
        assert!(s.take_dirty());

        // the quick second press now starts a fresh box instead of confirming
        let next = s.pointer_down(inside, 1, t0 + Duration::from_millis(1100));
        assert_eq!(next, Some(SurfaceEvent::StartNewSelection));

        let mut idle = surface();
        idle.take_dirty();
        idle.clear_selection();
        assert!(!idle.take_dirty());
    }

    #[test]
    fn escape_cancels_in_every_phase() {
        let mut s = surface();
        assert_eq!(s.handle(SurfaceInput::Cancel), Some(SurfaceEvent::Cancel));
        s.pointer_down(p(1.0, 1.0), 1, Instant::now());
        assert_eq!(s.handle(SurfaceInput::Cancel), Some(SurfaceEvent::Cancel));
    }

    #[test]
    fn drag_without_button_does_nothing() {
        let mut s = surface();
        s.take_dirty();
        s.pointer_drag(p(50.0, 50.0));
        assert_eq!(s.selection(), None);
        assert!(!s.take_dirty());
    }

    #[test]
    fn hover_cursor_policy() {
        let mut s = surface();
        s.pointer_move(p(10.0, 10.0));
        assert_eq!(s.cursor(), CursorIcon::Crosshair);

        let (mut s, _) = selected(p(100.0, 100.0), p(300.0, 250.0));
        s.pointer_move(p(200.0, 175.0));
        assert_eq!(s.cursor(), CursorIcon::OpenHand);
        s.pointer_move(p(101.0, 99.0));
        assert_eq!(s.cursor(), CursorIcon::ResizeNwse);
        s.pointer_move(p(300.0, 100.0));
        assert_eq!(s.cursor(), CursorIcon::ResizeNesw);
        s.pointer_move(p(200.0, 252.0));
        assert_eq!(s.cursor(), CursorIcon::ResizeVertical);
        s.pointer_move(p(97.0, 175.0));
        assert_eq!(s.cursor(), CursorIcon::ResizeHorizontal);
        s.pointer_move(p(700.0, 700.0));
        assert_eq!(s.cursor(), CursorIcon::Crosshair);
    }

    #[test]
    fn grabbing_cursor_while_moving() {
        let (mut s, t0) = selected(p(100.0, 100.0), p(300.0, 250.0));
        s.pointer_down(p(200.0, 175.0), 1, t0 + Duration::from_secs(1));
        assert_eq!(s.cursor(), CursorIcon::ClosedHand);
        s.pointer_up(p(200.0, 175.0));
        assert_eq!(s.cursor(), CursorIcon::OpenHand);
    }
}
