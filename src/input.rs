//! Turns polled window state (pointer position, button level) into discrete
//! surface input.

use std::time::{Duration, Instant};

use crate::constants::DOUBLE_CLICK_INTERVAL;
use crate::selection::SurfaceInput;
use crate::selection_logic::Point;

/// Presses further apart than this never count as a multi-click.
const CLICK_SLOP: f64 = 4.0;

#[derive(Debug, Clone)]
pub struct PointerTracker {
    was_down: bool,
    last_pos: Option<Point>,
    last_press: Option<(Instant, Point)>,
    click_count: u32,
    interval: Duration,
}

impl Default for PointerTracker {
    fn default() -> Self {
        Self::new(DOUBLE_CLICK_INTERVAL)
    }
}

impl PointerTracker {
    pub fn new(interval: Duration) -> Self {
        PointerTracker {
            was_down: false,
            last_pos: None,
            last_press: None,
            click_count: 0,
            interval,
        }
    }

    /// Feed one poll. `position` is `None` while the pointer is outside the
    /// window.
    pub fn update(
        &mut self,
        position: Option<Point>,
        down: bool,
        now: Instant,
    ) -> Option<SurfaceInput> {
        let previous = self.last_pos;
        if position.is_some() {
            self.last_pos = position;
        }
        let moved = position.is_some() && position != previous;

        let input = match (self.was_down, down) {
            (false, true) => {
                let point = position?;
                self.click_count = match self.last_press {
                    Some((t, p))
                        if now.saturating_duration_since(t) < self.interval
                            && p.distance(point) <= CLICK_SLOP =>
                    {
                        self.click_count + 1
                    }
                    _ => 1,
                };
                self.last_press = Some((now, point));
                Some(SurfaceInput::PointerDown {
                    point,
                    click_count: self.click_count,
                    at: now,
                })
            }
            (true, true) => {
                moved.then(|| SurfaceInput::PointerDrag(self.last_pos.unwrap_or_default()))
            }
            (true, false) => self.last_pos.map(SurfaceInput::PointerUp),
            (false, false) => {
                moved.then(|| SurfaceInput::PointerMove(self.last_pos.unwrap_or_default()))
            }
        };

        self.was_down = down;
        input
    }
}
