//! Floating Save / Copy / Cancel bar shown next to a committed selection.

use tiny_skia::{Color, Paint, Pixmap};

use crate::constants::{SELECTION_BORDER_COLOR, TOOLBAR_MARGIN};
use crate::overlay::{draw_text, fill, text_size};
use crate::selection_logic::{Point, Rect, Size};

const GLYPH_SCALE: u32 = 2;
const PADDING: f64 = 8.0;
const SPACING: f64 = 8.0;
const BUTTON_PAD_X: f64 = 10.0;
const BUTTON_PAD_Y: f64 = 6.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToolbarAction {
    Save,
    Copy,
    Cancel,
}

impl ToolbarAction {
    pub const ALL: [ToolbarAction; 3] =
        [ToolbarAction::Save, ToolbarAction::Copy, ToolbarAction::Cancel];

    pub fn label(self) -> &'static str {
        match self {
            ToolbarAction::Save => "Save",
            ToolbarAction::Copy => "Copy",
            ToolbarAction::Cancel => "Cancel",
        }
    }
}

fn button_size(action: ToolbarAction) -> Size {
    let text = text_size(action.label(), GLYPH_SCALE);
    Size::new(text.width + BUTTON_PAD_X * 2.0, text.height + BUTTON_PAD_Y * 2.0)
}

/// Toolbar instance living on one display's surface, in that surface's
/// local coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Toolbar {
    display: usize,
    origin: Point,
}

impl Toolbar {
    /// Overall size, independent of where it is shown.
    pub fn size() -> Size {
        let mut width = PADDING * 2.0 + SPACING * (ToolbarAction::ALL.len() - 1) as f64;
        let mut height: f64 = 0.0;
        for action in ToolbarAction::ALL {
            let b = button_size(action);
            width += b.width;
            height = height.max(b.height);
        }
        Size::new(width, height + PADDING * 2.0)
    }

    /// Toolbar for `display`, anchored to `selection` inside `bounds`.
    pub fn anchored(display: usize, selection: &Rect, bounds: &Rect) -> Self {
        Toolbar {
            display,
            origin: place(selection, Self::size(), bounds, TOOLBAR_MARGIN),
        }
    }

    pub fn display(&self) -> usize {
        self.display
    }

    pub fn frame(&self) -> Rect {
        let size = Self::size();
        Rect::new(self.origin.x, self.origin.y, size.width, size.height)
    }

    pub fn contains(&self, p: Point) -> bool {
        self.frame().contains(p)
    }

    pub fn button_frames(&self) -> [(ToolbarAction, Rect); 3] {
        let mut x = self.origin.x + PADDING;
        let y = self.origin.y + PADDING;
        ToolbarAction::ALL.map(|action| {
            let size = button_size(action);
            let r = Rect::new(x, y, size.width, size.height);
            x += size.width + SPACING;
            (action, r)
        })
    }

    pub fn hit_test(&self, p: Point) -> Option<ToolbarAction> {
        self.button_frames()
            .into_iter()
            .find(|(_, r)| r.contains(p))
            .map(|(action, _)| action)
    }

    pub fn draw(&self, frame: &mut Pixmap) {
        let mut bg = Paint::default();
        bg.set_color_rgba8(40, 40, 40, 230);
        fill(frame, &self.frame(), &bg);

        let (r, g, b) = SELECTION_BORDER_COLOR;
        for (action, rect) in self.button_frames() {
            let mut face = Paint::default();
            match action {
                ToolbarAction::Save => face.set_color_rgba8(r, g, b, 255),
                _ => face.set_color_rgba8(85, 85, 85, 255),
            }
            fill(frame, &rect, &face);
            draw_text(
                frame,
                action.label(),
                rect.x + BUTTON_PAD_X,
                rect.y + BUTTON_PAD_Y,
                GLYPH_SCALE,
                Color::WHITE,
            );
        }
    }
}

/// Top-left corner for a bar of `size` next to `selection`.
///
/// Left-aligned with the selection and kept `margin` away from both side
/// edges. Goes below the selection when it fits, above when that fits,
/// otherwise below clamped into the bounds.
pub fn place(selection: &Rect, size: Size, bounds: &Rect, margin: f64) -> Point {
    let x = selection
        .min_x()
        .max(bounds.min_x() + margin)
        .min(bounds.max_x() - size.width - margin);

    let below = selection.max_y() + margin;
    let above = selection.min_y() - size.height - margin;
    let y = if below + size.height <= bounds.max_y() - margin {
        below
    } else if above >= bounds.min_y() + margin {
        above
    } else {
        below
            .min(bounds.max_y() - size.height - margin)
            .max(bounds.min_y() + margin)
    };

    Point::new(x, y)
}

#[cfg(test)]
mod tests {
    use super::*;

    const BOUNDS: Rect = Rect {
        x: 0.0,
        y: 0.0,
        width: 1000.0,
        height: 800.0,
    };
    const BAR: Size = Size::new(300.0, 40.0);

    #[test]
    fn sits_below_selection() {
        let sel = Rect::new(100.0, 100.0, 200.0, 150.0);
        assert_eq!(place(&sel, BAR, &BOUNDS, 8.0), Point::new(100.0, 258.0));
    }

    #[test]
    fn flips_above_near_bottom() {
        let sel = Rect::new(100.0, 500.0, 200.0, 280.0);
        assert_eq!(place(&sel, BAR, &BOUNDS, 8.0), Point::new(100.0, 452.0));
    }

    #[test]
    fn clamps_when_selection_fills_height() {
        let sel = Rect::new(100.0, 20.0, 200.0, 770.0);
        let p = place(&sel, BAR, &BOUNDS, 8.0);
        assert_eq!(p.y, 800.0 - 40.0 - 8.0);
    }

    #[test]
    fn stays_clear_of_side_edges() {
        let right = Rect::new(900.0, 100.0, 90.0, 50.0);
        assert_eq!(place(&right, BAR, &BOUNDS, 8.0).x, 1000.0 - 300.0 - 8.0);

        let left = Rect::new(2.0, 100.0, 90.0, 50.0);
        assert_eq!(place(&left, BAR, &BOUNDS, 8.0).x, 8.0);
    }

    #[test]
    fn buttons_are_ordered_and_hit() {
        let bar = Toolbar::anchored(0, &Rect::new(100.0, 100.0, 200.0, 150.0), &BOUNDS);
        let frames = bar.button_frames();
        assert_eq!(frames.map(|(a, _)| a), ToolbarAction::ALL);
        assert!(frames[0].1.max_x() < frames[1].1.min_x());
        assert!(bar.frame().contains_rect(&frames[2].1));

        for (action, r) in frames {
            let center = Point::new(r.mid_x(), r.mid_y());
            assert_eq!(bar.hit_test(center), Some(action));
        }
        // padding around the buttons is not a button
        assert_eq!(bar.hit_test(bar.frame().origin().offset(2.0, 2.0)), None);
        assert!(bar.contains(bar.frame().origin().offset(2.0, 2.0)));
    }

    #[test]
    fn size_fits_labels() {
        let size = Toolbar::size();
        // "Save" + "Copy" + "Cancel" at 16px per glyph, padded
        let labels = 64.0 + 64.0 + 96.0;
        assert_eq!(
            size.width,
            labels + 6.0 * BUTTON_PAD_X + 2.0 * SPACING + 2.0 * PADDING
        );
        assert_eq!(size.height, 16.0 + 2.0 * BUTTON_PAD_Y + 2.0 * PADDING);
    }
}
