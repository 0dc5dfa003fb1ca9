// src/selection_logic.rs
// Pure geometry for the selection surface. No window or image types here.

/// A point in a display's local space: top-left origin, y grows downward.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const fn new(x: f64, y: f64) -> Self {
        Point { x, y }
    }

    pub fn offset(self, dx: f64, dy: f64) -> Self {
        Point::new(self.x + dx, self.y + dy)
    }

    pub fn distance(self, other: Point) -> f64 {
        (self.x - other.x).hypot(self.y - other.y)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Size {
    pub width: f64,
    pub height: f64,
}

impl Size {
    pub const fn new(width: f64, height: f64) -> Self {
        Size { width, height }
    }
}

/// Normalized box: `width` and `height` are never negative.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Rect { x, y, width, height }
    }

    /// Box spanned by two arbitrary corners.
    pub fn from_points(a: Point, b: Point) -> Self {
        Rect {
            x: a.x.min(b.x),
            y: a.y.min(b.y),
            width: (b.x - a.x).abs(),
            height: (b.y - a.y).abs(),
        }
    }

    pub fn from_size(size: Size) -> Self {
        Rect::new(0.0, 0.0, size.width, size.height)
    }

    pub fn min_x(&self) -> f64 {
        self.x
    }

    pub fn min_y(&self) -> f64 {
        self.y
    }

    pub fn max_x(&self) -> f64 {
        self.x + self.width
    }

    pub fn max_y(&self) -> f64 {
        self.y + self.height
    }

    pub fn mid_x(&self) -> f64 {
        self.x + self.width / 2.0
    }

    pub fn mid_y(&self) -> f64 {
        self.y + self.height / 2.0
    }

    pub fn origin(&self) -> Point {
        Point::new(self.x, self.y)
    }

    pub fn size(&self) -> Size {
        Size::new(self.width, self.height)
    }

    /// Half-open containment: the max edges are outside.
    pub fn contains(&self, p: Point) -> bool {
        p.x >= self.min_x() && p.x < self.max_x() && p.y >= self.min_y() && p.y < self.max_y()
    }

    pub fn contains_rect(&self, other: &Rect) -> bool {
        other.min_x() >= self.min_x()
            && other.min_y() >= self.min_y()
            && other.max_x() <= self.max_x()
            && other.max_y() <= self.max_y()
    }

    pub fn offset(&self, dx: f64, dy: f64) -> Rect {
        Rect::new(self.x + dx, self.y + dy, self.width, self.height)
    }

    /// Overlap of two boxes, `None` when they do not overlap with a positive area.
    pub fn intersection(&self, other: &Rect) -> Option<Rect> {
        let x0 = self.min_x().max(other.min_x());
        let y0 = self.min_y().max(other.min_y());
        let x1 = self.max_x().min(other.max_x());
        let y1 = self.max_y().min(other.max_y());
        if x0 < x1 && y0 < y1 {
            Some(Rect::new(x0, y0, x1 - x0, y1 - y0))
        } else {
            None
        }
    }

    pub fn scaled(&self, factor: f64) -> Rect {
        Rect::new(
            self.x * factor,
            self.y * factor,
            self.width * factor,
            self.height * factor,
        )
    }
}

/// A selection held as two points in insertion order. `origin` is where the
/// drag started and need not be the numerically smaller corner.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SelectionRect {
    pub origin: Point,
    pub end: Point,
}

impl SelectionRect {
    pub fn new(origin: Point, end: Point) -> Self {
        SelectionRect { origin, end }
    }

    pub fn from_rect(rect: Rect) -> Self {
        SelectionRect {
            origin: rect.origin(),
            end: Point::new(rect.max_x(), rect.max_y()),
        }
    }

    pub fn rect(&self) -> Rect {
        Rect::from_points(self.origin, self.end)
    }

    /// Sub-pixel selections are never confirmed.
    pub fn is_empty(&self) -> bool {
        let r = self.rect();
        r.width < 1.0 || r.height < 1.0
    }

    /// Local logical points to source-image pixels.
    pub fn image_rect(&self, scale_factor: f64) -> Rect {
        self.rect().scaled(scale_factor)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResizeHandle {
    TopLeft,
    TopRight,
    BottomLeft,
    BottomRight,
    TopMiddle,
    BottomMiddle,
    LeftMiddle,
    RightMiddle,
}

impl ResizeHandle {
    pub const ALL: [ResizeHandle; 8] = [
        ResizeHandle::TopLeft,
        ResizeHandle::TopRight,
        ResizeHandle::BottomLeft,
        ResizeHandle::BottomRight,
        ResizeHandle::TopMiddle,
        ResizeHandle::BottomMiddle,
        ResizeHandle::LeftMiddle,
        ResizeHandle::RightMiddle,
    ];

    pub fn is_corner(self) -> bool {
        matches!(
            self,
            ResizeHandle::TopLeft
                | ResizeHandle::TopRight
                | ResizeHandle::BottomLeft
                | ResizeHandle::BottomRight
        )
    }

    pub fn center(self, rect: &Rect) -> Point {
        match self {
            ResizeHandle::TopLeft => Point::new(rect.min_x(), rect.min_y()),
            ResizeHandle::TopRight => Point::new(rect.max_x(), rect.min_y()),
            ResizeHandle::BottomLeft => Point::new(rect.min_x(), rect.max_y()),
            ResizeHandle::BottomRight => Point::new(rect.max_x(), rect.max_y()),
            ResizeHandle::TopMiddle => Point::new(rect.mid_x(), rect.min_y()),
            ResizeHandle::BottomMiddle => Point::new(rect.mid_x(), rect.max_y()),
            ResizeHandle::LeftMiddle => Point::new(rect.min_x(), rect.mid_y()),
            ResizeHandle::RightMiddle => Point::new(rect.max_x(), rect.mid_y()),
        }
    }

    /// Handle under `p`, corners first.
    pub fn hit_test(rect: &Rect, p: Point, radius: f64) -> Option<ResizeHandle> {
        let corners = Self::ALL.iter().filter(|h| h.is_corner());
        let edges = Self::ALL.iter().filter(|h| !h.is_corner());
        corners
            .chain(edges)
            .copied()
            .find(|h| h.center(rect).distance(p) <= radius)
    }

    /// Replace the edges this handle controls with `p`, then renormalize so a
    /// handle dragged past the opposite edge flips the box.
    pub fn resize(self, rect: &Rect, p: Point) -> Rect {
        let (mut min_x, mut max_x) = (rect.min_x(), rect.max_x());
        let (mut min_y, mut max_y) = (rect.min_y(), rect.max_y());

        match self {
            ResizeHandle::TopLeft => {
                min_x = p.x;
                min_y = p.y;
            }
            ResizeHandle::TopRight => {
                max_x = p.x;
                min_y = p.y;
            }
            ResizeHandle::BottomLeft => {
                min_x = p.x;
                max_y = p.y;
            }
            ResizeHandle::BottomRight => {
                max_x = p.x;
                max_y = p.y;
            }
            ResizeHandle::TopMiddle => min_y = p.y,
            ResizeHandle::BottomMiddle => max_y = p.y,
            ResizeHandle::LeftMiddle => min_x = p.x,
            ResizeHandle::RightMiddle => max_x = p.x,
        }

        Rect::from_points(Point::new(min_x, min_y), Point::new(max_x, max_y))
    }
}

/// Shift `rect` back inside `bounds`, each axis on its own. Size is unchanged.
pub fn clamp_rect(rect: Rect, bounds: &Rect) -> Rect {
    let mut r = rect;
    if r.min_x() < bounds.min_x() {
        r.x = bounds.min_x();
    }
    if r.min_y() < bounds.min_y() {
        r.y = bounds.min_y();
    }
    if r.max_x() > bounds.max_x() {
        r.x = bounds.max_x() - r.width;
    }
    if r.max_y() > bounds.max_y() {
        r.y = bounds.max_y() - r.height;
    }
    r
}

#[cfg(test)]
mod tests {
    use super::*;

    fn p(x: f64, y: f64) -> Point {
        Point::new(x, y)
    }

    #[test]
    fn normalize_is_order_independent() {
        let pairs = [
            (p(10.0, 10.0), p(110.0, 60.0)),
            (p(110.0, 60.0), p(10.0, 10.0)),
            (p(-5.0, 40.0), p(30.0, -2.5)),
            (p(7.0, 7.0), p(7.0, 7.0)),
        ];
        for (a, b) in pairs {
            let ab = SelectionRect::new(a, b).rect();
            let ba = SelectionRect::new(b, a).rect();
            assert_eq!(ab, ba);
            assert!(ab.width >= 0.0 && ab.height >= 0.0);
        }
    }

    #[test]
    fn empty_below_one_unit() {
        assert!(SelectionRect::new(p(5.0, 5.0), p(5.0, 5.0)).is_empty());
        assert!(SelectionRect::new(p(5.0, 5.0), p(5.9, 80.0)).is_empty());
        assert!(SelectionRect::new(p(5.0, 5.0), p(80.0, 5.5)).is_empty());
        assert!(!SelectionRect::new(p(5.0, 5.0), p(6.0, 6.0)).is_empty());
    }

    #[test]
    fn image_rect_scales_every_field() {
        let sel = SelectionRect::from_rect(Rect::new(10.0, 10.0, 100.0, 50.0));
        assert_eq!(sel.image_rect(2.0), Rect::new(20.0, 20.0, 200.0, 100.0));
        assert_eq!(sel.image_rect(1.0), Rect::new(10.0, 10.0, 100.0, 50.0));
    }

    #[test]
    fn from_rect_round_trips() {
        let r = Rect::new(3.0, 4.0, 50.0, 60.0);
        assert_eq!(SelectionRect::from_rect(r).rect(), r);
    }

    #[test]
    fn handle_centers() {
        let r = Rect::new(0.0, 0.0, 100.0, 50.0);
        assert_eq!(ResizeHandle::TopLeft.center(&r), p(0.0, 0.0));
        assert_eq!(ResizeHandle::BottomRight.center(&r), p(100.0, 50.0));
        assert_eq!(ResizeHandle::TopMiddle.center(&r), p(50.0, 0.0));
        assert_eq!(ResizeHandle::LeftMiddle.center(&r), p(0.0, 25.0));
        assert_eq!(ResizeHandle::RightMiddle.center(&r), p(100.0, 25.0));
    }

    #[test]
    fn corners_win_over_edges() {
        // tiny box: every edge midpoint is within reach of a corner too
        let r = Rect::new(0.0, 0.0, 10.0, 10.0);
        let hit = ResizeHandle::hit_test(&r, p(2.0, 0.0), 8.0);
        assert_eq!(hit, Some(ResizeHandle::TopLeft));
    }

    #[test]
    fn hit_test_misses_far_points() {
        let r = Rect::new(100.0, 100.0, 200.0, 100.0);
        assert_eq!(ResizeHandle::hit_test(&r, p(200.0, 150.0), 8.0), None);
        assert_eq!(
            ResizeHandle::hit_test(&r, p(200.0, 105.0), 8.0),
            Some(ResizeHandle::TopMiddle)
        );
        assert_eq!(ResizeHandle::hit_test(&r, p(200.0, 109.0), 8.0), None);
    }

    #[test]
    fn resize_past_opposite_edge_flips() {
        let r = Rect::new(10.0, 10.0, 100.0, 50.0);
        let flipped = ResizeHandle::RightMiddle.resize(&r, p(0.0, 999.0));
        assert_eq!(flipped, Rect::new(0.0, 10.0, 10.0, 50.0));
    }

    #[test]
    fn resize_then_opposite_handle_back_restores() {
        let original = Rect::new(10.0, 10.0, 100.0, 50.0);
        for handle in ResizeHandle::ALL {
            let start = handle.center(&original);
            // far enough to flip for every handle
            let target = p(-200.0, -200.0);
            let resized = handle.resize(&original, target);
            let moved_to = Point::new(
                if start.x == original.mid_x() { start.x } else { target.x },
                if start.y == original.mid_y() { start.y } else { target.y },
            );
            let back = ResizeHandle::hit_test(&resized, moved_to, 0.5)
                .expect("a handle sits where the drag ended");
            assert_eq!(back.resize(&resized, start), original, "{handle:?}");
        }
    }

    #[test]
    fn clamp_keeps_size_and_stays_inside() {
        let bounds = Rect::new(0.0, 0.0, 800.0, 600.0);
        for (dx, dy) in [(-500.0, 0.0), (900.0, 20.0), (0.0, -700.0), (1e4, 1e4)] {
            let moved = Rect::new(100.0, 100.0, 200.0, 150.0).offset(dx, dy);
            let clamped = clamp_rect(moved, &bounds);
            assert!(bounds.contains_rect(&clamped), "{clamped:?}");
            assert_eq!(clamped.size(), Size::new(200.0, 150.0));
        }
    }

    #[test]
    fn intersection_rejects_disjoint_boxes() {
        let a = Rect::new(0.0, 0.0, 10.0, 10.0);
        assert_eq!(a.intersection(&Rect::new(10.0, 0.0, 5.0, 5.0)), None);
        assert_eq!(
            a.intersection(&Rect::new(5.0, 5.0, 10.0, 10.0)),
            Some(Rect::new(5.0, 5.0, 5.0, 5.0))
        );
    }
}
