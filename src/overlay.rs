//! Software rendering of one selection surface.
//!
//! A frame is drawn from scratch on every invalidation: captured screen,
//! dimming layer, bright cutout over the selection, border, size label and,
//! once the selection is committed, the eight resize handles.

use font8x8::{BASIC_FONTS, LATIN_FONTS, UnicodeFonts};
use image::RgbaImage;
use tiny_skia::{
    BlendMode, Color, FilterQuality, IntSize, Paint, PathBuilder, Pattern, Pixmap, PixmapPaint,
    SpreadMode, Stroke, Transform,
};

use crate::constants::{
    HANDLE_BORDER_WIDTH, HANDLE_SIZE, LABEL_GAP, LABEL_GLYPH_SCALE, LABEL_PADDING,
    OVERLAY_DIM_ALPHA, SELECTION_BORDER_COLOR, SELECTION_BORDER_WIDTH,
};
use crate::selection::SelectionSurface;
use crate::selection_logic::{Rect, ResizeHandle, Size};
use crate::toolbar::Toolbar;

#[derive(Debug, Clone, Copy)]
pub struct OverlayStyle {
    pub dim_alpha: f32,
    pub border_color: Color,
    pub border_width: f32,
    pub handle_size: f32,
    pub handle_border_width: f32,
    pub label_scale: u32,
}

impl Default for OverlayStyle {
    fn default() -> Self {
        let (r, g, b) = SELECTION_BORDER_COLOR;
        OverlayStyle {
            dim_alpha: OVERLAY_DIM_ALPHA,
            border_color: Color::from_rgba8(r, g, b, 255),
            border_width: SELECTION_BORDER_WIDTH,
            handle_size: HANDLE_SIZE,
            handle_border_width: HANDLE_BORDER_WIDTH,
            label_scale: LABEL_GLYPH_SCALE,
        }
    }
}

/// The captured screen, resampled once to the surface's logical size.
pub struct Backdrop {
    pixmap: Pixmap,
}

impl Backdrop {
    pub fn from_image(image: &RgbaImage, size: Size) -> Option<Self> {
        let (w, h) = (image.width(), image.height());
        let mut data = image.as_raw().clone();
        // screens are opaque; this also makes the buffer valid premultiplied data
        for px in data.chunks_exact_mut(4) {
            px[3] = 255;
        }
        let source = Pixmap::from_vec(data, IntSize::from_wh(w, h)?)?;

        let tw = size.width.round().max(1.0) as u32;
        let th = size.height.round().max(1.0) as u32;
        if (tw, th) == (w, h) {
            return Some(Backdrop { pixmap: source });
        }

        let mut pixmap = Pixmap::new(tw, th)?;
        let paint = PixmapPaint {
            quality: FilterQuality::Bilinear,
            ..PixmapPaint::default()
        };
        pixmap.draw_pixmap(
            0,
            0,
            source.as_ref(),
            &paint,
            Transform::from_scale(tw as f32 / w as f32, th as f32 / h as f32),
            None,
        );
        Some(Backdrop { pixmap })
    }

    pub fn width(&self) -> u32 {
        self.pixmap.width()
    }

    pub fn height(&self) -> u32 {
        self.pixmap.height()
    }
}

/// Draw a full frame for `surface`. `scale` is the display's pixel scale and
/// only feeds the size readout.
pub fn render(
    surface: &SelectionSurface,
    backdrop: &Backdrop,
    scale: f64,
    style: &OverlayStyle,
    toolbar: Option<&Toolbar>,
) -> Option<Pixmap> {
    let mut frame = Pixmap::new(backdrop.width(), backdrop.height())?;
    let bounds = Rect::new(0.0, 0.0, frame.width() as f64, frame.height() as f64);

    frame.draw_pixmap(
        0,
        0,
        backdrop.pixmap.as_ref(),
        &PixmapPaint::default(),
        Transform::identity(),
        None,
    );

    let mut dim = Paint::default();
    dim.set_color(Color::from_rgba(0.0, 0.0, 0.0, style.dim_alpha.clamp(0.0, 1.0))?);
    fill(&mut frame, &bounds, &dim);

    if let Some(sel) = surface.selection().filter(|s| !s.is_empty()) {
        let rect = sel.rect();

        // cutout: replace the dimmed pixels with the raw capture
        let cutout = Paint {
            shader: Pattern::new(
                backdrop.pixmap.as_ref(),
                SpreadMode::Pad,
                FilterQuality::Nearest,
                1.0,
                Transform::identity(),
            ),
            blend_mode: BlendMode::Source,
            anti_alias: false,
            ..Paint::default()
        };
        fill(&mut frame, &rect, &cutout);

        let mut border = Paint::default();
        border.set_color(style.border_color);
        border.anti_alias = true;
        stroke(&mut frame, &rect, &border, style.border_width);

        draw_size_label(&mut frame, &rect, scale, style.label_scale, &bounds);

        if surface.is_finalized() {
            draw_handles(&mut frame, &rect, style);
        }
    }

    if let Some(toolbar) = toolbar {
        toolbar.draw(&mut frame);
    }

    Some(frame)
}

/// "W × H" in physical pixels.
pub fn size_label_text(rect: &Rect, scale: f64) -> String {
    let w = (rect.width * scale) as i64;
    let h = (rect.height * scale) as i64;
    format!("{w} × {h}")
}

/// Label box just below the selection, flipped above when it does not fit,
/// clamped inside `bounds` when neither fits.
pub fn label_frame(selection: &Rect, label: Size, bounds: &Rect) -> Rect {
    let x = selection
        .min_x()
        .min(bounds.max_x() - label.width)
        .max(bounds.min_x());

    let below = selection.max_y() + LABEL_GAP;
    let above = selection.min_y() - LABEL_GAP - label.height;
    let y = if below + label.height <= bounds.max_y() {
        below
    } else if above >= bounds.min_y() {
        above
    } else {
        below
            .min(bounds.max_y() - label.height)
            .max(bounds.min_y())
    };

    Rect::new(x, y, label.width, label.height)
}

fn draw_size_label(frame: &mut Pixmap, rect: &Rect, scale: f64, glyph_scale: u32, bounds: &Rect) {
    let text = size_label_text(rect, scale);
    let text_size = text_size(&text, glyph_scale);
    let label = Size::new(
        text_size.width + LABEL_PADDING * 2.0,
        text_size.height + LABEL_PADDING * 2.0,
    );
    let frame_rect = label_frame(rect, label, bounds);

    let mut bg = Paint::default();
    bg.set_color_rgba8(0, 0, 0, 178);
    fill(frame, &frame_rect, &bg);

    draw_text(
        frame,
        &text,
        frame_rect.x + LABEL_PADDING,
        frame_rect.y + LABEL_PADDING,
        glyph_scale,
        Color::WHITE,
    );
}

fn draw_handles(frame: &mut Pixmap, rect: &Rect, style: &OverlayStyle) {
    let size = style.handle_size as f64;
    let mut face = Paint::default();
    face.set_color(Color::WHITE);
    let mut edge = Paint::default();
    edge.set_color(style.border_color);
    edge.anti_alias = true;

    for handle in ResizeHandle::ALL {
        let c = handle.center(rect);
        let r = Rect::new(c.x - size / 2.0, c.y - size / 2.0, size, size);
        fill(frame, &r, &face);
        stroke(frame, &r, &edge, style.handle_border_width);
    }
}

pub(crate) fn to_sk_rect(r: &Rect) -> Option<tiny_skia::Rect> {
    tiny_skia::Rect::from_xywh(r.x as f32, r.y as f32, r.width as f32, r.height as f32)
}

pub(crate) fn fill(frame: &mut Pixmap, r: &Rect, paint: &Paint) {
    if let Some(rect) = to_sk_rect(r) {
        frame.fill_rect(rect, paint, Transform::identity(), None);
    }
}

pub(crate) fn stroke(frame: &mut Pixmap, r: &Rect, paint: &Paint, width: f32) {
    let Some(rect) = to_sk_rect(r) else {
        return;
    };
    let path = PathBuilder::from_rect(rect);
    let stroke = Stroke {
        width,
        ..Stroke::default()
    };
    frame.stroke_path(&path, paint, &stroke, Transform::identity(), None);
}

/// Size of `text` drawn with the 8x8 bitmap font at `scale`.
pub fn text_size(text: &str, scale: u32) -> Size {
    let cell = 8.0 * scale as f64;
    Size::new(text.chars().count() as f64 * cell, cell)
}

pub(crate) fn draw_text(frame: &mut Pixmap, text: &str, x: f64, y: f64, scale: u32, color: Color) {
    let mut paint = Paint::default();
    paint.set_color(color);
    paint.anti_alias = false;

    let cell = scale as f64;
    let mut cursor_x = x.round();
    let top = y.round();
    for ch in text.chars() {
        let glyph = BASIC_FONTS
            .get(ch)
            .or_else(|| LATIN_FONTS.get(ch))
            .or_else(|| BASIC_FONTS.get('?'));
        if let Some(glyph) = glyph {
            for (row, bits) in glyph.iter().copied().enumerate() {
                for col in 0..8 {
                    if (bits >> col) & 1 == 0 {
                        continue;
                    }
                    let px = Rect::new(
                        cursor_x + col as f64 * cell,
                        top + row as f64 * cell,
                        cell,
                        cell,
                    );
                    fill(frame, &px, &paint);
                }
            }
        }
        cursor_x += 8.0 * cell;
    }
}

/// Pack an opaque frame as 0RGB words for a framebuffer window.
pub fn to_frame_buffer(frame: &Pixmap, out: &mut Vec<u32>) {
    out.clear();
    out.extend(frame.pixels().iter().map(|px| {
        ((px.red() as u32) << 16) | ((px.green() as u32) << 8) | px.blue() as u32
    }));
}
