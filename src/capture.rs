//! Screen capture and the pixel-space operations on captured rasters.
//!
//! Everything here talks to the OS through `xcap`; the session only sees the
//! `ScreenSource` trait so it can be driven by fakes in tests.

use std::io::Cursor;

use image::{ImageFormat, RgbaImage, imageops};
use log::{debug, warn};
use xcap::Monitor;

use crate::selection_logic::Rect;

/// One display's frozen contents plus where it sits on the desktop.
#[derive(Debug, Clone)]
pub struct CapturedDisplay {
    pub name: String,
    pub image: RgbaImage,
    /// Desktop placement in logical units.
    pub placement: Rect,
    /// Image pixels per logical unit.
    pub scale_factor: f64,
}

impl CapturedDisplay {
    /// Scale derived from the raster itself, falling back to the reported
    /// factor when the placement has no width.
    pub fn effective_scale(&self) -> f64 {
        if self.placement.width >= 1.0 {
            self.image.width() as f64 / self.placement.width
        } else {
            self.scale_factor
        }
    }
}

pub trait ScreenSource {
    /// Snapshot every connected display. An empty list is a valid result.
    fn capture_all(&mut self) -> Result<Vec<CapturedDisplay>, CaptureError>;
}

#[derive(Debug, thiserror::Error)]
pub enum CaptureError {
    #[error("Failed to enumerate monitors: {0}")]
    MonitorEnumeration(String),

    #[error("Screen capture failed: {0}")]
    CaptureFailed(String),
}

#[derive(Debug, thiserror::Error)]
pub enum CropError {
    #[error("selection {0:?} does not overlap the captured image")]
    Empty(Rect),

    #[error("PNG encoding failed: {0}")]
    Encode(#[from] image::ImageError),
}

/// Captures through `xcap`. Displays that fail to capture are skipped.
#[derive(Debug, Default)]
pub struct XcapSource;

impl XcapSource {
    fn capture_monitor(monitor: &Monitor) -> Result<CapturedDisplay, CaptureError> {
        let failed = |e: xcap::XCapError| CaptureError::CaptureFailed(e.to_string());

        let name = monitor.name().map_err(failed)?;
        let image = monitor.capture_image().map_err(failed)?;
        let x = monitor.x().map_err(failed)?;
        let y = monitor.y().map_err(failed)?;
        let scale_factor = match monitor.scale_factor().map_err(failed)? as f64 {
            s if s > 0.0 => s,
            _ => 1.0,
        };

        let placement = Rect::new(
            x as f64,
            y as f64,
            image.width() as f64 / scale_factor,
            image.height() as f64 / scale_factor,
        );
        Ok(CapturedDisplay {
            name,
            image,
            placement,
            scale_factor,
        })
    }
}

impl ScreenSource for XcapSource {
    fn capture_all(&mut self) -> Result<Vec<CapturedDisplay>, CaptureError> {
        let monitors =
            Monitor::all().map_err(|e| CaptureError::MonitorEnumeration(e.to_string()))?;

        let mut displays = Vec::with_capacity(monitors.len());
        for monitor in &monitors {
            match Self::capture_monitor(monitor) {
                Ok(display) => {
                    debug!(
                        "Captured {} ({}x{} px, scale {})",
                        display.name,
                        display.image.width(),
                        display.image.height(),
                        display.scale_factor
                    );
                    displays.push(display);
                }
                Err(e) => warn!("Skipping display: {e}"),
            }
        }
        Ok(displays)
    }
}

/// Cut `pixel_rect` out of `image`. The rect is widened to whole pixels and
/// clamped to the image first.
pub fn crop(image: &RgbaImage, pixel_rect: &Rect) -> Result<RgbaImage, CropError> {
    let x0 = pixel_rect.min_x().floor();
    let y0 = pixel_rect.min_y().floor();
    let x1 = pixel_rect.max_x().ceil();
    let y1 = pixel_rect.max_y().ceil();
    let widened = Rect::new(x0, y0, x1 - x0, y1 - y0);

    let bounds = Rect::new(0.0, 0.0, image.width() as f64, image.height() as f64);
    let clamped = widened
        .intersection(&bounds)
        .filter(|r| r.width >= 1.0 && r.height >= 1.0)
        .ok_or(CropError::Empty(*pixel_rect))?;

    Ok(imageops::crop_imm(
        image,
        clamped.x as u32,
        clamped.y as u32,
        clamped.width as u32,
        clamped.height as u32,
    )
    .to_image())
}

pub fn encode_png(image: &RgbaImage) -> Result<Vec<u8>, CropError> {
    let mut bytes = Vec::new();
    image.write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)?;
    Ok(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;

    fn gradient(w: u32, h: u32) -> RgbaImage {
        RgbaImage::from_fn(w, h, |x, y| Rgba([x as u8, y as u8, 0, 255]))
    }

    #[test]
    fn crop_takes_exact_rect() {
        let img = gradient(100, 80);
        let out = crop(&img, &Rect::new(10.0, 20.0, 30.0, 15.0)).expect("crop");
        assert_eq!(out.dimensions(), (30, 15));
        assert_eq!(out.get_pixel(0, 0), &Rgba([10, 20, 0, 255]));
        assert_eq!(out.get_pixel(29, 14), &Rgba([39, 34, 0, 255]));
    }

    #[test]
    fn crop_widens_fractional_edges() {
        let img = gradient(100, 80);
        let out = crop(&img, &Rect::new(10.5, 20.2, 9.0, 9.6)).expect("crop");
        assert_eq!(out.dimensions(), (10, 10));
        assert_eq!(out.get_pixel(0, 0), &Rgba([10, 20, 0, 255]));
    }

    #[test]
    fn crop_clamps_to_image() {
        let img = gradient(100, 80);
        let out = crop(&img, &Rect::new(90.0, -10.0, 50.0, 30.0)).expect("crop");
        assert_eq!(out.dimensions(), (10, 20));
        assert_eq!(out.get_pixel(0, 0), &Rgba([90, 0, 0, 255]));
    }

    #[test]
    fn crop_outside_image_is_an_error() {
        let img = gradient(100, 80);
        let err = crop(&img, &Rect::new(150.0, 10.0, 20.0, 20.0)).unwrap_err();
        assert!(matches!(err, CropError::Empty(_)));
    }

    #[test]
    fn png_bytes_decode_back() {
        let img = gradient(12, 7);
        let bytes = encode_png(&img).expect("encode");
        assert!(bytes.starts_with(b"\x89PNG"));
        let decoded = image::load_from_memory(&bytes).expect("decode").to_rgba8();
        assert_eq!(decoded, img);
    }

    #[test]
    fn effective_scale_prefers_raster_size() {
        let d = CapturedDisplay {
            name: "test".into(),
            image: RgbaImage::new(2000, 1600),
            placement: Rect::new(0.0, 0.0, 1000.0, 800.0),
            scale_factor: 1.0,
        };
        assert_eq!(d.effective_scale(), 2.0);
    }
}
