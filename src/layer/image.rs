// SPDX-License-Identifier: MPL-2.0
//! Raster payload: decoded pixels, display parameters and the off-screen frame.

use crate::domain::{LayerTransform, PixelPoint, Point};
use crate::error::{Error, Result};
use image_rs::{DynamicImage, GenericImageView, Rgba, RgbaImage};

/// How raw channel values are mapped to displayed colours.
#[derive(Debug, Clone, PartialEq)]
pub struct DisplayParameters {
    /// Global opacity, 0 (invisible) to 255 (opaque).
    pub alpha: u8,
    pub gamma: f64,
    pub intensity_min: f64,
    pub intensity_max: f64,
    /// Pixels whose displayed channels all fall inside the transparency
    /// window are drawn fully transparent.
    pub is_transparent: bool,
    pub transparency_min: f64,
    pub transparency_max: f64,
    pub use_alpha_channel: bool,
    pub alpha_channel_index: usize,
    pub red_index: usize,
    pub green_index: usize,
    pub blue_index: usize,
}

impl DisplayParameters {
    /// Full-range window for images whose channels top out at `channel_max`.
    #[must_use]
    pub fn for_range(channel_max: f64) -> Self {
        Self {
            alpha: 255,
            gamma: 1.0,
            intensity_min: 0.0,
            intensity_max: channel_max,
            is_transparent: false,
            transparency_min: 0.0,
            transparency_max: 0.0,
            use_alpha_channel: false,
            alpha_channel_index: 0,
            red_index: 0,
            green_index: 1,
            blue_index: 2,
        }
    }
}

/// Maps raw channel values into 8-bit RGB through the intensity window.
///
/// Single-channel images go through the gamma curve; multi-channel images
/// are windowed per channel using the red/green/blue indices.
#[derive(Debug, Clone, Copy)]
pub struct ChannelConverter {
    min: f64,
    max: f64,
    inv_gamma: f64,
    red: usize,
    green: usize,
    blue: usize,
}

impl ChannelConverter {
    pub fn new(params: &DisplayParameters) -> Result<Self> {
        let (min, max) = (params.intensity_min, params.intensity_max);
        if !min.is_finite() || !max.is_finite() || max <= min {
            return Err(Error::State(format!(
                "degenerate intensity window [{}, {}]",
                min, max
            )));
        }
        if !params.gamma.is_finite() || params.gamma <= 0.0 {
            return Err(Error::State(format!("invalid gamma {}", params.gamma)));
        }
        Ok(Self {
            min,
            max,
            inv_gamma: 1.0 / params.gamma,
            red: params.red_index,
            green: params.green_index,
            blue: params.blue_index,
        })
    }

    #[must_use]
    pub fn convert(&self, channels: &[f64]) -> [u8; 3] {
        match channels.len() {
            0 => [0, 0, 0],
            1 | 2 => {
                let magnitude = (channels[0] - self.min) / (self.max - self.min);
                let v = if magnitude <= 0.0 {
                    0
                } else if magnitude >= 1.0 {
                    255
                } else {
                    to_u8(255.0 * magnitude.powf(self.inv_gamma))
                };
                [v, v, v]
            }
            n => {
                let pick = |index: usize| channels[index.min(n - 1)];
                [
                    self.window(pick(self.red)),
                    self.window(pick(self.green)),
                    self.window(pick(self.blue)),
                ]
            }
        }
    }

    fn window(&self, v: f64) -> u8 {
        if v < self.min {
            0
        } else if v > self.max {
            255
        } else {
            to_u8(255.0 * (v - self.min) / (self.max - self.min))
        }
    }
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn to_u8(v: f64) -> u8 {
    v.round().clamp(0.0, 255.0) as u8
}

/// Raw channel values of one pixel, at most four of them.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sample {
    values: [f64; 4],
    len: usize,
}

impl Sample {
    fn from_slice<T: Copy + Into<f64>>(channels: &[T]) -> Self {
        let mut values = [0.0; 4];
        let len = channels.len().min(4);
        for (slot, v) in values.iter_mut().zip(channels.iter().take(len)) {
            *slot = (*v).into();
        }
        Self { values, len }
    }

    #[must_use]
    pub fn channels(&self) -> &[f64] {
        &self.values[..self.len]
    }
}

impl std::fmt::Display for Sample {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.channels() {
            [single] => write!(f, "{}", single),
            many => {
                write!(f, "(")?;
                for (i, v) in many.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", v)?;
                }
                write!(f, ")")
            }
        }
    }
}

#[derive(Debug, Clone)]
pub struct ImageLayer {
    pixels: DynamicImage,
    display: DisplayParameters,
    frame: Option<RgbaImage>,
}

impl ImageLayer {
    #[must_use]
    pub fn new(pixels: DynamicImage) -> Self {
        let display = DisplayParameters::for_range(channel_max(&pixels));
        Self {
            pixels,
            display,
            frame: None,
        }
    }

    #[must_use]
    pub fn pixels(&self) -> &DynamicImage {
        &self.pixels
    }

    #[must_use]
    pub fn width(&self) -> u32 {
        self.pixels.width()
    }

    #[must_use]
    pub fn height(&self) -> u32 {
        self.pixels.height()
    }

    #[must_use]
    pub fn channel_count(&self) -> usize {
        usize::from(self.pixels.color().channel_count())
    }

    /// Largest raw channel value of the pixel type (255, 65535 or 1.0).
    #[must_use]
    pub fn channel_max(&self) -> f64 {
        channel_max(&self.pixels)
    }

    #[must_use]
    pub fn display(&self) -> &DisplayParameters {
        &self.display
    }

    pub fn display_mut(&mut self) -> &mut DisplayParameters {
        &mut self.display
    }

    /// Last successfully rendered frame, sized to the view.
    #[must_use]
    pub fn frame(&self) -> Option<&RgbaImage> {
        self.frame.as_ref()
    }

    /// Raw values at a local pixel, `None` outside the image.
    #[must_use]
    pub fn sample(&self, pixel: PixelPoint) -> Option<Sample> {
        let x = u32::try_from(pixel.x).ok()?;
        let y = u32::try_from(pixel.y).ok()?;
        if x >= self.width() || y >= self.height() {
            return None;
        }
        Some(self.sample_unchecked(x, y))
    }

    fn sample_unchecked(&self, x: u32, y: u32) -> Sample {
        match &self.pixels {
            DynamicImage::ImageLuma8(buf) => Sample::from_slice(&buf.get_pixel(x, y).0),
            DynamicImage::ImageLumaA8(buf) => Sample::from_slice(&buf.get_pixel(x, y).0),
            DynamicImage::ImageRgb8(buf) => Sample::from_slice(&buf.get_pixel(x, y).0),
            DynamicImage::ImageRgba8(buf) => Sample::from_slice(&buf.get_pixel(x, y).0),
            DynamicImage::ImageLuma16(buf) => Sample::from_slice(&buf.get_pixel(x, y).0),
            DynamicImage::ImageLumaA16(buf) => Sample::from_slice(&buf.get_pixel(x, y).0),
            DynamicImage::ImageRgb16(buf) => Sample::from_slice(&buf.get_pixel(x, y).0),
            DynamicImage::ImageRgba16(buf) => Sample::from_slice(&buf.get_pixel(x, y).0),
            DynamicImage::ImageRgb32F(buf) => Sample::from_slice(&buf.get_pixel(x, y).0),
            DynamicImage::ImageRgba32F(buf) => Sample::from_slice(&buf.get_pixel(x, y).0),
            other => Sample::from_slice(&other.get_pixel(x, y).0),
        }
    }

    /// Formatted raw value at a local pixel.
    #[must_use]
    pub fn pixel_value(&self, pixel: PixelPoint) -> Option<String> {
        self.sample(pixel).map(|s| s.to_string())
    }

    /// Copies the local region spanned by two corners, clamped to the image.
    ///
    /// The corners may come in any order; the region is `[min, max)`.
    /// Returns `None` when nothing of the image lies inside.
    #[must_use]
    pub fn crop(&self, p0: PixelPoint, p1: PixelPoint) -> Option<ImageLayer> {
        let clamp_x = |v: i64| v.clamp(0, i64::from(self.width()));
        let clamp_y = |v: i64| v.clamp(0, i64::from(self.height()));
        let (x0, x1) = (clamp_x(p0.x.min(p1.x)), clamp_x(p0.x.max(p1.x)));
        let (y0, y1) = (clamp_y(p0.y.min(p1.y)), clamp_y(p0.y.max(p1.y)));
        if x1 <= x0 || y1 <= y0 {
            return None;
        }
        let x = u32::try_from(x0).ok()?;
        let y = u32::try_from(y0).ok()?;
        let width = u32::try_from(x1 - x0).ok()?;
        let height = u32::try_from(y1 - y0).ok()?;
        Some(ImageLayer {
            pixels: self.pixels.crop_imm(x, y, width, height),
            display: self.display.clone(),
            frame: None,
        })
    }

    /// Renders the view-sized RGBA frame with nearest-neighbour sampling.
    ///
    /// On failure the previous frame is kept.
    pub fn render(&mut self, transform: &LayerTransform, width: u32, height: u32) -> Result<()> {
        let converter = ChannelConverter::new(&self.display)?;
        let channel_max = self.channel_max();
        let mut frame = RgbaImage::new(width, height);
        for (vx, vy, out) in frame.enumerate_pixels_mut() {
            let local = transform.to_local(Point::new(f64::from(vx), f64::from(vy)));
            if local.x < 0.0 || local.y < 0.0 {
                continue;
            }
            #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
            let (lx, ly) = (local.x.floor() as u32, local.y.floor() as u32);
            if lx >= self.width() || ly >= self.height() {
                continue;
            }
            let sample = self.sample_unchecked(lx, ly);
            *out = self.shade(&converter, sample.channels(), channel_max);
        }
        self.frame = Some(frame);
        Ok(())
    }

    fn shade(&self, converter: &ChannelConverter, channels: &[f64], channel_max: f64) -> Rgba<u8> {
        let [r, g, b] = converter.convert(channels);
        let d = &self.display;
        if d.is_transparent && self.in_transparency_window(channels) {
            return Rgba([r, g, b, 0]);
        }
        let mut alpha = f64::from(d.alpha);
        if d.use_alpha_channel {
            if let Some(a) = channels.get(d.alpha_channel_index) {
                alpha *= (a / channel_max).clamp(0.0, 1.0);
            }
        }
        Rgba([r, g, b, to_u8(alpha)])
    }

    fn in_transparency_window(&self, channels: &[f64]) -> bool {
        let d = &self.display;
        let inside = |v: f64| v >= d.transparency_min && v <= d.transparency_max;
        match channels.len() {
            0 => false,
            1 | 2 => inside(channels[0]),
            n => [d.red_index, d.green_index, d.blue_index]
                .iter()
                .all(|&i| inside(channels[i.min(n - 1)])),
        }
    }
}

fn channel_max(pixels: &DynamicImage) -> f64 {
    match pixels {
        DynamicImage::ImageLuma16(_)
        | DynamicImage::ImageLumaA16(_)
        | DynamicImage::ImageRgb16(_)
        | DynamicImage::ImageRgba16(_) => f64::from(u16::MAX),
        DynamicImage::ImageRgb32F(_) | DynamicImage::ImageRgba32F(_) => 1.0,
        _ => f64::from(u8::MAX),
    }
}
