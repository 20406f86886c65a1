//! Measurement expressed in both logical units and device pixels.

use crate::geometry::Size;
use crate::unit::{Dp, Px};

/// Pixel value meaning "unconstrained / unknown" along an axis.
pub const UNCONSTRAINED: f32 = -1.0;

/// A measurement carried in logical units and device pixels at once.
///
/// Pixel dimensions are always whole numbers (or one of the sentinels
/// [`UNCONSTRAINED`] and `f32::INFINITY`), so a pixel size taken from a
/// `ScaledSize` can be used directly as a cache key.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ScaledSize {
    pub units: Size,
    pub pixels: Size,
    pub scale: f32,
    /// The measured content was truncated horizontally.
    pub width_cut: bool,
    /// The measured content was truncated vertically.
    pub height_cut: bool,
}

impl Default for ScaledSize {
    fn default() -> Self {
        Self {
            units: Size::ZERO,
            pixels: Size::ZERO,
            scale: 1.0,
            width_cut: false,
            height_cut: false,
        }
    }
}

impl ScaledSize {
    /// Zero-sized measurement at the given scale.
    pub fn empty(scale: f32) -> Self {
        Self {
            scale: normalize_scale(scale),
            ..Self::default()
        }
    }

    /// Builds a measurement from logical units.
    ///
    /// NaN becomes the unconstrained sentinel, infinity stays infinite in
    /// pixels, anything that would land below zero pixels becomes
    /// [`UNCONSTRAINED`].
    pub fn from_units(width: f32, height: f32, scale: f32) -> Self {
        let scale = normalize_scale(scale);
        let width = nan_to_unconstrained(width);
        let height = nan_to_unconstrained(height);

        Self {
            units: Size::new(width, height),
            pixels: Size::new(
                unit_to_pixel(width, scale),
                unit_to_pixel(height, scale),
            ),
            scale,
            width_cut: false,
            height_cut: false,
        }
    }

    /// Builds a measurement from device pixels.
    ///
    /// Pixels are rounded to whole values before they are stored and before the
    /// logical size is derived from them.
    pub fn from_pixels(
        width: f32,
        height: f32,
        width_cut: bool,
        height_cut: bool,
        scale: f32,
    ) -> Self {
        let scale = normalize_scale(scale);
        let width = quantize_pixel(width);
        let height = quantize_pixel(height);

        Self {
            units: Size::new(pixel_to_unit(width, scale), pixel_to_unit(height, scale)),
            pixels: Size::new(width, height),
            scale,
            width_cut,
            height_cut,
        }
    }

    pub fn from_dp(width: Dp, height: Dp, density: f32) -> Self {
        Self::from_units(width.0, height.0, density)
    }

    pub fn from_pixel_size(size: Size, scale: f32) -> Self {
        Self::from_pixels(size.width, size.height, false, false, scale)
    }

    /// Copy of this measurement with different cut flags.
    pub fn with_cut(&self, width_cut: bool, height_cut: bool) -> Self {
        Self {
            width_cut,
            height_cut,
            ..*self
        }
    }

    /// True iff the pixel size is exactly zero along both axes.
    pub fn is_empty(&self) -> bool {
        self.pixels.is_zero()
    }

    pub fn width_px(&self) -> Px {
        Px(self.pixels.width)
    }

    pub fn height_px(&self) -> Px {
        Px(self.pixels.height)
    }

    /// Whole-pixel extent, or `None` while either axis is unconstrained or
    /// infinite.
    pub fn pixel_extent(&self) -> Option<(u32, u32)> {
        let Size { width, height } = self.pixels;
        if width.is_finite() && height.is_finite() && width >= 0.0 && height >= 0.0 {
            Some((width as u32, height as u32))
        } else {
            None
        }
    }

    /// Snaps a logical coordinate onto the device pixel grid.
    pub fn snap_to_pixel(point: f32, scale: f32) -> f32 {
        let scale = normalize_scale(scale);
        (point * scale).round_ties_even() / scale
    }
}

fn normalize_scale(scale: f32) -> f32 {
    if scale.is_finite() && scale > 0.0 {
        scale
    } else {
        1.0
    }
}

fn nan_to_unconstrained(value: f32) -> f32 {
    if value.is_nan() {
        UNCONSTRAINED
    } else {
        value
    }
}

fn unit_to_pixel(units: f32, scale: f32) -> f32 {
    if units.is_infinite() {
        return f32::INFINITY;
    }
    let pixels = units * scale;
    if pixels < 0.0 {
        UNCONSTRAINED
    } else {
        pixels.round_ties_even()
    }
}

fn quantize_pixel(pixels: f32) -> f32 {
    let pixels = nan_to_unconstrained(pixels).round_ties_even();
    if pixels < 0.0 {
        UNCONSTRAINED
    } else {
        pixels
    }
}

fn pixel_to_unit(pixels: f32, scale: f32) -> f32 {
    let units = pixels / scale;
    if units < 0.0 {
        UNCONSTRAINED
    } else {
        units
    }
}

#[cfg(test)]
#[path = "tests/scaled_size_tests.rs"]
mod tests;
