// Copyright 2025 the Labelbounds Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The rendering-context seam between the estimator and text backends.

use kurbo::{Affine, Rect};

use crate::Font;

/// The configuration a measurement is taken under.
///
/// The transform is the user-to-device transform of the final render. Backends
/// may use it to snap advances to device pixels when `fractional_metrics` is
/// off; returned bounds are always in user space.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FontRenderContext {
    /// User-to-device transform.
    pub transform: Affine,
    /// Whether text is measured as if drawn anti-aliased.
    pub antialiased: bool,
    /// Whether glyph metrics keep sub-pixel precision instead of being rounded
    /// to whole device units.
    pub fractional_metrics: bool,
}

impl FontRenderContext {
    /// Creates a render context for `transform` with anti-aliasing and
    /// fractional metrics disabled.
    #[must_use]
    pub fn new(transform: Affine) -> Self {
        Self {
            transform,
            antialiased: false,
            fractional_metrics: false,
        }
    }

    /// Creates a render context for `transform` that measures with full
    /// sub-pixel precision.
    #[must_use]
    pub fn precise(transform: Affine) -> Self {
        Self {
            transform,
            antialiased: true,
            fractional_metrics: true,
        }
    }

    /// Returns the device pixels per user unit used for snapping.
    ///
    /// This is the larger singular value of the transform, so rotation and skew
    /// do not shrink it. Returns `0.0` for a degenerate transform.
    #[must_use]
    pub fn device_scale(&self) -> f64 {
        let (scale, _) = self.transform.svd();
        let scale = scale.x.abs().max(scale.y.abs());
        if scale.is_finite() { scale } else { 0.0 }
    }
}

impl Default for FontRenderContext {
    fn default() -> Self {
        Self::new(Affine::IDENTITY)
    }
}

/// Glyph metrics for the current font of a [`RenderContext`], as rendered.
///
/// The integer queries reflect native integer-rounded sizing, so summing
/// [`char_width`](Self::char_width) over a string accumulates rounding error.
/// [`string_bounds`](Self::string_bounds) is the precise counterpart.
pub trait GlyphMetrics {
    /// Returns the advance width of `ch`, rounded to whole units.
    fn char_width(&self, ch: char) -> u32;

    /// Returns the ascent, rounded to whole units.
    fn ascent(&self) -> u32;

    /// Returns the descent, rounded to whole units.
    fn descent(&self) -> u32;

    /// Returns the leading, rounded to whole units.
    fn leading(&self) -> u32 {
        0
    }

    /// Returns the total line height, saturating at `u32::MAX`.
    fn height(&self) -> u32 {
        self.ascent()
            .saturating_add(self.descent())
            .saturating_add(self.leading())
    }

    /// Returns the precise bounds of `text` at the font's real size, under the
    /// transform of the context these metrics belong to.
    ///
    /// The origin is on the baseline, so `y0` is the negated ascent.
    fn string_bounds(&self, text: &str) -> Rect;
}

/// A source of font, transform and glyph metrics for measurement.
///
/// Contexts are read-only to the estimator. A context may keep interior
/// scratch state, in which case it should not be shared across threads.
pub trait RenderContext {
    /// The glyph-metrics provider for [`font`](Self::font).
    type Metrics: GlyphMetrics + ?Sized;

    /// Returns the active font.
    fn font(&self) -> &Font;

    /// Returns the active user-to-device transform.
    fn transform(&self) -> Affine;

    /// Returns glyph metrics bound to the active font and transform.
    fn font_metrics(&self) -> &Self::Metrics;

    /// Measures the precise bounds of `text` set in `font` under `frc`.
    ///
    /// Unlike [`GlyphMetrics::string_bounds`], the font here need not be the
    /// active one.
    fn font_string_bounds(&self, font: &Font, text: &str, frc: &FontRenderContext) -> Rect;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn device_scale_ignores_rotation() {
        let frc = FontRenderContext::new(Affine::rotate(0.7).then_scale(3.0));
        assert!((frc.device_scale() - 3.0).abs() < 1e-9);
    }

    #[test]
    fn device_scale_uses_larger_axis() {
        let frc = FontRenderContext::new(Affine::scale_non_uniform(2.0, 0.5));
        assert!((frc.device_scale() - 2.0).abs() < 1e-9);
    }

    #[test]
    fn precise_enables_both_flags() {
        let frc = FontRenderContext::precise(Affine::IDENTITY);
        assert!(frc.antialiased);
        assert!(frc.fractional_metrics);
        assert!(!FontRenderContext::default().fractional_metrics);
    }

    #[test]
    fn default_height_saturates() {
        struct Tall;
        impl GlyphMetrics for Tall {
            fn char_width(&self, _: char) -> u32 {
                1
            }
            fn ascent(&self) -> u32 {
                u32::MAX - 1
            }
            fn descent(&self) -> u32 {
                2
            }
            fn leading(&self) -> u32 {
                3
            }
            fn string_bounds(&self, _: &str) -> Rect {
                Rect::ZERO
            }
        }
        assert_eq!(Tall.height(), u32::MAX);
    }
}
