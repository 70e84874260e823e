// Copyright 2025 the Labelbounds Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Fast-or-exact string bounds estimation.
//!
//! Integer advance widths carry a rounding error of up to half a unit per
//! character, which is negligible for large fonts and dominant for tiny ones.
//! [`estimate_bounds`] therefore sums integer advances above a size threshold
//! and falls back to precise measurement below it. Precise measurement itself
//! switches to a reference-size font once the native integer size reaches
//! zero, and rescales the result.

use core::ops::{Deref, DerefMut};

use kurbo::Rect;

use crate::font::assert_valid_size;
use crate::{FontRenderContext, GlyphMetrics, REFERENCE_FONT_SIZE, RenderContext};

/// Integer font size thresholds that select the measurement path.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Thresholds {
    /// Integer sizes above this are estimated from integer glyph metrics.
    pub metrics_above: i32,
    /// Integer sizes above this are measured directly at the real size; at or
    /// below it the normalized-scale fallback is used.
    pub direct_above: i32,
}

impl Thresholds {
    /// The default thresholds: the fast path above size 5, the direct path
    /// above size 0.
    pub const DEFAULT: Self = Self {
        metrics_above: 5,
        direct_above: 0,
    };
}

impl Default for Thresholds {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// Bounds returned by the estimator.
///
/// When the caller supplies an output rectangle, the result is written into it
/// and handed back as [`Bounds::Reused`]. Otherwise the result is
/// [`Bounds::Owned`].
#[derive(Debug)]
pub enum Bounds<'a> {
    /// The caller's rectangle, overwritten with the result.
    Reused(&'a mut Rect),
    /// A rectangle produced for this call.
    Owned(Rect),
}

impl Bounds<'_> {
    /// Returns `true` if the caller's rectangle holds the result.
    #[must_use]
    pub fn is_reused(&self) -> bool {
        matches!(self, Self::Reused(_))
    }

    /// Returns the bounds by value.
    #[must_use]
    pub fn into_rect(self) -> Rect {
        match self {
            Self::Reused(rect) => *rect,
            Self::Owned(rect) => rect,
        }
    }
}

fn store(result: Option<&mut Rect>, rect: Rect) -> Bounds<'_> {
    match result {
        Some(slot) => {
            *slot = rect;
            Bounds::Reused(slot)
        }
        None => Bounds::Owned(rect),
    }
}

impl Deref for Bounds<'_> {
    type Target = Rect;

    fn deref(&self) -> &Rect {
        match self {
            Self::Reused(rect) => rect,
            Self::Owned(rect) => rect,
        }
    }
}

impl DerefMut for Bounds<'_> {
    fn deref_mut(&mut self) -> &mut Rect {
        match self {
            Self::Reused(rect) => rect,
            Self::Owned(rect) => rect,
        }
    }
}

/// Measures text with configurable [`Thresholds`].
///
/// The estimator holds no measurement state; use [`estimate_bounds`] and
/// [`exact_bounds`] for the default thresholds.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct BoundsEstimator {
    thresholds: Thresholds,
}

impl BoundsEstimator {
    /// Creates an estimator with the default thresholds.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            thresholds: Thresholds::DEFAULT,
        }
    }

    /// Creates an estimator with the given thresholds.
    #[must_use]
    pub const fn with_thresholds(thresholds: Thresholds) -> Self {
        Self { thresholds }
    }

    /// Returns the thresholds in use.
    #[must_use]
    pub const fn thresholds(&self) -> Thresholds {
        self.thresholds
    }

    /// Estimates the bounds of `text` rendered with the active font of `cx`.
    ///
    /// Above [`Thresholds::metrics_above`] the width is the sum of integer
    /// advance widths and the height is the line height, which is fast but only
    /// approximate. Otherwise the bounds are [`exact`](Self::exact_bounds).
    ///
    /// If `result` is given, it is overwritten and returned on every path.
    ///
    /// # Panics
    ///
    /// Panics if the active font size is negative or not finite.
    pub fn estimate_bounds<'a, C>(
        &self,
        text: &str,
        cx: &C,
        result: Option<&'a mut Rect>,
    ) -> Bounds<'a>
    where
        C: RenderContext + ?Sized,
    {
        let font = cx.font();
        assert_valid_size(font.size);
        if font.integer_size() > self.thresholds.metrics_above {
            log::trace!("estimating bounds of {text:?} from glyph metrics");
            return metrics_bounds(text, cx, result);
        }
        let bounds = self.exact_bounds(text, cx);
        store(result, bounds)
    }

    /// Computes the precise bounds of `text` rendered with the active font of
    /// `cx`.
    ///
    /// This can be much more expensive than
    /// [`estimate_bounds`](Self::estimate_bounds).
    ///
    /// # Panics
    ///
    /// Panics if the active font size is negative or not finite.
    pub fn exact_bounds<C>(&self, text: &str, cx: &C) -> Rect
    where
        C: RenderContext + ?Sized,
    {
        let font = cx.font();
        assert_valid_size(font.size);
        if font.integer_size() > self.thresholds.direct_above {
            log::trace!("measuring bounds of {text:?} at size {}", font.size);
            return cx.font_metrics().string_bounds(text);
        }
        normalized_bounds(text, cx)
    }
}

/// Estimates the bounds of `text` with the default [`Thresholds`].
///
/// See [`BoundsEstimator::estimate_bounds`].
pub fn estimate_bounds<'a, C>(text: &str, cx: &C, result: Option<&'a mut Rect>) -> Bounds<'a>
where
    C: RenderContext + ?Sized,
{
    BoundsEstimator::new().estimate_bounds(text, cx, result)
}

/// Computes the precise bounds of `text` with the default [`Thresholds`].
///
/// See [`BoundsEstimator::exact_bounds`].
pub fn exact_bounds<C>(text: &str, cx: &C) -> Rect
where
    C: RenderContext + ?Sized,
{
    BoundsEstimator::new().exact_bounds(text, cx)
}

/// Bounds from integer glyph metrics: summed advances, full line height.
///
/// Only a good approximation when the font is large enough that integer
/// advances are close to the real ones.
pub(crate) fn metrics_bounds<'a, C>(
    text: &str,
    cx: &C,
    result: Option<&'a mut Rect>,
) -> Bounds<'a>
where
    C: RenderContext + ?Sized,
{
    let metrics = cx.font_metrics();
    let width: u64 = text.chars().map(|ch| u64::from(metrics.char_width(ch))).sum();
    #[allow(
        clippy::cast_precision_loss,
        reason = "Widths beyond 2^53 units are not meaningful"
    )]
    let width = width as f64;
    let ascent = f64::from(metrics.ascent());
    let height = f64::from(metrics.height());
    store(result, Rect::new(0.0, -ascent, width, height - ascent))
}

/// Precise bounds for fonts whose integer size is too small to measure
/// natively.
///
/// Measures `text` in the same font at [`REFERENCE_FONT_SIZE`], with
/// fractional metrics so the reference measurement is not itself rounded, and
/// scales the result by the real size.
fn normalized_bounds<C>(text: &str, cx: &C) -> Rect
where
    C: RenderContext + ?Sized,
{
    let font = cx.font();
    let scaling = font.size / REFERENCE_FONT_SIZE;
    log::trace!("measuring bounds of {text:?} at reference size, scaling by {scaling}");
    let reference = font.derive_size(REFERENCE_FONT_SIZE);
    let frc = FontRenderContext::precise(cx.transform());
    let bounds = cx.font_string_bounds(&reference, text, &frc);
    Rect::new(
        bounds.x0 * scaling,
        bounds.y0 * scaling,
        bounds.x1 * scaling,
        bounds.y1 * scaling,
    )
}
