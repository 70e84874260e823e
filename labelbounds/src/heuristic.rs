// Copyright 2025 the Labelbounds Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! A font-free rendering context with em-relative glyph metrics.

use hashbrown::HashMap;
use kurbo::{Affine, Rect};

use crate::{Font, FontRenderContext, GlyphMetrics, RenderContext};

/// A tiny heuristic rendering context suitable for demos, tests and early
/// layout.
///
/// Every glyph advances by ~0.6em unless overridden per character, with an
/// ascent of ~0.8em and a descent of ~0.2em. Precise measurements snap each
/// advance to whole device pixels unless fractional metrics are enabled.
#[derive(Clone, Debug)]
pub struct HeuristicContext {
    font: Font,
    frc: FontRenderContext,
    advance_em: f64,
    ascent_em: f64,
    descent_em: f64,
    leading_em: f64,
    advances: HashMap<char, f64>,
}

impl HeuristicContext {
    /// Creates a context for `font` under the identity transform.
    #[must_use]
    pub fn new(font: Font) -> Self {
        Self {
            font,
            frc: FontRenderContext::default(),
            advance_em: 0.6,
            ascent_em: 0.8,
            descent_em: 0.2,
            leading_em: 0.0,
            advances: HashMap::new(),
        }
    }

    /// Replaces the active font.
    #[must_use]
    pub fn with_font(mut self, font: Font) -> Self {
        self.font = font;
        self
    }

    /// Sets the user-to-device transform.
    #[must_use]
    pub fn with_transform(mut self, transform: Affine) -> Self {
        self.frc.transform = transform;
        self
    }

    /// Sets whether measurements of the active font keep sub-pixel advances.
    #[must_use]
    pub fn with_fractional_metrics(mut self, fractional_metrics: bool) -> Self {
        self.frc.fractional_metrics = fractional_metrics;
        self
    }

    /// Sets the default advance, in ems.
    ///
    /// # Panics
    ///
    /// Panics if `em` is negative or not finite.
    #[must_use]
    pub fn with_default_advance(mut self, em: f64) -> Self {
        self.advance_em = checked_em(em);
        self
    }

    /// Sets the advance of `ch`, in ems.
    ///
    /// # Panics
    ///
    /// Panics if `em` is negative or not finite.
    #[must_use]
    pub fn with_advance(mut self, ch: char, em: f64) -> Self {
        self.advances.insert(ch, checked_em(em));
        self
    }

    /// Sets the ascent, descent and leading, in ems.
    ///
    /// # Panics
    ///
    /// Panics if any value is negative or not finite.
    #[must_use]
    pub fn with_vertical_metrics(mut self, ascent: f64, descent: f64, leading: f64) -> Self {
        self.ascent_em = checked_em(ascent);
        self.descent_em = checked_em(descent);
        self.leading_em = checked_em(leading);
        self
    }

    fn advance_em(&self, ch: char) -> f64 {
        self.advances.get(&ch).copied().unwrap_or(self.advance_em)
    }

    /// Logical bounds of `text` at `size`: summed advances, full line height.
    fn line_bounds(&self, size: f64, text: &str, frc: &FontRenderContext) -> Rect {
        let device_scale = if frc.fractional_metrics {
            0.0
        } else {
            frc.device_scale()
        };
        let width: f64 = text
            .chars()
            .map(|ch| snap(self.advance_em(ch) * size, device_scale))
            .sum();
        let ascent = self.ascent_em * size;
        let height = (self.ascent_em + self.descent_em + self.leading_em) * size;
        Rect::new(0.0, -ascent, width, height - ascent)
    }
}

fn checked_em(em: f64) -> f64 {
    assert!(
        em.is_finite() && em >= 0.0,
        "em metrics must be finite and non-negative, got {em}"
    );
    em
}

/// Rounds a non-negative value half-up.
fn round_half_up(value: f64) -> f64 {
    #[allow(
        clippy::cast_possible_truncation,
        reason = "Truncation is the rounding; values are non-negative"
    )]
    {
        (value + 0.5) as u64 as f64
    }
}

/// Snaps a user-space length to whole device pixels. A non-positive scale
/// leaves it unchanged.
fn snap(length: f64, device_scale: f64) -> f64 {
    if device_scale > 0.0 {
        round_half_up(length * device_scale) / device_scale
    } else {
        length
    }
}

fn whole_units(value: f64) -> u32 {
    #[allow(
        clippy::cast_possible_truncation,
        reason = "Truncation is the rounding; the cast saturates"
    )]
    {
        (value + 0.5) as u32
    }
}

impl GlyphMetrics for HeuristicContext {
    fn char_width(&self, ch: char) -> u32 {
        whole_units(self.advance_em(ch) * self.font.size)
    }

    fn ascent(&self) -> u32 {
        whole_units(self.ascent_em * self.font.size)
    }

    fn descent(&self) -> u32 {
        whole_units(self.descent_em * self.font.size)
    }

    fn leading(&self) -> u32 {
        whole_units(self.leading_em * self.font.size)
    }

    fn string_bounds(&self, text: &str) -> Rect {
        self.line_bounds(self.font.size, text, &self.frc)
    }
}

impl RenderContext for HeuristicContext {
    type Metrics = Self;

    fn font(&self) -> &Font {
        &self.font
    }

    fn transform(&self) -> Affine {
        self.frc.transform
    }

    fn font_metrics(&self) -> &Self {
        self
    }

    fn font_string_bounds(&self, font: &Font, text: &str, frc: &FontRenderContext) -> Rect {
        self.line_bounds(font.size, text, frc)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn integer_metrics_round_em_values() {
        let cx = HeuristicContext::new(Font::new(12.0))
            .with_advance('A', 7.0 / 12.0)
            .with_advance('B', 9.0 / 12.0)
            .with_vertical_metrics(10.0 / 12.0, 3.0 / 12.0, 1.0 / 12.0);
        assert_eq!(cx.char_width('A'), 7);
        assert_eq!(cx.char_width('B'), 9);
        // Default advance: 0.6 * 12 = 7.2.
        assert_eq!(cx.char_width('x'), 7);
        assert_eq!(cx.ascent(), 10);
        assert_eq!(cx.height(), 14);
    }

    #[test]
    fn precise_advances_snap_to_device_pixels() {
        let font = Font::new(10.0);
        let text = "abc";

        // 6.0 user units per glyph at scale 1 is already whole.
        let cx = HeuristicContext::new(font.clone());
        assert_eq!(cx.string_bounds(text).width(), 18.0);

        // At scale 0.25 each 6.0 advance is 1.5 device pixels, snapped to 2.
        let cx = cx.with_transform(Affine::scale(0.25));
        assert_eq!(cx.string_bounds(text).width(), 24.0);

        // Fractional metrics keep the real advance.
        let cx = cx.with_fractional_metrics(true);
        assert!((cx.string_bounds(text).width() - 18.0).abs() < 1e-9);
    }

    #[test]
    fn bounds_sit_on_the_baseline() {
        let cx = HeuristicContext::new(Font::new(20.0)).with_fractional_metrics(true);
        let bounds = cx.string_bounds("hi");
        assert_eq!(bounds.x0, 0.0);
        assert!((bounds.y0 + 16.0).abs() < 1e-9);
        assert!((bounds.height() - 20.0).abs() < 1e-9);
    }

    #[test]
    fn font_string_bounds_uses_the_given_font() {
        let cx = HeuristicContext::new(Font::new(0.2));
        let frc = FontRenderContext::precise(Affine::IDENTITY);
        let bounds = cx.font_string_bounds(&Font::new(1.0), "abcd", &frc);
        assert!((bounds.width() - 2.4).abs() < 1e-9);
        assert!((bounds.y0 + 0.8).abs() < 1e-9);
    }

    #[test]
    fn degenerate_transform_disables_snapping() {
        let cx = HeuristicContext::new(Font::new(10.0)).with_transform(Affine::scale(0.0));
        assert!((cx.string_bounds("ab").width() - 12.0).abs() < 1e-9);
    }

    #[test]
    #[should_panic(expected = "em metrics must be finite and non-negative")]
    fn negative_advance_is_rejected() {
        let _ = HeuristicContext::new(Font::default()).with_advance('x', -0.1);
    }
}
