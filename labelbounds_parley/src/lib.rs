// Copyright 2025 the Labelbounds Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Parley-backed rendering context.
//!
//! This crate implements [`labelbounds::RenderContext`] and
//! [`labelbounds::GlyphMetrics`] using Parley, so label bounds reflect real
//! fonts and shaping-aware advances.

#![no_std]

extern crate alloc;

use alloc::borrow::Cow;
use core::cell::RefCell;

use hashbrown::HashMap;
use kurbo::{Affine, Rect};
use labelbounds::{Font, FontFamily, FontRenderContext, FontStyle, GlyphMetrics, RenderContext};
use parley::style::{FontFamily as ParleyFontFamily, FontStack, GenericFamily, StyleProperty};
use parley::{Alignment, AlignmentOptions, FontContext, FontStyle as ParleyFontStyle, FontWeight};

/// Text used to take vertical metrics, so that ascent and line height do not
/// depend on the measured string.
const VERTICAL_SAMPLE: &str = "x";

/// Line metrics in user space.
#[derive(Clone, Copy, Debug, Default)]
struct LineMetrics {
    advance: f64,
    ascent: f64,
    descent: f64,
    leading: f64,
}

/// Integer glyph metrics of the active font under the active render context.
///
/// Filled lazily and emptied whenever the font or render context changes.
#[derive(Debug, Default)]
struct GlyphTable {
    advances: HashMap<char, u32>,
    vertical: Option<LineMetrics>,
}

impl GlyphTable {
    fn clear(&mut self) {
        self.advances.clear();
        self.vertical = None;
    }
}

/// A [`RenderContext`] backed by Parley.
///
/// The context owns Parley's font and layout contexts as scratch state, so it
/// is not `Sync`; use one context per thread. Integer advances are laid out
/// once per character and font, so the glyph-metrics path costs one table
/// lookup per character after warm-up.
pub struct ParleyRenderContext {
    font_cx: RefCell<FontContext>,
    layout_cx: RefCell<parley::LayoutContext<()>>,
    glyphs: RefCell<GlyphTable>,
    font: Font,
    frc: FontRenderContext,
}

impl core::fmt::Debug for ParleyRenderContext {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("ParleyRenderContext")
            .field("font", &self.font)
            .field("frc", &self.frc)
            .field("glyphs", &self.glyphs)
            .finish_non_exhaustive()
    }
}

impl ParleyRenderContext {
    /// Creates a context for `font` under the identity transform.
    ///
    /// Note: this uses Parley's default system font configuration.
    #[must_use]
    pub fn new(font: Font) -> Self {
        Self {
            font_cx: RefCell::new(FontContext::new()),
            layout_cx: RefCell::new(parley::LayoutContext::new()),
            glyphs: RefCell::new(GlyphTable::default()),
            font,
            frc: FontRenderContext::default(),
        }
    }

    /// Sets the user-to-device transform.
    ///
    /// Its larger singular value is passed to Parley as the display scale;
    /// measurements are scaled back into user space.
    #[must_use]
    pub fn with_transform(mut self, transform: Affine) -> Self {
        self.set_transform(transform);
        self
    }

    /// Sets whether measurements of the active font keep sub-pixel advances.
    ///
    /// When disabled, Parley quantizes layout coordinates to device pixels.
    #[must_use]
    pub fn with_fractional_metrics(mut self, fractional_metrics: bool) -> Self {
        self.frc.fractional_metrics = fractional_metrics;
        self.glyphs.get_mut().clear();
        self
    }

    /// Replaces the active font.
    pub fn set_font(&mut self, font: Font) {
        self.font = font;
        self.glyphs.get_mut().clear();
    }

    /// Replaces the active transform.
    pub fn set_transform(&mut self, transform: Affine) {
        self.frc.transform = transform;
        self.glyphs.get_mut().clear();
    }

    /// Lays out the first line of `text` and returns its metrics in user space.
    fn measure_line(&self, font: &Font, text: &str, frc: &FontRenderContext) -> LineMetrics {
        let text = text.split('\n').next().unwrap_or("");
        if text.is_empty() {
            return LineMetrics::default();
        }

        let scale = layout_units(frc.device_scale()).max(1.0e-6);
        let quantize = !frc.fractional_metrics;

        let mut font_cx = self.font_cx.borrow_mut();
        let mut layout_cx = self.layout_cx.borrow_mut();

        let mut builder = layout_cx.ranged_builder(&mut font_cx, text, scale, quantize);
        for property in style_properties(font) {
            builder.push_default(property);
        }

        let mut layout: parley::Layout<()> = builder.build(text);
        layout.break_all_lines(None);
        layout.align(None, Alignment::Start, AlignmentOptions::default());

        let Some(line) = layout.lines().next() else {
            log::debug!("parley produced no line for {text:?}");
            return LineMetrics::default();
        };

        let m = line.metrics();
        let scale = f64::from(scale);
        LineMetrics {
            advance: f64::from(m.advance) / scale,
            ascent: f64::from(m.ascent) / scale,
            descent: f64::from(m.descent) / scale,
            leading: f64::from(m.leading) / scale,
        }
    }

    /// Logical bounds: the advance of `text` with vertical metrics taken from a
    /// fixed sample, origin on the baseline.
    fn line_bounds(&self, font: &Font, text: &str, frc: &FontRenderContext) -> Rect {
        let advance = self.measure_line(font, text, frc).advance;
        let vertical = self.measure_line(font, VERTICAL_SAMPLE, frc);
        Rect::new(
            0.0,
            -vertical.ascent,
            advance,
            vertical.descent + vertical.leading,
        )
    }

    fn vertical_metrics(&self) -> LineMetrics {
        let cached = self.glyphs.borrow().vertical;
        if let Some(vertical) = cached {
            return vertical;
        }
        let vertical = self.measure_line(&self.font, VERTICAL_SAMPLE, &self.frc);
        self.glyphs.borrow_mut().vertical = Some(vertical);
        vertical
    }
}

/// Parley style properties describing `font`.
fn style_properties(font: &Font) -> [StyleProperty<'_, ()>; 4] {
    let family = match &font.family {
        FontFamily::Serif => ParleyFontFamily::Generic(GenericFamily::Serif),
        FontFamily::SansSerif => ParleyFontFamily::Generic(GenericFamily::SansSerif),
        FontFamily::Monospace => ParleyFontFamily::Generic(GenericFamily::Monospace),
        FontFamily::Named(name) => ParleyFontFamily::Named(Cow::Borrowed(name.as_ref())),
    };
    let style = match font.style {
        FontStyle::Normal => ParleyFontStyle::Normal,
        FontStyle::Italic => ParleyFontStyle::Italic,
        FontStyle::Oblique => ParleyFontStyle::Oblique(None),
    };
    [
        StyleProperty::FontSize(layout_units(font.size)),
        StyleProperty::FontStack(FontStack::from(family)),
        StyleProperty::FontStyle(style),
        StyleProperty::FontWeight(FontWeight::new(f32::from(font.weight.0))),
    ]
}

/// Converts a user-space length to Parley's `f32` layout units, mapping
/// non-finite and negative values to zero.
fn layout_units(value: f64) -> f32 {
    if !value.is_finite() || value <= 0.0 {
        return 0.0;
    }
    #[allow(
        clippy::cast_possible_truncation,
        reason = "Value is clamped to f32::MAX first"
    )]
    {
        value.min(f64::from(f32::MAX)) as f32
    }
}

fn whole_units(value: f64) -> u32 {
    #[allow(
        clippy::cast_possible_truncation,
        reason = "Truncation is the rounding; the cast saturates"
    )]
    {
        (value.max(0.0) + 0.5) as u32
    }
}

impl GlyphMetrics for ParleyRenderContext {
    fn char_width(&self, ch: char) -> u32 {
        let cached = self.glyphs.borrow().advances.get(&ch).copied();
        if let Some(width) = cached {
            return width;
        }
        let mut buf = [0_u8; 4];
        let text = ch.encode_utf8(&mut buf);
        let width = whole_units(self.measure_line(&self.font, text, &self.frc).advance);
        self.glyphs.borrow_mut().advances.insert(ch, width);
        width
    }

    fn ascent(&self) -> u32 {
        whole_units(self.vertical_metrics().ascent)
    }

    fn descent(&self) -> u32 {
        whole_units(self.vertical_metrics().descent)
    }

    fn leading(&self) -> u32 {
        whole_units(self.vertical_metrics().leading)
    }

    fn string_bounds(&self, text: &str) -> Rect {
        self.line_bounds(&self.font, text, &self.frc)
    }
}

impl RenderContext for ParleyRenderContext {
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
        self.line_bounds(font, text, frc)
    }
}

#[cfg(test)]
mod tests {
    extern crate std;

    use labelbounds::{REFERENCE_FONT_SIZE, estimate_bounds, exact_bounds};

    use super::*;

    #[test]
    fn empty_text_has_zero_width_and_full_line() {
        let cx = ParleyRenderContext::new(Font::new(12.0)).with_fractional_metrics(true);
        let empty = cx.string_bounds("");
        let full = cx.string_bounds("Hello");
        assert_eq!(empty.width(), 0.0);
        assert_eq!(empty.y0, full.y0);
        assert_eq!(empty.height(), full.height());
    }

    #[test]
    fn tiny_fonts_rescale_the_reference_measurement() {
        let transform = Affine::scale(8.0);
        let cx = ParleyRenderContext::new(Font::new(0.25)).with_transform(transform);
        let text = "Label";
        let reference = cx.font_string_bounds(
            &Font::new(REFERENCE_FONT_SIZE),
            text,
            &FontRenderContext::precise(transform),
        );
        let bounds = exact_bounds(text, &cx);
        assert!((bounds.x0 - reference.x0 * 0.25).abs() < 1e-9);
        assert!((bounds.y0 - reference.y0 * 0.25).abs() < 1e-9);
        assert!((bounds.x1 - reference.x1 * 0.25).abs() < 1e-9);
        assert!((bounds.y1 - reference.y1 * 0.25).abs() < 1e-9);
    }

    #[test]
    fn large_fonts_sum_integer_advances() {
        let cx = ParleyRenderContext::new(Font::new(16.0));
        let text = "AB";
        let mut slot = Rect::ZERO;
        let bounds = estimate_bounds(text, &cx, Some(&mut slot)).into_rect();
        let sum: u32 = text.chars().map(|ch| cx.char_width(ch)).sum();
        assert_eq!(bounds.width(), f64::from(sum));
        assert_eq!(bounds.height(), f64::from(cx.height()));
        assert_eq!(bounds.y0, -f64::from(cx.ascent()));
        assert_eq!(slot, bounds);
    }

    #[test]
    fn metrics_width_does_not_shrink_with_size() {
        let text = "Monotonic";
        let mut last = 0;
        for size in [6.0, 9.0, 12.0, 18.0, 24.0, 48.0] {
            let cx = ParleyRenderContext::new(Font::new(size));
            let width: u32 = text.chars().map(|ch| cx.char_width(ch)).sum();
            assert!(width >= last, "width shrank at size {size}");
            last = width;
        }
    }

    #[test]
    fn only_the_first_line_is_measured() {
        let cx = ParleyRenderContext::new(Font::new(12.0)).with_fractional_metrics(true);
        let first = cx.string_bounds("first");
        let both = cx.string_bounds("first\nsecond line");
        assert_eq!(first, both);
    }

    #[test]
    fn glyph_metrics_are_laid_out_once_per_character() {
        let mut cx = ParleyRenderContext::new(Font::new(14.0));
        let _ = estimate_bounds("abba", &cx, None);
        {
            let glyphs = cx.glyphs.borrow();
            assert_eq!(glyphs.advances.len(), 2);
            assert!(glyphs.vertical.is_some());
        }
        let first = cx.char_width('a');
        assert_eq!(cx.char_width('a'), first);
        assert_eq!(cx.glyphs.borrow().advances.len(), 2);

        cx.set_font(Font::new(28.0));
        assert!(cx.glyphs.borrow().advances.is_empty());
        assert!(cx.glyphs.borrow().vertical.is_none());
        assert!(cx.char_width('a') >= first);
    }

    #[test]
    fn changing_the_render_context_empties_the_glyph_table() {
        let cx = ParleyRenderContext::new(Font::new(14.0));
        let _ = cx.char_width('q');
        let cx = cx.with_transform(Affine::scale(2.0));
        assert!(cx.glyphs.borrow().advances.is_empty());
        let _ = cx.char_width('q');
        let cx = cx.with_fractional_metrics(true);
        assert!(cx.glyphs.borrow().advances.is_empty());
    }
}
