// Copyright 2025 the Labelbounds Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Font descriptors.

use alloc::sync::Arc;

/// The size at which the normalized-scale fallback measures text.
///
/// Native integer sizing is well-defined here, and glyph bounds scale linearly
/// with the font size, so measurements at this size can be rescaled exactly.
pub const REFERENCE_FONT_SIZE: f64 = 1.0;

/// A font descriptor: family, weight, style and a floating-point size.
///
/// This is only a description. Resolving it to actual font data is up to the
/// [`RenderContext`](crate::RenderContext) that measures with it.
#[derive(Clone, Debug, PartialEq)]
pub struct Font {
    /// Font size in user-space units (typically pixels). Must be finite and
    /// non-negative when measured.
    pub size: f64,
    /// The preferred font family.
    pub family: FontFamily,
    /// Font weight (e.g. `400` for normal, `700` for bold).
    pub weight: FontWeight,
    /// Font style (normal/italic/oblique).
    pub style: FontStyle,
}

impl Font {
    /// Creates a sans-serif, normal-weight, upright font of the given `size`.
    ///
    /// # Panics
    ///
    /// Panics if `size` is negative or not finite.
    #[must_use]
    pub fn new(size: f64) -> Self {
        assert_valid_size(size);
        Self {
            size,
            family: FontFamily::SansSerif,
            weight: FontWeight::NORMAL,
            style: FontStyle::Normal,
        }
    }

    /// Sets the font family.
    #[must_use]
    pub fn with_family(mut self, family: FontFamily) -> Self {
        self.family = family;
        self
    }

    /// Sets the font weight.
    #[must_use]
    pub fn with_weight(mut self, weight: FontWeight) -> Self {
        self.weight = weight;
        self
    }

    /// Sets the font style.
    #[must_use]
    pub fn with_style(mut self, style: FontStyle) -> Self {
        self.style = style;
        self
    }

    /// Returns the native integer size: the real size rounded half-up.
    ///
    /// Any real size below `0.5` has an integer size of `0`.
    #[must_use]
    pub fn integer_size(&self) -> i32 {
        #[allow(
            clippy::cast_possible_truncation,
            reason = "Truncation is the rounding; the cast saturates for huge sizes"
        )]
        {
            (self.size + 0.5) as i32
        }
    }

    /// Returns a copy of this font with the same family, weight and style but
    /// a different size.
    ///
    /// # Panics
    ///
    /// Panics if `size` is negative or not finite.
    #[must_use]
    pub fn derive_size(&self, size: f64) -> Self {
        assert_valid_size(size);
        Self {
            size,
            ..self.clone()
        }
    }
}

impl Default for Font {
    fn default() -> Self {
        Self::new(12.0)
    }
}

pub(crate) fn assert_valid_size(size: f64) {
    assert!(
        size.is_finite() && size >= 0.0,
        "font size must be finite and non-negative, got {size}"
    );
}

/// The family a label is set in.
///
/// Generic families are resolved by the measuring backend.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum FontFamily {
    /// The backend's default serif family.
    Serif,
    /// The backend's default sans-serif family.
    SansSerif,
    /// The backend's default monospace family.
    Monospace,
    /// A family looked up by name, such as `"Inter"`.
    Named(Arc<str>),
}

/// Font weight on the OpenType `usWeightClass` scale (1 to 1000).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FontWeight(pub u16);

impl FontWeight {
    /// Regular text (`400`).
    pub const NORMAL: Self = Self(400);
    /// Bold text (`700`).
    pub const BOLD: Self = Self(700);
}

/// Slant of the glyphs.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FontStyle {
    /// Upright glyphs.
    Normal,
    /// Italic glyphs, from a dedicated italic face when one exists.
    Italic,
    /// Slanted upright glyphs.
    Oblique,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn integer_size_rounds_half_up() {
        assert_eq!(Font::new(0.0).integer_size(), 0);
        assert_eq!(Font::new(0.49).integer_size(), 0);
        assert_eq!(Font::new(0.5).integer_size(), 1);
        assert_eq!(Font::new(5.4).integer_size(), 5);
        assert_eq!(Font::new(5.5).integer_size(), 6);
        assert_eq!(Font::new(12.0).integer_size(), 12);
    }

    #[test]
    fn derive_size_keeps_family_weight_and_style() {
        let font = Font::new(0.3)
            .with_family(FontFamily::Named(Arc::from("Inter")))
            .with_weight(FontWeight::BOLD)
            .with_style(FontStyle::Italic);
        let reference = font.derive_size(REFERENCE_FONT_SIZE);
        assert_eq!(reference.size, 1.0);
        assert_eq!(reference.family, font.family);
        assert_eq!(reference.weight, FontWeight::BOLD);
        assert_eq!(reference.style, FontStyle::Italic);
        assert_eq!(font.size, 0.3);
    }

    #[test]
    #[should_panic(expected = "font size must be finite and non-negative")]
    fn negative_size_is_rejected() {
        let _ = Font::new(-1.0);
    }

    #[test]
    #[should_panic(expected = "font size must be finite and non-negative")]
    fn nan_size_is_rejected() {
        let _ = Font::new(f64::NAN);
    }
}
