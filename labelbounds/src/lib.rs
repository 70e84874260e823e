// Copyright 2025 the Labelbounds Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Text bounds estimation for label layout.
//!
//! Map and cell viewers need to know how much space a label takes before they
//! draw it, and they need to know it for every label on every frame of a pan or
//! zoom. This crate answers that question with two strategies:
//!
//! - a fast estimate that sums integer per-character advance widths, used for
//!   fonts large enough that the rounding error does not matter, and
//! - a precise measurement, used for small fonts. Fonts too small for native
//!   integer sizing are measured at [`REFERENCE_FONT_SIZE`] and rescaled.
//!
//! The crate never loads fonts, shapes or draws text. All of that sits behind
//! the [`RenderContext`] and [`GlyphMetrics`] traits, which can be implemented by
//! a shaping engine (see `labelbounds_parley`) or by the bundled
//! [`HeuristicContext`].
//!
//! ```
//! use labelbounds::{Font, HeuristicContext, estimate_bounds};
//! use kurbo::Rect;
//!
//! let cx = HeuristicContext::new(Font::new(14.0));
//! let mut slot = Rect::ZERO;
//! let bounds = estimate_bounds("Cell (3, 4)", &cx, Some(&mut slot));
//! assert!(bounds.is_reused());
//! assert!(bounds.width() > 0.0);
//! ```
//!
//! This crate is `no_std`-friendly (it uses `alloc` for named font families and
//! per-character overrides).

#![no_std]

extern crate alloc;

mod bounds;
mod context;
mod font;
mod heuristic;

pub use bounds::{Bounds, BoundsEstimator, Thresholds, estimate_bounds, exact_bounds};
pub use context::{FontRenderContext, GlyphMetrics, RenderContext};
pub use font::{Font, FontFamily, FontStyle, FontWeight, REFERENCE_FONT_SIZE};
pub use heuristic::HeuristicContext;
