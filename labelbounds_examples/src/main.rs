// Copyright 2025 the Labelbounds Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Example binary for `labelbounds`.
//!
//! Lays out a row of cell labels across a sweep of zoom levels and prints the
//! estimated bounds next to the exact ones. Pass `--parley` to measure with
//! system fonts instead of the heuristic context.

use kurbo::{Affine, Rect, Vec2};
use labelbounds::{
    BoundsEstimator, Font, HeuristicContext, RenderContext, Thresholds, exact_bounds,
};
use labelbounds_parley::ParleyRenderContext;

/// Font size of a cell label at zoom 1.
const BASE_FONT_SIZE: f64 = 12.0;

const ZOOMS: [f64; 9] = [0.01, 0.03, 0.1, 0.3, 0.45, 1.0, 2.5, 10.0, 40.0];

const LABELS: [&str; 4] = ["(0, 0)", "(0, 1)", "Cell 12", "Long cell label"];

fn main() {
    env_logger::init();

    let use_parley = std::env::args().any(|arg| arg == "--parley");
    let estimator = BoundsEstimator::new();

    // One output rectangle reused for every label and frame.
    let mut slot = Rect::ZERO;

    for zoom in ZOOMS {
        // Labels live in world space and keep a constant size on screen.
        let font = Font::new(BASE_FONT_SIZE * zoom);
        let transform = Affine::scale(zoom.recip());
        println!(
            "zoom={zoom}: font size {:.3} ({} path)",
            font.size,
            path_name(estimator.thresholds(), &font)
        );
        if use_parley {
            let cx = ParleyRenderContext::new(font).with_transform(transform);
            layout_row(&estimator, &cx, &mut slot);
        } else {
            let cx = HeuristicContext::new(font).with_transform(transform);
            layout_row(&estimator, &cx, &mut slot);
        }
    }
}

fn path_name(thresholds: Thresholds, font: &Font) -> &'static str {
    let size = font.integer_size();
    if size > thresholds.metrics_above {
        "metrics"
    } else if size > thresholds.direct_above {
        "direct"
    } else {
        "normalized"
    }
}

/// Places labels left to right with a fixed gap, printing each box.
fn layout_row<C: RenderContext>(estimator: &BoundsEstimator, cx: &C, slot: &mut Rect) {
    let gap = cx.font().size;
    let mut x = 0.0;
    for label in LABELS {
        let estimate = *estimator.estimate_bounds(label, cx, Some(&mut *slot));
        let exact = exact_bounds(label, cx);
        let placed = estimate + Vec2::new(x, 0.0);
        let error = estimate.width() - exact.width();
        log::debug!("{label:?}: estimate {estimate:?}, exact {exact:?}");
        println!(
            "  {label:<16} at x={:>9.4}  w={:>9.4} h={:>9.4}  width error {error:+.4}",
            placed.x0,
            placed.width(),
            placed.height(),
        );
        x += estimate.width() + gap;
    }
}
