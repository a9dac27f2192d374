//
// mtfract - kernel.rs - escape-time iteration
//
// Copyright (c) 2018 Brion Vibber
//
// Permission is hereby granted, free of charge, to any person obtaining a copy
// of this software and associated documentation files (the "Software"), to deal
// in the Software without restriction, including without limitation the rights
// to use, copy, modify, merge, publish, distribute, sublicense, and/or sell
// copies of the Software, and to permit persons to whom the Software is
// furnished to do so, subject to the following conditions:
//
// The above copyright notice and this permission notice shall be included in
// all copies or substantial portions of the Software.
//
// THE SOFTWARE IS PROVIDED "AS IS", WITHOUT WARRANTY OF ANY KIND, EXPRESS OR
// IMPLIED, INCLUDING BUT NOT LIMITED TO THE WARRANTIES OF MERCHANTABILITY,
// FITNESS FOR A PARTICULAR PURPOSE AND NONINFRINGEMENT. IN NO EVENT SHALL THE
// AUTHORS OR COPYRIGHT HOLDERS BE LIABLE FOR ANY CLAIM, DAMAGES OR OTHER
// LIABILITY, WHETHER IN AN ACTION OF CONTRACT, TORT OR OTHERWISE, ARISING FROM,
// OUT OF OR IN CONNECTION WITH THE SOFTWARE OR THE USE OR OTHER DEALINGS IN
// THE SOFTWARE.
//
// One `escape_time` drives both Mandelbrot and Julia iteration: the only
// difference is which of z/c starts at the sample point (spec.md 4.1).
//

use crate::complex::Complex;
use crate::{PlotCtx, PlotKind, ESCAPE_RADIUS_SQR};

/// Outcome of iterating one pixel: the escape count and the final `|z|^2`
/// (meaningful only when `n < n_max`, i.e. the point escaped).
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct EscapeResult {
    pub n: u64,
    pub norm_sqr: f64,
}

/// Cheap membership tests for the Mandelbrot main cardioid and period-2 bulb,
/// skipping iteration entirely for points known never to escape (spec.md
/// 4.1, "Known optimization"). Only meaningful when `c` is the Mandelbrot
/// parameter, i.e. not applied to Julia sets.
fn in_cardioid_or_bulb(re: f64, im: f64) -> bool {
    let q = (re - 0.25) * (re - 0.25) + im * im;
    if q * (q + (re - 0.25)) < 0.25 * im * im {
        return true;
    }
    (re + 1.0) * (re + 1.0) + im * im < 0.0625
}

/// Runs escape-time iteration for pixel (x, y) of `ctx`.
pub fn escape_time(ctx: &PlotCtx, x: u32, y: u32) -> EscapeResult {
    let sample = ctx.sample_native(x, y);

    let (mut z, c) = match ctx.kind {
        PlotKind::Mandelbrot => (sample.zero_like(), sample),
        PlotKind::Julia => (sample, ctx.julia_c.clone()),
    };

    if ctx.kind == PlotKind::Mandelbrot && in_cardioid_or_bulb(c.re_f64(), c.im_f64()) {
        return EscapeResult {
            n: ctx.n_max,
            norm_sqr: 0.0,
        };
    }

    let mut n = 0u64;
    let mut norm_sqr = z.norm_sqr_f64();
    while n < ctx.n_max && norm_sqr < ESCAPE_RADIUS_SQR {
        z = z.squared_plus(&c);
        norm_sqr = z.norm_sqr_f64();
        n += 1;
    }

    EscapeResult { n, norm_sqr }
}
