//
// mtfract - a multithreaded, optionally-distributed escape-time fractal renderer
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

extern crate rayon;

pub mod block;
pub mod color;
pub mod complex;
pub mod error;
pub mod kernel;
pub mod net;
pub mod pool;
pub mod render;
pub mod rowstack;
pub mod writer;

use log::warn;

use color::ColorScheme;
use complex::{Complex, PrecisionTag, MP_BITS_MAX, MP_BITS_MIN};
use error::{bad_bounds, IoResult};

/// Default TCP port for the master/worker protocol (spec.md 6).
pub const DEFAULT_PORT: u16 = 7939;

/// Fixed control-frame size for the handshake and row-work channel
/// (spec.md 4.8/6).
pub const FRAME_SIZE: usize = 4096;

/// `|z|^2 >= ESCAPE_RADIUS_SQR` is the escape predicate. Fixed at 256 so the
/// smoothed-iteration formula is continuous across all three precisions
/// (spec.md 4.1, "Open question").
pub const ESCAPE_RADIUS_SQR: f64 = 256.0;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum PlotKind {
    Mandelbrot,
    Julia,
}

impl PlotKind {
    pub fn as_wire(&self) -> &'static str {
        match self {
            PlotKind::Mandelbrot => "mandelbrot",
            PlotKind::Julia => "julia",
        }
    }

    pub fn from_wire(s: &str) -> IoResult<PlotKind> {
        match s {
            "mandelbrot" => Ok(PlotKind::Mandelbrot),
            "julia" => Ok(PlotKind::Julia),
            _ => Err(error::protocol("unrecognized plot type")),
        }
    }
}

/// Immutable plot parameters, threaded explicitly through every numeric and
/// network path -- no process-global `precision`/`mpSignificandSize` (see
/// DESIGN.md, "Global mutable state").
#[derive(Clone, Debug)]
pub struct PlotCtx {
    pub kind: PlotKind,
    pub precision: PrecisionTag,
    pub min: Complex,
    pub max: Complex,
    pub julia_c: Complex,
    pub n_max: u64,
    pub width: u32,
    pub height: u32,
    pub scheme: ColorScheme,
    /// Significand bit count, meaningful only when `precision == Multi`.
    pub bits: u32,
}

impl PlotCtx {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        kind: PlotKind,
        precision: PrecisionTag,
        min: Complex,
        max: Complex,
        julia_c: Complex,
        n_max: u64,
        mut width: u32,
        height: u32,
        scheme: ColorScheme,
        bits: u32,
    ) -> IoResult<PlotCtx> {
        if max.re_f64() <= min.re_f64() {
            return Err(bad_bounds("Re(max) must exceed Re(min)"));
        }
        if max.im_f64() <= min.im_f64() {
            return Err(bad_bounds("Im(max) must exceed Im(min)"));
        }
        if n_max == 0 {
            return Err(bad_bounds("iteration cap must be nonzero"));
        }
        if width == 0 || height == 0 {
            return Err(bad_bounds("width and height must be nonzero"));
        }
        if precision == PrecisionTag::Multi && !(MP_BITS_MIN..=MP_BITS_MAX).contains(&bits) {
            return Err(bad_bounds("multi-precision bit count out of range"));
        }
        if scheme.depth() == color::BitDepth::One && width % 8 != 0 {
            let rounded = width + (8 - width % 8);
            warn!(
                "width {} is not a multiple of 8, required for a 1-bit color scheme; rounding up to {}",
                width, rounded
            );
            width = rounded;
        }

        Ok(PlotCtx {
            kind,
            precision,
            min,
            max,
            julia_c,
            n_max,
            width,
            height,
            scheme,
            bits,
        })
    }

    /// Per-pixel real/imaginary span (spec.md 3, "Pixel geometry").
    pub fn dx(&self) -> f64 {
        if self.width <= 1 {
            0.0
        } else {
            (self.max.re_f64() - self.min.re_f64()) / (self.width as f64 - 1.0)
        }
    }

    pub fn dy(&self) -> f64 {
        if self.height <= 1 {
            0.0
        } else {
            (self.max.im_f64() - self.min.im_f64()) / (self.height as f64 - 1.0)
        }
    }

    /// Complex sample point for pixel (x, y), y counted from the top.
    pub fn sample(&self, x: u32, y: u32) -> (f64, f64) {
        let re = self.min.re_f64() + (x as f64) * self.dx();
        let im = self.max.im_f64() - (y as f64) * self.dy();
        (re, im)
    }

    /// The starting point / sample in this context's native precision
    /// (spec.md 4.1).
    pub fn sample_native(&self, x: u32, y: u32) -> Complex {
        let (re, im) = self.sample(x, y);
        match self.precision {
            PrecisionTag::Std => Complex::Std(num_complex::Complex64::new(re, im)),
            PrecisionTag::Ext => Complex::Ext(complex::ExtComplex::from_f64(re, im)),
            PrecisionTag::Multi => Complex::Multi(complex::MultiComplex::from_f64(re, im, self.bits)),
        }
    }

    pub fn row_size(&self) -> usize {
        self.scheme.row_size(self.width)
    }
}
