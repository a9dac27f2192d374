//
// mtfract - pool.rs - Thread Pool Driver
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
// One `rayon::scope` per block, `T` threads each striped across the block's
// rows (t, t+T, t+2T, ...), with the scope's own join acting as the barrier
// spec.md 4.4 asks for between blocks -- no explicit channel or `WaitGroup`
// needed.
//

use crate::color;
use crate::kernel;
use crate::PlotCtx;

/// Default worker thread count: all logical CPUs, clamped to a sane range
/// (spec.md 4.4).
pub fn default_thread_count() -> usize {
    num_cpus::get().clamp(1, 512)
}

/// Renders rows `[start, end)` of `ctx` into `buf`, which must hold exactly
/// `(end - start) * ctx.row_size()` bytes, using `threads` worker threads
/// striped across the row range.
pub fn render_block(ctx: &PlotCtx, start: u32, end: u32, threads: usize, buf: &mut [u8]) {
    let threads = threads.max(1);
    let row_size = ctx.row_size();
    debug_assert_eq!(buf.len(), (end - start) as usize * row_size);

    let mut strided: Vec<Vec<(u32, &mut [u8])>> = (0..threads).map(|_| Vec::new()).collect();
    for (i, row) in buf.chunks_mut(row_size).enumerate() {
        let y = start + i as u32;
        strided[i % threads].push((y, row));
    }

    rayon::scope(|s| {
        for thread_rows in strided {
            s.spawn(move |_| {
                for (y, row) in thread_rows {
                    for x in 0..ctx.width {
                        let result = kernel::escape_time(ctx, x, y);
                        color::paint(ctx.scheme, &result, ctx.n_max, row, x as usize);
                    }
                }
            });
        }
    });
}
