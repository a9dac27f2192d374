//
// mtfract - render.rs - ties the standalone and distributed pipelines together
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

use std::io::Write;
use std::net::SocketAddr;

use crate::block;
use crate::error::IoResult;
use crate::net::master;
use crate::pool;
use crate::writer::Writer;
use crate::PlotCtx;

/// Renders `ctx` on this process alone: plan blocks against the memory
/// budget, drive each block through the thread pool, stream rows out as
/// they finish (spec.md 4.3/4.4/4.5).
pub fn render_local<W: Write>(
    ctx: &PlotCtx,
    out: W,
    threads: usize,
    budget_bytes: Option<u64>,
) -> IoResult<()> {
    let plan = block::plan_blocks(ctx, budget_bytes)?;
    let row_size = ctx.row_size();

    let mut writer = Writer::new(out, ctx.scheme);
    writer.write_header(ctx.width, ctx.height)?;

    let mut block_idx = 0;
    loop {
        let (start, end) = plan.rows_for(block_idx, ctx.height);
        if start >= ctx.height {
            break;
        }
        let mut buf = vec![0u8; (end - start) as usize * row_size];
        pool::render_block(ctx, start, end, threads, &mut buf);
        for row in buf.chunks(row_size) {
            writer.write_row(row)?;
        }
        block_idx += 1;
    }

    writer.finish()
}

/// Runs the master side of the distributed protocol against the given
/// listen address, then writes the assembled image exactly the way
/// `render_local` would have (spec.md 6, "the image a master produces with
/// workers must be identical to what it would produce alone").
pub fn render_distributed<W: Write>(ctx: &PlotCtx, addr: SocketAddr, out: W) -> IoResult<()> {
    let canvas = master::run(ctx, addr)?;
    let row_size = ctx.row_size();

    let mut writer = Writer::new(out, ctx.scheme);
    writer.write_header(ctx.width, ctx.height)?;
    for row in canvas.chunks(row_size) {
        writer.write_row(row)?;
    }
    writer.finish()
}
