//
// mtfract - block.rs - Block Planner & Allocator
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
// Picks the smallest block count that keeps one block's row buffers under
// the memory budget, with free system memory as the knob rather than a
// fixed constant (spec.md 4.3).
//

use sysinfo::System;

use crate::error::{alloc_exhausted, IoResult};
use crate::PlotCtx;

/// Hard search ceiling on block count (spec.md 4.3, "k in 1..=64").
const MAX_BLOCKS: u32 = 64;

/// Fraction of system-reported available memory we're willing to use for
/// row buffers, leaving headroom for the interpreter, network buffers, and
/// the rest of the system (spec.md 4.3, "B = 0.8*F").
const MEMORY_FRACTION: f64 = 0.8;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct BlockPlan {
    pub block_count: u32,
    pub rows_per_block: u32,
}

impl BlockPlan {
    /// Row range `[start, end)` covered by block `index` (0-based).
    pub fn rows_for(&self, index: u32, height: u32) -> (u32, u32) {
        let start = (index * self.rows_per_block).min(height);
        let end = ((index + 1) * self.rows_per_block).min(height);
        (start, end)
    }

    pub fn num_blocks(&self, height: u32) -> u32 {
        (height + self.rows_per_block - 1) / self.rows_per_block
    }
}

/// Reads free system memory via `sysinfo`, the same crate the pack's
/// system-monitoring tools (e.g. sitrep) use for host introspection.
fn available_memory_bytes() -> u64 {
    let mut sys = System::new();
    sys.refresh_memory();
    sys.available_memory()
}

/// Finds the smallest block count `k` in `1..=64` whose per-block row
/// buffer fits the memory budget, or the caller-supplied override.
///
/// `budget_bytes`, when `Some`, bypasses the `sysinfo` probe entirely --
/// used by tests and by callers that already know their memory ceiling.
pub fn plan_blocks(ctx: &PlotCtx, budget_bytes: Option<u64>) -> IoResult<BlockPlan> {
    let budget = budget_bytes.unwrap_or_else(|| {
        ((available_memory_bytes() as f64) * MEMORY_FRACTION) as u64
    });
    let row_bytes = ctx.row_size() as u64;

    for k in 1..=MAX_BLOCKS {
        let rows_per_block = (ctx.height + k - 1) / k;
        let block_bytes = row_bytes.saturating_mul(rows_per_block as u64);
        if block_bytes <= budget {
            return Ok(BlockPlan {
                block_count: k,
                rows_per_block,
            });
        }
    }

    Err(alloc_exhausted(&format!(
        "no block count in 1..={} fits a budget of {} bytes for a {}-byte row",
        MAX_BLOCKS, budget, row_bytes
    )))
}
