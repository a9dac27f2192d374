//
// mtfract - net/protocol.rs - Protocol Engine
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
// Every control message is a fixed `FRAME_SIZE` ASCII frame: a single text
// line, zero-padded out to the frame boundary. Fixed framing means a reader
// never needs a length prefix, at the cost of a hard cap on how much a
// handshake line can say (spec.md 4.8/6).
//

use std::str::FromStr;

use crate::color::ColorScheme;
use crate::complex::{Complex, PrecisionTag};
use crate::error::{protocol, IoResult};
use crate::{PlotCtx, PlotKind, FRAME_SIZE};

/// Encodes `line` into a zero-padded frame, or fails if it doesn't fit --
/// this can happen for a `PARAMS` frame at very large Multi-precision bit
/// counts, whose decimal bounds can run to thousands of digits. A frame
/// this malformed is this peer's problem to reject, not ours to panic over
/// (spec.md 7, "errors propagate, never crash the caller").
fn encode_line(line: &str) -> IoResult<[u8; FRAME_SIZE]> {
    let mut buf = [0u8; FRAME_SIZE];
    let bytes = line.as_bytes();
    if bytes.len() > FRAME_SIZE {
        return Err(protocol(&format!(
            "control frame line overflowed the {}-byte frame",
            FRAME_SIZE
        )));
    }
    buf[..bytes.len()].copy_from_slice(bytes);
    Ok(buf)
}

fn frame_line(frame: &[u8]) -> IoResult<&str> {
    let end = frame
        .iter()
        .position(|&b| b == b'\n')
        .ok_or_else(|| protocol("control frame missing newline terminator"))?;
    std::str::from_utf8(&frame[..end]).map_err(|_| protocol("control frame is not valid UTF-8"))
}

/// First frame of the handshake: the precision the master renders in, sent
/// before any bounds so the worker knows how to parse the frame that
/// follows (spec.md 6, "handshake").
pub fn encode_precision(precision: PrecisionTag) -> IoResult<[u8; FRAME_SIZE]> {
    encode_line(&format!("PRECISION {}\n", precision.as_wire()))
}

pub fn decode_precision(frame: &[u8]) -> IoResult<PrecisionTag> {
    let line = frame_line(frame)?;
    let rest = line
        .strip_prefix("PRECISION ")
        .ok_or_else(|| protocol("expected a PRECISION frame"))?;
    PrecisionTag::from_str(rest.trim())
}

/// Second frame of the handshake: every plot parameter a worker needs to
/// reconstruct an identical `PlotCtx` (spec.md 6). `Complex`'s `Display`
/// impl never contains whitespace, so splitting the line on whitespace is
/// unambiguous.
pub fn encode_params(ctx: &PlotCtx) -> IoResult<[u8; FRAME_SIZE]> {
    let line = format!(
        "PARAMS {} {} {} {} {} {} {} {} {} {}\n",
        ctx.bits,
        ctx.kind.as_wire(),
        ctx.precision.as_wire(),
        ctx.min,
        ctx.max,
        ctx.julia_c,
        ctx.n_max,
        ctx.width,
        ctx.height,
        ctx.scheme.as_wire(),
    );
    encode_line(&line)
}

pub fn decode_params(frame: &[u8]) -> IoResult<PlotCtx> {
    let line = frame_line(frame)?;
    let rest = line
        .strip_prefix("PARAMS ")
        .ok_or_else(|| protocol("expected a PARAMS frame"))?;
    let fields: Vec<&str> = rest.split_whitespace().collect();
    if fields.len() != 10 {
        return Err(protocol("malformed PARAMS frame"));
    }
    let bits: u32 = fields[0].parse().map_err(|_| protocol("bad bits field"))?;
    let kind = PlotKind::from_wire(fields[1])?;
    let precision = PrecisionTag::from_str(fields[2])?;
    let min = Complex::parse(fields[3], precision, bits)?;
    let max = Complex::parse(fields[4], precision, bits)?;
    let julia_c = Complex::parse(fields[5], precision, bits)?;
    let n_max: u64 = fields[6].parse().map_err(|_| protocol("bad n_max field"))?;
    let width: u32 = fields[7].parse().map_err(|_| protocol("bad width field"))?;
    let height: u32 = fields[8].parse().map_err(|_| protocol("bad height field"))?;
    let scheme = ColorScheme::from_wire(fields[9])?;

    PlotCtx::new(kind, precision, min, max, julia_c, n_max, width, height, scheme, bits)
}

/// A master->worker row assignment, or the end-of-work signal.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum RowAssignment {
    Row(u32),
    Done,
}

pub fn encode_row(row: u32) -> IoResult<[u8; FRAME_SIZE]> {
    encode_line(&format!("ROW {}\n", row))
}

pub fn encode_done() -> IoResult<[u8; FRAME_SIZE]> {
    encode_line("DONE\n")
}

pub fn decode_row_assignment(frame: &[u8]) -> IoResult<RowAssignment> {
    let line = frame_line(frame)?;
    if line == "DONE" {
        return Ok(RowAssignment::Done);
    }
    let rest = line.strip_prefix("ROW ").ok_or_else(|| protocol("expected a ROW or DONE frame"))?;
    let row: u32 = rest.parse().map_err(|_| protocol("bad row index"))?;
    Ok(RowAssignment::Row(row))
}

/// Worker->master: "here is the computed row `row`", immediately followed
/// on the wire by exactly `row_size` raw bytes of painted pixel data.
pub fn encode_result(row: u32) -> IoResult<[u8; FRAME_SIZE]> {
    encode_line(&format!("RESULT {}\n", row))
}

pub fn decode_result(frame: &[u8]) -> IoResult<u32> {
    let line = frame_line(frame)?;
    let rest = line.strip_prefix("RESULT ").ok_or_else(|| protocol("expected a RESULT frame"))?;
    rest.parse().map_err(|_| protocol("bad row index in RESULT frame"))
}
