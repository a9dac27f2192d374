//
// mtfract - error.rs - error helpers
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
// A small `other`/`invalid_input` pair plus a couple of names specific to
// the render pipeline's failure modes (spec.md 7). Plain `std::io::Error`
// throughout, no `thiserror`.
//

use std::io;
use std::io::{Error, ErrorKind};

pub type IoResult<T> = io::Result<T>;

pub fn other(payload: &str) -> Error {
    Error::new(ErrorKind::Other, payload)
}

pub fn invalid_input(payload: &str) -> Error {
    Error::new(ErrorKind::InvalidInput, payload)
}

/// A plot parameter failed its invariant check (spec.md 3), before any
/// allocation took place.
pub fn bad_bounds(payload: &str) -> Error {
    Error::new(ErrorKind::InvalidInput, format!("invalid plot bounds: {}", payload))
}

/// The Block Planner exhausted `k in 1..=64` without finding a block count
/// that fits the memory budget (spec.md 4.3).
pub fn alloc_exhausted(payload: &str) -> Error {
    Error::new(ErrorKind::Other, format!("block allocation exhausted: {}", payload))
}

/// A handshake or row-work frame failed to parse (spec.md 4.8).
pub fn protocol(payload: &str) -> Error {
    Error::new(ErrorKind::InvalidData, format!("protocol error: {}", payload))
}
