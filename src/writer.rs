//
// mtfract - writer.rs - Image Writer
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
// A `Writer<W: Write>` owning its sink, matched to the PNM family: no chunk
// framing, no CRC, no deflate -- a PNM body is just a short text header
// followed by raw sample bytes (spec.md 4.5).
//

use std::io::Write;

use crate::color::{BitDepth, ColorScheme};
use crate::error::IoResult;

/// Writes a plot's pixel rows out as a PNM image, or as bare text rows for
/// the `Ascii` scheme (spec.md 4.5, "ASCII has no container").
pub struct Writer<W: Write> {
    inner: W,
    scheme: ColorScheme,
}

impl<W: Write> Writer<W> {
    pub fn new(inner: W, scheme: ColorScheme) -> Writer<W> {
        Writer { inner, scheme }
    }

    fn magic(&self) -> &'static str {
        match self.scheme.depth() {
            BitDepth::Ascii => unreachable!("ascii scheme has no PNM magic"),
            BitDepth::One => "P4",
            BitDepth::Eight => "P5",
            BitDepth::TwentyFour => "P6",
        }
    }

    /// Writes the PNM header: `"Pk W H [MAX] "`, single spaces, a trailing
    /// space before the binary body (spec.md 6, "byte-exact"). A no-op for
    /// the `Ascii` scheme, which emits unadorned text rows instead of a
    /// binary container.
    pub fn write_header(&mut self, width: u32, height: u32) -> IoResult<()> {
        match self.scheme.depth() {
            BitDepth::Ascii => Ok(()),
            BitDepth::One => write!(self.inner, "{} {} {} ", self.magic(), width, height),
            BitDepth::Eight | BitDepth::TwentyFour => {
                write!(self.inner, "{} {} {} 255 ", self.magic(), width, height)
            }
        }
    }

    /// Writes one row of already-painted sample bytes (spec.md 3, "Block").
    /// `Ascii` rows get a trailing newline; binary PNM rows are written
    /// back-to-back with no row separator, per the PNM raster format.
    pub fn write_row(&mut self, row: &[u8]) -> IoResult<()> {
        self.inner.write_all(row)?;
        if self.scheme.depth() == BitDepth::Ascii {
            self.inner.write_all(b"\n")?;
        }
        Ok(())
    }

    pub fn finish(&mut self) -> IoResult<()> {
        self.inner.flush()
    }

    pub fn into_inner(self) -> W {
        self.inner
    }
}
