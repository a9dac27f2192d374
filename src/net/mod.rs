//
// mtfract - net/mod.rs - Network Context
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
// Master Dispatcher and Worker Loop share one underlying transport: a
// non-blocking `mio::net::TcpStream` plus a couple of retry-on-`WouldBlock`
// helpers. The framing itself (fixed `FRAME_SIZE` control frames, raw row
// payloads) lives in `protocol.rs` (spec.md 4.7/4.8).
//

pub mod master;
pub mod protocol;
pub mod worker;

use std::io::{self, Read, Write};

use mio::net::TcpStream;

/// Writes `buf` in full, retrying on `WouldBlock`/`Interrupted` rather than
/// propagating them. The master and worker loops only call this right after
/// a `Poll` readiness event (or on a stream they just connected), so the
/// retry window is always short in practice.
pub(crate) fn write_all_retrying(stream: &mut TcpStream, mut buf: &[u8]) -> io::Result<()> {
    while !buf.is_empty() {
        match stream.write(buf) {
            Ok(0) => return Err(io::Error::new(io::ErrorKind::WriteZero, "peer closed the connection")),
            Ok(n) => buf = &buf[n..],
            Err(ref e) if e.kind() == io::ErrorKind::WouldBlock => continue,
            Err(ref e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        }
    }
    Ok(())
}

/// Reads until `buf` is completely filled, retrying on `WouldBlock`. A
/// return of `Ok(0)` from the underlying stream (peer hangup) is surfaced
/// as `UnexpectedEof` so callers can treat it the same as any other
/// disconnect (spec.md 6, "worker fault").
pub(crate) fn read_exact_retrying(stream: &mut TcpStream, buf: &mut [u8]) -> io::Result<()> {
    let mut filled = 0;
    while filled < buf.len() {
        match stream.read(&mut buf[filled..]) {
            Ok(0) => return Err(io::Error::new(io::ErrorKind::UnexpectedEof, "peer closed the connection")),
            Ok(n) => filled += n,
            Err(ref e) if e.kind() == io::ErrorKind::WouldBlock => continue,
            Err(ref e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        }
    }
    Ok(())
}
