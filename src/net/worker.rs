//
// mtfract - net/worker.rs - Worker Loop
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
// A worker is a single connection, so unlike the master it never needs a
// `Poll` of its own: connect, handshake, then alternate blocking-style reads
// and writes until the master sends DONE or drops the connection
// (spec.md 6).
//

use std::net::SocketAddr;

use log::info;

use crate::net::protocol::{self, RowAssignment};
use crate::net::{read_exact_retrying, write_all_retrying};
use crate::pool;
use crate::FRAME_SIZE;

use mio::net::TcpStream as MioTcpStream;
use std::net::TcpStream as StdTcpStream;

/// Connects to the master at `addr`, completes the handshake, and services
/// row assignments until told to stop. Returns the number of rows it
/// computed, mostly useful for tests.
pub fn run(addr: SocketAddr, threads: usize) -> crate::error::IoResult<usize> {
    let std_stream = StdTcpStream::connect(addr)?;
    std_stream.set_nonblocking(true)?;
    let mut stream = MioTcpStream::from_std(std_stream);

    let mut frame = [0u8; FRAME_SIZE];
    read_exact_retrying(&mut stream, &mut frame)?;
    let precision = protocol::decode_precision(&frame)?;

    read_exact_retrying(&mut stream, &mut frame)?;
    let ctx = protocol::decode_params(&frame)?;
    debug_assert_eq!(ctx.precision, precision);

    let row_size = ctx.row_size();
    let mut rows_done = 0usize;

    read_exact_retrying(&mut stream, &mut frame)?;
    let mut assignment = protocol::decode_row_assignment(&frame)?;

    loop {
        let row = match assignment {
            RowAssignment::Done => break,
            RowAssignment::Row(row) => row,
        };

        let mut buf = vec![0u8; row_size];
        pool::render_block(&ctx, row, row + 1, threads, &mut buf);

        write_all_retrying(&mut stream, &protocol::encode_result(row)?)?;
        write_all_retrying(&mut stream, &buf)?;
        rows_done += 1;

        read_exact_retrying(&mut stream, &mut frame)?;
        assignment = protocol::decode_row_assignment(&frame)?;
    }

    info!("worker computed {} rows", rows_done);
    Ok(rows_done)
}
