//
// mtfract - net/master.rs - Master Dispatcher
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
// One `mio::Poll` over every worker connection plus the listening socket.
// Rows live on a `RowStack` (spec.md 4.6); a worker that disconnects mid-row
// gets that row pushed back on top so the next worker to ask picks it up
// first (spec.md 6, "worker fault"). Grounded on the connection-state-machine
// shape of the pack's mio TCP stream wrapper, simplified for fixed-size
// frames instead of length-prefixed ones.
//

use std::collections::HashMap;
use std::net::SocketAddr;

use log::{info, warn};
use mio::net::{TcpListener, TcpStream};
use mio::{Events, Interest, Poll, Token};

use crate::error::{other, IoResult};
use crate::net::protocol;
use crate::net::{read_exact_retrying, write_all_retrying};
use crate::rowstack::RowStack;
use crate::PlotCtx;

const LISTENER: Token = Token(0);

struct WorkerConn {
    stream: TcpStream,
    assigned_row: Option<u32>,
}

/// Runs the master side of the protocol until every row of `ctx` has been
/// computed by some worker, returning the assembled image as one
/// `height * row_size` byte buffer in row-major order.
pub fn run(ctx: &PlotCtx, addr: SocketAddr) -> IoResult<Vec<u8>> {
    let row_size = ctx.row_size();
    let mut canvas = vec![0u8; row_size * ctx.height as usize];
    let mut remaining = ctx.height as usize;

    let mut rows = RowStack::new(ctx.height as usize);
    for y in 0..ctx.height {
        rows.push(y);
    }

    let mut listener = TcpListener::bind(addr)?;
    let mut poll = Poll::new()?;
    poll.registry().register(&mut listener, LISTENER, Interest::READABLE)?;

    let mut conns: HashMap<Token, WorkerConn> = HashMap::new();
    let mut next_token = 1usize;
    let mut events = Events::with_capacity(128);

    while remaining > 0 {
        // Infinite timeout: a stuck worker pins its row, not the render
        // (spec.md 5, "poll uses infinite timeout"; 4.9, "the master blocks
        // on poll indefinitely").
        poll.poll(&mut events, None)?;

        for event in events.iter() {
            if event.token() == LISTENER {
                loop {
                    match listener.accept() {
                        Ok((mut stream, peer)) => {
                            let token = Token(next_token);
                            next_token += 1;
                            // READABLE-only: a WRITABLE-only event fires as
                            // soon as the send buffer has room, before the
                            // worker has sent anything, and would otherwise
                            // make handle_worker_event block-retry-read on a
                            // row that isn't ready, stalling every other
                            // worker (spec.md 5/9, "non-blocking dispatch").
                            poll.registry().register(&mut stream, token, Interest::READABLE)?;
                            info!("worker connected from {}", peer);

                            let precision_frame = match protocol::encode_precision(ctx.precision) {
                                Ok(frame) => frame,
                                Err(e) => {
                                    warn!("could not build handshake for {}: {}", peer, e);
                                    continue;
                                }
                            };
                            let params_frame = match protocol::encode_params(ctx) {
                                Ok(frame) => frame,
                                Err(e) => {
                                    warn!("could not build handshake for {}: {}", peer, e);
                                    continue;
                                }
                            };
                            if let Err(e) = write_all_retrying(&mut stream, &precision_frame) {
                                warn!("handshake failed for {}: {}", peer, e);
                                continue;
                            }
                            if let Err(e) = write_all_retrying(&mut stream, &params_frame) {
                                warn!("handshake failed for {}: {}", peer, e);
                                continue;
                            }

                            let assigned_row = rows.pop();
                            let assignment_frame = match assigned_row {
                                Some(row) => protocol::encode_row(row),
                                None => protocol::encode_done(),
                            };
                            let assignment_frame = match assignment_frame {
                                Ok(frame) => frame,
                                Err(e) => {
                                    warn!("could not build row assignment for {}: {}", peer, e);
                                    if let Some(row) = assigned_row {
                                        rows.push(row);
                                    }
                                    continue;
                                }
                            };
                            if let Err(e) = write_all_retrying(&mut stream, &assignment_frame) {
                                warn!("row assignment failed for {}: {}", peer, e);
                                if let Some(row) = assigned_row {
                                    rows.push(row);
                                }
                                continue;
                            }

                            conns.insert(token, WorkerConn { stream, assigned_row });
                        }
                        Err(ref e) if e.kind() == std::io::ErrorKind::WouldBlock => break,
                        Err(e) => return Err(e),
                    }
                }
                continue;
            }

            let token = event.token();

            // Only a readable event carries a result to act on; a hangup or
            // error with no readable data is released without attempting a
            // read that would just retry forever (spec.md 4.9, "if not
            // POLLIN: release worker").
            let outcome = if event.is_readable() {
                handle_worker_event(&mut conns, token, &mut rows, &mut canvas, row_size)
            } else {
                Err(other("worker connection closed or errored"))
            };

            match outcome {
                Ok(Some(rows_completed)) => remaining -= rows_completed,
                Ok(None) => {}
                Err(e) => {
                    warn!("worker {:?} dropped: {}", token, e);
                    if let Some(mut conn) = conns.remove(&token) {
                        let _ = poll.registry().deregister(&mut conn.stream);
                        if let Some(row) = conn.assigned_row {
                            rows.push(row);
                        }
                    }
                }
            }
        }
    }

    Ok(canvas)
}

/// Services one readiness event for an established worker connection:
/// reads a RESULT frame, the row payload that follows it, writes the row
/// into `canvas`, and hands the worker its next row (or DONE).
///
/// Returns `Ok(Some(1))` when a row was completed, `Ok(None)` if the event
/// carried no result (e.g. pure writable readiness), or `Err` on any I/O
/// failure -- the caller treats all errors as a dead connection.
fn handle_worker_event(
    conns: &mut HashMap<Token, WorkerConn>,
    token: Token,
    rows: &mut RowStack,
    canvas: &mut [u8],
    row_size: usize,
) -> IoResult<Option<usize>> {
    let conn = conns.get_mut(&token).ok_or_else(|| other("event for unknown worker token"))?;

    let mut header = [0u8; crate::FRAME_SIZE];
    read_exact_retrying(&mut conn.stream, &mut header)?;
    let row = protocol::decode_result(&header)?;

    let mut payload = vec![0u8; row_size];
    read_exact_retrying(&mut conn.stream, &mut payload)?;

    let start = row as usize * row_size;
    canvas[start..start + row_size].copy_from_slice(&payload);
    conn.assigned_row = None;

    let next_row = rows.pop();
    let encoded = match next_row {
        Some(r) => protocol::encode_row(r),
        None => protocol::encode_done(),
    };
    let assignment_frame = match encoded {
        Ok(frame) => frame,
        Err(e) => {
            if let Some(r) = next_row {
                rows.push(r);
            }
            return Err(e);
        }
    };
    write_all_retrying(&mut conn.stream, &assignment_frame)?;
    conn.assigned_row = next_row;

    Ok(Some(1))
}
