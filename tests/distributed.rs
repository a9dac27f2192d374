//
// Integration tests for the distributed rendering path (S5, S6): a master
// dispatching rows to real worker processes over TCP on 127.0.0.1.
//

use std::io::{Read, Write};
use std::net::{SocketAddr, TcpStream};
use std::thread;
use std::time::Duration;

use mtfract::color::ColorScheme;
use mtfract::complex::{Complex, PrecisionTag};
use mtfract::net::protocol::{self, RowAssignment};
use mtfract::net::{master, worker};
use mtfract::{pool, PlotCtx, PlotKind, FRAME_SIZE};
use num_complex::Complex64;

fn std_complex(re: f64, im: f64) -> Complex {
    Complex::Std(Complex64::new(re, im))
}

fn small_ctx() -> PlotCtx {
    PlotCtx::new(
        PlotKind::Mandelbrot,
        PrecisionTag::Std,
        std_complex(-2.0, -1.25),
        std_complex(0.75, 1.25),
        std_complex(0.0, 0.0),
        100,
        24,
        10,
        ColorScheme::Greyscale,
        0,
    )
    .unwrap()
}

fn connect_retrying(addr: SocketAddr) -> TcpStream {
    let deadline = std::time::Instant::now() + Duration::from_secs(5);
    loop {
        match TcpStream::connect(addr) {
            Ok(s) => return s,
            Err(_) if std::time::Instant::now() < deadline => {
                thread::sleep(Duration::from_millis(20));
            }
            Err(e) => panic!("could not connect to master at {}: {}", addr, e),
        }
    }
}

/// Runs a worker that computes exactly one row, sends its result, then
/// disconnects without reading its next assignment -- simulating S6's
/// "worker fault" scenario.
fn run_faulty_worker_one_row(addr: SocketAddr) {
    let mut stream = connect_retrying(addr);

    let mut frame = [0u8; FRAME_SIZE];
    stream.read_exact(&mut frame).unwrap();
    let precision = protocol::decode_precision(&frame).unwrap();

    stream.read_exact(&mut frame).unwrap();
    let ctx = protocol::decode_params(&frame).unwrap();
    assert_eq!(ctx.precision, precision);

    stream.read_exact(&mut frame).unwrap();
    let row = match protocol::decode_row_assignment(&frame).unwrap() {
        RowAssignment::Row(row) => row,
        RowAssignment::Done => return,
    };

    let row_size = ctx.row_size();
    let mut buf = vec![0u8; row_size];
    pool::render_block(&ctx, row, row + 1, 2, &mut buf);

    stream.write_all(&protocol::encode_result(row).unwrap()).unwrap();
    stream.write_all(&buf).unwrap();
    // Drop without reading the next assignment -- the master must notice
    // the disconnect and reassign whatever row it sent next.
}

#[test]
fn s5_distributed_output_matches_standalone() {
    let addr: SocketAddr = "127.0.0.1:17391".parse().unwrap();
    let ctx = small_ctx();

    let master_ctx = ctx.clone();
    let master_handle = thread::spawn(move || master::run(&master_ctx, addr).unwrap());

    // Give the listener a moment to bind before the worker dials in.
    thread::sleep(Duration::from_millis(50));
    let worker_handle = thread::spawn(move || worker::run(addr, 4).unwrap());

    let rows_computed = worker_handle.join().unwrap();
    assert_eq!(rows_computed, ctx.height as usize);

    let distributed_canvas = master_handle.join().unwrap();

    let mut standalone = Vec::new();
    mtfract::render::render_local(&ctx, &mut standalone, 4, Some(64 * 1024 * 1024)).unwrap();
    let header = format!("P5 {} {} 255 ", ctx.width, ctx.height);
    assert!(standalone.starts_with(header.as_bytes()));
    let standalone_body = &standalone[header.len()..];

    assert_eq!(distributed_canvas, standalone_body);
}

#[test]
fn s6_worker_fault_is_recovered_by_reassignment() {
    let addr: SocketAddr = "127.0.0.1:17392".parse().unwrap();
    let ctx = small_ctx();

    let master_ctx = ctx.clone();
    let master_handle = thread::spawn(move || master::run(&master_ctx, addr).unwrap());

    thread::sleep(Duration::from_millis(50));

    // Run the faulty worker to completion (it connects, computes one row,
    // and disconnects) *before* the recovering worker ever dials in. If a
    // second worker were racing the faulty one, it could drain the row
    // stack and receive DONE before the master notices the disconnect and
    // requeues the row the faulty worker abandoned -- stranding that row
    // with no worker left to claim it. Sequencing the two, with a pause
    // long enough for the master's poll loop to observe the EOF, makes the
    // reassignment happen before anyone else asks for work.
    let faulty = thread::spawn(move || run_faulty_worker_one_row(addr));
    faulty.join().unwrap();
    thread::sleep(Duration::from_millis(200));

    let good = thread::spawn(move || worker::run(addr, 4).unwrap());
    let rows_computed_by_good_worker = good.join().unwrap();
    let distributed_canvas = master_handle.join().unwrap();

    // The faulty worker's abandoned row must have been recovered by the
    // surviving worker (or the master never would have finished at all).
    assert!(rows_computed_by_good_worker >= 1);

    let mut standalone = Vec::new();
    mtfract::render::render_local(&ctx, &mut standalone, 4, Some(64 * 1024 * 1024)).unwrap();
    let header = format!("P5 {} {} 255 ", ctx.width, ctx.height);
    let standalone_body = &standalone[header.len()..];

    assert_eq!(distributed_canvas, standalone_body);
}
