//
// mtfract - mtfract.rs - CLI utility for rendering and distributed rendering
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

use std::fs::File;
use std::io;
use std::io::{BufWriter, Write};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::str::FromStr;

use clap::{Args, Parser, Subcommand};
use log::info;

use mtfract::color::ColorScheme;
use mtfract::complex::{Complex, PrecisionTag};
use mtfract::error::{other, IoResult};
use mtfract::net::worker;
use mtfract::{render, pool, PlotCtx, PlotKind, DEFAULT_PORT};

#[derive(Parser)]
#[command(name = "mtfract", version, about = "Multithreaded, optionally-distributed escape-time fractal renderer")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Render a plot on this machine alone.
    Render(PlotArgs),
    /// Render a plot as a master, distributing rows to connecting workers.
    Master(MasterArgs),
    /// Connect to a master and compute whatever rows it assigns.
    Worker(WorkerArgs),
}

#[derive(Args)]
struct PlotArgs {
    #[command(flatten)]
    plot: PlotParams,

    /// Output file path; defaults to stdout.
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Worker thread count; defaults to all logical CPUs.
    #[arg(long)]
    threads: Option<usize>,

    /// Memory budget in bytes for the Block Planner; defaults to half of
    /// free system memory.
    #[arg(long)]
    memory_budget: Option<u64>,
}

#[derive(Args)]
struct MasterArgs {
    #[command(flatten)]
    plot: PlotParams,

    /// Address to listen for worker connections on.
    #[arg(long, default_value_t = SocketAddr::from(([0, 0, 0, 0], DEFAULT_PORT)))]
    listen: SocketAddr,

    /// Output file path; defaults to stdout.
    #[arg(short, long)]
    output: Option<PathBuf>,
}

#[derive(Args)]
struct WorkerArgs {
    /// Address of the master to connect to.
    #[arg(long)]
    connect: SocketAddr,

    /// Worker thread count; defaults to all logical CPUs.
    #[arg(long)]
    threads: Option<usize>,
}

#[derive(Args)]
struct PlotParams {
    /// "mandelbrot" or "julia".
    #[arg(long, default_value = "mandelbrot")]
    kind: String,

    /// Numeric precision: "std", "ext", or "multi".
    #[arg(long, default_value = "std")]
    precision: String,

    /// Significand bit count, used only when --precision=multi.
    #[arg(long, default_value_t = 53)]
    bits: u32,

    /// Lower-left corner of the plot window, as "a+bi".
    #[arg(long)]
    min: String,

    /// Upper-right corner of the plot window, as "a+bi".
    #[arg(long)]
    max: String,

    /// Julia parameter c, as "a+bi"; ignored for Mandelbrot plots.
    #[arg(long, default_value = "0+0i")]
    julia_c: String,

    /// Iteration cap.
    #[arg(long, default_value_t = 1000)]
    n_max: u64,

    #[arg(long)]
    width: u32,

    #[arg(long)]
    height: u32,

    /// Color scheme, e.g. "rainbow", "fire", "ascii", "black-white".
    #[arg(long, default_value = "rainbow")]
    scheme: String,
}

impl PlotParams {
    fn build(&self) -> IoResult<PlotCtx> {
        let kind = match self.kind.as_str() {
            "mandelbrot" => PlotKind::Mandelbrot,
            "julia" => PlotKind::Julia,
            _ => return Err(other("--kind must be \"mandelbrot\" or \"julia\"")),
        };
        let precision = PrecisionTag::from_str(&self.precision)?;
        let min = Complex::parse(&self.min, precision, self.bits)?;
        let max = Complex::parse(&self.max, precision, self.bits)?;
        let julia_c = Complex::parse(&self.julia_c, precision, self.bits)?;
        let scheme = ColorScheme::from_wire(&self.scheme)?;

        PlotCtx::new(kind, precision, min, max, julia_c, self.n_max, self.width, self.height, scheme, self.bits)
    }
}

fn open_output(path: &Option<PathBuf>) -> IoResult<Box<dyn Write>> {
    match path {
        Some(p) => Ok(Box::new(BufWriter::new(File::create(p)?))),
        None => Ok(Box::new(BufWriter::new(io::stdout()))),
    }
}

fn main() -> IoResult<()> {
    env_logger::init();
    let cli = Cli::parse();

    match cli.command {
        Command::Render(args) => {
            let ctx = args.plot.build()?;
            let threads = args.threads.unwrap_or_else(pool::default_thread_count);
            let out = open_output(&args.output)?;
            render::render_local(&ctx, out, threads, args.memory_budget)?;
        }
        Command::Master(args) => {
            let ctx = args.plot.build()?;
            info!("listening for workers on {}", args.listen);
            let out = open_output(&args.output)?;
            render::render_distributed(&ctx, args.listen, out)?;
        }
        Command::Worker(args) => {
            let threads = args.threads.unwrap_or_else(pool::default_thread_count);
            let rows = worker::run(args.connect, threads)?;
            info!("computed {} rows for {}", rows, args.connect);
        }
    }

    Ok(())
}
