//
// Integration tests for the single-process rendering scenarios (S1-S4), plus
// end-to-end renders in the Ext and Multi precisions (spec.md 8, property 4:
// rendering is reproducible across precisions sharing the same parameters).
//

use mtfract::color::ColorScheme;
use mtfract::complex::{Complex, ExtComplex, MultiComplex, PrecisionTag};
use mtfract::render::render_local;
use mtfract::{PlotCtx, PlotKind};
use num_complex::Complex64;

fn std_complex(re: f64, im: f64) -> Complex {
    Complex::Std(Complex64::new(re, im))
}

fn ext_complex(re: f64, im: f64) -> Complex {
    Complex::Ext(ExtComplex::from_f64(re, im))
}

fn multi_complex(re: f64, im: f64, bits: u32) -> Complex {
    Complex::Multi(MultiComplex::from_f64(re, im, bits))
}

#[test]
fn s1_mandelbrot_tiny_rainbow() {
    let ctx = PlotCtx::new(
        PlotKind::Mandelbrot,
        PrecisionTag::Std,
        std_complex(-2.0, -1.25),
        std_complex(0.75, 1.25),
        std_complex(0.0, 0.0),
        100,
        550,
        500,
        ColorScheme::Rainbow,
        0,
    )
    .unwrap();

    let mut out = Vec::new();
    render_local(&ctx, &mut out, 4, Some(64 * 1024 * 1024)).unwrap();

    let header = b"P6 550 500 255 ";
    assert!(out.starts_with(header));
    let body = &out[header.len()..];
    assert_eq!(body.len(), 550 * 500 * 3);

    // The pixel nearest c=0 sits inside the main cardioid and never
    // escapes, rendering black regardless of color scheme.
    let dx = (0.75 - (-2.0)) / 549.0;
    let dy = (1.25 - (-1.25)) / 499.0;
    let x = ((0.0 - (-2.0)) / dx).round() as usize;
    let y = ((1.25 - 0.0) / dy).round() as usize;
    let offset = (y * 550 + x) * 3;
    assert_eq!(&body[offset..offset + 3], &[0, 0, 0]);
}

#[test]
fn s2_julia_matrix_center_is_unescaped() {
    let ctx = PlotCtx::new(
        PlotKind::Julia,
        PrecisionTag::Std,
        std_complex(-2.0, -2.0),
        std_complex(2.0, 2.0),
        std_complex(-0.8, 0.156),
        100,
        800,
        800,
        ColorScheme::Matrix,
        0,
    )
    .unwrap();

    let mut out = Vec::new();
    render_local(&ctx, &mut out, 4, Some(64 * 1024 * 1024)).unwrap();

    let header = b"P6 800 800 255 ";
    assert!(out.starts_with(header));
    let body = &out[header.len()..];

    let row_size = 800 * 3;
    let center_row = 400;
    let center_col = 400;
    let offset = center_row * row_size + center_col * 3;
    assert_eq!(&body[offset..offset + 3], &[0, 0, 0]);
}

#[test]
fn s3_one_bit_body_is_two_bytes() {
    let ctx = PlotCtx::new(
        PlotKind::Mandelbrot,
        PrecisionTag::Std,
        std_complex(-2.0, -1.25),
        std_complex(0.75, 1.25),
        std_complex(0.0, 0.0),
        100,
        16,
        1,
        ColorScheme::BlackWhite,
        0,
    )
    .unwrap();

    let mut out = Vec::new();
    render_local(&ctx, &mut out, 2, Some(64 * 1024 * 1024)).unwrap();

    let header = b"P4 16 1 ";
    assert!(out.starts_with(header));
    let body = &out[header.len()..];
    assert_eq!(body.len(), 2);
}

#[test]
fn s4_ascii_terminal_has_80_by_46_lines() {
    let ctx = PlotCtx::new(
        PlotKind::Mandelbrot,
        PrecisionTag::Std,
        std_complex(-2.0, -1.25),
        std_complex(0.75, 1.25),
        std_complex(0.0, 0.0),
        100,
        80,
        46,
        ColorScheme::Ascii,
        0,
    )
    .unwrap();

    let mut out = Vec::new();
    render_local(&ctx, &mut out, 4, Some(64 * 1024 * 1024)).unwrap();

    let text = std::str::from_utf8(&out).unwrap();
    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(lines.len(), 46);
    for line in &lines {
        assert_eq!(line.len(), 80);
    }
    assert!(text.ends_with('\n'));

    // c = -0.6076 - 0.0278i sits inside the main cardioid.
    let ch = lines[23].as_bytes()[40];
    assert_eq!(ch, b'@');
}

/// How many bytes of two equal-length buffers differ. Used to compare
/// renders across precisions: interior/exterior pixels should agree
/// everywhere except possibly right at the fractal boundary, where a
/// different precision's last-bit rounding can tip a borderline pixel's
/// escape count by one iteration.
fn byte_mismatches(a: &[u8], b: &[u8]) -> usize {
    assert_eq!(a.len(), b.len());
    a.iter().zip(b.iter()).filter(|(x, y)| x != y).count()
}

/// Ext precision (`twofloat` double-double) must render the same plot Std
/// precision does, agreeing on nearly every pixel: the extra precision only
/// changes behavior deep in a zoom, so at this modest iteration cap and
/// zoom level almost all escape counts should match exactly (spec.md 8,
/// property 4).
#[test]
fn ext_precision_render_matches_std_precision() {
    let std_ctx = PlotCtx::new(
        PlotKind::Mandelbrot,
        PrecisionTag::Std,
        std_complex(-2.0, -1.25),
        std_complex(0.75, 1.25),
        std_complex(0.0, 0.0),
        100,
        40,
        30,
        ColorScheme::Greyscale,
        0,
    )
    .unwrap();
    let ext_ctx = PlotCtx::new(
        PlotKind::Mandelbrot,
        PrecisionTag::Ext,
        ext_complex(-2.0, -1.25),
        ext_complex(0.75, 1.25),
        ext_complex(0.0, 0.0),
        100,
        40,
        30,
        ColorScheme::Greyscale,
        0,
    )
    .unwrap();

    let mut std_out = Vec::new();
    let mut ext_out = Vec::new();
    render_local(&std_ctx, &mut std_out, 4, Some(64 * 1024 * 1024)).unwrap();
    render_local(&ext_ctx, &mut ext_out, 4, Some(64 * 1024 * 1024)).unwrap();

    let header = b"P5 40 30 255 ";
    assert!(ext_out.starts_with(header));
    let mismatches = byte_mismatches(&std_out[header.len()..], &ext_out[header.len()..]);
    assert!(mismatches <= 2, "{} of 1200 pixels disagreed between Std and Ext precision", mismatches);
}

/// Multi precision (`dashu_float`, arbitrary decimal significand) must also
/// reproduce nearly the same render, exercising `MultiComplex::squared_plus`
/// and the Multi kernel path end to end rather than leaving it untested
/// behind the wire-protocol unit tests alone (spec.md 8, property 4).
#[test]
fn multi_precision_render_matches_std_precision() {
    let bits = 128;
    let std_ctx = PlotCtx::new(
        PlotKind::Mandelbrot,
        PrecisionTag::Std,
        std_complex(-2.0, -1.25),
        std_complex(0.75, 1.25),
        std_complex(0.0, 0.0),
        100,
        40,
        30,
        ColorScheme::Greyscale,
        0,
    )
    .unwrap();
    let multi_ctx = PlotCtx::new(
        PlotKind::Mandelbrot,
        PrecisionTag::Multi,
        multi_complex(-2.0, -1.25, bits),
        multi_complex(0.75, 1.25, bits),
        multi_complex(0.0, 0.0, bits),
        100,
        40,
        30,
        ColorScheme::Greyscale,
        bits,
    )
    .unwrap();

    let mut std_out = Vec::new();
    let mut multi_out = Vec::new();
    render_local(&std_ctx, &mut std_out, 4, Some(64 * 1024 * 1024)).unwrap();
    render_local(&multi_ctx, &mut multi_out, 4, Some(64 * 1024 * 1024)).unwrap();

    let header = b"P5 40 30 255 ";
    assert!(multi_out.starts_with(header));
    let mismatches = byte_mismatches(&std_out[header.len()..], &multi_out[header.len()..]);
    assert!(mismatches <= 2, "{} of 1200 pixels disagreed between Std and Multi precision", mismatches);
}

/// A Julia render in Multi precision, covering the `z0 = c_j` starting-point
/// path (rather than Mandelbrot's `z0 = 0`) for the arbitrary-precision
/// kernel.
#[test]
fn multi_precision_julia_render_is_well_formed() {
    let bits = 96;
    let ctx = PlotCtx::new(
        PlotKind::Julia,
        PrecisionTag::Multi,
        multi_complex(-1.5, -1.5, bits),
        multi_complex(1.5, 1.5, bits),
        multi_complex(-0.7, 0.27015, bits),
        80,
        20,
        20,
        ColorScheme::Ascii,
        bits,
    )
    .unwrap();

    let mut out = Vec::new();
    render_local(&ctx, &mut out, 2, Some(64 * 1024 * 1024)).unwrap();

    let text = std::str::from_utf8(&out).unwrap();
    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(lines.len(), 20);
    for line in &lines {
        assert_eq!(line.len(), 20);
    }
}
