//
// mtfract - complex number representations across three precisions
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
//
// Three numeric precisions share one `Complex` sum type rather than the
// function-pointer-over-a-mode-enum dispatch of the original design (see
// DESIGN.md, "polymorphism over precision"). Every variant carries its own
// state; there is no process-wide precision or bit-width global.
//

use std::fmt;
use std::str::FromStr;

use dashu_float::round::mode::Zero;
use dashu_float::FBig;
use num_complex::Complex64;
use twofloat::TwoFloat;

use crate::error::{protocol, IoResult};

/// Arbitrary-precision decimal float, rounding toward zero as required for
/// cross-worker reproducibility (spec.md 4.1: "consistent rounding ... so
/// results are reproducible across worker machines sharing b").
pub type MultiFloat = FBig<Zero, 10>;

pub const MP_BITS_MIN: u32 = 24;
pub const MP_BITS_MAX: u32 = 4096;

/// Double-double extended precision, standing in for "the widest hardware
/// float available" (spec.md 4.1) since Rust exposes no portable `long
/// double`. See DESIGN.md for the rationale.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct ExtComplex {
    pub re: TwoFloat,
    pub im: TwoFloat,
}

impl ExtComplex {
    pub fn new(re: TwoFloat, im: TwoFloat) -> ExtComplex {
        ExtComplex { re, im }
    }

    pub fn from_f64(re: f64, im: f64) -> ExtComplex {
        ExtComplex {
            re: TwoFloat::from(re),
            im: TwoFloat::from(im),
        }
    }

    fn norm_sqr(&self) -> TwoFloat {
        self.re * self.re + self.im * self.im
    }

    fn squared_plus(&self, c: &ExtComplex) -> ExtComplex {
        // (re + im*i)^2 + c
        let re = self.re * self.re - self.im * self.im + c.re;
        let im = self.re * self.im * TwoFloat::from(2.0) + c.im;
        ExtComplex { re, im }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct MultiComplex {
    pub re: MultiFloat,
    pub im: MultiFloat,
    pub bits: u32,
}

impl MultiComplex {
    pub fn from_f64(re: f64, im: f64, bits: u32) -> MultiComplex {
        let ctx = dashu_float::Context::<Zero>::new(digits_for_bits(bits));
        MultiComplex {
            re: ctx.convert_from_f64(re).value(),
            im: ctx.convert_from_f64(im).value(),
            bits,
        }
    }

    fn norm_sqr(&self) -> MultiFloat {
        &self.re * &self.re + &self.im * &self.im
    }

    fn squared_plus(&self, c: &MultiComplex) -> MultiComplex {
        let re = &self.re * &self.re - &self.im * &self.im + &c.re;
        let two = MultiFloat::from(2);
        let im = &two * &self.re * &self.im + &c.im;
        MultiComplex {
            re,
            im,
            bits: self.bits,
        }
    }
}

/// Converts a significand bit count to an approximately-equivalent number of
/// base-10 digits for `dashu_float`'s decimal context (`digits ~= bits /
/// log2(10)`). See DESIGN.md for why Multi precision is backed by a decimal
/// float rather than a binary one.
pub fn digits_for_bits(bits: u32) -> usize {
    ((bits as f64) / 10f64.log2()).ceil() as usize + 1
}

/// A complex number in one of the three precisions the kernel supports.
/// Mandelbrot/Julia iteration dispatches on this directly; there is no
/// separate `Precision` enum threaded alongside it.
#[derive(Clone, Debug, PartialEq)]
pub enum Complex {
    Std(Complex64),
    Ext(ExtComplex),
    Multi(MultiComplex),
}

impl Complex {
    pub fn re_f64(&self) -> f64 {
        match self {
            Complex::Std(c) => c.re,
            Complex::Ext(c) => f64::from(c.re),
            Complex::Multi(c) => c.re.to_f64().value(),
        }
    }

    pub fn im_f64(&self) -> f64 {
        match self {
            Complex::Std(c) => c.im,
            Complex::Ext(c) => f64::from(c.im),
            Complex::Multi(c) => c.im.to_f64().value(),
        }
    }

    /// |z|^2, as an f64 regardless of internal precision -- used only for
    /// the escape test and smoothing, where f64 range/precision is always
    /// sufficient (the escape radius is a small fixed constant).
    pub fn norm_sqr_f64(&self) -> f64 {
        match self {
            Complex::Std(c) => c.norm_sqr(),
            Complex::Ext(c) => f64::from(c.norm_sqr()),
            Complex::Multi(c) => c.norm_sqr().to_f64().value(),
        }
    }

    /// z <- z^2 + c, staying within this variant's precision.
    pub fn squared_plus(&self, c: &Complex) -> Complex {
        match (self, c) {
            (Complex::Std(z), Complex::Std(c)) => Complex::Std(z * z + c),
            (Complex::Ext(z), Complex::Ext(c)) => Complex::Ext(z.squared_plus(c)),
            (Complex::Multi(z), Complex::Multi(c)) => Complex::Multi(z.squared_plus(c)),
            _ => panic!("mismatched Complex precisions in squared_plus"),
        }
    }

    pub fn zero_like(&self) -> Complex {
        match self {
            Complex::Std(_) => Complex::Std(Complex64::new(0.0, 0.0)),
            Complex::Ext(_) => Complex::Ext(ExtComplex::from_f64(0.0, 0.0)),
            Complex::Multi(c) => Complex::Multi(MultiComplex::from_f64(0.0, 0.0, c.bits)),
        }
    }

    /// Parses the wire format `a+bi` (spec.md 4.8/6), producing a value in
    /// the given precision. `bits` is ignored outside `Multi`.
    pub fn parse(s: &str, precision: PrecisionTag, bits: u32) -> IoResult<Complex> {
        let (re, im) = split_complex(s)?;
        match precision {
            PrecisionTag::Std => {
                let re: f64 = re.parse().map_err(|_| protocol("bad real part"))?;
                let im: f64 = im.parse().map_err(|_| protocol("bad imaginary part"))?;
                Ok(Complex::Std(Complex64::new(re, im)))
            }
            PrecisionTag::Ext => {
                let re: f64 = re.parse().map_err(|_| protocol("bad real part"))?;
                let im: f64 = im.parse().map_err(|_| protocol("bad imaginary part"))?;
                Ok(Complex::Ext(ExtComplex::from_f64(re, im)))
            }
            PrecisionTag::Multi => {
                let ctx = dashu_float::Context::<Zero>::new(digits_for_bits(bits));
                let re = MultiFloat::from_str_native(re)
                    .map_err(|_| protocol("bad multi-precision real part"))?
                    .with_precision(ctx.precision())
                    .value();
                let im = MultiFloat::from_str_native(im)
                    .map_err(|_| protocol("bad multi-precision imaginary part"))?
                    .with_precision(ctx.precision())
                    .value();
                Ok(Complex::Multi(MultiComplex { re, im, bits }))
            }
        }
    }
}

impl fmt::Display for Complex {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Complex::Std(c) => write!(f, "{:.17e}+{:.17e}i", c.re, c.im),
            Complex::Ext(c) => write!(f, "{:.34e}+{:.34e}i", f64::from(c.re), f64::from(c.im)),
            Complex::Multi(c) => write!(f, "{}+{}i", c.re, c.im),
        }
    }
}

/// Which of the three numeric paths a `PlotCtx` runs on. Distinct from
/// `Complex` itself so it can travel alone in the handshake's first frame
/// before any bounds have been parsed.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum PrecisionTag {
    Std,
    Ext,
    Multi,
}

impl PrecisionTag {
    pub fn as_wire(&self) -> &'static str {
        match self {
            PrecisionTag::Std => "std",
            PrecisionTag::Ext => "ext",
            PrecisionTag::Multi => "multi",
        }
    }
}

impl FromStr for PrecisionTag {
    type Err = std::io::Error;

    fn from_str(s: &str) -> IoResult<PrecisionTag> {
        match s {
            "std" => Ok(PrecisionTag::Std),
            "ext" => Ok(PrecisionTag::Ext),
            "multi" => Ok(PrecisionTag::Multi),
            _ => Err(protocol("unrecognized precision tag")),
        }
    }
}

/// Splits `a+bi` into its two numeric substrings, handling a leading sign
/// on the real part and either sign on the imaginary part.
fn split_complex(s: &str) -> IoResult<(&str, &str)> {
    let s = s.strip_suffix('i').ok_or_else(|| protocol("complex literal must end in 'i'"))?;
    // Find the separating +/- that isn't the leading sign and isn't part
    // of an exponent (e.g. "1.5e-10+2i"). The separator is always the
    // *first* such character: it precedes the imaginary part, which may
    // carry its own leading sign right after it (e.g. "1.5+-2.5i", which
    // is exactly what this module's own `Display` impl emits for a
    // negative imaginary part) -- scanning to the *last* match would
    // instead land on that inner sign and split the real part in two.
    let bytes = s.as_bytes();
    let mut split_at = None;
    let mut i = 1;
    while i < bytes.len() {
        let b = bytes[i];
        if (b == b'+' || b == b'-') && bytes[i - 1] != b'e' && bytes[i - 1] != b'E' {
            split_at = Some(i);
            break;
        }
        i += 1;
    }
    let idx = split_at.ok_or_else(|| protocol("complex literal missing imaginary separator"))?;
    // A "+" separator is dropped (the imaginary part's own optional sign,
    // if any, follows immediately); a "-" separator doubles as the
    // imaginary part's sign and is kept, so "1.5-2.5i" parses as -2.5 and
    // "1.5+-2.5i" also parses as -2.5, without ever handing `f64::from_str`
    // a doubled-up "+-" prefix it would reject.
    let (re, im) = if bytes[idx] == b'+' {
        (&s[..idx], &s[idx + 1..])
    } else {
        (&s[..idx], &s[idx..])
    };
    Ok((re, im))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_std_complex() {
        let c = Complex::parse("-0.8+0.156i", PrecisionTag::Std, 0).unwrap();
        assert_eq!(c.re_f64(), -0.8);
        assert_eq!(c.im_f64(), 0.156);
    }

    #[test]
    fn parses_negative_imaginary() {
        let c = Complex::parse("1.5-2.5i", PrecisionTag::Std, 0).unwrap();
        assert_eq!(c.re_f64(), 1.5);
        assert_eq!(c.im_f64(), -2.5);
    }

    #[test]
    fn parses_plus_separator_with_negative_imaginary() {
        // The form this module's own `Display` impl emits for a negative
        // imaginary part: a "+" separator immediately followed by the
        // imaginary part's own "-" sign.
        let c = Complex::parse("1.5+-2.5i", PrecisionTag::Std, 0).unwrap();
        assert_eq!(c.re_f64(), 1.5);
        assert_eq!(c.im_f64(), -2.5);
    }

    #[test]
    fn display_round_trips_through_parse_for_negative_imaginary() {
        // Regression test: bounds like `-2 - 1.25i` (spec.md S1) round-trip
        // through the wire format used by the handshake (spec.md 4.8/6).
        let c = Complex::Std(Complex64::new(-2.0, -1.25));
        let wire = c.to_string();
        let parsed = Complex::parse(&wire, PrecisionTag::Std, 0).unwrap();
        assert_eq!(parsed.re_f64(), -2.0);
        assert_eq!(parsed.im_f64(), -1.25);
    }

    #[test]
    fn display_round_trips_through_parse_with_exponents() {
        let c = Complex::Std(Complex64::new(1.5e-10, -2.5e8));
        let wire = c.to_string();
        let parsed = Complex::parse(&wire, PrecisionTag::Std, 0).unwrap();
        assert_eq!(parsed.re_f64(), 1.5e-10);
        assert_eq!(parsed.im_f64(), -2.5e8);
    }

    #[test]
    fn ext_norm_sqr_matches_std() {
        let std = Complex::Std(Complex64::new(3.0, 4.0));
        let ext = Complex::Ext(ExtComplex::from_f64(3.0, 4.0));
        assert!((std.norm_sqr_f64() - ext.norm_sqr_f64()).abs() < 1e-9);
        assert_eq!(std.norm_sqr_f64(), 25.0);
    }

    #[test]
    fn squared_plus_matches_hand_math() {
        let z = Complex::Std(Complex64::new(1.0, 1.0));
        let c = Complex::Std(Complex64::new(0.5, -0.5));
        let out = z.squared_plus(&c);
        // (1+i)^2 = 2i ; + (0.5 - 0.5i) = 0.5 + 1.5i
        assert_eq!(out.re_f64(), 0.5);
        assert_eq!(out.im_f64(), 1.5);
    }
}
