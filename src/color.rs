//
// mtfract - color.rs - maps escape-time results to pixel bytes
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
// Bit depth specializes on `BitDepth`: one small enum, matched once per
// pixel, no dynamic dispatch.
//

use crate::kernel::EscapeResult;

const ASCII_CHARS: &[u8] = b" .:-=+*#%@";

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum BitDepth {
    Ascii,
    One,
    Eight,
    TwentyFour,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ColorScheme {
    Ascii,
    BlackWhite,
    WhiteBlack,
    Greyscale,
    Rainbow,
    RainbowVibrant,
    RedWhite,
    Fire,
    RedHot,
    Matrix,
}

impl ColorScheme {
    /// Stable wire name used in the handshake frame (spec.md 4.8/6) and on
    /// the CLI.
    pub fn as_wire(&self) -> &'static str {
        match self {
            ColorScheme::Ascii => "ascii",
            ColorScheme::BlackWhite => "black-white",
            ColorScheme::WhiteBlack => "white-black",
            ColorScheme::Greyscale => "greyscale",
            ColorScheme::Rainbow => "rainbow",
            ColorScheme::RainbowVibrant => "rainbow-vibrant",
            ColorScheme::RedWhite => "red-white",
            ColorScheme::Fire => "fire",
            ColorScheme::RedHot => "red-hot",
            ColorScheme::Matrix => "matrix",
        }
    }

    pub fn from_wire(s: &str) -> crate::error::IoResult<ColorScheme> {
        Ok(match s {
            "ascii" => ColorScheme::Ascii,
            "black-white" => ColorScheme::BlackWhite,
            "white-black" => ColorScheme::WhiteBlack,
            "greyscale" => ColorScheme::Greyscale,
            "rainbow" => ColorScheme::Rainbow,
            "rainbow-vibrant" => ColorScheme::RainbowVibrant,
            "red-white" => ColorScheme::RedWhite,
            "fire" => ColorScheme::Fire,
            "red-hot" => ColorScheme::RedHot,
            "matrix" => ColorScheme::Matrix,
            _ => return Err(crate::error::protocol("unrecognized color scheme")),
        })
    }

    pub fn depth(&self) -> BitDepth {
        match self {
            ColorScheme::Ascii => BitDepth::Ascii,
            ColorScheme::BlackWhite | ColorScheme::WhiteBlack => BitDepth::One,
            ColorScheme::Greyscale => BitDepth::Eight,
            ColorScheme::Rainbow
            | ColorScheme::RainbowVibrant
            | ColorScheme::RedWhite
            | ColorScheme::Fire
            | ColorScheme::RedHot
            | ColorScheme::Matrix => BitDepth::TwentyFour,
        }
    }

    /// Bytes needed to hold one row of `width` pixels at this scheme's depth
    /// (spec.md 3, "Block").
    pub fn row_size(&self, width: u32) -> usize {
        let width = width as usize;
        match self.depth() {
            BitDepth::Ascii => width,
            BitDepth::One => (width + 7) / 8,
            BitDepth::Eight => width,
            BitDepth::TwentyFour => width * 3,
        }
    }
}

impl std::str::FromStr for ColorScheme {
    type Err = std::io::Error;

    fn from_str(s: &str) -> crate::error::IoResult<ColorScheme> {
        ColorScheme::from_wire(s)
    }
}

/// `nu = n + 1 - log2(log2(|z|))`, defined only when escaped (spec.md 4.1/4.2).
fn smoothed_count(result: &EscapeResult) -> f64 {
    let abs_z = result.norm_sqr.sqrt();
    result.n as f64 + 1.0 - abs_z.log2().log2()
}

fn hsv_to_rgb(h: f64, s: f64, v: f64) -> (u8, u8, u8) {
    let h = h.rem_euclid(360.0);
    let c = v * s;
    let x = c * (1.0 - ((h / 60.0).rem_euclid(2.0) - 1.0).abs());
    let m = v - c;
    let (r1, g1, b1) = if h < 60.0 {
        (c, x, 0.0)
    } else if h < 120.0 {
        (x, c, 0.0)
    } else if h < 180.0 {
        (0.0, c, x)
    } else if h < 240.0 {
        (0.0, x, c)
    } else if h < 300.0 {
        (x, 0.0, c)
    } else {
        (c, 0.0, x)
    };
    let to_byte = |chan: f64| ((chan + m) * 255.0).round().clamp(0.0, 255.0) as u8;
    (to_byte(r1), to_byte(g1), to_byte(b1))
}

fn hsv_for_scheme(scheme: ColorScheme, nu: f64) -> (f64, f64, f64) {
    match scheme {
        ColorScheme::Rainbow => ((30.0 * nu).rem_euclid(360.0), 0.6, 0.8),
        ColorScheme::RainbowVibrant => ((30.0 * nu).rem_euclid(360.0), 1.0, 1.0),
        ColorScheme::RedWhite => {
            let s = (0.7_f64).min(0.7 - ((nu / 20.0).rem_euclid(1.4) - 0.7).abs());
            (0.0, s, 1.0)
        }
        ColorScheme::Fire => {
            let h = 50.0 - ((2.0 * nu).rem_euclid(100.0) - 50.0).abs();
            (h, 0.85, 0.85)
        }
        ColorScheme::RedHot => {
            let m = 90.0 - ((2.0 * nu).rem_euclid(180.0) - 90.0).abs();
            if m <= 30.0 {
                (0.0, 1.0, m / 30.0)
            } else {
                (m - 30.0, 1.0, 1.0)
            }
        }
        ColorScheme::Matrix => {
            let v = (90.0 - ((2.0 * nu).rem_euclid(180.0) - 90.0).abs()) / 90.0;
            (120.0, 1.0, v)
        }
        _ => unreachable!("hsv_for_scheme called on a non-24-bit scheme"),
    }
}

/// Paints one pixel's bytes into `row`, the destination row buffer.
///
/// `x` is the pixel's column, used to locate the byte (and, for 1-bit
/// schemes, the bit) within `row`.
pub fn paint(scheme: ColorScheme, result: &EscapeResult, n_max: u64, row: &mut [u8], x: usize) {
    let escaped = result.n < n_max;

    match scheme.depth() {
        BitDepth::Ascii => {
            let ch = if !escaped {
                ASCII_CHARS[ASCII_CHARS.len() - 1]
            } else {
                let nu = smoothed_count(result);
                let idx = (0.3 * nu).floor().rem_euclid((ASCII_CHARS.len() - 1) as f64) as usize;
                ASCII_CHARS[idx]
            };
            row[x] = ch;
        }
        BitDepth::One => {
            let byte_idx = x / 8;
            let bit_offset = x % 8;
            let bit = 7 - bit_offset;
            let set = match scheme {
                ColorScheme::BlackWhite => !escaped,
                ColorScheme::WhiteBlack => escaped,
                _ => unreachable!(),
            };
            if set {
                row[byte_idx] |= 1 << bit;
            } else {
                row[byte_idx] &= !(1 << bit);
            }
        }
        BitDepth::Eight => {
            let value = if !escaped {
                0
            } else {
                let nu = smoothed_count(result);
                let v = 255.0 - ((8.5 * nu).rem_euclid(510.0) - 255.0).abs();
                v.max(30.0).round() as u8
            };
            row[x] = value;
        }
        BitDepth::TwentyFour => {
            let (r, g, b) = if !escaped {
                (0, 0, 0)
            } else {
                let nu = smoothed_count(result);
                let (h, s, v) = hsv_for_scheme(scheme, nu);
                hsv_to_rgb(h, s, v)
            };
            let off = x * 3;
            row[off] = r;
            row[off + 1] = g;
            row[off + 2] = b;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn escaped(n: u64, abs_z: f64) -> EscapeResult {
        EscapeResult {
            n,
            norm_sqr: abs_z * abs_z,
        }
    }

    #[test]
    fn one_bit_black_white_sets_bit_on_unescaped() {
        let mut row = vec![0u8; 1];
        let inside = EscapeResult { n: 100, norm_sqr: 0.0 };
        paint(ColorScheme::BlackWhite, &inside, 100, &mut row, 0);
        assert_eq!(row[0], 0b1000_0000);
    }

    #[test]
    fn one_bit_white_black_is_complement() {
        let mut row_bw = vec![0u8; 1];
        let mut row_wb = vec![0u8; 1];
        let escaped = escaped(5, 20.0);
        paint(ColorScheme::BlackWhite, &escaped, 100, &mut row_bw, 3);
        paint(ColorScheme::WhiteBlack, &escaped, 100, &mut row_wb, 3);
        assert_ne!(row_bw[0] & (1 << 4), row_wb[0] & (1 << 4));
    }

    #[test]
    fn ascii_unescaped_is_darkest_char() {
        let mut row = vec![0u8; 1];
        let inside = EscapeResult { n: 100, norm_sqr: 0.0 };
        paint(ColorScheme::Ascii, &inside, 100, &mut row, 0);
        assert_eq!(row[0], b'@');
    }

    #[test]
    fn eight_bit_unescaped_is_zero() {
        let mut row = vec![0u8; 1];
        let inside = EscapeResult { n: 100, norm_sqr: 0.0 };
        paint(ColorScheme::Greyscale, &inside, 100, &mut row, 0);
        assert_eq!(row[0], 0);
    }

    #[test]
    fn twenty_four_bit_unescaped_is_black() {
        let mut row = vec![0u8; 3];
        let inside = EscapeResult { n: 100, norm_sqr: 0.0 };
        paint(ColorScheme::Matrix, &inside, 100, &mut row, 0);
        assert_eq!(&row[..], &[0, 0, 0]);
    }

    #[test]
    fn hsv_round_trips_at_sextant_boundaries() {
        // Pure red, green, blue at h=0/120/240 with full s/v.
        assert_eq!(hsv_to_rgb(0.0, 1.0, 1.0), (255, 0, 0));
        assert_eq!(hsv_to_rgb(120.0, 1.0, 1.0), (0, 255, 0));
        assert_eq!(hsv_to_rgb(240.0, 1.0, 1.0), (0, 0, 255));
        assert_eq!(hsv_to_rgb(360.0, 1.0, 1.0), (255, 0, 0));
    }

    #[test]
    fn row_size_matches_depth() {
        assert_eq!(ColorScheme::Ascii.row_size(80), 80);
        assert_eq!(ColorScheme::BlackWhite.row_size(16), 2);
        assert_eq!(ColorScheme::BlackWhite.row_size(17), 3);
        assert_eq!(ColorScheme::Greyscale.row_size(640), 640);
        assert_eq!(ColorScheme::Rainbow.row_size(640), 1920);
    }
}
