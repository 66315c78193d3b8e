//! CSS color values and HSL lightness math.
//!
//! Canvas objects store colors as the raw strings the editing tools set
//! (`"#ff0000"`, `"rgb(0, 128, 255)"`, `"tomato"`). This module parses those
//! strings into [`Color`] when a numeric value is needed, e.g. for the shade
//! ramps in [`crate::palette`]. Parsing never fails loudly: anything that is
//! not a recognizable CSS color yields `None`.

use serde::{Deserialize, Serialize};

/// RGBA color. Stored as 4 × f32 [0.0, 1.0].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

/// Hue / saturation / lightness form of a color.
/// `h` is in degrees `[0, 360)`, `s`, `l` and `a` are in `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Hsl {
    pub h: f32,
    pub s: f32,
    pub l: f32,
    pub a: f32,
}

/// Helper to parse a single hex digit.
pub fn hex_val(c: u8) -> Option<u8> {
    match c {
        b'0'..=b'9' => Some(c - b'0'),
        b'a'..=b'f' => Some(c - b'a' + 10),
        b'A'..=b'F' => Some(c - b'A' + 10),
        _ => None,
    }
}

impl Color {
    pub const BLACK: Color = Color::rgba(0.0, 0.0, 0.0, 1.0);
    pub const WHITE: Color = Color::rgba(1.0, 1.0, 1.0, 1.0);
    pub const TRANSPARENT: Color = Color::rgba(0.0, 0.0, 0.0, 0.0);

    pub const fn rgba(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    pub fn rgba8(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self::rgba(
            r as f32 / 255.0,
            g as f32 / 255.0,
            b as f32 / 255.0,
            a as f32 / 255.0,
        )
    }

    fn from_rgb_u32(rgb: u32) -> Self {
        Self::rgba8((rgb >> 16) as u8, (rgb >> 8) as u8, rgb as u8, 255)
    }

    /// Parse a hex color string: `#RGB`, `#RGBA`, `#RRGGBB`, `#RRGGBBAA`.
    /// The string may optionally start with `#`.
    pub fn from_hex(hex: &str) -> Option<Self> {
        let hex = hex.strip_prefix('#').unwrap_or(hex);
        let bytes = hex.as_bytes();

        match bytes.len() {
            3 | 4 => {
                let mut ch = [255u8; 4];
                for (slot, &byte) in ch.iter_mut().zip(bytes) {
                    *slot = hex_val(byte)? * 17;
                }
                Some(Self::rgba8(ch[0], ch[1], ch[2], ch[3]))
            }
            6 | 8 => {
                let mut ch = [255u8; 4];
                for (slot, pair) in ch.iter_mut().zip(bytes.chunks(2)) {
                    *slot = hex_val(pair[0])? << 4 | hex_val(pair[1])?;
                }
                Some(Self::rgba8(ch[0], ch[1], ch[2], ch[3]))
            }
            _ => None,
        }
    }

    /// Parse any CSS color string the editor may store on an object.
    ///
    /// Accepts hex (with or without `#`), `rgb()`/`rgba()` with numeric or
    /// percentage channels, `hsl()`/`hsla()`, the CSS named colors and
    /// `transparent`. Both comma and space separated argument lists work.
    pub fn parse(input: &str) -> Option<Self> {
        let trimmed = input.trim();
        if trimmed.is_empty() {
            return None;
        }
        if trimmed.starts_with('#') {
            return Self::from_hex(trimmed);
        }

        let lower = trimmed.to_ascii_lowercase();
        if let Some(args) = function_args(&lower, "rgba").or_else(|| function_args(&lower, "rgb")) {
            return parse_rgb_args(&args);
        }
        if let Some(args) = function_args(&lower, "hsla").or_else(|| function_args(&lower, "hsl")) {
            return parse_hsl_args(&args);
        }
        if lower == "transparent" {
            return Some(Self::TRANSPARENT);
        }
        if let Ok(pos) = NAMED_COLORS.binary_search_by(|(name, _)| name.cmp(&lower.as_str())) {
            return Some(Self::from_rgb_u32(NAMED_COLORS[pos].1));
        }

        // Bare hex like "fff" or "6c5ce7".
        Self::from_hex(&lower)
    }

    /// 8-bit channels, rounded and clamped.
    pub fn to_rgba8(&self) -> [u8; 4] {
        [
            channel_u8(self.r),
            channel_u8(self.g),
            channel_u8(self.b),
            channel_u8(self.a),
        ]
    }

    /// Emit as lowercase hex: `#rrggbb` when opaque, `#rrggbbaa` otherwise.
    pub fn to_hex(&self) -> String {
        let [r, g, b, a] = self.to_rgba8();
        if a == 255 {
            format!("#{r:02x}{g:02x}{b:02x}")
        } else {
            format!("#{r:02x}{g:02x}{b:02x}{a:02x}")
        }
    }

    /// Emit as lowercase `#rrggbb`, dropping alpha.
    pub fn to_rgb_hex(&self) -> String {
        let [r, g, b, _] = self.to_rgba8();
        format!("#{r:02x}{g:02x}{b:02x}")
    }

    /// Perceived brightness on a 0–255 scale (W3C / YIQ weighting).
    pub fn brightness(&self) -> f32 {
        let [r, g, b, _] = self.to_rgba8();
        (r as f32 * 299.0 + g as f32 * 587.0 + b as f32 * 114.0) / 1000.0
    }

    /// A color is dark when its perceived brightness is below the midpoint.
    pub fn is_dark(&self) -> bool {
        self.brightness() < 128.0
    }

    pub fn to_hsl(&self) -> Hsl {
        let (r, g, b) = (self.r, self.g, self.b);
        let max = r.max(g).max(b);
        let min = r.min(g).min(b);
        let l = (max + min) / 2.0;

        if max == min {
            return Hsl { h: 0.0, s: 0.0, l, a: self.a };
        }

        let d = max - min;
        let s = if l > 0.5 { d / (2.0 - max - min) } else { d / (max + min) };
        let h = if max == r {
            (g - b) / d + if g < b { 6.0 } else { 0.0 }
        } else if max == g {
            (b - r) / d + 2.0
        } else {
            (r - g) / d + 4.0
        };

        Hsl { h: h * 60.0, s, l, a: self.a }
    }

    pub fn from_hsl(hsl: Hsl) -> Self {
        let s = hsl.s.clamp(0.0, 1.0);
        let l = hsl.l.clamp(0.0, 1.0);
        if s == 0.0 {
            return Self::rgba(l, l, l, hsl.a);
        }

        let h = hsl.h.rem_euclid(360.0) / 360.0;
        let q = if l < 0.5 { l * (1.0 + s) } else { l + s - l * s };
        let p = 2.0 * l - q;
        Self::rgba(
            hue_to_rgb(p, q, h + 1.0 / 3.0),
            hue_to_rgb(p, q, h),
            hue_to_rgb(p, q, h - 1.0 / 3.0),
            hsl.a,
        )
    }

    /// Raise HSL lightness by `amount` percentage points, clamped at white.
    pub fn lighten(&self, amount: f32) -> Self {
        let mut hsl = self.to_hsl();
        hsl.l = (hsl.l + amount / 100.0).clamp(0.0, 1.0);
        Self::from_hsl(hsl)
    }

    /// Lower HSL lightness by `amount` percentage points, clamped at black.
    pub fn darken(&self, amount: f32) -> Self {
        let mut hsl = self.to_hsl();
        hsl.l = (hsl.l - amount / 100.0).clamp(0.0, 1.0);
        Self::from_hsl(hsl)
    }
}

fn channel_u8(v: f32) -> u8 {
    (v.clamp(0.0, 1.0) * 255.0).round() as u8
}

fn hue_to_rgb(p: f32, q: f32, t: f32) -> f32 {
    let t = if t < 0.0 {
        t + 1.0
    } else if t > 1.0 {
        t - 1.0
    } else {
        t
    };
    if t < 1.0 / 6.0 {
        p + (q - p) * 6.0 * t
    } else if t < 0.5 {
        q
    } else if t < 2.0 / 3.0 {
        p + (q - p) * (2.0 / 3.0 - t) * 6.0
    } else {
        p
    }
}

/// Return the comma/space/slash separated arguments of `name(...)`.
fn function_args(s: &str, name: &str) -> Option<Vec<String>> {
    let inner = s
        .strip_prefix(name)?
        .trim_start()
        .strip_prefix('(')?
        .strip_suffix(')')?;
    Some(
        inner
            .split(|c: char| c == ',' || c == '/' || c.is_whitespace())
            .filter(|part| !part.is_empty())
            .map(str::to_string)
            .collect(),
    )
}

/// A number, or a percentage mapped onto `[0, scale]`.
fn parse_component(token: &str, scale: f32) -> Option<f32> {
    match token.strip_suffix('%') {
        Some(pct) => pct.parse::<f32>().ok().map(|v| v / 100.0 * scale),
        None => token.parse::<f32>().ok(),
    }
    .filter(|v| v.is_finite())
}

fn parse_alpha(args: &[String]) -> Option<f32> {
    match args.get(3) {
        Some(token) => parse_component(token, 1.0).map(|a| a.clamp(0.0, 1.0)),
        None => Some(1.0),
    }
}

fn parse_rgb_args(args: &[String]) -> Option<Color> {
    if !(3..=4).contains(&args.len()) {
        return None;
    }
    let mut ch = [0.0f32; 3];
    for (slot, token) in ch.iter_mut().zip(args) {
        *slot = parse_component(token, 255.0)?.clamp(0.0, 255.0) / 255.0;
    }
    Some(Color::rgba(ch[0], ch[1], ch[2], parse_alpha(args)?))
}

fn parse_hsl_args(args: &[String]) -> Option<Color> {
    if !(3..=4).contains(&args.len()) {
        return None;
    }
    let h = args[0].strip_suffix("deg").unwrap_or(&args[0]).parse::<f32>().ok()?;
    let s = args[1].strip_suffix('%').unwrap_or(&args[1]).parse::<f32>().ok()?;
    let l = args[2].strip_suffix('%').unwrap_or(&args[2]).parse::<f32>().ok()?;
    if !(h.is_finite() && s.is_finite() && l.is_finite()) {
        return None;
    }
    Some(Color::from_hsl(Hsl {
        h,
        s: s / 100.0,
        l: l / 100.0,
        a: parse_alpha(args)?,
    }))
}

/// CSS named colors, sorted for binary search.
const NAMED_COLORS: &[(&str, u32)] = &[
    ("aliceblue", 0xF0F8FF),
    ("antiquewhite", 0xFAEBD7),
    ("aqua", 0x00FFFF),
    ("aquamarine", 0x7FFFD4),
    ("azure", 0xF0FFFF),
    ("beige", 0xF5F5DC),
    ("bisque", 0xFFE4C4),
    ("black", 0x000000),
    ("blanchedalmond", 0xFFEBCD),
    ("blue", 0x0000FF),
    ("blueviolet", 0x8A2BE2),
    ("brown", 0xA52A2A),
    ("burlywood", 0xDEB887),
    ("cadetblue", 0x5F9EA0),
    ("chartreuse", 0x7FFF00),
    ("chocolate", 0xD2691E),
    ("coral", 0xFF7F50),
    ("cornflowerblue", 0x6495ED),
    ("cornsilk", 0xFFF8DC),
    ("crimson", 0xDC143C),
    ("cyan", 0x00FFFF),
    ("darkblue", 0x00008B),
    ("darkcyan", 0x008B8B),
    ("darkgoldenrod", 0xB8860B),
    ("darkgray", 0xA9A9A9),
    ("darkgreen", 0x006400),
    ("darkgrey", 0xA9A9A9),
    ("darkkhaki", 0xBDB76B),
    ("darkmagenta", 0x8B008B),
    ("darkolivegreen", 0x556B2F),
    ("darkorange", 0xFF8C00),
    ("darkorchid", 0x9932CC),
    ("darkred", 0x8B0000),
    ("darksalmon", 0xE9967A),
    ("darkseagreen", 0x8FBC8F),
    ("darkslateblue", 0x483D8B),
    ("darkslategray", 0x2F4F4F),
    ("darkslategrey", 0x2F4F4F),
    ("darkturquoise", 0x00CED1),
    ("darkviolet", 0x9400D3),
    ("deeppink", 0xFF1493),
    ("deepskyblue", 0x00BFFF),
    ("dimgray", 0x696969),
    ("dimgrey", 0x696969),
    ("dodgerblue", 0x1E90FF),
    ("firebrick", 0xB22222),
    ("floralwhite", 0xFFFAF0),
    ("forestgreen", 0x228B22),
    ("fuchsia", 0xFF00FF),
    ("gainsboro", 0xDCDCDC),
    ("ghostwhite", 0xF8F8FF),
    ("gold", 0xFFD700),
    ("goldenrod", 0xDAA520),
    ("gray", 0x808080),
    ("green", 0x008000),
    ("greenyellow", 0xADFF2F),
    ("grey", 0x808080),
    ("honeydew", 0xF0FFF0),
    ("hotpink", 0xFF69B4),
    ("indianred", 0xCD5C5C),
    ("indigo", 0x4B0082),
    ("ivory", 0xFFFFF0),
    ("khaki", 0xF0E68C),
    ("lavender", 0xE6E6FA),
    ("lavenderblush", 0xFFF0F5),
    ("lawngreen", 0x7CFC00),
    ("lemonchiffon", 0xFFFACD),
    ("lightblue", 0xADD8E6),
    ("lightcoral", 0xF08080),
    ("lightcyan", 0xE0FFFF),
    ("lightgoldenrodyellow", 0xFAFAD2),
    ("lightgray", 0xD3D3D3),
    ("lightgreen", 0x90EE90),
    ("lightgrey", 0xD3D3D3),
    ("lightpink", 0xFFB6C1),
    ("lightsalmon", 0xFFA07A),
    ("lightseagreen", 0x20B2AA),
    ("lightskyblue", 0x87CEFA),
    ("lightslategray", 0x778899),
    ("lightslategrey", 0x778899),
    ("lightsteelblue", 0xB0C4DE),
    ("lightyellow", 0xFFFFE0),
    ("lime", 0x00FF00),
    ("limegreen", 0x32CD32),
    ("linen", 0xFAF0E6),
    ("magenta", 0xFF00FF),
    ("maroon", 0x800000),
    ("mediumaquamarine", 0x66CDAA),
    ("mediumblue", 0x0000CD),
    ("mediumorchid", 0xBA55D3),
    ("mediumpurple", 0x9370DB),
    ("mediumseagreen", 0x3CB371),
    ("mediumslateblue", 0x7B68EE),
    ("mediumspringgreen", 0x00FA9A),
    ("mediumturquoise", 0x48D1CC),
    ("mediumvioletred", 0xC71585),
    ("midnightblue", 0x191970),
    ("mintcream", 0xF5FFFA),
    ("mistyrose", 0xFFE4E1),
    ("moccasin", 0xFFE4B5),
    ("navajowhite", 0xFFDEAD),
    ("navy", 0x000080),
    ("oldlace", 0xFDF5E6),
    ("olive", 0x808000),
    ("olivedrab", 0x6B8E23),
    ("orange", 0xFFA500),
    ("orangered", 0xFF4500),
    ("orchid", 0xDA70D6),
    ("palegoldenrod", 0xEEE8AA),
    ("palegreen", 0x98FB98),
    ("paleturquoise", 0xAFEEEE),
    ("palevioletred", 0xDB7093),
    ("papayawhip", 0xFFEFD5),
    ("peachpuff", 0xFFDAB9),
    ("peru", 0xCD853F),
    ("pink", 0xFFC0CB),
    ("plum", 0xDDA0DD),
    ("powderblue", 0xB0E0E6),
    ("purple", 0x800080),
    ("rebeccapurple", 0x663399),
    ("red", 0xFF0000),
    ("rosybrown", 0xBC8F8F),
    ("royalblue", 0x4169E1),
    ("saddlebrown", 0x8B4513),
    ("salmon", 0xFA8072),
    ("sandybrown", 0xF4A460),
    ("seagreen", 0x2E8B57),
    ("seashell", 0xFFF5EE),
    ("sienna", 0xA0522D),
    ("silver", 0xC0C0C0),
    ("skyblue", 0x87CEEB),
    ("slateblue", 0x6A5ACD),
    ("slategray", 0x708090),
    ("slategrey", 0x708090),
    ("snow", 0xFFFAFA),
    ("springgreen", 0x00FF7F),
    ("steelblue", 0x4682B4),
    ("tan", 0xD2B48C),
    ("teal", 0x008080),
    ("thistle", 0xD8BFD8),
    ("tomato", 0xFF6347),
    ("turquoise", 0x40E0D0),
    ("violet", 0xEE82EE),
    ("wheat", 0xF5DEB3),
    ("white", 0xFFFFFF),
    ("whitesmoke", 0xF5F5F5),
    ("yellow", 0xFFFF00),
    ("yellowgreen", 0x9ACD32),
];
