use crate::model::StandardFont;

/// ZapfDingbats code for the heavy check mark (a20, ✔).
pub(crate) const CHECK_GLYPH: &str = "4";

/// Advance width and ink height of the check glyph at 1000 units/em.
const CHECK_WIDTH_1000: f32 = 760.0;
const CHECK_HEIGHT_1000: f32 = 705.0;

impl StandardFont {
    pub(crate) fn base_font(self) -> &'static [u8] {
        match self {
            StandardFont::Helvetica => b"Helvetica",
            StandardFont::ZapfDingbats => b"ZapfDingbats",
        }
    }

    /// Resource-name stem; the handle appends a suffix if the page already uses it.
    pub(crate) fn resource_stem(self) -> &'static str {
        match self {
            StandardFont::Helvetica => "FsHelv",
            StandardFont::ZapfDingbats => "FsZaDb",
        }
    }

    /// Symbolic fonts carry their own built-in encoding.
    pub(crate) fn uses_winansi(self) -> bool {
        matches!(self, StandardFont::Helvetica)
    }

    /// Encode text for a `Tj` operand in this font's encoding.
    pub(crate) fn encode(self, text: &str) -> Vec<u8> {
        match self {
            StandardFont::Helvetica => to_winansi_bytes(text),
            StandardFont::ZapfDingbats => text.bytes().filter(|b| b.is_ascii_graphic()).collect(),
        }
    }
}

/// Offset from the option center to the baseline origin of a centered check mark.
pub(crate) fn check_origin_offset(font_size: f32) -> (f32, f32) {
    let dx = -CHECK_WIDTH_1000 * font_size / 1000.0 / 2.0;
    // Y grows downward in page space, so the baseline sits below the center.
    let dy = CHECK_HEIGHT_1000 * font_size / 1000.0 / 2.0;
    (dx, dy)
}

/// Approximate rendered width of `text` in Helvetica, in points.
pub(crate) fn helvetica_text_width(text: &str, font_size: f32) -> f32 {
    to_winansi_bytes(text)
        .into_iter()
        .map(|b| helvetica_width_1000(b) * font_size / 1000.0)
        .sum()
}

/// Approximate Helvetica widths at 1000 units/em for WinAnsi bytes.
fn helvetica_width_1000(b: u8) -> f32 {
    match b {
        0..=31 => 0.0,
        32 => 278.0,                          // space
        33..=47 => 333.0,                     // punctuation
        48..=57 => 556.0,                     // digits
        58..=64 => 333.0,                     // more punctuation
        73 | 74 => 278.0,                     // I J (narrow uppercase)
        77 => 833.0,                          // M (wide)
        65..=90 => 667.0,                     // uppercase A-Z (average)
        91..=96 => 333.0,                     // brackets etc.
        102 | 105 | 106 | 108 | 116 => 278.0, // narrow lowercase: f i j l t
        109 | 119 => 833.0,                   // m w (wide)
        97..=122 => 556.0,                    // lowercase a-z (average)
        _ => 556.0,
    }
}

/// Map a single Unicode char to its WinAnsi (Windows-1252) byte.
pub(crate) fn char_to_winansi(c: char) -> Option<u8> {
    match c as u32 {
        0x0020..=0x007E => Some(c as u8),
        0x00A0..=0x00FF => Some(c as u8), // Latin-1 supplement maps directly
        0x20AC => Some(0x80),
        0x201A => Some(0x82),
        0x0192 => Some(0x83),
        0x201E => Some(0x84),
        0x2026 => Some(0x85),
        0x2020 => Some(0x86),
        0x2021 => Some(0x87),
        0x02C6 => Some(0x88),
        0x2030 => Some(0x89),
        0x0160 => Some(0x8A),
        0x2039 => Some(0x8B),
        0x0152 => Some(0x8C),
        0x017D => Some(0x8E),
        0x2018 => Some(0x91),
        0x2019 => Some(0x92),
        0x201C => Some(0x93),
        0x201D => Some(0x94),
        0x2022 => Some(0x95), // bullet
        0x2013 => Some(0x96),
        0x2014 => Some(0x97),
        0x02DC => Some(0x98),
        0x2122 => Some(0x99),
        0x0161 => Some(0x9A),
        0x203A => Some(0x9B),
        0x0153 => Some(0x9C),
        0x017E => Some(0x9E),
        0x0178 => Some(0x9F),
        _ => None,
    }
}

/// Convert a UTF-8 string to WinAnsi bytes, dropping characters with no code.
pub(crate) fn to_winansi_bytes(s: &str) -> Vec<u8> {
    let bytes: Vec<u8> = s.chars().filter_map(char_to_winansi).collect();
    if bytes.len() != s.chars().count() {
        log::debug!("Dropped characters with no WinAnsi code from {s:?}");
    }
    bytes
}
