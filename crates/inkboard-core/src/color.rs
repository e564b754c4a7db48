//! CSS color strings to renderer colors.

use peniko::Color;

/// Parse a CSS color string.
///
/// Accepts `#rgb`, `#rgba`, `#rrggbb`, `#rrggbbaa` and a small set of
/// named colors. Anything else falls back to black, which is also what a
/// browser draws for an unrecognized stroke color.
pub fn parse_css_color(color: &str) -> Color {
    let color = color.trim();
    if let Some(hex) = color.strip_prefix('#') {
        return parse_hex(hex).unwrap_or_else(|| {
            log::debug!("Unrecognized hex color {color:?}, using black");
            Color::BLACK
        });
    }
    named_color(color).unwrap_or_else(|| {
        log::debug!("Unrecognized color {color:?}, using black");
        Color::BLACK
    })
}

fn parse_hex(hex: &str) -> Option<Color> {
    if !hex.is_ascii() {
        return None;
    }
    let channel = |range: std::ops::Range<usize>| u8::from_str_radix(&hex[range], 16).ok();
    let short = |i: usize| channel(i..i + 1).map(|v| v * 17);

    match hex.len() {
        3 => Some(Color::from_rgba8(short(0)?, short(1)?, short(2)?, 255)),
        4 => Some(Color::from_rgba8(short(0)?, short(1)?, short(2)?, short(3)?)),
        6 => Some(Color::from_rgba8(channel(0..2)?, channel(2..4)?, channel(4..6)?, 255)),
        8 => Some(Color::from_rgba8(
            channel(0..2)?,
            channel(2..4)?,
            channel(4..6)?,
            channel(6..8)?,
        )),
        _ => None,
    }
}

fn named_color(name: &str) -> Option<Color> {
    let rgba = match name.to_ascii_lowercase().as_str() {
        "transparent" => (0, 0, 0, 0),
        "black" => (0, 0, 0, 255),
        "white" => (255, 255, 255, 255),
        "red" => (255, 0, 0, 255),
        "green" => (0, 128, 0, 255),
        "lime" => (0, 255, 0, 255),
        "blue" => (0, 0, 255, 255),
        "yellow" => (255, 255, 0, 255),
        "orange" => (255, 165, 0, 255),
        "purple" => (128, 0, 128, 255),
        "gray" | "grey" => (128, 128, 128, 255),
        _ => return None,
    };
    Some(Color::from_rgba8(rgba.0, rgba.1, rgba.2, rgba.3))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rgba(color: Color) -> [u8; 4] {
        let c = color.to_rgba8();
        [c.r, c.g, c.b, c.a]
    }

    #[test]
    fn test_long_hex() {
        assert_eq!(rgba(parse_css_color("#0c62f0")), [0x0c, 0x62, 0xf0, 255]);
        assert_eq!(rgba(parse_css_color("#0C62F080")), [0x0c, 0x62, 0xf0, 0x80]);
    }

    #[test]
    fn test_short_hex() {
        assert_eq!(rgba(parse_css_color("#f00")), [255, 0, 0, 255]);
        assert_eq!(rgba(parse_css_color("#f008")), [255, 0, 0, 0x88]);
    }

    #[test]
    fn test_named() {
        assert_eq!(rgba(parse_css_color("white")), [255, 255, 255, 255]);
        assert_eq!(rgba(parse_css_color(" Red ")), [255, 0, 0, 255]);
    }

    #[test]
    fn test_unknown_falls_back_to_black() {
        assert_eq!(rgba(parse_css_color("#12")), [0, 0, 0, 255]);
        assert_eq!(rgba(parse_css_color("#zzzzzz")), [0, 0, 0, 255]);
        assert_eq!(rgba(parse_css_color("rgb(1,2,3)")), [0, 0, 0, 255]);
        assert_eq!(rgba(parse_css_color("#éé")), [0, 0, 0, 255]);
    }
}
