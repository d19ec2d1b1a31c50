//! Utility functions shared by the renderers

use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

// ===== COLOUR UTILITIES =====

/// Parses `#RGB`, `#RRGGBB`, `#RRGGBBAA`, `rgb(r, g, b)` or `rgba(r, g, b, a)`.
///
/// Alpha is dropped; terminals have no blending against the background.
pub fn parse_color(color: &str) -> Option<(u8, u8, u8)> {
    let color = color.trim();

    if let Some(hex) = color.strip_prefix('#') {
        let channel = |s: &str| u8::from_str_radix(s, 16).ok();
        return match hex.len() {
            3 => {
                let mut digits = hex.chars().map(|c| c.to_digit(16).map(|d| (d * 17) as u8));
                Some((digits.next()??, digits.next()??, digits.next()??))
            }
            6 | 8 => Some((
                channel(hex.get(0..2)?)?,
                channel(hex.get(2..4)?)?,
                channel(hex.get(4..6)?)?,
            )),
            _ => None,
        };
    }

    let inner = color
        .strip_prefix("rgba(")
        .or_else(|| color.strip_prefix("rgb("))?
        .strip_suffix(')')?;
    let parts: Vec<&str> = inner.split(',').map(str::trim).collect();
    if !(parts.len() == 3 || parts.len() == 4) {
        return None;
    }
    let channel = |s: &str| s.parse::<f64>().ok().map(|v| v.clamp(0.0, 255.0).round() as u8);
    Some((channel(parts[0])?, channel(parts[1])?, channel(parts[2])?))
}

// ===== STRING UTILITIES =====

/// Display width of a string in terminal cells
pub fn display_width(s: &str) -> usize {
    UnicodeWidthStr::width(s)
}

/// Truncates to at most `max_width` cells, ending with "…" when cut.
pub fn truncate_to_width(s: &str, max_width: usize) -> String {
    if display_width(s) <= max_width {
        return s.to_string();
    }
    if max_width == 0 {
        return String::new();
    }

    let mut out = String::new();
    let mut width = 0;
    for c in s.chars() {
        let w = UnicodeWidthChar::width(c).unwrap_or(0);
        if width + w > max_width - 1 {
            break;
        }
        out.push(c);
        width += w;
    }
    out.push('…');
    out
}

/// Truncates and right-pads to exactly `width` cells.
pub fn pad_to_width(s: &str, width: usize) -> String {
    let truncated = truncate_to_width(s, width);
    let fill = width.saturating_sub(display_width(&truncated));
    format!("{}{}", truncated, " ".repeat(fill))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_hex_colors() {
        assert_eq!(parse_color("#6699ff"), Some((0x66, 0x99, 0xff)));
        assert_eq!(parse_color("#CCC"), Some((0xcc, 0xcc, 0xcc)));
        assert_eq!(parse_color("#11223344"), Some((0x11, 0x22, 0x33)));
        assert_eq!(parse_color("#12"), None);
        assert_eq!(parse_color("#zzzzzz"), None);
    }

    #[test]
    fn test_parse_rgba_colors() {
        assert_eq!(parse_color("rgba(255, 140, 0, 0.7)"), Some((255, 140, 0)));
        assert_eq!(parse_color("rgb(1,2,3)"), Some((1, 2, 3)));
        assert_eq!(parse_color("rgba(1, 2)"), None);
        assert_eq!(parse_color("orange"), None);
    }

    #[test]
    fn test_pad_and_truncate() {
        assert_eq!(pad_to_width("abc", 5), "abc  ");
        assert_eq!(pad_to_width("abcdef", 4), "abc…");
        assert_eq!(display_width("日本"), 4);
        assert_eq!(pad_to_width("日本語", 5), "日本…");
        assert_eq!(truncate_to_width("abc", 0), "");
    }
}
