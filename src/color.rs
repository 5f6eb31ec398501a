use eframe::egui::Color32;

/// Parse a color string as stored in the settings file: a small set of named
/// colors, or hex in `#RRGGBB` / `#AARRGGBB` form.
pub fn parse(s: &str) -> Option<Color32> {
    let s = s.trim();
    if let Some(hex) = s.strip_prefix('#') {
        return parse_hex(hex);
    }
    let named = match s.to_ascii_lowercase().as_str() {
        "black" => Color32::BLACK,
        "white" => Color32::WHITE,
        "red" => Color32::RED,
        "green" => Color32::GREEN,
        "blue" => Color32::BLUE,
        "yellow" => Color32::YELLOW,
        "cyan" => Color32::from_rgb(0, 255, 255),
        "magenta" => Color32::from_rgb(255, 0, 255),
        "orange" => Color32::ORANGE,
        "purple" => Color32::from_rgb(128, 0, 128),
        "pink" => Color32::from_rgb(255, 192, 203),
        "brown" => Color32::BROWN,
        "gray" | "grey" => Color32::GRAY,
        "darkgray" | "darkgrey" => Color32::DARK_GRAY,
        _ => return None,
    };
    Some(named)
}

fn parse_hex(hex: &str) -> Option<Color32> {
    match hex.len() {
        6 => {
            let rr = u8::from_str_radix(&hex[0..2], 16).ok()?;
            let gg = u8::from_str_radix(&hex[2..4], 16).ok()?;
            let bb = u8::from_str_radix(&hex[4..6], 16).ok()?;
            Some(Color32::from_rgb(rr, gg, bb))
        }
        8 => {
            let aa = u8::from_str_radix(&hex[0..2], 16).ok()?;
            let rr = u8::from_str_radix(&hex[2..4], 16).ok()?;
            let gg = u8::from_str_radix(&hex[4..6], 16).ok()?;
            let bb = u8::from_str_radix(&hex[6..8], 16).ok()?;
            Some(Color32::from_rgba_unmultiplied(rr, gg, bb, aa))
        }
        _ => None,
    }
}

/// Format a color back into the settings-file representation: `#RRGGBB`, or
/// `#AARRGGBB` when the color carries transparency.
pub fn format(color: Color32) -> String {
    let [r, g, b, a] = color.to_srgba_unmultiplied();
    if a == 255 {
        format!("#{r:02X}{g:02X}{b:02X}")
    } else {
        format!("#{a:02X}{r:02X}{g:02X}{b:02X}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_named_colors() {
        assert_eq!(parse("red"), Some(Color32::RED));
        assert_eq!(parse("black"), Some(Color32::BLACK));
        assert_eq!(parse("Red"), Some(Color32::RED));
        assert_eq!(parse(" white "), Some(Color32::WHITE));
    }

    #[test]
    fn test_parse_hex_rgb() {
        assert_eq!(parse("#1E90FF"), Some(Color32::from_rgb(0x1E, 0x90, 0xFF)));
        assert_eq!(parse("#000000"), Some(Color32::BLACK));
    }

    #[test]
    fn test_parse_hex_argb() {
        assert_eq!(
            parse("#80FF0000"),
            Some(Color32::from_rgba_unmultiplied(255, 0, 0, 0x80))
        );
    }

    #[test]
    fn test_parse_invalid() {
        assert_eq!(parse(""), None);
        assert_eq!(parse("not-a-color"), None);
        assert_eq!(parse("#12"), None);
        assert_eq!(parse("#GGGGGG"), None);
    }

    #[test]
    fn test_format_parse_roundtrip() {
        let opaque = Color32::from_rgb(10, 20, 30);
        assert_eq!(parse(&format(opaque)), Some(opaque));

        // Premultiplied storage makes exact channel round-trips lossy at
        // partial alpha, but the alpha itself must survive.
        let translucent = Color32::from_rgba_unmultiplied(10, 20, 30, 128);
        let reparsed = parse(&format(translucent)).unwrap();
        assert_eq!(reparsed.to_srgba_unmultiplied()[3], 128);
    }
}
