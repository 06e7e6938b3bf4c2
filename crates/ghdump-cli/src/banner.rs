//! Terminal banner and color legend.
//!
//! Colors are disabled when the `NO_COLOR` environment variable is set or
//! stdout is not a terminal.

use console::Style;
use ghdump_core::Band;
use std::io::{self, IsTerminal, Write};

/// The gH logo
pub const LOGO: &[&str] = &[
    r"        _    _ ",
    r"       | |  | |",
    r"   __ _| |__| |",
    r"  / _` |  __  |",
    r" | (_| | |  | |",
    r"  \__, |_|  |_|",
    r"   __/ |       ",
    r"  |___/        ",
];

/// The tagline
pub const TAGLINE: &str = "tiny bytecode processing framework";

/// Check if colors should be enabled
pub fn colors_enabled() -> bool {
    if std::env::var_os("NO_COLOR").is_some() {
        return false;
    }
    io::stdout().is_terminal()
}

fn paint(style: &Style, text: &str, use_color: bool) -> String {
    if use_color {
        style.clone().force_styling(true).apply_to(text).to_string()
    } else {
        text.to_string()
    }
}

/// Render the startup banner
#[must_use]
pub fn render_banner(version: &str, use_color: bool) -> String {
    let logo = Style::new().magenta().bold();
    let accent = Style::new().yellow();
    let credit = Style::new().green();

    let mut out = String::new();
    for (i, line) in LOGO.iter().enumerate() {
        out.push_str(&paint(&logo, line, use_color));
        match i {
            1 => out.push_str(&format!("  {}", paint(&accent, &format!("v{version}"), use_color))),
            3 => out.push_str(&format!("  {}", paint(&credit, TAGLINE, use_color))),
            6 => out.push_str(&format!("  {}", paint(&credit, "by JRDP Team", use_color))),
            _ => {}
        }
        out.push('\n');
    }
    out
}

/// Write the startup banner to `out`
///
/// # Errors
///
/// Returns the I/O error if `out` cannot be written.
pub fn write_banner<W: Write>(out: &mut W) -> io::Result<()> {
    writeln!(out, "{}", render_banner(env!("CARGO_PKG_VERSION"), colors_enabled()))
}

/// Render the byte band color legend
#[must_use]
pub fn render_color_legend(use_color: bool) -> String {
    let mut out = String::from("Color Scale Information:\n");
    for band in Band::ALL {
        let range = band.range();
        out.push_str(&format!(
            "0x{:02X} to 0x{:02X}: {}\n",
            range.start(),
            range.end(),
            paint(&band.style(), band.color_name(), use_color)
        ));
    }
    out
}

/// Write the byte band color legend to `out`
///
/// # Errors
///
/// Returns the I/O error if `out` cannot be written.
pub fn write_color_legend<W: Write>(out: &mut W) -> io::Result<()> {
    out.write_all(render_color_legend(colors_enabled()).as_bytes())?;
    out.flush()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_banner() {
        let banner = render_banner("1.2.3", false);
        assert!(banner.contains("v1.2.3"));
        assert!(banner.contains(TAGLINE));
        assert!(!banner.contains('\x1b'));
        assert_eq!(banner.lines().count(), LOGO.len());
    }

    #[test]
    fn test_colored_banner_strips_to_plain() {
        let colored = render_banner("1.2.3", true);
        assert!(colored.contains('\x1b'));
        assert_eq!(console::strip_ansi_codes(&colored), render_banner("1.2.3", false));
    }

    #[test]
    fn test_write_banner() {
        let mut out = Vec::new();
        write_banner(&mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.contains(env!("CARGO_PKG_VERSION")));
    }

    #[test]
    fn test_color_legend() {
        let legend = render_color_legend(false);
        let lines: Vec<&str> = legend.lines().collect();
        assert_eq!(
            lines,
            vec![
                "Color Scale Information:",
                "0x00 to 0x3F: Light Blue",
                "0x40 to 0x7F: Light Green",
                "0x80 to 0xBF: Light Yellow",
                "0xC0 to 0xFF: Light Red",
            ]
        );
    }
}
