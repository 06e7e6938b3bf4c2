//! Hex dump formatting.
//!
//! A dump is a sequence of lines, each an 8-space indent followed by up to
//! `bytes_per_line` tokens of the form `0xHH` separated by `", "`. Every
//! line but the last carries a trailing comma, so a batch dump pastes
//! straight into a C array initializer:
//!
//! ```text
//!         0x48, 0x65, 0x6C, 0x6C,
//!         0x6F
//! ```
//!
//! With the gloss enabled each line ends in `" | "` and the printable ASCII
//! rendering of its bytes. With colors enabled each token is wrapped in the
//! escape codes of its [`Band`]; stripping those codes yields the plain dump.

use crate::error::{Error, Result};
use console::Style;
use std::fmt::{self, Write};
use std::ops::RangeInclusive;

/// Left indent of every dump line
pub const INDENT: &str = "        ";

/// Separator between tokens
const SEPARATOR: &str = ", ";

/// Separator between the hex tokens and the gloss
const GLOSS_SEPARATOR: &str = " | ";

/// Upper bound for `bytes_per_line`
pub const MAX_BYTES_PER_LINE: usize = 4096;

/// Visible width of one `0xHH` token
const TOKEN_WIDTH: usize = 4;

/// Byte value band used to pick a display color
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Band {
    /// `0x00..=0x3F`
    Low,
    /// `0x40..=0x7F`
    MidLow,
    /// `0x80..=0xBF`
    MidHigh,
    /// `0xC0..=0xFF`
    High,
}

impl Band {
    /// All bands from low to high
    pub const ALL: [Band; 4] = [Band::Low, Band::MidLow, Band::MidHigh, Band::High];

    /// Band of byte `b`, i.e. band number `b / 64`
    #[must_use]
    pub fn of(b: u8) -> Self {
        Self::ALL[(b / 64) as usize]
    }

    /// Band number in `0..4`
    #[must_use]
    pub fn index(&self) -> usize {
        match self {
            Band::Low => 0,
            Band::MidLow => 1,
            Band::MidHigh => 2,
            Band::High => 3,
        }
    }

    /// Byte values covered by the band
    #[must_use]
    pub fn range(&self) -> RangeInclusive<u8> {
        let start = (self.index() * 64) as u8;
        start..=start + 63
    }

    /// Human readable color name, as shown by the legend
    #[must_use]
    pub fn color_name(&self) -> &'static str {
        match self {
            Band::Low => "Light Blue",
            Band::MidLow => "Light Green",
            Band::MidHigh => "Light Yellow",
            Band::High => "Light Red",
        }
    }

    /// Terminal style of the band
    ///
    /// Styling is forced so the output does not depend on whether the
    /// process is attached to a terminal.
    #[must_use]
    pub fn style(&self) -> Style {
        let style = Style::new().force_styling(true);
        match self {
            Band::Low => style.blue(),
            Band::MidLow => style.green(),
            Band::MidHigh => style.yellow(),
            Band::High => style.red(),
        }
    }
}

/// Gloss character of byte `b`: itself if printable ASCII, `.` otherwise
#[must_use]
pub fn gloss_char(b: u8) -> char {
    if (32..=126).contains(&b) {
        b as char
    } else {
        '.'
    }
}

/// Dump layout options
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DumpOptions {
    /// Tokens per line
    pub bytes_per_line: usize,
    /// Wrap tokens in band colors
    pub colorize: bool,
    /// Append the ASCII gloss
    pub show_ascii: bool,
}

impl DumpOptions {
    /// Plain options with `bytes_per_line` tokens per line
    #[must_use]
    pub fn new(bytes_per_line: usize) -> Self {
        Self {
            bytes_per_line,
            colorize: false,
            show_ascii: false,
        }
    }

    /// Enable or disable colors
    #[must_use]
    pub fn colorize(mut self, colorize: bool) -> Self {
        self.colorize = colorize;
        self
    }

    /// Enable or disable the gloss
    #[must_use]
    pub fn show_ascii(mut self, show_ascii: bool) -> Self {
        self.show_ascii = show_ascii;
        self
    }

    /// Check option ranges
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidOption`] if `bytes_per_line` is zero or
    /// above [`MAX_BYTES_PER_LINE`].
    pub fn validate(&self) -> Result<()> {
        if self.bytes_per_line == 0 || self.bytes_per_line > MAX_BYTES_PER_LINE {
            return Err(Error::InvalidOption(format!(
                "bytes per line must be between 1 and {MAX_BYTES_PER_LINE}, got {}",
                self.bytes_per_line
            )));
        }
        Ok(())
    }
}

impl Default for DumpOptions {
    fn default() -> Self {
        Self::new(crate::DEFAULT_BYTES_PER_LINE)
    }
}

struct HexToken(u8);

impl fmt::Display for HexToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{:02X}", self.0)
    }
}

/// Converts bytes into dump text
#[derive(Debug, Clone)]
pub struct DumpFormatter {
    options: DumpOptions,
    styles: [Style; 4],
}

impl DumpFormatter {
    /// Create a formatter
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidOption`] if the options are out of range.
    pub fn new(options: DumpOptions) -> Result<Self> {
        options.validate()?;
        Ok(Self {
            options,
            styles: Band::ALL.map(|band| band.style()),
        })
    }

    /// Options in use
    #[must_use]
    pub fn options(&self) -> &DumpOptions {
        &self.options
    }

    /// Number of lines a dump of `len` bytes occupies
    #[must_use]
    pub fn line_count(&self, len: usize) -> usize {
        len.div_ceil(self.options.bytes_per_line)
    }

    /// Format a complete dump of `bytes`
    ///
    /// # Example
    ///
    /// ```
    /// use ghdump_core::{DumpFormatter, DumpOptions};
    ///
    /// let formatter = DumpFormatter::new(DumpOptions::new(2))?;
    /// assert_eq!(
    ///     formatter.format(b"abc"),
    ///     "        0x61, 0x62,\n        0x63\n"
    /// );
    /// # Ok::<(), ghdump_core::Error>(())
    /// ```
    #[must_use]
    pub fn format(&self, bytes: &[u8]) -> String {
        let mut out = String::with_capacity(self.estimate_len(bytes.len()));
        self.format_into(bytes, &mut out, true);
        out
    }

    /// Rough output size for `len` input bytes, used to presize buffers
    pub(crate) fn estimate_len(&self, len: usize) -> usize {
        let per_byte = if self.options.colorize { 15 } else { 6 };
        let gloss = if self.options.show_ascii { 1 } else { 0 };
        len * (per_byte + gloss) + self.line_count(len) * (INDENT.len() + 4)
    }

    /// Append the lines for `bytes` to `out`
    ///
    /// `is_final` marks the chunk holding the last line of the whole dump;
    /// every other chunk must be a multiple of `bytes_per_line` long so no
    /// line straddles two chunks.
    pub(crate) fn format_into(&self, bytes: &[u8], out: &mut String, is_final: bool) {
        let per_line = self.options.bytes_per_line;
        let lines = self.line_count(bytes.len());

        for (i, line) in bytes.chunks(per_line).enumerate() {
            let last = is_final && i + 1 == lines;
            self.write_line(line, last, out);
        }
    }

    fn write_line(&self, line: &[u8], last: bool, out: &mut String) {
        out.push_str(INDENT);
        for (j, &b) in line.iter().enumerate() {
            if j > 0 {
                out.push_str(SEPARATOR);
            }
            // Writing into a String cannot fail.
            let _ = if self.options.colorize {
                write!(out, "{}", self.styles[Band::of(b).index()].apply_to(HexToken(b)))
            } else {
                write!(out, "{}", HexToken(b))
            };
        }
        if !last {
            out.push(',');
        }

        if self.options.show_ascii {
            let width = visible_width(line.len(), !last);
            let full = visible_width(self.options.bytes_per_line, true);
            out.extend(std::iter::repeat_n(' ', full - width));
            out.push_str(GLOSS_SEPARATOR);
            out.extend(line.iter().map(|&b| gloss_char(b)));
        }
        out.push('\n');
    }
}

fn visible_width(tokens: usize, trailing_comma: bool) -> usize {
    tokens * TOKEN_WIDTH
        + tokens.saturating_sub(1) * SEPARATOR.len()
        + usize::from(trailing_comma)
}

/// Format `bytes` with the given layout in one call
///
/// # Errors
///
/// Returns [`Error::InvalidOption`] if `bytes_per_line` is out of range.
pub fn format(
    bytes: &[u8],
    bytes_per_line: usize,
    colorize: bool,
    show_ascii: bool,
) -> Result<String> {
    let options = DumpOptions::new(bytes_per_line)
        .colorize(colorize)
        .show_ascii(show_ascii);
    Ok(DumpFormatter::new(options)?.format(bytes))
}
