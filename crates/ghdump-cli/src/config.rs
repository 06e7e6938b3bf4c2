//! Run settings for the ghdump CLI.
//!
//! Settings come from the command line only; nothing is persisted.

use crate::Cli;
use ghdump_core::DumpOptions;
use ghdump_core::format::MAX_BYTES_PER_LINE;
use std::path::PathBuf;

/// Upper bound for the number of read workers
pub const MAX_THREADS: usize = 1024;

/// Validated settings for one run
#[derive(Debug, Clone)]
pub struct Settings {
    /// File to dump
    pub input: PathBuf,
    /// Batch output file; `None` streams to the terminal
    pub output: Option<PathBuf>,
    /// Dump layout
    pub dump: DumpOptions,
    /// Number of read partitions / worker threads
    pub threads: usize,
    /// Streaming rate in bytes per second
    pub display_rate: u64,
    /// Print the banner before processing
    pub banner: bool,
}

// Default values

pub fn default_bytes_per_line() -> usize {
    ghdump_core::DEFAULT_BYTES_PER_LINE
}

pub fn default_threads() -> usize {
    ghdump_core::DEFAULT_PARTITIONS
}

pub fn default_display_rate() -> u64 {
    ghdump_core::DEFAULT_DISPLAY_RATE
}

impl Settings {
    /// Settings for `input` with every option at its default
    #[must_use]
    pub fn new(input: impl Into<PathBuf>) -> Self {
        Self {
            input: input.into(),
            output: None,
            dump: DumpOptions::new(default_bytes_per_line()),
            threads: default_threads(),
            display_rate: default_display_rate(),
            banner: true,
        }
    }

    /// Build settings from parsed arguments
    ///
    /// # Errors
    ///
    /// Returns an error if no input file was given or a value is out of range.
    pub fn from_cli(cli: &Cli) -> anyhow::Result<Self> {
        let Some(input) = cli.file_path.clone() else {
            anyhow::bail!("missing input file path");
        };

        let mut settings = Self::new(input);
        settings.output = cli.output.clone();
        settings.dump = DumpOptions::new(cli.bytes_per_line)
            .colorize(cli.colorize)
            .show_ascii(cli.ascii);
        settings.threads = cli.threads;
        settings.display_rate = cli.rate;
        settings.banner = !cli.no_banner;
        settings.validate()?;
        Ok(settings)
    }

    /// Whether the dump goes to a file instead of the terminal
    #[must_use]
    pub fn is_batch(&self) -> bool {
        self.output.is_some()
    }

    /// Validate settings
    ///
    /// # Errors
    ///
    /// Returns an error if settings are invalid.
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.dump.bytes_per_line == 0 || self.dump.bytes_per_line > MAX_BYTES_PER_LINE {
            anyhow::bail!("Bytes per line must be between 1 and {MAX_BYTES_PER_LINE}");
        }

        if self.threads == 0 || self.threads > MAX_THREADS {
            anyhow::bail!("Thread count must be between 1 and {MAX_THREADS}");
        }

        if self.display_rate == 0 {
            anyhow::bail!("Display rate must be at least 1 byte per second");
        }

        if let Some(output) = &self.output {
            if output == &self.input {
                anyhow::bail!(
                    "Output file {} would overwrite the input",
                    output.display()
                );
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("ghdump").chain(args.iter().copied())).unwrap()
    }

    #[test]
    fn test_default_settings() {
        let settings = Settings::new("a.bin");
        assert_eq!(settings.dump.bytes_per_line, 16);
        assert_eq!(settings.threads, 5);
        assert_eq!(settings.display_rate, 1_500_000);
        assert!(!settings.dump.colorize);
        assert!(!settings.is_batch());
        assert!(settings.validate().is_ok());
    }

    #[test]
    fn test_from_cli() {
        let cli = parse(&["-c", "-b", "8", "-t", "3", "--ASCII", "-o", "out.txt", "in.bin"]);
        let settings = Settings::from_cli(&cli).unwrap();

        assert_eq!(settings.input, PathBuf::from("in.bin"));
        assert_eq!(settings.output, Some(PathBuf::from("out.txt")));
        assert_eq!(settings.dump.bytes_per_line, 8);
        assert_eq!(settings.threads, 3);
        assert!(settings.dump.colorize);
        assert!(settings.dump.show_ascii);
        assert!(settings.is_batch());
    }

    #[test]
    fn test_settings_validation() {
        let mut settings = Settings::new("a.bin");

        settings.dump.bytes_per_line = 0;
        assert!(settings.validate().is_err());

        settings.dump.bytes_per_line = 16;
        settings.threads = 0;
        assert!(settings.validate().is_err());

        settings.threads = 5;
        settings.display_rate = 0;
        assert!(settings.validate().is_err());

        settings.display_rate = 10;
        settings.output = Some(PathBuf::from("a.bin"));
        assert!(settings.validate().is_err());
    }

    #[test]
    fn test_missing_input_rejected() {
        let cli = parse(&["--color-info"]);
        assert!(Settings::from_cli(&cli).is_err());
    }
}
