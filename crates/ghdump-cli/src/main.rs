//! ghdump CLI
//!
//! Loads a binary file in parallel, prints its statistics and digests, and
//! renders it as a paced hex dump or writes the dump to a file.

mod banner;
mod config;
mod progress;

use clap::Parser;
use ghdump_core::{
    BatchWriter, CancelToken, ChunkedReader, Digests, Error, ErrorKind, FileStats,
    RateLimitedRenderer, sniff,
};
use std::io::{self, Write};
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

use config::Settings;
use progress::{PhaseProgress, format_bytes, format_rate};

/// Hint printed when the program is started without any argument
const USAGE_HINT: &str = "Please rerun with -h to learn how to use me >_<";

/// Exit status for invalid option values (EX_USAGE)
const EXIT_USAGE: u8 = 64;
/// Exit status for a missing or unreadable input (EX_NOINPUT)
const EXIT_NO_INPUT: u8 = 66;
/// Exit status for internal failures (EX_SOFTWARE)
const EXIT_INTERNAL: u8 = 70;
/// Exit status for read/write failures (EX_IOERR)
const EXIT_IO: u8 = 74;
/// Exit status after Ctrl-C
const EXIT_CANCELLED: u8 = 130;

/// ghdump - tiny bytecode processing framework
#[derive(Parser, Debug)]
#[command(name = "ghdump")]
#[command(author, version, about, long_about = None)]
#[command(override_usage = "ghdump [OPTIONS] <FILE_PATH>")]
pub struct Cli {
    /// Path to the binary file to be processed
    #[arg(required_unless_present = "color_info")]
    pub file_path: Option<PathBuf>,

    /// Colorize the output for easier reading
    #[arg(short, long)]
    pub colorize: bool,

    /// Number of bytes to display per line
    #[arg(short = 'b', value_name = "N", default_value_t = config::default_bytes_per_line())]
    pub bytes_per_line: usize,

    /// Number of threads to use for file loading
    #[arg(short = 't', value_name = "N", default_value_t = config::default_threads())]
    pub threads: usize,

    /// Output file path to write byte data in formatted form
    #[arg(short = 'o', value_name = "PATH")]
    pub output: Option<PathBuf>,

    /// Show ASCII representation of the bytes
    #[arg(long = "ascii", alias = "ASCII")]
    pub ascii: bool,

    /// Show color scale information and exit
    #[arg(long)]
    pub color_info: bool,

    /// Streaming display rate in bytes per second
    #[arg(long, value_name = "BYTES", default_value_t = config::default_display_rate())]
    pub rate: u64,

    /// Do not print the banner
    #[arg(long)]
    pub no_banner: bool,

    /// Enable verbose output
    #[arg(short, long)]
    pub verbose: bool,
}

#[tokio::main]
async fn main() -> ExitCode {
    if std::env::args_os().len() <= 1 {
        let _ = writeln!(io::stdout(), "{USAGE_HINT}");
        return ExitCode::SUCCESS;
    }

    let cli = Cli::parse();

    // Initialize logging
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(if cli.verbose { "debug" } else { "warn" }));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();

    if cli.color_info {
        return match banner::write_color_legend(&mut io::stdout().lock()) {
            Ok(()) => ExitCode::SUCCESS,
            Err(err) => report_failure(&stdout_error(err).into()),
        };
    }

    let settings = match Settings::from_cli(&cli) {
        Ok(settings) => settings,
        Err(err) => {
            eprintln!("error: {err}");
            return ExitCode::from(EXIT_USAGE);
        }
    };

    let cancel = CancelToken::new();
    let on_interrupt = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("Interrupted, stopping");
            on_interrupt.cancel();
        }
    });

    match run(settings, cancel).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => report_failure(&err),
    }
}

/// Run the blocking pipeline off the async executor
async fn run(settings: Settings, cancel: CancelToken) -> anyhow::Result<()> {
    tokio::task::spawn_blocking(move || process(&settings, &cancel)).await?
}

/// Load, summarize and dump one file
fn process(settings: &Settings, cancel: &CancelToken) -> anyhow::Result<()> {
    let stdout = io::stdout();
    let mut out = stdout.lock();

    if settings.banner {
        banner::write_banner(&mut out).map_err(stdout_error)?;
    }

    tracing::debug!(
        "Processing {} in {} mode with {} threads",
        settings.input.display(),
        if settings.is_batch() { "batch" } else { "stream" },
        settings.threads
    );

    let data = load(settings, cancel)?;

    let mime = sniff::detect_mime(&settings.input);
    let stats = FileStats::collect(&data, mime);
    let digests = Digests::compute(&data);
    write_summary(&mut out, &stats, &digests).map_err(stdout_error)?;

    match &settings.output {
        Some(path) => {
            let progress = Arc::new(PhaseProgress::new(0, "Writing data"));
            let written = BatchWriter::new(settings.dump.bytes_per_line)?
                .with_observer(progress.clone())
                .write_to_file(path, &data);
            match written {
                Ok(written) => {
                    progress.finish();
                    writeln!(out, "Wrote {} to {}", format_bytes(written), path.display())
                        .map_err(stdout_error)?;
                }
                Err(err) => {
                    progress.abandon();
                    return Err(err.into());
                }
            }
        }
        None => {
            tracing::info!(
                "Streaming {} at {}",
                format_bytes(data.len() as u64),
                format_rate(settings.display_rate)
            );
            write!(out, "\nFormatted Binary Data:\n\n").map_err(stdout_error)?;

            let renderer = RateLimitedRenderer::new(settings.dump, settings.display_rate)?
                .with_cancel(cancel.clone())
                .with_sink_name("stdout");
            let report = renderer.stream_bytes(&data, &mut out)?;
            tracing::debug!(
                "Rendered {} windows ({} bytes) in {:.2}s",
                report.windows,
                report.output_bytes,
                report.elapsed.as_secs_f64()
            );
        }
    }

    Ok(())
}

fn load(settings: &Settings, cancel: &CancelToken) -> anyhow::Result<Vec<u8>> {
    let progress = Arc::new(PhaseProgress::new(0, "Reading file"));

    let loaded = ChunkedReader::new(settings.threads)
        .with_cancel(cancel.clone())
        .with_observer(progress.clone())
        .load(&settings.input);

    match loaded {
        Ok(data) => {
            progress.finish();
            Ok(data)
        }
        Err(err) => {
            progress.abandon();
            Err(err.into())
        }
    }
}

fn write_summary<W: Write>(out: &mut W, stats: &FileStats, digests: &Digests) -> io::Result<()> {
    writeln!(out, "File Size: {} bytes", stats.size)?;
    writeln!(out, "File Type: {}", stats.mime)?;
    writeln!(out, "Unique Bytes: {}", stats.unique_bytes)?;
    for (name, hex) in digests.iter() {
        writeln!(out, "{name}: {hex}")?;
    }
    Ok(())
}

fn stdout_error(source: io::Error) -> Error {
    Error::Output {
        target: "stdout".into(),
        source,
    }
}

/// Print a one-line diagnostic and pick the exit status
fn report_failure(err: &anyhow::Error) -> ExitCode {
    let status = failure_status(err);
    if status != 0 {
        let _ = io::stdout().flush();
        eprintln!("error: {err}");
    }
    ExitCode::from(status)
}

fn failure_status(err: &anyhow::Error) -> u8 {
    let Some(core) = err.downcast_ref::<Error>() else {
        return EXIT_INTERNAL;
    };

    // A closed pipe (e.g. `ghdump f | head`) ends the dump early, not in failure.
    if let Error::Output { source, .. } = core {
        if source.kind() == io::ErrorKind::BrokenPipe {
            return 0;
        }
    }
    exit_status(core.kind())
}

fn exit_status(kind: ErrorKind) -> u8 {
    match kind {
        ErrorKind::Usage => EXIT_USAGE,
        ErrorKind::Input => EXIT_NO_INPUT,
        ErrorKind::PartitionRead | ErrorKind::Output => EXIT_IO,
        ErrorKind::Cancelled => EXIT_CANCELLED,
        ErrorKind::Internal => EXIT_INTERNAL,
    }
}
