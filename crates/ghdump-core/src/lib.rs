//! # ghdump core
//!
//! Loading and rendering engine behind the `ghdump` CLI.
//!
//! This crate provides:
//! - Partitioned parallel loading of a file into one preallocated buffer
//! - Content digests (SHA-256, MD5, CRC32, Whirlpool)
//! - Media type sniffing with best-effort fallbacks
//! - Hex dump formatting with color bands and an ASCII gloss
//! - Rate-limited streaming and batch file output of the dump

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod cancel;
pub mod digest;
pub mod error;
pub mod format;
pub mod partition;
pub mod progress;
pub mod reader;
pub mod render;
pub mod sniff;
pub mod stats;

pub use cancel::CancelToken;
pub use digest::{DigestAlgorithm, Digests};
pub use error::{Error, ErrorKind, Result};
pub use format::{Band, DumpFormatter, DumpOptions};
pub use partition::{Partitions, ReadPartition};
pub use progress::{ProgressObserver, ProgressState};
pub use reader::ChunkedReader;
pub use render::{BatchWriter, RateLimitedRenderer, RenderReport};
pub use stats::FileStats;

/// Default number of read partitions (worker threads)
pub const DEFAULT_PARTITIONS: usize = 5;

/// Default number of bytes per dump line
pub const DEFAULT_BYTES_PER_LINE: usize = 16;

/// Size of a single read call issued by a partition worker (64 KiB)
pub const READ_BLOCK_SIZE: usize = 64 * 1024;

/// Streaming window size (1 MiB)
pub const WINDOW_SIZE: usize = 1024 * 1024;

/// Default streaming display rate in bytes per second
pub const DEFAULT_DISPLAY_RATE: u64 = 1_500_000;

/// Slice size used by the batch writer (100 KiB)
pub const WRITE_SLICE_SIZE: usize = 100 * 1024;
