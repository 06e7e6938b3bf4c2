//! Partitioned parallel file loading.
//!
//! The file is split into contiguous [`ReadPartition`]s and every non-empty
//! partition is read by its own scoped thread straight into its disjoint
//! slice of one preallocated buffer. The shared [`ProgressState`] is the
//! only state the workers synchronize on.

use crate::READ_BLOCK_SIZE;
use crate::cancel::CancelToken;
use crate::error::{Error, Result};
use crate::partition::{Partitions, ReadPartition};
use crate::progress::{ProgressObserver, ProgressState};
use std::fs::File;
use std::io::{self, Read, Seek, SeekFrom};
use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::thread;
use std::time::Instant;
use tracing::{debug, info, warn};

/// Value of the shared failure index while no partition has failed
const NO_FAILURE: usize = usize::MAX;

/// Loads a whole file with a fixed pool of parallel readers
#[derive(Clone)]
pub struct ChunkedReader {
    partitions: usize,
    cancel: CancelToken,
    observer: Option<Arc<dyn ProgressObserver>>,
}

impl ChunkedReader {
    /// Create a reader using `partitions` concurrent read tasks
    #[must_use]
    pub fn new(partitions: usize) -> Self {
        Self {
            partitions,
            cancel: CancelToken::new(),
            observer: None,
        }
    }

    /// Abort in-flight loads when `cancel` is tripped
    #[must_use]
    pub fn with_cancel(mut self, cancel: CancelToken) -> Self {
        self.cancel = cancel;
        self
    }

    /// Report read progress to `observer`
    #[must_use]
    pub fn with_observer(mut self, observer: Arc<dyn ProgressObserver>) -> Self {
        self.observer = Some(observer);
        self
    }

    /// Number of read tasks
    #[must_use]
    pub fn partitions(&self) -> usize {
        self.partitions
    }

    /// Load the file at `path` into memory
    ///
    /// All workers are joined before this returns. If any partition fails
    /// the whole load fails and the partially filled buffer is dropped; the
    /// failure of the lowest-indexed partition is reported.
    ///
    /// # Errors
    ///
    /// - [`Error::Open`] / [`Error::Metadata`] if the file cannot be opened or queried
    /// - [`Error::NotRegularFile`] for directories and other special files
    /// - [`Error::PartitionRead`] if a worker fails to seek or read
    /// - [`Error::Cancelled`] if the cancel token was tripped
    ///
    /// # Example
    ///
    /// ```no_run
    /// use ghdump_core::ChunkedReader;
    ///
    /// let data = ChunkedReader::new(8).load("/path/to/file.bin")?;
    /// println!("loaded {} bytes", data.len());
    /// # Ok::<(), ghdump_core::Error>(())
    /// ```
    pub fn load<P: AsRef<Path>>(&self, path: P) -> Result<Vec<u8>> {
        let path = path.as_ref();
        let file_size = file_size(path)?;
        let plan = Partitions::new(file_size, self.partitions)?;
        let len = usize::try_from(file_size).map_err(|_| Error::TooLarge {
            path: path.to_path_buf(),
            size: file_size,
        })?;

        info!(
            "Loading {} ({} bytes) with {} partitions",
            path.display(),
            file_size,
            plan.len()
        );

        let progress = match &self.observer {
            Some(observer) => ProgressState::with_observer(file_size, observer.clone()),
            None => ProgressState::new(file_size),
        };

        let started = Instant::now();
        let mut buf = vec![0u8; len];
        self.read_all(path, &plan, &mut buf, &progress)?;

        debug_assert!(progress.is_complete());
        debug!(
            "Loaded {} bytes in {:.3}s",
            progress.done(),
            started.elapsed().as_secs_f64()
        );
        Ok(buf)
    }

    fn read_all(
        &self,
        path: &Path,
        plan: &Partitions,
        buf: &mut [u8],
        progress: &ProgressState,
    ) -> Result<()> {
        let failed = AtomicUsize::new(NO_FAILURE);
        let task = PartitionTask {
            path,
            progress,
            cancel: &self.cancel,
            failed: &failed,
        };

        let results: Vec<Result<()>> = thread::scope(|s| {
            let mut handles = Vec::with_capacity(plan.len());
            for (part, slice) in plan.carve(buf) {
                if part.is_empty() {
                    debug!("Skipping empty partition {}", part.index);
                    continue;
                }
                let task = &task;
                let spawned = thread::Builder::new()
                    .name(format!("ghdump-read-{}", part.index))
                    .spawn_scoped(s, move || task.run(part, slice));
                match spawned {
                    Ok(handle) => handles.push((part.index, Ok(handle))),
                    Err(err) => {
                        failed.fetch_min(part.index, Ordering::AcqRel);
                        handles.push((part.index, Err(err)));
                    }
                }
            }

            handles
                .into_iter()
                .map(|(index, handle)| match handle {
                    Ok(handle) => handle
                        .join()
                        .unwrap_or(Err(Error::WorkerPanicked { index })),
                    Err(source) => Err(Error::Spawn { index, source }),
                })
                .collect()
        });

        first_failure(results)
    }
}

impl std::fmt::Debug for ChunkedReader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChunkedReader")
            .field("partitions", &self.partitions)
            .field("cancel", &self.cancel)
            .field("observed", &self.observer.is_some())
            .finish()
    }
}

/// Shared context handed to every worker
struct PartitionTask<'a> {
    path: &'a Path,
    progress: &'a ProgressState,
    cancel: &'a CancelToken,
    /// Lowest index of a partition that failed, or [`NO_FAILURE`]
    failed: &'a AtomicUsize,
}

impl PartitionTask<'_> {
    fn run(&self, part: ReadPartition, slice: &mut [u8]) -> Result<()> {
        let result = self.read_into(part, slice);
        if let Err(err) = &result {
            if !matches!(err, Error::Cancelled) {
                warn!("Partition {} failed: {}", part.index, err);
                self.failed.fetch_min(part.index, Ordering::AcqRel);
            }
        }
        result
    }

    fn read_into(&self, part: ReadPartition, slice: &mut [u8]) -> Result<()> {
        let read_err = |source: io::Error| Error::PartitionRead {
            index: part.index,
            start: part.start,
            end: part.end,
            source,
        };

        debug!(
            "Partition {} reading [{}, {})",
            part.index, part.start, part.end
        );

        let mut file = File::open(self.path).map_err(read_err)?;
        file.seek(SeekFrom::Start(part.start)).map_err(read_err)?;

        for block in slice.chunks_mut(READ_BLOCK_SIZE) {
            // Partitions below a failure keep reading; their errors take precedence.
            if self.cancel.is_cancelled() || self.failed.load(Ordering::Acquire) < part.index {
                return Err(Error::Cancelled);
            }
            file.read_exact(block).map_err(read_err)?;
            self.progress.advance(block.len() as u64);
        }
        Ok(())
    }
}

/// Pick the error to surface from the joined workers
///
/// Workers that stopped because a lower-indexed sibling failed report
/// `Cancelled`; the real failure takes precedence over those.
fn first_failure(results: Vec<Result<()>>) -> Result<()> {
    let mut cancelled = false;
    for result in results {
        match result {
            Ok(()) => {}
            Err(Error::Cancelled) => cancelled = true,
            Err(err) => return Err(err),
        }
    }
    if cancelled {
        Err(Error::Cancelled)
    } else {
        Ok(())
    }
}

fn file_size(path: &Path) -> Result<u64> {
    let file = File::open(path).map_err(|source| Error::Open {
        path: path.to_path_buf(),
        source,
    })?;
    let metadata = file.metadata().map_err(|source| Error::Metadata {
        path: path.to_path_buf(),
        source,
    })?;
    if !metadata.is_file() {
        return Err(Error::NotRegularFile {
            path: path.to_path_buf(),
        });
    }
    Ok(metadata.len())
}
