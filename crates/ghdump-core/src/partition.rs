//! File partitioning for parallel reads.

use crate::error::{Error, Result};

/// Half-open byte range `[start, end)` assigned to one read task
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReadPartition {
    /// Position of the partition in the plan
    pub index: usize,
    /// First byte of the range
    pub start: u64,
    /// One past the last byte of the range
    pub end: u64,
}

impl ReadPartition {
    /// Number of bytes covered
    #[must_use]
    pub fn len(&self) -> u64 {
        self.end - self.start
    }

    /// Whether the range is empty
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }
}

/// Contiguous partition plan covering `[0, file_size)`
///
/// Every partition holds `file_size / count` bytes and the last one absorbs
/// the remainder of the division. With more partitions than bytes, all but
/// the last are empty.
#[derive(Debug, Clone)]
pub struct Partitions {
    file_size: u64,
    parts: Vec<ReadPartition>,
}

impl Partitions {
    /// Plan `count` partitions for a file of `file_size` bytes
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidOption`] if `count` is zero.
    ///
    /// # Example
    ///
    /// ```
    /// use ghdump_core::Partitions;
    ///
    /// let plan = Partitions::new(10, 3)?;
    /// let ranges: Vec<_> = plan.iter().map(|p| (p.start, p.end)).collect();
    /// assert_eq!(ranges, vec![(0, 3), (3, 6), (6, 10)]);
    /// # Ok::<(), ghdump_core::Error>(())
    /// ```
    pub fn new(file_size: u64, count: usize) -> Result<Self> {
        if count == 0 {
            return Err(Error::InvalidOption(
                "partition count must be at least 1".into(),
            ));
        }

        let base = file_size / count as u64;
        let parts = (0..count)
            .map(|index| {
                let start = index as u64 * base;
                let end = if index == count - 1 {
                    file_size
                } else {
                    start + base
                };
                ReadPartition { index, start, end }
            })
            .collect();

        let plan = Self { file_size, parts };
        plan.assert_tiling();
        Ok(plan)
    }

    fn assert_tiling(&self) {
        let mut cursor = 0u64;
        for part in &self.parts {
            assert_eq!(part.start, cursor, "partition {} leaves a gap", part.index);
            assert!(part.end >= part.start, "partition {} is inverted", part.index);
            cursor = part.end;
        }
        assert_eq!(cursor, self.file_size, "partitions do not cover the file");
    }

    /// Total size covered by the plan
    #[must_use]
    pub fn file_size(&self) -> u64 {
        self.file_size
    }

    /// Number of partitions, including empty ones
    #[must_use]
    pub fn len(&self) -> usize {
        self.parts.len()
    }

    /// Always false; a plan has at least one partition
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.parts.is_empty()
    }

    /// Iterate over all partitions in offset order
    pub fn iter(&self) -> impl Iterator<Item = &ReadPartition> {
        self.parts.iter()
    }

    /// Iterate over the partitions that actually cover bytes
    pub fn non_empty(&self) -> impl Iterator<Item = &ReadPartition> {
        self.parts.iter().filter(|p| !p.is_empty())
    }

    /// Split `buf` into one mutable slice per partition
    ///
    /// `buf` must be exactly `file_size` bytes long.
    pub(crate) fn carve<'a>(&self, buf: &'a mut [u8]) -> Vec<(ReadPartition, &'a mut [u8])> {
        debug_assert_eq!(buf.len() as u64, self.file_size);

        let mut rest = buf;
        let mut slices = Vec::with_capacity(self.parts.len());
        for part in &self.parts {
            let (head, tail) = std::mem::take(&mut rest).split_at_mut(part.len() as usize);
            slices.push((*part, head));
            rest = tail;
        }
        slices
    }
}
