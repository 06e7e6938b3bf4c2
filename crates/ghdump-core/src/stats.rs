//! Descriptive file statistics.

/// Summary printed before the dump
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileStats {
    /// File size in bytes
    pub size: u64,
    /// Detected MIME type
    pub mime: String,
    /// Number of distinct byte values present
    pub unique_bytes: usize,
}

impl FileStats {
    /// Collect statistics for a loaded buffer
    #[must_use]
    pub fn collect(data: &[u8], mime: String) -> Self {
        Self {
            size: data.len() as u64,
            mime,
            unique_bytes: unique_bytes(data),
        }
    }
}

/// Count distinct byte values in `data`
#[must_use]
pub fn unique_bytes(data: &[u8]) -> usize {
    let mut seen = [false; 256];
    for &b in data {
        seen[b as usize] = true;
    }
    seen.iter().filter(|&&s| s).count()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unique_bytes() {
        assert_eq!(unique_bytes(b""), 0);
        assert_eq!(unique_bytes(b"aaaa"), 1);
        assert_eq!(unique_bytes(b"abcabc"), 3);
        let all: Vec<u8> = (0..=255).collect();
        assert_eq!(unique_bytes(&all), 256);
    }

    #[test]
    fn test_collect() {
        let stats = FileStats::collect(b"hello", "text/plain".into());
        assert_eq!(stats.size, 5);
        assert_eq!(stats.unique_bytes, 4);
    }
}
