//! Line sources for the classifier. Small files are read through a buffered
//! reader, large ones are memory-mapped and scanned for `\n` with `memchr`.
//! Both paths strip a trailing `\r` and yield raw bytes; lines are never
//! decoded here, so distinct byte sequences stay distinct.
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use log::debug;
use memmap2::Mmap;

use crate::error::CompareError;

/// Threshold in bytes above which we attempt to use mmap for reading.
pub const DEFAULT_MMAP_THRESHOLD_BYTES: u64 = 16 * 1024 * 1024; // 16 MiB

pub type LineIter = Box<dyn Iterator<Item = Result<Vec<u8>, CompareError>> + Send + 'static>;

/// Decide whether to use mmap based on file size and threshold.
pub fn should_use_mmap(file_size_bytes: u64, threshold_bytes: u64) -> bool {
    file_size_bytes >= threshold_bytes
}

fn open(path: &Path) -> Result<File, CompareError> {
    File::open(path).map_err(|source| CompareError::Open {
        path: path.to_path_buf(),
        source,
    })
}

/// Iterate lines from a file path using buffered reader (non-mmap).
pub fn iter_lines_bufread<P: AsRef<Path>>(path: P) -> Result<LineIter, CompareError> {
    let path = path.as_ref().to_path_buf();
    let reader = BufReader::new(open(&path)?);
    let lines = reader.split(b'\n').map(move |chunk| match chunk {
        Ok(mut bytes) => {
            if bytes.last() == Some(&b'\r') {
                bytes.pop();
            }
            Ok(bytes)
        }
        Err(source) => Err(CompareError::Read {
            path: path.clone(),
            source,
        }),
    });
    Ok(Box::new(lines))
}

/// Iterate lines from a file path using mmap. Each returned line is still an
/// owned buffer; the scan itself does not copy.
pub fn iter_lines_mmap<P: AsRef<Path>>(path: P) -> Result<LineIter, CompareError> {
    let path = path.as_ref();
    let file = open(path)?;
    let mmap = unsafe { Mmap::map(&file) }.map_err(|source| CompareError::Map {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(Box::new(MmapLines { mmap, pos: 0 }))
}

struct MmapLines {
    mmap: Mmap,
    pos: usize,
}

impl Iterator for MmapLines {
    type Item = Result<Vec<u8>, CompareError>;
    fn next(&mut self) -> Option<Self::Item> {
        let data: &[u8] = &self.mmap;
        if self.pos >= data.len() {
            return None;
        }
        let start = self.pos;
        if let Some(off) = memchr::memchr(b'\n', &data[start..]) {
            let end = start + off;
            self.pos = end + 1;
            Some(Ok(line_from_bytes(&data[start..end])))
        } else {
            // Last line without trailing newline
            self.pos = data.len();
            Some(Ok(line_from_bytes(&data[start..])))
        }
    }
}

fn line_from_bytes(bytes: &[u8]) -> Vec<u8> {
    bytes.strip_suffix(b"\r").unwrap_or(bytes).to_vec()
}

/// Choose mmap or bufread and return an iterator over lines.
pub fn iter_lines_auto<P: AsRef<Path>>(
    path: P,
    threshold_bytes: u64,
) -> Result<LineIter, CompareError> {
    let path = path.as_ref();
    let meta = std::fs::metadata(path).map_err(|source| CompareError::Open {
        path: path.to_path_buf(),
        source,
    })?;
    if meta.is_file() && should_use_mmap(meta.len(), threshold_bytes) {
        debug!("mmap {} ({} bytes)", path.display(), meta.len());
        iter_lines_mmap(path)
    } else {
        debug!("buffered read {} ({} bytes)", path.display(), meta.len());
        iter_lines_bufread(path)
    }
}

/// Count the physical lines of a file. Used to size progress bars, at the
/// cost of reading the file one extra time.
pub fn count_lines<P: AsRef<Path>>(path: P, threshold_bytes: u64) -> Result<u64, CompareError> {
    let mut count = 0u64;
    for line in iter_lines_auto(path, threshold_bytes)? {
        line?;
        count += 1;
    }
    Ok(count)
}

/// Read every line of a file into memory, failing on the first read error.
pub fn read_lines<P: AsRef<Path>>(
    path: P,
    threshold_bytes: u64,
) -> Result<Vec<Vec<u8>>, CompareError> {
    iter_lines_auto(path, threshold_bytes)?.collect()
}
