//! Engine: classifies the distinct lines of two inputs into only-first, both,
//! or only-second. The first input is always consumed completely before the
//! second one, so a line present in both is detected no matter where it
//! occurs in either file.
//!
//! Typical usage:
//!
//! ```no_run
//! use cmplist::engine::Classifier;
//! # fn main() -> anyhow::Result<()> {
//! let mut classifier = Classifier::new();
//! classifier.load_from_file_paths("/path/to/list1.txt", "/path/to/list2.txt")?;
//! let stats = classifier.stats();
//! println!("{} lines in both files", stats.both_files_count);
//! # Ok(())
//! # }
//! ```
use std::collections::{HashMap, HashSet};
use std::path::Path;

use bstr::ByteSlice;
use indicatif::ProgressBar;
use log::info;
use rayon::ThreadPool;
use rayon::prelude::*;

use crate::error::CompareError;
use crate::io::{DEFAULT_MMAP_THRESHOLD_BYTES, count_lines, iter_lines_auto, read_lines};
use crate::membership::{Comparison, Membership, Side};
use crate::progress::file_bar;
use crate::report::sorted_results;
use crate::stats::{Stats, compute_stats};

/// Trimmed, non-blank line bytes mapped to their membership. Keys are raw
/// bytes so lines that are not valid UTF-8 still compare exactly.
pub type ClassificationMap = HashMap<Vec<u8>, Membership>;

/// Knobs for loading the two inputs from disk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadOptions {
    /// Files at least this large are memory-mapped.
    pub mmap_threshold: u64,
    /// Number of workers deduplicating each file. `0` and `1` read sequentially.
    pub workers: usize,
    /// Draw a progress bar per file. Costs one extra counting pass per file.
    pub progress: bool,
}

impl Default for LoadOptions {
    fn default() -> Self {
        Self {
            mmap_threshold: DEFAULT_MMAP_THRESHOLD_BYTES,
            workers: 1,
            progress: false,
        }
    }
}

/// Physical and blank line counts for one input.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SideStats {
    pub lines: usize,
    pub blank: usize,
}

impl SideStats {
    fn count(&mut self, blank: bool) {
        self.lines += 1;
        if blank {
            self.blank += 1;
        }
    }
}

/// Line counts collected while loading both inputs.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct LoadStats {
    pub first: SideStats,
    pub second: SideStats,
}

/// Owns the classification map and the loaders that fill it.
#[derive(Debug, Default)]
pub struct Classifier {
    map: ClassificationMap,
    load_stats: Option<LoadStats>,
}

impl Classifier {
    /// Create an empty classifier.
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply one raw line read from `side`. Returns `true` when the line was
    /// blank after trimming and therefore ignored.
    pub fn record(&mut self, line: &[u8], side: Side) -> bool {
        let line = line.trim();
        if line.is_empty() {
            return true;
        }
        self.record_trimmed(line, side);
        false
    }

    fn record_trimmed(&mut self, line: &[u8], side: Side) {
        match self.map.get_mut(line) {
            Some(membership) => *membership = membership.seen_again(side),
            None => {
                self.map.insert(line.to_vec(), Membership::first_seen(side));
            }
        }
    }

    /// Apply a sequence of raw lines from `side`, in order.
    pub fn ingest<I, S>(&mut self, lines: I, side: Side) -> SideStats
    where
        I: IntoIterator<Item = S>,
        S: AsRef<[u8]>,
    {
        let mut stats = SideStats::default();
        for line in lines {
            stats.count(self.record(line.as_ref(), side));
        }
        stats
    }

    /// Classify two texts already in memory, replacing any earlier result.
    /// Intended for tests and small programmatic integrations.
    pub fn load_from_strings(&mut self, first: &str, second: &str) {
        let mut fresh = Classifier::new();
        let first = fresh.ingest(first.lines(), Side::First);
        let second = fresh.ingest(second.lines(), Side::Second);
        fresh.load_stats = Some(LoadStats { first, second });
        *self = fresh;
    }

    /// Convenience wrapper that reads sequentially with the default mmap
    /// threshold and no progress bars.
    pub fn load_from_file_paths<P: AsRef<Path>>(
        &mut self,
        first: P,
        second: P,
    ) -> Result<(), CompareError> {
        self.load_from_file_paths_with_options(first, second, &LoadOptions::default())
    }

    /// Classify two files. Any open or read failure aborts the whole load and
    /// leaves `self` untouched.
    pub fn load_from_file_paths_with_options<P: AsRef<Path>>(
        &mut self,
        first: P,
        second: P,
        options: &LoadOptions,
    ) -> Result<(), CompareError> {
        let pool = if options.workers > 1 {
            info!("deduplicating input on {} workers", options.workers);
            Some(
                rayon::ThreadPoolBuilder::new()
                    .num_threads(options.workers)
                    .build()?,
            )
        } else {
            None
        };

        let mut fresh = Classifier::new();
        let first = fresh.load_side(first.as_ref(), Side::First, options, pool.as_ref())?;
        let second = fresh.load_side(second.as_ref(), Side::Second, options, pool.as_ref())?;
        fresh.load_stats = Some(LoadStats { first, second });
        *self = fresh;
        Ok(())
    }

    fn load_side(
        &mut self,
        path: &Path,
        side: Side,
        options: &LoadOptions,
        pool: Option<&ThreadPool>,
    ) -> Result<SideStats, CompareError> {
        let bar = if options.progress {
            Some(file_bar(side, count_lines(path, options.mmap_threshold)?))
        } else {
            None
        };

        let stats = match pool {
            Some(pool) => {
                let lines = read_lines(path, options.mmap_threshold)?;
                self.ingest_parallel(&lines, side, pool, bar.as_ref())
            }
            None => {
                let mut stats = SideStats::default();
                for line in iter_lines_auto(path, options.mmap_threshold)? {
                    stats.count(self.record(&line?, side));
                    if let Some(bar) = &bar {
                        bar.inc(1);
                    }
                }
                stats
            }
        };

        if let Some(bar) = bar {
            bar.finish();
        }
        info!(
            "{side} {}: {} lines read, {} blank",
            path.display(),
            stats.lines,
            stats.blank
        );
        Ok(stats)
    }

    /// Deduplicate `lines` on the pool, then apply the distinct lines. Only the
    /// set of lines matters for one side, so chunking cannot change the result.
    fn ingest_parallel(
        &mut self,
        lines: &[Vec<u8>],
        side: Side,
        pool: &ThreadPool,
        bar: Option<&ProgressBar>,
    ) -> SideStats {
        let chunk_size = lines
            .len()
            .div_ceil(pool.current_num_threads() * 4)
            .max(1);
        let (distinct, blank) = pool.install(|| {
            lines
                .par_chunks(chunk_size)
                .map(|chunk| {
                    let mut set: HashSet<&[u8]> = HashSet::new();
                    let mut blank = 0usize;
                    for line in chunk {
                        let line = line.trim();
                        if line.is_empty() {
                            blank += 1;
                        } else {
                            set.insert(line);
                        }
                    }
                    if let Some(bar) = bar {
                        bar.inc(chunk.len() as u64);
                    }
                    (set, blank)
                })
                .reduce(
                    || (HashSet::new(), 0),
                    |(a, a_blank), (b, b_blank)| {
                        let (mut big, small) = if a.len() >= b.len() {
                            (a, b)
                        } else {
                            (b, a)
                        };
                        big.extend(small);
                        (big, a_blank + b_blank)
                    },
                )
        });
        for line in distinct {
            self.record_trimmed(line, side);
        }
        SideStats {
            lines: lines.len(),
            blank,
        }
    }

    pub fn map(&self) -> &ClassificationMap {
        &self.map
    }

    pub fn into_map(self) -> ClassificationMap {
        self.map
    }

    /// Line counts from the last successful load.
    pub fn load_stats(&self) -> Option<LoadStats> {
        self.load_stats
    }

    /// All classified lines sorted ascending by content.
    pub fn results(&self) -> Vec<Comparison> {
        sorted_results(&self.map)
    }

    pub fn stats(&self) -> Stats {
        compute_stats(&self.map)
    }
}

/// Classify two in-memory line sequences; the first is consumed entirely
/// before the second.
pub fn classify<I1, I2, S1, S2>(lines1: I1, lines2: I2) -> ClassificationMap
where
    I1: IntoIterator<Item = S1>,
    I2: IntoIterator<Item = S2>,
    S1: AsRef<[u8]>,
    S2: AsRef<[u8]>,
{
    let mut classifier = Classifier::new();
    classifier.ingest(lines1, Side::First);
    classifier.ingest(lines2, Side::Second);
    classifier.into_map()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn write(dir: &Path, name: &str, contents: impl AsRef<[u8]>) -> std::path::PathBuf {
        let path = dir.join(name);
        std::fs::write(&path, contents).unwrap();
        path
    }

    fn at(map: &ClassificationMap, line: &str) -> Membership {
        map[line.as_bytes()]
    }

    #[test]
    fn classifies_fruit_example() {
        let map = classify(["apple", "banana", "apple"], ["banana", "cherry"]);
        assert_eq!(map.len(), 3);
        assert_eq!(at(&map, "apple"), Membership::OnlyFirst);
        assert_eq!(at(&map, "banana"), Membership::Both);
        assert_eq!(at(&map, "cherry"), Membership::OnlySecond);
    }

    #[test]
    fn blank_lines_never_become_keys() {
        let map = classify([""], ["  "]);
        assert!(map.is_empty());

        let map = classify(["", " a ", "\t"], ["", "a", "   "]);
        assert_eq!(map.len(), 1);
        assert_eq!(at(&map, "a"), Membership::Both);
    }

    #[test]
    fn repeats_classify_like_a_single_occurrence() {
        let once = classify(["x", "y"], ["y", "z"]);
        let many = classify(["x", "x", "x", "y"], ["y", "y", "z", "z"]);
        assert_eq!(once, many);
    }

    #[test]
    fn second_side_never_downgrades() {
        let mut c = Classifier::new();
        c.ingest(["dup"], Side::First);
        c.ingest(["dup", "late", "late"], Side::Second);
        assert_eq!(at(c.map(), "dup"), Membership::Both);
        assert_eq!(at(c.map(), "late"), Membership::OnlySecond);
        // Seeing the first file's lines again does not undo the upgrade.
        c.ingest(["dup", "late"], Side::First);
        assert_eq!(at(c.map(), "dup"), Membership::Both);
        assert_eq!(at(c.map(), "late"), Membership::OnlySecond);
    }

    #[test]
    fn classifying_twice_is_idempotent() {
        let a = classify(["one", "two", ""], ["two", "three"]);
        let b = classify(["one", "two", ""], ["two", "three"]);
        assert_eq!(a, b);
    }

    #[test]
    fn load_from_strings_tracks_line_counts() {
        let mut c = Classifier::new();
        c.load_from_strings("a\r\n\nb\n", "b\n  \nc");
        let stats = c.load_stats().unwrap();
        assert_eq!(stats.first, SideStats { lines: 3, blank: 1 });
        assert_eq!(stats.second, SideStats { lines: 3, blank: 1 });
        assert_eq!(c.stats().total_count, 3);
    }

    #[test]
    fn reloading_from_strings_replaces_the_previous_result() {
        let mut c = Classifier::new();
        c.load_from_strings("a", "");
        assert_eq!(at(c.map(), "a"), Membership::OnlyFirst);
        c.load_from_strings("", "a");
        assert_eq!(c.map().len(), 1);
        assert_eq!(at(c.map(), "a"), Membership::OnlySecond);
        let stats = c.load_stats().unwrap();
        assert_eq!(stats.first, SideStats { lines: 0, blank: 0 });
    }

    #[test]
    fn distinct_invalid_utf8_lines_stay_distinct() {
        let dir = tempdir().unwrap();
        let f1 = write(dir.path(), "a.bin", b"\xff\n");
        let f2 = write(dir.path(), "b.bin", b"\xfe\n");

        for workers in [1, 3] {
            let mut c = Classifier::new();
            let options = LoadOptions {
                workers,
                ..LoadOptions::default()
            };
            c.load_from_file_paths_with_options(&f1, &f2, &options).unwrap();
            assert_eq!(c.map().len(), 2);
            assert_eq!(c.map()[b"\xff".as_slice()], Membership::OnlyFirst);
            assert_eq!(c.map()[b"\xfe".as_slice()], Membership::OnlySecond);
            let stats = c.stats();
            assert_eq!((stats.only_file1_count, stats.only_file2_count), (1, 1));
        }
    }

    #[test]
    fn trims_unicode_whitespace_around_raw_bytes() {
        let map = classify([b"\xe2\x80\x83x\xff \t".as_slice()], [b"x\xff".as_slice()]);
        assert_eq!(map.len(), 1);
        assert_eq!(map[b"x\xff".as_slice()], Membership::Both);
    }

    #[test]
    fn parallel_and_sequential_loading_agree() {
        let dir = tempdir().unwrap();
        let mut first = String::new();
        let mut second = String::new();
        for i in 0..500 {
            first.push_str(&format!("item-{}\n", i % 173));
            if i % 7 == 0 {
                first.push('\n');
            }
            second.push_str(&format!("  item-{}  \n", (i * 3) % 251));
        }
        let f1 = write(dir.path(), "first.txt", &first);
        let f2 = write(dir.path(), "second.txt", &second);

        let mut sequential = Classifier::new();
        sequential.load_from_file_paths(&f1, &f2).unwrap();

        let mut parallel = Classifier::new();
        let options = LoadOptions {
            workers: 4,
            ..LoadOptions::default()
        };
        parallel.load_from_file_paths_with_options(&f1, &f2, &options).unwrap();

        assert_eq!(sequential.map(), parallel.map());
        assert_eq!(sequential.load_stats(), parallel.load_stats());
    }

    #[test]
    fn mmap_loading_matches_buffered_loading() {
        let dir = tempdir().unwrap();
        let f1 = write(dir.path(), "a.txt", "red\r\ngreen\nblue\n");
        let f2 = write(dir.path(), "b.txt", "green\r\nyellow");

        let mut buffered = Classifier::new();
        buffered.load_from_file_paths(&f1, &f2).unwrap();
        let mut mapped = Classifier::new();
        let options = LoadOptions {
            mmap_threshold: 1,
            ..LoadOptions::default()
        };
        mapped.load_from_file_paths_with_options(&f1, &f2, &options).unwrap();
        assert_eq!(buffered.map(), mapped.map());
        assert_eq!(at(mapped.map(), "green"), Membership::Both);
    }

    #[test]
    fn failed_load_keeps_previous_state() {
        let dir = tempdir().unwrap();
        let f1 = write(dir.path(), "a.txt", "kept\n");
        let missing = dir.path().join("missing.txt");

        let mut c = Classifier::new();
        c.load_from_strings("kept", "");
        let err = c.load_from_file_paths(&f1, &missing).unwrap_err();
        assert!(matches!(err, CompareError::Open { .. }));
        assert_eq!(c.map().len(), 1);
        assert_eq!(at(c.map(), "kept"), Membership::OnlyFirst);
    }

    #[test]
    fn progress_counting_does_not_change_results() {
        let dir = tempdir().unwrap();
        let f1 = write(dir.path(), "a.txt", "x\ny\n");
        let f2 = write(dir.path(), "b.txt", "y\nz\n");
        let mut c = Classifier::new();
        let options = LoadOptions {
            progress: true,
            ..LoadOptions::default()
        };
        c.load_from_file_paths_with_options(&f1, &f2, &options).unwrap();
        let stats = c.stats();
        assert_eq!(
            (
                stats.only_file1_count,
                stats.both_files_count,
                stats.only_file2_count
            ),
            (1, 1, 1)
        );
    }
}
