//! Run configuration shared by the CLI and library callers.
use std::path::PathBuf;

use crate::engine::LoadOptions;
use crate::error::CompareError;
use crate::io::DEFAULT_MMAP_THRESHOLD_BYTES;
use crate::membership::Side;
use crate::report::{OutputFormat, RenderOptions};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub file1: PathBuf,
    pub file2: PathBuf,
    pub color: bool,
    pub stats: bool,
    pub format: OutputFormat,
    pub group: bool,
    pub progress: bool,
    pub workers: usize,
    /// Zero disables mmap.
    pub mmap_threshold: u64,
}

/// Number of logical CPUs, or 1 when it cannot be determined.
pub fn default_workers() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1)
}

impl Config {
    pub fn new(file1: impl Into<PathBuf>, file2: impl Into<PathBuf>) -> Self {
        Self {
            file1: file1.into(),
            file2: file2.into(),
            color: true,
            stats: false,
            format: OutputFormat::Csv,
            group: false,
            progress: false,
            workers: default_workers(),
            mmap_threshold: DEFAULT_MMAP_THRESHOLD_BYTES,
        }
    }

    /// Check that both inputs exist, File1 first. A path whose existence
    /// cannot be determined passes here and fails later when it is opened.
    pub fn validate(&self) -> Result<(), CompareError> {
        for (side, path) in [(Side::First, &self.file1), (Side::Second, &self.file2)] {
            if let Ok(false) = path.try_exists() {
                return Err(CompareError::NotFound {
                    side,
                    path: path.clone(),
                });
            }
        }
        Ok(())
    }

    pub fn load_options(&self) -> LoadOptions {
        LoadOptions {
            mmap_threshold: if self.mmap_threshold == 0 {
                u64::MAX
            } else {
                self.mmap_threshold
            },
            workers: self.workers,
            progress: self.progress,
        }
    }

    pub fn render_options(&self) -> RenderOptions {
        RenderOptions {
            format: self.format,
            grouped: self.group,
            color: self.color,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn defaults_follow_cli_defaults() {
        let c = Config::new("a.txt", "b.txt");
        assert!(c.color);
        assert!(!c.stats);
        assert!(!c.group);
        assert!(!c.progress);
        assert_eq!(c.format, OutputFormat::Csv);
        assert!(c.workers >= 1);
    }

    #[test]
    fn validate_reports_the_first_missing_file() {
        let dir = tempdir().unwrap();
        let present = dir.path().join("present.txt");
        std::fs::write(&present, "x\n").unwrap();
        let missing = dir.path().join("missing.txt");

        let err = Config::new(&missing, &missing).validate().unwrap_err();
        assert!(matches!(
            err,
            CompareError::NotFound {
                side: Side::First,
                ..
            }
        ));
        let err = Config::new(&present, &missing).validate().unwrap_err();
        assert!(err.to_string().starts_with("File2 not found"));
        assert!(Config::new(&present, &present).validate().is_ok());
    }

    #[cfg(unix)]
    #[test]
    fn undeterminable_paths_are_left_to_the_loader() {
        let dir = tempdir().unwrap();
        let file = dir.path().join("plain.txt");
        std::fs::write(&file, "x\n").unwrap();
        // Looking inside a regular file fails with ENOTDIR, not "not found"
        let beneath_file = file.join("child.txt");

        let config = Config::new(&beneath_file, &file);
        assert!(config.validate().is_ok());
        let err = crate::engine::Classifier::new()
            .load_from_file_paths(&config.file1, &config.file2)
            .unwrap_err();
        assert!(matches!(err, CompareError::Open { .. }));
    }

    #[test]
    fn zero_threshold_disables_mmap() {
        let mut c = Config::new("a", "b");
        c.mmap_threshold = 0;
        assert_eq!(c.load_options().mmap_threshold, u64::MAX);
        c.mmap_threshold = 10;
        assert_eq!(c.load_options().mmap_threshold, 10);
    }
}
