//! Aggregate counts over a classification.
//!
//! `Stats` is always derived, either from the map or from the sorted result
//! rows; both yield the same numbers for the same classification.
use serde::Serialize;

use crate::engine::ClassificationMap;
use crate::membership::{Comparison, Membership};

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Stats {
    pub only_file1_count: usize,
    pub both_files_count: usize,
    pub only_file2_count: usize,
    pub total_count: usize,
}

impl Stats {
    fn tally<I: IntoIterator<Item = Membership>>(memberships: I) -> Self {
        let mut stats = Stats::default();
        for membership in memberships {
            match membership {
                Membership::OnlyFirst => stats.only_file1_count += 1,
                Membership::Both => stats.both_files_count += 1,
                Membership::OnlySecond => stats.only_file2_count += 1,
            }
            stats.total_count += 1;
        }
        stats
    }

    /// Count over result rows.
    pub fn from_results(results: &[Comparison]) -> Self {
        Self::tally(results.iter().map(|r| r.status))
    }

    /// Count for a single membership.
    pub fn count(&self, membership: Membership) -> usize {
        match membership {
            Membership::OnlyFirst => self.only_file1_count,
            Membership::Both => self.both_files_count,
            Membership::OnlySecond => self.only_file2_count,
        }
    }
}

pub fn compute_stats(map: &ClassificationMap) -> Stats {
    Stats::tally(map.values().copied())
}
