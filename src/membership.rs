//! Membership data model: which input a line came from, the tri-state
//! classification of a line, and the sorted result rows handed to reporters.
//!
//! A line seen in the first file starts as [`Membership::OnlyFirst`] and is
//! upgraded to [`Membership::Both`] once the second file contains it. Nothing
//! is ever downgraded.
use std::fmt;

use serde::{Serialize, Serializer};

/// Which input file a line was read from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Side {
    First,
    Second,
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Side::First => f.write_str("File1"),
            Side::Second => f.write_str("File2"),
        }
    }
}

/// Classification of a distinct line across both inputs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Membership {
    OnlyFirst,
    Both,
    OnlySecond,
}

impl Membership {
    /// All memberships in report order.
    pub const ALL: [Membership; 3] = [
        Membership::OnlyFirst,
        Membership::Both,
        Membership::OnlySecond,
    ];

    /// Numeric code used by ungrouped CSV and JSON output.
    pub fn code(self) -> u8 {
        match self {
            Membership::OnlyFirst => 1,
            Membership::Both => 2,
            Membership::OnlySecond => 3,
        }
    }

    /// Human-readable category label.
    pub fn label(self) -> &'static str {
        match self {
            Membership::OnlyFirst => "Only in FILE1",
            Membership::Both => "In both files",
            Membership::OnlySecond => "Only in FILE2",
        }
    }

    /// Membership of a line first seen on `side`.
    pub fn first_seen(side: Side) -> Self {
        match side {
            Side::First => Membership::OnlyFirst,
            Side::Second => Membership::OnlySecond,
        }
    }

    /// Membership after the line is seen again on `side`.
    pub fn seen_again(self, side: Side) -> Self {
        match (self, side) {
            (Membership::OnlyFirst, Side::Second) => Membership::Both,
            (current, _) => current,
        }
    }
}

impl Serialize for Membership {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u8(self.code())
    }
}

/// One row of the sorted classification result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Comparison {
    pub item: String,
    pub status: Membership,
}

impl Comparison {
    pub fn new(item: impl Into<String>, status: Membership) -> Self {
        Self {
            item: item.into(),
            status,
        }
    }
}
