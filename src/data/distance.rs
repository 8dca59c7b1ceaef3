// distance.rs - Distance values with an explicit "no distance known" state

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt::{Display, Formatter};

/// A gene-to-gene or best-match distance.
///
/// `Unreachable` means no within-tree distance exists. It compares as
/// infinitely far: greater than every known distance and equal to itself,
/// so it can take part in rank ordering without a sentinel value.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub enum MatchDistance {
    Known(f64),
    Unreachable,
}

impl MatchDistance {
    /// Wrap a known value. `-0.0` is normalised to `0.0` so both fall into
    /// the same distance group.
    pub fn known(value: f64) -> Self {
        MatchDistance::Known(value + 0.0)
    }
}

impl From<Option<f64>> for MatchDistance {
    fn from(value: Option<f64>) -> Self {
        value.map_or(MatchDistance::Unreachable, MatchDistance::known)
    }
}

impl Ord for MatchDistance {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (MatchDistance::Known(a), MatchDistance::Known(b)) => a.total_cmp(b),
            (MatchDistance::Known(_), MatchDistance::Unreachable) => Ordering::Less,
            (MatchDistance::Unreachable, MatchDistance::Known(_)) => Ordering::Greater,
            (MatchDistance::Unreachable, MatchDistance::Unreachable) => Ordering::Equal,
        }
    }
}

impl PartialOrd for MatchDistance {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for MatchDistance {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for MatchDistance {}

impl Display for MatchDistance {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            MatchDistance::Known(v) => write!(f, "{}", v),
            MatchDistance::Unreachable => write!(f, "unreachable"),
        }
    }
}
