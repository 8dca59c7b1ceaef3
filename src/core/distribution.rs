// distribution.rs - Rank ordering of species, distance groups and percentile borders

use crate::data::distance::MatchDistance;
use std::collections::BTreeMap;

/// Species sharing one best-match distance.
///
/// A species' rank is the index of the group it falls into, so species tied
/// on distance share a rank.
#[derive(Debug, Clone, PartialEq)]
pub struct DistanceGroup {
    pub distance: MatchDistance,
    pub species: Vec<usize>,
}

/// Species ordered ascending by best-match distance. Ties are broken by
/// species index, which is name order.
pub fn ordered_species(best_matches: &BTreeMap<usize, MatchDistance>) -> Vec<(usize, MatchDistance)> {
    let mut ordered: Vec<(usize, MatchDistance)> =
        best_matches.iter().map(|(s, d)| (*s, *d)).collect();
    ordered.sort_by(|a, b| a.1.cmp(&b.1).then(a.0.cmp(&b.0)));
    ordered
}

/// Group an ordering (see [`ordered_species`]) into buckets of equal distance
pub fn group_by_distance(ordered: &[(usize, MatchDistance)]) -> Vec<DistanceGroup> {
    let mut groups: Vec<DistanceGroup> = Vec::new();
    for &(species, distance) in ordered {
        match groups.last_mut() {
            Some(group) if group.distance == distance => group.species.push(species),
            _ => groups.push(DistanceGroup {
                distance,
                species: vec![species],
            }),
        }
    }
    groups
}

/// Index of the first group containing `species`
pub fn rank_of(groups: &[DistanceGroup], species: usize) -> Option<usize> {
    groups.iter().position(|g| g.species.contains(&species))
}

/// Distance groups of a best-match map restricted to the species in `universe`
pub fn restricted_groups(
    best_matches: &BTreeMap<usize, MatchDistance>,
    universe: &BTreeMap<usize, MatchDistance>,
) -> Vec<DistanceGroup> {
    let restricted: BTreeMap<usize, MatchDistance> = best_matches
        .iter()
        .filter(|(s, _)| universe.contains_key(s))
        .map(|(s, d)| (*s, *d))
        .collect();
    group_by_distance(&ordered_species(&restricted))
}

/// Rank of `species` after overriding its best-match distance with `distance`.
///
/// The stored best match may come from a different gene of that species;
/// this ranks the species as if the given gene were its best match.
pub fn adjusted_rank(
    best_matches: &BTreeMap<usize, MatchDistance>,
    species: usize,
    distance: MatchDistance,
) -> usize {
    let mut adjusted = best_matches.clone();
    adjusted.insert(species, distance);
    let groups = group_by_distance(&ordered_species(&adjusted));
    rank_of(&groups, species).unwrap_or(0)
}

/// Histogram of the ranks a species takes across sibling genes
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RankDistribution {
    pub histogram: Vec<usize>,
    pub total: usize,
}

impl RankDistribution {
    pub fn new(positions: usize) -> Self {
        Self {
            histogram: vec![0; positions],
            total: 0,
        }
    }

    /// Count one occurrence at `rank`. Ranks beyond the histogram are
    /// clamped to the last position.
    pub fn tally(&mut self, rank: usize) {
        if self.histogram.is_empty() {
            return;
        }
        let index = rank.min(self.histogram.len() - 1);
        self.histogram[index] += 1;
        self.total += 1;
    }

    /// Percentile cut points for a fraction in [0, 1]
    pub fn borders(&self, percentage: f64) -> Borders {
        let threshold = self.total as f64 * percentage;

        let mut lesser = 0;
        let mut cumulative = 0;
        for (i, count) in self.histogram.iter().enumerate() {
            cumulative += count;
            if cumulative as f64 >= threshold {
                lesser = i;
                break;
            }
        }

        let mut higher = self.histogram.len();
        cumulative = 0;
        for (i, count) in self.histogram.iter().enumerate().rev() {
            cumulative += count;
            if cumulative as f64 >= threshold {
                higher = i;
                break;
            }
        }

        Borders { lesser, higher }
    }
}

/// Ranks strictly below `lesser` are anomalously close, ranks strictly
/// above `higher` anomalously far.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Borders {
    pub lesser: usize,
    pub higher: usize,
}
