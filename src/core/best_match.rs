// best_match.rs - Minimum gene-to-species distances

use crate::data::dataset::{Dataset, GeneRef};
use crate::data::distance::MatchDistance;
use rayon::prelude::*;
use std::collections::BTreeMap;

/// Best-match distances of one gene: the minimum distance to any gene of
/// every other species, `Unreachable` where the gene tree holds no gene of
/// that species.
pub fn best_matches_for(dataset: &Dataset, gene_ref: GeneRef) -> BTreeMap<usize, MatchDistance> {
    let gene = dataset.gene(gene_ref);
    let mut best: BTreeMap<usize, MatchDistance> = (0..dataset.species.len())
        .filter(|&s| s != gene_ref.species)
        .map(|s| (s, MatchDistance::Unreachable))
        .collect();

    for (other, distance) in &gene.distances {
        if let Some(current) = best.get_mut(&other.species) {
            let candidate = MatchDistance::known(*distance);
            if candidate < *current {
                *current = candidate;
            }
        }
    }

    best
}

/// Recompute the best-match map of every gene in the dataset
pub fn build_best_matches(dataset: &mut Dataset, multithreading: bool) {
    let refs: Vec<GeneRef> = dataset.gene_refs().collect();

    let computed: Vec<(GeneRef, BTreeMap<usize, MatchDistance>)> = {
        let snapshot = &*dataset;
        if multithreading {
            refs.into_par_iter()
                .map(|r| (r, best_matches_for(snapshot, r)))
                .collect()
        } else {
            refs.into_iter()
                .map(|r| (r, best_matches_for(snapshot, r)))
                .collect()
        }
    };

    for (gene_ref, best) in computed {
        dataset.gene_mut(gene_ref).best_matches = best;
    }
}
