// finalizer.rs - Mutual confirmation of one-sided candidates

use crate::data::dataset::{Dataset, GeneRef};
use crate::data::relation::{RelationTuple, RelationType};
use crate::reporting::Reporter;
use std::collections::{BTreeMap, BTreeSet, HashSet};

/// Confirm candidate relations whose mirror also holds and return them
/// sorted by gene tree, then first and second identifier.
///
/// Candidate lists are only read. Each unordered pair yields at most one
/// tuple; a pair confirmed in both directions is kept as LESSER.
pub fn finalize(dataset: &Dataset, reporter: &dyn Reporter) -> Vec<RelationTuple> {
    let mut directed: HashSet<(GeneRef, GeneRef, RelationType)> = HashSet::new();
    for gene_ref in dataset.gene_refs() {
        let gene = dataset.gene(gene_ref);
        for relation in [RelationType::Lesser, RelationType::Higher] {
            for &candidate in gene.candidates(relation) {
                directed.insert((gene_ref, candidate, relation));
            }
        }
    }

    let mut confirmed: BTreeMap<(GeneRef, GeneRef), BTreeSet<RelationType>> = BTreeMap::new();
    for &(gene, candidate, relation) in &directed {
        if directed.contains(&(candidate, gene, relation)) {
            let pair = (gene.min(candidate), gene.max(candidate));
            confirmed.entry(pair).or_default().insert(relation);
        }
    }

    let mut relations = Vec::with_capacity(confirmed.len());
    for ((a, b), kinds) in confirmed {
        let relation = if kinds.contains(&RelationType::Lesser) {
            RelationType::Lesser
        } else {
            RelationType::Higher
        };
        let tuple = RelationTuple::new(dataset, a, b, relation);

        if kinds.len() > 1 {
            reporter.notice(&format!(
                "⚠️  {} and {} confirmed as both LESSER and HIGHER, keeping LESSER",
                dataset.identifier(tuple.first),
                dataset.identifier(tuple.second)
            ));
        }

        let same_tree = dataset.gene(a).gene_tree == dataset.gene(b).gene_tree;
        if !same_tree {
            reporter.severe(&format!(
                "Unexpected gene tree mismatch: {}",
                tuple.describe(dataset)
            ));
        }
        debug_assert!(same_tree, "confirmed relation spans two gene trees");

        relations.push(tuple);
    }

    relations.sort_by_cached_key(|t| {
        (
            dataset.gene(t.first).gene_tree.clone(),
            dataset.identifier(t.first),
            dataset.identifier(t.second),
        )
    });
    relations
}
