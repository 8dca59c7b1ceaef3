// dataset.rs - Species, genes and gene trees

use crate::data::distance::MatchDistance;
use crate::data::loaders::nexus::DistanceTree;
use crate::data::relation::RelationType;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap, HashSet};

/// Position of a gene inside a [`Dataset`]: owning species index and the
/// gene's index within that species.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct GeneRef {
    pub species: usize,
    pub gene: usize,
}

impl GeneRef {
    pub fn new(species: usize, gene: usize) -> Self {
        Self { species, gene }
    }
}

/// A single gene, owned by exactly one species.
#[derive(Debug, Clone)]
pub struct Gene {
    /// Unique within the owning species
    pub id: String,
    /// Index of the owning species; never changes after construction
    pub species: usize,
    pub gene_tree: String,
    /// Within-tree distances to the other genes of the same gene tree
    pub distances: HashMap<GeneRef, f64>,
    /// Minimum distance to every other species, keyed by species index
    pub best_matches: BTreeMap<usize, MatchDistance>,
    pub lesser_candidates: Vec<GeneRef>,
    pub higher_candidates: Vec<GeneRef>,
}

impl Gene {
    pub fn new(id: String, species: usize, gene_tree: String) -> Self {
        Self {
            id,
            species,
            gene_tree,
            distances: HashMap::new(),
            best_matches: BTreeMap::new(),
            lesser_candidates: Vec::new(),
            higher_candidates: Vec::new(),
        }
    }

    /// Distance to another gene, `Unreachable` if the two share no gene tree.
    pub fn distance_to(&self, other: GeneRef) -> MatchDistance {
        MatchDistance::from(self.distances.get(&other).copied())
    }

    /// Candidate list for one direction. `Equal` has no candidates.
    pub fn candidates(&self, relation: RelationType) -> &[GeneRef] {
        match relation {
            RelationType::Lesser => &self.lesser_candidates,
            RelationType::Higher => &self.higher_candidates,
            RelationType::Equal => &[],
        }
    }
}

/// A species and the genes it owns.
#[derive(Debug, Clone)]
pub struct Species {
    pub name: String,
    pub genes: Vec<Gene>,
}

/// Genes of one gene tree in input order (used by the writer).
#[derive(Debug, Clone)]
pub struct GeneTree {
    pub name: String,
    pub genes: Vec<GeneRef>,
}

/// Dataset statistics for dry runs and summaries
#[derive(Debug, Clone, Serialize)]
pub struct DatasetStats {
    pub species: usize,
    pub genes: usize,
    pub gene_trees: usize,
    pub species_below_minimum: usize,
    pub min_genes_per_species: usize,
    pub max_genes_per_species: usize,
    pub avg_genes_per_species: f64,
}

/// All species of a run.
///
/// Species are sorted by name and genes by id within their species. The
/// species index order therefore equals name order, which is the
/// tie-break used wherever species with equal distances must be ordered.
#[derive(Debug, Clone, Default)]
pub struct Dataset {
    pub species: Vec<Species>,
    pub gene_trees: Vec<GeneTree>,
}

impl Dataset {
    /// Assemble a dataset from parsed distance matrices.
    ///
    /// Species are merged by name across gene trees. Every gene receives its
    /// distances to the other genes of its own tree.
    pub fn from_distance_trees(trees: &[DistanceTree]) -> Result<Self, String> {
        let mut genes_by_species: BTreeMap<&str, Vec<(&str, &str)>> = BTreeMap::new();
        let mut seen: HashSet<(&str, &str)> = HashSet::new();
        let mut tree_names: HashSet<&str> = HashSet::new();

        for tree in trees {
            if !tree_names.insert(tree.name.as_str()) {
                return Err(format!("Gene tree '{}' is defined more than once", tree.name));
            }
            let n = tree.labels.len();
            if tree.matrix.len() != n || tree.matrix.iter().any(|row| row.len() != n) {
                return Err(format!(
                    "Gene tree '{}': distance matrix must be {}x{}",
                    tree.name, n, n
                ));
            }
            for label in &tree.labels {
                if !seen.insert((label.species.as_str(), label.gene.as_str())) {
                    return Err(format!(
                        "Gene '{}/{}' appears more than once (gene tree '{}')",
                        label.species, label.gene, tree.name
                    ));
                }
                genes_by_species
                    .entry(label.species.as_str())
                    .or_default()
                    .push((label.gene.as_str(), tree.name.as_str()));
            }
        }

        let mut species = Vec::with_capacity(genes_by_species.len());
        let mut lookup: HashMap<(&str, &str), GeneRef> = HashMap::new();

        for (species_index, (name, mut genes)) in genes_by_species.into_iter().enumerate() {
            genes.sort_by(|a, b| a.0.cmp(b.0));
            let mut owned = Vec::with_capacity(genes.len());
            for (gene_index, (gene_id, tree_name)) in genes.into_iter().enumerate() {
                lookup.insert((name, gene_id), GeneRef::new(species_index, gene_index));
                owned.push(Gene::new(
                    gene_id.to_string(),
                    species_index,
                    tree_name.to_string(),
                ));
            }
            species.push(Species {
                name: name.to_string(),
                genes: owned,
            });
        }

        let mut dataset = Dataset {
            species,
            gene_trees: Vec::with_capacity(trees.len()),
        };

        for tree in trees {
            let refs: Vec<GeneRef> = tree
                .labels
                .iter()
                .map(|label| lookup[&(label.species.as_str(), label.gene.as_str())])
                .collect();

            for (i, &gene_ref) in refs.iter().enumerate() {
                let gene = dataset.gene_mut(gene_ref);
                for (j, &other) in refs.iter().enumerate() {
                    if i != j {
                        gene.distances.insert(other, tree.matrix[i][j]);
                    }
                }
            }

            dataset.gene_trees.push(GeneTree {
                name: tree.name.clone(),
                genes: refs,
            });
        }

        Ok(dataset)
    }

    pub fn gene(&self, gene_ref: GeneRef) -> &Gene {
        &self.species[gene_ref.species].genes[gene_ref.gene]
    }

    pub fn gene_mut(&mut self, gene_ref: GeneRef) -> &mut Gene {
        &mut self.species[gene_ref.species].genes[gene_ref.gene]
    }

    /// "species/id" identifier of a gene
    pub fn identifier(&self, gene_ref: GeneRef) -> String {
        format!(
            "{}/{}",
            self.species[gene_ref.species].name,
            self.gene(gene_ref).id
        )
    }

    pub fn species_index(&self, name: &str) -> Option<usize> {
        self.species
            .binary_search_by(|s| s.name.as_str().cmp(name))
            .ok()
    }

    /// Look up a gene by its "species/id" identifier
    pub fn find_gene(&self, identifier: &str) -> Option<GeneRef> {
        let (species_name, gene_id) = identifier.split_once('/')?;
        let species = self.species_index(species_name)?;
        let gene = self.species[species]
            .genes
            .binary_search_by(|g| g.id.as_str().cmp(gene_id))
            .ok()?;
        Some(GeneRef::new(species, gene))
    }

    pub fn total_genes(&self) -> usize {
        self.species.iter().map(|s| s.genes.len()).sum()
    }

    /// All gene references, species by species
    pub fn gene_refs(&self) -> impl Iterator<Item = GeneRef> + '_ {
        self.species.iter().enumerate().flat_map(|(s, species)| {
            (0..species.genes.len()).map(move |g| GeneRef::new(s, g))
        })
    }

    /// Drop candidate lists from a previous run
    pub fn reset_candidates(&mut self) {
        for species in &mut self.species {
            for gene in &mut species.genes {
                gene.lesser_candidates.clear();
                gene.higher_candidates.clear();
            }
        }
    }

    pub fn stats(&self, minimum_genes: usize) -> DatasetStats {
        let counts: Vec<usize> = self.species.iter().map(|s| s.genes.len()).collect();
        let genes: usize = counts.iter().sum();
        DatasetStats {
            species: counts.len(),
            genes,
            gene_trees: self.gene_trees.len(),
            species_below_minimum: counts.iter().filter(|&&c| c < minimum_genes).count(),
            min_genes_per_species: counts.iter().copied().min().unwrap_or(0),
            max_genes_per_species: counts.iter().copied().max().unwrap_or(0),
            avg_genes_per_species: if counts.is_empty() {
                0.0
            } else {
                genes as f64 / counts.len() as f64
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::loaders::nexus::GeneLabel;

    fn tree(name: &str, labels: &[&str], matrix: Vec<Vec<f64>>) -> DistanceTree {
        DistanceTree {
            name: name.to_string(),
            labels: labels
                .iter()
                .map(|l| GeneLabel::parse(l).unwrap())
                .collect(),
            matrix,
        }
    }

    #[test]
    fn test_species_merged_and_sorted() {
        let trees = vec![
            tree(
                "T1",
                &["Zeta/g2", "Alpha/g1"],
                vec![vec![0.0, 1.0], vec![1.0, 0.0]],
            ),
            tree(
                "T2",
                &["Alpha/g0", "Zeta/g1"],
                vec![vec![0.0, 2.0], vec![2.0, 0.0]],
            ),
        ];
        let dataset = Dataset::from_distance_trees(&trees).unwrap();

        let names: Vec<&str> = dataset.species.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["Alpha", "Zeta"]);
        let alpha_genes: Vec<&str> = dataset.species[0].genes.iter().map(|g| g.id.as_str()).collect();
        assert_eq!(alpha_genes, vec!["g0", "g1"]);
        assert_eq!(dataset.total_genes(), 4);
        assert_eq!(dataset.gene_trees.len(), 2);
    }

    #[test]
    fn test_distances_stay_within_tree() {
        let trees = vec![
            tree("T1", &["A/1", "B/1"], vec![vec![0.0, 1.5], vec![1.5, 0.0]]),
            tree("T2", &["A/2", "B/2"], vec![vec![0.0, 2.5], vec![2.5, 0.0]]),
        ];
        let dataset = Dataset::from_distance_trees(&trees).unwrap();
        let a1 = dataset.find_gene("A/1").unwrap();
        let b1 = dataset.find_gene("B/1").unwrap();
        let b2 = dataset.find_gene("B/2").unwrap();

        let gene = dataset.gene(a1);
        assert_eq!(gene.distances.len(), 1);
        assert_eq!(gene.distance_to(b1), MatchDistance::known(1.5));
        assert_eq!(gene.distance_to(b2), MatchDistance::Unreachable);
        for other in gene.distances.keys() {
            assert_eq!(dataset.gene(*other).gene_tree, gene.gene_tree);
        }
    }

    #[test]
    fn test_gene_tree_keeps_input_order() {
        let trees = vec![tree(
            "T1",
            &["B/1", "A/1"],
            vec![vec![0.0, 1.0], vec![1.0, 0.0]],
        )];
        let dataset = Dataset::from_distance_trees(&trees).unwrap();
        let order: Vec<String> = dataset.gene_trees[0]
            .genes
            .iter()
            .map(|g| dataset.identifier(*g))
            .collect();
        assert_eq!(order, vec!["B/1", "A/1"]);
    }

    #[test]
    fn test_duplicate_gene_rejected() {
        let trees = vec![
            tree("T1", &["A/1", "B/1"], vec![vec![0.0, 1.0], vec![1.0, 0.0]]),
            tree("T2", &["A/1", "B/2"], vec![vec![0.0, 1.0], vec![1.0, 0.0]]),
        ];
        let err = Dataset::from_distance_trees(&trees).unwrap_err();
        assert!(err.contains("A/1"));
    }

    #[test]
    fn test_duplicate_tree_name_rejected() {
        let trees = vec![
            tree("T1", &["A/1", "B/1"], vec![vec![0.0, 1.0], vec![1.0, 0.0]]),
            tree("T1", &["A/2", "B/2"], vec![vec![0.0, 1.0], vec![1.0, 0.0]]),
        ];
        let err = Dataset::from_distance_trees(&trees).unwrap_err();
        assert!(err.contains("'T1'"));
    }

    #[test]
    fn test_non_square_matrix_rejected() {
        let trees = vec![tree("T1", &["A/1", "B/1"], vec![vec![0.0, 1.0]])];
        assert!(Dataset::from_distance_trees(&trees).is_err());
    }

    #[test]
    fn test_stats() {
        let trees = vec![tree(
            "T1",
            &["A/1", "A/2", "B/1"],
            vec![
                vec![0.0, 1.0, 2.0],
                vec![1.0, 0.0, 3.0],
                vec![2.0, 3.0, 0.0],
            ],
        )];
        let dataset = Dataset::from_distance_trees(&trees).unwrap();
        let stats = dataset.stats(2);
        assert_eq!(stats.species, 2);
        assert_eq!(stats.genes, 3);
        assert_eq!(stats.species_below_minimum, 1);
        assert_eq!(stats.min_genes_per_species, 1);
        assert_eq!(stats.max_genes_per_species, 2);
        assert!((stats.avg_genes_per_species - 1.5).abs() < 1e-12);
    }
}
