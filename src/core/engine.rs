// engine.rs - Distribution-based HGT detection engine

use crate::core::best_match::build_best_matches;
use crate::core::distribution::{adjusted_rank, rank_of, restricted_groups, RankDistribution};
use crate::core::finalizer::finalize;
use crate::core::progress::ProgressMonitor;
use crate::data::dataset::{Dataset, GeneRef};
use crate::data::distance::MatchDistance;
use crate::data::relation::{RelationRecord, RelationTuple, RelationType};
use crate::reporting::Reporter;
use rayon::prelude::*;
use rayon::ThreadPool;
use serde::Serialize;
use std::str::FromStr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

/// Species with fewer genes have no distribution to compare against
pub const MINIMUM_GENES: usize = 2;

/// Which candidate directions are scanned
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RunMode {
    Both,
    #[serde(rename = "lesser")]
    LesserOnly,
    #[serde(rename = "higher")]
    HigherOnly,
}

impl RunMode {
    pub fn scans(&self, relation: RelationType) -> bool {
        match (self, relation) {
            (_, RelationType::Equal) => false,
            (RunMode::Both, _) => true,
            (RunMode::LesserOnly, RelationType::Lesser) => true,
            (RunMode::HigherOnly, RelationType::Higher) => true,
            _ => false,
        }
    }
}

impl FromStr for RunMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "both" => Ok(RunMode::Both),
            "lesser" => Ok(RunMode::LesserOnly),
            "higher" | "greater" => Ok(RunMode::HigherOnly),
            _ => Err(format!("Invalid run mode: {}. Use: lesser, higher, both", s)),
        }
    }
}

/// Engine settings
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Fraction of the sibling distribution treated as anomalous, in [0, 1]
    pub percentage: f64,
    pub run_mode: RunMode,
    pub multithreading: bool,
    /// Worker pool size; `None` lets rayon decide
    pub threads: Option<usize>,
    pub progress_interval: Duration,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            percentage: 0.05,
            run_mode: RunMode::Both,
            multithreading: true,
            threads: None,
            progress_interval: Duration::from_secs(30),
        }
    }
}

impl EngineConfig {
    pub fn validate(&self) -> Result<(), String> {
        if !(0.0..=1.0).contains(&self.percentage) {
            return Err(format!(
                "Percentage must be between 0 and 1, got {}",
                self.percentage
            ));
        }
        if self.threads == Some(0) {
            return Err("Thread count must be at least 1".to_string());
        }
        if self.progress_interval.is_zero() {
            return Err("Progress interval must be greater than zero".to_string());
        }
        Ok(())
    }
}

/// One-sided candidates found for the genes of one species
#[derive(Debug, Clone, Default)]
pub struct SpeciesCandidates {
    pub species: usize,
    pub skipped: bool,
    /// (gene, LESSER candidates, HIGHER candidates)
    pub genes: Vec<(GeneRef, Vec<GeneRef>, Vec<GeneRef>)>,
}

/// Outcome of a detection run
#[derive(Debug, Clone)]
pub struct DetectionSummary {
    /// Confirmed relations, sorted
    pub relations: Vec<RelationTuple>,
    pub processed_genes: usize,
    pub total_genes: usize,
    pub skipped_species: Vec<String>,
    /// One-sided candidate counts before confirmation
    pub lesser_candidates: usize,
    pub higher_candidates: usize,
}

impl DetectionSummary {
    pub fn count(&self, relation: RelationType) -> usize {
        self.relations
            .iter()
            .filter(|t| t.relation == relation)
            .count()
    }

    pub fn records(&self, dataset: &Dataset) -> Vec<RelationRecord> {
        self.relations
            .iter()
            .map(|t| RelationRecord::from_tuple(dataset, t))
            .collect()
    }
}

/// Evaluate every gene of one species against the rank distribution of its
/// siblings. Reads the dataset only; best matches must already be built.
///
/// The progress counter advances once per gene, also for skipped species.
pub fn evaluate_species(
    dataset: &Dataset,
    species: usize,
    config: &EngineConfig,
    counter: &AtomicUsize,
    reporter: &dyn Reporter,
) -> Result<SpeciesCandidates, String> {
    let owner = dataset
        .species
        .get(species)
        .ok_or_else(|| format!("Species index {} out of range", species))?;

    let mut result = SpeciesCandidates {
        species,
        ..Default::default()
    };

    if owner.genes.len() < MINIMUM_GENES {
        reporter.notice(&format!(
            "⏭️  Skipping species {} because it has less than {} genes",
            owner.name, MINIMUM_GENES
        ));
        counter.fetch_add(owner.genes.len(), Ordering::Relaxed);
        result.skipped = true;
        return Ok(result);
    }

    for (gene_index, gene) in owner.genes.iter().enumerate() {
        let gene_ref = GeneRef::new(species, gene_index);
        if gene.best_matches.len() + 1 != dataset.species.len() {
            return Err(format!(
                "Best matches of {} are incomplete ({} of {} species)",
                dataset.identifier(gene_ref),
                gene.best_matches.len(),
                dataset.species.len() - 1
            ));
        }

        let mut lesser = Vec::new();
        let mut higher = Vec::new();

        // Sibling orderings share the gene's universe for every candidate species
        let sibling_groups: Vec<_> = owner
            .genes
            .iter()
            .enumerate()
            .filter(|(sibling_index, _)| *sibling_index != gene_index)
            .map(|(_, sibling)| restricted_groups(&sibling.best_matches, &gene.best_matches))
            .collect();

        for &candidate_species in gene.best_matches.keys() {
            let mut distribution = RankDistribution::new(gene.best_matches.len());
            for groups in &sibling_groups {
                if let Some(rank) = rank_of(groups, candidate_species) {
                    distribution.tally(rank);
                }
            }
            let borders = distribution.borders(config.percentage);

            let mut ordered: Vec<(GeneRef, MatchDistance)> = (0..dataset.species[candidate_species]
                .genes
                .len())
                .map(|g| {
                    let other = GeneRef::new(candidate_species, g);
                    (other, gene.distance_to(other))
                })
                .collect();
            ordered.sort_by(|a, b| a.1.cmp(&b.1));

            if config.run_mode.scans(RelationType::Lesser) {
                for &(other, distance) in &ordered {
                    if dataset.gene(other).gene_tree != gene.gene_tree {
                        continue;
                    }
                    let rank = adjusted_rank(&gene.best_matches, candidate_species, distance);
                    if rank < borders.lesser {
                        reporter.detail(&format!(
                            "Potential candidate for LESSER: {} -> {}",
                            dataset.identifier(gene_ref),
                            dataset.identifier(other)
                        ));
                        lesser.push(other);
                    } else {
                        break;
                    }
                }
            }

            if config.run_mode.scans(RelationType::Higher) {
                for &(other, distance) in ordered.iter().rev() {
                    if dataset.gene(other).gene_tree != gene.gene_tree {
                        continue;
                    }
                    let rank = adjusted_rank(&gene.best_matches, candidate_species, distance);
                    if rank > borders.higher {
                        reporter.detail(&format!(
                            "Potential candidate for HIGHER: {} -> {}",
                            dataset.identifier(gene_ref),
                            dataset.identifier(other)
                        ));
                        higher.push(other);
                    } else {
                        break;
                    }
                }
            }
        }

        result.genes.push((gene_ref, lesser, higher));
        counter.fetch_add(1, Ordering::Relaxed);
    }

    Ok(result)
}

/// Local worker pool for a run, `None` when multithreading is off
fn worker_pool(config: &EngineConfig) -> Result<Option<ThreadPool>, String> {
    if !config.multithreading {
        return Ok(None);
    }
    let mut builder = rayon::ThreadPoolBuilder::new();
    if let Some(n) = config.threads {
        builder = builder.num_threads(n);
    }
    builder
        .build()
        .map(Some)
        .map_err(|e| format!("Failed to build worker pool: {}", e))
}

/// Run every species, in the worker pool when there is one.
/// Returns only after all species are done.
fn evaluate_all(
    dataset: &Dataset,
    pool: Option<&ThreadPool>,
    config: &EngineConfig,
    counter: &AtomicUsize,
    reporter: &dyn Reporter,
) -> Result<Vec<SpeciesCandidates>, String> {
    let species: Vec<usize> = (0..dataset.species.len()).collect();

    match pool {
        Some(pool) => pool.install(|| {
            species
                .into_par_iter()
                .map(|s| evaluate_species(dataset, s, config, counter, reporter))
                .collect()
        }),
        None => species
            .into_iter()
            .map(|s| evaluate_species(dataset, s, config, counter, reporter))
            .collect(),
    }
}

/// Detect HGT relations across the whole dataset.
///
/// Candidate lists from a previous run are cleared first. No relation is
/// returned if any species fails.
pub fn run_detection(
    dataset: &mut Dataset,
    config: &EngineConfig,
    reporter: &dyn Reporter,
) -> Result<DetectionSummary, String> {
    config.validate()?;
    reporter.notice("🧬 Algorithm started");

    let pool = worker_pool(config)?;
    dataset.reset_candidates();
    match &pool {
        Some(pool) => pool.install(|| build_best_matches(dataset, true)),
        None => build_best_matches(dataset, false),
    }

    let total_genes = dataset.total_genes();
    let counter = AtomicUsize::new(0);

    let evaluated = {
        let snapshot: &Dataset = dataset;
        std::thread::scope(|scope| {
            let monitor = ProgressMonitor::spawn(
                scope,
                &counter,
                total_genes,
                config.progress_interval,
                reporter,
            );
            let evaluated = evaluate_all(snapshot, pool.as_ref(), config, &counter, reporter);
            monitor.stop();
            evaluated
        })?
    };

    let processed_genes = counter.load(Ordering::Relaxed);
    debug_assert_eq!(processed_genes, total_genes);
    reporter.progress_finished(processed_genes, total_genes);

    let mut skipped_species = Vec::new();
    let mut lesser_candidates = 0;
    let mut higher_candidates = 0;
    for species in evaluated {
        if species.skipped {
            skipped_species.push(dataset.species[species.species].name.clone());
        }
        for (gene_ref, lesser, higher) in species.genes {
            lesser_candidates += lesser.len();
            higher_candidates += higher.len();
            let gene = dataset.gene_mut(gene_ref);
            gene.lesser_candidates.extend(lesser);
            gene.higher_candidates.extend(higher);
        }
    }

    let relations = finalize(dataset, reporter);
    for tuple in &relations {
        reporter.detail(&tuple.describe(dataset));
    }
    reporter.notice(&format!(
        "✅ Algorithm finished, found {} matches",
        relations.len()
    ));

    Ok(DetectionSummary {
        relations,
        processed_genes,
        total_genes,
        skipped_species,
        lesser_candidates,
        higher_candidates,
    })
}
