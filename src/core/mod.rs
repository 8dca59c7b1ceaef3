// mod.rs - Core detection algorithms

pub mod best_match;
pub mod distribution;
pub mod engine;
pub mod evaluation;
pub mod finalizer;
pub mod progress;

// Re-export main types for convenience
pub use best_match::{best_matches_for, build_best_matches};
pub use distribution::{Borders, DistanceGroup, RankDistribution};
pub use engine::{
    evaluate_species, run_detection, DetectionSummary, EngineConfig, RunMode, MINIMUM_GENES,
};
pub use evaluation::{evaluate, report_evaluation, EvaluationReport};
pub use finalizer::finalize;
pub use progress::ProgressMonitor;
