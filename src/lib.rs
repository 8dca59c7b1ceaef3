// lib.rs - hgtdist library root

//! # hgtdist - Distribution-based detection of horizontal gene transfer
//!
//! Detects horizontal gene transfer (HGT) between species from pairwise gene
//! distances organised by gene tree. For every gene the rank of each other
//! species among its best matches is compared with the ranks the species
//! takes for the gene's siblings; anomalously close (LESSER) or far (HIGHER)
//! partners become candidates, and a pair is reported only when both genes
//! list each other.
//!
//! ## Features
//!
//! - **Parallel**: species are evaluated in a rayon worker pool
//! - **Deterministic**: identical results for any thread count
//! - **NEXUS input/output**: ALLDISTANCES in, HGTRELATIONS matrices out
//! - **Evaluation**: score results against reference relations
//!
//! ## Basic Usage
//!
//! ```rust,no_run
//! use hgtdist::prelude::*;
//!
//! let reporter = ConsoleReporter::new(Verbosity::Normal);
//! let mut dataset = Dataset::from_nexus_file(std::path::Path::new("distances.nex"), &reporter)?;
//!
//! let config = EngineConfig {
//!     percentage: 0.05,
//!     run_mode: RunMode::Both,
//!     ..EngineConfig::default()
//! };
//! let summary = run_detection(&mut dataset, &config, &reporter)?;
//! for tuple in &summary.relations {
//!     println!("{}", tuple.describe(&dataset));
//! }
//! # Ok::<(), String>(())
//! ```

// Re-export all main modules
pub mod cli;
pub mod core;
pub mod data;
pub mod output;
pub mod reporting;

// Convenience prelude for common imports
pub mod prelude {
    pub use crate::cli::{validate_args, Args, ValidationResult};
    pub use crate::core::{evaluate, run_detection, DetectionSummary, EngineConfig, RunMode};
    pub use crate::data::{Dataset, GeneRef, MatchDistance, RelationTuple, RelationType};
    pub use crate::output::{write_relations, OutputFormat};
    pub use crate::reporting::{CollectingReporter, ConsoleReporter, Reporter, Verbosity};
}

// Re-export main types at the root level for convenience
pub use cli::{Args, ValidationResult};
pub use core::{DetectionSummary, EngineConfig, RunMode};
pub use data::{Dataset, RelationTuple, RelationType};
pub use reporting::{Reporter, Verbosity};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Get library information
pub fn get_info() -> String {
    format!(
        "hgtdist v{} - Distribution-based horizontal gene transfer detection",
        VERSION
    )
}
