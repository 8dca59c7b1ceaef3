// mod.rs - Data structures module

pub mod dataset;
pub mod distance;
pub mod loaders;
pub mod relation;

// Re-export main types for convenience
pub use dataset::{Dataset, DatasetStats, Gene, GeneRef, GeneTree, Species};
pub use distance::MatchDistance;
pub use loaders::nexus::{read_nexus, read_nexus_file, DistanceTree, GeneLabel, NexusDocument, RelationMatrix};
pub use relation::{RelationRecord, RelationTuple, RelationType};
