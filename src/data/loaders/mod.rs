// mod.rs - Input loaders

pub mod nexus;
