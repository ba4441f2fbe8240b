mod walker;
mod walker_builder;

pub use walker::{WalkEntry, WalkReport, Walker};
pub use walker_builder::WalkerBuilder;

/// Selector applied to every candidate entry of a walk.
pub type DirEntryFilter = fn(&crate::fs::DirEntry) -> bool;
