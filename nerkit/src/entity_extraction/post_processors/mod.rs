//! Post-processors reconciling the combined edge list.

pub mod overlap_reducer;
pub mod trim_splitter;

pub use overlap_reducer::OverlapReducer;
pub use trim_splitter::TrimEdgeSplitter;
