//! Overlap reduction between edges of the combined list.

use crate::entity_extraction::pipeline::{EdgeContext, EdgePostProcessor};
use crate::entity_extraction::types::Edge;

/// Discards edges that overlap a better edge.
///
/// Of two overlapping edges the more accurate one wins. At equal accuracy
/// the longer one wins (the earlier one on equal length), but only when both
/// carry the same entity name, unless `use_max_length` is set; otherwise both
/// are kept.
#[derive(Debug, Clone)]
pub struct OverlapReducer {
    name: String,
    use_max_length: bool,
}

impl OverlapReducer {
    /// Create a reducer that keeps equally accurate edges of different entities
    pub fn new() -> Self {
        Self {
            name: "overlap_reducer".to_string(),
            use_max_length: false,
        }
    }

    /// Create a reducer that always prefers the longer edge on equal accuracy
    pub fn max_length() -> Self {
        Self {
            name: "overlap_reducer_max_length".to_string(),
            use_max_length: true,
        }
    }

    fn length_decides(&self, a: &Edge, b: &Edge) -> bool {
        self.use_max_length || a.entity == b.entity
    }
}

impl Default for OverlapReducer {
    fn default() -> Self {
        Self::new()
    }
}

impl EdgePostProcessor for OverlapReducer {
    fn process(&self, edges: Vec<Edge>, _context: &EdgeContext<'_>) -> Vec<Edge> {
        let mut discarded = vec![false; edges.len()];

        for i in 0..edges.len() {
            if discarded[i] {
                continue;
            }
            for j in (i + 1)..edges.len() {
                if discarded[j] || !edges[i].overlaps(&edges[j]) {
                    continue;
                }
                let (edge, other) = (&edges[i], &edges[j]);
                if other.accuracy < edge.accuracy {
                    discarded[j] = true;
                } else if other.accuracy > edge.accuracy {
                    discarded[i] = true;
                    break;
                } else if self.length_decides(edge, other) {
                    if other.len <= edge.len {
                        discarded[j] = true;
                    } else {
                        discarded[i] = true;
                        break;
                    }
                }
            }
        }

        edges
            .into_iter()
            .zip(discarded)
            .filter_map(|(edge, discarded)| (!discarded).then_some(edge))
            .collect()
    }

    fn name(&self) -> &str {
        &self.name
    }
}
