//! Shrinks trim edges that swallow edges found by other matchers.

use crate::entity_extraction::pipeline::{EdgeContext, EdgePostProcessor};
use crate::entity_extraction::types::{Edge, EdgeType};

/// Cuts a trim edge down to the side away from any non-trim edge it contains.
///
/// Position conditions tend to run to the end (or start) of the utterance and
/// so cover other entities; the trim edge keeps the part before the contained
/// edge when that edge sits closer to its end, and the part after otherwise.
/// Trim edges left empty are dropped.
#[derive(Debug, Clone)]
pub struct TrimEdgeSplitter {
    name: String,
}

impl TrimEdgeSplitter {
    /// Create a new trim edge splitter
    pub fn new() -> Self {
        Self {
            name: "trim_edge_splitter".to_string(),
        }
    }

    fn split(edge: &mut Edge, other: &Edge, context: &EdgeContext<'_>) {
        let (start, end) = if other.start - edge.start > edge.end - other.end {
            context.index.trim_span(edge.start, other.start)
        } else {
            context.index.trim_span(other.end, edge.end)
        };
        let text = context.index.slice(start, end);
        let source = edge.subtype.map_or(text, |subtype| subtype.source_text(text));
        edge.start = start;
        edge.end = end;
        edge.len = end - start;
        edge.source_text = source.to_string();
        edge.utterance_text = text.to_string();
    }
}

impl Default for TrimEdgeSplitter {
    fn default() -> Self {
        Self::new()
    }
}

impl EdgePostProcessor for TrimEdgeSplitter {
    fn process(&self, mut edges: Vec<Edge>, context: &EdgeContext<'_>) -> Vec<Edge> {
        for i in 0..edges.len() {
            if edges[i].edge_type != EdgeType::Trim {
                continue;
            }
            for j in 0..edges.len() {
                if i == j || edges[j].edge_type == EdgeType::Trim {
                    continue;
                }
                if edges[i].is_empty() {
                    break;
                }
                if edges[i].contains(&edges[j]) {
                    let other = edges[j].clone();
                    Self::split(&mut edges[i], &other, context);
                }
            }
        }

        edges.retain(|e| e.edge_type != EdgeType::Trim || !e.is_empty());
        edges.sort_by_key(|e| e.start);
        edges
    }

    fn name(&self) -> &str {
        &self.name
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity_extraction::types::TrimType;

    fn trim_edge(text: &str, start: usize, end: usize) -> Edge {
        let index = crate::entity_extraction::text::TextIndex::new(text);
        Edge::new(EdgeType::Trim, "rest", start, end, 0.99, index.slice(start, end))
            .with_subtype(TrimType::AfterFirst)
    }

    #[test]
    fn test_keeps_part_after_contained_edge() {
        let text = "book pizza for tonight";
        let context = EdgeContext::new(text, "en");
        let edges = vec![
            trim_edge(text, 5, 22),
            Edge::new(EdgeType::Enum, "food", 5, 10, 1.0, "pizza"),
        ];
        let edges = TrimEdgeSplitter::new().process(edges, &context);
        assert_eq!(edges.len(), 2);
        assert_eq!(edges[0].entity, "food");
        let trim = &edges[1];
        assert_eq!((trim.start, trim.end, trim.len), (11, 22, 11));
        assert_eq!(trim.utterance_text, "for tonight");
    }

    #[test]
    fn test_split_position_edge_strips_punctuation() {
        let text = "I want pizza with cheese!";
        let context = EdgeContext::new(text, "en");
        let order = Edge::new(EdgeType::Trim, "order", 7, 25, 0.99, "pizza with cheese!")
            .with_source_text("pizza with cheese")
            .with_subtype(TrimType::AfterLast);
        let edges = vec![order, Edge::new(EdgeType::Enum, "food", 7, 12, 1.0, "pizza")];

        let edges = TrimEdgeSplitter::new().process(edges, &context);
        let trim = &edges[1];
        assert_eq!((trim.start, trim.end), (13, 25));
        assert_eq!(trim.utterance_text, "with cheese!");
        assert_eq!(trim.source_text, "with cheese");
    }

    #[test]
    fn test_keeps_part_before_contained_edge() {
        let text = "I must go from Barcelona to Madrid";
        let context = EdgeContext::new(text, "en");
        let edges = vec![
            trim_edge(text, 15, 34),
            Edge::new(EdgeType::Enum, "city", 28, 34, 1.0, "Madrid"),
        ];
        let edges = TrimEdgeSplitter::new().process(edges, &context);
        assert_eq!(edges[0].source_text, "Barcelona to");
        assert_eq!((edges[0].start, edges[0].end), (15, 27));
    }

    #[test]
    fn test_drops_trim_edge_left_empty() {
        let text = "call Bob";
        let context = EdgeContext::new(text, "en");
        let edges = vec![
            trim_edge(text, 5, 8),
            Edge::new(EdgeType::Regex, "name", 5, 8, 1.0, "Bob"),
        ];
        let edges = TrimEdgeSplitter::new().process(edges, &context);
        assert_eq!(edges.len(), 1);
        assert_eq!(edges[0].edge_type, EdgeType::Regex);
    }

    #[test]
    fn test_ignores_trim_inside_trim() {
        let text = "from a to b";
        let context = EdgeContext::new(text, "en");
        let edges = vec![trim_edge(text, 0, 11), trim_edge(text, 5, 6)];
        let edges = TrimEdgeSplitter::new().process(edges, &context);
        assert_eq!(edges.len(), 2);
        assert_eq!(edges[0].len, 11);
    }
}
