//! Composable reconciliation pipeline for extracted edges.
//!
//! Matchers produce raw edges independently; the pipeline runs a sequence of
//! post-processors over the combined, start-sorted list before numbering.

use std::fmt;
use std::sync::Arc;

use tracing::trace;

use super::post_processors::{OverlapReducer, TrimEdgeSplitter};
use super::text::TextIndex;
use super::types::Edge;

/// Context handed to post-processors.
#[derive(Debug, Clone)]
pub struct EdgeContext<'a> {
    /// Character index of the utterance the edges were extracted from
    pub index: TextIndex<'a>,
    /// Locale the extraction ran with
    pub locale: &'a str,
}

impl<'a> EdgeContext<'a> {
    /// Create a context for an utterance.
    pub fn new(utterance: &'a str, locale: &'a str) -> Self {
        Self {
            index: TextIndex::new(utterance),
            locale,
        }
    }

    /// The utterance.
    pub fn utterance(&self) -> &'a str {
        self.index.as_str()
    }
}

/// A step transforming the combined edge list.
pub trait EdgePostProcessor: Send + Sync + fmt::Debug {
    /// Process edges sorted by start; the output must stay sorted by start.
    fn process(&self, edges: Vec<Edge>, context: &EdgeContext<'_>) -> Vec<Edge>;

    /// Get the name of this post-processor
    fn name(&self) -> &str;
}

/// Ordered sequence of post-processors.
#[derive(Clone, Default)]
pub struct EdgePipeline {
    post_processors: Vec<Arc<dyn EdgePostProcessor>>,
}

impl fmt::Debug for EdgePipeline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<&str> = self.post_processors.iter().map(|p| p.name()).collect();
        f.debug_struct("EdgePipeline")
            .field("post_processors", &names)
            .finish()
    }
}

impl EdgePipeline {
    /// Create a new pipeline builder
    pub fn builder() -> PipelineBuilder {
        PipelineBuilder::new()
    }

    /// Pipeline without any step.
    pub fn empty() -> Self {
        Self::default()
    }

    /// The reconciliation used by the manager: split trim edges around the
    /// edges they contain, then reduce overlaps.
    pub fn reconciliation() -> Self {
        Self::builder()
            .post_processor(TrimEdgeSplitter::new())
            .post_processor(OverlapReducer::new())
            .build()
    }

    /// Names of the steps, in order.
    pub fn names(&self) -> Vec<&str> {
        self.post_processors.iter().map(|p| p.name()).collect()
    }

    /// Run every step over `edges`.
    pub fn run(&self, edges: Vec<Edge>, context: &EdgeContext<'_>) -> Vec<Edge> {
        self.post_processors.iter().fold(edges, |edges, processor| {
            let before = edges.len();
            let edges = processor.process(edges, context);
            trace!(
                step = processor.name(),
                locale = context.locale,
                before,
                after = edges.len(),
                "Reconciliation step applied"
            );
            edges
        })
    }
}

/// Builder for edge pipelines
#[derive(Default)]
pub struct PipelineBuilder {
    post_processors: Vec<Arc<dyn EdgePostProcessor>>,
}

impl PipelineBuilder {
    /// Create a new pipeline builder
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a post-processor to the pipeline
    pub fn post_processor<P: EdgePostProcessor + 'static>(mut self, post_processor: P) -> Self {
        self.post_processors.push(Arc::new(post_processor));
        self
    }

    /// Build the pipeline
    pub fn build(self) -> EdgePipeline {
        EdgePipeline {
            post_processors: self.post_processors,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity_extraction::types::EdgeType;

    #[derive(Debug)]
    struct DropLowAccuracy;

    impl EdgePostProcessor for DropLowAccuracy {
        fn process(&self, edges: Vec<Edge>, _context: &EdgeContext<'_>) -> Vec<Edge> {
            edges.into_iter().filter(|e| e.accuracy >= 0.9).collect()
        }

        fn name(&self) -> &str {
            "drop_low_accuracy"
        }
    }

    #[test]
    fn test_run_in_order() {
        let pipeline = EdgePipeline::builder()
            .post_processor(DropLowAccuracy)
            .build();
        let context = EdgeContext::new("a b", "en");
        let edges = vec![
            Edge::new(EdgeType::Regex, "x", 0, 1, 1.0, "a"),
            Edge::new(EdgeType::Regex, "x", 2, 3, 0.5, "b"),
        ];
        let kept = pipeline.run(edges, &context);
        assert_eq!(kept.len(), 1);
        assert_eq!(pipeline.names(), vec!["drop_low_accuracy"]);
    }

    #[derive(Debug)]
    struct EnglishOnly;

    impl EdgePostProcessor for EnglishOnly {
        fn process(&self, edges: Vec<Edge>, context: &EdgeContext<'_>) -> Vec<Edge> {
            if context.locale == "en" { edges } else { Vec::new() }
        }

        fn name(&self) -> &str {
            "english_only"
        }
    }

    #[test]
    fn test_steps_see_locale() {
        let pipeline = EdgePipeline::builder().post_processor(EnglishOnly).build();
        let edges = vec![Edge::new(EdgeType::Regex, "x", 0, 1, 1.0, "a")];
        assert_eq!(pipeline.run(edges.clone(), &EdgeContext::new("a", "en")).len(), 1);
        assert!(pipeline.run(edges, &EdgeContext::new("a", "es")).is_empty());
    }

    #[test]
    fn test_reconciliation_steps() {
        let pipeline = EdgePipeline::reconciliation();
        assert_eq!(pipeline.names(), vec!["trim_edge_splitter", "overlap_reducer"]);
        assert!(EdgePipeline::empty().names().is_empty());
        assert_eq!(EdgeContext::new("hi", "en").utterance(), "hi");
    }
}
