use std::collections::{HashMap, HashSet};

use crate::backend::types::{CodeGraph, GraphMetadata};

/// Maximum selectable render bound. At or above it the reducer is a strict
/// identity and the graph is rendered as delivered.
pub(in crate::app) const NODE_CEILING: usize = 500;

/// Bounds `graph` to at most `max_nodes` nodes, keeping the most connected
/// ones.
///
/// Nodes are ranked by undirected degree, descending; ties keep their
/// relative position in the input sequence, so the output is deterministic.
/// The kept nodes are returned in ranking order, edges survive only when
/// both endpoints are kept (which also silently drops edges that referenced
/// nodes absent from the input), and the metadata is recomputed from the
/// retained sets. The input is never mutated.
pub(in crate::app) fn reduce(graph: &CodeGraph, max_nodes: usize) -> CodeGraph {
    if max_nodes >= NODE_CEILING || graph.nodes.len() <= max_nodes {
        return graph.clone();
    }

    let mut index_of = HashMap::with_capacity(graph.nodes.len());
    for (index, node) in graph.nodes.iter().enumerate() {
        index_of.insert(node.id.as_str(), index);
    }

    let mut degree = vec![0usize; graph.nodes.len()];
    for edge in &graph.edges {
        if let Some(&index) = index_of.get(edge.source.as_str()) {
            degree[index] += 1;
        }
        if let Some(&index) = index_of.get(edge.target.as_str()) {
            degree[index] += 1;
        }
    }

    let mut ranking = (0..graph.nodes.len()).collect::<Vec<_>>();
    ranking.sort_by(|a, b| degree[*b].cmp(&degree[*a]));
    ranking.truncate(max_nodes);

    let kept = ranking
        .iter()
        .map(|&index| graph.nodes[index].id.as_str())
        .collect::<HashSet<_>>();

    let nodes = ranking
        .iter()
        .map(|&index| graph.nodes[index].clone())
        .collect::<Vec<_>>();
    let edges = graph
        .edges
        .iter()
        .filter(|edge| {
            kept.contains(edge.source.as_str()) && kept.contains(edge.target.as_str())
        })
        .cloned()
        .collect::<Vec<_>>();

    let metadata = GraphMetadata {
        node_count: nodes.len(),
        edge_count: edges.len(),
    };

    CodeGraph {
        nodes,
        edges,
        metadata,
    }
}

/// Last-inputs cache for the bounded graph, keyed on the raw graph's
/// revision and the configured bound. Reduction reruns only when either key
/// component changes, never on unrelated interaction.
pub(in crate::app) struct BoundedGraphCache {
    key: Option<(u64, usize)>,
    graph: CodeGraph,
    recomputes: u64,
}

impl BoundedGraphCache {
    pub(in crate::app) fn new() -> Self {
        Self {
            key: None,
            graph: CodeGraph::default(),
            recomputes: 0,
        }
    }

    pub(in crate::app) fn bounded(
        &mut self,
        raw: &CodeGraph,
        revision: u64,
        max_nodes: usize,
    ) -> &CodeGraph {
        let key = (revision, max_nodes);
        if self.key != Some(key) {
            self.graph = reduce(raw, max_nodes);
            self.key = Some(key);
            self.recomputes = self.recomputes.wrapping_add(1);
            log::debug!(
                "bounded graph recomputed ({} of {} nodes kept, pass {})",
                self.graph.nodes.len(),
                raw.nodes.len(),
                self.recomputes
            );
        }
        &self.graph
    }

    /// Most recently computed bounded graph, without recomputing.
    pub(in crate::app) fn current(&self) -> Option<&CodeGraph> {
        self.key.map(|_| &self.graph)
    }

    #[cfg(test)]
    fn recompute_count(&self) -> u64 {
        self.recomputes
    }
}
