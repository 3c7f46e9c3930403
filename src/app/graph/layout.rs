use std::collections::HashMap;
use std::f32::consts::TAU;

use eframe::egui::{Vec2, vec2};

use crate::backend::types::CodeGraph;
use crate::util::stable_pair;

const LAYOUT_ITERATIONS: usize = 90;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(in crate::app) enum LayoutMode {
    Force,
    Ring,
}

impl LayoutMode {
    pub(in crate::app) const ALL: [LayoutMode; 2] = [Self::Force, Self::Ring];

    pub(in crate::app) fn label(self) -> &'static str {
        match self {
            Self::Force => "force",
            Self::Ring => "ring",
        }
    }

    fn iterations(self) -> usize {
        match self {
            Self::Force => LAYOUT_ITERATIONS,
            Self::Ring => 0,
        }
    }
}

/// Node placement for one bounded graph, computed once when the bounded
/// graph or the layout mode changes and reused for every frame after that.
pub(in crate::app) struct GraphLayout {
    key: (u64, usize),
    mode: LayoutMode,
    pub(in crate::app) positions: Vec<Vec2>,
    pub(in crate::app) edges: Vec<(usize, usize)>,
    pub(in crate::app) degrees: Vec<usize>,
    pub(in crate::app) index_by_id: HashMap<String, usize>,
}

impl GraphLayout {
    pub(in crate::app) fn new(graph: &CodeGraph, key: (u64, usize), mode: LayoutMode) -> Self {
        let mut index_by_id = HashMap::with_capacity(graph.nodes.len());
        for (index, node) in graph.nodes.iter().enumerate() {
            index_by_id.insert(node.id.clone(), index);
        }

        let mut edges = graph
            .edges
            .iter()
            .filter_map(|edge| {
                let source = index_by_id.get(&edge.source)?;
                let target = index_by_id.get(&edge.target)?;
                (source != target).then_some((*source, *target))
            })
            .collect::<Vec<_>>();
        edges.sort_unstable();
        edges.dedup();

        let mut degrees = vec![0usize; graph.nodes.len()];
        for &(source, target) in &edges {
            degrees[source] += 1;
            degrees[target] += 1;
        }

        let node_ids = graph
            .nodes
            .iter()
            .map(|node| node.id.as_str())
            .collect::<Vec<_>>();
        let positions = relax(&node_ids, &edges, mode.iterations());

        Self {
            key,
            mode,
            positions,
            edges,
            degrees,
            index_by_id,
        }
    }

    pub(in crate::app) fn key(&self) -> (u64, usize) {
        self.key
    }

    pub(in crate::app) fn mode(&self) -> LayoutMode {
        self.mode
    }

    pub(in crate::app) fn max_degree(&self) -> usize {
        self.degrees.iter().copied().max().unwrap_or(0)
    }
}

/// Seeded ring placement plus a short cooled force relaxation. Deterministic
/// for a given node order, so repeated layouts of the same graph agree.
fn relax(node_ids: &[&str], edges: &[(usize, usize)], iterations: usize) -> Vec<Vec2> {
    let n = node_ids.len();
    if n == 0 {
        return Vec::new();
    }

    let base_radius = (n as f32).sqrt() * 120.0;
    let mut positions = node_ids
        .iter()
        .enumerate()
        .map(|(index, id)| {
            let angle = (index as f32 / n as f32) * TAU;
            let (jx, jy) = stable_pair(id);
            let jitter = vec2(jx * 70.0, jy * 70.0);
            vec2(angle.cos(), angle.sin()) * base_radius + jitter
        })
        .collect::<Vec<_>>();

    if n == 1 {
        return positions;
    }

    let area = (base_radius * 2.2).powi(2);
    let k = (area / n as f32).sqrt().max(28.0);
    let mut temperature = (k * 4.0).max(120.0);

    for _ in 0..iterations {
        let mut disp = vec![Vec2::ZERO; n];

        for i in 0..n {
            for j in (i + 1)..n {
                let delta = positions[i] - positions[j];
                let distance = delta.length().max(0.5);
                let direction = delta / distance;

                let force = (k * k) / distance;
                disp[i] += direction * force;
                disp[j] -= direction * force;
            }
        }

        for &(source, target) in edges {
            let delta = positions[source] - positions[target];
            let distance = delta.length().max(0.5);
            let direction = delta / distance;

            let force = (distance - k) * 0.2;
            disp[source] -= direction * force;
            disp[target] += direction * force;
        }

        for i in 0..n {
            disp[i] -= positions[i] * 0.002;
        }

        for i in 0..n {
            let d = disp[i];
            let length = d.length();
            if length > 0.0 {
                positions[i] += d / length * length.min(temperature);
            }
        }

        temperature *= 0.94;
        if temperature < 0.8 {
            break;
        }
    }

    positions
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::types::{GraphEdge, GraphMetadata, GraphNode};

    fn graph(ids: &[&str], links: &[(&str, &str)]) -> CodeGraph {
        let nodes = ids
            .iter()
            .map(|id| GraphNode {
                id: (*id).to_owned(),
                label: String::new(),
                kind: "function".to_owned(),
                metrics: None,
                security: Vec::new(),
                location: None,
            })
            .collect::<Vec<_>>();
        let edges = links
            .iter()
            .map(|(source, target)| GraphEdge {
                source: (*source).to_owned(),
                target: (*target).to_owned(),
                kind: "calls".to_owned(),
            })
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

    #[test]
    fn layout_covers_every_node_and_resolved_edge() {
        let input = graph(
            &["a", "b", "c"],
            &[("a", "b"), ("b", "c"), ("b", "ghost"), ("c", "c")],
        );
        let layout = GraphLayout::new(&input, (1, 100), LayoutMode::Force);

        assert_eq!(layout.positions.len(), 3);
        // The dangling edge and the self loop resolve to nothing.
        assert_eq!(layout.edges, vec![(0, 1), (1, 2)]);
        assert_eq!(layout.degrees, vec![1, 2, 1]);
        assert_eq!(layout.max_degree(), 2);
        assert_eq!(layout.index_by_id.get("b"), Some(&1));
    }

    #[test]
    fn layout_is_deterministic() {
        let input = graph(&["a", "b", "c", "d"], &[("a", "b"), ("c", "d")]);
        let first = GraphLayout::new(&input, (1, 100), LayoutMode::Force);
        let second = GraphLayout::new(&input, (1, 100), LayoutMode::Force);
        assert_eq!(first.positions, second.positions);
    }

    #[test]
    fn ring_mode_skips_relaxation() {
        let input = graph(&["a", "b", "c", "d"], &[("a", "b"), ("b", "c")]);
        let ring = GraphLayout::new(&input, (1, 100), LayoutMode::Ring);
        let force = GraphLayout::new(&input, (1, 100), LayoutMode::Force);

        assert_eq!(ring.mode(), LayoutMode::Ring);
        assert_eq!(ring.positions.len(), 4);
        assert_ne!(ring.positions, force.positions);
    }
}
