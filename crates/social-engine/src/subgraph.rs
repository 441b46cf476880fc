//! Bounded neighborhood extraction for the rendering collaborator.
//!
//! The engine hands out plain node/edge/weight data; layout, coloring and
//! image encoding happen elsewhere.

use std::collections::{HashSet, VecDeque};

use ordered_float::OrderedFloat;
use serde::{Deserialize, Serialize};

use crate::engine::SocialGraph;

/// Neighborhood of one user, breadth-first from the root and bounded by a
/// node budget.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Subgraph {
    pub root: u64,
    pub nodes: Vec<SubgraphNode>,
    pub edges: Vec<SubgraphEdge>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct SubgraphNode {
    pub user_id: u64,
    /// Importance in [0, 1] from the last recomputation.
    pub importance: f64,
}

/// One record per unordered user pair with at least one directed edge.
/// Both directional weights are carried so the renderer can derive arrow
/// direction and the interest split itself.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct SubgraphEdge {
    pub source: u64,
    pub target: u64,
    pub forward_weight: f64,
    pub reverse_weight: f64,
    pub mean_weight: f64,
}

impl SocialGraph {
    /// Extracts the neighborhood of `user_id`, collecting nodes breadth
    /// first (each node's outgoing neighbors expanded in ascending weight
    /// order) until the budget is exceeded.
    pub fn get_subgraph(&mut self, user_id: u64, max_nodes: usize) -> Subgraph {
        let root = self.node_for(user_id);
        let nodes = self.nodes_from_root(root, max_nodes);

        let mut subgraph_nodes = Vec::with_capacity(nodes.len());
        for &node in &nodes {
            let Some(user) = self.registry().user(node) else {
                continue;
            };
            let importance = self.get_importance(user);
            subgraph_nodes.push(SubgraphNode {
                user_id: user,
                importance,
            });
        }

        let node_set: HashSet<u32> = nodes.iter().copied().collect();
        let mut seen_pairs: HashSet<(u32, u32)> = HashSet::new();
        let mut edges = Vec::new();
        for &node in &nodes {
            let Some(user) = self.registry().user(node) else {
                continue;
            };
            for neighbor_user in self.get_interactions(user, Self::DEFAULT_INTERACTIONS) {
                let Some(neighbor) = self.registry().node(neighbor_user) else {
                    continue;
                };
                if !node_set.contains(&neighbor) {
                    continue;
                }
                let pair = if node < neighbor {
                    (node, neighbor)
                } else {
                    (neighbor, node)
                };
                if !seen_pairs.insert(pair) {
                    continue;
                }
                let forward = self.digraph().weight(node, neighbor);
                let reverse = self.digraph().weight(neighbor, node);
                edges.push(SubgraphEdge {
                    source: user,
                    target: neighbor_user,
                    forward_weight: forward,
                    reverse_weight: reverse,
                    mean_weight: (forward + reverse) / 2.0,
                });
            }
        }

        Subgraph {
            root: user_id,
            nodes: subgraph_nodes,
            edges,
        }
    }

    fn nodes_from_root(&self, root: u32, max_nodes: usize) -> Vec<u32> {
        let mut nodes: Vec<u32> = Vec::new();
        let mut queue: VecDeque<u32> = VecDeque::from([root]);

        while let Some(node) = queue.pop_front() {
            if nodes.len() > max_nodes {
                break;
            }
            if nodes.contains(&node) {
                continue;
            }
            nodes.push(node);

            let mut neighbors: Vec<(OrderedFloat<f64>, u32)> = self
                .digraph()
                .out_neighbors(node)
                .map(|(neighbor, weight)| (OrderedFloat(weight), neighbor))
                .collect();
            neighbors.sort_unstable();
            queue.extend(neighbors.into_iter().map(|(_, neighbor)| neighbor));
        }

        nodes
    }
}
