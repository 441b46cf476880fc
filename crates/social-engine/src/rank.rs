//! PageRank-style centrality over the weighted digraph.

use ordered_float::OrderedFloat;
use std::cmp::Reverse;

use crate::graph::WeightedDigraph;

const DAMPING: f64 = 0.85;
const TOLERANCE: f64 = 1e-8;
const MAX_ITERATIONS: usize = 100;

/// One entry of a centrality ranking, best first.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RankedNode {
    pub node: u32,
    pub score: f64,
}

/// Runs weighted PageRank and returns every node ordered by descending
/// score (ties broken by ascending index).
///
/// Power iteration: each node spreads its mass over outgoing edges
/// proportionally to edge weight; nodes without outgoing edges spread
/// uniformly over the whole graph. Stops on L1 convergence or after a
/// bounded number of rounds.
pub fn ranking(graph: &WeightedDigraph) -> Vec<RankedNode> {
    let n = graph.node_count();
    if n == 0 {
        return Vec::new();
    }
    let nf = n as f64;

    let out_sums: Vec<f64> = (0..n)
        .map(|node| graph.out_neighbors(node as u32).map(|(_, w)| w).sum())
        .collect();

    let mut scores = vec![1.0 / nf; n];
    for _ in 0..MAX_ITERATIONS {
        let mut next = vec![(1.0 - DAMPING) / nf; n];
        for (node, &out_sum) in out_sums.iter().enumerate() {
            if out_sum > 0.0 {
                let mass = DAMPING * scores[node] / out_sum;
                for (dst, weight) in graph.out_neighbors(node as u32) {
                    next[dst as usize] += mass * weight;
                }
            } else {
                // dangling node: its mass goes everywhere
                let share = DAMPING * scores[node] / nf;
                for slot in next.iter_mut() {
                    *slot += share;
                }
            }
        }
        let delta: f64 = next
            .iter()
            .zip(&scores)
            .map(|(new, old)| (new - old).abs())
            .sum();
        scores = next;
        if delta < TOLERANCE {
            break;
        }
    }

    let mut ranked: Vec<RankedNode> = scores
        .into_iter()
        .enumerate()
        .map(|(node, score)| RankedNode {
            node: node as u32,
            score,
        })
        .collect();
    ranked.sort_by_key(|entry| (Reverse(OrderedFloat(entry.score)), entry.node));
    ranked
}
