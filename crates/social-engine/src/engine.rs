use std::collections::{HashMap, HashSet, VecDeque};
use std::path::PathBuf;

use ordered_float::OrderedFloat;
use tracing::debug;

use crate::error::GraphError;
use crate::graph::{NodeRegistry, WeightedDigraph};
use crate::persist;
use crate::rank;

/// One qualifying chat event: `author` addressed `targets` at `timestamp`.
///
/// `targets` are the explicitly addressed users (mentions, reply targets);
/// duplicates and self-references are ignored. The timestamp is carried
/// for collaborators; weight accumulation does not read it.
#[derive(Debug, Clone)]
pub struct MessageEvent {
    pub author: u64,
    pub targets: Vec<u64>,
    pub timestamp: f64,
}

/// Social interaction graph of one community.
///
/// A weighted digraph over users where weight(a -> b) accumulates how much
/// `a` addresses `b`, plus caches derived from it: PageRank importance,
/// the top-ranked users and memoized social paths. Not synchronized by
/// itself; the manager keeps one instance per community behind a mutex.
///
/// Queries register unknown users as isolated nodes instead of failing,
/// so every query method takes `&mut self`.
pub struct SocialGraph {
    base_path: PathBuf,
    graph: WeightedDigraph,
    registry: NodeRegistry,
    /// node -> (rank, centrality score) from the last recomputation.
    importance: HashMap<u32, (usize, f64)>,
    top_ranks: Vec<u32>,
    path_cache: HashMap<(u64, u64), Vec<u64>>,
    max_edge_weight: f64,
    dirty: bool,
}

impl SocialGraph {
    /// How many users `get_top_ranks` reports at most.
    pub const TOP_RANKS_N: usize = 10;
    /// Normalized edges below this weight are dropped during maintenance.
    pub const EDGE_THRESHOLD: f64 = 0.1;
    /// Neighbor budget used by the subgraph extraction.
    pub const DEFAULT_INTERACTIONS: usize = 10;

    /// Creates an empty engine persisting under `base_path`.
    pub fn new(base_path: impl Into<PathBuf>) -> Self {
        Self {
            base_path: base_path.into(),
            graph: WeightedDigraph::new(),
            registry: NodeRegistry::new(),
            importance: HashMap::new(),
            top_ranks: Vec::new(),
            path_cache: HashMap::new(),
            max_edge_weight: 1.0,
            dirty: false,
        }
    }

    /// Restores an engine from the artifact pair under `base_path`.
    ///
    /// A loaded engine starts dirty so the first maintenance tick rebuilds
    /// the derived caches.
    pub fn load(base_path: impl Into<PathBuf>) -> Result<Self, GraphError> {
        let base_path = base_path.into();
        let (graph, registry) = persist::load(&base_path)?;
        debug!(
            path = %base_path.display(),
            nodes = registry.len(),
            edges = graph.edge_count(),
            "social graph loaded"
        );
        Ok(Self {
            base_path,
            graph,
            registry,
            importance: HashMap::new(),
            top_ranks: Vec::new(),
            path_cache: HashMap::new(),
            max_edge_weight: 1.0,
            dirty: true,
        })
    }

    /// Normalizes weights and writes the artifact pair.
    pub fn save(&mut self) -> Result<(), GraphError> {
        self.normalize_edge_weights();
        persist::save(&self.base_path, &self.graph, &self.registry)?;
        debug!(path = %self.base_path.display(), "social graph saved");
        Ok(())
    }

    pub fn node_count(&self) -> usize {
        self.registry.len()
    }

    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    /// True when the graph changed since the last recomputation.
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Folds one message into the graph. Cheap enough to run inline on
    /// every qualifying event; never performs I/O.
    ///
    /// Each distinct explicit target gains a full point of weight from the
    /// author. Each `recent_context` entry (most recent first, same
    /// channel) gains a harmonically decaying share: 1/2, 1/4, 1/6, ...
    pub fn handle_message(&mut self, event: &MessageEvent, recent_context: &[(u64, f64)]) {
        let author_node = self.node_for(event.author);

        let mut seen: HashSet<u64> = HashSet::new();
        for &target in &event.targets {
            if target == event.author || !seen.insert(target) {
                continue;
            }
            let target_node = self.node_for(target);
            self.increase_weight(author_node, target_node, 1.0);
        }

        for (position, &(other_author, _)) in recent_context.iter().enumerate() {
            if other_author == event.author {
                continue;
            }
            let weight = 1.0 / (2.0 * (position as f64 + 1.0));
            let other_node = self.node_for(other_author);
            self.increase_weight(author_node, other_node, weight);
        }

        self.dirty = true;
    }

    /// Rebuilds the derived state: normalizes and prunes weights, reranks
    /// every node and clears the path cache. No-op while not dirty.
    pub fn update(&mut self) {
        if !self.dirty {
            return;
        }

        self.normalize_edge_weights();

        if self.registry.len() > 0 {
            let ranking = rank::ranking(&self.graph);
            let top_n = ranking.len().min(Self::TOP_RANKS_N);
            self.top_ranks = ranking[..top_n].iter().map(|entry| entry.node).collect();
            self.importance.clear();
            for (rank_position, entry) in ranking.into_iter().enumerate() {
                self.importance.insert(entry.node, (rank_position, entry.score));
            }
        }

        self.path_cache.clear();
        self.dirty = false;
        debug!(
            nodes = self.registry.len(),
            edges = self.graph.edge_count(),
            "social graph recomputed"
        );
    }

    /// Importance of a user in [0, 1], relative to everyone ranked by the
    /// last recomputation. 0.0 when the user has never been ranked.
    pub fn get_importance(&mut self, user_id: u64) -> f64 {
        let node = self.node_for(user_id);
        match self.importance.get(&node) {
            Some(&(rank, _)) => {
                let total = self.importance.len() as f64;
                (total - (rank as f64 + 1.0)) / total
            }
            None => 0.0,
        }
    }

    /// 0-based rank of a user, best first; `None` when never ranked.
    pub fn get_rank(&mut self, user_id: u64) -> Option<usize> {
        let node = self.node_for(user_id);
        self.importance.get(&node).map(|&(rank, _)| rank)
    }

    /// The best-ranked users, best first, at most [`Self::TOP_RANKS_N`].
    pub fn get_top_ranks(&self) -> Vec<u64> {
        self.top_ranks
            .iter()
            .filter_map(|&node| self.registry.user(node))
            .collect()
    }

    /// Users on the shortest directed path from `src` to `dst`, both ends
    /// included; empty when `dst` is unreachable. Edge existence alone
    /// drives the traversal, so this is reachability distance. Memoized
    /// per ordered pair until the next effective [`Self::update`].
    pub fn get_social_path(&mut self, src: u64, dst: u64) -> Vec<u64> {
        let src_node = self.node_for(src);
        let dst_node = self.node_for(dst);

        if let Some(path) = self.path_cache.get(&(src, dst)) {
            return path.clone();
        }

        let path: Vec<u64> = self
            .bfs_path(src_node, dst_node)
            .into_iter()
            .filter_map(|node| self.registry.user(node))
            .collect();
        self.path_cache.insert((src, dst), path.clone());
        path
    }

    /// Users the given user interacted with in either direction, sorted
    /// ascending by the mean of the two directional weights and truncated
    /// to `max_count`. Weakest relationships come first.
    pub fn get_interactions(&mut self, user_id: u64, max_count: usize) -> Vec<u64> {
        let node = self.node_for(user_id);
        let mut by_mean: Vec<(OrderedFloat<f64>, u64)> = Vec::new();
        for neighbor in self.graph.neighbors(node) {
            let outgoing = self.graph.weight(node, neighbor);
            let incoming = self.graph.weight(neighbor, node);
            if let Some(neighbor_user) = self.registry.user(neighbor) {
                by_mean.push((OrderedFloat((outgoing + incoming) / 2.0), neighbor_user));
            }
        }
        by_mean.sort_unstable();
        by_mean
            .into_iter()
            .take(max_count)
            .map(|(_, user)| user)
            .collect()
    }

    /// Share of the pair's combined weight flowing from `user_a` to
    /// `user_b`, in [0, 1]; 0.0 when the pair never interacted. Whenever
    /// the combined weight is nonzero the two directions sum to 1.
    pub fn get_interest(&mut self, user_a: u64, user_b: u64) -> f64 {
        let a = self.node_for(user_a);
        let b = self.node_for(user_b);
        let forward = self.graph.weight(a, b);
        let reverse = self.graph.weight(b, a);
        let combined = forward + reverse;
        if combined == 0.0 {
            0.0
        } else {
            forward / combined
        }
    }

    /// Accumulated weight of the directed relationship `src -> dst`.
    pub fn edge_weight(&mut self, src: u64, dst: u64) -> f64 {
        let src_node = self.node_for(src);
        let dst_node = self.node_for(dst);
        self.graph.weight(src_node, dst_node)
    }

    pub(crate) fn digraph(&self) -> &WeightedDigraph {
        &self.graph
    }

    pub(crate) fn registry(&self) -> &NodeRegistry {
        &self.registry
    }

    /// Node for `user_id`, registered on first sight. This runs on query
    /// paths too: asking about an unknown user materializes them as an
    /// isolated node.
    pub(crate) fn node_for(&mut self, user_id: u64) -> u32 {
        if let Some(node) = self.registry.node(user_id) {
            return node;
        }
        let node = self.graph.add_node();
        let registered = self.registry.register(user_id);
        debug_assert_eq!(node, registered);
        node
    }

    fn increase_weight(&mut self, src: u32, dst: u32, delta: f64) {
        debug_assert!(src != dst, "self-loops are never created");
        let weight = self.graph.increase_weight(src, dst, delta);
        if weight > self.max_edge_weight {
            self.max_edge_weight = weight;
        }
    }

    /// Scales every weight by the running maximum, drops edges falling
    /// below [`Self::EDGE_THRESHOLD`], then resets the maximum tracker.
    fn normalize_edge_weights(&mut self) {
        let edges: Vec<(u32, u32, f64)> = self.graph.edges().collect();
        for (src, dst, weight) in edges {
            let normalized = weight / self.max_edge_weight;
            if normalized < Self::EDGE_THRESHOLD {
                self.graph.remove_edge(src, dst);
            } else {
                self.graph.set_weight(src, dst, normalized);
            }
        }
        self.max_edge_weight = 1.0;
    }

    fn bfs_path(&self, src: u32, dst: u32) -> Vec<u32> {
        if src == dst {
            return vec![src];
        }

        let mut predecessor: HashMap<u32, u32> = HashMap::new();
        let mut visited: HashSet<u32> = HashSet::from([src]);
        let mut queue: VecDeque<u32> = VecDeque::from([src]);

        while let Some(node) = queue.pop_front() {
            for (next, _) in self.graph.out_neighbors(node) {
                if !visited.insert(next) {
                    continue;
                }
                predecessor.insert(next, node);
                if next == dst {
                    let mut path = vec![dst];
                    let mut current = dst;
                    while current != src {
                        match predecessor.get(&current) {
                            Some(&previous) => {
                                path.push(previous);
                                current = previous;
                            }
                            None => return Vec::new(),
                        }
                    }
                    path.reverse();
                    return path;
                }
                queue.push_back(next);
            }
        }

        Vec::new()
    }
}
