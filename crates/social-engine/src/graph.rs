use std::collections::{HashMap, HashSet};

/// Bidirectional mapping between external user ids and compact node indices.
///
/// Indices are dense, allocated in first-seen order and stable for the
/// lifetime of the engine. The user ↔ node relation is a bijection.
#[derive(Debug, Clone, Default)]
pub struct NodeRegistry {
    user_to_node: HashMap<u64, u32>,
    node_to_user: Vec<u64>,
}

impl NodeRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.node_to_user.len()
    }

    pub fn is_empty(&self) -> bool {
        self.node_to_user.is_empty()
    }

    pub fn node(&self, user_id: u64) -> Option<u32> {
        self.user_to_node.get(&user_id).copied()
    }

    pub fn user(&self, node: u32) -> Option<u64> {
        self.node_to_user.get(node as usize).copied()
    }

    /// Allocates the next index for `user_id`. The caller checks for an
    /// existing entry first; registering a user twice breaks the bijection.
    pub fn register(&mut self, user_id: u64) -> u32 {
        debug_assert!(!self.user_to_node.contains_key(&user_id));
        let node = self.node_to_user.len() as u32;
        self.user_to_node.insert(user_id, node);
        self.node_to_user.push(user_id);
        node
    }

    pub fn iter(&self) -> impl Iterator<Item = (u32, u64)> + '_ {
        self.node_to_user
            .iter()
            .enumerate()
            .map(|(node, &user)| (node as u32, user))
    }
}

/// Sparse directed graph over dense node indices with one weight per
/// ordered pair.
///
/// Adjacency is index-based (arena style): nodes are row positions, edges
/// live in per-row maps, nothing owns anything else, so cycles are free.
/// An incoming-neighbor set per node keeps union-neighborhood queries at
/// O(degree).
#[derive(Debug, Clone, Default)]
pub struct WeightedDigraph {
    out: Vec<HashMap<u32, f64>>,
    incoming: Vec<HashSet<u32>>,
}

impl WeightedDigraph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_nodes(count: usize) -> Self {
        Self {
            out: vec![HashMap::new(); count],
            incoming: vec![HashSet::new(); count],
        }
    }

    pub fn node_count(&self) -> usize {
        self.out.len()
    }

    pub fn edge_count(&self) -> usize {
        self.out.iter().map(|targets| targets.len()).sum()
    }

    pub fn add_node(&mut self) -> u32 {
        let node = self.out.len() as u32;
        self.out.push(HashMap::new());
        self.incoming.push(HashSet::new());
        node
    }

    /// Weight of the edge `src -> dst`, 0.0 when absent.
    pub fn weight(&self, src: u32, dst: u32) -> f64 {
        self.out
            .get(src as usize)
            .and_then(|targets| targets.get(&dst))
            .copied()
            .unwrap_or(0.0)
    }

    pub fn has_edge(&self, src: u32, dst: u32) -> bool {
        self.out
            .get(src as usize)
            .is_some_and(|targets| targets.contains_key(&dst))
    }

    /// Adds `delta` to the edge `src -> dst`, creating it when absent.
    /// Returns the resulting weight.
    pub fn increase_weight(&mut self, src: u32, dst: u32, delta: f64) -> f64 {
        if src as usize >= self.out.len() || dst as usize >= self.out.len() {
            return 0.0;
        }
        let weight = self.out[src as usize].entry(dst).or_insert(0.0);
        *weight += delta;
        let weight = *weight;
        self.incoming[dst as usize].insert(src);
        weight
    }

    /// Sets the edge `src -> dst` to `weight`, creating it when absent.
    pub fn set_weight(&mut self, src: u32, dst: u32, weight: f64) {
        if src as usize >= self.out.len() || dst as usize >= self.out.len() {
            return;
        }
        self.out[src as usize].insert(dst, weight);
        self.incoming[dst as usize].insert(src);
    }

    pub fn remove_edge(&mut self, src: u32, dst: u32) -> bool {
        let Some(targets) = self.out.get_mut(src as usize) else {
            return false;
        };
        let removed = targets.remove(&dst).is_some();
        if removed {
            self.incoming[dst as usize].remove(&src);
        }
        removed
    }

    pub fn out_neighbors(&self, node: u32) -> impl Iterator<Item = (u32, f64)> + '_ {
        self.out
            .get(node as usize)
            .into_iter()
            .flatten()
            .map(|(&dst, &weight)| (dst, weight))
    }

    pub fn in_neighbors(&self, node: u32) -> impl Iterator<Item = u32> + '_ {
        self.incoming
            .get(node as usize)
            .into_iter()
            .flatten()
            .copied()
    }

    /// Union of outgoing and incoming neighbors, ascending by index.
    pub fn neighbors(&self, node: u32) -> Vec<u32> {
        let mut set: HashSet<u32> = self.out_neighbors(node).map(|(dst, _)| dst).collect();
        set.extend(self.in_neighbors(node));
        let mut neighbors: Vec<u32> = set.into_iter().collect();
        neighbors.sort_unstable();
        neighbors
    }

    pub fn edges(&self) -> impl Iterator<Item = (u32, u32, f64)> + '_ {
        self.out.iter().enumerate().flat_map(|(src, targets)| {
            targets
                .iter()
                .map(move |(&dst, &weight)| (src as u32, dst, weight))
        })
    }
}
