//! Per-community social interaction graph engine.
//!
//! Each community gets an independent weighted digraph tracking how users
//! address one another. On top of it the engine derives PageRank-style
//! importance, top ranks, shortest social paths, pairwise interest and a
//! bounded neighborhood for rendering, and persists everything as a
//! snapshot + node side-table pair.
//!
//! Event extraction, rendering and scheduling live with the surrounding
//! system; [`manager::GraphManager`] is the integration point: it hands
//! out one lock-guarded [`engine::SocialGraph`] per community and drives
//! the periodic maintenance passes.

pub mod engine;
pub mod error;
pub mod graph;
pub mod manager;
pub mod persist;
pub mod rank;
pub mod subgraph;

pub use engine::{MessageEvent, SocialGraph};
pub use error::GraphError;
pub use manager::GraphManager;
pub use subgraph::{Subgraph, SubgraphEdge, SubgraphNode};
