use thiserror::Error;

/// Errors surfaced by the persistence codec.
///
/// Query-side "not found" conditions are not represented here: an unknown
/// user id is lazily registered and the query reports its empty default.
/// A load that fails with any of these variants leaves no engine behind.
#[derive(Debug, Error)]
pub enum GraphError {
    #[error("artifact io: {0}")]
    Io(#[from] std::io::Error),

    #[error("graph artifact encoding: {0}")]
    Codec(#[from] bincode::Error),

    #[error("node side-table encoding: {0}")]
    NodeMap(#[from] serde_json::Error),

    #[error("graph lists {nodes} nodes but the side-table maps {mapped}")]
    NodeMapMismatch { nodes: u32, mapped: usize },

    #[error("node {0} has no side-table entry")]
    UnmappedNode(u32),

    #[error("user {0} is mapped to more than one node")]
    DuplicateUser(u64),

    #[error("edge ({src} -> {dst}) references a node outside the graph")]
    EdgeOutOfRange { src: u32, dst: u32 },
}
