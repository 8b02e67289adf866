use thiserror::Error;

use super::model::{LinkId, NodeId};
use crate::ontology::OracleError;

/// Rejection reasons of the graph gateway operations.
///
/// A rejected operation leaves the graph and every index untouched.
#[derive(Debug, Error)]
pub enum GraphError {
    #[error("node `{id}` already exists in the graph")]
    DuplicateNode { id: NodeId },
    #[error("link `{id}` already exists in the graph")]
    DuplicateLink { id: LinkId },
    #[error("node `{id}` does not exist in the graph")]
    MissingNode { id: NodeId },
    #[error("link `{id}` does not exist in the graph")]
    MissingLink { id: LinkId },
    #[error("endpoint `{node}` of link `{link}` does not exist in the graph")]
    MissingEndpoint { link: LinkId, node: NodeId },
    #[error("`{uri}` does not exist in the ontology")]
    UnknownOntologyTerm { uri: String },
    #[error("node `{id}` is not a class node")]
    NotAClassNode { id: NodeId },
    /// Compact links are owned by link synthesis.
    #[error("link `{id}` is a compact link")]
    CompactLink { id: LinkId },
    #[error("no relation can link `{source_uri}` to `{target_uri}`")]
    NoCandidateLink {
        source_uri: String,
        target_uri: String,
    },
    #[error("closure of `{uri}` did not converge after {iterations} iterations")]
    ClosureDidNotConverge { uri: String, iterations: usize },
    #[error(transparent)]
    Oracle(#[from] OracleError),
}
