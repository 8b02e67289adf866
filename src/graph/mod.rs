//! Candidate graph construction.
//!
//! [`GraphBuilder`] owns a directed multigraph of class and column nodes and
//! keeps a set of lookup indices in step with it. Adding a class node can pull
//! in the classes of its ontology closure and trigger link synthesis, which
//! connects class node pairs with weighted compact links according to what the
//! [`OntologyOracle`](crate::ontology::OntologyOracle) allows.

pub mod builder;
pub mod closure;
pub mod copy;
pub mod error;
pub mod frequency;
pub mod ids;
pub mod model;
pub mod synthesis;
pub mod weight;

pub use builder::{AlignmentUpdate, GraphBuilder, SemanticTypeMatch};
pub use closure::UriClosures;
pub use error::GraphError;
pub use frequency::{FrequencyKey, LinkFrequencies, LinkFrequency, SelectionType};
pub use ids::{link_id, node_id, NodeIdFactory, NODE_ID_SEPARATOR};
pub use model::{
    ColumnNode, Link, LinkId, LinkKind, LinkStatus, LinkType, Node, NodeId, NodeKind, NodeType,
};
pub use weight::{WeightError, WeightSettings};
