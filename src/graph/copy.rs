//! Node copies and whole-graph reconstruction for speculative branching.

use std::sync::Arc;

use petgraph::Direction;
use tracing::debug;

use super::{
    builder::GraphBuilder,
    error::GraphError,
    model::{Link, Node, NodeId},
};
use crate::{config::ModelingSettings, ontology::OracleHandle};

impl GraphBuilder {
    /// Adds a second node for the URI of a class node and re-attaches the
    /// original's links to it, weights included.
    ///
    /// Incoming links from column nodes are never copied; outgoing links to
    /// column nodes only when `copy_links_to_columns` is set.
    ///
    /// # Errors
    ///
    /// [`GraphError::MissingNode`], [`GraphError::NotAClassNode`], or
    /// [`GraphError::UnknownOntologyTerm`] when the oracle rejects the class or
    /// a relation to copy. Nothing is added in that case.
    pub fn copy_node(
        &mut self,
        node_id: &str,
        copy_links_to_columns: bool,
    ) -> Result<NodeId, GraphError> {
        let original = self.class_node(node_id)?;
        let label = original.label().clone();
        let Some(index) = self.node_index_of(node_id) else {
            return Err(GraphError::MissingNode {
                id: NodeId::new(node_id),
            });
        };

        let is_column = |builder: &Self, id: &NodeId| {
            builder
                .node(id.as_str())
                .is_some_and(Node::is_column)
        };
        let incoming: Vec<Link> = self
            .graph
            .edges_directed(index, Direction::Incoming)
            .map(|edge| edge.weight().clone())
            .filter(|link| !is_column(self, link.source()))
            .collect();
        let outgoing: Vec<Link> = self
            .graph
            .edges_directed(index, Direction::Outgoing)
            .map(|edge| edge.weight().clone())
            .filter(|link| copy_links_to_columns || !is_column(self, link.target()))
            .collect();

        self.check_copyable(label.uri(), incoming.iter().chain(&outgoing))?;

        let id = self.new_node_id(label.uri());
        let copy = self.add_node(Node::class(id, label))?;

        for link in &incoming {
            let moved = link.copy_between(link.source().clone(), copy.clone());
            self.add_link(moved, Some(link.weight()))?;
        }
        for link in &outgoing {
            let moved = link.copy_between(copy.clone(), link.target().clone());
            self.add_link(moved, Some(link.weight()))?;
        }

        debug!(
            node_id,
            copy = %copy,
            incoming = incoming.len(),
            outgoing = outgoing.len(),
            "graph_node_copied"
        );
        Ok(copy)
    }

    /// Rejects a copy up front when the oracle no longer knows the class or
    /// one of the relations to re-attach, so a failed copy leaves no trace.
    fn check_copyable<'a>(
        &self,
        uri: &'a str,
        links: impl Iterator<Item = &'a Link>,
    ) -> Result<(), GraphError> {
        let unknown = std::iter::once(uri)
            .chain(links.filter(|link| !link.is_compact()).map(Link::uri))
            .find(|uri| self.oracle.uri_label(uri).is_none());
        match unknown {
            Some(uri) => Err(GraphError::UnknownOntologyTerm {
                uri: uri.to_string(),
            }),
            None => Ok(()),
        }
    }

    /// Independent builder with the same oracle, settings, nodes and links.
    ///
    /// # Errors
    ///
    /// See [`GraphBuilder::reconstruct`].
    pub fn from_graph(source: &Self, preserve_weights: bool) -> Result<Self, GraphError> {
        Self::reconstruct(
            Arc::clone(&source.oracle),
            source.settings.clone(),
            source,
            preserve_weights,
        )
    }

    /// Rebuilds the nodes and links of `source` in a new builder.
    ///
    /// Node id counters continue after the highest id seen for each URI. Link
    /// weights are copied when `preserve_weights` is set and recomputed
    /// otherwise. No `owl:Thing` node is seeded and no synthesis pass runs.
    ///
    /// # Errors
    ///
    /// Fails when `oracle` rejects a node or link that `source` holds.
    pub fn reconstruct(
        oracle: Arc<OracleHandle>,
        settings: ModelingSettings,
        source: &Self,
        preserve_weights: bool,
    ) -> Result<Self, GraphError> {
        let mut builder = Self::empty(oracle, settings);
        for node in source.nodes() {
            builder.add_node(node.clone())?;
        }
        for link in source.links() {
            let weight = preserve_weights.then(|| link.weight());
            builder.add_link(link.clone(), weight)?;
        }
        debug!(
            nodes = builder.node_count(),
            links = builder.link_count(),
            preserve_weights,
            "graph_reconstructed"
        );
        Ok(builder)
    }
}
