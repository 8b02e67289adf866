//! Index layer.
//!
//! [`GraphBuilder`] owns the multigraph together with every derived lookup
//! structure. Nodes and links enter through [`GraphBuilder::add_node`] and
//! [`GraphBuilder::add_link`] and leave through [`GraphBuilder::remove_node`]
//! and [`GraphBuilder::remove_link`]; those four operations are the only
//! places indices are written, and each one validates everything before it
//! mutates anything.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;
use std::time::Instant;

use petgraph::{
    stable_graph::{EdgeIndex, NodeIndex, StableDiGraph},
    visit::EdgeRef,
    Direction,
};
use tracing::{debug, warn};

use super::{
    closure::UriClosures,
    error::GraphError,
    frequency::{LinkFrequencies, LinkFrequency},
    ids::NodeIdFactory,
    model::{Link, LinkId, LinkStatus, LinkType, Node, NodeId, NodeType},
};
use crate::{
    config::ModelingSettings,
    ontology::{vocab, Label, OracleHandle, PropertyShape},
};

/// A class node, one of its data properties and the column it points to.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub struct SemanticTypeMatch {
    pub class_node: NodeId,
    pub link: LinkId,
    pub column_node: NodeId,
}

/// Outcome of an updating insertion.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct AlignmentUpdate {
    /// Nodes added to the graph, the explicitly requested one first.
    pub added_nodes: Vec<NodeId>,
    /// Compact links created by link synthesis.
    pub synthesized_links: usize,
}

/// Candidate graph under construction for one modeling session.
pub struct GraphBuilder {
    pub(super) oracle: Arc<OracleHandle>,
    pub(super) settings: ModelingSettings,
    pub(super) graph: StableDiGraph<Node, Link>,
    pub(super) node_ids: NodeIdFactory,
    node_index: BTreeMap<NodeId, NodeIndex>,
    link_index: BTreeMap<LinkId, EdgeIndex>,
    nodes_by_uri: BTreeMap<String, BTreeSet<NodeId>>,
    nodes_by_type: BTreeMap<NodeType, BTreeSet<NodeId>>,
    forced_nodes: BTreeSet<NodeId>,
    model_ids: BTreeSet<String>,
    links_by_uri: BTreeMap<String, BTreeSet<LinkId>>,
    links_by_type: BTreeMap<LinkType, BTreeSet<LinkId>>,
    links_by_status: BTreeMap<LinkStatus, BTreeSet<LinkId>>,
    incoming: BTreeMap<NodeId, BTreeSet<LinkId>>,
    outgoing: BTreeMap<NodeId, BTreeSet<LinkId>>,
    data_properties: BTreeMap<(NodeId, String), BTreeSet<NodeId>>,
    semantic_type_matches: BTreeMap<(String, String), BTreeSet<SemanticTypeMatch>>,
    pattern_links: BTreeMap<(String, String, String), Vec<LinkId>>,
    visited: BTreeSet<(NodeId, NodeId)>,
    pub(super) closures: UriClosures,
    frequencies: LinkFrequencies,
    model_link_count: usize,
}

impl std::fmt::Debug for GraphBuilder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GraphBuilder")
            .field("nodes", &self.graph.node_count())
            .field("links", &self.graph.edge_count())
            .field("settings", &self.settings)
            .finish_non_exhaustive()
    }
}

fn insert_into<K: Ord, V: Ord>(index: &mut BTreeMap<K, BTreeSet<V>>, key: K, value: V) {
    index.entry(key).or_default().insert(value);
}

fn remove_from<K: Ord, V: Ord>(index: &mut BTreeMap<K, BTreeSet<V>>, key: &K, value: &V) {
    if let Some(values) = index.get_mut(key) {
        values.remove(value);
        if values.is_empty() {
            index.remove(key);
        }
    }
}

impl GraphBuilder {
    /// Creates a builder, seeding an `owl:Thing` node when configured to.
    #[must_use]
    pub fn new(oracle: Arc<OracleHandle>, settings: ModelingSettings) -> Self {
        let mut builder = Self::empty(oracle, settings);
        if builder.settings.thing_node {
            let id = builder.new_node_id(vocab::OWL_THING);
            let thing = Node::class(
                id,
                Label::new(vocab::OWL_THING)
                    .with_ns(vocab::OWL_NS)
                    .with_prefix("owl"),
            );
            if let Err(err) = builder.add_node(thing) {
                warn!(error = %err, "thing_node_not_added");
            }
        }
        builder
    }

    pub(super) fn empty(oracle: Arc<OracleHandle>, settings: ModelingSettings) -> Self {
        let closures = UriClosures::new(settings.closure_max_iterations);
        Self {
            oracle,
            settings,
            graph: StableDiGraph::default(),
            node_ids: NodeIdFactory::new(),
            node_index: BTreeMap::new(),
            link_index: BTreeMap::new(),
            nodes_by_uri: BTreeMap::new(),
            nodes_by_type: BTreeMap::new(),
            forced_nodes: BTreeSet::new(),
            model_ids: BTreeSet::new(),
            links_by_uri: BTreeMap::new(),
            links_by_type: BTreeMap::new(),
            links_by_status: BTreeMap::new(),
            incoming: BTreeMap::new(),
            outgoing: BTreeMap::new(),
            data_properties: BTreeMap::new(),
            semantic_type_matches: BTreeMap::new(),
            pattern_links: BTreeMap::new(),
            visited: BTreeSet::new(),
            closures,
            frequencies: LinkFrequencies::new(),
            model_link_count: 0,
        }
    }

    #[must_use]
    pub fn oracle(&self) -> &Arc<OracleHandle> {
        &self.oracle
    }

    #[must_use]
    pub fn settings(&self) -> &ModelingSettings {
        &self.settings
    }

    /// The weighted multigraph. Edge weights are the [`Link`] values, whose
    /// [`Link::weight`] is the cost used by downstream extraction.
    #[must_use]
    pub fn graph(&self) -> &StableDiGraph<Node, Link> {
        &self.graph
    }

    /// Allocates the next node id for `uri` that no node holds yet.
    pub fn new_node_id(&mut self, uri: &str) -> NodeId {
        loop {
            let id = self.node_ids.next_id(uri);
            if !self.node_index.contains_key(&id) {
                return id;
            }
        }
    }

    // --- gateway operations -------------------------------------------------

    /// Registers `node` in the graph and its indices.
    ///
    /// Class nodes must name a URI the oracle knows; their label is enriched
    /// with the namespace and prefix it reports and an unresolved closure slot
    /// is created for the URI.
    ///
    /// # Errors
    ///
    /// [`GraphError::DuplicateNode`] when the id is taken and
    /// [`GraphError::UnknownOntologyTerm`] for class nodes of unknown URIs.
    pub fn add_node(&mut self, mut node: Node) -> Result<NodeId, GraphError> {
        if self.node_index.contains_key(node.id()) {
            debug!(node_id = %node.id(), "graph_node_duplicate");
            return Err(GraphError::DuplicateNode {
                id: node.id().clone(),
            });
        }

        if node.is_class() {
            let Some(label) = self.oracle.uri_label(node.uri()) else {
                debug!(node_id = %node.id(), uri = node.uri(), "graph_node_unknown_uri");
                return Err(GraphError::UnknownOntologyTerm {
                    uri: node.uri().to_string(),
                });
            };
            node.label_mut().enrich_from(&label);
        }

        let id = node.id().clone();
        let uri = node.uri().to_string();
        let node_type = node.node_type();

        self.node_ids.observe(&uri, &id);
        if node.is_forced() {
            self.forced_nodes.insert(id.clone());
        }
        self.model_ids.extend(node.model_ids().iter().cloned());
        if node.is_class() {
            self.closures.register(&uri);
        }

        let index = self.graph.add_node(node);
        self.node_index.insert(id.clone(), index);
        insert_into(&mut self.nodes_by_uri, uri, id.clone());
        insert_into(&mut self.nodes_by_type, node_type, id.clone());

        debug!(node_id = %id, "graph_node_added");
        Ok(id)
    }

    /// Adds `link` between its endpoints.
    ///
    /// The weight is `weight` when given, the structural weight of the link
    /// otherwise. Compact links only reach the graph and the id lookup; every
    /// other link is also registered in the secondary indices and counted in
    /// the frequency statistics.
    ///
    /// # Errors
    ///
    /// [`GraphError::DuplicateLink`], [`GraphError::MissingEndpoint`], or
    /// [`GraphError::UnknownOntologyTerm`] for non-compact links whose relation
    /// is unknown to the oracle.
    pub fn add_link(&mut self, mut link: Link, weight: Option<f64>) -> Result<LinkId, GraphError> {
        if self.link_index.contains_key(link.id()) {
            debug!(link_id = %link.id(), "graph_link_duplicate");
            return Err(GraphError::DuplicateLink {
                id: link.id().clone(),
            });
        }

        let (source_index, source_uri, source_is_class) = self.endpoint(&link, link.source())?;
        let (target_index, target_uri, target_is_class) = self.endpoint(&link, link.target())?;

        if !link.is_compact() {
            let Some(label) = self.oracle.uri_label(link.uri()) else {
                debug!(link_id = %link.id(), uri = link.uri(), "graph_link_unknown_uri");
                return Err(GraphError::UnknownOntologyTerm {
                    uri: link.uri().to_string(),
                });
            };
            link.label_mut().enrich_from(&label);
        }

        let weight = weight.unwrap_or_else(|| self.settings.weights.compute(&link));
        link.set_weight(weight);

        let id = link.id().clone();
        let source = link.source().clone();
        let target = link.target().clone();
        self.visited.insert((source.clone(), target.clone()));

        if link.is_compact() {
            let edge = self.graph.add_edge(source_index, target_index, link);
            self.link_index.insert(id.clone(), edge);
            debug!(link_id = %id, weight, "graph_compact_link_added");
            return Ok(id);
        }

        let relation = link.uri().to_string();
        insert_into(&mut self.links_by_uri, relation.clone(), id.clone());
        insert_into(&mut self.links_by_type, link.link_type(), id.clone());
        if link.status() != LinkStatus::Normal {
            insert_into(&mut self.links_by_status, link.status(), id.clone());
        }
        insert_into(&mut self.incoming, target.clone(), id.clone());
        insert_into(&mut self.outgoing, source.clone(), id.clone());

        if source_is_class && !target_is_class {
            insert_into(
                &mut self.data_properties,
                (source.clone(), relation.clone()),
                target.clone(),
            );
            insert_into(
                &mut self.semantic_type_matches,
                (source_uri.clone(), relation.clone()),
                SemanticTypeMatch {
                    class_node: source,
                    link: id.clone(),
                    column_node: target,
                },
            );
        }

        if !link.model_ids().is_empty() {
            self.model_ids.extend(link.model_ids().iter().cloned());
            self.model_link_count += 1;
        }

        self.frequencies
            .record(&source_uri, &relation, &target_uri, target_is_class);

        let edge = self.graph.add_edge(source_index, target_index, link);
        self.link_index.insert(id.clone(), edge);
        debug!(link_id = %id, weight, "graph_link_added");
        Ok(id)
    }

    fn endpoint(&self, link: &Link, id: &NodeId) -> Result<(NodeIndex, String, bool), GraphError> {
        let found = self
            .node_index
            .get(id)
            .and_then(|index| Some((*index, self.graph.node_weight(*index)?)));
        match found {
            Some((index, node)) => Ok((index, node.uri().to_string(), node.is_class())),
            None => {
                debug!(link_id = %link.id(), node_id = %id, "graph_link_missing_endpoint");
                Err(GraphError::MissingEndpoint {
                    link: link.id().clone(),
                    node: id.clone(),
                })
            }
        }
    }

    /// Removes a non-compact link and every index entry referencing it.
    /// Frequency counters are left untouched.
    ///
    /// # Errors
    ///
    /// [`GraphError::MissingLink`] or [`GraphError::CompactLink`].
    pub fn remove_link(&mut self, id: &str) -> Result<Link, GraphError> {
        let edge = self.canonical_edge(id)?;
        debug!(link_id = id, "graph_link_removing");
        self.detach_edge(edge).ok_or_else(|| GraphError::MissingLink {
            id: LinkId::new(id),
        })
    }

    fn canonical_edge(&self, id: &str) -> Result<EdgeIndex, GraphError> {
        let Some(edge) = self.link_index.get(id).copied() else {
            debug!(link_id = id, "graph_link_missing");
            return Err(GraphError::MissingLink {
                id: LinkId::new(id),
            });
        };
        if self.graph.edge_weight(edge).is_some_and(Link::is_compact) {
            return Err(GraphError::CompactLink {
                id: LinkId::new(id),
            });
        }
        Ok(edge)
    }

    fn detach_edge(&mut self, edge: EdgeIndex) -> Option<Link> {
        let link = self.graph.remove_edge(edge)?;
        let id = link.id().clone();
        self.link_index.remove(&id);
        if link.is_compact() {
            return Some(link);
        }

        let relation = link.uri().to_string();
        remove_from(&mut self.links_by_uri, &relation, &id);
        remove_from(&mut self.links_by_type, &link.link_type(), &id);
        remove_from(&mut self.links_by_status, &link.status(), &id);
        remove_from(&mut self.incoming, link.target(), &id);
        remove_from(&mut self.outgoing, link.source(), &id);

        remove_from(
            &mut self.data_properties,
            &(link.source().clone(), relation),
            link.target(),
        );
        self.semantic_type_matches.retain(|_, matches| {
            matches.retain(|entry| entry.link != id);
            !matches.is_empty()
        });
        self.pattern_links.retain(|_, links| {
            links.retain(|entry| *entry != id);
            !links.is_empty()
        });

        if !link.model_ids().is_empty() {
            self.model_link_count = self.model_link_count.saturating_sub(1);
        }
        Some(link)
    }

    /// Removes a node, all links touching it and every index entry
    /// referencing either.
    ///
    /// # Errors
    ///
    /// [`GraphError::MissingNode`].
    pub fn remove_node(&mut self, id: &str) -> Result<Node, GraphError> {
        let Some(index) = self.node_index.get(id).copied() else {
            debug!(node_id = id, "graph_node_missing");
            return Err(GraphError::MissingNode {
                id: NodeId::new(id),
            });
        };
        debug!(node_id = id, "graph_node_removing");

        let incident: BTreeSet<EdgeIndex> = self
            .graph
            .edges_directed(index, Direction::Incoming)
            .chain(self.graph.edges_directed(index, Direction::Outgoing))
            .map(|edge| edge.id())
            .collect();
        for edge in incident {
            self.detach_edge(edge);
        }

        let Some(node) = self.graph.remove_node(index) else {
            return Err(GraphError::MissingNode {
                id: NodeId::new(id),
            });
        };
        let node_id = node.id().clone();

        self.node_index.remove(&node_id);
        remove_from(&mut self.nodes_by_uri, &node.uri().to_string(), &node_id);
        remove_from(&mut self.nodes_by_type, &node.node_type(), &node_id);
        self.forced_nodes.remove(&node_id);
        self.incoming.remove(&node_id);
        self.outgoing.remove(&node_id);
        self.visited
            .retain(|(source, target)| *source != node_id && *target != node_id);
        self.data_properties.retain(|(class_node, _), columns| {
            columns.remove(&node_id);
            *class_node != node_id && !columns.is_empty()
        });

        debug!(
            node_id = %node_id,
            nodes = self.graph.node_count(),
            links = self.graph.edge_count(),
            "graph_node_removed"
        );
        Ok(node)
    }

    /// Moves the canonical link to another status bucket and recomputes its
    /// structural weight.
    ///
    /// # Errors
    ///
    /// [`GraphError::MissingLink`] or [`GraphError::CompactLink`].
    pub fn change_link_status(&mut self, id: &str, status: LinkStatus) -> Result<(), GraphError> {
        let edge = self.canonical_edge(id)?;
        let weights = self.settings.weights;
        let Some(link) = self.graph.edge_weight_mut(edge) else {
            return Err(GraphError::MissingLink {
                id: LinkId::new(id),
            });
        };
        let previous = link.status();
        if previous == status {
            return Ok(());
        }
        link.set_status(status);
        let weight = weights.compute(link);
        link.set_weight(weight);
        let link_id = link.id().clone();

        remove_from(&mut self.links_by_status, &previous, &link_id);
        if status != LinkStatus::Normal {
            insert_into(&mut self.links_by_status, status, link_id);
        }
        debug!(link_id = id, ?previous, ?status, "graph_link_status_changed");
        Ok(())
    }

    /// Overrides the weight of any link, compact ones included.
    ///
    /// # Errors
    ///
    /// [`GraphError::MissingLink`].
    pub fn change_link_weight(&mut self, id: &str, weight: f64) -> Result<(), GraphError> {
        let link = self
            .link_index
            .get(id)
            .and_then(|edge| self.graph.edge_weight_mut(*edge))
            .ok_or_else(|| GraphError::MissingLink {
                id: LinkId::new(id),
            })?;
        link.set_weight(weight);
        Ok(())
    }

    /// Groups a link with every saved link sharing its source class, relation
    /// and target class.
    ///
    /// # Errors
    ///
    /// [`GraphError::MissingLink`] or [`GraphError::CompactLink`].
    pub fn save_pattern_link(&mut self, id: &str) -> Result<(), GraphError> {
        let edge = self.canonical_edge(id)?;
        let Some(link) = self.graph.edge_weight(edge) else {
            return Err(GraphError::MissingLink {
                id: LinkId::new(id),
            });
        };
        let uri_of = |node: &NodeId| self.node(node.as_str()).map(|n| n.uri().to_string());
        let (Some(source_uri), Some(target_uri)) = (uri_of(link.source()), uri_of(link.target()))
        else {
            return Err(GraphError::MissingLink {
                id: LinkId::new(id),
            });
        };
        let key = (source_uri, link.uri().to_string(), target_uri);
        let link_id = link.id().clone();
        self.pattern_links.entry(key).or_default().push(link_id);
        Ok(())
    }

    // --- ontology alignment -------------------------------------------------

    /// Adds `node` and, when ontology alignment is enabled, materializes its
    /// closure and runs link synthesis.
    ///
    /// # Errors
    ///
    /// Fails like [`GraphBuilder::add_node`]. A closure failure is reported
    /// after the node itself has been added.
    pub fn add_node_and_update(&mut self, node: Node) -> Result<AlignmentUpdate, GraphError> {
        let is_class = node.is_class();
        let id = self.add_node(node)?;
        if !self.settings.ontology_alignment || !is_class {
            return Ok(AlignmentUpdate {
                added_nodes: vec![id],
                synthesized_links: 0,
            });
        }

        let mut update = self.add_closure_and_update_links(std::slice::from_ref(&id))?;
        update.added_nodes.insert(0, id);
        Ok(update)
    }

    /// Materializes the closures of the given class nodes, then runs one link
    /// synthesis pass. Unknown ids and column nodes are skipped.
    ///
    /// # Errors
    ///
    /// Propagates closure failures.
    pub fn add_closure_and_update_links(
        &mut self,
        ids: &[NodeId],
    ) -> Result<AlignmentUpdate, GraphError> {
        let started = Instant::now();
        let mut update = AlignmentUpdate::default();

        if self.settings.node_closure {
            for id in ids {
                let Some(uri) = self
                    .node(id.as_str())
                    .filter(|node| node.is_class())
                    .map(|node| node.uri().to_string())
                else {
                    continue;
                };
                self.materialize_closure(&uri, &mut update.added_nodes)?;
            }
        }
        let closure_elapsed = started.elapsed();

        update.synthesized_links = self.update_links();

        debug!(
            added_nodes = update.added_nodes.len(),
            synthesized_links = update.synthesized_links,
            closure_ms = closure_elapsed.as_millis(),
            synthesis_ms = (started.elapsed() - closure_elapsed).as_millis(),
            nodes = self.graph.node_count(),
            links = self.graph.edge_count(),
            "graph_alignment_updated"
        );
        Ok(update)
    }

    fn materialize_closure(&mut self, uri: &str, added: &mut Vec<NodeId>) -> Result<(), GraphError> {
        let closure = self.closures.closure(self.oracle.as_ref(), uri)?;
        for member in closure {
            if self.nodes_by_uri.contains_key(&member) {
                continue;
            }
            let label = self
                .oracle
                .uri_label(&member)
                .unwrap_or_else(|| Label::new(member.as_str()));
            let id = self.new_node_id(&member);
            match self.add_node(Node::class(id, label)) {
                Ok(id) => added.push(id),
                Err(err) => warn!(uri = member, error = %err, "closure_member_not_added"),
            }
        }
        Ok(())
    }

    /// Graph nodes whose URI belongs to the closure of the node's URI. Column
    /// nodes have an empty closure.
    ///
    /// # Errors
    ///
    /// [`GraphError::MissingNode`] or a closure failure.
    pub fn node_closure(&mut self, id: &str) -> Result<Vec<NodeId>, GraphError> {
        let node = self.node(id).ok_or_else(|| GraphError::MissingNode {
            id: NodeId::new(id),
        })?;
        if !node.is_class() {
            return Ok(Vec::new());
        }
        let uri = node.uri().to_string();
        let closure = self.closures.closure(self.oracle.as_ref(), &uri)?;
        Ok(closure
            .iter()
            .filter_map(|member| self.nodes_by_uri.get(member))
            .flatten()
            .cloned()
            .collect())
    }

    /// Recomputes every cached closure.
    ///
    /// # Errors
    ///
    /// Propagates closure failures.
    pub fn reset_closures(&mut self) -> Result<(), GraphError> {
        self.closures.reset(self.oracle.as_ref())
    }

    #[must_use]
    pub fn closures(&self) -> &UriClosures {
        &self.closures
    }

    // --- statistics ---------------------------------------------------------

    #[must_use]
    pub fn frequencies(&self) -> &LinkFrequencies {
        &self.frequencies
    }

    /// Most plausible relation between two class URIs given the links added
    /// so far.
    ///
    /// # Errors
    ///
    /// [`GraphError::NoCandidateLink`] when the oracle allows no relation.
    pub fn more_frequent_link_between(
        &self,
        source_uri: &str,
        target_uri: &str,
    ) -> Result<LinkFrequency, GraphError> {
        self.frequencies
            .most_frequent(self.oracle.as_ref(), source_uri, target_uri)
    }

    /// Every relation the oracle allows between two class nodes, as detached
    /// candidate links sorted by structural weight then id.
    ///
    /// `link_type` restricts candidates to object properties or subclass
    /// links; `shape` further restricts object properties.
    ///
    /// # Errors
    ///
    /// [`GraphError::MissingNode`] or [`GraphError::NotAClassNode`].
    pub fn possible_links(
        &self,
        source_id: &str,
        target_id: &str,
        link_type: Option<LinkType>,
        shape: Option<PropertyShape>,
    ) -> Result<Vec<Link>, GraphError> {
        let source = self.class_node(source_id)?;
        let target = self.class_node(target_id)?;

        let mut candidates = Vec::new();
        for uri in self.oracle.possible_uris(source.uri(), target.uri()) {
            let is_sub_class = uri == vocab::RDFS_SUBCLASS_OF;
            match link_type {
                Some(LinkType::SubClass) if !is_sub_class => continue,
                Some(LinkType::ObjectProperty) if is_sub_class => continue,
                _ => {}
            }

            let mut link = if is_sub_class {
                Link::sub_class(source.id().clone(), target.id().clone())
            } else {
                let Some(found) = self
                    .oracle
                    .object_property_type(source.uri(), target.uri(), &uri)
                else {
                    continue;
                };
                if link_type == Some(LinkType::ObjectProperty) && shape.is_some_and(|s| s != found)
                {
                    continue;
                }
                Link::object_property(source.id().clone(), target.id().clone(), uri.as_str(), found)
            };
            if let Some(label) = self.oracle.uri_label(&uri) {
                link.label_mut().enrich_from(&label);
            }
            link.set_weight(self.settings.weights.compute(&link));
            candidates.push(link);
        }

        candidates.sort_by(|a, b| {
            a.weight()
                .total_cmp(&b.weight())
                .then_with(|| a.id().cmp(b.id()))
        });
        Ok(candidates)
    }

    pub(super) fn class_node(&self, id: &str) -> Result<&Node, GraphError> {
        let node = self.node(id).ok_or_else(|| GraphError::MissingNode {
            id: NodeId::new(id),
        })?;
        if node.is_class() {
            Ok(node)
        } else {
            Err(GraphError::NotAClassNode {
                id: node.id().clone(),
            })
        }
    }

    // --- queries ------------------------------------------------------------

    #[must_use]
    pub fn node(&self, id: &str) -> Option<&Node> {
        self.node_index
            .get(id)
            .and_then(|index| self.graph.node_weight(*index))
    }

    /// Looks a link up by id. Compact links are found too.
    #[must_use]
    pub fn link(&self, id: &str) -> Option<&Link> {
        self.link_index
            .get(id)
            .and_then(|edge| self.graph.edge_weight(*edge))
    }

    pub(super) fn node_index_of(&self, id: &str) -> Option<NodeIndex> {
        self.node_index.get(id).copied()
    }

    #[must_use]
    pub fn contains_node(&self, id: &str) -> bool {
        self.node_index.contains_key(id)
    }

    #[must_use]
    pub fn contains_link(&self, id: &str) -> bool {
        self.link_index.contains_key(id)
    }

    #[must_use]
    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    /// Number of links, compact ones included.
    #[must_use]
    pub fn link_count(&self) -> usize {
        self.graph.edge_count()
    }

    /// Nodes ordered by id.
    pub fn nodes(&self) -> impl Iterator<Item = &Node> + '_ {
        self.node_index
            .values()
            .filter_map(|index| self.graph.node_weight(*index))
    }

    /// Links ordered by id, compact ones included.
    pub fn links(&self) -> impl Iterator<Item = &Link> + '_ {
        self.link_index
            .values()
            .filter_map(|edge| self.graph.edge_weight(*edge))
    }

    fn resolve_nodes<'a>(
        &'a self,
        ids: Option<&'a BTreeSet<NodeId>>,
    ) -> impl Iterator<Item = &'a Node> + 'a {
        ids.into_iter()
            .flatten()
            .filter_map(|id| self.node(id.as_str()))
    }

    fn resolve_links<'a>(
        &'a self,
        ids: Option<&'a BTreeSet<LinkId>>,
    ) -> impl Iterator<Item = &'a Link> + 'a {
        ids.into_iter()
            .flatten()
            .filter_map(|id| self.link(id.as_str()))
    }

    pub fn nodes_with_uri<'a>(&'a self, uri: &str) -> impl Iterator<Item = &'a Node> + 'a {
        self.resolve_nodes(self.nodes_by_uri.get(uri))
    }

    pub fn nodes_of_type(&self, node_type: NodeType) -> impl Iterator<Item = &Node> + '_ {
        self.resolve_nodes(self.nodes_by_type.get(&node_type))
    }

    pub fn class_nodes(&self) -> impl Iterator<Item = &Node> + '_ {
        self.nodes_of_type(NodeType::ClassNode)
    }

    pub fn forced_nodes(&self) -> impl Iterator<Item = &Node> + '_ {
        self.forced_nodes
            .iter()
            .filter_map(|id| self.node(id.as_str()))
    }

    /// Model ids seen on every node and link added so far.
    #[must_use]
    pub fn model_ids(&self) -> &BTreeSet<String> {
        &self.model_ids
    }

    /// Number of present links carrying model provenance.
    #[must_use]
    pub fn model_link_count(&self) -> usize {
        self.model_link_count
    }

    pub fn links_with_uri<'a>(&'a self, uri: &str) -> impl Iterator<Item = &'a Link> + 'a {
        self.resolve_links(self.links_by_uri.get(uri))
    }

    pub fn links_of_type(&self, link_type: LinkType) -> impl Iterator<Item = &Link> + '_ {
        self.resolve_links(self.links_by_type.get(&link_type))
    }

    /// Links in a non-normal status bucket; normal links are not indexed.
    pub fn links_with_status(&self, status: LinkStatus) -> impl Iterator<Item = &Link> + '_ {
        self.resolve_links(self.links_by_status.get(&status))
    }

    /// Indexed (non-compact) links ending at `node_id`.
    pub fn incoming_links<'a>(&'a self, node_id: &str) -> impl Iterator<Item = &'a Link> + 'a {
        self.resolve_links(self.incoming.get(node_id))
    }

    /// Indexed (non-compact) links starting at `node_id`.
    pub fn outgoing_links<'a>(&'a self, node_id: &str) -> impl Iterator<Item = &'a Link> + 'a {
        self.resolve_links(self.outgoing.get(node_id))
    }

    fn graph_links<'a>(
        &'a self,
        node_id: &str,
        direction: Direction,
    ) -> impl Iterator<Item = &'a Link> + 'a {
        self.node_index
            .get(node_id)
            .into_iter()
            .flat_map(move |index| self.graph.edges_directed(*index, direction))
            .map(|edge| edge.weight())
            .filter(|link| !link.is_compact())
    }

    /// Labeled links ending at `node_id`, read from the multigraph.
    pub fn graph_incoming_links<'a>(&'a self, node_id: &str) -> impl Iterator<Item = &'a Link> + 'a {
        self.graph_links(node_id, Direction::Incoming)
    }

    /// Labeled links starting at `node_id`, read from the multigraph.
    pub fn graph_outgoing_links<'a>(&'a self, node_id: &str) -> impl Iterator<Item = &'a Link> + 'a {
        self.graph_links(node_id, Direction::Outgoing)
    }

    /// Labeled links from `source` to `target`.
    pub fn links_between<'a>(
        &'a self,
        source: &str,
        target: &'a str,
    ) -> impl Iterator<Item = &'a Link> + 'a {
        self.graph_links(source, Direction::Outgoing)
            .filter(move |link| link.target().as_str() == target)
    }

    /// Whether a link from `source` to `target` was ever added, or synthesis
    /// already examined the pair.
    #[must_use]
    pub fn is_visited(&self, source: &str, target: &str) -> bool {
        self.visited
            .contains(&(NodeId::new(source), NodeId::new(target)))
    }

    pub(super) fn mark_visited(&mut self, source: &NodeId, target: &NodeId) {
        self.visited.insert((source.clone(), target.clone()));
    }

    /// Number of columns attached to `node_id` through `property`.
    #[must_use]
    pub fn data_property_count(&self, node_id: &str, property: &str) -> usize {
        self.data_properties
            .get(&(NodeId::new(node_id), property.to_string()))
            .map_or(0, BTreeSet::len)
    }

    /// Columns attached to `node_id` through `property`.
    pub fn data_property_columns(
        &self,
        node_id: &str,
        property: &str,
    ) -> impl Iterator<Item = &Node> + '_ {
        self.resolve_nodes(
            self.data_properties
                .get(&(NodeId::new(node_id), property.to_string())),
        )
    }

    /// Class-to-column attachments of `property` on any node of `class_uri`.
    pub fn semantic_type_matches(
        &self,
        class_uri: &str,
        property: &str,
    ) -> impl Iterator<Item = &SemanticTypeMatch> + '_ {
        self.semantic_type_matches
            .get(&(class_uri.to_string(), property.to_string()))
            .into_iter()
            .flatten()
    }

    /// Links saved with [`GraphBuilder::save_pattern_link`] for the triple.
    #[must_use]
    pub fn pattern_links(&self, source_uri: &str, relation: &str, target_uri: &str) -> &[LinkId] {
        self.pattern_links
            .get(&(
                source_uri.to_string(),
                relation.to_string(),
                target_uri.to_string(),
            ))
            .map(Vec::as_slice)
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::GraphBuilder;
    use crate::{
        graph::{node_id, GraphError, Link, LinkStatus, NodeId},
        ontology::PropertyShape,
        tests_cfg,
    };

    fn people() -> (GraphBuilder, NodeId, NodeId) {
        let mut builder =
            tests_cfg::builder_with(tests_cfg::people_oracle(), tests_cfg::manual_settings());
        let person = tests_cfg::class_node(&mut builder, tests_cfg::PERSON);
        let person = builder.add_node(person).expect("person");
        let org = tests_cfg::class_node(&mut builder, tests_cfg::ORGANIZATION);
        let org = builder.add_node(org).expect("organization");
        (builder, person, org)
    }

    #[test]
    fn missing_endpoint_leaves_indices_untouched() {
        let (mut builder, person, _) = people();
        let link = Link::object_property(
            person.clone(),
            NodeId::new("nowhere"),
            tests_cfg::WORKS_FOR,
            PropertyShape::Direct,
        );

        let err = builder.add_link(link, None).expect_err("target is missing");
        assert!(matches!(err, GraphError::MissingEndpoint { ref node, .. } if node.as_str() == "nowhere"));
        assert_eq!(builder.link_count(), 0);
        assert_eq!(builder.links_with_uri(tests_cfg::WORKS_FOR).count(), 0);
        assert!(builder.frequencies().is_empty());
        assert!(!builder.is_visited(person.as_str(), "nowhere"));
    }

    #[test]
    fn status_buckets_follow_the_canonical_link() {
        let (mut builder, person, org) = people();
        let id = builder
            .add_link(
                Link::object_property(person, org, tests_cfg::WORKS_FOR, PropertyShape::Direct)
                    .with_status(LinkStatus::PreferredByUi),
                None,
            )
            .expect("link");
        assert_eq!(builder.links_with_status(LinkStatus::PreferredByUi).count(), 1);

        builder
            .change_link_status(id.as_str(), LinkStatus::ForcedByUser)
            .expect("status");
        assert_eq!(builder.links_with_status(LinkStatus::PreferredByUi).count(), 0);
        assert_eq!(builder.links_with_status(LinkStatus::ForcedByUser).count(), 1);

        builder
            .change_link_status(id.as_str(), LinkStatus::Normal)
            .expect("status");
        assert_eq!(builder.links_with_status(LinkStatus::ForcedByUser).count(), 0);
        let link = builder.link(id.as_str()).expect("link");
        assert_eq!(link.status(), LinkStatus::Normal);
        assert!((link.weight() - builder.settings().weights.direct).abs() < f64::EPSILON);
    }

    #[test]
    fn node_ids_continue_after_explicit_ids() {
        let (mut builder, _, _) = people();
        let explicit = crate::graph::Node::class(
            node_id(tests_cfg::PERSON, 7),
            crate::ontology::Label::new(tests_cfg::PERSON),
        );
        builder.add_node(explicit).expect("explicit id");
        assert_eq!(
            builder.new_node_id(tests_cfg::PERSON),
            node_id(tests_cfg::PERSON, 8)
        );
    }

    #[test]
    fn new_node_ids_skip_ids_already_taken() {
        let (mut builder, _, _) = people();
        let squatter = crate::graph::Node::column(node_id(tests_cfg::PERSON, 2), "name");
        builder.add_node(squatter).expect("column");

        assert_eq!(
            builder.new_node_id(tests_cfg::PERSON),
            node_id(tests_cfg::PERSON, 3)
        );
    }
}
