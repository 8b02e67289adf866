//! Pairwise link synthesis.
//!
//! Every unvisited pair of class nodes is checked against the oracle tier by
//! tier. A direction stops at the first tier that connects it; the
//! unconstrained tier needs both directions open and links both at once.

use std::sync::Arc;

use tracing::debug;

use super::{
    builder::GraphBuilder,
    model::{Link, NodeId},
};
use crate::ontology::{OracleHandle, PropertyShape};

fn connected(oracle: &OracleHandle, shape: PropertyShape, source: &str, target: &str) -> bool {
    match shape {
        PropertyShape::Direct => oracle.is_connected_by_direct_property(source, target),
        PropertyShape::Indirect => oracle.is_connected_by_indirect_property(source, target),
        PropertyShape::RangeOnly => oracle.is_connected_by_domainless_property(source, target),
        PropertyShape::DomainOnly => oracle.is_connected_by_rangeless_property(source, target),
        PropertyShape::Neither => {
            oracle.is_connected_by_domainless_and_rangeless_property(source, target)
        }
    }
}

#[derive(Default)]
struct PairState {
    forward: bool,
    backward: bool,
}

impl GraphBuilder {
    /// Adds the compact links the oracle allows between class node pairs not
    /// examined yet, and returns how many were added.
    ///
    /// Pairs for which no link could be added are marked visited so later
    /// passes skip them.
    pub fn update_links(&mut self) -> usize {
        let class_nodes: Vec<(NodeId, String)> = self
            .class_nodes()
            .map(|node| (node.id().clone(), node.uri().to_string()))
            .collect();

        let mut added = 0;
        let mut examined = 0;
        for (i, (id1, uri1)) in class_nodes.iter().enumerate() {
            for (id2, uri2) in &class_nodes[i + 1..] {
                if self.is_visited(id1.as_str(), id2.as_str())
                    || self.is_visited(id2.as_str(), id1.as_str())
                {
                    continue;
                }
                examined += 1;

                let state = self.link_pair((id1, uri1.as_str()), (id2, uri2.as_str()), &mut added);
                if !state.forward && !state.backward {
                    self.mark_visited(id1, id2);
                }
            }
        }

        debug!(
            class_nodes = class_nodes.len(),
            examined, added, "links_synthesized"
        );
        added
    }

    fn link_pair(
        &mut self,
        (id1, uri1): (&NodeId, &str),
        (id2, uri2): (&NodeId, &str),
        added: &mut usize,
    ) -> PairState {
        let tiers = self.settings.properties;
        let handle = Arc::clone(&self.oracle);
        let oracle = handle.as_ref();
        let mut state = PairState::default();

        let shaped_tiers = [
            (tiers.direct, PropertyShape::Direct),
            (tiers.indirect, PropertyShape::Indirect),
            (tiers.with_only_range, PropertyShape::RangeOnly),
            (tiers.with_only_domain, PropertyShape::DomainOnly),
        ];

        for (enabled, shape) in shaped_tiers {
            if !enabled {
                continue;
            }
            if !state.forward && connected(oracle, shape, uri1, uri2) {
                state.forward |= self.add_compact(
                    Link::compact_object_property(id1.clone(), id2.clone(), shape),
                    added,
                );
            }
            if !state.backward && connected(oracle, shape, uri2, uri1) {
                state.backward |= self.add_compact(
                    Link::compact_object_property(id2.clone(), id1.clone(), shape),
                    added,
                );
            }
        }

        if tiers.without_domain_and_range
            && !state.forward
            && !state.backward
            && oracle.is_connected_by_domainless_and_rangeless_property(uri1, uri2)
        {
            state.forward = self.add_compact(
                Link::compact_object_property(id1.clone(), id2.clone(), PropertyShape::Neither),
                added,
            );
            state.backward = self.add_compact(
                Link::compact_object_property(id2.clone(), id1.clone(), PropertyShape::Neither),
                added,
            );
        }

        if tiers.sub_class {
            if !state.forward && oracle.is_subclass(uri1, uri2, false) {
                state.forward |=
                    self.add_compact(Link::compact_sub_class(id1.clone(), id2.clone()), added);
            }
            if !state.backward && oracle.is_subclass(uri2, uri1, false) {
                state.backward |=
                    self.add_compact(Link::compact_sub_class(id2.clone(), id1.clone()), added);
            }
        }

        state
    }

    fn add_compact(&mut self, link: Link, added: &mut usize) -> bool {
        match self.add_link(link, None) {
            Ok(_) => {
                *added += 1;
                true
            }
            Err(err) => {
                debug!(error = %err, "compact_link_skipped");
                false
            }
        }
    }
}
