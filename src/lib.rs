//! # alignment-graph
//!
//! In-memory construction of the candidate graph used to model data sources
//! against an ontology: class and column nodes, ontology-derived links, their
//! weights and the statistics used to rank them.
//!
//! ```
//! use std::sync::Arc;
//!
//! use alignment_graph::{
//!     config::ModelingSettings,
//!     graph::{GraphBuilder, Node},
//!     ontology::{Class, InMemoryOracle, Iri, Label, Ontology, Property},
//! };
//!
//! let person = Iri::new("https://example.org/people#Person").unwrap();
//! let org = Iri::new("https://example.org/people#Organization").unwrap();
//! let works_for = Iri::new("https://example.org/people#worksFor").unwrap();
//!
//! let mut ontology = Ontology::new(Iri::new("https://example.org/people").unwrap());
//! ontology.add_class(Class::new(person.clone())).unwrap();
//! ontology.add_class(Class::new(org.clone())).unwrap();
//! ontology
//!     .add_property(Property::object(works_for, Some(person.clone()), Some(org.clone())))
//!     .unwrap();
//!
//! let mut builder = GraphBuilder::new(
//!     Arc::new(InMemoryOracle::new(ontology)),
//!     ModelingSettings::default(),
//! );
//! let id = builder.new_node_id(org.as_str());
//! let update = builder
//!     .add_node_and_update(Node::class(id, Label::new(org.as_str())))
//!     .unwrap();
//!
//! // a person can work for the organization, so the closure pulls it in
//! assert_eq!(update.added_nodes.len(), 2);
//! assert_eq!(update.synthesized_links, 1);
//! assert!(builder.nodes_with_uri(person.as_str()).next().is_some());
//! ```

pub mod config;
pub mod errors;
pub mod graph;
pub mod logger;
pub mod ontology;
#[cfg(any(test, feature = "testing"))]
pub mod tests_cfg;

pub use errors::{Error, Result};
