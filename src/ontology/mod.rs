//! Ontology primitives and the oracle contract consumed by the graph builder.
//!
//! The module keeps pure domain constructs (validated IRIs, labels, the
//! in-memory ontology aggregate) next to the [`OntologyOracle`] trait that
//! describes the read-only reasoning the builder depends on. The graph engine
//! only ever talks to the trait; [`InMemoryOracle`] is the bundled adapter.

pub mod entities;
pub mod in_memory;
pub mod oracle;
pub mod value_objects;

pub use entities::{Class, Ontology, OntologyError, Property, PropertyKind};
pub use in_memory::InMemoryOracle;
pub use oracle::{OntologyOracle, OracleError, OracleHandle, PropertyShape};
pub use value_objects::{vocab, Iri, IriError, Label};
