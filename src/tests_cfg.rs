//! Fixture ontologies and builder helpers shared by unit and integration
//! tests.
use std::sync::Arc;

use crate::{
    config::ModelingSettings,
    graph::{GraphBuilder, Node},
    ontology::{Class, InMemoryOracle, Iri, Label, Ontology, Property, PropertyKind},
};

pub const X: &str = "https://example.org/chain#X";
pub const Y: &str = "https://example.org/chain#Y";
pub const Z: &str = "https://example.org/chain#Z";
pub const P: &str = "https://example.org/chain#p";

pub const A: &str = "https://example.org/cycle#A";
pub const B: &str = "https://example.org/cycle#B";
pub const C: &str = "https://example.org/cycle#C";
pub const D: &str = "https://example.org/cycle#D";

pub const SUB: &str = "https://example.org/competing#Sub";
pub const SUPER: &str = "https://example.org/competing#Super";
pub const Q: &str = "https://example.org/competing#q";

pub const TARGET: &str = "https://example.org/numbered#Target";
pub const SOURCE: &str = "https://example.org/numbered#C";
pub const SOURCE_1: &str = "https://example.org/numbered#C1";

pub const PEOPLE_NS: &str = "https://example.org/people#";
pub const AGENT: &str = "https://example.org/people#Agent";
pub const PERSON: &str = "https://example.org/people#Person";
pub const EMPLOYEE: &str = "https://example.org/people#Employee";
pub const ORGANIZATION: &str = "https://example.org/people#Organization";
pub const WORKS_FOR: &str = "https://example.org/people#worksFor";
pub const EMPLOYS: &str = "https://example.org/people#employs";
pub const KNOWS: &str = "https://example.org/people#knows";
pub const OWNS: &str = "https://example.org/people#owns";
pub const RELATED: &str = "https://example.org/people#related";
pub const NAME: &str = "https://example.org/people#name";

fn iri(uri: &str) -> Iri {
    Iri::new(uri).expect("fixture iri")
}

fn class(uri: &str) -> Class {
    Class::new(iri(uri))
}

fn object(uri: &str, domain: Option<&str>, range: Option<&str>) -> Property {
    Property::object(iri(uri), domain.map(iri), range.map(iri))
}

/// `X subClassOf Y`, `p: Z -> Y`.
#[must_use]
pub fn end_to_end_oracle() -> InMemoryOracle {
    let mut ontology = Ontology::new(iri("https://example.org/chain"));
    ontology.add_prefix("chain", "https://example.org/chain#");
    ontology.add_class(class(Y)).expect("Y");
    ontology.add_class(class(X).with_parent(iri(Y))).expect("X");
    ontology.add_class(class(Z)).expect("Z");
    ontology
        .add_property(object(P, Some(Z), Some(Y)))
        .expect("p");
    InMemoryOracle::new(ontology)
}

/// `p1: B -> A`, `p2: C -> B`, `p3: A -> C`, `C subClassOf D`.
#[must_use]
pub fn cyclic_oracle() -> InMemoryOracle {
    let mut ontology = Ontology::new(iri("https://example.org/cycle"));
    for uri in [A, B, D] {
        ontology.add_class(class(uri)).expect("class");
    }
    ontology.add_class(class(C).with_parent(iri(D))).expect("C");
    for (uri, domain, range) in [
        ("https://example.org/cycle#p1", B, A),
        ("https://example.org/cycle#p2", C, B),
        ("https://example.org/cycle#p3", A, C),
    ] {
        ontology
            .add_property(object(uri, Some(domain), Some(range)))
            .expect("property");
    }
    InMemoryOracle::new(ontology)
}

/// `Sub subClassOf Super` and `q: Sub -> Super`.
#[must_use]
pub fn competing_oracle() -> InMemoryOracle {
    let mut ontology = Ontology::new(iri("https://example.org/competing"));
    ontology.add_class(class(SUPER)).expect("Super");
    ontology
        .add_class(class(SUB).with_parent(iri(SUPER)))
        .expect("Sub");
    ontology
        .add_property(object(Q, Some(SUB), Some(SUPER)))
        .expect("q");
    InMemoryOracle::new(ontology)
}

/// Classes whose URIs differ only by a trailing digit: `C`, `C1` and
/// `Target`, with `p: C -> Target`.
#[must_use]
pub fn numbered_oracle() -> InMemoryOracle {
    let mut ontology = Ontology::new(iri("https://example.org/numbered"));
    for uri in [TARGET, SOURCE, SOURCE_1] {
        ontology.add_class(class(uri)).expect("class");
    }
    ontology
        .add_property(object(
            "https://example.org/numbered#p",
            Some(SOURCE),
            Some(TARGET),
        ))
        .expect("p");
    InMemoryOracle::new(ontology)
}

/// `Employee subClassOf Person subClassOf Agent`, `Organization`, with
/// `worksFor: Person -> Organization`, `employs: Organization -> Person`,
/// `knows: _ -> Person`, `owns: Agent -> _`, `related: _ -> _` and the data
/// property `name` on `Agent`.
#[must_use]
pub fn people_oracle() -> InMemoryOracle {
    let mut ontology = Ontology::new(iri("https://example.org/people"));
    ontology.add_prefix("people", PEOPLE_NS);
    ontology.add_class(class(AGENT)).expect("Agent");
    ontology
        .add_class(class(PERSON).with_parent(iri(AGENT)))
        .expect("Person");
    ontology
        .add_class(class(EMPLOYEE).with_parent(iri(PERSON)))
        .expect("Employee");
    ontology.add_class(class(ORGANIZATION)).expect("Organization");

    for property in [
        object(WORKS_FOR, Some(PERSON), Some(ORGANIZATION)),
        object(EMPLOYS, Some(ORGANIZATION), Some(PERSON)),
        object(KNOWS, None, Some(PERSON)),
        object(OWNS, Some(AGENT), None),
        object(RELATED, None, None),
    ] {
        ontology.add_property(property).expect("object property");
    }

    let mut name = Property::new(iri(NAME), PropertyKind::Data);
    name.add_domain(iri(AGENT));
    ontology.add_property(name).expect("name");

    InMemoryOracle::new(ontology)
}

/// Builder with default settings over `oracle`.
#[must_use]
pub fn builder(oracle: InMemoryOracle) -> GraphBuilder {
    builder_with(oracle, ModelingSettings::default())
}

#[must_use]
pub fn builder_with(oracle: InMemoryOracle, settings: ModelingSettings) -> GraphBuilder {
    GraphBuilder::new(Arc::new(oracle), settings)
}

/// Settings with closure materialization and link synthesis turned off.
#[must_use]
pub fn manual_settings() -> ModelingSettings {
    ModelingSettings {
        ontology_alignment: false,
        node_closure: false,
        ..ModelingSettings::default()
    }
}

/// A class node for `uri` with the next free id.
pub fn class_node(builder: &mut GraphBuilder, uri: &str) -> Node {
    Node::class(builder.new_node_id(uri), Label::new(uri))
}
