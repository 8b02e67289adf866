use std::collections::{BTreeSet, VecDeque};

use super::{
    entities::{Ontology, Property},
    oracle::{OntologyOracle, OracleError},
    value_objects::{vocab, Iri, Label},
};

/// Oracle answering every query from an in-memory [`Ontology`] aggregate.
///
/// Hierarchy queries walk the declared superclass relations breadth first;
/// `owl:Thing` and `rdfs:subClassOf` are always known terms.
#[derive(Clone, Debug)]
pub struct InMemoryOracle {
    ontology: Ontology,
}

impl InMemoryOracle {
    #[must_use]
    pub fn new(ontology: Ontology) -> Self {
        Self { ontology }
    }

    #[must_use]
    pub fn ontology(&self) -> &Ontology {
        &self.ontology
    }

    fn ensure_class(&self, uri: &str) -> Result<(), OracleError> {
        if uri == vocab::OWL_THING || self.ontology.class(uri).is_some() {
            Ok(())
        } else {
            Err(OracleError::UnknownTerm {
                uri: uri.to_string(),
            })
        }
    }

    fn ancestors(&self, uri: &str) -> BTreeSet<String> {
        let mut visited = BTreeSet::new();
        let mut to_visit: VecDeque<String> = self
            .ontology
            .class(uri)
            .map(|class| class.parents().iter().map(ToString::to_string).collect())
            .unwrap_or_default();

        while let Some(current) = to_visit.pop_front() {
            if visited.insert(current.clone()) {
                if let Some(parent) = self.ontology.class(&current) {
                    to_visit.extend(parent.parents().iter().map(ToString::to_string));
                }
            }
        }

        visited
    }

    fn descendants(&self, uri: &str) -> BTreeSet<String> {
        let mut visited = BTreeSet::new();
        let mut to_visit = VecDeque::from([uri.to_string()]);

        while let Some(current) = to_visit.pop_front() {
            for (id, candidate) in self.ontology.classes() {
                if candidate.parents().iter().any(|p| p.as_str() == current)
                    && visited.insert(id.to_string())
                {
                    to_visit.push_back(id.to_string());
                }
            }
        }

        visited
    }

    /// `declared` is `class` itself or one of its ancestors.
    fn covers(&self, declared: &str, class: &str) -> bool {
        declared == class || self.ancestors(class).contains(declared)
    }

    fn any_covers<'a>(&self, declared: impl IntoIterator<Item = &'a str>, class: &str) -> bool {
        let ancestors = self.ancestors(class);
        declared
            .into_iter()
            .any(|candidate| candidate == class || ancestors.contains(candidate))
    }

    fn select<F>(&self, predicate: F) -> BTreeSet<String>
    where
        F: Fn(&Property) -> bool,
    {
        self.ontology
            .object_properties()
            .filter(|property| predicate(*property))
            .map(|property| property.id().to_string())
            .collect()
    }
}

fn iris(set: &BTreeSet<Iri>) -> impl Iterator<Item = &str> {
    set.iter().map(Iri::as_str)
}

impl OntologyOracle for InMemoryOracle {
    fn uri_label(&self, uri: &str) -> Option<Label> {
        match uri {
            vocab::OWL_THING => {
                return Some(Label::new(uri).with_ns(vocab::OWL_NS).with_prefix("owl"))
            }
            vocab::RDFS_SUBCLASS_OF => {
                return Some(Label::new(uri).with_ns(vocab::RDFS_NS).with_prefix("rdfs"))
            }
            _ => {}
        }

        let iri = self
            .ontology
            .class(uri)
            .map(|class| class.id())
            .or_else(|| self.ontology.property(uri).map(|property| property.id()))?;

        let mut label = Label::from(iri);
        if let Some(prefix) = self.ontology.prefix_of(iri.namespace()) {
            label = label.with_prefix(prefix);
        }
        Some(label)
    }

    fn is_subclass(&self, child: &str, parent: &str, recursive: bool) -> bool {
        if recursive {
            return self.ancestors(child).contains(parent);
        }
        self.ontology
            .class(child)
            .is_some_and(|class| class.parents().iter().any(|p| p.as_str() == parent))
    }

    fn super_classes(&self, uri: &str, recursive: bool) -> Result<BTreeSet<String>, OracleError> {
        self.ensure_class(uri)?;
        if recursive {
            return Ok(self.ancestors(uri));
        }
        Ok(self
            .ontology
            .class(uri)
            .map(|class| class.parents().iter().map(ToString::to_string).collect())
            .unwrap_or_default())
    }

    fn domains_given_range(
        &self,
        range: &str,
        include_subclasses: bool,
    ) -> Result<BTreeSet<String>, OracleError> {
        self.ensure_class(range)?;

        let mut domains = BTreeSet::new();
        for property in self.ontology.object_properties() {
            if iris(property.ranges()).any(|candidate| candidate == range) {
                domains.extend(iris(property.domains()).map(ToString::to_string));
            }
        }

        if include_subclasses {
            let children: Vec<String> = domains
                .iter()
                .flat_map(|domain| self.descendants(domain))
                .collect();
            domains.extend(children);
        }

        Ok(domains)
    }

    fn object_properties_direct(&self, domain: &str, range: &str) -> BTreeSet<String> {
        self.select(|property| {
            iris(property.domains()).any(|candidate| candidate == domain)
                && iris(property.ranges()).any(|candidate| candidate == range)
        })
    }

    fn object_properties_indirect(&self, domain: &str, range: &str) -> BTreeSet<String> {
        let direct = self.object_properties_direct(domain, range);
        self.select(|property| {
            !direct.contains(property.id().as_str())
                && !property.domains().is_empty()
                && !property.ranges().is_empty()
                && self.any_covers(iris(property.domains()), domain)
                && self.any_covers(iris(property.ranges()), range)
        })
    }

    fn object_properties_with_only_domain(&self, domain: &str) -> BTreeSet<String> {
        self.select(|property| {
            property.ranges().is_empty()
                && iris(property.domains()).any(|candidate| self.covers(candidate, domain))
        })
    }

    fn object_properties_with_only_range(&self, range: &str) -> BTreeSet<String> {
        self.select(|property| {
            property.domains().is_empty()
                && iris(property.ranges()).any(|candidate| self.covers(candidate, range))
        })
    }

    fn object_properties_without_domain_and_range(&self) -> BTreeSet<String> {
        self.select(|property| property.domains().is_empty() && property.ranges().is_empty())
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use super::InMemoryOracle;
    use crate::ontology::{
        entities::{Class, Ontology, Property},
        oracle::{OntologyOracle, OracleError, PropertyShape},
        value_objects::{vocab, Iri},
    };

    const NS: &str = "https://example.org/onto#";

    fn iri(local: &str) -> Iri {
        Iri::new(format!("{NS}{local}")).expect("valid iri")
    }

    fn uri(local: &str) -> String {
        format!("{NS}{local}")
    }

    fn set(items: &[&str]) -> BTreeSet<String> {
        items.iter().map(|local| uri(local)).collect()
    }

    /// Agent <- Person <- Employee; Organization.
    /// worksFor: Person -> Organization, employs: Organization -> Person,
    /// knows: (none) -> Person, owns: Agent -> (none), related: (none) -> (none).
    fn oracle() -> InMemoryOracle {
        let mut ontology = Ontology::new(Iri::new("https://example.org/onto").expect("iri"));
        ontology.add_prefix("ex", NS);
        ontology.add_class(Class::new(iri("Agent"))).expect("agent");
        ontology
            .add_class(Class::new(iri("Person")).with_parent(iri("Agent")))
            .expect("person");
        ontology
            .add_class(Class::new(iri("Employee")).with_parent(iri("Person")))
            .expect("employee");
        ontology
            .add_class(Class::new(iri("Organization")))
            .expect("organization");

        for property in [
            Property::object(iri("worksFor"), Some(iri("Person")), Some(iri("Organization"))),
            Property::object(iri("employs"), Some(iri("Organization")), Some(iri("Person"))),
            Property::object(iri("knows"), None, Some(iri("Person"))),
            Property::object(iri("owns"), Some(iri("Agent")), None),
            Property::object(iri("related"), None, None),
        ] {
            ontology.add_property(property).expect("property");
        }

        InMemoryOracle::new(ontology)
    }

    #[test]
    fn labels_carry_namespace_and_prefix() {
        let oracle = oracle();
        let label = oracle.uri_label(&uri("Person")).expect("known class");
        assert_eq!(label.ns(), Some(NS));
        assert_eq!(label.prefix(), Some("ex"));
        assert!(oracle.uri_label(vocab::OWL_THING).is_some());
        assert!(oracle.uri_label(vocab::RDFS_SUBCLASS_OF).is_some());
        assert!(oracle.uri_label(&uri("Unknown")).is_none());
    }

    #[test]
    fn hierarchy_queries_follow_parents() {
        let oracle = oracle();
        assert!(oracle.is_subclass(&uri("Employee"), &uri("Person"), false));
        assert!(!oracle.is_subclass(&uri("Employee"), &uri("Agent"), false));
        assert!(oracle.is_subclass(&uri("Employee"), &uri("Agent"), true));
        assert_eq!(
            oracle.super_classes(&uri("Employee"), true).expect("known"),
            set(&["Agent", "Person"])
        );
        assert_eq!(
            oracle.super_classes(&uri("Employee"), false).expect("known"),
            set(&["Person"])
        );
    }

    #[test]
    fn closure_queries_reject_unknown_terms() {
        let oracle = oracle();
        let err = oracle
            .domains_given_range(&uri("Unknown"), true)
            .expect_err("unknown class");
        assert!(matches!(err, OracleError::UnknownTerm { .. }));
    }

    #[test]
    fn domains_given_range_expands_subclasses() {
        let oracle = oracle();
        assert_eq!(
            oracle
                .domains_given_range(&uri("Organization"), true)
                .expect("known"),
            set(&["Employee", "Person"])
        );
        assert_eq!(
            oracle
                .domains_given_range(&uri("Organization"), false)
                .expect("known"),
            set(&["Person"])
        );
    }

    #[test]
    fn properties_are_classified_by_shape() {
        let oracle = oracle();
        let person = uri("Person");
        let employee = uri("Employee");
        let organization = uri("Organization");

        assert_eq!(
            oracle.object_properties_direct(&person, &organization),
            set(&["worksFor"])
        );
        assert!(oracle
            .object_properties_direct(&employee, &organization)
            .is_empty());
        assert_eq!(
            oracle.object_properties_indirect(&employee, &organization),
            set(&["worksFor"])
        );
        assert_eq!(
            oracle.object_properties_with_only_domain(&employee),
            set(&["owns"])
        );
        assert_eq!(
            oracle.object_properties_with_only_range(&employee),
            set(&["knows"])
        );
        assert_eq!(
            oracle.object_properties_without_domain_and_range(),
            set(&["related"])
        );
        assert_eq!(
            oracle.object_property_type(&employee, &organization, &uri("worksFor")),
            Some(PropertyShape::Indirect)
        );
        assert_eq!(
            oracle.object_property_type(&organization, &employee, &uri("worksFor")),
            None
        );
    }

    #[test]
    fn possible_uris_include_subclass_relation() {
        let oracle = oracle();
        let uris = oracle.possible_uris(&uri("Employee"), &uri("Agent"));
        assert!(uris.contains(vocab::RDFS_SUBCLASS_OF));
        assert!(uris.contains(&uri("owns")));
        assert!(uris.contains(&uri("related")));
        assert!(!uris.contains(&uri("worksFor")));
    }
}
