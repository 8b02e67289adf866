use std::collections::{BTreeMap, BTreeSet};

use thiserror::Error;

use super::value_objects::Iri;

/// Ontology class definition with its direct superclasses.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Class {
    id: Iri,
    super_classes: BTreeSet<Iri>,
}

impl Class {
    /// Creates a new [`Class`] with the supplied identifier.
    #[must_use]
    pub fn new(id: Iri) -> Self {
        Self {
            id,
            super_classes: BTreeSet::new(),
        }
    }

    /// Declares a direct superclass.
    #[must_use]
    pub fn with_parent(mut self, parent: Iri) -> Self {
        self.super_classes.insert(parent);
        self
    }

    /// Returns the unique identifier of the class.
    #[must_use]
    pub fn id(&self) -> &Iri {
        &self.id
    }

    /// Returns the direct parent classes in lexical order.
    #[must_use]
    pub fn parents(&self) -> &BTreeSet<Iri> {
        &self.super_classes
    }
}

/// Ontology property definition supporting object and data properties.
///
/// Domains and ranges are optional: properties declared without one (or both)
/// are what the graph builder calls domain-only, range-only or unconstrained
/// properties.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Property {
    id: Iri,
    kind: PropertyKind,
    domains: BTreeSet<Iri>,
    ranges: BTreeSet<Iri>,
}

impl Property {
    /// Creates a new property with the provided identifier and kind.
    #[must_use]
    pub fn new(id: Iri, kind: PropertyKind) -> Self {
        Self {
            id,
            kind,
            domains: BTreeSet::new(),
            ranges: BTreeSet::new(),
        }
    }

    /// Shorthand for an object property between `domain` and `range`.
    #[must_use]
    pub fn object(id: Iri, domain: Option<Iri>, range: Option<Iri>) -> Self {
        let mut property = Self::new(id, PropertyKind::Object);
        property.domains.extend(domain);
        property.ranges.extend(range);
        property
    }

    /// Declares that the property applies to the supplied domain class.
    pub fn add_domain(&mut self, class: Iri) -> bool {
        self.domains.insert(class)
    }

    /// Declares that the property produces values from the supplied range class.
    pub fn add_range(&mut self, class: Iri) -> bool {
        self.ranges.insert(class)
    }

    /// Returns the property identifier.
    #[must_use]
    pub fn id(&self) -> &Iri {
        &self.id
    }

    /// Returns the property kind.
    #[must_use]
    pub fn kind(&self) -> PropertyKind {
        self.kind
    }

    /// Returns the registered domain classes.
    #[must_use]
    pub fn domains(&self) -> &BTreeSet<Iri> {
        &self.domains
    }

    /// Returns the registered range classes.
    #[must_use]
    pub fn ranges(&self) -> &BTreeSet<Iri> {
        &self.ranges
    }

    #[must_use]
    pub fn is_object(&self) -> bool {
        self.kind == PropertyKind::Object
    }
}

/// Classifies the type of values a property can hold.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum PropertyKind {
    /// Object properties link class instances.
    Object,
    /// Data properties attach literal values (columns).
    Data,
}

/// Aggregates ontology classes, properties and namespace prefixes.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Ontology {
    id: Iri,
    prefixes: BTreeMap<String, String>,
    classes: BTreeMap<Iri, Class>,
    properties: BTreeMap<Iri, Property>,
}

impl Ontology {
    /// Creates a new ontology aggregate with the supplied identifier.
    #[must_use]
    pub fn new(id: Iri) -> Self {
        Self {
            id,
            prefixes: BTreeMap::new(),
            classes: BTreeMap::new(),
            properties: BTreeMap::new(),
        }
    }

    /// Registers the prefix used to abbreviate terms of `namespace`.
    pub fn add_prefix(&mut self, prefix: impl Into<String>, namespace: impl Into<String>) {
        self.prefixes.insert(namespace.into(), prefix.into());
    }

    /// Adds a class to the ontology, enforcing unique identifiers.
    ///
    /// Parents must already be declared.
    pub fn add_class(&mut self, class: Class) -> Result<(), OntologyError> {
        let id = class.id().clone();
        if self.classes.contains_key(&id) {
            return Err(OntologyError::DuplicateClass(id));
        }
        for parent in class.parents() {
            self.ensure_class(parent)?;
        }
        self.classes.insert(id, class);
        Ok(())
    }

    /// Adds a property to the ontology, validating references to known classes.
    pub fn add_property(&mut self, property: Property) -> Result<(), OntologyError> {
        let id = property.id().clone();
        if self.properties.contains_key(&id) {
            return Err(OntologyError::DuplicateProperty(id));
        }

        for class in property.domains() {
            self.ensure_class(class)?;
        }
        if property.is_object() {
            for class in property.ranges() {
                self.ensure_class(class)?;
            }
        }

        self.properties.insert(id, property);
        Ok(())
    }

    fn ensure_class(&self, class: &Iri) -> Result<(), OntologyError> {
        if self.classes.contains_key(class) {
            Ok(())
        } else {
            Err(OntologyError::MissingClass {
                ontology: self.id.clone(),
                class: class.clone(),
            })
        }
    }

    /// Returns the ontology identifier.
    #[must_use]
    pub fn id(&self) -> &Iri {
        &self.id
    }

    /// Returns the prefix registered for `namespace`.
    #[must_use]
    pub fn prefix_of(&self, namespace: &str) -> Option<&str> {
        self.prefixes.get(namespace).map(String::as_str)
    }

    /// Retrieves a class by identifier.
    #[must_use]
    pub fn class(&self, id: &str) -> Option<&Class> {
        self.classes.get(id)
    }

    /// Retrieves a property by identifier.
    #[must_use]
    pub fn property(&self, id: &str) -> Option<&Property> {
        self.properties.get(id)
    }

    /// Returns all classes ordered by identifier.
    #[must_use]
    pub fn classes(&self) -> &BTreeMap<Iri, Class> {
        &self.classes
    }

    /// Returns all properties ordered by identifier.
    #[must_use]
    pub fn properties(&self) -> &BTreeMap<Iri, Property> {
        &self.properties
    }

    /// Iterates the object properties ordered by identifier.
    pub fn object_properties(&self) -> impl Iterator<Item = &Property> {
        self.properties.values().filter(|property| property.is_object())
    }
}

/// Errors raised when manipulating an ontology aggregate.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum OntologyError {
    /// Attempted to add a class with an existing identifier.
    #[error("class `{0}` already exists")]
    DuplicateClass(Iri),
    /// Attempted to add a property with an existing identifier.
    #[error("property `{0}` already exists")]
    DuplicateProperty(Iri),
    /// Referenced class was not part of the ontology.
    #[error("class `{class}` does not exist in ontology `{ontology}`")]
    MissingClass { ontology: Iri, class: Iri },
}
