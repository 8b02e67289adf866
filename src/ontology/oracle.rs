use std::collections::BTreeSet;
use std::fmt::{self, Display, Formatter};

use thiserror::Error;

use super::value_objects::{vocab, Label};

/// Classification of an object property relative to a (source, target) class
/// pair.
///
/// Variants are listed from the most to the least specific evidence.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum PropertyShape {
    /// The property's domain and range are exactly the two classes.
    Direct,
    /// Domain and range match through the subclass hierarchy.
    Indirect,
    /// The property declares a domain but no range.
    DomainOnly,
    /// The property declares a range but no domain.
    RangeOnly,
    /// The property declares neither domain nor range.
    Neither,
}

impl Display for PropertyShape {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Direct => "direct",
            Self::Indirect => "indirect",
            Self::DomainOnly => "domain-only",
            Self::RangeOnly => "range-only",
            Self::Neither => "neither",
        };
        f.write_str(name)
    }
}

/// Errors reported by an oracle that cannot answer a closure query.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum OracleError {
    /// The oracle does not know the supplied term.
    #[error("ontology term `{uri}` is unknown to the oracle")]
    UnknownTerm { uri: String },
    /// The oracle state contradicts an earlier answer.
    #[error("ontology oracle is inconsistent for `{uri}`: {reason}")]
    Inconsistent { uri: String, reason: String },
}

/// Read-only ontology knowledge consulted by the graph builder.
///
/// Implementors must answer consistently for the lifetime of a modeling
/// session: the builder caches closures derived from these answers and only
/// recomputes them on an explicit reset.
///
/// Set-returning queries use ordered sets so that edge synthesis and
/// frequency fallbacks are deterministic.
pub trait OntologyOracle {
    /// Returns the label (namespace and prefix) of a class or property URI, or
    /// `None` when the term is not part of the ontology.
    fn uri_label(&self, uri: &str) -> Option<Label>;

    /// Tests whether `child` is a subclass of `parent`, optionally through the
    /// transitive hierarchy.
    fn is_subclass(&self, child: &str, parent: &str, recursive: bool) -> bool;

    /// Superclasses of `uri`, direct only unless `recursive`.
    fn super_classes(&self, uri: &str, recursive: bool) -> Result<BTreeSet<String>, OracleError>;

    /// Domains of every object property whose range includes `range`, expanded
    /// with their subclasses when `include_subclasses` is set.
    fn domains_given_range(
        &self,
        range: &str,
        include_subclasses: bool,
    ) -> Result<BTreeSet<String>, OracleError>;

    /// Object properties whose declared domain and range are exactly the pair.
    fn object_properties_direct(&self, domain: &str, range: &str) -> BTreeSet<String>;

    /// Object properties connecting the pair through the subclass hierarchy,
    /// excluding the direct ones.
    fn object_properties_indirect(&self, domain: &str, range: &str) -> BTreeSet<String>;

    /// Object properties without a range whose domain covers `domain`.
    fn object_properties_with_only_domain(&self, domain: &str) -> BTreeSet<String>;

    /// Object properties without a domain whose range covers `range`.
    fn object_properties_with_only_range(&self, range: &str) -> BTreeSet<String>;

    /// Object properties declaring neither domain nor range.
    fn object_properties_without_domain_and_range(&self) -> BTreeSet<String>;

    fn is_connected_by_direct_property(&self, source: &str, target: &str) -> bool {
        !self.object_properties_direct(source, target).is_empty()
    }

    fn is_connected_by_indirect_property(&self, source: &str, target: &str) -> bool {
        !self.object_properties_indirect(source, target).is_empty()
    }

    /// A range-only property can point from `source` to `target`.
    fn is_connected_by_domainless_property(&self, _source: &str, target: &str) -> bool {
        !self.object_properties_with_only_range(target).is_empty()
    }

    /// A domain-only property can point from `source` to `target`.
    fn is_connected_by_rangeless_property(&self, source: &str, _target: &str) -> bool {
        !self.object_properties_with_only_domain(source).is_empty()
    }

    fn is_connected_by_domainless_and_rangeless_property(
        &self,
        _source: &str,
        _target: &str,
    ) -> bool {
        !self.object_properties_without_domain_and_range().is_empty()
    }

    /// Every relation URI that may link `source` to `target`, including
    /// `rdfs:subClassOf` when `source` is a (transitive) subclass of `target`.
    fn possible_uris(&self, source: &str, target: &str) -> BTreeSet<String> {
        let mut uris = self.object_properties_direct(source, target);
        uris.extend(self.object_properties_indirect(source, target));
        uris.extend(self.object_properties_with_only_domain(source));
        uris.extend(self.object_properties_with_only_range(target));
        uris.extend(self.object_properties_without_domain_and_range());
        if self.is_subclass(source, target, true) {
            uris.insert(vocab::RDFS_SUBCLASS_OF.to_string());
        }
        uris
    }

    /// Shape of `property` relative to the pair, or `None` when it cannot link
    /// them.
    fn object_property_type(
        &self,
        source: &str,
        target: &str,
        property: &str,
    ) -> Option<PropertyShape> {
        if self.object_properties_direct(source, target).contains(property) {
            Some(PropertyShape::Direct)
        } else if self
            .object_properties_indirect(source, target)
            .contains(property)
        {
            Some(PropertyShape::Indirect)
        } else if self
            .object_properties_with_only_domain(source)
            .contains(property)
        {
            Some(PropertyShape::DomainOnly)
        } else if self
            .object_properties_with_only_range(target)
            .contains(property)
        {
            Some(PropertyShape::RangeOnly)
        } else if self
            .object_properties_without_domain_and_range()
            .contains(property)
        {
            Some(PropertyShape::Neither)
        } else {
            None
        }
    }
}

/// Type alias simplifying oracle trait object usage inside the builder.
pub type OracleHandle = dyn OntologyOracle + Send + Sync + 'static;
