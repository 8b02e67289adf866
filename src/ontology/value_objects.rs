use std::borrow::Borrow;
use std::fmt::{self, Display, Formatter};
use std::str::FromStr;

use oxrdf::NamedNode;
use thiserror::Error;

/// Well-known vocabulary URIs used by the graph engine.
pub mod vocab {
    /// Root class of every OWL ontology.
    pub const OWL_THING: &str = "http://www.w3.org/2002/07/owl#Thing";
    /// Relation URI carried by subclass links.
    pub const RDFS_SUBCLASS_OF: &str = "http://www.w3.org/2000/01/rdf-schema#subClassOf";
    /// Relation URI used to derive ids of compact object property links.
    pub const DEFAULT_LINK: &str = "urn:alignment-graph:defaultLink";

    pub const OWL_NS: &str = "http://www.w3.org/2002/07/owl#";
    pub const RDFS_NS: &str = "http://www.w3.org/2000/01/rdf-schema#";
}

/// Value object ensuring that supplied text represents a valid IRI.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Iri {
    value: String,
}

impl Iri {
    /// Validates and constructs a new [`Iri`] value object.
    ///
    /// The constructor rejects malformed identifiers in order to guarantee that
    /// every ontology term uses canonical identifiers.
    pub fn new(value: impl Into<String>) -> Result<Self, IriError> {
        let value = value.into();
        NamedNode::new(value.as_str()).map_err(|_| IriError::Invalid {
            value: value.clone(),
        })?;
        Ok(Self { value })
    }

    /// Returns the underlying textual representation.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.value
    }

    /// Splits the IRI after its last `#` or `/`, returning the namespace part.
    #[must_use]
    pub fn namespace(&self) -> &str {
        split_namespace(&self.value).0
    }

    /// Returns the part of the IRI following its namespace.
    #[must_use]
    pub fn local_name(&self) -> &str {
        split_namespace(&self.value).1
    }
}

impl Display for Iri {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(&self.value)
    }
}

impl FromStr for Iri {
    type Err = IriError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s.to_owned())
    }
}

impl TryFrom<String> for Iri {
    type Error = IriError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl Borrow<str> for Iri {
    fn borrow(&self) -> &str {
        &self.value
    }
}

impl AsRef<str> for Iri {
    fn as_ref(&self) -> &str {
        &self.value
    }
}

/// Errors produced when validating an [`Iri`].
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum IriError {
    /// The provided text could not be parsed as an IRI.
    #[error("invalid IRI: {value}")]
    Invalid { value: String },
}

fn split_namespace(value: &str) -> (&str, &str) {
    value
        .rfind(['#', '/'])
        .map_or(("", value), |index| value.split_at(index + 1))
}

/// Relation or class label: the URI plus the namespace and prefix the ontology
/// declares for it.
///
/// Column nodes use labels too, in which case the URI is an opaque column
/// identifier and carries no namespace.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Label {
    uri: String,
    ns: Option<String>,
    prefix: Option<String>,
}

impl Label {
    #[must_use]
    pub fn new(uri: impl Into<String>) -> Self {
        Self {
            uri: uri.into(),
            ns: None,
            prefix: None,
        }
    }

    #[must_use]
    pub fn with_ns(mut self, ns: impl Into<String>) -> Self {
        self.ns = Some(ns.into());
        self
    }

    #[must_use]
    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = Some(prefix.into());
        self
    }

    #[must_use]
    pub fn uri(&self) -> &str {
        &self.uri
    }

    #[must_use]
    pub fn ns(&self) -> Option<&str> {
        self.ns.as_deref()
    }

    #[must_use]
    pub fn prefix(&self) -> Option<&str> {
        self.prefix.as_deref()
    }

    /// Copies namespace and prefix from the label the ontology reports for the
    /// same URI.
    pub fn enrich_from(&mut self, other: &Self) {
        self.ns.clone_from(&other.ns);
        self.prefix.clone_from(&other.prefix);
    }

    /// Short `prefix:local` form, falling back to the full URI.
    #[must_use]
    pub fn display_name(&self) -> String {
        match (&self.prefix, &self.ns) {
            (Some(prefix), Some(ns)) if self.uri.starts_with(ns.as_str()) => {
                format!("{prefix}:{}", &self.uri[ns.len()..])
            }
            _ => self.uri.clone(),
        }
    }
}

impl From<&Iri> for Label {
    fn from(iri: &Iri) -> Self {
        Self::new(iri.as_str()).with_ns(iri.namespace())
    }
}
