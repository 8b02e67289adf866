use std::borrow::Borrow;
use std::collections::BTreeSet;
use std::fmt::{self, Display, Formatter};

use super::ids::link_id;
use crate::ontology::{vocab, Label, PropertyShape};

macro_rules! string_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub struct $name(String);

        impl $name {
            #[must_use]
            pub fn new(value: impl Into<String>) -> Self {
                Self(value.into())
            }

            #[must_use]
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl Display for $name {
            fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl Borrow<str> for $name {
            fn borrow(&self) -> &str {
                &self.0
            }
        }

        impl From<&str> for $name {
            fn from(value: &str) -> Self {
                Self::new(value)
            }
        }
    };
}

string_id!(
    /// Opaque node identity, unique within a graph.
    NodeId
);
string_id!(
    /// Link identity derived from the relation URI and both endpoint ids.
    LinkId
);

/// Coarse node classification used by the by-type index.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum NodeType {
    ClassNode,
    ColumnNode,
}

/// Data attribute carried by a column node.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ColumnNode {
    pub column_name: String,
    pub literal_type: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum NodeKind {
    /// Instance of an ontology class.
    Class,
    /// A source column mapped onto a class through a data property.
    Column(ColumnNode),
}

/// Graph vertex. The label URI is the ontology class for class nodes and an
/// opaque column identifier for column nodes.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Node {
    id: NodeId,
    label: Label,
    kind: NodeKind,
    forced: bool,
    model_ids: BTreeSet<String>,
}

impl Node {
    #[must_use]
    pub fn class(id: NodeId, label: Label) -> Self {
        Self {
            id,
            label,
            kind: NodeKind::Class,
            forced: false,
            model_ids: BTreeSet::new(),
        }
    }

    #[must_use]
    pub fn column(id: NodeId, column_name: impl Into<String>) -> Self {
        let label = Label::new(id.as_str());
        Self {
            id,
            label,
            kind: NodeKind::Column(ColumnNode {
                column_name: column_name.into(),
                literal_type: None,
            }),
            forced: false,
            model_ids: BTreeSet::new(),
        }
    }

    /// Sets the literal datatype of a column node; ignored for class nodes.
    #[must_use]
    pub fn with_literal_type(mut self, literal_type: impl Into<String>) -> Self {
        if let NodeKind::Column(column) = &mut self.kind {
            column.literal_type = Some(literal_type.into());
        }
        self
    }

    /// Marks the node as pinned by the user.
    #[must_use]
    pub fn forced(mut self) -> Self {
        self.forced = true;
        self
    }

    #[must_use]
    pub fn with_model_ids<I, S>(mut self, model_ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.model_ids.extend(model_ids.into_iter().map(Into::into));
        self
    }

    #[must_use]
    pub fn id(&self) -> &NodeId {
        &self.id
    }

    #[must_use]
    pub fn label(&self) -> &Label {
        &self.label
    }

    pub(crate) fn label_mut(&mut self) -> &mut Label {
        &mut self.label
    }

    #[must_use]
    pub fn uri(&self) -> &str {
        self.label.uri()
    }

    #[must_use]
    pub fn kind(&self) -> &NodeKind {
        &self.kind
    }

    #[must_use]
    pub fn node_type(&self) -> NodeType {
        match self.kind {
            NodeKind::Class => NodeType::ClassNode,
            NodeKind::Column(_) => NodeType::ColumnNode,
        }
    }

    #[must_use]
    pub fn is_class(&self) -> bool {
        matches!(self.kind, NodeKind::Class)
    }

    #[must_use]
    pub fn is_column(&self) -> bool {
        matches!(self.kind, NodeKind::Column(_))
    }

    #[must_use]
    pub fn is_forced(&self) -> bool {
        self.forced
    }

    #[must_use]
    pub fn model_ids(&self) -> &BTreeSet<String> {
        &self.model_ids
    }
}

/// Coarse link classification used by the by-type index and as a filter for
/// candidate enumeration.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum LinkType {
    ObjectProperty,
    DataProperty,
    SubClass,
    CompactObjectProperty,
    CompactSubClass,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum LinkKind {
    ObjectProperty(PropertyShape),
    DataProperty,
    SubClass,
    /// Traversal-only edge produced by link synthesis.
    CompactObjectProperty(PropertyShape),
    /// Traversal-only subclass edge produced by link synthesis.
    CompactSubClass,
}

impl LinkKind {
    #[must_use]
    pub fn link_type(self) -> LinkType {
        match self {
            Self::ObjectProperty(_) => LinkType::ObjectProperty,
            Self::DataProperty => LinkType::DataProperty,
            Self::SubClass => LinkType::SubClass,
            Self::CompactObjectProperty(_) => LinkType::CompactObjectProperty,
            Self::CompactSubClass => LinkType::CompactSubClass,
        }
    }

    #[must_use]
    pub fn is_compact(self) -> bool {
        matches!(self, Self::CompactObjectProperty(_) | Self::CompactSubClass)
    }

    #[must_use]
    pub fn shape(self) -> Option<PropertyShape> {
        match self {
            Self::ObjectProperty(shape) | Self::CompactObjectProperty(shape) => Some(shape),
            _ => None,
        }
    }
}

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum LinkStatus {
    #[default]
    Normal,
    PreferredByUi,
    ForcedByUser,
}

/// Directed, weighted graph edge.
///
/// Links reference their endpoints by id; the builder owns the canonical copy
/// and hands out borrows or detached clones.
#[derive(Clone, Debug, PartialEq)]
pub struct Link {
    id: LinkId,
    source: NodeId,
    target: NodeId,
    label: Label,
    kind: LinkKind,
    status: LinkStatus,
    weight: f64,
    model_ids: BTreeSet<String>,
}

impl Link {
    fn build(source: NodeId, target: NodeId, label: Label, kind: LinkKind) -> Self {
        let relation = match kind {
            LinkKind::CompactObjectProperty(_) | LinkKind::CompactSubClass => vocab::DEFAULT_LINK,
            _ => label.uri(),
        };
        Self {
            id: link_id(relation, &source, &target),
            source,
            target,
            label,
            kind,
            status: LinkStatus::Normal,
            weight: 0.0,
            model_ids: BTreeSet::new(),
        }
    }

    #[must_use]
    pub fn object_property(
        source: NodeId,
        target: NodeId,
        uri: impl Into<String>,
        shape: PropertyShape,
    ) -> Self {
        Self::build(
            source,
            target,
            Label::new(uri),
            LinkKind::ObjectProperty(shape),
        )
    }

    /// Class node to column node link.
    #[must_use]
    pub fn data_property(source: NodeId, target: NodeId, uri: impl Into<String>) -> Self {
        Self::build(source, target, Label::new(uri), LinkKind::DataProperty)
    }

    #[must_use]
    pub fn sub_class(source: NodeId, target: NodeId) -> Self {
        Self::build(
            source,
            target,
            Label::new(vocab::RDFS_SUBCLASS_OF),
            LinkKind::SubClass,
        )
    }

    #[must_use]
    pub fn compact_object_property(source: NodeId, target: NodeId, shape: PropertyShape) -> Self {
        Self::build(
            source,
            target,
            Label::new(vocab::DEFAULT_LINK),
            LinkKind::CompactObjectProperty(shape),
        )
    }

    #[must_use]
    pub fn compact_sub_class(source: NodeId, target: NodeId) -> Self {
        Self::build(
            source,
            target,
            Label::new(vocab::RDFS_SUBCLASS_OF),
            LinkKind::CompactSubClass,
        )
    }

    #[must_use]
    pub fn with_status(mut self, status: LinkStatus) -> Self {
        self.status = status;
        self
    }

    #[must_use]
    pub fn with_model_ids<I, S>(mut self, model_ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.model_ids.extend(model_ids.into_iter().map(Into::into));
        self
    }

    /// Same relation, status, weight and provenance between other endpoints,
    /// with a re-derived id.
    #[must_use]
    pub fn copy_between(&self, source: NodeId, target: NodeId) -> Self {
        let mut copy = Self::build(source, target, self.label.clone(), self.kind);
        copy.status = self.status;
        copy.weight = self.weight;
        copy.model_ids.clone_from(&self.model_ids);
        copy
    }

    #[must_use]
    pub fn id(&self) -> &LinkId {
        &self.id
    }

    #[must_use]
    pub fn source(&self) -> &NodeId {
        &self.source
    }

    #[must_use]
    pub fn target(&self) -> &NodeId {
        &self.target
    }

    #[must_use]
    pub fn label(&self) -> &Label {
        &self.label
    }

    pub(crate) fn label_mut(&mut self) -> &mut Label {
        &mut self.label
    }

    #[must_use]
    pub fn uri(&self) -> &str {
        self.label.uri()
    }

    #[must_use]
    pub fn kind(&self) -> LinkKind {
        self.kind
    }

    #[must_use]
    pub fn link_type(&self) -> LinkType {
        self.kind.link_type()
    }

    #[must_use]
    pub fn is_compact(&self) -> bool {
        self.kind.is_compact()
    }

    #[must_use]
    pub fn status(&self) -> LinkStatus {
        self.status
    }

    pub(crate) fn set_status(&mut self, status: LinkStatus) {
        self.status = status;
    }

    /// Current edge weight; zero until the link has been added to a graph.
    #[must_use]
    pub fn weight(&self) -> f64 {
        self.weight
    }

    pub(crate) fn set_weight(&mut self, weight: f64) {
        self.weight = weight;
    }

    #[must_use]
    pub fn model_ids(&self) -> &BTreeSet<String> {
        &self.model_ids
    }
}

#[cfg(test)]
mod tests {
    use super::{Link, LinkKind, LinkStatus, LinkType, Node, NodeId, NodeType};
    use crate::ontology::{vocab, Label, PropertyShape};

    #[test]
    fn compact_links_share_the_default_relation_in_their_id() {
        let link = Link::compact_object_property(
            NodeId::new("ex:A1"),
            NodeId::new("ex:B1"),
            PropertyShape::Indirect,
        );
        assert!(link.is_compact());
        assert_eq!(link.uri(), vocab::DEFAULT_LINK);
        assert_eq!(
            link.id().as_str(),
            format!("ex:A1---{}---ex:B1", vocab::DEFAULT_LINK)
        );
        assert_eq!(link.kind().shape(), Some(PropertyShape::Indirect));
        assert_eq!(link.link_type(), LinkType::CompactObjectProperty);
    }

    #[test]
    fn copy_between_rederives_the_id() {
        let original = Link::object_property(
            NodeId::new("ex:A1"),
            NodeId::new("ex:B1"),
            "ex:p",
            PropertyShape::Direct,
        )
        .with_status(LinkStatus::ForcedByUser)
        .with_model_ids(["m1"]);

        let copy = original.copy_between(NodeId::new("ex:A2"), NodeId::new("ex:B1"));
        assert_eq!(copy.id().as_str(), "ex:A2---ex:p---ex:B1");
        assert_eq!(copy.kind(), LinkKind::ObjectProperty(PropertyShape::Direct));
        assert_eq!(copy.status(), LinkStatus::ForcedByUser);
        assert_eq!(copy.model_ids(), original.model_ids());
    }

    #[test]
    fn node_variants_report_their_type() {
        let class = Node::class(NodeId::new("ex:A1"), Label::new("ex:A")).forced();
        assert_eq!(class.node_type(), NodeType::ClassNode);
        assert!(class.is_forced());

        let column = Node::column(NodeId::new("HN1"), "name").with_literal_type("xsd:string");
        assert_eq!(column.node_type(), NodeType::ColumnNode);
        assert_eq!(column.uri(), "HN1");
    }
}
