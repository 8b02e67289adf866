use std::collections::{BTreeMap, BTreeSet};
use std::fmt::{self, Display, Formatter};

use tracing::debug;

use super::error::GraphError;
use crate::ontology::{vocab, OntologyOracle};

/// Shape of a co-occurrence counter key, from the most to the least specific.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum FrequencyKey {
    DomainLinkRange {
        domain: String,
        link: String,
        range: String,
    },
    RangeLink {
        range: String,
        link: String,
    },
    DomainLink {
        domain: String,
        link: String,
    },
    Link {
        link: String,
    },
}

impl Display for FrequencyKey {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::DomainLinkRange {
                domain,
                link,
                range,
            } => write!(f, "domain:{domain},link:{link},range:{range}"),
            Self::RangeLink { range, link } => write!(f, "range:{range},link:{link}"),
            Self::DomainLink { domain, link } => write!(f, "domain:{domain},link:{link}"),
            Self::Link { link } => write!(f, "link:{link}"),
        }
    }
}

/// How [`LinkFrequency::link_uri`] was picked.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum SelectionType {
    /// Counted with domain, relation and range.
    DomainLinkRange,
    /// Counted with relation and range.
    LinkRange,
    /// Counted with domain and relation.
    DomainLink,
    /// Counted by relation alone.
    Link,
    FallbackDirect,
    FallbackIndirect,
    FallbackWithOnlyRange,
    FallbackWithOnlyDomain,
    FallbackWithoutDomainAndRange,
    FallbackSubClass,
}

impl SelectionType {
    /// `true` when no counter backed the selection.
    #[must_use]
    pub fn is_fallback(self) -> bool {
        !matches!(
            self,
            Self::DomainLinkRange | Self::LinkRange | Self::DomainLink | Self::Link
        )
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LinkFrequency {
    pub link_uri: String,
    pub selection: SelectionType,
    pub count: usize,
}

/// Session-scoped co-occurrence counters. Counters only ever grow.
#[derive(Clone, Debug, Default)]
pub struct LinkFrequencies {
    counts: BTreeMap<FrequencyKey, usize>,
}

impl LinkFrequencies {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Counts one more link of the given shape. Range-keyed counters are only
    /// kept for links whose target is a class.
    pub fn record(&mut self, domain: &str, link: &str, range: &str, range_is_class: bool) {
        if range_is_class {
            self.bump(FrequencyKey::DomainLinkRange {
                domain: domain.to_string(),
                link: link.to_string(),
                range: range.to_string(),
            });
            self.bump(FrequencyKey::RangeLink {
                range: range.to_string(),
                link: link.to_string(),
            });
        }
        self.bump(FrequencyKey::DomainLink {
            domain: domain.to_string(),
            link: link.to_string(),
        });
        self.bump(FrequencyKey::Link {
            link: link.to_string(),
        });
    }

    fn bump(&mut self, key: FrequencyKey) {
        *self.counts.entry(key).or_insert(0) += 1;
    }

    #[must_use]
    pub fn count(&self, key: &FrequencyKey) -> usize {
        self.counts.get(key).copied().unwrap_or(0)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&FrequencyKey, usize)> {
        self.counts.iter().map(|(key, count)| (key, *count))
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    /// Picks the most plausible relation from `source_uri` to `target_uri`.
    ///
    /// Candidates are every relation the oracle allows between the two
    /// classes. Counter tiers are tried from the most specific one; within a
    /// tier the highest count wins and ties keep the first candidate. Without
    /// any count, the first candidate of the most specific non-empty category
    /// is returned with a zero count and a fallback selection type.
    ///
    /// # Errors
    ///
    /// Returns [`GraphError::NoCandidateLink`] when the oracle allows no
    /// relation at all.
    pub fn most_frequent<O>(
        &self,
        oracle: &O,
        source_uri: &str,
        target_uri: &str,
    ) -> Result<LinkFrequency, GraphError>
    where
        O: OntologyOracle + ?Sized,
    {
        let direct = oracle.object_properties_direct(source_uri, target_uri);
        let indirect = oracle.object_properties_indirect(source_uri, target_uri);
        let with_only_domain = oracle.object_properties_with_only_domain(source_uri);
        let with_only_range = oracle.object_properties_with_only_range(target_uri);
        let without_domain_and_range = oracle.object_properties_without_domain_and_range();
        let sub_class = oracle.is_subclass(source_uri, target_uri, true);

        let mut seen = BTreeSet::new();
        let mut candidates: Vec<&str> = Vec::new();
        let sub_class_uri = sub_class.then_some(vocab::RDFS_SUBCLASS_OF);
        for uri in direct
            .iter()
            .chain(&indirect)
            .chain(&with_only_domain)
            .chain(&with_only_range)
            .map(String::as_str)
            .chain(sub_class_uri)
            .chain(without_domain_and_range.iter().map(String::as_str))
        {
            if seen.insert(uri) {
                candidates.push(uri);
            }
        }

        if candidates.is_empty() {
            return Err(GraphError::NoCandidateLink {
                source_uri: source_uri.to_string(),
                target_uri: target_uri.to_string(),
            });
        }

        for selection in [
            SelectionType::DomainLinkRange,
            SelectionType::LinkRange,
            SelectionType::DomainLink,
            SelectionType::Link,
        ] {
            let mut best: Option<(&str, usize)> = None;
            for candidate in &candidates {
                let count = self.count(&tier_key(selection, source_uri, candidate, target_uri));
                if count > best.map_or(0, |(_, max)| max) {
                    best = Some((*candidate, count));
                }
            }
            if let Some((link_uri, count)) = best {
                debug!(source_uri, target_uri, link_uri, count, selection = ?selection, "frequent_link_selected");
                return Ok(LinkFrequency {
                    link_uri: link_uri.to_string(),
                    selection,
                    count,
                });
            }
        }

        let fallback = [
            (SelectionType::FallbackDirect, direct.iter().next()),
            (SelectionType::FallbackIndirect, indirect.iter().next()),
            (SelectionType::FallbackWithOnlyRange, with_only_range.iter().next()),
            (SelectionType::FallbackWithOnlyDomain, with_only_domain.iter().next()),
            (
                SelectionType::FallbackWithoutDomainAndRange,
                without_domain_and_range.iter().next(),
            ),
        ]
        .into_iter()
        .find_map(|(selection, uri)| uri.map(|uri| (selection, uri.as_str())))
        .or(sub_class_uri.map(|uri| (SelectionType::FallbackSubClass, uri)));

        match fallback {
            Some((selection, link_uri)) => Ok(LinkFrequency {
                link_uri: link_uri.to_string(),
                selection,
                count: 0,
            }),
            None => Err(GraphError::NoCandidateLink {
                source_uri: source_uri.to_string(),
                target_uri: target_uri.to_string(),
            }),
        }
    }
}

fn tier_key(selection: SelectionType, domain: &str, link: &str, range: &str) -> FrequencyKey {
    match selection {
        SelectionType::DomainLinkRange => FrequencyKey::DomainLinkRange {
            domain: domain.to_string(),
            link: link.to_string(),
            range: range.to_string(),
        },
        SelectionType::LinkRange => FrequencyKey::RangeLink {
            range: range.to_string(),
            link: link.to_string(),
        },
        SelectionType::DomainLink => FrequencyKey::DomainLink {
            domain: domain.to_string(),
            link: link.to_string(),
        },
        _ => FrequencyKey::Link {
            link: link.to_string(),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::{FrequencyKey, LinkFrequencies};

    #[test]
    fn keys_render_in_counter_format() {
        insta::assert_snapshot!(
            FrequencyKey::DomainLinkRange {
                domain: "ex:A".into(),
                link: "ex:p".into(),
                range: "ex:B".into(),
            },
            @"domain:ex:A,link:ex:p,range:ex:B"
        );
        insta::assert_snapshot!(
            FrequencyKey::RangeLink {
                range: "ex:B".into(),
                link: "ex:p".into(),
            },
            @"range:ex:B,link:ex:p"
        );
    }

    #[test]
    fn column_targets_skip_range_counters() {
        let mut frequencies = LinkFrequencies::new();
        frequencies.record("ex:A", "ex:name", "HN1", false);
        frequencies.record("ex:A", "ex:name", "HN2", false);

        assert_eq!(
            frequencies.count(&FrequencyKey::DomainLink {
                domain: "ex:A".into(),
                link: "ex:name".into(),
            }),
            2
        );
        assert_eq!(
            frequencies.count(&FrequencyKey::RangeLink {
                range: "HN1".into(),
                link: "ex:name".into(),
            }),
            0
        );
        assert_eq!(frequencies.iter().count(), 2);
    }
}
