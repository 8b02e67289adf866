use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::model::{Link, LinkKind, LinkStatus};
use crate::ontology::PropertyShape;

/// Structural link weights. Lower is better: the downstream extraction looks
/// for a minimum-weight subgraph, so only the relative order of the constants
/// matters.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct WeightSettings {
    pub user_forced: f64,
    pub ui_preferred: f64,
    pub model_provenance: f64,
    pub direct: f64,
    pub indirect: f64,
    pub domain_only: f64,
    pub range_only: f64,
    pub neither: f64,
    pub sub_class: f64,
}

impl Default for WeightSettings {
    fn default() -> Self {
        Self {
            user_forced: 1e-6,
            ui_preferred: 0.5,
            model_provenance: 1.0,
            direct: 100.0,
            indirect: 100.01,
            domain_only: 100.02,
            range_only: 100.03,
            neither: 100.04,
            sub_class: 100.05,
        }
    }
}

#[derive(Debug, Error, PartialEq)]
pub enum WeightError {
    #[error("weight `{rule}` must be a finite number, got {value}")]
    NotFinite { rule: &'static str, value: f64 },
    #[error("weight `{preferred}` ({preferred_value}) must be lower than `{fallback}` ({fallback_value})")]
    OutOfOrder {
        preferred: &'static str,
        preferred_value: f64,
        fallback: &'static str,
        fallback_value: f64,
    },
}

impl WeightSettings {
    fn cascade(&self) -> [(&'static str, f64); 9] {
        [
            ("user_forced", self.user_forced),
            ("ui_preferred", self.ui_preferred),
            ("model_provenance", self.model_provenance),
            ("direct", self.direct),
            ("indirect", self.indirect),
            ("domain_only", self.domain_only),
            ("range_only", self.range_only),
            ("neither", self.neither),
            ("sub_class", self.sub_class),
        ]
    }

    /// Checks that every constant is finite and strictly increasing along the
    /// cascade.
    ///
    /// # Errors
    ///
    /// Returns the first rule that breaks the order.
    pub fn validate(&self) -> Result<(), WeightError> {
        let cascade = self.cascade();
        for (rule, value) in cascade {
            if !value.is_finite() {
                return Err(WeightError::NotFinite { rule, value });
            }
        }
        for pair in cascade.windows(2) {
            let (preferred, preferred_value) = pair[0];
            let (fallback, fallback_value) = pair[1];
            if preferred_value >= fallback_value {
                return Err(WeightError::OutOfOrder {
                    preferred,
                    preferred_value,
                    fallback,
                    fallback_value,
                });
            }
        }
        Ok(())
    }

    /// Weight of `link`: the constant of the first matching rule.
    #[must_use]
    pub fn compute(&self, link: &Link) -> f64 {
        match link.status() {
            LinkStatus::ForcedByUser => return self.user_forced,
            LinkStatus::PreferredByUi => return self.ui_preferred,
            LinkStatus::Normal => {}
        }
        if !link.model_ids().is_empty() {
            return self.model_provenance;
        }

        match link.kind() {
            LinkKind::ObjectProperty(shape) | LinkKind::CompactObjectProperty(shape) => {
                self.for_shape(shape)
            }
            LinkKind::SubClass | LinkKind::CompactSubClass => self.sub_class,
            LinkKind::DataProperty => self.direct,
        }
    }

    #[must_use]
    pub fn for_shape(&self, shape: PropertyShape) -> f64 {
        match shape {
            PropertyShape::Direct => self.direct,
            PropertyShape::Indirect => self.indirect,
            PropertyShape::DomainOnly => self.domain_only,
            PropertyShape::RangeOnly => self.range_only,
            PropertyShape::Neither => self.neither,
        }
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::{WeightError, WeightSettings};
    use crate::graph::model::{Link, LinkStatus, NodeId};
    use crate::ontology::PropertyShape;

    fn property(shape: PropertyShape) -> Link {
        Link::object_property(NodeId::new("ex:A1"), NodeId::new("ex:B1"), "ex:p", shape)
    }

    #[test]
    fn defaults_are_ordered() {
        assert_eq!(WeightSettings::default().validate(), Ok(()));
    }

    #[test]
    fn out_of_order_constants_are_rejected() {
        let weights = WeightSettings {
            indirect: 1.0,
            ..WeightSettings::default()
        };
        assert!(matches!(
            weights.validate(),
            Err(WeightError::OutOfOrder {
                preferred: "direct",
                fallback: "indirect",
                ..
            })
        ));

        let weights = WeightSettings {
            neither: f64::NAN,
            ..WeightSettings::default()
        };
        assert!(matches!(
            weights.validate(),
            Err(WeightError::NotFinite { rule: "neither", .. })
        ));
    }

    #[rstest]
    #[case(PropertyShape::Direct, PropertyShape::Indirect)]
    #[case(PropertyShape::Indirect, PropertyShape::DomainOnly)]
    #[case(PropertyShape::DomainOnly, PropertyShape::RangeOnly)]
    #[case(PropertyShape::RangeOnly, PropertyShape::Neither)]
    fn more_specific_shapes_are_cheaper(
        #[case] preferred: PropertyShape,
        #[case] fallback: PropertyShape,
    ) {
        let weights = WeightSettings::default();
        assert!(weights.compute(&property(preferred)) < weights.compute(&property(fallback)));
    }

    #[test]
    fn status_overrides_shape() {
        let weights = WeightSettings::default();
        let normal = property(PropertyShape::Direct);
        let forced = property(PropertyShape::Neither).with_status(LinkStatus::ForcedByUser);
        let preferred = property(PropertyShape::Neither).with_status(LinkStatus::PreferredByUi);
        let modeled = property(PropertyShape::Neither).with_model_ids(["m1"]);

        assert!(weights.compute(&forced) < weights.compute(&preferred));
        assert!(weights.compute(&preferred) < weights.compute(&modeled));
        assert!(weights.compute(&modeled) < weights.compute(&normal));
    }

    #[test]
    fn subclass_links_rank_last() {
        let weights = WeightSettings::default();
        let sub_class = Link::sub_class(NodeId::new("ex:A1"), NodeId::new("ex:B1"));
        assert_eq!(weights.compute(&sub_class), weights.sub_class);
        assert!(weights.compute(&property(PropertyShape::Neither)) < weights.sub_class);
    }
}
