//! Relation graph reduction
//!
//! Rebuilds PK estimates from the relations predicted over one sentence.
//! Every qualifying C_VAL relation yields one estimate; its units, comparator
//! and deviation are collected from the RELATED and D_VAL relations that touch
//! its central value.

use serde::{Deserialize, Serialize};

use crate::estimate::{Estimate, EstimateParts};
use crate::sentence::Sentence;
use crate::span::{SpanId, SpanLabel};
use crate::units::UnitNormalizer;
use crate::EstimateExtractor;

// ============================================================================
// Relation Types
// ============================================================================

/// Relation labels produced by the RE model
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RelationLabel {
    /// Parameter -> central value
    CentralValue,
    /// Central value -> deviation
    Deviation,
    /// Value -> units or comparator
    Related,
    NoRelation,
}

impl RelationLabel {
    /// Get the string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::CentralValue => "C_VAL",
            Self::Deviation => "D_VAL",
            Self::Related => "RELATED",
            Self::NoRelation => "NO_RELATION",
        }
    }

    /// Get from string
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_uppercase().as_str() {
            "C_VAL" => Some(Self::CentralValue),
            "D_VAL" => Some(Self::Deviation),
            "RELATED" => Some(Self::Related),
            "NO_RELATION" => Some(Self::NoRelation),
            _ => None,
        }
    }
}

impl std::fmt::Display for RelationLabel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Labeled edge between two spans of one sentence
///
/// Direction carries no meaning; endpoints are inspected by label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Relation {
    pub label: RelationLabel,
    pub left: SpanId,
    pub right: SpanId,
}

impl Relation {
    pub fn new(label: RelationLabel, left: SpanId, right: SpanId) -> Self {
        Self { label, left, right }
    }

    /// The endpoint opposite `anchor`, if `anchor` is one of them
    ///
    /// A self-loop has no opposite endpoint.
    pub fn other_endpoint(&self, anchor: SpanId) -> Option<SpanId> {
        if self.left == self.right {
            None
        } else if self.left == anchor {
            Some(self.right)
        } else if self.right == anchor {
            Some(self.left)
        } else {
            None
        }
    }

    pub fn endpoints(&self) -> [SpanId; 2] {
        [self.left, self.right]
    }
}

// ============================================================================
// Reducer
// ============================================================================

/// Reduces a sentence's relation graph to estimates
#[derive(Debug, Clone, Default)]
pub struct EstimateReducer {
    normalizer: UnitNormalizer,
}

impl EstimateReducer {
    /// Create a reducer with the built-in unit tables
    pub fn new() -> Self {
        Self::default()
    }

    /// Use a custom unit normalizer
    pub fn with_normalizer(normalizer: UnitNormalizer) -> Self {
        Self { normalizer }
    }

    pub fn normalizer(&self) -> &UnitNormalizer {
        &self.normalizer
    }

    /// Estimates in the order of their C_VAL relations
    pub fn reduce(&self, sentence: &Sentence) -> Vec<Estimate> {
        sentence
            .relations()
            .iter()
            .filter(|r| r.label == RelationLabel::CentralValue)
            .filter_map(|relation| self.reduce_central(sentence, relation))
            .collect()
    }

    fn reduce_central(&self, sentence: &Sentence, relation: &Relation) -> Option<Estimate> {
        let label_of = |id: SpanId| sentence.span(id).map(|s| s.label);

        let mut parameter = None;
        let mut central = None;
        for id in relation.endpoints() {
            match label_of(id) {
                Some(SpanLabel::Parameter) => parameter = Some(id),
                Some(label) if label.is_measurement() => central = Some(id),
                _ => {}
            }
        }

        let (Some(parameter), Some(central)) = (parameter, central) else {
            tracing::debug!(
                "Skipping C_VAL relation between {:?} and {:?}: no parameter/value pairing",
                relation.left,
                relation.right
            );
            return None;
        };

        let mut units = None;
        let mut compare = None;
        for other in related_to(sentence, central, RelationLabel::Related) {
            match label_of(other) {
                Some(SpanLabel::Units) => units = Some(other),
                Some(SpanLabel::Compare) => compare = Some(other),
                _ => {}
            }
        }

        let deviation = related_to(sentence, central, RelationLabel::Deviation)
            .filter(|&other| label_of(other).is_some_and(|l| l.is_measurement()))
            .last();

        let deviation_units = deviation.and_then(|dev| {
            related_to(sentence, dev, RelationLabel::Related)
                .filter(|&other| label_of(other) == Some(SpanLabel::Units))
                .last()
        });

        let resolve = |id: Option<SpanId>| id.and_then(|id| sentence.span(id)).cloned();
        Some(Estimate::new(
            EstimateParts {
                parameter: sentence.span(parameter)?.clone(),
                central_value: sentence.span(central)?.clone(),
                central_units: resolve(units),
                deviation_value: resolve(deviation),
                deviation_units: resolve(deviation_units),
                comparator: resolve(compare),
            },
            &self.normalizer,
        ))
    }
}

impl EstimateExtractor for EstimateReducer {
    fn extract(&self, sentence: &Sentence) -> Vec<Estimate> {
        self.reduce(sentence)
    }
}

/// Opposite endpoints of every `label` relation touching `anchor`
fn related_to(
    sentence: &Sentence,
    anchor: SpanId,
    label: RelationLabel,
) -> impl Iterator<Item = SpanId> + '_ {
    sentence
        .relations()
        .iter()
        .filter(move |r| r.label == label)
        .filter_map(move |r| r.other_endpoint(anchor))
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use pkcase_core::{RelationRecord, SentenceRecord, SpanRecord};

    fn sentence(text: &str, relations: Vec<RelationRecord>) -> Sentence {
        Sentence::from_record(&SentenceRecord::new(text, relations)).unwrap()
    }

    fn span(start: usize, end: usize, label: &str) -> SpanRecord {
        SpanRecord::new(start, end, label)
    }

    fn rel(label: &str, left: SpanRecord, right: SpanRecord) -> RelationRecord {
        RelationRecord::new(label, left, right)
    }

    #[test]
    fn test_relation_label_parse() {
        assert_eq!(RelationLabel::parse("C_VAL"), Some(RelationLabel::CentralValue));
        assert_eq!(RelationLabel::parse("d_val"), Some(RelationLabel::Deviation));
        assert_eq!(RelationLabel::parse("UNRELATED"), None);
        assert_eq!(RelationLabel::NoRelation.to_string(), "NO_RELATION");
    }

    #[test]
    fn test_other_endpoint() {
        let relation = Relation::new(RelationLabel::Related, SpanId(1), SpanId(2));
        assert_eq!(relation.other_endpoint(SpanId(1)), Some(SpanId(2)));
        assert_eq!(relation.other_endpoint(SpanId(2)), Some(SpanId(1)));
        assert_eq!(relation.other_endpoint(SpanId(3)), None);

        let self_loop = Relation::new(RelationLabel::Deviation, SpanId(1), SpanId(1));
        assert_eq!(self_loop.other_endpoint(SpanId(1)), None);
    }

    #[test]
    fn test_full_estimate() {
        let text = "CL was 3.1 (0.4 L/h) L/h <";
        let pk = span(0, 2, "PK");
        let value = span(7, 10, "VALUE");
        let dev = span(12, 15, "VALUE");
        let dev_units = span(16, 19, "UNITS");
        let units = span(21, 24, "UNITS");
        let compare = span(25, 26, "COMPARE");

        let s = sentence(
            text,
            vec![
                rel("C_VAL", pk, value.clone()),
                rel("RELATED", units, value.clone()),
                rel("D_VAL", value.clone(), dev.clone()),
                rel("RELATED", dev, dev_units),
                rel("RELATED", value, compare),
            ],
        );

        let estimates = EstimateReducer::new().reduce(&s);
        assert_eq!(estimates.len(), 1);

        let estimate = &estimates[0];
        assert_eq!(estimate.parameter().text, "CL");
        assert_eq!(estimate.central_value().text, "3.1");
        assert_eq!(estimate.central_units().map(|s| s.text.as_str()), Some("L/h"));
        assert_eq!(estimate.deviation_value().map(|s| s.text.as_str()), Some("0.4"));
        assert_eq!(estimate.deviation_units().map(|s| s.text.as_str()), Some("L/h"));
        assert_eq!(estimate.comparator().map(|s| s.text.as_str()), Some("<"));
        assert_eq!(estimate.normalized_units().mention, "[l] / [h]");
    }

    #[test]
    fn test_self_loop_is_not_a_deviation() {
        let value = span(3, 4, "VALUE");
        let s = sentence(
            "CL 5",
            vec![
                rel("C_VAL", span(0, 2, "PK"), value.clone()),
                rel("D_VAL", value.clone(), value.clone()),
                rel("RELATED", value.clone(), value),
            ],
        );

        let estimates = EstimateReducer::new().reduce(&s);
        assert_eq!(estimates.len(), 1);
        assert!(estimates[0].deviation_value().is_none());
        assert_eq!(estimates[0].to_record().deviation, "");
    }

    #[test]
    fn test_pairing_failure_skipped() {
        let s = sentence(
            "CL 5 mg",
            vec![
                rel("C_VAL", span(0, 2, "PK"), span(5, 7, "UNITS")),
                rel("C_VAL", span(3, 4, "VALUE"), span(5, 7, "VALUE")),
            ],
        );
        assert!(EstimateReducer::new().reduce(&s).is_empty());
    }

    #[test]
    fn test_reversed_direction() {
        let s = sentence(
            "5 for CL",
            vec![rel("C_VAL", span(0, 1, "RANGE"), span(6, 8, "PK"))],
        );
        let estimates = EstimateReducer::new().reduce(&s);
        assert_eq!(estimates.len(), 1);
        assert_eq!(estimates[0].parameter().text, "CL");
        assert_eq!(estimates[0].central_value().label, SpanLabel::Range);
    }

    #[test]
    fn test_last_related_match_wins() {
        let value = span(3, 4, "VALUE");
        let s = sentence(
            "CL 5 mg h",
            vec![
                rel("C_VAL", span(0, 2, "PK"), value.clone()),
                rel("RELATED", value.clone(), span(5, 7, "UNITS")),
                rel("RELATED", value, span(8, 9, "UNITS")),
            ],
        );
        let estimates = EstimateReducer::new().reduce(&s);
        assert_eq!(estimates[0].central_units().map(|s| s.text.as_str()), Some("h"));
    }

    #[test]
    fn test_last_comparator_wins() {
        let value = span(3, 4, "VALUE");
        let s = sentence(
            "CL 5 < >",
            vec![
                rel("C_VAL", span(0, 2, "PK"), value.clone()),
                rel("RELATED", span(5, 6, "COMPARE"), value.clone()),
                rel("RELATED", value, span(7, 8, "COMPARE")),
            ],
        );
        let estimates = EstimateReducer::new().reduce(&s);
        assert_eq!(estimates[0].comparator().map(|s| s.text.as_str()), Some(">"));
    }

    #[test]
    fn test_last_deviation_wins() {
        let value = span(3, 4, "VALUE");
        let first = span(6, 9, "VALUE");
        let second = span(12, 15, "RANGE");
        let s = sentence(
            "CL 5 (0.4) [1-2] h",
            vec![
                rel("C_VAL", span(0, 2, "PK"), value.clone()),
                rel("D_VAL", value.clone(), first.clone()),
                rel("RELATED", first, span(17, 18, "UNITS")),
                rel("D_VAL", second, value),
            ],
        );
        let estimates = EstimateReducer::new().reduce(&s);
        let estimate = &estimates[0];
        assert_eq!(estimate.deviation_value().map(|s| s.text.as_str()), Some("1-2"));
        assert!(estimate.deviation_units().is_none());
    }

    #[test]
    fn test_identical_text_distinct_spans() {
        // Two "5"s: units attach only to the one they are related to
        let s = sentence(
            "CL 5 mg, V 5",
            vec![
                rel("C_VAL", span(0, 2, "PK"), span(3, 4, "VALUE")),
                rel("C_VAL", span(9, 10, "PK"), span(11, 12, "VALUE")),
                rel("RELATED", span(3, 4, "VALUE"), span(5, 7, "UNITS")),
            ],
        );
        let estimates = EstimateReducer::new().reduce(&s);
        assert_eq!(estimates.len(), 2);
        assert!(estimates[0].central_units().is_some());
        assert!(estimates[1].central_units().is_none());
    }

    #[test]
    fn test_shared_central_value() {
        let value = span(11, 12, "VALUE");
        let s = sentence(
            "CL and CLr 5",
            vec![
                rel("C_VAL", span(0, 2, "PK"), value.clone()),
                rel("C_VAL", span(7, 10, "PK"), value),
            ],
        );
        let estimates = EstimateReducer::new().reduce(&s);
        assert_eq!(estimates.len(), 2);
        assert_eq!(estimates[0].parameter().text, "CL");
        assert_eq!(estimates[1].parameter().text, "CLr");
        assert_eq!(estimates[0].central_value(), estimates[1].central_value());
    }

    #[test]
    fn test_no_relation_ignored() {
        let s = sentence(
            "CL 5",
            vec![rel("NO_RELATION", span(0, 2, "PK"), span(3, 4, "VALUE"))],
        );
        assert!(EstimateReducer::new().extract(&s).is_empty());
    }
}
