//! Validated annotated sentences
//!
//! A [`Sentence`] owns its spans in an arena indexed by [`SpanId`]. Relations
//! refer to spans by id, so two endpoints are "the same span" exactly when
//! their ids match. Interning is keyed by `(start, end, label)`: repeated
//! occurrences of one span in several relation records resolve to one id.

use std::collections::HashMap;

use pkcase_core::{PkError, Result, SentenceRecord, SpanRecord};

use crate::relation::{Relation, RelationLabel};
use crate::span::{KbEntry, Span, SpanId, SpanLabel};

/// A sentence with its spans and relations
#[derive(Debug, Clone)]
pub struct Sentence {
    pub text: String,
    pub pmid: Option<String>,
    pub is_title: bool,
    spans: Vec<Span>,
    relations: Vec<Relation>,
}

impl Sentence {
    /// Build a sentence from a raw record
    ///
    /// Fails with [`PkError::InvalidSpan`] when an offset pair is empty,
    /// reversed or outside the text. Relations with an unrecognized label are
    /// dropped.
    pub fn from_record(record: &SentenceRecord) -> Result<Self> {
        let mut interner = SpanInterner::new(&record.text);
        let mut relations = Vec::with_capacity(record.relations.len());

        for raw in &record.relations {
            let Some(label) = RelationLabel::parse(&raw.label) else {
                tracing::debug!("Dropping relation with unknown label '{}'", raw.label);
                continue;
            };
            let left = interner.intern(&raw.left)?;
            let right = interner.intern(&raw.right)?;
            relations.push(Relation::new(label, left, right));
        }

        Ok(Self {
            text: record.text.clone(),
            pmid: record.pmid.clone(),
            is_title: record.is_title,
            spans: interner.spans,
            relations,
        })
    }

    pub fn spans(&self) -> &[Span] {
        &self.spans
    }

    pub fn span(&self, id: SpanId) -> Option<&Span> {
        self.spans.get(id.0)
    }

    /// Relations in record order
    pub fn relations(&self) -> &[Relation] {
        &self.relations
    }

    /// Whether any C_VAL relation is present
    pub fn has_central_relations(&self) -> bool {
        self.central_relation_count() > 0
    }

    pub fn central_relation_count(&self) -> usize {
        self.relations
            .iter()
            .filter(|r| r.label == RelationLabel::CentralValue)
            .count()
    }
}

impl TryFrom<&SentenceRecord> for Sentence {
    type Error = PkError;

    fn try_from(record: &SentenceRecord) -> Result<Self> {
        Self::from_record(record)
    }
}

impl TryFrom<SentenceRecord> for Sentence {
    type Error = PkError;

    fn try_from(record: SentenceRecord) -> Result<Self> {
        Self::from_record(&record)
    }
}

// ============================================================================
// Span Interning
// ============================================================================

struct SpanInterner<'a> {
    text: &'a str,
    /// Byte offset of every character boundary, including the end of text
    boundaries: Vec<usize>,
    index: HashMap<(usize, usize, SpanLabel), SpanId>,
    spans: Vec<Span>,
}

impl<'a> SpanInterner<'a> {
    fn new(text: &'a str) -> Self {
        let mut boundaries: Vec<usize> = text.char_indices().map(|(i, _)| i).collect();
        boundaries.push(text.len());
        Self {
            text,
            boundaries,
            index: HashMap::new(),
            spans: Vec::new(),
        }
    }

    fn char_len(&self) -> usize {
        self.boundaries.len() - 1
    }

    fn intern(&mut self, record: &SpanRecord) -> Result<SpanId> {
        let (start, end) = (record.start, record.end);
        if start >= end || end > self.char_len() {
            return Err(PkError::InvalidSpan {
                start,
                end,
                len: self.char_len(),
            });
        }

        let label = SpanLabel::parse(&record.label);
        let kb = kb_entry(record);

        if let Some(&id) = self.index.get(&(start, end, label)) {
            let span = &mut self.spans[id.0];
            if span.kb.is_none() {
                span.kb = kb;
            }
            return Ok(id);
        }

        let id = SpanId(self.spans.len());
        let text = &self.text[self.boundaries[start]..self.boundaries[end]];
        self.spans.push(Span {
            id,
            start,
            end,
            label,
            text: text.to_string(),
            kb,
        });
        self.index.insert((start, end, label), id);
        Ok(id)
    }
}

fn kb_entry(record: &SpanRecord) -> Option<KbEntry> {
    if record.kb_id.is_none() && record.kb_name.is_none() {
        return None;
    }
    Some(KbEntry {
        id: record.kb_id.clone(),
        name: record.kb_name.clone(),
    })
}

// ============================================================================
// Corpus Helpers
// ============================================================================

/// Total number of C_VAL relations across sentences
pub fn count_central_relations(sentences: &[Sentence]) -> usize {
    sentences.iter().map(Sentence::central_relation_count).sum()
}

/// Mean number of C_VAL relations over sentences that have at least one
pub fn mean_central_relations_per_sentence(sentences: &[Sentence]) -> Option<f64> {
    let counts: Vec<usize> = sentences
        .iter()
        .map(Sentence::central_relation_count)
        .filter(|&n| n > 0)
        .collect();

    if counts.is_empty() {
        return None;
    }
    Some(counts.iter().sum::<usize>() as f64 / counts.len() as f64)
}

/// Sentences with at least one C_VAL relation
pub fn sentences_with_measurements(sentences: &[Sentence]) -> Vec<&Sentence> {
    sentences
        .iter()
        .filter(|s| s.has_central_relations())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pkcase_core::RelationRecord;

    fn span(start: usize, end: usize, label: &str) -> SpanRecord {
        SpanRecord::new(start, end, label)
    }

    fn clearance_record() -> SentenceRecord {
        let pk = SpanRecord::new(4, 13, "PK").with_kb("Q1", "clearance");
        let value = SpanRecord::new(18, 22, "VALUE");
        let units = SpanRecord::new(23, 28, "UNITS");
        SentenceRecord::new(
            "The clearance was 0.32 L/min.",
            vec![
                RelationRecord::new("C_VAL", pk, value.clone()),
                RelationRecord::new("RELATED", value, units),
            ],
        )
    }

    #[test]
    fn test_from_record_interns_spans() {
        let sentence = Sentence::from_record(&clearance_record()).unwrap();

        assert_eq!(sentence.spans().len(), 3);
        assert_eq!(sentence.relations().len(), 2);
        assert_eq!(sentence.relations()[0].right, sentence.relations()[1].left);

        let value = sentence.span(sentence.relations()[0].right).unwrap();
        assert_eq!(value.text, "0.32");
        assert_eq!(value.label, SpanLabel::Value);

        let pk = sentence.span(SpanId(0)).unwrap();
        assert_eq!(pk.text, "clearance");
        assert_eq!(pk.kb.as_ref().and_then(|kb| kb.id.as_deref()), Some("Q1"));
    }

    #[test]
    fn test_same_offsets_different_labels_are_distinct() {
        let record = SentenceRecord::new(
            "CL 5",
            vec![
                RelationRecord::new("C_VAL", span(0, 2, "PK"), span(3, 4, "VALUE")),
                RelationRecord::new("RELATED", span(3, 4, "RANGE"), span(0, 2, "PK")),
            ],
        );
        let sentence = Sentence::from_record(&record).unwrap();

        assert_eq!(sentence.spans().len(), 3);
        assert_ne!(sentence.relations()[0].right, sentence.relations()[1].left);
        assert_eq!(sentence.relations()[0].left, sentence.relations()[1].right);
    }

    #[test]
    fn test_character_offsets() {
        let record = SentenceRecord::new(
            "AUC was 12 μg·h/ml",
            vec![RelationRecord::new(
                "RELATED",
                SpanRecord::new(8, 10, "VALUE"),
                SpanRecord::new(11, 18, "UNITS"),
            )],
        );
        let sentence = Sentence::from_record(&record).unwrap();
        assert_eq!(sentence.spans()[1].text, "μg·h/ml");
    }

    #[test]
    fn test_invalid_offsets_rejected() {
        for (start, end) in [(5, 5), (6, 2), (0, 40)] {
            let record = SentenceRecord::new(
                "CL was 5",
                vec![RelationRecord::new(
                    "C_VAL",
                    SpanRecord::new(start, end, "PK"),
                    SpanRecord::new(7, 8, "VALUE"),
                )],
            );
            let err = Sentence::from_record(&record).unwrap_err();
            assert!(matches!(err, PkError::InvalidSpan { .. }), "{start}..{end}");
        }
    }

    #[test]
    fn test_unknown_relation_label_dropped() {
        let mut record = clearance_record();
        record.relations[1].label = "CAUSES".to_string();

        let sentence = Sentence::try_from(record).unwrap();
        assert_eq!(sentence.relations().len(), 1);
        assert_eq!(sentence.spans().len(), 2);
    }

    #[test]
    fn test_kb_merged_from_later_occurrence() {
        let record = SentenceRecord::new(
            "CL was 5",
            vec![
                RelationRecord::new("C_VAL", span(0, 2, "PK"), span(7, 8, "VALUE")),
                RelationRecord::new(
                    "C_VAL",
                    SpanRecord::new(0, 2, "PK").with_kb("Q1", "clearance"),
                    SpanRecord::new(7, 8, "VALUE"),
                ),
            ],
        );
        let sentence = Sentence::from_record(&record).unwrap();
        assert_eq!(sentence.spans().len(), 2);
        assert!(sentence.span(SpanId(0)).unwrap().kb.is_some());
    }

    #[test]
    fn test_central_relation_statistics() {
        let with_cval = Sentence::from_record(&clearance_record()).unwrap();
        let empty = SentenceRecord::new("No numbers here.", vec![]);
        let without = Sentence::from_record(&empty).unwrap();
        let sentences = vec![with_cval, without];

        assert_eq!(count_central_relations(&sentences), 1);
        assert_eq!(mean_central_relations_per_sentence(&sentences), Some(1.0));
        assert_eq!(sentences_with_measurements(&sentences).len(), 1);
        assert_eq!(mean_central_relations_per_sentence(&sentences[1..]), None);
    }
}
