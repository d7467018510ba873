//! Corpus aggregation
//!
//! Groups annotated sentences into abstracts and abstracts into a database of
//! flat, browsable records. Built once per batch, read-only afterwards.

use std::collections::HashMap;

use pkcase_core::{DatabaseRecord, EstimateRecord, PkError, RecordsConfig, Result};

use crate::estimate::Estimate;
use crate::sentence::Sentence;
use crate::span::Span;
use crate::stats::most_common;
use crate::EstimateExtractor;

// ============================================================================
// Annotated Sentence
// ============================================================================

/// A sentence together with its reconstructed estimates
#[derive(Debug, Clone)]
pub struct AnnotatedSentence {
    sentence: Sentence,
    estimates: Vec<Estimate>,
}

impl AnnotatedSentence {
    /// Run an extractor over the sentence
    pub fn new(sentence: Sentence, extractor: &dyn EstimateExtractor) -> Self {
        let estimates = extractor.extract(&sentence);
        Self {
            sentence,
            estimates,
        }
    }

    pub fn from_estimates(sentence: Sentence, estimates: Vec<Estimate>) -> Self {
        Self {
            sentence,
            estimates,
        }
    }

    pub fn sentence(&self) -> &Sentence {
        &self.sentence
    }

    pub fn estimates(&self) -> &[Estimate] {
        &self.estimates
    }

    pub fn has_params(&self) -> bool {
        !self.estimates.is_empty()
    }

    /// Flat records without duplicates, in first-occurrence order
    pub fn estimate_records(&self) -> Vec<EstimateRecord> {
        self.unique_estimates()
            .into_iter()
            .map(|(record, _)| record)
            .collect()
    }

    /// Distinct spans across all estimates, ordered by start offset
    pub fn entities(&self) -> Vec<&Span> {
        let mut entities: Vec<&Span> = Vec::new();
        for span in self.estimates.iter().flat_map(Estimate::entities) {
            if !entities.contains(&span) {
                entities.push(span);
            }
        }
        entities.sort_by_key(|span| span.start);
        entities
    }

    /// Each distinct record with the index of the first estimate producing it
    fn unique_estimates(&self) -> Vec<(EstimateRecord, usize)> {
        let mut unique: Vec<(EstimateRecord, usize)> = Vec::new();
        for (index, estimate) in self.estimates.iter().enumerate() {
            let record = estimate.to_record();
            if !unique.iter().any(|(seen, _)| *seen == record) {
                unique.push((record, index));
            }
        }
        unique
    }

    fn indexed_records(&self, deduplicate: bool) -> Vec<(EstimateRecord, usize)> {
        if deduplicate {
            self.unique_estimates()
        } else {
            self.estimates
                .iter()
                .enumerate()
                .map(|(index, e)| (e.to_record(), index))
                .collect()
        }
    }
}

// ============================================================================
// Abstract
// ============================================================================

/// Sentences of one article
#[derive(Debug, Clone)]
pub struct Abstract {
    pub pmid: String,
    /// Title sentences, each followed by a space
    pub title: String,
    sentences: Vec<AnnotatedSentence>,
    parameter_ids: Vec<String>,
}

impl Abstract {
    /// Group sentences of a single article
    ///
    /// All sentences must carry the same pmid.
    pub fn new(sentences: Vec<AnnotatedSentence>) -> Result<Self> {
        let first = sentences
            .first()
            .ok_or_else(|| PkError::Validation("Abstract has no sentences".to_string()))?;
        let pmid = first
            .sentence()
            .pmid
            .clone()
            .ok_or_else(|| PkError::Validation("Sentence without pmid".to_string()))?;

        if let Some(other) = sentences
            .iter()
            .find(|s| s.sentence().pmid.as_deref() != Some(pmid.as_str()))
        {
            return Err(PkError::Validation(format!(
                "Abstract mixes pmid {} with {:?}",
                pmid,
                other.sentence().pmid
            )));
        }

        let title = sentences
            .iter()
            .filter(|s| s.sentence().is_title)
            .map(|s| format!("{} ", s.sentence().text))
            .collect();

        let parameter_ids = sentences
            .iter()
            .flat_map(|s| s.estimates())
            .map(Estimate::parameter_key)
            .collect();

        Ok(Self {
            pmid,
            title,
            sentences,
            parameter_ids,
        })
    }

    pub fn sentences(&self) -> &[AnnotatedSentence] {
        &self.sentences
    }

    /// `kb_name(kb_id)` for every estimate
    pub fn parameter_ids(&self) -> &[String] {
        &self.parameter_ids
    }
}

/// Split sentences into abstracts by pmid, keeping first-seen order
pub fn group_abstracts(sentences: Vec<AnnotatedSentence>) -> Result<Vec<Abstract>> {
    let mut groups: Vec<Vec<AnnotatedSentence>> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();

    for sentence in sentences {
        let pmid = sentence
            .sentence()
            .pmid
            .clone()
            .ok_or_else(|| PkError::Validation("Sentence without pmid".to_string()))?;
        match index.get(&pmid) {
            Some(&position) => groups[position].push(sentence),
            None => {
                index.insert(pmid, groups.len());
                groups.push(vec![sentence]);
            }
        }
    }

    groups.into_iter().map(Abstract::new).collect()
}

// ============================================================================
// Abstracts Database
// ============================================================================

/// Share of one parameter identifier among all estimates
#[derive(Debug, Clone, PartialEq)]
pub struct ParameterFrequency {
    pub id: String,
    pub count: usize,
    pub percentage: f64,
}

impl std::fmt::Display for ParameterFrequency {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} - {:.2}% (n={})", self.id, self.percentage, self.count)
    }
}

/// Position of a database row: (abstract, sentence, estimate)
type RowIndex = (usize, usize, usize);

/// Abstracts flattened into numbered database records
#[derive(Debug, Clone)]
pub struct AbstractsDb {
    abstracts: Vec<Abstract>,
    config: RecordsConfig,
    rows: Vec<(RowIndex, EstimateRecord)>,
}

impl AbstractsDb {
    pub fn new(abstracts: Vec<Abstract>) -> Self {
        Self::with_config(abstracts, RecordsConfig::default())
    }

    pub fn with_config(abstracts: Vec<Abstract>, config: RecordsConfig) -> Self {
        let mut rows = Vec::new();
        for (a, abstract_) in abstracts.iter().enumerate() {
            for (s, sentence) in abstract_.sentences().iter().enumerate() {
                for (record, e) in sentence.indexed_records(config.deduplicate_estimates) {
                    rows.push(((a, s, e), record));
                }
            }
        }

        Self {
            abstracts,
            config,
            rows,
        }
    }

    pub fn abstracts(&self) -> &[Abstract] {
        &self.abstracts
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Parameter identifiers, most common first
    pub fn parameter_frequencies(&self) -> Vec<ParameterFrequency> {
        let ranked = most_common(
            self.abstracts
                .iter()
                .flat_map(|a| a.parameter_ids())
                .map(String::as_str),
        );
        let total: usize = ranked.iter().map(|(_, count)| count).sum();

        ranked
            .into_iter()
            .map(|(id, count)| ParameterFrequency {
                percentage: count as f64 * 100.0 / total as f64,
                id,
                count,
            })
            .collect()
    }

    /// Database rows numbered from zero
    pub fn to_records(&self) -> Vec<DatabaseRecord> {
        let base = self.config.article_url_base.trim_end_matches('/');

        self.rows
            .iter()
            .enumerate()
            .map(|(id, ((a, s, _), record))| {
                let abstract_ = &self.abstracts[*a];
                DatabaseRecord {
                    pmid: abstract_.pmid.clone(),
                    parameter: record.parameter.clone(),
                    param_type: record.param_id.clone(),
                    value: record.value.clone(),
                    units: record.units_std.clone(),
                    compare: record.compare.clone(),
                    sentence: abstract_.sentences[*s].sentence().text.clone(),
                    title: abstract_.title.clone(),
                    url: format!("[Article Link]({}/{}/)", base, abstract_.pmid),
                    id,
                }
            })
            .collect()
    }

    /// Estimate behind the record with the given `ID`
    pub fn estimate(&self, id: usize) -> Option<&Estimate> {
        let ((a, s, e), _) = self.rows.get(id)?;
        self.abstracts
            .get(*a)?
            .sentences()
            .get(*s)?
            .estimates()
            .get(*e)
    }
}
