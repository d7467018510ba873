//! pkcase Extractor - PK estimate reconstruction
//!
//! Turns NER/RE predictions over PubMed sentences into structured
//! pharmacokinetic estimates:
//! - Unit normalization of free-text unit mentions
//! - Relation graph reduction (C_VAL, D_VAL, RELATED) into estimates
//! - Corpus aggregation into abstracts and database records

use once_cell::sync::Lazy;

use pkcase_core::{Result, SentenceRecord};

pub mod corpus;
pub mod estimate;
pub mod relation;
pub mod sentence;
pub mod span;
pub mod stats;
pub mod units;
pub mod value;

pub use corpus::{group_abstracts, Abstract, AbstractsDb, AnnotatedSentence, ParameterFrequency};
pub use estimate::{Estimate, EstimateParts};
pub use relation::{EstimateReducer, Relation, RelationLabel};
pub use sentence::Sentence;
pub use span::{KbEntry, Span, SpanId, SpanLabel};
pub use stats::RecordStats;
pub use units::{normalize, Magnitude, NormalizedUnit, UnitNormalizer};

/// Trait for estimate extractors
pub trait EstimateExtractor: Send + Sync {
    fn extract(&self, sentence: &Sentence) -> Vec<Estimate>;
}

static DEFAULT_REDUCER: Lazy<EstimateReducer> =
    Lazy::new(|| EstimateReducer::with_normalizer(units::default_normalizer().clone()));

/// Validate a sentence record and reduce it with the built-in unit tables
pub fn extract_estimates(record: &SentenceRecord) -> Result<Vec<Estimate>> {
    let sentence = Sentence::from_record(record)?;
    Ok(DEFAULT_REDUCER.reduce(&sentence))
}
