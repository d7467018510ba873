//! Interchange records
//!
//! Plain serde structures at the boundary of the extraction pipeline. Inference
//! services and annotation exports produce [`SentenceRecord`]s; the pipeline
//! produces [`EstimateRecord`]s and [`DatabaseRecord`]s for display and export.

use serde::{Deserialize, Deserializer, Serialize};

// ============================================================================
// Input Records
// ============================================================================

/// An annotated character span as emitted by a NER model
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpanRecord {
    /// Character offset of the first character
    pub start: usize,

    /// Character offset one past the last character
    pub end: usize,

    /// Entity label (PK/PARAMETER, VALUE, RANGE, UNITS, COMPARE)
    pub label: String,

    /// Knowledge-base identifier (parameters only)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kb_id: Option<String>,

    /// Knowledge-base canonical name (parameters only)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kb_name: Option<String>,
}

impl SpanRecord {
    /// Create a span record without knowledge-base information
    pub fn new(start: usize, end: usize, label: impl Into<String>) -> Self {
        Self {
            start,
            end,
            label: label.into(),
            kb_id: None,
            kb_name: None,
        }
    }

    /// Attach a knowledge-base entry
    pub fn with_kb(mut self, kb_id: impl Into<String>, kb_name: impl Into<String>) -> Self {
        self.kb_id = Some(kb_id.into());
        self.kb_name = Some(kb_name.into());
        self
    }
}

/// A labeled edge between two spans of the same sentence
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelationRecord {
    /// Relation label (C_VAL, D_VAL, RELATED, NO_RELATION)
    pub label: String,

    #[serde(alias = "head_span")]
    pub left: SpanRecord,

    #[serde(alias = "child_span")]
    pub right: SpanRecord,
}

impl RelationRecord {
    pub fn new(label: impl Into<String>, left: SpanRecord, right: SpanRecord) -> Self {
        Self {
            label: label.into(),
            left,
            right,
        }
    }
}

/// One sentence with its predicted relations
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SentenceRecord {
    /// Raw sentence text
    pub text: String,

    /// Predicted relations
    #[serde(default)]
    pub relations: Vec<RelationRecord>,

    /// Source article identifier
    #[serde(
        default,
        deserialize_with = "string_or_number",
        skip_serializing_if = "Option::is_none"
    )]
    pub pmid: Option<String>,

    /// Whether the sentence belongs to the article title
    #[serde(default)]
    pub is_title: bool,
}

impl SentenceRecord {
    pub fn new(text: impl Into<String>, relations: Vec<RelationRecord>) -> Self {
        Self {
            text: text.into(),
            relations,
            pmid: None,
            is_title: false,
        }
    }

    /// Set the source article identifier
    pub fn with_pmid(mut self, pmid: impl Into<String>) -> Self {
        self.pmid = Some(pmid.into());
        self
    }

    /// Mark as a title sentence
    pub fn as_title(mut self) -> Self {
        self.is_title = true;
        self
    }
}

/// PubMed ids show up both quoted and as bare integers
fn string_or_number<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Text(String),
        Int(u64),
    }

    Ok(Option::<Raw>::deserialize(deserializer)?.map(|raw| match raw {
        Raw::Text(s) => s,
        Raw::Int(n) => n.to_string(),
    }))
}

// ============================================================================
// Output Records
// ============================================================================

/// Flat view of one reconstructed PK estimate
///
/// All fields are strings; absent optional fields are empty.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EstimateRecord {
    #[serde(rename = "Parameter")]
    pub parameter: String,

    #[serde(rename = "ParamID")]
    pub param_id: String,

    #[serde(rename = "Value")]
    pub value: String,

    #[serde(rename = "Units")]
    pub units: String,

    #[serde(rename = "Units_std")]
    pub units_std: String,

    #[serde(rename = "Deviation")]
    pub deviation: String,

    #[serde(rename = "DevUnits")]
    pub dev_units: String,

    #[serde(rename = "DevUnits_std")]
    pub dev_units_std: String,

    #[serde(rename = "Compare")]
    pub compare: String,
}

/// Row of the browsable estimates database
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatabaseRecord {
    #[serde(rename = "PMID")]
    pub pmid: String,

    #[serde(rename = "Parameter")]
    pub parameter: String,

    /// Parameter identifier (`kb_name-kb_id`)
    #[serde(rename = "Type")]
    pub param_type: String,

    #[serde(rename = "Value")]
    pub value: String,

    /// Standardized units
    #[serde(rename = "Units")]
    pub units: String,

    #[serde(rename = "Compare")]
    pub compare: String,

    #[serde(rename = "Sentence")]
    pub sentence: String,

    #[serde(rename = "Title")]
    pub title: String,

    /// Markdown link to the source article
    #[serde(rename = "URL")]
    pub url: String,

    #[serde(rename = "ID")]
    pub id: usize,
}

// ============================================================================
// Tests
// ============================================================================
