//! Annotated sentence spans

use serde::{Deserialize, Serialize};

/// Entity labels produced by the PK NER model
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SpanLabel {
    /// PK parameter mention (clearance, half-life, ...)
    Parameter,
    Value,
    Range,
    Units,
    Compare,
    Unknown,
}

impl SpanLabel {
    /// Get the string representation used by the NER model
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Parameter => "PK",
            Self::Value => "VALUE",
            Self::Range => "RANGE",
            Self::Units => "UNITS",
            Self::Compare => "COMPARE",
            Self::Unknown => "UNKNOWN",
        }
    }

    /// Parse a model label; unrecognized labels map to `Unknown`
    pub fn parse(s: &str) -> Self {
        match s.to_uppercase().as_str() {
            "PK" | "PARAMETER" => Self::Parameter,
            "VALUE" => Self::Value,
            "RANGE" => Self::Range,
            "UNITS" => Self::Units,
            "COMPARE" => Self::Compare,
            _ => Self::Unknown,
        }
    }

    /// VALUE or RANGE
    pub fn is_measurement(&self) -> bool {
        matches!(self, Self::Value | Self::Range)
    }
}

impl std::fmt::Display for SpanLabel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Index of a span within its sentence
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SpanId(pub usize);

/// Knowledge-base link attached to a parameter span
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KbEntry {
    pub id: Option<String>,
    pub name: Option<String>,
}

impl KbEntry {
    /// `name-id`
    pub fn param_id(&self) -> String {
        self.joined("-", "")
    }

    /// `name(id)`
    pub fn key(&self) -> String {
        self.joined("(", ")")
    }

    fn joined(&self, open: &str, close: &str) -> String {
        match (self.name.as_deref(), self.id.as_deref()) {
            (Some(name), Some(id)) => format!("{name}{open}{id}{close}"),
            (Some(name), None) => name.to_string(),
            (None, Some(id)) => id.to_string(),
            (None, None) => String::new(),
        }
    }
}

/// A labeled substring of a sentence
///
/// Offsets are character offsets with `start < end`. Two spans are equal when
/// offsets and label match.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Span {
    pub id: SpanId,
    pub start: usize,
    pub end: usize,
    pub label: SpanLabel,
    pub text: String,
    /// Set on parameter spans linked by the NER model
    pub kb: Option<KbEntry>,
}

impl Span {
    pub fn is_parameter(&self) -> bool {
        self.label == SpanLabel::Parameter
    }

    /// `(start, end, label)`
    pub fn key(&self) -> (usize, usize, SpanLabel) {
        (self.start, self.end, self.label)
    }
}

impl PartialEq for Span {
    fn eq(&self, other: &Self) -> bool {
        self.key() == other.key()
    }
}

impl Eq for Span {}

impl std::hash::Hash for Span {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.key().hash(state);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn span(id: usize, start: usize, end: usize, label: SpanLabel, text: &str) -> Span {
        Span {
            id: SpanId(id),
            start,
            end,
            label,
            text: text.to_string(),
            kb: None,
        }
    }

    #[test]
    fn test_label_parse() {
        assert_eq!(SpanLabel::parse("PK"), SpanLabel::Parameter);
        assert_eq!(SpanLabel::parse("parameter"), SpanLabel::Parameter);
        assert_eq!(SpanLabel::parse("RANGE"), SpanLabel::Range);
        assert_eq!(SpanLabel::parse("CHEMICAL"), SpanLabel::Unknown);
        assert_eq!(SpanLabel::Units.to_string(), "UNITS");
    }

    #[test]
    fn test_measurement_labels() {
        assert!(SpanLabel::Value.is_measurement());
        assert!(SpanLabel::Range.is_measurement());
        assert!(!SpanLabel::Units.is_measurement());
    }

    #[test]
    fn test_span_equality_ignores_text() {
        let a = span(0, 3, 7, SpanLabel::Value, "0.32");
        let b = span(4, 3, 7, SpanLabel::Value, "0.33");
        let c = span(0, 3, 7, SpanLabel::Range, "0.32");

        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn test_kb_formatting() {
        let kb = KbEntry {
            id: Some("Q1".to_string()),
            name: Some("clearance".to_string()),
        };
        assert_eq!(kb.param_id(), "clearance-Q1");
        assert_eq!(kb.key(), "clearance(Q1)");

        let name_only = KbEntry {
            id: None,
            name: Some("clearance".to_string()),
        };
        assert_eq!(name_only.param_id(), "clearance");
    }
}
