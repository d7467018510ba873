//! Reconstructed PK estimates

use serde::Serialize;

use pkcase_core::EstimateRecord;

use crate::span::Span;
use crate::units::{NormalizedUnit, UnitNormalizer};

/// Spans making up one estimate
#[derive(Debug, Clone)]
pub struct EstimateParts {
    pub parameter: Span,
    pub central_value: Span,
    pub central_units: Option<Span>,
    pub deviation_value: Option<Span>,
    pub deviation_units: Option<Span>,
    pub comparator: Option<Span>,
}

/// A parameter with its central value and optional context
///
/// Unit normalizations are computed once at construction.
#[derive(Debug, Clone, Serialize)]
pub struct Estimate {
    parameter: Span,
    central_value: Span,
    central_units: Option<Span>,
    deviation_value: Option<Span>,
    deviation_units: Option<Span>,
    comparator: Option<Span>,
    units_std: NormalizedUnit,
    deviation_units_std: NormalizedUnit,
}

impl Estimate {
    pub fn new(parts: EstimateParts, normalizer: &UnitNormalizer) -> Self {
        let normalize = |span: &Option<Span>| {
            span.as_ref()
                .map(|s| normalizer.normalize(&s.text))
                .unwrap_or_default()
        };
        let units_std = normalize(&parts.central_units);
        let deviation_units_std = normalize(&parts.deviation_units);

        Self {
            parameter: parts.parameter,
            central_value: parts.central_value,
            central_units: parts.central_units,
            deviation_value: parts.deviation_value,
            deviation_units: parts.deviation_units,
            comparator: parts.comparator,
            units_std,
            deviation_units_std,
        }
    }

    pub fn parameter(&self) -> &Span {
        &self.parameter
    }

    pub fn central_value(&self) -> &Span {
        &self.central_value
    }

    pub fn central_units(&self) -> Option<&Span> {
        self.central_units.as_ref()
    }

    pub fn deviation_value(&self) -> Option<&Span> {
        self.deviation_value.as_ref()
    }

    pub fn deviation_units(&self) -> Option<&Span> {
        self.deviation_units.as_ref()
    }

    pub fn comparator(&self) -> Option<&Span> {
        self.comparator.as_ref()
    }

    /// Normalization of the central units; empty when there are none
    pub fn normalized_units(&self) -> &NormalizedUnit {
        &self.units_std
    }

    pub fn normalized_deviation_units(&self) -> &NormalizedUnit {
        &self.deviation_units_std
    }

    /// `kb_name-kb_id` of the parameter
    pub fn param_id(&self) -> String {
        self.parameter
            .kb
            .as_ref()
            .map(|kb| kb.param_id())
            .unwrap_or_default()
    }

    /// `kb_name(kb_id)` of the parameter
    pub fn parameter_key(&self) -> String {
        self.parameter
            .kb
            .as_ref()
            .map(|kb| kb.key())
            .unwrap_or_default()
    }

    /// Flat string view; absent fields are empty
    pub fn to_record(&self) -> EstimateRecord {
        let text = |span: Option<&Span>| span.map(|s| s.text.clone()).unwrap_or_default();

        EstimateRecord {
            parameter: self.parameter.text.clone(),
            param_id: self.param_id(),
            value: self.central_value.text.clone(),
            units: text(self.central_units()),
            units_std: self.units_std.mention.clone(),
            deviation: text(self.deviation_value()),
            dev_units: text(self.deviation_units()),
            dev_units_std: self.deviation_units_std.mention.clone(),
            compare: text(self.comparator()),
        }
    }

    /// Distinct spans of the estimate
    pub fn entities(&self) -> Vec<&Span> {
        let candidates = [
            Some(&self.parameter),
            Some(&self.central_value),
            self.central_units.as_ref(),
            self.deviation_value.as_ref(),
            self.deviation_units.as_ref(),
            self.comparator.as_ref(),
        ];

        let mut entities: Vec<&Span> = Vec::with_capacity(candidates.len());
        for span in candidates.into_iter().flatten() {
            if !entities.contains(&span) {
                entities.push(span);
            }
        }
        entities
    }
}
