//! Unit normalization
//!
//! Maps free-text unit mentions ("mg/kg/h", "mug.kg-1.h-1", "micrograms
//! per kilogram per hour") to a canonical numerator/denominator string and to
//! coarse physical magnitudes.
//!
//! The pipeline is a sequence of pure stages:
//! 1. lexical cleanup, dot disambiguation, multiplication glyphs, synonyms
//! 2. division flattening
//! 3. exponent/bracket parsing
//! 4. numerator/denominator partition
//! 5. canonical mention and magnitude assembly
//!
//! No stage fails; unrecognized structure is carried through verbatim and
//! reported through [`NormalizedUnit::all_converted`].

mod canonical;
mod lexical;
mod structure;
mod tables;

use std::collections::HashMap;

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

use pkcase_core::{PkError, Result, UnitsConfig};

pub use structure::BODY_WEIGHT_UNIT;
pub use tables::{Magnitude, DOT};

use tables::{MAGNITUDE_UNITS, UNIT_SYNONYMS};

static DEFAULT_NORMALIZER: Lazy<UnitNormalizer> = Lazy::new(UnitNormalizer::new);

/// Normalize a unit mention with the built-in tables
pub fn normalize(raw: &str) -> NormalizedUnit {
    DEFAULT_NORMALIZER.normalize(raw)
}

/// Process-wide normalizer with the built-in tables
pub fn default_normalizer() -> &'static UnitNormalizer {
    &DEFAULT_NORMALIZER
}

/// Canonical form of a unit mention
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NormalizedUnit {
    /// `"[num] / [denom]"`, `"num"`, `"1/[denom]"` or `""`
    pub mention: String,

    /// Same layout as `mention` with magnitude names
    pub magnitude: String,

    /// Whether every atomic unit had a known magnitude
    pub all_converted: bool,

    /// Sorted atomic numerator units
    pub numerator: Vec<String>,

    /// Sorted atomic denominator units
    pub denominator: Vec<String>,
}

impl NormalizedUnit {
    pub fn is_empty(&self) -> bool {
        self.mention.is_empty()
    }

    /// `(mention, magnitude, all_converted)`
    pub fn as_tuple(&self) -> (&str, &str, bool) {
        (&self.mention, &self.magnitude, self.all_converted)
    }
}

/// Unit normalizer holding immutable synonym and magnitude lookups
#[derive(Debug, Clone)]
pub struct UnitNormalizer {
    /// Synonym (and `synonym-1`) -> canonical unit
    synonyms: HashMap<String, String>,
    /// Canonical atomic unit -> magnitude
    magnitudes: HashMap<String, Magnitude>,
}

impl UnitNormalizer {
    /// Create a normalizer with the built-in tables
    pub fn new() -> Self {
        let mut normalizer = Self {
            synonyms: HashMap::new(),
            magnitudes: HashMap::new(),
        };

        for (canonical, synonyms) in UNIT_SYNONYMS {
            for synonym in *synonyms {
                normalizer.add_synonym(canonical, synonym);
            }
        }
        for (magnitude, units) in MAGNITUDE_UNITS {
            for unit in *units {
                normalizer.add_magnitude_unit(*magnitude, unit);
            }
        }
        normalizer
    }

    /// Create a normalizer with the built-in tables extended from config
    pub fn from_config(config: &UnitsConfig) -> Result<Self> {
        let mut normalizer = Self::new();

        for (canonical, synonyms) in &config.extra_synonyms {
            for synonym in synonyms {
                normalizer.add_synonym(canonical, synonym);
            }
        }
        for (name, units) in &config.extra_magnitudes {
            let magnitude = Magnitude::from_name(name)
                .ok_or_else(|| PkError::Config(format!("Unknown magnitude: {name}")))?;
            for unit in units {
                normalizer.add_magnitude_unit(magnitude, unit);
            }
        }
        Ok(normalizer)
    }

    /// Register a synonym; its inverse `-1` form is registered as well
    pub fn add_synonym(&mut self, canonical: &str, synonym: &str) {
        self.synonyms.insert(synonym.to_string(), canonical.to_string());
        self.synonyms.insert(format!("{synonym}-1"), format!("{canonical}-1"));
    }

    /// Register an atomic unit under a magnitude
    pub fn add_magnitude_unit(&mut self, magnitude: Magnitude, unit: &str) {
        self.magnitudes.insert(unit.to_string(), magnitude);
    }

    /// Magnitude of a canonical atomic unit
    pub fn magnitude_of(&self, unit: &str) -> Option<Magnitude> {
        self.magnitudes.get(unit).copied()
    }

    /// Run only the lexical stages
    pub fn standardize(&self, raw: &str) -> String {
        let mention = lexical::clean_phrases(raw);
        let mention = lexical::disambiguate_dots(&mention);
        let mention = lexical::unify_multiplication(&mention);
        lexical::substitute_synonyms(&mention, &self.synonyms)
    }

    /// Normalize a unit mention
    pub fn normalize(&self, raw: &str) -> NormalizedUnit {
        let standardized = self.standardize(raw);
        let flattened = structure::flatten_division(&standardized);
        let terms = structure::parse_terms(&flattened);
        let fraction = structure::partition(terms);
        let unit = canonical::assemble(fraction, &self.magnitudes);

        if !unit.all_converted && !unit.is_empty() {
            tracing::debug!(
                "Unit mention '{}' only partially recognized as '{}'",
                raw,
                unit.magnitude
            );
        }
        unit
    }
}

impl Default for UnitNormalizer {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// Tests
// ============================================================================
