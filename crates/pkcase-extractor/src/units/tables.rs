//! Built-in unit vocabularies

use serde::{Deserialize, Serialize};

/// Canonical multiplication glyph
pub const DOT: char = '·';

/// Glyphs used for multiplication in the literature
pub(crate) const MULTIPLICATION_GLYPHS: &[char] = &['x', '*', '×', '•', ' ', '⋅'];

/// Bracket characters trimmed from factors after exponent splitting
pub(crate) const BRACKETS: &[char] = &['(', ')', '{', '}', '[', ']'];

/// Canonical atomic unit -> free-text variants
pub(crate) const UNIT_SYNONYMS: &[(&str, &[&str])] = &[
    ("μg", &["micrograms", "micro g", "microg", "microgram", "µg", "mug"]),
    ("h", &["hr", "hrs", "hour", "hours"]),
    ("%", &["percent", "percentage"]),
    ("μl", &["microliters", "microliter", "micro l", "microl", "µl"]),
    ("l", &["liters", "litre", "liter", "litres"]),
    ("dl", &["deciliter", "dliter"]),
    ("min", &["minutes", "minute", "mins"]),
    ("d", &["days", "day"]),
    ("month", &["months"]),
    ("kg", &["kilogram", "kilograms"]),
    ("s", &["sec"]),
    ("ms", &["milisec", "miliseconds", "msec"]),
    ("nM", &["nmol", "nanomol"]),
    ("mM", &["mmol", "milimol"]),
    ("μM", &["mumol", "micromol", "micromols", "μmol", "µmol", "µM"]),
    ("pM", &["pmol", "pmols", "picomol"]),
];

/// Magnitude -> canonical atomic units
pub(crate) const MAGNITUDE_UNITS: &[(Magnitude, &[&str])] = &[
    (Magnitude::Time, &["ms", "s", "min", "h", "d", "month"]),
    (Magnitude::Mass, &["ng", "μg", "mg", "g", "kg", "pg"]),
    (Magnitude::Volume, &["nl", "μl", "ml", "l", "dl"]),
    (Magnitude::Concentration, &["pM", "nM", "μM", "mM", "M"]),
    (Magnitude::Percentage, &["%"]),
];

/// Coarse physical dimension of an atomic unit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Magnitude {
    Time,
    Mass,
    Volume,
    Concentration,
    Percentage,
}

impl Magnitude {
    /// Get the string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Time => "TIME",
            Self::Mass => "MASS",
            Self::Volume => "VOLUME",
            Self::Concentration => "CONCENTRATION",
            Self::Percentage => "PERCENTAGE",
        }
    }

    /// Get from string (case-insensitive)
    pub fn from_name(s: &str) -> Option<Self> {
        match s.to_uppercase().as_str() {
            "TIME" => Some(Self::Time),
            "MASS" => Some(Self::Mass),
            "VOLUME" => Some(Self::Volume),
            "CONCENTRATION" => Some(Self::Concentration),
            "PERCENTAGE" => Some(Self::Percentage),
            _ => None,
        }
    }
}

impl std::fmt::Display for Magnitude {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_magnitude_names() {
        assert_eq!(Magnitude::Concentration.to_string(), "CONCENTRATION");
        assert_eq!(Magnitude::from_name("time"), Some(Magnitude::Time));
        assert_eq!(Magnitude::from_name("LENGTH"), None);
    }

    #[test]
    fn test_synonyms_are_unambiguous() {
        let mut seen = HashSet::new();
        for (_, synonyms) in UNIT_SYNONYMS {
            for synonym in *synonyms {
                assert!(seen.insert(*synonym), "duplicate synonym {synonym}");
            }
        }
    }

    #[test]
    fn test_canonical_units_have_magnitudes() {
        let known: HashSet<&str> = MAGNITUDE_UNITS
            .iter()
            .flat_map(|(_, units)| units.iter().copied())
            .collect();

        for (canonical, _) in UNIT_SYNONYMS {
            assert!(known.contains(canonical), "{canonical} has no magnitude");
        }
    }
}
