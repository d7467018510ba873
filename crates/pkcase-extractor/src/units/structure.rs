//! Structural stages: division flattening, exponent parsing, partition
//!
//! Input is a lexically cleaned mention (only `·` separates factors). Output is
//! a [`Fraction`] of atomic numerator and denominator units.

use once_cell::sync::Lazy;
use regex::Regex;

use super::tables::{BRACKETS, DOT};

/// Compound factor with a negative exponent: `(ml·kg)-1`, `(ml·kg)(−1)`
static COMPOUND_EXPONENT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\(.*?\)(?:[-−]\d+|\([-−]\d+\))").unwrap());

/// Atomic factor with a negative exponent: `kg-1`, `kg(−1)`
static ATOMIC_EXPONENT: Lazy<Regex> = Lazy::new(|| Regex::new(r"\([-−]\d+\)|[-−]\d+").unwrap());

/// Exponent splitter used when compound factors are present
static SINGLE_DIGIT_EXPONENT: Lazy<Regex> = Lazy::new(|| Regex::new(r"[-−]\d").unwrap());

/// "per 70 kg body weight" spellings
static BODY_WEIGHT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"70·kg\(-1\)|70·kg-1|70·\(kg\)-1").unwrap());

/// Canonical text of the body-weight factor
pub const BODY_WEIGHT_UNIT: &str = "70·kg";

/// A factor with its optional exponent
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Term {
    pub base: String,
    pub exponent: Option<String>,
    /// Never split at inner `·`
    pub atomic: bool,
}

impl Term {
    fn plain(base: impl Into<String>) -> Self {
        Self {
            base: base.into(),
            exponent: None,
            atomic: false,
        }
    }

    fn body_weight() -> Self {
        Self {
            base: BODY_WEIGHT_UNIT.to_string(),
            exponent: Some("-1".to_string()),
            atomic: true,
        }
    }

    /// Build from exponent-split pieces; the first is the base, the second
    /// the exponent, anything further is dropped.
    fn from_pieces(mut pieces: Vec<String>) -> Option<Self> {
        match pieces.len() {
            0 => None,
            1 => pieces.pop().map(Self::plain),
            _ => {
                let exponent = pieces.swap_remove(1);
                let base = pieces.swap_remove(0);
                Some(Self {
                    base,
                    exponent: Some(exponent),
                    atomic: false,
                })
            }
        }
    }
}

/// Atomic units above and below the fraction bar
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct Fraction {
    pub numerator: Vec<String>,
    pub denominator: Vec<String>,
}

// ============================================================================
// Stage: Division flattening
// ============================================================================

/// Rewrite `a/b/c` as `a·(b·c)(-1)`.
///
/// Everything after the first `/` is inverted as a single compound factor.
pub(crate) fn flatten_division(mention: &str) -> String {
    match mention.split_once('/') {
        Some((head, tail)) => {
            let tail = tail.replace('/', &DOT.to_string());
            format!("{head}{DOT}({tail})(-1)")
                .trim_matches(DOT)
                .to_string()
        }
        None => mention.to_string(),
    }
}

// ============================================================================
// Stage: Exponent/bracket parsing
// ============================================================================

/// Split a mention into exponent-annotated terms.
///
/// Falls back to a single undivided numerator term when neither bracket
/// convention is present.
pub(crate) fn parse_terms(mention: &str) -> Vec<Term> {
    if COMPOUND_EXPONENT.is_match(mention) {
        split_with_body_weight(mention, true, &SINGLE_DIGIT_EXPONENT)
    } else if ATOMIC_EXPONENT.is_match(mention) {
        split_with_body_weight(mention, false, &ATOMIC_EXPONENT)
    } else {
        vec![Term::plain(mention)]
    }
}

fn split_with_body_weight(mention: &str, bracket_aware: bool, exponent: &Regex) -> Vec<Term> {
    let has_body_weight = BODY_WEIGHT.is_match(mention);
    let remainder = if has_body_weight {
        BODY_WEIGHT.split(mention).collect::<String>()
    } else {
        mention.to_string()
    };

    let factors = if bracket_aware {
        split_outside_brackets(&remainder)
    } else {
        remainder
            .split(DOT)
            .filter(|f| !f.is_empty())
            .map(str::to_string)
            .collect()
    };

    let mut terms: Vec<Term> = factors
        .iter()
        .filter_map(|factor| Term::from_pieces(split_exponent(factor, exponent)))
        .collect();

    if has_body_weight {
        terms.push(Term::body_weight());
    }
    terms
}

/// Split at each `·` whose next bracket to the right is an opening one (or
/// that has no closing bracket after it at all).
fn split_outside_brackets(mention: &str) -> Vec<String> {
    let mut factors = Vec::new();
    let mut current = String::new();

    for (i, c) in mention.char_indices() {
        if c == DOT {
            let rest = &mention[i + c.len_utf8()..];
            let splits = match rest.find(')') {
                None => true,
                Some(close) => rest[..close].contains('('),
            };
            if splits {
                factors.push(std::mem::take(&mut current));
                continue;
            }
        }
        current.push(c);
    }
    factors.push(current);

    factors.retain(|f| !f.is_empty());
    factors
}

/// Split a factor around its exponent matches, keeping the matches, trimming
/// brackets and normalizing the Unicode minus sign.
fn split_exponent(factor: &str, exponent: &Regex) -> Vec<String> {
    let mut pieces = Vec::new();
    let mut last = 0;
    for m in exponent.find_iter(factor) {
        pieces.push(&factor[last..m.start()]);
        pieces.push(m.as_str());
        last = m.end();
    }
    pieces.push(&factor[last..]);

    pieces
        .into_iter()
        .map(|p| p.trim_matches(BRACKETS).replace('−', "-"))
        .filter(|p| !p.is_empty())
        .collect()
}

// ============================================================================
// Stage: Numerator/denominator partition
// ============================================================================

/// Sort terms above or below the fraction bar and break compound factors
/// into atomic units.
pub(crate) fn partition(terms: Vec<Term>) -> Fraction {
    let mut fraction = Fraction::default();

    for term in terms {
        match term.exponent.as_deref() {
            None => push_units(&mut fraction.numerator, &term.base, term.atomic),
            Some("-1") => push_units(&mut fraction.denominator, &term.base, term.atomic),
            Some(power) => {
                let powered = format!("({}){}", term.base, power.replace('-', "^"));
                fraction.denominator.push(powered);
            }
        }
    }
    fraction
}

fn push_units(out: &mut Vec<String>, base: &str, atomic: bool) {
    if atomic {
        out.push(base.to_string());
        return;
    }

    let mut depth = 0usize;
    let mut current = String::new();
    for c in base.chars() {
        match c {
            '(' => depth += 1,
            ')' => depth = depth.saturating_sub(1),
            _ => {}
        }
        if c == DOT && depth == 0 {
            if !current.is_empty() {
                out.push(std::mem::take(&mut current));
            }
            continue;
        }
        current.push(c);
    }
    if !current.is_empty() {
        out.push(current);
    }
}
