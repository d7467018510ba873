//! Lexical stages: cleanup, dot disambiguation, multiplication glyphs, synonyms
//!
//! Each stage is a total `&str -> String` function. Their composition turns a
//! raw mention such as `"Micrograms per kg.h-1"` into `"μg/kg·h-1"`.

use std::collections::HashMap;

use super::tables::{DOT, MULTIPLICATION_GLYPHS};

/// Lowercase everything except molar `M`, then fold phrase synonyms.
pub(crate) fn clean_phrases(raw: &str) -> String {
    let mut lowered = String::with_capacity(raw.len());
    for c in raw.trim().chars() {
        if c == 'M' {
            lowered.push(c);
        } else {
            lowered.extend(c.to_lowercase());
        }
    }

    lowered
        .replace("per cent", "%")
        .replace(" per ", "/")
        .replace("per ", "/")
        .replace("of", "")
        .replace("proteins", "")
        .replace("protein", "")
        .trim()
        .to_string()
}

/// Replace every `.` that is not a decimal point with the multiplication dot.
///
/// A `.` is a decimal point only when both neighbours in the input are digits,
/// so `"1.5.kg"` becomes `"1.5·kg"`.
pub(crate) fn disambiguate_dots(mention: &str) -> String {
    if !mention.contains('.') {
        return mention.to_string();
    }

    let chars: Vec<char> = mention.chars().collect();
    chars
        .iter()
        .enumerate()
        .map(|(i, &c)| {
            if c != '.' {
                return c;
            }
            let digit_before = i > 0 && chars[i - 1].is_ascii_digit();
            let digit_after = chars.get(i + 1).is_some_and(|n| n.is_ascii_digit());
            if digit_before && digit_after {
                c
            } else {
                DOT
            }
        })
        .collect()
}

/// Collapse all multiplication glyphs, and runs of them, into a single `·`.
pub(crate) fn unify_multiplication(mention: &str) -> String {
    let mut out = String::with_capacity(mention.len());
    for c in mention.chars() {
        let c = if MULTIPLICATION_GLYPHS.contains(&c) { DOT } else { c };
        if c == DOT && out.ends_with(DOT) {
            continue;
        }
        out.push(c);
    }
    out
}

/// Replace each `·`- or `/`-delimited token by its canonical unit.
pub(crate) fn substitute_synonyms(mention: &str, synonyms: &HashMap<String, String>) -> String {
    let lookup = |token: &str| -> String {
        synonyms
            .get(token)
            .cloned()
            .unwrap_or_else(|| token.to_string())
    };

    let substituted: Vec<String> = mention
        .split(DOT)
        .map(|token| if token == "per" { "/" } else { token })
        .map(|token| {
            if token.contains('/') {
                token.split('/').map(lookup).collect::<Vec<_>>().join("/")
            } else {
                lookup(token)
            }
        })
        .collect();

    substituted
        .join(&DOT.to_string())
        .replace("micro·", "μ")
        .replace("micro", "μ")
}
