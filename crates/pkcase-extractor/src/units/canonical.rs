//! Canonical mention and magnitude assembly

use std::collections::HashMap;

use super::structure::Fraction;
use super::tables::{Magnitude, DOT};
use super::NormalizedUnit;

/// Sort both sides of the fraction and render mention and magnitudes.
pub(crate) fn assemble(
    fraction: Fraction,
    magnitudes: &HashMap<String, Magnitude>,
) -> NormalizedUnit {
    let Fraction {
        mut numerator,
        mut denominator,
    } = fraction;

    numerator.sort();
    denominator.sort();
    if denominator.len() == 1 && denominator[0] == "1" {
        denominator.clear();
    }

    let (mention, magnitude, all_converted) = match (numerator.is_empty(), denominator.is_empty()) {
        (false, false) => {
            let (num_mag, num_ok) = to_magnitudes(&numerator, magnitudes);
            let (den_mag, den_ok) = to_magnitudes(&denominator, magnitudes);
            (
                format!("[{}] / [{}]", join(&numerator), join(&denominator)),
                format!("{num_mag} / {den_mag}"),
                num_ok && den_ok,
            )
        }
        (false, true) => {
            let (num_mag, ok) = to_magnitudes(&numerator, magnitudes);
            (join(&numerator), num_mag, ok)
        }
        (true, false) => {
            let (den_mag, ok) = to_magnitudes(&denominator, magnitudes);
            (
                format!("1/[{}]", join(&denominator)),
                format!("1/{den_mag}"),
                ok,
            )
        }
        (true, true) => return NormalizedUnit::default(),
    };

    NormalizedUnit {
        mention,
        magnitude,
        all_converted,
        numerator,
        denominator,
    }
}

/// Map atomic units to magnitude names; unknown units pass through verbatim.
fn to_magnitudes(units: &[String], table: &HashMap<String, Magnitude>) -> (String, bool) {
    let mut all_converted = true;
    let mut names: Vec<&str> = units
        .iter()
        .map(|unit| match table.get(unit) {
            Some(magnitude) => magnitude.as_str(),
            None => {
                all_converted = false;
                unit.as_str()
            }
        })
        .collect();
    names.sort_unstable();

    (names.join(&DOT.to_string()), all_converted)
}

fn join(units: &[String]) -> String {
    units.join(&DOT.to_string())
}
