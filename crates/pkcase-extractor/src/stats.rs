//! Summary statistics over database records

use std::collections::{HashMap, HashSet};

use serde::Serialize;

use pkcase_core::DatabaseRecord;

use crate::value;

/// Counts in descending order; ties keep first-seen order
pub(crate) fn most_common<'a, I>(items: I) -> Vec<(String, usize)>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut order: Vec<&str> = Vec::new();
    let mut counts: HashMap<&str, usize> = HashMap::new();
    for item in items {
        let count = counts.entry(item).or_insert(0);
        if *count == 0 {
            order.push(item);
        }
        *count += 1;
    }

    let mut ranked: Vec<(String, usize)> = order
        .into_iter()
        .map(|item| (item.to_string(), counts[item]))
        .collect();
    ranked.sort_by(|a, b| b.1.cmp(&a.1));
    ranked
}

fn median(mut values: Vec<f64>) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    values.sort_by(f64::total_cmp);

    let mid = values.len() / 2;
    if values.len() % 2 == 0 {
        Some((values[mid - 1] + values[mid]) / 2.0)
    } else {
        Some(values[mid])
    }
}

/// Overview of a record selection
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RecordStats {
    /// Distinct PMIDs
    pub abstracts: usize,
    pub estimates: usize,
    pub top_types: Vec<(String, usize)>,
    /// Standardized units, empty units excluded
    pub top_units: Vec<(String, usize)>,
    /// Median over values that parse as a number or range
    pub median_value: Option<f64>,
}

impl RecordStats {
    pub fn from_records(records: &[DatabaseRecord], top_types: usize, top_units: usize) -> Self {
        let abstracts = records
            .iter()
            .map(|r| r.pmid.as_str())
            .collect::<HashSet<_>>()
            .len();

        let mut types = most_common(records.iter().map(|r| r.param_type.as_str()));
        types.truncate(top_types);

        let mut units = most_common(
            records
                .iter()
                .map(|r| r.units.as_str())
                .filter(|u| !u.is_empty()),
        );
        units.truncate(top_units);

        let values = records
            .iter()
            .filter_map(|r| value::numeric_value(&r.value))
            .collect();

        Self {
            abstracts,
            estimates: records.len(),
            top_types: types,
            top_units: units,
            median_value: median(values),
        }
    }
}

impl std::fmt::Display for RecordStats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "# Abstracts: {}", self.abstracts)?;
        writeln!(f, "# Estimates: {}", self.estimates)?;
        if let Some(median) = self.median_value {
            writeln!(f, "Median: {median}")?;
        }
        writeln!(f, "Top types:")?;
        for (name, count) in &self.top_types {
            writeln!(f, "  {name} (n={count})")?;
        }
        writeln!(f, "Top units:")?;
        for (name, count) in &self.top_units {
            writeln!(f, "  {name} (n={count})")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(pmid: &str, param_type: &str, value: &str, units: &str) -> DatabaseRecord {
        DatabaseRecord {
            pmid: pmid.to_string(),
            parameter: "CL".to_string(),
            param_type: param_type.to_string(),
            value: value.to_string(),
            units: units.to_string(),
            compare: String::new(),
            sentence: String::new(),
            title: String::new(),
            url: String::new(),
            id: 0,
        }
    }

    #[test]
    fn test_most_common_tie_order() {
        let ranked = most_common(["b", "a", "a", "c", "b", "d"]);
        assert_eq!(
            ranked,
            vec![
                ("b".to_string(), 2),
                ("a".to_string(), 2),
                ("c".to_string(), 1),
                ("d".to_string(), 1)
            ]
        );
    }

    #[test]
    fn test_median() {
        assert_eq!(median(vec![]), None);
        assert_eq!(median(vec![3.0, 1.0, 2.0]), Some(2.0));
        assert_eq!(median(vec![4.0, 1.0, 2.0, 3.0]), Some(2.5));
    }

    #[test]
    fn test_record_stats() {
        let records = vec![
            record("1", "clearance-Q1", "2", "[l] / [h]"),
            record("1", "half-life-Q2", "4-8", "h"),
            record("2", "clearance-Q1", "n.d.", ""),
        ];
        let stats = RecordStats::from_records(&records, 1, 10);

        assert_eq!(stats.abstracts, 2);
        assert_eq!(stats.estimates, 3);
        assert_eq!(stats.top_types, vec![("clearance-Q1".to_string(), 2)]);
        assert_eq!(stats.top_units.len(), 2);
        assert_eq!(stats.median_value, Some(4.0));
        assert!(stats.to_string().contains("# Abstracts: 2"));
    }
}
