// evaluation.rs - Scoring detected relations against reference relations

use crate::data::loaders::nexus::RelationMatrix;
use crate::data::relation::RelationType;
use crate::reporting::Reporter;
use serde::Serialize;
use std::collections::HashMap;

/// Relation type of reference matrices produced by the simulator
pub const REFERENCE_KIND: &str = "rcb";

/// Pair counts of a detection result compared with reference relations.
/// Every unordered gene pair is counted once.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct EvaluationReport {
    pub correct_lesser: usize,
    pub correct_higher: usize,
    /// Reported LESSER where the reference has something else
    pub wrong_lesser: usize,
    pub wrong_higher: usize,
    /// Reference LESSER reported as no relation
    pub missed_lesser: usize,
    pub missed_higher: usize,
    pub both_equal: usize,
    pub reference_lesser: usize,
    pub reference_higher: usize,
    pub skipped_pairs: usize,
    pub skipped_matrices: usize,
}

impl EvaluationReport {
    pub fn recognized(&self) -> usize {
        self.correct_lesser + self.correct_higher
    }

    pub fn wrong(&self) -> usize {
        self.wrong_lesser + self.wrong_higher
    }

    pub fn missed(&self) -> usize {
        self.missed_lesser + self.missed_higher
    }

    pub fn total_found(&self) -> usize {
        self.recognized() + self.wrong()
    }

    pub fn reference_total(&self) -> usize {
        self.reference_lesser + self.reference_higher
    }

    /// Share of reported relations that are correct, in percent
    pub fn precision(&self) -> Option<f64> {
        match self.total_found() {
            0 => None,
            found => Some(self.recognized() as f64 / found as f64 * 100.0),
        }
    }

    /// Share of reference relations that were found, in percent
    pub fn recall(&self) -> Option<f64> {
        match self.reference_total() {
            0 => None,
            total => Some(self.recognized() as f64 / total as f64 * 100.0),
        }
    }

    fn record(&mut self, found: RelationType, reference: RelationType) {
        match (found, reference) {
            (RelationType::Equal, RelationType::Equal) => self.both_equal += 1,
            (RelationType::Equal, RelationType::Lesser) => self.missed_lesser += 1,
            (RelationType::Equal, RelationType::Higher) => self.missed_higher += 1,
            (RelationType::Lesser, RelationType::Lesser) => self.correct_lesser += 1,
            (RelationType::Lesser, _) => self.wrong_lesser += 1,
            (RelationType::Higher, RelationType::Higher) => self.correct_higher += 1,
            (RelationType::Higher, _) => self.wrong_higher += 1,
        }
    }
}

fn relation_at(matrix: &RelationMatrix, i: usize, j: usize) -> RelationType {
    RelationType::from_matrix_value(matrix.values[i][j]).unwrap_or(RelationType::Equal)
}

/// Compare detected relation matrices with reference matrices.
///
/// Reference matrices of type `rcb` are used when present, otherwise all of
/// them. Matrices are matched by gene tree name and pairs by gene label.
pub fn evaluate(
    found: &[RelationMatrix],
    reference: &[RelationMatrix],
    reporter: &dyn Reporter,
) -> Result<EvaluationReport, String> {
    let typed: Vec<&RelationMatrix> = reference
        .iter()
        .filter(|m| m.kind.as_deref() == Some(REFERENCE_KIND))
        .collect();
    let selected: Vec<&RelationMatrix> = if typed.is_empty() {
        reference.iter().collect()
    } else {
        typed
    };
    if selected.is_empty() {
        return Err("No reference relations found".to_string());
    }

    let mut report = EvaluationReport::default();

    for matrix in &selected {
        for i in 0..matrix.labels.len() {
            for j in (i + 1)..matrix.labels.len() {
                match relation_at(matrix, i, j) {
                    RelationType::Lesser => report.reference_lesser += 1,
                    RelationType::Higher => report.reference_higher += 1,
                    RelationType::Equal => {}
                }
            }
        }
    }

    let by_name: HashMap<&str, &RelationMatrix> =
        selected.iter().map(|m| (m.name.as_str(), *m)).collect();

    for matrix in found {
        let Some(expected) = by_name.get(matrix.name.as_str()) else {
            reporter.notice(&format!(
                "⚠️  No reference relations for gene tree {}, skipping",
                matrix.name
            ));
            report.skipped_matrices += 1;
            continue;
        };

        let index: HashMap<&str, usize> = expected
            .labels
            .iter()
            .enumerate()
            .map(|(i, l)| (l.as_str(), i))
            .collect();

        for i in 0..matrix.labels.len() {
            for j in (i + 1)..matrix.labels.len() {
                match (
                    index.get(matrix.labels[i].as_str()),
                    index.get(matrix.labels[j].as_str()),
                ) {
                    (Some(&ri), Some(&rj)) => {
                        report.record(relation_at(matrix, i, j), relation_at(expected, ri, rj))
                    }
                    _ => {
                        reporter.detail(&format!(
                            "No reference relation for {} and {}",
                            matrix.labels[i], matrix.labels[j]
                        ));
                        report.skipped_pairs += 1;
                    }
                }
            }
        }
    }

    if report.skipped_pairs > 0 {
        reporter.notice(&format!(
            "⚠️  {} gene pairs had no reference relation",
            report.skipped_pairs
        ));
    }

    Ok(report)
}

/// Console summary of an evaluation
pub fn report_evaluation(report: &EvaluationReport, reporter: &dyn Reporter) {
    let percent = |value: Option<f64>| {
        value
            .map(|v| format!("{:.2}%", v))
            .unwrap_or_else(|| "n/a".to_string())
    };
    reporter.notice(&format!(
        "📊 Total found: {} (both equal: {})",
        report.total_found(),
        report.both_equal
    ));
    reporter.notice(&format!(
        "   Correctly recognized: {} (LESSER {}, HIGHER {}), precision {}",
        report.recognized(),
        report.correct_lesser,
        report.correct_higher,
        percent(report.precision())
    ));
    reporter.notice(&format!(
        "   Wrong (false positives): {} (LESSER {}, HIGHER {})",
        report.wrong(),
        report.wrong_lesser,
        report.wrong_higher
    ));
    reporter.notice(&format!(
        "   Missed (false negatives): {} (LESSER {}, HIGHER {}), recall {}",
        report.missed(),
        report.missed_lesser,
        report.missed_higher,
        percent(report.recall())
    ));
    reporter.notice(&format!(
        "   Reference: {} LESSER, {} HIGHER, {} total",
        report.reference_lesser,
        report.reference_higher,
        report.reference_total()
    ));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reporting::{CollectingReporter, Level};

    fn matrix(name: &str, kind: Option<&str>, labels: &[&str], values: Vec<Vec<i8>>) -> RelationMatrix {
        RelationMatrix {
            name: name.to_string(),
            kind: kind.map(|k| k.to_string()),
            labels: labels.iter().map(|l| l.to_string()).collect(),
            values,
        }
    }

    #[test]
    fn test_counts_each_pair_once() {
        let found = vec![matrix(
            "T1",
            None,
            &["A/1", "B/1", "C/1"],
            vec![vec![0, -1, 1], vec![-1, 0, 0], vec![1, 0, 0]],
        )];
        // Reference lists the genes in a different order
        let reference = vec![matrix(
            "T1",
            Some("rcb"),
            &["C/1", "B/1", "A/1"],
            vec![vec![0, 1, -1], vec![1, 0, -1], vec![-1, -1, 0]],
        )];
        let reporter = CollectingReporter::new();
        let report = evaluate(&found, &reference, &reporter).unwrap();

        assert_eq!(report.correct_lesser, 1);
        assert_eq!(report.wrong_higher, 1);
        assert_eq!(report.missed_higher, 1);
        assert_eq!(report.reference_lesser, 2);
        assert_eq!(report.reference_higher, 1);
        assert_eq!(report.total_found(), 2);
        assert_eq!(report.precision(), Some(50.0));
    }

    #[test]
    fn test_prefers_rcb_reference() {
        let found = vec![matrix("T1", None, &["A/1", "B/1"], vec![vec![0, 1], vec![1, 0]])];
        let reference = vec![
            matrix("T1", Some("other"), &["A/1", "B/1"], vec![vec![0, -1], vec![-1, 0]]),
            matrix("T1", Some("rcb"), &["A/1", "B/1"], vec![vec![0, 1], vec![1, 0]]),
        ];
        let reporter = CollectingReporter::new();
        let report = evaluate(&found, &reference, &reporter).unwrap();
        assert_eq!(report.correct_higher, 1);
        assert_eq!(report.reference_lesser, 0);
    }

    #[test]
    fn test_unmatched_trees_and_pairs_are_skipped() {
        let found = vec![
            matrix("T1", None, &["A/1", "B/1"], vec![vec![0, 0], vec![0, 0]]),
            matrix("T9", None, &["A/9", "B/9"], vec![vec![0, 0], vec![0, 0]]),
        ];
        let reference = vec![matrix("T1", None, &["A/1", "C/1"], vec![vec![0, 0], vec![0, 0]])];
        let reporter = CollectingReporter::new();
        let report = evaluate(&found, &reference, &reporter).unwrap();
        assert_eq!(report.skipped_matrices, 1);
        assert_eq!(report.skipped_pairs, 1);
        assert_eq!(report.precision(), None);
        assert_eq!(reporter.messages_at(Level::Notice).len(), 2);
    }

    #[test]
    fn test_missing_reference_is_an_error() {
        let reporter = CollectingReporter::new();
        assert!(evaluate(&[], &[], &reporter).is_err());
    }

    #[test]
    fn test_report_evaluation_prints_summary() {
        let report = EvaluationReport {
            correct_lesser: 1,
            reference_lesser: 2,
            ..Default::default()
        };
        let reporter = CollectingReporter::new();
        report_evaluation(&report, &reporter);
        let lines = reporter.messages_at(Level::Notice);
        assert_eq!(lines.len(), 5);
        assert!(lines[1].contains("100.00%"));
        assert!(lines[3].contains("50.00%"));
    }
}
