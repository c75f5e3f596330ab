//! Human-readable report of a distribution.
//!
//! The report lists, for every preparation, the most common classes, then
//! for every ordered pair of preparations `(j, k)` the classes most
//! over-represented in `j` relative to `k`. Section sizes come from the
//! policy (`report_top`, `report_examples`).

use std::fmt::Write as _;
use std::path::Path;

use tracing::info;

use super::distribution::EmpiricalDistribution;
use super::persist::PersistError;
use crate::policy::IDEAL_SILICA;
use crate::types::{ClassificationType, EquivalenceClass};

const RULE: &str = "----------------------------------------------------------------------";

fn comma_list(values: &[i64]) -> String {
    values.iter().map(i64::to_string).collect::<Vec<_>>().join(",")
}

/// Render a class payload in a scheme-specific compact form.
pub fn describe_class(class: &EquivalenceClass) -> String {
    let rows = class.payload.rows();
    match class.classification {
        ClassificationType::CanonicalForm => {
            let labels = ["d", "v", "e", "ptn", "colors"];
            labels
                .iter()
                .zip(rows)
                .map(|(label, row)| format!("{}: {}", label, comma_list(row)))
                .collect::<Vec<_>>()
                .join("\n")
        }
        ClassificationType::H1Barcode => {
            let mut intervals = Vec::new();
            for (i, row) in rows.iter().enumerate() {
                for (j, &count) in row.iter().enumerate().skip(i) {
                    match count {
                        1 => intervals.push(format!("({},{})", i, j)),
                        c if c > 1 => intervals.push(format!("{}x({},{})", c, i, j)),
                        _ => {}
                    }
                }
            }
            if intervals.is_empty() {
                "no cycles".to_string()
            } else {
                intervals.join(",")
            }
        }
        ClassificationType::PrimitiveRings => {
            let counts = rows.first().map(Vec::as_slice).unwrap_or(&[]);
            let rings: Vec<String> = counts
                .iter()
                .enumerate()
                .filter(|&(_, &c)| c > 0)
                .map(|(i, &c)| format!("{} {}-ring{}", c, i + 1, if c > 1 { "s" } else { "" }))
                .collect();
            if rings.is_empty() {
                "no rings".to_string()
            } else {
                rings.join(", ")
            }
        }
        ClassificationType::ValenceProfile => {
            // Shell sizes, with degrees that break the ideal silica pattern in brackets.
            let shells: Vec<String> = rows
                .iter()
                .enumerate()
                .map(|(i, degrees)| {
                    let expected = IDEAL_SILICA[i % IDEAL_SILICA.len()] as i64;
                    let odd: Vec<i64> = degrees.iter().copied().filter(|&d| d != expected).collect();
                    if odd.is_empty() {
                        degrees.len().to_string()
                    } else {
                        format!("{}({})", degrees.len(), comma_list(&odd))
                    }
                })
                .collect();
            format!("({})", shells.join(","))
        }
        ClassificationType::ShellCount => format!("({})", comma_list(rows.first().map(Vec::as_slice).unwrap_or(&[]))),
    }
}

impl EmpiricalDistribution {
    /// Render the report.
    pub fn render_report(&self) -> String {
        let policy = self.policy();
        let num_preps = self.num_preps();
        let mut out = String::new();

        let _ = writeln!(
            out,
            "Type = {} ({})  Radius={}  Number of Data Preparations={}",
            self.classification().code(),
            self.classification().describe(),
            self.radius(),
            num_preps
        );
        let _ = writeln!(out, "Roots: {}  Policy: {}", self.selection(), policy.params_hash());
        let _ = writeln!(out, "\n{}\n", RULE);

        let mut classes: Vec<&EquivalenceClass> = self.classes().collect();
        for j in 0..num_preps {
            let _ = writeln!(out, "SORTED BY FREQUENCY IN PREPARATION {}\n", j);
            classes.sort_by(|a, b| b.count(j).cmp(&a.count(j)));
            self.write_section(&mut out, &classes);
        }

        for j in 0..num_preps {
            for k in (0..num_preps).filter(|&k| k != j) {
                let _ = writeln!(
                    out,
                    "SORTED BY FREQUENCY IN PREPARATION {} MINUS FREQUENCY IN PREPARATION {}",
                    j, k
                );
                classes.sort_by(|a, b| {
                    let da = a.frequency(j) - a.frequency(k);
                    let db = b.frequency(j) - b.frequency(k);
                    db.total_cmp(&da)
                });
                self.write_section(&mut out, &classes);
            }
        }
        out
    }

    fn write_section(&self, out: &mut String, classes: &[&EquivalenceClass]) {
        let policy = self.policy();
        for (rank, class) in classes.iter().take(policy.report_top).enumerate() {
            let _ = writeln!(out, "Equivalence Class {}", rank);
            let _ = writeln!(out, "{}", describe_class(class));
            let frequencies: Vec<String> = (0..self.num_preps())
                .map(|p| format!("{:.4}", class.frequency(p)))
                .collect();
            let _ = writeln!(out, "Frequencies: {}", frequencies.join(" "));
            for prep in 0..self.num_preps() {
                let examples: Vec<String> = class
                    .examples
                    .get(prep)
                    .map(Vec::as_slice)
                    .unwrap_or(&[])
                    .iter()
                    .take(policy.report_examples)
                    .map(|v| v.to_string())
                    .collect();
                let _ = writeln!(out, "Examples in preparation {}: {}", prep, examples.join(" "));
            }
            let _ = writeln!(out, "\n");
        }
        let _ = writeln!(out, "{}\n", RULE);
    }

    /// Write the report to a file.
    pub fn save_report(&self, path: impl AsRef<Path>) -> Result<(), PersistError> {
        let path = path.as_ref();
        std::fs::write(path, self.render_report()).map_err(|source| PersistError::Io {
            path: path.display().to_string(),
            source,
        })?;
        info!(path = %path.display(), "Saved report");
        Ok(())
    }
}
