//! Plain-text persistence of empirical distributions.
//!
//! ## Format
//!
//! ```text
//! <type> <radius> <selection code> <#preparations>
//! <roots in prep 0> <roots in prep 1> ...
//!
//!
//! <#payload rows>            ┐
//! <payload row> ...          │
//! -                          │ one block
//! <count per preparation>    │ per class
//! -                          │
//! <example ids> ...          │ (one line per preparation)
//! --                         ┘
//! ```
//!
//! Keys and frequencies are not stored; both are recomputed on load.

use std::fmt::Display;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;
use std::str::FromStr;

use tracing::{debug, info};

use super::distribution::EmpiricalDistribution;
use super::registry::EquivalenceRegistry;
use crate::policy::{ClassificationPolicy, RootSelection, UnknownSelection};
use crate::types::{ClassificationType, EquivalenceClass, Payload, UnknownClassification, VertexId};

/// Error type for saving and loading distributions.
#[derive(Debug, thiserror::Error)]
pub enum PersistError {
    /// File could not be read or written.
    #[error("I/O error on {path}: {source}")]
    Io {
        /// File involved.
        path: String,
        /// Underlying error.
        #[source]
        source: std::io::Error,
    },

    /// Content does not follow the format.
    #[error("Malformed distribution at line {line}: {message}")]
    Malformed {
        /// 1-based line number.
        line: usize,
        /// What was expected.
        message: String,
    },

    /// Header names an unknown scheme.
    #[error(transparent)]
    Classification(#[from] UnknownClassification),

    /// Header names an unknown selection rule.
    #[error(transparent)]
    Selection(#[from] UnknownSelection),
}

fn join<T: Display>(values: impl IntoIterator<Item = T>) -> String {
    values
        .into_iter()
        .map(|v| v.to_string())
        .collect::<Vec<_>>()
        .join(" ")
}

impl EmpiricalDistribution {
    /// Save to a file in the plain-text format.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), PersistError> {
        let path = path.as_ref();
        let io_error = |source| PersistError::Io {
            path: path.display().to_string(),
            source,
        };
        let file = File::create(path).map_err(io_error)?;
        let mut out = BufWriter::new(file);
        self.write_to(&mut out).map_err(io_error)?;
        out.flush().map_err(io_error)?;
        info!(path = %path.display(), classes = self.len(), "Saved distribution");
        Ok(())
    }

    /// Write the plain-text format to any writer.
    pub fn write_to<W: Write>(&self, out: &mut W) -> std::io::Result<()> {
        writeln!(
            out,
            "{} {} {} {}",
            self.classification().code(),
            self.radius(),
            self.selection().code(),
            self.num_preps()
        )?;
        writeln!(out, "{}", join(self.root_totals()))?;
        writeln!(out)?;
        writeln!(out)?;

        for class in self.classes() {
            writeln!(out, "{}", class.payload.len())?;
            for row in class.payload.rows() {
                writeln!(out, "{}", join(row))?;
            }
            writeln!(out, "-")?;
            writeln!(out, "{}", join((0..self.num_preps()).map(|p| class.count(p))))?;
            writeln!(out, "-")?;
            for prep in 0..self.num_preps() {
                let examples = class.examples.get(prep).map(Vec::as_slice).unwrap_or(&[]);
                writeln!(out, "{}", join(examples))?;
            }
            writeln!(out, "--")?;
        }
        Ok(())
    }

    /// Load a distribution saved with [`EmpiricalDistribution::save`].
    pub fn load(path: impl AsRef<Path>) -> Result<Self, PersistError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| PersistError::Io {
            path: path.display().to_string(),
            source,
        })?;
        let distribution = Self::parse(&text)?;
        info!(path = %path.display(), classes = distribution.len(), "Loaded distribution");
        Ok(distribution)
    }

    /// Parse the plain-text format.
    pub fn parse(text: &str) -> Result<Self, PersistError> {
        let mut cursor = Cursor::new(text);

        let (line, header) = cursor.require("header")?;
        let header: Vec<i64> = parse_numbers(header, line)?;
        let [type_code, radius, selection_code, num_preps] = header[..] else {
            return Err(malformed(line, "header needs four fields"));
        };
        let classification = ClassificationType::from_code(type_code)?;
        let selection = RootSelection::from_code(selection_code)?;
        let radius = to_usize(radius, line)?;
        let num_preps = to_usize(num_preps, line)?;

        let (line, totals) = cursor.require("root counts")?;
        let mut root_totals: Vec<u64> = parse_numbers(totals, line)?;
        if root_totals.len() > num_preps {
            return Err(malformed(line, "more root counts than preparations"));
        }
        root_totals.resize(num_preps, 0);

        let mut registry = EquivalenceRegistry::new();
        while let Some((line, row_count)) = cursor.next_non_blank() {
            let row_count = to_usize(parse_one(row_count, line)?, line)?;
            let mut rows = Vec::with_capacity(row_count);
            for _ in 0..row_count {
                let (line, row) = cursor.require("payload row")?;
                rows.push(parse_numbers(row, line)?);
            }
            cursor.separator("-")?;

            let (line, counts) = cursor.require("counts")?;
            let counts: Vec<u64> = parse_numbers(counts, line)?;
            if counts.len() != num_preps {
                return Err(malformed(line, "one count per preparation expected"));
            }
            cursor.separator("-")?;

            let mut examples = Vec::with_capacity(num_preps);
            for _ in 0..num_preps {
                let (line, ids) = cursor.require("examples")?;
                let ids: Vec<usize> = parse_numbers(ids, line)?;
                examples.push(ids.into_iter().map(VertexId::new).collect());
            }
            cursor.separator("--")?;

            let mut class = EquivalenceClass::new(classification, radius, Payload::new(rows));
            class.counts = counts;
            class.examples = examples;
            class.update_frequencies(&root_totals);
            registry.insert(class);
        }
        debug!(classes = registry.len(), num_preps, "Parsed distribution");

        let policy = ClassificationPolicy::new(classification, radius, selection);
        Ok(EmpiricalDistribution::from_parts(policy, root_totals, registry))
    }
}

struct Cursor<'a> {
    lines: std::iter::Enumerate<std::str::Lines<'a>>,
    last: usize,
}

impl<'a> Cursor<'a> {
    fn new(text: &'a str) -> Self {
        Self {
            lines: text.lines().enumerate(),
            last: 0,
        }
    }

    fn next(&mut self) -> Option<(usize, &'a str)> {
        let (index, line) = self.lines.next()?;
        self.last = index + 1;
        Some((index + 1, line))
    }

    fn require(&mut self, what: &str) -> Result<(usize, &'a str), PersistError> {
        let last = self.last;
        self.next()
            .ok_or_else(|| malformed(last + 1, &format!("unexpected end of file, expected {what}")))
    }

    fn next_non_blank(&mut self) -> Option<(usize, &'a str)> {
        loop {
            let (line, text) = self.next()?;
            if !text.trim().is_empty() {
                return Some((line, text));
            }
        }
    }

    fn separator(&mut self, marker: &str) -> Result<(), PersistError> {
        let (line, text) = self.require(marker)?;
        if text.trim() == marker {
            Ok(())
        } else {
            Err(malformed(line, &format!("expected separator '{marker}'")))
        }
    }
}

fn malformed(line: usize, message: &str) -> PersistError {
    PersistError::Malformed {
        line,
        message: message.to_string(),
    }
}

fn parse_numbers<T: FromStr>(text: &str, line: usize) -> Result<Vec<T>, PersistError> {
    text.split_whitespace()
        .map(|token| token.parse().map_err(|_| malformed(line, &format!("invalid number '{token}'"))))
        .collect()
}

fn parse_one(text: &str, line: usize) -> Result<i64, PersistError> {
    match parse_numbers::<i64>(text, line)?[..] {
        [value] => Ok(value),
        _ => Err(malformed(line, "expected a single number")),
    }
}

fn to_usize(value: i64, line: usize) -> Result<usize, PersistError> {
    usize::try_from(value).map_err(|_| malformed(line, &format!("negative value {value}")))
}
