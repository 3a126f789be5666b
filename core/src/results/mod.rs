//! Result log parsing and aggregation.
//!
//! Each external job writes a free-form text log. A cross-validation summary
//! line starts with `cv` (any case); the line before it ends in `-<bin>`.
//! The first four numbers of the summary line are, in order, cross-validation
//! accuracy and error, then test accuracy and error.
//!
//! ```text
//! Featurizing bin-17
//! CV accuracy 0.81 +/- 0.03, test accuracy 0.79 +/- 0.02
//! ```

pub mod lexer;

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use walkdir::WalkDir;

use crate::error::{Error, Result};
use lexer::extract_numbers;

/// Marker prefix of a cross-validation summary line, compared case-insensitively.
pub const SUMMARY_MARKER: &str = "cv";

/// Extension of result log files.
pub const LOG_EXTENSION: &str = "txt";

/// Scores reported for one bin.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ResultRecord {
    /// Bin index within the partition.
    pub bin: usize,
    /// Cross-validation accuracy.
    pub cv_acc: f64,
    /// Cross-validation error.
    pub cv_err: f64,
    /// Test accuracy.
    pub test_acc: f64,
    /// Test error.
    pub test_err: f64,
}

/// A log line that breaks the log grammar.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineError {
    /// 1-based line number.
    pub line: usize,
    /// What went wrong.
    pub reason: String,
}

fn is_summary_line(line: &str) -> bool {
    line.get(..SUMMARY_MARKER.len())
        .is_some_and(|head| head.eq_ignore_ascii_case(SUMMARY_MARKER))
}

fn bin_number(line: &str) -> Option<usize> {
    line.rsplit('-').next()?.trim().parse().ok()
}

/// Assembles the records reported in one log.
///
/// # Errors
///
/// Returns a [`LineError`] when a summary line has no preceding line, the
/// preceding line does not end in a bin number, or the summary line holds
/// fewer than four numbers or an unparsable token.
pub fn parse_lines<'a, I>(lines: I) -> Result<Vec<ResultRecord>, LineError>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut records = Vec::new();
    let mut previous: Option<&str> = None;

    for (i, line) in lines.into_iter().enumerate() {
        let lineno = i + 1;
        if is_summary_line(line) {
            let bin = previous.and_then(bin_number).ok_or_else(|| LineError {
                line: lineno,
                reason: match previous {
                    Some(prev) => format!("no bin number after the last '-' in {prev:?}"),
                    None => "summary line has no preceding bin line".to_string(),
                },
            })?;
            let numbers = extract_numbers(line).map_err(|e| LineError {
                line: lineno,
                reason: e.to_string(),
            })?;
            let [cv_acc, cv_err, test_acc, test_err] = match numbers.get(..4) {
                Some(&[a, b, c, d]) => [a, b, c, d],
                _ => {
                    return Err(LineError {
                        line: lineno,
                        reason: format!("expected 4 numbers, found {}", numbers.len()),
                    })
                }
            };
            records.push(ResultRecord {
                bin,
                cv_acc,
                cv_err,
                test_acc,
                test_err,
            });
        }
        previous = Some(line);
    }
    Ok(records)
}

/// Reads and parses one log file.
///
/// # Errors
///
/// Returns [`Error::Io`] if the file cannot be read and
/// [`Error::MalformedLogLine`] if it breaks the log grammar.
pub fn parse_log_file(path: &Path) -> Result<Vec<ResultRecord>> {
    let content = std::fs::read_to_string(path)?;
    parse_lines(content.lines()).map_err(|e| Error::MalformedLogLine {
        path: path.to_path_buf(),
        line: e.line,
        reason: e.reason,
    })
}

/// Lists the log files under `dir`, sorted by path.
///
/// # Errors
///
/// Returns [`Error::Io`] if the directory cannot be traversed.
pub fn log_files(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for entry in WalkDir::new(dir).sort_by_file_name() {
        let entry = entry.map_err(std::io::Error::from)?;
        let is_log = entry.file_type().is_file()
            && entry
                .path()
                .extension()
                .map(|x| x == LOG_EXTENSION)
                .unwrap_or(false);
        if is_log {
            files.push(entry.into_path());
        }
    }
    Ok(files)
}

/// Parses every log file under `dir` and concatenates their records.
///
/// # Errors
///
/// Returns [`Error::MalformedLogLine`] for the first malformed file, or
/// [`Error::Io`] if the directory or a file cannot be read.
pub fn parse_log_dir(dir: &Path) -> Result<Vec<ResultRecord>> {
    let mut records = Vec::new();
    for file in log_files(dir)? {
        records.extend(parse_log_file(&file)?);
    }
    Ok(records)
}

/// Bin numbers already reported by the logs under `dir` (empty if `dir` is absent).
///
/// # Errors
///
/// Propagates [`parse_log_dir`] failures.
pub fn completed_bins(dir: &Path) -> Result<BTreeSet<usize>> {
    if !dir.exists() {
        return Ok(BTreeSet::new());
    }
    Ok(parse_log_dir(dir)?.into_iter().map(|r| r.bin).collect())
}

/// Records of one combination, sorted by bin number.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResultTable {
    /// Combination name.
    pub name: String,
    /// Bin count of the partition the logs belong to.
    pub expected_bins: usize,
    /// One record per reported bin, ascending by bin.
    pub records: Vec<ResultRecord>,
    /// Bins of `0..expected_bins` with no record.
    pub missing: Vec<usize>,
}

impl ResultTable {
    /// Sorts `records` by bin and computes the missing bins.
    ///
    /// # Errors
    ///
    /// Returns [`Error::DuplicateBin`] if two records report the same bin and
    /// [`Error::UnknownBin`] if a record lies outside `0..expected_bins`.
    pub fn assemble(
        name: impl Into<String>,
        mut records: Vec<ResultRecord>,
        expected_bins: usize,
    ) -> Result<Self> {
        let name = name.into();
        records.sort_by_key(|r| r.bin);
        if let Some(pair) = records.windows(2).find(|w| w[0].bin == w[1].bin) {
            return Err(Error::DuplicateBin {
                name,
                bin: pair[0].bin,
            });
        }
        if let Some(stray) = records.iter().find(|r| r.bin >= expected_bins) {
            return Err(Error::UnknownBin {
                name,
                bin: stray.bin,
                num_bins: expected_bins,
            });
        }
        let present: BTreeSet<usize> = records.iter().map(|r| r.bin).collect();
        let missing = (0..expected_bins).filter(|b| !present.contains(b)).collect();
        Ok(Self {
            name,
            expected_bins,
            records,
            missing,
        })
    }

    /// Returns true if every bin of `0..expected_bins` has a record.
    pub fn is_complete(&self) -> bool {
        self.missing.is_empty() && self.records.len() == self.expected_bins
    }
}

/// Whether incomplete tables may be persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CompletenessPolicy {
    /// Only complete tables are accepted.
    #[default]
    RequireComplete,
    /// Incomplete tables are accepted as well.
    CollectIncomplete,
}

impl CompletenessPolicy {
    /// Applies the gate to an assembled table.
    ///
    /// # Errors
    ///
    /// Returns [`Error::IncompleteResult`] when the table is incomplete and
    /// the policy requires completeness.
    pub fn check(self, table: ResultTable) -> Result<ResultTable> {
        if table.is_complete() || self == CompletenessPolicy::CollectIncomplete {
            return Ok(table);
        }
        Err(Error::IncompleteResult {
            name: table.name,
            expected: table.expected_bins,
            found: table.records.len(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const LOG: &str = "\
loading graph
Featurizing bin-3
CV accuracy 0.81 (0.03), test accuracy 0.79 (0.02)
Featurizing bin-0
cv: 0.5 0.1 0.6 0.2 extra 9
done
";

    #[test]
    fn summary_lines_take_bin_from_previous_line() {
        let records = parse_lines(LOG.lines()).unwrap_or_default();
        assert_eq!(records.len(), 2);
        assert_eq!(
            records[0],
            ResultRecord {
                bin: 3,
                cv_acc: 0.81,
                cv_err: 0.03,
                test_acc: 0.79,
                test_err: 0.02,
            }
        );
        assert_eq!(records[1].bin, 0);
        assert_eq!(records[1].test_err, 0.2);
    }

    #[test]
    fn summary_without_bin_line_is_malformed() {
        let err = parse_lines(["CV 1 2 3 4"]);
        assert_eq!(err.map_err(|e| e.line), Err(1));
        let err = parse_lines(["bin-x", "CV 1 2 3 4"]);
        assert_eq!(err.map_err(|e| e.line), Err(2));
    }

    #[test]
    fn short_summary_is_malformed() {
        let err = parse_lines(["bin-1", "cv 0.1 0.2"]);
        assert!(err.is_err_and(|e| e.reason.contains("expected 4 numbers")));
    }

    #[test]
    fn lines_not_starting_with_marker_are_ignored() {
        let records = parse_lines(["bin-1", "accuracy 0.1 0.2 0.3 0.4", "c"]);
        assert_eq!(records, Ok(vec![]));
    }

    #[test]
    fn table_sorts_and_reports_missing_bins() -> Result<()> {
        let rec = |bin| ResultRecord {
            bin,
            cv_acc: 0.0,
            cv_err: 0.0,
            test_acc: 0.0,
            test_err: 0.0,
        };
        let table = ResultTable::assemble("deg_tc", vec![rec(2), rec(0)], 4)?;
        assert_eq!(table.records.iter().map(|r| r.bin).collect::<Vec<_>>(), vec![0, 2]);
        assert_eq!(table.missing, vec![1, 3]);
        assert!(!table.is_complete());

        let dup = ResultTable::assemble("deg_tc", vec![rec(1), rec(1)], 4);
        assert!(matches!(dup, Err(Error::DuplicateBin { bin: 1, .. })));
        Ok(())
    }
}
