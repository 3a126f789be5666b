//! Run report types: per-unit outcomes, status levels, and report aggregation.

/// Outcome of one unit of work (a selection, or a selection x feature combination).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    /// The unit produced all of its artifacts.
    Done,
    /// The unit was skipped on purpose (nothing to do, incomplete results).
    Skipped,
    /// The unit failed; its reason is in the message.
    Failed,
}

impl Status {
    /// Returns the tag printed in front of each report line.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Status::Done => "DONE",
            Status::Skipped => "SKIP",
            Status::Failed => "FAIL",
        }
    }
}

/// A single unit outcome.
#[derive(Debug, Clone)]
pub struct UnitResult {
    /// Name of the unit (partition or combination name).
    pub unit: String,
    /// Human-readable message describing the outcome.
    pub message: String,
    /// Status of the unit.
    pub status: Status,
    /// Optional additional detail lines (written paths, missing bins).
    pub details: Vec<String>,
}

impl UnitResult {
    /// Creates a successful result.
    pub fn done(unit: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            unit: unit.into(),
            message: message.into(),
            status: Status::Done,
            details: Vec::new(),
        }
    }

    /// Creates a skipped result.
    pub fn skip(unit: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            unit: unit.into(),
            message: message.into(),
            status: Status::Skipped,
            details: Vec::new(),
        }
    }

    /// Creates a failure result.
    pub fn fail(unit: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            unit: unit.into(),
            message: message.into(),
            status: Status::Failed,
            details: Vec::new(),
        }
    }

    /// Attaches detail lines.
    #[must_use]
    pub fn with_details(mut self, details: Vec<String>) -> Self {
        self.details = details;
        self
    }

    /// Returns true if this result represents a failure.
    pub fn is_failure(&self) -> bool {
        self.status == Status::Failed
    }
}

/// Aggregated report of one pipeline step.
#[derive(Debug, Default)]
pub struct RunReport {
    /// All unit results in processing order.
    pub results: Vec<UnitResult>,
}

impl RunReport {
    /// Creates a new empty report.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a result to this report.
    pub fn push(&mut self, result: UnitResult) {
        self.results.push(result);
    }

    fn count(&self, status: Status) -> usize {
        self.results.iter().filter(|r| r.status == status).count()
    }

    /// Returns the count of completed units.
    pub fn done_count(&self) -> usize {
        self.count(Status::Done)
    }

    /// Returns the count of skipped units.
    pub fn skipped_count(&self) -> usize {
        self.count(Status::Skipped)
    }

    /// Returns the count of failed units.
    pub fn failure_count(&self) -> usize {
        self.count(Status::Failed)
    }

    /// Returns true if no unit failed.
    pub fn all_passed(&self) -> bool {
        self.failure_count() == 0
    }

    /// Renders the report as the listing printed by the client binaries.
    pub fn render(&self, title: &str) -> String {
        let mut out = format!("{title}\n{}\n\n", "=".repeat(title.chars().count()));
        for result in &self.results {
            out.push_str(&format!(
                "[{}] {} — {}\n",
                result.status.as_str(),
                result.unit,
                result.message
            ));
            for detail in &result.details {
                out.push_str(&format!("       {detail}\n"));
            }
        }
        out.push_str(&format!(
            "\nSummary: {} done, {} skipped, {} failed\n",
            self.done_count(),
            self.skipped_count(),
            self.failure_count()
        ));
        out
    }
}
