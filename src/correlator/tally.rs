use crate::domain::Severity;

const LEVELS: [Severity; 5] = [
    Severity::Debug,
    Severity::Info,
    Severity::Warning,
    Severity::Error,
    Severity::Critical,
];

/// Request-scoped severity aggregator.
///
/// Tracks which severities occurred at least once during one request (set
/// semantics, not counts) plus the floor implied by the final response
/// status, and resolves them to the parent record's severity using the fixed
/// total order on [`Severity`].
#[derive(Debug)]
pub struct SeverityTally {
    observed: [bool; 5],
    min_severity: Severity,
}

impl SeverityTally {
    pub fn new(min_severity: Severity) -> Self {
        Self {
            observed: [false; 5],
            min_severity,
        }
    }

    /// Records that a log call of `severity` happened this request.
    /// Calls below the configured minimum are never aggregated.
    pub fn observe(&mut self, severity: Severity) {
        if severity < self.min_severity {
            return;
        }
        self.observed[severity as usize] = true;
    }

    /// Folds the response-status floor into the observed set. The floor
    /// participates unconditionally; the minimum level filters only
    /// application log calls.
    pub fn escalate(&mut self, status: u16) {
        self.observed[Severity::from_status(status) as usize] = true;
    }

    /// Returns the highest observed severity (default `Info` when nothing was
    /// observed) and resets the tally so the next request starts empty.
    pub fn resolve(&mut self) -> Severity {
        let resolved = LEVELS
            .iter()
            .rev()
            .copied()
            .find(|severity| self.observed[*severity as usize])
            .unwrap_or(Severity::Info);
        self.observed = [false; 5];
        resolved
    }
}
