use std::fmt;

use crate::model::{FailureRecord, ResolutionOutcome};

/// Batch totals, derived from outcomes alone.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Summary {
    pub total: usize,
    pub successful: usize,
    pub failed: usize,
    pub exact_matches: usize,
    pub approximate_matches: usize,
    pub failures: Vec<FailureRecord>,
}

impl Summary {
    pub fn from_outcomes(outcomes: &[ResolutionOutcome]) -> Self {
        let total = outcomes.len();
        let successful = outcomes.iter().filter(|o| o.found).count();
        let exact_matches = outcomes.iter().filter(|o| o.is_exact_match()).count();
        Self {
            total,
            successful,
            failed: total - successful,
            exact_matches,
            approximate_matches: successful - exact_matches,
            failures: outcomes.iter().filter_map(FailureRecord::from_outcome).collect(),
        }
    }
}

impl fmt::Display for Summary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rule = "=".repeat(50);
        writeln!(f, "{rule}")?;
        writeln!(f, "SCRAPING REPORT")?;
        writeln!(f, "{rule}")?;
        writeln!(f)?;
        writeln!(f, "Total medications: {}", self.total)?;
        writeln!(f, "Successfully scraped: {}", self.successful)?;
        writeln!(f, "Failed: {}", self.failed)?;
        writeln!(f)?;

        if !self.failures.is_empty() {
            writeln!(f, "Failed medications (need manual data entry):")?;
            writeln!(f, "{}", "-".repeat(50))?;
            for (i, failure) in self.failures.iter().enumerate() {
                let id = if failure.external_id.is_empty() {
                    "N/A"
                } else {
                    failure.external_id.as_str()
                };
                writeln!(f, "{}. {}", i + 1, failure.name)?;
                writeln!(f, "   External id: {id}")?;
                writeln!(f, "   Reason: {}", failure.reason)?;
                writeln!(f)?;
            }
        }

        writeln!(f)?;
        writeln!(f, "Match quality:")?;
        writeln!(f, "  Exact matches: {}", self.exact_matches)?;
        writeln!(f, "  Approximate matches: {}", self.approximate_matches)
    }
}
