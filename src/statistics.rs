use std::fmt;

/// Counters collected during one search.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SearchStats {
    /// Nodes popped from the frontier and expanded.
    pub expanded: usize,
    /// Neighbor candidates created (blocked cells excluded).
    pub generated: usize,
    /// Candidates that made it onto the frontier.
    pub pushed: usize,
    pub discarded_closed: usize,
    pub discarded_duplicate: usize,
    /// Frontier entries skipped on pop because a better duplicate replaced them.
    pub skipped_stale: usize,
    pub peak_frontier: usize,
}

impl SearchStats {
    pub fn record_frontier_len(&mut self, len: usize) {
        self.peak_frontier = self.peak_frontier.max(len);
    }
}

impl fmt::Display for SearchStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Nodes expanded: {}", self.expanded)?;
        writeln!(f, "Candidates generated: {}", self.generated)?;
        writeln!(f, "Frontier pushes: {}", self.pushed)?;
        writeln!(
            f,
            "Discarded (closed/duplicate): {}/{}",
            self.discarded_closed, self.discarded_duplicate
        )?;
        if self.skipped_stale > 0 {
            writeln!(f, "Stale entries skipped: {}", self.skipped_stale)?;
        }
        writeln!(f, "Peak frontier size: {}", self.peak_frontier)?;
        Ok(())
    }
}
