//! Outcomes of a processor run

use crate::error::ProcessError;

/// Summary of one pass over the inbox
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunReport {
    /// Files found directly in the inbox
    pub scanned: usize,
    /// Files moved to their destination
    pub moved: usize,
    /// Files no rule matched
    pub unmatched: usize,
    /// Files left in place because the destination was occupied
    pub collisions: usize,
    /// Files skipped because of a configuration, date or I/O error
    pub errors: usize,
    /// The run was skipped because another run was in flight
    pub busy: bool,
}

impl RunReport {
    pub fn busy() -> Self {
        Self {
            busy: true,
            ..Default::default()
        }
    }
}

/// What a run would do with one inbox file
#[derive(Debug)]
pub struct PlannedMove {
    /// Current path of the file
    pub source: String,
    pub plan: Plan,
}

#[derive(Debug)]
pub enum Plan {
    /// No rule matches
    Unmatched,
    /// The file moves to `destination` under rule number `rule` (0-based)
    Move { rule: usize, destination: String },
    /// The matched destination is already occupied
    Collision { rule: usize, destination: String },
    /// The matched rule cannot place the file
    Failed { rule: usize, error: ProcessError },
}
