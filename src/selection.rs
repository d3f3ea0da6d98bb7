//! Choosing which queued command runs its next batch

use serde::Serialize;

/// Progress snapshot of a command still waiting for batches
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PendingCommand {
    position: usize,
    short_description: String,
    completed: usize,
    total: usize,
}

impl PendingCommand {
    pub fn new(position: usize, short_description: impl Into<String>, completed: usize, total: usize) -> Self {
        Self {
            position,
            short_description: short_description.into(),
            completed,
            total,
        }
    }

    /// Position of the command in the submitted list
    pub fn position(&self) -> usize {
        self.position
    }

    pub fn short_description(&self) -> &str {
        &self.short_description
    }

    /// Iterations already executed
    pub fn completed(&self) -> usize {
        self.completed
    }

    pub fn total(&self) -> usize {
        self.total
    }

    pub fn remaining(&self) -> usize {
        self.total.saturating_sub(self.completed)
    }
}

/// Picks the next command to advance by one batch
///
/// `pending` is never empty and keeps submission order. Implementations
/// must be deterministic for the same input and internal state.
pub trait CommandSelectionStrategy {
    /// Index into `pending` of the command to run next
    fn next_command(&mut self, pending: &[PendingCommand]) -> usize;
}

/// Runs commands strictly in submission order
#[derive(Debug, Clone, Copy, Default)]
pub struct Sequential;

impl CommandSelectionStrategy for Sequential {
    fn next_command(&mut self, _pending: &[PendingCommand]) -> usize {
        0
    }
}

/// Rotates through pending commands one batch at a time
#[derive(Debug, Clone, Default)]
pub struct RoundRobin {
    last: Option<usize>,
}

impl RoundRobin {
    pub fn new() -> Self {
        Self::default()
    }
}

impl CommandSelectionStrategy for RoundRobin {
    fn next_command(&mut self, pending: &[PendingCommand]) -> usize {
        let choice = match self.last {
            Some(last) => pending
                .iter()
                .position(|p| p.position() > last)
                .unwrap_or(0),
            None => 0,
        };
        self.last = pending.get(choice).map(|p| p.position());
        choice
    }
}
