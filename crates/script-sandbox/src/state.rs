use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Lifecycle of a single execution.
///
/// `Idle → Validating → {Rejected | Running} → {Completed | TimedOut | Errored}`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ExecutionState {
    Idle,
    Validating,
    Rejected,
    Running,
    Completed,
    TimedOut,
    Errored,
}

impl ExecutionState {
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            ExecutionState::Rejected
                | ExecutionState::Completed
                | ExecutionState::TimedOut
                | ExecutionState::Errored
        )
    }

    pub fn can_advance_to(self, next: ExecutionState) -> bool {
        use ExecutionState::*;
        matches!(
            (self, next),
            (Idle, Validating)
                | (Validating, Rejected)
                | (Validating, Running)
                | (Running, Completed)
                | (Running, TimedOut)
                | (Running, Errored)
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("illegal execution transition {from:?} -> {to:?}")]
pub struct TransitionError {
    pub from: ExecutionState,
    pub to: ExecutionState,
}

/// One-shot state machine for a single run.
#[derive(Debug, Clone)]
pub struct ExecutionRun {
    id: Uuid,
    history: Vec<ExecutionState>,
}

impl ExecutionRun {
    pub fn new() -> Self {
        Self {
            id: Uuid::new_v4(),
            history: vec![ExecutionState::Idle],
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn state(&self) -> ExecutionState {
        self.history
            .last()
            .copied()
            .unwrap_or(ExecutionState::Idle)
    }

    /// Every state visited, starting with `Idle`.
    pub fn history(&self) -> &[ExecutionState] {
        &self.history
    }

    pub fn advance(&mut self, next: ExecutionState) -> Result<(), TransitionError> {
        let from = self.state();
        if !from.can_advance_to(next) {
            return Err(TransitionError { from, to: next });
        }
        self.history.push(next);
        Ok(())
    }
}

impl Default for ExecutionRun {
    fn default() -> Self {
        Self::new()
    }
}
