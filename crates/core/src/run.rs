use crate::{ConfigError, RunState, StateKind};
use serde::{Deserialize, Serialize};
use thiserror::Error;

mod generate;
mod weights;

pub use generate::{generate_run, RunGenerator};
pub use weights::transition_weights;

#[derive(Debug, Error, PartialEq)]
pub enum RunError {
    #[error("invalid generator config: {0}")]
    Config(#[from] ConfigError),
    #[error("no transition drawn from {0:?}")]
    NoTransition(StateKind),
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct RunStep {
    pub state: RunState,
    pub duration_ms: u32,
}

/// A finished run: every step from the first blind pick to the loss.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Run {
    seed: Option<u64>,
    steps: Vec<RunStep>,
    #[serde(default)]
    truncated: bool,
}

impl Run {
    pub(crate) fn new(seed: Option<u64>, steps: Vec<RunStep>, truncated: bool) -> Self {
        Self {
            seed,
            steps,
            truncated,
        }
    }

    pub fn seed(&self) -> Option<u64> {
        self.seed
    }

    pub fn steps(&self) -> &[RunStep] {
        &self.steps
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    pub fn last(&self) -> Option<&RunStep> {
        self.steps.last()
    }

    /// True when the step cap cut the run before a loss was drawn.
    pub fn truncated(&self) -> bool {
        self.truncated
    }

    pub fn total_duration_ms(&self) -> u64 {
        self.steps.iter().map(|step| step.duration_ms as u64).sum()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, RunStep> {
        self.steps.iter()
    }
}

impl<'a> IntoIterator for &'a Run {
    type Item = &'a RunStep;
    type IntoIter = std::slice::Iter<'a, RunStep>;

    fn into_iter(self) -> Self::IntoIter {
        self.steps.iter()
    }
}
