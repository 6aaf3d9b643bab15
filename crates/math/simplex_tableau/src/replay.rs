//! Rebuilding a derivation from its initial tableau and history.
//!
//! A failing step does not stop the replay: it is reported, and the next
//! step runs against the last tableau that was produced successfully.

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::{Result, TableauError};
use crate::input::LinearProgram;
use crate::label::Label;
use crate::table::Tableau;
use crate::transform::{TableauTransform, Transform};

/// One history entry as it is persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransformConfig {
    #[serde(flatten)]
    pub transform: Transform,
    #[serde(default)]
    pub collapsed: bool,
}

impl From<Transform> for TransformConfig {
    fn from(transform: Transform) -> Self {
        Self {
            transform,
            collapsed: false,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Step {
    /// The tableau after this step, or the carried-forward one if it failed.
    pub tableau: Tableau,
    pub label: Label,
    pub error: Option<TableauError>,
    pub collapsed: bool,
}

impl Step {
    pub fn succeeded(&self) -> bool {
        self.error.is_none()
    }
}

pub fn replay(initial: &Tableau, configs: &[TransformConfig]) -> Vec<Step> {
    let mut current = initial.shallow_clone();
    configs
        .iter()
        .enumerate()
        .map(|(index, config)| {
            let label = config.transform.render(&current);
            let error = match config.transform.run(&current) {
                Ok(next) => {
                    debug!(step = index, %label, "applied transform");
                    current = next;
                    None
                }
                Err(error) => {
                    warn!(step = index, %label, %error, "transform failed, keeping previous tableau");
                    Some(error)
                }
            };
            Step {
                tableau: current.shallow_clone(),
                label,
                error,
                collapsed: config.collapsed,
            }
        })
        .collect()
}

/// A problem plus the ordered list of transforms applied to it.
///
/// This is pure data: deleting or inserting a step only edits `history`, and
/// the tableaus are rebuilt by [`Derivation::replay`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Derivation {
    pub problem: LinearProgram,
    #[serde(default)]
    pub history: Vec<TransformConfig>,
}

impl Derivation {
    pub fn new(problem: LinearProgram) -> Self {
        Self {
            problem,
            history: Vec::new(),
        }
    }

    pub fn initial_tableau(&self) -> Result<Tableau> {
        Tableau::from_problem(&self.problem)
    }

    pub fn push(&mut self, transform: impl Into<Transform>) {
        self.history.push(TransformConfig::from(transform.into()));
    }

    pub fn insert(&mut self, index: usize, transform: impl Into<Transform>) -> Result<()> {
        if index > self.history.len() {
            return Err(self.out_of_range(index));
        }
        self.history.insert(index, TransformConfig::from(transform.into()));
        Ok(())
    }

    pub fn remove(&mut self, index: usize) -> Result<TransformConfig> {
        if index >= self.history.len() {
            return Err(self.out_of_range(index));
        }
        Ok(self.history.remove(index))
    }

    pub fn set_collapsed(&mut self, index: usize, collapsed: bool) -> Result<()> {
        let len = self.history.len();
        let config = self.history.get_mut(index).ok_or(TableauError::IndexOutOfRange {
            what: "step",
            index,
            len,
        })?;
        config.collapsed = collapsed;
        Ok(())
    }

    pub fn replay(&self) -> Result<Vec<Step>> {
        Ok(replay(&self.initial_tableau()?, &self.history))
    }

    /// The tableau the derivation currently ends in.
    pub fn final_tableau(&self) -> Result<Tableau> {
        let initial = self.initial_tableau()?;
        Ok(replay(&initial, &self.history)
            .pop()
            .map_or(initial, |step| step.tableau))
    }

    fn out_of_range(&self, index: usize) -> TableauError {
        TableauError::IndexOutOfRange {
            what: "step",
            index,
            len: self.history.len(),
        }
    }
}
