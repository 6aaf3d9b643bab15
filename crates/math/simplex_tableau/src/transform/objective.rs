//! Transforms acting on the objective row and the display mode.

use std::sync::Arc;

use big_m_fraction::Fraction;

use crate::error::{Result, TableauError};
use crate::table::Tableau;

fn negate_all(values: &[Fraction]) -> Vec<Fraction> {
    values.iter().map(|v| -v).collect()
}

/// `max z` becomes `min -z` and vice versa.
pub(super) fn toggle_sense(tableau: &Tableau) -> Tableau {
    let mut table = tableau.shallow_clone();
    table.objective = Arc::new(negate_all(&tableau.objective));
    table.objective_constant = -&tableau.objective_constant;
    table.original_objective = tableau
        .original_objective
        .as_ref()
        .map(|original| Arc::new(negate_all(original)));
    table.maximize = !tableau.maximize;
    table
}

pub(super) fn enter_display_mode(tableau: &Tableau) -> Result<Tableau> {
    if !tableau.can_display_as_tableau() {
        return Err(TableauError::NotCanonical(
            "every row must be an equality with a basis variable and every variable must be >= 0",
        ));
    }
    let mut table = tableau.shallow_clone();
    if table.original_objective.is_none() {
        table.original_objective = Some(Arc::clone(&table.objective));
    }
    table.reduce_objective()?;
    table.display_as_tableau = true;
    Ok(table)
}

pub(super) fn leave_display_mode(tableau: &Tableau) -> Tableau {
    let mut table = tableau.shallow_clone();
    table.display_as_tableau = false;
    table.original_objective = None;
    table
}

/// Keeps a tableau in display mode only while it can still be shown as one,
/// re-reducing the objective after the step.
pub(super) fn settle_display_mode(tableau: Tableau) -> Tableau {
    if !tableau.display_as_tableau {
        return tableau;
    }
    if tableau.can_display_as_tableau() {
        let mut reduced = tableau.shallow_clone();
        if reduced.reduce_objective().is_ok() {
            return reduced;
        }
    }
    leave_display_mode(&tableau)
}
