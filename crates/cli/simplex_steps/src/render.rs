//! Plain-text views of a tableau.
//!
//! Dead variables are left out of every view. A tableau in display mode is
//! printed as a grid (`c_B`, `x_B`, `P0`, one column per variable, and the
//! objective row); any other tableau is printed as a list of inequalities.

use big_m_fraction::Fraction;
use simplex_tableau::{Bound, Tableau, VariableId};

pub fn render_tableau(tableau: &Tableau) -> String {
    if tableau.display_as_tableau() {
        render_grid(tableau)
    } else {
        render_inequalities(tableau)
    }
}

fn linear_form<'a>(terms: impl IntoIterator<Item = (&'a Fraction, &'a str)>, constant: Option<&Fraction>) -> String {
    let mut out = String::new();
    for (coefficient, name) in terms {
        if coefficient.is_zero() {
            continue;
        }
        let magnitude = coefficient.abs();
        match (out.is_empty(), coefficient.is_negative()) {
            (true, true) => out.push('-'),
            (true, false) => {}
            (false, true) => out.push_str(" - "),
            (false, false) => out.push_str(" + "),
        }
        if magnitude == Fraction::one() {
            out.push_str(name);
        } else if magnitude.is_finite() {
            out.push_str(&format!("{}{}", magnitude, name));
        } else {
            out.push_str(&format!("({}){}", magnitude, name));
        }
    }
    match constant {
        Some(c) if !c.is_zero() => {
            if out.is_empty() {
                out.push_str(&c.to_string());
            } else if c.is_negative() {
                out.push_str(&format!(" - {}", c.abs()));
            } else {
                out.push_str(&format!(" + {}", c));
            }
        }
        _ => {}
    }
    if out.is_empty() {
        out.push('0');
    }
    out
}

fn live_terms<'a>(tableau: &'a Tableau, coefficients: &'a [Fraction]) -> impl Iterator<Item = (&'a Fraction, &'a str)> {
    tableau
        .live_variables()
        .filter_map(move |(id, name)| coefficients.get(id).map(|c| (c, name)))
}

fn render_inequalities(tableau: &Tableau) -> String {
    let mut out = String::new();
    let sense = if tableau.maximize() { "max" } else { "min" };
    out.push_str(&format!(
        "{} z = {}\n",
        sense,
        linear_form(live_terms(tableau, tableau.objective()), Some(tableau.objective_constant()))
    ));
    for (idx, row) in tableau.rows().iter().enumerate() {
        let basis = row
            .basis
            .map(|id| format!("  [{}]", tableau.display_name(id)))
            .unwrap_or_default();
        out.push_str(&format!(
            "  ({}) {} {} {}{}\n",
            idx + 1,
            linear_form(live_terms(tableau, &row.coefficients), None),
            row.relation,
            row.constant,
            basis
        ));
    }
    for bound in tableau.non_standard_bounds() {
        let name = tableau.display_name(bound.variable);
        let line = match &bound.bound {
            Bound::AtMost(value) => format!("  {} <= {}\n", name, value),
            Bound::AtLeast(value) => format!("  {} >= {}\n", name, value),
            Bound::Free => format!("  {} free\n", name),
        };
        out.push_str(&line);
    }
    out
}

fn basis_cost(tableau: &Tableau, basis: VariableId) -> String {
    tableau
        .original_objective()
        .unwrap_or(tableau.objective())
        .get(basis)
        .map(ToString::to_string)
        .unwrap_or_default()
}

fn render_grid(tableau: &Tableau) -> String {
    let live: Vec<(VariableId, &str)> = tableau.live_variables().collect();

    let mut grid: Vec<Vec<String>> = Vec::with_capacity(tableau.rows().len() + 2);
    let mut header = vec!["c_B".to_string(), "x_B".to_string(), "P0".to_string()];
    header.extend(live.iter().map(|(_, name)| name.to_string()));
    grid.push(header);

    for row in tableau.rows() {
        let (cost, name) = match row.basis {
            Some(basis) => (basis_cost(tableau, basis), tableau.display_name(basis).to_string()),
            None => (String::new(), String::new()),
        };
        let mut line = vec![cost, name, row.constant.to_string()];
        line.extend(live.iter().map(|(id, _)| row.coefficients[*id].to_string()));
        grid.push(line);
    }

    let mut objective = vec![String::new(), "z".to_string(), tableau.objective_constant().to_string()];
    objective.extend(live.iter().map(|(id, _)| tableau.objective()[*id].to_string()));
    grid.push(objective);

    let columns = grid.iter().map(Vec::len).max().unwrap_or(0);
    let widths: Vec<usize> = (0..columns)
        .map(|col| grid.iter().filter_map(|line| line.get(col)).map(|cell| cell.chars().count()).max().unwrap_or(0))
        .collect();

    let mut out = String::new();
    let sense = if tableau.maximize() { "max" } else { "min" };
    out.push_str(&format!("{} z\n", sense));
    for line in &grid {
        let cells: Vec<String> = line
            .iter()
            .zip(&widths)
            .map(|(cell, width)| format!("{:>width$}", cell, width = width))
            .collect();
        out.push_str(&format!("  {}\n", cells.join(" | ").trim_end()));
    }
    out
}
