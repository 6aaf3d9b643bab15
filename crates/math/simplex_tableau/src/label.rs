use std::fmt;

use big_m_fraction::Fraction;
use serde::Serialize;

/// What a transform does, described against the tableau it was applied to.
///
/// Rows are numbered from 1 in the text form, matching how constraints are
/// labelled on screen.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind")]
pub enum Label {
    MultiplyRow {
        row: usize,
        factor: Fraction,
    },
    RelaxRow {
        row: usize,
        variable: String,
    },
    ArtificialVariable {
        row: usize,
        variable: String,
        cost: Fraction,
    },
    Pivot {
        row: usize,
        leaving: Option<String>,
        entering: String,
    },
    SubstituteVariable {
        variable: String,
        terms: Vec<(Fraction, String)>,
        constant: Fraction,
    },
    ToggleObjectiveSense {
        maximize: bool,
    },
    EnterDisplayMode,
    LeaveDisplayMode,
}

fn write_term(f: &mut fmt::Formatter<'_>, coefficient: &Fraction, name: &str, first: bool) -> fmt::Result {
    let magnitude = coefficient.abs();
    match (first, coefficient.is_negative()) {
        (true, true) => f.write_str("-")?,
        (true, false) => {}
        (false, true) => f.write_str(" - ")?,
        (false, false) => f.write_str(" + ")?,
    }
    if magnitude == Fraction::one() {
        f.write_str(name)
    } else if magnitude.is_finite() {
        write!(f, "{}{}", magnitude, name)
    } else {
        write!(f, "({}){}", magnitude, name)
    }
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Label::MultiplyRow { row, factor } => {
                write!(f, "({r})' = {factor}·({r})", r = row + 1, factor = factor)
            }
            Label::RelaxRow { row, variable } => write!(f, "Relax ({}) with {}", row + 1, variable),
            Label::ArtificialVariable { row, variable, cost } => {
                write!(f, "Artificial {} in ({}), cost {}", variable, row + 1, cost)
            }
            Label::Pivot { row, leaving, entering } => match leaving {
                Some(leaving) => write!(f, "Pivot {} → {}", leaving, entering),
                None => write!(f, "Pivot ({}) → {}", row + 1, entering),
            },
            Label::SubstituteVariable {
                variable,
                terms,
                constant,
            } => {
                write!(f, "{} = ", variable)?;
                for (idx, (coefficient, name)) in terms.iter().enumerate() {
                    write_term(f, coefficient, name, idx == 0)?;
                }
                if !constant.is_zero() || terms.is_empty() {
                    if terms.is_empty() {
                        write!(f, "{}", constant)?;
                    } else if constant.is_negative() {
                        write!(f, " - {}", constant.abs())?;
                    } else {
                        write!(f, " + {}", constant)?;
                    }
                }
                Ok(())
            }
            Label::ToggleObjectiveSense { maximize } => {
                let sense = if *maximize { "maximize" } else { "minimize" };
                write!(f, "z' = -z, {}", sense)
            }
            Label::EnterDisplayMode => f.write_str("Show as tableau"),
            Label::LeaveDisplayMode => f.write_str("Show as inequalities"),
        }
    }
}
