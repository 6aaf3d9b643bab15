//! Loading a derivation and printing its replay.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use simplex_tableau::{Derivation, Label, LinearProgram, Step, TransformConfig};
use tracing::info;

use crate::cli::Cli;
use crate::render::render_tableau;

#[derive(Deserialize)]
#[serde(untagged)]
enum Input {
    Derivation(Derivation),
    Problem(LinearProgram),
}

fn read_json<T: for<'de> Deserialize<'de>>(path: &Path, what: &str) -> Result<T> {
    let text = fs::read_to_string(path).with_context(|| format!("read {} file {}", what, path.display()))?;
    serde_json::from_str(&text).with_context(|| format!("parse {} file {}", what, path.display()))
}

pub fn load_derivation(cli: &Cli) -> Result<Derivation> {
    let mut derivation = match &cli.problem {
        Some(path) => match read_json::<Input>(path, "problem")? {
            Input::Derivation(derivation) => derivation,
            Input::Problem(problem) => Derivation::new(problem),
        },
        None => Derivation::new(LinearProgram::example()),
    };
    if let Some(path) = &cli.history {
        let history: Vec<TransformConfig> = read_json(path, "history")?;
        derivation.history.extend(history);
    }
    info!(steps = derivation.history.len(), "loaded derivation");
    Ok(derivation)
}

#[derive(Serialize)]
struct StepSummary<'a> {
    index: usize,
    label: &'a Label,
    text: String,
    ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
    collapsed: bool,
}

impl<'a> StepSummary<'a> {
    fn new(index: usize, step: &'a Step) -> Self {
        Self {
            index,
            label: &step.label,
            text: step.label.to_string(),
            ok: step.succeeded(),
            error: step.error.as_ref().map(ToString::to_string),
            collapsed: step.collapsed,
        }
    }
}

pub fn format_json(steps: &[Step]) -> Result<String> {
    let summaries: Vec<StepSummary<'_>> = steps
        .iter()
        .enumerate()
        .map(|(index, step)| StepSummary::new(index + 1, step))
        .collect();
    serde_json::to_string_pretty(&summaries).context("serialize steps")
}

pub fn format_text(derivation: &Derivation, steps: &[Step], show_collapsed: bool) -> Result<String> {
    let initial = derivation.initial_tableau().context("build initial tableau")?;
    let mut out = format!("[0] initial\n{}", render_tableau(&initial));
    for (idx, step) in steps.iter().enumerate() {
        match &step.error {
            None => out.push_str(&format!("\n[{}] {}\n", idx + 1, step.label)),
            Some(error) => out.push_str(&format!("\n[{}] {}  FAILED: {}\n", idx + 1, step.label, error)),
        }
        if step.succeeded() && (show_collapsed || !step.collapsed) {
            out.push_str(&render_tableau(&step.tableau));
        }
    }
    Ok(out)
}

/// Prints the replay and reports whether any step failed.
pub fn run(cli: &Cli) -> Result<bool> {
    let derivation = load_derivation(cli)?;
    let steps = derivation.replay().context("build initial tableau")?;
    let output = if cli.json {
        format_json(&steps)?
    } else {
        format_text(&derivation, &steps, cli.show_collapsed)?
    };
    println!("{}", output.trim_end());
    Ok(steps.iter().any(|step| !step.succeeded()))
}
