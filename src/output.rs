//! The module responsible for writing the built model to disk.
use crate::model::UnitCommitmentModel;
use crate::model::expression::LinearExpr;
use crate::model::variable::VariableSet;
use anyhow::{Context, Result, ensure};
use itertools::Itertools;
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};

/// The root folder in which model-specific output folders will be created
const OUTPUT_DIRECTORY_ROOT: &str = "uc_reserve_results";

/// The output file name for variables
const VARIABLES_FILE_NAME: &str = "variables.csv";

/// The output file name for reserve constraints
const RESERVE_CONSTRAINTS_FILE_NAME: &str = "reserve_constraints.csv";

/// Get the default output folder for the model in the specified directory
pub fn get_output_dir(model_dir: &Path) -> Result<PathBuf> {
    // Canonicalise in case the user has specified "."
    let model_dir = model_dir
        .canonicalize()
        .context("Could not resolve path to model")?;

    let model_name = model_dir
        .file_name()
        .context("Model cannot be in root folder")?
        .to_str()
        .context("Invalid chars in model dir name")?;

    Ok([OUTPUT_DIRECTORY_ROOT, model_name].iter().collect())
}

/// Create a new output directory, with parents.
///
/// An existing directory is only reused if it is empty or `allow_overwrite` is set.
///
/// # Returns
///
/// Whether an existing non-empty directory is going to be overwritten.
pub fn create_output_directory(output_dir: &Path, allow_overwrite: bool) -> Result<bool> {
    if output_dir.is_dir() {
        let is_empty = fs::read_dir(output_dir)?.next().is_none();
        if is_empty {
            return Ok(false);
        }

        ensure!(
            allow_overwrite,
            "Output folder already exists and is not empty. Use --overwrite to overwrite it."
        );
        return Ok(true);
    }

    fs::create_dir_all(output_dir)?;

    Ok(false)
}

/// Represents a row in the variables CSV file
#[derive(Serialize, Debug, PartialEq)]
struct VariableRow<'a> {
    name: &'a str,
    lower_bound: f64,
    upper_bound: f64,
}

/// Represents a row in the reserve constraints CSV file
#[derive(Serialize, Debug, PartialEq)]
struct ReserveConstraintRow {
    period: u32,
    lower_bound: Option<f64>,
    expression: String,
}

/// Format an expression using variable names, e.g. `ReserveShortfall[1] + 30`
fn format_expression(expr: &LinearExpr, variables: &VariableSet) -> String {
    let mut terms = expr.iter_terms().map(|(var, coef)| {
        let name = &variables.get(var).name;
        match coef {
            1.0 => name.clone(),
            -1.0 => format!("-{name}"),
            _ => format!("{coef}*{name}"),
        }
    });

    let out = terms.join(" + ").replace("+ -", "- ");
    let constant = expr.constant();
    if out.is_empty() {
        constant.to_string()
    } else if constant > 0.0 {
        format!("{out} + {constant}")
    } else if constant < 0.0 {
        format!("{out} - {}", -constant)
    } else {
        out
    }
}

/// Write the model's variables and reserve constraints to CSV files in the output folder
pub fn write_model(output_path: &Path, model: &UnitCommitmentModel) -> Result<()> {
    write_variables(&output_path.join(VARIABLES_FILE_NAME), model)?;
    write_reserve_constraints(&output_path.join(RESERVE_CONSTRAINTS_FILE_NAME), model)?;

    Ok(())
}

fn write_variables(file_path: &Path, model: &UnitCommitmentModel) -> Result<()> {
    let mut writer = csv::Writer::from_path(file_path)?;
    for (_, var) in model.variables.iter() {
        writer.serialize(VariableRow {
            name: &var.name,
            lower_bound: *var.bounds.start(),
            upper_bound: *var.bounds.end(),
        })?;
    }
    writer
        .flush()
        .with_context(|| format!("Could not write to {}", file_path.display()))?;

    Ok(())
}

fn write_reserve_constraints(file_path: &Path, model: &UnitCommitmentModel) -> Result<()> {
    let mut writer = csv::Writer::from_path(file_path)?;
    for (period, constraint) in model.enforce_reserve_requirements.iter().flatten() {
        writer.serialize(ReserveConstraintRow {
            period: period.0,
            lower_bound: constraint.lower,
            expression: format_expression(&constraint.body, &model.variables),
        })?;
    }
    writer
        .flush()
        .with_context(|| format!("Could not write to {}", file_path.display()))?;

    Ok(())
}
