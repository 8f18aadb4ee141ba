//! Defines the `ModelParameters` struct, which represents the contents of `model.toml`.
use super::TimePeriod;
use crate::input::{input_err_msg, is_sorted_and_unique, read_toml};
use anyhow::{Context, Result, ensure};
use serde::Deserialize;
use serde_string_enum::DeserializeLabeledStringEnum;
use std::fmt;
use std::path::Path;

const MODEL_PARAMETERS_FILE_NAME: &str = "model.toml";

macro_rules! define_param_default {
    ($name:ident, $type: ty, $value: expr) => {
        fn $name() -> $type {
            $value
        }
    };
}

define_param_default!(default_reserve_shortfall_penalty, f64, 1000.0);

/// Represents the contents of the entire model file.
#[derive(Debug, Deserialize, PartialEq)]
pub struct ModelParameters {
    /// Time periods covered by the model
    pub time_periods: Vec<TimePeriod>,
    /// Which formulation of the reserve requirement to use
    #[serde(default)]
    pub formulation: ReserveFormulation,
    /// Objective coefficient for each unit of reserve shortfall
    #[serde(default = "default_reserve_shortfall_penalty")]
    pub reserve_shortfall_penalty: f64,
    /// Whether upstream quantities are declared as decision variables or fixed values
    #[serde(default)]
    pub declarations: Declarations,
}

/// The formulation used for the reserve requirement constraints
#[derive(DeserializeLabeledStringEnum, Debug, PartialEq, Clone, Copy, Default)]
pub enum ReserveFormulation {
    /// Reserve stated against maximum available power across the whole system.
    ///
    /// See equation (3) of Carrion, M. and Arroyo, J. (2006) A Computationally Efficient
    /// Mixed-Integer Linear Formulation for the Thermal Unit Commitment Problem. IEEE Transactions
    /// on Power Systems, Vol. 21, No. 3.
    #[default]
    #[string = "carrion_arroyo"]
    CarrionArroyo,
    /// Reserve stated as the sum of reserve provided by each thermal generator.
    ///
    /// See equation (5) of G. Morales-Espana, J. M. Latorre, and A. Ramos (2013) Tight and compact
    /// MILP formulation for the thermal unit commitment problem. IEEE Transactions on Power
    /// Systems, 28(4).
    #[string = "morales_espana_latorre_ramos"]
    MoralesEspanaLatorreRamos,
}

impl fmt::Display for ReserveFormulation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::CarrionArroyo => write!(f, "Carrion-Arroyo"),
            Self::MoralesEspanaLatorreRamos => write!(f, "Morales-Espana/Latorre/Ramos"),
        }
    }
}

/// How an upstream quantity is declared
#[derive(DeserializeLabeledStringEnum, Debug, PartialEq, Clone, Copy, Default)]
pub enum DeclarationKind {
    /// A free decision variable for each index
    #[default]
    #[string = "variable"]
    Variable,
    /// A fixed value for each index, taken from the input data
    #[string = "fixed"]
    Fixed,
}

/// Declaration kinds for the quantities declared upstream of the reserve requirement
#[derive(Debug, Deserialize, PartialEq, Default, Clone, Copy)]
pub struct Declarations {
    /// `MaximumPowerAvailable` for thermal generators
    #[serde(default)]
    pub maximum_power_available: DeclarationKind,
    /// `NondispatchablePowerUsed` for non-dispatchable generators
    #[serde(default)]
    pub nondispatchable_power_used: DeclarationKind,
    /// `PowerOutputStorage` and `PowerInputStorage` for storage units
    #[serde(default)]
    pub storage_power: DeclarationKind,
    /// `LoadGenerateMismatch` for buses
    #[serde(default)]
    pub load_generate_mismatch: DeclarationKind,
}

/// Check that the `time_periods` parameter is valid
fn check_time_periods(time_periods: &[TimePeriod]) -> Result<()> {
    ensure!(!time_periods.is_empty(), "`time_periods` is empty");

    ensure!(
        is_sorted_and_unique(time_periods),
        "`time_periods` must be composed of unique values in order"
    );

    Ok(())
}

/// Check that the `reserve_shortfall_penalty` parameter is valid
fn check_reserve_shortfall_penalty(value: f64) -> Result<()> {
    ensure!(
        value.is_finite() && value >= 0.0,
        "reserve_shortfall_penalty must be a finite, non-negative number"
    );

    Ok(())
}

impl ModelParameters {
    /// Read a model file from the specified directory.
    ///
    /// # Arguments
    ///
    /// * `model_dir` - Folder containing model configuration files
    ///
    /// # Returns
    ///
    /// The model file contents as a [`ModelParameters`] struct or an error if the file is invalid
    pub fn from_path<P: AsRef<Path>>(model_dir: P) -> Result<ModelParameters> {
        let file_path = model_dir.as_ref().join(MODEL_PARAMETERS_FILE_NAME);
        let model_params: ModelParameters = read_toml(&file_path)?;

        model_params
            .validate()
            .with_context(|| input_err_msg(file_path))?;

        Ok(model_params)
    }

    /// Validate parameters after reading in file
    fn validate(&self) -> Result<()> {
        check_time_periods(&self.time_periods)?;
        check_reserve_shortfall_penalty(self.reserve_shortfall_penalty)?;

        Ok(())
    }
}
