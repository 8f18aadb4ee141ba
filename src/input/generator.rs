//! Code for reading thermal and non-dispatchable generators from CSV files.
use super::{check_non_negative, input_err_msg, read_csv, read_csv_optional};
use crate::id::{BusID, GeneratorID, IDCollection};
use crate::model::{
    NondispatchableGenerator, NondispatchableGeneratorMap, ThermalGenerator, ThermalGeneratorMap,
    TimePeriod,
};
use anyhow::{Context, Result, ensure};
use indexmap::{IndexMap, IndexSet};
use serde::Deserialize;
use std::path::Path;

const THERMAL_GENERATORS_FILE_NAME: &str = "thermal_generators.csv";
const NONDISPATCHABLE_GENERATORS_FILE_NAME: &str = "nondispatchable_generators.csv";
const NONDISPATCHABLE_FORECAST_FILE_NAME: &str = "nondispatchable_forecast.csv";

#[derive(Debug, Deserialize, PartialEq)]
struct ThermalGeneratorRaw {
    id: GeneratorID,
    bus_id: String,
    max_output: f64,
}

#[derive(Debug, Deserialize, PartialEq)]
struct NondispatchableGeneratorRaw {
    id: GeneratorID,
    bus_id: String,
}

#[derive(Debug, Deserialize, PartialEq)]
struct ForecastRaw {
    generator_id: String,
    period: TimePeriod,
    forecast: f64,
}

/// Read thermal generators from a CSV file.
///
/// # Arguments
///
/// * `model_dir` - Folder containing model configuration files
/// * `buses` - All known buses
pub fn read_thermal_generators(
    model_dir: &Path,
    buses: &IndexSet<BusID>,
) -> Result<ThermalGeneratorMap> {
    let file_path = model_dir.join(THERMAL_GENERATORS_FILE_NAME);
    let generators = read_csv(&file_path)?;
    read_thermal_generators_from_iter(generators, buses).with_context(|| input_err_msg(&file_path))
}

fn read_thermal_generators_from_iter<I>(
    iter: I,
    buses: &IndexSet<BusID>,
) -> Result<ThermalGeneratorMap>
where
    I: Iterator<Item = ThermalGeneratorRaw>,
{
    let mut generators = ThermalGeneratorMap::new();
    for raw in iter {
        check_non_negative(raw.max_output, "max_output")?;
        let generator = ThermalGenerator {
            id: raw.id.clone(),
            bus_id: buses.get_id(&raw.bus_id)?,
            max_output: raw.max_output,
        };
        ensure!(
            generators.insert(raw.id.clone(), generator).is_none(),
            "Duplicate generator ID: {}",
            raw.id
        );
    }

    Ok(generators)
}

/// Read non-dispatchable generators and their forecasts, if provided.
///
/// Forecasts are only accepted for the model's time periods. A generator with no forecast for a
/// period produces nothing in that period.
///
/// # Arguments
///
/// * `model_dir` - Folder containing model configuration files
/// * `buses` - All known buses
/// * `thermal_generators` - Thermal generators, whose IDs must not be reused
/// * `time_periods` - Time periods covered by the model
pub fn read_nondispatchable_generators(
    model_dir: &Path,
    buses: &IndexSet<BusID>,
    thermal_generators: &ThermalGeneratorMap,
    time_periods: &[TimePeriod],
) -> Result<NondispatchableGeneratorMap> {
    let file_path = model_dir.join(NONDISPATCHABLE_GENERATORS_FILE_NAME);
    let generators = read_csv_optional(&file_path)?;
    let mut generators =
        read_nondispatchable_generators_from_iter(generators, buses, thermal_generators)
            .with_context(|| input_err_msg(&file_path))?;

    let file_path = model_dir.join(NONDISPATCHABLE_FORECAST_FILE_NAME);
    let forecasts = read_csv_optional(&file_path)?;
    read_forecasts_from_iter(forecasts, &mut generators, time_periods)
        .with_context(|| input_err_msg(&file_path))?;

    Ok(generators)
}

fn read_nondispatchable_generators_from_iter<I>(
    iter: I,
    buses: &IndexSet<BusID>,
    thermal_generators: &ThermalGeneratorMap,
) -> Result<NondispatchableGeneratorMap>
where
    I: Iterator<Item = NondispatchableGeneratorRaw>,
{
    let mut generators = NondispatchableGeneratorMap::new();
    for raw in iter {
        ensure!(
            !thermal_generators.contains_key(&raw.id),
            "Generator ID {} is already used by a thermal generator",
            raw.id
        );

        let generator = NondispatchableGenerator {
            id: raw.id.clone(),
            bus_id: buses.get_id(&raw.bus_id)?,
            forecast: IndexMap::new(),
        };
        ensure!(
            generators.insert(raw.id.clone(), generator).is_none(),
            "Duplicate generator ID: {}",
            raw.id
        );
    }

    Ok(generators)
}

fn read_forecasts_from_iter<I>(
    iter: I,
    generators: &mut NondispatchableGeneratorMap,
    time_periods: &[TimePeriod],
) -> Result<()>
where
    I: Iterator<Item = ForecastRaw>,
{
    for raw in iter {
        let id = generators.get_id(&raw.generator_id)?;
        ensure!(
            time_periods.contains(&raw.period),
            "Forecast given for time period {} which is not in the model",
            raw.period
        );
        check_non_negative(raw.forecast, "forecast")?;

        let generator = &mut generators[&id];
        ensure!(
            generator.forecast.insert(raw.period, raw.forecast).is_none(),
            "Duplicate forecast for generator {id} in time period {}",
            raw.period
        );
    }

    Ok(())
}
