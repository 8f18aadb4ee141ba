//! Code for reading demand and the reserve requirement from CSV files.
use super::{check_non_negative, input_err_msg, read_csv, read_csv_optional};
use crate::id::{BusID, IDCollection};
use crate::model::TimePeriod;
use anyhow::{Context, Result, ensure};
use indexmap::{IndexMap, IndexSet};
use serde::Deserialize;
use std::collections::HashSet;
use std::path::Path;

const DEMAND_FILE_NAME: &str = "demand.csv";
const RESERVE_REQUIREMENT_FILE_NAME: &str = "reserve_requirement.csv";

#[derive(Debug, Deserialize, PartialEq)]
struct DemandRaw {
    bus_id: String,
    period: TimePeriod,
    demand: f64,
}

#[derive(Debug, Deserialize, PartialEq)]
struct ReserveRequirementRaw {
    period: TimePeriod,
    requirement: f64,
}

/// Read demand for each bus and sum it over buses for every time period.
///
/// Every time period is given an entry, so periods without demand have a total of zero.
///
/// # Arguments
///
/// * `model_dir` - Folder containing model configuration files
/// * `buses` - All known buses
/// * `time_periods` - Time periods covered by the model
pub fn read_total_demand(
    model_dir: &Path,
    buses: &IndexSet<BusID>,
    time_periods: &[TimePeriod],
) -> Result<IndexMap<TimePeriod, f64>> {
    let file_path = model_dir.join(DEMAND_FILE_NAME);
    let demand = read_csv(&file_path)?;
    read_total_demand_from_iter(demand, buses, time_periods)
        .with_context(|| input_err_msg(&file_path))
}

fn read_total_demand_from_iter<I>(
    iter: I,
    buses: &IndexSet<BusID>,
    time_periods: &[TimePeriod],
) -> Result<IndexMap<TimePeriod, f64>>
where
    I: Iterator<Item = DemandRaw>,
{
    let mut total: IndexMap<_, _> = time_periods.iter().map(|period| (*period, 0.0)).collect();
    let mut seen = HashSet::new();
    for raw in iter {
        let bus_id = buses.get_id(&raw.bus_id)?;
        check_non_negative(raw.demand, "demand")?;
        let entry = total.get_mut(&raw.period).with_context(|| {
            format!(
                "Demand given for time period {} which is not in the model",
                raw.period
            )
        })?;
        ensure!(
            seen.insert((bus_id.clone(), raw.period)),
            "Duplicate demand for bus {bus_id} in time period {}",
            raw.period
        );

        *entry += raw.demand;
    }

    Ok(total)
}

/// Read the reserve requirement for each time period, if provided.
///
/// # Returns
///
/// `None` if the file does not exist, in which case the system has no reserve requirement.
/// Periods missing from the file are absent from the returned map.
pub fn read_reserve_requirement(
    model_dir: &Path,
    time_periods: &[TimePeriod],
) -> Result<Option<IndexMap<TimePeriod, f64>>> {
    let file_path = model_dir.join(RESERVE_REQUIREMENT_FILE_NAME);
    if !file_path.exists() {
        return Ok(None);
    }

    let requirement = read_csv_optional(&file_path)?;
    let requirement = read_reserve_requirement_from_iter(requirement, time_periods)
        .with_context(|| input_err_msg(&file_path))?;

    Ok(Some(requirement))
}

fn read_reserve_requirement_from_iter<I>(
    iter: I,
    time_periods: &[TimePeriod],
) -> Result<IndexMap<TimePeriod, f64>>
where
    I: Iterator<Item = ReserveRequirementRaw>,
{
    let mut requirement = IndexMap::new();
    for raw in iter {
        ensure!(
            time_periods.contains(&raw.period),
            "Reserve requirement given for time period {} which is not in the model",
            raw.period
        );
        check_non_negative(raw.requirement, "requirement")?;
        ensure!(
            requirement.insert(raw.period, raw.requirement).is_none(),
            "Duplicate reserve requirement for time period {}",
            raw.period
        );
    }

    Ok(requirement)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixture::assert_error;
    use indexmap::indexmap;
    use std::fs::File;
    use std::io::Write;
    use tempfile::tempdir;

    const PERIODS: [TimePeriod; 2] = [TimePeriod(1), TimePeriod(2)];

    fn buses() -> IndexSet<BusID> {
        ["b1".into(), "b2".into()].into_iter().collect()
    }

    fn demand(bus_id: &str, period: u32, demand: f64) -> DemandRaw {
        DemandRaw {
            bus_id: bus_id.into(),
            period: TimePeriod(period),
            demand,
        }
    }

    #[test]
    fn test_read_total_demand_from_iter() {
        let raw = [demand("b1", 1, 60.0), demand("b2", 1, 40.0)];
        let total = read_total_demand_from_iter(raw.into_iter(), &buses(), &PERIODS).unwrap();
        assert_eq!(
            total,
            indexmap! { TimePeriod(1) => 100.0, TimePeriod(2) => 0.0 }
        );
    }

    #[test]
    fn test_read_total_demand_bad() {
        assert_error!(
            read_total_demand_from_iter(std::iter::once(demand("b3", 1, 1.0)), &buses(), &PERIODS),
            "Unknown ID b3 found"
        );
        assert_error!(
            read_total_demand_from_iter(std::iter::once(demand("b1", 5, 1.0)), &buses(), &PERIODS),
            "Demand given for time period 5 which is not in the model"
        );

        let raw = [demand("b1", 1, 60.0), demand("b1", 1, 40.0)];
        assert_error!(
            read_total_demand_from_iter(raw.into_iter(), &buses(), &PERIODS),
            "Duplicate demand for bus b1 in time period 1"
        );
    }

    #[test]
    fn test_read_reserve_requirement() {
        let dir = tempdir().unwrap();
        assert!(
            read_reserve_requirement(dir.path(), &PERIODS)
                .unwrap()
                .is_none()
        );

        {
            let mut file = File::create(dir.path().join(RESERVE_REQUIREMENT_FILE_NAME)).unwrap();
            writeln!(file, "period,requirement\n2,25").unwrap();
        }
        assert_eq!(
            read_reserve_requirement(dir.path(), &PERIODS).unwrap(),
            Some(indexmap! { TimePeriod(2) => 25.0 })
        );
    }

    #[test]
    fn test_read_reserve_requirement_negative() {
        let raw = ReserveRequirementRaw {
            period: TimePeriod(1),
            requirement: -5.0,
        };
        assert_error!(
            read_reserve_requirement_from_iter(std::iter::once(raw), &PERIODS),
            "requirement must be a finite, non-negative number (got -5)"
        );
    }
}
