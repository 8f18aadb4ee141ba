//! Code for reading buses from a CSV file.
use super::{input_err_msg, read_csv};
use crate::id::BusID;
use anyhow::{Context, Result, ensure};
use indexmap::IndexSet;
use serde::Deserialize;
use std::path::Path;

const BUSES_FILE_NAME: &str = "buses.csv";

#[derive(Debug, Deserialize, PartialEq)]
struct BusRaw {
    id: BusID,
}

/// Reads buses from a CSV file.
///
/// # Arguments
///
/// * `model_dir` - Folder containing model configuration files
///
/// # Returns
///
/// The set of bus IDs, in file order, or an error
pub fn read_buses(model_dir: &Path) -> Result<IndexSet<BusID>> {
    let file_path = model_dir.join(BUSES_FILE_NAME);
    let buses = read_csv(&file_path)?;
    read_buses_from_iter(buses).with_context(|| input_err_msg(&file_path))
}

fn read_buses_from_iter<I>(iter: I) -> Result<IndexSet<BusID>>
where
    I: Iterator<Item = BusRaw>,
{
    let mut buses = IndexSet::new();
    for bus in iter {
        ensure!(!bus.id.0.trim().is_empty(), "Bus IDs cannot be empty");
        ensure!(buses.insert(bus.id.clone()), "Duplicate bus ID: {}", bus.id);
    }

    Ok(buses)
}
