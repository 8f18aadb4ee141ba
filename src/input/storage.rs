//! Code for reading storage units from a CSV file.
use super::{check_non_negative, input_err_msg, read_csv_optional};
use crate::id::{BusID, IDCollection, StorageID};
use crate::model::{StorageMap, StorageUnit};
use anyhow::{Context, Result, ensure};
use indexmap::IndexSet;
use serde::Deserialize;
use std::path::Path;

const STORAGE_FILE_NAME: &str = "storage.csv";

#[derive(Debug, Deserialize, PartialEq)]
struct StorageUnitRaw {
    id: StorageID,
    bus_id: String,
    max_discharge: f64,
    max_charge: f64,
}

/// Read storage units from a CSV file, if it exists.
///
/// # Arguments
///
/// * `model_dir` - Folder containing model configuration files
/// * `buses` - All known buses
pub fn read_storage(model_dir: &Path, buses: &IndexSet<BusID>) -> Result<StorageMap> {
    let file_path = model_dir.join(STORAGE_FILE_NAME);
    let units = read_csv_optional(&file_path)?;
    read_storage_from_iter(units, buses).with_context(|| input_err_msg(&file_path))
}

fn read_storage_from_iter<I>(iter: I, buses: &IndexSet<BusID>) -> Result<StorageMap>
where
    I: Iterator<Item = StorageUnitRaw>,
{
    let mut storage = StorageMap::new();
    for raw in iter {
        check_non_negative(raw.max_discharge, "max_discharge")?;
        check_non_negative(raw.max_charge, "max_charge")?;

        let unit = StorageUnit {
            id: raw.id.clone(),
            bus_id: buses.get_id(&raw.bus_id)?,
            max_discharge: raw.max_discharge,
            max_charge: raw.max_charge,
        };
        ensure!(
            storage.insert(raw.id.clone(), unit).is_none(),
            "Duplicate storage ID: {}",
            raw.id
        );
    }

    Ok(storage)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixture::assert_error;
    use std::fs::File;
    use std::io::Write;
    use tempfile::tempdir;

    fn buses() -> IndexSet<BusID> {
        std::iter::once("b1".into()).collect()
    }

    #[test]
    fn test_read_storage() {
        let dir = tempdir().unwrap();
        {
            let mut file = File::create(dir.path().join(STORAGE_FILE_NAME)).unwrap();
            writeln!(file, "id,bus_id,max_discharge,max_charge\ns1,b1,20,15").unwrap();
        }

        let storage = read_storage(dir.path(), &buses()).unwrap();
        assert_eq!(
            storage["s1"],
            StorageUnit {
                id: "s1".into(),
                bus_id: "b1".into(),
                max_discharge: 20.0,
                max_charge: 15.0,
            }
        );
    }

    #[test]
    fn test_read_storage_missing_file() {
        let dir = tempdir().unwrap();
        assert!(read_storage(dir.path(), &buses()).unwrap().is_empty());
    }

    #[test]
    fn test_read_storage_bad_rate() {
        let raw = StorageUnitRaw {
            id: "s1".into(),
            bus_id: "b1".into(),
            max_discharge: 20.0,
            max_charge: f64::NAN,
        };
        assert_error!(
            read_storage_from_iter(std::iter::once(raw), &buses()),
            "max_charge must be a finite, non-negative number (got NaN)"
        );
    }
}
