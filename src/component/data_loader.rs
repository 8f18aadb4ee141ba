//! The first component of every model: takes ownership of the system data.
use super::{ComponentName, DataLoaded};
use crate::model::{SystemData, UnitCommitmentModel};
use anyhow::Result;
use itertools::iproduct;
use log::debug;

/// Create a model from system data.
///
/// Along with the data, this declares `LoadGenerateMismatch[b,t]` for every bus and time period.
/// When declared as variables, mismatch is unbounded in both directions; when fixed, it is zero.
///
/// # Returns
///
/// The new model and a token showing that the data has been loaded into it.
pub fn load_data(data: SystemData) -> Result<(UnitCommitmentModel, DataLoaded)> {
    let mut model = UnitCommitmentModel::new(data);
    model.attach(ComponentName::DataLoader)?;

    let kind = model.data.parameters.declarations.load_generate_mismatch;
    let entries: Vec<_> = iproduct!(model.data.buses.iter(), model.time_periods())
        .map(|(bus_id, period)| {
            (
                (bus_id.clone(), *period),
                f64::NEG_INFINITY..=f64::INFINITY,
                0.0,
            )
        })
        .collect();
    debug!(
        "Declaring LoadGenerateMismatch for {} bus/period pairs ({kind:?})",
        entries.len()
    );
    model.load_generate_mismatch = Some(model.declare_family("LoadGenerateMismatch", kind, entries));

    let token = DataLoaded::issue(&model);
    Ok((model, token))
}
