//! Declares the power used from non-dispatchable generators.
use super::{ComponentName, DataLoaded, NondispatchableVars};
use crate::model::UnitCommitmentModel;
use anyhow::Result;
use itertools::iproduct;
use log::debug;

/// Declare `NondispatchablePowerUsed[n,t]` for every non-dispatchable generator.
///
/// As a variable, power used may be curtailed anywhere between zero and the forecast. When fixed,
/// it is equal to the forecast.
pub fn add_non_dispatchable_vars(
    model: &mut UnitCommitmentModel,
    data: &DataLoaded,
) -> Result<NondispatchableVars> {
    data.check(model)?;
    model.attach(ComponentName::NonDispatchableVars)?;

    let entries: Vec<_> = iproduct!(
        model.data.nondispatchable_generators.values(),
        model.time_periods()
    )
    .map(|(generator, period)| {
        let forecast = generator.forecast(*period);
        ((generator.id.clone(), *period), 0.0..=forecast, forecast)
    })
    .collect();

    let kind = model.data.parameters.declarations.nondispatchable_power_used;
    debug!("Declaring NondispatchablePowerUsed ({kind:?})");
    model.nondispatchable_power_used =
        Some(model.declare_family("NondispatchablePowerUsed", kind, entries));

    Ok(NondispatchableVars::issue(model))
}
