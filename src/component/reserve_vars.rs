//! Declares the reserve-related quantities of thermal generators.
use super::{ComponentName, DataLoaded, ReserveVars};
use crate::model::UnitCommitmentModel;
use crate::model::parameters::DeclarationKind;
use anyhow::Result;
use itertools::iproduct;
use log::debug;

/// Whether the system has a reserve requirement at all.
///
/// This is a model-wide switch. A system with a requirement of zero in some time periods still
/// has a reserve requirement.
pub fn check_reserve_requirement(model: &UnitCommitmentModel) -> bool {
    model.data.reserve_requirement.is_some()
}

/// Declare `MaximumPowerAvailable[g,t]` and `ReserveProvided[g,t]` for every thermal generator.
///
/// `MaximumPowerAvailable` is bounded by the generator's maximum output, or fixed at it.
/// `ReserveProvided` is always a variable bounded by the maximum output.
pub fn add_reserve_vars(model: &mut UnitCommitmentModel, data: &DataLoaded) -> Result<ReserveVars> {
    data.check(model)?;
    model.attach(ComponentName::ReserveVars)?;

    let entries: Vec<_> = iproduct!(
        model.data.thermal_generators.values(),
        model.time_periods()
    )
    .map(|(generator, period)| {
        (
            (generator.id.clone(), *period),
            0.0..=generator.max_output,
            generator.max_output,
        )
    })
    .collect();

    let kind = model.data.parameters.declarations.maximum_power_available;
    debug!("Declaring MaximumPowerAvailable ({kind:?}) and ReserveProvided");
    model.maximum_power_available =
        Some(model.declare_family("MaximumPowerAvailable", kind, entries.clone()));
    model.reserve_provided = Some(model.declare_family(
        "ReserveProvided",
        DeclarationKind::Variable,
        entries,
    ));

    Ok(ReserveVars::issue(model))
}
