//! Declares storage charging and discharging.
use super::{ComponentName, DataLoaded, StorageService};
use crate::model::UnitCommitmentModel;
use anyhow::Result;
use itertools::iproduct;
use log::debug;

/// Declare `PowerOutputStorage[s,t]` and `PowerInputStorage[s,t]` for every storage unit.
///
/// Variables are bounded by the unit's discharge and charge rates respectively. When fixed, both
/// are zero, i.e. storage is idle.
pub fn add_storage_service(
    model: &mut UnitCommitmentModel,
    data: &DataLoaded,
) -> Result<StorageService> {
    data.check(model)?;
    model.attach(ComponentName::StorageService)?;

    let (output, input): (Vec<_>, Vec<_>) =
        iproduct!(model.data.storage.values(), model.time_periods())
            .map(|(unit, period)| {
                let key = (unit.id.clone(), *period);
                (
                    (key.clone(), 0.0..=unit.max_discharge, 0.0),
                    (key, 0.0..=unit.max_charge, 0.0),
                )
            })
            .unzip();

    let kind = model.data.parameters.declarations.storage_power;
    debug!("Declaring PowerOutputStorage and PowerInputStorage ({kind:?})");
    model.power_output_storage = Some(model.declare_family("PowerOutputStorage", kind, output));
    model.power_input_storage = Some(model.declare_family("PowerInputStorage", kind, input));

    Ok(StorageService::issue(model))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::component::data_loader::load_data;
    use crate::fixture::system_data;
    use crate::model::parameters::DeclarationKind;
    use crate::model::variable::Term;
    use crate::model::{SystemData, TimePeriod};
    use rstest::rstest;

    #[rstest]
    fn test_add_storage_service(system_data: SystemData) {
        let (mut model, data) = load_data(system_data).unwrap();
        add_storage_service(&mut model, &data).unwrap();

        let key = ("s1".into(), TimePeriod(1));
        let Some(Term::Var(output)) = model.power_output_storage.as_ref().unwrap().get(&key)
        else {
            panic!("Expected variable")
        };
        let Some(Term::Var(input)) = model.power_input_storage.as_ref().unwrap().get(&key) else {
            panic!("Expected variable")
        };
        assert_eq!(model.variables.get(output).bounds, 0.0..=20.0);
        assert_eq!(model.variables.get(input).bounds, 0.0..=15.0);
        assert_eq!(model.variables.get(input).name, "PowerInputStorage[s1,1]");
    }

    #[rstest]
    fn test_add_storage_service_fixed(mut system_data: SystemData) {
        system_data.parameters.declarations.storage_power = DeclarationKind::Fixed;
        let (mut model, data) = load_data(system_data).unwrap();
        let num_vars = model.variables.len();
        add_storage_service(&mut model, &data).unwrap();

        assert_eq!(model.variables.len(), num_vars);
        let key = ("s1".into(), TimePeriod(2));
        for family in [&model.power_output_storage, &model.power_input_storage] {
            assert_eq!(family.as_ref().unwrap().get(&key), Some(Term::Constant(0.0)));
        }
    }
}
