//! Builds a complete model by adding components in order.
use crate::component::data_loader::load_data;
use crate::component::non_dispatchable_vars::add_non_dispatchable_vars;
use crate::component::reserve_requirement::{CompletedStages, build_reserve_constraints};
use crate::component::reserve_vars::add_reserve_vars;
use crate::component::storage_service::add_storage_service;
use crate::model::parameters::ReserveFormulation;
use crate::model::{SystemData, UnitCommitmentModel};
use anyhow::{Context, Result};
use log::info;

/// Add the components which the reserve requirement depends on.
///
/// Non-dispatchable generators and storage are only added for formulations which make use of
/// them.
///
/// # Returns
///
/// The model and tokens for the components which have been added.
pub fn add_upstream_components(
    data: SystemData,
) -> Result<(UnitCommitmentModel, CompletedStages)> {
    let (mut model, data_loader) = load_data(data)?;
    let reserve_vars = add_reserve_vars(&mut model, &data_loader)?;

    let formulation = model.data.parameters.formulation;
    let (non_dispatchable_vars, storage_service) = match formulation {
        ReserveFormulation::CarrionArroyo => (
            Some(add_non_dispatchable_vars(&mut model, &data_loader)?),
            Some(add_storage_service(&mut model, &data_loader)?),
        ),
        ReserveFormulation::MoralesEspanaLatorreRamos => (None, None),
    };

    let stages = CompletedStages {
        data_loader,
        reserve_vars,
        non_dispatchable_vars,
        storage_service,
    };

    Ok((model, stages))
}

/// Build and validate a model for the given system.
pub fn build_model(data: SystemData) -> Result<UnitCommitmentModel> {
    let (mut model, stages) = add_upstream_components(data)?;
    build_reserve_constraints(&mut model, &stages)?;
    model.validate().context("Model validation failed")?;

    info!(
        "Built model with {} variables and {} reserve constraints",
        model.variables.len(),
        model
            .enforce_reserve_requirements
            .as_ref()
            .map_or(0, |constraints| constraints.len())
    );

    Ok(model)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::component::ComponentName;
    use crate::fixture::system_data;
    use crate::model::TimePeriod;
    use rstest::rstest;

    #[rstest]
    fn test_build_model_carrion_arroyo(system_data: SystemData) {
        let model = build_model(system_data).unwrap();
        assert_eq!(
            model.iter_components().collect::<Vec<_>>(),
            [
                ComponentName::DataLoader,
                ComponentName::ReserveVars,
                ComponentName::NonDispatchableVars,
                ComponentName::StorageService,
                ComponentName::ReserveRequirement
            ]
        );

        // Per period: 2 mismatch, 2 max available, 2 provided, 1 non-dispatchable, 2 storage and
        // 1 shortfall
        assert_eq!(model.variables.len(), 2 * 10);
    }

    #[rstest]
    fn test_build_model_provided_reserve(mut system_data: SystemData) {
        system_data.parameters.formulation = ReserveFormulation::MoralesEspanaLatorreRamos;
        let model = build_model(system_data).unwrap();
        assert!(!model.has_component(ComponentName::StorageService));
        assert!(!model.has_component(ComponentName::NonDispatchableVars));
        assert!(
            model.enforce_reserve_requirements.as_ref().unwrap()[&TimePeriod(2)]
                .lower
                .is_some()
        );
    }

    #[rstest]
    fn test_build_model_invalid(mut system_data: SystemData) {
        system_data.reserve_requirement = Some([(TimePeriod(2), -1.0)].into_iter().collect());
        let err = build_model(system_data).unwrap_err();
        assert_eq!(err.to_string(), "Model validation failed");
    }
}
