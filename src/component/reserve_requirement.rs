//! The reserve requirement.
//!
//! In each time period, enough capacity must be held available to meet demand plus a spinning
//! reserve margin. A non-negative `ReserveShortfall[t]` variable absorbs any deficit so that a
//! system which cannot meet its reserve requirement gives a feasible but penalised solution instead
//! of an infeasible problem.
//!
//! Two formulations are available and only one can be added to a model:
//!
//! * Carrion-Arroyo: reserve is stated against maximum available power across the whole system
//!   (not per bus), together with non-dispatchable power, storage and load mismatch.
//! * Morales-España/Latorre/Ramos: reserve is the sum of the reserve provided by each thermal
//!   generator.
use super::reserve_vars::check_reserve_requirement;
use super::{
    ComponentName, DataLoaded, NondispatchableVars, ReserveRequirementAdded, ReserveVars,
    StorageService,
};
use crate::model::expression::{
    Constraint, LinearExprBuilder, WeightedSumBuilder, select_builder,
};
use crate::model::parameters::ReserveFormulation;
use crate::model::variable::{Family, Term};
use crate::model::{IndexLabel, TimePeriod, UnitCommitmentModel, require_family};
use anyhow::{Context, Result};
use indexmap::IndexMap;
use log::{debug, info};
use std::hash::Hash;

/// Whether the system's reserve requirement is in force.
///
/// This is decided once for the whole model, not per time period.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RequirementState {
    /// No reserve requirement: shortfall is fixed at zero and no constraints are added
    Disabled,
    /// Shortfall is bounded by the requirement and a constraint is added for each time period
    Enabled,
}

impl RequirementState {
    /// Decide the state for a model
    pub fn of(model: &UnitCommitmentModel) -> Self {
        if check_reserve_requirement(model) {
            Self::Enabled
        } else {
            Self::Disabled
        }
    }
}

/// Tokens for the components which have already been added to a model
#[derive(Debug)]
pub struct CompletedStages {
    /// System data has been loaded
    pub data_loader: DataLoaded,
    /// Reserve variables have been declared
    pub reserve_vars: ReserveVars,
    /// Non-dispatchable power has been declared, if needed by the formulation
    pub non_dispatchable_vars: Option<NondispatchableVars>,
    /// Storage has been declared, if needed by the formulation
    pub storage_service: Option<StorageService>,
}

/// Add the reserve requirement to the model, using the formulation from the model parameters.
///
/// Adds the variable family `ReserveShortfall[t]` and, if the system has a reserve requirement,
/// the constraint family `EnforceReserveRequirements[t]`.
pub fn build_reserve_constraints(
    model: &mut UnitCommitmentModel,
    stages: &CompletedStages,
) -> Result<ReserveRequirementAdded> {
    let formulation = model.data.parameters.formulation;
    match formulation {
        ReserveFormulation::CarrionArroyo => {
            let missing = |component: ComponentName| {
                format!("The {formulation} formulation requires the {component} component")
            };
            let non_dispatchable_vars = stages
                .non_dispatchable_vars
                .as_ref()
                .with_context(|| missing(ComponentName::NonDispatchableVars))?;
            let storage_service = stages
                .storage_service
                .as_ref()
                .with_context(|| missing(ComponentName::StorageService))?;

            ca_reserve_constraints(
                model,
                &stages.data_loader,
                &stages.reserve_vars,
                non_dispatchable_vars,
                storage_service,
            )
        }
        ReserveFormulation::MoralesEspanaLatorreRamos => {
            mlr_reserve_constraints(model, &stages.data_loader, &stages.reserve_vars)
        }
    }
}

/// Create `ReserveShortfall[t]` for every time period.
///
/// The shortfall can never be more than the reserve requirement in a time period. When the
/// requirement is disabled, both bounds are zero.
///
/// Note that this should only be called once per model.
pub fn add_reserve_shortfall(model: &mut UnitCommitmentModel, state: RequirementState) {
    let bounds: Vec<_> = model
        .time_periods()
        .iter()
        .map(|&period| {
            let upper = match state {
                RequirementState::Disabled => 0.0,
                RequirementState::Enabled => model.reserve_requirement(period),
            };
            (period, 0.0..=upper)
        })
        .collect();

    let shortfall = bounds
        .into_iter()
        .map(|(period, bounds)| {
            let name = format!("ReserveShortfall[{}]", period.label());
            (period, model.variables.add(name, bounds))
        })
        .collect();
    model.reserve_shortfall = Some(shortfall);
}

/// Add the Carrion-Arroyo reserve requirement.
///
/// For each time period:
///
/// sum(MaximumPowerAvailable) + sum(NondispatchablePowerUsed) + sum(PowerOutputStorage)
///     + sum(LoadGenerateMismatch) + ReserveShortfall - sum(PowerInputStorage)
///     >= TotalDemand + ReserveRequirement
///
/// Storage charging takes up capacity so is subtracted. If every quantity involved is a decision
/// variable, constraints are built as structured linear expressions; otherwise as weighted sums.
pub fn ca_reserve_constraints(
    model: &mut UnitCommitmentModel,
    data: &DataLoaded,
    reserve_vars: &ReserveVars,
    non_dispatchable_vars: &NondispatchableVars,
    storage_service: &StorageService,
) -> Result<ReserveRequirementAdded> {
    data.check(model)?;
    reserve_vars.check(model)?;
    non_dispatchable_vars.check(model)?;
    storage_service.check(model)?;

    info!(
        "Adding reserve requirement ({} formulation)",
        ReserveFormulation::CarrionArroyo
    );
    let state = RequirementState::of(model);
    let pending = match state {
        RequirementState::Disabled => None,
        RequirementState::Enabled => Some(maximum_power_constraints(model)?),
    };

    commit(model, state, pending)
}

/// Add the Morales-España/Latorre/Ramos reserve requirement.
///
/// For each time period:
///
/// sum(ReserveProvided) + ReserveShortfall >= ReserveRequirement
pub fn mlr_reserve_constraints(
    model: &mut UnitCommitmentModel,
    data: &DataLoaded,
    reserve_vars: &ReserveVars,
) -> Result<ReserveRequirementAdded> {
    data.check(model)?;
    reserve_vars.check(model)?;

    info!(
        "Adding reserve requirement ({} formulation)",
        ReserveFormulation::MoralesEspanaLatorreRamos
    );
    let state = RequirementState::of(model);
    let pending = match state {
        RequirementState::Disabled => None,
        RequirementState::Enabled => Some(provided_reserve_constraints(model)?),
    };

    commit(model, state, pending)
}

/// The terms of a reserve constraint for one time period, gathered before `ReserveShortfall[t]`
/// exists
struct PendingConstraint {
    /// Terms which come before the shortfall
    leading: Vec<(Term, f64)>,
    /// Terms which come after the shortfall
    trailing: Vec<(Term, f64)>,
    /// Right-hand side of the constraint
    lower: f64,
}

/// Constraints for every time period, with the builder to turn them into expressions
struct PendingConstraints {
    builder: &'static dyn LinearExprBuilder,
    constraints: IndexMap<TimePeriod, PendingConstraint>,
}

/// Attach the component, then add the shortfall and any constraints.
///
/// Every lookup which can fail has already happened, so the model is only changed if the
/// component can be attached.
fn commit(
    model: &mut UnitCommitmentModel,
    state: RequirementState,
    pending: Option<PendingConstraints>,
) -> Result<ReserveRequirementAdded> {
    model.attach(ComponentName::ReserveRequirement)?;
    if state == RequirementState::Disabled {
        info!("No reserve requirement for system; reserve shortfall fixed at zero");
    }
    add_reserve_shortfall(model, state);

    if let Some(PendingConstraints {
        builder,
        constraints,
    }) = pending
    {
        let shortfall = model.reserve_shortfall.as_ref();
        let constraints = constraints
            .into_iter()
            .map(|(period, pending)| {
                let mut terms = pending.leading;
                terms.extend(
                    shortfall
                        .and_then(|vars| vars.get(&period))
                        .map(|&var| (Term::Var(var), 1.0)),
                );
                terms.extend(pending.trailing);
                (period, Constraint::at_least(builder.build(&terms), pending.lower))
            })
            .collect();
        model.enforce_reserve_requirements = Some(constraints);
    }

    Ok(ReserveRequirementAdded::issue(model))
}

/// Gather the Carrion-Arroyo constraint for every time period
fn maximum_power_constraints(model: &UnitCommitmentModel) -> Result<PendingConstraints> {
    let available = require_family(
        model.maximum_power_available.as_ref(),
        "MaximumPowerAvailable",
    )?;
    let nondispatchable = require_family(
        model.nondispatchable_power_used.as_ref(),
        "NondispatchablePowerUsed",
    )?;
    let output = require_family(model.power_output_storage.as_ref(), "PowerOutputStorage")?;
    let input = require_family(model.power_input_storage.as_ref(), "PowerInputStorage")?;
    let mismatch = require_family(model.load_generate_mismatch.as_ref(), "LoadGenerateMismatch")?;

    let builder = select_builder(
        available.is_var()
            && nondispatchable.is_var()
            && output.is_var()
            && input.is_var()
            && mismatch.is_var(),
    );
    debug!("Reserve constraints will be built as {}", builder.name());

    let data = &model.data;
    let constraints = model
        .time_periods()
        .iter()
        .map(|&period| -> Result<_> {
            let mut leading = Vec::new();
            push_terms(
                &mut leading,
                available,
                "MaximumPowerAvailable",
                data.thermal_generators.keys().cloned().map(|id| (id, period)),
                1.0,
            )?;
            push_terms(
                &mut leading,
                nondispatchable,
                "NondispatchablePowerUsed",
                data.nondispatchable_generators
                    .keys()
                    .cloned()
                    .map(|id| (id, period)),
                1.0,
            )?;
            push_terms(
                &mut leading,
                output,
                "PowerOutputStorage",
                data.storage.keys().cloned().map(|id| (id, period)),
                1.0,
            )?;
            push_terms(
                &mut leading,
                mismatch,
                "LoadGenerateMismatch",
                data.buses.iter().cloned().map(|id| (id, period)),
                1.0,
            )?;

            let mut trailing = Vec::new();
            push_terms(
                &mut trailing,
                input,
                "PowerInputStorage",
                data.storage.keys().cloned().map(|id| (id, period)),
                -1.0,
            )?;

            let lower = model.total_demand(period) + model.reserve_requirement(period);
            Ok((
                period,
                PendingConstraint {
                    leading,
                    trailing,
                    lower,
                },
            ))
        })
        .collect::<Result<_>>()?;

    Ok(PendingConstraints {
        builder,
        constraints,
    })
}

/// Gather the Morales-España/Latorre/Ramos constraint for every time period.
///
/// Reserve provided is the only family of quantities involved, so these are always weighted sums.
fn provided_reserve_constraints(model: &UnitCommitmentModel) -> Result<PendingConstraints> {
    let provided = require_family(model.reserve_provided.as_ref(), "ReserveProvided")?;

    let constraints = model
        .time_periods()
        .iter()
        .map(|&period| -> Result<_> {
            let mut leading = Vec::new();
            push_terms(
                &mut leading,
                provided,
                "ReserveProvided",
                model
                    .data
                    .thermal_generators
                    .keys()
                    .cloned()
                    .map(|id| (id, period)),
                1.0,
            )?;

            Ok((
                period,
                PendingConstraint {
                    leading,
                    trailing: Vec::new(),
                    lower: model.reserve_requirement(period),
                },
            ))
        })
        .collect::<Result<_>>()?;

    Ok(PendingConstraints {
        builder: &WeightedSumBuilder,
        constraints,
    })
}

/// Append the terms of `family` for the given indices, each with coefficient `coef`
fn push_terms<K, I>(
    terms: &mut Vec<(Term, f64)>,
    family: &Family<K>,
    name: &str,
    keys: I,
    coef: f64,
) -> Result<()>
where
    K: Hash + Eq + IndexLabel,
    I: IntoIterator<Item = K>,
{
    for key in keys {
        let term = family
            .get(&key)
            .with_context(|| format!("{name}[{}] has not been declared", key.label()))?;
        terms.push((term, coef));
    }

    Ok(())
}
