//! The unit commitment model under construction.
//!
//! The model holds the system data read from input files, the decision variables and fixed
//! quantities declared by each component, and the reserve requirement constraints.
use crate::component::ComponentName;
use crate::id::{BusID, GeneratorID, StorageID};
use anyhow::{Context, Result, ensure};
use indexmap::{IndexMap, IndexSet};
use serde::{Deserialize, Serialize};
use std::fmt::Display;
use std::hash::Hash;
use std::ops::RangeInclusive;
use std::sync::atomic::{AtomicU64, Ordering};

pub mod expression;
use expression::Constraint;
pub mod parameters;
use parameters::{DeclarationKind, ModelParameters};
pub mod variable;
use variable::{Family, VarIndex, VariableSet};

/// Counter used to give every model a distinct ID
static NEXT_MODEL_ID: AtomicU64 = AtomicU64::new(0);

/// A single time period of the model
#[derive(
    Clone,
    Copy,
    Debug,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Deserialize,
    Serialize,
    derive_more::Display,
)]
pub struct TimePeriod(pub u32);

/// A thermal (dispatchable) generator
#[derive(PartialEq, Debug, Clone)]
pub struct ThermalGenerator {
    /// Unique identifier for the generator
    pub id: GeneratorID,
    /// The bus the generator is connected to
    pub bus_id: BusID,
    /// Maximum power output
    pub max_output: f64,
}

/// A generator whose output can only be forecast, not dispatched
#[derive(PartialEq, Debug, Clone)]
pub struct NondispatchableGenerator {
    /// Unique identifier for the generator
    pub id: GeneratorID,
    /// The bus the generator is connected to
    pub bus_id: BusID,
    /// Forecast output for each time period
    pub forecast: IndexMap<TimePeriod, f64>,
}

impl NondispatchableGenerator {
    /// The forecast output for a time period (zero if none was provided)
    pub fn forecast(&self, period: TimePeriod) -> f64 {
        self.forecast.get(&period).copied().unwrap_or(0.0)
    }
}

/// A storage unit which can charge and discharge
#[derive(PartialEq, Debug, Clone)]
pub struct StorageUnit {
    /// Unique identifier for the storage unit
    pub id: StorageID,
    /// The bus the storage unit is connected to
    pub bus_id: BusID,
    /// Maximum rate of discharge
    pub max_discharge: f64,
    /// Maximum rate of charge
    pub max_charge: f64,
}

/// Thermal generators, keyed by ID
pub type ThermalGeneratorMap = IndexMap<GeneratorID, ThermalGenerator>;

/// Non-dispatchable generators, keyed by ID
pub type NondispatchableGeneratorMap = IndexMap<GeneratorID, NondispatchableGenerator>;

/// Storage units, keyed by ID
pub type StorageMap = IndexMap<StorageID, StorageUnit>;

/// Input data describing the power system
#[derive(PartialEq, Debug)]
pub struct SystemData {
    /// Parameters from `model.toml`
    pub parameters: ModelParameters,
    /// All buses
    pub buses: IndexSet<BusID>,
    /// All thermal generators
    pub thermal_generators: ThermalGeneratorMap,
    /// All non-dispatchable generators
    pub nondispatchable_generators: NondispatchableGeneratorMap,
    /// All storage units
    pub storage: StorageMap,
    /// Demand summed over all buses for each time period
    pub total_demand: IndexMap<TimePeriod, f64>,
    /// Reserve requirement for each time period.
    ///
    /// `None` means that the system has no reserve requirement at all.
    pub reserve_requirement: Option<IndexMap<TimePeriod, f64>>,
}

/// An index into a family of quantities
pub trait IndexLabel {
    /// The label used in variable names, e.g. `g1,3`
    fn label(&self) -> String;
}

impl<T: Display> IndexLabel for (T, TimePeriod) {
    fn label(&self) -> String {
        format!("{},{}", self.0, self.1)
    }
}

impl IndexLabel for TimePeriod {
    fn label(&self) -> String {
        self.to_string()
    }
}

/// Index of a per-generator quantity
pub type GeneratorPeriod = (GeneratorID, TimePeriod);

/// Index of a per-storage-unit quantity
pub type StoragePeriod = (StorageID, TimePeriod);

/// Index of a per-bus quantity
pub type BusPeriod = (BusID, TimePeriod);

/// Identifies one model instance
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ModelID(u64);

/// A unit commitment model under construction
#[derive(Debug)]
pub struct UnitCommitmentModel {
    id: ModelID,
    /// Input data for the system
    pub data: SystemData,
    components: IndexSet<ComponentName>,
    /// Every decision variable in the model
    pub variables: VariableSet,
    /// `LoadGenerateMismatch[b,t]`
    pub load_generate_mismatch: Option<Family<BusPeriod>>,
    /// `MaximumPowerAvailable[g,t]`
    pub maximum_power_available: Option<Family<GeneratorPeriod>>,
    /// `ReserveProvided[g,t]`
    pub reserve_provided: Option<Family<GeneratorPeriod>>,
    /// `NondispatchablePowerUsed[n,t]`
    pub nondispatchable_power_used: Option<Family<GeneratorPeriod>>,
    /// `PowerOutputStorage[s,t]`
    pub power_output_storage: Option<Family<StoragePeriod>>,
    /// `PowerInputStorage[s,t]`
    pub power_input_storage: Option<Family<StoragePeriod>>,
    /// `ReserveShortfall[t]`
    pub reserve_shortfall: Option<IndexMap<TimePeriod, VarIndex>>,
    /// `EnforceReserveRequirements[t]`
    pub enforce_reserve_requirements: Option<IndexMap<TimePeriod, Constraint>>,
}

impl UnitCommitmentModel {
    /// Create an empty model for the given system
    pub(crate) fn new(data: SystemData) -> Self {
        Self {
            id: ModelID(NEXT_MODEL_ID.fetch_add(1, Ordering::Relaxed)),
            data,
            components: IndexSet::new(),
            variables: VariableSet::default(),
            load_generate_mismatch: None,
            maximum_power_available: None,
            reserve_provided: None,
            nondispatchable_power_used: None,
            power_output_storage: None,
            power_input_storage: None,
            reserve_shortfall: None,
            enforce_reserve_requirements: None,
        }
    }

    /// The ID of this model instance
    pub fn id(&self) -> ModelID {
        self.id
    }

    /// The model's time periods, in order
    pub fn time_periods(&self) -> &[TimePeriod] {
        &self.data.parameters.time_periods
    }

    /// Total demand for a time period (zero if there is none)
    pub fn total_demand(&self, period: TimePeriod) -> f64 {
        self.data
            .total_demand
            .get(&period)
            .copied()
            .unwrap_or(0.0)
    }

    /// Reserve requirement for a time period (zero if there is none)
    pub fn reserve_requirement(&self, period: TimePeriod) -> f64 {
        self.data
            .reserve_requirement
            .as_ref()
            .and_then(|requirement| requirement.get(&period))
            .copied()
            .unwrap_or(0.0)
    }

    /// Whether the given component has been added to the model
    pub fn has_component(&self, component: ComponentName) -> bool {
        self.components.contains(&component)
    }

    /// Iterate over the components added to the model, in the order they were added
    pub fn iter_components(&self) -> impl Iterator<Item = ComponentName> + '_ {
        self.components.iter().copied()
    }

    /// Record that a component has been added to the model.
    ///
    /// Each component can only be added once.
    pub(crate) fn attach(&mut self, component: ComponentName) -> Result<()> {
        ensure!(
            self.components.insert(component),
            "Component {component} has already been added to the model"
        );

        Ok(())
    }

    /// Declare a family of quantities, either as decision variables or as fixed values.
    ///
    /// # Arguments
    ///
    /// * `name` - Name of the family, used as a prefix for variable names
    /// * `kind` - Whether to create variables or fixed values
    /// * `entries` - For each index: the variable bounds and the value to use if fixed
    pub(crate) fn declare_family<K, I>(
        &mut self,
        name: &str,
        kind: DeclarationKind,
        entries: I,
    ) -> Family<K>
    where
        K: Hash + Eq + IndexLabel,
        I: IntoIterator<Item = (K, RangeInclusive<f64>, f64)>,
    {
        match kind {
            DeclarationKind::Variable => Family::Variables(
                entries
                    .into_iter()
                    .map(|(key, bounds, _)| {
                        let var = self
                            .variables
                            .add(format!("{name}[{}]", key.label()), bounds);
                        (key, var)
                    })
                    .collect(),
            ),
            DeclarationKind::Fixed => Family::Fixed(
                entries
                    .into_iter()
                    .map(|(key, _, value)| (key, value))
                    .collect(),
            ),
        }
    }

    /// Check that the model is well formed.
    ///
    /// This is where problems in the input data which the model-building components pass through
    /// unchecked (e.g. a negative reserve requirement) are reported.
    pub fn validate(&self) -> Result<()> {
        for (_, var) in self.variables.iter() {
            let (lower, upper) = (*var.bounds.start(), *var.bounds.end());
            ensure!(
                !lower.is_nan() && !upper.is_nan(),
                "Variable {} has undefined bounds",
                var.name
            );
            ensure!(
                lower <= upper,
                "Variable {} has invalid bounds: lower bound {lower} exceeds upper bound {upper}",
                var.name
            );
        }

        if self.has_component(ComponentName::ReserveRequirement) {
            let shortfall = self
                .reserve_shortfall
                .as_ref()
                .context("ReserveShortfall is missing from the model")?;
            ensure!(
                shortfall.len() == self.time_periods().len(),
                "ReserveShortfall must have one variable per time period"
            );
        }

        if let Some(constraints) = &self.enforce_reserve_requirements {
            ensure!(
                self.time_periods()
                    .iter()
                    .all(|period| constraints.contains_key(period))
                    && constraints.len() == self.time_periods().len(),
                "EnforceReserveRequirements must have exactly one constraint per time period"
            );
        }

        Ok(())
    }
}

/// Get a family which an earlier component should have declared.
///
/// Its absence means the components were added in the wrong order, so is reported as an error.
pub fn require_family<'a, K: Hash + Eq>(
    family: Option<&'a Family<K>>,
    name: &str,
) -> Result<&'a Family<K>> {
    family.with_context(|| {
        format!("{name} has not been declared. Was the component declaring it added first?")
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixture::{assert_error, system_data};
    use float_cmp::assert_approx_eq;
    use rstest::rstest;

    #[rstest]
    fn test_demand_and_requirement_lookup(system_data: SystemData) {
        let model = UnitCommitmentModel::new(system_data);
        assert_approx_eq!(f64, model.total_demand(TimePeriod(1)), 100.0);
        assert_approx_eq!(f64, model.reserve_requirement(TimePeriod(1)), 50.0);
        assert_approx_eq!(f64, model.reserve_requirement(TimePeriod(2)), 0.0);
        assert_approx_eq!(f64, model.total_demand(TimePeriod(99)), 0.0);
    }

    #[rstest]
    fn test_model_ids_are_distinct(#[from(system_data)] data1: SystemData, system_data: SystemData) {
        let model1 = UnitCommitmentModel::new(data1);
        let model2 = UnitCommitmentModel::new(system_data);
        assert_ne!(model1.id(), model2.id());
    }

    #[rstest]
    fn test_attach_twice(system_data: SystemData) {
        let mut model = UnitCommitmentModel::new(system_data);
        model.attach(ComponentName::ReserveVars).unwrap();
        assert!(model.has_component(ComponentName::ReserveVars));
        assert_error!(
            model.attach(ComponentName::ReserveVars),
            "Component reserve_vars has already been added to the model"
        );
    }

    #[rstest]
    fn test_declare_family(system_data: SystemData) {
        let mut model = UnitCommitmentModel::new(system_data);
        let entries = || [(TimePeriod(1), 0.0..=2.0, 2.0), (TimePeriod(2), 0.0..=3.0, 3.0)];

        let family = model.declare_family("Foo", DeclarationKind::Variable, entries());
        assert!(family.is_var());
        assert_eq!(model.variables.len(), 2);
        let names: Vec<_> = model.variables.iter().map(|(_, v)| v.name.clone()).collect();
        assert_eq!(names, ["Foo[1]", "Foo[2]"]);

        let family = model.declare_family("Bar", DeclarationKind::Fixed, entries());
        assert!(!family.is_var());
        assert_eq!(model.variables.len(), 2);
        assert_eq!(family.len(), 2);
    }

    #[rstest]
    fn test_validate_invalid_bounds(system_data: SystemData) {
        let mut model = UnitCommitmentModel::new(system_data);
        model.variables.add("x".into(), 0.0..=-1.0);
        assert_error!(
            model.validate(),
            "Variable x has invalid bounds: lower bound 0 exceeds upper bound -1"
        );
    }

    #[rstest]
    fn test_validate_nan_bounds(system_data: SystemData) {
        let mut model = UnitCommitmentModel::new(system_data);
        model.variables.add("x".into(), 0.0..=f64::NAN);
        assert_error!(model.validate(), "Variable x has undefined bounds");
    }

    #[test]
    fn test_require_family() {
        let family: Family<TimePeriod> = Family::Fixed(IndexMap::new());
        assert!(require_family(Some(&family), "Foo").is_ok());
        assert_error!(
            require_family::<TimePeriod>(None, "Foo"),
            "Foo has not been declared. Was the component declaring it added first?"
        );
    }
}
