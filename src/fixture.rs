//! Fixtures for tests

use crate::model::parameters::{Declarations, ModelParameters, ReserveFormulation};
use crate::model::{
    NondispatchableGenerator, StorageUnit, SystemData, ThermalGenerator, TimePeriod,
};
use indexmap::{IndexSet, indexmap};
use rstest::fixture;

/// Assert that an error with the given message occurs
macro_rules! assert_error {
    ($result:expr, $msg:expr) => {
        assert_eq!(
            $result.unwrap_err().chain().next().unwrap().to_string(),
            $msg
        );
    };
}
pub(crate) use assert_error;

#[fixture]
pub fn model_parameters() -> ModelParameters {
    ModelParameters {
        time_periods: vec![TimePeriod(1), TimePeriod(2)],
        formulation: ReserveFormulation::CarrionArroyo,
        reserve_shortfall_penalty: 1000.0,
        declarations: Declarations::default(),
    }
}

/// Two buses, two thermal generators, one non-dispatchable generator and one storage unit, with a
/// reserve requirement of 50 in period 1 and 0 in period 2
#[fixture]
pub fn system_data(model_parameters: ModelParameters) -> SystemData {
    let buses: IndexSet<_> = ["b1".into(), "b2".into()].into_iter().collect();

    let thermal_generators = indexmap! {
        "g1".into() => ThermalGenerator {
            id: "g1".into(),
            bus_id: "b1".into(),
            max_output: 100.0,
        },
        "g2".into() => ThermalGenerator {
            id: "g2".into(),
            bus_id: "b2".into(),
            max_output: 200.0,
        },
    };

    let nondispatchable_generators = indexmap! {
        "n1".into() => NondispatchableGenerator {
            id: "n1".into(),
            bus_id: "b2".into(),
            forecast: indexmap! { TimePeriod(1) => 30.0, TimePeriod(2) => 10.0 },
        },
    };

    let storage = indexmap! {
        "s1".into() => StorageUnit {
            id: "s1".into(),
            bus_id: "b1".into(),
            max_discharge: 20.0,
            max_charge: 15.0,
        },
    };

    SystemData {
        parameters: model_parameters,
        buses,
        thermal_generators,
        nondispatchable_generators,
        storage,
        total_demand: indexmap! { TimePeriod(1) => 100.0, TimePeriod(2) => 80.0 },
        reserve_requirement: Some(indexmap! { TimePeriod(1) => 50.0, TimePeriod(2) => 0.0 }),
    }
}
