//! Components which add variables and constraints to a [`UnitCommitmentModel`].
//!
//! Each component can be added to a model only once. When a component has been added, it returns
//! a token for that model which later components take as proof that it ran first.
use crate::model::{ModelID, UnitCommitmentModel};
use anyhow::{Result, ensure};

pub mod data_loader;
pub mod non_dispatchable_vars;
pub mod reserve_requirement;
pub mod reserve_vars;
pub mod storage_service;

/// The names of the model-building components
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, strum::Display, strum::EnumIter)]
#[strum(serialize_all = "snake_case")]
pub enum ComponentName {
    /// Loads system data and declares load mismatch
    DataLoader,
    /// Declares maximum available power and provided reserve for thermal generators
    ReserveVars,
    /// Declares power used from non-dispatchable generators
    NonDispatchableVars,
    /// Declares storage charging and discharging
    StorageService,
    /// Adds the reserve shortfall and reserve requirement constraints
    ReserveRequirement,
}

macro_rules! define_component_token {
    ($(#[$meta:meta])* $name:ident, $component:expr) => {
        $(#[$meta])*
        #[derive(Debug)]
        pub struct $name {
            model_id: ModelID,
        }

        impl $name {
            /// The component this token stands for
            pub const COMPONENT: ComponentName = $component;

            /// Issue a token for a model the component has just been added to
            pub(crate) fn issue(model: &UnitCommitmentModel) -> Self {
                Self {
                    model_id: model.id(),
                }
            }

            /// Check that the token was issued for `model`
            pub fn check(&self, model: &UnitCommitmentModel) -> Result<()> {
                ensure!(
                    self.model_id == model.id(),
                    "The {} component was added to a different model",
                    Self::COMPONENT
                );

                Ok(())
            }
        }
    };
}

define_component_token!(
    /// Proof that system data has been loaded into a model
    DataLoaded,
    ComponentName::DataLoader
);
define_component_token!(
    /// Proof that reserve variables have been declared for a model
    ReserveVars,
    ComponentName::ReserveVars
);
define_component_token!(
    /// Proof that non-dispatchable power has been declared for a model
    NondispatchableVars,
    ComponentName::NonDispatchableVars
);
define_component_token!(
    /// Proof that storage charging and discharging have been declared for a model
    StorageService,
    ComponentName::StorageService
);
define_component_token!(
    /// Proof that the reserve requirement has been added to a model
    ReserveRequirementAdded,
    ComponentName::ReserveRequirement
);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::component::data_loader::load_data;
    use crate::fixture::{assert_error, system_data};
    use crate::model::SystemData;
    use rstest::rstest;
    use strum::IntoEnumIterator;

    #[test]
    fn test_component_names() {
        let names: Vec<_> = ComponentName::iter().map(|c| c.to_string()).collect();
        assert_eq!(
            names,
            [
                "data_loader",
                "reserve_vars",
                "non_dispatchable_vars",
                "storage_service",
                "reserve_requirement"
            ]
        );
    }

    #[rstest]
    fn test_token_check(#[from(system_data)] data1: SystemData, system_data: SystemData) {
        let (model1, token1) = load_data(data1).unwrap();
        let (model2, _) = load_data(system_data).unwrap();
        assert!(token1.check(&model1).is_ok());
        assert_error!(
            token1.check(&model2),
            "The data_loader component was added to a different model"
        );
    }
}
