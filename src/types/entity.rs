use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumDiscriminants, EnumString};

use super::condition::Condition;
use super::output::Output;
use super::parameter::Parameter;
use super::resource::Resource;

/// Any named node of a template. `EntityKind` is its field-less discriminant.
#[derive(Debug, Clone, PartialEq, EnumDiscriminants)]
#[strum_discriminants(
    name(EntityKind),
    derive(Hash, Display, EnumString, AsRefStr, Serialize, Deserialize)
)]
pub enum Entity {
    Parameter(Parameter),
    Condition(Condition),
    Resource(Resource),
    Output(Output),
}

impl Entity {
    pub fn kind(&self) -> EntityKind {
        self.into()
    }

    pub fn as_parameter(&self) -> Option<&Parameter> {
        match self {
            Entity::Parameter(parameter) => Some(parameter),
            _ => None,
        }
    }

    pub fn as_condition(&self) -> Option<&Condition> {
        match self {
            Entity::Condition(condition) => Some(condition),
            _ => None,
        }
    }

    pub fn as_resource(&self) -> Option<&Resource> {
        match self {
            Entity::Resource(resource) => Some(resource),
            _ => None,
        }
    }

    pub fn as_output(&self) -> Option<&Output> {
        match self {
            Entity::Output(output) => Some(output),
            _ => None,
        }
    }
}
