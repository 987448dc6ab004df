//! Data model types for templates and their entities.
//!
//! Wire forms produced by the renderer:
//! - Parameter: `{"Type": "String", "Default": ..., "Description": ...}`
//! - Resource: `{"Type": "AWS::S3::Bucket", "Properties": {...}, "DependsOn": [...]}`
//! - Output: `{"Value": ..., "Description": ...}`
//! - Intrinsics: `{"Ref": name}`, `{"Fn::GetAtt": [name, attribute]}`, ...

mod condition;
mod entity;
mod handle;
mod logical_name;
mod output;
mod parameter;
mod pseudo;
mod reference;
mod resource;
mod value;

pub use condition::Condition;
pub use entity::{Entity, EntityKind};
pub use handle::{
    ConditionHandle, ConditionMarker, Handle, ParameterHandle, ParameterMarker, ResourceHandle,
    ResourceMarker,
};
pub use logical_name::{LogicalName, MAX_LOGICAL_NAME_LEN};
pub use output::Output;
pub use parameter::{Parameter, ParameterType};
pub use pseudo::PseudoParameter;
pub use reference::{Reference, ReferenceKind};
pub use resource::{DeletionPolicy, Resource};
pub use value::Value;

pub(crate) use value::{embedded_intrinsic, is_intrinsic_key, sub_placeholders};
