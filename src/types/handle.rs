//! Typed handles returned when entities are added to a template.

use std::fmt::{Display, Formatter, Result as FmtResult};
use std::marker::PhantomData;

use super::value::Value;

/// Marker type for Parameters
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ParameterMarker {}

/// Marker type for Conditions
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ConditionMarker {}

/// Marker type for Resources
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ResourceMarker {}

/// A lightweight, typed reference to an entity by logical name.
///
/// Handles do not own the entity; they only carry the name into later
/// intrinsic constructions, so the marker decides which intrinsics make sense.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Handle<T> {
    name: String,
    _marker: PhantomData<T>,
}

impl<T> Handle<T> {
    pub(crate) fn new(name: impl Into<String>) -> Self {
        Handle {
            name: name.into(),
            _marker: PhantomData,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

impl<T> Display for Handle<T> {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str(&self.name)
    }
}

impl<T> AsRef<str> for Handle<T> {
    fn as_ref(&self) -> &str {
        &self.name
    }
}

/// A Parameter's handle.
pub type ParameterHandle = Handle<ParameterMarker>;

/// A Condition's handle.
pub type ConditionHandle = Handle<ConditionMarker>;

/// A Resource's handle.
pub type ResourceHandle = Handle<ResourceMarker>;

impl Handle<ParameterMarker> {
    /// `{"Ref": name}`, the parameter's input value.
    pub fn reference(&self) -> Value {
        Value::Ref(self.name.clone())
    }
}

impl Handle<ResourceMarker> {
    /// `{"Ref": name}`, the resource's physical identifier.
    pub fn reference(&self) -> Value {
        Value::Ref(self.name.clone())
    }

    /// `{"Fn::GetAtt": [name, attribute]}`.
    pub fn get_att(&self, attribute: impl Into<String>) -> Value {
        Value::get_att(self.name.clone(), attribute)
    }
}

impl Handle<ConditionMarker> {
    /// `{"Condition": name}`, for use inside other condition expressions.
    pub fn condition(&self) -> Value {
        Value::Condition(self.name.clone())
    }

    /// `{"Fn::If": [name, when_true, when_false]}`.
    pub fn if_else(&self, when_true: impl Into<Value>, when_false: impl Into<Value>) -> Value {
        Value::if_condition(self.name.clone(), when_true, when_false)
    }
}

impl From<&ParameterHandle> for Value {
    fn from(handle: &ParameterHandle) -> Self {
        handle.reference()
    }
}

impl From<&ResourceHandle> for Value {
    fn from(handle: &ResourceHandle) -> Self {
        handle.reference()
    }
}

impl From<&ConditionHandle> for Value {
    fn from(handle: &ConditionHandle) -> Self {
        handle.condition()
    }
}
