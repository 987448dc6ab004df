//! Template outputs.

use super::value::Value;

/// A value exported from the stack once it has been provisioned.
#[derive(Debug, Clone, PartialEq)]
pub struct Output {
    value: Value,
    description: Option<String>,
    condition: Option<String>,
    export_name: Option<Value>,
}

impl Output {
    pub fn new(value: impl Into<Value>) -> Self {
        Output {
            value: value.into(),
            description: None,
            condition: None,
            export_name: None,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Only emit the output when the named condition holds.
    pub fn with_condition(mut self, condition: impl AsRef<str>) -> Self {
        self.condition = Some(condition.as_ref().to_string());
        self
    }

    /// Export the value under a stack-independent name for `Fn::ImportValue`.
    pub fn with_export(mut self, name: impl Into<Value>) -> Self {
        self.export_name = Some(name.into());
        self
    }

    pub fn value(&self) -> &Value {
        &self.value
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn condition(&self) -> Option<&str> {
        self.condition.as_deref()
    }

    pub fn export_name(&self) -> Option<&Value> {
        self.export_name.as_ref()
    }
}
