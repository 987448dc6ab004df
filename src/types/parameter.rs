//! Template parameters: inputs resolved by the provisioning engine.

use itertools::Itertools;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use strum_macros::{AsRefStr, Display, EnumString};
use utoipa::ToSchema;

/// Declared type of a parameter, rendered under `Type`.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    ToSchema,
    Display,
    EnumString,
    AsRefStr,
)]
#[strum(ascii_case_insensitive)]
pub enum ParameterType {
    String,
    Number,
    CommaDelimitedList,
    #[strum(serialize = "List<Number>")]
    #[serde(rename = "List<Number>")]
    NumberList,
}

/// A parameter declaration.
#[derive(Debug, Clone, PartialEq)]
pub struct Parameter {
    param_type: ParameterType,
    default: Option<JsonValue>,
    description: Option<String>,
    allowed_values: Vec<JsonValue>,
    allowed_pattern: Option<String>,
    constraint_description: Option<String>,
    no_echo: bool,
}

impl Parameter {
    pub fn new(param_type: ParameterType) -> Self {
        Parameter {
            param_type,
            default: None,
            description: None,
            allowed_values: Vec::new(),
            allowed_pattern: None,
            constraint_description: None,
            no_echo: false,
        }
    }

    /// A `String` parameter, the most common kind.
    pub fn string() -> Self {
        Parameter::new(ParameterType::String)
    }

    pub fn number() -> Self {
        Parameter::new(ParameterType::Number)
    }

    pub fn with_default(mut self, default: impl Into<JsonValue>) -> Self {
        self.default = Some(default.into());
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_allowed_values<I, V>(mut self, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<JsonValue>,
    {
        self.allowed_values = values.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_allowed_pattern(mut self, pattern: impl Into<String>) -> Self {
        self.allowed_pattern = Some(pattern.into());
        self
    }

    pub fn with_constraint_description(mut self, description: impl Into<String>) -> Self {
        self.constraint_description = Some(description.into());
        self
    }

    /// Mask the value in the engine's console and API output.
    pub fn with_no_echo(mut self) -> Self {
        self.no_echo = true;
        self
    }

    pub fn param_type(&self) -> ParameterType {
        self.param_type
    }

    pub fn default_value(&self) -> Option<&JsonValue> {
        self.default.as_ref()
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn allowed_values(&self) -> &[JsonValue] {
        &self.allowed_values
    }

    pub fn allowed_pattern(&self) -> Option<&str> {
        self.allowed_pattern.as_deref()
    }

    pub fn constraint_description(&self) -> Option<&str> {
        self.constraint_description.as_deref()
    }

    pub fn no_echo(&self) -> bool {
        self.no_echo
    }

    /// The default as the engine expects it: list defaults are joined into a
    /// single comma-delimited string.
    pub fn wire_default(&self) -> Option<JsonValue> {
        let default = self.default.as_ref()?;
        match (self.param_type, default) {
            (ParameterType::CommaDelimitedList | ParameterType::NumberList, JsonValue::Array(items)) => {
                Some(JsonValue::String(items.iter().map(scalar_text).join(",")))
            }
            _ => Some(default.clone()),
        }
    }

    /// Check the default against the declared type and allowed values.
    pub(crate) fn check_default(&self) -> Result<(), String> {
        let Some(default) = &self.default else {
            return Ok(());
        };

        let compatible = match (self.param_type, default) {
            (ParameterType::String, JsonValue::String(_)) => true,
            (ParameterType::Number, JsonValue::Number(_)) => true,
            (ParameterType::Number, JsonValue::String(s)) => is_numeric(s),
            (ParameterType::CommaDelimitedList, JsonValue::String(_)) => true,
            (ParameterType::CommaDelimitedList, JsonValue::Array(items)) => {
                items.iter().all(JsonValue::is_string)
            }
            (ParameterType::NumberList, JsonValue::String(s)) => {
                s.split(',').all(|item| is_numeric(item.trim()))
            }
            (ParameterType::NumberList, JsonValue::Array(items)) => items.iter().all(|item| match item {
                JsonValue::Number(_) => true,
                JsonValue::String(s) => is_numeric(s),
                _ => false,
            }),
            _ => false,
        };
        if !compatible {
            return Err(format!(
                "default {default} is not a valid {} value",
                self.param_type
            ));
        }

        if !self.allowed_values.is_empty() && !self.allowed_values.contains(default) {
            return Err(format!("default {default} is not one of the allowed values"));
        }
        Ok(())
    }
}

fn is_numeric(s: &str) -> bool {
    s.parse::<f64>().is_ok()
}

fn scalar_text(value: &JsonValue) -> String {
    match value {
        JsonValue::String(s) => s.clone(),
        other => other.to_string(),
    }
}
