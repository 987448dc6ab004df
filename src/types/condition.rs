use super::value::Value;

/// A named boolean expression gating resources and outputs.
#[derive(Debug, Clone, PartialEq)]
pub struct Condition {
    expression: Value,
}

impl Condition {
    pub fn new(expression: impl Into<Value>) -> Self {
        Condition {
            expression: expression.into(),
        }
    }

    pub fn expression(&self) -> &Value {
        &self.expression
    }
}
