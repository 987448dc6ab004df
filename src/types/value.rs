//! Property values and intrinsic functions.

use indexmap::IndexMap;
use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value as JsonValue;

use super::reference::{Reference, ReferenceKind};
use crate::error::TemplateError;
use crate::render::parse_value;

/// Wire keys of the intrinsics modelled by [`Value`].
const INTRINSIC_KEYS: &[&str] = &[
    "Ref",
    "Condition",
    "Fn::GetAtt",
    "Fn::Join",
    "Fn::Sub",
    "Fn::Select",
    "Fn::Split",
    "Fn::Base64",
    "Fn::GetAZs",
    "Fn::ImportValue",
    "Fn::If",
    "Fn::Equals",
    "Fn::Not",
    "Fn::And",
    "Fn::Or",
];

static SUB_PLACEHOLDER: Lazy<Regex> = Lazy::new(|| Regex::new(r"\$\{([^}]*)\}").unwrap());

/// A property value: either concrete data or a deferred intrinsic function
/// that the provisioning engine resolves at apply time.
///
/// `Equals`, `Not`, `And`, `Or` and `Condition` are only valid inside
/// condition definitions.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// Concrete JSON data containing no intrinsics.
    Literal(JsonValue),
    List(Vec<Value>),
    /// Ordered map of nested values.
    Object(IndexMap<String, Value>),
    Ref(String),
    GetAtt {
        resource: String,
        attribute: String,
    },
    Join {
        separator: String,
        parts: Vec<Value>,
    },
    Sub {
        template: String,
        variables: IndexMap<String, Value>,
    },
    Select {
        index: u32,
        list: Box<Value>,
    },
    Split {
        delimiter: String,
        source: Box<Value>,
    },
    Base64(Box<Value>),
    GetAzs(Box<Value>),
    ImportValue(Box<Value>),
    If {
        condition: String,
        when_true: Box<Value>,
        when_false: Box<Value>,
    },
    Condition(String),
    Equals(Box<Value>, Box<Value>),
    Not(Box<Value>),
    And(Vec<Value>),
    Or(Vec<Value>),
}

impl Value {
    /// Wrap JSON data. Intrinsic wire shapes inside it, such as
    /// `{"Ref": "myBucket"}`, become typed intrinsics.
    pub fn literal(value: impl Into<JsonValue>) -> Self {
        parse_value(&value.into())
    }

    pub fn reference(name: impl Into<String>) -> Self {
        Value::Ref(name.into())
    }

    pub fn get_att(resource: impl Into<String>, attribute: impl Into<String>) -> Self {
        Value::GetAtt {
            resource: resource.into(),
            attribute: attribute.into(),
        }
    }

    pub fn join<I, V>(separator: impl Into<String>, parts: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        Value::Join {
            separator: separator.into(),
            parts: parts.into_iter().map(Into::into).collect(),
        }
    }

    /// `Fn::Sub` resolving every placeholder against the template's entities.
    pub fn sub(template: impl Into<String>) -> Self {
        Value::Sub {
            template: template.into(),
            variables: IndexMap::new(),
        }
    }

    /// `Fn::Sub` with an explicit variable map.
    pub fn sub_with<I, K, V>(template: impl Into<String>, variables: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<Value>,
    {
        Value::Sub {
            template: template.into(),
            variables: variables
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }

    pub fn select(index: u32, list: impl Into<Value>) -> Self {
        Value::Select {
            index,
            list: Box::new(list.into()),
        }
    }

    pub fn split(delimiter: impl Into<String>, source: impl Into<Value>) -> Self {
        Value::Split {
            delimiter: delimiter.into(),
            source: Box::new(source.into()),
        }
    }

    pub fn base64(value: impl Into<Value>) -> Self {
        Value::Base64(Box::new(value.into()))
    }

    /// Availability zones of `region`; an empty string means the stack's region.
    pub fn get_azs(region: impl Into<Value>) -> Self {
        Value::GetAzs(Box::new(region.into()))
    }

    pub fn import_value(export_name: impl Into<Value>) -> Self {
        Value::ImportValue(Box::new(export_name.into()))
    }

    pub fn if_condition(
        condition: impl Into<String>,
        when_true: impl Into<Value>,
        when_false: impl Into<Value>,
    ) -> Self {
        Value::If {
            condition: condition.into(),
            when_true: Box::new(when_true.into()),
            when_false: Box::new(when_false.into()),
        }
    }

    pub fn condition(name: impl Into<String>) -> Self {
        Value::Condition(name.into())
    }

    pub fn equals(a: impl Into<Value>, b: impl Into<Value>) -> Self {
        Value::Equals(Box::new(a.into()), Box::new(b.into()))
    }

    #[allow(clippy::should_implement_trait)]
    pub fn not(value: impl Into<Value>) -> Self {
        Value::Not(Box::new(value.into()))
    }

    pub fn and<I, V>(conditions: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        Value::And(conditions.into_iter().map(Into::into).collect())
    }

    pub fn or<I, V>(conditions: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        Value::Or(conditions.into_iter().map(Into::into).collect())
    }

    pub fn list<I, V>(items: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        Value::List(items.into_iter().map(Into::into).collect())
    }

    pub fn object<I, K, V>(entries: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<Value>,
    {
        Value::Object(
            entries
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }

    /// The wire name of the intrinsic function, `None` for plain data.
    pub fn intrinsic_name(&self) -> Option<&'static str> {
        match self {
            Value::Literal(_) | Value::List(_) | Value::Object(_) => None,
            Value::Ref(_) => Some("Ref"),
            Value::GetAtt { .. } => Some("Fn::GetAtt"),
            Value::Join { .. } => Some("Fn::Join"),
            Value::Sub { .. } => Some("Fn::Sub"),
            Value::Select { .. } => Some("Fn::Select"),
            Value::Split { .. } => Some("Fn::Split"),
            Value::Base64(_) => Some("Fn::Base64"),
            Value::GetAzs(_) => Some("Fn::GetAZs"),
            Value::ImportValue(_) => Some("Fn::ImportValue"),
            Value::If { .. } => Some("Fn::If"),
            Value::Condition(_) => Some("Condition"),
            Value::Equals(..) => Some("Fn::Equals"),
            Value::Not(_) => Some("Fn::Not"),
            Value::And(_) => Some("Fn::And"),
            Value::Or(_) => Some("Fn::Or"),
        }
    }

    /// Whether this node may only appear inside a condition definition.
    pub fn is_condition_only(&self) -> bool {
        matches!(
            self,
            Value::Condition(_) | Value::Equals(..) | Value::Not(_) | Value::And(_) | Value::Or(_)
        )
    }

    /// Direct children, in wire order.
    pub fn children(&self) -> Vec<&Value> {
        match self {
            Value::Literal(_) | Value::Ref(_) | Value::GetAtt { .. } | Value::Condition(_) => {
                Vec::new()
            }
            Value::List(items) | Value::And(items) | Value::Or(items) => items.iter().collect(),
            Value::Join { parts, .. } => parts.iter().collect(),
            Value::Object(entries) => entries.values().collect(),
            Value::Sub { variables, .. } => variables.values().collect(),
            Value::Select { list, .. } => vec![list.as_ref()],
            Value::Split { source, .. } => vec![source.as_ref()],
            Value::Base64(inner) | Value::GetAzs(inner) | Value::ImportValue(inner) => {
                vec![inner.as_ref()]
            }
            Value::Not(inner) => vec![inner.as_ref()],
            Value::If {
                when_true,
                when_false,
                ..
            } => vec![when_true.as_ref(), when_false.as_ref()],
            Value::Equals(a, b) => vec![a.as_ref(), b.as_ref()],
        }
    }

    /// Visit this value and every nested value, depth first.
    pub fn walk<'a>(&'a self, visit: &mut impl FnMut(&'a Value)) {
        visit(self);
        for child in self.children() {
            child.walk(visit);
        }
    }

    /// Every entity name embedded in this value, in depth-first order.
    pub fn references(&self) -> Vec<Reference> {
        let mut out = Vec::new();
        self.walk(&mut |value| match value {
            Value::Ref(name) => out.push(Reference::new(ReferenceKind::Ref, name.clone())),
            Value::GetAtt { resource, .. } => {
                out.push(Reference::new(ReferenceKind::GetAtt, resource.clone()))
            }
            Value::If { condition, .. } | Value::Condition(condition) => {
                out.push(Reference::new(ReferenceKind::Condition, condition.clone()))
            }
            Value::Sub {
                template,
                variables,
            } => {
                for placeholder in sub_placeholders(template) {
                    if placeholder.is_empty() || variables.contains_key(placeholder) {
                        continue;
                    }
                    match placeholder.split_once('.') {
                        Some((resource, _)) => {
                            out.push(Reference::new(ReferenceKind::GetAtt, resource))
                        }
                        None => out.push(Reference::new(ReferenceKind::Sub, placeholder)),
                    }
                }
            }
            _ => {}
        });
        out
    }
}

pub(crate) fn is_intrinsic_key(key: &str) -> bool {
    INTRINSIC_KEYS.contains(&key)
}

/// The key of the first single-key object in `json` that names an intrinsic.
pub(crate) fn embedded_intrinsic(json: &JsonValue) -> Option<&str> {
    match json {
        JsonValue::Array(items) => items.iter().find_map(embedded_intrinsic),
        JsonValue::Object(entries) => {
            if entries.len() == 1 {
                if let Some(key) = entries.keys().find(|key| is_intrinsic_key(key)) {
                    return Some(key.as_str());
                }
            }
            entries.values().find_map(embedded_intrinsic)
        }
        _ => None,
    }
}

/// Placeholder bodies of an `Fn::Sub` template, skipping `${!Literal}` escapes.
pub(crate) fn sub_placeholders(template: &str) -> Vec<&str> {
    SUB_PLACEHOLDER
        .captures_iter(template)
        .filter_map(|caps| caps.get(1))
        .map(|m| m.as_str())
        .filter(|body| !body.starts_with('!'))
        .collect()
}

impl From<JsonValue> for Value {
    fn from(value: JsonValue) -> Self {
        parse_value(&value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::Literal(JsonValue::String(value.to_string()))
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::Literal(JsonValue::String(value))
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Literal(JsonValue::Bool(value))
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Value::Literal(JsonValue::from(value))
    }
}

impl From<u32> for Value {
    fn from(value: u32) -> Self {
        Value::Literal(JsonValue::from(value))
    }
}

impl TryFrom<f64> for Value {
    type Error = TemplateError;

    /// Fails for NaN and infinities, which have no JSON representation.
    fn try_from(value: f64) -> Result<Self, Self::Error> {
        serde_json::Number::from_f64(value)
            .map(|number| Value::Literal(JsonValue::Number(number)))
            .ok_or_else(|| {
                TemplateError::Serialization(format!("{value} is not a finite JSON number"))
            })
    }
}

impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(items: Vec<T>) -> Self {
        Value::List(items.into_iter().map(Into::into).collect())
    }
}
