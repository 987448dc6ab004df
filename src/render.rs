//! Projection of a template into the provisioning engine's JSON format.
//!
//! Rendering never evaluates intrinsics: `Ref`, `Fn::GetAtt` and friends are
//! serialized as-is for the engine to resolve at apply time.

use std::fmt::{Display, Formatter, Result as FmtResult};
use std::io::Write;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value as JsonValue, json};

use crate::error::TemplateError;
use crate::template::Template;
use crate::types::{Output, Parameter, Resource, Value};

/// Output formatting for [`RenderedTemplate::to_json_with`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderOptions {
    /// Indent nested objects; compact single-line output otherwise.
    pub pretty: bool,
}

impl Default for RenderOptions {
    fn default() -> Self {
        RenderOptions { pretty: true }
    }
}

/// A rendered template document.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderedTemplate {
    document: JsonValue,
}

impl RenderedTemplate {
    pub fn as_value(&self) -> &JsonValue {
        &self.document
    }

    pub fn into_value(self) -> JsonValue {
        self.document
    }

    /// Pretty-printed JSON.
    pub fn to_json(&self) -> String {
        format!("{:#}", self.document)
    }

    pub fn to_json_compact(&self) -> String {
        self.document.to_string()
    }

    pub fn to_json_with(&self, options: &RenderOptions) -> String {
        if options.pretty {
            self.to_json()
        } else {
            self.to_json_compact()
        }
    }

    /// Write the document to `writer`; the caller owns the destination.
    pub fn write_to<W: Write>(&self, writer: W, options: &RenderOptions) -> Result<(), TemplateError> {
        if options.pretty {
            serde_json::to_writer_pretty(writer, &self.document)?;
        } else {
            serde_json::to_writer(writer, &self.document)?;
        }
        Ok(())
    }
}

impl Display for RenderedTemplate {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(f, "{:#}", self.document)
    }
}

/// Build the wire document. The template must already be validated.
pub(crate) fn render_template(template: &Template) -> RenderedTemplate {
    let mut document = Map::new();

    if let Some(version) = template.format_version() {
        document.insert("AWSTemplateFormatVersion".into(), json!(version));
    }
    if let Some(description) = template.description() {
        document.insert("Description".into(), json!(description));
    }

    let parameters: Map<String, JsonValue> = template
        .parameters()
        .map(|(name, parameter)| (name.to_string(), render_parameter(parameter)))
        .collect();
    if !parameters.is_empty() {
        document.insert("Parameters".into(), JsonValue::Object(parameters));
    }

    let conditions: Map<String, JsonValue> = template
        .conditions()
        .map(|(name, condition)| (name.to_string(), render_value(condition.expression())))
        .collect();
    if !conditions.is_empty() {
        document.insert("Conditions".into(), JsonValue::Object(conditions));
    }

    let resources: Map<String, JsonValue> = template
        .resources()
        .map(|(name, resource)| (name.to_string(), render_resource(resource)))
        .collect();
    document.insert("Resources".into(), JsonValue::Object(resources));

    let outputs: Map<String, JsonValue> = template
        .outputs()
        .map(|(name, output)| (name.to_string(), render_output(output)))
        .collect();
    if !outputs.is_empty() {
        document.insert("Outputs".into(), JsonValue::Object(outputs));
    }

    RenderedTemplate {
        document: JsonValue::Object(document),
    }
}

fn render_parameter(parameter: &Parameter) -> JsonValue {
    let mut out = Map::new();
    out.insert("Type".into(), json!(parameter.param_type().as_ref()));
    if let Some(default) = parameter.wire_default() {
        out.insert("Default".into(), default);
    }
    if let Some(description) = parameter.description() {
        out.insert("Description".into(), json!(description));
    }
    if !parameter.allowed_values().is_empty() {
        out.insert("AllowedValues".into(), json!(parameter.allowed_values()));
    }
    if let Some(pattern) = parameter.allowed_pattern() {
        out.insert("AllowedPattern".into(), json!(pattern));
    }
    if let Some(description) = parameter.constraint_description() {
        out.insert("ConstraintDescription".into(), json!(description));
    }
    if parameter.no_echo() {
        out.insert("NoEcho".into(), json!(true));
    }
    JsonValue::Object(out)
}

fn render_resource(resource: &Resource) -> JsonValue {
    let mut out = Map::new();
    out.insert("Type".into(), json!(resource.resource_type()));
    if !resource.properties().is_empty() {
        out.insert("Properties".into(), render_map(resource.properties()));
    }
    if let Some(condition) = resource.condition() {
        out.insert("Condition".into(), json!(condition));
    }
    if !resource.dependencies().is_empty() {
        out.insert("DependsOn".into(), json!(resource.dependencies()));
    }
    if let Some(policy) = resource.deletion_policy() {
        out.insert("DeletionPolicy".into(), json!(policy.as_ref()));
    }
    if let Some(policy) = resource.update_replace_policy() {
        out.insert("UpdateReplacePolicy".into(), json!(policy.as_ref()));
    }
    if let Some(metadata) = resource.metadata() {
        out.insert("Metadata".into(), render_value(metadata));
    }
    JsonValue::Object(out)
}

fn render_output(output: &Output) -> JsonValue {
    let mut out = Map::new();
    out.insert("Value".into(), render_value(output.value()));
    if let Some(description) = output.description() {
        out.insert("Description".into(), json!(description));
    }
    if let Some(condition) = output.condition() {
        out.insert("Condition".into(), json!(condition));
    }
    if let Some(export_name) = output.export_name() {
        out.insert("Export".into(), json!({ "Name": render_value(export_name) }));
    }
    JsonValue::Object(out)
}

fn render_map(entries: &IndexMap<String, Value>) -> JsonValue {
    JsonValue::Object(
        entries
            .iter()
            .map(|(key, value)| (key.clone(), render_value(value)))
            .collect(),
    )
}

fn render_list(items: &[Value]) -> JsonValue {
    JsonValue::Array(items.iter().map(render_value).collect())
}

fn intrinsic(key: &str, body: JsonValue) -> JsonValue {
    let mut out = Map::new();
    out.insert(key.to_string(), body);
    JsonValue::Object(out)
}

/// Resolve a value into its wire shape.
pub(crate) fn render_value(value: &Value) -> JsonValue {
    match value {
        Value::Literal(literal) => literal.clone(),
        Value::List(items) => render_list(items),
        Value::Object(entries) => render_map(entries),
        Value::Ref(name) => intrinsic("Ref", json!(name)),
        Value::GetAtt {
            resource,
            attribute,
        } => intrinsic("Fn::GetAtt", json!([resource, attribute])),
        Value::Join { separator, parts } => {
            intrinsic("Fn::Join", json!([separator, render_list(parts)]))
        }
        Value::Sub {
            template,
            variables,
        } => {
            if variables.is_empty() {
                intrinsic("Fn::Sub", json!(template))
            } else {
                intrinsic("Fn::Sub", json!([template, render_map(variables)]))
            }
        }
        Value::Select { index, list } => {
            intrinsic("Fn::Select", json!([index.to_string(), render_value(list)]))
        }
        Value::Split { delimiter, source } => {
            intrinsic("Fn::Split", json!([delimiter, render_value(source)]))
        }
        Value::Base64(inner) => intrinsic("Fn::Base64", render_value(inner)),
        Value::GetAzs(region) => intrinsic("Fn::GetAZs", render_value(region)),
        Value::ImportValue(inner) => intrinsic("Fn::ImportValue", render_value(inner)),
        Value::If {
            condition,
            when_true,
            when_false,
        } => intrinsic(
            "Fn::If",
            json!([condition, render_value(when_true), render_value(when_false)]),
        ),
        Value::Condition(name) => intrinsic("Condition", json!(name)),
        Value::Equals(a, b) => intrinsic("Fn::Equals", json!([render_value(a), render_value(b)])),
        Value::Not(inner) => intrinsic("Fn::Not", json!([render_value(inner)])),
        Value::And(items) => intrinsic("Fn::And", render_list(items)),
        Value::Or(items) => intrinsic("Fn::Or", render_list(items)),
    }
}

/// Parse a wire shape back into a value. Single-key objects naming an
/// intrinsic with a well-formed body become that intrinsic; everything else
/// is plain data.
pub(crate) fn parse_value(json: &JsonValue) -> Value {
    match json {
        JsonValue::Array(items) => Value::List(items.iter().map(parse_value).collect()),
        JsonValue::Object(entries) => {
            if entries.len() == 1 {
                if let Some((key, body)) = entries.iter().next() {
                    if let Some(value) = parse_intrinsic(key, body) {
                        return value;
                    }
                }
            }
            Value::Object(
                entries
                    .iter()
                    .map(|(key, value)| (key.clone(), parse_value(value)))
                    .collect(),
            )
        }
        scalar => Value::Literal(scalar.clone()),
    }
}

fn parse_intrinsic(key: &str, body: &JsonValue) -> Option<Value> {
    let boxed = |json: &JsonValue| Box::new(parse_value(json));
    let value = match (key, body) {
        ("Ref", JsonValue::String(name)) => Value::Ref(name.clone()),
        ("Condition", JsonValue::String(name)) => Value::Condition(name.clone()),
        ("Fn::GetAtt", JsonValue::String(dotted)) => {
            let (resource, attribute) = dotted.split_once('.')?;
            Value::get_att(resource, attribute)
        }
        ("Fn::GetAtt", JsonValue::Array(args)) => match args.as_slice() {
            [JsonValue::String(resource), JsonValue::String(attribute)] => {
                Value::get_att(resource.clone(), attribute.clone())
            }
            _ => return None,
        },
        ("Fn::Join", JsonValue::Array(args)) => match args.as_slice() {
            [JsonValue::String(separator), JsonValue::Array(parts)] => Value::Join {
                separator: separator.clone(),
                parts: parts.iter().map(parse_value).collect(),
            },
            _ => return None,
        },
        ("Fn::Sub", JsonValue::String(template)) => Value::sub(template.clone()),
        ("Fn::Sub", JsonValue::Array(args)) => match args.as_slice() {
            [JsonValue::String(template), JsonValue::Object(variables)] => Value::Sub {
                template: template.clone(),
                variables: variables
                    .iter()
                    .map(|(k, v)| (k.clone(), parse_value(v)))
                    .collect(),
            },
            _ => return None,
        },
        ("Fn::Select", JsonValue::Array(args)) => match args.as_slice() {
            [index, list] => {
                let index = match index {
                    JsonValue::String(s) => s.parse::<u32>().ok()?,
                    JsonValue::Number(n) => u32::try_from(n.as_u64()?).ok()?,
                    _ => return None,
                };
                Value::Select {
                    index,
                    list: boxed(list),
                }
            }
            _ => return None,
        },
        ("Fn::Split", JsonValue::Array(args)) => match args.as_slice() {
            [JsonValue::String(delimiter), source] => Value::Split {
                delimiter: delimiter.clone(),
                source: boxed(source),
            },
            _ => return None,
        },
        ("Fn::Base64", inner) => Value::Base64(boxed(inner)),
        ("Fn::GetAZs", region) => Value::GetAzs(boxed(region)),
        ("Fn::ImportValue", inner) => Value::ImportValue(boxed(inner)),
        ("Fn::If", JsonValue::Array(args)) => match args.as_slice() {
            [JsonValue::String(condition), when_true, when_false] => Value::If {
                condition: condition.clone(),
                when_true: boxed(when_true),
                when_false: boxed(when_false),
            },
            _ => return None,
        },
        ("Fn::Equals", JsonValue::Array(args)) => match args.as_slice() {
            [a, b] => Value::Equals(boxed(a), boxed(b)),
            _ => return None,
        },
        ("Fn::Not", JsonValue::Array(args)) => match args.as_slice() {
            [inner] => Value::Not(boxed(inner)),
            _ => return None,
        },
        ("Fn::And", JsonValue::Array(args)) => Value::And(args.iter().map(parse_value).collect()),
        ("Fn::Or", JsonValue::Array(args)) => Value::Or(args.iter().map(parse_value).collect()),
        _ => return None,
    };
    Some(value)
}

impl Value {
    /// The value's wire shape, e.g. `{"Ref": "myBucket"}`.
    pub fn to_wire(&self) -> JsonValue {
        render_value(self)
    }

    /// Parse a wire shape; the inverse of [`Value::to_wire`] up to
    /// literal/list normalization.
    pub fn from_wire(json: &JsonValue) -> Value {
        parse_value(json)
    }
}
