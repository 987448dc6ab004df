//! Structural validation of a template before rendering.
//!
//! Checks graph shape only: names resolve to entities of the expected kind,
//! intrinsics are well formed, conditions are boolean, and resources do not
//! depend on themselves. Property types are left to the resource catalog.

use tracing::debug;

use crate::catalog::ResourceCatalog;
use crate::error::TemplateError;
use crate::graph::DependencyGraph;
use crate::template::Template;
use crate::types::{
    EntityKind, PseudoParameter, Reference, ReferenceKind, Value, embedded_intrinsic,
    is_intrinsic_key, sub_placeholders,
};

/// Validate every resource and output, then check for dependency cycles.
pub(crate) fn validate_template(template: &Template) -> Result<(), TemplateError> {
    for (name, resource) in template.resources() {
        if let Some(condition) = resource.condition() {
            resolve(template, &Reference::new(ReferenceKind::Condition, condition), name)?;
        }
        for dependency in resource.dependencies() {
            resolve(template, &Reference::new(ReferenceKind::DependsOn, dependency.as_str()), name)?;
        }
        for value in resource.properties().values() {
            check_value(template, value, name)?;
        }
        if let Some(metadata) = resource.metadata() {
            check_value(template, metadata, name)?;
        }
    }

    for (name, output) in template.outputs() {
        if let Some(condition) = output.condition() {
            resolve(template, &Reference::new(ReferenceKind::Condition, condition), name)?;
        }
        check_value(template, output.value(), name)?;
        if let Some(export_name) = output.export_name() {
            check_value(template, export_name, name)?;
        }
    }

    let graph = DependencyGraph::from_template(template);
    debug!(
        event = "Render",
        phase = "Graph",
        resources = graph.nodes().count(),
        edges = graph.edge_count()
    );
    if let Some(path) = graph.find_cycle() {
        return Err(TemplateError::CyclicDependency { path });
    }
    Ok(())
}

/// Check resource types and property names against a catalog.
pub(crate) fn check_catalog(
    template: &Template,
    catalog: &dyn ResourceCatalog,
) -> Result<(), TemplateError> {
    for (name, resource) in template.resources() {
        let resource_type = resource.resource_type();
        if !catalog.knows_type(resource_type) {
            return Err(TemplateError::UnknownResourceType {
                name: name.to_string(),
                resource_type: resource_type.to_string(),
            });
        }
        for property in resource.properties().keys() {
            if !catalog.allows_property(resource_type, property) {
                return Err(TemplateError::UnknownProperty {
                    name: name.to_string(),
                    resource_type: resource_type.to_string(),
                    property: property.clone(),
                });
            }
        }
    }
    Ok(())
}

/// Validate a condition expression against the entities declared so far.
pub(crate) fn check_condition(
    template: &Template,
    name: &str,
    expression: &Value,
) -> Result<(), TemplateError> {
    check_intrinsics(expression, name, true)?;
    check_boolean(template, name, expression)
}

fn check_value(template: &Template, value: &Value, referrer: &str) -> Result<(), TemplateError> {
    check_intrinsics(value, referrer, false)?;
    for reference in value.references() {
        resolve(template, &reference, referrer)?;
    }
    Ok(())
}

fn resolve(template: &Template, reference: &Reference, referrer: &str) -> Result<(), TemplateError> {
    let found = template.entity(&reference.name).map(|e| e.kind());
    let resolved = match reference.kind {
        ReferenceKind::Ref | ReferenceKind::Sub => {
            matches!(found, Some(EntityKind::Parameter | EntityKind::Resource))
                || PseudoParameter::is_reserved(&reference.name)
        }
        ReferenceKind::GetAtt | ReferenceKind::DependsOn => found == Some(EntityKind::Resource),
        ReferenceKind::Condition => found == Some(EntityKind::Condition),
    };
    if resolved {
        Ok(())
    } else {
        Err(TemplateError::unresolved(reference.kind, &reference.name, referrer))
    }
}

/// Shape checks that need no knowledge of the rest of the template.
fn check_intrinsics(value: &Value, entity: &str, in_condition: bool) -> Result<(), TemplateError> {
    let mut first_error: Option<String> = None;
    value.walk(&mut |node| {
        if first_error.is_none() {
            first_error = malformation(node, in_condition);
        }
    });
    match first_error {
        Some(reason) => Err(TemplateError::malformed(entity, reason)),
        None => Ok(()),
    }
}

fn malformation(node: &Value, in_condition: bool) -> Option<String> {
    if !in_condition && node.is_condition_only() {
        return Some(format!(
            "{} is only valid inside a condition definition",
            node.intrinsic_name().unwrap_or("condition")
        ));
    }
    match node {
        Value::Ref(name) if name.is_empty() => Some("Ref requires a name".to_string()),
        Value::GetAtt {
            resource,
            attribute,
        } if resource.is_empty() || attribute.is_empty() => {
            Some("Fn::GetAtt requires a resource name and an attribute name".to_string())
        }
        Value::Join { parts, .. } if parts.is_empty() => {
            Some("Fn::Join requires at least one part".to_string())
        }
        Value::Sub { template, .. } if template.is_empty() => {
            Some("Fn::Sub requires a template string".to_string())
        }
        Value::Sub { template, .. } if sub_placeholders(template).iter().any(|p| p.is_empty()) => {
            Some(format!("Fn::Sub template '{template}' contains an empty placeholder"))
        }
        Value::If { condition, .. } | Value::Condition(condition) if condition.is_empty() => {
            Some(format!("{} requires a condition name", node.intrinsic_name().unwrap_or("Condition")))
        }
        Value::And(items) | Value::Or(items) if items.len() < 2 => Some(format!(
            "{} requires at least two conditions",
            node.intrinsic_name().unwrap_or("Fn::And")
        )),
        Value::Literal(json) => embedded_intrinsic(json)
            .map(|key| format!("literal data contains an untyped {key} intrinsic")),
        Value::Object(entries) if entries.len() == 1 => entries
            .keys()
            .find(|key| is_intrinsic_key(key))
            .map(|key| format!("{key} must be built as an intrinsic, not as an object key")),
        _ => None,
    }
}

/// A position that must evaluate to true or false.
fn check_boolean(template: &Template, name: &str, expression: &Value) -> Result<(), TemplateError> {
    match expression {
        Value::Equals(a, b) => {
            check_operand(template, name, a)?;
            check_operand(template, name, b)
        }
        Value::Not(inner) => check_boolean(template, name, inner),
        Value::And(items) | Value::Or(items) => items
            .iter()
            .try_for_each(|item| check_boolean(template, name, item)),
        Value::Condition(other) => {
            if template.entity(other).map(|e| e.kind()) == Some(EntityKind::Condition) {
                Ok(())
            } else {
                Err(TemplateError::invalid_condition(
                    name,
                    format!("references undeclared condition '{other}'"),
                ))
            }
        }
        other => Err(TemplateError::invalid_condition(
            name,
            format!("expected a boolean expression, found {}", describe(other)),
        )),
    }
}

/// A position inside `Fn::Equals` that must evaluate to a plain value.
fn check_operand(template: &Template, name: &str, operand: &Value) -> Result<(), TemplateError> {
    match operand {
        Value::Literal(_) => Ok(()),
        Value::Ref(target) => check_parameter_reference(template, name, target),
        Value::List(items) => items
            .iter()
            .try_for_each(|item| check_operand(template, name, item)),
        Value::Join { parts, .. } => parts
            .iter()
            .try_for_each(|part| check_operand(template, name, part)),
        Value::Sub {
            template: text,
            variables,
        } => {
            for placeholder in sub_placeholders(text) {
                if variables.contains_key(placeholder) {
                    continue;
                }
                if placeholder.contains('.') {
                    return Err(TemplateError::invalid_condition(
                        name,
                        format!("Fn::Sub placeholder '${{{placeholder}}}' reads a resource attribute"),
                    ));
                }
                check_parameter_reference(template, name, placeholder)?;
            }
            variables
                .values()
                .try_for_each(|value| check_operand(template, name, value))
        }
        Value::Select { list, .. } => check_operand(template, name, list),
        Value::Split { source, .. } => check_operand(template, name, source),
        other if other.is_condition_only() => Err(TemplateError::invalid_condition(
            name,
            format!("{} used where a value is expected", describe(other)),
        )),
        other => Err(TemplateError::invalid_condition(
            name,
            format!("{} is not allowed in a condition", describe(other)),
        )),
    }
}

fn check_parameter_reference(
    template: &Template,
    name: &str,
    target: &str,
) -> Result<(), TemplateError> {
    if PseudoParameter::is_reserved(target) {
        return Ok(());
    }
    match template.entity(target).map(|e| e.kind()) {
        Some(EntityKind::Parameter) => Ok(()),
        Some(kind) => Err(TemplateError::invalid_condition(
            name,
            format!("references {kind} '{target}', conditions may only reference parameters"),
        )),
        None => Err(TemplateError::invalid_condition(
            name,
            format!("references undeclared parameter '{target}'"),
        )),
    }
}

fn describe(value: &Value) -> String {
    match value {
        Value::Literal(_) => "a literal".to_string(),
        Value::List(_) => "a list".to_string(),
        Value::Object(_) => "an object".to_string(),
        other => other.intrinsic_name().unwrap_or("an intrinsic").to_string(),
    }
}
