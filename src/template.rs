//! The template document: an ordered set of named entities.
//!
//! Entities are added through the `add_*` operations, which validate names
//! eagerly and return typed handles. Cross-references between resources and
//! outputs are only resolved when the template is validated or rendered, so
//! resources may refer to each other in any order.

use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, Ordering};

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display};
use tracing::{debug, info, warn};

use crate::catalog::ResourceCatalog;
use crate::error::TemplateError;
use crate::graph::DependencyGraph;
use crate::render::{RenderedTemplate, render_template};
use crate::types::{
    Condition, ConditionHandle, Entity, EntityKind, Handle, LogicalName, Output, Parameter,
    ParameterHandle, ReferenceKind, Resource, ResourceHandle, Value,
};
use crate::validate::{check_catalog, check_condition, validate_template};

/// The only template format version the engine understands.
pub const FORMAT_VERSION: &str = "2010-09-09";

/// Lifecycle of a template. Additions are allowed in both states.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, AsRefStr)]
pub enum TemplateState {
    /// No successful render yet.
    Open,
    /// Rendered at least once.
    Rendered,
}

/// A template under construction. `Send + Sync`; rendering takes `&self`.
#[derive(Debug, Default)]
pub struct Template {
    description: Option<String>,
    format_version: Option<String>,
    entities: IndexMap<LogicalName, Entity>,
    rendered: AtomicBool,
}

impl Clone for Template {
    fn clone(&self) -> Self {
        Template {
            description: self.description.clone(),
            format_version: self.format_version.clone(),
            entities: self.entities.clone(),
            rendered: AtomicBool::new(self.rendered.load(Ordering::Acquire)),
        }
    }
}

/// Two templates are equal when they would render the same document; the
/// lifecycle state is ignored.
impl PartialEq for Template {
    fn eq(&self, other: &Self) -> bool {
        self.description == other.description
            && self.format_version == other.format_version
            && self.entities == other.entities
    }
}

impl Template {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn set_description(&mut self, description: impl Into<String>) {
        self.description = Some(description.into());
    }

    /// Emit `AWSTemplateFormatVersion`, usually [`FORMAT_VERSION`].
    pub fn set_format_version(&mut self, version: impl Into<String>) {
        self.format_version = Some(version.into());
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn format_version(&self) -> Option<&str> {
        self.format_version.as_deref()
    }

    pub fn state(&self) -> TemplateState {
        if self.rendered.load(Ordering::Acquire) {
            TemplateState::Rendered
        } else {
            TemplateState::Open
        }
    }

    /// Add a parameter.
    ///
    /// Fails with `InvalidName`, `DuplicateName`, or `InvalidParameter` when
    /// the default does not fit the declared type or allowed values.
    pub fn add_parameter(
        &mut self,
        name: &str,
        parameter: Parameter,
    ) -> Result<ParameterHandle, TemplateError> {
        let name = self.claim(name)?;
        parameter
            .check_default()
            .map_err(|reason| TemplateError::InvalidParameter {
                name: name.to_string(),
                reason,
            })?;

        debug!(
            event = "Template",
            phase = "AddParameter",
            name = name.as_str(),
            param_type = parameter.param_type().as_ref()
        );
        let handle = Handle::new(name.as_str());
        self.insert(name, Entity::Parameter(parameter), "AddParameter");
        Ok(handle)
    }

    /// Add a condition. The expression is checked immediately against the
    /// entities already in the template, so conditions must be declared after
    /// the parameters and conditions they use.
    pub fn add_condition(
        &mut self,
        name: &str,
        expression: impl Into<Value>,
    ) -> Result<ConditionHandle, TemplateError> {
        let name = self.claim(name)?;
        let expression = expression.into();
        check_condition(self, name.as_str(), &expression)?;

        debug!(event = "Template", phase = "AddCondition", name = name.as_str());
        let handle = Handle::new(name.as_str());
        self.insert(name, Entity::Condition(Condition::new(expression)), "AddCondition");
        Ok(handle)
    }

    /// Add a resource. Embedded references are resolved at render time.
    pub fn add_resource(
        &mut self,
        name: &str,
        resource: Resource,
    ) -> Result<ResourceHandle, TemplateError> {
        let name = self.claim(name)?;

        debug!(
            event = "Template",
            phase = "AddResource",
            name = name.as_str(),
            resource_type = resource.resource_type(),
            properties = resource.properties().len()
        );
        let handle = Handle::new(name.as_str());
        self.insert(name, Entity::Resource(resource), "AddResource");
        Ok(handle)
    }

    pub fn add_output(&mut self, name: &str, output: Output) -> Result<(), TemplateError> {
        let name = self.claim(name)?;

        debug!(event = "Template", phase = "AddOutput", name = name.as_str());
        self.insert(name, Entity::Output(output), "AddOutput");
        Ok(())
    }

    /// Add several outputs at once. Either every output is added or, on the
    /// first invalid or duplicate name, none is.
    pub fn add_outputs<I, N>(&mut self, outputs: I) -> Result<(), TemplateError>
    where
        I: IntoIterator<Item = (N, Output)>,
        N: AsRef<str>,
    {
        let mut staged: Vec<(LogicalName, Output)> = Vec::new();
        let mut seen: HashSet<LogicalName> = HashSet::new();
        for (name, output) in outputs {
            let name = self.claim(name.as_ref())?;
            if !seen.insert(name.clone()) {
                return Err(TemplateError::DuplicateName {
                    name: name.into(),
                    existing: EntityKind::Output,
                });
            }
            staged.push((name, output));
        }

        for (name, output) in staged {
            debug!(event = "Template", phase = "AddOutput", name = name.as_str());
            self.insert(name, Entity::Output(output), "AddOutput");
        }
        Ok(())
    }

    /// Declare that `resource` must be created after `depends_on`.
    ///
    /// `resource` must already exist; `depends_on` is resolved at render
    /// time like any other reference. Repeated declarations are ignored.
    pub fn add_dependency(&mut self, resource: &str, depends_on: &str) -> Result<(), TemplateError> {
        if !LogicalName::is_valid(depends_on) {
            return Err(TemplateError::InvalidName(depends_on.to_string()));
        }
        let rendered = self.rendered.load(Ordering::Acquire);
        let Some(Entity::Resource(target)) = self.entities.get_mut(resource) else {
            return Err(TemplateError::unresolved(
                ReferenceKind::DependsOn,
                resource,
                resource,
            ));
        };

        let added = target.push_dependency(depends_on);
        debug!(
            event = "Template",
            phase = "AddDependency",
            name = resource,
            depends_on = depends_on,
            added = added
        );
        if added && rendered {
            warn!(
                event = "Template",
                phase = "AfterRender",
                operation = "AddDependency",
                name = resource
            );
        }
        Ok(())
    }

    pub fn entity(&self, name: &str) -> Option<&Entity> {
        self.entities.get(name)
    }

    pub fn parameter(&self, name: &str) -> Option<&Parameter> {
        self.entity(name).and_then(Entity::as_parameter)
    }

    pub fn condition(&self, name: &str) -> Option<&Condition> {
        self.entity(name).and_then(Entity::as_condition)
    }

    pub fn resource(&self, name: &str) -> Option<&Resource> {
        self.entity(name).and_then(Entity::as_resource)
    }

    pub fn output(&self, name: &str) -> Option<&Output> {
        self.entity(name).and_then(Entity::as_output)
    }

    /// Parameters in insertion order.
    pub fn parameters(&self) -> impl Iterator<Item = (&str, &Parameter)> {
        self.entities
            .iter()
            .filter_map(|(name, entity)| entity.as_parameter().map(|p| (name.as_str(), p)))
    }

    pub fn conditions(&self) -> impl Iterator<Item = (&str, &Condition)> {
        self.entities
            .iter()
            .filter_map(|(name, entity)| entity.as_condition().map(|c| (name.as_str(), c)))
    }

    pub fn resources(&self) -> impl Iterator<Item = (&str, &Resource)> {
        self.entities
            .iter()
            .filter_map(|(name, entity)| entity.as_resource().map(|r| (name.as_str(), r)))
    }

    pub fn outputs(&self) -> impl Iterator<Item = (&str, &Output)> {
        self.entities
            .iter()
            .filter_map(|(name, entity)| entity.as_output().map(|o| (name.as_str(), o)))
    }

    /// Every logical name, across all kinds, in insertion order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entities.keys().map(LogicalName::as_str)
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    /// Check references, intrinsic shapes and resource cycles without rendering.
    pub fn validate(&self) -> Result<(), TemplateError> {
        validate_template(self)
    }

    /// Validate and render. Either the whole document is produced or an
    /// error is returned.
    pub fn render(&self) -> Result<RenderedTemplate, TemplateError> {
        self.render_checked(None)
    }

    /// Like [`Template::render`], additionally checking resource types and
    /// property names against `catalog`.
    pub fn render_strict(
        &self,
        catalog: &dyn ResourceCatalog,
    ) -> Result<RenderedTemplate, TemplateError> {
        self.render_checked(Some(catalog))
    }

    /// Resources ordered so each one follows everything it depends on.
    pub fn creation_order(&self) -> Result<Vec<String>, TemplateError> {
        self.validate()?;
        self.dependency_graph().creation_order()
    }

    pub fn dependency_graph(&self) -> DependencyGraph {
        DependencyGraph::from_template(self)
    }

    fn render_checked(
        &self,
        catalog: Option<&dyn ResourceCatalog>,
    ) -> Result<RenderedTemplate, TemplateError> {
        let checked = self.validate().and_then(|()| match catalog {
            Some(catalog) => check_catalog(self, catalog),
            None => Ok(()),
        });
        if let Err(err) = checked {
            warn!(event = "Render", phase = "Rejected", error = %err);
            return Err(err);
        }
        debug!(
            event = "Render",
            phase = "Validated",
            entities = self.len(),
            strict = catalog.is_some()
        );

        let rendered = render_template(self);
        self.rendered.store(true, Ordering::Release);
        info!(
            event = "Render",
            phase = "Rendered",
            parameters = self.count(EntityKind::Parameter),
            conditions = self.count(EntityKind::Condition),
            resources = self.count(EntityKind::Resource),
            outputs = self.count(EntityKind::Output)
        );
        Ok(rendered)
    }

    fn count(&self, kind: EntityKind) -> usize {
        self.entities.values().filter(|e| e.kind() == kind).count()
    }

    /// Validate `name` and make sure it is free.
    fn claim(&self, name: &str) -> Result<LogicalName, TemplateError> {
        let name = LogicalName::new(name)?;
        if let Some(existing) = self.entities.get(name.as_str()) {
            return Err(TemplateError::DuplicateName {
                name: name.into(),
                existing: existing.kind(),
            });
        }
        Ok(name)
    }

    fn insert(&mut self, name: LogicalName, entity: Entity, operation: &str) {
        if self.rendered.load(Ordering::Acquire) {
            warn!(
                event = "Template",
                phase = "AfterRender",
                operation = operation,
                name = name.as_str()
            );
        }
        self.entities.insert(name, entity);
    }
}

#[cfg(test)]
mod tests;
