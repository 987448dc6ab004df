//! Resource declarations.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};

use super::value::Value;

/// What the engine does with a resource's physical counterpart when the
/// resource is deleted or replaced.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString, AsRefStr,
)]
pub enum DeletionPolicy {
    Delete,
    Retain,
    Snapshot,
}

/// A resource declaration.
///
/// The resource type is an opaque identifier naming an external schema, e.g.
/// `AWS::S3::Bucket`. Properties keep their insertion order.
#[derive(Debug, Clone, PartialEq)]
pub struct Resource {
    resource_type: String,
    properties: IndexMap<String, Value>,
    condition: Option<String>,
    depends_on: Vec<String>,
    deletion_policy: Option<DeletionPolicy>,
    update_replace_policy: Option<DeletionPolicy>,
    metadata: Option<Value>,
}

impl Resource {
    /// Create a new resource of `resource_type` without properties.
    pub fn new(resource_type: impl Into<String>) -> Self {
        Resource {
            resource_type: resource_type.into(),
            properties: IndexMap::new(),
            condition: None,
            depends_on: Vec::new(),
            deletion_policy: None,
            update_replace_policy: None,
            metadata: None,
        }
    }

    /// Set a property, returning the updated value. Setting a property twice
    /// keeps its original position and replaces the value.
    pub fn with_property(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.properties.insert(name.into(), value.into());
        self
    }

    /// Only create the resource when the named condition holds.
    pub fn with_condition(mut self, condition: impl AsRef<str>) -> Self {
        self.condition = Some(condition.as_ref().to_string());
        self
    }

    /// Create this resource after `resource`. Repeated names are kept once.
    pub fn depends_on(mut self, resource: impl AsRef<str>) -> Self {
        self.push_dependency(resource.as_ref());
        self
    }

    pub fn with_deletion_policy(mut self, policy: DeletionPolicy) -> Self {
        self.deletion_policy = Some(policy);
        self
    }

    pub fn with_update_replace_policy(mut self, policy: DeletionPolicy) -> Self {
        self.update_replace_policy = Some(policy);
        self
    }

    pub fn with_metadata(mut self, metadata: impl Into<Value>) -> Self {
        self.metadata = Some(metadata.into());
        self
    }

    pub fn resource_type(&self) -> &str {
        &self.resource_type
    }

    pub fn properties(&self) -> &IndexMap<String, Value> {
        &self.properties
    }

    pub fn property(&self, name: &str) -> Option<&Value> {
        self.properties.get(name)
    }

    pub fn condition(&self) -> Option<&str> {
        self.condition.as_deref()
    }

    pub fn dependencies(&self) -> &[String] {
        &self.depends_on
    }

    pub fn deletion_policy(&self) -> Option<DeletionPolicy> {
        self.deletion_policy
    }

    pub fn update_replace_policy(&self) -> Option<DeletionPolicy> {
        self.update_replace_policy
    }

    pub fn metadata(&self) -> Option<&Value> {
        self.metadata.as_ref()
    }

    /// Returns `false` when the dependency was already declared.
    pub(crate) fn push_dependency(&mut self, resource: &str) -> bool {
        if self.depends_on.iter().any(|existing| existing == resource) {
            return false;
        }
        self.depends_on.push(resource.to_string());
        true
    }
}
