use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::types::{EntityKind, ReferenceKind};

#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
pub enum TemplateError {
    #[error("duplicate logical name '{name}': already used by a {existing}")]
    DuplicateName { name: String, existing: EntityKind },

    #[error("invalid logical name '{0}': expected 1-255 alphanumeric characters")]
    InvalidName(String),

    #[error("unresolved {kind} reference to '{name}' in '{referrer}'")]
    UnresolvedReference {
        kind: ReferenceKind,
        name: String,
        referrer: String,
    },

    #[error("cyclic dependency between resources: {}", .path.join(" -> "))]
    CyclicDependency { path: Vec<String> },

    #[error("invalid condition '{name}': {reason}")]
    InvalidCondition { name: String, reason: String },

    #[error("malformed intrinsic in '{entity}': {reason}")]
    MalformedIntrinsic { entity: String, reason: String },

    #[error("invalid parameter '{name}': {reason}")]
    InvalidParameter { name: String, reason: String },

    #[error("unknown resource type '{resource_type}' for resource '{name}'")]
    UnknownResourceType { name: String, resource_type: String },

    #[error("unknown property '{property}' on resource '{name}' of type '{resource_type}'")]
    UnknownProperty {
        name: String,
        resource_type: String,
        property: String,
    },

    #[error("serialization error: {0}")]
    Serialization(String),
}

impl TemplateError {
    pub(crate) fn malformed(entity: &str, reason: impl Into<String>) -> Self {
        TemplateError::MalformedIntrinsic {
            entity: entity.to_string(),
            reason: reason.into(),
        }
    }

    pub(crate) fn invalid_condition(name: &str, reason: impl Into<String>) -> Self {
        TemplateError::InvalidCondition {
            name: name.to_string(),
            reason: reason.into(),
        }
    }

    pub(crate) fn unresolved(kind: ReferenceKind, name: &str, referrer: &str) -> Self {
        TemplateError::UnresolvedReference {
            kind,
            name: name.to_string(),
            referrer: referrer.to_string(),
        }
    }
}

impl From<serde_json::Error> for TemplateError {
    fn from(err: serde_json::Error) -> Self {
        TemplateError::Serialization(err.to_string())
    }
}
