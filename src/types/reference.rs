//! Named references embedded in intrinsic values.

use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};

/// How an entity name was referenced. Determines which entity kinds the name
/// may resolve to:
///
/// - `Ref` and `Sub` (`${name}`): a parameter, a resource or a pseudo-parameter
/// - `GetAtt` (including `${name.Attribute}`): a resource
/// - `Condition` (resource/output gating, `Fn::If`, `{"Condition": name}`): a condition
/// - `DependsOn`: a resource
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString, AsRefStr,
)]
pub enum ReferenceKind {
    Ref,
    GetAtt,
    Sub,
    Condition,
    DependsOn,
}

/// A single name embedded somewhere in a value tree.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Reference {
    pub kind: ReferenceKind,
    pub name: String,
}

impl Reference {
    pub fn new(kind: ReferenceKind, name: impl Into<String>) -> Self {
        Reference {
            kind,
            name: name.into(),
        }
    }
}
