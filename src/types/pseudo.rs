//! Pseudo-parameters supplied by the provisioning engine.

use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumIter, EnumString};

use super::value::Value;

/// Values the provisioning engine resolves at apply time without a matching
/// parameter declaration. They may be used as `Ref` targets.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
    EnumIter,
)]
pub enum PseudoParameter {
    #[strum(serialize = "AWS::AccountId")]
    #[serde(rename = "AWS::AccountId")]
    AccountId,
    #[strum(serialize = "AWS::NotificationARNs")]
    #[serde(rename = "AWS::NotificationARNs")]
    NotificationArns,
    #[strum(serialize = "AWS::NoValue")]
    #[serde(rename = "AWS::NoValue")]
    NoValue,
    #[strum(serialize = "AWS::Partition")]
    #[serde(rename = "AWS::Partition")]
    Partition,
    #[strum(serialize = "AWS::Region")]
    #[serde(rename = "AWS::Region")]
    Region,
    #[strum(serialize = "AWS::StackId")]
    #[serde(rename = "AWS::StackId")]
    StackId,
    #[strum(serialize = "AWS::StackName")]
    #[serde(rename = "AWS::StackName")]
    StackName,
    #[strum(serialize = "AWS::URLSuffix")]
    #[serde(rename = "AWS::URLSuffix")]
    UrlSuffix,
}

impl PseudoParameter {
    /// Whether `name` is one of the reserved pseudo-parameter names.
    pub fn is_reserved(name: &str) -> bool {
        name.parse::<PseudoParameter>().is_ok()
    }

    /// A `Ref` to this pseudo-parameter.
    pub fn reference(self) -> Value {
        Value::Ref(self.to_string())
    }
}

impl From<PseudoParameter> for Value {
    fn from(pseudo: PseudoParameter) -> Self {
        pseudo.reference()
    }
}
