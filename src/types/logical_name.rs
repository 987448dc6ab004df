//! Logical names identifying entities within a template.

use std::borrow::Borrow;
use std::fmt::{Display, Formatter, Result as FmtResult};
use std::str::FromStr;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::TemplateError;

/// The provisioning engine rejects longer logical IDs.
pub const MAX_LOGICAL_NAME_LEN: usize = 255;

static LOGICAL_NAME: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[A-Za-z0-9]+$").unwrap());

/// A validated logical name: 1-255 ASCII letters and digits.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct LogicalName(String);

impl LogicalName {
    pub fn new(name: impl Into<String>) -> Result<Self, TemplateError> {
        let name = name.into();
        if name.len() > MAX_LOGICAL_NAME_LEN || !LOGICAL_NAME.is_match(&name) {
            return Err(TemplateError::InvalidName(name));
        }
        Ok(LogicalName(name))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether `name` would be accepted by [`LogicalName::new`].
    pub fn is_valid(name: &str) -> bool {
        name.len() <= MAX_LOGICAL_NAME_LEN && LOGICAL_NAME.is_match(name)
    }
}

impl Display for LogicalName {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for LogicalName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Borrow<str> for LogicalName {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl FromStr for LogicalName {
    type Err = TemplateError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        LogicalName::new(s)
    }
}

impl TryFrom<String> for LogicalName {
    type Error = TemplateError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        LogicalName::new(value)
    }
}

impl From<LogicalName> for String {
    fn from(name: LogicalName) -> Self {
        name.0
    }
}
