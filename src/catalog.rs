//! Resource-type catalogs for strict rendering.
//!
//! The core only checks graph shape. A catalog adds the knowledge of which
//! resource types exist and which top-level properties each accepts; nested
//! property shapes stay the engine's concern.

use std::collections::{HashMap, HashSet};

use once_cell::sync::Lazy;

pub trait ResourceCatalog: Send + Sync {
    /// e.g. "AWS::S3::Bucket".
    fn knows_type(&self, resource_type: &str) -> bool;
    /// Whether `property` is a legal top-level property of `resource_type`.
    fn allows_property(&self, resource_type: &str, property: &str) -> bool;
}

/// A catalog backed by an in-memory table of types and property names.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StaticCatalog {
    types: HashMap<String, HashSet<String>>,
}

impl StaticCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `resource_type` with its property names. Registering a type
    /// twice merges the property sets.
    pub fn with_type<I, S>(mut self, resource_type: impl Into<String>, properties: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.types
            .entry(resource_type.into())
            .or_default()
            .extend(properties.into_iter().map(Into::into));
        self
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }
}

impl ResourceCatalog for StaticCatalog {
    fn knows_type(&self, resource_type: &str) -> bool {
        self.types.contains_key(resource_type)
    }

    fn allows_property(&self, resource_type: &str, property: &str) -> bool {
        self.types
            .get(resource_type)
            .is_some_and(|properties| properties.contains(property))
    }
}

static STATIC_SITE_CATALOG: Lazy<StaticCatalog> = Lazy::new(|| {
    StaticCatalog::new()
        .with_type(
            "AWS::CertificateManager::Certificate",
            [
                "CertificateAuthorityArn",
                "CertificateTransparencyLoggingPreference",
                "DomainName",
                "DomainValidationOptions",
                "KeyAlgorithm",
                "SubjectAlternativeNames",
                "Tags",
                "ValidationMethod",
            ],
        )
        .with_type(
            "AWS::S3::Bucket",
            [
                "AccessControl",
                "BucketEncryption",
                "BucketName",
                "CorsConfiguration",
                "LifecycleConfiguration",
                "LoggingConfiguration",
                "PublicAccessBlockConfiguration",
                "Tags",
                "VersioningConfiguration",
                "WebsiteConfiguration",
            ],
        )
        .with_type("AWS::S3::BucketPolicy", ["Bucket", "PolicyDocument"])
        .with_type("AWS::CloudFront::Distribution", ["DistributionConfig", "Tags"])
        .with_type(
            "AWS::Route53::RecordSet",
            [
                "AliasTarget",
                "Comment",
                "Failover",
                "GeoLocation",
                "HealthCheckId",
                "HostedZoneId",
                "HostedZoneName",
                "MultiValueAnswer",
                "Name",
                "Region",
                "ResourceRecords",
                "SetIdentifier",
                "TTL",
                "Type",
                "Weight",
            ],
        )
});

/// The resource types emitted by [`crate::site::StaticSite`].
pub fn static_site_catalog() -> &'static StaticCatalog {
    &STATIC_SITE_CATALOG
}
