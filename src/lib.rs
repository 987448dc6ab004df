//! Build, validate and render CloudFormation-style infrastructure templates.
//!
//! A [`Template`] owns named parameters, conditions, resources and outputs.
//! Values that are only known at provisioning time are expressed as
//! [`Value`] intrinsics (`Ref`, `Fn::GetAtt`, `Fn::Join`, ...), and
//! [`Template::render`] checks that every reference resolves and that
//! resources do not depend on each other cyclically before producing the
//! engine's JSON document.
//!
//! ```rust
//! use cfn_template_core::{Output, Parameter, Resource, Template, Value};
//!
//! let mut t = Template::new();
//! let domain = t.add_parameter("domainName", Parameter::string()).unwrap();
//! let bucket = t.add_resource("bucket", Resource::new("AWS::S3::Bucket")).unwrap();
//! t.add_resource(
//!     "distribution",
//!     Resource::new("AWS::CloudFront::Distribution")
//!         .with_property("Alias", &domain)
//!         .with_property("Origin", bucket.get_att("DomainName")),
//! )
//! .unwrap();
//! t.add_output("bucketName", Output::new(&bucket)).unwrap();
//!
//! let rendered = t.render().unwrap();
//! assert_eq!(
//!     rendered.as_value()["Resources"]["distribution"]["Properties"]["Origin"],
//!     serde_json::json!({"Fn::GetAtt": ["bucket", "DomainName"]})
//! );
//! ```

pub use catalog::{ResourceCatalog, StaticCatalog, static_site_catalog};
pub use error::TemplateError;
pub use graph::{DependencyEdge, DependencyGraph};
pub use render::{RenderOptions, RenderedTemplate};
pub use site::{
    CLOUDFRONT_HOSTED_ZONE_ID, OriginSource, SiteConfig, StaticSite, ViewerProtocolPolicy,
};
pub use template::{FORMAT_VERSION, Template, TemplateState};
pub use types::{
    Condition, ConditionHandle, DeletionPolicy, Entity, EntityKind, Handle, LogicalName, Output,
    Parameter, ParameterHandle, ParameterType, PseudoParameter, Reference, ReferenceKind,
    Resource, ResourceHandle, Value,
};

pub mod catalog;
mod error;
mod graph;
mod render;
pub mod site;
mod template;
pub mod types;
mod validate;
