//! Static website hosting: an S3 origin served through CloudFront.
//!
//! One builder covers the whole family of site templates. The base graph is a
//! CloudFront distribution in front of a bucket; optional sub-graphs add an
//! ACM certificate, a bucket policy granting the origin access identity read
//! access, and a Route53 alias record gated on a hosted zone being supplied.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};
use tracing::{debug, warn};
use utoipa::ToSchema;

use crate::error::TemplateError;
use crate::template::Template;
use crate::types::{
    Output, Parameter, ParameterHandle, PseudoParameter, Resource, ResourceHandle, Value,
};

/// Hosted zone every CloudFront distribution lives in, used as the alias
/// record's target zone.
pub const CLOUDFRONT_HOSTED_ZONE_ID: &str = "Z2FDTNDATAQYW2";

const MANAGED_DESCRIPTION: &str = "Serving static content from an S3 bucket with CloudFront";
const EXISTING_DESCRIPTION: &str = "Hosting static files in S3 with Cloudfront";
const EXISTING_ORIGIN_ID: &str = "Origin1";
const OAI_USER_ARN: &str = "arn:aws:iam::cloudfront:user/CloudFront Origin Access Identity";

/// Where the distribution's content comes from.
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Serialize,
    Deserialize,
    ToSchema,
    Display,
    EnumString,
    AsRefStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum OriginSource {
    /// The template creates the bucket (`myBucket`).
    #[default]
    ManagedBucket,
    /// An existing bucket named by the `S3DNSName` parameter.
    ExistingBucket,
}

#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Serialize,
    Deserialize,
    ToSchema,
    Display,
    EnumString,
    AsRefStr,
)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum ViewerProtocolPolicy {
    AllowAll,
    #[default]
    RedirectToHttps,
    HttpsOnly,
}

/// Settings for [`StaticSite`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(default)]
pub struct SiteConfig {
    pub description: String,
    pub origin: OriginSource,
    pub viewer_protocol_policy: ViewerProtocolPolicy,
    /// e.g. `http2`
    pub http_version: String,
    /// e.g. `PriceClass_200`; omitted when `None`.
    pub price_class: Option<String>,
    pub default_root_object: Option<String>,
    pub forward_query_string: bool,
}

impl Default for SiteConfig {
    fn default() -> Self {
        SiteConfig {
            description: MANAGED_DESCRIPTION.to_string(),
            origin: OriginSource::ManagedBucket,
            viewer_protocol_policy: ViewerProtocolPolicy::RedirectToHttps,
            http_version: "http2".to_string(),
            price_class: Some("PriceClass_200".to_string()),
            default_root_object: Some("index.html".to_string()),
            forward_query_string: false,
        }
    }
}

impl SiteConfig {
    /// A plain distribution in front of an existing bucket, served over
    /// HTTP or HTTPS.
    pub fn existing_bucket() -> Self {
        SiteConfig {
            description: EXISTING_DESCRIPTION.to_string(),
            origin: OriginSource::ExistingBucket,
            viewer_protocol_policy: ViewerProtocolPolicy::AllowAll,
            http_version: "http2".to_string(),
            price_class: None,
            default_root_object: None,
            forward_query_string: false,
        }
    }
}

/// Builder for static site templates.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StaticSite {
    config: SiteConfig,
    certificate: bool,
    bucket_policy: bool,
    dns_alias: bool,
}

impl StaticSite {
    pub fn new(config: SiteConfig) -> Self {
        StaticSite {
            config,
            certificate: false,
            bucket_policy: false,
            dns_alias: false,
        }
    }

    /// Issue an ACM certificate for `domainName` and serve it over SNI.
    pub fn with_certificate(mut self) -> Self {
        self.certificate = true;
        self
    }

    /// Grant the origin access identity read access to the managed bucket.
    /// Has no effect on an existing-bucket origin.
    pub fn with_bucket_policy(mut self) -> Self {
        self.bucket_policy = true;
        self
    }

    /// Add an alias record for `domainName`, created only when `zoneId` is
    /// not empty.
    pub fn with_dns_alias(mut self) -> Self {
        self.dns_alias = true;
        self
    }

    pub fn config(&self) -> &SiteConfig {
        &self.config
    }

    /// Assemble and validate the template.
    pub fn build(&self) -> Result<Template, TemplateError> {
        debug!(
            event = "Site",
            phase = "Build",
            origin = self.config.origin.as_ref(),
            certificate = self.certificate,
            bucket_policy = self.bucket_policy,
            dns_alias = self.dns_alias
        );

        let mut t = Template::new().with_description(self.config.description.clone());

        let domain_name = if self.certificate || self.dns_alias {
            Some(t.add_parameter(
                "domainName",
                Parameter::string().with_description("Domain name for your site"),
            )?)
        } else {
            None
        };
        let zone_apex = if self.certificate {
            Some(t.add_parameter(
                "zoneApex",
                Parameter::string().with_description("Root domain name www.[example.com]"),
            )?)
        } else {
            None
        };
        let origin_input = match self.config.origin {
            OriginSource::ManagedBucket => OriginInput::Managed(t.add_parameter(
                "originAccessIdentity",
                Parameter::string().with_description("Origin Access Identity ID"),
            )?),
            OriginSource::ExistingBucket => OriginInput::Existing(t.add_parameter(
                "S3DNSName",
                Parameter::string().with_description(
                    "The DNS name of an existing S3 bucket to use as the Cloudfront distribution origin",
                ),
            )?),
        };
        let zone_id = if self.dns_alias {
            Some(t.add_parameter(
                "zoneId",
                Parameter::string()
                    .with_description("Route53 zone Id to create cname in")
                    .with_default(""),
            )?)
        } else {
            None
        };

        let zone_id_set = match &zone_id {
            Some(zone_id) => Some(t.add_condition("zoneIdSet", Value::not(Value::equals(zone_id, "")))?),
            None => None,
        };

        let certificate = match (&domain_name, &zone_apex) {
            (Some(domain_name), Some(zone_apex)) => Some(t.add_resource(
                "myCert",
                Resource::new("AWS::CertificateManager::Certificate")
                    .with_property("DomainName", domain_name)
                    .with_property(
                        "DomainValidationOptions",
                        Value::list([Value::object([
                            ("DomainName", domain_name.reference()),
                            ("ValidationDomain", zone_apex.reference()),
                        ])]),
                    ),
            )?),
            _ => None,
        };

        let origin = match &origin_input {
            OriginInput::Managed(origin_access_id) => {
                let bucket = t.add_resource("myBucket", Resource::new("AWS::S3::Bucket"))?;
                if self.bucket_policy {
                    t.add_resource("myBucketPolicy", bucket_policy(&bucket, origin_access_id))?;
                }
                Origin {
                    id: PseudoParameter::StackName.reference(),
                    domain_name: bucket.get_att("DomainName"),
                    s3_config: Value::object([(
                        "OriginAccessIdentity",
                        Value::join(
                            "",
                            [
                                Value::from("origin-access-identity/cloudfront/"),
                                origin_access_id.reference(),
                            ],
                        ),
                    )]),
                }
            }
            OriginInput::Existing(s3_dns_name) => {
                if self.bucket_policy {
                    warn!(
                        event = "Site",
                        phase = "Build",
                        skipped = "myBucketPolicy",
                        reason = "existing bucket origin"
                    );
                }
                Origin {
                    id: Value::from(EXISTING_ORIGIN_ID),
                    domain_name: s3_dns_name.reference(),
                    s3_config: Value::Object(IndexMap::new()),
                }
            }
        };

        let mut distribution = Resource::new("AWS::CloudFront::Distribution").with_property(
            "DistributionConfig",
            self.distribution_config(origin, domain_name.as_ref(), certificate.as_ref()),
        );
        if let Some(certificate) = &certificate {
            distribution = distribution.depends_on(certificate);
        }
        let distribution = t.add_resource("myDistribution", distribution)?;

        if let (Some(domain_name), Some(zone_id), Some(zone_id_set)) =
            (&domain_name, &zone_id, &zone_id_set)
        {
            t.add_resource(
                "aliasDnsRecord",
                Resource::new("AWS::Route53::RecordSet")
                    .with_condition(zone_id_set)
                    .with_property("HostedZoneId", zone_id)
                    .with_property(
                        "Name",
                        Value::join("", [domain_name.reference(), Value::from(".")]),
                    )
                    .with_property("Type", "A")
                    .with_property(
                        "AliasTarget",
                        Value::object([
                            ("HostedZoneId", Value::from(CLOUDFRONT_HOSTED_ZONE_ID)),
                            ("DNSName", distribution.get_att("DomainName")),
                            ("EvaluateTargetHealth", Value::from(false)),
                        ]),
                    ),
            )?;
        }

        t.add_outputs([
            ("DistributionId", Output::new(&distribution)),
            (
                "DistributionName",
                Output::new(Value::join(
                    "",
                    [Value::from("http://"), distribution.get_att("DomainName")],
                )),
            ),
        ])?;

        t.validate()?;
        Ok(t)
    }

    fn distribution_config(
        &self,
        origin: Origin,
        domain_name: Option<&ParameterHandle>,
        certificate: Option<&ResourceHandle>,
    ) -> Value {
        let mut config: IndexMap<String, Value> = IndexMap::new();
        if let Some(domain_name) = domain_name {
            config.insert("Aliases".into(), Value::list([domain_name.reference()]));
        }
        config.insert(
            "Origins".into(),
            Value::list([Value::object([
                ("Id", origin.id.clone()),
                ("DomainName", origin.domain_name),
                ("S3OriginConfig", origin.s3_config),
            ])]),
        );
        config.insert(
            "DefaultCacheBehavior".into(),
            Value::object([
                ("TargetOriginId", origin.id),
                (
                    "ForwardedValues",
                    Value::object([("QueryString", self.config.forward_query_string)]),
                ),
                (
                    "ViewerProtocolPolicy",
                    Value::from(self.config.viewer_protocol_policy.as_ref()),
                ),
            ]),
        );
        config.insert("Enabled".into(), Value::from(true));
        config.insert(
            "HttpVersion".into(),
            Value::from(self.config.http_version.as_str()),
        );
        if let Some(price_class) = &self.config.price_class {
            config.insert("PriceClass".into(), Value::from(price_class.as_str()));
        }
        if let Some(certificate) = certificate {
            config.insert(
                "ViewerCertificate".into(),
                Value::object([
                    ("AcmCertificateArn", certificate.reference()),
                    ("SslSupportMethod", Value::from("sni-only")),
                ]),
            );
        }
        if let Some(root_object) = &self.config.default_root_object {
            config.insert("DefaultRootObject".into(), Value::from(root_object.as_str()));
        }
        Value::Object(config)
    }
}

enum OriginInput {
    Managed(ParameterHandle),
    Existing(ParameterHandle),
}

struct Origin {
    id: Value,
    domain_name: Value,
    s3_config: Value,
}

fn bucket_policy(bucket: &ResourceHandle, origin_access_id: &ParameterHandle) -> Resource {
    let statement = Value::object([
        (
            "Sid",
            Value::from("Grant a CloudFront Origin Identity access to support private content"),
        ),
        ("Effect", Value::from("Allow")),
        (
            "Principal",
            Value::object([(
                "AWS",
                Value::join(" ", [Value::from(OAI_USER_ARN), origin_access_id.reference()]),
            )]),
        ),
        ("Action", Value::from("s3:GetObject")),
        (
            "Resource",
            Value::join(
                "",
                [Value::from("arn:aws:s3:::"), bucket.reference(), Value::from("/*")],
            ),
        ),
    ]);

    Resource::new("AWS::S3::BucketPolicy")
        .with_property("Bucket", bucket)
        .with_property(
            "PolicyDocument",
            Value::object([
                ("Version", Value::from("2012-10-17")),
                ("Id", Value::from("PolicyForCloudFrontPrivateContent")),
                ("Statement", Value::list([statement])),
            ]),
        )
}
