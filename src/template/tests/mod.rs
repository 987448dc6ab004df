use std::sync::{Arc, OnceLock};

use super::*;
use crate::catalog::{StaticCatalog, static_site_catalog};
use crate::render::RenderOptions;
use crate::types::{DeletionPolicy, ParameterType, PseudoParameter};
use serde_json::{Value as JsonValue, json};
use yare::parameterized;

mod logging;
mod validation;

#[derive(Clone)]
struct SharedLogBuffer(Arc<std::sync::Mutex<Vec<u8>>>);

struct SharedLogWriter(Arc<std::sync::Mutex<Vec<u8>>>);

impl<'a> tracing_subscriber::fmt::MakeWriter<'a> for SharedLogBuffer {
    type Writer = SharedLogWriter;

    fn make_writer(&'a self) -> Self::Writer {
        SharedLogWriter(Arc::clone(&self.0))
    }
}

impl std::io::Write for SharedLogWriter {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

/// The process-wide subscriber writing into a shared buffer. Installed once
/// per test binary.
fn log_sink() -> SharedLogBuffer {
    static LOG_SINK: OnceLock<SharedLogBuffer> = OnceLock::new();
    LOG_SINK
        .get_or_init(|| {
            let sink = SharedLogBuffer(Arc::new(std::sync::Mutex::new(Vec::new())));
            let subscriber = tracing_subscriber::fmt()
                .with_ansi(false)
                .without_time()
                .with_target(false)
                .with_max_level(tracing::Level::DEBUG)
                .with_writer(sink.clone())
                .finish();
            tracing::subscriber::set_global_default(subscriber)
                .expect("global test subscriber should initialize");
            tracing::callsite::rebuild_interest_cache();
            sink
        })
        .clone()
}

fn captured_logs(sink: &SharedLogBuffer) -> String {
    String::from_utf8(sink.0.lock().unwrap().clone()).unwrap()
}

fn bucket() -> Resource {
    Resource::new("AWS::S3::Bucket")
}

fn rendered_json(template: &Template) -> JsonValue {
    template
        .render()
        .expect("template should render")
        .into_value()
}

/// The certificate, bucket policy and DNS alias site, assembled by hand.
fn full_site_template() -> Template {
    let mut t = Template::new()
        .with_description("Serving static content from an S3 bucket with CloudFront");

    let domain_name = t
        .add_parameter(
            "domainName",
            Parameter::string().with_description("Domain name for your site"),
        )
        .unwrap();
    let zone_apex = t
        .add_parameter(
            "zoneApex",
            Parameter::string().with_description("Root domain name www.[example.com]"),
        )
        .unwrap();
    let origin_access_id = t
        .add_parameter(
            "originAccessIdentity",
            Parameter::string().with_description("Origin Access Identity ID"),
        )
        .unwrap();
    let zone_id = t
        .add_parameter(
            "zoneId",
            Parameter::string()
                .with_description("Route53 zone Id to create cname in")
                .with_default(""),
        )
        .unwrap();

    let zone_id_set = t
        .add_condition("zoneIdSet", Value::not(Value::equals(&zone_id, "")))
        .unwrap();

    let certificate = t
        .add_resource(
            "myCert",
            Resource::new("AWS::CertificateManager::Certificate")
                .with_property("DomainName", &domain_name)
                .with_property(
                    "DomainValidationOptions",
                    Value::list([Value::object([
                        ("DomainName", domain_name.reference()),
                        ("ValidationDomain", zone_apex.reference()),
                    ])]),
                ),
        )
        .unwrap();
    let bucket = t.add_resource("myBucket", bucket()).unwrap();
    t.add_resource(
        "myBucketPolicy",
        Resource::new("AWS::S3::BucketPolicy")
            .with_property("Bucket", &bucket)
            .with_property(
                "PolicyDocument",
                Value::object([
                    ("Version", Value::from("2012-10-17")),
                    ("Id", Value::from("PolicyForCloudFrontPrivateContent")),
                    (
                        "Statement",
                        Value::list([Value::object([
                            ("Effect", Value::from("Allow")),
                            (
                                "Principal",
                                Value::object([("CanonicalUser", origin_access_id.reference())]),
                            ),
                            ("Action", Value::from("s3:GetObject")),
                            (
                                "Resource",
                                Value::join(
                                    "",
                                    [Value::from("arn:aws:s3:::"), bucket.reference(), Value::from("/*")],
                                ),
                            ),
                        ])]),
                    ),
                ]),
            ),
    )
    .unwrap();

    let distribution = t
        .add_resource(
            "myDistribution",
            Resource::new("AWS::CloudFront::Distribution")
                .depends_on(&certificate)
                .with_property(
                    "DistributionConfig",
                    Value::object([
                        ("Aliases", Value::list([domain_name.reference()])),
                        ("Enabled", Value::from(true)),
                        (
                            "Origins",
                            Value::list([Value::object([
                                ("Id", PseudoParameter::StackName.reference()),
                                ("DomainName", bucket.get_att("DomainName")),
                            ])]),
                        ),
                        (
                            "ViewerCertificate",
                            Value::object([
                                ("AcmCertificateArn", certificate.reference()),
                                ("SslSupportMethod", Value::from("sni-only")),
                            ]),
                        ),
                    ]),
                ),
        )
        .unwrap();

    t.add_resource(
        "aliasDnsRecord",
        Resource::new("AWS::Route53::RecordSet")
            .with_condition(&zone_id_set)
            .with_property("HostedZoneId", &zone_id)
            .with_property(
                "Name",
                Value::join("", [domain_name.reference(), Value::from(".")]),
            )
            .with_property("Type", "A")
            .with_property(
                "AliasTarget",
                Value::object([("DNSName", distribution.get_att("DomainName"))]),
            ),
    )
    .unwrap();

    t.add_outputs([
        ("DistributionId", Output::new(&distribution)),
        (
            "DistributionName",
            Output::new(Value::join(
                "",
                [Value::from("http://"), distribution.get_att("DomainName")],
            )),
        ),
    ])
    .unwrap();

    t
}

include!("core.rs");
