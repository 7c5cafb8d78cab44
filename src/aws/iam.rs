use super::cli::{AwsCli, error_code};
use crate::error::{BblError, Result};
use crate::traits::{Certificate, CertificateDescriber};
use serde::Deserialize;
use serde_json::Value;
use std::sync::Arc;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct GetServerCertificateOutput {
    server_certificate: Option<ServerCertificate>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct ServerCertificate {
    #[serde(default)]
    certificate_body: String,
    server_certificate_metadata: Option<ServerCertificateMetadata>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct ServerCertificateMetadata {
    #[serde(default)]
    server_certificate_name: String,
    #[serde(default)]
    arn: String,
}

/// Looks up uploaded server certificates by name
///
/// No command builds this yet: load balancers are out of scope, so it stands
/// as the production side of the [`CertificateDescriber`] contract.
pub struct IamCertificateDescriber {
    cli: Arc<AwsCli>,
}

impl IamCertificateDescriber {
    pub fn new(cli: Arc<AwsCli>) -> Self {
        Self { cli }
    }
}

impl CertificateDescriber for IamCertificateDescriber {
    fn describe(&self, certificate_name: &str) -> Result<Certificate> {
        let response = self
            .cli
            .call(
                "iam",
                "get-server-certificate",
                &["--server-certificate-name", certificate_name],
            )
            .map_err(|err| {
                if error_code(&err) == Some("NoSuchEntity") {
                    BblError::CertificateNotFound
                } else {
                    err
                }
            })?;
        parse_certificate(response)
    }
}

pub(crate) fn parse_certificate(response: Value) -> Result<Certificate> {
    let output: GetServerCertificateOutput = serde_json::from_value(response)
        .map_err(|_| BblError::CertificateDescriptionFailure)?;

    let certificate = output
        .server_certificate
        .ok_or(BblError::CertificateDescriptionFailure)?;
    let metadata = certificate
        .server_certificate_metadata
        .ok_or(BblError::CertificateDescriptionFailure)?;

    Ok(Certificate {
        name: metadata.server_certificate_name,
        body: certificate.certificate_body,
        arn: metadata.arn,
    })
}
