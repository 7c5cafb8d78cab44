use crate::error::{BblError, Result};
use crate::traits::{SslKeyPair, SslKeyPairGenerator};
use crate::utils::command_exec::{capture_success, require_binary};
use std::fs;
use std::net::IpAddr;
use std::process::Command;
use std::time::Duration;

const OPENSSL_BINARY: &str = "openssl";
const OPENSSL_TIMEOUT: Duration = Duration::from_secs(60);

/// Self-signed director certificate generated with `openssl req -x509`
#[derive(Debug, Clone)]
pub struct OpenSslKeyPairGenerator {
    pub key_bits: u32,
    pub valid_days: u32,
}

impl Default for OpenSslKeyPairGenerator {
    fn default() -> Self {
        Self {
            key_bits: 2048,
            valid_days: 365,
        }
    }
}

impl OpenSslKeyPairGenerator {
    pub(crate) fn request_args(&self, common_name: &str, key: &str, cert: &str) -> Vec<String> {
        vec![
            "req".into(),
            "-x509".into(),
            "-newkey".into(),
            format!("rsa:{}", self.key_bits),
            "-nodes".into(),
            "-days".into(),
            self.valid_days.to_string(),
            "-keyout".into(),
            key.into(),
            "-out".into(),
            cert.into(),
            "-subj".into(),
            format!("/CN={}", common_name),
            "-addext".into(),
            subject_alt_name(common_name),
        ]
    }
}

fn subject_alt_name(common_name: &str) -> String {
    match common_name.parse::<IpAddr>() {
        Ok(_) => format!("subjectAltName=IP:{}", common_name),
        Err(_) => format!("subjectAltName=DNS:{}", common_name),
    }
}

impl SslKeyPairGenerator for OpenSslKeyPairGenerator {
    fn generate(&self, common_name: &str) -> Result<SslKeyPair> {
        if common_name.is_empty() {
            return Err(BblError::Other(
                "cannot generate a certificate without a common name".to_string(),
            ));
        }

        let binary = require_binary(OPENSSL_BINARY)?;
        let scratch = tempfile::tempdir()?;
        let key_path = scratch.path().join("director.key");
        let cert_path = scratch.path().join("director.crt");

        let mut cmd = Command::new(binary);
        cmd.args(self.request_args(
            common_name,
            &key_path.to_string_lossy(),
            &cert_path.to_string_lossy(),
        ));
        capture_success(&mut cmd, "openssl req", OPENSSL_TIMEOUT)?;

        Ok(SslKeyPair {
            certificate: fs::read_to_string(&cert_path)?,
            private_key: fs::read_to_string(&key_path)?,
        })
    }
}
