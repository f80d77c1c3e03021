//! Certificate material generation.
//!
//! Delegates to the system OpenSSL tooling: a 2048-bit RSA key, then a
//! SHA-256 self-signed certificate built from the rendered request
//! configuration, valid for 365 days. Either invocation failing aborts
//! provisioning; nothing later may trust half-generated material.

use std::path::PathBuf;

use chrono::{DateTime, Duration, Utc};

use crate::error::{VaultupError, VaultupResult};
use crate::exec::CommandRunner;

pub const KEY_BITS: u32 = 2048;
pub const VALIDITY_DAYS: i64 = 365;

/// Paths and validity window of freshly generated material
#[derive(Debug, Clone)]
pub struct GeneratedCert {
    pub key_path: PathBuf,
    pub cert_path: PathBuf,
    pub not_after: DateTime<Utc>,
}

/// Generates the private key and self-signed certificate
pub struct CertGenerator<'a, R: CommandRunner> {
    runner: &'a R,
    config_path: PathBuf,
    key_path: PathBuf,
    cert_path: PathBuf,
}

impl<'a, R: CommandRunner> CertGenerator<'a, R> {
    pub fn new(runner: &'a R, config_path: PathBuf, key_path: PathBuf, cert_path: PathBuf) -> Self {
        Self {
            runner,
            config_path,
            key_path,
            cert_path,
        }
    }

    /// Generate key and certificate, in that order
    pub fn generate(&self) -> VaultupResult<GeneratedCert> {
        let key = self.key_path.to_string_lossy().into_owned();
        let cert = self.cert_path.to_string_lossy().into_owned();
        let config = self.config_path.to_string_lossy().into_owned();
        let bits = KEY_BITS.to_string();
        let days = VALIDITY_DAYS.to_string();

        self.runner
            .run_checked("openssl", &["genrsa", "-out", &key, &bits])
            .map_err(|e| VaultupError::CertGeneration {
                stage: "key generation".to_string(),
                detail: e.to_string(),
            })?;

        self.runner
            .run_checked(
                "openssl",
                &[
                    "req", "-new", "-x509", "-sha256", "-days", &days, "-key", &key, "-out",
                    &cert, "-config", &config,
                ],
            )
            .map_err(|e| VaultupError::CertGeneration {
                stage: "certificate generation".to_string(),
                detail: e.to_string(),
            })?;

        Ok(GeneratedCert {
            key_path: self.key_path.clone(),
            cert_path: self.cert_path.clone(),
            not_after: Utc::now() + Duration::days(VALIDITY_DAYS),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::exec::testing::ScriptedRunner;

    fn generator(runner: &ScriptedRunner) -> CertGenerator<'_, ScriptedRunner> {
        CertGenerator::new(
            runner,
            PathBuf::from("vault-cert.cnf"),
            PathBuf::from("certs/vault.key"),
            PathBuf::from("certs/vault.crt"),
        )
    }

    #[test]
    fn generate_invokes_keygen_then_req() {
        let runner = ScriptedRunner::new();
        generator(&runner).generate().unwrap();

        let calls = runner.calls_for("openssl");
        assert_eq!(calls.len(), 2);
        assert_eq!(
            calls[0],
            ["openssl", "genrsa", "-out", "certs/vault.key", "2048"]
        );
        assert!(calls[1].windows(2).any(|w| w == ["-days", "365"]));
        assert!(calls[1].contains(&"-sha256".to_string()));
        assert!(calls[1]
            .windows(2)
            .any(|w| w == ["-config", "vault-cert.cnf"]));
    }

    #[test]
    fn key_failure_aborts_before_certificate() {
        let runner = ScriptedRunner::failing(&["openssl"]);
        let err = generator(&runner).generate().unwrap_err();

        assert!(matches!(err, VaultupError::CertGeneration { ref stage, .. } if stage == "key generation"));
        assert_eq!(runner.count("openssl"), 1);
    }

    #[test]
    fn validity_window_is_one_year_out() {
        let runner = ScriptedRunner::new();
        let generated = generator(&runner).generate().unwrap();
        let days = (generated.not_after - Utc::now()).num_days();
        assert!((364..=365).contains(&days));
    }
}
