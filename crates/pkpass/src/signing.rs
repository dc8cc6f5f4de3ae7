//! Certificates and secrets needed to sign a pass.

use std::fmt;

use openssl::pkcs7::{Pkcs7, Pkcs7Flags};
use openssl::pkey::{PKey, Private};
use openssl::stack::Stack;
use openssl::x509::X509;

use crate::config::{CertificateConfig, PemSource};
use crate::error::PassError;

/// Parsed signing material. Constructing one is the only place missing or
/// malformed certificates are reported, so a builder holding a context can
/// always sign.
pub struct SigningContext {
    wwdr: X509,
    signer_cert: X509,
    signer_key: PKey<Private>,
    auth_token: String,
}

impl SigningContext {
    pub fn from_pem(
        wwdr: &[u8],
        signer_cert: &[u8],
        signer_key: &[u8],
        passphrase: Option<&str>,
        auth_token: String,
    ) -> Result<Self, PassError> {
        if auth_token.trim().is_empty() {
            return Err(PassError::MissingAuthToken);
        }

        let invalid = |what| move |source| PassError::InvalidCertificate { what, source };

        let signer_key = match passphrase {
            Some(passphrase) => PKey::private_key_from_pem_passphrase(signer_key, passphrase.as_bytes()),
            None => PKey::private_key_from_pem(signer_key),
        }
        .map_err(invalid("signer key"))?;

        Ok(Self {
            wwdr: X509::from_pem(wwdr).map_err(invalid("WWDR certificate"))?,
            signer_cert: X509::from_pem(signer_cert).map_err(invalid("signer certificate"))?,
            signer_key,
            auth_token,
        })
    }

    pub fn from_config(config: &CertificateConfig) -> Result<Self, PassError> {
        let wwdr = read_pem(config.wwdr.as_ref(), "WWDR certificate")?;
        let signer_cert = read_pem(config.signer_cert.as_ref(), "signer certificate")?;
        let signer_key = read_pem(config.signer_key.as_ref(), "signer key")?;
        let auth_token = config
            .auth_token
            .clone()
            .ok_or(PassError::MissingAuthToken)?;

        Self::from_pem(
            &wwdr,
            &signer_cert,
            &signer_key,
            config.signer_key_passphrase.as_deref(),
            auth_token,
        )
    }

    #[must_use]
    pub fn auth_token(&self) -> &str {
        &self.auth_token
    }

    /// Detached PKCS#7 signature over `manifest`, with the WWDR certificate
    /// in the chain.
    pub fn sign(&self, manifest: &[u8]) -> Result<Vec<u8>, PassError> {
        let mut chain = Stack::new()?;
        chain.push(self.wwdr.clone())?;

        let signature = Pkcs7::sign(
            &self.signer_cert,
            &self.signer_key,
            &chain,
            manifest,
            Pkcs7Flags::BINARY | Pkcs7Flags::DETACHED,
        )?;

        Ok(signature.to_der()?)
    }
}

fn read_pem(source: Option<&PemSource>, what: &'static str) -> Result<Vec<u8>, PassError> {
    match source {
        None => Err(PassError::MissingCertificate(what)),
        Some(PemSource::Inline(pem)) if pem.trim().is_empty() => {
            Err(PassError::MissingCertificate(what))
        }
        Some(PemSource::Inline(pem)) => Ok(pem.as_bytes().to_vec()),
        Some(PemSource::Path(path)) => {
            std::fs::read(path).map_err(|source| PassError::ReadCertificate {
                what,
                path: path.clone(),
                source,
            })
        }
    }
}

impl fmt::Debug for SigningContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SigningContext")
            .field("signer", &self.signer_cert.subject_name())
            .finish_non_exhaustive()
    }
}
