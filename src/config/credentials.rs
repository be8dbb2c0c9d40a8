use crate::core::CredentialProvider;
use crate::utils::error::{FnError, Result};
use pkcs8::DecodePrivateKey;
use rsa::pkcs1::DecodeRsaPrivateKey;
use rsa::sha2::{Digest, Sha256};
use rsa::{Pkcs1v15Sign, RsaPrivateKey};
use std::fmt;
use std::path::{Path, PathBuf};

pub const TENANT_OCID: &str = "TENANT_OCID";
pub const USER_OCID: &str = "USER_OCID";
pub const PUBLIC_KEY_FINGERPRINT: &str = "PUBLIC_KEY_FINGERPRINT";
pub const PRIVATE_KEY_LOCATION: &str = "PRIVATE_KEY_LOCATION";
pub const PASSPHRASE: &str = "PASSPHRASE";

/// API-key identity as supplied through the environment.
#[derive(Clone)]
pub struct CredentialSettings {
    pub tenancy_id: String,
    pub user_id: String,
    pub fingerprint: String,
    pub private_key_path: PathBuf,
    pub passphrase: Option<String>,
}

impl fmt::Debug for CredentialSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CredentialSettings")
            .field("tenancy_id", &self.tenancy_id)
            .field("user_id", &self.user_id)
            .field("fingerprint", &self.fingerprint)
            .field("private_key_path", &self.private_key_path)
            .field("passphrase", &self.passphrase.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

impl CredentialSettings {
    /// Reads the identity through `lookup`. All missing variables are
    /// reported together; blank values count as missing.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        let tenancy_id = get(TENANT_OCID);
        let user_id = get(USER_OCID);
        let fingerprint = get(PUBLIC_KEY_FINGERPRINT);
        let private_key_path = get(PRIVATE_KEY_LOCATION);

        let missing: Vec<&str> = [
            (TENANT_OCID, tenancy_id.is_none()),
            (USER_OCID, user_id.is_none()),
            (PUBLIC_KEY_FINGERPRINT, fingerprint.is_none()),
            (PRIVATE_KEY_LOCATION, private_key_path.is_none()),
        ]
        .into_iter()
        .filter_map(|(name, is_missing)| is_missing.then_some(name))
        .collect();

        match (tenancy_id, user_id, fingerprint, private_key_path) {
            (Some(tenancy_id), Some(user_id), Some(fingerprint), Some(private_key_path)) => {
                Ok(Self {
                    tenancy_id,
                    user_id,
                    fingerprint,
                    private_key_path: PathBuf::from(private_key_path),
                    passphrase: lookup(PASSPHRASE).filter(|p| !p.is_empty()),
                })
            }
            _ => Err(FnError::usage(format!(
                "Please ensure you have set the mandatory environment variables - {}",
                missing.join(", ")
            ))),
        }
    }
}

/// Signs requests with an RSA API key.
pub struct ApiKeyCredentials {
    tenancy_id: String,
    user_id: String,
    fingerprint: String,
    private_key: RsaPrivateKey,
}

impl fmt::Debug for ApiKeyCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ApiKeyCredentials")
            .field("key_id", &self.key_id())
            .finish_non_exhaustive()
    }
}

impl ApiKeyCredentials {
    pub fn new(
        tenancy_id: String,
        user_id: String,
        fingerprint: String,
        private_key: RsaPrivateKey,
    ) -> Self {
        Self {
            tenancy_id,
            user_id,
            fingerprint,
            private_key,
        }
    }

    pub fn load(settings: &CredentialSettings) -> Result<Self> {
        let private_key =
            load_private_key(&settings.private_key_path, settings.passphrase.as_deref())?;
        tracing::debug!(
            "Loaded API signing key from {}",
            settings.private_key_path.display()
        );

        Ok(Self::new(
            settings.tenancy_id.clone(),
            settings.user_id.clone(),
            settings.fingerprint.clone(),
            private_key,
        ))
    }

    pub fn public_key(&self) -> rsa::RsaPublicKey {
        self.private_key.to_public_key()
    }
}

impl CredentialProvider for ApiKeyCredentials {
    fn tenancy_id(&self) -> &str {
        &self.tenancy_id
    }

    fn key_id(&self) -> String {
        format!("{}/{}/{}", self.tenancy_id, self.user_id, self.fingerprint)
    }

    fn sign(&self, data: &[u8]) -> Result<Vec<u8>> {
        let digest = Sha256::digest(data);
        self.private_key
            .sign(Pkcs1v15Sign::new::<Sha256>(), &digest)
            .map_err(|e| FnError::credential(format!("signing failed: {}", e)))
    }
}

pub fn load_private_key(path: &Path, passphrase: Option<&str>) -> Result<RsaPrivateKey> {
    let pem = std::fs::read_to_string(path).map_err(|e| {
        FnError::credential(format!(
            "cannot read private key {}: {}",
            path.display(),
            e
        ))
    })?;
    parse_private_key(&pem, passphrase)
}

/// Accepts PKCS#8, PKCS#1 and passphrase-protected PKCS#8 PEM.
pub fn parse_private_key(pem: &str, passphrase: Option<&str>) -> Result<RsaPrivateKey> {
    if pem.contains("BEGIN ENCRYPTED PRIVATE KEY") {
        let passphrase = passphrase.ok_or_else(|| {
            FnError::credential(format!(
                "private key is encrypted but {} is not set",
                PASSPHRASE
            ))
        })?;
        return RsaPrivateKey::from_pkcs8_encrypted_pem(pem, passphrase.as_bytes()).map_err(|e| {
            FnError::credential(format!("cannot decrypt private key: {}", e))
        });
    }

    // Legacy OpenSSL encryption headers are not understood by the PKCS#1 parser.
    if pem.contains("Proc-Type: 4,ENCRYPTED") {
        return Err(FnError::credential(
            "legacy encrypted PEM keys are not supported; convert with `openssl pkcs8 -topk8`",
        ));
    }

    RsaPrivateKey::from_pkcs8_pem(pem)
        .or_else(|_| RsaPrivateKey::from_pkcs1_pem(pem))
        .map_err(|e| FnError::credential(format!("invalid RSA private key: {}", e)))
}
