//! VERI*FACTU client configuration.
//!
//! Selects the AEAT environment and loads the client credential used for
//! mutual TLS. Defaults point to the test environment; production must be
//! chosen explicitly.

use std::path::Path;

use url::Url;
use zeroize::Zeroizing;

/// Production endpoint (`www1.agenciatributaria.gob.es`).
pub const PRODUCTION_ENDPOINT: &str =
    "https://www1.agenciatributaria.gob.es/wlpl/TIKE-CONT/ws/SistemaFacturacion/VerifactuSOAP";

/// Test endpoint (`prewww1.aeat.es`).
pub const TEST_ENDPOINT: &str =
    "https://prewww1.aeat.es/wlpl/TIKE-CONT/ws/SistemaFacturacion/VerifactuSOAP";

/// Default request timeout in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// AEAT environment a session submits to. Fixed for the life of a client.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Environment {
    Production,
    #[default]
    Test,
}

impl Environment {
    /// `true` selects production, `false` the test environment.
    pub fn from_production_flag(production: bool) -> Self {
        if production {
            Self::Production
        } else {
            Self::Test
        }
    }

    pub fn endpoint(self) -> &'static str {
        match self {
            Self::Production => PRODUCTION_ENDPOINT,
            Self::Test => TEST_ENDPOINT,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Production => "production",
            Self::Test => "test",
        }
    }
}

impl std::str::FromStr for Environment {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "production" | "prod" => Ok(Self::Production),
            "test" | "pre" => Ok(Self::Test),
            _ => Err(ConfigError::InvalidValue {
                var: "VERIFACTU_ENVIRONMENT",
                value: s.to_string(),
            }),
        }
    }
}

/// On-disk encoding of the client credential.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CredentialFormat {
    /// PKCS#12 archive (`.p12` / `.pfx`), usually passphrase-protected.
    #[default]
    Pkcs12,
    /// PEM bundle holding the certificate chain and an unencrypted key.
    Pem,
}

impl std::str::FromStr for CredentialFormat {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pkcs12" | "p12" | "pfx" => Ok(Self::Pkcs12),
            "pem" => Ok(Self::Pem),
            _ => Err(ConfigError::InvalidValue {
                var: "VERIFACTU_CERT_FORMAT",
                value: s.to_string(),
            }),
        }
    }
}

/// Certificate and key material for mutual TLS.
///
/// The bytes are handed to the TLS stack untouched. Custom `Debug` redacts
/// the material and the passphrase.
#[derive(Clone)]
pub enum Credential {
    Pkcs12 {
        der: Zeroizing<Vec<u8>>,
        passphrase: Zeroizing<String>,
    },
    Pem(Zeroizing<Vec<u8>>),
}

impl std::fmt::Debug for Credential {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Pkcs12 { der, .. } => f
                .debug_struct("Pkcs12")
                .field("der", &format_args!("[{} bytes]", der.len()))
                .field("passphrase", &"[REDACTED]")
                .finish(),
            Self::Pem(pem) => f
                .debug_tuple("Pem")
                .field(&format_args!("[{} bytes]", pem.len()))
                .finish(),
        }
    }
}

impl Credential {
    pub fn pkcs12(der: Vec<u8>, passphrase: impl Into<String>) -> Self {
        Self::Pkcs12 {
            der: Zeroizing::new(der),
            passphrase: Zeroizing::new(passphrase.into()),
        }
    }

    pub fn pem(pem: Vec<u8>) -> Self {
        Self::Pem(Zeroizing::new(pem))
    }

    /// Read credential material from `path`.
    ///
    /// # Errors
    ///
    /// [`ConfigError::UnreadableCredential`] if the file cannot be read or is
    /// empty.
    pub fn load(
        path: &Path,
        format: CredentialFormat,
        passphrase: Option<String>,
    ) -> Result<Self, ConfigError> {
        let bytes = std::fs::read(path).map_err(|e| ConfigError::UnreadableCredential {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;
        if bytes.is_empty() {
            return Err(ConfigError::UnreadableCredential {
                path: path.display().to_string(),
                reason: "file is empty".to_string(),
            });
        }
        Ok(match format {
            CredentialFormat::Pkcs12 => Self::pkcs12(bytes, passphrase.unwrap_or_default()),
            CredentialFormat::Pem => Self::pem(bytes),
        })
    }

    pub fn format(&self) -> CredentialFormat {
        match self {
            Self::Pkcs12 { .. } => CredentialFormat::Pkcs12,
            Self::Pem(_) => CredentialFormat::Pem,
        }
    }
}

/// Configuration for a [`crate::VerifactuClient`] session.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub environment: Environment,
    /// Replaces the environment's endpoint, for staging or mock servers.
    pub endpoint_override: Option<Url>,
    pub credential: Credential,
    /// Request timeout in seconds.
    pub timeout_secs: u64,
}

impl ClientConfig {
    /// Test-environment configuration with the default timeout.
    pub fn new(credential: Credential) -> Self {
        Self {
            environment: Environment::Test,
            endpoint_override: None,
            credential,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }

    /// Load configuration from environment variables.
    ///
    /// Variables:
    /// - `VERIFACTU_ENVIRONMENT` (`production` | `test`, default: `test`)
    /// - `VERIFACTU_CERT_PATH` (required)
    /// - `VERIFACTU_CERT_FORMAT` (`pkcs12` | `pem`, default: `pkcs12`)
    /// - `VERIFACTU_CERT_PASSWORD` (optional)
    /// - `VERIFACTU_TIMEOUT_SECS` (default: 30)
    /// - `VERIFACTU_ENDPOINT` (optional override)
    pub fn from_env() -> Result<Self, ConfigError> {
        let environment = match std::env::var("VERIFACTU_ENVIRONMENT") {
            Ok(raw) => raw.parse()?,
            Err(_) => Environment::default(),
        };
        let format = match std::env::var("VERIFACTU_CERT_FORMAT") {
            Ok(raw) => raw.parse()?,
            Err(_) => CredentialFormat::default(),
        };
        let path = std::env::var("VERIFACTU_CERT_PATH").map_err(|_| ConfigError::MissingCertPath)?;
        let credential = Credential::load(
            Path::new(&path),
            format,
            std::env::var("VERIFACTU_CERT_PASSWORD").ok(),
        )?;

        Ok(Self {
            environment,
            endpoint_override: env_url("VERIFACTU_ENDPOINT")?,
            credential,
            timeout_secs: env_timeout("VERIFACTU_TIMEOUT_SECS")?,
        })
    }

    /// The URL submissions are posted to. The override, when set, wins
    /// over the environment.
    pub fn endpoint(&self) -> &str {
        match &self.endpoint_override {
            Some(url) => url.as_str(),
            None => self.environment.endpoint(),
        }
    }
}

fn parse_url(what: &str, raw: &str) -> Result<Url, ConfigError> {
    Url::parse(raw).map_err(|e| ConfigError::InvalidUrl(what.to_string(), e.to_string()))
}

fn env_url(var: &str) -> Result<Option<Url>, ConfigError> {
    match std::env::var(var) {
        Ok(raw) if !raw.trim().is_empty() => parse_url(var, raw.trim()).map(Some),
        _ => Ok(None),
    }
}

fn env_timeout(var: &'static str) -> Result<u64, ConfigError> {
    match std::env::var(var) {
        Ok(raw) => match raw.trim().parse::<u64>() {
            Ok(secs) if secs > 0 => Ok(secs),
            _ => Err(ConfigError::InvalidValue { var, value: raw }),
        },
        Err(_) => Ok(DEFAULT_TIMEOUT_SECS),
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("VERIFACTU_CERT_PATH environment variable is required")]
    MissingCertPath,
    #[error("invalid URL for {0}: {1}")]
    InvalidUrl(String, String),
    #[error("invalid value {value:?} for {var}")]
    InvalidValue { var: &'static str, value: String },
    #[error("cannot read credential {path}: {reason}")]
    UnreadableCredential { path: String, reason: String },
}
