//! # Submission Transport
//!
//! Posts a serialized document to the AEAT endpoint over mutually
//! authenticated TLS and returns the raw reply.
//!
//! One call carries the whole batch. There is no chunking and no retry:
//! a failed exchange is reported once as a [`TransportError`] and the
//! caller decides what to do next.

use std::future::Future;
use std::time::Duration;

use crate::config::{ClientConfig, Credential};
use crate::error::TransportError;
use crate::wire::WireDocument;

/// `Content-Type` of every submission.
pub const SOAP_CONTENT_TYPE: &str = "text/xml; charset=utf-8";

/// A completed exchange: the document that was sent and what came back.
///
/// The sent document is kept here rather than on the client, so callers can
/// archive exactly what went over the wire.
#[derive(Debug, Clone)]
pub struct Submission {
    pub document: WireDocument,
    /// HTTP status of the reply.
    pub status: u16,
    /// Raw reply body.
    pub body: Vec<u8>,
}

/// Sends one document and returns the reply.
///
/// Implementations must be `Send + Sync` so a client can be shared behind
/// an `Arc`.
pub trait SubmissionTransport: Send + Sync {
    fn submit(
        &self,
        document: WireDocument,
    ) -> impl Future<Output = Result<Submission, TransportError>> + Send;

    /// URL the transport posts to, for logs.
    fn endpoint(&self) -> &str;
}

/// `reqwest`-backed transport with a client certificate.
///
/// The only way to build one is from a [`ClientConfig`], so every transport
/// carries the credential it was configured with.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
    endpoint: String,
}

impl HttpTransport {
    /// Build a transport from `config`.
    ///
    /// # Errors
    ///
    /// [`TransportError::Credential`] if the credential cannot be turned
    /// into a TLS identity.
    /// [`TransportError::Http`] if the HTTP client cannot be built.
    pub fn new(config: &ClientConfig) -> Result<Self, TransportError> {
        let endpoint = config.endpoint().to_owned();
        let builder = reqwest::Client::builder().timeout(Duration::from_secs(config.timeout_secs));

        // PKCS#12 archives need the native TLS stack; PEM bundles go through rustls.
        let builder = match &config.credential {
            Credential::Pkcs12 { der, passphrase } => {
                let identity = reqwest::Identity::from_pkcs12_der(der, passphrase).map_err(|e| {
                    TransportError::Credential {
                        reason: format!("PKCS#12 archive: {e}"),
                    }
                })?;
                builder.use_native_tls().identity(identity)
            }
            Credential::Pem(pem) => {
                let identity = reqwest::Identity::from_pem(pem).map_err(|e| TransportError::Credential {
                    reason: format!("PEM bundle: {e}"),
                })?;
                builder.use_rustls_tls().identity(identity)
            }
        };

        let client = builder.build().map_err(|e| TransportError::Http {
            endpoint: "client_init".into(),
            source: e,
        })?;

        tracing::debug!(
            environment = config.environment.as_str(),
            endpoint = %endpoint,
            timeout_secs = config.timeout_secs,
            "verifactu transport ready"
        );
        Ok(Self { client, endpoint })
    }
}

impl SubmissionTransport for HttpTransport {
    async fn submit(&self, document: WireDocument) -> Result<Submission, TransportError> {
        let endpoint = self.endpoint.as_str();
        tracing::debug!(
            endpoint,
            operation = %document.operation(),
            records = document.record_count(),
            "posting submission"
        );

        let resp = self
            .client
            .post(endpoint)
            .header(reqwest::header::CONTENT_TYPE, SOAP_CONTENT_TYPE)
            .body(document.as_str().to_owned())
            .send()
            .await
            .map_err(|e| TransportError::Http {
                endpoint: endpoint.into(),
                source: e,
            })?;

        let status = resp.status().as_u16();
        if !resp.status().is_success() {
            let body = resp
                .text()
                .await
                .unwrap_or_else(|e| format!("<failed to read response body: {e}>"));
            return Err(TransportError::Status {
                endpoint: endpoint.into(),
                status,
                body,
            });
        }

        let body = resp.bytes().await.map_err(|e| TransportError::Body {
            endpoint: endpoint.into(),
            source: e,
        })?;

        Ok(Submission {
            document,
            status,
            body: body.to_vec(),
        })
    }

    fn endpoint(&self) -> &str {
        &self.endpoint
    }
}
