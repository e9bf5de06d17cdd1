//! # vfx-client -- VERI*FACTU submission client
//!
//! Takes an ordered batch of [`vfx_core::InvoiceEvent`]s and delivers it to
//! the AEAT VERI*FACTU service:
//!
//! - **Serialize** via [`wire::serialize`] into the `RegFactuSistemaFacturacion`
//!   SOAP document.
//! - **Send** via a [`SubmissionTransport`] ([`HttpTransport`] in
//!   production) over mutually authenticated TLS.
//! - **Interpret** via [`response::interpret`] into ordered per-record
//!   outcomes.
//!
//! [`VerifactuClient`] strings the three together and checks that the
//! outcomes line up one-to-one with the submitted records.
//!
//! ## Failure Classes
//!
//! | Error | Raised | Meaning |
//! |-------|--------|---------|
//! | [`EncodingError`] | before any network access | caller input violates a record precondition |
//! | [`TransportError`] | during the exchange | TLS, timeout or non-2xx reply |
//! | [`ProtocolViolation`] | after the exchange | reply does not fit the response schema |
//!
//! A rejected record is not an error. It is a [`RecordOutcome`] with
//! [`RecordStatus::Rejected`].
//!
//! Nothing is retried automatically.

pub mod config;
pub mod error;
pub mod response;
pub mod transport;
pub mod wire;

#[cfg(test)]
pub(crate) mod fixtures;

pub use config::{ClientConfig, Credential, CredentialFormat, Environment};
pub use error::{ClientError, EncodingError, ProtocolViolation, TransportError};
pub use response::{
    EchoedOperation, RecordOutcome, RecordStatus, SubmissionResponse, SubmissionStatus,
};
pub use transport::{HttpTransport, Submission, SubmissionTransport};
pub use wire::WireDocument;

use serde::{Deserialize, Serialize};
use vfx_core::{FiscalIdentity, InvoiceEvent, SystemDescriptor};

/// Identity of whoever submits, fixed for the life of a client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    /// Taxpayer obliged to issue the records (`ObligadoEmision`).
    pub submitter: FiscalIdentity,
    /// Third party submitting on the taxpayer's behalf (`Representante`).
    #[serde(default)]
    pub representative: Option<FiscalIdentity>,
    pub system: SystemDescriptor,
}

/// A submission together with its interpreted response.
#[derive(Debug, Clone)]
pub struct SubmissionReport {
    pub submission: Submission,
    pub response: SubmissionResponse,
}

impl SubmissionReport {
    /// The document exactly as it was sent.
    pub fn sent_document(&self) -> &WireDocument {
        &self.submission.document
    }

    pub fn outcomes(&self) -> &[RecordOutcome] {
        &self.response.outcomes
    }

    pub fn all_accepted(&self) -> bool {
        self.response.all_accepted()
    }
}

/// VERI*FACTU client for one submitter and one environment.
///
/// Holds no mutable state, so one client serves any number of sequential
/// submissions.
#[derive(Debug, Clone)]
pub struct VerifactuClient<T = HttpTransport> {
    transport: T,
    session: Session,
}

impl VerifactuClient<HttpTransport> {
    /// Create a client posting to the endpoint selected by `config`.
    ///
    /// # Errors
    ///
    /// [`ClientError::Transport`] if the credential is not usable.
    pub fn new(config: &ClientConfig, session: Session) -> Result<Self, ClientError> {
        Ok(Self::with_transport(HttpTransport::new(config)?, session))
    }
}

impl<T: SubmissionTransport> VerifactuClient<T> {
    pub fn with_transport(transport: T, session: Session) -> Self {
        Self { transport, session }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Serialize `events` without sending them.
    pub fn serialize(&self, events: &[InvoiceEvent]) -> Result<WireDocument, EncodingError> {
        wire::serialize(
            &self.session.submitter,
            self.session.representative.as_ref(),
            &self.session.system,
            events,
        )
    }

    /// Serialize and send `events`, returning the raw exchange.
    ///
    /// An [`EncodingError`] is raised before the transport is touched.
    pub async fn send(&self, events: &[InvoiceEvent]) -> Result<Submission, ClientError> {
        let document = self.serialize(events)?;
        Ok(self.transport.submit(document).await?)
    }

    /// Interpret a raw exchange and check its outcomes against the records
    /// that were sent.
    pub fn interpret(&self, submission: &Submission) -> Result<SubmissionResponse, ProtocolViolation> {
        let interpreted = response::interpret(&submission.body)?;
        response::reconcile(submission.document.invoice_ids(), &interpreted.outcomes)?;
        Ok(interpreted)
    }

    /// Interpret a raw exchange into a report and log its outcome.
    ///
    /// Callers that archive the raw reply before interpreting it call
    /// [`send`](Self::send) and then this; [`submit`](Self::submit) does
    /// both.
    pub fn report(&self, submission: Submission) -> Result<SubmissionReport, ProtocolViolation> {
        let response = self.interpret(&submission)?;

        let rejected = response.rejected().count();
        tracing::info!(
            endpoint = self.transport.endpoint(),
            operation = %submission.document.operation(),
            records = response.outcomes.len(),
            rejected,
            csv = response.csv.as_deref().unwrap_or("-"),
            "verifactu submission completed"
        );
        for outcome in response.rejected() {
            tracing::warn!(
                invoice = %outcome.invoice_id,
                code = outcome.error_code.as_deref().unwrap_or("-"),
                description = outcome.error_description.as_deref().unwrap_or("-"),
                "record rejected"
            );
        }

        Ok(SubmissionReport {
            submission,
            response,
        })
    }

    /// Serialize, send and interpret `events`.
    pub async fn submit(&self, events: &[InvoiceEvent]) -> Result<SubmissionReport, ClientError> {
        let submission = self.send(events).await?;
        Ok(self.report(submission)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct CannedTransport {
        calls: AtomicUsize,
        reply: String,
    }

    impl SubmissionTransport for CannedTransport {
        async fn submit(&self, document: WireDocument) -> Result<Submission, TransportError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(Submission {
                document,
                status: 200,
                body: self.reply.clone().into_bytes(),
            })
        }

        fn endpoint(&self) -> &str {
            "canned"
        }
    }

    fn session() -> Session {
        Session {
            submitter: fixtures::submitter(),
            representative: None,
            system: fixtures::system(),
        }
    }

    fn reply_for(numbers: &[&str]) -> String {
        let lines: String = numbers
            .iter()
            .map(|n| {
                format!(
                    "<RespuestaLinea><IDFactura><IDEmisorFactura>B12345678</IDEmisorFactura>\
                     <NumSerieFactura>{n}</NumSerieFactura>\
                     <FechaExpedicionFactura>01-02-2025</FechaExpedicionFactura></IDFactura>\
                     <Operacion><TipoOperacion>Alta</TipoOperacion></Operacion>\
                     <EstadoRegistro>Correcto</EstadoRegistro></RespuestaLinea>"
                )
            })
            .collect();
        format!(
            "<Envelope><Body><RespuestaRegFactuSistemaFacturacion>\
             <EstadoEnvio>Correcto</EstadoEnvio>{lines}\
             </RespuestaRegFactuSistemaFacturacion></Body></Envelope>"
        )
    }

    fn client(reply: String) -> VerifactuClient<CannedTransport> {
        VerifactuClient::with_transport(
            CannedTransport {
                calls: AtomicUsize::new(0),
                reply,
            },
            session(),
        )
    }

    #[tokio::test]
    async fn submit_returns_sent_document_and_outcomes() {
        let client = client(reply_for(&["2025-A-0001"]));
        let events = [fixtures::first_registration()];
        let report = client.submit(&events).await.unwrap();
        assert_eq!(report.sent_document(), &client.serialize(&events).unwrap());
        assert_eq!(report.outcomes().len(), 1);
        assert!(report.all_accepted());
        assert_eq!(client.transport().calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn encoding_error_never_reaches_transport() {
        let client = client(reply_for(&[]));
        let mut event = fixtures::cancellation();
        event.chain_link = None;
        let err = client.submit(&[event]).await.unwrap_err();
        assert!(err.is_encoding());
        assert_eq!(client.transport().calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn outcome_count_mismatch_is_protocol_violation() {
        let client = client(reply_for(&["2025-A-0001"]));
        let mut second = fixtures::first_registration();
        second.invoice_id.invoice_number = "2025-A-0002".into();
        let err = client
            .submit(&[fixtures::first_registration(), second])
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            ClientError::Protocol(ProtocolViolation::OutcomeCountMismatch { expected: 2, actual: 1 })
        ));
    }

    #[tokio::test]
    async fn report_of_sent_exchange_matches_submit() {
        let client = client(reply_for(&["2025-A-0001"]));
        let events = [fixtures::first_registration()];
        let submission = client.send(&events).await.unwrap();
        let body = submission.body.clone();
        let report = client.report(submission).unwrap();
        assert_eq!(report.submission.body, body);
        assert!(report.all_accepted());

        let submitted = client.submit(&events).await.unwrap();
        assert_eq!(submitted.response, report.response);
    }

    #[test]
    fn session_deserializes_through_validating_constructors() {
        let json = r#"{
            "submitter": {"name": "Comercial Ejemplo SL", "tax_id": "B1"},
            "system": {
                "vendor_name": "v", "vendor_tax_id": "A11223344", "system_name": "s",
                "system_id": "CR", "version": "1", "installation_number": "1",
                "verifactu_only": true, "supports_multiple_taxpayers": false,
                "has_multiple_taxpayers": false
            }
        }"#;
        assert!(serde_json::from_str::<Session>(json).is_err());
    }
}
