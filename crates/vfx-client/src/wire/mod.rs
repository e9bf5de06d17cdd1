//! # Record Serializer
//!
//! Turns a batch of [`InvoiceEvent`]s into the SOAP document the AEAT
//! VERI*FACTU service accepts (`RegFactuSistemaFacturacion`).
//!
//! ## Document Shape
//!
//! ```text
//! soapenv:Envelope
//! └── soapenv:Body
//!     └── sum:RegFactuSistemaFacturacion
//!         ├── sum:Cabecera            submitter, optional representative
//!         └── sum:RegistroFactura*    one per event, input order
//!             └── sum1:RegistroAlta | sum1:RegistroAnulacion
//! ```
//!
//! ## Guarantees
//!
//! - Pure: the same inputs always yield byte-identical output, and events
//!   are only borrowed.
//! - All-or-nothing: every record is checked before the first byte is
//!   written, so an [`EncodingError`] never leaves a partial document.
//! - Order: record blocks appear in input order.

mod fragments;
mod records;
mod writer;

pub use fragments::{fmt_amount, fmt_date, fmt_timestamp, ChainRequirement, IdNaming, FINGERPRINT_ALGORITHM};
pub use records::{check_record, AltaProfile, SCHEMA_VERSION};

use vfx_core::{EncodingError, FiscalIdentity, InvoiceEvent, InvoiceId, OperationKind, SystemDescriptor};

use self::fragments::write_party;
use self::writer::XmlSink;

/// SOAP 1.1 envelope namespace.
pub const NS_SOAP_ENVELOPE: &str = "http://schemas.xmlsoap.org/soap/envelope/";

/// Namespace of the submission message (`SuministroLR.xsd`).
pub const NS_SUMINISTRO_LR: &str = "https://www2.agenciatributaria.gob.es/static_files/common/internet/dep/aplicaciones/es/aeat/tike/cont/ws/SuministroLR.xsd";

/// Namespace of the record types (`SuministroInformacion.xsd`).
pub const NS_SUMINISTRO_INFORMACION: &str = "https://www2.agenciatributaria.gob.es/static_files/common/internet/dep/aplicaciones/es/aeat/tike/cont/ws/SuministroInformacion.xsd";

/// A serialized submission, ready for transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WireDocument {
    operation: OperationKind,
    invoice_ids: Vec<InvoiceId>,
    xml: String,
}

impl WireDocument {
    /// Operation kind shared by every record in the document.
    pub fn operation(&self) -> OperationKind {
        self.operation
    }

    /// Invoice identities of the records, in document order.
    pub fn invoice_ids(&self) -> &[InvoiceId] {
        &self.invoice_ids
    }

    pub fn record_count(&self) -> usize {
        self.invoice_ids.len()
    }

    pub fn as_str(&self) -> &str {
        &self.xml
    }

    pub fn as_bytes(&self) -> &[u8] {
        self.xml.as_bytes()
    }

    pub fn into_string(self) -> String {
        self.xml
    }
}

/// Check batch-level preconditions and return the shared operation kind.
fn check_batch(events: &[InvoiceEvent]) -> Result<OperationKind, EncodingError> {
    let first = events.first().ok_or(EncodingError::EmptyBatch)?.operation;
    if let Some((index, odd)) = events
        .iter()
        .enumerate()
        .find(|(_, e)| e.operation != first)
    {
        return Err(EncodingError::MixedBatch {
            index,
            expected: first.as_str(),
            found: odd.operation.as_str(),
        });
    }
    for event in events {
        check_record(event)?;
    }
    Ok(first)
}

/// Serialize a batch of events sharing one operation kind.
///
/// # Errors
///
/// [`EncodingError`] if the batch is empty or mixes operation kinds, or if
/// any record misses a mandatory chain link, corrected-invoice reference or
/// correction kind. Nothing is written in that case.
pub fn serialize(
    submitter: &FiscalIdentity,
    representative: Option<&FiscalIdentity>,
    system: &SystemDescriptor,
    events: &[InvoiceEvent],
) -> Result<WireDocument, EncodingError> {
    let operation = check_batch(events)?;

    let mut sink = XmlSink::new();
    sink.declaration()?;
    sink.open_with(
        "soapenv:Envelope",
        &[
            ("xmlns:soapenv", NS_SOAP_ENVELOPE),
            ("xmlns:sum", NS_SUMINISTRO_LR),
            ("xmlns:sum1", NS_SUMINISTRO_INFORMACION),
        ],
    )?;
    sink.empty("soapenv:Header")?;
    sink.element("soapenv:Body", |s| {
        s.element("sum:RegFactuSistemaFacturacion", |s| {
            s.element("sum:Cabecera", |s| {
                write_party(s, "sum1:ObligadoEmision", submitter)?;
                match representative {
                    Some(rep) => write_party(s, "sum1:Representante", rep),
                    None => Ok(()),
                }
            })?;
            for event in events {
                records::write_record(s, event, system)?;
            }
            Ok(())
        })
    })?;
    sink.close("soapenv:Envelope")?;
    let xml = sink.finish()?;

    tracing::debug!(
        operation = %operation,
        records = events.len(),
        bytes = xml.len(),
        "serialized submission"
    );

    Ok(WireDocument {
        operation,
        invoice_ids: events.iter().map(|e| e.invoice_id.clone()).collect(),
        xml,
    })
}
