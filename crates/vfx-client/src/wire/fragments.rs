//! # Shared Record Fragments
//!
//! Small writers for the blocks that recur across the three record
//! templates: party identities, invoice identities, recipients, breakdown,
//! chain, system descriptor and fingerprint. Each one is keyed by explicit
//! flags instead of by operation kind, so the templates in `records.rs`
//! differ only in which flags they pass.

use chrono::{DateTime, FixedOffset, NaiveDate, SecondsFormat};
use rust_decimal::Decimal;
use vfx_core::{
    BreakdownLine, ChainLink, EncodingError, FiscalIdentity, InvoiceEvent, InvoiceId,
    LineTreatment, Recipient, SystemDescriptor,
};

use super::writer::XmlSink;

/// Fingerprint algorithm code (`TipoHuella`): SHA-256.
pub const FINGERPRINT_ALGORITHM: &str = "01";

// -- Formatting ----------------------------------------------------------------

/// Dates travel as `DD-MM-YYYY`.
pub fn fmt_date(date: NaiveDate) -> String {
    date.format("%d-%m-%Y").to_string()
}

/// Timestamps travel as RFC 3339 with an explicit offset and whole seconds.
///
/// Sub-second digits are not written. Records are checked for them before
/// writing, so a fingerprint computed over the same timestamp text matches.
pub fn fmt_timestamp(ts: &DateTime<FixedOffset>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Secs, false)
}

/// Amounts keep the scale they were given with.
pub fn fmt_amount(amount: Decimal) -> String {
    amount.to_string()
}

fn yes_no(flag: bool) -> &'static str {
    if flag {
        "S"
    } else {
        "N"
    }
}

// -- Chain requirement -----------------------------------------------------------

/// Whether a record may be written without a chain link.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChainRequirement {
    /// The record must link to its predecessor.
    Mandatory,
    /// A missing link marks the issuer's first record.
    OptionalIfFirst,
}

impl ChainRequirement {
    /// Resolve the link of `event` under this requirement.
    ///
    /// # Errors
    ///
    /// [`EncodingError::MissingChainLink`] when the link is mandatory and
    /// absent.
    pub fn resolve<'a>(self, event: &'a InvoiceEvent) -> Result<Option<&'a ChainLink>, EncodingError> {
        match (self, event.chain_link.as_ref()) {
            (Self::Mandatory, None) => Err(EncodingError::MissingChainLink {
                operation: event.operation.as_str(),
                invoice: event.invoice_id.invoice_number.clone(),
            }),
            (_, link) => Ok(link),
        }
    }
}

// -- Identities ------------------------------------------------------------------

/// `<tag><NombreRazon/><NIF/></tag>`
pub(crate) fn write_party(sink: &mut XmlSink, tag: &str, party: &FiscalIdentity) -> Result<(), EncodingError> {
    sink.element(tag, |s| {
        s.leaf("sum1:NombreRazon", party.name())?;
        s.leaf("sum1:NIF", party.tax_id())
    })
}

/// Field names used for an invoice identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdNaming {
    /// `IDEmisorFactura`, `NumSerieFactura`, `FechaExpedicionFactura`.
    Issued,
    /// `IDEmisorFacturaAnulada`, `NumSerieFacturaAnulada`,
    /// `FechaExpedicionFacturaAnulada`.
    Annulled,
}

/// Write the three identity fields of `id` inside `tag`.
pub(crate) fn write_invoice_id(
    sink: &mut XmlSink,
    tag: &str,
    id: &InvoiceId,
    naming: IdNaming,
) -> Result<(), EncodingError> {
    let (issuer, number, date) = match naming {
        IdNaming::Issued => (
            "sum1:IDEmisorFactura",
            "sum1:NumSerieFactura",
            "sum1:FechaExpedicionFactura",
        ),
        IdNaming::Annulled => (
            "sum1:IDEmisorFacturaAnulada",
            "sum1:NumSerieFacturaAnulada",
            "sum1:FechaExpedicionFacturaAnulada",
        ),
    };
    sink.element(tag, |s| {
        s.leaf(issuer, &id.issuer_id)?;
        s.leaf(number, &id.invoice_number)?;
        s.leaf(date, &fmt_date(id.issue_date))
    })
}

/// Recipient block, only for invoice types that carry one and only when a
/// recipient is present.
pub(crate) fn write_recipient(sink: &mut XmlSink, event: &InvoiceEvent) -> Result<(), EncodingError> {
    let recipient = match &event.recipient {
        Some(r) if event.invoice_type.admits_recipient() => r,
        _ => return Ok(()),
    };
    sink.element("sum1:Destinatarios", |s| {
        s.element("sum1:IDDestinatario", |s| {
            s.leaf("sum1:NombreRazon", recipient.name())?;
            match recipient {
                Recipient::Domestic(id) => s.leaf("sum1:NIF", id.tax_id()),
                Recipient::Foreign(id) => s.element("sum1:IDOtro", |s| {
                    s.leaf("sum1:CodigoPais", id.country())?;
                    s.leaf("sum1:IDType", id.id_type().code())?;
                    s.leaf("sum1:ID", id.id_value())
                }),
            }
        })
    })
}

// -- Amounts -------------------------------------------------------------------

/// One `DetalleDesglose` per line, exempt or taxable field set.
pub(crate) fn write_breakdown(sink: &mut XmlSink, lines: &[BreakdownLine]) -> Result<(), EncodingError> {
    sink.element("sum1:Desglose", |s| {
        for line in lines {
            write_breakdown_line(s, line)?;
        }
        Ok(())
    })
}

fn write_breakdown_line(sink: &mut XmlSink, line: &BreakdownLine) -> Result<(), EncodingError> {
    sink.element("sum1:DetalleDesglose", |s| {
        s.leaf("sum1:Impuesto", &line.tax_type)?;
        s.leaf("sum1:ClaveRegimen", &line.regime_type)?;
        match &line.treatment {
            LineTreatment::Exempt { reason_code } => {
                s.leaf("sum1:OperacionExenta", reason_code)?;
                s.leaf("sum1:BaseImponibleOimporteNoSujeto", &fmt_amount(line.base_amount))
            }
            LineTreatment::Taxable {
                operation_type,
                tax_rate,
                tax_amount,
            } => {
                s.leaf("sum1:CalificacionOperacion", operation_type)?;
                s.leaf("sum1:TipoImpositivo", &fmt_amount(*tax_rate))?;
                s.leaf("sum1:BaseImponibleOimporteNoSujeto", &fmt_amount(line.base_amount))?;
                s.leaf("sum1:CuotaRepercutida", &fmt_amount(*tax_amount))
            }
        }
    })
}

/// `CuotaTotal` and `ImporteTotal`.
pub(crate) fn write_totals(sink: &mut XmlSink, event: &InvoiceEvent) -> Result<(), EncodingError> {
    sink.leaf("sum1:CuotaTotal", &fmt_amount(event.total_tax_amount))?;
    sink.leaf("sum1:ImporteTotal", &fmt_amount(event.total_amount))
}

/// Correction amounts of a full-substitution corrective invoice, followed
/// by the operation date when `with_operation_date` is set.
///
/// Nothing is written unless the invoice is corrective, corrects by
/// substitution, and carries both amounts.
pub(crate) fn write_correction_amounts(
    sink: &mut XmlSink,
    event: &InvoiceEvent,
    with_operation_date: bool,
) -> Result<(), EncodingError> {
    let Some((base, tax)) = event.substitution_amounts() else {
        return Ok(());
    };
    sink.element("sum1:ImporteRectificacion", |s| {
        s.leaf("sum1:BaseRectificada", &fmt_amount(base))?;
        s.leaf("sum1:CuotaRectificada", &fmt_amount(tax))
    })?;
    match event.operation_date {
        Some(date) if with_operation_date => sink.leaf("sum1:FechaOperacion", &fmt_date(date)),
        _ => Ok(()),
    }
}

// -- Chain, system, fingerprint ----------------------------------------------------

/// `Encadenamiento`: first-record marker or the previous record's identity
/// and fingerprint.
pub(crate) fn write_chain(sink: &mut XmlSink, link: Option<&ChainLink>) -> Result<(), EncodingError> {
    sink.element("sum1:Encadenamiento", |s| match link {
        None => s.leaf("sum1:PrimerRegistro", "S"),
        Some(link) => s.element("sum1:RegistroAnterior", |s| {
            s.leaf("sum1:IDEmisorFactura", &link.issuer_id)?;
            s.leaf("sum1:NumSerieFactura", &link.invoice_number)?;
            s.leaf("sum1:FechaExpedicionFactura", &fmt_date(link.issue_date))?;
            s.leaf("sum1:Huella", &link.prior_fingerprint)
        }),
    })
}

/// `SistemaInformatico` with all nine fields.
pub(crate) fn write_system(sink: &mut XmlSink, system: &SystemDescriptor) -> Result<(), EncodingError> {
    sink.element("sum1:SistemaInformatico", |s| {
        s.leaf("sum1:NombreRazon", &system.vendor_name)?;
        s.leaf("sum1:NIF", &system.vendor_tax_id)?;
        s.leaf("sum1:NombreSistemaInformatico", &system.system_name)?;
        s.leaf("sum1:IdSistemaInformatico", &system.system_id)?;
        s.leaf("sum1:Version", &system.version)?;
        s.leaf("sum1:NumeroInstalacion", &system.installation_number)?;
        s.leaf("sum1:TipoUsoPosibleSoloVerifactu", yes_no(system.verifactu_only))?;
        s.leaf("sum1:TipoUsoPosibleMultiOT", yes_no(system.supports_multiple_taxpayers))?;
        s.leaf("sum1:IndicadorMultiplesOT", yes_no(system.has_multiple_taxpayers))
    })
}

/// Generation timestamp, algorithm code and fingerprint, verbatim.
pub(crate) fn write_fingerprint(sink: &mut XmlSink, event: &InvoiceEvent) -> Result<(), EncodingError> {
    sink.leaf(
        "sum1:FechaHoraHusoGenRegistro",
        &fmt_timestamp(&event.fingerprint_timestamp),
    )?;
    sink.leaf("sum1:TipoHuella", FINGERPRINT_ALGORITHM)?;
    sink.leaf("sum1:Huella", &event.fingerprint)
}
