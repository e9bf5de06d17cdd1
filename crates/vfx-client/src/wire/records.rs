//! # Record Templates
//!
//! One template per operation kind. Registration and corrective
//! substitution share the `RegistroAlta` layout and differ only in the
//! [`AltaProfile`] flags; cancellation uses `RegistroAnulacion`.
//!
//! Every template checks its preconditions before writing, and the caller
//! discards the whole document on the first error.

use chrono::Timelike;
use vfx_core::{EncodingError, InvoiceEvent, OperationKind, SystemDescriptor};

use super::fragments::{
    write_breakdown, write_chain, write_correction_amounts, write_fingerprint, write_invoice_id,
    write_recipient, write_system, write_totals, ChainRequirement, IdNaming,
};
use super::writer::XmlSink;

/// Schema version written into every record (`IDVersion`).
pub const SCHEMA_VERSION: &str = "1.0";

/// Flags that distinguish the two `RegistroAlta` templates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AltaProfile {
    pub chain: ChainRequirement,
    /// Write the reference to the invoice being superseded; fail if absent.
    pub corrected_reference: bool,
    /// Write `FechaOperacion` after the correction amounts.
    pub operation_date: bool,
}

impl AltaProfile {
    pub const REGISTRATION: Self = Self {
        chain: ChainRequirement::OptionalIfFirst,
        corrected_reference: false,
        operation_date: true,
    };

    pub const SUBSTITUTION: Self = Self {
        chain: ChainRequirement::Mandatory,
        corrected_reference: true,
        operation_date: false,
    };
}

/// Check every precondition of `event` for its operation kind without
/// writing anything.
pub fn check_record(event: &InvoiceEvent) -> Result<(), EncodingError> {
    check_timestamp(event)?;
    match event.operation {
        OperationKind::Registration => check_alta(event, AltaProfile::REGISTRATION),
        OperationKind::CorrectiveSubstitution => check_alta(event, AltaProfile::SUBSTITUTION),
        OperationKind::Cancellation => ChainRequirement::Mandatory.resolve(event).map(|_| ()),
    }
}

fn check_timestamp(event: &InvoiceEvent) -> Result<(), EncodingError> {
    if event.fingerprint_timestamp.nanosecond() != 0 {
        return Err(EncodingError::FractionalTimestamp {
            invoice: event.invoice_id.invoice_number.clone(),
        });
    }
    Ok(())
}

fn check_alta(event: &InvoiceEvent, profile: AltaProfile) -> Result<(), EncodingError> {
    profile.chain.resolve(event)?;
    if profile.corrected_reference && event.corrected_invoice_id.is_none() {
        return Err(EncodingError::MissingCorrectedInvoice {
            invoice: event.invoice_id.invoice_number.clone(),
        });
    }
    if event.invoice_type.is_corrective() && event.correction_kind.is_none() {
        return Err(EncodingError::MissingCorrectionKind {
            invoice: event.invoice_id.invoice_number.clone(),
        });
    }
    Ok(())
}

/// Write the record block for `event` (`RegistroFactura` and its child).
pub(crate) fn write_record(
    sink: &mut XmlSink,
    event: &InvoiceEvent,
    system: &SystemDescriptor,
) -> Result<(), EncodingError> {
    check_timestamp(event)?;
    sink.element("sum:RegistroFactura", |s| match event.operation {
        OperationKind::Registration => write_alta(s, event, system, AltaProfile::REGISTRATION),
        OperationKind::CorrectiveSubstitution => {
            write_alta(s, event, system, AltaProfile::SUBSTITUTION)
        }
        OperationKind::Cancellation => write_cancellation(s, event, system),
    })
}

fn write_alta(
    sink: &mut XmlSink,
    event: &InvoiceEvent,
    system: &SystemDescriptor,
    profile: AltaProfile,
) -> Result<(), EncodingError> {
    check_alta(event, profile)?;
    let link = profile.chain.resolve(event)?;

    sink.element("sum1:RegistroAlta", |s| {
        s.leaf("sum1:IDVersion", SCHEMA_VERSION)?;
        write_invoice_id(s, "sum1:IDFactura", &event.invoice_id, IdNaming::Issued)?;
        s.leaf("sum1:NombreRazonEmisor", &event.issuer_name)?;
        s.leaf("sum1:TipoFactura", event.invoice_type.code())?;
        if event.invoice_type.is_corrective() {
            if let Some(kind) = event.correction_kind {
                s.leaf("sum1:TipoRectificativa", kind.code())?;
            }
        }
        if profile.corrected_reference {
            if let Some(corrected) = &event.corrected_invoice_id {
                s.element("sum1:FacturasRectificadas", |s| {
                    write_invoice_id(s, "sum1:IDFacturaRectificada", corrected, IdNaming::Issued)
                })?;
            }
        }
        write_correction_amounts(s, event, profile.operation_date)?;
        s.leaf("sum1:DescripcionOperacion", &event.description)?;
        write_recipient(s, event)?;
        write_breakdown(s, &event.breakdown)?;
        write_totals(s, event)?;
        write_chain(s, link)?;
        write_system(s, system)?;
        write_fingerprint(s, event)
    })
}

fn write_cancellation(
    sink: &mut XmlSink,
    event: &InvoiceEvent,
    system: &SystemDescriptor,
) -> Result<(), EncodingError> {
    let link = ChainRequirement::Mandatory.resolve(event)?;

    sink.element("sum1:RegistroAnulacion", |s| {
        s.leaf("sum1:IDVersion", SCHEMA_VERSION)?;
        write_invoice_id(s, "sum1:IDFactura", &event.invoice_id, IdNaming::Annulled)?;
        write_chain(s, link)?;
        write_system(s, system)?;
        write_fingerprint(s, event)
    })
}
