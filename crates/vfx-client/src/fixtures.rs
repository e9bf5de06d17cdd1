//! Shared test fixtures: one issuer, one installation, a short chain.

use chrono::{DateTime, NaiveDate};
use rust_decimal_macros::dec;
use vfx_core::{
    BreakdownLine, ChainLink, CorrectionKind, FiscalIdentity, ForeignFiscalIdentity,
    ForeignIdType, InvoiceEvent, InvoiceId, InvoiceType, OperationKind, Recipient,
    SystemDescriptor,
};

use crate::config::Credential;

pub(crate) const ISSUER: &str = "B12345678";
pub(crate) const FIRST_FINGERPRINT: &str =
    "3C464DAF61ACB827C65FDA19F352A4E3BDC2C640E9E9FC4CC058073F38F12F60";
pub(crate) const SECOND_FINGERPRINT: &str =
    "F7B94CFD8924EDFF273501B01EE5153E4CE8F259766F88CF6ACB8935802A2B97";

pub(crate) fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

pub(crate) fn submitter() -> FiscalIdentity {
    FiscalIdentity::new("Comercial Ejemplo SL", ISSUER).unwrap()
}

pub(crate) fn system() -> SystemDescriptor {
    SystemDescriptor {
        vendor_name: "Programas Contables SA".into(),
        vendor_tax_id: "A11223344".into(),
        system_name: "Caja Registradora".into(),
        system_id: "CR".into(),
        version: "2.4.1".into(),
        installation_number: "0001".into(),
        verifactu_only: true,
        supports_multiple_taxpayers: false,
        has_multiple_taxpayers: false,
    }
}

/// Throwaway self-signed certificate and key as one PEM bundle.
pub(crate) fn pem_credential() -> Credential {
    let rcgen::CertifiedKey { cert, key_pair } =
        rcgen::generate_simple_self_signed(vec!["localhost".to_string()]).unwrap();
    let mut pem = cert.pem().into_bytes();
    pem.extend_from_slice(key_pair.serialize_pem().as_bytes());
    Credential::pem(pem)
}

pub(crate) fn invoice_id(number: &str) -> InvoiceId {
    InvoiceId {
        issuer_id: ISSUER.into(),
        invoice_number: number.into(),
        issue_date: date(2025, 2, 1),
    }
}

/// Link to the first registration.
pub(crate) fn chain_link() -> ChainLink {
    ChainLink {
        issuer_id: ISSUER.into(),
        invoice_number: "2025-A-0001".into(),
        issue_date: date(2025, 2, 1),
        prior_fingerprint: FIRST_FINGERPRINT.into(),
    }
}

pub(crate) fn domestic_recipient() -> Recipient {
    Recipient::Domestic(FiscalIdentity::new("Cliente Nacional SA", "A87654321").unwrap())
}

pub(crate) fn foreign_recipient() -> Recipient {
    Recipient::Foreign(
        ForeignFiscalIdentity::new("Kunde GmbH", "DE", ForeignIdType::VatId, "DE811907980").unwrap(),
    )
}

/// The issuer's first-ever record: F1, one 21% line, no chain link.
pub(crate) fn first_registration() -> InvoiceEvent {
    InvoiceEvent {
        operation: OperationKind::Registration,
        invoice_id: invoice_id("2025-A-0001"),
        issuer_name: "Comercial Ejemplo SL".into(),
        invoice_type: InvoiceType::F1,
        correction_kind: None,
        description: "Venta de material de oficina".into(),
        recipient: Some(domestic_recipient()),
        breakdown: vec![BreakdownLine::taxable(
            "01",
            "01",
            "S1",
            dec!(21.00),
            dec!(100.00),
            dec!(21.00),
        )],
        total_tax_amount: dec!(21.00),
        total_amount: dec!(121.00),
        corrected_base: None,
        corrected_tax: None,
        operation_date: None,
        corrected_invoice_id: None,
        chain_link: None,
        fingerprint: FIRST_FINGERPRINT.into(),
        fingerprint_timestamp: DateTime::parse_from_rfc3339("2025-02-01T10:00:00+01:00").unwrap(),
    }
}

/// An R1 registration correcting by substitution, chained to the first.
pub(crate) fn corrective_registration() -> InvoiceEvent {
    InvoiceEvent {
        operation: OperationKind::Registration,
        invoice_id: invoice_id("2025-R-0001"),
        invoice_type: InvoiceType::R1,
        correction_kind: Some(CorrectionKind::Substitution),
        description: "Rectificacion por precio erroneo".into(),
        corrected_base: Some(dec!(100.00)),
        corrected_tax: Some(dec!(21.00)),
        operation_date: Some(date(2025, 2, 1)),
        chain_link: Some(chain_link()),
        fingerprint: SECOND_FINGERPRINT.into(),
        fingerprint_timestamp: DateTime::parse_from_rfc3339("2025-02-01T11:00:00+01:00").unwrap(),
        ..first_registration()
    }
}

/// A corrective substitution superseding the first registration.
pub(crate) fn substitution() -> InvoiceEvent {
    InvoiceEvent {
        operation: OperationKind::CorrectiveSubstitution,
        corrected_invoice_id: Some(invoice_id("2025-A-0001")),
        ..corrective_registration()
    }
}

/// Cancellation of the first registration.
pub(crate) fn cancellation() -> InvoiceEvent {
    InvoiceEvent {
        operation: OperationKind::Cancellation,
        invoice_id: invoice_id("2025-A-0001"),
        issuer_name: String::new(),
        invoice_type: InvoiceType::default(),
        correction_kind: None,
        description: String::new(),
        recipient: None,
        breakdown: Vec::new(),
        total_tax_amount: dec!(0),
        total_amount: dec!(0),
        corrected_base: None,
        corrected_tax: None,
        operation_date: None,
        corrected_invoice_id: None,
        chain_link: Some(chain_link()),
        fingerprint: SECOND_FINGERPRINT.into(),
        fingerprint_timestamp: DateTime::parse_from_rfc3339("2025-02-02T09:30:00+01:00").unwrap(),
    }
}
