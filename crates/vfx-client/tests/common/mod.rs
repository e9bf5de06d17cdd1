//! Builders shared by the client integration tests.

#![allow(dead_code)]

use chrono::{DateTime, NaiveDate};
use rust_decimal_macros::dec;
use url::Url;
use vfx_client::{ClientConfig, Credential, Session};
use vfx_core::{
    BreakdownLine, ChainLink, FiscalIdentity, InvoiceEvent, InvoiceId, InvoiceType, OperationKind,
    Recipient, SystemDescriptor,
};

pub const ISSUER: &str = "B12345678";

pub fn session() -> Session {
    Session {
        submitter: FiscalIdentity::new("Comercial Ejemplo SL", ISSUER).unwrap(),
        representative: None,
        system: SystemDescriptor {
            vendor_name: "Programas Contables SA".into(),
            vendor_tax_id: "A11223344".into(),
            system_name: "Caja Registradora".into(),
            system_id: "CR".into(),
            version: "2.4.1".into(),
            installation_number: "0001".into(),
            verifactu_only: true,
            supports_multiple_taxpayers: false,
            has_multiple_taxpayers: false,
        },
    }
}

/// Throwaway self-signed certificate and key as one PEM bundle.
pub fn pem_credential() -> Credential {
    let rcgen::CertifiedKey { cert, key_pair } =
        rcgen::generate_simple_self_signed(vec!["localhost".to_string()]).unwrap();
    let mut pem = cert.pem().into_bytes();
    pem.extend_from_slice(key_pair.serialize_pem().as_bytes());
    Credential::pem(pem)
}

/// Test-environment configuration aimed at `endpoint`.
pub fn config(endpoint: &str) -> ClientConfig {
    let mut config = ClientConfig::new(pem_credential());
    config.endpoint_override = Some(Url::parse(endpoint).unwrap());
    config
}

pub fn number(n: usize) -> String {
    format!("2025-A-{n:04}")
}

pub fn invoice_id(n: usize) -> InvoiceId {
    InvoiceId {
        issuer_id: ISSUER.into(),
        invoice_number: number(n),
        issue_date: NaiveDate::from_ymd_opt(2025, 2, 1).unwrap(),
    }
}

/// Fake fingerprint, unique per invoice.
pub fn fingerprint(n: usize) -> String {
    format!("{n:064X}")
}

/// Registration `n` of a chain starting at 1.
pub fn registration(n: usize) -> InvoiceEvent {
    InvoiceEvent {
        operation: OperationKind::Registration,
        invoice_id: invoice_id(n),
        issuer_name: "Comercial Ejemplo SL".into(),
        invoice_type: InvoiceType::F1,
        correction_kind: None,
        description: "Venta de material de oficina".into(),
        recipient: Some(Recipient::Domestic(
            FiscalIdentity::new("Cliente Nacional SA", "A87654321").unwrap(),
        )),
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
        fingerprint: fingerprint(n),
        fingerprint_timestamp: DateTime::parse_from_rfc3339("2025-02-01T10:00:00+01:00").unwrap(),
    }
}

/// Registrations 1..=count, each linked to its predecessor.
pub fn chain(count: usize) -> Vec<InvoiceEvent> {
    let mut events: Vec<InvoiceEvent> = Vec::with_capacity(count);
    for n in 1..=count {
        let mut event = registration(n);
        event.chain_link = events.last().map(ChainLink::to_previous);
        events.push(event);
    }
    events
}

/// Cancellation of invoice `n`, linked to `previous`.
pub fn cancellation(n: usize, previous: Option<&InvoiceEvent>) -> InvoiceEvent {
    InvoiceEvent {
        operation: OperationKind::Cancellation,
        issuer_name: String::new(),
        description: String::new(),
        recipient: None,
        breakdown: Vec::new(),
        total_tax_amount: dec!(0),
        total_amount: dec!(0),
        chain_link: previous.map(ChainLink::to_previous),
        fingerprint: fingerprint(1000 + n),
        ..registration(n)
    }
}

/// One `RespuestaLinea` as the service writes it.
pub fn line(n: usize, operation: &str, status: &str, error: Option<(&str, &str)>) -> String {
    let error = error
        .map(|(code, text)| {
            format!(
                "<tikR:CodigoErrorRegistro>{code}</tikR:CodigoErrorRegistro>\
                 <tikR:DescripcionErrorRegistro>{text}</tikR:DescripcionErrorRegistro>"
            )
        })
        .unwrap_or_default();
    format!(
        "<tikR:RespuestaLinea><tikR:IDFactura>\
         <tik:IDEmisorFactura>{ISSUER}</tik:IDEmisorFactura>\
         <tik:NumSerieFactura>{}</tik:NumSerieFactura>\
         <tik:FechaExpedicionFactura>01-02-2025</tik:FechaExpedicionFactura>\
         </tikR:IDFactura>\
         <tikR:Operacion><tik:TipoOperacion>{operation}</tik:TipoOperacion></tikR:Operacion>\
         <tikR:EstadoRegistro>{status}</tikR:EstadoRegistro>{error}\
         </tikR:RespuestaLinea>",
        number(n)
    )
}

/// Full SOAP reply around `lines`.
pub fn reply(state: &str, lines: &[String]) -> String {
    format!(
        "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\
         <env:Envelope xmlns:env=\"http://schemas.xmlsoap.org/soap/envelope/\">\
         <env:Header/><env:Body>\
         <tikR:RespuestaRegFactuSistemaFacturacion \
         xmlns:tikR=\"https://www2.agenciatributaria.gob.es/static_files/common/internet/dep/aplicaciones/es/aeat/tike/cont/ws/RespuestaSuministro.xsd\" \
         xmlns:tik=\"https://www2.agenciatributaria.gob.es/static_files/common/internet/dep/aplicaciones/es/aeat/tike/cont/ws/SuministroInformacion.xsd\">\
         <tikR:CSV>A-YDSW8NLFLANWPM</tikR:CSV>\
         <tikR:TiempoEsperaEnvio>60</tikR:TiempoEsperaEnvio>\
         <tikR:EstadoEnvio>{state}</tikR:EstadoEnvio>{}\
         </tikR:RespuestaRegFactuSistemaFacturacion></env:Body></env:Envelope>",
        lines.concat()
    )
}
