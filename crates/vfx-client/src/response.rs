//! # Response Interpreter
//!
//! Turns the raw body returned by the service into a [`SubmissionResponse`]:
//! submission-level status plus one [`RecordOutcome`] per `RespuestaLinea`,
//! in response order.
//!
//! Elements are matched by local name, so namespace prefixes chosen by the
//! service do not matter. A body that is not well-formed XML, lacks a
//! required element, carries an unknown status code or is a SOAP fault
//! fails as a [`ProtocolViolation`]. A rejected record is not an error; it
//! is an outcome with [`RecordStatus::Rejected`].

use chrono::NaiveDate;
use quick_xml::events::Event;
use quick_xml::Reader;
use serde::Serialize;
use vfx_core::InvoiceId;

use crate::error::ProtocolViolation;

// -- Element tree ------------------------------------------------------------------

/// Minimal element tree keyed by local name.
#[derive(Debug, Default)]
struct Node {
    name: String,
    text: String,
    children: Vec<Node>,
}

impl Node {
    fn named(name: String) -> Self {
        Self {
            name,
            ..Self::default()
        }
    }

    /// First direct child called `name`.
    fn child(&self, name: &str) -> Option<&Node> {
        self.children.iter().find(|c| c.name == name)
    }

    fn require(&self, name: &'static str) -> Result<&Node, ProtocolViolation> {
        self.child(name)
            .ok_or(ProtocolViolation::MissingElement { element: name })
    }

    fn children_named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a Node> + 'a {
        self.children.iter().filter(move |c| c.name == name)
    }

    fn text(&self) -> &str {
        self.text.trim()
    }

    /// Text of the direct child `name`, if present and non-blank.
    fn child_text(&self, name: &str) -> Option<String> {
        self.child(name)
            .map(Node::text)
            .filter(|t| !t.is_empty())
            .map(str::to_string)
    }

    fn require_text(&self, name: &'static str) -> Result<&str, ProtocolViolation> {
        let text = self.require(name)?.text();
        if text.is_empty() {
            return Err(ProtocolViolation::MissingElement { element: name });
        }
        Ok(text)
    }
}

fn malformed(reason: impl std::fmt::Display) -> ProtocolViolation {
    ProtocolViolation::Malformed {
        reason: reason.to_string(),
    }
}

fn utf8(bytes: &[u8]) -> Result<String, ProtocolViolation> {
    std::str::from_utf8(bytes)
        .map(str::to_string)
        .map_err(malformed)
}

fn attach(stack: &mut [Node], root: &mut Option<Node>, node: Node) -> Result<(), ProtocolViolation> {
    match stack.last_mut() {
        Some(parent) => {
            parent.children.push(node);
            Ok(())
        }
        None if root.is_none() => {
            *root = Some(node);
            Ok(())
        }
        None => Err(malformed("more than one root element")),
    }
}

fn parse_tree(body: &[u8]) -> Result<Node, ProtocolViolation> {
    let mut reader = Reader::from_reader(body);
    reader.config_mut().trim_text(true);

    let mut stack: Vec<Node> = Vec::new();
    let mut root: Option<Node> = None;

    loop {
        match reader.read_event().map_err(malformed)? {
            Event::Start(e) => stack.push(Node::named(utf8(e.local_name().as_ref())?)),
            Event::Empty(e) => {
                let node = Node::named(utf8(e.local_name().as_ref())?);
                attach(&mut stack, &mut root, node)?;
            }
            Event::End(_) => {
                let node = stack.pop().ok_or_else(|| malformed("unbalanced end tag"))?;
                attach(&mut stack, &mut root, node)?;
            }
            Event::Text(t) => {
                let text = t.unescape().map_err(malformed)?;
                if let Some(top) = stack.last_mut() {
                    top.text.push_str(&text);
                }
            }
            Event::CData(c) => {
                let text = utf8(&c.into_inner())?;
                if let Some(top) = stack.last_mut() {
                    top.text.push_str(&text);
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }

    if let Some(open) = stack.last() {
        return Err(malformed(format_args!("unclosed element {}", open.name)));
    }
    root.ok_or_else(|| malformed("empty document"))
}

// -- Interpreted response --------------------------------------------------------

/// Overall state of the submission (`EstadoEnvio`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum SubmissionStatus {
    /// Every record was accepted.
    Correct,
    /// Some records were rejected.
    PartiallyCorrect,
    /// Every record was rejected.
    Incorrect,
}

impl SubmissionStatus {
    fn from_code(code: &str) -> Result<Self, ProtocolViolation> {
        match code {
            "Correcto" => Ok(Self::Correct),
            "ParcialmenteCorrecto" => Ok(Self::PartiallyCorrect),
            "Incorrecto" => Ok(Self::Incorrect),
            other => Err(ProtocolViolation::InvalidValue {
                element: "EstadoEnvio",
                value: other.to_string(),
            }),
        }
    }
}

/// Per-record verdict (`EstadoRegistro`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum RecordStatus {
    Accepted,
    AcceptedWithWarnings,
    Rejected,
}

impl RecordStatus {
    fn from_code(code: &str) -> Result<Self, ProtocolViolation> {
        match code {
            "Correcto" => Ok(Self::Accepted),
            "AceptadoConErrores" => Ok(Self::AcceptedWithWarnings),
            "Incorrecto" => Ok(Self::Rejected),
            other => Err(ProtocolViolation::InvalidValue {
                element: "EstadoRegistro",
                value: other.to_string(),
            }),
        }
    }

    pub fn is_accepted(self) -> bool {
        !matches!(self, Self::Rejected)
    }
}

/// Operation the service says it applied (`TipoOperacion`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum EchoedOperation {
    /// `Alta`: registration or corrective substitution.
    Registration,
    /// `Anulacion`.
    Cancellation,
}

impl EchoedOperation {
    fn from_code(code: &str) -> Result<Self, ProtocolViolation> {
        match code {
            "Alta" => Ok(Self::Registration),
            "Anulacion" => Ok(Self::Cancellation),
            other => Err(ProtocolViolation::InvalidValue {
                element: "TipoOperacion",
                value: other.to_string(),
            }),
        }
    }
}

/// Outcome of one submitted record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RecordOutcome {
    pub invoice_id: InvoiceId,
    pub operation: EchoedOperation,
    pub status: RecordStatus,
    /// Numeric AEAT error code, kept as text. Absent on clean acceptance.
    pub error_code: Option<String>,
    pub error_description: Option<String>,
}

/// Everything the service said about one submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SubmissionResponse {
    /// Secure verification code, issued when at least one record was
    /// accepted.
    pub csv: Option<String>,
    pub status: SubmissionStatus,
    /// Seconds to wait before the next submission.
    pub wait_seconds: Option<u32>,
    pub outcomes: Vec<RecordOutcome>,
}

impl SubmissionResponse {
    pub fn rejected(&self) -> impl Iterator<Item = &RecordOutcome> {
        self.outcomes
            .iter()
            .filter(|o| o.status == RecordStatus::Rejected)
    }

    pub fn all_accepted(&self) -> bool {
        self.outcomes.iter().all(|o| o.status.is_accepted())
    }
}

/// Interpret a raw response body.
///
/// # Errors
///
/// [`ProtocolViolation`] if the body is not a well-formed
/// `RespuestaRegFactuSistemaFacturacion` envelope or is a SOAP fault.
pub fn interpret(body: &[u8]) -> Result<SubmissionResponse, ProtocolViolation> {
    let root = parse_tree(body)?;
    if root.name != "Envelope" {
        return Err(ProtocolViolation::MissingElement { element: "Envelope" });
    }
    let soap_body = root.require("Body")?;
    if let Some(fault) = soap_body.child("Fault") {
        return Err(ProtocolViolation::Fault {
            code: fault.child_text("faultcode").unwrap_or_default(),
            message: fault.child_text("faultstring").unwrap_or_default(),
        });
    }
    let reply = soap_body.require("RespuestaRegFactuSistemaFacturacion")?;

    let wait_seconds = reply
        .child_text("TiempoEsperaEnvio")
        .map(|raw| {
            raw.parse::<u32>().map_err(|_| ProtocolViolation::InvalidValue {
                element: "TiempoEsperaEnvio",
                value: raw,
            })
        })
        .transpose()?;

    let outcomes = reply
        .children_named("RespuestaLinea")
        .map(interpret_line)
        .collect::<Result<Vec<_>, _>>()?;

    Ok(SubmissionResponse {
        csv: reply.child_text("CSV"),
        status: SubmissionStatus::from_code(reply.require_text("EstadoEnvio")?)?,
        wait_seconds,
        outcomes,
    })
}

fn interpret_line(line: &Node) -> Result<RecordOutcome, ProtocolViolation> {
    let invoice_id = interpret_invoice_id(line.require("IDFactura")?)?;
    let operation = EchoedOperation::from_code(line.require("Operacion")?.require_text("TipoOperacion")?)?;
    let status = RecordStatus::from_code(line.require_text("EstadoRegistro")?)?;

    // Only direct children: a nested RegistroDuplicado carries its own codes.
    let (error_code, error_description) = match status {
        RecordStatus::Accepted => (None, None),
        _ => (
            line.child_text("CodigoErrorRegistro"),
            line.child_text("DescripcionErrorRegistro"),
        ),
    };

    Ok(RecordOutcome {
        invoice_id,
        operation,
        status,
        error_code,
        error_description,
    })
}

fn interpret_invoice_id(node: &Node) -> Result<InvoiceId, ProtocolViolation> {
    let raw_date = node.require_text("FechaExpedicionFactura")?;
    let issue_date = NaiveDate::parse_from_str(raw_date, "%d-%m-%Y").map_err(|_| {
        ProtocolViolation::InvalidValue {
            element: "FechaExpedicionFactura",
            value: raw_date.to_string(),
        }
    })?;
    Ok(InvoiceId {
        issuer_id: node.require_text("IDEmisorFactura")?.to_string(),
        invoice_number: node.require_text("NumSerieFactura")?.to_string(),
        issue_date,
    })
}

/// Check that `outcomes` answer `submitted` one-to-one and in order.
///
/// # Errors
///
/// [`ProtocolViolation::OutcomeCountMismatch`] or
/// [`ProtocolViolation::OutcomeOutOfOrder`].
pub fn reconcile(submitted: &[InvoiceId], outcomes: &[RecordOutcome]) -> Result<(), ProtocolViolation> {
    if submitted.len() != outcomes.len() {
        return Err(ProtocolViolation::OutcomeCountMismatch {
            expected: submitted.len(),
            actual: outcomes.len(),
        });
    }
    for (index, (sent, outcome)) in submitted.iter().zip(outcomes).enumerate() {
        if *sent != outcome.invoice_id {
            return Err(ProtocolViolation::OutcomeOutOfOrder {
                index,
                expected: sent.to_string(),
                actual: outcome.invoice_id.to_string(),
            });
        }
    }
    Ok(())
}
