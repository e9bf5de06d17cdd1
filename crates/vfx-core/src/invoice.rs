//! # Invoice Events
//!
//! An [`InvoiceEvent`] is one record of an issuer's chain: a registration,
//! a corrective substitution or a cancellation. Events are plain data; the
//! wire rules that depend on operation kind, invoice type and chain position
//! live in the serializer.
//!
//! The fingerprint and its timestamp are produced by an external component
//! and are never recomputed or checked here.

use chrono::{DateTime, FixedOffset, NaiveDate};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::chain::ChainLink;
use crate::error::EncodingError;
use crate::identity::Recipient;

/// What the record does to the invoice it describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OperationKind {
    /// A new invoice.
    Registration,
    /// A corrective invoice replacing the figures of an earlier one.
    CorrectiveSubstitution,
    /// Annulment of an earlier invoice.
    Cancellation,
}

impl OperationKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Registration => "registration",
            Self::CorrectiveSubstitution => "corrective substitution",
            Self::Cancellation => "cancellation",
        }
    }
}

impl std::fmt::Display for OperationKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Identity of an invoice (`IDFactura`): issuer, series/number and date.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct InvoiceId {
    pub issuer_id: String,
    pub invoice_number: String,
    pub issue_date: NaiveDate,
}

impl std::fmt::Display for InvoiceId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}/{}/{}",
            self.issuer_id,
            self.invoice_number,
            self.issue_date.format("%d-%m-%Y")
        )
    }
}

/// Invoice type (`TipoFactura`, AEAT list L2).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum InvoiceType {
    /// Ordinary invoice.
    #[default]
    F1,
    /// Simplified invoice.
    F2,
    /// Invoice replacing simplified invoices.
    F3,
    /// Corrective: legal error and art. 80.1, 80.2 and 80.6.
    R1,
    /// Corrective: art. 80.3.
    R2,
    /// Corrective: art. 80.4.
    R3,
    /// Corrective: other causes.
    R4,
    /// Corrective of a simplified invoice.
    R5,
}

impl InvoiceType {
    pub fn code(self) -> &'static str {
        match self {
            Self::F1 => "F1",
            Self::F2 => "F2",
            Self::F3 => "F3",
            Self::R1 => "R1",
            Self::R2 => "R2",
            Self::R3 => "R3",
            Self::R4 => "R4",
            Self::R5 => "R5",
        }
    }

    /// Corrective invoices are the "R" family.
    pub fn is_corrective(self) -> bool {
        self.code().starts_with('R')
    }

    /// Types whose records carry a recipient block.
    pub fn admits_recipient(self) -> bool {
        matches!(self, Self::F1 | Self::R1 | Self::R2 | Self::R3 | Self::R4)
    }
}

/// How a corrective invoice corrects (`TipoRectificativa`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CorrectionKind {
    /// Full substitution: the corrective carries the complete new figures.
    #[serde(alias = "S")]
    Substitution,
    /// By differences: the corrective carries only the delta.
    #[serde(alias = "I")]
    Differences,
}

impl CorrectionKind {
    pub fn code(self) -> &'static str {
        match self {
            Self::Substitution => "S",
            Self::Differences => "I",
        }
    }
}

// ---------------------------------------------------------------------------
// Breakdown lines
// ---------------------------------------------------------------------------

/// One tax bucket of an invoice (`DetalleDesglose`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "BreakdownFields", into = "BreakdownFields")]
pub struct BreakdownLine {
    /// Tax (`Impuesto`): "01" VAT, "02" IPSI, "03" IGIC, "05" other.
    pub tax_type: String,
    /// Regime key (`ClaveRegimen`).
    pub regime_type: String,
    /// Taxable base or non-subject amount.
    pub base_amount: Decimal,
    pub treatment: LineTreatment,
}

/// The two mutually exclusive shapes of a breakdown line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LineTreatment {
    Exempt {
        /// Exemption cause (`OperacionExenta`, E1..E8).
        reason_code: String,
    },
    Taxable {
        /// Operation qualification (`CalificacionOperacion`, S1/S2/N1/N2).
        operation_type: String,
        tax_rate: Decimal,
        tax_amount: Decimal,
    },
}

impl BreakdownLine {
    pub fn taxable(
        tax_type: impl Into<String>,
        regime_type: impl Into<String>,
        operation_type: impl Into<String>,
        tax_rate: Decimal,
        base_amount: Decimal,
        tax_amount: Decimal,
    ) -> Self {
        Self {
            tax_type: tax_type.into(),
            regime_type: regime_type.into(),
            base_amount,
            treatment: LineTreatment::Taxable {
                operation_type: operation_type.into(),
                tax_rate,
                tax_amount,
            },
        }
    }

    pub fn exempt(
        tax_type: impl Into<String>,
        regime_type: impl Into<String>,
        reason_code: impl Into<String>,
        base_amount: Decimal,
    ) -> Self {
        Self {
            tax_type: tax_type.into(),
            regime_type: regime_type.into(),
            base_amount,
            treatment: LineTreatment::Exempt {
                reason_code: reason_code.into(),
            },
        }
    }

    pub fn is_exempt(&self) -> bool {
        matches!(self.treatment, LineTreatment::Exempt { .. })
    }
}

/// Flat breakdown input. A non-empty `exempt_reason_code` selects the exempt
/// shape and the taxable fields are ignored.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BreakdownFields {
    pub tax_type: String,
    pub regime_type: String,
    pub base_amount: Decimal,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exempt_reason_code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub operation_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tax_rate: Option<Decimal>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tax_amount: Option<Decimal>,
}

impl TryFrom<BreakdownFields> for BreakdownLine {
    type Error = EncodingError;

    fn try_from(fields: BreakdownFields) -> Result<Self, Self::Error> {
        let treatment = match fields.exempt_reason_code.filter(|c| !c.trim().is_empty()) {
            Some(reason_code) => LineTreatment::Exempt { reason_code },
            None => LineTreatment::Taxable {
                operation_type: fields
                    .operation_type
                    .ok_or(EncodingError::IncompleteBreakdownLine { field: "operation_type" })?,
                tax_rate: fields
                    .tax_rate
                    .ok_or(EncodingError::IncompleteBreakdownLine { field: "tax_rate" })?,
                tax_amount: fields
                    .tax_amount
                    .ok_or(EncodingError::IncompleteBreakdownLine { field: "tax_amount" })?,
            },
        };
        Ok(Self {
            tax_type: fields.tax_type,
            regime_type: fields.regime_type,
            base_amount: fields.base_amount,
            treatment,
        })
    }
}

impl From<BreakdownLine> for BreakdownFields {
    fn from(line: BreakdownLine) -> Self {
        let mut fields = Self {
            tax_type: line.tax_type,
            regime_type: line.regime_type,
            base_amount: line.base_amount,
            ..Self::default()
        };
        match line.treatment {
            LineTreatment::Exempt { reason_code } => fields.exempt_reason_code = Some(reason_code),
            LineTreatment::Taxable {
                operation_type,
                tax_rate,
                tax_amount,
            } => {
                fields.operation_type = Some(operation_type);
                fields.tax_rate = Some(tax_rate);
                fields.tax_amount = Some(tax_amount);
            }
        }
        fields
    }
}

// ---------------------------------------------------------------------------
// Invoice event
// ---------------------------------------------------------------------------

/// One record of an issuer's chain.
///
/// Fields that a cancellation does not carry (issuer name, description,
/// totals, breakdown) default to empty when deserialized.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvoiceEvent {
    pub operation: OperationKind,
    pub invoice_id: InvoiceId,
    #[serde(default)]
    pub issuer_name: String,
    #[serde(default)]
    pub invoice_type: InvoiceType,
    /// Required when `invoice_type` is corrective.
    #[serde(default)]
    pub correction_kind: Option<CorrectionKind>,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub recipient: Option<Recipient>,
    #[serde(default)]
    pub breakdown: Vec<BreakdownLine>,
    #[serde(default)]
    pub total_tax_amount: Decimal,
    #[serde(default)]
    pub total_amount: Decimal,
    /// Base of the corrected invoice, for full substitutions.
    #[serde(default)]
    pub corrected_base: Option<Decimal>,
    /// Tax of the corrected invoice, for full substitutions.
    #[serde(default)]
    pub corrected_tax: Option<Decimal>,
    #[serde(default)]
    pub operation_date: Option<NaiveDate>,
    /// The invoice a corrective substitution supersedes.
    #[serde(default)]
    pub corrected_invoice_id: Option<InvoiceId>,
    /// `None` only on an issuer's first-ever registration.
    #[serde(default)]
    pub chain_link: Option<ChainLink>,
    pub fingerprint: String,
    pub fingerprint_timestamp: DateTime<FixedOffset>,
}

impl InvoiceEvent {
    /// Corrected base and tax, when this is a full-substitution corrective
    /// invoice and both amounts were supplied.
    pub fn substitution_amounts(&self) -> Option<(Decimal, Decimal)> {
        if !self.invoice_type.is_corrective()
            || self.correction_kind != Some(CorrectionKind::Substitution)
        {
            return None;
        }
        Some((self.corrected_base?, self.corrected_tax?))
    }
}
