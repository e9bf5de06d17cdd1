//! # vfx-core — Domain Types for VERI*FACTU Records
//!
//! Value types for the chained invoice records submitted to the AEAT
//! VERI*FACTU service. Every other crate in the workspace depends on
//! `vfx-core`; it depends on nothing internal.
//!
//! ## Key Design Principles
//!
//! 1. **Validated identities.** `FiscalIdentity` and `ForeignFiscalIdentity`
//!    can only be built through checking constructors, and `Deserialize`
//!    routes through the same constructors.
//!
//! 2. **Recipients are a closed sum.** A recipient is either domestic or
//!    foreign. Loose input that fits neither shape is rejected when it is
//!    converted into [`Recipient`], never later at serialization time.
//!
//! 3. **Breakdown lines carry exactly one shape.** A line is exempt or
//!    taxable; the taxable-only fields do not exist on an exempt line.
//!
//! 4. **Fingerprints are opaque.** The record fingerprint and its timestamp
//!    are computed elsewhere and carried verbatim.
//!
//! ## Crate Policy
//!
//! - No `unsafe` code.
//! - No `panic!()` or `.unwrap()` outside tests.
//! - Amounts are `rust_decimal::Decimal`, never floating point.

pub mod chain;
pub mod error;
pub mod identity;
pub mod invoice;
pub mod system;

pub use chain::ChainLink;
pub use error::{EncodingError, IdentityError};
pub use identity::{FiscalIdentity, ForeignFiscalIdentity, ForeignIdType, Recipient, RecipientFields};
pub use invoice::{
    BreakdownFields, BreakdownLine, CorrectionKind, InvoiceEvent, InvoiceId, InvoiceType, LineTreatment,
    OperationKind,
};
pub use system::SystemDescriptor;
