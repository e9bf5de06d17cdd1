//! # Fiscal Identities
//!
//! A fiscal party is either domestic (name + Spanish tax id) or foreign
//! (name + country + id type + id value). Both are immutable value objects
//! with validating constructors.
//!
//! As an invoice recipient the two shapes are exclusive. [`Recipient`] is a
//! two-variant enum; loose input arrives as [`RecipientFields`] and is
//! converted with `TryFrom`, which is the only place a third shape can be
//! expressed and therefore the only place it is rejected.

use serde::{Deserialize, Serialize};

use crate::error::{EncodingError, IdentityError};

/// Maximum length of a party name (`NombreRazon`).
pub const MAX_NAME_LEN: usize = 120;

/// Maximum length of a foreign identifier (`ID` inside `IDOtro`).
pub const MAX_FOREIGN_ID_LEN: usize = 20;

fn check_name(field: &'static str, value: &str, max: usize) -> Result<(), IdentityError> {
    if value.trim().is_empty() {
        return Err(IdentityError::Blank { field });
    }
    let len = value.chars().count();
    if len > max {
        return Err(IdentityError::TooLong { field, len, max });
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Domestic identity
// ---------------------------------------------------------------------------

/// A domestic fiscal party: legal name and national tax id (NIF).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "RawFiscalIdentity")]
pub struct FiscalIdentity {
    name: String,
    tax_id: String,
}

#[derive(Deserialize)]
struct RawFiscalIdentity {
    name: String,
    tax_id: String,
}

impl TryFrom<RawFiscalIdentity> for FiscalIdentity {
    type Error = IdentityError;

    fn try_from(raw: RawFiscalIdentity) -> Result<Self, Self::Error> {
        Self::new(raw.name, raw.tax_id)
    }
}

impl FiscalIdentity {
    /// Build a domestic identity.
    ///
    /// # Errors
    ///
    /// Returns [`IdentityError`] if the name is blank or longer than 120
    /// characters, or if the tax id is not 8 or 9 characters.
    pub fn new(name: impl Into<String>, tax_id: impl Into<String>) -> Result<Self, IdentityError> {
        let name = name.into();
        let tax_id = tax_id.into();
        check_name("name", &name, MAX_NAME_LEN)?;
        let len = tax_id.chars().count();
        if tax_id.trim().is_empty() || !(8..=9).contains(&len) {
            return Err(IdentityError::InvalidTaxId(tax_id));
        }
        Ok(Self { name, tax_id })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn tax_id(&self) -> &str {
        &self.tax_id
    }
}

impl std::fmt::Display for FiscalIdentity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.name, self.tax_id)
    }
}

// ---------------------------------------------------------------------------
// Foreign identity
// ---------------------------------------------------------------------------

/// Kind of foreign identifier (`IDType`, AEAT list L7).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ForeignIdType {
    /// EU VAT number.
    #[serde(rename = "02")]
    VatId,
    /// Passport.
    #[serde(rename = "03")]
    Passport,
    /// Official identity document issued by the country of residence.
    #[serde(rename = "04")]
    OfficialDocument,
    /// Certificate of residence.
    #[serde(rename = "05")]
    ResidenceCertificate,
    /// Any other supporting document.
    #[serde(rename = "06")]
    OtherDocument,
    /// Not registered in the census.
    #[serde(rename = "07")]
    NotRegistered,
}

impl ForeignIdType {
    /// Two-digit wire code.
    pub fn code(self) -> &'static str {
        match self {
            Self::VatId => "02",
            Self::Passport => "03",
            Self::OfficialDocument => "04",
            Self::ResidenceCertificate => "05",
            Self::OtherDocument => "06",
            Self::NotRegistered => "07",
        }
    }

    /// Parse a two-digit wire code.
    pub fn from_code(code: &str) -> Result<Self, IdentityError> {
        match code {
            "02" => Ok(Self::VatId),
            "03" => Ok(Self::Passport),
            "04" => Ok(Self::OfficialDocument),
            "05" => Ok(Self::ResidenceCertificate),
            "06" => Ok(Self::OtherDocument),
            "07" => Ok(Self::NotRegistered),
            other => Err(IdentityError::UnknownIdType(other.to_string())),
        }
    }
}

/// A foreign fiscal party identified by country, id type and id value.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "RawForeignIdentity")]
pub struct ForeignFiscalIdentity {
    name: String,
    country: String,
    id_type: ForeignIdType,
    id_value: String,
}

#[derive(Deserialize)]
struct RawForeignIdentity {
    name: String,
    country: String,
    id_type: ForeignIdType,
    id_value: String,
}

impl TryFrom<RawForeignIdentity> for ForeignFiscalIdentity {
    type Error = IdentityError;

    fn try_from(raw: RawForeignIdentity) -> Result<Self, Self::Error> {
        Self::new(raw.name, raw.country, raw.id_type, raw.id_value)
    }
}

impl ForeignFiscalIdentity {
    /// Build a foreign identity.
    ///
    /// # Errors
    ///
    /// Returns [`IdentityError`] if the name or id is blank or too long, or
    /// the country is not an ISO 3166-1 alpha-2 code.
    pub fn new(
        name: impl Into<String>,
        country: impl Into<String>,
        id_type: ForeignIdType,
        id_value: impl Into<String>,
    ) -> Result<Self, IdentityError> {
        let name = name.into();
        let country = country.into();
        let id_value = id_value.into();
        check_name("name", &name, MAX_NAME_LEN)?;
        if country.len() != 2 || !country.bytes().all(|b| b.is_ascii_uppercase()) {
            return Err(IdentityError::InvalidCountry(country));
        }
        check_name("id value", &id_value, MAX_FOREIGN_ID_LEN)?;
        Ok(Self {
            name,
            country,
            id_type,
            id_value,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn country(&self) -> &str {
        &self.country
    }

    pub fn id_type(&self) -> ForeignIdType {
        self.id_type
    }

    pub fn id_value(&self) -> &str {
        &self.id_value
    }
}

// ---------------------------------------------------------------------------
// Recipient
// ---------------------------------------------------------------------------

/// Invoice recipient: exactly one of the two identity shapes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RecipientFields", into = "RecipientFields")]
pub enum Recipient {
    Domestic(FiscalIdentity),
    Foreign(ForeignFiscalIdentity),
}

impl Recipient {
    pub fn name(&self) -> &str {
        match self {
            Self::Domestic(id) => id.name(),
            Self::Foreign(id) => id.name(),
        }
    }
}

/// Flat, untyped recipient input as it arrives from a batch file.
///
/// A domestic recipient sets `tax_id` only; a foreign one sets `country`,
/// `id_type` and `id_value` only.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecipientFields {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tax_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id_value: Option<String>,
}

impl TryFrom<RecipientFields> for Recipient {
    type Error = EncodingError;

    fn try_from(fields: RecipientFields) -> Result<Self, Self::Error> {
        let RecipientFields {
            name,
            tax_id,
            country,
            id_type,
            id_value,
        } = fields;

        let has_foreign = country.is_some() || id_type.is_some() || id_value.is_some();
        match (tax_id, has_foreign) {
            (Some(_), true) => Err(EncodingError::UnsupportedRecipient {
                reason: "both a domestic tax id and foreign id fields are set".into(),
            }),
            (Some(tax_id), false) => Ok(Self::Domestic(FiscalIdentity::new(name, tax_id)?)),
            (None, true) => match (country, id_type, id_value) {
                (Some(country), Some(id_type), Some(id_value)) => {
                    let id_type = ForeignIdType::from_code(&id_type)?;
                    Ok(Self::Foreign(ForeignFiscalIdentity::new(
                        name, country, id_type, id_value,
                    )?))
                }
                _ => Err(EncodingError::UnsupportedRecipient {
                    reason: "a foreign recipient needs country, id type and id value".into(),
                }),
            },
            (None, false) => Err(EncodingError::UnsupportedRecipient {
                reason: "neither a domestic tax id nor a foreign id is set".into(),
            }),
        }
    }
}

impl From<Recipient> for RecipientFields {
    fn from(recipient: Recipient) -> Self {
        match recipient {
            Recipient::Domestic(id) => Self {
                name: id.name,
                tax_id: Some(id.tax_id),
                ..Self::default()
            },
            Recipient::Foreign(id) => Self {
                name: id.name,
                tax_id: None,
                country: Some(id.country),
                id_type: Some(id.id_type.code().to_string()),
                id_value: Some(id.id_value),
            },
        }
    }
}
