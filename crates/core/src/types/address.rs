//! Delivery addresses and the new-address draft.
//!
//! Validation is pure: [`AddressDraft::validate`] returns a structured
//! [`AddressValidation`] with one [`FieldCheck`] per field and never mutates
//! the draft. Views decide for themselves how to present field errors.
//!
//! ## Field rules
//!
//! - Text fields (`addressLine1`, `addressLine2`, `city`, `state`): 3-40 characters
//! - Contact numbers (`contactNo`, `alternateContact`): 10 digits, `10^9 <= n < 10^10`
//! - Pin code: 6 digits, `10^5 <= n < 10^6`

use core::fmt;

use serde::{Deserialize, Deserializer, Serialize};

use super::id::AddressId;

/// Minimum length of a free-text address field.
pub const ADDRESS_MIN_LENGTH: usize = 3;
/// Maximum length of a free-text address field.
pub const ADDRESS_MAX_LENGTH: usize = 40;

const PIN_CODE_RANGE: core::ops::Range<u64> = 100_000..1_000_000;
const CONTACT_NUMBER_RANGE: core::ops::Range<u64> = 1_000_000_000..10_000_000_000;

/// Errors that can occur when validating a single address field.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum AddressFieldError {
    /// The field has no value.
    #[error("field is required")]
    Missing,
    /// The text is shorter than the minimum length.
    #[error("must be at least {min} characters")]
    TooShort {
        /// Minimum allowed length.
        min: usize,
    },
    /// The text is longer than the maximum length.
    #[error("must be at most {max} characters")]
    TooLong {
        /// Maximum allowed length.
        max: usize,
    },
    /// The value is not a whole number.
    #[error("must be a number")]
    NotANumber,
    /// The number is outside the allowed range.
    #[error("must be a {digits}-digit number")]
    OutOfRange {
        /// Number of digits the value must have.
        digits: u32,
    },
}

/// The seven fields of a delivery address.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum AddressField {
    AddressLine1,
    AddressLine2,
    City,
    State,
    PinCode,
    ContactNo,
    AlternateContact,
}

impl AddressField {
    /// All fields, in form order.
    pub const ALL: [Self; 7] = [
        Self::AddressLine1,
        Self::AddressLine2,
        Self::City,
        Self::State,
        Self::PinCode,
        Self::ContactNo,
        Self::AlternateContact,
    ];

    /// Wire name of the field.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::AddressLine1 => "addressLine1",
            Self::AddressLine2 => "addressLine2",
            Self::City => "city",
            Self::State => "state",
            Self::PinCode => "pinCode",
            Self::ContactNo => "contactNo",
            Self::AlternateContact => "alternateContact",
        }
    }

    /// Check a raw value against this field's rule.
    ///
    /// Surrounding whitespace is ignored, matching what gets submitted.
    ///
    /// # Errors
    ///
    /// Returns the first rule the value violates.
    pub fn check(self, value: Option<&str>) -> Result<(), AddressFieldError> {
        let value = value
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .ok_or(AddressFieldError::Missing)?;
        match self {
            Self::AddressLine1 | Self::AddressLine2 | Self::City | Self::State => {
                validate_text(value)
            }
            Self::PinCode => validate_pin_code(value).map(drop),
            Self::ContactNo | Self::AlternateContact => validate_contact_number(value).map(drop),
        }
    }
}

impl fmt::Display for AddressField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Validate a free-text address field (3-40 characters).
///
/// # Errors
///
/// Returns `TooShort` or `TooLong` when the length is out of bounds.
pub fn validate_text(text: &str) -> Result<(), AddressFieldError> {
    let len = text.chars().count();
    if len < ADDRESS_MIN_LENGTH {
        return Err(AddressFieldError::TooShort {
            min: ADDRESS_MIN_LENGTH,
        });
    }
    if len > ADDRESS_MAX_LENGTH {
        return Err(AddressFieldError::TooLong {
            max: ADDRESS_MAX_LENGTH,
        });
    }
    Ok(())
}

/// Validate a 10-digit contact number.
///
/// # Errors
///
/// Returns `NotANumber` or `OutOfRange`.
pub fn validate_contact_number(number: &str) -> Result<u64, AddressFieldError> {
    parse_in_range(number, &CONTACT_NUMBER_RANGE, 10)
}

/// Validate a 6-digit pin code.
///
/// # Errors
///
/// Returns `NotANumber` or `OutOfRange`.
pub fn validate_pin_code(number: &str) -> Result<u32, AddressFieldError> {
    let value = parse_in_range(number, &PIN_CODE_RANGE, 6)?;
    u32::try_from(value).map_err(|_| AddressFieldError::OutOfRange { digits: 6 })
}

fn parse_in_range(
    number: &str,
    range: &core::ops::Range<u64>,
    digits: u32,
) -> Result<u64, AddressFieldError> {
    let trimmed = number.trim();
    if trimmed.is_empty() || !trimmed.bytes().all(|b| b.is_ascii_digit()) {
        return Err(AddressFieldError::NotANumber);
    }
    // Too many digits to fit in u64 is still just out of range.
    let value = trimmed
        .parse::<u64>()
        .map_err(|_| AddressFieldError::OutOfRange { digits })?;
    if range.contains(&value) {
        Ok(value)
    } else {
        Err(AddressFieldError::OutOfRange { digits })
    }
}

/// Outcome of checking one field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldCheck {
    /// Which field was checked.
    pub field: AddressField,
    /// The value as entered.
    pub value: Option<String>,
    /// The rule it broke, if any.
    pub error: Option<AddressFieldError>,
}

impl FieldCheck {
    /// Whether the field passed.
    #[must_use]
    pub const fn is_valid(&self) -> bool {
        self.error.is_none()
    }
}

/// Per-field result of validating an [`AddressDraft`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AddressValidation {
    checks: Vec<FieldCheck>,
}

impl AddressValidation {
    /// All checks, in form order.
    #[must_use]
    pub fn checks(&self) -> &[FieldCheck] {
        &self.checks
    }

    /// The check for a single field.
    #[must_use]
    pub fn field(&self, field: AddressField) -> Option<&FieldCheck> {
        self.checks.iter().find(|c| c.field == field)
    }

    /// Fields that failed validation.
    #[must_use]
    pub fn invalid_fields(&self) -> Vec<AddressField> {
        self.checks
            .iter()
            .filter(|c| !c.is_valid())
            .map(|c| c.field)
            .collect()
    }

    /// Whether every field is present and valid.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.checks.iter().all(FieldCheck::is_valid)
    }
}

/// The in-progress, not-yet-submitted address form.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AddressDraft {
    pub address_line1: Option<String>,
    pub address_line2: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub pin_code: Option<String>,
    pub contact_no: Option<String>,
    pub alternate_contact: Option<String>,
}

impl AddressDraft {
    /// A blank draft.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Current value of a field.
    #[must_use]
    pub fn get(&self, field: AddressField) -> Option<&str> {
        match field {
            AddressField::AddressLine1 => self.address_line1.as_deref(),
            AddressField::AddressLine2 => self.address_line2.as_deref(),
            AddressField::City => self.city.as_deref(),
            AddressField::State => self.state.as_deref(),
            AddressField::PinCode => self.pin_code.as_deref(),
            AddressField::ContactNo => self.contact_no.as_deref(),
            AddressField::AlternateContact => self.alternate_contact.as_deref(),
        }
    }

    /// Set a field from user input.
    pub fn set(&mut self, field: AddressField, value: impl Into<String>) {
        let slot = match field {
            AddressField::AddressLine1 => &mut self.address_line1,
            AddressField::AddressLine2 => &mut self.address_line2,
            AddressField::City => &mut self.city,
            AddressField::State => &mut self.state,
            AddressField::PinCode => &mut self.pin_code,
            AddressField::ContactNo => &mut self.contact_no,
            AddressField::AlternateContact => &mut self.alternate_contact,
        };
        *slot = Some(value.into());
    }

    /// Check a single field without touching the others.
    #[must_use]
    pub fn check_field(&self, field: AddressField) -> FieldCheck {
        let value = self.get(field);
        FieldCheck {
            field,
            value: value.map(str::to_owned),
            error: field.check(value).err(),
        }
    }

    /// Validate every field.
    #[must_use]
    pub fn validate(&self) -> AddressValidation {
        AddressValidation {
            checks: AddressField::ALL
                .iter()
                .map(|&field| self.check_field(field))
                .collect(),
        }
    }

    /// Whether the draft can be submitted.
    #[must_use]
    pub fn is_submittable(&self) -> bool {
        self.validate().is_valid()
    }

    /// Build the request body for a fully valid draft.
    ///
    /// # Errors
    ///
    /// Returns the fields that failed validation.
    pub fn to_new_address(&self) -> Result<NewAddress, Vec<AddressField>> {
        let validation = self.validate();
        if !validation.is_valid() {
            return Err(validation.invalid_fields());
        }

        let text = |field| self.get(field).unwrap_or_default().trim().to_owned();
        let number = |field| {
            self.get(field)
                .map(validate_contact_number)
                .and_then(Result::ok)
                .ok_or_else(|| vec![field])
        };

        Ok(NewAddress {
            address_line1: text(AddressField::AddressLine1),
            address_line2: text(AddressField::AddressLine2),
            city: text(AddressField::City),
            state: text(AddressField::State),
            pin_code: self
                .get(AddressField::PinCode)
                .map(validate_pin_code)
                .and_then(Result::ok)
                .ok_or_else(|| vec![AddressField::PinCode])?,
            contact_no: number(AddressField::ContactNo)?,
            alternate_contact: number(AddressField::AlternateContact)?,
        })
    }
}

/// Body of an add-address request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewAddress {
    pub address_line1: String,
    pub address_line2: String,
    pub city: String,
    pub state: String,
    pub pin_code: u32,
    pub contact_no: u64,
    pub alternate_contact: u64,
}

/// A saved delivery address, as returned by the store backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Address {
    #[serde(alias = "addressId")]
    pub id: AddressId,
    #[serde(default)]
    pub address_line1: String,
    #[serde(default)]
    pub address_line2: String,
    #[serde(default)]
    pub city: String,
    #[serde(default)]
    pub state: String,
    #[serde(default, deserialize_with = "string_or_number")]
    pub pin_code: String,
    #[serde(default, deserialize_with = "string_or_number")]
    pub contact_no: String,
    #[serde(default, deserialize_with = "string_or_number")]
    pub alternate_contact: String,
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}, {}, {}, {} - {} (ph: {})",
            self.address_line1,
            self.address_line2,
            self.city,
            self.state,
            self.pin_code,
            self.contact_no
        )
    }
}

/// The backend stores numeric address fields as either JSON numbers or strings.
fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Text(String),
        Number(serde_json::Number),
        Null(()),
    }

    Ok(match Raw::deserialize(deserializer)? {
        Raw::Text(s) => s,
        Raw::Number(n) => n.to_string(),
        Raw::Null(()) => String::new(),
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn valid_draft() -> AddressDraft {
        AddressDraft {
            address_line1: Some("12 Temple Street".to_string()),
            address_line2: Some("Near Bus Stand".to_string()),
            city: Some("Sivakasi".to_string()),
            state: Some("Tamil Nadu".to_string()),
            pin_code: Some("626123".to_string()),
            contact_no: Some("9876543210".to_string()),
            alternate_contact: Some("9123456780".to_string()),
        }
    }

    #[test]
    fn test_validate_text_bounds() {
        assert_eq!(
            validate_text("ab"),
            Err(AddressFieldError::TooShort { min: 3 })
        );
        assert!(validate_text("abc").is_ok());
        assert!(validate_text(&"a".repeat(40)).is_ok());
        assert_eq!(
            validate_text(&"a".repeat(41)),
            Err(AddressFieldError::TooLong { max: 40 })
        );
    }

    #[test]
    fn test_validate_pin_code_range() {
        assert_eq!(validate_pin_code("100000"), Ok(100_000));
        assert_eq!(validate_pin_code("999999"), Ok(999_999));
        assert_eq!(
            validate_pin_code("99999"),
            Err(AddressFieldError::OutOfRange { digits: 6 })
        );
        assert_eq!(
            validate_pin_code("1000000"),
            Err(AddressFieldError::OutOfRange { digits: 6 })
        );
        assert_eq!(
            validate_pin_code("62a123"),
            Err(AddressFieldError::NotANumber)
        );
    }

    #[test]
    fn test_validate_contact_number_range() {
        assert_eq!(validate_contact_number("1000000000"), Ok(1_000_000_000));
        assert_eq!(validate_contact_number("9999999999"), Ok(9_999_999_999));
        assert_eq!(
            validate_contact_number("0999999999"),
            Err(AddressFieldError::OutOfRange { digits: 10 })
        );
        assert_eq!(
            validate_contact_number("10000000000"),
            Err(AddressFieldError::OutOfRange { digits: 10 })
        );
        assert_eq!(
            validate_contact_number("99999999999999999999999"),
            Err(AddressFieldError::OutOfRange { digits: 10 })
        );
        assert_eq!(
            validate_contact_number("-987654321"),
            Err(AddressFieldError::NotANumber)
        );
    }

    #[test]
    fn test_blank_draft_is_not_submittable() {
        let draft = AddressDraft::new();
        let validation = draft.validate();
        assert!(!validation.is_valid());
        assert_eq!(validation.invalid_fields(), AddressField::ALL.to_vec());
        assert!(
            validation
                .checks()
                .iter()
                .all(|c| c.error == Some(AddressFieldError::Missing))
        );
    }

    #[test]
    fn test_valid_draft_is_submittable() {
        let draft = valid_draft();
        assert!(draft.is_submittable());
        let body = draft.to_new_address().unwrap();
        assert_eq!(body.pin_code, 626_123);
        assert_eq!(body.contact_no, 9_876_543_210);
        assert_eq!(body.city, "Sivakasi");
    }

    #[test]
    fn test_single_invalid_field_blocks_submission() {
        let mut draft = valid_draft();
        draft.set(AddressField::PinCode, "12345");
        let validation = draft.validate();
        assert!(!validation.is_valid());
        assert_eq!(validation.invalid_fields(), vec![AddressField::PinCode]);
        assert_eq!(
            draft.to_new_address(),
            Err(vec![AddressField::PinCode])
        );
    }

    #[test]
    fn test_validation_does_not_mutate_draft() {
        let mut draft = AddressDraft::new();
        draft.set(AddressField::City, "X");
        let before = draft.clone();
        let check = draft.check_field(AddressField::City);
        assert_eq!(check.value.as_deref(), Some("X"));
        assert_eq!(check.error, Some(AddressFieldError::TooShort { min: 3 }));
        assert_eq!(draft, before);
    }

    #[test]
    fn test_whitespace_only_counts_as_missing() {
        assert_eq!(
            AddressField::State.check(Some("   ")),
            Err(AddressFieldError::Missing)
        );
    }

    #[test]
    fn test_padding_does_not_count_towards_length() {
        let mut draft = valid_draft();
        draft.set(AddressField::City, "  ab ");
        assert_eq!(
            draft.check_field(AddressField::City).error,
            Some(AddressFieldError::TooShort { min: 3 })
        );
        assert_eq!(draft.to_new_address(), Err(vec![AddressField::City]));

        draft.set(AddressField::City, "  Salem ");
        assert_eq!(draft.to_new_address().unwrap().city, "Salem");
    }

    #[test]
    fn test_new_address_wire_names() {
        let body = valid_draft().to_new_address().unwrap();
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["addressLine1"], "12 Temple Street");
        assert_eq!(json["pinCode"], 626_123);
        assert_eq!(json["alternateContact"], 9_123_456_780_u64);
    }

    #[test]
    fn test_address_accepts_numbers_or_strings() {
        let json = serde_json::json!({
            "id": 3,
            "addressLine1": "1 Main Road",
            "addressLine2": "Block B",
            "city": "Madurai",
            "state": "Tamil Nadu",
            "pinCode": 625_001,
            "contactNo": "9876501234",
            "alternateContact": null
        });
        let address: Address = serde_json::from_value(json).unwrap();
        assert_eq!(address.id, AddressId::new(3));
        assert_eq!(address.pin_code, "625001");
        assert_eq!(address.contact_no, "9876501234");
        assert_eq!(address.alternate_contact, "");
    }

    #[test]
    fn test_address_accepts_address_id_alias() {
        let json = serde_json::json!({ "addressId": 9, "city": "Chennai" });
        let address: Address = serde_json::from_value(json).unwrap();
        assert_eq!(address.id, AddressId::new(9));
        assert_eq!(address.city, "Chennai");
    }
}
