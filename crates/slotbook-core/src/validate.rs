// ── Form validation ──
//
// Required-field and phone checks shared by the interactive form state and
// the submission flow. Slot selection is not a form field and is reported
// separately from per-field errors.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, IntoEnumIterator};

use crate::error::CoreError;

pub const REQUIRED_MESSAGE: &str = "This field is required";
pub const PHONE_MESSAGE: &str = "Please enter a valid phone number (at least 10 digits)";
pub const MIN_PHONE_DIGITS: usize = 10;

/// The user-editable booking form fields. All of them are required.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Display, EnumIter,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Field {
    Name,
    Address,
    Phone,
    TestType,
}

impl Field {
    /// Human-readable label for prompts and messages.
    pub fn label(self) -> &'static str {
        match self {
            Self::Name => "Full name",
            Self::Address => "Address",
            Self::Phone => "Phone number",
            Self::TestType => "Test type",
        }
    }
}

/// Raw form values as entered.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormFields {
    pub name: String,
    pub address: String,
    pub phone: String,
    pub test_type: String,
}

impl FormFields {
    pub fn get(&self, field: Field) -> &str {
        match field {
            Field::Name => &self.name,
            Field::Address => &self.address,
            Field::Phone => &self.phone,
            Field::TestType => &self.test_type,
        }
    }

    pub fn set(&mut self, field: Field, value: String) {
        let slot = match field {
            Field::Name => &mut self.name,
            Field::Address => &mut self.address,
            Field::Phone => &mut self.phone,
            Field::TestType => &mut self.test_type,
        };
        *slot = value;
    }
}

// ── Phone normalization ─────────────────────────────────────────────

/// Strip everything but digits, keeping a `+` only in leading position.
///
/// `"(555) 123-4567 ext"` becomes `"5551234567"`.
pub fn normalize_phone(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        if c.is_ascii_digit() || (c == '+' && out.is_empty()) {
            out.push(c);
        }
    }
    out
}

pub fn phone_digit_count(value: &str) -> usize {
    value.chars().filter(char::is_ascii_digit).count()
}

// ── ValidationReport ────────────────────────────────────────────────

/// Outcome of validating the whole form plus slot selection.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationReport {
    /// Per-field messages, in field order.
    pub errors: BTreeMap<Field, String>,
    /// No time slot is selected.
    pub slot_missing: bool,
}

impl ValidationReport {
    pub fn is_ok(&self) -> bool {
        self.errors.is_empty() && !self.slot_missing
    }

    pub fn field_error(&self, field: Field) -> Option<&str> {
        self.errors.get(&field).map(String::as_str)
    }

    /// Field errors win over a missing slot; both block submission.
    pub fn into_result(self) -> Result<(), CoreError> {
        if !self.errors.is_empty() {
            return Err(CoreError::FieldValidation(self));
        }
        if self.slot_missing {
            return Err(CoreError::NoSlotSelected);
        }
        Ok(())
    }
}

impl fmt::Display for ValidationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for (field, message) in &self.errors {
            if !first {
                f.write_str("; ")?;
            }
            write!(f, "{}: {message}", field.label())?;
            first = false;
        }
        if self.slot_missing {
            if !first {
                f.write_str("; ")?;
            }
            f.write_str("no time slot selected")?;
        }
        Ok(())
    }
}

// ── Validator ───────────────────────────────────────────────────────

/// Field rules. Test types are checked against `test_types` when it is
/// non-empty; otherwise any non-blank code is accepted.
#[derive(Debug, Clone, Default)]
pub struct Validator {
    test_types: Vec<String>,
}

impl Validator {
    pub fn new(test_types: Vec<String>) -> Self {
        Self { test_types }
    }

    pub fn test_types(&self) -> &[String] {
        &self.test_types
    }

    /// Check one field value, returning the inline message on failure.
    pub fn validate_field(&self, field: Field, value: &str) -> Result<(), String> {
        let value = value.trim();
        if value.is_empty() {
            return Err(REQUIRED_MESSAGE.into());
        }

        match field {
            Field::Phone if phone_digit_count(value) < MIN_PHONE_DIGITS => {
                Err(PHONE_MESSAGE.into())
            }
            Field::TestType
                if !self.test_types.is_empty() && !self.test_types.iter().any(|t| t == value) =>
            {
                Err(format!(
                    "Unknown test type '{value}' (expected one of: {})",
                    self.test_types.join(", ")
                ))
            }
            _ => Ok(()),
        }
    }

    /// Validate every field and the slot selection.
    pub fn validate(&self, fields: &FormFields, selected_slot: Option<&str>) -> ValidationReport {
        let errors = Field::iter()
            .filter_map(|field| {
                self.validate_field(field, fields.get(field))
                    .err()
                    .map(|msg| (field, msg))
            })
            .collect();

        ValidationReport {
            errors,
            slot_missing: selected_slot.is_none_or(|s| s.trim().is_empty()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn filled() -> FormFields {
        FormFields {
            name: "Ada Lovelace".into(),
            address: "12 Analytical Way".into(),
            phone: "5551234567".into(),
            test_type: "B".into(),
        }
    }

    #[test]
    fn phone_is_normalized_to_digits() {
        assert_eq!(normalize_phone("(555) 123-4567 ext"), "5551234567");
        assert_eq!(normalize_phone("+44 20 7946 0958"), "+442079460958");
        assert_eq!(normalize_phone("555+123"), "555123");
        assert_eq!(normalize_phone("call me"), "");
    }

    #[test]
    fn normalized_phone_passes_validation() {
        let v = Validator::default();
        let phone = normalize_phone("(555) 123-4567 ext");
        assert_eq!(v.validate_field(Field::Phone, &phone), Ok(()));
    }

    #[test]
    fn short_phone_is_rejected() {
        let v = Validator::default();
        assert_eq!(
            v.validate_field(Field::Phone, "555-1234"),
            Err(PHONE_MESSAGE.to_owned())
        );
    }

    #[test]
    fn whitespace_only_is_missing() {
        let v = Validator::default();
        assert_eq!(
            v.validate_field(Field::Name, "   \t"),
            Err(REQUIRED_MESSAGE.to_owned())
        );
    }

    #[test]
    fn test_type_checked_against_configured_list() {
        let v = Validator::new(vec!["A".into(), "B".into()]);
        assert!(v.validate_field(Field::TestType, "B").is_ok());
        assert!(v.validate_field(Field::TestType, "Z").is_err());

        let open = Validator::default();
        assert!(open.validate_field(Field::TestType, "Z").is_ok());
    }

    #[test]
    fn complete_form_with_slot_is_ok() {
        let report = Validator::default().validate(&filled(), Some("08:00 - 08:40"));
        assert!(report.is_ok());
        assert!(report.into_result().is_ok());
    }

    #[test]
    fn missing_slot_is_reported_separately() {
        let report = Validator::default().validate(&filled(), None);
        assert!(report.errors.is_empty());
        assert!(report.slot_missing);
        assert!(matches!(report.into_result(), Err(CoreError::NoSlotSelected)));
    }

    #[test]
    fn every_empty_field_is_reported() {
        let report = Validator::default().validate(&FormFields::default(), None);
        assert_eq!(report.errors.len(), 4);
        assert_eq!(report.field_error(Field::Address), Some(REQUIRED_MESSAGE));
        assert!(matches!(
            report.into_result(),
            Err(CoreError::FieldValidation(r)) if r.slot_missing
        ));
    }
}
