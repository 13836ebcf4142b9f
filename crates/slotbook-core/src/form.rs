// ── Interactive form state ──
//
// Tracks field values plus which fields are currently marked invalid, so a
// view can give feedback on blur and keep re-checking a field once it has
// failed. The phone field is normalized on every input.

use std::collections::BTreeMap;

use crate::validate::{Field, FormFields, ValidationReport, Validator, normalize_phone};

#[derive(Debug, Clone, Default)]
pub struct FormState {
    fields: FormFields,
    invalid: BTreeMap<Field, String>,
    validator: Validator,
}

impl FormState {
    pub fn new(validator: Validator) -> Self {
        Self {
            fields: FormFields::default(),
            invalid: BTreeMap::new(),
            validator,
        }
    }

    pub fn fields(&self) -> &FormFields {
        &self.fields
    }

    pub fn validator(&self) -> &Validator {
        &self.validator
    }

    /// Inline message currently shown for `field`, if it is marked invalid.
    pub fn error(&self, field: Field) -> Option<&str> {
        self.invalid.get(&field).map(String::as_str)
    }

    /// Record new input for a field.
    ///
    /// The phone value is normalized and always revalidated; other fields
    /// are only revalidated while already marked invalid. Returns the value
    /// as stored.
    pub fn input(&mut self, field: Field, value: &str) -> &str {
        let stored = if field == Field::Phone {
            normalize_phone(value)
        } else {
            value.to_owned()
        };
        self.fields.set(field, stored);

        if field == Field::Phone || self.invalid.contains_key(&field) {
            self.check(field);
        }

        self.fields.get(field)
    }

    /// The field lost focus: validate it and update its mark.
    pub fn blur(&mut self, field: Field) -> Result<(), String> {
        self.check(field)
    }

    /// Validate every field, marking each one, plus the slot selection.
    pub fn validate_all(&mut self, selected_slot: Option<&str>) -> ValidationReport {
        let report = self.validator.validate(&self.fields, selected_slot);
        self.invalid.clone_from(&report.errors);
        report
    }

    /// Whether the submit action should be enabled right now.
    pub fn submit_enabled(&self, slot_selected: bool) -> bool {
        slot_selected
            && self
                .validator
                .validate(&self.fields, Some("selected"))
                .errors
                .is_empty()
    }

    /// Clear values and validation marks.
    pub fn reset(&mut self) {
        self.fields = FormFields::default();
        self.invalid.clear();
    }

    fn check(&mut self, field: Field) -> Result<(), String> {
        let result = self.validator.validate_field(field, self.fields.get(field));
        match &result {
            Ok(()) => {
                self.invalid.remove(&field);
            }
            Err(message) => {
                self.invalid.insert(field, message.clone());
            }
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validate::{PHONE_MESSAGE, REQUIRED_MESSAGE};

    fn complete(form: &mut FormState) {
        form.input(Field::Name, "Ada");
        form.input(Field::Address, "1 Loop Rd");
        form.input(Field::Phone, "5551234567");
        form.input(Field::TestType, "B");
    }

    #[test]
    fn phone_input_is_normalized_and_checked() {
        let mut form = FormState::default();
        assert_eq!(form.input(Field::Phone, "(555) 123"), "555123");
        assert_eq!(form.error(Field::Phone), Some(PHONE_MESSAGE));

        assert_eq!(form.input(Field::Phone, "(555) 123-4567 ext"), "5551234567");
        assert_eq!(form.error(Field::Phone), None);
    }

    #[test]
    fn other_fields_revalidate_only_after_an_error() {
        let mut form = FormState::default();
        form.input(Field::Name, "");
        assert_eq!(form.error(Field::Name), None, "no feedback before blur");

        assert!(form.blur(Field::Name).is_err());
        assert_eq!(form.error(Field::Name), Some(REQUIRED_MESSAGE));

        form.input(Field::Name, "Ada");
        assert_eq!(form.error(Field::Name), None, "cleared on input after error");
    }

    #[test]
    fn submit_requires_valid_fields_and_slot() {
        let mut form = FormState::default();
        assert!(!form.submit_enabled(true));

        complete(&mut form);
        assert!(!form.submit_enabled(false));
        assert!(form.submit_enabled(true));

        form.input(Field::Phone, "123");
        assert!(!form.submit_enabled(true));
    }

    #[test]
    fn validate_all_marks_every_field() {
        let mut form = FormState::default();
        let report = form.validate_all(None);
        assert!(report.slot_missing);
        assert_eq!(form.error(Field::TestType), Some(REQUIRED_MESSAGE));
    }

    #[test]
    fn reset_clears_values_and_marks() {
        let mut form = FormState::default();
        complete(&mut form);
        form.input(Field::Phone, "1");
        form.reset();
        assert_eq!(form.fields(), &FormFields::default());
        assert_eq!(form.error(Field::Phone), None);
    }
}
