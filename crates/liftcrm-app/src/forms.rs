// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Result, bail};
use std::collections::BTreeMap;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Field {
    pub value: String,
    pub disabled: bool,
}

/// Named scalar inputs of one form plus their inline error messages.
///
/// Fields must be declared before they can be written; synchronizers skip
/// forms that lack one of their fields.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Form {
    fields: BTreeMap<String, Field>,
    errors: BTreeMap<String, String>,
}

impl Form {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_field(mut self, name: &str, value: &str) -> Self {
        self.declare(name, value);
        self
    }

    pub fn declare(&mut self, name: &str, value: &str) {
        self.fields.insert(
            name.to_owned(),
            Field {
                value: value.to_owned(),
                disabled: false,
            },
        );
    }

    pub fn has(&self, name: &str) -> bool {
        self.fields.contains_key(name)
    }

    pub fn value(&self, name: &str) -> Option<&str> {
        self.fields.get(name).map(|field| field.value.as_str())
    }

    pub fn field(&self, name: &str) -> Option<&Field> {
        self.fields.get(name)
    }

    pub fn fields(&self) -> impl Iterator<Item = (&str, &Field)> {
        self.fields
            .iter()
            .map(|(name, field)| (name.as_str(), field))
    }

    /// Programmatic write; ignores the disabled flag. Returns false when the
    /// field is not part of this form.
    pub fn set_value(&mut self, name: &str, value: &str) -> bool {
        match self.fields.get_mut(name) {
            Some(field) => {
                field.value = value.to_owned();
                true
            }
            None => false,
        }
    }

    /// User edit; rejected for unknown or disabled fields.
    pub fn input(&mut self, name: &str, value: &str) -> Result<()> {
        let Some(field) = self.fields.get_mut(name) else {
            bail!("form has no field {name:?}");
        };
        if field.disabled {
            bail!("field {name:?} is read-only -- uncheck the linked option to edit it");
        }
        field.value = value.to_owned();
        Ok(())
    }

    pub fn is_disabled(&self, name: &str) -> bool {
        self.fields.get(name).is_some_and(|field| field.disabled)
    }

    pub fn set_disabled(&mut self, name: &str, disabled: bool) -> bool {
        match self.fields.get_mut(name) {
            Some(field) => {
                field.disabled = disabled;
                true
            }
            None => false,
        }
    }

    pub fn is_checked(&self, name: &str) -> bool {
        matches!(self.value(name), Some("on" | "true" | "1"))
    }

    pub fn set_checked(&mut self, name: &str, checked: bool) -> bool {
        self.set_value(name, if checked { "on" } else { "" })
    }

    pub fn error(&self, name: &str) -> Option<&str> {
        self.errors.get(name).map(String::as_str)
    }

    pub fn errors(&self) -> impl Iterator<Item = (&str, &str)> {
        self.errors
            .iter()
            .map(|(name, message)| (name.as_str(), message.as_str()))
    }

    pub fn set_error(&mut self, name: &str, message: &str) {
        self.errors.insert(name.to_owned(), message.to_owned());
    }

    pub fn clear_error(&mut self, name: &str) {
        self.errors.remove(name);
    }

    pub fn clear_errors(&mut self) {
        self.errors.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::Form;

    #[test]
    fn input_rejects_disabled_and_unknown_fields() {
        let mut form = Form::new().with_field("office_address", "");
        form.set_disabled("office_address", true);

        let error = form
            .input("office_address", "Block B")
            .expect_err("disabled field should reject input");
        assert!(error.to_string().contains("read-only"));

        assert!(form.input("missing", "x").is_err());
    }

    #[test]
    fn set_value_only_touches_declared_fields() {
        let mut form = Form::new().with_field("load_kg", "");
        assert!(form.set_value("load_kg", "272"));
        assert!(!form.set_value("no_of_passengers", "4"));
        assert_eq!(form.value("load_kg"), Some("272"));
        assert!(!form.has("no_of_passengers"));
    }

    #[test]
    fn checkbox_values_round_trip() {
        let mut form = Form::new().with_field("same_as_site_address", "");
        assert!(!form.is_checked("same_as_site_address"));
        form.set_checked("same_as_site_address", true);
        assert!(form.is_checked("same_as_site_address"));
    }
}
