// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use rust_decimal::Decimal;
use serde::Serialize;
use std::collections::BTreeMap;
use std::time::{Duration, Instant};

use crate::numeric::decimal_or_zero;
use crate::{Form, LineItem, SelectControl};

pub const REDIRECT_DELAY: Duration = Duration::from_secs(2);
pub const BUSY_LABEL: &str = "Saving...";

/// `(field, message)` for every field that must be filled before submit.
pub const REQUIRED_FIELDS: [(&str, &str); 3] = [
    ("customer", "Customer is required"),
    ("start_date", "Start date is required"),
    ("due_date", "Due date is required"),
];

/// Host-page settings for one invoice form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmitConfig {
    pub submit_url: String,
    pub home_url: String,
    pub edit_mode: bool,
}

impl SubmitConfig {
    pub fn create(submit_url: &str, home_url: &str) -> Self {
        Self {
            submit_url: submit_url.to_owned(),
            home_url: home_url.to_owned(),
            edit_mode: false,
        }
    }

    pub fn edit(submit_url: &str, home_url: &str) -> Self {
        Self {
            edit_mode: true,
            ..Self::create(submit_url, home_url)
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InvoicePayload {
    pub customer: Option<i64>,
    pub amc_type: Option<i64>,
    #[serde(with = "rust_decimal::serde::float")]
    pub discount: Decimal,
    /// Remaining scalar fields, sent as typed.
    #[serde(flatten)]
    pub fields: BTreeMap<String, String>,
    pub items: Vec<LineItem>,
}

impl InvoicePayload {
    /// Collects every enabled scalar field of `form` plus the two selects
    /// and the serialized line items.
    pub fn assemble(
        form: &Form,
        customer: &SelectControl,
        amc_type: &SelectControl,
        items: Vec<LineItem>,
    ) -> Self {
        let mut fields = BTreeMap::new();
        let mut discount = Decimal::ZERO;
        for (name, field) in form.fields() {
            if field.disabled || name.starts_with("items[") {
                continue;
            }
            match name {
                "discount" => discount = decimal_or_zero(&field.value),
                "customer" | "amc_type" | "items" => {}
                _ => {
                    fields.insert(name.to_owned(), field.value.clone());
                }
            }
        }
        Self {
            customer: customer.selected().map(|id| id.get()),
            amc_type: amc_type.selected().map(|id| id.get()),
            discount,
            fields,
            items,
        }
    }
}

/// Marks each missing required field with its inline message and clears the
/// messages of the ones that are filled.
pub fn validate_invoice(form: &mut Form, customer: &SelectControl) -> bool {
    let mut valid = true;
    for (name, message) in REQUIRED_FIELDS {
        let filled = match name {
            "customer" => customer.selected().is_some(),
            _ => form
                .value(name)
                .is_some_and(|value| !value.trim().is_empty()),
        };
        if filled {
            form.clear_error(name);
        } else {
            form.set_error(name, message);
            valid = false;
        }
    }
    valid
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitPhase {
    Idle,
    Submitting,
    Redirecting { to: String, at: Instant },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// Validation failed; field errors are on the form. No request was made.
    Invalid,
    /// A submission is already in flight or a redirect is pending.
    Busy,
    Saved {
        message: String,
        redirect_to: String,
        redirect_at: Instant,
    },
    Failed { message: String },
}

/// Submit button and lifecycle of one submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmitController {
    config: SubmitConfig,
    phase: SubmitPhase,
    idle_label: String,
    button_label: String,
    button_disabled: bool,
}

impl SubmitController {
    pub fn new(config: SubmitConfig) -> Self {
        let idle_label = if config.edit_mode {
            "Update Invoice"
        } else {
            "Save Invoice"
        }
        .to_owned();
        Self {
            config,
            phase: SubmitPhase::Idle,
            button_label: idle_label.clone(),
            idle_label,
            button_disabled: false,
        }
    }

    pub fn config(&self) -> &SubmitConfig {
        &self.config
    }

    pub fn phase(&self) -> &SubmitPhase {
        &self.phase
    }

    pub fn button_label(&self) -> &str {
        &self.button_label
    }

    pub fn button_disabled(&self) -> bool {
        self.button_disabled
    }

    /// Idle -> Submitting. Refused in any other phase.
    pub fn begin(&mut self) -> bool {
        if self.phase != SubmitPhase::Idle {
            return false;
        }
        self.phase = SubmitPhase::Submitting;
        self.button_label = BUSY_LABEL.to_owned();
        self.button_disabled = true;
        true
    }

    /// Submitting -> Redirecting. The button label is restored but the
    /// button stays disabled until the page navigates away.
    pub fn succeed(&mut self, now: Instant) -> Instant {
        let at = now + REDIRECT_DELAY;
        self.phase = SubmitPhase::Redirecting {
            to: self.config.home_url.clone(),
            at,
        };
        self.button_label = self.idle_label.clone();
        at
    }

    /// Submitting -> Idle with the button restored.
    pub fn fail(&mut self) {
        self.phase = SubmitPhase::Idle;
        self.button_label = self.idle_label.clone();
        self.button_disabled = false;
    }

    /// Target URL once the redirect delay has elapsed.
    pub fn redirect_due(&self, now: Instant) -> Option<&str> {
        match &self.phase {
            SubmitPhase::Redirecting { to, at } if now >= *at => Some(to),
            _ => None,
        }
    }

    pub fn success_message(&self, server: Option<&str>) -> String {
        match server.filter(|text| !text.is_empty()) {
            Some(text) => text.to_owned(),
            None if self.config.edit_mode => "Invoice updated successfully".to_owned(),
            None => "Invoice created successfully".to_owned(),
        }
    }

    pub fn failure_message(server: Option<&str>) -> String {
        server
            .filter(|text| !text.is_empty())
            .unwrap_or("Failed to save invoice")
            .to_owned()
    }
}
