// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

//! Field synchronizers: each one derives a target field from a source field
//! when its trigger fires. Missing fields make a synchronizer a no-op.

use time::macros::format_description;
use time::{Date, Month};

use crate::numeric::parse_int_prefix;
use crate::{CustomerId, Form, InvoiceApi};

/// Rated load per passenger, in kilograms.
pub const LOAD_KG_PER_PASSENGER: i64 = 68;

/// Copies `source` into `target` while `toggle` is checked, and locks the
/// target against manual edits for as long as it stays checked.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MirrorLock {
    pub toggle: String,
    pub source: String,
    pub target: String,
}

impl MirrorLock {
    pub fn new(toggle: &str, source: &str, target: &str) -> Self {
        Self {
            toggle: toggle.to_owned(),
            source: source.to_owned(),
            target: target.to_owned(),
        }
    }

    /// Customer form: office address follows the site address.
    pub fn office_address() -> Self {
        Self::new("same_as_site_address", "site_address", "office_address")
    }

    fn applies_to(&self, form: &Form) -> bool {
        form.has(&self.toggle) && form.has(&self.source) && form.has(&self.target)
    }

    /// Page-load behavior: a pre-checked toggle syncs and locks immediately.
    pub fn init(&self, form: &mut Form) {
        if self.applies_to(form) && form.is_checked(&self.toggle) {
            self.copy(form);
            form.set_disabled(&self.target, true);
        }
    }

    pub fn on_toggle(&self, form: &mut Form, checked: bool) {
        if !self.applies_to(form) {
            return;
        }
        form.set_checked(&self.toggle, checked);
        if checked {
            self.copy(form);
        }
        form.set_disabled(&self.target, checked);
    }

    /// Runs after every edit of the source field.
    pub fn on_source_input(&self, form: &mut Form) {
        if self.applies_to(form) && form.is_checked(&self.toggle) {
            self.copy(form);
        }
    }

    fn copy(&self, form: &mut Form) {
        let value = form.value(&self.source).unwrap_or_default().to_owned();
        form.set_value(&self.target, &value);
    }
}

/// Sets `end` to the same calendar date one year after `start`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DateOffset {
    pub start: String,
    pub end: String,
}

impl DateOffset {
    pub fn new(start: &str, end: &str) -> Self {
        Self {
            start: start.to_owned(),
            end: end.to_owned(),
        }
    }

    /// AMC contract form: contracts run for one year.
    pub fn amc_contract() -> Self {
        Self::new("start_date", "end_date")
    }

    /// Returns true when the end date was written.
    pub fn on_change(&self, form: &mut Form) -> bool {
        let Some(start) = form.value(&self.start).and_then(parse_iso_date) else {
            return false;
        };
        let Some(end) = one_year_after(start) else {
            return false;
        };
        form.set_value(&self.end, &format_iso_date(end))
    }
}

pub fn parse_iso_date(raw: &str) -> Option<Date> {
    let raw = raw.trim();
    let date_part = raw.split_once('T').map_or(raw, |(date, _)| date);
    Date::parse(date_part, format_description!("[year]-[month]-[day]")).ok()
}

pub fn format_iso_date(date: Date) -> String {
    date.format(format_description!("[year]-[month]-[day]"))
        .unwrap_or_default()
}

/// Feb 29 rolls over to Mar 1 when the next year has no leap day.
pub fn one_year_after(date: Date) -> Option<Date> {
    let year = date.year().checked_add(1)?;
    match date.replace_year(year) {
        Ok(next) => Some(next),
        Err(_) => Date::from_calendar_date(year, Month::March, 1).ok(),
    }
}

/// Sets `target` to `source * factor` when `source` parses as a positive
/// integer; anything else leaves the target alone.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinearDerivation {
    pub source: String,
    pub target: String,
    pub factor: i64,
}

impl LinearDerivation {
    pub fn new(source: &str, target: &str, factor: i64) -> Self {
        Self {
            source: source.to_owned(),
            target: target.to_owned(),
            factor,
        }
    }

    /// Lift form: rated load from the passenger count.
    pub fn lift_load() -> Self {
        Self::new("no_of_passengers", "load_kg", LOAD_KG_PER_PASSENGER)
    }

    pub fn derive(&self, raw: &str) -> Option<i64> {
        let count = parse_int_prefix(raw).filter(|count| *count > 0)?;
        count.checked_mul(self.factor)
    }

    pub fn on_input(&self, form: &mut Form) -> bool {
        if !form.has(&self.target) {
            return false;
        }
        let Some(value) = form.value(&self.source).and_then(|raw| self.derive(raw)) else {
            return false;
        };
        form.set_value(&self.target, &value.to_string())
    }
}

/// Fetches the customer selected in `source` and copies the named detail
/// fields into form fields. Failures are logged and otherwise ignored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteFill {
    pub source: String,
    /// `(detail key, target field)` pairs.
    pub mappings: Vec<(String, String)>,
}

impl RemoteFill {
    pub fn new(source: &str, mappings: &[(&str, &str)]) -> Self {
        Self {
            source: source.to_owned(),
            mappings: mappings
                .iter()
                .map(|(key, target)| ((*key).to_owned(), (*target).to_owned()))
                .collect(),
        }
    }

    /// AMC form: site address and job number come from the chosen customer.
    pub fn amc_customer() -> Self {
        Self::new(
            "customer",
            &[("site_address", "latitude"), ("job_no", "equipment_no")],
        )
    }

    /// Returns the number of target fields written.
    pub fn on_change<A: InvoiceApi + ?Sized>(&self, form: &mut Form, api: &A) -> usize {
        let Some(id) = form
            .value(&self.source)
            .map(str::trim)
            .filter(|raw| !raw.is_empty())
            .and_then(|raw| raw.parse::<i64>().ok())
        else {
            return 0;
        };

        let details = match api.customer_details(CustomerId::new(id)) {
            Ok(details) => details,
            Err(error) => {
                tracing::debug!(customer_id = id, %error, "customer detail fill skipped");
                return 0;
            }
        };

        let mut written = 0;
        for (key, target) in &self.mappings {
            if let Some(value) = details.get(key)
                && form.set_value(target, value)
            {
                written += 1;
            }
        }
        written
    }
}
