// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Context, Result, bail};
use liftcrm_app::{
    ExistingRow, InvoicePage, InvoiceStatus, LineColumn, LineItemEditor, LookupId, LookupKind,
    PaymentTerm, parse_iso_date,
};
use rust_decimal::Decimal;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

/// Draft keys with their own typed setting; `[fields]` may not repeat them.
const RESERVED_FIELDS: [&str; 7] = [
    "customer",
    "amc_type",
    "start_date",
    "due_date",
    "discount",
    "payment_term",
    "status",
];

/// Invoice form contents read from a TOML file.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Draft {
    pub customer: Option<i64>,
    pub amc_type: Option<i64>,
    pub start_date: Option<String>,
    pub due_date: Option<String>,
    pub discount: Option<Decimal>,
    pub payment_term: Option<String>,
    pub status: Option<String>,
    /// Overrides `[invoice].submit_url`, e.g. `/invoice/edit/INV004/`.
    pub submit_url: Option<String>,
    /// Newest stored reference; a new invoice previews the one after it.
    pub last_reference: Option<String>,
    /// Further scalar inputs sent as typed.
    #[serde(default)]
    pub fields: BTreeMap<String, String>,
    #[serde(default)]
    pub items: Vec<DraftItem>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DraftItem {
    pub item: Option<i64>,
    pub rate: Option<Decimal>,
    pub qty: Option<i64>,
    pub tax: Option<Decimal>,
}

impl DraftItem {
    fn to_existing(&self) -> ExistingRow {
        ExistingRow {
            item: self.item.map(LookupId::new),
            rate: text(self.rate),
            quantity: self.qty.map(|qty| qty.to_string()).unwrap_or_else(|| "1".to_owned()),
            tax: text(self.tax),
        }
    }
}

fn text(value: Option<Decimal>) -> String {
    value.map(|value| value.to_string()).unwrap_or_default()
}

impl Draft {
    pub fn load(path: &Path) -> Result<Self> {
        let raw = fs::read_to_string(path)
            .with_context(|| format!("read invoice draft {}", path.display()))?;
        let draft: Draft = toml::from_str(&raw)
            .with_context(|| format!("parse invoice draft {}", path.display()))?;
        draft
            .validate()
            .with_context(|| format!("invalid invoice draft {}", path.display()))?;
        Ok(draft)
    }

    fn validate(&self) -> Result<()> {
        for (key, value) in [("start_date", &self.start_date), ("due_date", &self.due_date)] {
            if let Some(value) = value
                && !value.is_empty()
                && parse_iso_date(value).is_none()
            {
                bail!("{key} must be YYYY-MM-DD, got {value:?}");
            }
        }
        if let Some(term) = &self.payment_term
            && PaymentTerm::parse(term).is_none()
        {
            bail!("payment_term must be one of cash, cheque, neft; got {term:?}");
        }
        if let Some(status) = &self.status
            && InvoiceStatus::parse(status).is_none()
        {
            bail!("status must be one of open, paid, partially_paid; got {status:?}");
        }
        for name in self.fields.keys() {
            if name == "items" || name.starts_with("items[") {
                bail!("line items go in [[items]], not fields.{name}");
            }
            if RESERVED_FIELDS.contains(&name.as_str()) {
                bail!("fields.{name} is a typed key; set `{name}` at the top of the draft");
            }
        }
        Ok(())
    }

    pub fn current(&self, kind: LookupKind) -> Option<LookupId> {
        match kind {
            LookupKind::Customer => self.customer.map(LookupId::new),
            LookupKind::AmcType => self.amc_type.map(LookupId::new),
            LookupKind::Item => None,
        }
    }

    /// Fills an initialized page. Ids must be present in the loaded selects.
    pub fn apply(&self, page: &mut InvoicePage, edit_mode: bool) -> Result<()> {
        for kind in [LookupKind::Customer, LookupKind::AmcType] {
            let Some(id) = self.current(kind) else {
                continue;
            };
            let Some(select) = page.select_mut(kind) else {
                continue;
            };
            if !select.select(Some(id)) {
                bail!("{} {id} is not in the {} list", kind.noun(), kind.noun());
            }
        }

        let scalars = [
            ("start_date", self.start_date.clone()),
            ("due_date", self.due_date.clone()),
            ("discount", self.discount.map(|value| value.to_string())),
            ("payment_term", self.payment_term.clone()),
            ("status", self.status.clone()),
        ];
        for (name, value) in scalars {
            if let Some(value) = value {
                page.form.set_value(name, &value);
            }
        }
        for (name, value) in &self.fields {
            page.form.declare(name, value);
        }

        if edit_mode {
            page.items =
                LineItemEditor::with_existing(self.items.iter().map(DraftItem::to_existing).collect());
            return Ok(());
        }
        for item in &self.items {
            let row = item.to_existing();
            let index = page.items.add_row();
            page.items.select_item(index, row.item);
            page.items.input(index, LineColumn::Rate, &row.rate);
            page.items.input(index, LineColumn::Quantity, &row.quantity);
            page.items.input(index, LineColumn::Tax, &row.tax);
        }
        Ok(())
    }
}
