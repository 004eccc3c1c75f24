// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::ids::*;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum LookupKind {
    Customer,
    AmcType,
    Item,
}

impl LookupKind {
    pub const ALL: [Self; 3] = [Self::Customer, Self::AmcType, Self::Item];

    /// Path segment under `/invoice/api/`.
    pub const fn endpoint(self) -> &'static str {
        match self {
            Self::Customer => "customers",
            Self::AmcType => "amc-types",
            Self::Item => "items",
        }
    }

    /// Name of the form field that holds the selected id.
    pub const fn field_name(self) -> &'static str {
        match self {
            Self::Customer => "customer",
            Self::AmcType => "amc_type",
            Self::Item => "item",
        }
    }

    pub const fn title(self) -> &'static str {
        match self {
            Self::Customer => "Customer",
            Self::AmcType => "AMC Type",
            Self::Item => "Item",
        }
    }

    pub const fn noun(self) -> &'static str {
        match self {
            Self::Customer => "customer",
            Self::AmcType => "AMC type",
            Self::Item => "item",
        }
    }

    pub const fn plural(self) -> &'static str {
        match self {
            Self::Customer => "customers",
            Self::AmcType => "AMC types",
            Self::Item => "items",
        }
    }

    /// Only customers and AMC types expose create/update/delete endpoints.
    pub const fn is_editable(self) -> bool {
        matches!(self, Self::Customer | Self::AmcType)
    }

    pub fn placeholder(self) -> String {
        format!("Select {}", self.title())
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim() {
            "customers" | "customer" => Some(Self::Customer),
            "amc-types" | "amc_type" | "amc-type" | "amc_types" => Some(Self::AmcType),
            "items" | "item" => Some(Self::Item),
            _ => None,
        }
    }
}

/// One record from a lookup list endpoint. Customers carry `site_name`, the
/// other kinds carry `name`; items also report a sale price.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LookupEntity {
    pub id: LookupId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub site_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sale_price: Option<Decimal>,
}

impl LookupEntity {
    pub fn named(id: i64, name: &str) -> Self {
        Self {
            id: LookupId::new(id),
            site_name: None,
            name: Some(name.to_owned()),
            sale_price: None,
        }
    }

    pub fn site(id: i64, site_name: &str) -> Self {
        Self {
            id: LookupId::new(id),
            site_name: Some(site_name.to_owned()),
            name: None,
            sale_price: None,
        }
    }

    pub fn label(&self) -> String {
        non_empty(self.site_name.as_deref())
            .or_else(|| non_empty(self.name.as_deref()))
            .unwrap_or_default()
            .to_owned()
    }

    /// Label used by line-item selectors: `"{name} - ₹{price}"`.
    pub fn priced_label(&self) -> String {
        match self.sale_price {
            Some(price) => format!("{} - ₹{}", self.label(), price),
            None => self.label(),
        }
    }

    pub fn to_option(&self) -> LookupOption {
        LookupOption {
            id: self.id,
            label: self.label(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LookupOption {
    pub id: LookupId,
    pub label: String,
}

impl LookupOption {
    pub fn new(id: LookupId, label: impl Into<String>) -> Self {
        Self {
            id,
            label: label.into(),
        }
    }
}

/// Body of every mutating lookup call and of invoice submission.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiResponse {
    #[serde(default)]
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<LookupId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub site_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ApiResponse {
    pub fn ok() -> Self {
        Self {
            success: true,
            ..Self::default()
        }
    }

    pub fn label(&self) -> Option<&str> {
        non_empty(self.site_name.as_deref()).or_else(|| non_empty(self.name.as_deref()))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomerDetails {
    #[serde(default)]
    pub site_address: Option<String>,
    #[serde(default)]
    pub job_no: Option<String>,
}

impl CustomerDetails {
    pub fn get(&self, key: &str) -> Option<&str> {
        let value = match key {
            "site_address" => self.site_address.as_deref(),
            "job_no" => self.job_no.as_deref(),
            _ => None,
        };
        non_empty(value)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentTerm {
    #[default]
    Cash,
    Cheque,
    Neft,
}

impl PaymentTerm {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Cash => "cash",
            Self::Cheque => "cheque",
            Self::Neft => "neft",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "cash" => Some(Self::Cash),
            "cheque" => Some(Self::Cheque),
            "neft" => Some(Self::Neft),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InvoiceStatus {
    #[default]
    Open,
    Paid,
    PartiallyPaid,
}

impl InvoiceStatus {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Open => "open",
            Self::Paid => "paid",
            Self::PartiallyPaid => "partially_paid",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "open" => Some(Self::Open),
            "paid" => Some(Self::Paid),
            "partially_paid" => Some(Self::PartiallyPaid),
            _ => None,
        }
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|text| !text.is_empty())
}
