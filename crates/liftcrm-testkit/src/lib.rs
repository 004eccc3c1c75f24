// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use liftcrm_app::{
    ApiError, ApiResponse, CustomerDetails, CustomerId, InvoiceApi, InvoicePayload,
    LookupEntity, LookupId, LookupKind,
};
use rust_decimal::Decimal;
use std::cell::RefCell;
use std::collections::BTreeMap;

const CUSTOMER_SITES: [&str; 4] = [
    "Sunrise Towers",
    "Lakeview Residency",
    "Metro Mall",
    "City Hospital",
];

const AMC_TYPES: [&str; 3] = ["Comprehensive", "Non-Comprehensive", "Labour Only"];

const ITEMS: [(&str, i64); 4] = [
    ("Wire rope", 450_000),
    ("Door sensor", 125_050),
    ("Controller board", 2_800_000),
    ("Landing button", 35_000),
];

/// One request observed by `FakeApi`, e.g. `"POST customers"`.
pub type Call = String;

#[derive(Debug, Default)]
struct FakeState {
    lookups: BTreeMap<LookupKind, Vec<LookupEntity>>,
    details: BTreeMap<i64, CustomerDetails>,
    next_id: i64,
    calls: Vec<Call>,
    submissions: Vec<(String, InvoicePayload)>,
    offline: bool,
    reject_next: Option<String>,
    fail_next: Option<ApiError>,
    submit_message: Option<String>,
}

/// In-memory stand-in for the invoice server. Mirrors its validation rules:
/// blank and duplicate labels are rejected with HTTP 400, unknown ids with
/// 404.
#[derive(Debug, Default)]
pub struct FakeApi {
    state: RefCell<FakeState>,
}

impl FakeApi {
    pub fn new() -> Self {
        let api = Self::default();
        api.state.borrow_mut().next_id = 100;
        api
    }

    /// Seeded with a few customers, AMC types and priced items.
    pub fn seeded() -> Self {
        let api = Self::new();
        {
            let mut state = api.state.borrow_mut();
            let customers = CUSTOMER_SITES
                .iter()
                .zip(1..)
                .map(|(site, id)| LookupEntity::site(id, site))
                .collect();
            state.lookups.insert(LookupKind::Customer, customers);

            let amc_types = AMC_TYPES
                .iter()
                .zip(1..)
                .map(|(name, id)| LookupEntity::named(id, name))
                .collect();
            state.lookups.insert(LookupKind::AmcType, amc_types);

            let items = ITEMS
                .iter()
                .zip(1..)
                .map(|((name, paise), id)| LookupEntity {
                    sale_price: Some(Decimal::new(*paise, 2)),
                    ..LookupEntity::named(id, name)
                })
                .collect();
            state.lookups.insert(LookupKind::Item, items);

            state.details.insert(
                1,
                CustomerDetails {
                    site_address: Some("Plot 7, Ring Road".to_owned()),
                    job_no: Some("JOB-0107".to_owned()),
                },
            );
            state.details.insert(
                2,
                CustomerDetails {
                    site_address: Some("Lake Road".to_owned()),
                    job_no: None,
                },
            );
        }
        api
    }

    pub fn with_lookups(self, kind: LookupKind, entities: Vec<LookupEntity>) -> Self {
        self.state.borrow_mut().lookups.insert(kind, entities);
        self
    }

    /// Every call fails with a transport error while offline.
    pub fn set_offline(&self, offline: bool) {
        self.state.borrow_mut().offline = offline;
    }

    /// The next mutating call answers `{success: false, error: message}`.
    pub fn reject_next(&self, message: &str) {
        self.state.borrow_mut().reject_next = Some(message.to_owned());
    }

    /// The next mutating call fails with `error`, e.g. a 500 whose body did
    /// not decode.
    pub fn fail_next(&self, error: ApiError) {
        self.state.borrow_mut().fail_next = Some(error);
    }

    pub fn set_submit_message(&self, message: &str) {
        self.state.borrow_mut().submit_message = Some(message.to_owned());
    }

    pub fn calls(&self) -> Vec<Call> {
        self.state.borrow().calls.clone()
    }

    pub fn clear_calls(&self) {
        self.state.borrow_mut().calls.clear();
    }

    pub fn submissions(&self) -> Vec<(String, InvoicePayload)> {
        self.state.borrow().submissions.clone()
    }

    pub fn labels(&self, kind: LookupKind) -> Vec<String> {
        self.state
            .borrow()
            .lookups
            .get(&kind)
            .map(|entities| entities.iter().map(LookupEntity::label).collect())
            .unwrap_or_default()
    }

    fn record(&self, call: String) -> Result<(), ApiError> {
        let mut state = self.state.borrow_mut();
        state.calls.push(call);
        if state.offline {
            return Err(ApiError::Transport {
                url: "http://fake.invalid".to_owned(),
                reason: "offline".to_owned(),
            });
        }
        Ok(())
    }

    fn take_rejection(&self) -> Result<(), ApiError> {
        let mut state = self.state.borrow_mut();
        if let Some(error) = state.fail_next.take() {
            return Err(error);
        }
        match state.reject_next.take() {
            Some(message) => Err(ApiError::Rejected {
                message: Some(message),
            }),
            None => Ok(()),
        }
    }

    fn check_label(&self, kind: LookupKind, label: &str, except: Option<LookupId>) -> Result<(), ApiError> {
        let label = label.trim();
        if label.is_empty() {
            let field = match kind {
                LookupKind::Customer => "Site name",
                _ => "Name",
            };
            return Err(bad_request(&format!("{field} is required")));
        }
        let state = self.state.borrow();
        let duplicate = state.lookups.get(&kind).is_some_and(|entities| {
            entities
                .iter()
                .any(|entity| Some(entity.id) != except && entity.label() == label)
        });
        if duplicate {
            return Err(bad_request(&format!("{} already exists", kind.title())));
        }
        Ok(())
    }
}

fn bad_request(message: &str) -> ApiError {
    ApiError::Status {
        status: 400,
        message: Some(message.to_owned()),
    }
}

fn not_found(kind: LookupKind) -> ApiError {
    ApiError::Status {
        status: 404,
        message: Some(format!("{} not found", kind.title())),
    }
}

fn labelled(kind: LookupKind, id: LookupId, label: &str) -> LookupEntity {
    match kind {
        LookupKind::Customer => LookupEntity::site(id.get(), label),
        LookupKind::AmcType | LookupKind::Item => LookupEntity::named(id.get(), label),
    }
}

impl InvoiceApi for FakeApi {
    fn list_lookups(&self, kind: LookupKind) -> Result<Vec<LookupEntity>, ApiError> {
        self.record(format!("GET {}", kind.endpoint()))?;
        let mut entities = self
            .state
            .borrow()
            .lookups
            .get(&kind)
            .cloned()
            .unwrap_or_default();
        entities.sort_by_key(LookupEntity::label);
        Ok(entities)
    }

    fn create_lookup(&self, kind: LookupKind, label: &str) -> Result<ApiResponse, ApiError> {
        self.record(format!("POST {}", kind.endpoint()))?;
        self.take_rejection()?;
        self.check_label(kind, label, None)?;

        let mut state = self.state.borrow_mut();
        state.next_id += 1;
        let id = LookupId::new(state.next_id);
        let entity = labelled(kind, id, label.trim());
        state.lookups.entry(kind).or_default().push(entity.clone());
        Ok(ApiResponse {
            success: true,
            id: Some(id),
            site_name: entity.site_name,
            name: entity.name,
            ..ApiResponse::default()
        })
    }

    fn update_lookup(
        &self,
        kind: LookupKind,
        id: LookupId,
        label: &str,
    ) -> Result<ApiResponse, ApiError> {
        self.record(format!("PUT {}/{id}", kind.endpoint()))?;
        self.take_rejection()?;
        self.check_label(kind, label, Some(id))?;

        let mut state = self.state.borrow_mut();
        let entity = state
            .lookups
            .get_mut(&kind)
            .and_then(|entities| entities.iter_mut().find(|entity| entity.id == id))
            .ok_or_else(|| not_found(kind))?;
        *entity = labelled(kind, id, label.trim());
        Ok(ApiResponse {
            message: Some(format!("{} updated", kind.title())),
            ..ApiResponse::ok()
        })
    }

    fn delete_lookup(&self, kind: LookupKind, id: LookupId) -> Result<ApiResponse, ApiError> {
        self.record(format!("DELETE {}/{id}", kind.endpoint()))?;
        self.take_rejection()?;

        let mut state = self.state.borrow_mut();
        let entities = state.lookups.entry(kind).or_default();
        let before = entities.len();
        entities.retain(|entity| entity.id != id);
        if entities.len() == before {
            return Err(not_found(kind));
        }
        Ok(ApiResponse {
            message: Some(format!("{} deleted", kind.title())),
            ..ApiResponse::ok()
        })
    }

    fn customer_details(&self, id: CustomerId) -> Result<CustomerDetails, ApiError> {
        self.record(format!("GET customer/{id}"))?;
        self.state
            .borrow()
            .details
            .get(&id.get())
            .cloned()
            .ok_or(ApiError::Status {
                status: 404,
                message: None,
            })
    }

    fn submit_invoice(
        &self,
        submit_url: &str,
        payload: &InvoicePayload,
    ) -> Result<ApiResponse, ApiError> {
        self.record(format!("POST {submit_url}"))?;
        self.take_rejection()?;

        let mut state = self.state.borrow_mut();
        state
            .submissions
            .push((submit_url.to_owned(), payload.clone()));
        Ok(ApiResponse {
            message: state.submit_message.clone(),
            ..ApiResponse::ok()
        })
    }
}
