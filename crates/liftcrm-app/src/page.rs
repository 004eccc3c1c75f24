// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Result, bail};
use std::time::Instant;

use crate::{
    ApiError, Form, InvoiceApi, InvoicePayload, InvoiceStatus, InvoiceTotals, LineItemEditor,
    Listing, LookupEntity, LookupId, LookupKind, LookupModal, LookupOption, PaymentTerm,
    RowIndex, SaveRequest, SelectControl, SubmitConfig, SubmitController, SubmitOutcome, SubmitPhase,
    ToastNotifier, fetch_options, load_item_choices, load_options, validate_invoice,
};
use crate::numeric::decimal_or_zero;

/// Scalar inputs every invoice form starts with.
pub const INVOICE_FIELDS: [&str; 3] = ["start_date", "due_date", "discount"];

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SaveOutcome {
    /// Input was blank; the inline error is on the session.
    Invalid,
    Saved { id: LookupId, label: String },
    Failed { message: String },
    /// Nothing to save: the modal is closed.
    NotOpen,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeleteOutcome {
    Cancelled,
    Deleted,
    Failed { message: String },
}

/// Invoice add/edit page: selects, line items, the lookup modal, toasts and
/// the submit button, wired to an `InvoiceApi`.
#[derive(Debug, Clone)]
pub struct InvoicePage {
    pub form: Form,
    pub items: LineItemEditor,
    customer: SelectControl,
    amc_type: SelectControl,
    modal: LookupModal,
    toasts: ToastNotifier,
    submit: SubmitController,
}

impl InvoicePage {
    pub fn new(config: SubmitConfig) -> Self {
        let mut form = Form::new();
        for name in INVOICE_FIELDS {
            form.declare(name, "");
        }
        form.declare("payment_term", PaymentTerm::default().as_str());
        form.declare("status", InvoiceStatus::default().as_str());

        Self {
            form,
            items: LineItemEditor::new(),
            customer: SelectControl::new(LookupKind::Customer),
            amc_type: SelectControl::new(LookupKind::AmcType),
            modal: LookupModal::new(),
            toasts: ToastNotifier::new(),
            submit: SubmitController::new(config),
        }
    }

    /// Page-load step: fills both selects, keeping the ids the host page
    /// says are currently referenced.
    pub fn initialize<A: InvoiceApi + ?Sized>(
        &mut self,
        api: &A,
        current_customer: Option<LookupId>,
        current_amc_type: Option<LookupId>,
    ) {
        load_options(api, LookupKind::Customer, &mut self.customer, current_customer);
        load_options(api, LookupKind::AmcType, &mut self.amc_type, current_amc_type);
    }

    pub fn select(&self, kind: LookupKind) -> Option<&SelectControl> {
        match kind {
            LookupKind::Customer => Some(&self.customer),
            LookupKind::AmcType => Some(&self.amc_type),
            LookupKind::Item => None,
        }
    }

    pub fn select_mut(&mut self, kind: LookupKind) -> Option<&mut SelectControl> {
        match kind {
            LookupKind::Customer => Some(&mut self.customer),
            LookupKind::AmcType => Some(&mut self.amc_type),
            LookupKind::Item => None,
        }
    }

    pub fn modal(&self) -> &LookupModal {
        &self.modal
    }

    pub fn modal_mut(&mut self) -> &mut LookupModal {
        &mut self.modal
    }

    pub fn toasts(&self) -> &ToastNotifier {
        &self.toasts
    }

    pub fn toasts_mut(&mut self) -> &mut ToastNotifier {
        &mut self.toasts
    }

    pub fn submit_controller(&self) -> &SubmitController {
        &self.submit
    }

    /// Invoice totals over the lines that would be submitted.
    pub fn totals(&self) -> InvoiceTotals {
        let discount = decimal_or_zero(self.form.value("discount").unwrap_or_default());
        InvoiceTotals::compute(self.items.saved_totals(), discount)
    }

    /// Adds a blank line row and fills its item selector. A failed item
    /// fetch leaves the row with no choices.
    pub fn add_item_row<A: InvoiceApi + ?Sized>(&mut self, api: &A) -> RowIndex {
        let index = self.items.add_row();
        match load_item_choices(api) {
            Ok(choices) => {
                self.items.set_item_choices(index, choices);
            }
            Err(error) => tracing::warn!(row = %index, %error, "loading item choices failed"),
        }
        index
    }

    pub fn open_modal<A: InvoiceApi + ?Sized>(
        &mut self,
        api: &A,
        kind: LookupKind,
        editing_id: Option<LookupId>,
        editing_label: &str,
    ) -> Result<()> {
        self.modal.open(kind, editing_id, editing_label)?;
        self.refresh_listing(api, kind);
        Ok(())
    }

    pub fn close_modal(&mut self) {
        self.modal.close();
    }

    pub fn save_modal<A: InvoiceApi + ?Sized>(&mut self, api: &A, now: Instant) -> SaveOutcome {
        if !self.modal.is_open() {
            return SaveOutcome::NotOpen;
        }
        let Some(request) = self.modal.begin_save() else {
            return SaveOutcome::Invalid;
        };

        let SaveRequest {
            kind,
            editing_id,
            label,
        } = request;
        let verb = if editing_id.is_some() { "update" } else { "add" };
        let result = match editing_id {
            Some(id) => api.update_lookup(kind, id, &label),
            None => api.create_lookup(kind, &label),
        };

        let response = match result {
            Ok(response) => response,
            Err(error) => {
                tracing::warn!(endpoint = kind.endpoint(), %error, "{verb} lookup failed");
                let message = error
                    .server_message()
                    .map(str::to_owned)
                    .unwrap_or_else(|| format!("Failed to {verb} {}", kind.noun()));
                self.modal.fail(&message);
                return SaveOutcome::Failed { message };
            }
        };

        let saved_label = response.label().unwrap_or(label.as_str()).to_owned();
        let saved_id = match (editing_id, response.id) {
            (Some(id), _) => id,
            (None, Some(id)) => id,
            (None, None) => {
                let message = format!("Failed to {verb} {}", kind.noun());
                tracing::warn!(endpoint = kind.endpoint(), "create response carried no id");
                self.modal.fail(&message);
                return SaveOutcome::Failed { message };
            }
        };

        if let Some(select) = self.select_mut(kind) {
            if editing_id.is_some() {
                select.rename(saved_id, &saved_label);
            } else {
                select.push_selected(LookupOption::new(saved_id, saved_label.clone()));
            }
        }

        self.modal.close();
        let done = if editing_id.is_some() { "updated" } else { "added" };
        self.toasts
            .success(&format!("{} {done} successfully", kind.title()), now);
        tracing::info!(endpoint = kind.endpoint(), id = %saved_id, "lookup {done}");

        // Modal is closed; its list reloads on the next open.
        self.reload_select(api, kind);
        SaveOutcome::Saved {
            id: saved_id,
            label: saved_label,
        }
    }

    /// Deletes one lookup entry after `confirm` approves the prompt. Kinds
    /// without delete endpoints fail before anything is asked or sent.
    pub fn delete_lookup<A, C>(
        &mut self,
        api: &A,
        kind: LookupKind,
        id: LookupId,
        confirm: C,
        now: Instant,
    ) -> Result<DeleteOutcome>
    where
        A: InvoiceApi + ?Sized,
        C: FnOnce(&str) -> bool,
    {
        if !kind.is_editable() {
            bail!("{} cannot be deleted here", kind.plural());
        }
        if !confirm(&format!("Are you sure you want to delete this {}?", kind.noun())) {
            return Ok(DeleteOutcome::Cancelled);
        }

        let outcome = match api.delete_lookup(kind, id) {
            Ok(_) => {
                if let Some(select) = self.select_mut(kind) {
                    select.remove(id);
                }
                self.toasts
                    .success(&format!("{} deleted successfully", kind.title()), now);
                tracing::info!(endpoint = kind.endpoint(), id = %id, "lookup deleted");
                self.refresh_listing(api, kind);
                self.reload_select(api, kind);
                DeleteOutcome::Deleted
            }
            Err(error) => {
                tracing::warn!(endpoint = kind.endpoint(), id = %id, %error, "delete lookup failed");
                let message = error
                    .server_message()
                    .map(str::to_owned)
                    .unwrap_or_else(|| format!("Failed to delete {}", kind.noun()));
                self.toasts.error(&message, now);
                DeleteOutcome::Failed { message }
            }
        };
        Ok(outcome)
    }

    /// Validates, then posts the invoice once. Validation failures and a
    /// pending submission never reach the API.
    pub fn submit<A: InvoiceApi + ?Sized>(&mut self, api: &A, now: Instant) -> SubmitOutcome {
        if self.submit.phase() != &SubmitPhase::Idle {
            return SubmitOutcome::Busy;
        }
        if !validate_invoice(&mut self.form, &self.customer) {
            return SubmitOutcome::Invalid;
        }
        if !self.submit.begin() {
            return SubmitOutcome::Busy;
        }

        let payload = self.payload();
        let submit_url = self.submit.config().submit_url.clone();
        match api.submit_invoice(&submit_url, &payload) {
            Ok(response) => {
                let message = self.submit.success_message(response.message.as_deref());
                self.toasts.success(&message, now);
                let redirect_at = self.submit.succeed(now);
                tracing::info!(items = payload.items.len(), "invoice saved");
                SubmitOutcome::Saved {
                    message,
                    redirect_to: self.submit.config().home_url.clone(),
                    redirect_at,
                }
            }
            Err(error) => {
                tracing::error!(%error, "saving invoice failed");
                // A status without a server message means the body never decoded.
                let message = match (&error, error.server_message()) {
                    (ApiError::Rejected { .. }, server) | (ApiError::Status { .. }, server @ Some(_)) => {
                        SubmitController::failure_message(server)
                    }
                    _ => "An error occurred while saving the invoice".to_owned(),
                };
                self.toasts.error(&message, now);
                self.submit.fail();
                SubmitOutcome::Failed { message }
            }
        }
    }

    pub fn payload(&self) -> InvoicePayload {
        InvoicePayload::assemble(
            &self.form,
            &self.customer,
            &self.amc_type,
            self.items.serialize(),
        )
    }

    /// Clears inline validation messages and returns where to navigate.
    pub fn cancel(&mut self) -> &str {
        self.form.clear_errors();
        &self.submit.config().home_url
    }

    fn refresh_listing<A: InvoiceApi + ?Sized>(&mut self, api: &A, kind: LookupKind) {
        if !self.modal.is_open() {
            return;
        }
        let listing = match fetch_options(api, kind, LookupEntity::to_option) {
            Ok(rows) => Listing::Rows(rows),
            Err(error) => {
                tracing::warn!(endpoint = kind.endpoint(), %error, "loading modal list failed");
                Listing::Failed
            }
        };
        self.modal.set_listing(kind, listing);
    }

    fn reload_select<A: InvoiceApi + ?Sized>(&mut self, api: &A, kind: LookupKind) {
        if let Some(select) = self.select_mut(kind) {
            let current = select.selected();
            load_options(api, kind, select, current);
        }
    }
}
