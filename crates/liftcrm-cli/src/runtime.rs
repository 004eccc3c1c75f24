// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Context, Result, bail};
use liftcrm_app::{
    DateOffset, DeleteOutcome, Form, InvoiceApi, InvoicePage, LinearDerivation, LookupEntity, LookupId,
    LookupKind, SaveOutcome, SubmitConfig, SubmitOutcome, fetch_options,
    load_item_choices, next_reference,
};
use std::io::{BufRead, Write};
use std::time::Instant;

use crate::draft::Draft;

/// Runs CLI commands against an `InvoiceApi`, writing results to `out`.
pub struct Runtime<'a, A: InvoiceApi + ?Sized, W: Write> {
    api: &'a A,
    submit_url: String,
    home_url: String,
    out: W,
}

impl<'a, A: InvoiceApi + ?Sized, W: Write> Runtime<'a, A, W> {
    pub fn new(api: &'a A, submit_url: &str, home_url: &str, out: W) -> Self {
        Self {
            api,
            submit_url: submit_url.to_owned(),
            home_url: home_url.to_owned(),
            out,
        }
    }

    pub fn into_output(self) -> W {
        self.out
    }

    fn page(&self, edit_mode: bool, submit_url: Option<&str>) -> InvoicePage {
        let submit_url = submit_url.unwrap_or(&self.submit_url);
        let config = if edit_mode {
            SubmitConfig::edit(submit_url, &self.home_url)
        } else {
            SubmitConfig::create(submit_url, &self.home_url)
        };
        InvoicePage::new(config)
    }

    fn print_toasts(&mut self, page: &InvoicePage) -> Result<()> {
        for toast in page.toasts().toasts() {
            writeln!(self.out, "{}", toast.render())?;
        }
        Ok(())
    }

    pub fn list(&mut self, kind: LookupKind) -> Result<()> {
        let options = match kind {
            LookupKind::Item => load_item_choices(self.api),
            _ => fetch_options(self.api, kind, LookupEntity::to_option),
        }
        .map_err(|error| anyhow::Error::new(error).context(format!("Error loading {}", kind.plural())))?;

        if options.is_empty() {
            writeln!(self.out, "No {} found", kind.plural())?;
        }
        for option in options {
            writeln!(self.out, "{}\t{}", option.id, option.label)?;
        }
        Ok(())
    }

    pub fn add(&mut self, kind: LookupKind, label: &str) -> Result<LookupId> {
        self.save(kind, None, label)
    }

    pub fn rename(&mut self, kind: LookupKind, id: LookupId, label: &str) -> Result<LookupId> {
        self.save(kind, Some(id), label)
    }

    fn save(&mut self, kind: LookupKind, id: Option<LookupId>, label: &str) -> Result<LookupId> {
        let mut page = self.page(false, None);
        page.initialize(self.api, None, None);
        page.open_modal(self.api, kind, id, "")?;
        page.modal_mut().set_input(label);

        match page.save_modal(self.api, Instant::now()) {
            SaveOutcome::Saved { id, label } => {
                self.print_toasts(&page)?;
                writeln!(self.out, "{id}\t{label}")?;
                Ok(id)
            }
            SaveOutcome::Failed { message } => bail!(message),
            SaveOutcome::Invalid => {
                let message = page
                    .modal()
                    .session()
                    .and_then(|session| session.error.clone())
                    .unwrap_or_else(|| format!("Please enter a {}", kind.noun()));
                bail!(message)
            }
            SaveOutcome::NotOpen => bail!("{} dialog is not open", kind.noun()),
        }
    }

    /// `confirm` answers the delete prompt; it is skipped when `assume_yes`.
    pub fn delete<R: BufRead>(
        &mut self,
        kind: LookupKind,
        id: LookupId,
        assume_yes: bool,
        input: &mut R,
    ) -> Result<bool> {
        let mut page = self.page(false, None);
        page.initialize(self.api, None, None);

        let mut prompt_error = None;
        let out = &mut self.out;
        let confirm = |prompt: &str| {
            if assume_yes {
                return true;
            }
            match ask(out, input, prompt) {
                Ok(answer) => answer,
                Err(error) => {
                    prompt_error = Some(error);
                    false
                }
            }
        };
        let outcome = page.delete_lookup(self.api, kind, id, confirm, Instant::now())?;
        if let Some(error) = prompt_error {
            return Err(error.context("read confirmation"));
        }

        self.print_toasts(&page)?;
        match outcome {
            DeleteOutcome::Deleted => Ok(true),
            DeleteOutcome::Cancelled => {
                writeln!(self.out, "Cancelled")?;
                Ok(false)
            }
            DeleteOutcome::Failed { message } => bail!(message),
        }
    }

    pub fn submit(&mut self, draft: &Draft, edit_mode: bool) -> Result<SubmitOutcome> {
        let mut page = self.page(edit_mode, draft.submit_url.as_deref());
        page.initialize(
            self.api,
            draft.current(LookupKind::Customer),
            draft.current(LookupKind::AmcType),
        );
        draft.apply(&mut page, edit_mode)?;

        if !edit_mode {
            let reference = next_reference(draft.last_reference.as_deref());
            writeln!(self.out, "Reference {reference}")?;
        }
        let totals = page.totals();
        writeln!(
            self.out,
            "Subtotal {:.2}  Discount {:.2}  Total {:.2}",
            totals.subtotal, totals.discount_amount, totals.total
        )?;

        let outcome = page.submit(self.api, Instant::now());
        match &outcome {
            SubmitOutcome::Invalid => {
                for (field, message) in page.form.errors() {
                    writeln!(self.out, "{field}: {message}")?;
                }
                bail!("invoice is incomplete; fill the fields above in the draft");
            }
            SubmitOutcome::Busy => bail!("a submission is already in progress"),
            SubmitOutcome::Saved { redirect_to, .. } => {
                self.print_toasts(&page)?;
                writeln!(self.out, "Redirect: {redirect_to}")?;
            }
            SubmitOutcome::Failed { message } => {
                self.print_toasts(&page)?;
                bail!("{message}");
            }
        }
        Ok(outcome)
    }

    pub fn load_kg(&mut self, passengers: &str) -> Result<()> {
        let derivation = LinearDerivation::lift_load();
        let mut form = Form::new()
            .with_field(&derivation.source, passengers)
            .with_field(&derivation.target, "");
        if !derivation.on_input(&mut form) {
            bail!("passenger count must be a positive whole number, got {passengers:?}");
        }
        writeln!(self.out, "{}", form.value(&derivation.target).unwrap_or_default())?;
        Ok(())
    }

    pub fn end_date(&mut self, start: &str) -> Result<()> {
        let offset = DateOffset::amc_contract();
        let mut form = Form::new()
            .with_field(&offset.start, start)
            .with_field(&offset.end, "");
        if !offset.on_change(&mut form) {
            bail!("start date must be YYYY-MM-DD, got {start:?}");
        }
        writeln!(self.out, "{}", form.value(&offset.end).unwrap_or_default())?;
        Ok(())
    }
}

fn ask<W: Write, R: BufRead>(out: &mut W, input: &mut R, prompt: &str) -> Result<bool> {
    write!(out, "{prompt} [y/N] ")?;
    out.flush()?;
    let mut answer = String::new();
    input.read_line(&mut answer).context("read answer")?;
    Ok(matches!(answer.trim(), "y" | "Y" | "yes" | "Yes"))
}
