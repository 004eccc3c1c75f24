// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Result, bail};

use crate::{LookupId, LookupKind, LookupOption};

/// Contents of the modal's management table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Listing {
    Loading,
    Rows(Vec<LookupOption>),
    Failed,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModalSession {
    pub kind: LookupKind,
    /// `None` creates a new entry, `Some` updates that entry.
    pub editing_id: Option<LookupId>,
    pub input: String,
    pub error: Option<String>,
    pub listing: Listing,
}

impl ModalSession {
    pub fn title(&self) -> String {
        match self.editing_id {
            Some(_) => format!("Edit {}", self.kind.title()),
            None => format!("Add New {}", self.kind.title()),
        }
    }

    pub fn save_label(&self) -> String {
        match self.editing_id {
            Some(_) => format!("Update {}", self.kind.title()),
            None => format!("Add {}", self.kind.title()),
        }
    }

    pub fn save_enabled(&self) -> bool {
        !self.input.trim().is_empty()
    }

    /// Table lines as displayed, including the empty and error rows.
    pub fn listing_lines(&self) -> Vec<String> {
        match &self.listing {
            Listing::Loading => Vec::new(),
            Listing::Rows(rows) if rows.is_empty() => {
                vec![format!("No {} found", self.kind.plural())]
            }
            Listing::Rows(rows) => rows.iter().map(|row| row.label.clone()).collect(),
            Listing::Failed => vec![format!("Error loading {}", self.kind.plural())],
        }
    }
}

/// Validated save request produced from an open session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SaveRequest {
    pub kind: LookupKind,
    pub editing_id: Option<LookupId>,
    pub label: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LookupModal {
    session: Option<ModalSession>,
}

impl LookupModal {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_open(&self) -> bool {
        self.session.is_some()
    }

    pub fn session(&self) -> Option<&ModalSession> {
        self.session.as_ref()
    }

    /// Opens (or re-targets) the modal. Any previous session is replaced.
    pub fn open(
        &mut self,
        kind: LookupKind,
        editing_id: Option<LookupId>,
        editing_label: &str,
    ) -> Result<()> {
        if !kind.is_editable() {
            bail!(
                "{} cannot be edited here -- manage them from their own admin page",
                kind.plural()
            );
        }
        self.session = Some(ModalSession {
            kind,
            editing_id,
            input: editing_label.to_owned(),
            error: None,
            listing: Listing::Loading,
        });
        Ok(())
    }

    pub fn close(&mut self) {
        self.session = None;
    }

    pub fn set_input(&mut self, value: &str) -> bool {
        match self.session.as_mut() {
            Some(session) => {
                session.input = value.to_owned();
                true
            }
            None => false,
        }
    }

    /// Applies a freshly loaded list when it belongs to the open session.
    pub fn set_listing(&mut self, kind: LookupKind, listing: Listing) {
        if let Some(session) = self.session.as_mut()
            && session.kind == kind
        {
            session.listing = listing;
        }
    }

    /// Validates the input. A blank value records an inline error and
    /// yields nothing; the session stays open either way.
    pub fn begin_save(&mut self) -> Option<SaveRequest> {
        let session = self.session.as_mut()?;
        let label = session.input.trim();
        if label.is_empty() {
            session.error = Some(format!("Please enter a {}", session.kind.noun()));
            return None;
        }
        session.error = None;
        Some(SaveRequest {
            kind: session.kind,
            editing_id: session.editing_id,
            label: label.to_owned(),
        })
    }

    pub fn fail(&mut self, message: &str) {
        if let Some(session) = self.session.as_mut() {
            session.error = Some(message.to_owned());
        }
    }
}
