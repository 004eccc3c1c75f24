// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use crate::{LookupId, LookupKind, LookupOption};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SelectContent {
    /// Placeholder followed by the loaded options.
    Options,
    /// Single disabled entry carrying this label.
    Failed(String),
}

/// Single-select control backed by a lookup list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectControl {
    kind: LookupKind,
    placeholder: String,
    options: Vec<LookupOption>,
    selected: Option<LookupId>,
    content: SelectContent,
}

impl SelectControl {
    pub fn new(kind: LookupKind) -> Self {
        Self {
            kind,
            placeholder: kind.placeholder(),
            options: Vec::new(),
            selected: None,
            content: SelectContent::Options,
        }
    }

    pub fn kind(&self) -> LookupKind {
        self.kind
    }

    pub fn placeholder(&self) -> &str {
        &self.placeholder
    }

    pub fn options(&self) -> &[LookupOption] {
        &self.options
    }

    pub fn content(&self) -> &SelectContent {
        &self.content
    }

    pub fn is_failed(&self) -> bool {
        matches!(self.content, SelectContent::Failed(_))
    }

    pub fn selected(&self) -> Option<LookupId> {
        self.selected
    }

    pub fn selected_option(&self) -> Option<&LookupOption> {
        let id = self.selected?;
        self.options.iter().find(|option| option.id == id)
    }

    /// Form value: the selected id, or empty for the placeholder.
    pub fn value(&self) -> String {
        self.selected.map(|id| id.to_string()).unwrap_or_default()
    }

    pub fn contains(&self, id: LookupId) -> bool {
        self.options.iter().any(|option| option.id == id)
    }

    pub fn label_of(&self, id: LookupId) -> Option<&str> {
        self.options
            .iter()
            .find(|option| option.id == id)
            .map(|option| option.label.as_str())
    }

    /// Selects `id` if it is one of the options; `None` picks the placeholder.
    pub fn select(&mut self, id: Option<LookupId>) -> bool {
        match id {
            Some(id) if self.contains(id) => {
                self.selected = Some(id);
                true
            }
            Some(_) => false,
            None => {
                self.selected = None;
                true
            }
        }
    }

    /// Replaces every option. `current` stays selected when it is still
    /// present; later duplicates of an id are dropped.
    pub fn rebuild(&mut self, options: Vec<LookupOption>, current: Option<LookupId>) {
        let mut unique: Vec<LookupOption> = Vec::with_capacity(options.len());
        for option in options {
            if !unique.iter().any(|seen| seen.id == option.id) {
                unique.push(option);
            }
        }
        self.options = unique;
        self.content = SelectContent::Options;
        self.selected = current.filter(|id| self.contains(*id));
    }

    pub fn fail(&mut self) {
        self.options.clear();
        self.selected = None;
        self.content = SelectContent::Failed(format!("Error loading {}", self.kind.plural()));
    }

    /// Appends a freshly created option and selects it. An existing option
    /// with the same id is renamed instead.
    pub fn push_selected(&mut self, option: LookupOption) {
        let id = option.id;
        if !self.rename(id, &option.label) {
            self.options.push(option);
            self.content = SelectContent::Options;
        }
        self.selected = Some(id);
    }

    pub fn rename(&mut self, id: LookupId, label: &str) -> bool {
        match self.options.iter_mut().find(|option| option.id == id) {
            Some(option) => {
                option.label = label.to_owned();
                true
            }
            None => false,
        }
    }

    /// Removes the option with `id`; the selection falls back to the
    /// placeholder when it pointed at the removed option.
    pub fn remove(&mut self, id: LookupId) -> bool {
        let before = self.options.len();
        self.options.retain(|option| option.id != id);
        if self.selected == Some(id) {
            self.selected = None;
        }
        self.options.len() != before
    }

    /// Visible entries in display order, placeholder first.
    pub fn labels(&self) -> Vec<String> {
        match &self.content {
            SelectContent::Failed(label) => vec![label.clone()],
            SelectContent::Options => std::iter::once(self.placeholder.clone())
                .chain(self.options.iter().map(|option| option.label.clone()))
                .collect(),
        }
    }
}
