// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use std::time::{Duration, Instant};

use crate::ToastId;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToastKind {
    Success,
    Error,
    Warning,
    Info,
}

impl ToastKind {
    pub const fn title(self) -> &'static str {
        match self {
            Self::Success => "Success",
            Self::Error => "Error",
            Self::Warning => "Warning",
            Self::Info => "Info",
        }
    }

    pub const fn lifetime(self) -> Duration {
        match self {
            Self::Success => Duration::from_secs(3),
            Self::Error | Self::Warning | Self::Info => Duration::from_secs(5),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Toast {
    pub id: ToastId,
    pub kind: ToastKind,
    pub message: String,
    pub description: Option<String>,
    pub expires_at: Instant,
}

impl Toast {
    pub fn render(&self) -> String {
        match &self.description {
            Some(description) => {
                format!("{}: {}\n  {}", self.kind.title(), self.message, description)
            }
            None => format!("{}: {}", self.kind.title(), self.message),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct ToastNotifier {
    toasts: Vec<Toast>,
    next_id: i64,
}

impl ToastNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn show(
        &mut self,
        kind: ToastKind,
        message: &str,
        description: Option<&str>,
        now: Instant,
    ) -> ToastId {
        self.next_id += 1;
        let id = ToastId::new(self.next_id);
        self.toasts.push(Toast {
            id,
            kind,
            message: message.to_owned(),
            description: description
                .filter(|text| !text.is_empty())
                .map(str::to_owned),
            expires_at: now + kind.lifetime(),
        });
        id
    }

    pub fn success(&mut self, message: &str, now: Instant) -> ToastId {
        self.show(ToastKind::Success, message, None, now)
    }

    pub fn error(&mut self, message: &str, now: Instant) -> ToastId {
        self.show(ToastKind::Error, message, None, now)
    }

    pub fn dismiss(&mut self, id: ToastId) -> bool {
        let before = self.toasts.len();
        self.toasts.retain(|toast| toast.id != id);
        self.toasts.len() != before
    }

    /// Drops every toast whose lifetime has elapsed at `now`.
    pub fn expire(&mut self, now: Instant) -> usize {
        let before = self.toasts.len();
        self.toasts.retain(|toast| toast.expires_at > now);
        before - self.toasts.len()
    }

    /// Visible toasts, oldest first.
    pub fn toasts(&self) -> &[Toast] {
        &self.toasts
    }

    pub fn latest(&self) -> Option<&Toast> {
        self.toasts.last()
    }

    pub fn clear(&mut self) {
        self.toasts.clear();
    }
}
