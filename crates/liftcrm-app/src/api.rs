// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use thiserror::Error;

use crate::{ApiResponse, CustomerDetails, CustomerId, InvoicePayload, LookupEntity, LookupId, LookupKind};

/// Failure of one API call. Every variant is recoverable: callers log it and
/// surface it inline or as a toast.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ApiError {
    #[error("cannot reach {url} ({reason})")]
    Transport { url: String, reason: String },
    #[error("server returned {status}{}", suffix(.message))]
    Status {
        status: u16,
        message: Option<String>,
    },
    #[error("request rejected by server{}", suffix(.message))]
    Rejected { message: Option<String> },
    #[error("decode {what}: {reason}")]
    Decode { what: String, reason: String },
}

impl ApiError {
    /// Message the server attached to the failure, if any.
    pub fn server_message(&self) -> Option<&str> {
        match self {
            Self::Status { message, .. } | Self::Rejected { message } => {
                message.as_deref().filter(|text| !text.is_empty())
            }
            Self::Transport { .. } | Self::Decode { .. } => None,
        }
    }
}

fn suffix(message: &Option<String>) -> String {
    match message.as_deref() {
        Some(text) if !text.is_empty() => format!(": {text}"),
        _ => String::new(),
    }
}

/// Turns an application-level `{success: false}` body into `ApiError::Rejected`.
pub fn require_success(response: ApiResponse) -> Result<ApiResponse, ApiError> {
    if response.success {
        Ok(response)
    } else {
        Err(ApiError::Rejected {
            message: response.error,
        })
    }
}

/// Server operations the invoice page depends on.
pub trait InvoiceApi {
    fn list_lookups(&self, kind: LookupKind) -> Result<Vec<LookupEntity>, ApiError>;

    fn create_lookup(&self, kind: LookupKind, label: &str) -> Result<ApiResponse, ApiError>;

    fn update_lookup(
        &self,
        kind: LookupKind,
        id: LookupId,
        label: &str,
    ) -> Result<ApiResponse, ApiError>;

    fn delete_lookup(&self, kind: LookupKind, id: LookupId) -> Result<ApiResponse, ApiError>;

    fn customer_details(&self, id: CustomerId) -> Result<CustomerDetails, ApiError>;

    fn submit_invoice(
        &self,
        submit_url: &str,
        payload: &InvoicePayload,
    ) -> Result<ApiResponse, ApiError>;
}
