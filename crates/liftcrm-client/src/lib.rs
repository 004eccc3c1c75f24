// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Context, Result, bail};
use liftcrm_app::{
    ApiError, ApiResponse, CustomerDetails, CustomerId, InvoiceApi, InvoicePayload, LookupEntity,
    LookupId, LookupKind, require_success,
};
use reqwest::Method;
use reqwest::StatusCode;
use reqwest::blocking::{Client as HttpClient, RequestBuilder, Response};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use std::time::Duration;
use url::Url;

pub const CSRF_HEADER: &str = "X-CSRFToken";

/// Blocking client for the invoice server's JSON endpoints.
#[derive(Debug, Clone)]
pub struct Client {
    base_url: Url,
    csrf_token: Option<String>,
    timeout: Duration,
    http: HttpClient,
}

impl Client {
    pub fn new(base_url: &str, csrf_token: Option<&str>, timeout: Duration) -> Result<Self> {
        let trimmed = base_url.trim();
        if trimmed.is_empty() {
            bail!("server.base_url must not be empty");
        }
        let mut base_url =
            Url::parse(trimmed).with_context(|| format!("parse server.base_url {trimmed:?}"))?;
        if !matches!(base_url.scheme(), "http" | "https") {
            bail!(
                "server.base_url must use http or https, got {:?}",
                base_url.scheme()
            );
        }
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }

        let http = HttpClient::builder()
            .timeout(timeout)
            .build()
            .context("build HTTP client")?;

        Ok(Self {
            base_url,
            csrf_token: csrf_token
                .map(str::trim)
                .filter(|token| !token.is_empty())
                .map(str::to_owned),
            timeout,
            http,
        })
    }

    pub fn base_url(&self) -> &str {
        self.base_url.as_str()
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Confirms the server answers the customer list.
    pub fn ping(&self) -> Result<usize> {
        let customers = self
            .list_lookups(LookupKind::Customer)
            .with_context(|| format!("check server at {}", self.base_url))?;
        Ok(customers.len())
    }

    /// Resolves `path` against the base URL. Absolute URLs pass through.
    pub fn resolve(&self, path: &str) -> Result<Url, ApiError> {
        self.base_url
            .join(path.trim_start_matches('/'))
            .map_err(|error| ApiError::Transport {
                url: path.to_owned(),
                reason: error.to_string(),
            })
    }

    fn lookup_url(&self, kind: LookupKind, id: Option<LookupId>) -> Result<Url, ApiError> {
        match id {
            Some(id) => self.resolve(&format!("invoice/api/{}/{id}/", kind.endpoint())),
            None => self.resolve(&format!("invoice/api/{}/", kind.endpoint())),
        }
    }

    fn request(&self, method: Method, url: &Url) -> RequestBuilder {
        let builder = self.http.request(method, url.clone());
        match &self.csrf_token {
            Some(token) => builder.header(CSRF_HEADER, token),
            None => builder,
        }
    }

    fn send(&self, builder: RequestBuilder, url: &Url) -> Result<Response, ApiError> {
        let response = builder
            .send()
            .map_err(|error| connection_error(url, &error))?;
        let status = response.status();
        tracing::debug!(%url, status = status.as_u16(), "invoice api response");
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(clean_error_response(status, &body));
        }
        Ok(response)
    }

    fn send_json<T: DeserializeOwned>(
        &self,
        builder: RequestBuilder,
        url: &Url,
        what: &str,
    ) -> Result<T, ApiError> {
        let response = self.send(builder, url)?;
        response.json().map_err(|error| ApiError::Decode {
            what: what.to_owned(),
            reason: error.to_string(),
        })
    }

    fn mutate(
        &self,
        method: Method,
        url: &Url,
        body: Option<&LabelBody<'_>>,
    ) -> Result<ApiResponse, ApiError> {
        let mut builder = self.request(method, url);
        if let Some(body) = body {
            builder = builder.json(body);
        }
        let response: ApiResponse = self.send_json(builder, url, "lookup response")?;
        require_success(response)
    }
}

impl InvoiceApi for Client {
    fn list_lookups(&self, kind: LookupKind) -> Result<Vec<LookupEntity>, ApiError> {
        let url = self.lookup_url(kind, None)?;
        self.send_json(self.request(Method::GET, &url), &url, kind.plural())
    }

    fn create_lookup(&self, kind: LookupKind, label: &str) -> Result<ApiResponse, ApiError> {
        let url = self.lookup_url(kind, None)?;
        self.mutate(Method::POST, &url, Some(&LabelBody::new(label)))
    }

    fn update_lookup(
        &self,
        kind: LookupKind,
        id: LookupId,
        label: &str,
    ) -> Result<ApiResponse, ApiError> {
        let url = self.lookup_url(kind, Some(id))?;
        self.mutate(Method::PUT, &url, Some(&LabelBody::new(label)))
    }

    fn delete_lookup(&self, kind: LookupKind, id: LookupId) -> Result<ApiResponse, ApiError> {
        let url = self.lookup_url(kind, Some(id))?;
        self.mutate(Method::DELETE, &url, None)
    }

    fn customer_details(&self, id: CustomerId) -> Result<CustomerDetails, ApiError> {
        let url = self.resolve(&format!("customer/customer/{id}/"))?;
        self.send_json(self.request(Method::GET, &url), &url, "customer details")
    }

    fn submit_invoice(
        &self,
        submit_url: &str,
        payload: &InvoicePayload,
    ) -> Result<ApiResponse, ApiError> {
        let url = self.resolve(submit_url)?;
        let builder = self.request(Method::POST, &url).json(payload);
        let response: ApiResponse = self.send_json(builder, &url, "invoice response")?;
        require_success(response)
    }
}

/// Lookup create/update body. Both keys carry the label; the server reads
/// the one that matches the entity.
#[derive(Debug, serde::Serialize)]
struct LabelBody<'a> {
    site_name: &'a str,
    name: &'a str,
}

impl<'a> LabelBody<'a> {
    fn new(label: &'a str) -> Self {
        Self {
            site_name: label,
            name: label,
        }
    }
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    message: Option<String>,
}

fn connection_error(url: &Url, error: &reqwest::Error) -> ApiError {
    let reason = if error.is_timeout() {
        "timed out".to_owned()
    } else {
        error.to_string()
    };
    ApiError::Transport {
        url: url.to_string(),
        reason,
    }
}

fn clean_error_response(status: StatusCode, body: &str) -> ApiError {
    let status = status.as_u16();
    if let Ok(parsed) = serde_json::from_str::<ErrorEnvelope>(body)
        && let Some(message) = parsed.error.or(parsed.message)
        && !message.is_empty()
    {
        return ApiError::Status {
            status,
            message: Some(message),
        };
    }

    let body = body.trim();
    let message = (!body.is_empty() && body.len() < 100 && !body.contains('<') && !body.contains('{'))
        .then(|| body.to_owned());
    ApiError::Status { status, message }
}
