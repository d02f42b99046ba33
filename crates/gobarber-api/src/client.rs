//! HTTP client for the booking backend

use async_trait::async_trait;
use chrono::{Datelike, NaiveDate};
use reqwest::multipart::{Form, Part};
use reqwest::{Method, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde_json::json;
use std::time::Duration;
use url::Url;

use gobarber_session::{AuthBackend, BackendError, Credentials, SignInResponse, UserProfile};

use crate::error::ApiError;
use crate::types::{Appointment, MonthAvailabilityItem, NewUser, ProfileUpdate, ResetPassword};
use crate::Result;

#[derive(Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: Url,
    /// Bearer token sent with every request, if any
    token: Option<String>,
}

impl ApiClient {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        let mut base_url = Url::parse(base_url)?;
        // Url::join drops the last path segment unless it ends with '/'
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }

        let http = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("gobarber/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            http,
            base_url,
            token: None,
        })
    }

    /// A copy of this client that authenticates as the given token.
    pub fn authorized(&self, token: impl Into<String>) -> Self {
        Self {
            http: self.http.clone(),
            base_url: self.base_url.clone(),
            token: Some(token.into()),
        }
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// `POST /sessions`
    pub async fn authenticate(&self, credentials: &Credentials) -> Result<SignInResponse> {
        let request = self.request(Method::POST, "sessions")?.json(credentials);
        self.send_json(request).await
    }

    /// `POST /users`
    pub async fn create_user(&self, user: &NewUser) -> Result<UserProfile> {
        let request = self.request(Method::POST, "users")?.json(user);
        self.send_json(request).await
    }

    /// `POST /password/forgot`
    pub async fn forgot_password(&self, email: &str) -> Result<()> {
        let request = self
            .request(Method::POST, "password/forgot")?
            .json(&json!({ "email": email }));
        self.send(request).await.map(|_| ())
    }

    /// `PATCH /password/reset`
    pub async fn reset_password(&self, reset: &ResetPassword) -> Result<()> {
        let request = self.request(Method::PATCH, "password/reset")?.json(reset);
        self.send(request).await.map(|_| ())
    }

    /// `PUT /profile`
    pub async fn update_profile(&self, update: &ProfileUpdate) -> Result<UserProfile> {
        let request = self.request(Method::PUT, "profile")?.json(update);
        self.send_json(request).await
    }

    /// `PATCH /users/avatar` as a multipart upload in the `avatar` field
    pub async fn update_avatar(&self, file_name: &str, bytes: Vec<u8>) -> Result<UserProfile> {
        let part = Part::bytes(bytes)
            .file_name(file_name.to_string())
            .mime_str(mime_for(file_name))?;
        let form = Form::new().part("avatar", part);

        let request = self.request(Method::PATCH, "users/avatar")?.multipart(form);
        self.send_json(request).await
    }

    /// `GET /providers/{id}/month-availability`
    pub async fn month_availability(
        &self,
        provider_id: &str,
        year: i32,
        month: u32,
    ) -> Result<Vec<MonthAvailabilityItem>> {
        let path = format!("providers/{provider_id}/month-availability");
        let request = self
            .request(Method::GET, &path)?
            .query(&[("year", year.to_string()), ("month", month.to_string())]);
        self.send_json(request).await
    }

    /// `GET /appointments/me` for a single day
    pub async fn provider_appointments(&self, date: NaiveDate) -> Result<Vec<Appointment>> {
        let request = self.request(Method::GET, "appointments/me")?.query(&[
            ("year", date.year().to_string()),
            ("month", date.month().to_string()),
            ("day", date.day().to_string()),
        ]);
        self.send_json(request).await
    }

    fn request(&self, method: Method, path: &str) -> Result<RequestBuilder> {
        let url = self.base_url.join(path.trim_start_matches('/'))?;
        tracing::debug!(method = %method, url = %url, "API request");

        let mut request = self.http.request(method, url);
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }
        Ok(request)
    }

    async fn send(&self, request: RequestBuilder) -> Result<Response> {
        let response = request.send().await?;
        let status = response.status();

        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        let message = error_message(&body)
            .or_else(|| status.canonical_reason().map(str::to_string))
            .unwrap_or_else(|| "request failed".to_string());

        tracing::debug!(status = status.as_u16(), message = %message, "API request rejected");

        Err(ApiError::Status {
            status: status.as_u16(),
            message,
        })
    }

    async fn send_json<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T> {
        Ok(self.send(request).await?.json::<T>().await?)
    }
}

#[async_trait]
impl AuthBackend for ApiClient {
    async fn create_session(
        &self,
        credentials: &Credentials,
    ) -> std::result::Result<SignInResponse, BackendError> {
        self.authenticate(credentials).await.map_err(Into::into)
    }
}

impl std::fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiClient")
            .field("base_url", &self.base_url.as_str())
            .field("authorized", &self.token.is_some())
            .finish()
    }
}

/// Backend errors look like `{"status": "error", "message": "..."}`.
/// Plain-text bodies are used as-is.
fn error_message(body: &str) -> Option<String> {
    let trimmed = body.trim();
    if trimmed.is_empty() {
        return None;
    }

    match serde_json::from_str::<serde_json::Value>(trimmed) {
        Ok(value) => value
            .get("message")
            .and_then(|m| m.as_str())
            .map(str::to_string),
        Err(_) => Some(trimmed.to_string()),
    }
}

fn mime_for(file_name: &str) -> &'static str {
    let extension = file_name
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_ascii_lowercase())
        .unwrap_or_default();

    match extension.as_str() {
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "gif" => "image/gif",
        "webp" => "image/webp",
        _ => "application/octet-stream",
    }
}
