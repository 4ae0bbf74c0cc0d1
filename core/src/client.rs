//! Request builder and response parser for the Mamatoto REST API.
//!
//! # Design
//! `ApiClient` holds the base URL and the current bearer token and nothing
//! else. Each builder produces an `HttpRequest`; each parser consumes an
//! `HttpResponse`. Executing the round-trip is the `Transport`'s job, so the
//! client stays deterministic and testable without a network.

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::ApiError;
use crate::http::{HttpMethod, HttpRequest, HttpResponse};

const JSON: &str = "application/json";
const FORM: &str = "application/x-www-form-urlencoded";

/// Builds authenticated requests and parses responses.
#[derive(Debug, Clone)]
pub struct ApiClient {
    base_url: String,
    token: Option<String>,
}

impl ApiClient {
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            token: None,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    pub fn set_token(&mut self, token: Option<String>) {
        self.token = token;
    }

    pub fn get(&self, path: &str) -> HttpRequest {
        self.request(HttpMethod::Get, path, None, None)
    }

    pub fn delete(&self, path: &str) -> HttpRequest {
        self.request(HttpMethod::Delete, path, None, None)
    }

    pub fn post_empty(&self, path: &str) -> HttpRequest {
        self.request(HttpMethod::Post, path, None, None)
    }

    pub fn post_json<T: Serialize + ?Sized>(&self, path: &str, input: &T) -> Result<HttpRequest, ApiError> {
        let body = to_json(input)?;
        Ok(self.request(HttpMethod::Post, path, Some(JSON), Some(body)))
    }

    pub fn put_json<T: Serialize + ?Sized>(&self, path: &str, input: &T) -> Result<HttpRequest, ApiError> {
        let body = to_json(input)?;
        Ok(self.request(HttpMethod::Put, path, Some(JSON), Some(body)))
    }

    /// POST `fields` as `application/x-www-form-urlencoded`.
    pub fn post_form(&self, path: &str, fields: &[(&str, &str)]) -> HttpRequest {
        let body = fields
            .iter()
            .map(|(key, value)| format!("{}={}", form_encode(key), form_encode(value)))
            .collect::<Vec<_>>()
            .join("&");
        self.request(HttpMethod::Post, path, Some(FORM), Some(body))
    }

    /// Parse a 2xx JSON body.
    pub fn parse_json<T: DeserializeOwned>(&self, response: HttpResponse) -> Result<T, ApiError> {
        check_status(&response)?;
        serde_json::from_str(&response.body).map_err(|e| ApiError::DeserializationError(e.to_string()))
    }

    /// Accept any 2xx and discard the body.
    pub fn parse_empty(&self, response: HttpResponse) -> Result<(), ApiError> {
        check_status(&response)
    }

    fn request(
        &self,
        method: HttpMethod,
        path: &str,
        content_type: Option<&str>,
        body: Option<String>,
    ) -> HttpRequest {
        let mut headers = vec![("accept".to_string(), JSON.to_string())];
        if let Some(content_type) = content_type {
            headers.push(("content-type".to_string(), content_type.to_string()));
        }
        if let Some(token) = &self.token {
            headers.push(("authorization".to_string(), format!("Bearer {token}")));
        }
        HttpRequest {
            method,
            path: format!("{}{path}", self.base_url),
            headers,
            body,
        }
    }
}

/// Append `?key=value` pairs to `path`, percent-encoding the values.
pub fn with_query(path: &str, params: &[(&str, &str)]) -> String {
    if params.is_empty() {
        return path.to_string();
    }
    let query = params
        .iter()
        .map(|(key, value)| format!("{}={}", form_encode(key), form_encode(value)))
        .collect::<Vec<_>>()
        .join("&");
    format!("{path}?{query}")
}

/// `application/x-www-form-urlencoded` encoding of a single component.
pub fn form_encode(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for byte in input.bytes() {
        match byte {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'_' | b'.' | b'*' => out.push(byte as char),
            b' ' => out.push('+'),
            _ => out.push_str(&format!("%{byte:02X}")),
        }
    }
    out
}

fn to_json<T: Serialize + ?Sized>(input: &T) -> Result<String, ApiError> {
    serde_json::to_string(input).map_err(|e| ApiError::SerializationError(e.to_string()))
}

/// Map non-2xx status codes to the appropriate `ApiError` variant.
fn check_status(response: &HttpResponse) -> Result<(), ApiError> {
    if response.is_success() {
        return Ok(());
    }
    Err(ApiError::from_status(response.status, &response.body))
}
