//! Executing requests: the `Transport` seam and the `Backend` that pairs it
//! with an `ApiClient`.
//!
//! # Design
//! The host supplies the I/O. Anything that can turn an `HttpRequest` into an
//! `HttpResponse` implements `Transport`; a non-2xx response is still a
//! successful round-trip and is classified by the `ApiClient`, so a
//! transport only fails when no response arrived at all.

use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, warn};

use crate::client::ApiClient;
use crate::error::ApiError;
use crate::http::{HttpRequest, HttpResponse};

/// Executes one HTTP round-trip.
pub trait Transport {
    fn execute(&self, request: HttpRequest) -> Result<HttpResponse, ApiError>;
}

impl<T: Transport + ?Sized> Transport for Box<T> {
    fn execute(&self, request: HttpRequest) -> Result<HttpResponse, ApiError> {
        (**self).execute(request)
    }
}

/// The backend as seen by the stores: request building, execution and
/// response parsing in one call.
pub struct Backend {
    client: ApiClient,
    transport: Box<dyn Transport>,
}

impl Backend {
    pub fn new(client: ApiClient, transport: impl Transport + 'static) -> Self {
        Self {
            client,
            transport: Box::new(transport),
        }
    }

    pub fn client(&self) -> &ApiClient {
        &self.client
    }

    pub fn client_mut(&mut self) -> &mut ApiClient {
        &mut self.client
    }

    pub fn send_json<T: DeserializeOwned>(&self, request: HttpRequest) -> Result<T, ApiError> {
        let response = self.execute(request)?;
        self.client.parse_json(response)
    }

    pub fn send_empty(&self, request: HttpRequest) -> Result<(), ApiError> {
        let response = self.execute(request)?;
        self.client.parse_empty(response)
    }

    pub fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        self.send_json(self.client.get(path))
    }

    pub fn post_json<B, T>(&self, path: &str, body: &B) -> Result<T, ApiError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        self.send_json(self.client.post_json(path, body)?)
    }

    pub fn put_json<B, T>(&self, path: &str, body: &B) -> Result<T, ApiError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        self.send_json(self.client.put_json(path, body)?)
    }

    pub fn delete(&self, path: &str) -> Result<(), ApiError> {
        self.send_empty(self.client.delete(path))
    }

    fn execute(&self, request: HttpRequest) -> Result<HttpResponse, ApiError> {
        let method = request.method;
        let path = request.path.clone();
        debug!(%method, %path, "sending request");
        let response = self.transport.execute(request).inspect_err(|e| {
            warn!(%method, %path, error = %e, "transport failed");
        })?;
        debug!(%method, %path, status = response.status, "received response");
        Ok(response)
    }
}

/// Blocking transport over `ureq`.
///
/// Status codes are returned as data (`http_status_as_error(false)`) so the
/// `ApiClient` stays in charge of interpreting them.
#[cfg(feature = "ureq")]
pub struct UreqTransport {
    agent: ureq::Agent,
}

#[cfg(feature = "ureq")]
impl UreqTransport {
    pub fn new() -> Self {
        let agent = ureq::Agent::config_builder()
            .http_status_as_error(false)
            .build()
            .new_agent();
        Self { agent }
    }
}

#[cfg(feature = "ureq")]
impl Default for UreqTransport {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(feature = "ureq")]
impl Transport for UreqTransport {
    fn execute(&self, request: HttpRequest) -> Result<HttpResponse, ApiError> {
        use crate::http::HttpMethod;

        let transport_err = |e: ureq::Error| ApiError::Transport(e.to_string());
        let body = request.body.unwrap_or_default();
        let mut response = match request.method {
            HttpMethod::Get => {
                let mut builder = self.agent.get(&request.path);
                for (key, value) in &request.headers {
                    builder = builder.header(key.as_str(), value.as_str());
                }
                builder.call()
            }
            HttpMethod::Delete => {
                let mut builder = self.agent.delete(&request.path);
                for (key, value) in &request.headers {
                    builder = builder.header(key.as_str(), value.as_str());
                }
                builder.call()
            }
            HttpMethod::Post => {
                let mut builder = self.agent.post(&request.path);
                for (key, value) in &request.headers {
                    builder = builder.header(key.as_str(), value.as_str());
                }
                builder.send(body.as_bytes())
            }
            HttpMethod::Put => {
                let mut builder = self.agent.put(&request.path);
                for (key, value) in &request.headers {
                    builder = builder.header(key.as_str(), value.as_str());
                }
                builder.send(body.as_bytes())
            }
        }
        .map_err(transport_err)?;

        let status = response.status().as_u16();
        let body = response.body_mut().read_to_string().map_err(transport_err)?;
        Ok(HttpResponse::new(status, body))
    }
}
