//! Client-state core for the Mamatoto maternal and child health app.
//!
//! # Overview
//! Domain stores (session, pregnancy, children, health) keep an in-memory
//! copy of the backend's records and synchronize it through a small REST
//! adapter. The adapter builds `HttpRequest` values and parses
//! `HttpResponse` values; a `Transport` performs the round-trip, so every
//! store is testable without a network.
//!
//! # Design
//! - Stores receive the `Backend` by reference; `AppContext` owns one of
//!   each and is the only wiring point.
//! - Every action returns `Result<_, ApiError>` and also records a display
//!   message in the store's `status.error`.
//! - Caches mutate only after the backend confirmed a change.
//! - DTOs are defined independently from the mock-server crate;
//!   integration tests catch schema drift.

pub mod cache;
pub mod client;
pub mod config;
pub mod context;
pub mod error;
pub mod http;
pub mod models;
pub mod router;
pub mod storage;
pub mod stores;
pub mod transport;

pub use cache::{BucketCache, Collection, FetchStatus, Record, RecordId, RequestState};
pub use client::ApiClient;
pub use config::{ClientConfig, ConfigError};
pub use context::{AppContext, Transition};
pub use error::{ApiError, StorageError};
pub use http::{HttpMethod, HttpRequest, HttpResponse};
pub use router::{Navigation, NavigationGuard, Route, RouteName, RouteTable};
pub use storage::{FileTokenStorage, MemoryTokenStorage, TokenStorage};
pub use stores::{ChildrenStore, HealthStore, PregnancyStore, UserStore};
pub use transport::{Backend, Transport};

#[cfg(feature = "ureq")]
pub use transport::UreqTransport;
