//! In-memory stand-in for the Mamatoto REST backend.
//!
//! Serves the same routes, payload shapes and error bodies (`{"detail": ...}`)
//! as the real API so the client core can be exercised end to end. State
//! lives in one `RwLock`-guarded `Store`; bearer tokens are random UUIDs.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use axum::{
    extract::{FromRequestParts, Request},
    http::{header, request::Parts, StatusCode},
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::{get, post, put},
    Json, Router,
};
use chrono::{NaiveDate, NaiveDateTime, Utc};
use serde_json::json;
use tokio::{net::TcpListener, sync::RwLock};
use tracing::info;
use uuid::Uuid;

pub mod auth;
pub mod children;
pub mod clinical;
pub mod health;
pub mod models;
pub mod pregnancy;

use models::{
    Appointment, Assessment, Child, EmergencyContact, GrowthRecord, HealthRecord, Id, Milestone, Pregnancy, User,
    Vaccination,
};

/// A registered user and the password they log in with.
#[derive(Clone, Debug)]
pub struct Account {
    pub user: User,
    pub password: String,
}

#[derive(Default)]
pub struct Store {
    next_id: Id,
    pub accounts: BTreeMap<Id, Account>,
    pub sessions: HashMap<Uuid, Id>,
    pub pregnancies: BTreeMap<Id, Pregnancy>,
    pub appointments: BTreeMap<Id, Appointment>,
    pub children: BTreeMap<Id, Child>,
    pub vaccinations: BTreeMap<Id, Vaccination>,
    pub growth: BTreeMap<Id, GrowthRecord>,
    pub milestones: BTreeMap<Id, Milestone>,
    pub records: BTreeMap<Id, HealthRecord>,
    pub assessments: BTreeMap<Id, Assessment>,
    pub contacts: BTreeMap<Id, EmergencyContact>,
}

impl Store {
    /// Ids are shared across tables and never reused.
    pub fn next_id(&mut self) -> Id {
        self.next_id += 1;
        self.next_id
    }

    /// The caller's child, or 404.
    pub fn owned_child(&self, user_id: Id, child_id: Id) -> Result<&Child, ApiError> {
        self.children
            .get(&child_id)
            .filter(|child| child.user_id == user_id)
            .ok_or_else(|| ApiError::not_found("Child not found"))
    }

    /// The caller's pregnancy, or 404.
    pub fn owned_pregnancy(&self, user_id: Id, pregnancy_id: Id) -> Result<&Pregnancy, ApiError> {
        self.pregnancies
            .get(&pregnancy_id)
            .filter(|pregnancy| pregnancy.user_id == user_id)
            .ok_or_else(|| ApiError::not_found("Pregnancy not found"))
    }
}

pub type Db = Arc<RwLock<Store>>;

/// Error body in the backend's `{"detail": "..."}` shape.
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    detail: String,
}

impl ApiError {
    pub fn new(status: StatusCode, detail: impl Into<String>) -> Self {
        Self {
            status,
            detail: detail.into(),
        }
    }

    pub fn not_found(detail: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, detail)
    }

    pub fn bad_request(detail: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, detail)
    }

    pub fn unauthorized() -> Self {
        Self::new(StatusCode::UNAUTHORIZED, "Could not validate credentials")
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = Json(json!({ "detail": self.detail }));
        if self.status == StatusCode::UNAUTHORIZED {
            (self.status, [(header::WWW_AUTHENTICATE, "Bearer")], body).into_response()
        } else {
            (self.status, body).into_response()
        }
    }
}

/// The authenticated caller's user id, from `Authorization: Bearer <token>`.
#[derive(Debug, Clone, Copy)]
pub struct CurrentUser(pub Id);

impl FromRequestParts<Db> for CurrentUser {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, db: &Db) -> Result<Self, Self::Rejection> {
        let token = parts
            .headers
            .get(header::AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.strip_prefix("Bearer "))
            .and_then(|token| token.trim().parse::<Uuid>().ok())
            .ok_or_else(ApiError::unauthorized)?;
        db.read()
            .await
            .sessions
            .get(&token)
            .copied()
            .map(CurrentUser)
            .ok_or_else(ApiError::unauthorized)
    }
}

pub(crate) fn now() -> NaiveDateTime {
    Utc::now().naive_utc()
}

pub(crate) fn today() -> NaiveDate {
    Utc::now().date_naive()
}

pub fn app() -> Router {
    let db: Db = Arc::new(RwLock::new(Store::default()));
    Router::new()
        .route("/auth/register", post(auth::register))
        .route("/auth/login", post(auth::login))
        .route("/auth/me", get(auth::me).put(auth::update_me).delete(auth::delete_me))
        .route("/auth/change-password", put(auth::change_password))
        .route("/pregnancy", get(pregnancy::list).post(pregnancy::create))
        .route("/pregnancy/active", get(pregnancy::active))
        .route("/pregnancy/weekly-info", post(pregnancy::weekly_info))
        .route("/pregnancy/danger-signs", get(pregnancy::danger_signs))
        .route(
            "/pregnancy/appointments",
            get(pregnancy::list_appointments).post(pregnancy::create_appointment),
        )
        .route(
            "/pregnancy/appointments/{id}",
            put(pregnancy::update_appointment).delete(pregnancy::delete_appointment),
        )
        .route(
            "/pregnancy/{id}",
            get(pregnancy::fetch).put(pregnancy::update).delete(pregnancy::delete),
        )
        .route("/children", get(children::list).post(children::create))
        .route(
            "/children/{id}",
            get(children::fetch).put(children::update).delete(children::delete),
        )
        .route(
            "/children/{id}/vaccinations",
            get(children::list_vaccinations).post(children::create_vaccination),
        )
        .route(
            "/children/{id}/vaccinations/{item}",
            put(children::update_vaccination).delete(children::delete_vaccination),
        )
        .route(
            "/children/{id}/growth",
            get(children::list_growth).post(children::create_growth),
        )
        .route(
            "/children/{id}/growth/{item}",
            put(children::update_growth).delete(children::delete_growth),
        )
        .route(
            "/children/{id}/milestones",
            get(children::list_milestones).post(children::create_milestone),
        )
        .route(
            "/children/{id}/milestones/{item}",
            put(children::update_milestone).delete(children::delete_milestone),
        )
        .route("/health/records", get(health::list_records).post(health::create_record))
        .route(
            "/health/records/{id}",
            get(health::fetch_record).put(health::update_record).delete(health::delete_record),
        )
        .route(
            "/health/mental-health",
            get(health::list_assessments).post(health::create_assessment),
        )
        .route(
            "/health/mental-health/{id}",
            put(health::update_assessment).delete(health::delete_assessment),
        )
        .route(
            "/health/emergency-contacts",
            get(health::list_contacts).post(health::create_contact),
        )
        .route(
            "/health/emergency-contacts/{id}",
            put(health::update_contact).delete(health::delete_contact),
        )
        .route("/dashboard", get(health::dashboard))
        .route("/chatbot", post(health::chatbot))
        .layer(middleware::from_fn(log_request))
        .with_state(db)
}

async fn log_request(request: Request, next: Next) -> Response {
    let method = request.method().clone();
    let path = request.uri().path().to_string();
    let response = next.run(request).await;
    info!(%method, %path, status = response.status().as_u16(), "served");
    response
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    axum::serve(listener, app()).await
}
