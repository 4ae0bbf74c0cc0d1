//! Domain DTOs for the Mamatoto API.
//!
//! # Design
//! Response types mirror the backend schema but are defined independently of
//! the mock server; integration tests catch schema drift. Optional fields
//! tolerate absence, and unknown fields are ignored, so older and newer
//! backend revisions both deserialize. Update payloads skip `None` fields so
//! the backend only touches what was sent.

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::cache::{Record, RecordId};

macro_rules! impl_record {
    ($($ty:ty),* $(,)?) => {
        $(impl Record for $ty {
            fn id(&self) -> RecordId {
                self.id
            }
        })*
    };
}

impl_record!(
    User,
    Pregnancy,
    Appointment,
    Child,
    Vaccination,
    GrowthRecord,
    Milestone,
    HealthRecord,
    MentalHealthAssessment,
    EmergencyContact,
);

fn default_language() -> String {
    "en".to_string()
}

fn default_true() -> bool {
    true
}

// ---------------------------------------------------------------------------
// Account
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct User {
    pub id: RecordId,
    pub email: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub phone: Option<String>,
    pub location: Option<String>,
    #[serde(default = "default_language")]
    pub preferred_language: String,
    #[serde(default = "default_true")]
    pub is_active: bool,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

/// Registration payload. The same email and password are reused to log in.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewUser {
    pub email: String,
    pub password: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(default = "default_language")]
    pub preferred_language: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProfileUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub preferred_language: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PasswordChange {
    pub current_password: String,
    pub new_password: String,
}

/// `POST /auth/login` response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Token {
    pub access_token: String,
    #[serde(default)]
    pub token_type: String,
}

// ---------------------------------------------------------------------------
// Pregnancy
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Pregnancy {
    pub id: RecordId,
    pub user_id: RecordId,
    pub due_date: NaiveDate,
    pub current_week: Option<u32>,
    pub last_weight: Option<f64>,
    pub last_checkup: Option<NaiveDate>,
    pub complications: Option<String>,
    pub notes: Option<String>,
    #[serde(default)]
    pub is_active: bool,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
    pub weeks_remaining: Option<u32>,
    pub trimester: Option<u8>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewPregnancy {
    pub due_date: NaiveDate,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_weight: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_checkup: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub complications: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PregnancyUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub current_week: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_weight: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_checkup: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub complications: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Appointment {
    pub id: RecordId,
    pub pregnancy_id: Option<RecordId>,
    pub user_id: RecordId,
    pub appointment_type: String,
    pub scheduled_date: NaiveDate,
    pub notes: Option<String>,
    pub location: Option<String>,
    #[serde(default)]
    pub completed: bool,
    pub created_at: NaiveDateTime,
}

/// Appointment payload; the owning pregnancy is supplied by the store.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewAppointment {
    pub appointment_type: String,
    pub scheduled_date: NaiveDate,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppointmentUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scheduled_date: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completed: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
}

/// `POST /pregnancy/weekly-info` response.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct WeeklyInfo {
    pub week: u32,
    pub trimester: u8,
    pub baby_size: String,
    #[serde(default)]
    pub symptoms: Vec<String>,
    #[serde(default)]
    pub tips: Vec<String>,
    #[serde(default)]
    pub appointments: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DangerSign {
    pub symptom: String,
    pub urgency: String,
    pub action: String,
}

/// `GET /pregnancy/danger-signs` envelope.
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct DangerSigns {
    pub danger_signs: Vec<DangerSign>,
}

// ---------------------------------------------------------------------------
// Children
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Gender {
    Male,
    Female,
    Other,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Child {
    pub id: RecordId,
    pub user_id: RecordId,
    pub name: String,
    pub birth_date: NaiveDate,
    pub gender: Option<Gender>,
    pub birth_weight: Option<f64>,
    pub birth_length: Option<f64>,
    pub birth_complications: Option<String>,
    pub age_months: Option<u32>,
    #[serde(default = "default_true")]
    pub is_active: bool,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewChild {
    pub name: String,
    pub birth_date: NaiveDate,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gender: Option<Gender>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub birth_weight: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub birth_length: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub birth_complications: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ChildUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gender: Option<Gender>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub birth_complications: Option<String>,
}

/// Known statuses, plus whatever else the backend may send verbatim.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum VaccinationStatus {
    Pending,
    Due,
    Overdue,
    Completed,
    Skipped,
    #[serde(untagged)]
    Other(String),
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Vaccination {
    pub id: RecordId,
    pub child_id: RecordId,
    pub vaccine_name: String,
    pub vaccine_code: Option<String>,
    pub scheduled_date: NaiveDate,
    pub administered_date: Option<NaiveDate>,
    pub batch_number: Option<String>,
    pub healthcare_provider: Option<String>,
    pub notes: Option<String>,
    pub status: VaccinationStatus,
    pub created_at: NaiveDateTime,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewVaccination {
    pub vaccine_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vaccine_code: Option<String>,
    pub scheduled_date: NaiveDate,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub administered_date: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub batch_number: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub healthcare_provider: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct VaccinationUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub administered_date: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<VaccinationStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub batch_number: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub healthcare_provider: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GrowthRecord {
    pub id: RecordId,
    pub child_id: RecordId,
    pub recorded_date: NaiveDate,
    pub weight: Option<f64>,
    pub height: Option<f64>,
    pub head_circumference: Option<f64>,
    pub notes: Option<String>,
    pub age_months: Option<u32>,
    pub weight_percentile: Option<f64>,
    pub height_percentile: Option<f64>,
    pub bmi: Option<f64>,
    pub created_at: NaiveDateTime,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewGrowthRecord {
    pub recorded_date: NaiveDate,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub weight: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub height: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub head_circumference: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GrowthUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub recorded_date: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub weight: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub height: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub head_circumference: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Milestone {
    pub id: RecordId,
    pub child_id: RecordId,
    pub milestone_type: String,
    pub milestone_name: String,
    pub typical_age_months: u32,
    pub achieved_date: Option<NaiveDate>,
    #[serde(default)]
    pub is_achieved: bool,
    pub notes: Option<String>,
    pub created_at: NaiveDateTime,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewMilestone {
    pub milestone_type: String,
    pub milestone_name: String,
    pub typical_age_months: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub achieved_date: Option<NaiveDate>,
    #[serde(default)]
    pub is_achieved: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MilestoneUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub achieved_date: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_achieved: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

// ---------------------------------------------------------------------------
// Health
// ---------------------------------------------------------------------------

/// Severity is free text on the backend; unknown labels are kept as-is.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Low,
    Medium,
    High,
    Critical,
    #[serde(untagged)]
    Other(String),
}

impl Severity {
    /// High and critical records surface in the "critical" view.
    pub fn is_urgent(&self) -> bool {
        matches!(self, Severity::High | Severity::Critical)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct HealthRecord {
    pub id: RecordId,
    pub user_id: RecordId,
    pub child_id: Option<RecordId>,
    pub pregnancy_id: Option<RecordId>,
    pub record_type: String,
    pub title: String,
    pub description: Option<String>,
    pub severity: Option<Severity>,
    pub symptoms: Option<Vec<String>>,
    pub medications: Option<Vec<Map<String, Value>>>,
    pub test_results: Option<Map<String, Value>>,
    pub action_taken: Option<String>,
    pub outcome: Option<String>,
    pub recorded_date: NaiveDate,
    pub created_at: NaiveDateTime,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewHealthRecord {
    pub record_type: String,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub severity: Option<Severity>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub symptoms: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub medications: Option<Vec<Map<String, Value>>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub test_results: Option<Map<String, Value>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub action_taken: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub outcome: Option<String>,
    pub recorded_date: NaiveDate,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub child_id: Option<RecordId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pregnancy_id: Option<RecordId>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct HealthRecordUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub severity: Option<Severity>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub symptoms: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub action_taken: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub outcome: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MentalHealthAssessment {
    pub id: RecordId,
    pub user_id: RecordId,
    pub assessment_type: String,
    pub responses: Map<String, Value>,
    pub assessment_date: NaiveDate,
    pub score: Option<i32>,
    pub risk_level: Option<String>,
    pub recommendations: Option<String>,
    pub created_at: NaiveDateTime,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewAssessment {
    pub assessment_type: String,
    pub responses: Map<String, Value>,
    pub assessment_date: NaiveDate,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EmergencyContact {
    pub id: RecordId,
    pub user_id: RecordId,
    pub name: String,
    pub relationship: Option<String>,
    pub phone: String,
    pub email: Option<String>,
    #[serde(default)]
    pub is_primary: bool,
    pub created_at: NaiveDateTime,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewEmergencyContact {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub relationship: Option<String>,
    pub phone: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default)]
    pub is_primary: bool,
}

/// A contact as edited in a form: no id means "not saved yet".
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContactDraft {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<RecordId>,
    #[serde(flatten)]
    pub contact: NewEmergencyContact,
}

/// `GET /dashboard` aggregate.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Dashboard {
    pub user: User,
    pub active_pregnancy: Option<Pregnancy>,
    #[serde(default)]
    pub children: Vec<Child>,
    #[serde(default)]
    pub upcoming_appointments: Vec<Appointment>,
    #[serde(default)]
    pub overdue_vaccinations: Vec<Vaccination>,
    #[serde(default)]
    pub recent_health_records: Vec<HealthRecord>,
    #[serde(default)]
    pub growth_alerts: Vec<String>,
}

/// `POST /chatbot` response.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ChatReply {
    pub query: String,
    pub response: String,
    #[serde(default)]
    pub context: Value,
    #[serde(default)]
    pub disclaimer: String,
}

/// Wraps a payload with the owner id the backend expects in the body.
#[derive(Debug, Serialize)]
pub(crate) struct Owned<'a, T> {
    #[serde(flatten)]
    pub payload: &'a T,
    #[serde(flatten)]
    pub owner: Owner,
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
pub(crate) enum Owner {
    Child { child_id: RecordId },
    Pregnancy { pregnancy_id: RecordId },
}
