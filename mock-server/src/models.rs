//! Records held by the mock backend and the payloads it accepts.
//!
//! Field names follow the Mamatoto REST schema. Dates are calendar dates,
//! timestamps are naive UTC.

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

pub type Id = i64;

fn default_language() -> String {
    "en".to_string()
}

// Account

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct User {
    pub id: Id,
    pub email: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub phone: Option<String>,
    pub location: Option<String>,
    pub preferred_language: String,
    pub is_active: bool,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[derive(Deserialize)]
pub struct RegisterUser {
    pub email: String,
    pub password: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub phone: Option<String>,
    pub location: Option<String>,
    #[serde(default = "default_language")]
    pub preferred_language: String,
}

#[derive(Deserialize)]
pub struct LoginForm {
    pub username: String,
    pub password: String,
}

#[derive(Deserialize)]
pub struct UpdateProfile {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub phone: Option<String>,
    pub location: Option<String>,
    pub preferred_language: Option<String>,
}

#[derive(Deserialize)]
pub struct ChangePassword {
    pub current_password: String,
    pub new_password: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Token {
    pub access_token: String,
    pub token_type: String,
}

// Pregnancy

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Pregnancy {
    pub id: Id,
    pub user_id: Id,
    pub due_date: NaiveDate,
    pub current_week: Option<i64>,
    pub last_weight: Option<f64>,
    pub last_checkup: Option<NaiveDate>,
    pub complications: Option<String>,
    pub notes: Option<String>,
    pub is_active: bool,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
    pub weeks_remaining: Option<i64>,
    pub trimester: Option<i64>,
}

#[derive(Deserialize)]
pub struct CreatePregnancy {
    pub due_date: NaiveDate,
    pub last_weight: Option<f64>,
    pub last_checkup: Option<NaiveDate>,
    pub complications: Option<String>,
    pub notes: Option<String>,
}

#[derive(Deserialize)]
pub struct UpdatePregnancy {
    pub current_week: Option<i64>,
    pub last_weight: Option<f64>,
    pub last_checkup: Option<NaiveDate>,
    pub complications: Option<String>,
    pub notes: Option<String>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Appointment {
    pub id: Id,
    pub pregnancy_id: Id,
    pub user_id: Id,
    pub appointment_type: String,
    pub scheduled_date: NaiveDate,
    pub notes: Option<String>,
    pub location: Option<String>,
    pub completed: bool,
    pub created_at: NaiveDateTime,
}

#[derive(Deserialize)]
pub struct CreateAppointment {
    pub pregnancy_id: Id,
    pub appointment_type: String,
    pub scheduled_date: NaiveDate,
    pub notes: Option<String>,
    pub location: Option<String>,
}

#[derive(Deserialize)]
pub struct UpdateAppointment {
    pub scheduled_date: Option<NaiveDate>,
    pub completed: Option<bool>,
    pub notes: Option<String>,
    pub location: Option<String>,
}

#[derive(Deserialize)]
pub struct AppointmentFilter {
    pub pregnancy_id: Option<Id>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct WeeklyInfo {
    pub week: i64,
    pub trimester: i64,
    pub baby_size: String,
    pub symptoms: Vec<String>,
    pub tips: Vec<String>,
    pub appointments: Vec<String>,
}

// Children

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Child {
    pub id: Id,
    pub user_id: Id,
    pub name: String,
    pub birth_date: NaiveDate,
    pub gender: Option<String>,
    pub birth_weight: Option<f64>,
    pub birth_length: Option<f64>,
    pub birth_complications: Option<String>,
    pub is_active: bool,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
    pub age_months: Option<i64>,
}

#[derive(Deserialize)]
pub struct CreateChild {
    pub name: String,
    pub birth_date: NaiveDate,
    pub gender: Option<String>,
    pub birth_weight: Option<f64>,
    pub birth_length: Option<f64>,
    pub birth_complications: Option<String>,
}

#[derive(Deserialize)]
pub struct UpdateChild {
    pub name: Option<String>,
    pub gender: Option<String>,
    pub birth_complications: Option<String>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Vaccination {
    pub id: Id,
    pub child_id: Id,
    pub vaccine_name: String,
    pub vaccine_code: Option<String>,
    pub scheduled_date: NaiveDate,
    pub administered_date: Option<NaiveDate>,
    pub batch_number: Option<String>,
    pub healthcare_provider: Option<String>,
    pub notes: Option<String>,
    pub status: String,
    pub created_at: NaiveDateTime,
}

#[derive(Deserialize)]
pub struct CreateVaccination {
    pub vaccine_name: String,
    pub vaccine_code: Option<String>,
    pub scheduled_date: NaiveDate,
    pub administered_date: Option<NaiveDate>,
    pub batch_number: Option<String>,
    pub healthcare_provider: Option<String>,
    pub notes: Option<String>,
}

#[derive(Deserialize)]
pub struct UpdateVaccination {
    pub administered_date: Option<NaiveDate>,
    pub status: Option<String>,
    pub batch_number: Option<String>,
    pub healthcare_provider: Option<String>,
    pub notes: Option<String>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct GrowthRecord {
    pub id: Id,
    pub child_id: Id,
    pub recorded_date: NaiveDate,
    pub weight: Option<f64>,
    pub height: Option<f64>,
    pub head_circumference: Option<f64>,
    pub notes: Option<String>,
    pub age_months: Option<i64>,
    pub weight_percentile: Option<f64>,
    pub height_percentile: Option<f64>,
    pub bmi: Option<f64>,
    pub created_at: NaiveDateTime,
}

#[derive(Deserialize)]
pub struct CreateGrowthRecord {
    pub recorded_date: NaiveDate,
    pub weight: Option<f64>,
    pub height: Option<f64>,
    pub head_circumference: Option<f64>,
    pub notes: Option<String>,
}

#[derive(Deserialize)]
pub struct UpdateGrowthRecord {
    pub recorded_date: Option<NaiveDate>,
    pub weight: Option<f64>,
    pub height: Option<f64>,
    pub head_circumference: Option<f64>,
    pub notes: Option<String>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Milestone {
    pub id: Id,
    pub child_id: Id,
    pub milestone_type: String,
    pub milestone_name: String,
    pub typical_age_months: i64,
    pub achieved_date: Option<NaiveDate>,
    pub is_achieved: bool,
    pub notes: Option<String>,
    pub created_at: NaiveDateTime,
}

#[derive(Deserialize)]
pub struct CreateMilestone {
    pub milestone_type: String,
    pub milestone_name: String,
    pub typical_age_months: i64,
    pub achieved_date: Option<NaiveDate>,
    #[serde(default)]
    pub is_achieved: bool,
    pub notes: Option<String>,
}

#[derive(Deserialize)]
pub struct UpdateMilestone {
    pub achieved_date: Option<NaiveDate>,
    pub is_achieved: Option<bool>,
    pub notes: Option<String>,
}

// Health

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct HealthRecord {
    pub id: Id,
    pub user_id: Id,
    pub child_id: Option<Id>,
    pub pregnancy_id: Option<Id>,
    pub record_type: String,
    pub title: String,
    pub description: Option<String>,
    pub severity: Option<String>,
    pub symptoms: Option<Vec<String>>,
    pub medications: Option<Vec<Map<String, Value>>>,
    pub test_results: Option<Map<String, Value>>,
    pub action_taken: Option<String>,
    pub outcome: Option<String>,
    pub recorded_date: NaiveDate,
    pub created_at: NaiveDateTime,
}

#[derive(Deserialize)]
pub struct CreateHealthRecord {
    pub record_type: String,
    pub title: String,
    pub description: Option<String>,
    pub severity: Option<String>,
    pub symptoms: Option<Vec<String>>,
    pub medications: Option<Vec<Map<String, Value>>>,
    pub test_results: Option<Map<String, Value>>,
    pub action_taken: Option<String>,
    pub outcome: Option<String>,
    pub recorded_date: NaiveDate,
    pub child_id: Option<Id>,
    pub pregnancy_id: Option<Id>,
}

#[derive(Deserialize)]
pub struct UpdateHealthRecord {
    pub title: Option<String>,
    pub description: Option<String>,
    pub severity: Option<String>,
    pub symptoms: Option<Vec<String>>,
    pub action_taken: Option<String>,
    pub outcome: Option<String>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Assessment {
    pub id: Id,
    pub user_id: Id,
    pub assessment_type: String,
    pub responses: Map<String, Value>,
    pub assessment_date: NaiveDate,
    pub score: i64,
    pub risk_level: String,
    pub recommendations: String,
    pub created_at: NaiveDateTime,
}

#[derive(Deserialize)]
pub struct CreateAssessment {
    pub assessment_type: String,
    pub responses: Map<String, Value>,
    pub assessment_date: NaiveDate,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct EmergencyContact {
    pub id: Id,
    pub user_id: Id,
    pub name: String,
    pub relationship: Option<String>,
    pub phone: String,
    pub email: Option<String>,
    pub is_primary: bool,
    pub created_at: NaiveDateTime,
}

#[derive(Deserialize)]
pub struct CreateEmergencyContact {
    pub name: String,
    pub relationship: Option<String>,
    pub phone: String,
    pub email: Option<String>,
    #[serde(default)]
    pub is_primary: bool,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Dashboard {
    pub user: User,
    pub active_pregnancy: Option<Pregnancy>,
    pub children: Vec<Child>,
    pub upcoming_appointments: Vec<Appointment>,
    pub overdue_vaccinations: Vec<Vaccination>,
    pub recent_health_records: Vec<HealthRecord>,
    pub growth_alerts: Vec<String>,
}

#[derive(Deserialize)]
pub struct ChatQuery {
    pub query: String,
}
