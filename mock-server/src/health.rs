//! Health records, mental-health screening, emergency contacts, the
//! dashboard summary and the assistant.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde_json::{json, Value};
use tracing::info;

use crate::children::{children_for, with_status};
use crate::clinical;
use crate::models::{
    Assessment, ChatQuery, CreateAssessment, CreateEmergencyContact, CreateHealthRecord, Dashboard, EmergencyContact,
    HealthRecord, Id, UpdateHealthRecord, Vaccination,
};
use crate::{now, pregnancy, today, ApiError, CurrentUser, Db, Store};

const RECENT_LIMIT: usize = 5;
const OVERDUE_GRACE_DAYS: i64 = 30;
const DISCLAIMER: &str =
    "This information is for educational purposes only. Always consult healthcare providers for medical advice.";

fn owns_child(store: &Store, user_id: Id, child_id: Option<Id>) -> Result<(), ApiError> {
    match child_id {
        Some(id) => store.owned_child(user_id, id).map(|_| ()),
        None => Ok(()),
    }
}

fn owns_pregnancy(store: &Store, user_id: Id, pregnancy_id: Option<Id>) -> Result<(), ApiError> {
    match pregnancy_id {
        Some(id) => store.owned_pregnancy(user_id, id).map(|_| ()),
        None => Ok(()),
    }
}

fn records_for(store: &Store, user_id: Id) -> Vec<HealthRecord> {
    let mut records: Vec<HealthRecord> = store
        .records
        .values()
        .filter(|r| r.user_id == user_id)
        .cloned()
        .collect();
    records.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
    records
}

// Records

pub async fn list_records(State(db): State<Db>, CurrentUser(user_id): CurrentUser) -> Json<Vec<HealthRecord>> {
    let store = db.read().await;
    Json(records_for(&store, user_id))
}

pub async fn fetch_record(
    State(db): State<Db>,
    CurrentUser(user_id): CurrentUser,
    Path(id): Path<Id>,
) -> Result<Json<HealthRecord>, ApiError> {
    let store = db.read().await;
    store
        .records
        .get(&id)
        .filter(|r| r.user_id == user_id)
        .cloned()
        .map(Json)
        .ok_or_else(|| ApiError::not_found("Health record not found"))
}

/// A record may be filed against one of the caller's children or pregnancies.
pub async fn create_record(
    State(db): State<Db>,
    CurrentUser(user_id): CurrentUser,
    Json(input): Json<CreateHealthRecord>,
) -> Result<Json<HealthRecord>, ApiError> {
    let mut store = db.write().await;
    owns_child(&store, user_id, input.child_id)?;
    owns_pregnancy(&store, user_id, input.pregnancy_id)?;
    let id = store.next_id();
    let record = HealthRecord {
        id,
        user_id,
        child_id: input.child_id,
        pregnancy_id: input.pregnancy_id,
        record_type: input.record_type,
        title: input.title,
        description: input.description,
        severity: input.severity,
        symptoms: input.symptoms,
        medications: input.medications,
        test_results: input.test_results,
        action_taken: input.action_taken,
        outcome: input.outcome,
        recorded_date: input.recorded_date,
        created_at: now(),
    };
    store.records.insert(id, record.clone());
    info!(user_id, record_id = id, "health record filed");
    Ok(Json(record))
}

pub async fn update_record(
    State(db): State<Db>,
    CurrentUser(user_id): CurrentUser,
    Path(id): Path<Id>,
    Json(input): Json<UpdateHealthRecord>,
) -> Result<Json<HealthRecord>, ApiError> {
    let mut store = db.write().await;
    let record = store
        .records
        .get_mut(&id)
        .filter(|r| r.user_id == user_id)
        .ok_or_else(|| ApiError::not_found("Health record not found"))?;
    if let Some(title) = input.title {
        record.title = title;
    }
    if let Some(description) = input.description {
        record.description = Some(description);
    }
    if let Some(severity) = input.severity {
        record.severity = Some(severity);
    }
    if let Some(symptoms) = input.symptoms {
        record.symptoms = Some(symptoms);
    }
    if let Some(action) = input.action_taken {
        record.action_taken = Some(action);
    }
    if let Some(outcome) = input.outcome {
        record.outcome = Some(outcome);
    }
    Ok(Json(record.clone()))
}

pub async fn delete_record(
    State(db): State<Db>,
    CurrentUser(user_id): CurrentUser,
    Path(id): Path<Id>,
) -> Result<StatusCode, ApiError> {
    let mut store = db.write().await;
    let owned = store.records.get(&id).is_some_and(|r| r.user_id == user_id);
    if !owned {
        return Err(ApiError::not_found("Health record not found"));
    }
    store.records.remove(&id);
    Ok(StatusCode::NO_CONTENT)
}

// Mental health

fn score(assessment: &mut Assessment) {
    assessment.score = clinical::assessment_score(&assessment.assessment_type, &assessment.responses);
    let risk = clinical::risk_level(&assessment.assessment_type, assessment.score);
    assessment.risk_level = risk.to_string();
    assessment.recommendations = clinical::recommendations(risk).to_string();
}

pub async fn list_assessments(State(db): State<Db>, CurrentUser(user_id): CurrentUser) -> Json<Vec<Assessment>> {
    let store = db.read().await;
    let mut assessments: Vec<Assessment> = store
        .assessments
        .values()
        .filter(|a| a.user_id == user_id)
        .cloned()
        .collect();
    assessments.sort_by(|a, b| b.assessment_date.cmp(&a.assessment_date).then(b.id.cmp(&a.id)));
    Json(assessments)
}

/// Scores the responses and attaches a risk level and recommendation.
pub async fn create_assessment(
    State(db): State<Db>,
    CurrentUser(user_id): CurrentUser,
    Json(input): Json<CreateAssessment>,
) -> Json<Assessment> {
    let mut store = db.write().await;
    let id = store.next_id();
    let mut assessment = Assessment {
        id,
        user_id,
        assessment_type: input.assessment_type,
        responses: input.responses,
        assessment_date: input.assessment_date,
        score: 0,
        risk_level: String::new(),
        recommendations: String::new(),
        created_at: now(),
    };
    score(&mut assessment);
    if assessment.risk_level == "high" {
        info!(user_id, assessment_id = id, "high-risk screening result");
    }
    store.assessments.insert(id, assessment.clone());
    Json(assessment)
}

pub async fn update_assessment(
    State(db): State<Db>,
    CurrentUser(user_id): CurrentUser,
    Path(id): Path<Id>,
    Json(input): Json<CreateAssessment>,
) -> Result<Json<Assessment>, ApiError> {
    let mut store = db.write().await;
    let assessment = store
        .assessments
        .get_mut(&id)
        .filter(|a| a.user_id == user_id)
        .ok_or_else(|| ApiError::not_found("Assessment not found"))?;
    assessment.assessment_type = input.assessment_type;
    assessment.responses = input.responses;
    assessment.assessment_date = input.assessment_date;
    score(assessment);
    Ok(Json(assessment.clone()))
}

pub async fn delete_assessment(
    State(db): State<Db>,
    CurrentUser(user_id): CurrentUser,
    Path(id): Path<Id>,
) -> Result<StatusCode, ApiError> {
    let mut store = db.write().await;
    let owned = store.assessments.get(&id).is_some_and(|a| a.user_id == user_id);
    if !owned {
        return Err(ApiError::not_found("Assessment not found"));
    }
    store.assessments.remove(&id);
    Ok(StatusCode::NO_CONTENT)
}

// Emergency contacts

/// At most one primary contact per user.
fn demote_others(store: &mut Store, user_id: Id, keep: Id) {
    for contact in store
        .contacts
        .values_mut()
        .filter(|c| c.user_id == user_id && c.id != keep)
    {
        contact.is_primary = false;
    }
}

/// Primary first, then by name.
pub async fn list_contacts(State(db): State<Db>, CurrentUser(user_id): CurrentUser) -> Json<Vec<EmergencyContact>> {
    let store = db.read().await;
    let mut contacts: Vec<EmergencyContact> = store
        .contacts
        .values()
        .filter(|c| c.user_id == user_id)
        .cloned()
        .collect();
    contacts.sort_by(|a, b| b.is_primary.cmp(&a.is_primary).then_with(|| a.name.cmp(&b.name)));
    Json(contacts)
}

pub async fn create_contact(
    State(db): State<Db>,
    CurrentUser(user_id): CurrentUser,
    Json(input): Json<CreateEmergencyContact>,
) -> Json<EmergencyContact> {
    let mut store = db.write().await;
    let id = store.next_id();
    if input.is_primary {
        demote_others(&mut store, user_id, id);
    }
    let contact = EmergencyContact {
        id,
        user_id,
        name: input.name,
        relationship: input.relationship,
        phone: input.phone,
        email: input.email,
        is_primary: input.is_primary,
        created_at: now(),
    };
    store.contacts.insert(id, contact.clone());
    Json(contact)
}

pub async fn update_contact(
    State(db): State<Db>,
    CurrentUser(user_id): CurrentUser,
    Path(id): Path<Id>,
    Json(input): Json<CreateEmergencyContact>,
) -> Result<Json<EmergencyContact>, ApiError> {
    let mut store = db.write().await;
    let owned = store.contacts.get(&id).is_some_and(|c| c.user_id == user_id);
    if !owned {
        return Err(ApiError::not_found("Emergency contact not found"));
    }
    if input.is_primary {
        demote_others(&mut store, user_id, id);
    }
    let contact = store
        .contacts
        .get_mut(&id)
        .ok_or_else(|| ApiError::not_found("Emergency contact not found"))?;
    contact.name = input.name;
    contact.relationship = input.relationship;
    contact.phone = input.phone;
    contact.email = input.email;
    contact.is_primary = input.is_primary;
    Ok(Json(contact.clone()))
}

pub async fn delete_contact(
    State(db): State<Db>,
    CurrentUser(user_id): CurrentUser,
    Path(id): Path<Id>,
) -> Result<StatusCode, ApiError> {
    let mut store = db.write().await;
    let owned = store.contacts.get(&id).is_some_and(|c| c.user_id == user_id);
    if !owned {
        return Err(ApiError::not_found("Emergency contact not found"));
    }
    store.contacts.remove(&id);
    Ok(StatusCode::NO_CONTENT)
}

// Dashboard

fn is_overdue(vaccination: &Vaccination) -> bool {
    matches!(vaccination.status.as_str(), "pending" | "due" | "overdue")
        && (today() - vaccination.scheduled_date).num_days() > OVERDUE_GRACE_DAYS
}

/// Everything the home screen shows, in one request.
pub async fn dashboard(State(db): State<Db>, CurrentUser(user_id): CurrentUser) -> Result<Json<Dashboard>, ApiError> {
    let store = db.read().await;
    let user = store
        .accounts
        .get(&user_id)
        .map(|account| account.user.clone())
        .ok_or_else(ApiError::unauthorized)?;
    let children = children_for(&store, user_id);
    let child_ids: Vec<Id> = children.iter().map(|c| c.id).collect();

    let today = today();
    let mut upcoming_appointments: Vec<_> = store
        .appointments
        .values()
        .filter(|a| a.user_id == user_id && !a.completed && a.scheduled_date >= today)
        .cloned()
        .collect();
    upcoming_appointments.sort_by_key(|a| (a.scheduled_date, a.id));
    upcoming_appointments.truncate(RECENT_LIMIT);

    let overdue_vaccinations: Vec<Vaccination> = store
        .vaccinations
        .values()
        .filter(|v| child_ids.contains(&v.child_id))
        .cloned()
        .map(with_status)
        .filter(is_overdue)
        .collect();

    let mut recent_health_records = records_for(&store, user_id);
    recent_health_records.truncate(RECENT_LIMIT);

    let growth_alerts = children
        .iter()
        .flat_map(|child| {
            let latest = store
                .growth
                .values()
                .filter(|g| g.child_id == child.id)
                .max_by_key(|g| (g.recorded_date, g.id));
            match latest {
                Some(g) => clinical::growth_alerts(&child.name, g.weight_percentile, g.height_percentile),
                None => Vec::new(),
            }
        })
        .collect();

    Ok(Json(Dashboard {
        user,
        active_pregnancy: pregnancy::active_for(&store, user_id),
        children,
        upcoming_appointments,
        overdue_vaccinations,
        recent_health_records,
        growth_alerts,
    }))
}

// Assistant

/// Canned, keyword-matched answers with the caller's context attached.
pub async fn chatbot(
    State(db): State<Db>,
    CurrentUser(user_id): CurrentUser,
    Query(input): Query<ChatQuery>,
) -> Result<Json<Value>, ApiError> {
    let query = input.query.trim().to_string();
    if query.is_empty() {
        return Err(ApiError::new(StatusCode::UNPROCESSABLE_ENTITY, "Query must not be empty"));
    }
    let store = db.read().await;
    let active = pregnancy::active_for(&store, user_id);
    let children = children_for(&store, user_id);
    let context = json!({
        "pregnancy_week": active.as_ref().and_then(|p| p.current_week),
        "children_count": children.len(),
    });
    Ok(Json(json!({
        "response": answer(&query.to_lowercase()),
        "query": query,
        "context": context,
        "disclaimer": DISCLAIMER,
    })))
}

fn answer(query: &str) -> &'static str {
    const ANSWERS: &[(&[&str], &str)] = &[
        (
            &["bleeding", "headache", "convulsion", "blurred"],
            "These can be danger signs. Please go to the nearest health facility immediately.",
        ),
        (
            &["swelling", "swollen"],
            "Mild swelling of the feet is common later in pregnancy. Sudden swelling of the face or hands needs a same-day check.",
        ),
        (
            &["vaccine", "vaccination", "immunization"],
            "Keep your child's immunization card up to date. The clinic can catch up any missed doses.",
        ),
        (
            &["breastfeed", "breastfeeding", "feeding"],
            "Exclusive breastfeeding is recommended for the first six months.",
        ),
        (
            &["nutrition", "eat", "food", "diet"],
            "Eat a variety of foods including iron-rich greens, beans and protein, and take your supplements.",
        ),
        (
            &["sad", "anxious", "depressed", "stress"],
            "You are not alone. Talking to someone you trust or a health worker can help.",
        ),
    ];
    ANSWERS
        .iter()
        .find(|(keywords, _)| keywords.iter().any(|k| query.contains(k)))
        .map_or(
            "I can help with questions about pregnancy, child health and wellbeing. Please consult your healthcare provider for personal advice.",
            |(_, reply)| *reply,
        )
}
