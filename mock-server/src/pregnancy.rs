//! Pregnancies, the active pregnancy, appointments and weekly guidance.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde_json::{json, Value};
use tracing::info;

use crate::clinical;
use crate::models::{
    Appointment, AppointmentFilter, CreateAppointment, CreatePregnancy, Id, Pregnancy, UpdateAppointment,
    UpdatePregnancy, WeeklyInfo,
};
use crate::{now, today, ApiError, CurrentUser, Db, Store};

/// Fill in the fields derived from the due date.
fn with_progress(mut pregnancy: Pregnancy) -> Pregnancy {
    let today = today();
    let week = clinical::pregnancy_week(pregnancy.due_date, today);
    pregnancy.current_week = Some(pregnancy.current_week.unwrap_or(week));
    pregnancy.weeks_remaining = Some(clinical::weeks_remaining(pregnancy.due_date, today));
    pregnancy.trimester = Some(clinical::trimester(week));
    pregnancy
}

pub(crate) fn active_for(store: &Store, user_id: Id) -> Option<Pregnancy> {
    store
        .pregnancies
        .values()
        .find(|p| p.user_id == user_id && p.is_active)
        .cloned()
        .map(with_progress)
}

pub async fn list(State(db): State<Db>, CurrentUser(user_id): CurrentUser) -> Json<Vec<Pregnancy>> {
    let store = db.read().await;
    let mut pregnancies: Vec<Pregnancy> = store
        .pregnancies
        .values()
        .filter(|p| p.user_id == user_id)
        .cloned()
        .map(with_progress)
        .collect();
    pregnancies.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
    Json(pregnancies)
}

pub async fn active(State(db): State<Db>, CurrentUser(user_id): CurrentUser) -> Result<Json<Pregnancy>, ApiError> {
    let store = db.read().await;
    active_for(&store, user_id)
        .map(Json)
        .ok_or_else(|| ApiError::not_found("No active pregnancy found"))
}

pub async fn fetch(
    State(db): State<Db>,
    CurrentUser(user_id): CurrentUser,
    Path(id): Path<Id>,
) -> Result<Json<Pregnancy>, ApiError> {
    let store = db.read().await;
    let pregnancy = store.owned_pregnancy(user_id, id)?.clone();
    Ok(Json(with_progress(pregnancy)))
}

/// A new pregnancy becomes the active one.
pub async fn create(
    State(db): State<Db>,
    CurrentUser(user_id): CurrentUser,
    Json(input): Json<CreatePregnancy>,
) -> Json<Pregnancy> {
    let mut store = db.write().await;
    for pregnancy in store.pregnancies.values_mut().filter(|p| p.user_id == user_id) {
        pregnancy.is_active = false;
    }
    let id = store.next_id();
    let timestamp = now();
    let pregnancy = Pregnancy {
        id,
        user_id,
        due_date: input.due_date,
        current_week: None,
        last_weight: input.last_weight,
        last_checkup: input.last_checkup,
        complications: input.complications,
        notes: input.notes,
        is_active: true,
        created_at: timestamp,
        updated_at: timestamp,
        weeks_remaining: None,
        trimester: None,
    };
    store.pregnancies.insert(id, pregnancy.clone());
    info!(user_id, pregnancy_id = id, "pregnancy created");
    Json(with_progress(pregnancy))
}

pub async fn update(
    State(db): State<Db>,
    CurrentUser(user_id): CurrentUser,
    Path(id): Path<Id>,
    Json(input): Json<UpdatePregnancy>,
) -> Result<Json<Pregnancy>, ApiError> {
    let mut store = db.write().await;
    store.owned_pregnancy(user_id, id)?;
    let pregnancy = store
        .pregnancies
        .get_mut(&id)
        .ok_or_else(|| ApiError::not_found("Pregnancy not found"))?;
    if let Some(week) = input.current_week {
        pregnancy.current_week = Some(week);
    }
    if let Some(weight) = input.last_weight {
        pregnancy.last_weight = Some(weight);
    }
    if let Some(checkup) = input.last_checkup {
        pregnancy.last_checkup = Some(checkup);
    }
    if let Some(complications) = input.complications {
        pregnancy.complications = Some(complications);
    }
    if let Some(notes) = input.notes {
        pregnancy.notes = Some(notes);
    }
    pregnancy.updated_at = now();
    Ok(Json(with_progress(pregnancy.clone())))
}

pub async fn delete(
    State(db): State<Db>,
    CurrentUser(user_id): CurrentUser,
    Path(id): Path<Id>,
) -> Result<StatusCode, ApiError> {
    let mut store = db.write().await;
    store.owned_pregnancy(user_id, id)?;
    store.pregnancies.remove(&id);
    store.appointments.retain(|_, a| a.pregnancy_id != id);
    Ok(StatusCode::NO_CONTENT)
}

/// All of the caller's appointments, or one pregnancy's with
/// `?pregnancy_id=`, soonest first.
pub async fn list_appointments(
    State(db): State<Db>,
    CurrentUser(user_id): CurrentUser,
    Query(filter): Query<AppointmentFilter>,
) -> Json<Vec<Appointment>> {
    let store = db.read().await;
    let mut appointments: Vec<Appointment> = store
        .appointments
        .values()
        .filter(|a| a.user_id == user_id)
        .filter(|a| filter.pregnancy_id.map_or(true, |id| a.pregnancy_id == id))
        .cloned()
        .collect();
    appointments.sort_by_key(|a| (a.scheduled_date, a.id));
    Json(appointments)
}

pub async fn create_appointment(
    State(db): State<Db>,
    CurrentUser(user_id): CurrentUser,
    Json(input): Json<CreateAppointment>,
) -> Result<Json<Appointment>, ApiError> {
    let mut store = db.write().await;
    store.owned_pregnancy(user_id, input.pregnancy_id)?;
    let id = store.next_id();
    let appointment = Appointment {
        id,
        pregnancy_id: input.pregnancy_id,
        user_id,
        appointment_type: input.appointment_type,
        scheduled_date: input.scheduled_date,
        notes: input.notes,
        location: input.location,
        completed: false,
        created_at: now(),
    };
    store.appointments.insert(id, appointment.clone());
    Ok(Json(appointment))
}

pub async fn update_appointment(
    State(db): State<Db>,
    CurrentUser(user_id): CurrentUser,
    Path(id): Path<Id>,
    Json(input): Json<UpdateAppointment>,
) -> Result<Json<Appointment>, ApiError> {
    let mut store = db.write().await;
    let appointment = store
        .appointments
        .get_mut(&id)
        .filter(|a| a.user_id == user_id)
        .ok_or_else(|| ApiError::not_found("Appointment not found"))?;
    if let Some(date) = input.scheduled_date {
        appointment.scheduled_date = date;
    }
    if let Some(completed) = input.completed {
        appointment.completed = completed;
    }
    if let Some(notes) = input.notes {
        appointment.notes = Some(notes);
    }
    if let Some(location) = input.location {
        appointment.location = Some(location);
    }
    Ok(Json(appointment.clone()))
}

pub async fn delete_appointment(
    State(db): State<Db>,
    CurrentUser(user_id): CurrentUser,
    Path(id): Path<Id>,
) -> Result<StatusCode, ApiError> {
    let mut store = db.write().await;
    let owned = store.appointments.get(&id).is_some_and(|a| a.user_id == user_id);
    if !owned {
        return Err(ApiError::not_found("Appointment not found"));
    }
    store.appointments.remove(&id);
    Ok(StatusCode::NO_CONTENT)
}

pub async fn weekly_info(State(db): State<Db>, CurrentUser(user_id): CurrentUser) -> Result<Json<WeeklyInfo>, ApiError> {
    let store = db.read().await;
    let pregnancy = active_for(&store, user_id).ok_or_else(|| ApiError::not_found("No active pregnancy found"))?;
    let week = clinical::pregnancy_week(pregnancy.due_date, today());
    let trimester = clinical::trimester(week);
    Ok(Json(WeeklyInfo {
        week,
        trimester,
        baby_size: clinical::baby_size(week).to_string(),
        symptoms: clinical::common_symptoms(trimester),
        tips: clinical::pregnancy_tips(trimester),
        appointments: clinical::recommended_appointments(week),
    }))
}

pub async fn danger_signs() -> Json<Value> {
    let signs: Vec<Value> = clinical::DANGER_SIGNS
        .iter()
        .map(|(symptom, urgency, action)| json!({ "symptom": symptom, "urgency": urgency, "action": action }))
        .collect();
    Json(json!({ "danger_signs": signs }))
}
