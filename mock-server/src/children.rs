//! Children and their vaccinations, growth records and milestones.

use std::collections::BTreeMap;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use tracing::info;

use crate::clinical;
use crate::models::{
    Child, CreateChild, CreateGrowthRecord, CreateMilestone, CreateVaccination, GrowthRecord, Id, Milestone,
    UpdateChild, UpdateGrowthRecord, UpdateMilestone, UpdateVaccination, Vaccination,
};
use crate::{now, today, ApiError, CurrentUser, Db, Store};

fn with_age(mut child: Child) -> Child {
    child.age_months = Some(clinical::age_months(child.birth_date, today()));
    child
}

/// Recompute the status of anything not yet given or skipped.
pub(crate) fn with_status(mut vaccination: Vaccination) -> Vaccination {
    if !matches!(vaccination.status.as_str(), "completed" | "skipped") {
        vaccination.status =
            clinical::vaccination_status(vaccination.scheduled_date, vaccination.administered_date, today())
                .to_string();
    }
    vaccination
}

fn is_male(child: &Child) -> bool {
    child.gender.as_deref() == Some("male")
}

/// Age, BMI and percentiles for a measurement taken on `record.recorded_date`.
fn measure(child: &Child, mut record: GrowthRecord) -> GrowthRecord {
    let age = clinical::age_months(child.birth_date, record.recorded_date);
    let male = is_male(child);
    record.age_months = Some(age);
    record.bmi = clinical::bmi(record.weight, record.height);
    record.weight_percentile = record.weight.map(|w| clinical::weight_percentile(age, w, male));
    record.height_percentile = record.height.map(|h| clinical::height_percentile(age, h, male));
    record
}

pub async fn list(State(db): State<Db>, CurrentUser(user_id): CurrentUser) -> Json<Vec<Child>> {
    let store = db.read().await;
    Json(children_for(&store, user_id))
}

pub async fn fetch(
    State(db): State<Db>,
    CurrentUser(user_id): CurrentUser,
    Path(id): Path<Id>,
) -> Result<Json<Child>, ApiError> {
    let store = db.read().await;
    Ok(Json(with_age(store.owned_child(user_id, id)?.clone())))
}

/// Registers the child and generates its immunization schedule.
pub async fn create(
    State(db): State<Db>,
    CurrentUser(user_id): CurrentUser,
    Json(input): Json<CreateChild>,
) -> Json<Child> {
    let mut store = db.write().await;
    let id = store.next_id();
    let timestamp = now();
    let child = Child {
        id,
        user_id,
        name: input.name,
        birth_date: input.birth_date,
        gender: input.gender,
        birth_weight: input.birth_weight,
        birth_length: input.birth_length,
        birth_complications: input.birth_complications,
        is_active: true,
        created_at: timestamp,
        updated_at: timestamp,
        age_months: None,
    };
    store.children.insert(id, child.clone());

    for (name, code, days) in clinical::VACCINATION_SCHEDULE {
        let vaccination_id = store.next_id();
        store.vaccinations.insert(
            vaccination_id,
            Vaccination {
                id: vaccination_id,
                child_id: id,
                vaccine_name: name.to_string(),
                vaccine_code: Some(code.to_string()),
                scheduled_date: clinical::scheduled_date(child.birth_date, *days),
                administered_date: None,
                batch_number: None,
                healthcare_provider: None,
                notes: None,
                status: "pending".to_string(),
                created_at: timestamp,
            },
        );
    }
    info!(user_id, child_id = id, "child registered");
    Json(with_age(child))
}

pub async fn update(
    State(db): State<Db>,
    CurrentUser(user_id): CurrentUser,
    Path(id): Path<Id>,
    Json(input): Json<UpdateChild>,
) -> Result<Json<Child>, ApiError> {
    let mut store = db.write().await;
    store.owned_child(user_id, id)?;
    let child = store
        .children
        .get_mut(&id)
        .ok_or_else(|| ApiError::not_found("Child not found"))?;
    if let Some(name) = input.name {
        child.name = name;
    }
    if let Some(gender) = input.gender {
        child.gender = Some(gender);
    }
    if let Some(complications) = input.birth_complications {
        child.birth_complications = Some(complications);
    }
    child.updated_at = now();
    Ok(Json(with_age(child.clone())))
}

pub async fn delete(
    State(db): State<Db>,
    CurrentUser(user_id): CurrentUser,
    Path(id): Path<Id>,
) -> Result<StatusCode, ApiError> {
    let mut store = db.write().await;
    store.owned_child(user_id, id)?;
    store.children.remove(&id);
    store.vaccinations.retain(|_, v| v.child_id != id);
    store.growth.retain(|_, g| g.child_id != id);
    store.milestones.retain(|_, m| m.child_id != id);
    info!(user_id, child_id = id, "child removed");
    Ok(StatusCode::NO_CONTENT)
}

// Vaccinations

pub async fn list_vaccinations(
    State(db): State<Db>,
    CurrentUser(user_id): CurrentUser,
    Path(child_id): Path<Id>,
) -> Result<Json<Vec<Vaccination>>, ApiError> {
    let store = db.read().await;
    store.owned_child(user_id, child_id)?;
    let mut vaccinations: Vec<Vaccination> = store
        .vaccinations
        .values()
        .filter(|v| v.child_id == child_id)
        .cloned()
        .map(with_status)
        .collect();
    vaccinations.sort_by_key(|v| (v.scheduled_date, v.id));
    Ok(Json(vaccinations))
}

pub async fn create_vaccination(
    State(db): State<Db>,
    CurrentUser(user_id): CurrentUser,
    Path(child_id): Path<Id>,
    Json(input): Json<CreateVaccination>,
) -> Result<Json<Vaccination>, ApiError> {
    let mut store = db.write().await;
    store.owned_child(user_id, child_id)?;
    let id = store.next_id();
    let vaccination = with_status(Vaccination {
        id,
        child_id,
        vaccine_name: input.vaccine_name,
        vaccine_code: input.vaccine_code,
        scheduled_date: input.scheduled_date,
        administered_date: input.administered_date,
        batch_number: input.batch_number,
        healthcare_provider: input.healthcare_provider,
        notes: input.notes,
        status: "pending".to_string(),
        created_at: now(),
    });
    store.vaccinations.insert(id, vaccination.clone());
    Ok(Json(vaccination))
}

/// Recording an administered date marks the dose completed.
pub async fn update_vaccination(
    State(db): State<Db>,
    CurrentUser(user_id): CurrentUser,
    Path((child_id, id)): Path<(Id, Id)>,
    Json(input): Json<UpdateVaccination>,
) -> Result<Json<Vaccination>, ApiError> {
    let mut store = db.write().await;
    store.owned_child(user_id, child_id)?;
    let vaccination = owned_item(&mut store.vaccinations, id, |v| v.child_id == child_id)
        .ok_or_else(|| ApiError::not_found("Vaccination not found"))?;
    if let Some(date) = input.administered_date {
        vaccination.administered_date = Some(date);
        vaccination.status = "completed".to_string();
    }
    if let Some(status) = input.status {
        vaccination.status = status;
    }
    if let Some(batch) = input.batch_number {
        vaccination.batch_number = Some(batch);
    }
    if let Some(provider) = input.healthcare_provider {
        vaccination.healthcare_provider = Some(provider);
    }
    if let Some(notes) = input.notes {
        vaccination.notes = Some(notes);
    }
    Ok(Json(with_status(vaccination.clone())))
}

pub async fn delete_vaccination(
    State(db): State<Db>,
    CurrentUser(user_id): CurrentUser,
    Path((child_id, id)): Path<(Id, Id)>,
) -> Result<StatusCode, ApiError> {
    let mut store = db.write().await;
    store.owned_child(user_id, child_id)?;
    remove_item(&mut store.vaccinations, id, |v| v.child_id == child_id)
        .ok_or_else(|| ApiError::not_found("Vaccination not found"))?;
    Ok(StatusCode::NO_CONTENT)
}

// Growth

pub async fn list_growth(
    State(db): State<Db>,
    CurrentUser(user_id): CurrentUser,
    Path(child_id): Path<Id>,
) -> Result<Json<Vec<GrowthRecord>>, ApiError> {
    let store = db.read().await;
    store.owned_child(user_id, child_id)?;
    let mut records: Vec<GrowthRecord> = store
        .growth
        .values()
        .filter(|g| g.child_id == child_id)
        .cloned()
        .collect();
    records.sort_by(|a, b| b.recorded_date.cmp(&a.recorded_date).then(b.id.cmp(&a.id)));
    Ok(Json(records))
}

pub async fn create_growth(
    State(db): State<Db>,
    CurrentUser(user_id): CurrentUser,
    Path(child_id): Path<Id>,
    Json(input): Json<CreateGrowthRecord>,
) -> Result<Json<GrowthRecord>, ApiError> {
    let mut store = db.write().await;
    let child = store.owned_child(user_id, child_id)?.clone();
    let id = store.next_id();
    let record = measure(
        &child,
        GrowthRecord {
            id,
            child_id,
            recorded_date: input.recorded_date,
            weight: input.weight,
            height: input.height,
            head_circumference: input.head_circumference,
            notes: input.notes,
            age_months: None,
            weight_percentile: None,
            height_percentile: None,
            bmi: None,
            created_at: now(),
        },
    );
    store.growth.insert(id, record.clone());
    Ok(Json(record))
}

pub async fn update_growth(
    State(db): State<Db>,
    CurrentUser(user_id): CurrentUser,
    Path((child_id, id)): Path<(Id, Id)>,
    Json(input): Json<UpdateGrowthRecord>,
) -> Result<Json<GrowthRecord>, ApiError> {
    let mut store = db.write().await;
    let child = store.owned_child(user_id, child_id)?.clone();
    let record = owned_item(&mut store.growth, id, |g| g.child_id == child_id)
        .ok_or_else(|| ApiError::not_found("Growth record not found"))?;
    if let Some(date) = input.recorded_date {
        record.recorded_date = date;
    }
    if let Some(weight) = input.weight {
        record.weight = Some(weight);
    }
    if let Some(height) = input.height {
        record.height = Some(height);
    }
    if let Some(head) = input.head_circumference {
        record.head_circumference = Some(head);
    }
    if let Some(notes) = input.notes {
        record.notes = Some(notes);
    }
    *record = measure(&child, record.clone());
    Ok(Json(record.clone()))
}

pub async fn delete_growth(
    State(db): State<Db>,
    CurrentUser(user_id): CurrentUser,
    Path((child_id, id)): Path<(Id, Id)>,
) -> Result<StatusCode, ApiError> {
    let mut store = db.write().await;
    store.owned_child(user_id, child_id)?;
    remove_item(&mut store.growth, id, |g| g.child_id == child_id)
        .ok_or_else(|| ApiError::not_found("Growth record not found"))?;
    Ok(StatusCode::NO_CONTENT)
}

// Milestones

pub async fn list_milestones(
    State(db): State<Db>,
    CurrentUser(user_id): CurrentUser,
    Path(child_id): Path<Id>,
) -> Result<Json<Vec<Milestone>>, ApiError> {
    let store = db.read().await;
    store.owned_child(user_id, child_id)?;
    let mut milestones: Vec<Milestone> = store
        .milestones
        .values()
        .filter(|m| m.child_id == child_id)
        .cloned()
        .collect();
    milestones.sort_by_key(|m| (m.typical_age_months, m.id));
    Ok(Json(milestones))
}

pub async fn create_milestone(
    State(db): State<Db>,
    CurrentUser(user_id): CurrentUser,
    Path(child_id): Path<Id>,
    Json(input): Json<CreateMilestone>,
) -> Result<Json<Milestone>, ApiError> {
    let mut store = db.write().await;
    store.owned_child(user_id, child_id)?;
    let id = store.next_id();
    let milestone = Milestone {
        id,
        child_id,
        milestone_type: input.milestone_type,
        milestone_name: input.milestone_name,
        typical_age_months: input.typical_age_months,
        is_achieved: input.is_achieved || input.achieved_date.is_some(),
        achieved_date: input.achieved_date,
        notes: input.notes,
        created_at: now(),
    };
    store.milestones.insert(id, milestone.clone());
    Ok(Json(milestone))
}

pub async fn update_milestone(
    State(db): State<Db>,
    CurrentUser(user_id): CurrentUser,
    Path((child_id, id)): Path<(Id, Id)>,
    Json(input): Json<UpdateMilestone>,
) -> Result<Json<Milestone>, ApiError> {
    let mut store = db.write().await;
    store.owned_child(user_id, child_id)?;
    let milestone = owned_item(&mut store.milestones, id, |m| m.child_id == child_id)
        .ok_or_else(|| ApiError::not_found("Milestone not found"))?;
    if let Some(date) = input.achieved_date {
        milestone.achieved_date = Some(date);
        milestone.is_achieved = true;
    }
    if let Some(achieved) = input.is_achieved {
        milestone.is_achieved = achieved;
    }
    if let Some(notes) = input.notes {
        milestone.notes = Some(notes);
    }
    Ok(Json(milestone.clone()))
}

pub async fn delete_milestone(
    State(db): State<Db>,
    CurrentUser(user_id): CurrentUser,
    Path((child_id, id)): Path<(Id, Id)>,
) -> Result<StatusCode, ApiError> {
    let mut store = db.write().await;
    store.owned_child(user_id, child_id)?;
    remove_item(&mut store.milestones, id, |m| m.child_id == child_id)
        .ok_or_else(|| ApiError::not_found("Milestone not found"))?;
    Ok(StatusCode::NO_CONTENT)
}

fn owned_item<T>(
    table: &mut BTreeMap<Id, T>,
    id: Id,
    belongs: impl Fn(&T) -> bool,
) -> Option<&mut T> {
    table.get_mut(&id).filter(|item| belongs(item))
}

fn remove_item<T>(table: &mut BTreeMap<Id, T>, id: Id, belongs: impl Fn(&T) -> bool) -> Option<T> {
    if table.get(&id).is_some_and(|item| belongs(item)) {
        table.remove(&id)
    } else {
        None
    }
}

/// Children of `user_id`, with their current age.
pub(crate) fn children_for(store: &Store, user_id: Id) -> Vec<Child> {
    store
        .children
        .values()
        .filter(|child| child.user_id == user_id && child.is_active)
        .cloned()
        .map(with_age)
        .collect()
}
