//! Children and their per-child vaccinations, growth and milestones.

use chrono::{Months, NaiveDate};

use crate::cache::{BucketCache, Collection, FetchStatus, RecordId, RequestState};
use crate::error::ApiError;
use crate::models::{
    Child, ChildUpdate, GrowthRecord, GrowthUpdate, Milestone, MilestoneUpdate, NewChild, NewGrowthRecord,
    NewMilestone, NewVaccination, Owned, Owner, Vaccination, VaccinationStatus, VaccinationUpdate,
};
use crate::transport::Backend;

use super::{fetch_bucket, track};

const UPCOMING_LIMIT: usize = 5;

#[derive(Default)]
pub struct ChildrenStore {
    children: Collection<Child>,
    selected: Option<RecordId>,
    vaccinations: BucketCache<Vaccination>,
    growth: BucketCache<GrowthRecord>,
    milestones: BucketCache<Milestone>,
    pub status: RequestState,
}

impl ChildrenStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn children(&self) -> &[Child] {
        self.children.as_slice()
    }

    pub fn child(&self, id: RecordId) -> Option<&Child> {
        self.children.get(id)
    }

    pub fn error(&self) -> Option<&str> {
        self.status.error.as_deref()
    }

    pub fn clear_error(&mut self) {
        self.status.clear_error();
    }

    pub fn fetch_all(&mut self, backend: &Backend) -> Result<&[Child], ApiError> {
        let children = track(&mut self.status, "Failed to fetch children", || {
            backend.get_json::<Vec<Child>>("/children")
        })?;
        self.children.replace_all(children);
        if self.selected.is_some_and(|id| !self.children.contains(id)) {
            self.selected = None;
        }
        Ok(self.children.as_slice())
    }

    /// One child, from cache when present.
    pub fn fetch_child(&mut self, backend: &Backend, id: RecordId) -> Result<&Child, ApiError> {
        if let Some(index) = self.children.position(id) {
            return Ok(&self.children.as_slice()[index]);
        }
        let child = track(&mut self.status, "Failed to fetch child", || {
            backend.get_json::<Child>(&format!("/children/{id}"))
        })?;
        Ok(self.children.upsert(child))
    }

    pub fn create(&mut self, backend: &Backend, input: &NewChild) -> Result<&Child, ApiError> {
        let created = track(&mut self.status, "Failed to create child record", || {
            backend.post_json::<_, Child>("/children", input)
        })?;
        Ok(self.children.upsert(created))
    }

    /// Update a child. The cached record, if any, is replaced in place.
    pub fn update(&mut self, backend: &Backend, id: RecordId, input: &ChildUpdate) -> Result<Child, ApiError> {
        let updated = track(&mut self.status, "Failed to update child", || {
            backend.put_json::<_, Child>(&format!("/children/{id}"), input)
        })?;
        self.children.replace(id, &updated);
        Ok(updated)
    }

    /// Delete a child and everything cached under it.
    pub fn delete(&mut self, backend: &Backend, id: RecordId) -> Result<(), ApiError> {
        track(&mut self.status, "Failed to delete child", || {
            backend.delete(&format!("/children/{id}"))
        })?;
        self.children.remove(id);
        self.invalidate(id);
        if self.selected == Some(id) {
            self.selected = None;
        }
        Ok(())
    }

    /// Select a cached child. Returns false, clearing the selection, when
    /// `id` is not cached.
    pub fn select(&mut self, id: RecordId) -> bool {
        let known = self.children.contains(id);
        self.selected = known.then_some(id);
        known
    }

    pub fn clear_selection(&mut self) {
        self.selected = None;
    }

    pub fn selected(&self) -> Option<&Child> {
        self.selected.and_then(|id| self.children.get(id))
    }

    /// Drop the vaccination, growth and milestone buckets for `child_id`.
    pub fn invalidate(&mut self, child_id: RecordId) {
        self.vaccinations.invalidate(child_id);
        self.growth.invalidate(child_id);
        self.milestones.invalidate(child_id);
    }

    // Vaccinations

    pub fn fetch_vaccinations(&mut self, backend: &Backend, child_id: RecordId) -> Result<&[Vaccination], ApiError> {
        fetch_bucket(
            backend,
            &mut self.status,
            &mut self.vaccinations,
            child_id,
            &format!("/children/{child_id}/vaccinations"),
            "Failed to fetch vaccinations",
        )
    }

    pub fn vaccinations(&self, child_id: RecordId) -> &[Vaccination] {
        self.vaccinations.get(child_id)
    }

    pub fn vaccinations_status(&self, child_id: RecordId) -> FetchStatus {
        self.vaccinations.status(child_id)
    }

    pub fn create_vaccination(
        &mut self,
        backend: &Backend,
        child_id: RecordId,
        input: &NewVaccination,
    ) -> Result<&Vaccination, ApiError> {
        let body = Owned {
            payload: input,
            owner: Owner::Child { child_id },
        };
        let created = track(&mut self.status, "Failed to create vaccination record", || {
            backend.post_json::<_, Vaccination>(&format!("/children/{child_id}/vaccinations"), &body)
        })?;
        Ok(self.vaccinations.push(child_id, created))
    }

    pub fn update_vaccination(
        &mut self,
        backend: &Backend,
        child_id: RecordId,
        id: RecordId,
        input: &VaccinationUpdate,
    ) -> Result<Vaccination, ApiError> {
        let updated = track(&mut self.status, "Failed to update vaccination", || {
            backend.put_json::<_, Vaccination>(&format!("/children/{child_id}/vaccinations/{id}"), input)
        })?;
        self.vaccinations.apply_update(child_id, &updated);
        Ok(updated)
    }

    pub fn delete_vaccination(&mut self, backend: &Backend, child_id: RecordId, id: RecordId) -> Result<(), ApiError> {
        track(&mut self.status, "Failed to delete vaccination", || {
            backend.delete(&format!("/children/{child_id}/vaccinations/{id}"))
        })?;
        self.vaccinations.remove(child_id, id);
        Ok(())
    }

    /// Cached vaccinations across all children with the given status.
    pub fn vaccinations_with_status(&self, status: VaccinationStatus) -> Vec<&Vaccination> {
        self.vaccinations.iter_all().filter(|v| v.status == status).collect()
    }

    pub fn overdue_vaccinations(&self) -> Vec<&Vaccination> {
        self.vaccinations_with_status(VaccinationStatus::Overdue)
    }

    /// Pending vaccinations scheduled between `today` and one month later,
    /// inclusive, at most five.
    pub fn upcoming_vaccinations(&self, today: NaiveDate) -> Vec<&Vaccination> {
        let horizon = today.checked_add_months(Months::new(1)).unwrap_or(today);
        self.vaccinations
            .iter_all()
            .filter(|v| v.status == VaccinationStatus::Pending)
            .filter(|v| (today..=horizon).contains(&v.scheduled_date))
            .take(UPCOMING_LIMIT)
            .collect()
    }

    // Growth

    pub fn fetch_growth_records(&mut self, backend: &Backend, child_id: RecordId) -> Result<&[GrowthRecord], ApiError> {
        fetch_bucket(
            backend,
            &mut self.status,
            &mut self.growth,
            child_id,
            &format!("/children/{child_id}/growth"),
            "Failed to fetch growth records",
        )
    }

    pub fn growth_records(&self, child_id: RecordId) -> &[GrowthRecord] {
        self.growth.get(child_id)
    }

    pub fn growth_status(&self, child_id: RecordId) -> FetchStatus {
        self.growth.status(child_id)
    }

    /// Growth records oldest first, for charting.
    pub fn growth_history(&self, child_id: RecordId) -> Vec<&GrowthRecord> {
        let mut history: Vec<&GrowthRecord> = self.growth.get(child_id).iter().collect();
        history.sort_by_key(|record| record.recorded_date);
        history
    }

    pub fn create_growth_record(
        &mut self,
        backend: &Backend,
        child_id: RecordId,
        input: &NewGrowthRecord,
    ) -> Result<&GrowthRecord, ApiError> {
        let body = Owned {
            payload: input,
            owner: Owner::Child { child_id },
        };
        let created = track(&mut self.status, "Failed to create growth record", || {
            backend.post_json::<_, GrowthRecord>(&format!("/children/{child_id}/growth"), &body)
        })?;
        Ok(self.growth.push(child_id, created))
    }

    pub fn update_growth_record(
        &mut self,
        backend: &Backend,
        child_id: RecordId,
        id: RecordId,
        input: &GrowthUpdate,
    ) -> Result<GrowthRecord, ApiError> {
        let updated = track(&mut self.status, "Failed to update growth record", || {
            backend.put_json::<_, GrowthRecord>(&format!("/children/{child_id}/growth/{id}"), input)
        })?;
        self.growth.apply_update(child_id, &updated);
        Ok(updated)
    }

    pub fn delete_growth_record(&mut self, backend: &Backend, child_id: RecordId, id: RecordId) -> Result<(), ApiError> {
        track(&mut self.status, "Failed to delete growth record", || {
            backend.delete(&format!("/children/{child_id}/growth/{id}"))
        })?;
        self.growth.remove(child_id, id);
        Ok(())
    }

    // Milestones

    pub fn fetch_milestones(&mut self, backend: &Backend, child_id: RecordId) -> Result<&[Milestone], ApiError> {
        fetch_bucket(
            backend,
            &mut self.status,
            &mut self.milestones,
            child_id,
            &format!("/children/{child_id}/milestones"),
            "Failed to fetch milestones",
        )
    }

    pub fn milestones(&self, child_id: RecordId) -> &[Milestone] {
        self.milestones.get(child_id)
    }

    pub fn milestones_status(&self, child_id: RecordId) -> FetchStatus {
        self.milestones.status(child_id)
    }

    pub fn create_milestone(
        &mut self,
        backend: &Backend,
        child_id: RecordId,
        input: &NewMilestone,
    ) -> Result<&Milestone, ApiError> {
        let body = Owned {
            payload: input,
            owner: Owner::Child { child_id },
        };
        let created = track(&mut self.status, "Failed to create milestone", || {
            backend.post_json::<_, Milestone>(&format!("/children/{child_id}/milestones"), &body)
        })?;
        Ok(self.milestones.push(child_id, created))
    }

    pub fn update_milestone(
        &mut self,
        backend: &Backend,
        child_id: RecordId,
        id: RecordId,
        input: &MilestoneUpdate,
    ) -> Result<Milestone, ApiError> {
        let updated = track(&mut self.status, "Failed to update milestone", || {
            backend.put_json::<_, Milestone>(&format!("/children/{child_id}/milestones/{id}"), input)
        })?;
        self.milestones.apply_update(child_id, &updated);
        Ok(updated)
    }

    pub fn delete_milestone(&mut self, backend: &Backend, child_id: RecordId, id: RecordId) -> Result<(), ApiError> {
        track(&mut self.status, "Failed to delete milestone", || {
            backend.delete(&format!("/children/{child_id}/milestones/{id}"))
        })?;
        self.milestones.remove(child_id, id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use serde_json::{json, Value};

    use super::*;
    use crate::http::HttpMethod;
    use crate::transport::testing::backend;

    fn child_json(id: RecordId, name: &str) -> Value {
        json!({
            "id": id,
            "user_id": 1,
            "name": name,
            "birth_date": "2023-06-01",
            "gender": "female",
            "is_active": true,
            "created_at": "2023-06-02T09:00:00",
            "updated_at": "2023-06-02T09:00:00",
            "age_months": 7
        })
    }

    fn vaccination_json(id: RecordId, child_id: RecordId, date: &str, status: &str) -> Value {
        json!({
            "id": id,
            "child_id": child_id,
            "vaccine_name": "OPV",
            "scheduled_date": date,
            "status": status,
            "created_at": "2023-06-02T09:00:00"
        })
    }

    fn growth_json(id: RecordId, child_id: RecordId, date: &str, weight: f64) -> Value {
        json!({
            "id": id,
            "child_id": child_id,
            "recorded_date": date,
            "weight": weight,
            "created_at": "2023-06-02T09:00:00"
        })
    }

    fn milestone_json(id: RecordId, child_id: RecordId, achieved: bool) -> Value {
        json!({
            "id": id,
            "child_id": child_id,
            "milestone_type": "motor",
            "milestone_name": "Sits without support",
            "typical_age_months": 6,
            "is_achieved": achieved,
            "created_at": "2023-06-02T09:00:00"
        })
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn loaded_store(children: Value) -> (ChildrenStore, Backend, crate::transport::testing::ScriptedTransport) {
        let (backend, transport) = backend();
        transport.reply(200, children);
        let mut store = ChildrenStore::new();
        store.fetch_all(&backend).unwrap();
        (store, backend, transport)
    }

    #[test]
    fn fetch_all_failure_keeps_cache_and_sets_error() {
        let (mut store, backend, transport) = loaded_store(json!([child_json(1, "Amani")]));
        transport.reply(503, json!({"detail": "Service unavailable"}));
        assert!(store.fetch_all(&backend).is_err());
        assert_eq!(store.children().len(), 1);
        assert_eq!(store.error(), Some("Service unavailable"));
        assert!(!store.status.busy);
    }

    #[test]
    fn fetch_child_uses_cache_first() {
        let (mut store, backend, transport) = loaded_store(json!([child_json(1, "Amani")]));
        assert_eq!(store.fetch_child(&backend, 1).unwrap().name, "Amani");
        assert_eq!(transport.request_count(), 1);

        transport.reply(200, child_json(2, "Baraka"));
        assert_eq!(store.fetch_child(&backend, 2).unwrap().name, "Baraka");
        assert_eq!(transport.last_request().path, "http://api.test/children/2");
        assert_eq!(store.children().len(), 2);
    }

    #[test]
    fn create_and_update_child() {
        let (backend, transport) = backend();
        transport.reply(200, child_json(5, "Zawadi"));
        let mut store = ChildrenStore::new();
        let input = NewChild {
            name: "Zawadi".to_string(),
            birth_date: date(2023, 6, 1),
            gender: None,
            birth_weight: Some(3.2),
            birth_length: None,
            birth_complications: None,
        };
        store.create(&backend, &input).unwrap();

        transport.reply(200, child_json(5, "Zawadi Wanjiru"));
        let update = ChildUpdate {
            name: Some("Zawadi Wanjiru".to_string()),
            ..ChildUpdate::default()
        };
        store.update(&backend, 5, &update).unwrap();
        assert_eq!(store.children().len(), 1);
        assert_eq!(store.child(5).unwrap().name, "Zawadi Wanjiru");
        assert_eq!(transport.last_request().method, HttpMethod::Put);
    }

    #[test]
    fn updates_leave_uncached_records_alone() {
        let (mut store, backend, transport) = loaded_store(json!([child_json(1, "Amani")]));
        transport
            .reply(200, child_json(2, "Baraka"))
            .reply(200, vaccination_json(10, 2, "2024-01-05", "completed"));

        let update = ChildUpdate {
            name: Some("Baraka".to_string()),
            ..ChildUpdate::default()
        };
        assert_eq!(store.update(&backend, 2, &update).unwrap().name, "Baraka");
        let ids: Vec<_> = store.children().iter().map(|c| c.id).collect();
        assert_eq!(ids, [1]);

        let administered = VaccinationUpdate {
            administered_date: Some(date(2024, 1, 5)),
            ..VaccinationUpdate::default()
        };
        let updated = store.update_vaccination(&backend, 2, 10, &administered).unwrap();
        assert_eq!(updated.status, VaccinationStatus::Completed);
        assert_eq!(store.vaccinations_status(2), FetchStatus::NotFetched);
        assert!(store.vaccinations(2).is_empty());
    }

    #[test]
    fn delete_cascades_to_buckets_and_selection() {
        let (mut store, backend, transport) = loaded_store(json!([child_json(1, "Amani"), child_json(2, "Baraka")]));
        transport
            .reply(200, json!([vaccination_json(10, 1, "2024-01-05", "pending")]))
            .reply(200, json!([growth_json(20, 1, "2023-12-01", 7.1)]))
            .reply(200, json!([milestone_json(30, 1, false)]))
            .reply(200, json!([vaccination_json(11, 2, "2024-01-06", "pending")]))
            .reply(204, Value::Null);
        store.fetch_vaccinations(&backend, 1).unwrap();
        store.fetch_growth_records(&backend, 1).unwrap();
        store.fetch_milestones(&backend, 1).unwrap();
        store.fetch_vaccinations(&backend, 2).unwrap();
        assert!(store.select(1));

        store.delete(&backend, 1).unwrap();
        assert!(store.child(1).is_none());
        assert!(store.selected().is_none());
        assert_eq!(store.vaccinations_status(1), FetchStatus::NotFetched);
        assert_eq!(store.growth_status(1), FetchStatus::NotFetched);
        assert_eq!(store.milestones_status(1), FetchStatus::NotFetched);
        assert_eq!(store.vaccinations(2).len(), 1);
    }

    #[test]
    fn failed_delete_leaves_everything_in_place() {
        let (mut store, backend, transport) = loaded_store(json!([child_json(1, "Amani")]));
        store.select(1);
        transport.reply(500, Value::Null);
        assert!(store.delete(&backend, 1).is_err());
        assert_eq!(store.selected().unwrap().id, 1);
        assert_eq!(store.error(), Some("Failed to delete child"));
    }

    #[test]
    fn select_unknown_child_clears_selection() {
        let (mut store, _backend, _transport) = loaded_store(json!([child_json(1, "Amani")]));
        assert!(store.select(1));
        assert!(!store.select(42));
        assert!(store.selected().is_none());
    }

    #[test]
    fn sub_resources_are_fetched_once_per_child() {
        let (backend, transport) = backend();
        transport
            .reply(200, json!([]))
            .reply(200, json!([growth_json(20, 3, "2023-12-01", 7.1)]));
        let mut store = ChildrenStore::new();
        assert!(store.fetch_vaccinations(&backend, 3).unwrap().is_empty());
        assert!(store.fetch_vaccinations(&backend, 3).unwrap().is_empty());
        assert_eq!(store.vaccinations_status(3), FetchStatus::Loaded);
        store.fetch_growth_records(&backend, 3).unwrap();
        assert_eq!(transport.request_count(), 2);
        assert_eq!(transport.last_request().path, "http://api.test/children/3/growth");

        store.invalidate(3);
        transport.reply(200, json!([]));
        store.fetch_vaccinations(&backend, 3).unwrap();
        assert_eq!(transport.request_count(), 3);
    }

    #[test]
    fn create_vaccination_sends_child_id() {
        let (backend, transport) = backend();
        transport.reply(200, vaccination_json(12, 4, "2024-02-01", "pending"));
        let mut store = ChildrenStore::new();
        let input = NewVaccination {
            vaccine_name: "OPV".to_string(),
            vaccine_code: None,
            scheduled_date: date(2024, 2, 1),
            administered_date: None,
            batch_number: None,
            healthcare_provider: None,
            notes: None,
        };
        store.create_vaccination(&backend, 4, &input).unwrap();
        let request = transport.last_request();
        assert_eq!(request.path, "http://api.test/children/4/vaccinations");
        let body: Value = serde_json::from_str(request.body.as_deref().unwrap()).unwrap();
        assert_eq!(body["child_id"], 4);
        assert_eq!(store.vaccinations(4).len(), 1);
    }

    #[test]
    fn update_vaccination_replaces_in_bucket() {
        let (backend, transport) = backend();
        transport.reply(
            200,
            json!([
                vaccination_json(10, 1, "2024-01-05", "pending"),
                vaccination_json(11, 1, "2024-01-20", "pending")
            ]),
        );
        let mut store = ChildrenStore::new();
        store.fetch_vaccinations(&backend, 1).unwrap();

        let mut done = vaccination_json(10, 1, "2024-01-05", "completed");
        done["administered_date"] = json!("2024-01-05");
        transport.reply(200, done);
        let update = VaccinationUpdate {
            status: Some(VaccinationStatus::Completed),
            administered_date: Some(date(2024, 1, 5)),
            ..VaccinationUpdate::default()
        };
        store.update_vaccination(&backend, 1, 10, &update).unwrap();
        let cached = store.vaccinations(1);
        assert_eq!(cached.len(), 2);
        assert_eq!(cached[0].status, VaccinationStatus::Completed);
        assert_eq!(cached[1].id, 11);
    }

    #[test]
    fn unknown_vaccination_status_keeps_the_bucket() {
        let (backend, transport) = backend();
        transport.reply(
            200,
            json!([
                vaccination_json(10, 1, "2024-01-05", "overdue"),
                vaccination_json(11, 1, "2024-01-20", "postponed")
            ]),
        );
        let mut store = ChildrenStore::new();
        assert_eq!(store.fetch_vaccinations(&backend, 1).unwrap().len(), 2);
        assert_eq!(store.vaccinations(1)[1].status, VaccinationStatus::Other("postponed".to_string()));
        let overdue: Vec<_> = store.overdue_vaccinations().iter().map(|v| v.id).collect();
        assert_eq!(overdue, [10]);
    }

    #[test]
    fn overdue_vaccinations_span_children() {
        let (backend, transport) = backend();
        transport
            .reply(200, json!([vaccination_json(10, 1, "2023-11-01", "overdue"), vaccination_json(11, 1, "2024-03-01", "pending")]))
            .reply(200, json!([vaccination_json(20, 2, "2023-10-01", "overdue")]));
        let mut store = ChildrenStore::new();
        store.fetch_vaccinations(&backend, 2).unwrap();
        store.fetch_vaccinations(&backend, 1).unwrap();
        let ids: Vec<_> = store.overdue_vaccinations().iter().map(|v| v.id).collect();
        assert_eq!(ids, [10, 20]);
    }

    #[test]
    fn upcoming_vaccinations_within_one_month() {
        let (backend, transport) = backend();
        transport.reply(
            200,
            json!([
                vaccination_json(1, 1, "2024-01-01", "pending"),
                vaccination_json(2, 1, "2024-01-16", "pending"),
                vaccination_json(3, 1, "2024-02-10", "pending"),
                vaccination_json(4, 1, "2024-01-10", "completed"),
                vaccination_json(5, 1, "2023-12-31", "pending")
            ]),
        );
        let mut store = ChildrenStore::new();
        store.fetch_vaccinations(&backend, 1).unwrap();
        let ids: Vec<_> = store.upcoming_vaccinations(date(2024, 1, 1)).iter().map(|v| v.id).collect();
        assert_eq!(ids, [1, 2]);
    }

    #[test]
    fn upcoming_vaccinations_capped_at_five() {
        let (backend, transport) = backend();
        let pending: Vec<Value> = (1..=8)
            .map(|day| vaccination_json(day, 1, &format!("2024-01-{:02}", day), "pending"))
            .collect();
        transport.reply(200, Value::Array(pending));
        let mut store = ChildrenStore::new();
        store.fetch_vaccinations(&backend, 1).unwrap();
        assert_eq!(store.upcoming_vaccinations(date(2024, 1, 1)).len(), 5);
    }

    #[test]
    fn growth_history_is_chronological() {
        let (backend, transport) = backend();
        transport.reply(
            200,
            json!([
                growth_json(1, 1, "2024-01-01", 8.0),
                growth_json(2, 1, "2023-09-01", 6.0),
                growth_json(3, 1, "2023-11-01", 7.0)
            ]),
        );
        let mut store = ChildrenStore::new();
        store.fetch_growth_records(&backend, 1).unwrap();
        let weights: Vec<_> = store.growth_history(1).iter().filter_map(|g| g.weight).collect();
        assert_eq!(weights, [6.0, 7.0, 8.0]);
        assert_eq!(store.growth_records(1)[0].id, 1);
    }

    #[test]
    fn growth_and_milestone_mutations() {
        let (backend, transport) = backend();
        transport
            .reply(200, growth_json(7, 2, "2024-01-15", 8.4))
            .reply(200, milestone_json(8, 2, false))
            .reply(200, milestone_json(8, 2, true))
            .reply(204, Value::Null);
        let mut store = ChildrenStore::new();
        let growth = NewGrowthRecord {
            recorded_date: date(2024, 1, 15),
            weight: Some(8.4),
            height: None,
            head_circumference: None,
            notes: None,
        };
        store.create_growth_record(&backend, 2, &growth).unwrap();
        let milestone = NewMilestone {
            milestone_type: "motor".to_string(),
            milestone_name: "Sits without support".to_string(),
            typical_age_months: 6,
            achieved_date: None,
            is_achieved: false,
            notes: None,
        };
        store.create_milestone(&backend, 2, &milestone).unwrap();
        let update = MilestoneUpdate {
            is_achieved: Some(true),
            ..MilestoneUpdate::default()
        };
        assert!(store.update_milestone(&backend, 2, 8, &update).unwrap().is_achieved);
        assert_eq!(store.milestones(2).len(), 1);

        store.delete_growth_record(&backend, 2, 7).unwrap();
        assert!(store.growth_records(2).is_empty());
        assert_eq!(transport.last_request().path, "http://api.test/children/2/growth/7");
    }
}
