//! Pregnancies, the active pregnancy, and appointments per pregnancy.

use chrono::NaiveDate;

use crate::cache::{BucketCache, Collection, FetchStatus, RecordId, RequestState};
use crate::client::with_query;
use crate::error::ApiError;
use crate::models::{
    Appointment, AppointmentUpdate, DangerSign, DangerSigns, NewAppointment, NewPregnancy, Owned, Owner,
    Pregnancy, PregnancyUpdate, WeeklyInfo,
};
use crate::transport::Backend;

use super::{fetch_bucket, track};

const UPCOMING_LIMIT: usize = 5;

#[derive(Default)]
pub struct PregnancyStore {
    pregnancies: Collection<Pregnancy>,
    active: Option<RecordId>,
    appointments: BucketCache<Appointment>,
    weekly_info: Option<WeeklyInfo>,
    danger_signs: Option<Vec<DangerSign>>,
    pub status: RequestState,
}

impl PregnancyStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn pregnancies(&self) -> &[Pregnancy] {
        self.pregnancies.as_slice()
    }

    pub fn pregnancy(&self, id: RecordId) -> Option<&Pregnancy> {
        self.pregnancies.get(id)
    }

    /// The active pregnancy; always one of the cached records.
    pub fn active(&self) -> Option<&Pregnancy> {
        self.active.and_then(|id| self.pregnancies.get(id))
    }

    pub fn error(&self) -> Option<&str> {
        self.status.error.as_deref()
    }

    pub fn fetch_all(&mut self, backend: &Backend) -> Result<&[Pregnancy], ApiError> {
        let pregnancies = track(&mut self.status, "Failed to fetch pregnancies", || {
            backend.get_json::<Vec<Pregnancy>>("/pregnancy")
        })?;
        self.pregnancies.replace_all(pregnancies);
        if self.active.is_some_and(|id| !self.pregnancies.contains(id)) {
            self.active = None;
        }
        Ok(self.pregnancies.as_slice())
    }

    /// Load the backend's active pregnancy. A 404 means there is none and is
    /// not treated as an error.
    pub fn fetch_active(&mut self, backend: &Backend) -> Result<Option<&Pregnancy>, ApiError> {
        let active = track(&mut self.status, "Failed to fetch active pregnancy", || {
            match backend.get_json::<Pregnancy>("/pregnancy/active") {
                Ok(pregnancy) => Ok(Some(pregnancy)),
                Err(ApiError::NotFound { .. }) => Ok(None),
                Err(e) => Err(e),
            }
        })?;
        match active {
            Some(pregnancy) => {
                let id = pregnancy.id;
                self.pregnancies.push(pregnancy);
                self.active = Some(id);
            }
            None => self.active = None,
        }
        Ok(self.active())
    }

    /// Create a pregnancy. The backend deactivates the others and the new one
    /// becomes active here too.
    pub fn create(&mut self, backend: &Backend, input: &NewPregnancy) -> Result<&Pregnancy, ApiError> {
        let created = track(&mut self.status, "Failed to create pregnancy record", || {
            backend.post_json::<_, Pregnancy>("/pregnancy", input)
        })?;
        for pregnancy in self.pregnancies.iter_mut() {
            pregnancy.is_active = false;
        }
        self.active = Some(created.id);
        Ok(self.pregnancies.upsert(created))
    }

    /// Update a pregnancy. The cached record, if any, is replaced in place.
    pub fn update(&mut self, backend: &Backend, id: RecordId, input: &PregnancyUpdate) -> Result<Pregnancy, ApiError> {
        let updated = track(&mut self.status, "Failed to update pregnancy", || {
            backend.put_json::<_, Pregnancy>(&format!("/pregnancy/{id}"), input)
        })?;
        self.pregnancies.replace(id, &updated);
        Ok(updated)
    }

    /// Delete a pregnancy together with its appointments and, if it was
    /// active, the active selection.
    pub fn delete(&mut self, backend: &Backend, id: RecordId) -> Result<(), ApiError> {
        track(&mut self.status, "Failed to delete pregnancy", || {
            backend.delete(&format!("/pregnancy/{id}"))
        })?;
        self.pregnancies.remove(id);
        self.appointments.remove_bucket(id);
        if self.active == Some(id) {
            self.active = None;
            self.weekly_info = None;
        }
        Ok(())
    }

    /// Select a cached pregnancy as active and make sure its appointments are
    /// loaded. Returns `Ok(false)` when `id` is not cached.
    pub fn set_active(&mut self, backend: &Backend, id: RecordId) -> Result<bool, ApiError> {
        if !self.pregnancies.contains(id) {
            self.active = None;
            return Ok(false);
        }
        if self.active != Some(id) {
            self.weekly_info = None;
        }
        self.active = Some(id);
        self.fetch_appointments(backend, id)?;
        Ok(true)
    }

    /// Appointments for `pregnancy_id`, fetched once and then served from
    /// cache until invalidated.
    pub fn fetch_appointments(&mut self, backend: &Backend, pregnancy_id: RecordId) -> Result<&[Appointment], ApiError> {
        let path = with_query("/pregnancy/appointments", &[("pregnancy_id", &pregnancy_id.to_string())]);
        fetch_bucket(
            backend,
            &mut self.status,
            &mut self.appointments,
            pregnancy_id,
            &path,
            "Failed to fetch appointments",
        )
    }

    pub fn appointments_status(&self, pregnancy_id: RecordId) -> FetchStatus {
        self.appointments.status(pregnancy_id)
    }

    /// Forget cached appointments so the next fetch reloads them.
    pub fn invalidate_appointments(&mut self, pregnancy_id: RecordId) {
        self.appointments.invalidate(pregnancy_id);
    }

    pub fn appointments(&self, pregnancy_id: RecordId) -> &[Appointment] {
        self.appointments.get(pregnancy_id)
    }

    pub fn create_appointment(
        &mut self,
        backend: &Backend,
        pregnancy_id: RecordId,
        input: &NewAppointment,
    ) -> Result<&Appointment, ApiError> {
        let body = Owned {
            payload: input,
            owner: Owner::Pregnancy { pregnancy_id },
        };
        let created = track(&mut self.status, "Failed to create appointment", || {
            backend.post_json::<_, Appointment>("/pregnancy/appointments", &body)
        })?;
        let owner = created.pregnancy_id.unwrap_or(pregnancy_id);
        Ok(self.appointments.push(owner, created))
    }

    /// Update an appointment in whichever pregnancy's bucket holds it.
    pub fn update_appointment(
        &mut self,
        backend: &Backend,
        id: RecordId,
        input: &AppointmentUpdate,
    ) -> Result<Appointment, ApiError> {
        let updated = track(&mut self.status, "Failed to update appointment", || {
            backend.put_json::<_, Appointment>(&format!("/pregnancy/appointments/{id}"), input)
        })?;
        self.appointments.replace_anywhere(id, &updated);
        Ok(updated)
    }

    pub fn delete_appointment(&mut self, backend: &Backend, id: RecordId) -> Result<(), ApiError> {
        track(&mut self.status, "Failed to delete appointment", || {
            backend.delete(&format!("/pregnancy/appointments/{id}"))
        })?;
        self.appointments.remove_anywhere(id);
        Ok(())
    }

    /// Uncompleted appointments on or after `today`, soonest first, at most
    /// five.
    pub fn upcoming_appointments(&self, today: NaiveDate) -> Vec<&Appointment> {
        let mut upcoming: Vec<&Appointment> = self
            .appointments
            .iter_all()
            .filter(|a| !a.completed && a.scheduled_date >= today)
            .collect();
        upcoming.sort_by_key(|a| a.scheduled_date);
        upcoming.truncate(UPCOMING_LIMIT);
        upcoming
    }

    /// This week's guidance for the active pregnancy.
    pub fn fetch_weekly_info(&mut self, backend: &Backend) -> Result<&WeeklyInfo, ApiError> {
        let info = track(&mut self.status, "Failed to fetch weekly information", || {
            backend.send_json::<WeeklyInfo>(backend.client().post_empty("/pregnancy/weekly-info"))
        })?;
        Ok(self.weekly_info.insert(info))
    }

    pub fn weekly_info(&self) -> Option<&WeeklyInfo> {
        self.weekly_info.as_ref()
    }

    /// Danger signs never change for a session; fetched once.
    pub fn danger_signs(&mut self, backend: &Backend) -> Result<&[DangerSign], ApiError> {
        if self.danger_signs.is_none() {
            let signs = track(&mut self.status, "Failed to fetch danger signs", || {
                backend.get_json::<DangerSigns>("/pregnancy/danger-signs")
            })?;
            self.danger_signs = Some(signs.danger_signs);
        }
        Ok(self.danger_signs.as_deref().unwrap_or_default())
    }

    pub fn clear_error(&mut self) {
        self.status.clear_error();
    }
}
