//! Health records, mental-health assessments, emergency contacts, the
//! dashboard aggregate and the assistant conversation.

use crate::cache::{Collection, RecordId, RequestState};
use crate::client::with_query;
use crate::error::ApiError;
use crate::models::{
    ChatReply, ContactDraft, Dashboard, EmergencyContact, HealthRecord, HealthRecordUpdate, MentalHealthAssessment,
    NewAssessment, NewEmergencyContact, NewHealthRecord, Severity,
};
use crate::transport::Backend;

use super::track;

const RECENT_LIMIT: usize = 5;

#[derive(Default)]
pub struct HealthStore {
    records: Collection<HealthRecord>,
    assessments: Collection<MentalHealthAssessment>,
    contacts: Collection<EmergencyContact>,
    dashboard: Option<Dashboard>,
    conversation: Vec<ChatReply>,
    pub status: RequestState,
}

impl HealthStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn error(&self) -> Option<&str> {
        self.status.error.as_deref()
    }

    pub fn clear_error(&mut self) {
        self.status.clear_error();
    }

    // Health records

    pub fn records(&self) -> &[HealthRecord] {
        self.records.as_slice()
    }

    pub fn fetch_records(&mut self, backend: &Backend) -> Result<&[HealthRecord], ApiError> {
        let records = track(&mut self.status, "Failed to fetch health records", || {
            backend.get_json::<Vec<HealthRecord>>("/health/records")
        })?;
        self.records.replace_all(records);
        Ok(self.records.as_slice())
    }

    /// Reload one record from the backend and cache it.
    pub fn fetch_record(&mut self, backend: &Backend, id: RecordId) -> Result<&HealthRecord, ApiError> {
        let record = track(&mut self.status, "Failed to fetch health record", || {
            backend.get_json::<HealthRecord>(&format!("/health/records/{id}"))
        })?;
        Ok(self.records.upsert(record))
    }

    pub fn create_record(&mut self, backend: &Backend, input: &NewHealthRecord) -> Result<&HealthRecord, ApiError> {
        let created = track(&mut self.status, "Failed to create health record", || {
            backend.post_json::<_, HealthRecord>("/health/records", input)
        })?;
        Ok(self.records.upsert(created))
    }

    pub fn update_record(
        &mut self,
        backend: &Backend,
        id: RecordId,
        input: &HealthRecordUpdate,
    ) -> Result<HealthRecord, ApiError> {
        let updated = track(&mut self.status, "Failed to update health record", || {
            backend.put_json::<_, HealthRecord>(&format!("/health/records/{id}"), input)
        })?;
        self.records.replace(id, &updated);
        Ok(updated)
    }

    pub fn delete_record(&mut self, backend: &Backend, id: RecordId) -> Result<(), ApiError> {
        track(&mut self.status, "Failed to delete health record", || {
            backend.delete(&format!("/health/records/{id}"))
        })?;
        self.records.remove(id);
        Ok(())
    }

    /// Five most recently created records, newest first.
    pub fn recent_records(&self) -> Vec<&HealthRecord> {
        let mut recent: Vec<&HealthRecord> = self.records.iter().collect();
        recent.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        recent.truncate(RECENT_LIMIT);
        recent
    }

    /// Records of high or critical severity.
    pub fn critical_records(&self) -> Vec<&HealthRecord> {
        self.records
            .iter()
            .filter(|r| r.severity.as_ref().is_some_and(Severity::is_urgent))
            .collect()
    }

    // Mental-health assessments

    pub fn assessments(&self) -> &[MentalHealthAssessment] {
        self.assessments.as_slice()
    }

    pub fn fetch_assessments(&mut self, backend: &Backend) -> Result<&[MentalHealthAssessment], ApiError> {
        let assessments = track(&mut self.status, "Failed to fetch assessments", || {
            backend.get_json::<Vec<MentalHealthAssessment>>("/health/mental-health")
        })?;
        self.assessments.replace_all(assessments);
        Ok(self.assessments.as_slice())
    }

    pub fn create_assessment(
        &mut self,
        backend: &Backend,
        input: &NewAssessment,
    ) -> Result<&MentalHealthAssessment, ApiError> {
        let created = track(&mut self.status, "Failed to submit assessment", || {
            backend.post_json::<_, MentalHealthAssessment>("/health/mental-health", input)
        })?;
        Ok(self.assessments.upsert(created))
    }

    /// Resubmit answers for an assessment; the backend rescores it.
    pub fn update_assessment(
        &mut self,
        backend: &Backend,
        id: RecordId,
        input: &NewAssessment,
    ) -> Result<MentalHealthAssessment, ApiError> {
        let updated = track(&mut self.status, "Failed to update assessment", || {
            backend.put_json::<_, MentalHealthAssessment>(&format!("/health/mental-health/{id}"), input)
        })?;
        self.assessments.replace(id, &updated);
        Ok(updated)
    }

    pub fn delete_assessment(&mut self, backend: &Backend, id: RecordId) -> Result<(), ApiError> {
        track(&mut self.status, "Failed to delete assessment", || {
            backend.delete(&format!("/health/mental-health/{id}"))
        })?;
        self.assessments.remove(id);
        Ok(())
    }

    /// Most recent assessment by date, ties broken by creation time.
    pub fn latest_assessment(&self) -> Option<&MentalHealthAssessment> {
        self.assessments
            .iter()
            .max_by_key(|a| (a.assessment_date, a.created_at))
    }

    // Emergency contacts

    pub fn contacts(&self) -> &[EmergencyContact] {
        self.contacts.as_slice()
    }

    pub fn contact(&self, id: RecordId) -> Option<&EmergencyContact> {
        self.contacts.get(id)
    }

    /// First contact flagged primary, else the first contact.
    pub fn primary_contact(&self) -> Option<&EmergencyContact> {
        self.contacts
            .iter()
            .find(|c| c.is_primary)
            .or_else(|| self.contacts.iter().next())
    }

    pub fn fetch_contacts(&mut self, backend: &Backend) -> Result<&[EmergencyContact], ApiError> {
        let contacts = track(&mut self.status, "Failed to fetch emergency contacts", || {
            backend.get_json::<Vec<EmergencyContact>>("/health/emergency-contacts")
        })?;
        self.contacts.replace_all(contacts);
        Ok(self.contacts.as_slice())
    }

    pub fn create_contact(
        &mut self,
        backend: &Backend,
        input: &NewEmergencyContact,
    ) -> Result<&EmergencyContact, ApiError> {
        let created = track(&mut self.status, "Failed to save emergency contact", || {
            backend.post_json::<_, EmergencyContact>("/health/emergency-contacts", input)
        })?;
        self.demote_others(&created);
        Ok(self.contacts.upsert(created))
    }

    pub fn update_contact(
        &mut self,
        backend: &Backend,
        id: RecordId,
        input: &NewEmergencyContact,
    ) -> Result<EmergencyContact, ApiError> {
        let updated = track(&mut self.status, "Failed to save emergency contact", || {
            backend.put_json::<_, EmergencyContact>(&format!("/health/emergency-contacts/{id}"), input)
        })?;
        self.demote_others(&updated);
        self.contacts.replace(id, &updated);
        Ok(updated)
    }

    /// Create the contact when the draft has no id, otherwise update it.
    pub fn save_contact(&mut self, backend: &Backend, draft: &ContactDraft) -> Result<EmergencyContact, ApiError> {
        match draft.id {
            Some(id) => self.update_contact(backend, id, &draft.contact),
            None => self.create_contact(backend, &draft.contact).cloned(),
        }
    }

    pub fn delete_contact(&mut self, backend: &Backend, id: RecordId) -> Result<(), ApiError> {
        track(&mut self.status, "Failed to delete emergency contact", || {
            backend.delete(&format!("/health/emergency-contacts/{id}"))
        })?;
        self.contacts.remove(id);
        Ok(())
    }

    // Only one contact is primary; the backend demotes the rest.
    fn demote_others(&mut self, contact: &EmergencyContact) {
        if contact.is_primary {
            for other in self.contacts.iter_mut().filter(|c| c.id != contact.id) {
                other.is_primary = false;
            }
        }
    }

    // Dashboard

    pub fn dashboard(&self) -> Option<&Dashboard> {
        self.dashboard.as_ref()
    }

    pub fn fetch_dashboard(&mut self, backend: &Backend) -> Result<&Dashboard, ApiError> {
        let dashboard = track(&mut self.status, "Failed to load dashboard", || {
            backend.get_json::<Dashboard>("/dashboard")
        })?;
        Ok(self.dashboard.insert(dashboard))
    }

    // Assistant

    /// Every exchange with the assistant this session, oldest first.
    pub fn conversation(&self) -> &[ChatReply] {
        &self.conversation
    }

    pub fn ask_assistant(&mut self, backend: &Backend, query: &str) -> Result<&ChatReply, ApiError> {
        let query = query.trim();
        let reply = track(&mut self.status, "The assistant is unavailable right now", || {
            if query.is_empty() {
                return Err(ApiError::Validation("Please enter a question".to_string()));
            }
            let path = with_query("/chatbot", &[("query", query)]);
            backend.send_json::<ChatReply>(backend.client().post_empty(&path))
        })?;
        self.conversation.push(reply);
        Ok(&self.conversation[self.conversation.len() - 1])
    }

    pub fn clear_conversation(&mut self) {
        self.conversation.clear();
    }
}
