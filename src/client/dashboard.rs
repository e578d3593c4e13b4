use serde::Serialize;
use uuid::Uuid;

use super::journal::{
    Journal, MedicalRecord, NewMedicalRecord, NewSymptomLog, RecordForm, Severity, SymptomForm,
    SymptomLog,
};
use super::session::SessionUser;
use super::ClientError;

/// A summary of recent activity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardSummary {
    pub recent_symptoms: Vec<SymptomLog>,
    pub recent_records: Vec<MedicalRecord>,
    pub symptom_count: usize,
    pub record_count: usize,
    pub severe_count: usize,
}

impl DashboardSummary {
    /// Takes the `limit` newest entries of each journal.
    pub fn build(
        symptoms: &Journal<SymptomLog>,
        records: &Journal<MedicalRecord>,
        limit: usize,
    ) -> Self {
        Self {
            recent_symptoms: symptoms.iter().take(limit).cloned().collect(),
            recent_records: records.iter().take(limit).cloned().collect(),
            symptom_count: symptoms.len(),
            record_count: records.len(),
            severe_count: symptoms
                .iter()
                .filter(|log| log.severity == Severity::Severe)
                .count(),
        }
    }
}

/// The signed-in user's symptom and medical-record journals.
#[derive(Debug, Clone, Default)]
pub struct HealthJournal {
    pub symptoms: Journal<SymptomLog>,
    pub records: Journal<MedicalRecord>,
}

impl HealthJournal {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn log_symptom(
        &mut self,
        user: &SessionUser,
        form: SymptomForm,
    ) -> Result<&SymptomLog, ClientError> {
        let new = NewSymptomLog::try_from(form)?;
        Ok(self.symptoms.add(user.id, new))
    }

    pub fn add_record(
        &mut self,
        user: &SessionUser,
        form: RecordForm,
    ) -> Result<&MedicalRecord, ClientError> {
        let new = NewMedicalRecord::try_from(form)?;
        Ok(self.records.add(user.id, new))
    }

    pub fn delete_symptom(&mut self, id: Uuid) -> bool {
        self.symptoms.remove(id)
    }

    pub fn delete_record(&mut self, id: Uuid) -> bool {
        self.records.remove(id)
    }

    pub fn dashboard(&self, limit: usize) -> DashboardSummary {
        DashboardSummary::build(&self.symptoms, &self.records, limit)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user() -> SessionUser {
        SessionUser {
            id: Uuid::new_v4(),
            email: "a@b.com".to_string(),
            name: "A".to_string(),
        }
    }

    fn symptom(severity: &str, name: &str) -> SymptomForm {
        SymptomForm {
            date: "2024-03-20".to_string(),
            symptoms: name.to_string(),
            severity: severity.to_string(),
            notes: "noted".to_string(),
        }
    }

    #[test]
    fn dashboard_shows_newest_entries_and_counts() {
        let user = user();
        let mut journal = HealthJournal::new();
        journal.log_symptom(&user, symptom("mild", "Nausea")).unwrap();
        journal.log_symptom(&user, symptom("severe", "Fever")).unwrap();
        journal.log_symptom(&user, symptom("moderate", "Fatigue")).unwrap();

        let summary = journal.dashboard(2);
        let names: Vec<&str> = summary
            .recent_symptoms
            .iter()
            .map(|log| log.symptoms[0].as_str())
            .collect();

        assert_eq!(names, vec!["Fatigue", "Fever"]);
        assert_eq!(summary.symptom_count, 3);
        assert_eq!(summary.severe_count, 1);
        assert_eq!(summary.record_count, 0);
        assert!(summary.recent_records.is_empty());
    }

    #[test]
    fn invalid_form_leaves_journal_untouched() {
        let mut journal = HealthJournal::new();
        assert!(journal.log_symptom(&user(), symptom("", "Fever")).is_err());
        assert!(journal.symptoms.is_empty());
    }

    #[test]
    fn deleting_updates_the_summary() {
        let user = user();
        let mut journal = HealthJournal::new();
        let form = RecordForm {
            date: "2024-02-10".to_string(),
            kind: "medication".to_string(),
            title: "Ibuprofen".to_string(),
            description: "200mg as needed".to_string(),
            provider: "Dr. Chen".to_string(),
        };
        let id = journal.add_record(&user, form).unwrap().id;

        assert_eq!(journal.dashboard(5).record_count, 1);
        assert!(journal.delete_record(id));
        assert_eq!(journal.dashboard(5).record_count, 0);
        assert!(!journal.delete_symptom(id));
    }
}
