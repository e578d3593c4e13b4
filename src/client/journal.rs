use chrono::{DateTime, NaiveDate, Utc};
use garde::Validate;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use super::ClientError;

/// How bad a logged symptom was.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Mild,
    Moderate,
    Severe,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Severity::Mild => "mild",
            Severity::Moderate => "moderate",
            Severity::Severe => "severe",
        })
    }
}

impl FromStr for Severity {
    type Err = ClientError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "mild" => Ok(Severity::Mild),
            "moderate" => Ok(Severity::Moderate),
            "severe" => Ok(Severity::Severe),
            other => Err(ClientError::Validation(format!("Unknown severity: {}", other))),
        }
    }
}

/// The category of a medical record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecordKind {
    Condition,
    Medication,
    Procedure,
    Vaccination,
}

impl fmt::Display for RecordKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            RecordKind::Condition => "condition",
            RecordKind::Medication => "medication",
            RecordKind::Procedure => "procedure",
            RecordKind::Vaccination => "vaccination",
        })
    }
}

impl FromStr for RecordKind {
    type Err = ClientError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "condition" => Ok(RecordKind::Condition),
            "medication" => Ok(RecordKind::Medication),
            "procedure" => Ok(RecordKind::Procedure),
            "vaccination" => Ok(RecordKind::Vaccination),
            other => Err(ClientError::Validation(format!("Unknown record type: {}", other))),
        }
    }
}

/// A logged set of symptoms on one day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SymptomLog {
    pub id: Uuid,
    pub user_id: Uuid,
    pub date: NaiveDate,
    pub symptoms: Vec<String>,
    pub severity: Severity,
    pub notes: String,
    pub created_at: DateTime<Utc>,
}

/// One entry of medical history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MedicalRecord {
    pub id: Uuid,
    pub user_id: Uuid,
    pub date: NaiveDate,
    #[serde(rename = "type")]
    pub kind: RecordKind,
    pub title: String,
    pub description: String,
    pub provider: Option<String>,
    pub created_at: DateTime<Utc>,
}

fn not_blank(value: &str, _: &()) -> garde::Result {
    if value.trim().is_empty() {
        return Err(garde::Error::new("is required"));
    }
    Ok(())
}

fn parse_date(value: &str) -> Result<NaiveDate, ClientError> {
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d")
        .map_err(|_| ClientError::Validation(format!("Invalid date: {}", value)))
}

fn validation(report: garde::Report) -> ClientError {
    ClientError::Validation(report.to_string())
}

/// Raw symptom form input.
#[derive(Debug, Clone, Default, Validate)]
pub struct SymptomForm {
    #[garde(custom(not_blank))]
    pub date: String,
    /// Comma-separated symptom names.
    #[garde(custom(not_blank))]
    pub symptoms: String,
    #[garde(custom(not_blank))]
    pub severity: String,
    #[garde(custom(not_blank))]
    pub notes: String,
}

/// A validated request to log symptoms.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewSymptomLog {
    pub date: NaiveDate,
    pub symptoms: Vec<String>,
    pub severity: Severity,
    pub notes: String,
}

impl TryFrom<SymptomForm> for NewSymptomLog {
    type Error = ClientError;

    fn try_from(form: SymptomForm) -> Result<Self, Self::Error> {
        form.validate().map_err(validation)?;

        let symptoms: Vec<String> = form
            .symptoms
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect();
        if symptoms.is_empty() {
            return Err(ClientError::Validation("symptoms: is required".to_string()));
        }

        Ok(Self {
            date: parse_date(&form.date)?,
            symptoms,
            severity: form.severity.parse()?,
            notes: form.notes.trim().to_string(),
        })
    }
}

/// Raw medical record form input.
#[derive(Debug, Clone, Default, Validate)]
pub struct RecordForm {
    #[garde(custom(not_blank))]
    pub date: String,
    #[garde(custom(not_blank))]
    pub kind: String,
    #[garde(custom(not_blank))]
    pub title: String,
    #[garde(custom(not_blank))]
    pub description: String,
    #[garde(skip)]
    pub provider: String,
}

/// A validated request to add a medical record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewMedicalRecord {
    pub date: NaiveDate,
    pub kind: RecordKind,
    pub title: String,
    pub description: String,
    pub provider: Option<String>,
}

impl TryFrom<RecordForm> for NewMedicalRecord {
    type Error = ClientError;

    fn try_from(form: RecordForm) -> Result<Self, Self::Error> {
        form.validate().map_err(validation)?;

        let provider = Some(form.provider.trim().to_string()).filter(|p| !p.is_empty());

        Ok(Self {
            date: parse_date(&form.date)?,
            kind: form.kind.parse()?,
            title: form.title.trim().to_string(),
            description: form.description.trim().to_string(),
            provider,
        })
    }
}

/// An entry that can be removed from a journal by ID.
pub trait Entry {
    fn id(&self) -> Uuid;
}

impl Entry for SymptomLog {
    fn id(&self) -> Uuid {
        self.id
    }
}

impl Entry for MedicalRecord {
    fn id(&self) -> Uuid {
        self.id
    }
}

/// An unpersisted, newest-first list of entries.
#[derive(Debug, Clone)]
pub struct Journal<T> {
    entries: Vec<T>,
}

impl<T> Default for Journal<T> {
    fn default() -> Self {
        Self { entries: Vec::new() }
    }
}

impl<T: Entry> Journal<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Puts `entry` at the front.
    pub fn prepend(&mut self, entry: T) {
        self.entries.insert(0, entry);
    }

    /// Removes the entry with `id`. Returns whether one was removed.
    pub fn remove(&mut self, id: Uuid) -> bool {
        let before = self.entries.len();
        self.entries.retain(|e| e.id() != id);
        self.entries.len() != before
    }

    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Journal<SymptomLog> {
    /// Logs symptoms for `owner`.
    pub fn add(&mut self, owner: Uuid, new: NewSymptomLog) -> &SymptomLog {
        self.prepend(SymptomLog {
            id: Uuid::new_v4(),
            user_id: owner,
            date: new.date,
            symptoms: new.symptoms,
            severity: new.severity,
            notes: new.notes,
            created_at: Utc::now(),
        });
        &self.entries[0]
    }
}

impl Journal<MedicalRecord> {
    /// Adds a medical record for `owner`.
    pub fn add(&mut self, owner: Uuid, new: NewMedicalRecord) -> &MedicalRecord {
        self.prepend(MedicalRecord {
            id: Uuid::new_v4(),
            user_id: owner,
            date: new.date,
            kind: new.kind,
            title: new.title,
            description: new.description,
            provider: new.provider,
            created_at: Utc::now(),
        });
        &self.entries[0]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn symptom_form() -> SymptomForm {
        SymptomForm {
            date: "2024-03-21".to_string(),
            symptoms: "Headache, Fatigue".to_string(),
            severity: "moderate".to_string(),
            notes: "After a long day".to_string(),
        }
    }

    fn record_form() -> RecordForm {
        RecordForm {
            date: "2024-03-01".to_string(),
            kind: "vaccination".to_string(),
            title: "Flu shot".to_string(),
            description: "Annual influenza vaccine".to_string(),
            provider: "  ".to_string(),
        }
    }

    #[test]
    fn symptom_form_parses_into_command() {
        let cmd = NewSymptomLog::try_from(symptom_form()).unwrap();
        assert_eq!(cmd.symptoms, vec!["Headache", "Fatigue"]);
        assert_eq!(cmd.severity, Severity::Moderate);
        assert_eq!(cmd.date, NaiveDate::from_ymd_opt(2024, 3, 21).unwrap());
    }

    #[test]
    fn blank_required_fields_are_rejected() {
        let mut form = symptom_form();
        form.notes = "   ".to_string();
        assert!(matches!(NewSymptomLog::try_from(form), Err(ClientError::Validation(_))));

        let mut form = symptom_form();
        form.symptoms = " , ,".to_string();
        assert!(matches!(NewSymptomLog::try_from(form), Err(ClientError::Validation(_))));

        let mut form = record_form();
        form.title = String::new();
        assert!(matches!(NewMedicalRecord::try_from(form), Err(ClientError::Validation(_))));
    }

    #[test]
    fn closed_labels_reject_unknown_values() {
        let mut form = symptom_form();
        form.severity = "critical".to_string();
        assert!(NewSymptomLog::try_from(form).is_err());

        let mut form = record_form();
        form.kind = "allergy".to_string();
        assert!(NewMedicalRecord::try_from(form).is_err());

        let mut form = record_form();
        form.date = "21/03/2024".to_string();
        assert!(NewMedicalRecord::try_from(form).is_err());
    }

    #[test]
    fn blank_provider_becomes_none() {
        let cmd = NewMedicalRecord::try_from(record_form()).unwrap();
        assert_eq!(cmd.provider, None);
        assert_eq!(cmd.kind, RecordKind::Vaccination);
    }

    #[test]
    fn journal_is_newest_first_and_removes_by_id() {
        let owner = Uuid::new_v4();
        let mut journal = Journal::<SymptomLog>::new();

        let first = journal.add(owner, NewSymptomLog::try_from(symptom_form()).unwrap()).id;
        let second = journal.add(owner, NewSymptomLog::try_from(symptom_form()).unwrap()).id;

        let ids: Vec<Uuid> = journal.iter().map(|e| e.id).collect();
        assert_eq!(ids, vec![second, first]);

        assert!(journal.remove(first));
        assert!(!journal.remove(first));
        assert_eq!(journal.len(), 1);
        assert!(journal.iter().all(|e| e.user_id == owner));
    }

    #[test]
    fn labels_serialize_lowercase() {
        let owner = Uuid::new_v4();
        let mut records = Journal::<MedicalRecord>::new();
        let record = records
            .add(owner, NewMedicalRecord::try_from(record_form()).unwrap())
            .clone();

        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["type"], "vaccination");
        assert_eq!(json["date"], "2024-03-01");
        assert_eq!(Severity::Severe.to_string(), "severe");
    }
}
