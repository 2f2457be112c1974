use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use strum::{AsRefStr, Display, EnumIter, EnumString, IntoEnumIterator};
use uuid::Uuid;

/// The fixed service steps, in the order a technician performs them.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    EnumIter,
    AsRefStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum ChecklistStep {
    Arrival,
    CustomerVerification,
    PreInspection,
    Drain,
    Scrub,
    HighPressureClean,
    Disinfection,
    FinalRinse,
}

impl ChecklistStep {
    pub fn all() -> impl Iterator<Item = ChecklistStep> {
        ChecklistStep::iter()
    }
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString, AsRefStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum StepStatus {
    Pending,
    Completed,
    Na,
    Escalate,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StepRecord {
    pub status: StepStatus,
    #[serde(default)]
    pub notes: String,
    pub timestamp: Option<DateTime<Utc>>,
    #[serde(default)]
    pub photos: Vec<String>,
}

impl StepRecord {
    pub fn pending() -> Self {
        Self {
            status: StepStatus::Pending,
            notes: String::new(),
            timestamp: None,
            photos: Vec::new(),
        }
    }
}

/// One checklist step write. The stored record keeps its notes when `notes`
/// is `None`, and `photo_url` is appended to whatever photos it already has.
#[derive(Debug, Clone, PartialEq)]
pub struct StepWrite {
    pub status: StepStatus,
    pub notes: Option<String>,
    pub timestamp: DateTime<Utc>,
    pub photo_url: Option<String>,
}

impl StepWrite {
    /// The record this write leaves behind on top of `previous`.
    pub fn merged_into(&self, previous: Option<&StepRecord>) -> StepRecord {
        let previous = previous.cloned().unwrap_or_else(StepRecord::pending);
        let mut photos = previous.photos;
        photos.extend(self.photo_url.iter().cloned());
        StepRecord {
            status: self.status,
            notes: self.notes.clone().unwrap_or(previous.notes),
            timestamp: Some(self.timestamp),
            photos,
        }
    }
}

/// Per-job execution record, created when the job starts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Checklist {
    pub started_at: DateTime<Utc>,
    pub steps: BTreeMap<ChecklistStep, StepRecord>,
    #[serde(default)]
    pub chemicals_used: Vec<String>,
    /// Litres.
    #[serde(default)]
    pub water_usage: f64,
}

impl Checklist {
    /// Every step present and pending.
    pub fn new(started_at: DateTime<Utc>) -> Self {
        Self {
            started_at,
            steps: ChecklistStep::all()
                .map(|step| (step, StepRecord::pending()))
                .collect(),
            chemicals_used: Vec::new(),
            water_usage: 0.0,
        }
    }

    pub fn step(&self, step: ChecklistStep) -> Option<&StepRecord> {
        self.steps.get(&step)
    }

    /// Last write wins.
    pub fn apply(&mut self, step: ChecklistStep, record: StepRecord) {
        self.steps.insert(step, record);
    }

    pub fn all_resolved(&self) -> bool {
        ChecklistStep::all().all(|s| {
            self.steps
                .get(&s)
                .is_some_and(|r| r.status != StepStatus::Pending)
        })
    }
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString, AsRefStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Severity {
    Low,
    Medium,
    High,
    Critical,
}

/// Append-only record of an issue hit during a job.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IncidentReport {
    pub id: Uuid,
    pub description: String,
    pub severity: Severity,
    #[serde(default)]
    pub photo_urls: Vec<String>,
    pub unable_to_proceed: bool,
    pub reported_at: DateTime<Utc>,
    pub reported_by: Uuid,
}

/// Body of `POST /api/field/jobs/{id}/checklist`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChecklistUpdate {
    pub step_name: String,
    pub status: StepStatus,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub photo_url: Option<String>,
    #[serde(default)]
    pub timestamp: Option<DateTime<Utc>>,
}

/// Body of `POST /api/field/jobs/{id}/incident`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IncidentInput {
    pub description: String,
    pub severity: Severity,
    #[serde(default)]
    pub photo_urls: Option<Vec<String>>,
    #[serde(default)]
    pub unable_to_proceed: bool,
}

/// Photo URLs given either as a list or as one comma-joined string.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PhotoUrls {
    List(Vec<String>),
    Joined(String),
}

impl Default for PhotoUrls {
    fn default() -> Self {
        PhotoUrls::List(Vec::new())
    }
}

impl PhotoUrls {
    /// Split, trim and drop blanks.
    pub fn into_urls(self) -> Vec<String> {
        let parts: Vec<String> = match self {
            PhotoUrls::List(v) => v,
            PhotoUrls::Joined(s) => s.split(',').map(str::to_string).collect(),
        };
        parts
            .into_iter()
            .map(|p| p.trim().to_string())
            .filter(|p| !p.is_empty())
            .collect()
    }
}

/// Body of `POST /api/field/jobs/{id}/complete`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompletionInput {
    #[serde(default)]
    pub before_photo_urls: PhotoUrls,
    #[serde(default)]
    pub after_photo_urls: PhotoUrls,
    #[serde(default)]
    pub customer_signature: String,
    #[serde(default)]
    pub notes: Option<String>,
}

/// Completion evidence that passed validation.
#[derive(Debug, Clone, PartialEq)]
pub struct CompletionEvidence {
    pub before_photos: Vec<String>,
    pub after_photos: Vec<String>,
    pub signature: String,
    pub notes: String,
}

/// Response of `POST /api/field/jobs/{id}/start`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobStarted {
    pub message: String,
    pub checklist: Checklist,
}

/// Response of `POST /api/field/jobs/{id}/incident`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IncidentCreated {
    pub message: String,
    pub incident_id: Uuid,
}
