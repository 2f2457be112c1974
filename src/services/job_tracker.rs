//! Job execution rules for field technicians.
//!
//! A job moves `confirmed -> in-progress -> completed`. Checklist updates and
//! incident reports are side channels: they never change the job status.
//! Functions here only decide; persistence lives in `db::bookings`, which
//! repeats the status guard in SQL so concurrent writers get a conflict
//! instead of silently overwriting each other.

use chrono::{DateTime, Utc};
use std::str::FromStr;
use uuid::Uuid;

use crate::models::booking::{Booking, BookingStatus};
use crate::models::job::{
    Checklist, ChecklistStep, ChecklistUpdate, CompletionEvidence, CompletionInput,
    IncidentInput, IncidentReport, StepStatus, StepWrite,
};

/// Notes stored for an escalated step when the technician gives none.
pub const ESCALATION_NOTE: &str = "Issue requires escalation";

#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display)]
#[strum(serialize_all = "snake_case")]
pub enum EvidenceField {
    BeforePhotos,
    AfterPhotos,
    Signature,
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum JobError {
    /// The caller is not the assigned technician. Reported as not found so
    /// other technicians cannot enumerate job ids.
    #[error("Job not found")]
    NotAssigned,

    #[error("Cannot {action} a job that is {from}")]
    InvalidTransition {
        from: BookingStatus,
        action: &'static str,
    },

    #[error("Unknown checklist step: {0}")]
    UnknownStep(String),

    #[error("Checklist steps can only be set to completed, na or escalate")]
    PendingTarget,

    #[error("Incident description is required")]
    EmptyDescription,

    #[error("Missing completion evidence: {0}")]
    MissingEvidence(EvidenceField),
}

impl JobError {
    /// Errors that say something about the request body rather than the job.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            JobError::UnknownStep(_)
                | JobError::PendingTarget
                | JobError::EmptyDescription
                | JobError::MissingEvidence(_)
        )
    }
}

fn ensure_assigned(job: &Booking, technician_id: Uuid) -> Result<(), JobError> {
    if job.assigned_technician_id == Some(technician_id) {
        Ok(())
    } else {
        Err(JobError::NotAssigned)
    }
}

fn ensure_status(
    job: &Booking,
    expected: BookingStatus,
    action: &'static str,
) -> Result<(), JobError> {
    if job.status == expected {
        Ok(())
    } else {
        Err(JobError::InvalidTransition {
            from: job.status,
            action,
        })
    }
}

/// Whether the checklist and incident controls still accept input.
pub fn is_actionable(status: BookingStatus) -> bool {
    !status.is_terminal()
}

/// `confirmed -> in-progress`. Returns the fresh checklist to persist.
pub fn start(job: &Booking, technician_id: Uuid, now: DateTime<Utc>) -> Result<Checklist, JobError> {
    ensure_assigned(job, technician_id)?;
    ensure_status(job, BookingStatus::Confirmed, "start")?;
    Ok(Checklist::new(now))
}

/// Parse and check a checklist update without looking at any job.
pub fn parse_step_update(update: &ChecklistUpdate) -> Result<ChecklistStep, JobError> {
    let step = ChecklistStep::from_str(update.step_name.trim())
        .map_err(|_| JobError::UnknownStep(update.step_name.clone()))?;
    if update.status == StepStatus::Pending {
        return Err(JobError::PendingTarget);
    }
    Ok(step)
}

/// Turn an update into a store write. No job rules are checked here.
///
/// Notes are replaced when given, default to [`ESCALATION_NOTE`] for an
/// escalation, and are otherwise kept. A blank photo URL is dropped.
pub fn step_write(update: &ChecklistUpdate, now: DateTime<Utc>) -> StepWrite {
    let notes = match update.notes.as_deref().map(str::trim) {
        Some(n) if !n.is_empty() => Some(n.to_string()),
        _ if update.status == StepStatus::Escalate => Some(ESCALATION_NOTE.to_string()),
        _ => None,
    };
    let photo_url = update
        .photo_url
        .as_deref()
        .map(str::trim)
        .filter(|url| !url.is_empty())
        .map(str::to_string);

    StepWrite {
        status: update.status,
        notes,
        timestamp: update.timestamp.unwrap_or(now),
        photo_url,
    }
}

/// Check a checklist update against an in-progress job and build its write.
///
/// Overwriting an already completed step is allowed; the last write wins.
pub fn apply_step_update(
    job: &Booking,
    technician_id: Uuid,
    update: &ChecklistUpdate,
    now: DateTime<Utc>,
) -> Result<(ChecklistStep, StepWrite), JobError> {
    let step = parse_step_update(update)?;
    ensure_assigned(job, technician_id)?;
    ensure_status(job, BookingStatus::InProgress, "update the checklist of")?;
    Ok((step, step_write(update, now)))
}

pub fn validate_incident(input: &IncidentInput) -> Result<(), JobError> {
    if input.description.trim().is_empty() {
        Err(JobError::EmptyDescription)
    } else {
        Ok(())
    }
}

/// Build a new incident for `job`.
///
/// Incidents can be filed before the job starts and while it runs; once the
/// job is completed or cancelled they are refused.
pub fn new_incident(
    job: &Booking,
    technician_id: Uuid,
    input: IncidentInput,
    now: DateTime<Utc>,
) -> Result<IncidentReport, JobError> {
    validate_incident(&input)?;
    ensure_assigned(job, technician_id)?;
    if !is_actionable(job.status) {
        return Err(JobError::InvalidTransition {
            from: job.status,
            action: "report an incident on",
        });
    }

    Ok(IncidentReport {
        id: Uuid::new_v4(),
        description: input.description.trim().to_string(),
        severity: input.severity,
        photo_urls: input.photo_urls.unwrap_or_default(),
        unable_to_proceed: input.unable_to_proceed,
        reported_at: now,
        reported_by: technician_id,
    })
}

/// Check completion evidence. Runs before any job lookup.
pub fn validate_evidence(input: CompletionInput) -> Result<CompletionEvidence, JobError> {
    let before_photos = input.before_photo_urls.into_urls();
    if before_photos.is_empty() {
        return Err(JobError::MissingEvidence(EvidenceField::BeforePhotos));
    }
    let after_photos = input.after_photo_urls.into_urls();
    if after_photos.is_empty() {
        return Err(JobError::MissingEvidence(EvidenceField::AfterPhotos));
    }
    let signature = input.customer_signature.trim().to_string();
    if signature.is_empty() {
        return Err(JobError::MissingEvidence(EvidenceField::Signature));
    }

    Ok(CompletionEvidence {
        before_photos,
        after_photos,
        signature,
        notes: input.notes.unwrap_or_default(),
    })
}

/// `in-progress -> completed`.
pub fn complete(job: &Booking, technician_id: Uuid) -> Result<(), JobError> {
    ensure_assigned(job, technician_id)?;
    ensure_status(job, BookingStatus::InProgress, "complete")
}
