use chrono::Utc;
use uuid::Uuid;

use super::{ApiClient, ClientError};
use crate::models::address::Address;
use crate::models::booking::{Booking, BookingStatus, JobDetail};
use crate::models::job::{
    ChecklistStep, ChecklistUpdate, CompletionInput, IncidentInput, PhotoUrls, StepStatus,
};
use crate::models::user::CustomerSummary;
use crate::services::job_tracker;

/// A technician working through one job.
///
/// Inputs are checked locally with the server's own rules first, so an
/// invalid checklist update, incident or completion never leaves the device.
pub struct JobExecution<'a> {
    client: &'a ApiClient,
    job: Booking,
    address: Option<Address>,
    customer: Option<CustomerSummary>,
}

impl<'a> JobExecution<'a> {
    pub async fn load(client: &'a ApiClient, id: Uuid) -> Result<Self, ClientError> {
        let JobDetail {
            job,
            address,
            customer,
        } = client.field_job(id).await?;
        Ok(Self {
            client,
            job,
            address,
            customer,
        })
    }

    pub fn job(&self) -> &Booking {
        &self.job
    }

    pub fn address(&self) -> Option<&Address> {
        self.address.as_ref()
    }

    pub fn customer(&self) -> Option<&CustomerSummary> {
        self.customer.as_ref()
    }

    /// False once the job is completed or cancelled.
    pub fn is_actionable(&self) -> bool {
        job_tracker::is_actionable(self.job.status)
    }

    pub async fn refresh(&mut self) -> Result<(), ClientError> {
        let detail = self.client.field_job(self.job.id).await?;
        self.job = detail.job;
        self.address = detail.address;
        self.customer = detail.customer;
        Ok(())
    }

    pub async fn start(&mut self) -> Result<(), ClientError> {
        let started = self.client.start_job(self.job.id).await?;
        self.job.status = BookingStatus::InProgress;
        self.job.started_at = Some(started.checklist.started_at);
        self.job.checklist = Some(started.checklist);
        Ok(())
    }

    pub async fn update_step(
        &mut self,
        step: ChecklistStep,
        status: StepStatus,
        notes: Option<String>,
    ) -> Result<(), ClientError> {
        let update = ChecklistUpdate {
            step_name: step.to_string(),
            status,
            notes,
            photo_url: None,
            timestamp: Some(Utc::now()),
        };
        job_tracker::parse_step_update(&update)?;

        self.client.update_checklist(self.job.id, &update).await?;

        // Accepted by the server, so mirror it whatever the cached status says.
        match self.job.checklist.as_mut() {
            Some(checklist) => {
                let record = job_tracker::step_write(&update, Utc::now())
                    .merged_into(checklist.step(step));
                checklist.apply(step, record);
                Ok(())
            }
            None => self.refresh().await,
        }
    }

    /// Returns the server-assigned incident id.
    pub async fn report_incident(&mut self, input: IncidentInput) -> Result<Uuid, ClientError> {
        job_tracker::validate_incident(&input)?;
        let created = self.client.report_incident(self.job.id, &input).await?;
        Ok(created.incident_id)
    }

    pub async fn complete(
        &mut self,
        before_photo_urls: &str,
        after_photo_urls: &str,
        customer_signature: &str,
        notes: Option<String>,
    ) -> Result<(), ClientError> {
        let input = CompletionInput {
            before_photo_urls: PhotoUrls::Joined(before_photo_urls.to_string()),
            after_photo_urls: PhotoUrls::Joined(after_photo_urls.to_string()),
            customer_signature: customer_signature.to_string(),
            notes,
        };
        job_tracker::validate_evidence(input.clone())?;

        self.client.complete_job(self.job.id, &input).await?;
        self.job.status = BookingStatus::Completed;
        self.job.completed_at = Some(Utc::now());
        Ok(())
    }
}
