use core::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use fieldtrack_core::{impl_record_id, DomainError, DomainResult, Entity, OwnerId};

use crate::line::JobMaterialLine;

#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct JobId(i64);

impl_record_id!(JobId, "JobId");

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobStatus {
    Scheduled,
    InProgress,
    Completed,
    Cancelled,
}

impl JobStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            JobStatus::Scheduled => "scheduled",
            JobStatus::InProgress => "in_progress",
            JobStatus::Completed => "completed",
            JobStatus::Cancelled => "cancelled",
        }
    }
}

impl core::fmt::Display for JobStatus {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for JobStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace('-', "_").as_str() {
            "scheduled" => Ok(JobStatus::Scheduled),
            "in_progress" => Ok(JobStatus::InProgress),
            "completed" => Ok(JobStatus::Completed),
            "cancelled" | "canceled" => Ok(JobStatus::Cancelled),
            _ => Err(DomainError::validation(
                "status must be one of: scheduled, in_progress, completed, cancelled",
            )),
        }
    }
}

/// A site photo attached to a job (base64 / data URL payload).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobPhoto {
    pub photo_data: String,
    pub caption: String,
    pub ai_analysis: Option<String>,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewPhoto {
    pub photo_data: String,
    pub caption: String,
}

/// Job record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Job {
    pub id: JobId,
    pub customer_id: OwnerId,
    pub title: String,
    pub description: String,
    pub scheduled_date: Option<NaiveDate>,
    pub status: JobStatus,
    /// Always the sum of `materials_used[*].total_cost`.
    pub total_cost: f64,
    pub ai_estimate: Option<String>,
    pub notes: String,
    pub created: DateTime<Utc>,
    pub materials_used: Vec<JobMaterialLine>,
    pub photos: Vec<JobPhoto>,
}

impl Job {
    pub fn set_status(&mut self, status: JobStatus) {
        self.status = status;
    }

    pub fn set_notes(&mut self, notes: impl Into<String>) {
        self.notes = notes.into();
    }

    pub fn add_line(&mut self, line: JobMaterialLine) {
        self.materials_used.push(line);
        self.total_cost = self.materials_used.iter().map(|l| l.total_cost).sum();
    }

    pub fn add_photo(&mut self, photo: NewPhoto, ai_analysis: Option<String>, at: DateTime<Utc>) {
        self.photos.push(JobPhoto {
            photo_data: photo.photo_data,
            caption: photo.caption,
            ai_analysis,
            timestamp: at,
        });
    }

    pub fn is_scheduled_on(&self, date: NaiveDate) -> bool {
        self.scheduled_date == Some(date)
    }
}

impl Entity for Job {
    type Id = JobId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

/// Raw job fields as sent by a client.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobFields {
    pub customer_id: Option<OwnerId>,
    pub title: Option<String>,
    pub description: Option<String>,
    /// `YYYY-MM-DD`; empty means unscheduled.
    pub scheduled_date: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewJob {
    pub customer_id: OwnerId,
    pub title: String,
    pub description: String,
    pub scheduled_date: Option<NaiveDate>,
}

impl JobFields {
    pub fn into_new(self) -> DomainResult<NewJob> {
        let customer_id = self
            .customer_id
            .ok_or_else(|| DomainError::validation("customer_id is required"))?;

        let title = match self.title {
            Some(t) if !t.trim().is_empty() => t.trim().to_string(),
            _ => return Err(DomainError::validation("title is required")),
        };

        let scheduled_date = match self.scheduled_date.as_deref().map(str::trim) {
            None | Some("") => None,
            Some(raw) => Some(NaiveDate::parse_from_str(raw, "%Y-%m-%d").map_err(|_| {
                DomainError::validation(format!("scheduled_date must be YYYY-MM-DD (got {raw:?})"))
            })?),
        };

        Ok(NewJob {
            customer_id,
            title,
            description: self.description.unwrap_or_default(),
            scheduled_date,
        })
    }
}

impl NewJob {
    /// New jobs always start out scheduled with no cost.
    pub fn into_job(self, id: JobId, ai_estimate: Option<String>, created: DateTime<Utc>) -> Job {
        Job {
            id,
            customer_id: self.customer_id,
            title: self.title,
            description: self.description,
            scheduled_date: self.scheduled_date,
            status: JobStatus::Scheduled,
            total_cost: 0.0,
            ai_estimate,
            notes: String::new(),
            created,
            materials_used: Vec::new(),
            photos: Vec::new(),
        }
    }
}
