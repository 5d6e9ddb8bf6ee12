use async_trait::async_trait;

use crate::photo::PhotoData;
use crate::result::{AiError, AiResponse};

/// Produces a cost estimate for a described job at an address.
#[async_trait]
pub trait Estimator: Send + Sync {
    async fn estimate(&self, description: &str, address: &str) -> Result<AiResponse, AiError>;
}

/// Assesses a job-site or inventory photo.
#[async_trait]
pub trait PhotoAnalyzer: Send + Sync {
    async fn analyze(&self, photo: &PhotoData, context: &str) -> Result<AiResponse, AiError>;
}

/// Suggests when to schedule a new job.
#[async_trait]
pub trait ScheduleAdvisor: Send + Sync {
    async fn suggest(&self, address: &str) -> Result<AiResponse, AiError>;
}

/// Answers free-form support questions.
#[async_trait]
pub trait HelpDesk: Send + Sync {
    async fn answer(&self, question: &str) -> Result<AiResponse, AiError>;
}

/// Everything the API needs from a provider, as one object-safe bound.
pub trait AiProvider: Estimator + PhotoAnalyzer + ScheduleAdvisor + HelpDesk {}

impl<T> AiProvider for T where T: Estimator + PhotoAnalyzer + ScheduleAdvisor + HelpDesk {}
