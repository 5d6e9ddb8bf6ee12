//! Deterministic built-in provider.
//!
//! Used when no generative model is configured. Estimates come from a simple
//! per-foot / per-downspout rate card so results are reproducible.

use async_trait::async_trait;
use tracing::debug;

use crate::photo::PhotoData;
use crate::provider::{Estimator, HelpDesk, PhotoAnalyzer, ScheduleAdvisor};
use crate::result::{AiError, AiResponse};

pub const PROVIDER_NAME: &str = "LocalFallback";

const GUTTER_MATERIAL_PER_FOOT: f64 = 3.25;
const DOWNSPOUT_MATERIAL_EACH: f64 = 45.0;
const LABOR_RATE_PER_HOUR: f64 = 65.0;
const FEET_PER_LABOR_HOUR: f64 = 25.0;
const HOURS_PER_DOWNSPOUT: f64 = 0.5;
const MINIMUM_CHARGE: f64 = 150.0;

/// Rate-card estimator, placeholder photo assessor and naive scheduler.
#[derive(Debug, Default, Copy, Clone)]
pub struct LocalFallback;

impl LocalFallback {
    pub fn new() -> Self {
        Self
    }
}

/// Quantities pulled out of a free-text job description.
#[derive(Debug, Default, Copy, Clone, PartialEq)]
struct JobQuantities {
    linear_feet: Option<f64>,
    downspouts: u32,
}

fn parse_quantities(description: &str) -> JobQuantities {
    let lower = description.to_lowercase();
    let tokens: Vec<&str> = lower
        .split(|c: char| c.is_whitespace() || c == ',' || c == ';')
        .filter(|t| !t.is_empty())
        .collect();

    let mut quantities = JobQuantities::default();

    for (i, token) in tokens.iter().enumerate() {
        let next = tokens.get(i + 1).copied().unwrap_or("");

        // "50ft" / "50'" glued to the number.
        let glued = token
            .strip_suffix("ft")
            .or_else(|| token.strip_suffix('\''))
            .and_then(|n| n.parse::<f64>().ok());

        if let Some(feet) = glued {
            quantities.linear_feet.get_or_insert(feet);
            continue;
        }

        let Ok(number) = token.parse::<f64>() else {
            continue;
        };

        if matches!(next, "ft" | "feet" | "foot" | "lf") {
            quantities.linear_feet.get_or_insert(number);
        } else if next.starts_with("downspout") {
            // `as` saturates at u32::MAX.
            quantities.downspouts = quantities.downspouts.saturating_add(number.max(0.0) as u32);
        }
    }

    quantities
}

fn format_estimate(description: &str, address: &str, q: JobQuantities) -> String {
    let Some(feet) = q.linear_feet else {
        return format!(
            "Cost estimate ({PROVIDER_NAME})\n\
             Job: {description}\n\
             Property: {address}\n\n\
             No linear footage found in the description; a site visit is needed for an accurate quote.\n\
             Minimum service charge: ${MINIMUM_CHARGE:.2}"
        );
    };

    let downspouts = f64::from(q.downspouts);
    let hours = (feet / FEET_PER_LABOR_HOUR + downspouts * HOURS_PER_DOWNSPOUT).max(1.0);
    let materials = feet * GUTTER_MATERIAL_PER_FOOT + downspouts * DOWNSPOUT_MATERIAL_EACH;
    let labor = hours * LABOR_RATE_PER_HOUR;
    let total = (materials + labor).max(MINIMUM_CHARGE);

    format!(
        "Cost estimate ({PROVIDER_NAME})\n\
         Job: {description}\n\
         Property: {address}\n\n\
         1. Estimated labor hours: {hours:.1}\n\
         2. Materials: {feet:.0} ft gutter, {downspouts:.0} downspout(s), hangers and fasteners\n\
         3. Cost breakdown: materials ${materials:.2}, labor ${labor:.2}\n\
         4. Total estimate range: ${low:.2} - ${high:.2}\n\
         5. Considerations: fascia condition and roof pitch can add time; confirm on site.",
        low = total * 0.9,
        high = total * 1.15,
    )
}

#[async_trait]
impl Estimator for LocalFallback {
    async fn estimate(&self, description: &str, address: &str) -> Result<AiResponse, AiError> {
        let description = description.trim();
        if description.is_empty() {
            return Err(AiError::InvalidInput("description is required".to_string()));
        }

        let quantities = parse_quantities(description);
        debug!(?quantities, "fallback estimate");
        Ok(AiResponse::new(
            PROVIDER_NAME,
            format_estimate(description, address.trim(), quantities),
        ))
    }
}

#[async_trait]
impl PhotoAnalyzer for LocalFallback {
    async fn analyze(&self, photo: &PhotoData, context: &str) -> Result<AiResponse, AiError> {
        let mut text = format!(
            "Photo received ({} bytes, {}). Automated condition assessment is not available; \
             review for damage, rust, sagging and clogs manually.",
            photo.bytes.len(),
            photo.mime_type
        );
        if !context.trim().is_empty() {
            text.push_str(&format!("\nContext: {}", context.trim()));
        }
        Ok(AiResponse::new(PROVIDER_NAME, text))
    }
}

#[async_trait]
impl ScheduleAdvisor for LocalFallback {
    async fn suggest(&self, address: &str) -> Result<AiResponse, AiError> {
        let text = match address.trim() {
            "" => "Next available".to_string(),
            address => format!("Date suggested for {address}: soon"),
        };
        Ok(AiResponse::new(PROVIDER_NAME, text))
    }
}

#[async_trait]
impl HelpDesk for LocalFallback {
    async fn answer(&self, question: &str) -> Result<AiResponse, AiError> {
        let question = question.trim();
        if question.is_empty() {
            return Err(AiError::InvalidInput("question is required".to_string()));
        }

        let lower = question.to_lowercase();
        let hint = if lower.contains("inventory") || lower.contains("stock") {
            "Select a customer as the active owner first; inventory is listed, \
             adjusted and audited per owner under /inventory."
        } else if lower.contains("estimate") || lower.contains("quote") {
            "Describe the run in feet and count the downspouts, e.g. \
             \"120 ft gutter, 3 downspouts\", then POST it to /api/ai/estimate."
        } else if lower.contains("report") {
            "The end-of-shift report for today is at /reports/download_today."
        } else {
            "I can help with inventory, estimates, jobs and reports."
        };

        Ok(AiResponse::new(PROVIDER_NAME, format!("You asked: {question}. {hint}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_feet_and_downspouts() {
        let q = parse_quantities("Replace 50 feet of K-style gutters, install 2 downspouts");
        assert_eq!(q.linear_feet, Some(50.0));
        assert_eq!(q.downspouts, 2);

        let q = parse_quantities("clean 120ft run");
        assert_eq!(q.linear_feet, Some(120.0));
        assert_eq!(q.downspouts, 0);
    }

    #[tokio::test]
    async fn estimate_contains_range() {
        let r = LocalFallback
            .estimate("Replace 50 feet of K-style gutters, install 2 downspouts", "123 Main St")
            .await
            .unwrap();
        assert_eq!(r.provider, PROVIDER_NAME);
        assert!(r.text.contains("Total estimate range"));
        assert!(r.text.contains("123 Main St"));
    }

    #[tokio::test]
    async fn huge_downspout_counts_saturate() {
        let q = parse_quantities("100 ft gutter, 4294967295 downspouts and 1 downspout");
        assert_eq!(q.downspouts, u32::MAX);

        let r = LocalFallback
            .estimate("100 ft gutter, 4294967295 downspouts and 1 downspout", "1 Oak Rd")
            .await
            .unwrap();
        assert!(r.text.contains("Total estimate range"));
    }

    #[tokio::test]
    async fn estimate_without_footage_asks_for_site_visit() {
        let r = LocalFallback.estimate("Gutters leaking", "").await.unwrap();
        assert!(r.text.contains("site visit"));
    }

    #[tokio::test]
    async fn estimate_requires_description() {
        assert!(matches!(
            LocalFallback.estimate("  ", "123 Main St").await,
            Err(AiError::InvalidInput(_))
        ));
    }

    #[tokio::test]
    async fn schedule_suggestion_mentions_address() {
        let r = LocalFallback.suggest("9 Elm St").await.unwrap();
        assert_eq!(r.text, "Date suggested for 9 Elm St: soon");
        assert_eq!(LocalFallback.suggest("").await.unwrap().text, "Next available");
    }

    #[tokio::test]
    async fn help_answers_with_a_topic_hint() {
        let r = LocalFallback.answer("How do I adjust stock?").await.unwrap();
        assert_eq!(r.provider, PROVIDER_NAME);
        assert!(r.text.starts_with("You asked: How do I adjust stock?"));
        assert!(r.text.contains("active owner"));

        assert!(matches!(
            LocalFallback.answer(" ").await,
            Err(AiError::InvalidInput(_))
        ));
    }
}
