//! `fieldtrack-ai`
//!
//! **Responsibility:** Optional AI assistance boundary (cost estimates, photo
//! analysis, scheduling hints, help answers).
//!
//! This crate is intentionally **not** part of the domain model:
//! - It must not depend on domain records (Inventory/Jobs/etc).
//! - It must not mutate domain state.
//! - It returns advisory text that callers may store next to a record.
//!
//! The generative model is an opaque service behind the traits in `provider`.
//! `LocalFallback` is the deterministic provider used when no model is wired in.

pub mod fallback;
pub mod photo;
pub mod provider;
pub mod result;

pub use fallback::LocalFallback;
pub use photo::PhotoData;
pub use provider::{AiProvider, Estimator, HelpDesk, PhotoAnalyzer, ScheduleAdvisor};
pub use result::{AiError, AiResponse};
