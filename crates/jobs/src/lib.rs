//! Jobs domain module.
//!
//! A job is scheduled work for a customer. It accumulates priced material lines
//! (its total cost is their sum), photos and notes.

pub mod job;
pub mod line;

pub use job::{Job, JobFields, JobId, JobPhoto, JobStatus, NewJob, NewPhoto};
pub use line::{JobMaterialLine, LineSource};
