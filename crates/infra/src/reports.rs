//! Dashboard figures and the end-of-shift text report.

use std::collections::HashMap;
use std::fmt::Write as _;

use chrono::NaiveDate;
use serde::Serialize;

use fieldtrack_core::OwnerId;
use fieldtrack_customers::Customer;
use fieldtrack_inventory::InventoryItem;
use fieldtrack_jobs::{Job, JobStatus};

const RECENT_JOBS: usize = 10;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DashboardStats {
    pub total_jobs: usize,
    pub completed_jobs: usize,
    pub scheduled_jobs: usize,
    /// Sum of `total_cost` over completed jobs.
    pub total_revenue: f64,
}

impl DashboardStats {
    pub fn from_jobs(jobs: &[Job]) -> Self {
        let completed = jobs.iter().filter(|j| j.status == JobStatus::Completed);
        Self {
            total_jobs: jobs.len(),
            completed_jobs: completed.clone().count(),
            scheduled_jobs: jobs.iter().filter(|j| j.status == JobStatus::Scheduled).count(),
            total_revenue: completed.map(|j| j.total_cost).sum(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RecentJob {
    pub job: Job,
    pub customer_name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Summary {
    pub stats: DashboardStats,
    pub recent_jobs: Vec<RecentJob>,
    pub low_stock: Vec<InventoryItem>,
}

/// Dashboard figures plus the ten newest jobs and the low-stock items passed
/// in (already scoped to the active owner by the caller).
pub fn summary(jobs: &[Job], customers: &[Customer], low_stock: Vec<InventoryItem>) -> Summary {
    let names = by_id(customers);

    let mut recent: Vec<&Job> = jobs.iter().collect();
    recent.sort_by(|a, b| b.created.cmp(&a.created).then(b.id.cmp(&a.id)));

    Summary {
        stats: DashboardStats::from_jobs(jobs),
        recent_jobs: recent
            .into_iter()
            .take(RECENT_JOBS)
            .map(|job| RecentJob {
                customer_name: names.get(&job.customer_id).map(|c| c.name.clone()),
                job: job.clone(),
            })
            .collect(),
        low_stock: low_stock.into_iter().filter(InventoryItem::is_low_stock).collect(),
    }
}

/// Plain-text report of the jobs scheduled on `date`.
pub fn end_of_shift_report(date: NaiveDate, jobs: &[Job], customers: &[Customer]) -> String {
    let names = by_id(customers);
    let todays: Vec<&Job> = jobs.iter().filter(|j| j.is_scheduled_on(date)).collect();

    let mut out = String::new();
    let _ = writeln!(out, "End of Shift Report - {}", date.format("%Y-%m-%d"));
    let _ = writeln!(out, "{}", "=".repeat(40));

    if todays.is_empty() {
        let _ = writeln!(out, "\nNo jobs scheduled for today.");
        return out;
    }

    for job in &todays {
        let customer = names.get(&job.customer_id);
        let _ = writeln!(out);
        let _ = writeln!(out, "Job: {}", job.title);
        let _ = writeln!(
            out,
            "Customer: {}",
            customer.map(|c| c.name.as_str()).unwrap_or("(unknown customer)")
        );
        let _ = writeln!(out, "Address: {}", customer.map(|c| c.address.as_str()).unwrap_or(""));
        let _ = writeln!(out, "Status: {}", job.status);
        let _ = writeln!(out, "Total Cost: ${:.2}", job.total_cost);
        if !job.notes.is_empty() {
            let _ = writeln!(out, "Notes: {}", job.notes);
        }
        let _ = writeln!(out, "{}", "-".repeat(40));
    }

    let total: f64 = todays.iter().map(|j| j.total_cost).sum();
    let _ = writeln!(out, "\nJobs: {}  Total: ${:.2}", todays.len(), total);
    out
}

fn by_id(customers: &[Customer]) -> HashMap<OwnerId, &Customer> {
    customers.iter().map(|c| (c.id, c)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use fieldtrack_jobs::{JobFields, JobId, JobMaterialLine, LineSource};

    fn customer() -> Customer {
        Customer {
            id: OwnerId::new(1),
            name: "Test Customer".to_string(),
            address: "123 Test St".to_string(),
            phone: String::new(),
            email: String::new(),
            notes: String::new(),
            created: Utc::now(),
        }
    }

    fn job(id: i64, title: &str, date: &str) -> Job {
        JobFields {
            customer_id: Some(OwnerId::new(1)),
            title: Some(title.to_string()),
            description: None,
            scheduled_date: Some(date.to_string()),
        }
        .into_new()
        .unwrap()
        .into_job(JobId::new(id), None, Utc.with_ymd_and_hms(2026, 1, 1, 8, 0, id as u32).unwrap())
    }

    fn day() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 3, 14).unwrap()
    }

    #[test]
    fn report_lists_todays_jobs() {
        let mut j = job(1, "Test Job for Today", "2026-03-14");
        j.add_line(JobMaterialLine::new(LineSource::Material(1), "Gutter", 1.0, 150.0).unwrap());
        let other_day = job(2, "Tomorrow's job", "2026-03-15");

        let report = end_of_shift_report(day(), &[j, other_day], &[customer()]);
        assert!(report.contains("End of Shift Report"));
        assert!(report.contains("Test Job for Today"));
        assert!(report.contains("Test Customer"));
        assert!(report.contains("123 Test St"));
        assert!(report.contains("scheduled"));
        assert!(report.contains("$150.00"));
        assert!(!report.contains("Tomorrow's job"));
    }

    #[test]
    fn empty_day_says_so() {
        let report = end_of_shift_report(day(), &[], &[customer()]);
        assert!(report.contains("End of Shift Report"));
        assert!(report.contains("No jobs scheduled for today"));
    }

    #[test]
    fn revenue_counts_completed_jobs_only() {
        let mut done = job(1, "Done", "2026-03-14");
        done.add_line(JobMaterialLine::new(LineSource::Material(1), "Gutter", 2.0, 40.0).unwrap());
        done.set_status(JobStatus::Completed);
        let mut open = job(2, "Open", "2026-03-14");
        open.add_line(JobMaterialLine::new(LineSource::Material(1), "Gutter", 1.0, 99.0).unwrap());

        let stats = DashboardStats::from_jobs(&[done, open]);
        assert_eq!(stats.total_jobs, 2);
        assert_eq!(stats.completed_jobs, 1);
        assert_eq!(stats.scheduled_jobs, 1);
        assert_eq!(stats.total_revenue, 80.0);
    }

    #[test]
    fn summary_keeps_ten_newest_jobs() {
        let jobs: Vec<Job> = (1..=12).map(|i| job(i, &format!("Job {i}"), "2026-03-14")).collect();
        let s = summary(&jobs, &[customer()], Vec::new());
        assert_eq!(s.recent_jobs.len(), 10);
        assert_eq!(s.recent_jobs[0].job.title, "Job 12");
        assert_eq!(s.recent_jobs[0].customer_name.as_deref(), Some("Test Customer"));
    }
}
