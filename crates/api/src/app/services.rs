//! Service wiring and the orchestration the route handlers call into.
//!
//! Inventory goes through the [`InventoryLedger`]; customers, materials and
//! jobs are passive in-memory record stores.

use std::sync::Arc;

use chrono::{NaiveDate, Utc};
use sqlx::PgPool;
use thiserror::Error;
use tokio::sync::RwLock;
use tracing::{info, warn};

use fieldtrack_ai::{AiError, AiProvider, AiResponse, LocalFallback, PhotoData};
use fieldtrack_auth::{AuthError, InMemorySessionStore, PasswordGate, SessionId, SessionSigner, SessionStore};
use fieldtrack_core::{ActiveOwner, DomainError, OwnerId};
use fieldtrack_customers::{Customer, CustomerFields, CustomerId};
use fieldtrack_infra::reports::{self, DashboardStats, Summary};
use fieldtrack_infra::{
    AppConfig, InMemoryLedgerStore, InMemoryRecords, InventoryLedger, LedgerError, LedgerStore, PostgresLedgerStore,
};
use fieldtrack_inventory::{AuditEntry, InventoryItem, InventoryItemId, ItemFields, ListFilter};
use fieldtrack_jobs::{Job, JobFields, JobId, JobMaterialLine, JobStatus, LineSource, NewPhoto};
use fieldtrack_materials::{Material, MaterialFields, MaterialId};

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error(transparent)]
    Ledger(#[from] LedgerError),

    #[error(transparent)]
    Domain(#[from] DomainError),

    #[error(transparent)]
    Auth(#[from] AuthError),

    #[error(transparent)]
    Ai(#[from] AiError),

    #[error("{0} not found")]
    NotFound(&'static str),
}

pub type ServiceResult<T> = Result<T, ServiceError>;

/// Where a job material line is priced from.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LineRequest {
    Library { material_id: MaterialId, quantity: f64 },
    Inventory { item_id: InventoryItemId, quantity: f64 },
}

pub struct AppServices {
    ledger: InventoryLedger<Arc<dyn LedgerStore>>,
    /// Held shared by inventory writes that need their owner to exist, and
    /// exclusively by customer deletion.
    owner_gate: RwLock<()>,
    customers: InMemoryRecords<Customer>,
    materials: InMemoryRecords<Material>,
    jobs: InMemoryRecords<Job>,
    ai: Arc<dyn AiProvider>,
    sessions: Arc<dyn SessionStore>,
    signer: Arc<SessionSigner>,
    gate: PasswordGate,
}

/// Build services from config.
///
/// `USE_PERSISTENT_STORES` switches the ledger to Postgres; the passive
/// record stores stay in memory either way.
pub async fn build_services(config: &AppConfig) -> anyhow::Result<AppServices> {
    let ledger_store: Arc<dyn LedgerStore> = if config.use_persistent_stores {
        build_postgres_ledger(config).await?
    } else {
        info!("using in-memory ledger store");
        Arc::new(InMemoryLedgerStore::new())
    };

    AppServices::assemble(ledger_store, config).await
}

async fn build_postgres_ledger(config: &AppConfig) -> anyhow::Result<Arc<dyn LedgerStore>> {
    let database_url = config
        .database_url
        .as_deref()
        .ok_or_else(|| anyhow::anyhow!("DATABASE_URL must be set when USE_PERSISTENT_STORES=true"))?;

    let pool = PgPool::connect(database_url).await?;
    let store = PostgresLedgerStore::new(pool);
    store.ensure_schema().await?;

    info!("using postgres ledger store");
    Ok(Arc::new(store))
}

impl AppServices {
    /// Wire services around an existing ledger store.
    ///
    /// Customers are not persisted with the ledger, so their ids continue
    /// above the highest owner id the store already references.
    pub async fn assemble(ledger_store: Arc<dyn LedgerStore>, config: &AppConfig) -> anyhow::Result<Self> {
        let ledger = InventoryLedger::new(ledger_store);
        let owner_floor = ledger.highest_owner_id().await?.map_or(0, |owner| owner.get());
        if owner_floor > 0 {
            info!(owner_floor, "customer ids resume above existing ledger owners");
        }

        let gate = PasswordGate::new(config.app_password.clone());
        config.warn_insecure_defaults(gate.is_weak());
        let session_ttl = chrono::Duration::minutes(config.session_ttl_minutes);

        Ok(Self {
            ledger,
            owner_gate: RwLock::new(()),
            customers: InMemoryRecords::starting_after(owner_floor),
            materials: InMemoryRecords::new(),
            jobs: InMemoryRecords::new(),
            ai: Arc::new(LocalFallback::new()),
            sessions: Arc::new(InMemorySessionStore::new(session_ttl)),
            signer: Arc::new(SessionSigner::new(config.session_secret.as_bytes(), session_ttl)),
            gate,
        })
    }

    pub fn signer(&self) -> Arc<SessionSigner> {
        self.signer.clone()
    }

    pub fn sessions(&self) -> Arc<dyn SessionStore> {
        self.sessions.clone()
    }

    // -------------------------
    // Session
    // -------------------------

    /// Check the shared password and open a session; returns the bearer token.
    pub fn login(&self, password: &str) -> ServiceResult<(SessionId, String)> {
        if !self.gate.check(password) {
            warn!("login rejected");
            return Err(AuthError::InvalidPassword.into());
        }
        let sid = self.sessions.create();
        let token = self.signer.issue(sid, Utc::now()).map_err(AuthError::from)?;
        info!(session_id = %sid, "session opened");
        Ok((sid, token))
    }

    pub fn logout(&self, sid: SessionId) -> bool {
        self.sessions.remove(sid)
    }

    /// Select (or clear) the session's active owner. The owner must be an
    /// existing customer; later calls override earlier ones.
    pub fn set_active_owner(&self, sid: SessionId, owner: Option<OwnerId>) -> ServiceResult<ActiveOwner> {
        if let Some(owner) = owner {
            if !self.customers.contains(&owner) {
                return Err(ServiceError::NotFound("customer"));
            }
        }
        if !self.sessions.set_current_owner(sid, owner) {
            return Err(AuthError::UnknownSession.into());
        }
        info!(session_id = %sid, owner = ?owner, "active owner changed");
        Ok(ActiveOwner::from(owner))
    }

    // -------------------------
    // Inventory (ledger)
    // -------------------------

    pub async fn list_items(&self, active: ActiveOwner, filter: &ListFilter) -> ServiceResult<Vec<InventoryItem>> {
        Ok(self.ledger.list_items(active, filter).await?)
    }

    pub async fn get_item(&self, id: InventoryItemId, active: ActiveOwner) -> ServiceResult<InventoryItem> {
        Ok(self.ledger.get_item(id, active).await?)
    }

    pub async fn create_item(&self, fields: ItemFields, active: ActiveOwner) -> ServiceResult<InventoryItem> {
        let _owners = self.owner_gate.read().await;
        self.ensure_owner_exists(active)?;
        Ok(self.ledger.create_item(fields, active).await?)
    }

    pub async fn update_item(
        &self,
        id: InventoryItemId,
        fields: ItemFields,
        active: ActiveOwner,
    ) -> ServiceResult<InventoryItem> {
        Ok(self.ledger.update_item(id, fields, active).await?)
    }

    pub async fn adjust_item(
        &self,
        id: InventoryItemId,
        adjustment: f64,
        active: ActiveOwner,
    ) -> ServiceResult<InventoryItem> {
        Ok(self.ledger.adjust_quantity(id, adjustment, active).await?)
    }

    pub async fn delete_item(&self, id: InventoryItemId, active: ActiveOwner) -> ServiceResult<AuditEntry> {
        Ok(self.ledger.delete_item(id, active).await?)
    }

    pub async fn audit_trail(
        &self,
        active: ActiveOwner,
        item_id: Option<InventoryItemId>,
    ) -> ServiceResult<Vec<AuditEntry>> {
        Ok(self.ledger.audit_trail(active, item_id).await?)
    }

    fn ensure_owner_exists(&self, active: ActiveOwner) -> ServiceResult<()> {
        match active.owner_id() {
            Some(owner) if !self.customers.contains(&owner) => Err(LedgerError::OwnerIsolation(format!(
                "active owner {owner} no longer exists"
            ))
            .into()),
            _ => Ok(()),
        }
    }

    // -------------------------
    // Customers
    // -------------------------

    pub fn create_customer(&self, fields: CustomerFields) -> ServiceResult<Customer> {
        let new = fields.into_new()?;
        let now = Utc::now();
        Ok(self.customers.insert_with(|id| new.into_customer(id, now)))
    }

    pub fn get_customer(&self, id: CustomerId) -> ServiceResult<Customer> {
        self.customers.get(&id).ok_or(ServiceError::NotFound("customer"))
    }

    /// Newest first; `search` filters on name, address and phone.
    pub fn list_customers(&self, search: Option<&str>) -> Vec<Customer> {
        let mut customers: Vec<Customer> = self
            .customers
            .list()
            .into_iter()
            .filter(|c| search.is_none_or(|q| c.matches_search(q)))
            .collect();
        customers.sort_by(|a, b| b.created.cmp(&a.created).then(b.id.cmp(&a.id)));
        customers
    }

    pub fn update_customer(&self, id: CustomerId, fields: CustomerFields) -> ServiceResult<Customer> {
        let patch = fields.into_patch()?;
        self.customers
            .update(&id, |c| c.apply(patch))
            .ok_or(ServiceError::NotFound("customer"))
    }

    /// Remove a customer and their jobs. Refused while they still own
    /// inventory: items are only ever removed through the audited ledger.
    pub async fn delete_customer(&self, id: CustomerId) -> ServiceResult<Customer> {
        let _owners = self.owner_gate.write().await;
        if !self.customers.contains(&id) {
            return Err(ServiceError::NotFound("customer"));
        }

        let owned = self
            .ledger
            .list_items(ActiveOwner::of(id), &ListFilter::default())
            .await?;
        if !owned.is_empty() {
            return Err(DomainError::conflict(format!(
                "customer {id} still owns {} inventory item(s); delete them first",
                owned.len()
            ))
            .into());
        }

        let removed_jobs = self.jobs.remove_where(|j| j.customer_id == id);
        let customer = self.customers.remove(&id).ok_or(ServiceError::NotFound("customer"))?;
        info!(customer_id = %id, removed_jobs, "customer deleted");
        Ok(customer)
    }

    // -------------------------
    // Materials
    // -------------------------

    pub fn create_material(&self, fields: MaterialFields) -> ServiceResult<Material> {
        let new = fields.into_new()?;
        Ok(self.materials.insert_with(|id| new.into_material(id)))
    }

    pub fn list_materials(&self) -> Vec<Material> {
        let mut materials = self.materials.list();
        materials.sort_by(|a, b| a.name.to_lowercase().cmp(&b.name.to_lowercase()));
        materials
    }

    // -------------------------
    // Jobs
    // -------------------------

    pub async fn create_job(&self, fields: JobFields, use_ai_estimate: bool) -> ServiceResult<Job> {
        let new = fields.into_new()?;
        let customer = self.get_customer(new.customer_id)?;

        let ai_estimate = if use_ai_estimate {
            match self.ai.estimate(&new.description, &customer.address).await {
                Ok(r) => Some(r.text),
                Err(e) => {
                    warn!(error = %e, "estimate unavailable; job created without one");
                    None
                }
            }
        } else {
            None
        };

        let now = Utc::now();
        let job = self.jobs.insert_with(|id| new.into_job(id, ai_estimate, now));
        info!(job_id = %job.id, customer_id = %job.customer_id, "job created");
        Ok(job)
    }

    pub fn get_job(&self, id: JobId) -> ServiceResult<Job> {
        self.jobs.get(&id).ok_or(ServiceError::NotFound("job"))
    }

    /// Newest scheduled date first; unscheduled jobs last.
    pub fn list_jobs(&self, status: Option<JobStatus>) -> Vec<Job> {
        let mut jobs: Vec<Job> = self
            .jobs
            .list()
            .into_iter()
            .filter(|j| status.is_none_or(|s| j.status == s))
            .collect();
        jobs.sort_by(|a, b| {
            b.scheduled_date
                .is_some()
                .cmp(&a.scheduled_date.is_some())
                .then(b.scheduled_date.cmp(&a.scheduled_date))
                .then(b.id.cmp(&a.id))
        });
        jobs
    }

    pub fn set_job_status(&self, id: JobId, status: JobStatus) -> ServiceResult<Job> {
        self.jobs
            .update(&id, |j| j.set_status(status))
            .ok_or(ServiceError::NotFound("job"))
    }

    pub fn set_job_notes(&self, id: JobId, notes: String) -> ServiceResult<Job> {
        self.jobs
            .update(&id, |j| j.set_notes(notes))
            .ok_or(ServiceError::NotFound("job"))
    }

    /// Add a priced line to a job. Lines drawn from inventory consume stock
    /// through the ledger, so the draw is audited against the active owner.
    pub async fn add_job_material(&self, job_id: JobId, line: LineRequest, active: ActiveOwner) -> ServiceResult<Job> {
        let job = self.get_job(job_id)?;

        let line = match line {
            LineRequest::Library { material_id, quantity } => {
                let material = self
                    .materials
                    .get(&material_id)
                    .ok_or(ServiceError::NotFound("material"))?;
                JobMaterialLine::new(
                    LineSource::Material(material.id.get()),
                    material.name,
                    quantity,
                    material.unit_cost,
                )?
            }
            LineRequest::Inventory { item_id, quantity } => {
                if !active.permits(Some(job.customer_id)) {
                    return Err(LedgerError::OwnerIsolation(format!(
                        "job {job_id} belongs to customer {}, not the active owner",
                        job.customer_id
                    ))
                    .into());
                }
                let _owners = self.owner_gate.read().await;
                return self.draw_inventory_line(job_id, item_id, quantity, active).await;
            }
        };

        self.jobs
            .update(&job_id, |j| j.add_line(line))
            .ok_or(ServiceError::NotFound("job"))
    }

    /// Consume stock and record it as a job line. If the job is gone by the
    /// time the line is written, the stock is put back (audited as well).
    async fn draw_inventory_line(
        &self,
        job_id: JobId,
        item_id: InventoryItemId,
        quantity: f64,
        active: ActiveOwner,
    ) -> ServiceResult<Job> {
        let item = self.ledger.get_item(item_id, active).await?;
        let line = JobMaterialLine::new(
            LineSource::InventoryItem(item.id.get()),
            item.name,
            quantity,
            item.unit_cost,
        )?;
        self.ledger.adjust_quantity(item_id, -quantity, active).await?;

        match self.jobs.update(&job_id, |j| j.add_line(line)) {
            Some(job) => Ok(job),
            None => {
                warn!(job_id = %job_id, item_id = %item_id, quantity, "job vanished during draw; restoring stock");
                self.ledger.adjust_quantity(item_id, quantity, active).await?;
                Err(ServiceError::NotFound("job"))
            }
        }
    }

    pub async fn add_job_photo(&self, job_id: JobId, photo: NewPhoto, analyze: bool) -> ServiceResult<Job> {
        let job = self.get_job(job_id)?;
        let decoded = PhotoData::from_data_url(&photo.photo_data)?;

        let ai_analysis = if analyze {
            match self.ai.analyze(&decoded, &format!("Job: {}", job.title)).await {
                Ok(r) => Some(r.text),
                Err(e) => {
                    warn!(error = %e, "photo analysis unavailable");
                    None
                }
            }
        } else {
            None
        };

        let now = Utc::now();
        self.jobs
            .update(&job_id, |j| j.add_photo(photo, ai_analysis, now))
            .ok_or(ServiceError::NotFound("job"))
    }

    // -------------------------
    // Reports
    // -------------------------

    pub fn dashboard(&self) -> DashboardStats {
        DashboardStats::from_jobs(&self.jobs.list())
    }

    pub async fn summary(&self, active: ActiveOwner) -> ServiceResult<Summary> {
        let low_stock = self
            .ledger
            .list_items(
                active,
                &ListFilter {
                    location: None,
                    low_stock: true,
                },
            )
            .await?;
        Ok(reports::summary(&self.jobs.list(), &self.customers.list(), low_stock))
    }

    pub fn end_of_shift_report(&self, date: NaiveDate) -> String {
        reports::end_of_shift_report(date, &self.jobs.list(), &self.customers.list())
    }

    // -------------------------
    // AI helpers
    // -------------------------

    pub async fn estimate(&self, description: &str, address: &str) -> ServiceResult<AiResponse> {
        Ok(self.ai.estimate(description, address).await?)
    }

    pub async fn analyze_photo(&self, photo_data: &str, context: &str) -> ServiceResult<AiResponse> {
        let photo = PhotoData::from_data_url(photo_data)?;
        Ok(self.ai.analyze(&photo, context).await?)
    }

    pub async fn suggest_schedule(&self, address: &str) -> ServiceResult<AiResponse> {
        Ok(self.ai.suggest(address).await?)
    }

    pub async fn answer_question(&self, question: &str) -> ServiceResult<AiResponse> {
        Ok(self.ai.answer(question).await?)
    }
}

#[cfg(test)]
mod tests {
    use fieldtrack_core::Numeric;
    use fieldtrack_inventory::AuditAction;

    use super::*;

    fn config() -> AppConfig {
        AppConfig::from_lookup(|_| None).unwrap()
    }

    fn customer(name: &str) -> CustomerFields {
        CustomerFields {
            name: Some(name.to_string()),
            ..CustomerFields::default()
        }
    }

    fn ladder() -> ItemFields {
        ItemFields {
            name: Some("Ladder".to_string()),
            quantity: Some(Numeric::from(2.0)),
            unit: Some("each".to_string()),
            unit_cost: Some(Numeric::from(50.0)),
            location: Some("truck1".to_string()),
            ..ItemFields::default()
        }
    }

    #[tokio::test]
    async fn customer_ids_resume_above_ledger_owners_after_restart() {
        let store: Arc<dyn LedgerStore> = Arc::new(InMemoryLedgerStore::new());

        let first_run = AppServices::assemble(store.clone(), &config()).await.unwrap();
        let alice = first_run.create_customer(customer("Alice")).unwrap();
        first_run
            .create_item(
                ItemFields {
                    name: Some("Alice ladder".to_string()),
                    ..ladder()
                },
                ActiveOwner::of(alice.id),
            )
            .await
            .unwrap();
        drop(first_run);

        let second_run = AppServices::assemble(store, &config()).await.unwrap();
        let bob = second_run.create_customer(customer("Bob")).unwrap();
        assert!(bob.id > alice.id);

        let bob_scope = ActiveOwner::of(bob.id);
        assert!(second_run.list_items(bob_scope, &ListFilter::default()).await.unwrap().is_empty());
        assert!(second_run.audit_trail(bob_scope, None).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn inventory_writes_for_a_deleted_customer_are_refused() {
        let services = AppServices::assemble(Arc::new(InMemoryLedgerStore::new()), &config()).await.unwrap();
        let gone = services.create_customer(customer("Gone")).unwrap();
        let scope = ActiveOwner::of(gone.id);

        services.delete_customer(gone.id).await.unwrap();

        let err = services.create_item(ladder(), scope).await.unwrap_err();
        assert!(matches!(err, ServiceError::Ledger(LedgerError::OwnerIsolation(_))));
        assert!(services.audit_trail(scope, None).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn draw_onto_missing_job_restores_stock() {
        let services = AppServices::assemble(Arc::new(InMemoryLedgerStore::new()), &config()).await.unwrap();
        let owner = services.create_customer(customer("Acme")).unwrap();
        let scope = ActiveOwner::of(owner.id);
        let item = services.create_item(ladder(), scope).await.unwrap();

        let err = services
            .draw_inventory_line(JobId::new(404), item.id, 1.5, scope)
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::NotFound("job")));

        assert_eq!(services.get_item(item.id, scope).await.unwrap().quantity, 2.0);
        let actions: Vec<_> = services
            .audit_trail(scope, Some(item.id))
            .await
            .unwrap()
            .into_iter()
            .map(|e| e.action)
            .collect();
        assert_eq!(actions, vec![AuditAction::Create, AuditAction::Update, AuditAction::Update]);
    }
}
