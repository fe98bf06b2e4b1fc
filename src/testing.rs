// src/testing.rs
//
// Fakes em memória para os testes: um "banco" que implementa todos os stores
// avaliando o mesmo `Scope` das queries, e provedores de e-mail/arquivos.

use std::{
    collections::{HashMap, HashSet},
    sync::{Arc, Mutex, MutexGuard},
    time::Duration as StdDuration,
};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use jsonwebtoken::{encode, EncodingKey, Header};
use serde_json::{json, Value};
use uuid::Uuid;

use crate::{
    common::{error::AppError, pagination::PageRequest},
    config::{AppState, Config, MailSettings, SessionSettings, Stores},
    db::{
        CompanyStore, DashboardStore, EmailLogStore, FileStore, LeadCount, LeadStore, ProfileStore,
        ReminderStore, TagStore,
    },
    integrations::{MailError, MailProvider, ObjectStorage, OutboundEmail, PutObject, StorageSettings},
    models::{
        auth::{Claims, NewProfile, Principal, Role, UserProfile},
        company::{slugify, Company},
        email::{EmailLog, EmailStatus, NewEmailLog},
        file::{FileRecord, NewFileRecord},
        lead::{Lead, LeadFilters, LeadPatch, LeadStatus, NewLead, Tag},
        reminder::{NewReminder, Reminder, ReminderStatus},
    },
    services::visibility::Scope,
};

pub const SESSION_SECRET: &str = "test-secret-test-secret-test-secret-42";

pub fn session_settings() -> SessionSettings {
    SessionSettings {
        jwt_secret: SESSION_SECRET.to_string(),
        audience: "authenticated".to_string(),
        cookie_name: "sb-access-token".to_string(),
        refresh_window_secs: 600,
        ttl_secs: 3600,
    }
}

pub fn test_config() -> Config {
    Config {
        database_url: "postgres://localhost/crm_test".to_string(),
        database_max_connections: 1,
        bind_addr: "127.0.0.1:0".to_string(),
        app_url: "https://crm.example.com".to_string(),
        max_upload_bytes: 1024 * 1024,
        session: session_settings(),
        mail: MailSettings {
            api_key: "re_test".to_string(),
            api_url: "https://mail.example.com".to_string(),
            from: "CRM System <noreply@yourapp.com>".to_string(),
        },
        storage: StorageSettings {
            endpoint: "https://storage.example.com".to_string(),
            access_key_id: "key".to_string(),
            secret_access_key: "secret".to_string(),
            bucket: "crm-files".to_string(),
            public_url: "https://files.example.com".to_string(),
        },
    }
}

pub fn test_state(db: &Arc<MemoryDb>, mail: &Arc<FakeMail>, storage: &Arc<FakeStorage>) -> AppState {
    let stores = Stores {
        profiles: db.clone(),
        companies: db.clone(),
        leads: db.clone(),
        tags: db.clone(),
        email_logs: db.clone(),
        reminders: db.clone(),
        files: db.clone(),
        dashboard: db.clone(),
    };
    AppState::from_parts(test_config(), stores, mail.clone(), storage.clone())
}

pub fn claims_for(sub: Uuid) -> Claims {
    let now = Utc::now().timestamp();
    Claims {
        sub,
        exp: (now + 3600) as usize,
        iat: now as usize,
        aud: Some("authenticated".to_string()),
        email: Some("anna@kund.se".to_string()),
        user_metadata: Some(json!({})),
    }
}

pub fn mint_token(sub: Uuid, secret: &str, aud: &str, exp: DateTime<Utc>) -> String {
    let claims = Claims {
        exp: exp.timestamp() as usize,
        aud: Some(aud.to_string()),
        ..claims_for(sub)
    };
    encode(&Header::default(), &claims, &EncodingKey::from_secret(secret.as_bytes())).unwrap()
}

/// Valor pronto para o header `Authorization` de um principal de teste.
pub fn bearer_for(principal: &Principal) -> String {
    let token = mint_token(
        principal.user_id,
        SESSION_SECRET,
        "authenticated",
        Utc::now() + chrono::Duration::hours(1),
    );
    format!("Bearer {}", token)
}

pub async fn body_json(response: axum::response::Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

// ---
// Banco em memória
// ---

#[derive(Default)]
struct Tables {
    companies: Vec<Company>,
    profiles: Vec<UserProfile>,
    leads: Vec<Lead>,
    tags: Vec<Tag>,
    lead_tags: Vec<(Uuid, Uuid)>,
    email_logs: Vec<EmailLog>,
    reminders: Vec<Reminder>,
    files: Vec<FileRecord>,
}

#[derive(Default)]
pub struct MemoryDb {
    tables: Mutex<Tables>,
    failing: Mutex<HashSet<&'static str>>,
}

fn paginate<T>(rows: Vec<T>, page: PageRequest) -> (Vec<T>, i64) {
    let total = rows.len() as i64;
    let slice = rows
        .into_iter()
        .skip(page.offset() as usize)
        .take(page.limit as usize)
        .collect();
    (slice, total)
}

fn apply_patch(lead: &mut Lead, patch: &LeadPatch) {
    if let Some(v) = &patch.first_name {
        lead.first_name = v.clone();
    }
    if let Some(v) = &patch.last_name {
        lead.last_name = Some(v.clone());
    }
    if let Some(v) = &patch.email {
        lead.email = Some(v.clone());
    }
    if let Some(v) = &patch.phone {
        lead.phone = Some(v.clone());
    }
    if let Some(v) = &patch.company {
        lead.company = Some(v.clone());
    }
    if let Some(v) = &patch.title {
        lead.title = Some(v.clone());
    }
    if let Some(v) = patch.status {
        lead.status = v;
    }
    if let Some(v) = patch.score {
        lead.score = v;
    }
    if let Some(v) = &patch.notes {
        lead.notes = Some(v.clone());
    }
    if let Some(v) = &patch.source {
        lead.source = Some(v.clone());
    }
    if let Some(v) = patch.assigned_to_id {
        lead.assigned_to_id = Some(v);
    }
    if let Some(v) = patch.last_contact {
        lead.last_contact = Some(v);
    }
    lead.updated_at = Utc::now();
}

fn matches_filters(lead: &Lead, filters: &LeadFilters) -> bool {
    if let Some(term) = filters.search.as_deref().map(str::trim).filter(|t| !t.is_empty()) {
        let term = term.to_lowercase();
        let hit = [Some(&lead.first_name), lead.last_name.as_ref(), lead.email.as_ref(), lead.company.as_ref()]
            .into_iter()
            .flatten()
            .any(|field| field.to_lowercase().contains(&term));
        if !hit {
            return false;
        }
    }
    if filters.status.is_some_and(|s| s != lead.status) {
        return false;
    }
    if filters.assigned_to.is_some() && filters.assigned_to != lead.assigned_to_id {
        return false;
    }
    true
}

fn reminder_matches(reminder: &Reminder, status: Option<ReminderStatus>, now: DateTime<Utc>) -> bool {
    match status {
        None => true,
        Some(wanted) => reminder.clone().with_effective_status(now).status == wanted,
    }
}

impl MemoryDb {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    fn tables(&self) -> MutexGuard<'_, Tables> {
        self.tables.lock().unwrap()
    }

    /// Faz a próxima (e todas as seguintes) chamada de `op` falhar com erro de banco.
    pub fn fail_on(&self, op: &'static str) {
        self.failing.lock().unwrap().insert(op);
    }

    fn check(&self, op: &'static str) -> Result<(), AppError> {
        if self.failing.lock().unwrap().contains(op) {
            return Err(AppError::DatabaseError(sqlx::Error::PoolTimedOut));
        }
        Ok(())
    }

    pub fn add_company(&self, name: &str) -> Company {
        let now = Utc::now();
        let company = Company {
            id: Uuid::new_v4(),
            name: name.to_string(),
            slug: slugify(name),
            domain: None,
            settings: json!({}),
            created_at: now,
            updated_at: now,
        };
        self.tables().companies.push(company.clone());
        company
    }

    pub fn add_profile(&self, company_id: Uuid, role: Role) -> Principal {
        let now = Utc::now();
        let id = Uuid::new_v4();
        let profile = UserProfile {
            id,
            user_id: Uuid::new_v4(),
            company_id,
            email: format!("{}@kund.se", id.simple()),
            first_name: None,
            last_name: None,
            avatar_url: None,
            role,
            is_active: true,
            created_at: now,
            updated_at: now,
        };
        let principal = Principal::from(&profile);
        self.tables().profiles.push(profile);
        principal
    }

    pub fn deactivate_profile(&self, profile_id: Uuid) {
        if let Some(p) = self.tables().profiles.iter_mut().find(|p| p.id == profile_id) {
            p.is_active = false;
        }
    }

    pub fn company(&self, company_id: Uuid) -> Option<Company> {
        self.tables().companies.iter().find(|c| c.id == company_id).cloned()
    }

    pub fn tag_count(&self, company_id: Uuid) -> usize {
        self.tables().tags.iter().filter(|t| t.company_id == company_id).count()
    }

    pub fn seed_lead(&self, company_id: Uuid, assigned_to: Uuid, first_name: &str) -> Lead {
        let now = Utc::now();
        let lead = Lead {
            id: Uuid::new_v4(),
            company_id,
            first_name: first_name.to_string(),
            last_name: None,
            email: None,
            phone: None,
            company: None,
            title: None,
            status: LeadStatus::New,
            score: 0,
            notes: None,
            source: None,
            assigned_to_id: Some(assigned_to),
            created_by_id: assigned_to,
            is_active: true,
            last_contact: None,
            created_at: now,
            updated_at: now,
        };
        self.tables().leads.push(lead.clone());
        lead
    }

    pub fn patch_lead(&self, lead_id: Uuid, patch: LeadPatch) {
        if let Some(lead) = self.tables().leads.iter_mut().find(|l| l.id == lead_id) {
            apply_patch(lead, &patch);
        }
    }

    pub fn email_log_count(&self) -> usize {
        self.tables().email_logs.len()
    }

    pub fn email_log(&self, tracking_id: &str) -> Option<EmailLog> {
        self.tables().email_logs.iter().find(|e| e.tracking_id == tracking_id).cloned()
    }

    fn visible_leads(&self, scope: &Scope) -> Vec<Lead> {
        self.tables()
            .leads
            .iter()
            .filter(|l| l.is_active && scope.admits(l.company_id, l.assigned_to_id))
            .cloned()
            .collect()
    }
}

#[async_trait]
impl ProfileStore for MemoryDb {
    async fn find_active_by_user_id(&self, user_id: Uuid) -> Result<Option<UserProfile>, AppError> {
        Ok(self.tables().profiles.iter().find(|p| p.user_id == user_id && p.is_active).cloned())
    }

    async fn find_by_user_id(&self, user_id: Uuid) -> Result<Option<UserProfile>, AppError> {
        Ok(self.tables().profiles.iter().find(|p| p.user_id == user_id).cloned())
    }

    async fn find_active_in_company(
        &self,
        company_id: Uuid,
        profile_id: Uuid,
    ) -> Result<Option<UserProfile>, AppError> {
        Ok(self
            .tables()
            .profiles
            .iter()
            .find(|p| p.id == profile_id && p.company_id == company_id && p.is_active)
            .cloned())
    }

    async fn create(&self, profile: NewProfile) -> Result<UserProfile, AppError> {
        let mut tables = self.tables();
        if tables.profiles.iter().any(|p| p.user_id == profile.user_id) {
            return Err(AppError::invalid("userId", "Perfil já existe para este usuário."));
        }
        let now = Utc::now();
        let created = UserProfile {
            id: Uuid::new_v4(),
            user_id: profile.user_id,
            company_id: profile.company_id,
            email: profile.email,
            first_name: profile.first_name,
            last_name: profile.last_name,
            avatar_url: None,
            role: profile.role,
            is_active: true,
            created_at: now,
            updated_at: now,
        };
        tables.profiles.push(created.clone());
        Ok(created)
    }
}

#[async_trait]
impl CompanyStore for MemoryDb {
    async fn find(&self, company_id: Uuid) -> Result<Option<Company>, AppError> {
        Ok(self.company(company_id))
    }

    async fn ensure_by_slug(&self, name: &str, slug: &str) -> Result<(Company, bool), AppError> {
        let mut tables = self.tables();
        if let Some(existing) = tables.companies.iter().find(|c| c.slug == slug) {
            return Ok((existing.clone(), false));
        }
        let now = Utc::now();
        let company = Company {
            id: Uuid::new_v4(),
            name: name.to_string(),
            slug: slug.to_string(),
            domain: None,
            settings: json!({}),
            created_at: now,
            updated_at: now,
        };
        tables.companies.push(company.clone());
        Ok((company, true))
    }

    async fn update_settings(&self, company_id: Uuid, settings: &Value) -> Result<Option<Company>, AppError> {
        let mut tables = self.tables();
        Ok(tables.companies.iter_mut().find(|c| c.id == company_id).map(|c| {
            c.settings = settings.clone();
            c.updated_at = Utc::now();
            c.clone()
        }))
    }
}

#[async_trait]
impl LeadStore for MemoryDb {
    async fn list(
        &self,
        scope: &Scope,
        filters: &LeadFilters,
        page: PageRequest,
    ) -> Result<(Vec<Lead>, i64), AppError> {
        let mut rows: Vec<Lead> = self
            .visible_leads(scope)
            .into_iter()
            .filter(|l| matches_filters(l, filters))
            .collect();
        rows.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(paginate(rows, page))
    }

    async fn find(&self, scope: &Scope, lead_id: Uuid) -> Result<Option<Lead>, AppError> {
        Ok(self.visible_leads(scope).into_iter().find(|l| l.id == lead_id))
    }

    async fn insert(&self, lead: NewLead) -> Result<Lead, AppError> {
        self.check("leads.insert")?;
        let now = Utc::now();
        let created = Lead {
            id: Uuid::new_v4(),
            company_id: lead.company_id,
            first_name: lead.first_name,
            last_name: lead.last_name,
            email: lead.email,
            phone: lead.phone,
            company: lead.company,
            title: lead.title,
            status: lead.status,
            score: 0,
            notes: lead.notes,
            source: lead.source,
            assigned_to_id: Some(lead.assigned_to_id),
            created_by_id: lead.created_by_id,
            is_active: true,
            last_contact: None,
            created_at: now,
            updated_at: now,
        };
        self.tables().leads.push(created.clone());
        Ok(created)
    }

    async fn update(&self, scope: &Scope, lead_id: Uuid, patch: &LeadPatch) -> Result<Option<Lead>, AppError> {
        let mut tables = self.tables();
        Ok(tables
            .leads
            .iter_mut()
            .find(|l| l.id == lead_id && l.is_active && scope.admits(l.company_id, l.assigned_to_id))
            .map(|lead| {
                apply_patch(lead, patch);
                lead.clone()
            }))
    }

    async fn deactivate(&self, scope: &Scope, lead_id: Uuid) -> Result<bool, AppError> {
        let mut tables = self.tables();
        match tables
            .leads
            .iter_mut()
            .find(|l| l.id == lead_id && l.is_active && scope.admits(l.company_id, l.assigned_to_id))
        {
            Some(lead) => {
                lead.is_active = false;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn link_tags(&self, lead_id: Uuid, tag_ids: &[Uuid]) -> Result<(), AppError> {
        self.check("leads.link_tags")?;
        let mut tables = self.tables();
        for tag_id in tag_ids {
            if !tables.lead_tags.contains(&(lead_id, *tag_id)) {
                tables.lead_tags.push((lead_id, *tag_id));
            }
        }
        Ok(())
    }

    async fn tags_for(&self, lead_id: Uuid) -> Result<Vec<Tag>, AppError> {
        let tables = self.tables();
        let mut tags: Vec<Tag> = tables
            .tags
            .iter()
            .filter(|t| tables.lead_tags.contains(&(lead_id, t.id)))
            .cloned()
            .collect();
        tags.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(tags)
    }
}

#[async_trait]
impl TagStore for MemoryDb {
    async fn list(&self, scope: &Scope) -> Result<Vec<Tag>, AppError> {
        let mut tags: Vec<Tag> = self
            .tables()
            .tags
            .iter()
            .filter(|t| scope.admits(t.company_id, None))
            .cloned()
            .collect();
        tags.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(tags)
    }

    async fn find_or_create(&self, scope: &Scope, name: &str) -> Result<Tag, AppError> {
        self.check("tags.find_or_create")?;
        let mut tables = self.tables();
        if let Some(existing) = tables
            .tags
            .iter()
            .find(|t| t.name == name && scope.admits(t.company_id, None))
        {
            return Ok(existing.clone());
        }
        let tag = Tag {
            id: Uuid::new_v4(),
            company_id: scope.company_id(),
            name: name.to_string(),
            color: "#3B82F6".to_string(),
            created_at: Utc::now(),
        };
        tables.tags.push(tag.clone());
        Ok(tag)
    }
}

#[async_trait]
impl EmailLogStore for MemoryDb {
    async fn insert(&self, log: NewEmailLog) -> Result<EmailLog, AppError> {
        self.check("email_logs.insert")?;
        let now = Utc::now();
        let created = EmailLog {
            id: Uuid::new_v4(),
            company_id: log.company_id,
            lead_id: log.lead_id,
            sent_by_id: log.sent_by_id,
            subject: log.subject,
            content: log.content,
            recipient_email: log.recipient_email,
            sender_email: log.sender_email,
            status: EmailStatus::Sent,
            tracking_id: log.tracking_id,
            opened_at: None,
            open_count: 0,
            sent_at: now,
            created_at: now,
        };
        self.tables().email_logs.push(created.clone());
        Ok(created)
    }

    async fn record_open(&self, tracking_id: &str, at: DateTime<Utc>) -> Result<Option<EmailLog>, AppError> {
        self.check("email_logs.record_open")?;
        let mut tables = self.tables();
        Ok(tables.email_logs.iter_mut().find(|e| e.tracking_id == tracking_id).map(|log| {
            log.open_count += 1;
            log.opened_at = log.opened_at.or(Some(at));
            log.status = EmailStatus::Opened;
            log.clone()
        }))
    }

    async fn list(
        &self,
        scope: &Scope,
        lead_id: Option<Uuid>,
        page: PageRequest,
    ) -> Result<(Vec<EmailLog>, i64), AppError> {
        let mut rows: Vec<EmailLog> = self
            .tables()
            .email_logs
            .iter()
            .filter(|e| scope.admits(e.company_id, Some(e.sent_by_id)))
            .filter(|e| lead_id.is_none() || e.lead_id == lead_id)
            .cloned()
            .collect();
        rows.sort_by(|a, b| b.sent_at.cmp(&a.sent_at));
        Ok(paginate(rows, page))
    }
}

#[async_trait]
impl ReminderStore for MemoryDb {
    async fn insert(&self, reminder: NewReminder) -> Result<Reminder, AppError> {
        let now = Utc::now();
        let created = Reminder {
            id: Uuid::new_v4(),
            company_id: reminder.company_id,
            lead_id: reminder.lead_id,
            user_id: reminder.user_id,
            title: reminder.title,
            description: reminder.description,
            due_date: reminder.due_date,
            status: ReminderStatus::Pending,
            created_at: now,
            updated_at: now,
        };
        self.tables().reminders.push(created.clone());
        Ok(created)
    }

    async fn list(
        &self,
        scope: &Scope,
        status: Option<ReminderStatus>,
        now: DateTime<Utc>,
        page: PageRequest,
    ) -> Result<(Vec<Reminder>, i64), AppError> {
        let mut rows: Vec<Reminder> = self
            .tables()
            .reminders
            .iter()
            .filter(|r| scope.admits(r.company_id, Some(r.user_id)))
            .filter(|r| reminder_matches(r, status, now))
            .cloned()
            .collect();
        rows.sort_by(|a, b| a.due_date.cmp(&b.due_date));
        Ok(paginate(rows, page))
    }

    async fn complete(&self, scope: &Scope, reminder_id: Uuid) -> Result<Option<Reminder>, AppError> {
        let mut tables = self.tables();
        Ok(tables
            .reminders
            .iter_mut()
            .find(|r| r.id == reminder_id && scope.admits(r.company_id, Some(r.user_id)))
            .map(|r| {
                r.status = ReminderStatus::Completed;
                r.updated_at = Utc::now();
                r.clone()
            }))
    }
}

#[async_trait]
impl FileStore for MemoryDb {
    async fn insert(&self, file: NewFileRecord) -> Result<FileRecord, AppError> {
        self.check("files.insert")?;
        let created = FileRecord {
            id: Uuid::new_v4(),
            company_id: file.company_id,
            lead_id: file.lead_id,
            uploaded_by_id: file.uploaded_by_id,
            filename: file.filename,
            original_filename: file.original_filename,
            mime_type: file.mime_type,
            file_size: file.file_size,
            storage_key: file.storage_key,
            public_url: file.public_url,
            is_public: file.is_public,
            created_at: Utc::now(),
        };
        self.tables().files.push(created.clone());
        Ok(created)
    }

    async fn find(&self, scope: &Scope, file_id: Uuid) -> Result<Option<FileRecord>, AppError> {
        Ok(self
            .tables()
            .files
            .iter()
            .find(|f| f.id == file_id && scope.admits(f.company_id, Some(f.uploaded_by_id)))
            .cloned())
    }

    async fn list(
        &self,
        scope: &Scope,
        lead_id: Option<Uuid>,
        page: PageRequest,
    ) -> Result<(Vec<FileRecord>, i64), AppError> {
        let mut rows: Vec<FileRecord> = self
            .tables()
            .files
            .iter()
            .filter(|f| scope.admits(f.company_id, Some(f.uploaded_by_id)))
            .filter(|f| lead_id.is_none() || f.lead_id == lead_id)
            .cloned()
            .collect();
        rows.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(paginate(rows, page))
    }

    async fn delete(&self, scope: &Scope, file_id: Uuid) -> Result<bool, AppError> {
        let mut tables = self.tables();
        let before = tables.files.len();
        tables
            .files
            .retain(|f| !(f.id == file_id && scope.admits(f.company_id, Some(f.uploaded_by_id))));
        Ok(tables.files.len() < before)
    }
}

#[async_trait]
impl DashboardStore for MemoryDb {
    async fn count_leads(&self, scope: &Scope, which: LeadCount) -> Result<i64, AppError> {
        self.check("dashboard.count_leads")?;
        let count = self
            .visible_leads(scope)
            .iter()
            .filter(|l| match which {
                LeadCount::All => true,
                LeadCount::CreatedSince(since) => l.created_at >= since,
                LeadCount::WithStatus(status) => l.status == status,
            })
            .count();
        Ok(count as i64)
    }

    async fn count_pending_reminders(&self, scope: &Scope) -> Result<i64, AppError> {
        self.check("dashboard.count_pending_reminders")?;
        let count = self
            .tables()
            .reminders
            .iter()
            .filter(|r| r.status == ReminderStatus::Pending && scope.admits(r.company_id, Some(r.user_id)))
            .count();
        Ok(count as i64)
    }

    async fn count_emails(&self, scope: &Scope, opened_only: bool) -> Result<i64, AppError> {
        self.check("dashboard.count_emails")?;
        let count = self
            .tables()
            .email_logs
            .iter()
            .filter(|e| scope.admits(e.company_id, Some(e.sent_by_id)))
            .filter(|e| !opened_only || e.open_count > 0)
            .count();
        Ok(count as i64)
    }
}

// ---
// Provedor de e-mail
// ---

#[derive(Default)]
pub struct FakeMail {
    sent: Mutex<Vec<OutboundEmail>>,
    rejection: Option<String>,
}

impl FakeMail {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn rejecting(message: &str) -> Arc<Self> {
        Arc::new(Self {
            sent: Mutex::default(),
            rejection: Some(message.to_string()),
        })
    }

    pub fn sent(&self) -> Vec<OutboundEmail> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl MailProvider for FakeMail {
    async fn send(&self, email: &OutboundEmail) -> Result<String, MailError> {
        if let Some(message) = &self.rejection {
            return Err(MailError::Rejected(message.clone()));
        }
        let mut sent = self.sent.lock().unwrap();
        sent.push(email.clone());
        Ok(format!("msg_{}", sent.len()))
    }
}

// ---
// Object storage
// ---

#[derive(Default)]
pub struct FakeStorage {
    objects: Mutex<HashMap<String, PutObject>>,
    deleted: Mutex<Vec<String>>,
    failing: Mutex<HashSet<&'static str>>,
}

impl FakeStorage {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Operações: "put", "delete", "sign_url"
    pub fn fail_on(&self, op: &'static str) {
        self.failing.lock().unwrap().insert(op);
    }

    fn check(&self, op: &'static str) -> Result<(), AppError> {
        if self.failing.lock().unwrap().contains(op) {
            return Err(AppError::ObjectStorage(format!("{} indisponível", op)));
        }
        Ok(())
    }

    pub fn object(&self, key: &str) -> Option<PutObject> {
        self.objects.lock().unwrap().get(key).cloned()
    }

    pub fn object_count(&self) -> usize {
        self.objects.lock().unwrap().len()
    }

    pub fn deleted(&self) -> Vec<String> {
        self.deleted.lock().unwrap().clone()
    }
}

#[async_trait]
impl ObjectStorage for FakeStorage {
    async fn put(&self, object: PutObject) -> Result<(), AppError> {
        self.check("put")?;
        self.objects.lock().unwrap().insert(object.key.clone(), object);
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<(), AppError> {
        self.check("delete")?;
        self.objects.lock().unwrap().remove(key);
        self.deleted.lock().unwrap().push(key.to_string());
        Ok(())
    }

    async fn sign_url(&self, key: &str, expires_in: StdDuration) -> Result<String, AppError> {
        self.check("sign_url")?;
        Ok(format!("https://signed.example.com/{}?X-Amz-Expires={}", key, expires_in.as_secs()))
    }

    fn public_url(&self, key: &str) -> String {
        format!("https://files.example.com/{}", key)
    }
}
