// src/config.rs

use std::{env, str::FromStr, sync::Arc, time::Duration};

use anyhow::Context;
use sqlx::{postgres::PgPoolOptions, PgPool};

use crate::{
    db::{
        CompanyRepository, CompanyStore, DashboardRepository, DashboardStore, EmailLogStore, EmailRepository,
        FileRepository, FileStore, LeadRepository, LeadStore, ProfileStore, ReminderRepository, ReminderStore,
        TagRepository, TagStore, UserRepository,
    },
    integrations::{MailProvider, ObjectStorage, ResendClient, S3Storage, StorageSettings},
    services::{
        auth::AuthService, company_service::CompanyService, dashboard_service::DashboardService,
        email_service::EmailService, file_service::FileService, lead_service::LeadService,
        onboarding_service::OnboardingService, reminder_service::ReminderService,
    },
};

// Sessões emitidas pelo provedor de identidade
#[derive(Debug, Clone)]
pub struct SessionSettings {
    pub jwt_secret: String,
    pub audience: String,
    pub cookie_name: String,
    // Tokens que expiram dentro desta janela são renovados pelo auth_guard
    pub refresh_window_secs: i64,
    pub ttl_secs: i64,
}

#[derive(Debug, Clone)]
pub struct MailSettings {
    pub api_key: String,
    pub api_url: String,
    pub from: String,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub database_max_connections: u32,
    pub bind_addr: String,
    // URL pública da aplicação (usada no pixel de rastreamento)
    pub app_url: String,
    pub max_upload_bytes: usize,
    pub session: SessionSettings,
    pub mail: MailSettings,
    pub storage: StorageSettings,
}

fn required(name: &str) -> anyhow::Result<String> {
    env::var(name).with_context(|| format!("{} deve ser definida", name))
}

fn or_default<T: FromStr>(name: &str, default: T) -> anyhow::Result<T>
where
    T::Err: std::fmt::Display,
{
    match env::var(name) {
        Ok(raw) => raw
            .parse::<T>()
            .map_err(|e| anyhow::anyhow!("{} inválida ('{}'): {}", name, raw, e)),
        Err(_) => Ok(default),
    }
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        Ok(Self {
            database_url: required("DATABASE_URL")?,
            database_max_connections: or_default("DATABASE_MAX_CONNECTIONS", 5)?,
            bind_addr: or_default("BIND_ADDR", "0.0.0.0:3000".to_string())?,
            app_url: required("APP_URL")?.trim_end_matches('/').to_string(),
            max_upload_bytes: or_default("MAX_UPLOAD_BYTES", 25 * 1024 * 1024)?,
            session: SessionSettings {
                jwt_secret: required("SESSION_JWT_SECRET")?,
                audience: or_default("SESSION_JWT_AUDIENCE", "authenticated".to_string())?,
                cookie_name: or_default("SESSION_COOKIE_NAME", "sb-access-token".to_string())?,
                refresh_window_secs: or_default("SESSION_REFRESH_WINDOW_SECS", 900)?,
                ttl_secs: or_default("SESSION_TTL_SECS", 3600)?,
            },
            mail: MailSettings {
                api_key: required("RESEND_API_KEY")?,
                api_url: or_default("RESEND_API_URL", "https://api.resend.com".to_string())?,
                from: or_default("EMAIL_FROM", "CRM System <noreply@yourapp.com>".to_string())?,
            },
            storage: StorageSettings {
                endpoint: required("R2_ENDPOINT")?,
                access_key_id: required("R2_ACCESS_KEY_ID")?,
                secret_access_key: required("R2_SECRET_ACCESS_KEY")?,
                bucket: required("R2_BUCKET")?,
                public_url: required("R2_PUBLIC_URL")?,
            },
        })
    }
}

pub async fn connect_pool(config: &Config) -> anyhow::Result<PgPool> {
    let pool = PgPoolOptions::new()
        .max_connections(config.database_max_connections)
        .acquire_timeout(Duration::from_secs(3))
        .connect(&config.database_url)
        .await
        .context("Falha ao conectar ao banco de dados")?;

    tracing::info!("✅ Conexão com o banco de dados estabelecida com sucesso!");
    Ok(pool)
}

// Um handle por tabela (ou grupo de tabelas)
#[derive(Clone)]
pub struct Stores {
    pub profiles: Arc<dyn ProfileStore>,
    pub companies: Arc<dyn CompanyStore>,
    pub leads: Arc<dyn LeadStore>,
    pub tags: Arc<dyn TagStore>,
    pub email_logs: Arc<dyn EmailLogStore>,
    pub reminders: Arc<dyn ReminderStore>,
    pub files: Arc<dyn FileStore>,
    pub dashboard: Arc<dyn DashboardStore>,
}

impl Stores {
    pub fn postgres(pool: PgPool) -> Self {
        Self {
            profiles: Arc::new(UserRepository::new(pool.clone())),
            companies: Arc::new(CompanyRepository::new(pool.clone())),
            leads: Arc::new(LeadRepository::new(pool.clone())),
            tags: Arc::new(TagRepository::new(pool.clone())),
            email_logs: Arc::new(EmailRepository::new(pool.clone())),
            reminders: Arc::new(ReminderRepository::new(pool.clone())),
            files: Arc::new(FileRepository::new(pool.clone())),
            dashboard: Arc::new(DashboardRepository::new(pool)),
        }
    }
}

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub auth_service: AuthService,
    pub onboarding_service: OnboardingService,
    pub lead_service: LeadService,
    pub email_service: EmailService,
    pub file_service: FileService,
    pub reminder_service: ReminderService,
    pub dashboard_service: DashboardService,
    pub company_service: CompanyService,
}

impl AppState {
    pub async fn new(config: Config, pool: PgPool) -> Self {
        let mail = Arc::new(ResendClient::new(&config.mail.api_url, &config.mail.api_key));
        let storage = Arc::new(S3Storage::connect(&config.storage).await);
        Self::from_parts(config, Stores::postgres(pool), mail, storage)
    }

    // --- Monta o gráfico de dependências ---
    pub fn from_parts(
        config: Config,
        stores: Stores,
        mail: Arc<dyn MailProvider>,
        storage: Arc<dyn ObjectStorage>,
    ) -> Self {
        let auth_service = AuthService::new(stores.profiles.clone(), &config.session);
        let onboarding_service = OnboardingService::new(stores.profiles.clone(), stores.companies.clone());
        let lead_service = LeadService::new(stores.leads.clone(), stores.tags.clone(), stores.profiles.clone());
        let email_service = EmailService::new(
            mail,
            stores.email_logs.clone(),
            stores.leads.clone(),
            &config.app_url,
            &config.mail.from,
        );
        let file_service = FileService::new(stores.files.clone(), storage, stores.leads.clone());
        let reminder_service = ReminderService::new(stores.reminders.clone(), stores.leads.clone());
        let dashboard_service = DashboardService::new(stores.dashboard.clone());
        let company_service = CompanyService::new(stores.companies.clone());

        Self {
            config: Arc::new(config),
            auth_service,
            onboarding_service,
            lead_service,
            email_service,
            file_service,
            reminder_service,
            dashboard_service,
            company_service,
        }
    }
}
