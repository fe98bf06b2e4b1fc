// src/docs.rs

use utoipa::OpenApi;
use utoipa::openapi::security::{Http, HttpAuthScheme, SecurityScheme};
use crate::handlers;
use crate::models;

#[derive(OpenApi)]
#[openapi(
    paths(
        // --- Auth / Users ---
        handlers::auth::provision,
        handlers::auth::get_me,

        // --- Company ---
        handlers::company::get_company,
        handlers::company::update_settings,

        // --- Leads ---
        handlers::leads::list_leads,
        handlers::leads::create_lead,
        handlers::leads::get_lead,
        handlers::leads::update_lead,
        handlers::leads::delete_lead,
        handlers::leads::list_tags,

        // --- Email ---
        handlers::email::send_email,
        handlers::email::list_email_logs,
        handlers::email::track_open,

        // --- Reminders ---
        handlers::reminders::list_reminders,
        handlers::reminders::create_reminder,
        handlers::reminders::complete_reminder,

        // --- Files ---
        handlers::files::upload_file,
        handlers::files::list_files,
        handlers::files::delete_file,
        handlers::files::download_file,

        // --- Dashboard ---
        handlers::dashboard::get_stats,
    ),
    components(
        schemas(
            // --- Auth ---
            models::auth::Role,
            models::auth::UserProfile,
            models::company::Company,

            // --- Leads ---
            models::lead::LeadStatus,
            models::lead::Lead,
            models::lead::LeadDetail,
            models::lead::LeadPatch,
            models::lead::Tag,

            // --- Email ---
            models::email::EmailStatus,
            models::email::EmailLog,

            // --- Reminders ---
            models::reminder::ReminderStatus,
            models::reminder::Reminder,

            // --- Files ---
            models::file::FileRecord,
            models::file::DownloadLink,

            // --- Dashboard ---
            models::dashboard::DashboardStats,

            // --- Payloads ---
            handlers::leads::CreateLeadPayload,
            handlers::email::SendEmailPayload,
            handlers::reminders::CreateReminderPayload,
            handlers::files::UploadForm,
        )
    ),
    tags(
        (name = "Auth", description = "Onboarding a partir da sessão"),
        (name = "Users", description = "Dados do Usuário e Perfil"),
        (name = "Company", description = "Empresa e configurações"),
        (name = "Leads", description = "Leads e tags"),
        (name = "Email", description = "Envio e rastreamento de abertura"),
        (name = "Reminders", description = "Lembretes de follow-up"),
        (name = "Files", description = "Arquivos no object storage"),
        (name = "Dashboard", description = "Indicadores do CRM")
    ),
    modifiers(&SecurityAddon)
)]
pub struct ApiDoc;

struct SecurityAddon;

impl utoipa::Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "api_jwt",
            SecurityScheme::Http(
                Http::new(HttpAuthScheme::Bearer)
            ),
        );
    }
}
