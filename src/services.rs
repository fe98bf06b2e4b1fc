pub mod auth;
pub mod company_service;
pub mod dashboard_service;
pub mod email_service;
pub mod file_service;
pub mod lead_service;
pub mod onboarding_service;
pub mod reminder_service;
pub mod visibility;
