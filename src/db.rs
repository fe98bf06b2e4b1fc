pub mod user_repo;
pub use user_repo::{ProfileStore, UserRepository};
pub mod company_repo;
pub use company_repo::{CompanyRepository, CompanyStore};
pub mod lead_repo;
pub use lead_repo::{LeadRepository, LeadStore};
pub mod tag_repo;
pub use tag_repo::{TagRepository, TagStore};
pub mod email_repo;
pub use email_repo::{EmailLogStore, EmailRepository};
pub mod reminder_repo;
pub use reminder_repo::{ReminderRepository, ReminderStore};
pub mod file_repo;
pub use file_repo::{FileRepository, FileStore};
pub mod dashboard_repo;
pub use dashboard_repo::{DashboardRepository, DashboardStore, LeadCount};
