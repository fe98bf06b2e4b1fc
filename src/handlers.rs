pub mod auth;
pub mod company;
pub mod dashboard;
pub mod email;
pub mod files;
pub mod leads;
pub mod reminders;
