pub mod auth;
pub mod company;
pub mod dashboard;
pub mod email;
pub mod file;
pub mod lead;
pub mod reminder;
