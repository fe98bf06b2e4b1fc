pub mod mail;
pub use mail::{MailError, MailProvider, OutboundEmail, ResendClient};
pub mod storage;
pub use storage::{ObjectStorage, PutObject, S3Storage, StorageSettings};
