pub mod credential_repo;

pub use credential_repo::{CredentialRepository, KEY_TOKEN, KEY_USERNAME};
