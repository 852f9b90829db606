//! Infrastructure layer for Tarot-AI.
//!
//! File locations, configuration loading, secrets and the resume stores that
//! keep a reading alive across the checkout redirect.

pub mod config_service;
pub mod file_resume_store;
pub mod memory_resume_store;
pub mod paths;
pub mod secret_service;
pub mod storage;

pub use config_service::{ConfigService, EnvLookup, process_env};
pub use file_resume_store::FileResumeStore;
pub use memory_resume_store::MemoryResumeStore;
pub use paths::TarotPaths;
pub use secret_service::SecretServiceImpl;
