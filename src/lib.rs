//! Job brief wizard: configure, fill in, generate, revise and approve the
//! sections of a recruitment brief against the brief generation backend,
//! then fetch the assembled document.

pub mod auth;
pub mod brief_data;
pub mod cli;
pub mod client;
pub mod core;
pub mod error;
pub mod hunter;
pub mod preferences;
pub mod section;
pub mod session;
pub mod types;
pub mod wizard;

pub use brief_data::BriefData;
pub use client::BriefClient;
pub use error::{ApiError, PreferencesError, SectionError, WizardError};
pub use hunter::HunterClient;
pub use preferences::{Language, Seniority, UserPreferences};
pub use section::Section;
pub use session::SessionId;
pub use wizard::{BriefWizard, SectionDraft, WizardStage};
