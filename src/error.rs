// src/error.rs
//! Typed errors at the library boundary. Application code wraps these in
//! `anyhow` the same way it wraps every other failure.

use reqwest::StatusCode;
use thiserror::Error;

use crate::section::Section;
use crate::wizard::WizardStage;

/// Failure of a call against one of the backends (brief or hunter).
#[derive(Error, Debug)]
pub enum ApiError {
    /// The backend answered with a non-success status.
    #[error("{operation} failed with status {status}: {body}")]
    Status {
        operation: &'static str,
        status: StatusCode,
        body: String,
    },

    /// The request never produced a response (DNS, connect, timeout...).
    #[error("{operation} request failed: {source}")]
    Transport {
        operation: &'static str,
        #[source]
        source: reqwest::Error,
    },

    /// The response arrived but its body did not match the expected shape.
    #[error("{operation} returned an unreadable body: {source}")]
    Decode {
        operation: &'static str,
        #[source]
        source: reqwest::Error,
    },
}

impl ApiError {
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            ApiError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    pub fn operation(&self) -> &'static str {
        match self {
            ApiError::Status { operation, .. }
            | ApiError::Transport { operation, .. }
            | ApiError::Decode { operation, .. } => operation,
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SectionError {
    #[error("Unknown section: {0}")]
    Unknown(String),

    #[error("Section index out of range: {0}")]
    IndexOutOfRange(usize),

    #[error("Field \"{field}\" is required for section \"{section}\"")]
    MissingField { section: Section, field: &'static str },
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PreferencesError {
    #[error("Unsupported language: {0}. Use fr or en")]
    UnknownLanguage(String),

    #[error("Unsupported seniority: {0}. Use Stagiaire, Junior, Senior or C-level")]
    UnknownSeniority(String),
}

#[derive(Error, Debug)]
pub enum WizardError {
    #[error("Cannot {action} while in the {current} stage")]
    WrongStage {
        action: &'static str,
        current: WizardStage,
    },

    #[error("At least one section must be enabled")]
    NoSectionsEnabled,

    #[error("Section \"{0}\" is not enabled for this brief")]
    SectionNotEnabled(Section),

    #[error("Section \"{0}\" has not been generated yet")]
    NotGenerated(Section),

    #[error("Feedback text is empty")]
    EmptyFeedback,

    #[error("Sections still waiting for approval: {}", .0.iter().map(|s| s.label()).collect::<Vec<_>>().join(", "))]
    UnapprovedSections(Vec<Section>),

    #[error(transparent)]
    InvalidData(#[from] SectionError),

    #[error(transparent)]
    Api(#[from] ApiError),
}
