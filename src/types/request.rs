// src/types/request.rs
//! Request bodies sent to the brief backend. They borrow from the wizard
//! state so a call never clones the accumulated brief data.

use serde::Serialize;
use serde_json::{Map, Value};

use crate::brief_data::BriefData;
use crate::preferences::UserPreferences;
use crate::section::Section;
use crate::session::SessionId;
use crate::types::response::ApprovalStatus;

#[derive(Debug, Serialize)]
pub struct ConfigRequest<'a> {
    pub session_id: SessionId,
    #[serde(flatten)]
    pub preferences: &'a UserPreferences,
}

#[derive(Debug, Serialize)]
pub struct DataRequest<'a> {
    pub session_id: SessionId,
    pub section_id: Section,
    pub data: &'a Map<String, Value>,
}

#[derive(Debug, Serialize)]
pub struct GenerateRequest<'a> {
    pub session_id: SessionId,
    pub section_id: Section,
    pub user_preferences: &'a UserPreferences,
    pub brief_data: &'a BriefData,
}

#[derive(Debug, Serialize)]
pub struct FeedbackRequest<'a> {
    pub session_id: SessionId,
    pub section_id: Section,
    pub user_feedback: &'a str,
    pub previous_markdown: &'a str,
    pub user_preferences: &'a UserPreferences,
    pub brief_data: &'a BriefData,
}

#[derive(Debug, Serialize)]
pub struct ApprovalRequest<'a> {
    pub session_id: SessionId,
    pub section_id: Section,
    pub markdown: &'a str,
    pub status: ApprovalStatus,
}

// ===== Hunter service =====

#[derive(Debug, Clone, Serialize)]
pub struct SearchRequest {
    pub user_id: String,
    pub brief_text: String,
    pub language: String,
    pub platforms: Vec<String>,
    pub max_candidates: u32,
}

impl SearchRequest {
    /// Search on the default sourcing platforms
    pub fn new(user_id: impl Into<String>, brief_text: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            brief_text: brief_text.into(),
            language: "fr".to_string(),
            platforms: vec![
                "linkedin".to_string(),
                "github".to_string(),
                "welcometothejungle".to_string(),
            ],
            max_candidates: 10,
        }
    }
}
