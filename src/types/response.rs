// src/types/response.rs
use serde::{Deserialize, Serialize};
use std::fmt;

// ===== Brief Service Response Types =====

/// Draft produced by `/v1/generate`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeneratedSection {
    pub markdown: String,
    pub confidence: f64,
    #[serde(default)]
    pub fallback_needed: bool,
}

impl GeneratedSection {
    pub fn confidence_level(&self) -> ConfidenceLevel {
        ConfidenceLevel::from_score(self.confidence)
    }
}

/// Revision produced by `/v1/feedback`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RevisedSection {
    pub markdown: String,
    pub confidence: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ApprovalStatus {
    #[default]
    Approved,
    Rejected,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfidenceLevel {
    High,
    Medium,
    Low,
}

impl ConfidenceLevel {
    pub fn from_score(score: f64) -> Self {
        if score >= 0.8 {
            ConfidenceLevel::High
        } else if score >= 0.6 {
            ConfidenceLevel::Medium
        } else {
            ConfidenceLevel::Low
        }
    }
}

impl fmt::Display for ConfidenceLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            ConfidenceLevel::High => "high",
            ConfidenceLevel::Medium => "medium",
            ConfidenceLevel::Low => "low",
        };
        f.write_str(label)
    }
}

// ===== Hunter Service Response Types =====

#[derive(Debug, Deserialize)]
pub struct SearchStarted {
    pub search_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SearchStatus {
    pub status: String,
    #[serde(default)]
    pub is_terminal: bool,
}

impl SearchStatus {
    pub fn is_done(&self) -> bool {
        self.status == "done"
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct HunterResults {
    #[serde(default)]
    pub candidates: Vec<HunterCandidate>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HunterSkill {
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HunterCandidate {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub source: String,
    #[serde(default)]
    pub location: String,
    #[serde(default)]
    pub languages: Vec<String>,
    #[serde(default)]
    pub availability: String,
    #[serde(default)]
    pub skills: Vec<HunterSkill>,
    #[serde(default)]
    pub match_score: f64,
    #[serde(default)]
    pub profile_url: String,
    #[serde(default)]
    pub is_new: bool,
}
