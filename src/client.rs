// src/client.rs
//! Client for the brief generation backend. Every call is scoped by the
//! session id the client owns; the backend keys its storage by
//! (session, section) and overwrites, so every call can be reissued.

use serde_json::{Map, Value};
use tracing::{debug, info, warn};

use crate::brief_data::BriefData;
use crate::core::ServiceClient;
use crate::error::ApiError;
use crate::preferences::UserPreferences;
use crate::section::Section;
use crate::session::SessionId;
use crate::types::request::{
    ApprovalRequest, ConfigRequest, DataRequest, FeedbackRequest, GenerateRequest,
};
use crate::types::response::{ApprovalStatus, GeneratedSection, RevisedSection};

const CONFIG_ENDPOINT: &str = "/v1/config";
const DATA_ENDPOINT: &str = "/v1/data";
const GENERATE_ENDPOINT: &str = "/v1/generate";
const FEEDBACK_ENDPOINT: &str = "/v1/feedback";
const APPROVAL_ENDPOINT: &str = "/v1/approval";
const BRIEF_ENDPOINT: &str = "/v1/brief";

pub struct BriefClient {
    service: ServiceClient,
    session_id: SessionId,
}

impl BriefClient {
    /// Create a client with a fresh session
    pub fn new(service: ServiceClient) -> Self {
        Self::with_session(service, SessionId::new())
    }

    /// Resume an existing session, e.g. to fetch a brief finished earlier
    pub fn with_session(service: ServiceClient, session_id: SessionId) -> Self {
        Self {
            service,
            session_id,
        }
    }

    pub fn session_id(&self) -> SessionId {
        self.session_id
    }

    /// Start a logically new, empty session. The previous one is simply
    /// abandoned server-side.
    pub fn reset_session(&mut self) {
        let previous = self.session_id;
        self.session_id = SessionId::new();
        info!("Brief session reset: {} -> {}", previous, self.session_id);
    }

    pub async fn submit_preferences(&self, preferences: &UserPreferences) -> Result<(), ApiError> {
        info!(
            "Sending config for session {}: {} section(s), language {}, seniority {}",
            self.session_id,
            preferences.enabled_count(),
            preferences.language,
            preferences.seniority
        );

        let payload = ConfigRequest {
            session_id: self.session_id,
            preferences,
        };

        self.service
            .post_json_discard("submit preferences", CONFIG_ENDPOINT, &payload)
            .await
    }

    pub async fn update_section_data(
        &self,
        section: Section,
        data: &Map<String, Value>,
    ) -> Result<(), ApiError> {
        debug!("Updating data for section {} ({} field(s))", section.slug(), data.len());

        let payload = DataRequest {
            session_id: self.session_id,
            section_id: section,
            data,
        };

        self.service
            .post_json_discard("update section data", DATA_ENDPOINT, &payload)
            .await
    }

    pub async fn generate_section(
        &self,
        section: Section,
        preferences: &UserPreferences,
        brief_data: &BriefData,
    ) -> Result<GeneratedSection, ApiError> {
        info!("Requesting generation of section {}", section.slug());

        let payload = GenerateRequest {
            session_id: self.session_id,
            section_id: section,
            user_preferences: preferences,
            brief_data,
        };

        let generated: GeneratedSection = self
            .service
            .post_json("generate section", GENERATE_ENDPOINT, &payload)
            .await?;

        info!(
            "Section {} generated (confidence {:.2}, fallback needed: {})",
            section.slug(),
            generated.confidence,
            generated.fallback_needed
        );
        Ok(generated)
    }

    pub async fn submit_feedback(
        &self,
        section: Section,
        feedback: &str,
        previous_markdown: &str,
        preferences: &UserPreferences,
        brief_data: &BriefData,
    ) -> Result<RevisedSection, ApiError> {
        info!("Requesting revision of section {}", section.slug());

        let payload = FeedbackRequest {
            session_id: self.session_id,
            section_id: section,
            user_feedback: feedback,
            previous_markdown,
            user_preferences: preferences,
            brief_data,
        };

        self.service
            .post_json("submit feedback", FEEDBACK_ENDPOINT, &payload)
            .await
    }

    pub async fn record_approval(
        &self,
        section: Section,
        markdown: &str,
        status: ApprovalStatus,
    ) -> Result<(), ApiError> {
        info!("Recording {:?} for section {}", status, section.slug());

        let payload = ApprovalRequest {
            session_id: self.session_id,
            section_id: section,
            markdown,
            status,
        };

        self.service
            .post_json_discard("record approval", APPROVAL_ENDPOINT, &payload)
            .await
    }

    /// Assembled markdown of every approved section of the session
    pub async fn fetch_final_document(&self) -> Result<String, ApiError> {
        let endpoint = format!("{}/{}", BRIEF_ENDPOINT, self.session_id);
        self.service.get_text("fetch final document", &endpoint).await
    }

    /// Best-effort read of previously stored section data. Never fails:
    /// any error is logged and reported as "no prior data".
    pub async fn fetch_section_data(&self, section: Section) -> Option<Map<String, Value>> {
        let endpoint = format!("{}/{}/{}", DATA_ENDPOINT, self.session_id, section.slug());

        match self
            .service
            .get_json_optional::<Map<String, Value>>("fetch section data", &endpoint)
            .await
        {
            Ok(Some(data)) => Some(data),
            Ok(None) => {
                debug!("No stored data for section {}", section.slug());
                None
            }
            Err(e) => {
                warn!("Could not load stored data for section {}: {}", section.slug(), e);
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reset_session_replaces_token() {
        let service = ServiceClient::new("http://localhost:8000", 5).unwrap();
        let mut client = BriefClient::new(service);

        let first = client.session_id();
        client.reset_session();
        let second = client.session_id();
        client.reset_session();
        let third = client.session_id();

        assert_ne!(first, second);
        assert_ne!(second, third);
        assert_ne!(first, third);
    }

    #[test]
    fn test_with_session_keeps_token() {
        let service = ServiceClient::new("http://localhost:8000", 5).unwrap();
        let session = SessionId::new();
        let client = BriefClient::with_session(service, session);
        assert_eq!(client.session_id(), session);
    }
}
