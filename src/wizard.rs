// src/wizard.rs
//! Client-held state machine of the brief creation flow:
//! configuration -> data entry -> generation -> preview.
//!
//! Forward transitions are explicit "complete this stage" actions, backward
//! transitions never discard anything already accumulated or sent to the
//! backend. Each action awaits at most one outstanding backend call, and
//! taking `&mut self` keeps a caller from issuing a second one concurrently.

use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::fmt;
use tracing::{debug, info};

use crate::brief_data::BriefData;
use crate::client::BriefClient;
use crate::error::WizardError;
use crate::preferences::UserPreferences;
use crate::section::Section;
use crate::types::response::{ApprovalStatus, ConfidenceLevel};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum WizardStage {
    Configuration,
    DataEntry,
    Generation,
    Preview,
}

impl WizardStage {
    pub fn previous(self) -> Option<Self> {
        match self {
            WizardStage::Configuration => None,
            WizardStage::DataEntry => Some(WizardStage::Configuration),
            WizardStage::Generation => Some(WizardStage::DataEntry),
            WizardStage::Preview => Some(WizardStage::Generation),
        }
    }
}

impl fmt::Display for WizardStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            WizardStage::Configuration => "configuration",
            WizardStage::DataEntry => "data-entry",
            WizardStage::Generation => "generation",
            WizardStage::Preview => "preview",
        };
        f.write_str(name)
    }
}

/// Latest backend output for one section
#[derive(Debug, Clone, PartialEq)]
pub struct SectionDraft {
    pub markdown: String,
    pub confidence: f64,
    pub fallback_needed: bool,
    pub approved: bool,
    pub revisions: u32,
}

impl SectionDraft {
    pub fn confidence_level(&self) -> ConfidenceLevel {
        ConfidenceLevel::from_score(self.confidence)
    }
}

#[derive(Debug, Clone)]
pub struct BriefWizard {
    stage: WizardStage,
    preferences: UserPreferences,
    brief_data: BriefData,
    drafts: BTreeMap<Section, SectionDraft>,
    /// Preferences last accepted by the backend
    submitted: Option<UserPreferences>,
}

impl Default for BriefWizard {
    fn default() -> Self {
        Self::new(UserPreferences::default())
    }
}

impl BriefWizard {
    pub fn new(preferences: UserPreferences) -> Self {
        Self {
            stage: WizardStage::Configuration,
            preferences,
            brief_data: BriefData::new(),
            drafts: BTreeMap::new(),
            submitted: None,
        }
    }

    pub fn stage(&self) -> WizardStage {
        self.stage
    }

    pub fn preferences(&self) -> &UserPreferences {
        &self.preferences
    }

    pub fn brief_data(&self) -> &BriefData {
        &self.brief_data
    }

    pub fn draft(&self, section: Section) -> Option<&SectionDraft> {
        self.drafts.get(&section)
    }

    /// Replace the configuration. Only allowed before it is submitted, or
    /// after navigating back to the configuration stage to resubmit it.
    pub fn set_preferences(&mut self, preferences: UserPreferences) -> Result<(), WizardError> {
        self.require_stage("change preferences", &[WizardStage::Configuration])?;
        self.preferences = preferences;
        Ok(())
    }

    // ===== Forward transitions =====

    /// configuration -> data-entry. The preferences are persisted first; on
    /// failure the wizard stays where it is and the error is returned.
    /// Resubmitting different preferences withdraws every approval.
    pub async fn complete_configuration(&mut self, client: &BriefClient) -> Result<(), WizardError> {
        self.require_stage("complete configuration", &[WizardStage::Configuration])?;

        if self.preferences.enabled_count() == 0 {
            return Err(WizardError::NoSectionsEnabled);
        }

        client.submit_preferences(&self.preferences).await?;

        if self.submitted.as_ref() != Some(&self.preferences) {
            let withdrawn = self.withdraw_approvals(|_| true);
            if withdrawn > 0 {
                info!("Preferences changed, {} approval(s) withdrawn", withdrawn);
            }
            self.submitted = Some(self.preferences.clone());
        }

        self.enter(WizardStage::DataEntry);
        Ok(())
    }

    /// data-entry -> generation, local only
    pub fn complete_data_entry(&mut self) -> Result<(), WizardError> {
        self.require_stage("complete data entry", &[WizardStage::DataEntry])?;
        self.enter(WizardStage::Generation);
        Ok(())
    }

    /// generation -> preview, local only. Every enabled section must have
    /// been approved, since the backend refuses to assemble the document
    /// otherwise.
    pub fn complete_generation(&mut self) -> Result<(), WizardError> {
        self.require_stage("complete generation", &[WizardStage::Generation])?;

        let pending = self.pending_sections();
        if !pending.is_empty() {
            return Err(WizardError::UnapprovedSections(pending));
        }

        self.enter(WizardStage::Preview);
        Ok(())
    }

    /// One step backward. Nothing accumulated so far is discarded.
    pub fn back(&mut self) -> Result<WizardStage, WizardError> {
        let previous = self.stage.previous().ok_or(WizardError::WrongStage {
            action: "go back",
            current: self.stage,
        })?;
        self.enter(previous);
        Ok(previous)
    }

    /// Abandon the current brief: new session, default preferences, empty
    /// data, back to configuration.
    pub fn start_new_brief(&mut self, client: &mut BriefClient) {
        client.reset_session();
        *self = Self::default();
        info!("Started a new brief in session {}", client.session_id());
    }

    // ===== Stage actions =====

    /// Merge answers for `section`, check its required fields, keep the
    /// result locally then push it to the backend. Rejected answers leave
    /// the stored data untouched. Once accepted, the local merge is kept even
    /// when the push fails, so the caller can simply retry.
    pub async fn enter_section_data(
        &mut self,
        client: &BriefClient,
        section: Section,
        data: Map<String, Value>,
    ) -> Result<(), WizardError> {
        self.require_stage(
            "enter section data",
            &[WizardStage::DataEntry, WizardStage::Generation],
        )?;
        self.require_enabled(section)?;

        let previous = self.brief_data.section(section);
        let mut merged = previous.cloned().unwrap_or_default();
        merged.extend(data);
        section.validate_data(&merged)?;

        if previous != Some(&merged) && self.withdraw_approvals(|s| s == section) > 0 {
            info!("Data for {} changed, approval withdrawn", section);
        }

        self.brief_data.merge_section(section, merged.clone());
        client.update_section_data(section, &merged).await?;
        Ok(())
    }

    /// Generate (or regenerate) one section. A second call overwrites the
    /// previous draft, including its approval.
    pub async fn generate(
        &mut self,
        client: &BriefClient,
        section: Section,
    ) -> Result<&SectionDraft, WizardError> {
        self.require_stage("generate a section", &[WizardStage::Generation])?;
        self.require_enabled(section)?;

        if let Some(data) = self.brief_data.section(section) {
            client.update_section_data(section, data).await?;
        }

        let generated = client
            .generate_section(section, &self.preferences, &self.brief_data)
            .await?;

        let draft = SectionDraft {
            markdown: generated.markdown,
            confidence: generated.confidence,
            fallback_needed: generated.fallback_needed,
            approved: false,
            revisions: 0,
        };
        self.drafts.insert(section, draft);
        Ok(&self.drafts[&section])
    }

    /// Ask the backend to rework a generated section according to `feedback`.
    /// The revised text replaces the draft and has to be approved again.
    pub async fn revise(
        &mut self,
        client: &BriefClient,
        section: Section,
        feedback: &str,
    ) -> Result<&SectionDraft, WizardError> {
        self.require_stage("revise a section", &[WizardStage::Generation])?;

        let feedback = feedback.trim();
        if feedback.is_empty() {
            return Err(WizardError::EmptyFeedback);
        }

        let previous = self
            .drafts
            .get(&section)
            .ok_or(WizardError::NotGenerated(section))?;

        let revised = client
            .submit_feedback(
                section,
                feedback,
                &previous.markdown,
                &self.preferences,
                &self.brief_data,
            )
            .await?;

        let draft = self
            .drafts
            .get_mut(&section)
            .ok_or(WizardError::NotGenerated(section))?;
        draft.markdown = revised.markdown;
        draft.confidence = revised.confidence;
        draft.fallback_needed = false;
        draft.approved = false;
        draft.revisions += 1;
        debug!("Section {} revised {} time(s)", section.slug(), draft.revisions);

        Ok(&*draft)
    }

    /// Commit the current draft of `section` as final text
    pub async fn approve(&mut self, client: &BriefClient, section: Section) -> Result<(), WizardError> {
        self.require_stage("approve a section", &[WizardStage::Generation])?;

        let draft = self
            .drafts
            .get(&section)
            .ok_or(WizardError::NotGenerated(section))?;

        client
            .record_approval(section, &draft.markdown, ApprovalStatus::Approved)
            .await?;

        if let Some(draft) = self.drafts.get_mut(&section) {
            draft.approved = true;
        }
        Ok(())
    }

    /// Assembled document for the session
    pub async fn final_document(&self, client: &BriefClient) -> Result<String, WizardError> {
        self.require_stage("fetch the final brief", &[WizardStage::Preview])?;
        Ok(client.fetch_final_document().await?)
    }

    // ===== Progress =====

    /// Enabled sections without an approved draft, in contractual order
    pub fn pending_sections(&self) -> Vec<Section> {
        self.preferences
            .enabled_sections()
            .into_iter()
            .filter(|s| !self.drafts.get(s).is_some_and(|d| d.approved))
            .collect()
    }

    /// Share of enabled sections approved, in percent
    pub fn progress(&self) -> f64 {
        let enabled = self.preferences.enabled_count();
        if enabled == 0 {
            return 0.0;
        }
        let approved = enabled - self.pending_sections().len();
        approved as f64 / enabled as f64 * 100.0
    }

    /// Clear the approval of matching drafts, returning how many changed
    fn withdraw_approvals<F>(&mut self, matches: F) -> usize
    where
        F: Fn(Section) -> bool,
    {
        let mut withdrawn = 0;
        for (section, draft) in self.drafts.iter_mut() {
            if draft.approved && matches(*section) {
                draft.approved = false;
                withdrawn += 1;
            }
        }
        withdrawn
    }

    fn enter(&mut self, stage: WizardStage) {
        debug!("Wizard stage {} -> {}", self.stage, stage);
        self.stage = stage;
    }

    fn require_stage(&self, action: &'static str, allowed: &[WizardStage]) -> Result<(), WizardError> {
        if allowed.contains(&self.stage) {
            Ok(())
        } else {
            Err(WizardError::WrongStage {
                action,
                current: self.stage,
            })
        }
    }

    fn require_enabled(&self, section: Section) -> Result<(), WizardError> {
        if self.preferences.is_enabled(section) {
            Ok(())
        } else {
            Err(WizardError::SectionNotEnabled(section))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::ServiceClient;
    use crate::preferences::{Language, Seniority};

    fn offline_client() -> BriefClient {
        BriefClient::new(ServiceClient::new("http://127.0.0.1:9", 1).unwrap())
    }

    #[test]
    fn test_starts_in_configuration() {
        let wizard = BriefWizard::default();
        assert_eq!(wizard.stage(), WizardStage::Configuration);
        assert!(wizard.brief_data().is_empty());
        assert_eq!(wizard.progress(), 0.0);
    }

    #[test]
    fn test_cannot_go_back_from_configuration() {
        let mut wizard = BriefWizard::default();
        assert!(matches!(
            wizard.back(),
            Err(WizardError::WrongStage {
                current: WizardStage::Configuration,
                ..
            })
        ));
    }

    #[test]
    fn test_local_transitions_require_their_stage() {
        let mut wizard = BriefWizard::default();
        assert!(wizard.complete_data_entry().is_err());
        assert!(wizard.complete_generation().is_err());
        assert_eq!(wizard.stage(), WizardStage::Configuration);
    }

    #[tokio::test]
    async fn test_configuration_requires_an_enabled_section() {
        let client = offline_client();
        let mut wizard = BriefWizard::default();

        let err = wizard.complete_configuration(&client).await.unwrap_err();
        assert!(matches!(err, WizardError::NoSectionsEnabled));
        assert_eq!(wizard.stage(), WizardStage::Configuration);
    }

    #[tokio::test]
    async fn test_unreachable_backend_keeps_configuration_stage() {
        let client = offline_client();
        let prefs = UserPreferences::new(Language::Fr, Seniority::Senior)
            .with_sections([Section::Contexte]);
        let mut wizard = BriefWizard::new(prefs);

        let err = wizard.complete_configuration(&client).await.unwrap_err();
        assert!(matches!(err, WizardError::Api(_)));
        assert_eq!(wizard.stage(), WizardStage::Configuration);
    }

    #[test]
    fn test_pending_sections_follow_preferences() {
        let prefs = UserPreferences::default()
            .with_sections([Section::ProcessusRecrutement, Section::TitreJobFamily]);
        let wizard = BriefWizard::new(prefs);
        assert_eq!(
            wizard.pending_sections(),
            vec![Section::TitreJobFamily, Section::ProcessusRecrutement]
        );
    }

    #[test]
    fn test_start_new_brief_resets_everything() {
        let mut client = offline_client();
        let before = client.session_id();
        let prefs = UserPreferences::default().with_sections([Section::Contexte]);
        let mut wizard = BriefWizard::new(prefs);

        wizard.start_new_brief(&mut client);

        assert_ne!(client.session_id(), before);
        assert_eq!(wizard.stage(), WizardStage::Configuration);
        assert_eq!(wizard.preferences().enabled_count(), 0);
    }

    #[test]
    fn test_stage_order() {
        assert!(WizardStage::Configuration < WizardStage::DataEntry);
        assert_eq!(WizardStage::Preview.previous(), Some(WizardStage::Generation));
        assert_eq!(WizardStage::DataEntry.to_string(), "data-entry");
    }
}
