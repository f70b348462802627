// src/preferences.rs
//! Configuration chosen at the first wizard stage: which sections the brief
//! contains, its language and the seniority of the position.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::PreferencesError;
use crate::section::{Section, SECTION_COUNT};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Language {
    #[default]
    #[serde(rename = "fr")]
    Fr,
    #[serde(rename = "en")]
    En,
}

impl Language {
    pub fn code(self) -> &'static str {
        match self {
            Language::Fr => "fr",
            Language::En => "en",
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for Language {
    type Err = PreferencesError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "fr" | "french" | "français" | "francais" => Ok(Language::Fr),
            "en" | "english" | "anglais" => Ok(Language::En),
            other => Err(PreferencesError::UnknownLanguage(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Seniority {
    #[serde(rename = "Stagiaire")]
    Stagiaire,
    #[serde(rename = "Junior")]
    Junior,
    #[default]
    #[serde(rename = "Senior")]
    Senior,
    #[serde(rename = "C-level")]
    CLevel,
}

impl Seniority {
    pub fn as_str(self) -> &'static str {
        match self {
            Seniority::Stagiaire => "Stagiaire",
            Seniority::Junior => "Junior",
            Seniority::Senior => "Senior",
            Seniority::CLevel => "C-level",
        }
    }
}

impl fmt::Display for Seniority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Seniority {
    type Err = PreferencesError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "stagiaire" | "intern" => Ok(Seniority::Stagiaire),
            "junior" => Ok(Seniority::Junior),
            "senior" => Ok(Seniority::Senior),
            "c-level" | "clevel" | "c_level" => Ok(Seniority::CLevel),
            other => Err(PreferencesError::UnknownSeniority(other.to_string())),
        }
    }
}

/// Serialised exactly as the backend's `/v1/config` body expects, minus the
/// session id: `{"sections": [bool; 18], "language": "fr", "seniority": "Senior"}`.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct UserPreferences {
    pub sections: [bool; SECTION_COUNT],
    pub language: Language,
    pub seniority: Seniority,
}

impl UserPreferences {
    pub fn new(language: Language, seniority: Seniority) -> Self {
        Self {
            sections: [false; SECTION_COUNT],
            language,
            seniority,
        }
    }

    pub fn with_sections<I>(mut self, sections: I) -> Self
    where
        I: IntoIterator<Item = Section>,
    {
        for section in sections {
            self.enable(section);
        }
        self
    }

    pub fn enable(&mut self, section: Section) {
        self.sections[section.index()] = true;
    }

    pub fn disable(&mut self, section: Section) {
        self.sections[section.index()] = false;
    }

    pub fn set_all(&mut self, enabled: bool) {
        self.sections = [enabled; SECTION_COUNT];
    }

    pub fn is_enabled(&self, section: Section) -> bool {
        self.sections[section.index()]
    }

    /// Enabled sections in contractual order
    pub fn enabled_sections(&self) -> Vec<Section> {
        Section::ALL
            .into_iter()
            .filter(|s| self.is_enabled(*s))
            .collect()
    }

    pub fn enabled_count(&self) -> usize {
        self.sections.iter().filter(|enabled| **enabled).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_wire_format() {
        let prefs = UserPreferences::new(Language::Fr, Seniority::CLevel)
            .with_sections([Section::TitreJobFamily, Section::ProcessusRecrutement]);

        let value = serde_json::to_value(&prefs).unwrap();
        assert_eq!(value["language"], json!("fr"));
        assert_eq!(value["seniority"], json!("C-level"));

        let sections = value["sections"].as_array().unwrap();
        assert_eq!(sections.len(), 18);
        assert_eq!(sections[0], json!(true));
        assert_eq!(sections[1], json!(false));
        assert_eq!(sections[17], json!(true));
    }

    #[test]
    fn test_rejects_wrong_section_count() {
        let body = json!({
            "sections": [true, false, true],
            "language": "en",
            "seniority": "Junior"
        });
        assert!(serde_json::from_value::<UserPreferences>(body).is_err());
    }

    #[test]
    fn test_enabled_sections_keep_contractual_order() {
        let mut prefs = UserPreferences::default();
        prefs.enable(Section::ProcessusRecrutement);
        prefs.enable(Section::Contexte);
        prefs.enable(Section::ObjectifsKpis);
        prefs.disable(Section::ObjectifsKpis);

        assert_eq!(
            prefs.enabled_sections(),
            vec![Section::Contexte, Section::ProcessusRecrutement]
        );
        assert_eq!(prefs.enabled_count(), 2);

        prefs.set_all(true);
        assert_eq!(prefs.enabled_count(), 18);
    }

    #[test]
    fn test_defaults_match_new_brief_form() {
        let prefs = UserPreferences::default();
        assert_eq!(prefs.language, Language::Fr);
        assert_eq!(prefs.seniority, Seniority::Senior);
        assert_eq!(prefs.enabled_count(), 0);
    }

    #[test]
    fn test_parse_language_and_seniority() {
        assert_eq!("Français".parse::<Language>(), Ok(Language::Fr));
        assert_eq!("EN".parse::<Language>(), Ok(Language::En));
        assert!("es".parse::<Language>().is_err());

        assert_eq!("c-level".parse::<Seniority>(), Ok(Seniority::CLevel));
        assert_eq!("Stagiaire".parse::<Seniority>(), Ok(Seniority::Stagiaire));
        assert!("Lead".parse::<Seniority>().is_err());
    }
}
