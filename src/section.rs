// src/section.rs
//! The 18 canonical job-brief sections, their label <-> slug mapping, and
//! the input fields collected for each of them.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use std::str::FromStr;

use crate::error::SectionError;

pub const SECTION_COUNT: usize = 18;

/// One section of a job brief. Declaration order is the contractual order
/// used by the backend's boolean `sections` array.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Section {
    #[serde(rename = "titre_job_family")]
    TitreJobFamily,
    #[serde(rename = "contexte")]
    Contexte,
    #[serde(rename = "finalite_mission")]
    FinaliteMission,
    #[serde(rename = "objectifs_kpis")]
    ObjectifsKpis,
    #[serde(rename = "responsabilites_cles")]
    ResponsabilitesCles,
    #[serde(rename = "perimetre_budgetaire")]
    PerimetreBudgetaire,
    #[serde(rename = "environnement_contraintes")]
    EnvironnementContraintes,
    #[serde(rename = "competences_exigences")]
    CompetencesExigences,
    #[serde(rename = "qualifications_experiences")]
    QualificationsExperiences,
    #[serde(rename = "employee_value_proposition")]
    EmployeeValueProposition,
    #[serde(rename = "perspectives_evolution")]
    PerspectivesEvolution,
    #[serde(rename = "remuneration_avantages")]
    RemunerationAvantages,
    #[serde(rename = "cadre_contractuel")]
    CadreContractuel,
    #[serde(rename = "performance_cadence")]
    PerformanceCadence,
    #[serde(rename = "parties_prenantes_raci")]
    PartiesPrenantesRaci,
    #[serde(rename = "inclusion_conformite")]
    InclusionConformite,
    #[serde(rename = "onboarding_developpement")]
    OnboardingDeveloppement,
    #[serde(rename = "processus_recrutement")]
    ProcessusRecrutement,
}

impl Section {
    pub const ALL: [Section; SECTION_COUNT] = [
        Section::TitreJobFamily,
        Section::Contexte,
        Section::FinaliteMission,
        Section::ObjectifsKpis,
        Section::ResponsabilitesCles,
        Section::PerimetreBudgetaire,
        Section::EnvironnementContraintes,
        Section::CompetencesExigences,
        Section::QualificationsExperiences,
        Section::EmployeeValueProposition,
        Section::PerspectivesEvolution,
        Section::RemunerationAvantages,
        Section::CadreContractuel,
        Section::PerformanceCadence,
        Section::PartiesPrenantesRaci,
        Section::InclusionConformite,
        Section::OnboardingDeveloppement,
        Section::ProcessusRecrutement,
    ];

    /// Position in the contractual order (0..18)
    pub fn index(self) -> usize {
        self as usize
    }

    pub fn from_index(index: usize) -> Result<Self, SectionError> {
        Self::ALL
            .get(index)
            .copied()
            .ok_or(SectionError::IndexOutOfRange(index))
    }

    /// Backend identifier
    pub fn slug(self) -> &'static str {
        match self {
            Section::TitreJobFamily => "titre_job_family",
            Section::Contexte => "contexte",
            Section::FinaliteMission => "finalite_mission",
            Section::ObjectifsKpis => "objectifs_kpis",
            Section::ResponsabilitesCles => "responsabilites_cles",
            Section::PerimetreBudgetaire => "perimetre_budgetaire",
            Section::EnvironnementContraintes => "environnement_contraintes",
            Section::CompetencesExigences => "competences_exigences",
            Section::QualificationsExperiences => "qualifications_experiences",
            Section::EmployeeValueProposition => "employee_value_proposition",
            Section::PerspectivesEvolution => "perspectives_evolution",
            Section::RemunerationAvantages => "remuneration_avantages",
            Section::CadreContractuel => "cadre_contractuel",
            Section::PerformanceCadence => "performance_cadence",
            Section::PartiesPrenantesRaci => "parties_prenantes_raci",
            Section::InclusionConformite => "inclusion_conformite",
            Section::OnboardingDeveloppement => "onboarding_developpement",
            Section::ProcessusRecrutement => "processus_recrutement",
        }
    }

    /// Human-readable label shown to recruiters
    pub fn label(self) -> &'static str {
        match self {
            Section::TitreJobFamily => "Titre & Job Family",
            Section::Contexte => "Contexte & Business Case",
            Section::FinaliteMission => "Finalité/Mission",
            Section::ObjectifsKpis => "Objectifs & KPIs",
            Section::ResponsabilitesCles => "Responsabilités clés",
            Section::PerimetreBudgetaire => "Périmètre budgétaire & managérial",
            Section::EnvironnementContraintes => "Environnement & contraintes",
            Section::CompetencesExigences => "Compétences & exigences",
            Section::QualificationsExperiences => "Qualifications & expériences",
            Section::EmployeeValueProposition => "Employee Value Proposition",
            Section::PerspectivesEvolution => "Perspectives d’évolution",
            Section::RemunerationAvantages => "Rémunération & avantages",
            Section::CadreContractuel => "Cadre contractuel",
            Section::PerformanceCadence => "Mesure de la performance & cadence",
            Section::PartiesPrenantesRaci => "Parties prenantes & RACI",
            Section::InclusionConformite => "Inclusion, conformité & sécurité",
            Section::OnboardingDeveloppement => "Onboarding & développement",
            Section::ProcessusRecrutement => "Processus de recrutement",
        }
    }

    pub fn from_slug(slug: &str) -> Result<Self, SectionError> {
        Self::ALL
            .into_iter()
            .find(|s| s.slug() == slug)
            .ok_or_else(|| SectionError::Unknown(slug.to_string()))
    }

    pub fn from_label(label: &str) -> Result<Self, SectionError> {
        // Forms have historically typed the apostrophe both ways
        let normalized = label.trim().replace('\'', "’");
        Self::ALL
            .into_iter()
            .find(|s| s.label() == normalized)
            .ok_or_else(|| SectionError::Unknown(label.to_string()))
    }

    /// Input fields collected for this section
    pub fn fields(self) -> &'static [FieldSpec] {
        match self {
            Section::TitreJobFamily => TITRE_FIELDS,
            Section::Contexte => CONTEXTE_FIELDS,
            Section::FinaliteMission => MISSION_FIELDS,
            Section::ObjectifsKpis => OBJECTIFS_FIELDS,
            Section::ResponsabilitesCles => RESPONSABILITES_FIELDS,
            Section::CompetencesExigences => COMPETENCES_FIELDS,
            _ => DEFAULT_FIELDS,
        }
    }

    /// Check that every required field of this section has a non-blank value
    pub fn validate_data(self, data: &Map<String, Value>) -> Result<(), SectionError> {
        for field in self.fields().iter().filter(|f| f.required) {
            let present = match data.get(field.name) {
                None | Some(Value::Null) => false,
                Some(Value::String(s)) => !s.trim().is_empty(),
                Some(Value::Array(items)) => !items.is_empty(),
                Some(_) => true,
            };
            if !present {
                return Err(SectionError::MissingField {
                    section: self,
                    field: field.name,
                });
            }
        }
        Ok(())
    }
}

impl fmt::Display for Section {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Section {
    type Err = SectionError;

    /// Accepts either the slug or the label
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_slug(s.trim()).or_else(|_| Self::from_label(s))
    }
}

// ===== Field schemas =====

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Text,
    Textarea,
    Select(&'static [&'static str]),
}

#[derive(Debug, Clone, Copy)]
pub struct FieldSpec {
    pub name: &'static str,
    pub label: &'static str,
    pub kind: FieldKind,
    pub required: bool,
}

const fn field(name: &'static str, label: &'static str, kind: FieldKind, required: bool) -> FieldSpec {
    FieldSpec {
        name,
        label,
        kind,
        required,
    }
}

const TITRE_FIELDS: &[FieldSpec] = &[
    field("job_title", "Titre du poste", FieldKind::Text, true),
    field(
        "job_family",
        "Famille de métier",
        FieldKind::Select(&["Tech", "Sales", "Marketing", "Finance", "Operations", "HR"]),
        true,
    ),
    field("department", "Département", FieldKind::Text, false),
    field("reporting_to", "Rattachement hiérarchique", FieldKind::Text, false),
];

const CONTEXTE_FIELDS: &[FieldSpec] = &[
    field("business_context", "Contexte business", FieldKind::Textarea, true),
    field(
        "strategic_importance",
        "Importance stratégique",
        FieldKind::Select(&["Critique", "Importante", "Normale"]),
        false,
    ),
    field(
        "urgency",
        "Urgence du recrutement",
        FieldKind::Select(&["Immédiate", "Normale", "Flexible"]),
        false,
    ),
];

const MISSION_FIELDS: &[FieldSpec] = &[
    field("main_purpose", "Finalité principale", FieldKind::Textarea, true),
    field("key_contribution", "Contribution clé", FieldKind::Textarea, false),
];

const OBJECTIFS_FIELDS: &[FieldSpec] = &[
    field("objectives", "Objectifs principaux", FieldKind::Textarea, true),
    field("success_metrics", "Indicateurs de succès", FieldKind::Textarea, false),
    field(
        "performance_timeline",
        "Délai d'évaluation",
        FieldKind::Select(&["3 mois", "6 mois", "12 mois"]),
        false,
    ),
];

const RESPONSABILITES_FIELDS: &[FieldSpec] = &[
    field("daily_tasks", "Tâches quotidiennes", FieldKind::Textarea, true),
    field("weekly_tasks", "Tâches hebdomadaires", FieldKind::Textarea, false),
    field("special_projects", "Projets spéciaux", FieldKind::Textarea, false),
];

const COMPETENCES_FIELDS: &[FieldSpec] = &[
    field("hard_skills", "Compétences techniques", FieldKind::Textarea, true),
    field("soft_skills", "Compétences comportementales", FieldKind::Textarea, true),
    field("languages", "Langues requises", FieldKind::Text, false),
];

const DEFAULT_FIELDS: &[FieldSpec] = &[field("content", "Contenu", FieldKind::Textarea, true)];

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_label_slug_mapping_is_bijective() {
        for section in Section::ALL {
            assert_eq!(Section::from_slug(section.slug()), Ok(section));
            assert_eq!(Section::from_label(section.label()), Ok(section));
        }
        let slugs: std::collections::HashSet<_> = Section::ALL.iter().map(|s| s.slug()).collect();
        assert_eq!(slugs.len(), SECTION_COUNT);
    }

    #[test]
    fn test_index_matches_contractual_order() {
        assert_eq!(Section::TitreJobFamily.index(), 0);
        assert_eq!(Section::ProcessusRecrutement.index(), 17);
        assert_eq!(Section::from_index(3), Ok(Section::ObjectifsKpis));
        assert_eq!(Section::from_index(18), Err(SectionError::IndexOutOfRange(18)));
    }

    #[test]
    fn test_from_str_accepts_slug_label_and_ascii_apostrophe() {
        assert_eq!("contexte".parse::<Section>(), Ok(Section::Contexte));
        assert_eq!(
            "Titre & Job Family".parse::<Section>(),
            Ok(Section::TitreJobFamily)
        );
        assert_eq!(
            "Perspectives d'évolution".parse::<Section>(),
            Ok(Section::PerspectivesEvolution)
        );
        assert!("Profil".parse::<Section>().is_err());
    }

    #[test]
    fn test_serializes_as_slug() {
        let value = serde_json::to_value(Section::FinaliteMission).unwrap();
        assert_eq!(value, json!("finalite_mission"));
        let back: Section = serde_json::from_value(json!("cadre_contractuel")).unwrap();
        assert_eq!(back, Section::CadreContractuel);
        assert!(serde_json::from_value::<Section>(json!("Cadre contractuel")).is_err());
    }

    #[test]
    fn test_validate_data_reports_missing_required_field() {
        let data = json!({ "job_title": "Développeur Rust", "job_family": "  " });
        let err = Section::TitreJobFamily
            .validate_data(data.as_object().unwrap())
            .unwrap_err();
        assert_eq!(
            err,
            SectionError::MissingField {
                section: Section::TitreJobFamily,
                field: "job_family"
            }
        );

        let ok = json!({ "job_title": "Développeur Rust", "job_family": "Tech" });
        assert!(Section::TitreJobFamily
            .validate_data(ok.as_object().unwrap())
            .is_ok());
    }

    #[test]
    fn test_sections_without_schema_require_content() {
        assert_eq!(Section::CadreContractuel.fields().len(), 1);
        let empty = Map::new();
        assert!(Section::CadreContractuel.validate_data(&empty).is_err());
        let data = json!({ "content": "CDI, 39h" });
        assert!(Section::CadreContractuel
            .validate_data(data.as_object().unwrap())
            .is_ok());
    }
}
