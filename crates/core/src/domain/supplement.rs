use crate::domain::request::{Gender, HealthGoal};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

pub const DEFAULT_DOSAGE: &str = "Seguir las indicaciones del fabricante";
pub const DEFAULT_TIMING: &str = "Según indicación de un profesional";
pub const DEFAULT_DESCRIPTION: &str = "Suplemento recomendado según tu perfil.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SupplementKind {
    Creatine,
    BetaAlanine,
    WheyProtein,
    PeaProtein,
    SoyProtein,
    Bcaa,
    VeganBcaa,
    FishOilOmega3,
    AlgaeOmega3,
    Collagen,
    PlantCollagen,
    VitaminD,
    VitaminK2,
    VitaminB12,
    VitaminC,
    VitaminE,
    Magnesium,
    Calcium,
    Iron,
    Zinc,
    Potassium,
    Electrolytes,
    Ashwagandha,
    Rhodiola,
    Melatonin,
    SoyIsoflavones,
    BlackCohosh,
    Probiotics,
    Chromium,
    Berberine,
    Caffeine,
    Biotin,
    HyaluronicAcid,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SupplementFamily {
    Protein,
    Bcaa,
    Omega3,
    Collagen,
}

impl SupplementKind {
    pub fn family(self) -> Option<SupplementFamily> {
        use SupplementKind::*;
        match self {
            WheyProtein | PeaProtein | SoyProtein => Some(SupplementFamily::Protein),
            Bcaa | VeganBcaa => Some(SupplementFamily::Bcaa),
            FishOilOmega3 | AlgaeOmega3 => Some(SupplementFamily::Omega3),
            Collagen | PlantCollagen => Some(SupplementFamily::Collagen),
            _ => None,
        }
    }

    pub fn is_bcaa(self) -> bool {
        self.family() == Some(SupplementFamily::Bcaa)
    }

    pub fn is_plant_protein(self) -> bool {
        matches!(self, SupplementKind::PeaProtein | SupplementKind::SoyProtein)
    }

    pub fn is_exercise_linked(self) -> bool {
        matches!(self, SupplementKind::Creatine | SupplementKind::BetaAlanine)
    }

    pub fn is_omega3(self) -> bool {
        self.family() == Some(SupplementFamily::Omega3)
    }

    /// Fat-soluble vitamins and omega-3 oils, which need a meal containing fat.
    pub fn is_fat_soluble(self) -> bool {
        use SupplementKind::*;
        matches!(self, VitaminD | VitaminE | VitaminK2 | FishOilOmega3 | AlgaeOmega3)
    }

    pub fn is_taken_with_meals(self) -> bool {
        use SupplementKind::*;
        self.is_omega3() || matches!(self, VitaminE | VitaminK2)
    }

    pub fn competes_with_calcium(self) -> bool {
        matches!(self, SupplementKind::Iron)
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Dosage {
    #[serde(default)]
    pub general: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub men: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub women: Option<String>,
}

impl Dosage {
    pub fn for_gender(&self, gender: Gender) -> &str {
        let specific = match gender {
            Gender::Male => self.men.as_deref(),
            Gender::Female => self.women.as_deref(),
            Gender::Other => None,
        };
        specific
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .or_else(|| Some(self.general.trim()).filter(|s| !s.is_empty()))
            .unwrap_or(DEFAULT_DOSAGE)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SupplementRecord {
    pub name: String,
    pub kind: SupplementKind,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub benefits: Vec<String>,
    #[serde(default)]
    pub side_effects: Vec<String>,
    #[serde(default)]
    pub dosage: Dosage,
    #[serde(default)]
    pub optimal_timing: String,
    #[serde(default)]
    pub absorption_tips: String,
    #[serde(default)]
    pub scientific_evidence: Vec<String>,
    #[serde(default)]
    pub warnings: Vec<String>,
    #[serde(default)]
    pub medication_interaction_keywords: Vec<String>,
    #[serde(default)]
    pub allergens: Vec<String>,
    #[serde(default)]
    pub contextual_descriptions: BTreeMap<HealthGoal, String>,
}

impl SupplementRecord {
    pub fn description_for(&self, goal: Option<HealthGoal>) -> &str {
        goal.and_then(|g| self.contextual_descriptions.get(&g))
            .map(String::as_str)
            .or_else(|| Some(self.description.as_str()))
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .unwrap_or(DEFAULT_DESCRIPTION)
    }

    pub fn timing(&self) -> &str {
        let t = self.optimal_timing.trim();
        if t.is_empty() {
            DEFAULT_TIMING
        } else {
            t
        }
    }

    pub fn mentions_benefit(&self, keyword: &str) -> bool {
        let keyword = keyword.to_lowercase();
        self.benefits
            .iter()
            .any(|b| b.to_lowercase().contains(&keyword))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dosage_prefers_gender_specific_text() {
        let dosage = Dosage {
            general: "8-18 mg".to_string(),
            men: Some("8 mg".to_string()),
            women: Some("18 mg".to_string()),
        };
        assert_eq!(dosage.for_gender(Gender::Male), "8 mg");
        assert_eq!(dosage.for_gender(Gender::Female), "18 mg");
        assert_eq!(dosage.for_gender(Gender::Other), "8-18 mg");
    }

    #[test]
    fn dosage_falls_back_to_default_text() {
        let dosage = Dosage {
            general: "  ".to_string(),
            men: None,
            women: Some(String::new()),
        };
        assert_eq!(dosage.for_gender(Gender::Female), DEFAULT_DOSAGE);
    }

    #[test]
    fn families_group_variants() {
        assert_eq!(
            SupplementKind::WheyProtein.family(),
            SupplementKind::PeaProtein.family()
        );
        assert!(SupplementKind::VeganBcaa.is_bcaa());
        assert!(!SupplementKind::WheyProtein.is_plant_protein());
        assert_eq!(SupplementKind::Iron.family(), None);
    }
}
