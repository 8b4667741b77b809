use crate::domain::request::{DietaryRestriction, Gender, HealthGoal};
use crate::domain::supplement::SupplementKind;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GoalDefinition {
    pub id: HealthGoal,
    pub name: String,
    #[serde(default)]
    pub supplements: Vec<String>,
    #[serde(default)]
    pub keywords: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DerivedGoalRule {
    pub goal: HealthGoal,
    #[serde(default)]
    pub gender: Option<Gender>,
    pub min_age: u32,
    pub max_age: u32,
}

impl DerivedGoalRule {
    pub fn applies(&self, gender: Gender, age: u32) -> bool {
        self.gender.map_or(true, |g| g == gender) && (self.min_age..=self.max_age).contains(&age)
    }
}

/// First applicable entry in file order wins.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubstitutionRule {
    pub restricted: String,
    pub restriction: DietaryRestriction,
    pub replacement: String,
}

/// Age band `[min_age, max_age)`; either bound may be open.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgeWarning {
    pub supplement: String,
    #[serde(default)]
    pub min_age: Option<u32>,
    #[serde(default)]
    pub max_age: Option<u32>,
    pub warning: String,
}

impl AgeWarning {
    pub fn applies(&self, age: u32) -> bool {
        self.min_age.map_or(true, |min| age >= min) && self.max_age.map_or(true, |max| age < max)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MedicationCategory {
    pub id: String,
    pub keywords: Vec<String>,
}

impl MedicationCategory {
    /// `medications` must already be lower-cased.
    pub fn matches(&self, medications: &str) -> bool {
        self.keywords
            .iter()
            .any(|k| !k.trim().is_empty() && medications.contains(&k.to_lowercase()))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InteractionRule {
    pub supplement: String,
    pub category: String,
    pub warnings: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SynergyTemplate {
    pub goal: HealthGoal,
    pub name: String,
    pub description: String,
    pub supplements: Vec<String>,
    #[serde(default)]
    pub synergy_notes: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CyclingNote {
    pub kind: SupplementKind,
    pub note: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HomaIrBand {
    #[serde(default)]
    pub below: Option<f64>,
    pub label: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Rules {
    pub substitutions: Vec<SubstitutionRule>,
    pub vegan_exclusive: Vec<String>,
    pub women_only: Vec<String>,
    pub age_warnings: Vec<AgeWarning>,
    pub medication_categories: Vec<MedicationCategory>,
    pub interactions: Vec<InteractionRule>,
    pub synergy_templates: Vec<SynergyTemplate>,
    pub cycling_notes: Vec<CyclingNote>,
    pub wellness_fallback: Vec<String>,
    pub homa_ir_bands: Vec<HomaIrBand>,
    #[serde(default = "default_severity_keywords")]
    pub severity_keywords: Vec<String>,
}

fn default_severity_keywords() -> Vec<String> {
    ["severe", "serious", "grave"]
        .into_iter()
        .map(String::from)
        .collect()
}
