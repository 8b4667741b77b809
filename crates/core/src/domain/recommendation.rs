use crate::domain::marker::MarkerId;
use crate::domain::request::HealthGoal;
use crate::domain::supplement::SupplementKind;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

// Ordering is precedence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Provenance {
    Goal,
    BloodTest,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "id", rename_all = "kebab-case")]
pub enum CandidateSource {
    Goal(HealthGoal),
    Marker(MarkerId),
    Fallback,
}

impl CandidateSource {
    pub fn provenance(self) -> Provenance {
        match self {
            CandidateSource::Marker(_) => Provenance::BloodTest,
            CandidateSource::Goal(_) | CandidateSource::Fallback => Provenance::Goal,
        }
    }

    pub fn goal(self) -> Option<HealthGoal> {
        match self {
            CandidateSource::Goal(g) => Some(g),
            _ => None,
        }
    }
}

impl fmt::Display for CandidateSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CandidateSource::Goal(g) => write!(f, "goal:{}", g.as_str()),
            CandidateSource::Marker(m) => write!(f, "marker:{m}"),
            CandidateSource::Fallback => f.write_str("fallback"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Candidate {
    pub supplement_name: String,
    pub source: CandidateSource,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dosage: Option<String>,
}

impl Candidate {
    pub fn from_goal(name: impl Into<String>, goal: HealthGoal) -> Self {
        Self {
            supplement_name: name.into(),
            source: CandidateSource::Goal(goal),
            dosage: None,
        }
    }

    pub fn from_marker(name: impl Into<String>, marker: MarkerId, dosage: Option<String>) -> Self {
        Self {
            supplement_name: name.into(),
            source: CandidateSource::Marker(marker),
            dosage,
        }
    }

    pub fn fallback(name: impl Into<String>) -> Self {
        Self {
            supplement_name: name.into(),
            source: CandidateSource::Fallback,
            dosage: None,
        }
    }

    pub fn provenance(&self) -> Provenance {
        self.source.provenance()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recommendation {
    pub name: String,
    pub kind: SupplementKind,
    pub provenance: Provenance,
    pub description: String,
    pub benefits: Vec<String>,
    pub dosage: String,
    pub timing: String,
    pub absorption_tips: String,
    pub evidence: Vec<String>,
    pub tags: Vec<String>,
    pub warnings: Vec<String>,
    pub interaction_warnings: Vec<String>,
    pub consult_professional: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ScheduleSlot {
    Morning,
    WithMeals,
    PreExercise,
    PostExercise,
    Evening,
}

impl ScheduleSlot {
    pub const ALL: [ScheduleSlot; 5] = [
        ScheduleSlot::Morning,
        ScheduleSlot::WithMeals,
        ScheduleSlot::PreExercise,
        ScheduleSlot::PostExercise,
        ScheduleSlot::Evening,
    ];

    pub fn label(self) -> &'static str {
        match self {
            ScheduleSlot::Morning => "Por la mañana",
            ScheduleSlot::WithMeals => "Con las comidas",
            ScheduleSlot::PreExercise => "Antes del ejercicio",
            ScheduleSlot::PostExercise => "Después del ejercicio",
            ScheduleSlot::Evening => "Por la noche",
        }
    }

    pub fn capacity(self) -> Option<usize> {
        match self {
            ScheduleSlot::Morning => Some(3),
            ScheduleSlot::WithMeals => Some(4),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Combination {
    pub name: String,
    pub description: String,
    pub recommendations: Vec<Recommendation>,
    pub original_price: f64,
    pub discount_percent: u8,
    pub price: f64,
    pub synergy_notes: Vec<String>,
    pub instructions_text: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarkerAssessment {
    pub marker_id: MarkerId,
    pub value: f64,
    pub unit: String,
    pub status: String,
    pub description: String,
    pub recommendation: String,
    #[serde(default)]
    pub considerations: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HomaIrAssessment {
    pub value: f64,
    pub band: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Diagnostic {
    UnknownSupplementReference { name: String, context: String },
    CatalogGap { marker: MarkerId, value: f64 },
    UnitMismatch { marker: MarkerId, expected: String, got: String },
    Excluded { supplement: String, reason: String },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecommendationOutput {
    pub recommendations: Vec<Recommendation>,
    pub combinations: Vec<Combination>,
    pub schedule: BTreeMap<ScheduleSlot, Vec<String>>,
    pub marker_assessments: Vec<MarkerAssessment>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub homa_ir: Option<HomaIrAssessment>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub diagnostics: Vec<Diagnostic>,
}
