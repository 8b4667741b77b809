use crate::domain::marker::{MarkerId, MarkerModifiers};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Gender {
    #[serde(rename = "hombre", alias = "male", alias = "masculino")]
    Male,
    #[serde(rename = "mujer", alias = "female", alias = "femenino")]
    Female,
    #[default]
    #[serde(rename = "otro", alias = "other")]
    Other,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum TimeOfDay {
    #[serde(rename = "manana", alias = "mañana", alias = "morning")]
    Morning,
    #[serde(rename = "noche", alias = "tarde", alias = "evening")]
    Evening,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum DietaryRestriction {
    #[serde(rename = "vegano", alias = "vegan")]
    Vegan,
    #[serde(rename = "vegetariano", alias = "vegetarian")]
    Vegetarian,
    #[serde(rename = "sin-gluten", alias = "gluten-free")]
    GlutenFree,
    #[serde(rename = "sin-lactosa", alias = "lactose-free")]
    LactoseFree,
    #[serde(rename = "sin-frutos-secos", alias = "nut-free")]
    NutFree,
    #[serde(rename = "sin-soja", alias = "soy-free")]
    SoyFree,
    #[serde(rename = "sin-huevo", alias = "egg-free")]
    EggFree,
    #[serde(rename = "sin-mariscos", alias = "shellfish-free")]
    ShellfishFree,
    #[serde(rename = "kosher")]
    Kosher,
}

impl DietaryRestriction {
    pub fn is_plant_based(self) -> bool {
        matches!(self, DietaryRestriction::Vegan | DietaryRestriction::Vegetarian)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            DietaryRestriction::Vegan => "vegano",
            DietaryRestriction::Vegetarian => "vegetariano",
            DietaryRestriction::GlutenFree => "sin-gluten",
            DietaryRestriction::LactoseFree => "sin-lactosa",
            DietaryRestriction::NutFree => "sin-frutos-secos",
            DietaryRestriction::SoyFree => "sin-soja",
            DietaryRestriction::EggFree => "sin-huevo",
            DietaryRestriction::ShellfishFree => "sin-mariscos",
            DietaryRestriction::Kosher => "kosher",
        }
    }
}

pub fn is_plant_based_diet(restrictions: &[DietaryRestriction]) -> bool {
    restrictions.iter().any(|r| r.is_plant_based())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum HealthGoal {
    GananciaMuscular,
    PerdidaPeso,
    Energia,
    Sueno,
    Estres,
    Inmunidad,
    SaludOsea,
    SaludCardiovascular,
    PielCabello,
    Digestion,
    RendimientoDeportivo,
    Menopausia,
    ControlGlucosa,
}

impl HealthGoal {
    pub const ALL: [HealthGoal; 13] = [
        HealthGoal::GananciaMuscular,
        HealthGoal::PerdidaPeso,
        HealthGoal::Energia,
        HealthGoal::Sueno,
        HealthGoal::Estres,
        HealthGoal::Inmunidad,
        HealthGoal::SaludOsea,
        HealthGoal::SaludCardiovascular,
        HealthGoal::PielCabello,
        HealthGoal::Digestion,
        HealthGoal::RendimientoDeportivo,
        HealthGoal::Menopausia,
        HealthGoal::ControlGlucosa,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            HealthGoal::GananciaMuscular => "ganancia-muscular",
            HealthGoal::PerdidaPeso => "perdida-peso",
            HealthGoal::Energia => "energia",
            HealthGoal::Sueno => "sueno",
            HealthGoal::Estres => "estres",
            HealthGoal::Inmunidad => "inmunidad",
            HealthGoal::SaludOsea => "salud-osea",
            HealthGoal::SaludCardiovascular => "salud-cardiovascular",
            HealthGoal::PielCabello => "piel-cabello",
            HealthGoal::Digestion => "digestion",
            HealthGoal::RendimientoDeportivo => "rendimiento-deportivo",
            HealthGoal::Menopausia => "menopausia",
            HealthGoal::ControlGlucosa => "control-glucosa",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BloodTestResult {
    pub marker_id: MarkerId,
    pub value: f64,
    pub unit: String,
    pub date: NaiveDate,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time_of_day: Option<TimeOfDay>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct UserRequest {
    pub gender: Gender,
    pub age: u32,
    #[serde(default)]
    pub health_goals: Vec<HealthGoal>,
    #[serde(default)]
    pub dietary_restrictions: Vec<DietaryRestriction>,
    #[serde(default)]
    pub allergies_text: Option<String>,
    #[serde(default)]
    pub medications_text: Option<String>,
    #[serde(default)]
    pub blood_test_results: Vec<BloodTestResult>,
}

impl UserRequest {
    pub fn has_restriction(&self, restriction: DietaryRestriction) -> bool {
        self.dietary_restrictions.contains(&restriction)
    }

    pub fn modifiers_for(&self, result: &BloodTestResult) -> MarkerModifiers {
        MarkerModifiers {
            time_of_day: result.time_of_day,
            gender: match self.gender {
                Gender::Other => None,
                g => Some(g),
            },
        }
    }
}
