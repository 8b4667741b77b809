use crate::domain::request::{Gender, TimeOfDay};
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MarkerId {
    VitaminD,
    VitaminB12,
    Glucose,
    Insulin,
    Cortisol,
    Sodium,
    Potassium,
    Chloride,
    Calcium,
    Magnesium,
    Hematocrit,
    Iron,
    Ferritin,
}

impl MarkerId {
    pub const ALL: [MarkerId; 13] = [
        MarkerId::VitaminD,
        MarkerId::VitaminB12,
        MarkerId::Glucose,
        MarkerId::Insulin,
        MarkerId::Cortisol,
        MarkerId::Sodium,
        MarkerId::Potassium,
        MarkerId::Chloride,
        MarkerId::Calcium,
        MarkerId::Magnesium,
        MarkerId::Hematocrit,
        MarkerId::Iron,
        MarkerId::Ferritin,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            MarkerId::VitaminD => "vitamin-d",
            MarkerId::VitaminB12 => "vitamin-b12",
            MarkerId::Glucose => "glucose",
            MarkerId::Insulin => "insulin",
            MarkerId::Cortisol => "cortisol",
            MarkerId::Sodium => "sodium",
            MarkerId::Potassium => "potassium",
            MarkerId::Chloride => "chloride",
            MarkerId::Calcium => "calcium",
            MarkerId::Magnesium => "magnesium",
            MarkerId::Hematocrit => "hematocrit",
            MarkerId::Iron => "iron",
            MarkerId::Ferritin => "ferritin",
        }
    }
}

impl fmt::Display for MarkerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Matched on `[min, max)`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MarkerRange {
    pub min: f64,
    pub max: f64,
    pub status: String,
    pub description: String,
    pub recommendation: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dosage: Option<String>,
    #[serde(default)]
    pub considerations: Vec<String>,
    /// `dosage` applies to the first entry.
    #[serde(default)]
    pub supplement_recommendations: Vec<String>,
    #[serde(default)]
    pub benefits: Vec<String>,
    #[serde(default)]
    pub risks: Vec<String>,
}

impl MarkerRange {
    pub fn contains(&self, value: f64) -> bool {
        value >= self.min && value < self.max
    }

    pub fn is_significant(&self) -> bool {
        !self.supplement_recommendations.is_empty()
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct MarkerDomain {
    pub min: f64,
    pub max: f64,
}

impl MarkerDomain {
    pub fn contains(&self, value: f64) -> bool {
        value >= self.min && value < self.max
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MarkerModifiers {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time_of_day: Option<TimeOfDay>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gender: Option<Gender>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RangeSelector {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time_of_day: Option<TimeOfDay>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gender: Option<Gender>,
}

impl RangeSelector {
    pub fn is_empty(&self) -> bool {
        self.time_of_day.is_none() && self.gender.is_none()
    }

    pub fn matches(&self, modifiers: &MarkerModifiers) -> bool {
        if self.is_empty() {
            return false;
        }
        let time_ok = self
            .time_of_day
            .map_or(true, |t| modifiers.time_of_day == Some(t));
        let gender_ok = self.gender.map_or(true, |g| modifiers.gender == Some(g));
        time_ok && gender_ok
    }
}

impl fmt::Display for RangeSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.time_of_day, self.gender) {
            (None, None) => f.write_str("default"),
            (Some(t), None) => write!(f, "time_of_day={t:?}"),
            (None, Some(g)) => write!(f, "gender={g:?}"),
            (Some(t), Some(g)) => write!(f, "time_of_day={t:?},gender={g:?}"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RangeVariant {
    pub when: RangeSelector,
    pub ranges: Vec<MarkerRange>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MarkerDefinition {
    pub id: MarkerId,
    pub name: String,
    pub unit: String,
    pub domain: MarkerDomain,
    pub ranges: Vec<MarkerRange>,
    #[serde(default)]
    pub variants: Vec<RangeVariant>,
}

impl MarkerDefinition {
    pub fn ranges_for(&self, modifiers: &MarkerModifiers) -> &[MarkerRange] {
        self.variants
            .iter()
            .find(|v| v.when.matches(modifiers))
            .map(|v| v.ranges.as_slice())
            .unwrap_or(self.ranges.as_slice())
    }

    pub fn tables(&self) -> impl Iterator<Item = (RangeSelector, &[MarkerRange])> + '_ {
        std::iter::once((RangeSelector::default(), self.ranges.as_slice()))
            .chain(self.variants.iter().map(|v| (v.when, v.ranges.as_slice())))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn range(min: f64, max: f64, status: &str) -> MarkerRange {
        MarkerRange {
            min,
            max,
            status: status.to_string(),
            description: String::new(),
            recommendation: String::new(),
            dosage: None,
            considerations: vec![],
            supplement_recommendations: vec![],
            benefits: vec![],
            risks: vec![],
        }
    }

    #[test]
    fn range_is_half_open() {
        let r = range(20.0, 30.0, "x");
        assert!(r.contains(20.0));
        assert!(r.contains(29.999));
        assert!(!r.contains(30.0));
    }

    #[test]
    fn variant_selection_precedes_default() {
        let def = MarkerDefinition {
            id: MarkerId::Cortisol,
            name: "Cortisol".to_string(),
            unit: "µg/dL".to_string(),
            domain: MarkerDomain { min: 0.0, max: 100.0 },
            ranges: vec![range(0.0, 100.0, "default")],
            variants: vec![RangeVariant {
                when: RangeSelector {
                    time_of_day: Some(TimeOfDay::Evening),
                    gender: None,
                },
                ranges: vec![range(0.0, 100.0, "evening")],
            }],
        };

        let evening = MarkerModifiers {
            time_of_day: Some(TimeOfDay::Evening),
            gender: Some(Gender::Female),
        };
        assert_eq!(def.ranges_for(&evening)[0].status, "evening");
        assert_eq!(def.ranges_for(&MarkerModifiers::default())[0].status, "default");
    }

    #[test]
    fn empty_selector_never_matches() {
        assert!(!RangeSelector::default().matches(&MarkerModifiers::default()));
    }

    #[test]
    fn marker_ids_use_kebab_case_on_the_wire() {
        for id in MarkerId::ALL {
            let json = serde_json::to_value(id).unwrap();
            assert_eq!(json, serde_json::Value::String(id.as_str().to_string()));
        }
    }
}
