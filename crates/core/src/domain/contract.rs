use crate::domain::marker::MarkerId;
use crate::domain::parse_id;
use crate::domain::request::{
    BloodTestResult, DietaryRestriction, Gender, HealthGoal, TimeOfDay, UserRequest,
};
use crate::error::PipelineError;
use anyhow::{bail, ensure, Context};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::Value;

const MAX_AGE: i64 = 120;
const MAX_FREE_TEXT_CHARS: usize = 2000;

/// Loosely typed request as submitted by a form or API client. Ids are plain strings and
/// marker values may arrive as numbers or numeric strings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestPayload {
    #[serde(default)]
    pub gender: Option<String>,
    pub age: i64,
    #[serde(default)]
    pub health_goals: Vec<String>,
    #[serde(default)]
    pub dietary_restrictions: Vec<String>,
    #[serde(default)]
    pub allergies_text: Option<String>,
    #[serde(default)]
    pub medications_text: Option<String>,
    #[serde(default)]
    pub blood_test_results: Vec<BloodTestPayload>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BloodTestPayload {
    pub marker_id: String,
    pub value: Value,
    #[serde(default)]
    pub unit: String,
    pub date: String,
    #[serde(default)]
    pub time_of_day: Option<String>,
}

impl RequestPayload {
    pub fn validate_and_into_request(self) -> anyhow::Result<UserRequest> {
        ensure!(
            (0..=MAX_AGE).contains(&self.age),
            "age must be between 0 and {MAX_AGE} (got {})",
            self.age
        );

        let gender = match self.gender.as_deref().map(str::trim) {
            None | Some("") => Gender::Other,
            Some(raw) => match parse_id::<Gender>(raw) {
                Some(g) => g,
                None => bail!("unknown gender: {raw}"),
            },
        };

        let mut health_goals = Vec::with_capacity(self.health_goals.len());
        for raw in &self.health_goals {
            let goal = parse_id::<HealthGoal>(raw)
                .with_context(|| format!("unknown health goal: {raw}"))?;
            if !health_goals.contains(&goal) {
                health_goals.push(goal);
            }
        }

        let mut dietary_restrictions = Vec::with_capacity(self.dietary_restrictions.len());
        for raw in &self.dietary_restrictions {
            let restriction = parse_id::<DietaryRestriction>(raw)
                .with_context(|| format!("unknown dietary restriction: {raw}"))?;
            if !dietary_restrictions.contains(&restriction) {
                dietary_restrictions.push(restriction);
            }
        }

        let mut blood_test_results = Vec::with_capacity(self.blood_test_results.len());
        for result in self.blood_test_results {
            blood_test_results.push(result.validate_and_into_result()?);
        }

        Ok(UserRequest {
            gender,
            age: self.age as u32,
            health_goals,
            dietary_restrictions,
            allergies_text: clean_free_text(self.allergies_text, "allergiesText")?,
            medications_text: clean_free_text(self.medications_text, "medicationsText")?,
            blood_test_results,
        })
    }
}

impl BloodTestPayload {
    fn validate_and_into_result(self) -> anyhow::Result<BloodTestResult> {
        let marker_id = parse_id::<MarkerId>(&self.marker_id)
            .with_context(|| format!("unknown marker id: {}", self.marker_id))?;

        let value = match &self.value {
            Value::Number(n) => n.as_f64(),
            Value::String(s) => s.trim().replace(',', ".").parse::<f64>().ok(),
            _ => None,
        };
        let value = match value {
            Some(v) if v.is_finite() => v,
            _ => {
                return Err(PipelineError::invalid_value(
                    marker_id,
                    format!("not a finite number: {}", self.value),
                )
                .into())
            }
        };

        let date = NaiveDate::parse_from_str(self.date.trim(), "%Y-%m-%d")
            .with_context(|| format!("invalid date for {marker_id}: {}", self.date))?;

        let time_of_day = match self.time_of_day.as_deref().map(str::trim) {
            None | Some("") => None,
            Some(raw) => Some(
                parse_id::<TimeOfDay>(raw)
                    .with_context(|| format!("unknown time of day for {marker_id}: {raw}"))?,
            ),
        };

        Ok(BloodTestResult {
            marker_id,
            value,
            unit: self.unit.trim().to_string(),
            date,
            time_of_day,
        })
    }
}

fn clean_free_text(text: Option<String>, field: &str) -> anyhow::Result<Option<String>> {
    let text = text.map(|s| s.trim().to_string()).filter(|s| !s.is_empty());
    if let Some(t) = &text {
        ensure!(
            t.chars().count() <= MAX_FREE_TEXT_CHARS,
            "{field} must be at most {MAX_FREE_TEXT_CHARS} characters"
        );
    }
    Ok(text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn payload(v: Value) -> RequestPayload {
        serde_json::from_value(v).unwrap()
    }

    #[test]
    fn converts_a_complete_payload() {
        let req = payload(json!({
            "gender": "mujer",
            "age": 52,
            "healthGoals": ["energia", "energia", "salud-osea"],
            "dietaryRestrictions": ["vegan", "vegano"],
            "medicationsText": "  Levotiroxina 50 mcg ",
            "bloodTestResults": [
                {"markerId": "vitamin-d", "value": "15,5", "unit": "ng/mL", "date": "2026-02-01"},
                {"markerId": "cortisol", "value": 12, "unit": "µg/dL", "date": "2026-02-01", "timeOfDay": "mañana"}
            ]
        }))
        .validate_and_into_request()
        .unwrap();

        assert_eq!(req.gender, Gender::Female);
        assert_eq!(req.health_goals, vec![HealthGoal::Energia, HealthGoal::SaludOsea]);
        assert_eq!(req.dietary_restrictions, vec![DietaryRestriction::Vegan]);
        assert_eq!(req.medications_text.as_deref(), Some("Levotiroxina 50 mcg"));
        assert_eq!(req.blood_test_results[0].value, 15.5);
        assert_eq!(req.blood_test_results[1].time_of_day, Some(TimeOfDay::Morning));
    }

    #[test]
    fn rejects_non_numeric_marker_values_as_invalid_marker_value() {
        let err = payload(json!({
            "age": 30,
            "bloodTestResults": [
                {"markerId": "glucose", "value": "alto", "unit": "mg/dL", "date": "2026-02-01"}
            ]
        }))
        .validate_and_into_request()
        .unwrap_err();

        let typed = err.downcast_ref::<PipelineError>().unwrap();
        assert!(matches!(
            typed,
            PipelineError::InvalidMarkerValue { marker: MarkerId::Glucose, .. }
        ));
    }

    #[test]
    fn rejects_unknown_ids_and_bad_ages() {
        assert!(payload(json!({"age": 30, "healthGoals": ["volar"]}))
            .validate_and_into_request()
            .is_err());
        assert!(payload(json!({"age": 30, "dietaryRestrictions": ["paleo"]}))
            .validate_and_into_request()
            .is_err());
        assert!(payload(json!({"age": -1})).validate_and_into_request().is_err());
        assert!(payload(json!({"age": 30, "gender": "robot"}))
            .validate_and_into_request()
            .is_err());
    }

    #[test]
    fn missing_gender_is_other() {
        let req = payload(json!({"age": 40})).validate_and_into_request().unwrap();
        assert_eq!(req.gender, Gender::Other);
        assert!(req.allergies_text.is_none());
    }
}
