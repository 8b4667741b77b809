use crate::catalog::Catalog;
use crate::domain::marker::MarkerDefinition;
use crate::domain::recommendation::{Candidate, Diagnostic, MarkerAssessment};
use crate::domain::request::{BloodTestResult, HealthGoal, UserRequest};
use crate::error::PipelineError;
use crate::pipeline::classifier::{classify, UNKNOWN_STATUS};
use crate::pipeline::GapPolicy;

#[derive(Debug, Clone, Default)]
pub struct Collected {
    pub goals: Vec<HealthGoal>,
    pub candidates: Vec<Candidate>,
    pub assessments: Vec<MarkerAssessment>,
}

pub fn collect(
    catalog: &Catalog,
    request: &UserRequest,
    gap_policy: GapPolicy,
    diagnostics: &mut Vec<Diagnostic>,
) -> Result<Collected, PipelineError> {
    let goals = expand_goals(catalog, request);

    let mut candidates = Vec::new();
    let mut assessments = Vec::with_capacity(request.blood_test_results.len());
    for result in &request.blood_test_results {
        let (assessment, found) = collect_blood(catalog, request, result, gap_policy, diagnostics)?;
        assessments.push(assessment);
        candidates.extend(found);
    }
    let from_blood = candidates.len();

    candidates.extend(collect_goals(catalog, &goals));

    tracing::debug!(
        from_blood,
        from_goals = candidates.len() - from_blood,
        "collected candidates"
    );
    Ok(Collected {
        goals,
        candidates,
        assessments,
    })
}

pub fn expand_goals(catalog: &Catalog, request: &UserRequest) -> Vec<HealthGoal> {
    let mut goals = request.health_goals.clone();
    for rule in catalog.derived_goals() {
        if rule.applies(request.gender, request.age) && !goals.contains(&rule.goal) {
            tracing::info!(goal = rule.goal.as_str(), age = request.age, "derived goal added");
            goals.push(rule.goal);
        }
    }
    goals
}

pub fn collect_blood(
    catalog: &Catalog,
    request: &UserRequest,
    result: &BloodTestResult,
    gap_policy: GapPolicy,
    diagnostics: &mut Vec<Diagnostic>,
) -> Result<(MarkerAssessment, Vec<Candidate>), PipelineError> {
    let marker = result.marker_id;
    let def = catalog
        .marker(marker)
        .ok_or(PipelineError::UnknownMarker(marker))?;
    check_unit(def, result, diagnostics);

    let range = match classify(catalog, marker, result.value, &request.modifiers_for(result)) {
        Ok(range) => range,
        Err(PipelineError::CatalogGap { marker, value }) if gap_policy == GapPolicy::Degrade => {
            tracing::error!(%marker, value, "no range covers value; reporting unknown status");
            diagnostics.push(Diagnostic::CatalogGap { marker, value });
            let assessment = MarkerAssessment {
                marker_id: marker,
                value,
                unit: def.unit.clone(),
                status: UNKNOWN_STATUS.to_string(),
                description: String::new(),
                recommendation: String::new(),
                considerations: Vec::new(),
            };
            return Ok((assessment, Vec::new()));
        }
        Err(err) => return Err(err),
    };

    tracing::debug!(%marker, value = result.value, status = %range.status, "classified");

    let candidates: Vec<Candidate> = range
        .supplement_recommendations
        .iter()
        .enumerate()
        .map(|(i, name)| {
            let dosage = if i == 0 { range.dosage.clone() } else { None };
            Candidate::from_marker(name.as_str(), marker, dosage)
        })
        .collect();

    let assessment = MarkerAssessment {
        marker_id: marker,
        value: result.value,
        unit: def.unit.clone(),
        status: range.status.clone(),
        description: range.description.clone(),
        recommendation: range.recommendation.clone(),
        considerations: range.considerations.clone(),
    };
    Ok((assessment, candidates))
}

fn check_unit(def: &MarkerDefinition, result: &BloodTestResult, diagnostics: &mut Vec<Diagnostic>) {
    let got = result.unit.trim();
    if got.is_empty() || got.eq_ignore_ascii_case(def.unit.trim()) {
        return;
    }
    // Classified anyway; values are assumed to be in the catalog unit.
    tracing::warn!(marker = %def.id, expected = %def.unit, got, "unit mismatch");
    diagnostics.push(Diagnostic::UnitMismatch {
        marker: def.id,
        expected: def.unit.clone(),
        got: got.to_string(),
    });
}

pub fn collect_goals(catalog: &Catalog, goals: &[HealthGoal]) -> Vec<Candidate> {
    let mut candidates = Vec::new();
    for &goal in goals {
        let Some(def) = catalog.goal(goal) else {
            tracing::warn!(goal = goal.as_str(), "goal has no catalog entry");
            continue;
        };
        candidates.extend(
            def.supplements
                .iter()
                .map(|name| Candidate::from_goal(name.as_str(), goal)),
        );
        for keyword in &def.keywords {
            candidates.extend(
                catalog
                    .supplements()
                    .iter()
                    .filter(|s| s.mentions_benefit(keyword))
                    .map(|s| Candidate::from_goal(s.name.as_str(), goal)),
            );
        }
    }
    candidates
}
