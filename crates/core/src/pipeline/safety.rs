use crate::catalog::Catalog;
use crate::domain::recommendation::{CandidateSource, Diagnostic, Recommendation};
use crate::domain::request::{is_plant_based_diet, DietaryRestriction, Gender, HealthGoal, UserRequest};
use crate::domain::supplement::{SupplementKind, SupplementRecord};
use crate::pipeline::resolve::{self, ResolvedSupplement};
use crate::pipeline::{MAX_RECOMMENDATIONS, MIN_RECOMMENDATIONS};

const BLOOD_TEST_TAG: &str = "análisis de sangre";
const FALLBACK_TAG: &str = "bienestar general";
const SUBSTITUTE_TAG: &str = "alternativa";

/// Interactions and age bands only add warnings; they never remove an item.
pub fn filter<'c>(
    catalog: &'c Catalog,
    resolved: Vec<ResolvedSupplement<'c>>,
    request: &UserRequest,
    goals: &[HealthGoal],
    diagnostics: &mut Vec<Diagnostic>,
) -> Vec<Recommendation> {
    let mut kept: Vec<_> = resolved
        .into_iter()
        .filter(|item| match exclusion_reason(catalog, item.record, request) {
            Some(reason) => {
                tracing::debug!(supplement = item.name(), %reason, "excluded");
                diagnostics.push(Diagnostic::Excluded {
                    supplement: item.name().to_string(),
                    reason,
                });
                false
            }
            None => true,
        })
        .collect();

    if kept.len() < MIN_RECOMMENDATIONS {
        refill_from_fallback(catalog, &mut kept, request, diagnostics);
    }

    apply_bcaa_policy(catalog, &mut kept, request, goals, diagnostics);

    let medications = request
        .medications_text
        .as_deref()
        .unwrap_or_default()
        .to_lowercase();
    let categories: Vec<&str> = catalog
        .rules()
        .medication_categories
        .iter()
        .filter(|c| c.matches(&medications))
        .map(|c| c.id.as_str())
        .collect();
    if !categories.is_empty() {
        tracing::debug!(?categories, "medication categories matched");
    }

    kept.iter()
        .map(|item| annotate(catalog, item, request, &medications, &categories))
        .collect()
}

fn refill_from_fallback<'c>(
    catalog: &'c Catalog,
    items: &mut Vec<ResolvedSupplement<'c>>,
    request: &UserRequest,
    diagnostics: &mut Vec<Diagnostic>,
) {
    let refill: Vec<_> = resolve::wellness_fallback(catalog, &request.dietary_restrictions, diagnostics)
        .into_iter()
        .filter(|f| !items.iter().any(|i| i.name() == f.name()))
        .filter(|f| exclusion_reason(catalog, f.record, request).is_none())
        .collect();
    tracing::info!(
        kept = items.len(),
        added = refill.len(),
        "exclusions left too few items; refilling from wellness fallback"
    );
    items.extend(refill);
}

fn exclusion_reason(catalog: &Catalog, record: &SupplementRecord, request: &UserRequest) -> Option<String> {
    if catalog.is_vegan_exclusive(&record.name) && !is_plant_based_diet(&request.dietary_restrictions) {
        return Some("vegan-exclusive item for a non plant-based diet".to_string());
    }
    if catalog.is_women_only(&record.name) && request.gender == Gender::Male {
        return Some("women-only item".to_string());
    }
    allergy_match(record, request.allergies_text.as_deref()?).map(|token| format!("allergy: {token}"))
}

fn allergy_match<'r>(record: &'r SupplementRecord, allergies: &str) -> Option<&'r str> {
    let allergies = allergies.to_lowercase();
    std::iter::once(record.name.as_str())
        .chain(record.allergens.iter().map(String::as_str))
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .find(|token| allergies.contains(&token.to_lowercase()))
}

fn apply_bcaa_policy<'c>(
    catalog: &'c Catalog,
    items: &mut Vec<ResolvedSupplement<'c>>,
    request: &UserRequest,
    goals: &[HealthGoal],
    diagnostics: &mut Vec<Diagnostic>,
) {
    let has_whey = any_kind(items, |k| k == SupplementKind::WheyProtein);
    let has_plant_protein = any_kind(items, SupplementKind::is_plant_protein);
    let lactose_free_muscle = goals.contains(&HealthGoal::GananciaMuscular)
        && request.has_restriction(DietaryRestriction::LactoseFree)
        && !has_whey;

    if has_whey || (!has_plant_protein && !lactose_free_muscle) {
        let reason = if has_whey {
            "BCAA is redundant with whey protein"
        } else {
            "BCAA without a plant protein"
        };
        items.retain(|i| {
            if !i.record.kind.is_bcaa() {
                return true;
            }
            tracing::debug!(supplement = i.name(), reason, "removed");
            diagnostics.push(Diagnostic::Excluded {
                supplement: i.name().to_string(),
                reason: reason.to_string(),
            });
            false
        });
    }

    if lactose_free_muscle && !any_kind(items, SupplementKind::is_bcaa) && items.len() < MAX_RECOMMENDATIONS {
        let kind = if is_plant_based_diet(&request.dietary_restrictions) {
            SupplementKind::VeganBcaa
        } else {
            SupplementKind::Bcaa
        };
        match catalog.supplement_by_kind(kind) {
            Some(record) if exclusion_reason(catalog, record, request).is_some() => {
                tracing::debug!(supplement = %record.name, "BCAA re-insertion blocked by a hard exclusion");
            }
            Some(record) => {
                tracing::debug!(supplement = %record.name, "re-added BCAA for lactose-free muscle gain");
                items.push(ResolvedSupplement {
                    record,
                    source: CandidateSource::Goal(HealthGoal::GananciaMuscular),
                    dosage: None,
                    substituted_from: None,
                });
            }
            None => {
                tracing::warn!(?kind, "no catalog record for BCAA kind");
                diagnostics.push(Diagnostic::UnknownSupplementReference {
                    name: format!("{kind:?}"),
                    context: "bcaa re-insertion".to_string(),
                });
            }
        }
    }
}

fn any_kind(items: &[ResolvedSupplement<'_>], pred: impl Fn(SupplementKind) -> bool) -> bool {
    items.iter().any(|i| pred(i.record.kind))
}

fn annotate(
    catalog: &Catalog,
    item: &ResolvedSupplement<'_>,
    request: &UserRequest,
    medications: &str,
    categories: &[&str],
) -> Recommendation {
    let record = item.record;
    let rules = catalog.rules();

    let age_warnings: Vec<String> = rules
        .age_warnings
        .iter()
        .filter(|w| w.supplement == record.name && w.applies(request.age))
        .map(|w| w.warning.clone())
        .collect();

    let mut interaction_warnings: Vec<String> = Vec::new();
    let mut push_unique = |warning: String| {
        if !interaction_warnings.contains(&warning) {
            interaction_warnings.push(warning);
        }
    };
    for rule in &rules.interactions {
        if rule.supplement == record.name && categories.contains(&rule.category.as_str()) {
            rule.warnings.iter().cloned().for_each(&mut push_unique);
        }
    }
    if !medications.trim().is_empty() {
        for keyword in &record.medication_interaction_keywords {
            let keyword = keyword.trim();
            if !keyword.is_empty() && medications.contains(&keyword.to_lowercase()) {
                push_unique(format!(
                    "Puede interactuar con {keyword}: consulta a tu médico o farmacéutico."
                ));
            }
        }
    }

    let severe_side_effects = record.side_effects.iter().any(|effect| {
        let effect = effect.to_lowercase();
        rules
            .severity_keywords
            .iter()
            .any(|k| effect.contains(&k.to_lowercase()))
    });
    let consult_professional =
        !interaction_warnings.is_empty() || !age_warnings.is_empty() || severe_side_effects;

    let mut warnings = record.warnings.clone();
    warnings.extend(age_warnings);

    Recommendation {
        name: record.name.clone(),
        kind: record.kind,
        provenance: item.provenance(),
        description: record.description_for(item.source.goal()).to_string(),
        benefits: record.benefits.clone(),
        dosage: item
            .dosage
            .clone()
            .unwrap_or_else(|| record.dosage.for_gender(request.gender).to_string()),
        timing: record.timing().to_string(),
        absorption_tips: record.absorption_tips.trim().to_string(),
        evidence: record.scientific_evidence.clone(),
        tags: tags(item),
        warnings,
        interaction_warnings,
        consult_professional,
    }
}

fn tags(item: &ResolvedSupplement<'_>) -> Vec<String> {
    let mut tags = Vec::new();
    match item.source {
        CandidateSource::Marker(marker) => {
            tags.push(BLOOD_TEST_TAG.to_string());
            tags.push(marker.as_str().to_string());
        }
        CandidateSource::Goal(goal) => tags.push(goal.as_str().to_string()),
        CandidateSource::Fallback => tags.push(FALLBACK_TAG.to_string()),
    }
    if item.substituted_from.is_some() {
        tags.push(SUBSTITUTE_TAG.to_string());
    }
    tags
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::marker::MarkerId;
    use crate::domain::recommendation::{Candidate, Provenance};
    use crate::pipeline::resolve::resolve;

    fn request(gender: Gender, age: u32, restrictions: Vec<DietaryRestriction>) -> UserRequest {
        UserRequest {
            gender,
            age,
            health_goals: vec![],
            dietary_restrictions: restrictions,
            allergies_text: None,
            medications_text: None,
            blood_test_results: vec![],
        }
    }

    fn run(catalog: &Catalog, names: &[&str], req: &UserRequest, goals: &[HealthGoal]) -> (Vec<Recommendation>, Vec<Diagnostic>) {
        let goal = goals.first().copied().unwrap_or(HealthGoal::Energia);
        let candidates: Vec<_> = names.iter().map(|n| Candidate::from_goal(*n, goal)).collect();
        let mut diagnostics = Vec::new();
        let resolved = resolve(catalog, &candidates, &req.dietary_restrictions, &mut diagnostics);
        let recs = filter(catalog, resolved, req, goals, &mut diagnostics);
        (recs, diagnostics)
    }

    fn names(recs: &[Recommendation]) -> Vec<&str> {
        recs.iter().map(|r| r.name.as_str()).collect()
    }

    #[test]
    fn women_only_items_are_removed_for_men() {
        let catalog = Catalog::embedded().unwrap();
        let list = ["Isoflavonas de Soja", "Cohosh Negro", "Calcio", "Vitamina D3"];

        let (men, diagnostics) = run(&catalog, &list, &request(Gender::Male, 50, vec![]), &[HealthGoal::Menopausia]);
        assert_eq!(names(&men), vec!["Calcio", "Vitamina D3"]);
        assert_eq!(diagnostics.len(), 2);

        let (women, _) = run(&catalog, &list, &request(Gender::Female, 50, vec![]), &[HealthGoal::Menopausia]);
        assert_eq!(women.len(), 4);
        let (other, _) = run(&catalog, &list, &request(Gender::Other, 50, vec![]), &[HealthGoal::Menopausia]);
        assert_eq!(other.len(), 4);
    }

    #[test]
    fn bcaa_is_dropped_next_to_whey() {
        let catalog = Catalog::embedded().unwrap();
        let list = ["Creatina Monohidrato", "Proteína de Suero (Whey)", "BCAA"];
        let (recs, _) = run(&catalog, &list, &request(Gender::Male, 30, vec![]), &[HealthGoal::GananciaMuscular]);
        assert_eq!(names(&recs), vec!["Creatina Monohidrato", "Proteína de Suero (Whey)"]);
    }

    #[test]
    fn bcaa_needs_a_plant_protein_otherwise() {
        let catalog = Catalog::embedded().unwrap();
        let req = request(Gender::Male, 30, vec![]);
        let (alone, _) = run(&catalog, &["Creatina Monohidrato", "BCAA"], &req, &[HealthGoal::RendimientoDeportivo]);
        assert_eq!(names(&alone), vec!["Creatina Monohidrato"]);

        let (with_pea, _) = run(
            &catalog,
            &["Proteína de Guisante", "BCAA"],
            &req,
            &[HealthGoal::RendimientoDeportivo],
        );
        assert_eq!(names(&with_pea), vec!["Proteína de Guisante", "BCAA"]);
    }

    #[test]
    fn lactose_free_muscle_gain_gets_one_bcaa_back() {
        let catalog = Catalog::embedded().unwrap();
        let req = request(Gender::Female, 30, vec![DietaryRestriction::LactoseFree]);
        let (recs, _) = run(&catalog, &["Creatina Monohidrato", "Beta-Alanina"], &req, &[HealthGoal::GananciaMuscular]);
        assert_eq!(names(&recs), vec!["Creatina Monohidrato", "Beta-Alanina", "BCAA"]);

        let vegan = request(
            Gender::Female,
            30,
            vec![DietaryRestriction::LactoseFree, DietaryRestriction::Vegan],
        );
        let (recs, _) = run(&catalog, &["Creatina Monohidrato", "Beta-Alanina"], &vegan, &[HealthGoal::GananciaMuscular]);
        assert_eq!(recs.iter().filter(|r| r.kind.is_bcaa()).count(), 1);
        assert!(names(&recs).contains(&"BCAA Veganos"));
    }

    #[test]
    fn bcaa_is_not_re_added_when_the_user_is_allergic() {
        let catalog = Catalog::embedded().unwrap();
        let mut req = request(Gender::Male, 30, vec![DietaryRestriction::LactoseFree]);
        req.allergies_text = Some("Alergia a BCAA".to_string());
        let (recs, diagnostics) = run(
            &catalog,
            &["Creatina Monohidrato", "Beta-Alanina", "BCAA"],
            &req,
            &[HealthGoal::GananciaMuscular],
        );
        assert_eq!(names(&recs), vec!["Creatina Monohidrato", "Beta-Alanina"]);
        assert!(diagnostics.iter().any(|d| matches!(
            d,
            Diagnostic::Excluded { supplement, reason } if supplement == "BCAA" && reason == "allergy: BCAA"
        )));
    }

    #[test]
    fn exclusions_below_the_minimum_refill_from_fallback() {
        let catalog = Catalog::embedded().unwrap();
        let mut req = request(Gender::Male, 30, vec![]);
        req.allergies_text = Some("pescado, zinc".to_string());
        let (recs, _) = run(
            &catalog,
            &["Omega-3 (Aceite de Pescado)", "Vitamina C"],
            &req,
            &[HealthGoal::Inmunidad],
        );
        assert_eq!(names(&recs), vec!["Vitamina C", "Vitamina D3", "Magnesio"]);
        assert_eq!(recs[1].tags, vec!["bienestar general"]);
    }

    #[test]
    fn allergy_to_every_fallback_item_leaves_nothing() {
        let catalog = Catalog::embedded().unwrap();
        let mut req = request(Gender::Female, 30, vec![]);
        req.allergies_text = Some("magnesio, zinc, vitamina d3, pescado".to_string());
        let (recs, diagnostics) = run(&catalog, &["Magnesio", "Zinc"], &req, &[HealthGoal::Energia]);
        assert!(recs.is_empty());
        assert_eq!(diagnostics.len(), 2);
    }

    #[test]
    fn medication_text_adds_interaction_warnings_and_consult_flag() {
        let catalog = Catalog::embedded().unwrap();
        let mut req = request(Gender::Female, 40, vec![]);
        req.medications_text = Some("Tomo SINTROM y omeprazol".to_string());
        let (recs, _) = run(
            &catalog,
            &["Omega-3 (Aceite de Pescado)", "Hierro", "Zinc"],
            &req,
            &[HealthGoal::SaludCardiovascular],
        );

        let omega = &recs[0];
        assert_eq!(omega.interaction_warnings.len(), 1);
        assert!(omega.consult_professional);

        let iron = &recs[1];
        assert!(iron.interaction_warnings.iter().any(|w| w.contains("omeprazol")));
        assert!(iron.consult_professional);

        let zinc = &recs[2];
        assert!(zinc.interaction_warnings.is_empty());
        assert!(!zinc.consult_professional);
    }

    #[test]
    fn no_medications_means_no_interaction_text() {
        let catalog = Catalog::embedded().unwrap();
        let (recs, _) = run(&catalog, &["Melatonina", "Magnesio"], &request(Gender::Male, 30, vec![]), &[HealthGoal::Sueno]);
        assert!(recs.iter().all(|r| r.interaction_warnings.is_empty()));
    }

    #[test]
    fn age_bands_warn_without_removing() {
        let catalog = Catalog::embedded().unwrap();
        let (teen, _) = run(&catalog, &["Cafeína", "Vitamina C"], &request(Gender::Male, 16, vec![]), &[]);
        assert_eq!(teen.len(), 2);
        assert!(teen[0].warnings.iter().any(|w| w.contains("menores de 18")));
        assert!(teen[0].consult_professional);
        assert!(!teen[1].consult_professional);

        let (adult, _) = run(&catalog, &["Cafeína", "Vitamina C"], &request(Gender::Male, 18, vec![]), &[]);
        assert!(!adult[0].warnings.iter().any(|w| w.contains("menores de 18")));
    }

    #[test]
    fn severe_side_effects_require_consultation() {
        let catalog = Catalog::embedded().unwrap();
        let (recs, _) = run(&catalog, &["Berberina", "Cromo"], &request(Gender::Male, 40, vec![]), &[HealthGoal::ControlGlucosa]);
        assert!(recs[0].consult_professional);
        assert!(!recs[1].consult_professional);
    }

    #[test]
    fn allergy_text_excludes_matching_records() {
        let catalog = Catalog::embedded().unwrap();
        let mut req = request(Gender::Male, 30, vec![]);
        req.allergies_text = Some("Alergia al pescado".to_string());
        let (recs, diagnostics) = run(
            &catalog,
            &["Omega-3 (Aceite de Pescado)", "Magnesio", "Zinc"],
            &req,
            &[HealthGoal::SaludCardiovascular],
        );
        assert_eq!(names(&recs), vec!["Magnesio", "Zinc"]);
        assert!(matches!(
            &diagnostics[..],
            [Diagnostic::Excluded { reason, .. }] if reason == "allergy: pescado"
        ));
    }

    #[test]
    fn range_dosage_overrides_record_dosage() {
        let catalog = Catalog::embedded().unwrap();
        let candidates = vec![
            Candidate::from_marker("Vitamina D3", MarkerId::VitaminD, Some("5000-10000 UI".to_string())),
            Candidate::from_marker("Vitamina K2", MarkerId::VitaminD, None),
        ];
        let req = request(Gender::Female, 30, vec![]);
        let resolved = resolve(&catalog, &candidates, &[], &mut Vec::new());
        let recs = filter(&catalog, resolved, &req, &[], &mut Vec::new());
        assert_eq!(recs[0].dosage, "5000-10000 UI");
        assert_eq!(recs[1].dosage, "90-180 mcg al día");
        assert_eq!(recs[0].provenance, Provenance::BloodTest);
        assert_eq!(recs[0].tags, vec!["análisis de sangre", "vitamin-d"]);
    }
}
